use derive_more::{Display, Error};

/// Errors reported by the checked accessors of the containers.
///
/// Capacity, alignment and alternative-list violations never reach this type:
/// they are rejected when the program is compiled.
#[derive(Clone, Copy, Debug, Display, Error, PartialEq, Eq)]
pub enum Error {
    /// Type-directed extraction requested a type other than the stored one.
    #[display("bad cast: requested `{requested}`, found `{}`", found.unwrap_or("nothing"))]
    BadCast {
        /// Name of the requested type.
        requested: &'static str,
        /// Name of the stored type, `None` if the container was empty.
        found: Option<&'static str>,
    },

    /// Variant access named an alternative that is not the active one.
    #[display("alternative {requested} requested, but alternative {active} is active")]
    WrongAlternative {
        /// Index of the requested alternative.
        requested: usize,
        /// Index of the active alternative.
        active: usize,
    },

    /// A callable wrapper was called while empty.
    #[display("callable wrapper holds no function")]
    NotCallable,
}
