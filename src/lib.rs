//! This crate provides type-erased containers, callable wrappers and tagged unions
//! that keep their value inline in fixed-size storage, without heap allocation.
//!
//! Capacity and alignment are const parameters. A value that does not fit is a compile error,
//! never a fallback to the heap.
//!
//! `FixedAny` holds one value of any `Clone + 'static` type that fits.
//! `FixedFn` holds one callable with a fixed signature.
//! `Variant` holds one value out of a closed list of alternatives.
//! `InplaceAny` is the same container as `FixedAny` with virtual dispatch and error-reporting casts.
//!
//! ## Usage
//!
//! ```
//! use fitted::{fitted_any, FixedAny, FixedFn, Variant};
//!
//! // Any value up to 16 bytes, aligned to at most 8.
//! let mut a = FixedAny::<16, 8>::from_value(42u32);
//! assert_eq!(a.downcast_ref::<u32>(), Some(&42));
//!
//! // Replace with a value of another type.
//! a.emplace(1.5f64);
//! assert!(a.downcast_ref::<u32>().is_none());
//!
//! // Take ownership of the value.
//! let Ok(value) = a.downcast::<f64>() else {
//!     panic!();
//! };
//! assert_eq!(value, 1.5);
//!
//! // Capacity computed from a list of types.
//! type Small = fitted_any!(u8, u16, [u8; 3]);
//! assert!(Small::fits::<[u8; 3]>());
//!
//! // Capturing closure stored inline.
//! let scale = 3;
//! let mut f = FixedFn::<fn(i32) -> i32, 8>::from_fn(move |x: i32| x * scale);
//! assert_eq!(f.call(2), 6);
//!
//! // Tagged union.
//! let v = Variant::<(i32, char)>::new('z');
//! assert_eq!(v.index(), 1);
//! assert_eq!(v.get_if::<char, _>(), Some(&'z'));
//! ```
//!
//! ## Features
//!
//! `tracing` emits trace-level events when values are emplaced, reset, widened or switched.

#![no_std]

#[cfg(test)]
extern crate std;

macro_rules! trace {
    ($($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        ::tracing::trace!($($arg)+);
    };
}

mod any;
mod error;
mod function;
mod inplace;
mod largest;
pub mod meta;
mod rtti;
mod storage;
mod variant;

pub use self::{
    any::{any_cast, any_cast_mut, make_any, FixedAny},
    error::Error,
    function::{Callable, FixedFn, Signature},
    inplace::InplaceAny,
    largest::Largest,
    meta::{Alternative, Alternatives, At, Member},
    rtti::TypeKey,
    storage::{Align, Alignment, DEFAULT_ALIGN},
    variant::{Accept, AcceptInto, AcceptMut, Variant, Visitor, VisitorMut},
};

#[cfg(test)]
mod tests;
