//! Type-level machinery shared by the containers.
//!
//! A closed list of alternatives is written as a tuple `(A, B, C)`.
//! Tuples of arity 1 through 8 implement [`Alternatives`], and for every position `N`
//! also [`Alternative<N>`] and [`Member<T, At<N>>`].
//!
//! Looking an alternative up by type leaves the position to inference:
//! `L: Member<T, I>` has exactly one solution when `T` appears once in `L`,
//! none when it is absent and more than one when it is duplicated.
//! The last two cases are compile errors, which is what makes type-directed access safe.

use core::{any::type_name, fmt};

/// Type-level position in a list of alternatives.
pub struct At<const N: usize>;

/// A closed, ordered list of alternative types.
///
/// # Safety
///
/// `Storage` must be large and aligned enough for every alternative,
/// and the tables must be indexed by position, each entry instantiated for the alternative at that position.
pub unsafe trait Alternatives: Sized {
    /// Number of alternatives.
    const LEN: usize;

    /// Union of all alternatives, sized and aligned for the largest.
    #[doc(hidden)]
    type Storage;

    #[doc(hidden)]
    const DROP: &'static [unsafe fn(*mut u8)];

    #[doc(hidden)]
    const NAMES: &'static [fn() -> &'static str];
}

/// Alternative at position `N`.
///
/// Not implemented for out-of-bounds positions.
///
/// # Safety
///
/// `Type` must be the `N`-th element of the list.
pub unsafe trait Alternative<const N: usize>: Alternatives {
    /// Type of the alternative.
    type Type;
}

/// `T` is an alternative at position `I`.
///
/// # Safety
///
/// `INDEX` must be the position of `T` in the list.
pub unsafe trait Member<T, I>: Alternatives {
    /// Position of `T`.
    const INDEX: usize;
}

/// Per-position clone operations, available when every alternative is `Clone`.
///
/// # Safety
///
/// Same table layout as [`Alternatives`].
pub unsafe trait CloneAlternatives: Alternatives {
    #[doc(hidden)]
    const CLONE: &'static [unsafe fn(*const u8, *mut u8)];
}

/// Per-position equality, available when every alternative is `PartialEq`.
///
/// # Safety
///
/// Same table layout as [`Alternatives`].
pub unsafe trait PartialEqAlternatives: Alternatives {
    #[doc(hidden)]
    const EQ: &'static [unsafe fn(*const u8, *const u8) -> bool];
}

/// Per-position formatting, available when every alternative is `Debug`.
///
/// # Safety
///
/// Same table layout as [`Alternatives`].
pub unsafe trait DebugAlternatives: Alternatives {
    #[doc(hidden)]
    const DEBUG: &'static [unsafe fn(*const u8, &mut fmt::Formatter<'_>) -> fmt::Result];
}

unsafe fn drop_erased<T>(ptr: *mut u8) {
    unsafe { ptr.cast::<T>().drop_in_place() }
}

unsafe fn clone_erased<T: Clone>(src: *const u8, dst: *mut u8) {
    unsafe { dst.cast::<T>().write((*src.cast::<T>()).clone()) }
}

unsafe fn eq_erased<T: PartialEq>(lhs: *const u8, rhs: *const u8) -> bool {
    unsafe { *lhs.cast::<T>() == *rhs.cast::<T>() }
}

unsafe fn debug_erased<T: fmt::Debug>(value: *const u8, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    unsafe { fmt::Debug::fmt(&*value.cast::<T>(), f) }
}

#[doc(hidden)]
pub mod storage {
    use core::mem::ManuallyDrop;

    macro_rules! unions {
        ($($name:ident { $($field:ident: $T:ident),+ })+) => {
            $(
                #[allow(dead_code)]
                #[repr(C)]
                pub union $name<$($T),+> {
                    $($field: ManuallyDrop<$T>,)+
                }
            )+
        };
    }

    unions! {
        Union1 { a: A }
        Union2 { a: A, b: B }
        Union3 { a: A, b: B, c: C }
        Union4 { a: A, b: B, c: C, d: D }
        Union5 { a: A, b: B, c: C, d: D, e: E }
        Union6 { a: A, b: B, c: C, d: D, e: E, f: F }
        Union7 { a: A, b: B, c: C, d: D, e: E, f: F, g: G }
        Union8 { a: A, b: B, c: C, d: D, e: E, f: F, g: G, h: H }
    }
}

/// Invokes `$m!` once per supported arity.
///
/// Each call receives the whole type list as one token tree, followed by `(position Type)` pairs.
macro_rules! with_alternatives {
    ($m:ident) => {
        $m!(Union1 [A]; (0 A));
        $m!(Union2 [A, B]; (0 A) (1 B));
        $m!(Union3 [A, B, C]; (0 A) (1 B) (2 C));
        $m!(Union4 [A, B, C, D]; (0 A) (1 B) (2 C) (3 D));
        $m!(Union5 [A, B, C, D, E]; (0 A) (1 B) (2 C) (3 D) (4 E));
        $m!(Union6 [A, B, C, D, E, F]; (0 A) (1 B) (2 C) (3 D) (4 E) (5 F));
        $m!(Union7 [A, B, C, D, E, F, G]; (0 A) (1 B) (2 C) (3 D) (4 E) (5 F) (6 G));
        $m!(Union8 [A, B, C, D, E, F, G, H]; (0 A) (1 B) (2 C) (3 D) (4 E) (5 F) (6 G) (7 H));
    };
}

pub(crate) use with_alternatives;

macro_rules! impl_position {
    ([$($All:ident),+] $idx:tt $T:ident) => {
        unsafe impl<$($All),+> Alternative<$idx> for ($($All,)+) {
            type Type = $T;
        }

        unsafe impl<$($All),+> Member<$T, At<$idx>> for ($($All,)+) {
            const INDEX: usize = $idx;
        }
    };
}

macro_rules! impl_alternatives {
    ($union:ident $all:tt; $(($idx:tt $T:ident))+) => {
        unsafe impl<$($T),+> Alternatives for ($($T,)+) {
            const LEN: usize = Self::DROP.len();
            type Storage = storage::$union<$($T),+>;
            const DROP: &'static [unsafe fn(*mut u8)] = &[$(drop_erased::<$T>),+];
            const NAMES: &'static [fn() -> &'static str] = &[$(type_name::<$T>),+];
        }

        unsafe impl<$($T: Clone),+> CloneAlternatives for ($($T,)+) {
            const CLONE: &'static [unsafe fn(*const u8, *mut u8)] = &[$(clone_erased::<$T>),+];
        }

        unsafe impl<$($T: PartialEq),+> PartialEqAlternatives for ($($T,)+) {
            const EQ: &'static [unsafe fn(*const u8, *const u8) -> bool] = &[$(eq_erased::<$T>),+];
        }

        unsafe impl<$($T: fmt::Debug),+> DebugAlternatives for ($($T,)+) {
            const DEBUG: &'static [unsafe fn(*const u8, &mut fmt::Formatter<'_>) -> fmt::Result] =
                &[$(debug_erased::<$T>),+];
        }

        $(impl_position!($all $idx $T);)+
    };
}

with_alternatives!(impl_alternatives);
