use crate::meta::{with_alternatives, Alternatives};

/// Visitor over shared references to the alternatives of a [`Variant`](crate::Variant).
///
/// A visitor passed to [`Variant::visit`](crate::Variant::visit) must implement
/// `Visitor<T>` for every alternative `T`, all with the same `Output`.
/// A missing alternative is a compile error.
///
/// # Example
///
/// ```
/// # use fitted::{Variant, Visitor};
/// struct Width;
///
/// impl Visitor<u8> for Width {
///     type Output = usize;
///     fn visit(self, _: &u8) -> usize { 1 }
/// }
///
/// impl Visitor<u64> for Width {
///     type Output = usize;
///     fn visit(self, _: &u64) -> usize { 8 }
/// }
///
/// let v = Variant::<(u8, u64)>::new(5u64);
/// assert_eq!(v.visit(Width), 8);
/// ```
///
/// A visitor that misses an alternative is rejected:
///
/// ```compile_fail
/// # use fitted::{Variant, Visitor};
/// struct OnlyBytes;
///
/// impl Visitor<u8> for OnlyBytes {
///     type Output = ();
///     fn visit(self, _: &u8) {}
/// }
///
/// let v = Variant::<(u8, u64)>::new(5u64);
/// v.visit(OnlyBytes);
/// ```
pub trait Visitor<T> {
    /// Result of the visit.
    type Output;

    /// Visits the active alternative.
    fn visit(self, value: &T) -> Self::Output;
}

/// Visitor over mutable references to the alternatives of a [`Variant`](crate::Variant).
pub trait VisitorMut<T> {
    /// Result of the visit.
    type Output;

    /// Visits the active alternative.
    fn visit_mut(self, value: &mut T) -> Self::Output;
}

/// Dispatch of a [`Visitor`] `V` producing `R` over every alternative.
///
/// # Safety
///
/// `accept` must visit `value` as the alternative at `index`.
pub unsafe trait Accept<V, R>: Alternatives {
    /// Visits the alternative at `index` stored at `value`.
    ///
    /// # Safety
    ///
    /// `index` must be in bounds and `value` must point to the alternative at `index`.
    #[doc(hidden)]
    unsafe fn accept(index: usize, value: *const u8, visitor: V) -> R;
}

/// Dispatch of a [`VisitorMut`] `V` producing `R` over every alternative.
///
/// # Safety
///
/// `accept_mut` must visit `value` as the alternative at `index`.
pub unsafe trait AcceptMut<V, R>: Alternatives {
    /// Visits the alternative at `index` stored at `value`.
    ///
    /// # Safety
    ///
    /// `index` must be in bounds and `value` must point to the alternative at `index`.
    #[doc(hidden)]
    unsafe fn accept_mut(index: usize, value: *mut u8, visitor: V) -> R;
}

/// Dispatch of a [`Visitor`] `V` whose outputs all convert into `R`.
///
/// # Safety
///
/// `accept_into` must visit `value` as the alternative at `index`.
pub unsafe trait AcceptInto<V, R>: Alternatives {
    /// Visits the alternative at `index` stored at `value`.
    ///
    /// # Safety
    ///
    /// `index` must be in bounds and `value` must point to the alternative at `index`.
    #[doc(hidden)]
    unsafe fn accept_into(index: usize, value: *const u8, visitor: V) -> R;
}

unsafe fn visit_erased<V, T, R>(value: *const u8, visitor: V) -> R
where
    V: Visitor<T, Output = R>,
{
    visitor.visit(unsafe { &*value.cast::<T>() })
}

unsafe fn visit_mut_erased<V, T, R>(value: *mut u8, visitor: V) -> R
where
    V: VisitorMut<T, Output = R>,
{
    visitor.visit_mut(unsafe { &mut *value.cast::<T>() })
}

unsafe fn visit_into_erased<V, T, R>(value: *const u8, visitor: V) -> R
where
    V: Visitor<T>,
    V::Output: Into<R>,
{
    visitor.visit(unsafe { &*value.cast::<T>() }).into()
}

// Dispatch is a `match` on the index, so visitors and outputs are free to borrow.
macro_rules! impl_accept {
    ($union:ident $all:tt; $(($idx:tt $T:ident))+) => {
        unsafe impl<V, R, $($T),+> Accept<V, R> for ($($T,)+)
        where
            $(V: Visitor<$T, Output = R>,)+
        {
            #[inline]
            unsafe fn accept(index: usize, value: *const u8, visitor: V) -> R {
                match index {
                    $($idx => unsafe { visit_erased::<V, $T, R>(value, visitor) },)+
                    _ => unsafe { core::hint::unreachable_unchecked() },
                }
            }
        }

        unsafe impl<V, R, $($T),+> AcceptMut<V, R> for ($($T,)+)
        where
            $(V: VisitorMut<$T, Output = R>,)+
        {
            #[inline]
            unsafe fn accept_mut(index: usize, value: *mut u8, visitor: V) -> R {
                match index {
                    $($idx => unsafe { visit_mut_erased::<V, $T, R>(value, visitor) },)+
                    _ => unsafe { core::hint::unreachable_unchecked() },
                }
            }
        }

        unsafe impl<V, R, $($T),+> AcceptInto<V, R> for ($($T,)+)
        where
            $(V: Visitor<$T>, <V as Visitor<$T>>::Output: Into<R>,)+
        {
            #[inline]
            unsafe fn accept_into(index: usize, value: *const u8, visitor: V) -> R {
                match index {
                    $($idx => unsafe { visit_into_erased::<V, $T, R>(value, visitor) },)+
                    _ => unsafe { core::hint::unreachable_unchecked() },
                }
            }
        }
    };
}

with_alternatives!(impl_accept);
