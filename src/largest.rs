use core::mem::{align_of, size_of};

/// Size and alignment needed to host any one type of a non-empty tuple.
///
/// # Example
///
/// ```
/// # use fitted::Largest;
/// assert_eq!(<(u8, u32, u16) as Largest>::SIZE, 4);
/// assert_eq!(<(u8, [u8; 6], u16) as Largest>::SIZE, 6);
/// assert_eq!(<(u8, [u8; 6], u16) as Largest>::ALIGN, 2);
/// ```
pub trait Largest {
    /// Largest `size_of` among the types.
    const SIZE: usize;
    /// Largest `align_of` among the types.
    const ALIGN: usize;
}

const fn max(lhs: usize, rhs: usize) -> usize {
    if lhs >= rhs {
        lhs
    } else {
        rhs
    }
}

macro_rules! impl_largest {
    ($head:ident) => {
        impl<$head> Largest for ($head,) {
            const SIZE: usize = size_of::<$head>();
            const ALIGN: usize = align_of::<$head>();
        }
    };
    ($head:ident $($tail:ident)+) => {
        impl<$head, $($tail),+> Largest for ($head, $($tail),+) {
            const SIZE: usize = max(size_of::<$head>(), <($($tail,)+) as Largest>::SIZE);
            const ALIGN: usize = max(align_of::<$head>(), <($($tail,)+) as Largest>::ALIGN);
        }

        impl_largest!($($tail)+);
    };
}

impl_largest!(A B C D E F G H I J K L);

/// [`FixedAny`](crate::FixedAny) type just large enough for any of the listed types.
///
/// The listed types must be concrete, since the capacity is computed when the type is named.
///
/// # Example
///
/// ```
/// # use fitted::fitted_any;
/// type Small = fitted_any!(u8, u32, [u16; 3]);
///
/// let a = Small::from_value([1u16, 2, 3]);
/// assert!(Small::fits::<[u16; 3]>());
/// assert_eq!(a.downcast_ref::<[u16; 3]>(), Some(&[1, 2, 3]));
/// ```
#[macro_export]
macro_rules! fitted_any {
    ($($t:ty),+ $(,)?) => {
        $crate::FixedAny<
            { <($($t,)+) as $crate::Largest>::SIZE },
            { <($($t,)+) as $crate::Largest>::ALIGN },
        >
    };
}

/// [`FixedFn`](crate::FixedFn) type with signature `$sig` just large enough for any of the listed callables.
///
/// # Example
///
/// ```
/// # use fitted::fitted_fn;
/// let offset = 10u64;
/// let add = move |x: u64| x + offset;
///
/// fn twice(x: u64) -> u64 { x * 2 }
///
/// let mut f = <fitted_fn!(fn(u64) -> u64; u64, fn(u64) -> u64)>::from_fn(add);
/// assert_eq!(f.call(1), 11);
/// f.set(twice as fn(u64) -> u64);
/// assert_eq!(f.call(4), 8);
/// ```
#[macro_export]
macro_rules! fitted_fn {
    ($sig:ty; $($t:ty),+ $(,)?) => {
        $crate::FixedFn<
            $sig,
            { <($($t,)+) as $crate::Largest>::SIZE },
            { <($($t,)+) as $crate::Largest>::ALIGN },
        >
    };
}

/// [`InplaceAny`](crate::InplaceAny) type just large enough for any of the listed types.
#[macro_export]
macro_rules! fitted_inplace {
    ($($t:ty),+ $(,)?) => {
        $crate::InplaceAny<
            { <($($t,)+) as $crate::Largest>::SIZE },
            { <($($t,)+) as $crate::Largest>::ALIGN },
        >
    };
}
