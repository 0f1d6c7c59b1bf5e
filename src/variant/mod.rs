//! Tagged union over a closed list of alternatives.

use core::{
    fmt,
    mem::{ManuallyDrop, MaybeUninit},
};

use crate::{
    error::Error,
    meta::{
        Alternative, Alternatives, CloneAlternatives, DebugAlternatives, Member,
        PartialEqAlternatives,
    },
};

pub use self::visit::{Accept, AcceptInto, AcceptMut, Visitor, VisitorMut};

mod visit;

/// Tagged union holding exactly one of the types listed in the tuple `L`.
///
/// Storage is sized and aligned for the largest alternative and the value is kept inline.
/// A [`Variant`] always holds a value; there is no empty state.
///
/// Type-directed operations take the alternative's position as an inferred parameter,
/// so they compile only when the type occurs in `L` exactly once.
/// Index-directed operations (`*_at`) work with repeated types.
///
/// # Example
///
/// ```
/// # use fitted::Variant;
/// let mut v = Variant::<(i32, &'static str)>::new(4i32);
/// assert_eq!(v.index(), 0);
/// assert_eq!(v.get_if::<i32, _>(), Some(&4));
///
/// v.set("four");
/// assert_eq!(v.index(), 1);
/// assert_eq!(v.get_at::<1>(), Ok(&"four"));
/// assert!(v.get::<i32, _>().is_err());
/// ```
///
/// A type that is not an alternative fails to compile:
///
/// ```compile_fail
/// # use fitted::Variant;
/// let v = Variant::<(i32, f32)>::new(1u8);
/// ```
///
/// So does type-directed access to a repeated type:
///
/// ```compile_fail
/// # use fitted::Variant;
/// let v = Variant::<(i32, i32)>::new(1i32);
/// ```
///
/// And an index past the end:
///
/// ```compile_fail
/// # use fitted::Variant;
/// let v = Variant::<(i32, f32)>::new_at::<2>(1);
/// ```
pub struct Variant<L>
where
    L: Alternatives,
{
    storage: MaybeUninit<L::Storage>,
    index: usize,
}

impl<L> Drop for Variant<L>
where
    L: Alternatives,
{
    #[inline]
    fn drop(&mut self) {
        // Safety: The storage holds the alternative at `index`.
        unsafe { (L::DROP[self.index])(self.storage.as_mut_ptr().cast()) }
    }
}

impl<L> Default for Variant<L>
where
    L: Alternative<0>,
    <L as Alternative<0>>::Type: Default,
{
    /// Holds the default value of the first alternative.
    #[inline]
    fn default() -> Self {
        Variant::new_at::<0>(Default::default())
    }
}

impl<L> Clone for Variant<L>
where
    L: CloneAlternatives,
{
    fn clone(&self) -> Self {
        let mut storage = MaybeUninit::<L::Storage>::uninit();

        // Safety: `self` holds the alternative at `index`, the new storage fits every alternative.
        unsafe {
            (L::CLONE[self.index])(self.storage.as_ptr().cast(), storage.as_mut_ptr().cast());
        }

        Variant {
            storage,
            index: self.index,
        }
    }
}

impl<L> PartialEq for Variant<L>
where
    L: PartialEqAlternatives,
{
    fn eq(&self, other: &Self) -> bool {
        // Safety: Both sides hold the alternative at the same index.
        self.index == other.index
            && unsafe {
                (L::EQ[self.index])(self.storage.as_ptr().cast(), other.storage.as_ptr().cast())
            }
    }
}

impl<L> fmt::Debug for Variant<L>
where
    L: DebugAlternatives,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Active<'a, L: Alternatives>(&'a Variant<L>);

        impl<L> fmt::Debug for Active<'_, L>
        where
            L: DebugAlternatives,
        {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                // Safety: The storage holds the alternative at `index`.
                unsafe { (L::DEBUG[self.0.index])(self.0.storage.as_ptr().cast(), f) }
            }
        }

        f.debug_struct("Variant")
            .field("index", &self.index)
            .field("value", &Active(self))
            .finish()
    }
}

impl<L> Variant<L>
where
    L: Alternatives,
{
    /// Construct new [`Variant`] holding `value` as the alternative of type `T`.
    #[inline]
    pub fn new<T, I>(value: T) -> Self
    where
        L: Member<T, I>,
    {
        Self::from_parts(value, <L as Member<T, I>>::INDEX)
    }

    /// Construct new [`Variant`] holding `value` as the alternative at position `N`.
    ///
    /// # Example
    ///
    /// ```
    /// # use fitted::Variant;
    /// let v = Variant::<(u8, u8)>::new_at::<1>(3);
    /// assert_eq!(v.index(), 1);
    /// assert_eq!(v.get_if_at::<0>(), None);
    /// assert_eq!(v.get_if_at::<1>(), Some(&3));
    /// ```
    #[inline]
    pub fn new_at<const N: usize>(value: <L as Alternative<N>>::Type) -> Self
    where
        L: Alternative<N>,
    {
        Self::from_parts(value, N)
    }

    #[inline]
    fn from_parts<T>(value: T, index: usize) -> Self {
        let mut storage = MaybeUninit::<L::Storage>::uninit();

        // Safety: `T` is the alternative at `index`, so it is one of the union's fields.
        unsafe { storage.as_mut_ptr().cast::<T>().write(value) };

        Variant { storage, index }
    }

    /// Replaces the active alternative with `value`.
    ///
    /// The previously held value is dropped before `value` takes its place.
    #[inline]
    pub fn set<T, I>(&mut self, value: T)
    where
        L: Member<T, I>,
    {
        trace!(
            from = self.type_name(),
            to = core::any::type_name::<T>(),
            "set Variant"
        );

        *self = Variant::new(value);
    }

    /// Replaces the active alternative with `value` at position `N`.
    #[inline]
    pub fn set_at<const N: usize>(&mut self, value: <L as Alternative<N>>::Type)
    where
        L: Alternative<N>,
    {
        trace!(from = self.index, to = N, "set Variant");

        *self = Variant::new_at::<N>(value);
    }

    /// Position of the active alternative.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns `true` if the active alternative is of type `T`.
    ///
    /// # Example
    ///
    /// ```
    /// # use fitted::Variant;
    /// let v = Variant::<(u8, char)>::new('x');
    /// assert!(v.holds::<char, _>());
    /// assert!(!v.holds::<u8, _>());
    /// ```
    #[inline]
    pub fn holds<T, I>(&self) -> bool
    where
        L: Member<T, I>,
    {
        self.index == <L as Member<T, I>>::INDEX
    }

    /// Name of the active alternative's type.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        (L::NAMES[self.index])()
    }

    /// Returns some reference to the held value if the active alternative is of type `T`.
    #[inline]
    pub fn get_if<T, I>(&self) -> Option<&T>
    where
        L: Member<T, I>,
    {
        // Safety: The index matches, so the storage holds a `T`.
        self.holds::<T, I>()
            .then(|| unsafe { &*self.storage.as_ptr().cast::<T>() })
    }

    /// Returns some mutable reference to the held value if the active alternative is of type `T`.
    #[inline]
    pub fn get_if_mut<T, I>(&mut self) -> Option<&mut T>
    where
        L: Member<T, I>,
    {
        if self.holds::<T, I>() {
            // Safety: The index matches, so the storage holds a `T`.
            Some(unsafe { &mut *self.storage.as_mut_ptr().cast::<T>() })
        } else {
            None
        }
    }

    /// Returns reference to the held value, or [`Error::WrongAlternative`] if another alternative is active.
    #[inline]
    pub fn get<T, I>(&self) -> Result<&T, Error>
    where
        L: Member<T, I>,
    {
        let active = self.index;
        self.get_if::<T, I>().ok_or(Error::WrongAlternative {
            requested: <L as Member<T, I>>::INDEX,
            active,
        })
    }

    /// Returns mutable reference to the held value, or [`Error::WrongAlternative`] if another alternative is active.
    #[inline]
    pub fn get_mut<T, I>(&mut self) -> Result<&mut T, Error>
    where
        L: Member<T, I>,
    {
        let active = self.index;
        self.get_if_mut::<T, I>().ok_or(Error::WrongAlternative {
            requested: <L as Member<T, I>>::INDEX,
            active,
        })
    }

    /// Returns some reference to the alternative at position `N` if it is active.
    #[inline]
    pub fn get_if_at<const N: usize>(&self) -> Option<&<L as Alternative<N>>::Type>
    where
        L: Alternative<N>,
    {
        // Safety: The index matches, so the storage holds the alternative at `N`.
        (self.index == N).then(|| unsafe {
            &*self
                .storage
                .as_ptr()
                .cast::<<L as Alternative<N>>::Type>()
        })
    }

    /// Returns some mutable reference to the alternative at position `N` if it is active.
    #[inline]
    pub fn get_if_at_mut<const N: usize>(&mut self) -> Option<&mut <L as Alternative<N>>::Type>
    where
        L: Alternative<N>,
    {
        if self.index == N {
            // Safety: The index matches, so the storage holds the alternative at `N`.
            Some(unsafe {
                &mut *self
                    .storage
                    .as_mut_ptr()
                    .cast::<<L as Alternative<N>>::Type>()
            })
        } else {
            None
        }
    }

    /// Returns reference to the alternative at position `N`, or [`Error::WrongAlternative`] if it is not active.
    #[inline]
    pub fn get_at<const N: usize>(&self) -> Result<&<L as Alternative<N>>::Type, Error>
    where
        L: Alternative<N>,
    {
        let active = self.index;
        self.get_if_at::<N>().ok_or(Error::WrongAlternative {
            requested: N,
            active,
        })
    }

    /// Returns mutable reference to the alternative at position `N`, or [`Error::WrongAlternative`] if it is not active.
    #[inline]
    pub fn get_at_mut<const N: usize>(&mut self) -> Result<&mut <L as Alternative<N>>::Type, Error>
    where
        L: Alternative<N>,
    {
        let active = self.index;
        self.get_if_at_mut::<N>().ok_or(Error::WrongAlternative {
            requested: N,
            active,
        })
    }

    /// Returns the held value if the active alternative is of type `T`.
    /// Otherwise return self back.
    ///
    /// # Example
    ///
    /// ```
    /// # use fitted::Variant;
    /// let v = Variant::<(u8, char)>::new('x');
    /// let v = v.into_inner::<u8, _>().unwrap_err();
    /// assert_eq!(v.into_inner::<char, _>().ok(), Some('x'));
    /// ```
    #[inline]
    pub fn into_inner<T, I>(self) -> Result<T, Self>
    where
        L: Member<T, I>,
    {
        if self.holds::<T, I>() {
            // Safety: The storage holds a `T`.
            Ok(unsafe { self.into_value::<T>() })
        } else {
            Err(self)
        }
    }

    /// Returns the held value if the alternative at position `N` is active.
    /// Otherwise return self back.
    #[inline]
    pub fn into_at<const N: usize>(self) -> Result<<L as Alternative<N>>::Type, Self>
    where
        L: Alternative<N>,
    {
        if self.index == N {
            // Safety: The storage holds the alternative at `N`.
            Ok(unsafe { self.into_value::<<L as Alternative<N>>::Type>() })
        } else {
            Err(self)
        }
    }

    /// # Safety
    ///
    /// The storage must hold a `T`.
    unsafe fn into_value<T>(self) -> T {
        let this = ManuallyDrop::new(self);
        unsafe { this.storage.as_ptr().cast::<T>().read() }
    }

    /// Calls the visitor with a reference to the active alternative.
    ///
    /// Dispatch branches once on the active position,
    /// and the visitor is invoked exactly once.
    #[inline]
    pub fn visit<V, R>(&self, visitor: V) -> R
    where
        L: Accept<V, R>,
    {
        // Safety: `index` is in bounds and the storage holds the alternative at `index`.
        unsafe { <L as Accept<V, R>>::accept(self.index, self.storage.as_ptr().cast(), visitor) }
    }

    /// Calls the visitor with a mutable reference to the active alternative.
    ///
    /// # Example
    ///
    /// ```
    /// # use fitted::{Variant, VisitorMut};
    /// struct Bump;
    ///
    /// impl VisitorMut<u32> for Bump {
    ///     type Output = ();
    ///     fn visit_mut(self, value: &mut u32) { *value += 1 }
    /// }
    ///
    /// impl VisitorMut<f32> for Bump {
    ///     type Output = ();
    ///     fn visit_mut(self, value: &mut f32) { *value += 1.0 }
    /// }
    ///
    /// let mut v = Variant::<(u32, f32)>::new(1u32);
    /// v.visit_mut(Bump);
    /// assert_eq!(v.get_if::<u32, _>(), Some(&2));
    /// ```
    #[inline]
    pub fn visit_mut<V, R>(&mut self, visitor: V) -> R
    where
        L: AcceptMut<V, R>,
    {
        // Safety: `index` is in bounds and the storage holds the alternative at `index`.
        unsafe {
            <L as AcceptMut<V, R>>::accept_mut(self.index, self.storage.as_mut_ptr().cast(), visitor)
        }
    }

    /// Calls the visitor with a reference to the active alternative and converts its output into `R`.
    ///
    /// Alternatives may produce different output types as long as each converts into `R`.
    ///
    /// # Example
    ///
    /// ```
    /// # use fitted::{Variant, Visitor};
    /// struct Widen;
    ///
    /// impl Visitor<u8> for Widen {
    ///     type Output = u8;
    ///     fn visit(self, value: &u8) -> u8 { *value }
    /// }
    ///
    /// impl Visitor<u32> for Widen {
    ///     type Output = u32;
    ///     fn visit(self, value: &u32) -> u32 { *value }
    /// }
    ///
    /// let v = Variant::<(u8, u32)>::new(7u8);
    /// assert_eq!(v.visit_into::<u64, _>(Widen), 7u64);
    /// ```
    #[inline]
    pub fn visit_into<R, V>(&self, visitor: V) -> R
    where
        L: AcceptInto<V, R>,
    {
        // Safety: `index` is in bounds and the storage holds the alternative at `index`.
        unsafe {
            <L as AcceptInto<V, R>>::accept_into(self.index, self.storage.as_ptr().cast(), visitor)
        }
    }
}
