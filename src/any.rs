use core::{any::TypeId, fmt, marker::PhantomData, mem};

use crate::{
    error::Error,
    rtti::TypeKey,
    storage::{Align, Alignment, InlineStorage, DEFAULT_ALIGN},
};

/// Lifetime operation performed by a [`Manager`] on erased storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Operation {
    /// Drop the value at `src` in place. `dst` is ignored.
    Drop,
    /// Clone the value at `src` into uninitialized `dst`.
    Clone,
    /// Move the value at `src` into uninitialized `dst`. `src` is left logically uninitialized.
    Move,
}

/// Single point of truth for the lifetime of a `T` living in raw storage.
unsafe fn manage<T: Clone>(op: Operation, src: *mut u8, dst: *mut u8) {
    let src = src.cast::<T>();
    match op {
        // Safety: `src` holds an initialized `T` that is never used again.
        Operation::Drop => unsafe { src.drop_in_place() },
        // Safety: `src` holds an initialized `T`, `dst` is valid for writes of `T`.
        Operation::Clone => unsafe { dst.cast::<T>().write((*src).clone()) },
        // Safety: as above, and the caller forgets the value at `src`.
        Operation::Move => unsafe { dst.cast::<T>().write(src.read()) },
    }
}

/// Operation entry point bound to one concrete type.
pub(crate) struct Manager {
    key: fn() -> TypeKey,
    invoke: unsafe fn(Operation, *mut u8, *mut u8),
}

impl Manager {
    const fn of<T: Clone + 'static>() -> &'static Self {
        const {
            &Manager {
                key: TypeKey::of::<T>,
                invoke: manage::<T>,
            }
        }
    }
}

/// Type-erased container with fixed-size inline storage.
///
/// Holds zero or one value of any `Clone + 'static` type that is at most `SIZE` bytes
/// and whose alignment divides `ALIGN`. The value is never boxed: types that do not fit
/// are rejected at compile time.
///
/// The stored type is erased, so [`FixedAny`] does not implement `Send` or `Sync`.
///
/// # Example
///
/// ```
/// # use fitted::FixedAny;
/// let mut a = FixedAny::<32, 8>::new();
/// a.emplace(4i32);
/// assert_eq!(a.downcast_ref::<i32>(), Some(&4));
///
/// #[derive(Clone)]
/// struct Pair { first: i32, second: i32 }
///
/// a.emplace(Pair { first: 3, second: 4 });
/// assert_eq!(a.downcast_ref::<Pair>().unwrap().first, 3);
/// assert!(a.downcast_ref::<i32>().is_none());
/// ```
///
/// Values that do not fit fail to compile:
///
/// ```compile_fail
/// # use fitted::FixedAny;
/// let a = FixedAny::<4, 4>::from_value(0u64);
/// ```
pub struct FixedAny<const SIZE: usize, const ALIGN: usize = DEFAULT_ALIGN>
where
    Align<ALIGN>: Alignment,
{
    manager: Option<&'static Manager>,
    storage: InlineStorage<SIZE, ALIGN>,
    unsend: PhantomData<*mut u8>,
}

impl<const SIZE: usize, const ALIGN: usize> Drop for FixedAny<SIZE, ALIGN>
where
    Align<ALIGN>: Alignment,
{
    #[inline(always)]
    fn drop(&mut self) {
        self.reset();
    }
}

impl<const SIZE: usize, const ALIGN: usize> Default for FixedAny<SIZE, ALIGN>
where
    Align<ALIGN>: Alignment,
{
    #[inline(always)]
    fn default() -> Self {
        FixedAny::new()
    }
}

impl<const SIZE: usize, const ALIGN: usize> Clone for FixedAny<SIZE, ALIGN>
where
    Align<ALIGN>: Alignment,
{
    #[inline]
    fn clone(&self) -> Self {
        let mut cloned = FixedAny::new();
        cloned.clone_from(self);
        cloned
    }

    fn clone_from(&mut self, source: &Self) {
        self.reset();

        if let Some(manager) = source.manager {
            // Safety: `source` holds a value of the manager's type, `self` is empty.
            unsafe {
                (manager.invoke)(
                    Operation::Clone,
                    source.storage.as_ptr().cast_mut(),
                    self.storage.as_mut_ptr(),
                );
            }
            self.manager = Some(manager);
        }
    }
}

impl<const SIZE: usize, const ALIGN: usize> fmt::Debug for FixedAny<SIZE, ALIGN>
where
    Align<ALIGN>: Alignment,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedAny")
            .field("size", &SIZE)
            .field("align", &ALIGN)
            .field("type", &self.type_name())
            .finish()
    }
}

impl<const SIZE: usize, const ALIGN: usize> FixedAny<SIZE, ALIGN>
where
    Align<ALIGN>: Alignment,
{
    /// Returns `true` if the type `T` fits into the inline storage.
    ///
    /// # Example
    ///
    /// ```
    /// # use fitted::FixedAny;
    /// assert!(FixedAny::<8, 8>::fits::<u64>());
    /// assert!(!FixedAny::<8, 8>::fits::<[u64; 2]>());
    /// assert!(!FixedAny::<8, 4>::fits::<u64>());
    /// ```
    pub const fn fits<T>() -> bool {
        InlineStorage::<SIZE, ALIGN>::fits::<T>()
    }

    /// Construct new empty [`FixedAny`].
    ///
    /// # Example
    ///
    /// ```
    /// # use fitted::FixedAny;
    /// let a = FixedAny::<16>::new();
    /// assert!(!a.has_value());
    /// ```
    #[inline]
    pub const fn new() -> Self {
        FixedAny {
            manager: None,
            storage: InlineStorage::new(),
            unsend: PhantomData,
        }
    }

    /// Construct new [`FixedAny`] holding the given value.
    ///
    /// # Example
    ///
    /// ```
    /// # use fitted::FixedAny;
    /// let a = FixedAny::<16>::from_value(42u32);
    /// assert_eq!(a.downcast_ref::<u32>(), Some(&42));
    /// ```
    #[inline]
    pub fn from_value<T>(value: T) -> Self
    where
        T: Clone + 'static,
    {
        let mut any = FixedAny::new();
        any.emplace(value);
        any
    }

    /// Construct new [`FixedAny`] holding the value returned by `init`.
    ///
    /// `init` runs after the container is set up, and its result is written straight into the storage.
    ///
    /// # Example
    ///
    /// ```
    /// # use fitted::FixedAny;
    /// let a = FixedAny::<16>::in_place(|| [1u8, 2, 3]);
    /// assert_eq!(a.downcast_ref::<[u8; 3]>(), Some(&[1, 2, 3]));
    /// ```
    #[inline]
    pub fn in_place<T>(init: impl FnOnce() -> T) -> Self
    where
        T: Clone + 'static,
    {
        let mut any = FixedAny::new();
        any.emplace_with(init);
        any
    }

    /// Replaces the held value with `value` and returns a reference to it.
    ///
    /// The previous value, if any, is dropped before `value` is moved in.
    ///
    /// # Example
    ///
    /// ```
    /// # use fitted::FixedAny;
    /// let mut a = FixedAny::<16>::from_value(1u8);
    /// *a.emplace(10u32) += 1;
    /// assert_eq!(a.downcast_ref::<u32>(), Some(&11));
    /// ```
    #[inline]
    pub fn emplace<T>(&mut self, value: T) -> &mut T
    where
        T: Clone + 'static,
    {
        self.emplace_with(move || value)
    }

    /// Replaces the held value with the one returned by `init` and returns a reference to it.
    ///
    /// The previous value, if any, is dropped before `init` is called.
    /// If `init` panics the container is left empty.
    pub fn emplace_with<T>(&mut self, init: impl FnOnce() -> T) -> &mut T
    where
        T: Clone + 'static,
    {
        const {
            assert!(
                core::mem::size_of::<T>() <= SIZE,
                "insufficient size for the stored type"
            );
            assert!(
                ALIGN % core::mem::align_of::<T>() == 0,
                "alignment of the stored type does not divide the container alignment"
            );
        }

        self.reset();

        trace!(
            type_name = core::any::type_name::<T>(),
            size = SIZE,
            align = ALIGN,
            "emplace into FixedAny"
        );

        let value = self.storage.as_mut::<T>().write(init());
        self.manager = Some(Manager::of::<T>());
        value
    }

    /// Replaces the held value with `value`.
    #[inline]
    pub fn set<T>(&mut self, value: T)
    where
        T: Clone + 'static,
    {
        self.emplace(value);
    }

    /// Drops the held value, if any. The container is empty afterwards.
    ///
    /// # Example
    ///
    /// ```
    /// # use fitted::FixedAny;
    /// let mut a = FixedAny::<16>::from_value(1u8);
    /// a.reset();
    /// assert!(!a.has_value());
    /// a.reset();
    /// assert!(!a.has_value());
    /// ```
    #[inline]
    pub fn reset(&mut self) {
        // Detach first, a panicking destructor must not lead to a second drop.
        if let Some(manager) = self.manager.take() {
            trace!(type_name = (manager.key)().name(), "reset FixedAny");

            // Safety: The storage holds a value of the manager's type.
            unsafe {
                (manager.invoke)(
                    Operation::Drop,
                    self.storage.as_mut_ptr(),
                    core::ptr::null_mut(),
                );
            }
        }
    }

    /// Returns `true` if the container holds a value.
    #[inline]
    pub fn has_value(&self) -> bool {
        self.manager.is_some()
    }

    /// Returns the key of the held type, or `None` when empty.
    #[inline]
    pub fn type_key(&self) -> Option<TypeKey> {
        self.manager.map(|manager| (manager.key)())
    }

    /// Returns the type id of the held value, or `None` when empty.
    ///
    /// # Example
    ///
    /// ```
    /// # use fitted::FixedAny;
    /// use core::any::TypeId;
    ///
    /// let a = FixedAny::<16>::from_value(42u32);
    /// assert_eq!(a.type_id(), Some(TypeId::of::<u32>()));
    /// ```
    #[inline]
    pub fn type_id(&self) -> Option<TypeId> {
        self.type_key().map(|key| key.id())
    }

    /// Returns the name of the held type, or `None` when empty.
    #[inline]
    pub fn type_name(&self) -> Option<&'static str> {
        self.type_key().map(|key| key.name())
    }

    /// Returns `true` if the held value is of type `T`.
    ///
    /// # Example
    ///
    /// ```
    /// # use fitted::FixedAny;
    /// let a = FixedAny::<16>::from_value(42u32);
    /// assert!(a.is::<u32>());
    /// assert!(!a.is::<i32>());
    /// ```
    #[inline]
    pub fn is<T>(&self) -> bool
    where
        T: 'static,
    {
        self.type_key() == Some(TypeKey::of::<T>())
    }

    /// Returns some reference to the held value if it is of type `T`.
    /// Otherwise returns none.
    #[inline]
    pub fn downcast_ref<T>(&self) -> Option<&T>
    where
        T: 'static,
    {
        if self.is::<T>() {
            Some(unsafe { self.downcast_ref_unchecked::<T>() })
        } else {
            None
        }
    }

    /// Returns some mutable reference to the held value if it is of type `T`.
    /// Otherwise returns none.
    ///
    /// # Example
    ///
    /// ```
    /// # use fitted::FixedAny;
    /// let mut a = FixedAny::<16>::from_value(42u32);
    /// *a.downcast_mut::<u32>().unwrap() = 7;
    /// assert_eq!(a.downcast_ref::<u32>(), Some(&7));
    /// ```
    #[inline]
    pub fn downcast_mut<T>(&mut self) -> Option<&mut T>
    where
        T: 'static,
    {
        if self.is::<T>() {
            Some(unsafe { self.downcast_mut_unchecked::<T>() })
        } else {
            None
        }
    }

    /// Returns a clone of the held value if it is of type `T`.
    ///
    /// # Example
    ///
    /// ```
    /// # use fitted::{Error, FixedAny};
    /// let a = FixedAny::<16>::from_value(42u32);
    /// assert_eq!(a.try_cast::<u32>(), Ok(42));
    /// assert!(matches!(a.try_cast::<u8>(), Err(Error::BadCast { .. })));
    /// ```
    pub fn try_cast<T>(&self) -> Result<T, Error>
    where
        T: Clone + 'static,
    {
        match self.downcast_ref::<T>() {
            Some(value) => Ok(value.clone()),
            None => Err(Error::BadCast {
                requested: core::any::type_name::<T>(),
                found: self.type_name(),
            }),
        }
    }

    /// Returns the held value if it is of type `T`.
    /// Otherwise return self back.
    ///
    /// # Example
    ///
    /// ```
    /// # use fitted::FixedAny;
    /// let a = FixedAny::<16>::from_value(42u32);
    ///
    /// let a = a.downcast::<u8>().unwrap_err();
    /// assert_eq!(a.downcast::<u32>().ok(), Some(42));
    /// ```
    #[inline]
    pub fn downcast<T>(mut self) -> Result<T, Self>
    where
        T: 'static,
    {
        match self.take_value::<T>() {
            Some(value) => Ok(value),
            None => Err(self),
        }
    }

    /// Moves the held value out if it is of type `T`, leaving the container empty.
    /// Otherwise returns none and keeps the value.
    pub fn take_value<T>(&mut self) -> Option<T>
    where
        T: 'static,
    {
        if !self.is::<T>() {
            return None;
        }

        self.manager = None;

        // Safety: The storage held a `T` and the manager was detached, so it is read exactly once.
        Some(unsafe { self.storage.as_ref::<T>().assume_init_read() })
    }

    /// Moves the content into a new container, leaving this one empty.
    ///
    /// # Example
    ///
    /// ```
    /// # use fitted::FixedAny;
    /// let mut a = FixedAny::<16>::from_value(42u32);
    /// let b = a.take();
    /// assert!(!a.has_value());
    /// assert_eq!(b.downcast_ref::<u32>(), Some(&42));
    /// ```
    #[inline]
    pub fn take(&mut self) -> Self {
        mem::replace(self, FixedAny::new())
    }

    /// Exchanges the contents of two containers.
    ///
    /// An empty side receives the other side's value and leaves it empty.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Moves the content into a container with at least the same capacity and alignment.
    ///
    /// # Example
    ///
    /// ```
    /// # use fitted::FixedAny;
    /// let small = FixedAny::<4, 4>::from_value(7u16);
    /// let large: FixedAny<32, 8> = small.widen();
    /// assert_eq!(large.downcast_ref::<u16>(), Some(&7));
    /// ```
    ///
    /// Narrowing fails to compile:
    ///
    /// ```compile_fail
    /// # use fitted::FixedAny;
    /// let large = FixedAny::<32, 8>::from_value(7u16);
    /// let small: FixedAny<4, 4> = large.widen();
    /// ```
    pub fn widen<const WIDE_SIZE: usize, const WIDE_ALIGN: usize>(
        mut self,
    ) -> FixedAny<WIDE_SIZE, WIDE_ALIGN>
    where
        Align<WIDE_ALIGN>: Alignment,
    {
        const {
            assert!(SIZE <= WIDE_SIZE, "insufficient size");
            assert!(ALIGN <= WIDE_ALIGN, "insufficient alignment");
        }

        let mut wide = FixedAny::new();

        if let Some(manager) = self.manager.take() {
            trace!(
                type_name = (manager.key)().name(),
                from = SIZE,
                to = WIDE_SIZE,
                "widen FixedAny"
            );

            // Safety: `self` held a value of the manager's type and forgets it, `wide` is empty
            // and can hold it because its capacity and alignment are not smaller.
            unsafe {
                (manager.invoke)(
                    Operation::Move,
                    self.storage.as_mut_ptr(),
                    wide.storage.as_mut_ptr(),
                );
            }
            wide.manager = Some(manager);
        }

        wide
    }

    /// Clones the content into a container with at least the same capacity and alignment.
    pub fn widen_clone<const WIDE_SIZE: usize, const WIDE_ALIGN: usize>(
        &self,
    ) -> FixedAny<WIDE_SIZE, WIDE_ALIGN>
    where
        Align<WIDE_ALIGN>: Alignment,
    {
        const {
            assert!(SIZE <= WIDE_SIZE, "insufficient size");
            assert!(ALIGN <= WIDE_ALIGN, "insufficient alignment");
        }

        let mut wide = FixedAny::new();

        if let Some(manager) = self.manager {
            // Safety: Same as `widen`, the source value is cloned instead of moved.
            unsafe {
                (manager.invoke)(
                    Operation::Clone,
                    self.storage.as_ptr().cast_mut(),
                    wide.storage.as_mut_ptr(),
                );
            }
            wide.manager = Some(manager);
        }

        wide
    }

    /// Returns reference to the held value without type checking.
    ///
    /// # Safety
    ///
    /// The container must hold a value of type `T`.
    ///
    /// # Example
    ///
    /// ```
    /// # use fitted::FixedAny;
    /// let a = FixedAny::<16>::from_value(42u32);
    ///
    /// unsafe {
    ///    assert_eq!(a.downcast_ref_unchecked::<u32>(), &42);
    /// }
    /// ```
    #[inline]
    pub unsafe fn downcast_ref_unchecked<T>(&self) -> &T
    where
        T: 'static,
    {
        debug_assert!(self.is::<T>());
        unsafe { self.storage.as_ref::<T>().assume_init_ref() }
    }

    /// Returns mutable reference to the held value without type checking.
    ///
    /// # Safety
    ///
    /// The container must hold a value of type `T`.
    #[inline]
    pub unsafe fn downcast_mut_unchecked<T>(&mut self) -> &mut T
    where
        T: 'static,
    {
        debug_assert!(self.is::<T>());
        unsafe { self.storage.as_mut::<T>().assume_init_mut() }
    }

    /// Pointer to the held value, for callers that recorded its type elsewhere.
    #[inline]
    pub(crate) fn payload_mut_ptr(&mut self) -> *mut u8 {
        self.storage.as_mut_ptr()
    }
}

/// Returns a reference to the value held by `any` if it is of type `T`.
///
/// Accepts an optional container, so an absent container behaves like an empty one.
///
/// # Example
///
/// ```
/// # use fitted::{any_cast, FixedAny};
/// let a = FixedAny::<16>::from_value(42u32);
/// assert_eq!(any_cast::<u32, 16, 16>(Some(&a)), Some(&42));
/// assert_eq!(any_cast::<u8, 16, 16>(Some(&a)), None);
/// assert_eq!(any_cast::<u32, 16, 16>(None), None);
/// ```
#[inline]
pub fn any_cast<T, const SIZE: usize, const ALIGN: usize>(
    any: Option<&FixedAny<SIZE, ALIGN>>,
) -> Option<&T>
where
    T: 'static,
    Align<ALIGN>: Alignment,
{
    any.and_then(|any| any.downcast_ref::<T>())
}

/// Returns a mutable reference to the value held by `any` if it is of type `T`.
#[inline]
pub fn any_cast_mut<T, const SIZE: usize, const ALIGN: usize>(
    any: Option<&mut FixedAny<SIZE, ALIGN>>,
) -> Option<&mut T>
where
    T: 'static,
    Align<ALIGN>: Alignment,
{
    any.and_then(|any| any.downcast_mut::<T>())
}

/// Constructs a [`FixedAny`] already holding the value returned by `init`.
///
/// Capacity is chosen by the caller. For a container sized exactly for `T`,
/// use [`fitted_any!`](crate::fitted_any) with [`FixedAny::in_place`].
///
/// # Example
///
/// ```
/// # use fitted::{fitted_any, make_any};
/// let a = make_any::<u64, 8, 8>(|| 5);
/// assert_eq!(a.downcast_ref::<u64>(), Some(&5));
///
/// let b = <fitted_any!([u16; 3])>::in_place(|| [1u16, 2, 3]);
/// assert_eq!(b.downcast_ref::<[u16; 3]>(), Some(&[1, 2, 3]));
/// ```
#[inline]
pub fn make_any<T, const SIZE: usize, const ALIGN: usize>(
    init: impl FnOnce() -> T,
) -> FixedAny<SIZE, ALIGN>
where
    T: Clone + 'static,
    Align<ALIGN>: Alignment,
{
    FixedAny::in_place(init)
}
