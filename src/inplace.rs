use core::{fmt, marker::PhantomData, mem, ptr};

use crate::{
    error::Error,
    rtti::TypeKey,
    storage::{Align, Alignment, InlineStorage, DEFAULT_ALIGN},
};

/// Lifetime operations of a value living in raw storage, dispatched through a vtable.
///
/// Dropping goes through the `dyn Holder` drop glue.
trait Holder {
    /// Clones the held value into uninitialized `dst`.
    unsafe fn clone_into(&self, dst: *mut u8);

    /// Moves the held value into uninitialized `dst`.
    /// `self` is logically uninitialized afterwards.
    unsafe fn move_into(&mut self, dst: *mut u8);
}

#[repr(transparent)]
struct Held<T> {
    held: T,
}

impl<T> Holder for Held<T>
where
    T: Clone,
{
    unsafe fn clone_into(&self, dst: *mut u8) {
        let held = self.held.clone();
        unsafe { dst.cast::<Held<T>>().write(Held { held }) }
    }

    unsafe fn move_into(&mut self, dst: *mut u8) {
        unsafe { dst.cast::<Held<T>>().write(ptr::read(self)) }
    }
}

/// Re-attaches the vtable of `Held<T>` to storage holding one.
fn holder_of<T>(ptr: *mut u8) -> *mut dyn Holder
where
    T: Clone + 'static,
{
    ptr.cast::<Held<T>>()
}

/// What an occupied [`InplaceAny`] knows about its value.
///
/// The vtable is recovered per call through `holder`,
/// since a fat pointer into the storage would dangle once the container moves.
#[derive(Clone, Copy)]
struct Slot {
    key: TypeKey,
    holder: fn(*mut u8) -> *mut dyn Holder,
}

impl Slot {
    fn of<T>() -> Self
    where
        T: Clone + 'static,
    {
        Slot {
            key: TypeKey::of::<T>(),
            holder: holder_of::<T>,
        }
    }
}

/// Type-erased container with fixed-size inline storage and virtual dispatch.
///
/// Same contract as [`FixedAny`](crate::FixedAny), but lifetime operations go through
/// a `dyn` vtable and reference extraction reports [`Error::BadCast`] on mismatch.
///
/// # Example
///
/// ```
/// # use fitted::{Error, InplaceAny};
/// let mut a = InplaceAny::<16>::from_value(42u64);
/// assert!(a.is_valid());
/// assert_eq!(a.cast_ref::<u64>(), Ok(&42));
/// assert!(matches!(a.cast_ref::<u32>(), Err(Error::BadCast { .. })));
///
/// a.reset();
/// assert!(!a.is_valid());
/// assert_eq!(a.downcast_ref::<u64>(), None);
/// ```
pub struct InplaceAny<const SIZE: usize, const ALIGN: usize = DEFAULT_ALIGN>
where
    Align<ALIGN>: Alignment,
{
    slot: Option<Slot>,
    storage: InlineStorage<SIZE, ALIGN>,
    unsend: PhantomData<*mut u8>,
}

impl<const SIZE: usize, const ALIGN: usize> Drop for InplaceAny<SIZE, ALIGN>
where
    Align<ALIGN>: Alignment,
{
    #[inline(always)]
    fn drop(&mut self) {
        self.reset();
    }
}

impl<const SIZE: usize, const ALIGN: usize> Default for InplaceAny<SIZE, ALIGN>
where
    Align<ALIGN>: Alignment,
{
    #[inline(always)]
    fn default() -> Self {
        InplaceAny::new()
    }
}

impl<const SIZE: usize, const ALIGN: usize> Clone for InplaceAny<SIZE, ALIGN>
where
    Align<ALIGN>: Alignment,
{
    #[inline]
    fn clone(&self) -> Self {
        self.widen_clone()
    }

    fn clone_from(&mut self, source: &Self) {
        self.reset();

        if let Some(slot) = source.slot {
            // Safety: `source` holds a `Held` of the slot's type, `self` is empty.
            unsafe {
                let holder = (slot.holder)(source.storage.as_ptr().cast_mut());
                (*holder).clone_into(self.storage.as_mut_ptr());
            }
            self.slot = Some(slot);
        }
    }
}

impl<const SIZE: usize, const ALIGN: usize> fmt::Debug for InplaceAny<SIZE, ALIGN>
where
    Align<ALIGN>: Alignment,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InplaceAny")
            .field("size", &SIZE)
            .field("align", &ALIGN)
            .field("type", &self.type_key())
            .finish()
    }
}

impl<const SIZE: usize, const ALIGN: usize> InplaceAny<SIZE, ALIGN>
where
    Align<ALIGN>: Alignment,
{
    /// Construct new empty [`InplaceAny`].
    #[inline]
    pub const fn new() -> Self {
        InplaceAny {
            slot: None,
            storage: InlineStorage::new(),
            unsend: PhantomData,
        }
    }

    /// Construct new [`InplaceAny`] holding the given value.
    #[inline]
    pub fn from_value<T>(value: T) -> Self
    where
        T: Clone + 'static,
    {
        let mut any = InplaceAny::new();
        any.emplace(value);
        any
    }

    /// Replaces the held value with `value` and returns a reference to it.
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
    pub fn emplace_with<T>(&mut self, init: impl FnOnce() -> T) -> &mut T
    where
        T: Clone + 'static,
    {
        const {
            assert!(
                core::mem::size_of::<Held<T>>() <= SIZE,
                "insufficient size for the stored type"
            );
            assert!(
                ALIGN % core::mem::align_of::<Held<T>>() == 0,
                "alignment of the stored type does not divide the container alignment"
            );
        }

        self.reset();

        trace!(
            type_name = core::any::type_name::<T>(),
            size = SIZE,
            align = ALIGN,
            "emplace into InplaceAny"
        );

        let held = self.storage.as_mut::<Held<T>>().write(Held { held: init() });
        self.slot = Some(Slot::of::<T>());
        &mut held.held
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
    pub fn reset(&mut self) {
        if let Some(slot) = self.slot.take() {
            trace!(type_name = slot.key.name(), "reset InplaceAny");

            // Safety: The storage holds a `Held` of the slot's type, and the slot is already detached.
            unsafe { ptr::drop_in_place((slot.holder)(self.storage.as_mut_ptr())) }
        }
    }

    /// Returns `true` if the container holds a value.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.slot.is_some()
    }

    /// Returns the key of the held type, or `None` when empty.
    ///
    /// # Example
    ///
    /// ```
    /// # use fitted::{InplaceAny, TypeKey};
    /// let a = InplaceAny::<16>::from_value('x');
    /// assert_eq!(a.type_key(), Some(TypeKey::of::<char>()));
    /// ```
    #[inline]
    pub fn type_key(&self) -> Option<TypeKey> {
        self.slot.map(|slot| slot.key)
    }

    /// Returns `true` if the held value is of type `T`.
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
            // Safety: The storage holds a `Held<T>`.
            Some(unsafe { &self.storage.as_ref::<Held<T>>().assume_init_ref().held })
        } else {
            None
        }
    }

    /// Returns some mutable reference to the held value if it is of type `T`.
    /// Otherwise returns none.
    #[inline]
    pub fn downcast_mut<T>(&mut self) -> Option<&mut T>
    where
        T: 'static,
    {
        if self.is::<T>() {
            // Safety: The storage holds a `Held<T>`.
            Some(unsafe { &mut self.storage.as_mut::<Held<T>>().assume_init_mut().held })
        } else {
            None
        }
    }

    /// Returns reference to the held value, or [`Error::BadCast`] if it is not of type `T`.
    pub fn cast_ref<T>(&self) -> Result<&T, Error>
    where
        T: 'static,
    {
        let found = self.type_key().map(|key| key.name());
        self.downcast_ref::<T>().ok_or(Error::BadCast {
            requested: core::any::type_name::<T>(),
            found,
        })
    }

    /// Returns mutable reference to the held value, or [`Error::BadCast`] if it is not of type `T`.
    ///
    /// # Example
    ///
    /// ```
    /// # use fitted::InplaceAny;
    /// let mut a = InplaceAny::<16>::from_value(1u32);
    /// *a.cast_mut::<u32>().unwrap() += 1;
    /// assert_eq!(a.cast_ref::<u32>(), Ok(&2));
    /// assert!(a.cast_mut::<i64>().is_err());
    /// ```
    pub fn cast_mut<T>(&mut self) -> Result<&mut T, Error>
    where
        T: 'static,
    {
        let found = self.type_key().map(|key| key.name());
        self.downcast_mut::<T>().ok_or(Error::BadCast {
            requested: core::any::type_name::<T>(),
            found,
        })
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

        self.slot = None;

        // Safety: The storage held a `Held<T>` and the slot was detached, so it is read exactly once.
        Some(unsafe { self.storage.as_ref::<Held<T>>().assume_init_read().held })
    }

    /// Moves the content into a new container, leaving this one empty.
    #[inline]
    pub fn take(&mut self) -> Self {
        mem::replace(self, InplaceAny::new())
    }

    /// Exchanges the contents of two containers.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Moves the content into a container with at least the same capacity and alignment.
    ///
    /// # Example
    ///
    /// ```
    /// # use fitted::InplaceAny;
    /// let small = InplaceAny::<8, 8>::from_value(3u64);
    /// let large: InplaceAny<64, 16> = small.widen();
    /// assert_eq!(large.downcast_ref::<u64>(), Some(&3));
    /// ```
    pub fn widen<const WIDE_SIZE: usize, const WIDE_ALIGN: usize>(
        mut self,
    ) -> InplaceAny<WIDE_SIZE, WIDE_ALIGN>
    where
        Align<WIDE_ALIGN>: Alignment,
    {
        const {
            assert!(SIZE <= WIDE_SIZE, "insufficient size");
            assert!(ALIGN <= WIDE_ALIGN, "insufficient alignment");
        }

        let mut wide = InplaceAny::new();

        if let Some(slot) = self.slot.take() {
            trace!(
                type_name = slot.key.name(),
                from = SIZE,
                to = WIDE_SIZE,
                "widen InplaceAny"
            );

            // Safety: `self` held a `Held` of the slot's type and forgets it,
            // `wide` is empty and at least as large and aligned.
            unsafe {
                let holder = (slot.holder)(self.storage.as_mut_ptr());
                (*holder).move_into(wide.storage.as_mut_ptr());
            }
            wide.slot = Some(slot);
        }

        wide
    }

    /// Clones the content into a container with at least the same capacity and alignment.
    pub fn widen_clone<const WIDE_SIZE: usize, const WIDE_ALIGN: usize>(
        &self,
    ) -> InplaceAny<WIDE_SIZE, WIDE_ALIGN>
    where
        Align<WIDE_ALIGN>: Alignment,
    {
        const {
            assert!(SIZE <= WIDE_SIZE, "insufficient size");
            assert!(ALIGN <= WIDE_ALIGN, "insufficient alignment");
        }

        let mut wide = InplaceAny::new();

        if let Some(slot) = self.slot {
            // Safety: Same as `widen`, the source value is cloned instead of moved.
            unsafe {
                let holder = (slot.holder)(self.storage.as_ptr().cast_mut());
                (*holder).clone_into(wide.storage.as_mut_ptr());
            }
            wide.slot = Some(slot);
        }

        wide
    }
}
