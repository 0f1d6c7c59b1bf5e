use core::mem::{align_of, size_of, MaybeUninit};

/// Alignment used when a container does not name one.
///
/// Matches the alignment of `max_align_t` on common 64-bit targets.
pub const DEFAULT_ALIGN: usize = 16;

/// Type-level carrier for an alignment value.
///
/// Only powers of two from 1 to 4096 implement [`Alignment`].
pub struct Align<const N: usize>;

/// Maps [`Align<N>`] to a zero-sized type aligned to `N`.
///
/// # Safety
///
/// `Archetype` must be zero-sized and have alignment exactly `N`.
pub unsafe trait Alignment {
    #[doc(hidden)]
    type Archetype: Copy;
}

#[doc(hidden)]
pub mod archetype {
    macro_rules! impl_alignment {
        ($($n:literal => $name:ident),* $(,)?) => {
            $(
                #[derive(Clone, Copy)]
                #[repr(align($n))]
                pub struct $name;

                unsafe impl super::Alignment for super::Align<$n> {
                    type Archetype = $name;
                }
            )*
        };
    }

    impl_alignment! {
        1 => Align1,
        2 => Align2,
        4 => Align4,
        8 => Align8,
        16 => Align16,
        32 => Align32,
        64 => Align64,
        128 => Align128,
        256 => Align256,
        512 => Align512,
        1024 => Align1024,
        2048 => Align2048,
        4096 => Align4096,
    }
}

/// Storage that can hold any value of at most `SIZE` bytes whose alignment divides `ALIGN`.
pub(crate) struct InlineStorage<const SIZE: usize, const ALIGN: usize>
where
    Align<ALIGN>: Alignment,
{
    _align: [<Align<ALIGN> as Alignment>::Archetype; 0],
    storage: MaybeUninit<[u8; SIZE]>,
}

impl<const SIZE: usize, const ALIGN: usize> InlineStorage<SIZE, ALIGN>
where
    Align<ALIGN>: Alignment,
{
    /// Construct new storage without initializing any value in it.
    pub const fn new() -> Self {
        InlineStorage {
            _align: [],
            storage: MaybeUninit::uninit(),
        }
    }

    /// Returns `true` if the type `T` fits into the storage.
    pub const fn fits<T>() -> bool {
        size_of::<T>() <= SIZE && ALIGN % align_of::<T>() == 0
    }

    /// Pointer to the first byte of the storage.
    pub fn as_ptr(&self) -> *const u8 {
        self.storage.as_ptr().cast()
    }

    /// Mutable pointer to the first byte of the storage.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.storage.as_mut_ptr().cast()
    }

    /// Returns reference to the potentially uninitialized value.
    ///
    /// The caller is responsible to ensure that the type is correct and the value is initialized before accessing it.
    pub fn as_ref<T>(&self) -> &MaybeUninit<T> {
        debug_assert!(Self::fits::<T>());

        // Safety: Callers only name types that passed the `fits` check at construction.
        unsafe { &*self.storage.as_ptr().cast() }
    }

    /// Returns mutable reference to the potentially uninitialized value.
    ///
    /// The caller is responsible to ensure that the type is correct and the value is initialized before accessing it.
    pub fn as_mut<T>(&mut self) -> &mut MaybeUninit<T> {
        debug_assert!(Self::fits::<T>());

        // Safety: Callers only name types that passed the `fits` check at construction.
        unsafe { &mut *self.storage.as_mut_ptr().cast() }
    }
}
