use core::{fmt, mem};

use crate::{
    any::FixedAny,
    error::Error,
    storage::{Align, Alignment, DEFAULT_ALIGN},
};

mod sealed {
    pub trait Sealed {}

    pub trait SealedCallable<Sig> {}
}

/// Call signature of a [`FixedFn`], written as a function pointer type such as `fn(u32, &'static str) -> bool`.
///
/// Implemented for function pointer types with up to six arguments.
///
/// Argument and output types must be concrete. Higher-ranked signatures such as
/// `fn(&str) -> usize` are not supported, use `fn(&'static str) -> usize` or owned arguments.
///
/// ```
/// # use fitted::FixedFn;
/// let mut len = FixedFn::<fn(&'static str) -> usize, 8>::from_fn(|s: &'static str| s.len());
/// assert_eq!(len.call("four"), 4);
/// ```
pub trait Signature: sealed::Sealed {
    /// Type-erased call entry point for this signature.
    #[doc(hidden)]
    type Invoker: Copy;
}

/// Values that can be stored in a [`FixedFn`] with signature `Sig`.
///
/// Implemented for every `FnMut` with matching arguments and output that is also `Clone + 'static`.
/// The trait is sealed, the call entry point is always derived from the `FnMut` impl.
///
/// ```compile_fail
/// #[derive(Clone)]
/// struct Fake(u8);
///
/// impl fitted::Callable<fn() -> u64> for Fake {
///     fn invoker() -> unsafe fn(*mut u8) -> u64 {
///         unsafe fn read(ptr: *mut u8) -> u64 {
///             unsafe { ptr.cast::<u64>().read() }
///         }
///         read
///     }
/// }
/// ```
pub trait Callable<Sig: Signature>: sealed::SealedCallable<Sig> + Clone + 'static {
    /// Returns the call entry point for `Self`.
    #[doc(hidden)]
    fn invoker() -> Sig::Invoker;
}

/// Callable with a fixed signature, stored inline in a [`FixedAny`].
///
/// Closures are kept in the inline storage instead of being boxed,
/// so capturing closures are supported as long as their captures fit.
/// Closure arguments need type annotations, the signature does not drive closure inference.
///
/// # Example
///
/// ```
/// # use fitted::FixedFn;
/// let base = 40u32;
/// let mut f = FixedFn::<fn(u32) -> u32, 16>::from_fn(move |x: u32| base + x);
/// assert!(f.is_callable());
/// assert_eq!(f.call(2), 42);
///
/// f.reset();
/// assert!(!f.is_callable());
/// assert!(f.try_call(2).is_err());
/// ```
pub struct FixedFn<Sig, const SIZE: usize, const ALIGN: usize = DEFAULT_ALIGN>
where
    Sig: Signature,
    Align<ALIGN>: Alignment,
{
    func: FixedAny<SIZE, ALIGN>,
    invoke: Option<Sig::Invoker>,
}

impl<Sig, const SIZE: usize, const ALIGN: usize> Default for FixedFn<Sig, SIZE, ALIGN>
where
    Sig: Signature,
    Align<ALIGN>: Alignment,
{
    #[inline(always)]
    fn default() -> Self {
        FixedFn::new()
    }
}

impl<Sig, const SIZE: usize, const ALIGN: usize> Clone for FixedFn<Sig, SIZE, ALIGN>
where
    Sig: Signature,
    Align<ALIGN>: Alignment,
{
    #[inline]
    fn clone(&self) -> Self {
        FixedFn {
            func: self.func.clone(),
            invoke: self.invoke,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.invoke = None;
        self.func.clone_from(&source.func);
        self.invoke = source.invoke;
    }
}

impl<Sig, const SIZE: usize, const ALIGN: usize> fmt::Debug for FixedFn<Sig, SIZE, ALIGN>
where
    Sig: Signature,
    Align<ALIGN>: Alignment,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedFn")
            .field("signature", &core::any::type_name::<Sig>())
            .field("func", &self.func.type_name())
            .finish()
    }
}

impl<Sig, const SIZE: usize, const ALIGN: usize> FixedFn<Sig, SIZE, ALIGN>
where
    Sig: Signature,
    Align<ALIGN>: Alignment,
{
    /// Construct new [`FixedFn`] that holds no function.
    #[inline]
    pub const fn new() -> Self {
        FixedFn {
            func: FixedAny::new(),
            invoke: None,
        }
    }

    /// Construct new [`FixedFn`] holding `func`.
    ///
    /// Fails to compile if `func` does not fit the inline storage.
    #[inline]
    pub fn from_fn<F>(func: F) -> Self
    where
        F: Callable<Sig>,
    {
        let mut wrapper = FixedFn::new();
        wrapper.set(func);
        wrapper
    }

    /// Replaces the held function with `func`.
    pub fn set<F>(&mut self, func: F)
    where
        F: Callable<Sig>,
    {
        self.invoke = None;
        self.func.emplace(func);
        self.invoke = Some(F::invoker());
    }

    /// Drops the held function, leaving the wrapper not callable.
    #[inline]
    pub fn reset(&mut self) {
        self.invoke = None;
        self.func.reset();
    }

    /// Returns `true` if a function is held.
    #[inline]
    pub fn is_callable(&self) -> bool {
        self.invoke.is_some()
    }

    /// Moves the held function into a new wrapper, leaving this one not callable.
    #[inline]
    pub fn take(&mut self) -> Self {
        mem::replace(self, FixedFn::new())
    }

    /// Exchanges the held functions of two wrappers.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }
}

macro_rules! impl_signature {
    ($($arg:ident: $A:ident),*) => {
        impl<R, $($A),*> sealed::Sealed for fn($($A),*) -> R {}

        impl<R, $($A),*> Signature for fn($($A),*) -> R {
            type Invoker = unsafe fn(*mut u8, $($A),*) -> R;
        }

        impl<F, R, $($A),*> sealed::SealedCallable<fn($($A),*) -> R> for F
        where
            F: FnMut($($A),*) -> R,
        {
        }

        impl<F, R, $($A),*> Callable<fn($($A),*) -> R> for F
        where
            F: FnMut($($A),*) -> R + Clone + 'static,
        {
            fn invoker() -> unsafe fn(*mut u8, $($A),*) -> R {
                unsafe fn invoke<F, R, $($A),*>(func: *mut u8, $($arg: $A),*) -> R
                where
                    F: FnMut($($A),*) -> R,
                {
                    // Safety: The caller passes storage holding an `F`.
                    let func = unsafe { &mut *func.cast::<F>() };
                    func($($arg),*)
                }

                invoke::<F, R, $($A),*>
            }
        }

        impl<R, $($A,)* const SIZE: usize, const ALIGN: usize> FixedFn<fn($($A),*) -> R, SIZE, ALIGN>
        where
            Align<ALIGN>: Alignment,
        {
            /// Calls the held function.
            ///
            /// # Panics
            ///
            /// Panics if no function is held. See [`FixedFn::try_call`] for the checked form.
            #[inline]
            pub fn call(&mut self, $($arg: $A),*) -> R {
                match self.try_call($($arg),*) {
                    Ok(output) => output,
                    Err(err) => panic!("{err}"),
                }
            }

            /// Calls the held function, or returns [`Error::NotCallable`] if there is none.
            #[inline]
            pub fn try_call(&mut self, $($arg: $A),*) -> Result<R, Error> {
                let invoke = self.invoke.ok_or(Error::NotCallable)?;

                // Safety: `invoke` was produced for the type held by `func`, they are always replaced together.
                Ok(unsafe { invoke(self.func.payload_mut_ptr(), $($arg),*) })
            }
        }
    };
}

impl_signature!();
impl_signature!(a0: A0);
impl_signature!(a0: A0, a1: A1);
impl_signature!(a0: A0, a1: A1, a2: A2);
impl_signature!(a0: A0, a1: A1, a2: A2, a3: A3);
impl_signature!(a0: A0, a1: A1, a2: A2, a3: A3, a4: A4);
impl_signature!(a0: A0, a1: A1, a2: A2, a3: A3, a4: A4, a5: A5);
