use core::{
    any::{type_name, TypeId},
    fmt,
    hash::{Hash, Hasher},
};

/// Run-time identity of a stored type.
///
/// Keys are generated by the compiler for every `'static` type, so storable types
/// need no registration and two distinct types never share a key.
/// Equality and hashing only look at the [`TypeId`]; the name is carried for diagnostics.
///
/// # Example
///
/// ```
/// # use fitted::TypeKey;
/// assert_eq!(TypeKey::of::<u32>(), TypeKey::of::<u32>());
/// assert_ne!(TypeKey::of::<u32>(), TypeKey::of::<i32>());
/// assert_eq!(TypeKey::of::<u32>().name(), "u32");
/// ```
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Returns the key of type `T`.
    #[inline]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        TypeKey {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Returns the [`TypeId`] behind this key.
    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the name of the type, as reported by [`core::any::type_name`].
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeKey").field(&self.name).finish()
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
