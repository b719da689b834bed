//! Identity-keyed private data.
//!
//! Auxiliary state attached to one invocation that is not visible through
//! the standard invocation fields. Keys are compared by identity, never by
//! value:
//!
//! - [`PrivateKey::Type`] is keyed by [`TypeId`]. Values stored under it must
//!   be of that exact type.
//! - [`PrivateKey::Object`] is keyed by the allocation an [`ObjectKey`] holds.
//!   Two keys wrapping equal values in different allocations are different
//!   keys.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::errors::{InvocationError, Result};

/// Opaque shared reference carried by the engine but never interpreted.
pub type Opaque = Arc<dyn Any + Send + Sync>;

/// Identity token for an arbitrary object.
///
/// Holds the object alive so its address stays unique while the key exists.
/// Clones share the identity of the original.
#[derive(Clone)]
pub struct ObjectKey {
    object: Opaque,
}

impl ObjectKey {
    /// Allocate a fresh identity around `object`.
    pub fn new<T: Any + Send + Sync>(object: T) -> Self {
        Self {
            object: Arc::new(object),
        }
    }

    /// Use an existing shared object as the identity.
    #[must_use]
    pub fn from_arc(object: Opaque) -> Self {
        Self { object }
    }

    /// The object this key was built from.
    #[must_use]
    pub fn object(&self) -> &Opaque {
        &self.object
    }

    fn address(&self) -> usize {
        Arc::as_ptr(&self.object).cast::<()>() as usize
    }
}

impl PartialEq for ObjectKey {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl Eq for ObjectKey {}

impl Hash for ObjectKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

impl fmt::Debug for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectKey({:#x})", self.address())
    }
}

/// Key into [`PrivateData`].
#[derive(Clone)]
pub enum PrivateKey {
    /// Keyed by a type. Values must be of exactly this type.
    Type {
        /// Identity of the type.
        id: TypeId,
        /// Type name, for diagnostics only.
        name: &'static str,
    },
    /// Keyed by object identity.
    Object(ObjectKey),
}

impl PrivateKey {
    /// Key for the type `T`.
    #[must_use]
    pub fn of<T: Any>() -> Self {
        Self::Type {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Key for a fresh object identity.
    pub fn object<T: Any + Send + Sync>(object: T) -> Self {
        Self::Object(ObjectKey::new(object))
    }
}

impl From<ObjectKey> for PrivateKey {
    fn from(key: ObjectKey) -> Self {
        Self::Object(key)
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Type { id: a, .. }, Self::Type { id: b, .. }) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for PrivateKey {}

impl Hash for PrivateKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Type { id, .. } => {
                0u8.hash(state);
                id.hash(state);
            }
            Self::Object(key) => {
                1u8.hash(state);
                key.hash(state);
            }
        }
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type { name, .. } => write!(f, "Type({name})"),
            Self::Object(key) => key.fmt(f),
        }
    }
}

/// Identity-keyed store of auxiliary invocation data.
///
/// Cloning copies the entries; the stored values themselves are shared.
#[derive(Clone, Default)]
pub struct PrivateData {
    entries: HashMap<PrivateKey, Opaque>,
}

impl PrivateData {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &PrivateKey) -> Option<Opaque> {
        self.entries.get(key).cloned()
    }

    /// Store `value` under `key`, or remove the entry when `value` is `None`.
    ///
    /// Returns the previously stored value. For a type key, a value of any
    /// other type is rejected with [`InvocationError::TypeMismatch`] and the
    /// store is left unchanged.
    pub fn put(&mut self, key: PrivateKey, value: Option<Opaque>) -> Result<Option<Opaque>> {
        let Some(value) = value else {
            return Ok(self.entries.remove(&key));
        };
        if let PrivateKey::Type { id, name } = &key {
            let found = (*value).type_id();
            if found != *id {
                return Err(InvocationError::TypeMismatch {
                    expected: *name,
                    found,
                });
            }
        }
        Ok(self.entries.insert(key, value))
    }

    /// Look up the value stored under the type key for `T`.
    #[must_use]
    pub fn get_typed<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.get(&PrivateKey::of::<T>())
            .and_then(|value| value.downcast::<T>().ok())
    }

    /// Store `value` under the type key for `T`, or remove it when `None`.
    pub fn put_typed<T: Any + Send + Sync>(&mut self, value: Option<T>) -> Option<Arc<T>> {
        let key = PrivateKey::of::<T>();
        let previous = match value {
            Some(value) => self.entries.insert(key, Arc::new(value)),
            None => self.entries.remove(&key),
        };
        previous.and_then(|value| value.downcast::<T>().ok())
    }

    /// Whether an entry exists for `key`.
    #[must_use]
    pub fn contains(&self, key: &PrivateKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for PrivateData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[derive(Debug, PartialEq)]
    struct Principal(String);

    #[test]
    fn typed_put_then_get() {
        let mut data = PrivateData::new();
        assert!(data.put_typed(Some(Principal("alice".into()))).is_none());
        let got = data.get_typed::<Principal>().unwrap();
        assert_eq!(*got, Principal("alice".into()));
    }

    #[test]
    fn typed_put_none_removes_and_returns_previous() {
        let mut data = PrivateData::new();
        let _ = data.put_typed(Some(7u32));
        let previous = data.put_typed::<u32>(None);
        assert_eq!(previous.as_deref(), Some(&7));
        assert!(data.get_typed::<u32>().is_none());
        assert!(data.is_empty());
    }

    #[test]
    fn typed_put_replaces() {
        let mut data = PrivateData::new();
        let _ = data.put_typed(Some(1u32));
        let previous = data.put_typed(Some(2u32));
        assert_eq!(previous.as_deref(), Some(&1));
        assert_eq!(data.get_typed::<u32>().as_deref(), Some(&2));
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn remove_missing_returns_none() {
        let mut data = PrivateData::new();
        assert!(data.put(PrivateKey::of::<u8>(), None).unwrap().is_none());
    }

    #[test]
    fn value_equal_object_keys_are_distinct() {
        let mut data = PrivateData::new();
        let first = ObjectKey::new(String::from("key"));
        let second = ObjectKey::new(String::from("key"));
        assert_ne!(first, second);

        let _ = data.put(first.clone().into(), Some(Arc::new(1u32))).unwrap();
        let _ = data.put(second.clone().into(), Some(Arc::new(2u32))).unwrap();
        assert_eq!(data.len(), 2);

        let one = data.get(&first.into()).unwrap().downcast::<u32>().unwrap();
        let two = data.get(&second.into()).unwrap().downcast::<u32>().unwrap();
        assert_eq!((*one, *two), (1, 2));
    }

    #[test]
    fn cloned_object_key_keeps_identity() {
        let mut data = PrivateData::new();
        let key = PrivateKey::object(42u64);
        let _ = data.put(key.clone(), Some(Arc::new("value"))).unwrap();
        assert!(data.contains(&key));
    }

    #[test]
    fn shared_arc_is_same_identity() {
        let shared: Opaque = Arc::new(5i32);
        let a = ObjectKey::from_arc(Arc::clone(&shared));
        let b = ObjectKey::from_arc(shared);
        assert_eq!(a, b);
    }

    #[test]
    fn object_key_values_are_untyped() {
        let mut data = PrivateData::new();
        let key = PrivateKey::object(());
        let _ = data.put(key.clone(), Some(Arc::new(1u8))).unwrap();
        let previous = data.put(key.clone(), Some(Arc::new("text"))).unwrap();
        assert!(previous.unwrap().downcast::<u8>().is_ok());
    }

    #[test]
    fn type_key_rejects_other_types() {
        let mut data = PrivateData::new();
        let result = data.put(PrivateKey::of::<u32>(), Some(Arc::new("nope")));
        assert_matches!(
            result,
            Err(InvocationError::TypeMismatch { expected: "u32", found }) if found == TypeId::of::<&str>()
        );
        assert!(data.is_empty());
    }

    #[test]
    fn type_key_accepts_matching_type() {
        let mut data = PrivateData::new();
        let _ = data.put(PrivateKey::of::<u32>(), Some(Arc::new(9u32))).unwrap();
        assert_eq!(data.get_typed::<u32>().as_deref(), Some(&9));
    }

    #[test]
    fn type_and_object_keys_never_collide() {
        let mut data = PrivateData::new();
        let _ = data.put_typed(Some(1u32));
        let _ = data.put(PrivateKey::object(1u32), Some(Arc::new(2u32))).unwrap();
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn clone_copies_entries() {
        let mut data = PrivateData::new();
        let _ = data.put_typed(Some(1u32));
        let mut copy = data.clone();
        let _ = copy.put_typed(Some(2u32));
        let _ = copy.put_typed(Some(true));
        assert_eq!(data.get_typed::<u32>().as_deref(), Some(&1));
        assert_eq!(data.len(), 1);
        assert_eq!(copy.len(), 2);
    }
}
