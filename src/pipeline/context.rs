use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Typed token identifying one slot in a [`Context`].
///
/// Implementors are zero-sized marker types; the associated `Value` is what
/// actually gets stored. Keying by token type instead of by string means a
/// middleware cannot clobber another's state by accident, and readers get the
/// concrete type back without downcasting at the call site.
///
/// ```
/// use switchyard::pipeline::{Context, ContextKey};
///
/// struct AuthenticatedUser;
/// impl ContextKey for AuthenticatedUser {
///     type Value = String;
/// }
///
/// let mut ctx = Context::new();
/// ctx.insert::<AuthenticatedUser>("alice".to_string());
/// assert_eq!(ctx.get::<AuthenticatedUser>().map(String::as_str), Some("alice"));
/// ```
pub trait ContextKey: 'static {
    type Value: Send + Sync + 'static;
}

/// Per-request key→value bag shared by reference across the whole pipeline.
///
/// Created empty at the start of each top-level dispatch and dropped when it
/// returns. No locking: the dispatch algorithm guarantees exactly one logical
/// execution is ever active against a given `Context`.
#[derive(Default)]
pub struct Context {
    slots: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under `K`, returning the previous value if the slot was
    /// already occupied.
    pub fn insert<K: ContextKey>(&mut self, value: K::Value) -> Option<K::Value> {
        self.slots
            .insert(TypeId::of::<K>(), Box::new(value))
            .and_then(|old| old.downcast::<K::Value>().ok())
            .map(|boxed| *boxed)
    }

    #[must_use]
    pub fn get<K: ContextKey>(&self) -> Option<&K::Value> {
        self.slots
            .get(&TypeId::of::<K>())
            .and_then(|v| v.downcast_ref::<K::Value>())
    }

    pub fn get_mut<K: ContextKey>(&mut self) -> Option<&mut K::Value> {
        self.slots
            .get_mut(&TypeId::of::<K>())
            .and_then(|v| v.downcast_mut::<K::Value>())
    }

    pub fn remove<K: ContextKey>(&mut self) -> Option<K::Value> {
        self.slots
            .remove(&TypeId::of::<K>())
            .and_then(|old| old.downcast::<K::Value>().ok())
            .map(|boxed| *boxed)
    }

    #[must_use]
    pub fn contains<K: ContextKey>(&self) -> bool {
        self.slots.contains_key(&TypeId::of::<K>())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("slots", &self.slots.len())
            .finish()
    }
}
