//! Model types: nominal wrappers around host objects.
//!
//! The evaluator knows nothing about the objects a host exposes (devices,
//! nets, footprints). A host describes one kind of object with a
//! [`ModelBehavior`] and registers it as a [`ModelType`]; every
//! `ModelType::new` call mints a fresh identity, so two model types are equal
//! only when they are the same registration.

use crate::types::{Signature, Type};
use crate::value::Value;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a model type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(u64);

/// Host-supplied behavior of a model type.
pub trait ModelBehavior: Send + Sync {
    /// Type of attribute `name`, if the model has it.
    fn attr_type(&self, name: &str) -> Option<Type>;

    /// Value of attribute `name` on one object.
    fn attr(&self, object: &ModelRef, name: &str) -> Option<Value>;

    fn attr_names(&self) -> Vec<String>;

    /// Signature when objects of this model can be called.
    fn call_signature(&self) -> Option<Signature> {
        None
    }

    fn call(&self, _object: &ModelRef, _args: &[Value]) -> Result<Value, String> {
        Err("model is not callable".to_string())
    }
}

/// A nominal model type.
#[derive(Clone)]
pub struct ModelType {
    id: ModelId,
    name: Arc<str>,
    behavior: Arc<dyn ModelBehavior>,
    callable: Option<Arc<ModelCallable>>,
}

/// Callable façade of a model type whose behavior exposes a signature.
pub struct ModelCallable {
    pub(crate) signature: Signature,
    pub(crate) behavior: Arc<dyn ModelBehavior>,
}

impl ModelType {
    pub fn new(name: impl Into<Arc<str>>, behavior: impl ModelBehavior + 'static) -> Self {
        let behavior: Arc<dyn ModelBehavior> = Arc::new(behavior);
        let callable = behavior.call_signature().map(|signature| {
            Arc::new(ModelCallable {
                signature,
                behavior: Arc::clone(&behavior),
            })
        });
        Self {
            id: ModelId(NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            behavior,
            callable,
        }
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn behavior(&self) -> &dyn ModelBehavior {
        self.behavior.as_ref()
    }

    pub(crate) fn callable(&self) -> Option<&dyn crate::capability::Callable> {
        self.callable
            .as_deref()
            .map(|callable| callable as &dyn crate::capability::Callable)
    }
}

impl PartialEq for ModelType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ModelType {}

impl fmt::Debug for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModelType({}#{})", self.name, self.id.0)
    }
}

/// Shared handle to one host object.
#[derive(Clone)]
pub struct ModelRef(Arc<dyn Any + Send + Sync>);

impl ModelRef {
    pub fn new<T: Any + Send + Sync>(object: T) -> Self {
        Self(Arc::new(object))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Same underlying object.
    pub fn ptr_eq(&self, other: &ModelRef) -> bool {
        Arc::as_ptr(&self.0) as *const () == Arc::as_ptr(&other.0) as *const ()
    }
}

impl fmt::Debug for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModelRef({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Empty;

    impl ModelBehavior for Empty {
        fn attr_type(&self, _name: &str) -> Option<Type> {
            None
        }

        fn attr(&self, _object: &ModelRef, _name: &str) -> Option<Value> {
            None
        }

        fn attr_names(&self) -> Vec<String> {
            Vec::new()
        }
    }

    #[test]
    fn test_nominal_identity() {
        let a = ModelType::new("Net", Empty);
        let b = ModelType::new("Net", Empty);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_model_ref_identity() {
        let first = ModelRef::new(42_u32);
        let alias = first.clone();
        let other = ModelRef::new(42_u32);
        assert!(first.ptr_eq(&alias));
        assert!(!first.ptr_eq(&other));
        assert_eq!(first.downcast_ref::<u32>(), Some(&42));
        assert_eq!(first.downcast_ref::<i64>(), None);
    }

    #[test]
    fn test_not_callable_without_signature() {
        let model = ModelType::new("Net", Empty);
        assert!(model.callable().is_none());
        assert!(Type::Model(model).callable().is_none());
    }
}
