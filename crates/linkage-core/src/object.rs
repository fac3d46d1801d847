//! Type-erased handle to a domain object

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A shared, type-erased domain object
///
/// Schemas are looked up by the runtime type of the wrapped value, so any
/// `Send + Sync + 'static` type can be encoded without implementing a trait.
#[derive(Clone)]
pub struct Object {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Object {
    /// Wrap an owned value
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wrap an already shared value without copying it
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            value,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Runtime type of the wrapped value
    pub fn value_type_id(&self) -> TypeId {
        (*self.value).type_id()
    }

    /// Rust type name of the wrapped value, used in error messages
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.value).downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        (*self.value).is::<T>()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({})", self.type_name)
    }
}

impl<T: Any + Send + Sync> From<Arc<T>> for Object {
    fn from(value: Arc<T>) -> Self {
        Self::from_arc(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget(u32);

    #[test]
    fn test_downcast() {
        let object = Object::new(Widget(7));
        assert!(object.is::<Widget>());
        assert_eq!(object.downcast_ref::<Widget>().map(|w| w.0), Some(7));
        assert!(object.downcast_ref::<String>().is_none());
    }

    #[test]
    fn test_type_id_is_of_wrapped_value() {
        let object = Object::from_arc(Arc::new(Widget(1)));
        assert_eq!(object.value_type_id(), TypeId::of::<Widget>());
        assert!(object.type_name().ends_with("Widget"));
    }
}
