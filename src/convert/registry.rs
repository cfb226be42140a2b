use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::bind::{Bindable, Configurable, Node, View};
use crate::convert::ConvertContext;
use crate::error::{BoxError, ValueError};

type TypeFactory = Arc<dyn Fn() -> Box<dyn Configurable> + Send + Sync>;

/// Names that configuration text may use to pick a concrete type.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    factories: IndexMap<SmolStr, TypeFactory>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Configurable + Default>(&mut self, name: &str) -> &mut Self {
        self.factories.insert(
            SmolStr::new(name.trim()),
            Arc::new(|| Box::new(T::default()) as Box<dyn Configurable>),
        );
        self
    }

    pub fn with<T: Configurable + Default>(mut self, name: &str) -> Self {
        self.register::<T>(name);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name.trim())
    }

    /// A fresh default instance of the type registered under `name`.
    pub fn create(&self, name: &str) -> Option<Box<dyn Configurable>> {
        self.factories.get(name.trim()).map(|factory| factory())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(SmolStr::as_str)
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// A member holding the name of a registered type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TypeRef {
    name: SmolStr,
}

impl TypeRef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    pub fn create(&self, types: &TypeRegistry) -> Option<Box<dyn Configurable>> {
        types.create(&self.name)
    }
}

impl Bindable for TypeRef {
    fn assign(&mut self, raw: Option<&str>, cx: &ConvertContext<'_>) -> Result<(), BoxError> {
        let Some(raw) = raw else {
            return Ok(());
        };
        let name = raw.trim();
        if !cx.types().contains(name) {
            return Err(ValueError::UnknownType(name.to_string()).into());
        }
        self.name = SmolStr::new(name);
        Ok(())
    }

    fn view(&self) -> View<'_> {
        if self.name.is_empty() {
            View::Absent
        } else {
            View::Text(self.name.as_str().into())
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A member whose concrete type is chosen by the text.
///
/// `animal = Dog` instantiates whatever is registered as `Dog`; later keys
/// such as `animal.name` then bind into that instance.
#[derive(Default)]
pub struct Dynamic {
    type_name: Option<SmolStr>,
    object: Option<Box<dyn Configurable>>,
}

impl Dynamic {
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn get(&self) -> Option<&dyn Configurable> {
        self.object.as_deref()
    }

    pub fn downcast_ref<T: Configurable>(&self) -> Option<&T> {
        self.object.as_ref()?.as_any().downcast_ref::<T>()
    }

    pub fn is_set(&self) -> bool {
        self.object.is_some()
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dynamic")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

impl Bindable for Dynamic {
    fn assign(&mut self, raw: Option<&str>, cx: &ConvertContext<'_>) -> Result<(), BoxError> {
        let Some(raw) = raw else {
            return Ok(());
        };
        let name = raw.trim();
        let object = cx
            .types()
            .create(name)
            .ok_or_else(|| ValueError::UnknownType(name.to_string()))?;
        self.type_name = Some(SmolStr::new(name));
        self.object = Some(object);
        Ok(())
    }

    fn node(&mut self) -> Node<'_> {
        match self.object.as_deref_mut() {
            Some(object) => Node::Object(object),
            None => Node::Leaf,
        }
    }

    fn view(&self) -> View<'_> {
        match (self.type_name.as_deref(), self.object.as_deref()) {
            (Some(type_name), Some(object)) => View::Typed { type_name, object },
            _ => View::Absent,
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
