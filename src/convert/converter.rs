use std::any::Any;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use smol_str::SmolStr;
use tracing::trace;

use crate::convert::ConvertContext;
use crate::error::{BoxError, ValueError};

/// A named conversion that replaces a member's own parsing.
///
/// `target` is the slot being written, typically `T` or `Option<T>`;
/// [`write_target`] stores into either.
pub trait Converter: Send + Sync {
    fn convert(
        &self,
        raw: &str,
        cx: &ConvertContext<'_>,
        target: &mut dyn Any,
    ) -> Result<(), BoxError>;
}

type Factory = Arc<dyn Fn() -> Arc<dyn Converter> + Send + Sync>;

/// Converter factories by name, with one cached instance per name.
#[derive(Default)]
pub struct ConverterRegistry {
    factories: DashMap<SmolStr, Factory>,
    instances: DashMap<SmolStr, Arc<dyn Converter>>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory`; it runs at most once, on first use of `name`.
    pub fn register<C, F>(&self, name: &str, factory: F) -> &Self
    where
        C: Converter + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        let factory: Factory = Arc::new(move || Arc::new(factory()) as Arc<dyn Converter>);
        self.factories.insert(SmolStr::new(name), factory);
        self.instances.remove(name);
        self
    }

    pub fn with<C, F>(self, name: &str, factory: F) -> Self
    where
        C: Converter + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        self.register(name, factory);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.instances.contains_key(name)
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Converter>, ValueError> {
        if let Some(instance) = self.instances.get(name) {
            return Ok(Arc::clone(instance.value()));
        }
        let factory = self
            .factories
            .get(name)
            .map(|factory| Arc::clone(factory.value()))
            .ok_or_else(|| ValueError::UnknownConverter(name.to_string()))?;
        let instance = self
            .instances
            .entry(SmolStr::new(name))
            .or_insert_with(|| {
                trace!(converter = name, "instantiating converter");
                factory()
            });
        Ok(Arc::clone(instance.value()))
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<SmolStr> = self.factories.iter().map(|e| e.key().clone()).collect();
        names.sort();
        f.debug_struct("ConverterRegistry")
            .field("converters", &names)
            .finish()
    }
}

/// Stores `value` into a converter target of type `T` or `Option<T>`.
pub fn write_target<T: 'static>(
    target: &mut dyn Any,
    value: T,
    cx: &ConvertContext<'_>,
) -> Result<(), BoxError> {
    if let Some(slot) = target.downcast_mut::<T>() {
        *slot = value;
        return Ok(());
    }
    if let Some(slot) = target.downcast_mut::<Option<T>>() {
        *slot = Some(value);
        return Ok(());
    }
    Err(ValueError::UnsupportedTarget {
        converter: cx.member.converter.unwrap_or_default().to_string(),
        type_name: std::any::type_name::<T>(),
    }
    .into())
}
