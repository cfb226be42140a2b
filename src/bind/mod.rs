//! The member-resolver side of binding.
//!
//! A target type describes itself through [`Configurable`]: a static table
//! of [`Member`]s plus accessors that hand out each member as a
//! [`Bindable`]. Every bindable value knows how to take a leaf assignment
//! and which structural [`Node`] it presents to indexed or dotted keys.
//! The [`configurable!`](crate::configurable), [`config_enum!`](crate::config_enum)
//! and [`scalar!`](crate::scalar) macros generate these impls.

pub(crate) mod cache;
mod impls;
mod macros;
pub mod populate;

use std::any::Any;
use std::borrow::Cow;

use crate::convert::ConvertContext;
use crate::error::BoxError;
use crate::key::Index;

pub use impls::Scalar;
pub use populate::{IgnoreCase, KeyComparer, Ordinal, Populator};

/// Declarative per-member policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPolicy {
    pub aliases: &'static [&'static str],
    /// Skip the member when writing a target back out.
    pub ignore_get: bool,
    /// Skip the member, and anything nested under it, when populating.
    pub ignore_set: bool,
}

impl FieldPolicy {
    pub const fn new() -> Self {
        Self {
            aliases: &[],
            ignore_get: false,
            ignore_set: false,
        }
    }
}

impl Default for FieldPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// One entry of a type's member table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Member {
    /// Name matched against key parts and written by the encoder.
    pub name: &'static str,
    /// Accessor id passed to [`Configurable::member_mut`].
    pub field: &'static str,
    pub policy: FieldPolicy,
    /// Registered converter that replaces the member's own conversion.
    pub converter: Option<&'static str>,
}

impl Member {
    pub const fn new(field: &'static str) -> Self {
        Self {
            name: field,
            field,
            policy: FieldPolicy::new(),
            converter: None,
        }
    }

    pub const fn renamed(self, name: &'static str) -> Self {
        Self { name, ..self }
    }

    pub const fn with_aliases(self, aliases: &'static [&'static str]) -> Self {
        Self {
            policy: FieldPolicy {
                aliases,
                ..self.policy
            },
            ..self
        }
    }

    pub const fn ignore(self) -> Self {
        self.ignore_get().ignore_set()
    }

    pub const fn ignore_get(self) -> Self {
        Self {
            policy: FieldPolicy {
                ignore_get: true,
                ..self.policy
            },
            ..self
        }
    }

    pub const fn ignore_set(self) -> Self {
        Self {
            policy: FieldPolicy {
                ignore_set: true,
                ..self.policy
            },
            ..self
        }
    }

    pub const fn with_converter(self, converter: &'static str) -> Self {
        Self {
            converter: Some(converter),
            ..self
        }
    }
}

/// An object with named members.
pub trait Configurable: Send + 'static {
    fn type_name(&self) -> &'static str;

    fn members(&self) -> &'static [Member];

    fn member_mut(&mut self, field: &str) -> Option<&mut dyn Bindable>;

    fn member(&self, field: &str) -> Option<&dyn Bindable>;

    /// Receives indexed writes addressed to the object itself.
    fn indexer(&mut self) -> Option<&mut dyn Indexer> {
        None
    }

    fn indexer_ref(&self) -> Option<&dyn Indexer> {
        None
    }

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// A value slot that configuration text can be written into.
pub trait Bindable: Send + 'static {
    /// Converts `raw` and stores it. `None` is an absent block value.
    fn assign(&mut self, raw: Option<&str>, cx: &ConvertContext<'_>) -> Result<(), BoxError>;

    fn node(&mut self) -> Node<'_> {
        Node::Leaf
    }

    fn view(&self) -> View<'_>;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// What a slot offers to keys that continue past it.
pub enum Node<'a> {
    Leaf,
    Object(&'a mut dyn Configurable),
    Container(IndexedContainer<'a>),
}

pub enum IndexedContainer<'a> {
    List(&'a mut dyn ListLike),
    Map(&'a mut dyn MapLike),
    Indexer(&'a mut dyn Indexer),
}

/// Positional container; writing past the end pads with defaults, up to
/// [`MAX_POSITION_GAP`](crate::constants::MAX_POSITION_GAP) new items.
pub trait ListLike {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&mut self, position: usize) -> Result<&mut dyn Bindable, BoxError>;
}

pub trait MapLike {
    fn slot(&mut self, index: &Index, cx: &ConvertContext<'_>)
        -> Result<&mut dyn Bindable, BoxError>;
}

pub trait Indexer: Send {
    /// `Ok(None)` means the index addresses nothing and the write is dropped.
    fn item(
        &mut self,
        index: &Index,
        cx: &ConvertContext<'_>,
    ) -> Result<Option<&mut dyn Bindable>, BoxError>;

    /// Entries written back out by the encoder, keyed by index text.
    fn entries(&self) -> Vec<(String, &dyn Bindable)> {
        Vec::new()
    }
}

/// Read-side counterpart of [`Node`], consumed by the encoder.
pub enum View<'a> {
    Absent,
    Text(Cow<'a, str>),
    Object(&'a dyn Configurable),
    /// An object created from a registered type name.
    Typed {
        type_name: &'a str,
        object: &'a dyn Configurable,
    },
    List(Vec<&'a dyn Bindable>),
    Map(Vec<(String, &'a dyn Bindable)>),
}
