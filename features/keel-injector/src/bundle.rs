use std::borrow::Cow;

use crate::component::{Component, Recipe};

/// Named, reusable group of components
///
/// The builder only flattens it, the name shows up in logs.
#[derive(Debug, Clone)]
pub struct Bundle {
    name: Cow<'static, str>,
    components: Vec<fn() -> Recipe>,
}

impl Bundle {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Bundle {
            name: name.into(),
            components: Vec::new(),
        }
    }

    pub fn with<T: Component>(mut self) -> Self {
        self.components.push(Recipe::of::<T>);
        self
    }

    /// Adds all components of another bundle
    pub fn include(mut self, other: Bundle) -> Self {
        self.components.extend(other.components);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub(crate) fn recipes(&self) -> impl Iterator<Item = Recipe> + '_ {
        self.components.iter().map(|recipe| recipe())
    }
}
