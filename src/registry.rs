//! Component registry - maps reserved-prefixed names to component types
//!
//! The registry is populated once at start-up and then shared, read-only, by
//! every composition. Only the per-type instantiation counters change after
//! that, behind a mutex, so a registry can be composed against from several
//! threads.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{info, warn};

use crate::component::{
    short_type_name, Component, Composable, FieldBindingError, FieldKind, FieldSchema, Text,
};
use crate::html::is_valid_name;

/// Prefix every component name must carry
pub const DEFAULT_PREFIX: &str = "ick-";

/// Errors that can occur while registering a component
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Name does not start with the reserved prefix
    #[error("component name {name:?} must start with {prefix:?}")]
    MissingPrefix { name: String, prefix: String },

    /// Nothing left once the prefix is removed
    #[error("component name {name:?} is empty after the prefix")]
    EmptyName { name: String },

    /// Name does not follow the html name grammar
    #[error("component name {name:?} is not a valid html name")]
    InvalidName { name: String },
}

type Factory = Box<dyn Fn() -> Box<dyn Composable> + Send + Sync>;

/// Type-erased field schema
trait Binder: Send + Sync {
    fn kind(&self, name: &str) -> Option<FieldKind>;
    fn bind(
        &self,
        target: &mut dyn Composable,
        name: &str,
        raw: &str,
    ) -> Result<bool, FieldBindingError>;
}

impl<C: Composable> Binder for FieldSchema<C> {
    fn kind(&self, name: &str) -> Option<FieldKind> {
        FieldSchema::kind(self, name)
    }

    fn bind(
        &self,
        target: &mut dyn Composable,
        name: &str,
        raw: &str,
    ) -> Result<bool, FieldBindingError> {
        match crate::component::AsAny::as_any_mut(target).downcast_mut::<C>() {
            Some(target) => FieldSchema::bind(self, target, name, raw),
            None => Ok(false),
        }
    }
}

/// A registered component type
pub struct ComponentDescriptor {
    name: String,
    css: String,
    factory: Factory,
    binder: Box<dyn Binder>,
    counter: Mutex<u64>,
}

impl fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("name", &self.name)
            .field("css", &self.css)
            .field("count", &*self.counter.lock())
            .finish_non_exhaustive()
    }
}

impl ComponentDescriptor {
    /// Registered name, prefix included
    pub fn name(&self) -> &str {
        &self.name
    }

    /// CSS snippet registered with the component, if any
    pub fn css(&self) -> Option<&str> {
        if self.css.trim().is_empty() {
            None
        } else {
            Some(&self.css)
        }
    }

    /// Create a fresh instance
    pub fn instantiate(&self) -> Box<dyn Composable> {
        (self.factory)()
    }

    /// Kind of the field an attribute binds to, `None` for an unbound
    /// attribute
    pub fn field_kind(&self, attribute: &str) -> Option<FieldKind> {
        self.binder.kind(attribute)
    }

    /// Bind an attribute value onto an instance created by this descriptor
    ///
    /// Returns `Ok(false)` when the attribute is not a declared field.
    pub fn bind(
        &self,
        target: &mut dyn Composable,
        attribute: &str,
        raw: &str,
    ) -> Result<bool, FieldBindingError> {
        self.binder
            .bind(target, attribute, raw)
            .map_err(|err| FieldBindingError {
                component: self.name.clone(),
                ..err
            })
    }

    /// Number of ids generated so far
    pub fn count(&self) -> u64 {
        *self.counter.lock()
    }
}

/// Registry of component types
#[derive(Debug)]
pub struct ComponentRegistry {
    prefix: String,
    components: HashMap<String, ComponentDescriptor>,
    /// Component name registered for a concrete type
    by_type: HashMap<TypeId, String>,
    /// Counter shared by every unregistered type
    fallback: Mutex<u64>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_PREFIX)
    }
}

impl ComponentRegistry {
    /// Create an empty registry using the default `ick-` prefix
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with a custom reserved prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into().to_lowercase(),
            components: HashMap::new(),
            by_type: HashMap::new(),
            fallback: Mutex::new(0),
        }
    }

    /// Create a registry holding the built-in components (`ick-text`)
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add::<Text>("text", "");
        registry
    }

    /// Register a built-in under `prefix + suffix`; the name is known valid
    fn add<C: Component>(&mut self, suffix: &str, css: &str) {
        let name = format!("{}{}", self.prefix, suffix);
        if let Err(err) = self.register::<C>(&name, css) {
            warn!(component = %name, error = %err, "built-in component not registered");
        }
    }

    /// The reserved prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Register a component type under `name`
    ///
    /// Registering a name twice logs a warning and keeps the first
    /// registration.
    pub fn register<C: Component>(&mut self, name: &str, css: &str) -> Result<(), RegistryError> {
        let name = self.validate(name)?;
        if self.insert(&name, css, || Box::new(C::default()) as Box<dyn Composable>, C::fields()) {
            self.by_type.entry(TypeId::of::<C>()).or_insert(name);
        }
        Ok(())
    }

    /// Register a component built by a custom factory
    pub fn register_with<C, F>(
        &mut self,
        name: &str,
        css: &str,
        factory: F,
        fields: FieldSchema<C>,
    ) -> Result<(), RegistryError>
    where
        C: Composable,
        F: Fn() -> C + Send + Sync + 'static,
    {
        let name = self.validate(name)?;
        self.insert(&name, css, move || Box::new(factory()) as Box<dyn Composable>, fields);
        Ok(())
    }

    fn validate(&self, name: &str) -> Result<String, RegistryError> {
        let name = name.trim().to_lowercase();
        let Some(suffix) = name.strip_prefix(&self.prefix) else {
            return Err(RegistryError::MissingPrefix {
                name,
                prefix: self.prefix.clone(),
            });
        };
        if suffix.is_empty() {
            return Err(RegistryError::EmptyName { name });
        }
        if !is_valid_name(&name) {
            return Err(RegistryError::InvalidName { name });
        }
        Ok(name)
    }

    /// Insert a descriptor, returns false if the name was already taken
    fn insert<C, F>(&mut self, name: &str, css: &str, factory: F, fields: FieldSchema<C>) -> bool
    where
        C: Composable,
        F: Fn() -> Box<dyn Composable> + Send + Sync + 'static,
    {
        if self.components.contains_key(name) {
            warn!(component = %name, "component already registered, registration ignored");
            return false;
        }
        self.components.insert(
            name.to_string(),
            ComponentDescriptor {
                name: name.to_string(),
                css: css.to_string(),
                factory: Box::new(factory),
                binder: Box::new(fields),
                counter: Mutex::new(0),
            },
        );
        info!(component = %name, "component registered");
        true
    }

    /// Look a component up by tag name, case insensitive
    pub fn lookup(&self, name: &str) -> Option<&ComponentDescriptor> {
        self.components.get(&name.trim().to_lowercase())
    }

    /// Check if a component name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Descriptor of the type behind a component instance, if registered
    pub fn descriptor_for(&self, component: &dyn Composable) -> Option<&ComponentDescriptor> {
        let type_id = crate::component::AsAny::as_any(component).type_id();
        self.by_type
            .get(&type_id)
            .and_then(|name| self.components.get(name))
    }

    /// Get all registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.components.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Generate the next id for a registered component: `name-counter`
    pub fn next_id(&self, descriptor: &ComponentDescriptor) -> String {
        let mut counter = descriptor.counter.lock();
        let id = format!("{}-{}", descriptor.name, *counter);
        *counter += 1;
        id
    }

    /// Generate the next id for any component instance
    ///
    /// Unregistered types get their lower-cased type name and a counter shared
    /// by all unregistered types.
    pub fn next_id_for(&self, component: &dyn Composable) -> String {
        if let Some(descriptor) = self.descriptor_for(component) {
            return self.next_id(descriptor);
        }
        let name = short_type_name(crate::component::AsAny::type_name(component)).to_lowercase();
        let mut counter = self.fallback.lock();
        let id = format!("{}-{}", name, *counter);
        *counter += 1;
        id
    }
}
