//! Composer - expands embedded component tags into html
//!
//! For every component the composer:
//!
//! 1. checks the composition depth,
//! 2. resolves the component id,
//! 3. assembles the opening tag from the merged container metadata,
//! 4. runs the template executor over the body,
//! 5. scans the result, copying literal text and recursively composing each
//!    embedded tag in place,
//! 6. closes the element.
//!
//! Everything is written to a single output buffer, so the output built
//! before a fatal error is returned alongside it.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::component::{Composable, Container, Setup};
use crate::error::{ComposeError, ComposeFailure};
use crate::html::{is_void_element, AttributeError, AttributeSet, ClassSet, Style};
use crate::registry::{ComponentDescriptor, ComponentRegistry};
use crate::scanner::{Scanner, Tag, Token};
use crate::template::{MiniJinjaExecutor, TemplateContext, TemplateExecutor};
use crate::ComposeConfig;

/// Default bound on component nesting
pub const MAX_DEPTH: usize = 10;

/// Emitted inside an element whose body template failed
pub const TEMPLATE_ERROR_MARKER: &str = "<!-- composing html template error -->";

/// A component instantiated from an embedded tag
pub struct Instance {
    /// Id of the element emitted for the instance
    pub id: String,
    pub component: Box<dyn Composable>,
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.id)
            .field("type", &crate::component::AsAny::type_name(self.component.as_ref()))
            .finish()
    }
}

/// Result of a successful composition
#[derive(Debug)]
pub struct Composition {
    /// Id of the composed root component, `None` for a fragment
    pub id: Option<String>,
    pub html: String,
    /// Instances created from embedded tags, in document order
    pub instances: Vec<Instance>,
    /// CSS of the registered components used, by component name
    pub styles: IndexMap<String, String>,
}

impl Composition {
    /// Ids of the created instances, in document order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.instances.iter().map(|instance| instance.id.as_str())
    }

    /// CSS of every component used, in first-use order
    pub fn stylesheet(&self) -> String {
        self.styles
            .iter()
            .map(|(name, css)| format!("/* {} */\n{}\n", name, css.trim()))
            .collect()
    }
}

/// State shared by every level of one composition call
#[derive(Default)]
struct Session {
    html: String,
    instances: Vec<Instance>,
    styles: IndexMap<String, String>,
}

/// Expands components against a registry
pub struct Composer<'r> {
    registry: &'r ComponentRegistry,
    executor: Box<dyn TemplateExecutor>,
    config: ComposeConfig,
}

impl<'r> Composer<'r> {
    /// Create a composer using the MiniJinja executor
    pub fn new(registry: &'r ComponentRegistry, config: ComposeConfig) -> Self {
        let executor = MiniJinjaExecutor::new().with_strict_undefined(config.strict_undefined);
        Self {
            registry,
            executor: Box::new(executor),
            config,
        }
    }

    /// Replace the template executor
    pub fn with_executor(mut self, executor: impl TemplateExecutor + 'static) -> Self {
        self.executor = Box::new(executor);
        self
    }

    pub fn registry(&self) -> &ComponentRegistry {
        self.registry
    }

    pub fn config(&self) -> &ComposeConfig {
        &self.config
    }

    /// Compose a component into its element, its body fully expanded
    ///
    /// `root` is exposed to the component's body template as `Root`.
    pub fn compose(
        &self,
        component: &dyn Composable,
        root: &Value,
    ) -> Result<Composition, ComposeFailure> {
        let mut session = Session::default();
        let id = resolve_id(component.setup(), || self.registry.next_id_for(component));
        debug!(id = %id, "composing component");

        match self.compose_element(component, &id, &AttributeSet::new(), root, 0, &mut session) {
            Ok(()) => Ok(session.finish(Some(id))),
            Err(error) => Err(ComposeFailure::new(error, session.html)),
        }
    }

    /// Expand the embedded tags of a text without wrapping it in an element
    ///
    /// The text is executed as a template with `Root` set to `root`.
    pub fn compose_fragment(&self, text: &str, root: &Value) -> Result<Composition, ComposeFailure> {
        let mut session = Session::default();
        let context = TemplateContext::new("", Value::Null, root.clone());

        let result = match self.executor.execute(text, &context) {
            Ok(body) => self.unfold(&body, root, 0, &mut session),
            Err(source) => {
                session.html.push_str(TEMPLATE_ERROR_MARKER);
                Err(ComposeError::TemplateExecution {
                    id: String::new(),
                    source,
                })
            }
        };
        match result {
            Ok(()) => Ok(session.finish(None)),
            Err(error) => Err(ComposeFailure::new(error, session.html)),
        }
    }

    /// Write the element of a component at `depth`
    ///
    /// `site` holds the unbound attributes written at the tag site.
    fn compose_element(
        &self,
        component: &dyn Composable,
        id: &str,
        site: &AttributeSet,
        root: &Value,
        depth: usize,
        session: &mut Session,
    ) -> Result<(), ComposeError> {
        if depth >= self.config.max_depth {
            return Err(ComposeError::RecursionLimit {
                depth,
                max: self.config.max_depth,
            });
        }

        // an empty container tag renders the body alone
        let container = component.container(id);
        let tag = tag_name(&container);
        if let Some(tag) = &tag {
            let attributes = merge_attributes(&container, component.setup(), site, id).map_err(
                |source| ComposeError::Container {
                    id: id.to_string(),
                    source,
                },
            )?;
            session.html.push_str(&format!("<{} {}>", tag, attributes));
            if is_void_element(tag) {
                return Ok(());
            }
        }
        let close = |session: &mut Session| {
            if let Some(tag) = &tag {
                session.html.push_str(&format!("</{}>", tag));
            }
        };

        let me = component.template_data();
        let context = TemplateContext::new(id, me.clone(), root.clone());
        let body = match self.executor.execute(&component.body(), &context) {
            Ok(body) => body,
            Err(source) => {
                session.html.push_str(TEMPLATE_ERROR_MARKER);
                close(session);
                return Err(ComposeError::TemplateExecution {
                    id: id.to_string(),
                    source,
                });
            }
        };

        self.unfold(&body, &me, depth, session)?;
        close(session);
        Ok(())
    }

    /// Copy literal text and compose embedded tags one level below `depth`
    ///
    /// `parent` is the data of the component owning the text, it becomes the
    /// `Root` of the embedded components.
    fn unfold(
        &self,
        text: &str,
        parent: &Value,
        depth: usize,
        session: &mut Session,
    ) -> Result<(), ComposeError> {
        for token in Scanner::new(text, self.registry.prefix()) {
            let token = token.map_err(|error| ComposeError::TagSyntax {
                error,
                text: text.to_string(),
            })?;
            match token {
                Token::Text(literal) => session.html.push_str(literal),
                Token::Tag(tag) => self.unfold_tag(&tag, parent, depth + 1, session)?,
            }
        }
        Ok(())
    }

    fn unfold_tag(
        &self,
        tag: &Tag,
        parent: &Value,
        depth: usize,
        session: &mut Session,
    ) -> Result<(), ComposeError> {
        let name = tag.name.trim().to_lowercase();
        let Some(descriptor) = self.registry.lookup(&name) else {
            if self.config.strict {
                return Err(ComposeError::UnregisteredComponent { name });
            }
            warn!(component = %name, "unable to unfold unregistered component");
            session
                .html
                .push_str(&format!("<!-- unable to unfold unregistered {} component -->", name));
            return Ok(());
        };

        let mut component = descriptor.instantiate();
        let site = bind_attributes(descriptor, component.as_mut(), tag)?;
        let id = resolve_id(component.setup(), || self.registry.next_id(descriptor));
        debug!(component = %name, id = %id, depth, "unfolding component");

        if let Some(css) = descriptor.css() {
            if !session.styles.contains_key(&name) {
                session.styles.insert(name.clone(), css.to_string());
            }
        }

        // parents precede their descendants
        let slot = session.instances.len();
        self.compose_element(component.as_ref(), &id, &site, parent, depth, session)?;
        session.instances.insert(slot, Instance { id, component });
        Ok(())
    }
}

impl Session {
    fn finish(self, id: Option<String>) -> Composition {
        Composition {
            id,
            html: self.html,
            instances: self.instances,
            styles: self.styles,
        }
    }
}

/// Bind tag-site attributes onto the declared fields of a new instance
///
/// Returns the attributes left unbound. A tag-site `id` forces the id of
/// the instance.
fn bind_attributes(
    descriptor: &ComponentDescriptor,
    component: &mut dyn Composable,
    tag: &Tag,
) -> Result<AttributeSet, ComposeError> {
    let mut site = AttributeSet::new();
    for attribute in &tag.attributes {
        if !descriptor.bind(component, &attribute.name, &attribute.value)? {
            site.insert(attribute.name.clone(), attribute.value.clone());
        }
    }
    if let Some(id) = site.remove("id") {
        if !id.is_empty() {
            component.setup_mut().force_id(id);
        }
    }
    Ok(site)
}

/// Forced id, else the `id` setup attribute, else a generated one
fn resolve_id(setup: &Setup, generate: impl FnOnce() -> String) -> String {
    if let Some(id) = setup.id.as_deref().filter(|id| !id.is_empty()) {
        return id.to_string();
    }
    match setup.attributes.get("id") {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => generate(),
    }
}

/// Lower-cased container tag, `None` when empty
fn tag_name(container: &Container) -> Option<String> {
    let tag = container.tag.trim().to_lowercase();
    (!tag.is_empty()).then_some(tag)
}

/// Attributes of the opening tag
///
/// Tag-site attributes win over setup attributes, both win over the
/// container defaults. Classes and style accumulate from the container
/// defaults, then the tag site and setup.
fn merge_attributes(
    container: &Container,
    setup: &Setup,
    site: &AttributeSet,
    id: &str,
) -> Result<AttributeSet, AttributeError> {
    let mut attributes = setup.attributes.clone();
    attributes.merge(site, true);
    attributes.merge(&AttributeSet::parse(&container.attributes)?, false);

    let mut classes = ClassSet::parse(&container.classes)?;
    if let Some(class) = attributes.remove("class") {
        classes.add_tokens(class.split_whitespace())?;
    }
    classes.add_classes(&setup.classes);

    let mut style = Style::from(container.style.as_str());
    style.push(setup.style.as_str());
    if let Some(inline) = attributes.remove("style") {
        style.push(&inline);
    }

    attributes.insert("id", id);
    if !classes.is_empty() {
        attributes.insert("class", classes.to_string());
    }
    if !style.is_empty() {
        attributes.insert("style", style.to_string());
    }
    attributes.validate()?;
    Ok(attributes)
}
