//! Integration tests for component composition

use std::sync::Arc;
use std::time::Duration;

use ick_compose::component::{Component, Composable, Container, FieldSchema, Setup, Text};
use ick_compose::html::AttributeError;
use ick_compose::{
    compose, compose_fragment, compose_with_config, ComponentRegistry, ComposeConfig,
    ComposeError, Composer, Config, TagSyntaxError,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

/// Component with every kind of container default
#[derive(Default)]
struct Sample {
    setup: Setup,
}

impl Composable for Sample {
    fn container(&self, _id: &str) -> Container {
        Container::new("DIV")
            .with_classes("test")
            .with_attributes("hidden tabIndex=2")
            .with_style("display=test;")
    }

    fn body(&self) -> String {
        String::new()
    }

    fn setup(&self) -> &Setup {
        &self.setup
    }

    fn setup_mut(&mut self) -> &mut Setup {
        &mut self.setup
    }
}

impl Component for Sample {}

/// Embeds itself
#[derive(Default)]
struct Loop {
    setup: Setup,
}

impl Composable for Loop {
    fn container(&self, _id: &str) -> Container {
        Container::default()
    }

    fn body(&self) -> String {
        "<ick-loop/>".to_string()
    }

    fn setup(&self) -> &Setup {
        &self.setup
    }

    fn setup_mut(&mut self) -> &mut Setup {
        &mut self.setup
    }
}

impl Component for Loop {}

#[derive(Default)]
struct Outer {
    setup: Setup,
}

impl Composable for Outer {
    fn container(&self, _id: &str) -> Container {
        Container::new("section")
    }

    fn body(&self) -> String {
        r#"<ick-inner content="X"/>"#.to_string()
    }

    fn setup(&self) -> &Setup {
        &self.setup
    }

    fn setup_mut(&mut self) -> &mut Setup {
        &mut self.setup
    }
}

impl Component for Outer {}

#[derive(Default)]
struct Inner {
    content: String,
    setup: Setup,
}

impl Composable for Inner {
    fn container(&self, _id: &str) -> Container {
        Container::new("p")
    }

    fn body(&self) -> String {
        self.content.clone()
    }

    fn setup(&self) -> &Setup {
        &self.setup
    }

    fn setup_mut(&mut self) -> &mut Setup {
        &mut self.setup
    }
}

impl Component for Inner {
    fn fields() -> FieldSchema<Self> {
        FieldSchema::<Self>::new().text("Content", |c, v| c.content = v)
    }
}

/// Typed fields exposed to its template
#[derive(Default)]
struct Timer {
    count: i64,
    delay: Duration,
    paused: bool,
    setup: Setup,
}

impl Composable for Timer {
    fn container(&self, _id: &str) -> Container {
        Container::new("time")
    }

    fn body(&self) -> String {
        r#"{{ Me.count }}/{{ Me.delay_ms }}/{{ "paused" if Me.paused else "running" }}"#.to_string()
    }

    fn setup(&self) -> &Setup {
        &self.setup
    }

    fn setup_mut(&mut self) -> &mut Setup {
        &mut self.setup
    }

    fn template_data(&self) -> Value {
        json!({
            "count": self.count,
            "delay_ms": self.delay.as_millis() as u64,
            "paused": self.paused,
        })
    }
}

impl Component for Timer {
    fn fields() -> FieldSchema<Self> {
        FieldSchema::<Self>::new()
            .int("Count", |t, v| t.count = v)
            .duration("Delay", |t, v| t.delay = v)
            .boolean("Paused", |t, v| t.paused = v)
    }
}

/// Sets its own overrides when created
struct Styled {
    setup: Setup,
}

impl Default for Styled {
    fn default() -> Self {
        let mut setup = Setup::default();
        setup.classes.add_tokens(["self"]).expect("Should add class");
        setup.style.push("margin:0");
        setup
            .attributes
            .set("title", "setup")
            .expect("Should set title");
        Self { setup }
    }
}

impl Composable for Styled {
    fn container(&self, _id: &str) -> Container {
        Container::new("div")
            .with_classes("base")
            .with_attributes("title=default role=note")
            .with_style("color:red")
    }

    fn body(&self) -> String {
        String::new()
    }

    fn setup(&self) -> &Setup {
        &self.setup
    }

    fn setup_mut(&mut self) -> &mut Setup {
        &mut self.setup
    }
}

impl Component for Styled {}

#[derive(Default)]
struct Broken {
    setup: Setup,
}

impl Composable for Broken {
    fn container(&self, _id: &str) -> Container {
        Container::default()
    }

    fn body(&self) -> String {
        "{{ Me.oops ".to_string()
    }

    fn setup(&self) -> &Setup {
        &self.setup
    }

    fn setup_mut(&mut self) -> &mut Setup {
        &mut self.setup
    }
}

impl Component for Broken {}

#[derive(Default)]
struct Image {
    setup: Setup,
}

impl Composable for Image {
    fn container(&self, _id: &str) -> Container {
        Container::new("img").with_attributes("src=a.png")
    }

    fn body(&self) -> String {
        "<ick-bogus/>".to_string()
    }

    fn setup(&self) -> &Setup {
        &self.setup
    }

    fn setup_mut(&mut self) -> &mut Setup {
        &mut self.setup
    }
}

impl Component for Image {}

fn registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::standard();
    registry.register::<Sample>("ick-test", "").unwrap();
    registry.register::<Loop>("ick-loop", "").unwrap();
    registry.register::<Outer>("ick-outer", ".outer{}").unwrap();
    registry.register::<Inner>("ick-inner", ".inner{}").unwrap();
    registry.register::<Timer>("ick-timer", "").unwrap();
    registry.register::<Styled>("ick-styled", "").unwrap();
    registry.register::<Broken>("ick-broken", "").unwrap();
    registry.register::<Image>("ick-image", "").unwrap();
    registry
}

#[test]
fn test_container_defaults() {
    let registry = registry();
    let composition = compose(&Sample::default(), &registry).expect("Should compose");
    insta::assert_snapshot!(
        composition.html,
        @"<div class='test' hidden id='ick-test-0' style='display=test;' tabIndex=2></div>"
    );
}

#[test]
fn test_self_embedding_component_hits_depth_limit() {
    let registry = registry();
    let failure = compose(&Loop::default(), &registry).unwrap_err();
    assert_eq!(failure.error, ComposeError::RecursionLimit { depth: 10, max: 10 });
    assert_eq!(failure.partial.matches("<div ").count(), 10);
    assert!(failure.partial.starts_with("<div id='ick-loop-0'><div id='ick-loop-1'>"));
}

#[test]
fn test_depth_limit_from_fragment() {
    let registry = registry();
    let failure = compose_fragment("<ick-loop/>", &registry).unwrap_err();
    assert!(matches!(
        failure.error,
        ComposeError::RecursionLimit { depth: 10, max: 10 }
    ));
}

#[test]
fn test_unregistered_component_leaves_comment() {
    let registry = registry();
    let composition = compose_fragment("A <ick-bogus/> B", &registry).expect("Should compose");
    assert_eq!(
        composition.html,
        "A <!-- unable to unfold unregistered ick-bogus component --> B"
    );
    assert!(composition.instances.is_empty());
}

#[test]
fn test_strict_mode_rejects_unregistered_component() {
    let registry = registry();
    let failure = Composer::new(&registry, ComposeConfig::new().with_strict(true))
        .compose_fragment("A <ick-bogus/> B", &Value::Null)
        .unwrap_err();
    assert_eq!(
        failure.error,
        ComposeError::UnregisteredComponent {
            name: "ick-bogus".to_string()
        }
    );
    assert_eq!(failure.partial, "A ");
}

#[test]
fn test_classes_merge_once_each() {
    let registry = registry();
    let composition =
        compose_fragment("<ick-test class='text test'/>", &registry).expect("Should compose");
    assert!(composition.html.contains("class='test text'"));
}

#[test]
fn test_nested_components_get_unique_ids() {
    let registry = registry();
    let composition = compose(&Outer::default(), &registry).expect("Should compose");
    assert_eq!(
        composition.html,
        "<section id='ick-outer-0'><p id='ick-inner-0'>X</p></section>"
    );
    assert_eq!(composition.id.as_deref(), Some("ick-outer-0"));
    assert_eq!(composition.ids().collect::<Vec<_>>(), vec!["ick-inner-0"]);

    // counters are kept by the registry across compositions
    let again = compose(&Outer::default(), &registry).expect("Should compose");
    assert_eq!(again.id.as_deref(), Some("ick-outer-1"));
    assert_eq!(again.ids().collect::<Vec<_>>(), vec!["ick-inner-1"]);
}

#[test]
fn test_instances_in_document_order() {
    let registry = registry();
    let composition =
        compose_fragment("<ick-outer/> <ick-text Content=t/>", &registry).expect("Should compose");
    assert_eq!(
        composition.ids().collect::<Vec<_>>(),
        vec!["ick-outer-0", "ick-inner-0", "ick-text-0"]
    );
    for instance in &composition.instances {
        assert!(composition.html.contains(&format!("id='{}'", instance.id)));
    }
}

#[test]
fn test_empty_value_is_a_syntax_error() {
    let registry = registry();
    let failure = compose_fragment("before <ick-test a=/> after", &registry).unwrap_err();
    assert!(matches!(
        failure.error,
        ComposeError::TagSyntax {
            error: TagSyntaxError::EmptyValue { .. },
            ..
        }
    ));
    assert_eq!(failure.partial, "before ");
}

#[test]
fn test_syntax_error_report() {
    let registry = registry();
    let failure = compose_fragment("<ick-te#st/>", &registry).unwrap_err();
    let report = failure.error.report("page.html");
    assert!(report.contains("page.html"));
    assert!(report.contains("invalid character found in tag name"));
}

#[test]
fn test_typed_field_binding() {
    let registry = registry();
    let composition = compose_fragment(
        "<ick-timer count=3 delay=1.5s paused title=clock/>",
        &registry,
    )
    .expect("Should compose");
    assert_eq!(
        composition.html,
        "<time id='ick-timer-0' title='clock'>3/1500/paused</time>"
    );

    let composition =
        compose_fragment("<ick-timer delay=250ms paused=False/>", &registry).expect("Should compose");
    assert_eq!(composition.html, "<time id='ick-timer-1'>0/250/running</time>");
}

#[test]
fn test_field_binding_error_is_fatal() {
    let registry = registry();
    let failure = compose_fragment("<ick-timer count=many/>", &registry).unwrap_err();
    match failure.error {
        ComposeError::FieldBinding(err) => {
            assert_eq!(err.component, "ick-timer");
            assert_eq!(err.field, "Count");
            assert_eq!(err.value, "many");
        }
        other => panic!("expected a field binding error, got {:?}", other),
    }
    assert_eq!(failure.partial, "");
}

#[test]
fn test_setup_and_tag_site_precedence() {
    let registry = registry();
    let composition = compose_fragment(
        "<ick-styled class=site style='color:blue' title=site/>",
        &registry,
    )
    .expect("Should compose");
    assert_eq!(
        composition.html,
        "<div class='base site self' id='ick-styled-0' role='note' style='color:red;margin:0;color:blue' title='site'></div>"
    );

    let composition = compose_fragment("<ick-styled/>", &registry).expect("Should compose");
    assert!(composition.html.contains("title='setup'"));
}

#[test]
fn test_template_error_marker() {
    let registry = registry();
    let failure = compose_fragment("x <ick-broken/>", &registry).unwrap_err();
    assert!(matches!(
        failure.error,
        ComposeError::TemplateExecution { ref id, .. } if id == "ick-broken-0"
    ));
    assert_eq!(
        failure.partial,
        "x <div id='ick-broken-0'><!-- composing html template error --></div>"
    );
}

#[test]
fn test_void_element_has_no_body() {
    let registry = registry();
    let composition = compose_fragment("<ick-image/>", &registry).expect("Should compose");
    insta::assert_snapshot!(composition.html, @"<img id='ick-image-0' src='a.png'>");
}

#[test]
fn test_true_attribute_is_written_bare() {
    let registry = registry();
    let composition =
        compose_fragment("<ick-text hidden=TRUE open=false Content=x/>", &registry)
            .expect("Should compose");
    insta::assert_snapshot!(
        composition.html,
        @"<span hidden id='ick-text-0' open=false>x</span>"
    );
}

#[test]
fn test_value_with_both_quotes_is_rejected() {
    let registry = registry();
    let failure = compose_fragment(r#"<p><ick-text title=it's"x Content=hi/></p>"#, &registry)
        .unwrap_err();
    match failure.error {
        ComposeError::Container { id, source } => {
            assert_eq!(id, "ick-text-0");
            assert_eq!(
                source,
                AttributeError::AmbiguousQuotes {
                    name: "title".to_string(),
                    value: r#"it's"x"#.to_string(),
                }
            );
        }
        other => panic!("Expected container error, got {:?}", other),
    }
    assert_eq!(failure.partial, "<p>");
}

#[test]
fn test_css_collected_once_in_first_use_order() {
    let registry = registry();
    let composition = compose_fragment("<ick-outer/><ick-outer/><ick-text/>", &registry)
        .expect("Should compose");
    assert_eq!(
        composition.styles.keys().collect::<Vec<_>>(),
        vec!["ick-outer", "ick-inner"]
    );
    assert_eq!(
        composition.stylesheet(),
        "/* ick-outer */\n.outer{}\n/* ick-inner */\n.inner{}\n"
    );
}

#[test]
fn test_max_depth_is_configurable() {
    let registry = registry();
    let failure = compose_with_config(
        &Outer::default(),
        &registry,
        ComposeConfig::new().with_max_depth(1),
    )
    .unwrap_err();
    assert_eq!(failure.error, ComposeError::RecursionLimit { depth: 1, max: 1 });
    assert_eq!(failure.partial, "<section id='ick-outer-0'>");
}

const CONFIG: &str = r#"
[[component]]
name = "ick-card"
tag = "article"
classes = "card"
attributes = "role=note"
fields = ["title"]
body = "<h2>{{ Me.title }}</h2>"

[[component]]
name = "ick-greeter"
fields = ["name"]
body = "<ick-hello/>"

[[component]]
name = "ick-hello"
tag = "span"
body = "Hello {{ Root.name }}"
"#;

#[test]
fn test_declared_components() {
    let config = Config::from_str(CONFIG).expect("Should parse");
    let registry = config.registry().expect("Should build registry");
    let composer = Composer::new(&registry, config.compose.clone());

    let composition = composer
        .compose_fragment("<ick-card title='Hi'/>", &Value::Null)
        .expect("Should compose");
    insta::assert_snapshot!(
        composition.html,
        @"<article class='card' id='ick-card-0' role='note'><h2>Hi</h2></article>"
    );
}

#[test]
fn test_declared_component_without_tag_renders_body_only() {
    let config = Config::from_str(
        "[[component]]\nname = \"ick-row\"\ntag = \"\"\nclasses = \"row\"\nbody = \"<td>{{ Id }}</td>\"\n",
    )
    .expect("Should parse");
    let registry = config.registry().expect("Should build registry");
    let composition = compose_fragment("<tr><ick-row/><ick-row/></tr>", &registry)
        .expect("Should compose");
    insta::assert_snapshot!(
        composition.html,
        @"<tr><td>ick-row-0</td><td>ick-row-1</td></tr>"
    );
}

#[test]
fn test_nested_root_is_parent_data() {
    let config = Config::from_str(CONFIG).expect("Should parse");
    let registry = config.registry().expect("Should build registry");
    let composer = Composer::new(&registry, ComposeConfig::default());

    let composition = composer
        .compose_fragment("<ick-greeter name=Ann/>", &Value::Null)
        .expect("Should compose");
    assert_eq!(
        composition.html,
        "<div id='ick-greeter-0'><span id='ick-hello-0'>Hello Ann</span></div>"
    );
}

#[test]
fn test_root_data_reaches_fragment() {
    let registry = registry();
    let composer = Composer::new(&registry, ComposeConfig::default());
    let composition = composer
        .compose_fragment(
            "{% for n in Root.names %}<ick-text Content='{{ n }}'/>{% endfor %}",
            &json!({"names": ["a", "b"]}),
        )
        .expect("Should compose");
    assert_eq!(
        composition.html,
        "<span id='ick-text-0'>a</span><span id='ick-text-1'>b</span>"
    );
}

#[test]
fn test_strict_undefined() {
    let registry = registry();
    let composer = Composer::new(
        &registry,
        ComposeConfig::new().with_strict_undefined(true),
    );
    let failure = composer
        .compose_fragment("{{ Root.missing }}", &json!({}))
        .unwrap_err();
    assert!(matches!(failure.error, ComposeError::TemplateExecution { .. }));
}

#[test]
fn test_concurrent_compositions_keep_ids_unique() {
    let registry = Arc::new(registry());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                (0..10)
                    .flat_map(|_| {
                        compose(&Text::new("<ick-text/>"), &registry)
                            .expect("Should compose")
                            .ids()
                            .map(str::to_string)
                            .collect::<Vec<_>>()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids: Vec<String> = handles
        .into_iter()
        .flat_map(|handle| handle.join().expect("Thread should finish"))
        .collect();
    assert_eq!(ids.len(), 40);
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 40);
}
