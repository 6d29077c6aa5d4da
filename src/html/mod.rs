//! Html element metadata: names, attributes, classes and inline style

mod attributes;
mod classes;
mod name;
mod style;
mod void;

pub use attributes::{AttributeError, AttributeSet};
pub use classes::ClassSet;
pub use name::{is_name_char, is_valid_name};
pub use style::Style;
pub use void::is_void_element;
