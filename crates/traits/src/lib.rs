pub mod source;

pub use source::{InMemoryTemplateSource, SharedTemplateData, TemplateError, TemplateSource};
