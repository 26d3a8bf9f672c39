//! Template sources for the tradedoc pipeline.
//!
//! - [`FilesystemTemplateSource`]: loads templates from a templates directory
//! - [`InMemoryTemplateSource`]: re-exported from tradedoc-traits

mod filesystem;

pub use filesystem::FilesystemTemplateSource;

pub use tradedoc_traits::InMemoryTemplateSource;
