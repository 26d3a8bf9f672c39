use crate::builders::Context as DocContext;
use crate::error::PipelineError;
use crate::language::Language;
use crate::registry::{TemplateSpec, resolve_template};
use handlebars::{Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use log::debug;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tradedoc_traits::TemplateSource;

/// Formats a number (or numeric string) with two decimals. Non-numbers print as-is.
fn money_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let formatted = match h.param(0).map(|p| p.value()) {
        Some(Value::Number(n)) => n
            .as_f64()
            .and_then(|f| Decimal::try_from(f).ok())
            .map(|d| format!("{:.2}", d))
            .unwrap_or_else(|| n.to_string()),
        Some(Value::String(s)) => match Decimal::from_str(s.trim()) {
            Ok(d) => format!("{:.2}", d),
            Err(_) => s.clone(),
        },
        _ => String::new(),
    };
    out.write(&formatted)?;
    Ok(())
}

fn upper_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let text = match h.param(0).map(|p| p.value()) {
        Some(Value::String(s)) => s.to_uppercase(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string().to_uppercase(),
    };
    out.write(&text)?;
    Ok(())
}

/// Renders document templates with Handlebars.
///
/// Output is HTML-escaped.
pub struct HtmlRenderer {
    source: Arc<dyn TemplateSource>,
    engine: Handlebars<'static>,
}

impl std::fmt::Debug for HtmlRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlRenderer")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl HtmlRenderer {
    pub fn new(source: Arc<dyn TemplateSource>) -> Self {
        let mut engine = Handlebars::new();
        engine.set_strict_mode(false);
        engine.register_helper("money", Box::new(money_helper));
        engine.register_helper("upper", Box::new(upper_helper));
        Self { source, engine }
    }

    pub fn source(&self) -> &dyn TemplateSource {
        self.source.as_ref()
    }

    /// Looks up the template for `doc_code` in `lang`.
    pub fn resolve(&self, doc_code: &str, lang: Language) -> Result<TemplateSpec, PipelineError> {
        resolve_template(self.source.as_ref(), doc_code, lang)
    }

    /// Resolves, loads and renders the template for `doc_code`.
    ///
    /// Values in the template's `extra` map override the context.
    pub fn render(&self, doc_code: &str, lang: Language, ctx: &DocContext) -> Result<String, PipelineError> {
        let spec = self.resolve(doc_code, lang)?;
        let mut merged = ctx.clone();
        if let Some(extra) = &spec.extra {
            for (k, v) in extra {
                merged.insert(k.clone(), v.clone());
            }
        }
        self.render_path(&spec.path, &merged)
    }

    /// Renders the template at `path` (relative to the source root).
    pub fn render_path(&self, path: &str, ctx: &DocContext) -> Result<String, PipelineError> {
        let template = self.source.load(path)?;
        debug!("Rendering template {} ({} bytes)", path, template.len());
        self.engine
            .render_template(&template, ctx)
            .map_err(|e| PipelineError::HtmlRender(format!("{}: {}", path, e)))
    }
}
