// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Minimal template renderer for standalone use.
//
// Inside the inventory application labels are rendered by the host's own
// template engine. Outside it (the CLI, tests) this renderer fills
// `{{ field }}` placeholders in a JScript template from the item data and
// produces only the HTML output; PDF and PNG are left empty.

use std::collections::HashMap;
use std::path::Path;

use cablabel_core::error::{CabError, Result};
use cablabel_core::{LabelDimensions, LabelItem, RenderedLabel};
use tracing::{debug, instrument};

use crate::traits::LabelRenderer;

#[derive(Debug, Clone)]
struct Template {
    source: String,
    dimensions: LabelDimensions,
}

/// Placeholder renderer over a set of named JScript templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateRenderer {
    templates: HashMap<String, Template>,
}

impl TemplateRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `source` under `name`.
    pub fn with_template(
        mut self,
        name: impl Into<String>,
        source: impl Into<String>,
        dimensions: LabelDimensions,
    ) -> Self {
        self.templates.insert(
            name.into(),
            Template {
                source: source.into(),
                dimensions,
            },
        );
        self
    }

    /// Register the contents of `path`, named by its file path as given.
    pub fn load_file(self, path: impl AsRef<Path>, dimensions: LabelDimensions) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), len = source.len(), "template loaded");
        Ok(self.with_template(path.display().to_string(), source, dimensions))
    }
}

impl LabelRenderer for TemplateRenderer {
    #[instrument(skip(self, item), fields(item = %item.id))]
    fn render(&self, template: &str, item: &LabelItem) -> Result<RenderedLabel> {
        let tpl = self
            .templates
            .get(template)
            .ok_or_else(|| CabError::Render(format!("unknown template '{template}'")))?;

        let html = fill_placeholders(&tpl.source, item)?;
        let stem = Path::new(template)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("label");

        Ok(RenderedLabel {
            html,
            pdf: Vec::new(),
            png: Vec::new(),
            filename: format!("{stem}-{}.pdf", item.id),
        })
    }

    fn dimensions(&self, template: &str) -> LabelDimensions {
        self.templates
            .get(template)
            .map(|t| t.dimensions)
            .unwrap_or_default()
    }
}

/// Replace every `{{ name }}` in `source`. `id` resolves to the item id, any
/// other name to the matching field of the item data. Unknown names are an
/// error rather than silently printing a blank.
fn fill_placeholders(source: &str, item: &LabelItem) -> Result<String> {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or_else(|| CabError::Render("unterminated '{{' in template".into()))?;
        let name = after[..end].trim();

        let value = if name == "id" {
            item.id.clone()
        } else {
            match item.data.get(name) {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(serde_json::Value::Null) | None => {
                    return Err(CabError::Render(format!(
                        "item {} has no field '{name}'",
                        item.id
                    )));
                }
                Some(other) => other.to_string(),
            }
        };
        out.push_str(&value);
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}
