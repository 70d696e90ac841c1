//! Compiled-in Handlebars templates.
//!
//! Templates only loop and branch over values computed beforehand. `{{...}}`
//! escapes user text such as titles and captions, `{{{...}}}` inserts
//! fragments that are already HTML.

use std::sync::OnceLock;

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::DatapageError;
use crate::Result;

/// Page skeleton: title, style, head elements, body
pub(crate) const PAGE: &str = "page";
/// Page heading and caption followed by the ordered elements
pub(crate) const COMPOSITE: &str = "composite";
/// Element title, caption and object
pub(crate) const SECTION: &str = "section";
/// Generic table markup
pub(crate) const TABLE: &str = "table";

/// Inline stylesheet for the page skeleton
pub(crate) const PAGE_STYLE: &str = include_str!("../../templates/page.css");

const TEMPLATES: [(&str, &str); 4] = [
    (PAGE, include_str!("../../templates/page.hbs")),
    (COMPOSITE, include_str!("../../templates/composite.hbs")),
    (SECTION, include_str!("../../templates/section.hbs")),
    (TABLE, include_str!("../../templates/table.hbs")),
];

static REGISTRY: OnceLock<Handlebars<'static>> = OnceLock::new();

fn registry() -> Result<&'static Handlebars<'static>> {
    if let Some(registry) = REGISTRY.get() {
        return Ok(registry);
    }

    let mut handlebars = Handlebars::new();
    for (name, source) in TEMPLATES {
        handlebars
            .register_template_string(name, source)
            .map_err(|e| DatapageError::Template(e.to_string()))?;
    }
    Ok(REGISTRY.get_or_init(|| handlebars))
}

/// Render a registered template.
pub(crate) fn render<T: Serialize>(name: &str, data: &T) -> Result<String> {
    registry()?
        .render(name, data)
        .map_err(|e| DatapageError::Template(e.to_string()))
}
