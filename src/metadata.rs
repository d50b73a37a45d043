//! Document metadata available to header, footer, and cover templates.

use serde::{Deserialize, Serialize};

/// Metadata injected into every template render.
///
/// All fields except `title` may be empty; `title` falls back to the
/// document's own first-level heading when no override is given. The mapping
/// is computed once per run and never mutated afterwards.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Metadata {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub date: String,
}

impl Metadata {
    /// Build a template context containing every metadata field.
    pub fn to_context(&self) -> tera::Context {
        let mut context = tera::Context::new();
        context.insert("title", &self.title);
        context.insert("subtitle", &self.subtitle);
        context.insert("project", &self.project);
        context.insert("author", &self.author);
        context.insert("date", &self.date);
        context
    }

    /// The output filename derived from the metadata: `Title.pdf`, prefixed
    /// with the project name when one is set.
    pub fn output_filename(&self) -> String {
        if self.project.is_empty() {
            format!("{}.pdf", self.title)
        } else {
            format!("{} - {}.pdf", self.project, self.title)
        }
    }
}
