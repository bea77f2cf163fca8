use derive_builder::Builder;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::assembler::category::Category;

/// Default label for the upstream project in generated documents.
pub const DEFAULT_UPSTREAM_NAME: &str = "Upstream";

/// Markdown document layout configuration.
#[derive(
    Debug, Default, Clone, Serialize, Deserialize, JsonSchema, Builder,
)]
#[builder(setter(into, strip_option), default)]
#[serde(default)]
pub struct DocumentConfig {
    /// Optional [Tera](https://github.com/Keats/tera) template replacing the
    /// built-in document layout.
    ///
    /// default: [`crate::assembler::template::DEFAULT_TEMPLATE`]
    pub template: Option<String>,
    /// Name of the upstream project used in the intro paragraph and the
    /// Upstream Improvements section.
    pub upstream_name: String,
    /// Extra tracker issue-type → section mappings, checked before the
    /// built-in table. Keys match case-insensitively.
    pub categories: BTreeMap<String, Category>,
}

impl DocumentConfig {
    pub fn upstream_name(&self) -> &str {
        if self.upstream_name.trim().is_empty() {
            DEFAULT_UPSTREAM_NAME
        } else {
            &self.upstream_name
        }
    }
}
