use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Document section a ticket is listed under.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Features,
    Fixes,
    Other,
}

impl Category {
    /// Sections in document order.
    pub const ORDERED: [Category; 3] =
        [Category::Features, Category::Fixes, Category::Other];

    /// Markdown heading text for the section.
    pub fn heading(&self) -> &'static str {
        match self {
            Category::Features => "New Features",
            Category::Fixes => "Bug Fixes",
            Category::Other => "Other",
        }
    }

    /// Map a tracker issue type onto a section. Configured overrides win over
    /// the built-in table; both match case-insensitively. Unknown types go to
    /// [`Category::Other`].
    pub fn for_issue_type(
        issue_type: &str,
        overrides: &BTreeMap<String, Category>,
    ) -> Category {
        let issue_type = issue_type.trim();

        if let Some(category) = overrides
            .iter()
            .find(|(name, _)| name.trim().eq_ignore_ascii_case(issue_type))
            .map(|(_, category)| *category)
        {
            return category;
        }

        match issue_type.to_lowercase().as_str() {
            "story" | "new feature" | "improvement" | "epic" | "feature" => {
                Category::Features
            }
            "bug" | "defect" => Category::Fixes,
            _ => Category::Other,
        }
    }
}
