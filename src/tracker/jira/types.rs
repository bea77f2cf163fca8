use serde::Deserialize;

/// `GET /rest/api/3/issue/{key}` response, reduced to the fields we use.
#[derive(Debug, Deserialize)]
pub struct JiraIssue {
    pub key: String,
    pub fields: JiraFields,
}

#[derive(Debug, Deserialize)]
pub struct JiraFields {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: Option<JiraDescription>,
    #[serde(default)]
    pub status: Option<NamedField>,
    #[serde(default)]
    pub issuetype: Option<NamedField>,
}

#[derive(Debug, Deserialize)]
pub struct NamedField {
    pub name: String,
}

/// API v2 returns plain text, API v3 returns an Atlassian Document Format
/// tree.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum JiraDescription {
    Text(String),
    Document(AdfNode),
}

#[derive(Debug, Default, Deserialize)]
pub struct AdfNode {
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub content: Vec<AdfNode>,
}

impl JiraDescription {
    /// Plain text of the description. ADF text nodes are joined with single
    /// spaces in document order.
    pub fn to_plain_text(&self) -> String {
        match self {
            JiraDescription::Text(text) => text.trim().to_string(),
            JiraDescription::Document(root) => {
                let mut parts = vec![];
                collect_text(root, &mut parts);
                parts.join(" ")
            }
        }
    }
}

fn collect_text<'a>(node: &'a AdfNode, parts: &mut Vec<&'a str>) {
    if node.node_type == "text"
        && let Some(text) = node.text.as_deref()
    {
        parts.push(text);
    }

    for child in node.content.iter() {
        collect_text(child, parts);
    }
}
