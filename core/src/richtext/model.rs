use serde::{Deserialize, Serialize};

/// One piece of a rich-text value: HTML text, or an entity embedded between text pieces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RichTextFragment {
    Text(String),
    Entity(serde_json::Value),
}

impl RichTextFragment {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RichTextFragment::Text(text) => Some(text),
            RichTextFragment::Entity(_) => None,
        }
    }
}

impl From<&str> for RichTextFragment {
    fn from(text: &str) -> Self {
        RichTextFragment::Text(text.to_string())
    }
}

impl From<String> for RichTextFragment {
    fn from(text: String) -> Self {
        RichTextFragment::Text(text)
    }
}

/// Rich-text field value in the R2 JSON shape (`{"$type": "RichTextData", "Fragments": [...]}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RichText {
    #[serde(rename = "$type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(rename = "Fragments", default)]
    pub fragments: Vec<RichTextFragment>,
}

impl RichText {
    pub fn from_fragments<I, F>(fragments: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<RichTextFragment>,
    {
        Self {
            type_name: None,
            fragments: fragments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn text_fragments(&self) -> impl Iterator<Item = &str> {
        self.fragments.iter().filter_map(RichTextFragment::as_text)
    }

    pub fn text_fragments_mut(&mut self) -> impl Iterator<Item = &mut String> {
        self.fragments.iter_mut().filter_map(|fragment| match fragment {
            RichTextFragment::Text(text) => Some(text),
            RichTextFragment::Entity(_) => None,
        })
    }

    /// Concatenated text of all text fragments; embedded entities are skipped.
    pub fn to_html(&self) -> String {
        self.text_fragments().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_mixed_fragments() {
        let json = r#"{
            "$type": "RichTextData",
            "Fragments": [
                "<p>Intro ",
                {"$type": "EntityModelData", "Id": "980"},
                " outro</p>"
            ]
        }"#;
        let rich_text: RichText = serde_json::from_str(json).unwrap();

        assert_eq!(rich_text.type_name.as_deref(), Some("RichTextData"));
        assert_eq!(rich_text.fragments.len(), 3);
        assert!(matches!(rich_text.fragments[1], RichTextFragment::Entity(_)));
        assert_eq!(rich_text.to_html(), "<p>Intro  outro</p>");
    }

    #[test]
    fn serializes_back_to_same_shape() {
        let rich_text = RichText::from_fragments(["<p>a</p>", "<p>b</p>"]);
        let json = serde_json::to_value(&rich_text).unwrap();
        assert_eq!(json, serde_json::json!({"Fragments": ["<p>a</p>", "<p>b</p>"]}));
    }

    #[test]
    fn mutates_only_text_fragments() {
        let mut rich_text = RichText::from_fragments(["a", "b"]);
        rich_text
            .fragments
            .insert(1, RichTextFragment::Entity(serde_json::json!({"Id": "1"})));

        for text in rich_text.text_fragments_mut() {
            text.push('!');
        }
        assert_eq!(rich_text.text_fragments().collect::<Vec<_>>(), vec!["a!", "b!"]);
    }
}
