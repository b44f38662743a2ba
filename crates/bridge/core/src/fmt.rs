//! Human-readable text for hydrated results.
//!
//! ```ignore
//! use mcp_bridge_core::fmt::{TextFormat, TextOptions};
//!
//! let out = proxy.call(json!({"city": "Paris"}))?;
//! println!("{}", out.fmt_text(&TextOptions::default()));
//! ```

use crate::hydrate::{ContentBlock, Hydrated};
use crate::resources::ResourceContent;
use serde_json::Value as JsonValue;

/// Text rendering style.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TextStyle {
    /// Human-friendly formatting.
    #[default]
    Humanized,
    /// Plain text without special formatting.
    Plain,
}

/// Options controlling text formatting behavior.
#[derive(Clone, Debug, Default)]
pub struct TextOptions {
    /// The rendering style to use.
    pub style: TextStyle,
    /// Whether to wrap structured output in markdown code fences.
    pub markdown: bool,
    /// Maximum number of items to display in collections.
    pub max_items: Option<usize>,
}

impl TextOptions {
    /// Create new text options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the text style.
    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    /// Enable or disable markdown formatting.
    pub fn with_markdown(mut self, markdown: bool) -> Self {
        self.markdown = markdown;
        self
    }

    /// Set the maximum number of items to display.
    pub fn with_max_items(mut self, max_items: Option<usize>) -> Self {
        self.max_items = max_items;
        self
    }
}

/// Transport-agnostic text formatting.
pub trait TextFormat {
    /// Format the value as human-readable text.
    fn fmt_text(&self, opts: &TextOptions) -> String;
}

/// Pretty JSON, or compact JSON if pretty-printing fails.
pub fn fallback_text_from_json(v: &JsonValue) -> String {
    serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
}

fn json_text(v: &JsonValue, opts: &TextOptions) -> String {
    match v {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null | JsonValue::Bool(_) | JsonValue::Number(_) => v.to_string(),
        _ if opts.style == TextStyle::Plain => v.to_string(),
        _ if opts.markdown => format!("```json\n{}\n```", fallback_text_from_json(v)),
        _ => fallback_text_from_json(v),
    }
}

impl TextFormat for ContentBlock {
    fn fmt_text(&self, opts: &TextOptions) -> String {
        match self {
            ContentBlock::Text(t) => t.clone(),
            ContentBlock::Image { mime_type, data } => {
                format!("[image {mime_type}, {} bytes base64]", data.len())
            }
            ContentBlock::Audio { mime_type, data } => {
                format!("[audio {mime_type}, {} bytes base64]", data.len())
            }
            ContentBlock::ResourceLink { uri, name } => match name {
                Some(n) => format!("[{n}]({uri})"),
                None => uri.clone(),
            },
            ContentBlock::Resource(r) => match r.get("text").and_then(JsonValue::as_str) {
                Some(text) => text.to_string(),
                None => json_text(r, opts),
            },
            ContentBlock::Other(v) => json_text(v, opts),
        }
    }
}

impl TextFormat for ResourceContent {
    fn fmt_text(&self, _opts: &TextOptions) -> String {
        match self {
            ResourceContent::Text { text, .. } => text.clone(),
            ResourceContent::Blob { uri, mime_type, blob } => format!(
                "[{} {uri}, {} bytes base64]",
                mime_type.as_deref().unwrap_or("blob"),
                blob.len()
            ),
        }
    }
}

impl TextFormat for Hydrated {
    fn fmt_text(&self, opts: &TextOptions) -> String {
        match self {
            Hydrated::Content(blocks) => {
                let limit = opts.max_items.unwrap_or(usize::MAX);
                let mut lines: Vec<String> =
                    blocks.iter().take(limit).map(|b| b.fmt_text(opts)).collect();
                if blocks.len() > limit {
                    lines.push(format!("... {} more", blocks.len() - limit));
                }
                lines.join("\n")
            }
            Hydrated::Typed { value, .. }
            | Hydrated::Structured(value)
            | Hydrated::Primitive(value) => json_text(value, opts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fallback_text_from_json() {
        let v = json!({"b": 2, "a": 1});
        assert!(fallback_text_from_json(&v).contains('\n'));
    }

    #[test]
    fn test_content_respects_max_items() {
        let h = Hydrated::Content(vec![
            ContentBlock::text("one"),
            ContentBlock::text("two"),
            ContentBlock::text("three"),
        ]);
        let opts = TextOptions::new().with_max_items(Some(2));
        assert_eq!(h.fmt_text(&opts), "one\ntwo\n... 1 more");
    }

    #[test]
    fn test_primitive_string_is_bare() {
        let h = Hydrated::Primitive(json!("sunny"));
        assert_eq!(h.fmt_text(&TextOptions::default()), "sunny");
    }

    #[test]
    fn test_markdown_wraps_structured() {
        let h = Hydrated::Structured(json!({"a": 1}));
        let text = h.fmt_text(&TextOptions::new().with_markdown(true));
        assert!(text.starts_with("```json\n"));
        let plain = h.fmt_text(&TextOptions::new().with_style(TextStyle::Plain));
        assert_eq!(plain, r#"{"a":1}"#);
    }
}
