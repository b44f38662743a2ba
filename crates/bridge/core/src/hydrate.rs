//! Result hydration: remote payloads to native values.
//!
//! Precedence, first match wins:
//! 1. pre-hydrated typed data supplied by the transport
//! 2. structured content that satisfies the declared output type
//! 3. structured content shaped exactly `{"result": <scalar>}` when no
//!    output type is declared, unwrapped to the scalar
//! 4. any other structured content, as a generic mapping
//! 5. the content blocks, unmodified

use crate::error::BridgeError;
use crate::schema::{TypeDescriptor, TypeKind};
use crate::validate;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as Json};
use tracing::warn;

/// Annotation set on output schemas whose payload is wrapped as `{"result": ...}`.
pub const WRAP_RESULT_KEY: &str = "x-fastmcp-wrap-result";

/// One content block of a tool result.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Text(String),
    Image { data: String, mime_type: String },
    Audio { data: String, mime_type: String },
    /// Embedded resource, kept as sent.
    Resource(Json),
    ResourceLink { uri: String, name: Option<String> },
    /// Unrecognized block type, kept as sent.
    Other(Json),
}

impl ContentBlock {
    pub fn text(s: impl Into<String>) -> Self {
        ContentBlock::Text(s.into())
    }

    /// Decode a wire content block.
    pub fn from_json(value: &Json) -> Self {
        let str_field = |k: &str| value.get(k).and_then(Json::as_str).map(str::to_string);
        let kind = value.get("type").and_then(Json::as_str);
        match kind {
            Some("text") => match str_field("text") {
                Some(t) => ContentBlock::Text(t),
                None => ContentBlock::Other(value.clone()),
            },
            Some(k @ ("image" | "audio")) => match (str_field("data"), str_field("mimeType")) {
                (Some(data), Some(mime_type)) if k == "image" => {
                    ContentBlock::Image { data, mime_type }
                }
                (Some(data), Some(mime_type)) => ContentBlock::Audio { data, mime_type },
                _ => ContentBlock::Other(value.clone()),
            },
            Some("resource") => match value.get("resource") {
                Some(r) => ContentBlock::Resource(r.clone()),
                None => ContentBlock::Other(value.clone()),
            },
            Some("resource_link") => match str_field("uri") {
                Some(uri) => ContentBlock::ResourceLink {
                    uri,
                    name: str_field("name"),
                },
                None => ContentBlock::Other(value.clone()),
            },
            _ => ContentBlock::Other(value.clone()),
        }
    }

    /// Encode back to the wire shape.
    pub fn to_json(&self) -> Json {
        match self {
            ContentBlock::Text(t) => serde_json::json!({"type": "text", "text": t}),
            ContentBlock::Image { data, mime_type } => {
                serde_json::json!({"type": "image", "data": data, "mimeType": mime_type})
            }
            ContentBlock::Audio { data, mime_type } => {
                serde_json::json!({"type": "audio", "data": data, "mimeType": mime_type})
            }
            ContentBlock::Resource(r) => serde_json::json!({"type": "resource", "resource": r}),
            ContentBlock::ResourceLink { uri, name } => {
                let mut m = Map::new();
                m.insert("type".into(), Json::String("resource_link".into()));
                m.insert("uri".into(), Json::String(uri.clone()));
                if let Some(n) = name {
                    m.insert("name".into(), Json::String(n.clone()));
                }
                Json::Object(m)
            }
            ContentBlock::Other(v) => v.clone(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Result envelope fields as received.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultEnvelope {
    pub content: Option<Vec<ContentBlock>>,
    pub structured: Option<Json>,
    /// Typed data already hydrated by the transport.
    pub typed: Option<Json>,
    pub is_error: bool,
}

/// Raw payload returned by a [`RemoteInvoker`](crate::remote::RemoteInvoker).
#[derive(Debug, Clone, PartialEq)]
pub enum RawResult {
    Envelope(ResultEnvelope),
    /// A bare value with no envelope.
    Bare(Json),
}

impl RawResult {
    /// Decode a wire result. Objects carrying `content`, `structuredContent`
    /// or `isError` are envelopes; anything else is bare.
    pub fn from_json(value: Json) -> Self {
        let Json::Object(map) = &value else {
            return RawResult::Bare(value);
        };
        let is_envelope = ["content", "structuredContent", "isError"]
            .iter()
            .any(|k| map.contains_key(*k));
        if !is_envelope {
            return RawResult::Bare(value);
        }
        let content = map
            .get("content")
            .and_then(Json::as_array)
            .map(|blocks| blocks.iter().map(ContentBlock::from_json).collect());
        let structured = map
            .get("structuredContent")
            .filter(|v| !v.is_null())
            .cloned();
        RawResult::Envelope(ResultEnvelope {
            content,
            structured,
            typed: None,
            is_error: map.get("isError").and_then(Json::as_bool).unwrap_or(false),
        })
    }

    pub fn content(blocks: Vec<ContentBlock>) -> Self {
        RawResult::Envelope(ResultEnvelope {
            content: Some(blocks),
            ..ResultEnvelope::default()
        })
    }

    pub fn structured(value: Json) -> Self {
        RawResult::Envelope(ResultEnvelope {
            structured: Some(value),
            ..ResultEnvelope::default()
        })
    }

    pub fn typed(value: Json) -> Self {
        RawResult::Envelope(ResultEnvelope {
            typed: Some(value),
            ..ResultEnvelope::default()
        })
    }

    pub fn error(message: impl Into<String>) -> Self {
        RawResult::Envelope(ResultEnvelope {
            content: Some(vec![ContentBlock::Text(message.into())]),
            is_error: true,
            ..ResultEnvelope::default()
        })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RawResult::Envelope(e) if e.is_error)
    }

    /// Text of an error result, joined from its text blocks.
    pub fn error_text(&self) -> String {
        let RawResult::Envelope(e) = self else {
            return String::new();
        };
        let text = e
            .content
            .iter()
            .flatten()
            .filter_map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("\n");
        if text.is_empty() {
            "tool reported an error".into()
        } else {
            text
        }
    }
}

/// A hydrated native value.
#[derive(Debug, Clone, PartialEq)]
pub enum Hydrated {
    /// Matched (or was pre-hydrated against) a declared output type.
    Typed {
        value: Json,
        descriptor: Option<TypeDescriptor>,
    },
    /// Structured content with no matching declared type.
    Structured(Json),
    /// Content blocks, in order, unmodified.
    Content(Vec<ContentBlock>),
    /// An unwrapped scalar.
    Primitive(Json),
}

impl Hydrated {
    /// The value as JSON. Content becomes an array of wire blocks.
    pub fn value(&self) -> Json {
        match self {
            Hydrated::Typed { value, .. } | Hydrated::Structured(value) | Hydrated::Primitive(value) => {
                value.clone()
            }
            Hydrated::Content(blocks) => Json::Array(blocks.iter().map(ContentBlock::to_json).collect()),
        }
    }

    pub fn into_value(self) -> Json {
        match self {
            Hydrated::Typed { value, .. } | Hydrated::Structured(value) | Hydrated::Primitive(value) => {
                value
            }
            Hydrated::Content(blocks) => Json::Array(blocks.iter().map(ContentBlock::to_json).collect()),
        }
    }

    /// Text view: a string scalar, or the joined text blocks.
    pub fn text(&self) -> Option<String> {
        match self {
            Hydrated::Primitive(Json::String(s)) => Some(s.clone()),
            Hydrated::Content(blocks) => {
                let texts: Vec<&str> = blocks.iter().filter_map(ContentBlock::as_text).collect();
                (!texts.is_empty()).then(|| texts.join("\n"))
            }
            _ => None,
        }
    }

    /// Deserialize the value into a native type.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.value())
    }
}

/// Hydrate `raw` for `capability` using its declared output type, if any.
pub fn hydrate(
    capability: &str,
    raw: &RawResult,
    output: Option<&TypeDescriptor>,
) -> Result<Hydrated, BridgeError> {
    let envelope = match raw {
        RawResult::Bare(v) => return Ok(hydrate_value(capability, v, output)),
        RawResult::Envelope(e) => e,
    };
    if let Some(typed) = &envelope.typed {
        return Ok(Hydrated::Typed {
            value: typed.clone(),
            descriptor: output.cloned(),
        });
    }
    if let Some(structured) = &envelope.structured {
        return Ok(hydrate_value(capability, structured, output));
    }
    match &envelope.content {
        Some(blocks) => Ok(Hydrated::Content(blocks.clone())),
        None => Err(BridgeError::hydration(
            capability,
            "payload carries no typed, structured or content data",
        )),
    }
}

fn hydrate_value(capability: &str, value: &Json, output: Option<&TypeDescriptor>) -> Hydrated {
    if let Some(desc) = output {
        match validate::coerce(desc, value) {
            Ok(coerced) => return typed(coerced, desc),
            Err(problems) => {
                warn!(
                    capability,
                    problems = %problems.join("; "),
                    "structured result does not match declared output type"
                );
            }
        }
    } else if let Some(scalar) = single_result_scalar(value) {
        return Hydrated::Primitive(scalar);
    }
    if is_scalar(value) {
        return Hydrated::Primitive(value.clone());
    }
    Hydrated::Structured(value.clone())
}

fn typed(value: Json, desc: &TypeDescriptor) -> Hydrated {
    let wrapped = desc.annotations.get(WRAP_RESULT_KEY) == Some(&Json::Bool(true));
    if wrapped && let Json::Object(map) = &value && let Some(inner) = map.get("result") {
        let inner_ty = match &desc.kind {
            TypeKind::Object(obj) => obj.field("result").cloned(),
            _ => None,
        };
        return Hydrated::Typed {
            value: inner.clone(),
            descriptor: inner_ty,
        };
    }
    Hydrated::Typed {
        value,
        descriptor: Some(desc.clone()),
    }
}

fn single_result_scalar(value: &Json) -> Option<Json> {
    let map = value.as_object()?;
    if map.len() != 1 {
        return None;
    }
    map.get("result").filter(|v| is_scalar(v)).cloned()
}

fn is_scalar(v: &Json) -> bool {
    !matches!(v, Json::Array(_) | Json::Object(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person() -> TypeDescriptor {
        TypeDescriptor::parse(&json!({
            "type": "object",
            "properties": {"name": {"type": "string"}, "age": {"type": "integer"}},
            "required": ["name", "age"]
        }))
        .unwrap()
    }

    #[test]
    fn typed_data_wins() {
        let raw = RawResult::Envelope(ResultEnvelope {
            typed: Some(json!({"name": "Ada"})),
            structured: Some(json!({"ignored": true})),
            content: Some(vec![ContentBlock::text("x")]),
            is_error: false,
        });
        let h = hydrate("t", &raw, None).unwrap();
        assert_eq!(h.value(), json!({"name": "Ada"}));
        assert!(matches!(h, Hydrated::Typed { .. }));
    }

    #[test]
    fn structured_matching_output_is_typed() {
        let out = person();
        let raw = RawResult::structured(json!({"name": "Ada", "age": 36.0}));
        match hydrate("t", &raw, Some(&out)).unwrap() {
            Hydrated::Typed { value, descriptor } => {
                assert_eq!(value, json!({"name": "Ada", "age": 36}));
                assert_eq!(descriptor, Some(out));
            }
            other => panic!("expected typed, got {other:?}"),
        }
    }

    #[test]
    fn mismatch_falls_back_to_structured() {
        let raw = RawResult::structured(json!({"name": "Ada"}));
        let h = hydrate("t", &raw, Some(&person())).unwrap();
        assert_eq!(h, Hydrated::Structured(json!({"name": "Ada"})));
    }

    #[test]
    fn single_result_scalar_is_unwrapped() {
        let h = hydrate("t", &RawResult::structured(json!({"result": 5})), None).unwrap();
        assert_eq!(h, Hydrated::Primitive(json!(5)));

        let h = hydrate("t", &RawResult::structured(json!({"result": [1, 2]})), None).unwrap();
        assert_eq!(h, Hydrated::Structured(json!({"result": [1, 2]})));

        let h = hydrate(
            "t",
            &RawResult::structured(json!({"result": 5, "extra": 1})),
            None,
        )
        .unwrap();
        assert_eq!(h, Hydrated::Structured(json!({"result": 5, "extra": 1})));
    }

    #[test]
    fn wrapped_output_schema_unwraps_result() {
        let out = TypeDescriptor::parse(&json!({
            "type": "object",
            "properties": {"result": {"type": "array", "items": {"type": "integer"}}},
            "required": ["result"],
            "x-fastmcp-wrap-result": true
        }))
        .unwrap();
        let raw = RawResult::structured(json!({"result": [1, 2, 3]}));
        match hydrate("t", &raw, Some(&out)).unwrap() {
            Hydrated::Typed { value, descriptor } => {
                assert_eq!(value, json!([1, 2, 3]));
                assert!(matches!(descriptor.unwrap().kind, TypeKind::Array(_)));
            }
            other => panic!("expected typed, got {other:?}"),
        }
    }

    #[test]
    fn content_only_is_returned_unmodified() {
        let blocks = vec![
            ContentBlock::text("first"),
            ContentBlock::Other(json!({"type": "custom", "x": 1})),
            ContentBlock::text("second"),
        ];
        let h = hydrate("t", &RawResult::content(blocks.clone()), None).unwrap();
        assert_eq!(h, Hydrated::Content(blocks));
        assert_eq!(h.text().as_deref(), Some("first\nsecond"));
    }

    #[test]
    fn empty_envelope_is_a_hydration_error() {
        let raw = RawResult::Envelope(ResultEnvelope::default());
        let err = hydrate("t", &raw, None).unwrap_err();
        assert!(matches!(err, BridgeError::Hydration { .. }));
    }

    #[test]
    fn bare_scalar_is_primitive() {
        let h = hydrate("t", &RawResult::Bare(json!("hi")), None).unwrap();
        assert_eq!(h, Hydrated::Primitive(json!("hi")));
    }

    #[test]
    fn wire_envelope_decodes() {
        let raw = RawResult::from_json(json!({
            "content": [{"type": "text", "text": "5"}],
            "structuredContent": {"result": 5},
            "isError": false
        }));
        assert_eq!(hydrate("t", &raw, None).unwrap(), Hydrated::Primitive(json!(5)));

        let raw = RawResult::from_json(json!({
            "content": [{"type": "text", "text": "boom"}],
            "isError": true
        }));
        assert!(raw.is_error());
        assert_eq!(raw.error_text(), "boom");
    }

    #[test]
    fn deserializes_into_native_types() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Person {
            name: String,
            age: u32,
        }
        let h = hydrate(
            "t",
            &RawResult::structured(json!({"name": "Ada", "age": 36})),
            Some(&person()),
        )
        .unwrap();
        assert_eq!(
            h.deserialize::<Person>().unwrap(),
            Person {
                name: "Ada".into(),
                age: 36
            }
        );
    }
}
