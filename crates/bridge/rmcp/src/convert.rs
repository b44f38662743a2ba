//! Wire-shape JSON to bridge types.
//!
//! rmcp model values are serialized to JSON first, so these readers only
//! depend on the MCP wire format and not on rmcp's struct layout.

use mcp_bridge_core::{
    CapabilitySpec, ContentBlock, PromptArgument, PromptDescriptor, PromptMessage,
    ResourceContent, ResourceDescriptor,
};
use serde_json::Value as Json;

fn str_field(value: &Json, key: &str) -> Option<String> {
    value.get(key).and_then(Json::as_str).map(str::to_string)
}

fn items<'a>(value: &'a Json, key: &str) -> impl Iterator<Item = &'a Json> {
    value
        .get(key)
        .and_then(Json::as_array)
        .into_iter()
        .flatten()
}

/// A `tools/list` entry. `None` when it has no name.
pub fn capability(tool: &Json) -> Option<CapabilitySpec> {
    let name = str_field(tool, "name")?;
    let input = tool.get("inputSchema").cloned().unwrap_or(Json::Null);
    let mut spec = CapabilitySpec::new(name, input);
    if let Some(d) = str_field(tool, "description") {
        spec = spec.with_description(d);
    }
    if let Some(out) = tool.get("outputSchema").filter(|v| !v.is_null()) {
        spec = spec.with_output_schema(out.clone());
    }
    Some(spec)
}

/// A `resources/list` entry. `None` when it has no URI.
pub fn resource(value: &Json) -> Option<ResourceDescriptor> {
    Some(ResourceDescriptor {
        uri: str_field(value, "uri")?,
        name: str_field(value, "name"),
        description: str_field(value, "description"),
        mime_type: str_field(value, "mimeType"),
    })
}

/// The `contents` of a `resources/read` result.
pub fn resource_contents(result: &Json) -> Vec<ResourceContent> {
    items(result, "contents")
        .filter_map(|item| {
            let uri = str_field(item, "uri")?;
            let mime_type = str_field(item, "mimeType");
            if let Some(text) = str_field(item, "text") {
                Some(ResourceContent::Text { uri, mime_type, text })
            } else {
                str_field(item, "blob").map(|blob| ResourceContent::Blob { uri, mime_type, blob })
            }
        })
        .collect()
}

/// A `prompts/list` entry. `None` when it has no name.
pub fn prompt(value: &Json) -> Option<PromptDescriptor> {
    let arguments = items(value, "arguments")
        .filter_map(|arg| {
            Some(PromptArgument {
                name: str_field(arg, "name")?,
                description: str_field(arg, "description"),
                required: arg.get("required").and_then(Json::as_bool).unwrap_or(false),
            })
        })
        .collect();
    Some(PromptDescriptor {
        name: str_field(value, "name")?,
        description: str_field(value, "description"),
        arguments,
    })
}

/// The `messages` of a `prompts/get` result.
pub fn prompt_messages(result: &Json) -> Vec<PromptMessage> {
    items(result, "messages")
        .map(|m| {
            let role = str_field(m, "role").unwrap_or_else(|| "user".to_string());
            let content = m.get("content").map_or_else(
                || ContentBlock::Other(Json::Null),
                ContentBlock::from_json,
            );
            PromptMessage::new(role, content)
        })
        .collect()
}

/// `(name, version)` from an initialize result.
pub fn server_identity(info: &Json) -> (Option<String>, Option<String>) {
    let implementation = info.get("serverInfo").unwrap_or(&Json::Null);
    (
        str_field(implementation, "name"),
        str_field(implementation, "version"),
    )
}

/// Whether the server declared `capability` (`"resources"`, `"prompts"`, ...)
/// in its initialize result.
pub fn declares(info: &Json, capability: &str) -> bool {
    info.get("capabilities")
        .and_then(|c| c.get(capability))
        .is_some_and(|c| !c.is_null())
}
