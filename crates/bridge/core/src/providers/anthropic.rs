//! Anthropic tool schema renderer.

use crate::descriptor::ToolDescriptor;
use serde_json::{Value, json};

/// Render a tool as an Anthropic tool definition.
///
/// Output format:
/// ```json
/// {
///   "name": "...",
///   "description": "...",
///   "strict": true,
///   "input_schema": { ... }
/// }
/// ```
pub fn render_tool(tool: &ToolDescriptor, strict: bool) -> Value {
    json!({
        "name": tool.name(),
        "description": tool.description().unwrap_or_default(),
        "strict": strict,
        "input_schema": tool.input_type().render_schema()
    })
}
