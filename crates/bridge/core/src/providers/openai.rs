//! OpenAI function calling schema renderer.

use crate::descriptor::ToolDescriptor;
use serde_json::{Value, json};

/// Render a tool as an OpenAI function definition.
///
/// Output format:
/// ```json
/// {
///   "type": "function",
///   "function": {
///     "name": "...",
///     "description": "...",
///     "strict": true,
///     "parameters": { ... }
///   }
/// }
/// ```
pub fn render_function(tool: &ToolDescriptor, strict: bool) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name(),
            "description": tool.description().unwrap_or_default(),
            "strict": strict,
            "parameters": tool.input_type().render_schema()
        }
    })
}
