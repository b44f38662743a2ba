//! MCP tool schema renderer.

use crate::descriptor::ToolDescriptor;
use serde_json::{Map, Value};

/// Render a tool as an MCP tool definition.
///
/// Output format:
/// ```json
/// {
///   "name": "...",
///   "description": "...",
///   "inputSchema": { ... },
///   "outputSchema": { ... }  // optional
/// }
/// ```
pub fn render_tool(tool: &ToolDescriptor) -> Value {
    let mut obj = Map::new();
    obj.insert("name".into(), Value::String(tool.name().to_string()));
    if let Some(d) = tool.description() {
        obj.insert("description".into(), Value::String(d.to_string()));
    }
    obj.insert("inputSchema".into(), tool.input_schema());
    if let Some(out) = tool.output_schema() {
        obj.insert("outputSchema".into(), out);
    }
    Value::Object(obj)
}
