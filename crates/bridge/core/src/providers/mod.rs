//! Provider-specific tool definitions rendered from [`ToolDescriptor`]s.
//!
//! Each provider has slightly different requirements for tool schemas:
//! - OpenAI: `{"type": "function", "function": {...}}`
//! - Anthropic: Direct object with `input_schema` field
//! - MCP: Direct object with `inputSchema`/`outputSchema`
//!
//! The schemas are the caller-visible ones, so transformed tools advertise
//! their renamed and hidden arguments correctly.
//!
//! [`ToolDescriptor`]: crate::ToolDescriptor

pub mod anthropic;
pub mod mcp;
pub mod openai;

#[cfg(test)]
pub(crate) fn sample_descriptor() -> crate::ToolDescriptor {
    use crate::{ArgumentDescriptor, TypeDescriptor};
    crate::ToolDescriptor::new(
        "search",
        Some("Search for something".into()),
        vec![
            ArgumentDescriptor::new("query", TypeDescriptor::string()).required(),
            ArgumentDescriptor::new("limit", TypeDescriptor::integer())
                .with_default(serde_json::json!(10)),
        ],
        Some(TypeDescriptor::array(TypeDescriptor::string())),
    )
    .unwrap()
}
