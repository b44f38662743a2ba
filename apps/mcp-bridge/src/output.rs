//! Terminal rendering of discovered capabilities and results.

use colored::Colorize;
use mcp_bridge_core::{
    BridgedServer, Hydrated, PromptDescriptor, TextFormat, TextOptions, ToolDescriptor,
    TypeDescriptor, TypeKind,
};

/// Short type label: `integer`, `string[]`, `"c"|"f"`, `number?`.
pub fn type_label(ty: &TypeDescriptor) -> String {
    match &ty.kind {
        TypeKind::Primitive(p) => p.keyword().to_string(),
        TypeKind::Array(Some(element)) => format!("{}[]", type_label(element)),
        TypeKind::Array(None) => "array".to_string(),
        TypeKind::Object(_) => "object".to_string(),
        TypeKind::Enum { values, .. } => values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("|"),
        TypeKind::Nullable { inner, .. } => format!("{}?", type_label(inner)),
        TypeKind::Opaque(_) => "any".to_string(),
    }
}

/// `name(a: integer, [units: "c"|"f" = "c"])`, optional arguments bracketed.
pub fn tool_signature(tool: &ToolDescriptor) -> String {
    let params: Vec<String> = tool
        .arguments()
        .iter()
        .map(|arg| {
            let base = format!("{}: {}", arg.name, type_label(&arg.ty));
            match (&arg.default, arg.required) {
                (_, true) => base,
                (Some(d), false) => format!("[{base} = {d}]"),
                (None, false) => format!("[{base}]"),
            }
        })
        .collect();
    let open = if tool.is_open() { "..." } else { "" };
    format!("{}({}{open})", tool.name(), params.join(", "))
}

pub fn prompt_signature(prompt: &PromptDescriptor) -> String {
    let params: Vec<String> = prompt
        .arguments
        .iter()
        .map(|a| {
            if a.required {
                a.name.clone()
            } else {
                format!("[{}]", a.name)
            }
        })
        .collect();
    format!("{}({})", prompt.name, params.join(", "))
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

pub fn print_listing(server: &BridgedServer) {
    println!(
        "{} ({}, {}, {})",
        server.server_name().bold(),
        plural(server.tools().len(), "tool"),
        plural(server.resources().len(), "resource"),
        plural(server.prompts().len(), "prompt"),
    );

    if !server.tools().is_empty() {
        println!("\n{}", "Tools".underline());
        for tool in server.tools() {
            let sig = tool_signature(tool.descriptor());
            match tool.description() {
                Some(d) => println!("  {}  {}", sig.cyan(), first_line(d).dimmed()),
                None => println!("  {}", sig.cyan()),
            }
        }
    }

    if !server.resources().is_empty() {
        println!("\n{}", "Resources".underline());
        for resource in server.resources() {
            let d = resource.descriptor();
            let kind = if d.is_static() { "static" } else { "dynamic" };
            println!("  {}  {}  {}", d.attribute_name().cyan(), d.uri, kind.dimmed());
        }
    }

    if !server.prompts().is_empty() {
        println!("\n{}", "Prompts".underline());
        for prompt in server.prompts() {
            let d = prompt.descriptor();
            let sig = prompt_signature(d).cyan();
            match &d.description {
                Some(desc) => println!("  {sig}  {}", first_line(desc).dimmed()),
                None => println!("  {sig}"),
            }
        }
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

pub fn print_hydrated(result: &Hydrated, json: bool) {
    if json {
        println!("{}", mcp_bridge_core::fallback_text_from_json(&result.value()));
    } else {
        println!("{}", result.fmt_text(&TextOptions::default()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcp_bridge_core::CapabilitySpec;
    use serde_json::json;

    fn forecast() -> ToolDescriptor {
        ToolDescriptor::from_capability(&CapabilitySpec::new(
            "getForecast",
            json!({
                "type": "object",
                "properties": {
                    "city": {"type": "string"},
                    "units": {"enum": ["c", "f"], "default": "c"},
                    "days": {"type": ["integer", "null"]},
                    "tags": {"type": "array", "items": {"type": "string"}}
                },
                "required": ["city"]
            }),
        ))
        .unwrap()
    }

    #[test]
    fn signature_marks_optional_and_defaults() {
        assert_eq!(
            tool_signature(&forecast()),
            r#"getForecast(city: string, [units: "c"|"f" = "c"], [days: integer?], [tags: string[]])"#
        );
    }

    #[test]
    fn open_tools_show_ellipsis() {
        let open = ToolDescriptor::from_capability(&CapabilitySpec::new("raw", json!({"type": "string"})))
            .unwrap();
        assert!(tool_signature(&open).ends_with("...)"));
    }

    #[test]
    fn prompt_signature_brackets_optional() {
        let p = PromptDescriptor {
            name: "review".into(),
            description: None,
            arguments: vec![
                mcp_bridge_core::PromptArgument {
                    name: "code".into(),
                    description: None,
                    required: true,
                },
                mcp_bridge_core::PromptArgument {
                    name: "style".into(),
                    description: None,
                    required: false,
                },
            ],
        };
        assert_eq!(prompt_signature(&p), "review(code, [style])");
    }
}
