//! Prompt templates exposed as callable handles.

use crate::error::{ArgumentIssue, BridgeError, ValidationError};
use crate::fmt::{TextFormat, TextOptions};
use crate::hydrate::ContentBlock;
use crate::remote::PromptSource;
use crate::schema::json_kind;
use crate::sync::SyncBridge;
use futures::future::BoxFuture;
use serde_json::{Map, Value as Json};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptArgument {
    pub name: String,
    pub description: Option<String>,
    pub required: bool,
}

/// A prompt template as advertised by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub arguments: Vec<PromptArgument>,
}

/// One rendered prompt message.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptMessage {
    pub role: String,
    pub content: ContentBlock,
}

impl PromptMessage {
    pub fn new(role: impl Into<String>, content: ContentBlock) -> Self {
        Self {
            role: role.into(),
            content,
        }
    }
}

impl TextFormat for [PromptMessage] {
    /// One `role: content` line per message.
    fn fmt_text(&self, opts: &TextOptions) -> String {
        self.iter()
            .map(|m| format!("{}: {}", m.role, m.content.fmt_text(opts)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Callable handle for one prompt template.
#[derive(Clone)]
pub struct PromptHandle {
    descriptor: PromptDescriptor,
    source: Arc<dyn PromptSource>,
}

impl std::fmt::Debug for PromptHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptHandle")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

impl PromptHandle {
    pub fn new(descriptor: PromptDescriptor, source: Arc<dyn PromptSource>) -> Self {
        Self { descriptor, source }
    }

    pub fn descriptor(&self) -> &PromptDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Check arguments: required present, names known, values strings.
    fn check(&self, args: Json) -> Result<Map<String, Json>, ValidationError> {
        let invalid = |issues| ValidationError {
            capability: self.descriptor.name.clone(),
            issues,
        };
        let map = match args {
            Json::Null => Map::new(),
            Json::Object(m) => m,
            other => {
                return Err(invalid(vec![ArgumentIssue::new(
                    "<arguments>",
                    format!("expected an object, got {}", json_kind(&other)),
                )]));
            }
        };
        let mut issues = Vec::new();
        for arg in self.descriptor.arguments.iter().filter(|a| a.required) {
            if !map.contains_key(&arg.name) {
                issues.push(ArgumentIssue::new(&arg.name, "missing required argument"));
            }
        }
        for (key, value) in &map {
            if !self.descriptor.arguments.iter().any(|a| a.name == *key) {
                issues.push(ArgumentIssue::new(key, "unknown argument"));
            } else if !value.is_string() {
                issues.push(ArgumentIssue::new(
                    key,
                    format!("expected string, got {}", json_kind(value)),
                ));
            }
        }
        if issues.is_empty() {
            Ok(map)
        } else {
            Err(invalid(issues))
        }
    }

    /// Render the prompt with `args`.
    pub fn get_async(&self, args: Json) -> BoxFuture<'static, Result<Vec<PromptMessage>, BridgeError>> {
        let checked = self.check(args);
        let source = Arc::clone(&self.source);
        let name = self.descriptor.name.clone();
        Box::pin(async move {
            let args = checked?;
            source
                .get_prompt(&name, args)
                .await
                .map_err(|e| e.into_bridge(&name))
        })
    }

    /// Render from synchronous code.
    pub fn get(&self, args: Json) -> Result<Vec<PromptMessage>, BridgeError> {
        SyncBridge::block_on(self.get_async(args))?
    }

    /// Render and flatten to `role: content` lines.
    pub async fn render_text(&self, args: Json) -> Result<String, BridgeError> {
        let messages = self.get_async(args).await?;
        Ok(messages.fmt_text(&TextOptions::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::RemoteError;
    use serde_json::json;

    struct Greeter;

    impl PromptSource for Greeter {
        fn list_prompts(&self) -> BoxFuture<'static, Result<Vec<PromptDescriptor>, RemoteError>> {
            Box::pin(async { Ok(Vec::new()) })
        }

        fn get_prompt(
            &self,
            _name: &str,
            args: Map<String, Json>,
        ) -> BoxFuture<'static, Result<Vec<PromptMessage>, RemoteError>> {
            let who = args
                .get("who")
                .and_then(Json::as_str)
                .unwrap_or("world")
                .to_string();
            Box::pin(async move {
                Ok(vec![
                    PromptMessage::new("system", ContentBlock::text("Be brief.")),
                    PromptMessage::new("user", ContentBlock::text(format!("Greet {who}"))),
                ])
            })
        }
    }

    fn handle() -> PromptHandle {
        PromptHandle::new(
            PromptDescriptor {
                name: "greet".into(),
                description: None,
                arguments: vec![PromptArgument {
                    name: "who".into(),
                    description: None,
                    required: true,
                }],
            },
            Arc::new(Greeter),
        )
    }

    #[tokio::test]
    async fn renders_role_lines() {
        let text = handle().render_text(json!({"who": "Ada"})).await.unwrap();
        assert_eq!(text, "system: Be brief.\nuser: Greet Ada");
    }

    #[tokio::test]
    async fn missing_required_argument_is_rejected() {
        let err = handle().get_async(json!({})).await.unwrap_err();
        match err {
            BridgeError::Validation(v) => assert_eq!(v.argument_names(), vec!["who"]),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn blocking_get() {
        let messages = handle().get(json!({"who": "Bob"})).unwrap();
        assert_eq!(messages.len(), 2);
    }
}
