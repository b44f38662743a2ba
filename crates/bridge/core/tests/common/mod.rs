//! In-memory MCP server double used by the integration tests.

#![allow(dead_code)]

use mcp_bridge_core::{
    BoxFuture, CapabilitySource, CapabilitySpec, ContentBlock, PromptArgument, PromptDescriptor,
    PromptMessage, PromptSource, RawResult, RemoteError, RemoteInvoker, RemoteSession,
    ResourceContent, ResourceDescriptor, ResourceReader,
};
use serde_json::{Map, Value, json};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub struct FakeServer {
    pub tools: Vec<CapabilitySpec>,
    pub resources: Vec<ResourceDescriptor>,
    pub prompts: Vec<PromptDescriptor>,
    pub fail_listings: bool,
    pub calls: Mutex<Vec<(String, Map<String, Value>)>>,
    pub resource_reads: AtomicUsize,
}

impl FakeServer {
    pub fn new() -> Self {
        Self {
            tools: default_tools(),
            resources: vec![
                ResourceDescriptor::new("config://app/settings").with_name("appSettings"),
                ResourceDescriptor::new("live://metrics/cpuLoad"),
            ],
            prompts: vec![PromptDescriptor {
                name: "codeReview".into(),
                description: Some("Review a snippet".into()),
                arguments: vec![PromptArgument {
                    name: "code".into(),
                    description: None,
                    required: true,
                }],
            }],
            fail_listings: false,
            calls: Mutex::new(Vec::new()),
            resource_reads: AtomicUsize::new(0),
        }
    }

    pub fn without_optional_features() -> Self {
        Self {
            fail_listings: true,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<(String, Map<String, Value>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> (String, Map<String, Value>) {
        self.calls().pop().expect("no calls recorded")
    }

    pub fn reads(&self) -> usize {
        self.resource_reads.load(Ordering::SeqCst)
    }
}

fn default_tools() -> Vec<CapabilitySpec> {
    vec![
        CapabilitySpec::new(
            "add",
            json!({
                "type": "object",
                "properties": {
                    "a": {"type": "integer"},
                    "b": {"type": "integer"}
                },
                "required": ["a", "b"]
            }),
        )
        .with_description("Add two integers"),
        CapabilitySpec::new(
            "getForecast",
            json!({
                "type": "object",
                "properties": {
                    "city": {"type": "string", "description": "City name"},
                    "units": {"type": "string", "enum": ["c", "f"], "default": "c"},
                    "api_key": {"type": "string"}
                },
                "required": ["city", "api_key"]
            }),
        ),
        CapabilitySpec::new(
            "get_person",
            json!({"type": "object", "properties": {"id": {"type": "integer"}}}),
        )
        .with_output_schema(json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "age": {"type": "integer"}
            },
            "required": ["name", "age"]
        })),
        CapabilitySpec::new("slow", json!({"type": "object"})),
        CapabilitySpec::new("explode", json!({"type": "object"})),
        CapabilitySpec::new("stale", json!({"type": "object"})),
        CapabilitySpec::new("echo", json!({"type": "object", "properties": {
            "stamp": {"type": "integer"},
            "text": {"type": "string"}
        }})),
    ]
}

impl CapabilitySource for FakeServer {
    fn list_capabilities(&self) -> BoxFuture<'static, Result<Vec<CapabilitySpec>, RemoteError>> {
        let tools = self.tools.clone();
        Box::pin(async move { Ok(tools) })
    }
}

impl RemoteInvoker for FakeServer {
    fn invoke(
        &self,
        name: &str,
        args: Map<String, Value>,
    ) -> BoxFuture<'static, Result<RawResult, RemoteError>> {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), args.clone()));
        let name = name.to_string();
        Box::pin(async move {
            match name.as_str() {
                "add" => {
                    let a = args.get("a").and_then(Value::as_i64).unwrap_or_default();
                    let b = args.get("b").and_then(Value::as_i64).unwrap_or_default();
                    Ok(RawResult::from_json(json!({
                        "content": [{"type": "text", "text": (a + b).to_string()}],
                        "structuredContent": {"result": a + b}
                    })))
                }
                "getForecast" => Ok(RawResult::content(vec![ContentBlock::text(format!(
                    "{} sunny",
                    args.get("city").and_then(Value::as_str).unwrap_or("?")
                ))])),
                "get_person" => Ok(RawResult::structured(json!({"name": "Ada", "age": 36}))),
                "slow" => {
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    Ok(RawResult::structured(json!({"done": true})))
                }
                "explode" => Ok(RawResult::error("kaboom")),
                "stale" => Err(RemoteError::Timeout("server deadline".into())),
                _ => Ok(RawResult::structured(Value::Object(args))),
            }
        })
    }
}

impl ResourceReader for FakeServer {
    fn list_resources(&self) -> BoxFuture<'static, Result<Vec<ResourceDescriptor>, RemoteError>> {
        let result = if self.fail_listings {
            Err(RemoteError::Remote("Method not found".into()))
        } else {
            Ok(self.resources.clone())
        };
        Box::pin(async move { result })
    }

    fn read_resource(
        &self,
        uri: &str,
    ) -> BoxFuture<'static, Result<Vec<ResourceContent>, RemoteError>> {
        let n = self.resource_reads.fetch_add(1, Ordering::SeqCst) + 1;
        let uri = uri.to_string();
        Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok(vec![ResourceContent::Text {
                uri,
                mime_type: Some("text/plain".into()),
                text: format!("read #{n}"),
            }])
        })
    }
}

impl PromptSource for FakeServer {
    fn list_prompts(&self) -> BoxFuture<'static, Result<Vec<PromptDescriptor>, RemoteError>> {
        let result = if self.fail_listings {
            Err(RemoteError::Remote("Method not found".into()))
        } else {
            Ok(self.prompts.clone())
        };
        Box::pin(async move { result })
    }

    fn get_prompt(
        &self,
        _name: &str,
        args: Map<String, Value>,
    ) -> BoxFuture<'static, Result<Vec<PromptMessage>, RemoteError>> {
        let code = args
            .get("code")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Box::pin(async move {
            Ok(vec![
                PromptMessage::new("assistant", ContentBlock::text("I review code.")),
                PromptMessage::new("user", ContentBlock::text(format!("Review: {code}"))),
            ])
        })
    }
}

impl RemoteSession for FakeServer {
    fn server_name(&self) -> &str {
        "fake"
    }
}
