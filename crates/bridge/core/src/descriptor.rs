//! Native descriptions of remote capabilities.

use crate::error::SchemaError;
use crate::schema::{NullableStyle, ObjectType, TypeDescriptor, TypeKind};
use serde_json::{Map, Value as Json};

/// A capability as advertised by the remote server.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilitySpec {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Json,
    pub output_schema: Option<Json>,
}

impl CapabilitySpec {
    pub fn new(name: impl Into<String>, input_schema: Json) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema,
            output_schema: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_output_schema(mut self, schema: Json) -> Self {
        self.output_schema = Some(schema);
        self
    }
}

/// One named argument of a tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentDescriptor {
    pub name: String,
    /// Value type, without the `description`/`default` annotations lifted
    /// into the fields below.
    pub ty: TypeDescriptor,
    pub required: bool,
    /// Default shown to callers. Always `None` for required arguments.
    pub default: Option<Json>,
    pub description: Option<String>,
}

impl ArgumentDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            required: false,
            default: None,
            description: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self.default = None;
        self
    }

    pub fn with_default(mut self, default: Json) -> Self {
        self.default = Some(default);
        self.required = false;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Field schema with description/default folded back in.
    pub fn render_type(&self) -> TypeDescriptor {
        let mut ty = self.ty.clone();
        if let Some(d) = &self.description {
            ty.annotations
                .insert("description".into(), Json::String(d.clone()));
        }
        if let Some(d) = &self.default {
            ty.annotations.insert("default".into(), d.clone());
        }
        ty
    }
}

/// Immutable native description of one invocable capability.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    name: String,
    description: Option<String>,
    arguments: Vec<ArgumentDescriptor>,
    output: Option<TypeDescriptor>,
    /// Root input type when it is not an object; argument names are unchecked.
    passthrough: Option<TypeDescriptor>,
    root_annotations: Map<String, Json>,
}

impl ToolDescriptor {
    /// Build a descriptor from explicit parts.
    ///
    /// The tool name must be non-empty; argument names must be non-empty
    /// and unique.
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        arguments: Vec<ArgumentDescriptor>,
        output: Option<TypeDescriptor>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        check_tool_name(&name)?;
        for (i, arg) in arguments.iter().enumerate() {
            if arg.name.is_empty() {
                return Err(SchemaError::at(
                    "/properties",
                    format!("tool '{name}' has an argument with an empty name"),
                ));
            }
            if arguments[..i].iter().any(|a| a.name == arg.name) {
                return Err(SchemaError::at(
                    &format!("/properties/{}", arg.name),
                    format!("tool '{name}' declares argument '{}' twice", arg.name),
                ));
            }
        }
        let arguments = arguments
            .into_iter()
            .map(|mut a| {
                if a.required {
                    a.default = None;
                }
                a
            })
            .collect();
        Ok(Self {
            name,
            description,
            arguments,
            output,
            passthrough: None,
            root_annotations: Map::new(),
        })
    }

    /// Derive a descriptor from a server-advertised capability.
    ///
    /// A required argument never carries a default, even when its schema
    /// declares one. An input schema whose root is not an object yields an
    /// open descriptor that forwards arguments unchecked.
    pub fn from_capability(spec: &CapabilitySpec) -> Result<Self, SchemaError> {
        check_tool_name(&spec.name)?;
        let input = parse_input_root(&spec.input_schema)?;
        let output = spec
            .output_schema
            .as_ref()
            .map(TypeDescriptor::parse)
            .transpose()?;

        let TypeKind::Object(obj) = input.kind else {
            return Ok(Self {
                name: spec.name.clone(),
                description: spec.description.clone(),
                arguments: Vec::new(),
                output,
                passthrough: Some(input),
                root_annotations: Map::new(),
            });
        };

        let arguments = obj
            .fields
            .iter()
            .map(|(name, ty)| lift_argument(name, ty, obj.is_required(name)))
            .collect();

        Ok(Self {
            name: spec.name.clone(),
            description: spec.description.clone(),
            arguments,
            output,
            passthrough: None,
            root_annotations: input.annotations,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Arguments in declaration order.
    pub fn arguments(&self) -> &[ArgumentDescriptor] {
        &self.arguments
    }

    pub fn argument(&self, name: &str) -> Option<&ArgumentDescriptor> {
        self.arguments.iter().find(|a| a.name == name)
    }

    pub fn required_arguments(&self) -> impl Iterator<Item = &ArgumentDescriptor> {
        self.arguments.iter().filter(|a| a.required)
    }

    pub fn optional_arguments(&self) -> impl Iterator<Item = &ArgumentDescriptor> {
        self.arguments.iter().filter(|a| !a.required)
    }

    pub fn output(&self) -> Option<&TypeDescriptor> {
        self.output.as_ref()
    }

    /// Whether argument names are accepted without checking.
    pub fn is_open(&self) -> bool {
        self.passthrough.is_some()
    }

    /// Input shape as a descriptor.
    pub fn input_type(&self) -> TypeDescriptor {
        if let Some(p) = &self.passthrough {
            return p.clone();
        }
        TypeDescriptor {
            kind: TypeKind::Object(ObjectType {
                fields: self
                    .arguments
                    .iter()
                    .map(|a| (a.name.clone(), a.render_type()))
                    .collect(),
                required: self
                    .required_arguments()
                    .map(|a| a.name.clone())
                    .collect(),
            }),
            annotations: self.root_annotations.clone(),
        }
    }

    /// Input schema as caller-visible (after any transforms).
    pub fn input_schema(&self) -> Json {
        self.input_type().render()
    }

    pub fn output_schema(&self) -> Option<Json> {
        self.output.as_ref().map(TypeDescriptor::render)
    }

    pub(crate) fn with_parts(
        &self,
        name: String,
        description: Option<String>,
        arguments: Vec<ArgumentDescriptor>,
    ) -> Self {
        Self {
            name,
            description,
            arguments,
            output: self.output.clone(),
            passthrough: self.passthrough.clone(),
            root_annotations: self.root_annotations.clone(),
        }
    }
}

fn parse_input_root(schema: &Json) -> Result<TypeDescriptor, SchemaError> {
    match schema {
        Json::Null => Ok(TypeDescriptor::object(Vec::new(), Vec::new())),
        // Some servers omit `"type": "object"` on the root.
        Json::Object(map)
            if !map.contains_key("type")
                && (map.contains_key("properties") || map.contains_key("required")) =>
        {
            let mut typed = Map::new();
            typed.insert("type".into(), Json::String("object".into()));
            typed.extend(map.clone());
            TypeDescriptor::parse(&Json::Object(typed))
        }
        other => TypeDescriptor::parse(other),
    }
}

fn check_tool_name(name: &str) -> Result<(), SchemaError> {
    if name.is_empty() {
        return Err(SchemaError::at("", "tool name must not be empty"));
    }
    Ok(())
}

/// Remove `key` from the argument's own annotations or, for the `nullable`
/// flag and type-list spellings, from the wrapped type that holds them.
fn take_annotation(ty: &mut TypeDescriptor, key: &str, accept: fn(&Json) -> bool) -> Option<Json> {
    if ty.annotations.get(key).is_some_and(accept) {
        return ty.annotations.shift_remove(key);
    }
    if let TypeKind::Nullable { inner, style } = &mut ty.kind
        && matches!(
            style,
            NullableStyle::Flag | NullableStyle::TypeList | NullableStyle::TypeListNullFirst
        )
        && inner.annotations.get(key).is_some_and(accept)
    {
        return inner.annotations.shift_remove(key);
    }
    None
}

fn lift_argument(name: &str, ty: &TypeDescriptor, required: bool) -> ArgumentDescriptor {
    let mut ty = ty.clone();
    let description = take_annotation(&mut ty, "description", Json::is_string)
        .and_then(|d| d.as_str().map(str::to_string));
    let default = if required {
        None
    } else {
        take_annotation(&mut ty, "default", |_| true)
    };
    ArgumentDescriptor {
        name: name.to_string(),
        ty,
        required,
        default,
        description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn weather() -> CapabilitySpec {
        CapabilitySpec::new(
            "get_weather",
            json!({
                "type": "object",
                "properties": {
                    "city": {"type": "string", "description": "City name"},
                    "units": {"type": "string", "enum": ["c", "f"], "default": "c"}
                },
                "required": ["city"]
            }),
        )
        .with_description("Current weather")
    }

    #[test]
    fn from_capability_lifts_arguments() {
        let d = ToolDescriptor::from_capability(&weather()).unwrap();
        assert_eq!(d.name(), "get_weather");
        assert_eq!(d.description(), Some("Current weather"));
        let names: Vec<&str> = d.arguments().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["city", "units"]);

        let city = d.argument("city").unwrap();
        assert!(city.required);
        assert_eq!(city.description.as_deref(), Some("City name"));

        let units = d.argument("units").unwrap();
        assert!(!units.required);
        assert_eq!(units.default, Some(json!("c")));
    }

    #[test]
    fn input_schema_round_trips() {
        let spec = weather();
        let d = ToolDescriptor::from_capability(&spec).unwrap();
        assert_eq!(d.input_schema(), spec.input_schema);
    }

    #[test]
    fn required_wins_over_schema_default() {
        let spec = CapabilitySpec::new(
            "t",
            json!({
                "type": "object",
                "properties": {"n": {"type": "integer", "default": 3}},
                "required": ["n"]
            }),
        );
        let d = ToolDescriptor::from_capability(&spec).unwrap();
        let n = d.argument("n").unwrap();
        assert!(n.required);
        assert_eq!(n.default, None);
    }

    #[test]
    fn untyped_root_with_properties_is_an_object() {
        let spec = CapabilitySpec::new("t", json!({"properties": {"q": {"type": "string"}}}));
        let d = ToolDescriptor::from_capability(&spec).unwrap();
        assert!(!d.is_open());
        assert!(d.argument("q").is_some());
    }

    #[test]
    fn non_object_root_is_open() {
        let spec = CapabilitySpec::new("t", json!({"$ref": "#/defs/Args"}));
        let d = ToolDescriptor::from_capability(&spec).unwrap();
        assert!(d.is_open());
        assert!(d.arguments().is_empty());
        assert_eq!(d.input_schema(), json!({"$ref": "#/defs/Args"}));
    }

    #[test]
    fn nullable_arguments_lift_description_and_default() {
        for q in [
            json!({"type": ["string", "null"], "description": "query", "default": "d0"}),
            json!({"type": ["null", "string"], "description": "query", "default": "d0"}),
            json!({"type": "string", "nullable": true, "description": "query", "default": "d0"}),
        ] {
            let spec = CapabilitySpec::new(
                "t",
                json!({"type": "object", "properties": {"q": q.clone()}}),
            );
            let d = ToolDescriptor::from_capability(&spec).unwrap();
            let arg = d.argument("q").unwrap();
            assert_eq!(arg.description.as_deref(), Some("query"), "{q}");
            assert_eq!(arg.default, Some(json!("d0")), "{q}");
            assert_eq!(d.input_schema(), spec.input_schema);
        }
    }

    #[test]
    fn empty_tool_name_is_rejected() {
        let err = ToolDescriptor::from_capability(&CapabilitySpec::new("", json!({"type": "object"})))
            .unwrap_err();
        assert!(err.message.contains("must not be empty"));
        assert!(ToolDescriptor::new("", None, Vec::new(), None).is_err());
    }

    #[test]
    fn new_rejects_duplicate_arguments() {
        let err = ToolDescriptor::new(
            "t",
            None,
            vec![
                ArgumentDescriptor::new("a", TypeDescriptor::string()),
                ArgumentDescriptor::new("a", TypeDescriptor::integer()),
            ],
            None,
        )
        .unwrap_err();
        assert!(err.message.contains("twice"));
    }
}
