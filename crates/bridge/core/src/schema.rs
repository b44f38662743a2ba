//! Schema bridge: JSON-Schema-like fragments to [`TypeDescriptor`] trees and back.
//!
//! Only a small structural subset is interpreted (`object`, `array`, the four
//! primitives, `enum`, and the three nullable spellings). Anything else is
//! kept verbatim as [`TypeKind::Opaque`], so a server with an exotic schema
//! still produces a callable capability whose values pass through unchecked.
//!
//! Keywords that are not consumed structurally (`description`, `title`,
//! `default`, `format`, vendor `x-*` keys, ...) are carried in
//! [`TypeDescriptor::annotations`] and re-emitted on render, which is what
//! makes `render(parse(s)) == s` hold for every well-formed fragment.

use crate::error::SchemaError;
use schemars::Schema;
use serde_json::{Map, Value as Json};

/// Primitive JSON kinds a descriptor can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Number,
    Integer,
    Boolean,
}

impl Primitive {
    /// The schema `type` keyword for this primitive.
    pub fn keyword(self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Integer => "integer",
            Primitive::Boolean => "boolean",
        }
    }

    fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "string" => Some(Primitive::String),
            "number" => Some(Primitive::Number),
            "integer" => Some(Primitive::Integer),
            "boolean" => Some(Primitive::Boolean),
            _ => None,
        }
    }
}

/// Which spelling a nullable type was declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullableStyle {
    /// `{"type": "string", "nullable": true}`
    Flag,
    /// `{"type": ["string", "null"]}`
    TypeList,
    /// `{"type": ["null", "string"]}`
    TypeListNullFirst,
    /// `{"anyOf": [{...}, {"type": "null"}]}`
    AnyOf,
    /// `{"oneOf": [{...}, {"type": "null"}]}`
    OneOf,
}

/// Ordered object shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectType {
    /// Declared properties in declaration order.
    pub fields: Vec<(String, TypeDescriptor)>,
    /// Required property names in declaration order.
    pub required: Vec<String>,
}

impl ObjectType {
    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&TypeDescriptor> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    /// Whether `name` is listed as required.
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

/// Structural variant of a [`TypeDescriptor`].
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Primitive(Primitive),
    /// Array with an optional element type (`None` when `items` is absent).
    Array(Option<Box<TypeDescriptor>>),
    Object(ObjectType),
    /// Closed set of values, optionally constrained to a primitive kind.
    Enum {
        values: Vec<Json>,
        base: Option<Primitive>,
    },
    Nullable {
        inner: Box<TypeDescriptor>,
        style: NullableStyle,
    },
    /// Unsupported construct, preserved verbatim.
    Opaque(Json),
}

/// Native-side structural representation of a schema fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    pub kind: TypeKind,
    /// Keywords not consumed structurally, in declaration order.
    pub annotations: Map<String, Json>,
}

impl TypeDescriptor {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            annotations: Map::new(),
        }
    }

    pub fn primitive(p: Primitive) -> Self {
        Self::new(TypeKind::Primitive(p))
    }

    pub fn string() -> Self {
        Self::primitive(Primitive::String)
    }

    pub fn integer() -> Self {
        Self::primitive(Primitive::Integer)
    }

    pub fn number() -> Self {
        Self::primitive(Primitive::Number)
    }

    pub fn boolean() -> Self {
        Self::primitive(Primitive::Boolean)
    }

    pub fn array(element: TypeDescriptor) -> Self {
        Self::new(TypeKind::Array(Some(Box::new(element))))
    }

    /// Object shape from `(name, type)` pairs and a required list.
    pub fn object<I, R>(fields: I, required: R) -> Self
    where
        I: IntoIterator<Item = (String, TypeDescriptor)>,
        R: IntoIterator<Item = String>,
    {
        Self::new(TypeKind::Object(ObjectType {
            fields: fields.into_iter().collect(),
            required: required.into_iter().collect(),
        }))
    }

    pub fn enumeration(values: Vec<Json>) -> Self {
        Self::new(TypeKind::Enum { values, base: None })
    }

    pub fn nullable(inner: TypeDescriptor) -> Self {
        Self::new(TypeKind::Nullable {
            inner: Box::new(inner),
            style: NullableStyle::AnyOf,
        })
    }

    pub fn opaque(raw: Json) -> Self {
        Self::new(TypeKind::Opaque(raw))
    }

    /// Unconstrained value (`{}`).
    pub fn any() -> Self {
        Self::opaque(Json::Object(Map::new()))
    }

    /// Attach an annotation keyword.
    pub fn with_annotation(mut self, key: &str, value: Json) -> Self {
        self.annotations.insert(key.to_string(), value);
        self
    }

    /// The `description` annotation, when it is a string.
    pub fn description(&self) -> Option<&str> {
        self.annotations.get("description").and_then(Json::as_str)
    }

    /// The `default` annotation.
    pub fn default_value(&self) -> Option<&Json> {
        self.annotations.get("default")
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self.kind, TypeKind::Opaque(_))
    }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match &self.kind {
            TypeKind::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Parse a schema fragment.
    ///
    /// Fails only on syntactically malformed fragments; unusual but
    /// well-formed constructs become [`TypeKind::Opaque`].
    pub fn parse(fragment: &Json) -> Result<Self, SchemaError> {
        parse_at(fragment, "")
    }

    /// Parse a [`Schema`].
    pub fn from_schema(schema: &Schema) -> Result<Self, SchemaError> {
        Self::parse(schema.as_value())
    }

    /// Render back to the fragment shape.
    pub fn render(&self) -> Json {
        let mut out = match &self.kind {
            TypeKind::Opaque(raw) => {
                let Json::Object(map) = raw else {
                    return raw.clone();
                };
                map.clone()
            }
            TypeKind::Primitive(p) => type_only(p.keyword()),
            TypeKind::Array(element) => {
                let mut m = type_only("array");
                if let Some(el) = element {
                    m.insert("items".into(), el.render());
                }
                m
            }
            TypeKind::Object(obj) => {
                let mut m = type_only("object");
                if !obj.fields.is_empty() {
                    let props: Map<String, Json> = obj
                        .fields
                        .iter()
                        .map(|(name, ty)| (name.clone(), ty.render()))
                        .collect();
                    m.insert("properties".into(), Json::Object(props));
                }
                if !obj.required.is_empty() {
                    m.insert(
                        "required".into(),
                        Json::Array(obj.required.iter().cloned().map(Json::String).collect()),
                    );
                }
                m
            }
            TypeKind::Enum { values, base } => {
                let mut m = match base {
                    Some(p) => type_only(p.keyword()),
                    None => Map::new(),
                };
                m.insert("enum".into(), Json::Array(values.clone()));
                m
            }
            TypeKind::Nullable { inner, style } => render_nullable(inner, *style),
        };
        // Annotations set on this node win over ones rendered from inside it.
        for (k, v) in &self.annotations {
            out.insert(k.clone(), v.clone());
        }
        Json::Object(out)
    }

    /// Render as a [`Schema`].
    pub fn render_schema(&self) -> Schema {
        match self.render() {
            Json::Bool(b) => Schema::from(b),
            Json::Object(map) => Schema::from(map),
            // Opaque only ever holds objects or booleans (parse rejects the rest).
            other => {
                let mut map = Map::new();
                map.insert("const".into(), other);
                Schema::from(map)
            }
        }
    }
}

fn type_only(keyword: &str) -> Map<String, Json> {
    let mut m = Map::new();
    m.insert("type".into(), Json::String(keyword.into()));
    m
}

fn null_branch() -> Json {
    Json::Object(type_only("null"))
}

fn render_nullable(inner: &TypeDescriptor, style: NullableStyle) -> Map<String, Json> {
    let rendered = inner.render();
    match (style, rendered) {
        (NullableStyle::Flag, Json::Object(mut m)) => {
            m.insert("nullable".into(), Json::Bool(true));
            m
        }
        (NullableStyle::TypeList | NullableStyle::TypeListNullFirst, Json::Object(m))
            if m.get("type").is_some_and(Json::is_string) =>
        {
            m.into_iter()
                .map(|(k, v)| {
                    if k != "type" {
                        return (k, v);
                    }
                    let null = Json::String("null".into());
                    let list = if style == NullableStyle::TypeList {
                        vec![v, null]
                    } else {
                        vec![null, v]
                    };
                    (k, Json::Array(list))
                })
                .collect()
        }
        (NullableStyle::OneOf, rendered) => {
            let mut m = Map::new();
            m.insert("oneOf".into(), Json::Array(vec![rendered, null_branch()]));
            m
        }
        (_, rendered) => {
            let mut m = Map::new();
            m.insert("anyOf".into(), Json::Array(vec![rendered, null_branch()]));
            m
        }
    }
}

fn child(path: &str, seg: &str) -> String {
    format!("{path}/{seg}")
}

fn parse_at(fragment: &Json, path: &str) -> Result<TypeDescriptor, SchemaError> {
    match fragment {
        Json::Bool(_) => Ok(TypeDescriptor::opaque(fragment.clone())),
        Json::Object(map) => parse_object(map, path),
        other => Err(SchemaError::at(
            path,
            format!("schema must be an object or boolean, found {}", json_kind(other)),
        )),
    }
}

fn parse_object(map: &Map<String, Json>, path: &str) -> Result<TypeDescriptor, SchemaError> {
    if map.contains_key("$ref") {
        return Ok(TypeDescriptor::opaque(Json::Object(map.clone())));
    }
    check_type_keyword(map.get("type"), path)?;

    if map.get("nullable") == Some(&Json::Bool(true)) {
        let mut rest = map.clone();
        rest.shift_remove("nullable");
        let inner = parse_object(&rest, path)?;
        return Ok(TypeDescriptor::new(TypeKind::Nullable {
            inner: Box::new(inner),
            style: NullableStyle::Flag,
        }));
    }

    let mut rest = map.clone();
    let kind = match map.get("type") {
        Some(Json::String(t)) => {
            rest.shift_remove("type");
            match parse_typed(t, &mut rest, map, path)? {
                Some(kind) => kind,
                None => return Ok(TypeDescriptor::opaque(Json::Object(map.clone()))),
            }
        }
        Some(Json::Array(list)) => {
            let null = Json::String("null".into());
            let (base, style) = match list.as_slice() {
                [t, n] if *n == null && *t != null => (t, NullableStyle::TypeList),
                [n, t] if *n == null && *t != null => (t, NullableStyle::TypeListNullFirst),
                _ => return Ok(TypeDescriptor::opaque(Json::Object(map.clone()))),
            };
            let mut single = map.clone();
            single.insert("type".into(), base.clone());
            let inner = parse_object(&single, path)?;
            return Ok(TypeDescriptor::new(TypeKind::Nullable {
                inner: Box::new(inner),
                style,
            }));
        }
        // check_type_keyword already rejected every other shape.
        Some(_) => return Ok(TypeDescriptor::opaque(Json::Object(map.clone()))),
        None => match parse_untyped(&mut rest, map, path)? {
            Some(kind) => kind,
            None => return Ok(TypeDescriptor::opaque(Json::Object(map.clone()))),
        },
    };

    Ok(TypeDescriptor {
        kind,
        annotations: rest,
    })
}

fn check_type_keyword(ty: Option<&Json>, path: &str) -> Result<(), SchemaError> {
    const KNOWN: [&str; 7] = [
        "string", "number", "integer", "boolean", "object", "array", "null",
    ];
    let at = child(path, "type");
    match ty {
        None => Ok(()),
        Some(Json::String(t)) if KNOWN.contains(&t.as_str()) => Ok(()),
        Some(Json::String(t)) => Err(SchemaError::at(
            &at,
            format!("unrecognized type keyword '{t}'"),
        )),
        Some(Json::Array(list)) => {
            for item in list {
                match item {
                    Json::String(t) if KNOWN.contains(&t.as_str()) => {}
                    Json::String(t) => {
                        return Err(SchemaError::at(
                            &at,
                            format!("unrecognized type keyword '{t}'"),
                        ));
                    }
                    other => {
                        return Err(SchemaError::at(
                            &at,
                            format!("type list entries must be strings, found {}", json_kind(other)),
                        ));
                    }
                }
            }
            Ok(())
        }
        Some(other) => Err(SchemaError::at(
            &at,
            format!("type must be a string or array, found {}", json_kind(other)),
        )),
    }
}

/// Returns `None` when the node should be preserved opaquely.
fn parse_typed(
    t: &str,
    rest: &mut Map<String, Json>,
    map: &Map<String, Json>,
    path: &str,
) -> Result<Option<TypeKind>, SchemaError> {
    if let Some(p) = Primitive::from_keyword(t) {
        if let Some(values) = map.get("enum") {
            let values = enum_values(values, path)?;
            rest.shift_remove("enum");
            return Ok(Some(TypeKind::Enum {
                values,
                base: Some(p),
            }));
        }
        return Ok(Some(TypeKind::Primitive(p)));
    }
    match t {
        "array" => match map.get("items") {
            None => Ok(Some(TypeKind::Array(None))),
            Some(Json::Array(_)) => Ok(None),
            Some(items) => {
                let element = parse_at(items, &child(path, "items"))?;
                rest.shift_remove("items");
                Ok(Some(TypeKind::Array(Some(Box::new(element)))))
            }
        },
        "object" => {
            let mut obj = ObjectType::default();
            match map.get("properties") {
                None => {}
                Some(Json::Object(props)) if props.is_empty() => {}
                Some(Json::Object(props)) => {
                    let props_path = child(path, "properties");
                    for (name, sub) in props {
                        let ty = parse_at(sub, &child(&props_path, name))?;
                        obj.fields.push((name.clone(), ty));
                    }
                    rest.shift_remove("properties");
                }
                Some(other) => {
                    return Err(SchemaError::at(
                        &child(path, "properties"),
                        format!("properties must be an object, found {}", json_kind(other)),
                    ));
                }
            }
            match map.get("required") {
                None => {}
                Some(Json::Array(list)) => {
                    for item in list {
                        let Json::String(name) = item else {
                            return Err(SchemaError::at(
                                &child(path, "required"),
                                "required must list property names",
                            ));
                        };
                        obj.required.push(name.clone());
                    }
                    if !list.is_empty() {
                        rest.shift_remove("required");
                    }
                }
                Some(other) => {
                    return Err(SchemaError::at(
                        &child(path, "required"),
                        format!("required must be an array, found {}", json_kind(other)),
                    ));
                }
            }
            Ok(Some(TypeKind::Object(obj)))
        }
        _ => Ok(None),
    }
}

fn parse_untyped(
    rest: &mut Map<String, Json>,
    map: &Map<String, Json>,
    path: &str,
) -> Result<Option<TypeKind>, SchemaError> {
    if let Some(values) = map.get("enum") {
        let values = enum_values(values, path)?;
        rest.shift_remove("enum");
        return Ok(Some(TypeKind::Enum { values, base: None }));
    }

    let union = match (map.get("anyOf"), map.get("oneOf")) {
        (Some(branches), None) => Some(("anyOf", NullableStyle::AnyOf, branches)),
        (None, Some(branches)) => Some(("oneOf", NullableStyle::OneOf, branches)),
        _ => None,
    };
    let Some((key, style, branches)) = union else {
        return Ok(None);
    };
    let Json::Array(branches) = branches else {
        return Err(SchemaError::at(
            &child(path, key),
            format!("{key} must be an array"),
        ));
    };
    if branches.len() != 2 || branches[1] != null_branch() {
        return Ok(None);
    }
    let inner = parse_at(&branches[0], &child(&child(path, key), "0"))?;
    rest.shift_remove(key);
    Ok(Some(TypeKind::Nullable {
        inner: Box::new(inner),
        style,
    }))
}

fn enum_values(values: &Json, path: &str) -> Result<Vec<Json>, SchemaError> {
    match values {
        Json::Array(v) => Ok(v.clone()),
        other => Err(SchemaError::at(
            &child(path, "enum"),
            format!("enum must be an array, found {}", json_kind(other)),
        )),
    }
}

/// Short name of a JSON value's kind, for messages.
pub(crate) fn json_kind(v: &Json) -> &'static str {
    match v {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
