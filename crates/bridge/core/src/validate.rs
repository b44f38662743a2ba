//! Value checking and conservative coercion against a [`TypeDescriptor`].

use crate::schema::{Primitive, TypeDescriptor, TypeKind, json_kind};
use serde_json::{Map, Value as Json};

/// Check `value` against `ty`, returning the coerced value or every problem found.
///
/// The only coercion performed is an integral float (`5.0`) accepted where an
/// integer is expected. Strings are never parsed into numbers or booleans.
pub fn coerce(ty: &TypeDescriptor, value: &Json) -> Result<Json, Vec<String>> {
    let mut problems = Vec::new();
    let out = walk(ty, value, "", &mut problems);
    if problems.is_empty() {
        Ok(out)
    } else {
        Err(problems)
    }
}

/// Whether `value` satisfies `ty` (after coercion).
pub fn conforms(ty: &TypeDescriptor, value: &Json) -> bool {
    coerce(ty, value).is_ok()
}

fn walk(ty: &TypeDescriptor, value: &Json, at: &str, problems: &mut Vec<String>) -> Json {
    match &ty.kind {
        TypeKind::Opaque(_) => value.clone(),
        TypeKind::Primitive(p) => match coerce_primitive(*p, value) {
            Some(v) => v,
            None => {
                problems.push(mismatch(at, p.keyword(), value));
                value.clone()
            }
        },
        TypeKind::Enum { values, base } => {
            let candidate = base
                .and_then(|b| coerce_primitive(b, value))
                .unwrap_or_else(|| value.clone());
            if values.contains(&candidate) {
                candidate
            } else {
                let allowed = values
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                problems.push(located(at, format!("expected one of [{allowed}], got {value}")));
                value.clone()
            }
        }
        TypeKind::Nullable { inner, .. } => {
            if value.is_null() {
                Json::Null
            } else {
                walk(inner, value, at, problems)
            }
        }
        TypeKind::Array(element) => {
            let Some(items) = value.as_array() else {
                problems.push(mismatch(at, "array", value));
                return value.clone();
            };
            let Some(element) = element else {
                return value.clone();
            };
            Json::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| walk(element, item, &format!("{at}[{i}]"), problems))
                    .collect(),
            )
        }
        TypeKind::Object(obj) => {
            let Some(map) = value.as_object() else {
                problems.push(mismatch(at, "object", value));
                return value.clone();
            };
            for name in &obj.required {
                if !map.contains_key(name) {
                    problems.push(located(&field_path(at, name), "missing required field".into()));
                }
            }
            let mut out = Map::new();
            for (k, v) in map {
                let coerced = match obj.field(k) {
                    Some(field_ty) => walk(field_ty, v, &field_path(at, k), problems),
                    None => v.clone(),
                };
                out.insert(k.clone(), coerced);
            }
            Json::Object(out)
        }
    }
}

fn coerce_primitive(p: Primitive, value: &Json) -> Option<Json> {
    match (p, value) {
        (Primitive::String, Json::String(_))
        | (Primitive::Boolean, Json::Bool(_))
        | (Primitive::Number, Json::Number(_)) => Some(value.clone()),
        (Primitive::Integer, Json::Number(n)) => {
            if n.is_i64() || n.is_u64() {
                return Some(value.clone());
            }
            let f = n.as_f64()?;
            let integral = f.is_finite()
                && f.fract() == 0.0
                && f >= i64::MIN as f64
                && f <= i64::MAX as f64;
            integral.then(|| Json::from(f as i64))
        }
        _ => None,
    }
}

fn field_path(at: &str, name: &str) -> String {
    if at.is_empty() {
        name.to_string()
    } else {
        format!("{at}.{name}")
    }
}

fn located(at: &str, problem: String) -> String {
    if at.is_empty() {
        problem
    } else {
        format!("{at}: {problem}")
    }
}

fn mismatch(at: &str, expected: &str, value: &Json) -> String {
    located(at, format!("expected {expected}, got {}", json_kind(value)))
}
