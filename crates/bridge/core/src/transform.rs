//! Argument transforms: rename, re-describe, default, hide and re-type the
//! arguments of an existing tool to derive a new one.
//!
//! A derived tool keeps a [`Binding`] from each remote (wire) argument to
//! where its value comes from: a caller-visible argument, a fixed hidden
//! value, or a hidden factory evaluated on every call. Applying a transform
//! rewrites the binding against the visible names of the previous layer, so
//! stacking transforms is the same as applying their composition once.

use crate::descriptor::{ArgumentDescriptor, ToolDescriptor};
use crate::error::TransformError;
use crate::schema::TypeDescriptor;
use serde_json::{Map, Value as Json};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Produces a fresh default value on every call.
pub type DefaultFactory = Arc<dyn Fn() -> Json + Send + Sync>;

/// Declarative modification of one argument.
///
/// Construct with [`ArgTransform::builder`]; invalid combinations are
/// rejected by [`ArgTransformBuilder::build`].
#[derive(Clone, Default)]
pub struct ArgTransform {
    name: Option<String>,
    description: Option<String>,
    default: Option<Json>,
    default_factory: Option<DefaultFactory>,
    hide: bool,
    required: Option<bool>,
    ty: Option<TypeDescriptor>,
}

impl fmt::Debug for ArgTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgTransform")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("default", &self.default)
            .field("default_factory", &self.default_factory.as_ref().map(|_| "<fn>"))
            .field("hide", &self.hide)
            .field("required", &self.required)
            .field("ty", &self.ty)
            .finish()
    }
}

impl ArgTransform {
    pub fn builder() -> ArgTransformBuilder {
        ArgTransformBuilder {
            inner: Self::default(),
        }
    }

    /// Rename only.
    pub fn rename(name: impl Into<String>) -> Result<Self, TransformError> {
        Self::builder().name(name).build()
    }

    /// Hide the argument and always send `value`.
    pub fn hidden(value: Json) -> Self {
        Self {
            default: Some(value),
            hide: true,
            ..Self::default()
        }
    }

    /// Hide the argument and send a freshly produced value on every call.
    pub fn hidden_with<F>(factory: F) -> Self
    where
        F: Fn() -> Json + Send + Sync + 'static,
    {
        Self {
            default_factory: Some(Arc::new(factory)),
            hide: true,
            ..Self::default()
        }
    }

    pub fn new_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn default_value(&self) -> Option<&Json> {
        self.default.as_ref()
    }

    pub fn has_factory(&self) -> bool {
        self.default_factory.is_some()
    }

    pub fn is_hidden(&self) -> bool {
        self.hide
    }

    pub fn required(&self) -> Option<bool> {
        self.required
    }

    pub fn new_type(&self) -> Option<&TypeDescriptor> {
        self.ty.as_ref()
    }
}

/// Builder for [`ArgTransform`].
pub struct ArgTransformBuilder {
    inner: ArgTransform,
}

impl ArgTransformBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.inner.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.inner.description = Some(description.into());
        self
    }

    /// Default value. An explicit JSON `null` counts as a default.
    pub fn default(mut self, value: Json) -> Self {
        self.inner.default = Some(value);
        self
    }

    pub fn default_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Json + Send + Sync + 'static,
    {
        self.inner.default_factory = Some(Arc::new(factory));
        self
    }

    pub fn hide(mut self) -> Self {
        self.inner.hide = true;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.inner.required = Some(required);
        self
    }

    pub fn ty(mut self, ty: TypeDescriptor) -> Self {
        self.inner.ty = Some(ty);
        self
    }

    /// Validate and finish.
    pub fn build(self) -> Result<ArgTransform, TransformError> {
        let t = self.inner;
        let has_default = t.default.is_some();
        let has_factory = t.default_factory.is_some();
        if t.hide && !has_default && !has_factory {
            return Err(TransformError::HiddenWithoutDefault);
        }
        if has_factory && !t.hide {
            return Err(TransformError::FactoryWithoutHide);
        }
        if has_default && has_factory {
            return Err(TransformError::ConflictingDefaults);
        }
        if t.required == Some(true) && has_default {
            return Err(TransformError::RequiredWithDefault);
        }
        if t.required == Some(true) && t.hide {
            return Err(TransformError::HiddenRequired);
        }
        if t.name.as_deref().is_some_and(str::is_empty) {
            return Err(TransformError::EmptyName);
        }
        Ok(t)
    }
}

/// Tool-level transform: optional new name/description plus per-argument
/// transforms keyed by the parent tool's visible argument names.
#[derive(Debug, Clone, Default)]
pub struct ToolTransform {
    pub name: Option<String>,
    pub description: Option<String>,
    args: Vec<(String, ArgTransform)>,
}

impl ToolTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Transform the parent argument `name`. A later call for the same
    /// name replaces the earlier one.
    pub fn arg(mut self, name: impl Into<String>, transform: ArgTransform) -> Self {
        let name = name.into();
        match self.args.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = transform,
            None => self.args.push((name, transform)),
        }
        self
    }

    pub fn args(&self) -> &[(String, ArgTransform)] {
        &self.args
    }

    fn get(&self, name: &str) -> Option<&ArgTransform> {
        self.args.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }
}

#[derive(Clone)]
pub(crate) enum HiddenValue {
    Fixed(Json),
    Factory(DefaultFactory),
}

impl HiddenValue {
    fn produce(&self) -> Json {
        match self {
            HiddenValue::Fixed(v) => v.clone(),
            HiddenValue::Factory(f) => f(),
        }
    }
}

#[derive(Clone)]
pub(crate) enum ArgSource {
    /// Taken from the caller-visible argument `name`, else `default` if set.
    Visible { name: String, default: Option<Json> },
    Hidden(HiddenValue),
}

/// Wire argument name to value source, in remote declaration order.
#[derive(Clone)]
pub(crate) struct Binding {
    wires: Vec<(String, ArgSource)>,
}

impl Binding {
    pub(crate) fn identity(descriptor: &ToolDescriptor) -> Self {
        Self {
            wires: descriptor
                .arguments()
                .iter()
                .map(|a| {
                    (
                        a.name.clone(),
                        ArgSource::Visible {
                            name: a.name.clone(),
                            default: None,
                        },
                    )
                })
                .collect(),
        }
    }

    /// Build the wire argument map from validated visible arguments.
    ///
    /// Visible names absent from the binding are forwarded as-is; the caller
    /// only lets those through for open descriptors.
    pub(crate) fn resolve(&self, mut visible: Map<String, Json>) -> Map<String, Json> {
        let mut out = Map::new();
        for (wire, source) in &self.wires {
            match source {
                ArgSource::Visible { name, default } => {
                    if let Some(v) = visible.remove(name) {
                        out.insert(wire.clone(), v);
                    } else if let Some(d) = default {
                        out.insert(wire.clone(), d.clone());
                    }
                }
                ArgSource::Hidden(h) => {
                    out.insert(wire.clone(), h.produce());
                }
            }
        }
        out.extend(visible);
        out
    }
}

enum Mapped {
    Visible {
        name: String,
        default: Option<Json>,
        required: bool,
    },
    Hidden(HiddenValue),
}

/// Apply `transform` on top of a parent descriptor and binding.
pub(crate) fn apply(
    parent: &ToolDescriptor,
    binding: &Binding,
    transform: &ToolTransform,
) -> Result<(ToolDescriptor, Binding), TransformError> {
    for (name, _) in transform.args() {
        if parent.argument(name).is_none() {
            return Err(TransformError::UnknownArgument {
                tool: parent.name().to_string(),
                argument: name.clone(),
            });
        }
    }
    if transform.name.as_deref().is_some_and(str::is_empty) {
        return Err(TransformError::EmptyName);
    }

    let mut arguments: Vec<ArgumentDescriptor> = Vec::new();
    let mut mapping: HashMap<&str, Mapped> = HashMap::new();

    for arg in parent.arguments() {
        let Some(t) = transform.get(&arg.name) else {
            arguments.push(arg.clone());
            mapping.insert(
                &arg.name,
                Mapped::Visible {
                    name: arg.name.clone(),
                    default: None,
                    required: arg.required,
                },
            );
            continue;
        };

        if t.hide {
            let hidden = match (&t.default, &t.default_factory) {
                (_, Some(f)) => HiddenValue::Factory(Arc::clone(f)),
                (Some(v), None) => HiddenValue::Fixed(v.clone()),
                (None, None) => return Err(TransformError::HiddenWithoutDefault),
            };
            mapping.insert(&arg.name, Mapped::Hidden(hidden));
            continue;
        }

        let mut next = arg.clone();
        if let Some(n) = &t.name {
            next.name = n.clone();
        }
        if let Some(d) = &t.description {
            next.description = Some(d.clone());
        }
        if let Some(ty) = &t.ty {
            next.ty = ty.clone();
        }
        if let Some(d) = &t.default {
            next.default = Some(d.clone());
            next.required = false;
        }
        if let Some(r) = t.required {
            next.required = r;
            if r {
                next.default = None;
            }
        }
        mapping.insert(
            &arg.name,
            Mapped::Visible {
                name: next.name.clone(),
                default: t.default.clone(),
                required: next.required,
            },
        );
        arguments.push(next);
    }

    for (i, arg) in arguments.iter().enumerate() {
        if arguments[..i].iter().any(|a| a.name == arg.name) {
            return Err(TransformError::DuplicateArgument {
                tool: transform
                    .name
                    .clone()
                    .unwrap_or_else(|| parent.name().to_string()),
                argument: arg.name.clone(),
            });
        }
    }

    let wires = binding
        .wires
        .iter()
        .map(|(wire, source)| {
            let next = match source {
                ArgSource::Hidden(h) => ArgSource::Hidden(h.clone()),
                ArgSource::Visible { name, default } => match mapping.get(name.as_str()) {
                    Some(Mapped::Hidden(h)) => ArgSource::Hidden(h.clone()),
                    Some(Mapped::Visible {
                        name: visible,
                        default: applied,
                        required,
                    }) => ArgSource::Visible {
                        name: visible.clone(),
                        default: if *required {
                            None
                        } else {
                            applied.clone().or_else(|| default.clone())
                        },
                    },
                    None => source.clone(),
                },
            };
            (wire.clone(), next)
        })
        .collect();

    let descriptor = parent.with_parts(
        transform
            .name
            .clone()
            .unwrap_or_else(|| parent.name().to_string()),
        transform
            .description
            .clone()
            .or_else(|| parent.description().map(str::to_string)),
        arguments,
    );
    Ok((descriptor, Binding { wires }))
}
