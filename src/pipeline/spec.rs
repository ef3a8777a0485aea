//! Declarative module specs and their resolution.
//!
//! A ForEach body is a list of specs, not modules: every `process` call
//! resolves each spec into a brand-new module instance, so no execution
//! state survives between elements or between calls. Specs persist until
//! the owning collaborator edits or removes them.

use crate::pipeline::config::ModuleConfig;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::module::{BuiltinModule, Module, ModuleKind};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// One element of a ForEach body.
#[derive(Clone)]
pub enum ModuleSpec {
    /// A live instance used as a template: resolution constructs a fresh
    /// module from its kind, name, config and (for ForEach) body specs.
    Instance(Box<BuiltinModule>),
    /// A kind reference, constructed with defaults.
    Kind(ModuleKind),
    /// A kind plus optional configuration.
    KindConfig(ModuleKind, Option<ModuleConfig>),
    /// A zero-argument factory producing a ready module.
    Factory(Arc<dyn Fn() -> BuiltinModule + Send + Sync>),
}

impl ModuleSpec {
    /// Wrap a factory closure.
    pub fn factory(f: impl Fn() -> BuiltinModule + Send + Sync + 'static) -> Self {
        ModuleSpec::Factory(Arc::new(f))
    }

    /// Resolve this spec into a freshly constructed module.
    pub fn resolve(&self) -> PipelineResult<BuiltinModule> {
        match self {
            ModuleSpec::Instance(template) => Ok(template.respawn()),
            ModuleSpec::Kind(kind) => kind.build(None, None),
            ModuleSpec::KindConfig(kind, config) => kind.build(None, config.clone()),
            ModuleSpec::Factory(f) => Ok(f()),
        }
    }

    /// Parse the declarative JSON forms used in configs and pipeline
    /// descriptions:
    ///
    /// - `"multiply"` — kind by name
    /// - `["multiply", {"factor": 10}]` — kind plus config
    /// - `{"kind": "multiply", "config": {...}}` — the object form
    pub fn from_config_value(value: &Value) -> PipelineResult<Self> {
        match value {
            Value::String(name) => Ok(ModuleSpec::Kind(Self::kind_by_name(name)?)),
            Value::Array(parts) => match parts.as_slice() {
                [Value::String(name)] => Ok(ModuleSpec::Kind(Self::kind_by_name(name)?)),
                [Value::String(name), Value::Null] => {
                    Ok(ModuleSpec::KindConfig(Self::kind_by_name(name)?, None))
                }
                [Value::String(name), cfg @ Value::Object(_)] => Ok(ModuleSpec::KindConfig(
                    Self::kind_by_name(name)?,
                    ModuleConfig::from_value(cfg.clone()),
                )),
                _ => Err(PipelineError::Construction(format!(
                    "spec array must be [kind] or [kind, config], got {value}"
                ))),
            },
            Value::Object(map) => {
                let name = map.get("kind").and_then(Value::as_str).ok_or_else(|| {
                    PipelineError::Construction(format!("spec object needs a 'kind': {value}"))
                })?;
                let kind = Self::kind_by_name(name)?;
                let config = match map.get("config") {
                    None | Some(Value::Null) => None,
                    Some(cfg @ Value::Object(_)) => ModuleConfig::from_value(cfg.clone()),
                    Some(other) => {
                        return Err(PipelineError::Construction(format!(
                            "spec config must be an object, got {other}"
                        )))
                    }
                };
                Ok(ModuleSpec::KindConfig(kind, config))
            }
            other => Err(PipelineError::Construction(format!(
                "unsupported spec form: {other}"
            ))),
        }
    }

    fn kind_by_name(name: &str) -> PipelineResult<ModuleKind> {
        ModuleKind::from_name(name)
            .ok_or_else(|| PipelineError::Construction(format!("unknown module kind '{name}'")))
    }
}

impl fmt::Debug for ModuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleSpec::Instance(m) => f
                .debug_tuple("Instance")
                .field(&m.kind())
                .field(&m.name())
                .finish(),
            ModuleSpec::Kind(kind) => f.debug_tuple("Kind").field(kind).finish(),
            ModuleSpec::KindConfig(kind, config) => f
                .debug_tuple("KindConfig")
                .field(kind)
                .field(config)
                .finish(),
            ModuleSpec::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}
