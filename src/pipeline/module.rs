//! Module abstraction for the pipeline.
//!
//! Two-layer design:
//! - **`Module` trait** — the host-facing contract
//!   (`process(payload, logger?) -> payload'`).
//! - **`BuiltinModule` enum** — closed dispatch over the fixed variant
//!   set. Match arms inline; no type inspection anywhere.
//!
//! `ModuleKind` is the explicit replacement for a process-wide
//! name→class registry: hosts resolve kind names through it and hold
//! their own references.

use crate::pipeline::config::ModuleConfig;
use crate::pipeline::context::ProcessContext;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::modules::{
    FilterModule, ForEachModule, IntSourceModule, MultiplyModule, ToStringModule, TransformModule,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared input/output arity and type labels. Diagnostic only — the
/// executor never enforces them; external surfaces display them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageIo {
    pub input_count: u8,
    pub input_label: &'static str,
    pub output_count: u8,
    pub output_label: &'static str,
}

/// The module contract. Payloads are JSON-like values; implementations
/// must not mutate shared state outside their own config and runtime
/// fields.
pub trait Module {
    /// Human-readable name of this module instance.
    fn name(&self) -> &str;

    /// Which of the fixed variants this module is.
    fn kind(&self) -> ModuleKind;

    /// This module's configuration.
    fn config(&self) -> &ModuleConfig;

    /// Mutable configuration access, for host-driven edits between runs.
    fn config_mut(&mut self) -> &mut ModuleConfig;

    /// Declared I/O shape of this module.
    fn io(&self) -> StageIo;

    /// Transform the payload. The context carries the optional logger
    /// sink; emitting to it is optional and never affects control flow.
    fn process(&mut self, input: Value, ctx: &mut ProcessContext<'_>) -> PipelineResult<Value>;
}

/// The closed set of module kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    IntSource,
    Multiply,
    ToString,
    Filter,
    Transform,
    ForEach,
}

impl ModuleKind {
    /// Canonical kind name, as used in declarative descriptions.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleKind::IntSource => "int_source",
            ModuleKind::Multiply => "multiply",
            ModuleKind::ToString => "to_string",
            ModuleKind::Filter => "filter",
            ModuleKind::Transform => "transform",
            ModuleKind::ForEach => "for_each",
        }
    }

    /// Look up a kind by its canonical name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "int_source" => Some(ModuleKind::IntSource),
            "multiply" => Some(ModuleKind::Multiply),
            "to_string" => Some(ModuleKind::ToString),
            "filter" => Some(ModuleKind::Filter),
            "transform" => Some(ModuleKind::Transform),
            "for_each" => Some(ModuleKind::ForEach),
            _ => None,
        }
    }

    /// Default instance name for this kind.
    pub fn default_name(&self) -> &'static str {
        match self {
            ModuleKind::IntSource => "IntSource",
            ModuleKind::Multiply => "Multiply",
            ModuleKind::ToString => "ToString",
            ModuleKind::Filter => "Filter",
            ModuleKind::Transform => "Transform",
            ModuleKind::ForEach => "ForEach",
        }
    }

    /// Canonical construction: `(name, config) -> Module`. The only
    /// fallible case is ForEach, whose config may carry a declarative
    /// `body` that fails to parse.
    pub fn build(
        &self,
        name: Option<String>,
        config: Option<ModuleConfig>,
    ) -> PipelineResult<BuiltinModule> {
        let name = name.unwrap_or_else(|| self.default_name().to_string());
        let config = config.unwrap_or_default();
        Ok(match self {
            ModuleKind::IntSource => BuiltinModule::IntSource(IntSourceModule::new(name, config)),
            ModuleKind::Multiply => BuiltinModule::Multiply(MultiplyModule::new(name, config)),
            ModuleKind::ToString => BuiltinModule::ToString(ToStringModule::new(name, config)),
            ModuleKind::Filter => BuiltinModule::Filter(FilterModule::new(name, config)),
            ModuleKind::Transform => BuiltinModule::Transform(TransformModule::new(name, config)),
            ModuleKind::ForEach => BuiltinModule::ForEach(ForEachModule::new(name, config)?),
        })
    }
}

impl std::fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Enum dispatch for the closed module set.
#[derive(Debug, Clone)]
pub enum BuiltinModule {
    IntSource(IntSourceModule),
    Multiply(MultiplyModule),
    ToString(ToStringModule),
    Filter(FilterModule),
    Transform(TransformModule),
    ForEach(ForEachModule),
}

impl BuiltinModule {
    /// Construct a fresh instance with this module's name, config and
    /// (for ForEach) body specs, discarding all runtime state. This is
    /// how `ModuleSpec::Instance` resolution preserves config-equivalent
    /// state without reusing the instance.
    pub fn respawn(&self) -> BuiltinModule {
        match self {
            BuiltinModule::IntSource(m) => BuiltinModule::IntSource(IntSourceModule::new(
                m.name().to_string(),
                m.config().clone(),
            )),
            BuiltinModule::Multiply(m) => BuiltinModule::Multiply(MultiplyModule::new(
                m.name().to_string(),
                m.config().clone(),
            )),
            BuiltinModule::ToString(m) => BuiltinModule::ToString(ToStringModule::new(
                m.name().to_string(),
                m.config().clone(),
            )),
            BuiltinModule::Filter(m) => {
                BuiltinModule::Filter(FilterModule::new(m.name().to_string(), m.config().clone()))
            }
            BuiltinModule::Transform(m) => BuiltinModule::Transform(TransformModule::new(
                m.name().to_string(),
                m.config().clone(),
            )),
            BuiltinModule::ForEach(m) => BuiltinModule::ForEach(ForEachModule::with_body(
                m.name().to_string(),
                m.config().clone(),
                m.body().to_vec(),
            )),
        }
    }
}

impl Module for BuiltinModule {
    fn name(&self) -> &str {
        match self {
            BuiltinModule::IntSource(m) => m.name(),
            BuiltinModule::Multiply(m) => m.name(),
            BuiltinModule::ToString(m) => m.name(),
            BuiltinModule::Filter(m) => m.name(),
            BuiltinModule::Transform(m) => m.name(),
            BuiltinModule::ForEach(m) => m.name(),
        }
    }

    fn kind(&self) -> ModuleKind {
        match self {
            BuiltinModule::IntSource(m) => m.kind(),
            BuiltinModule::Multiply(m) => m.kind(),
            BuiltinModule::ToString(m) => m.kind(),
            BuiltinModule::Filter(m) => m.kind(),
            BuiltinModule::Transform(m) => m.kind(),
            BuiltinModule::ForEach(m) => m.kind(),
        }
    }

    fn config(&self) -> &ModuleConfig {
        match self {
            BuiltinModule::IntSource(m) => m.config(),
            BuiltinModule::Multiply(m) => m.config(),
            BuiltinModule::ToString(m) => m.config(),
            BuiltinModule::Filter(m) => m.config(),
            BuiltinModule::Transform(m) => m.config(),
            BuiltinModule::ForEach(m) => m.config(),
        }
    }

    fn config_mut(&mut self) -> &mut ModuleConfig {
        match self {
            BuiltinModule::IntSource(m) => m.config_mut(),
            BuiltinModule::Multiply(m) => m.config_mut(),
            BuiltinModule::ToString(m) => m.config_mut(),
            BuiltinModule::Filter(m) => m.config_mut(),
            BuiltinModule::Transform(m) => m.config_mut(),
            BuiltinModule::ForEach(m) => m.config_mut(),
        }
    }

    fn io(&self) -> StageIo {
        match self {
            BuiltinModule::IntSource(m) => m.io(),
            BuiltinModule::Multiply(m) => m.io(),
            BuiltinModule::ToString(m) => m.io(),
            BuiltinModule::Filter(m) => m.io(),
            BuiltinModule::Transform(m) => m.io(),
            BuiltinModule::ForEach(m) => m.io(),
        }
    }

    fn process(&mut self, input: Value, ctx: &mut ProcessContext<'_>) -> PipelineResult<Value> {
        match self {
            BuiltinModule::IntSource(m) => m.process(input, ctx),
            BuiltinModule::Multiply(m) => m.process(input, ctx),
            BuiltinModule::ToString(m) => m.process(input, ctx),
            BuiltinModule::Filter(m) => m.process(input, ctx),
            BuiltinModule::Transform(m) => m.process(input, ctx),
            BuiltinModule::ForEach(m) => m.process(input, ctx),
        }
    }
}

impl From<IntSourceModule> for BuiltinModule {
    fn from(m: IntSourceModule) -> Self {
        BuiltinModule::IntSource(m)
    }
}

impl From<MultiplyModule> for BuiltinModule {
    fn from(m: MultiplyModule) -> Self {
        BuiltinModule::Multiply(m)
    }
}

impl From<ToStringModule> for BuiltinModule {
    fn from(m: ToStringModule) -> Self {
        BuiltinModule::ToString(m)
    }
}

impl From<FilterModule> for BuiltinModule {
    fn from(m: FilterModule) -> Self {
        BuiltinModule::Filter(m)
    }
}

impl From<TransformModule> for BuiltinModule {
    fn from(m: TransformModule) -> Self {
        BuiltinModule::Transform(m)
    }
}

impl From<ForEachModule> for BuiltinModule {
    fn from(m: ForEachModule) -> Self {
        BuiltinModule::ForEach(m)
    }
}
