//! IntSource — emits a list of consecutive integers.
//!
//! Config:
//! - `start`: first value (default 1)
//! - `count`: how many (default 5)

use crate::pipeline::config::ModuleConfig;
use crate::pipeline::context::ProcessContext;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::module::{Module, ModuleKind, StageIo};
use serde_json::Value;

static IO: StageIo = StageIo {
    input_count: 0,
    input_label: "none",
    output_count: 1,
    output_label: "list[int]",
};

#[derive(Debug, Clone)]
pub struct IntSourceModule {
    name: String,
    config: ModuleConfig,
}

impl IntSourceModule {
    pub fn new(name: impl Into<String>, config: ModuleConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    /// Construct with the default name.
    pub fn with_config(config: ModuleConfig) -> Self {
        Self::new(ModuleKind::IntSource.default_name(), config)
    }
}

impl Default for IntSourceModule {
    fn default() -> Self {
        Self::with_config(ModuleConfig::new())
    }
}

impl Module for IntSourceModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ModuleKind {
        ModuleKind::IntSource
    }

    fn config(&self) -> &ModuleConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut ModuleConfig {
        &mut self.config
    }

    fn io(&self) -> StageIo {
        IO
    }

    fn process(&mut self, _input: Value, ctx: &mut ProcessContext<'_>) -> PipelineResult<Value> {
        let start = self.config.get_i64("start", 1);
        let count = self.config.get_i64("count", 5).max(0);
        let list: Vec<Value> = (0..count).map(|i| Value::from(start.saturating_add(i))).collect();
        tracing::debug!(module = %self.name, start, count, "produced integer list");
        ctx.log(&format!("{}: produced {} ints", self.name, list.len()));
        Ok(Value::Array(list))
    }
}
