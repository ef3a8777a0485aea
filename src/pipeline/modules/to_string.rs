//! ToString — converts any item to its textual representation.
//!
//! Strings pass through unchanged; everything else renders as compact
//! JSON.

use crate::pipeline::config::ModuleConfig;
use crate::pipeline::context::ProcessContext;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::module::{Module, ModuleKind, StageIo};
use serde_json::Value;

static IO: StageIo = StageIo {
    input_count: 1,
    input_label: "any",
    output_count: 1,
    output_label: "string",
};

#[derive(Debug, Clone)]
pub struct ToStringModule {
    name: String,
    config: ModuleConfig,
}

impl ToStringModule {
    pub fn new(name: impl Into<String>, config: ModuleConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    pub fn with_config(config: ModuleConfig) -> Self {
        Self::new(ModuleKind::ToString.default_name(), config)
    }
}

impl Default for ToStringModule {
    fn default() -> Self {
        Self::with_config(ModuleConfig::new())
    }
}

impl Module for ToStringModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ModuleKind {
        ModuleKind::ToString
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

    fn process(&mut self, input: Value, ctx: &mut ProcessContext<'_>) -> PipelineResult<Value> {
        let text = match input {
            Value::String(s) => s,
            other => serde_json::to_string(&other)?,
        };
        ctx.log(&format!("{}: converted item to string -> {text}", self.name));
        Ok(Value::String(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stringify(input: Value) -> Value {
        let mut m = ToStringModule::default();
        m.process(input, &mut ProcessContext::silent()).unwrap()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(stringify(json!(42)), json!("42"));
        assert_eq!(stringify(json!(1.5)), json!("1.5"));
        assert_eq!(stringify(json!(true)), json!("true"));
        assert_eq!(stringify(Value::Null), json!("null"));
    }

    #[test]
    fn test_strings_pass_through() {
        assert_eq!(stringify(json!("hi")), json!("hi"));
    }

    #[test]
    fn test_compound_values_render_as_json() {
        assert_eq!(stringify(json!([1, 2])), json!("[1,2]"));
        assert_eq!(stringify(json!({"a": 1})), json!("{\"a\":1}"));
    }
}
