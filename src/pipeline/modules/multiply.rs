//! Multiply — scales a single numeric item by `factor`.
//!
//! Expects a scalar number; iteration over lists is ForEach's job. On a
//! type mismatch the input passes through unchanged (documented
//! fallback, logged distinctly).

use crate::pipeline::config::ModuleConfig;
use crate::pipeline::context::ProcessContext;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::module::{Module, ModuleKind, StageIo};
use serde_json::{Number, Value};

static IO: StageIo = StageIo {
    input_count: 1,
    input_label: "number",
    output_count: 1,
    output_label: "number",
};

#[derive(Debug, Clone)]
pub struct MultiplyModule {
    name: String,
    config: ModuleConfig,
}

impl MultiplyModule {
    pub fn new(name: impl Into<String>, config: ModuleConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    pub fn with_config(config: ModuleConfig) -> Self {
        Self::new(ModuleKind::Multiply.default_name(), config)
    }
}

impl Default for MultiplyModule {
    fn default() -> Self {
        Self::with_config(ModuleConfig::new())
    }
}

impl Module for MultiplyModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ModuleKind {
        ModuleKind::Multiply
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
        let factor = self.config.get_f64("factor", 1.0);
        let product = input
            .as_f64()
            .map(|n| n * factor)
            .and_then(Number::from_f64);
        match product {
            Some(n) => {
                ctx.log(&format!("{}: multiplied item -> {n}", self.name));
                Ok(Value::Number(n))
            }
            None => {
                tracing::warn!(
                    module = %self.name,
                    input = %input,
                    "non-numeric input or non-finite product; passing through unchanged"
                );
                ctx.log(&format!("{}: input not multipliable, unchanged", self.name));
                Ok(input)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn multiply(factor: f64, input: Value) -> Value {
        let mut m = MultiplyModule::with_config(ModuleConfig::new().with("factor", factor));
        m.process(input, &mut ProcessContext::silent()).unwrap()
    }

    #[test]
    fn test_multiplies_numbers() {
        assert_eq!(multiply(10.0, json!(3)), json!(30.0));
        assert_eq!(multiply(0.5, json!(4.0)), json!(2.0));
    }

    #[test]
    fn test_default_factor_is_identity() {
        let mut m = MultiplyModule::default();
        assert_eq!(
            m.process(json!(7), &mut ProcessContext::silent()).unwrap(),
            json!(7.0)
        );
    }

    #[test]
    fn test_type_mismatch_passes_through() {
        assert_eq!(multiply(10.0, json!("three")), json!("three"));
        assert_eq!(multiply(10.0, json!([1, 2])), json!([1, 2]));
        assert_eq!(multiply(10.0, Value::Null), Value::Null);
    }
}
