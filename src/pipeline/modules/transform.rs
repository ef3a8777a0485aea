//! Transform — applies an expression to each item (map-like).
//!
//! Config:
//! - `expr`: expression over `x` (e.g. `"x * x"`); empty is identity
//! - `field`: optional — when set and the item is a mapping, the field
//!   value is transformed and written back into a shallow copy instead
//!   of replacing the whole item
//!
//! Any expression failure falls back to the unchanged value for that
//! item, so a broken config degrades to identity rather than breaking
//! the pipeline.

use crate::expr::ExprSlot;
use crate::pipeline::config::ModuleConfig;
use crate::pipeline::context::ProcessContext;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::module::{Module, ModuleKind, StageIo};
use serde_json::Value;

static IO: StageIo = StageIo {
    input_count: 1,
    input_label: "list|scalar",
    output_count: 1,
    output_label: "list|scalar",
};

#[derive(Debug, Clone)]
pub struct TransformModule {
    name: String,
    config: ModuleConfig,
    slot: ExprSlot,
}

impl TransformModule {
    pub fn new(name: impl Into<String>, config: ModuleConfig) -> Self {
        Self {
            name: name.into(),
            config,
            slot: ExprSlot::new(),
        }
    }

    pub fn with_config(config: ModuleConfig) -> Self {
        Self::new(ModuleKind::Transform.default_name(), config)
    }
}

impl Default for TransformModule {
    fn default() -> Self {
        Self::with_config(ModuleConfig::new())
    }
}

fn apply_one(
    name: &str,
    expr: Option<&crate::expr::Expr>,
    field: Option<&str>,
    item: Value,
) -> Value {
    let eval = |value: &Value| -> Value {
        match expr {
            None => value.clone(),
            Some(expr) => expr.eval(value).unwrap_or_else(|err| {
                tracing::trace!(module = %name, error = %err, "transform error, keeping value");
                value.clone()
            }),
        }
    };
    match (field, item) {
        (Some(key), Value::Object(mut map)) => {
            let current = map.get(key).cloned().unwrap_or(Value::Null);
            map.insert(key.to_string(), eval(&current));
            Value::Object(map)
        }
        (_, item) => eval(&item),
    }
}

impl Module for TransformModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ModuleKind {
        ModuleKind::Transform
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
        let expr_src = self.config.get_str("expr").unwrap_or("");
        let field = self.config.get_str("field");

        if input.is_null() {
            return Ok(Value::Array(Vec::new()));
        }

        let compiled = if expr_src.is_empty() {
            None
        } else {
            match self.slot.get_or_compile(expr_src) {
                Ok(expr) => Some(expr),
                Err(err) => {
                    // Unparseable expression: identity fallback for the
                    // whole payload, logged once.
                    tracing::warn!(module = %self.name, error = %err, "transform expression rejected");
                    ctx.log(&format!("{}: expression rejected, payload unchanged", self.name));
                    return Ok(input);
                }
            }
        };

        let out = match input {
            Value::Array(items) => {
                let mapped: Vec<Value> = items
                    .into_iter()
                    .map(|item| apply_one(&self.name, compiled, field, item))
                    .collect();
                ctx.log(&format!("{}: transformed {} items", self.name, mapped.len()));
                Value::Array(mapped)
            }
            scalar => {
                ctx.log(&format!("{}: transformed 1 item", self.name));
                apply_one(&self.name, compiled, field, scalar)
            }
        };
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(cfg: ModuleConfig, input: Value) -> Value {
        let mut m = TransformModule::with_config(cfg);
        m.process(input, &mut ProcessContext::silent()).unwrap()
    }

    #[test]
    fn test_square_list() {
        let out = run(ModuleConfig::new().with("expr", "x * x"), json!([1, 2, 3]));
        assert_eq!(out, json!([1, 4, 9]));
    }

    #[test]
    fn test_field_update_makes_shallow_copy() {
        let out = run(
            ModuleConfig::new().with("expr", "x.upper()").with("field", "name"),
            json!([{"name": "a"}, {"name": "bb"}]),
        );
        assert_eq!(out, json!([{"name": "A"}, {"name": "BB"}]));
    }

    #[test]
    fn test_field_update_preserves_other_keys() {
        let out = run(
            ModuleConfig::new().with("expr", "x * 2").with("field", "v"),
            json!([{"v": 3, "tag": "keep me"}]),
        );
        assert_eq!(out, json!([{"v": 6, "tag": "keep me"}]));
    }

    #[test]
    fn test_scalar_input() {
        let out = run(ModuleConfig::new().with("expr", "x + 1"), json!(41));
        assert_eq!(out, json!(42));
    }

    #[test]
    fn test_unsafe_expression_is_identity() {
        let out = run(
            ModuleConfig::new().with("expr", "__import__('os').system('echo hi')"),
            json!([1, 2]),
        );
        assert_eq!(out, json!([1, 2]));
    }

    #[test]
    fn test_per_item_eval_error_keeps_item() {
        // Uppercasing a number fails; that item is left unchanged while
        // the string still transforms.
        let out = run(
            ModuleConfig::new().with("expr", "x.upper()"),
            json!(["a", 7]),
        );
        assert_eq!(out, json!(["A", 7]));
    }

    #[test]
    fn test_empty_expression_is_identity() {
        let out = run(ModuleConfig::new(), json!([1, "a"]));
        assert_eq!(out, json!([1, "a"]));
    }

    #[test]
    fn test_null_input_yields_empty_list() {
        let out = run(ModuleConfig::new().with("expr", "x"), Value::Null);
        assert_eq!(out, json!([]));
    }
}
