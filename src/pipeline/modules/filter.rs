//! Filter — keeps or drops list items by a boolean expression.
//!
//! Config:
//! - `expr`: predicate over `x` (e.g. `"x % 2 == 0"`); empty keeps all
//! - `mode`: `"keep"` (default) or `"drop"`
//! - `field`: optional key projected out of mapping items before
//!   evaluation
//!
//! An expression that fails to parse or evaluate counts as a false
//! predicate for that item — under the default keep mode the item is
//! excluded. This is the documented recovery for unsafe or malformed
//! expressions; it is logged at trace level, never raised.

use crate::expr::ExprSlot;
use crate::pipeline::config::ModuleConfig;
use crate::pipeline::context::ProcessContext;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::module::{Module, ModuleKind, StageIo};
use serde_json::Value;

static IO: StageIo = StageIo {
    input_count: 1,
    input_label: "list",
    output_count: 1,
    output_label: "list",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterMode {
    Keep,
    Drop,
}

impl FilterMode {
    fn parse(name: &str, raw: Option<&str>) -> Self {
        match raw {
            None | Some("keep") => FilterMode::Keep,
            Some("drop") => FilterMode::Drop,
            Some(other) => {
                tracing::warn!(module = %name, mode = other, "unknown filter mode, using 'keep'");
                FilterMode::Keep
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterModule {
    name: String,
    config: ModuleConfig,
    slot: ExprSlot,
}

impl FilterModule {
    pub fn new(name: impl Into<String>, config: ModuleConfig) -> Self {
        Self {
            name: name.into(),
            config,
            slot: ExprSlot::new(),
        }
    }

    pub fn with_config(config: ModuleConfig) -> Self {
        Self::new(ModuleKind::Filter.default_name(), config)
    }
}

impl Default for FilterModule {
    fn default() -> Self {
        Self::with_config(ModuleConfig::new())
    }
}

impl Module for FilterModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ModuleKind {
        ModuleKind::Filter
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
        let mode = FilterMode::parse(&self.name, self.config.get_str("mode"));
        let field = self.config.get_str("field");

        if input.is_null() {
            return Ok(Value::Array(Vec::new()));
        }
        let items = match input {
            Value::Array(items) => items,
            other => vec![other],
        };

        // Empty expression: predicate is constant true. Otherwise compile
        // once per call; a parse failure makes the predicate constant
        // false (everything excluded under keep).
        let compiled = if expr_src.is_empty() {
            None
        } else {
            match self.slot.get_or_compile(expr_src) {
                Ok(expr) => Some(expr),
                Err(err) => {
                    tracing::warn!(module = %self.name, error = %err, "filter expression rejected");
                    let total = items.len();
                    let out = match mode {
                        FilterMode::Keep => Vec::new(),
                        FilterMode::Drop => items,
                    };
                    ctx.log(&format!(
                        "{}: filtered {} -> {} items (expr rejected)",
                        self.name,
                        total,
                        out.len()
                    ));
                    return Ok(Value::Array(out));
                }
            }
        };

        let total = items.len();
        let mut out = Vec::new();
        for item in items {
            let projected = match (field, &item) {
                (Some(key), Value::Object(map)) => map.get(key).cloned().unwrap_or(Value::Null),
                _ => item.clone(),
            };
            let pred = match compiled {
                None => true,
                Some(expr) => expr.eval_bool(&projected).unwrap_or_else(|err| {
                    tracing::trace!(module = %self.name, error = %err, "predicate error, treating as false");
                    false
                }),
            };
            let keep = match mode {
                FilterMode::Keep => pred,
                FilterMode::Drop => !pred,
            };
            if keep {
                out.push(item);
            }
        }

        ctx.log(&format!(
            "{}: filtered {} -> {} items (expr={:?}, mode={:?})",
            self.name,
            total,
            out.len(),
            expr_src,
            mode
        ));
        Ok(Value::Array(out))
    }
}
