//! ForEach — runs a private sub-pipeline once per list element.
//!
//! The body is declarative: an ordered list of [`ModuleSpec`]s, each
//! resolved into a brand-new module instance for every element, so body
//! steps carry no execution state across elements or calls. A non-list
//! payload is treated as a one-element list. Nested ForEach steps
//! recurse; termination follows from the body-spec tree being finite
//! and static.
//!
//! Spec-resolution failure is fatal to the call. A resolved step whose
//! `process` fails is recovered: the element's current value is kept and
//! the remaining steps still run, with the failure logged distinctly so
//! it cannot be mistaken for a successful no-op step.

use crate::pipeline::config::ModuleConfig;
use crate::pipeline::context::ProcessContext;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::module::{BuiltinModule, Module, ModuleKind, StageIo};
use crate::pipeline::preview::{PreviewSeq, StepPreview, StepStatus};
use crate::pipeline::spec::ModuleSpec;
use serde_json::Value;

static IO: StageIo = StageIo {
    input_count: 1,
    input_label: "list",
    output_count: 1,
    output_label: "list",
};

#[derive(Debug, Clone)]
pub struct ForEachModule {
    name: String,
    config: ModuleConfig,
    body: Vec<ModuleSpec>,
    /// Rebuilt every `process` call; reflects the last-processed element
    /// only.
    preview: PreviewSeq,
}

impl ForEachModule {
    /// Canonical `(name, config)` constructor. A `body` key in the
    /// config is parsed as the declarative body and removed; the body
    /// field is the single source of truth afterwards.
    pub fn new(name: impl Into<String>, mut config: ModuleConfig) -> PipelineResult<Self> {
        let body = match config.remove("body") {
            None => Vec::new(),
            Some(Value::Array(entries)) => entries
                .iter()
                .map(ModuleSpec::from_config_value)
                .collect::<PipelineResult<Vec<_>>>()?,
            Some(other) => {
                return Err(PipelineError::Construction(format!(
                    "for_each body must be an array, got {other}"
                )))
            }
        };
        Ok(Self::with_body(name, config, body))
    }

    /// Construct with an already-built body.
    pub fn with_body(
        name: impl Into<String>,
        config: ModuleConfig,
        body: Vec<ModuleSpec>,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            body,
            preview: Vec::new(),
        }
    }

    pub fn with_config(config: ModuleConfig) -> PipelineResult<Self> {
        Self::new(ModuleKind::ForEach.default_name(), config)
    }

    pub fn body(&self) -> &[ModuleSpec] {
        &self.body
    }

    /// Append a step to the body.
    pub fn add_step(&mut self, spec: ModuleSpec) {
        self.body.push(spec);
    }

    /// Insert a step at `index` (clamped to the body length).
    pub fn insert_step(&mut self, index: usize, spec: ModuleSpec) {
        let index = index.min(self.body.len());
        self.body.insert(index, spec);
    }

    /// Remove the step at `index`; `None` when out of range.
    pub fn remove_step(&mut self, index: usize) -> Option<ModuleSpec> {
        if index < self.body.len() {
            Some(self.body.remove(index))
        } else {
            None
        }
    }

    /// Move a step from `old` to `new`; out-of-range indices are a no-op.
    pub fn move_step(&mut self, old: usize, new: usize) {
        if old < self.body.len() && new < self.body.len() {
            let spec = self.body.remove(old);
            self.body.insert(new, spec);
        }
    }

    /// Last-element preview, one slot per body index.
    pub fn preview(&self) -> &PreviewSeq {
        &self.preview
    }
}

impl Module for ForEachModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ModuleKind {
        ModuleKind::ForEach
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
        let items = match input {
            Value::Array(items) => items,
            other => vec![other],
        };

        self.preview = vec![None; self.body.len()];

        let total = items.len();
        let mut out = Vec::with_capacity(total);
        for item in items {
            let mut current = item;
            for (idx, spec) in self.body.iter().enumerate() {
                let mut module = spec.resolve()?;
                let step_name = module.name().to_string();
                let input_snapshot = current.clone();
                self.preview[idx] =
                    Some(StepPreview::running(step_name.clone(), input_snapshot.clone()));

                match module.process(current, ctx) {
                    Ok(next) => current = next,
                    // Construction failures inside a nested ForEach stay
                    // fatal all the way up.
                    Err(err @ PipelineError::Construction(_)) => return Err(err),
                    Err(err) => {
                        tracing::warn!(
                            module = %self.name,
                            step = %step_name,
                            error = %err,
                            "body step failed, keeping previous value"
                        );
                        ctx.log(&format!(
                            "{}: step '{step_name}' failed ({err}), value unchanged",
                            self.name
                        ));
                        current = input_snapshot.clone();
                    }
                }

                let nested = match &module {
                    BuiltinModule::ForEach(inner) => Some(inner.preview().clone()),
                    _ => None,
                };
                self.preview[idx] = Some(StepPreview {
                    step: step_name,
                    last_input: Some(input_snapshot),
                    last_output: Some(current.clone()),
                    status: StepStatus::Done,
                    nested,
                });
            }
            out.push(current);
        }

        ctx.log(&format!(
            "{}: iterated {total} items -> produced {} items",
            self.name,
            out.len()
        ));
        Ok(Value::Array(out))
    }
}
