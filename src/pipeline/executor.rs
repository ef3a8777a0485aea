//! Pipeline executor — the linear stage scheduler.
//!
//! A run threads the accumulated payload through the stages in
//! insertion order. Exactly one module executes at a time; there is no
//! fan-out across list elements and no cancellation — a hung `process`
//! blocks the run. `run` is async so a cooperative caller is never
//! blocked: on a multi-thread tokio runtime each synchronous `process`
//! call is dispatched through `block_in_place`.

use crate::pipeline::context::ProcessContext;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::module::{BuiltinModule, Module};
use serde_json::Value;

/// Host logger sink: freeform progress strings, no structured schema.
pub type LogSink<'a> = &'a mut dyn FnMut(&str);

/// Per-stage observer, invoked after each top-level stage completes.
/// Errors are caught and logged; they never abort the run.
pub type StageObserver<'a> = &'a mut dyn FnMut(&BuiltinModule, &Value) -> anyhow::Result<()>;

/// Diagnostic state captured around each stage call. Single-writer: only
/// the executor mutates it; external observers read between runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageTrace {
    /// Payload handed to the stage on the most recent run.
    pub last_input: Option<Value>,
    /// Payload the stage returned on the most recent run.
    pub last_output: Option<Value>,
    /// The stage output as last propagated downstream.
    pub propagated_output: Option<Value>,
}

/// A slot holding a stage module and its diagnostic trace.
#[derive(Debug, Clone)]
pub struct StageSlot {
    pub module: BuiltinModule,
    pub trace: StageTrace,
}

impl StageSlot {
    pub fn new(module: BuiltinModule) -> Self {
        Self {
            module,
            trace: StageTrace::default(),
        }
    }
}

/// Linear pipeline: an ordered sequence of modules, executed left to
/// right. An empty pipeline is valid and runs as identity.
#[derive(Debug, Default)]
pub struct Pipeline {
    stages: Vec<StageSlot>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stages(modules: impl IntoIterator<Item = BuiltinModule>) -> Self {
        Self {
            stages: modules.into_iter().map(StageSlot::new).collect(),
        }
    }

    /// Append a stage; insertion order is execution order.
    pub fn add(&mut self, module: impl Into<BuiltinModule>) {
        self.stages.push(StageSlot::new(module.into()));
    }

    pub fn stages(&self) -> &[StageSlot] {
        &self.stages
    }

    /// Mutable stage access for host-driven config edits between runs.
    pub fn stages_mut(&mut self) -> &mut [StageSlot] {
        &mut self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run the pipeline. `initial` defaults to an empty list. Stage
    /// failures are logged and re-raised wrapped in
    /// [`PipelineError::Stage`]; whatever stages completed keep their
    /// traces for inspection.
    pub async fn run(
        &mut self,
        initial: Option<Value>,
        mut logger: Option<LogSink<'_>>,
        mut observer: Option<StageObserver<'_>>,
    ) -> PipelineResult<Value> {
        let mut data = initial.unwrap_or_else(|| Value::Array(Vec::new()));
        emit(&mut logger, "pipeline: starting");
        tracing::debug!(stages = self.stages.len(), "pipeline run starting");

        for slot in &mut self.stages {
            let name = slot.module.name().to_string();
            emit(&mut logger, &format!("pipeline: running module '{name}'"));
            slot.trace.last_input = Some(data.clone());

            let input = data;
            let result = {
                let mut ctx = match logger.as_mut() {
                    Some(sink) => ProcessContext::with_logger(&mut **sink),
                    None => ProcessContext::silent(),
                };
                let module = &mut slot.module;
                dispatch_blocking(move || module.process(input, &mut ctx))
            };

            match result {
                Ok(output) => {
                    slot.trace.last_output = Some(output.clone());
                    data = output;
                    slot.trace.propagated_output = Some(data.clone());
                    if let Some(obs) = observer.as_mut() {
                        if let Err(err) = obs(&slot.module, &data) {
                            tracing::warn!(stage = %name, error = %err, "stage observer failed");
                            emit(
                                &mut logger,
                                &format!("pipeline: observer failed for '{name}': {err:#}"),
                            );
                        }
                    }
                }
                Err(err) => {
                    tracing::error!(stage = %name, error = %err, "stage failed, aborting run");
                    emit(&mut logger, &format!("pipeline: module '{name}' failed: {err}"));
                    return Err(PipelineError::Stage {
                        stage: name,
                        source: Box::new(err),
                    });
                }
            }
        }

        emit(&mut logger, "pipeline: finished");
        Ok(data)
    }
}

fn emit(logger: &mut Option<LogSink<'_>>, msg: &str) {
    if let Some(sink) = logger.as_mut() {
        sink(msg);
    }
}

/// Run a synchronous stage without starving a cooperative caller: on a
/// multi-thread runtime the call is marked blocking so other tasks
/// migrate off this worker; elsewhere it runs inline.
fn dispatch_blocking<T>(f: impl FnOnce() -> T) -> T {
    use tokio::runtime::{Handle, RuntimeFlavor};
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}
