//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

use listflow::pipeline::{Pipeline, PipelineResult};
use serde_json::Value;

/// Run a pipeline to completion on a small multi-thread runtime.
pub fn run_pipeline(pipeline: &mut Pipeline, initial: Option<Value>) -> PipelineResult<Value> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .build()
        .expect("runtime")
        .block_on(pipeline.run(initial, None, None))
}

/// Run a pipeline, collecting logger output alongside the result.
pub fn run_pipeline_logged(
    pipeline: &mut Pipeline,
    initial: Option<Value>,
) -> (PipelineResult<Value>, Vec<String>) {
    let mut lines = Vec::new();
    let mut sink = |msg: &str| lines.push(msg.to_string());
    let result = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .build()
        .expect("runtime")
        .block_on(pipeline.run(initial, Some(&mut sink), None));
    (result, lines)
}
