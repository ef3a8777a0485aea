//! # listflow: list-stream dataflow engine
//!
//! An ordered sequence of transformation modules threads a JSON-like
//! payload through itself. The ForEach module expands each element of a
//! list payload into a private run of its declarative body, recursing
//! into nested ForEach steps. Filter and Transform evaluate a small
//! sandboxed expression language against each item.
//!
//! ## Architecture
//!
//! - **Pipeline**: linear executor; insertion order is execution order
//! - **Modules**: IntSource, Multiply, ToString, Filter, Transform,
//!   ForEach — a closed set dispatched as an enum
//! - **Specs**: declarative ForEach body entries, resolved into fresh
//!   module instances per element
//! - **Expressions**: fixed-grammar evaluator over one bound name `x`,
//!   with no ambient capabilities
//!
//! ## Example
//!
//! ```
//! use listflow::pipeline::{ModuleConfig, ModuleKind, ModuleSpec, Pipeline};
//! use listflow::pipeline::modules::{ForEachModule, IntSourceModule};
//!
//! let mut pipeline = Pipeline::new();
//! pipeline.add(IntSourceModule::with_config(
//!     ModuleConfig::new().with("start", 1).with("count", 3),
//! ));
//! pipeline.add(ForEachModule::with_body(
//!     "outer",
//!     ModuleConfig::new(),
//!     vec![ModuleSpec::KindConfig(
//!         ModuleKind::Multiply,
//!         Some(ModuleConfig::new().with("factor", 10)),
//!     )],
//! ));
//!
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let out = rt.block_on(pipeline.run(None, None, None)).unwrap();
//! assert_eq!(out, serde_json::json!([10.0, 20.0, 30.0]));
//! ```

pub mod expr;
pub mod pipeline;

// Re-export commonly used types
pub use expr::{Expr, ExprError};
pub use pipeline::{
    BuiltinModule, Module, ModuleConfig, ModuleKind, ModuleSpec, Pipeline, PipelineError,
    PipelineFile, PipelineResult, ProcessContext, StepPreview, StepStatus,
};
