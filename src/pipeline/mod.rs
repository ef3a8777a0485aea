//! Module-based dataflow pipeline.
//!
//! A payload (a JSON-like value, usually a list) flows through an
//! ordered sequence of modules. ForEach expands each list element into
//! a private run of its declarative body, recursing into nested
//! ForEach steps.
//!
//! # Architecture
//!
//! ```text
//! [IntSource] ──► [Filter] ──► [ForEach]
//!                                 │ body (specs, resolved per element)
//!                                 ├──► [Transform]
//!                                 └──► [ForEach] ──► …
//! ```
//!
//! # Design
//!
//! - **Enum dispatch** — `BuiltinModule` closes over the fixed variant
//!   set; no type inspection.
//! - **Declarative bodies** — ForEach holds `ModuleSpec`s, resolved into
//!   fresh instances per element; no state survives a call.
//! - **Single-writer diagnostics** — `StageTrace` and the ForEach
//!   preview are written only by the executor/owning module; observers
//!   read between runs.
//! - **Sequential execution** — one module at a time, both across stages
//!   and across elements; no fan-out.

pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod file;
pub mod module;
pub mod modules;
pub mod preview;
pub mod spec;

pub use config::ModuleConfig;
pub use context::ProcessContext;
pub use error::{PipelineError, PipelineResult};
pub use executor::{LogSink, Pipeline, StageObserver, StageSlot, StageTrace};
pub use file::{PipelineFile, StageDecl};
pub use module::{BuiltinModule, Module, ModuleKind, StageIo};
pub use preview::{PreviewSeq, StepPreview, StepStatus};
pub use spec::ModuleSpec;
