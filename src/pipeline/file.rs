//! Declarative pipeline descriptions.
//!
//! A `PipelineFile` is the JSON form a host persists and hands to the
//! engine: an ordered list of stage declarations, each naming a module
//! kind with optional name and config. ForEach stages describe their
//! body inside `config.body` using the spec forms documented on
//! [`crate::pipeline::spec::ModuleSpec::from_config_value`].
//!
//! ```json
//! {
//!   "stages": [
//!     { "kind": "int_source", "config": { "start": 1, "count": 5 } },
//!     { "kind": "for_each",
//!       "config": { "body": [["multiply", { "factor": 10 }]] } }
//!   ]
//! }
//! ```

use crate::pipeline::config::ModuleConfig;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::executor::Pipeline;
use crate::pipeline::module::ModuleKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One stage declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDecl {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ModuleConfig>,
}

/// A complete pipeline description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineFile {
    pub stages: Vec<StageDecl>,
}

impl PipelineFile {
    /// Load a description from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Save the description as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> PipelineResult<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Materialize a runnable pipeline from this description.
    pub fn build(&self) -> PipelineResult<Pipeline> {
        let mut pipeline = Pipeline::new();
        for decl in &self.stages {
            let kind = ModuleKind::from_name(&decl.kind).ok_or_else(|| {
                PipelineError::Construction(format!("unknown module kind '{}'", decl.kind))
            })?;
            pipeline.add(kind.build(decl.name.clone(), decl.config.clone())?);
        }
        Ok(pipeline)
    }
}
