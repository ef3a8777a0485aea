//! Pipeline-specific error types.

use thiserror::Error;

/// Errors that can occur within the pipeline system.
///
/// Expression failures inside Filter/Transform are deliberately absent:
/// they are recovered locally with the documented fallbacks and never
/// surface as pipeline errors.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A top-level stage's `process` failed. Fatal to the run.
    #[error("stage '{stage}' failed")]
    Stage {
        stage: String,
        #[source]
        source: Box<PipelineError>,
    },

    /// A module spec could not be resolved into a module instance.
    /// Fatal to the enclosing ForEach call.
    #[error("cannot construct module from spec: {0}")]
    Construction(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pipeline description error: {0}")]
    Description(#[from] serde_json::Error),
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_error_names_the_stage() {
        let err = PipelineError::Stage {
            stage: "ForEach".to_string(),
            source: Box::new(PipelineError::Construction("bad spec".to_string())),
        };
        assert_eq!(err.to_string(), "stage 'ForEach' failed");
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.to_string().contains("bad spec"));
    }
}
