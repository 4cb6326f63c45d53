use thiserror::Error;

/// Step-level failures inside the pipeline.
///
/// None of these cross `TranscodeOrchestrator::process`'s boundary: a probe
/// failure marks the job `Failed`, everything else is logged and the step's
/// output omitted.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("probe failed: {0}")]
    Probe(String),

    #[error("source has no video stream")]
    NoVideoStream,

    #[error("encoder failed: {0}")]
    Encoder(String),

    #[error("malformed probe output: {0}")]
    ProbeParse(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
