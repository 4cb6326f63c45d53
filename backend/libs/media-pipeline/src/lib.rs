// Upload transcoding pipeline: probe, thumbnail, multi-rendition encode,
// optional watermark. Runs external ffmpeg/ffprobe processes and reports
// partial or total success through the job record.

pub mod config;
pub mod error;
pub mod job;
pub mod orchestrator;
pub mod probe;
pub mod runner;

pub use config::{TranscodingConfig, WatermarkConfig};
pub use error::PipelineError;
pub use job::{JobStatus, Rendition, TranscodeJob};
pub use orchestrator::TranscodeOrchestrator;
pub use probe::SourceInfo;
pub use runner::{MediaRunner, ProcessRunner, ToolOutput};
