/// ffprobe output parsing
use serde::Deserialize;

use crate::error::PipelineError;

/// Metadata of the first video stream in a source file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    pub duration_seconds: f64,
    pub width: u32,
    pub height: u32,
}

#[derive(Deserialize)]
struct ProbeDocument {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Parse `ffprobe -print_format json -show_format -show_streams` output.
/// Duration comes from the container format block; dimensions from the
/// first stream with `codec_type == "video"`.
pub(crate) fn parse_probe_output(raw: &[u8]) -> Result<SourceInfo, PipelineError> {
    let document: ProbeDocument = serde_json::from_slice(raw)?;

    let duration_seconds = document
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    for stream in document.streams {
        if stream.codec_type.as_deref() == Some("video") {
            return Ok(SourceInfo {
                duration_seconds,
                width: stream.width.unwrap_or(0),
                height: stream.height.unwrap_or(0),
            });
        }
    }

    Err(PipelineError::NoVideoStream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_video_stream() {
        let raw = br#"{
            "streams": [
                {"codec_type": "audio", "sample_rate": "44100"},
                {"codec_type": "video", "width": 1920, "height": 1080},
                {"codec_type": "video", "width": 640, "height": 360}
            ],
            "format": {"duration": "120.5"}
        }"#;
        let info = parse_probe_output(raw).unwrap();
        assert_eq!(
            info,
            SourceInfo {
                duration_seconds: 120.5,
                width: 1920,
                height: 1080,
            }
        );
    }

    #[test]
    fn audio_only_source_is_rejected() {
        let raw = br#"{
            "streams": [{"codec_type": "audio"}],
            "format": {"duration": "30.0"}
        }"#;
        assert!(matches!(
            parse_probe_output(raw),
            Err(PipelineError::NoVideoStream)
        ));
    }

    #[test]
    fn missing_duration_defaults_to_zero() {
        let raw = br#"{"streams": [{"codec_type": "video", "width": 100, "height": 100}]}"#;
        let info = parse_probe_output(raw).unwrap();
        assert_eq!(info.duration_seconds, 0.0);
    }

    #[test]
    fn garbage_output_is_a_parse_error() {
        assert!(matches!(
            parse_probe_output(b"not json"),
            Err(PipelineError::ProbeParse(_))
        ));
    }
}
