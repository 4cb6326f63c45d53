/// Transcode pipeline orchestration.
///
/// A job walks Pending -> probe -> thumbnail -> renditions -> watermark.
/// Only the probe is fatal: a source we cannot read metadata from marks the
/// job `Failed` and skips everything else. Thumbnail, individual renditions
/// and the watermark are best-effort; their failures are logged and the job
/// still completes with whatever outputs succeeded.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::config::TranscodingConfig;
use crate::error::PipelineError;
use crate::job::{JobStatus, Rendition, TranscodeJob};
use crate::probe::{parse_probe_output, SourceInfo};
use crate::runner::{MediaRunner, ProcessRunner};

pub struct TranscodeOrchestrator {
    config: TranscodingConfig,
    runner: Arc<dyn MediaRunner>,
}

impl TranscodeOrchestrator {
    pub fn new(config: TranscodingConfig) -> Self {
        Self::with_runner(config, Arc::new(ProcessRunner))
    }

    pub fn with_runner(config: TranscodingConfig, runner: Arc<dyn MediaRunner>) -> Self {
        Self { config, runner }
    }

    /// Process one uploaded source into renditions and a thumbnail.
    ///
    /// Never returns an error and never panics: every failure is captured
    /// into the returned job's `status`/`error`. Output files are freshly
    /// named per job, so re-processing the same source cannot overwrite a
    /// prior job's outputs. Long encodes run on `tokio::process`; callers
    /// spawn this off the request path.
    pub async fn process(&self, source: &Path) -> TranscodeJob {
        let mut job = TranscodeJob::pending(source.to_path_buf());
        info!(job_id = %job.id, source = %source.display(), "transcode started");

        let info = match self.probe(source).await {
            Ok(info) => info,
            Err(err) => {
                warn!(job_id = %job.id, error = %err, "probe failed, job aborted");
                job.status = JobStatus::Failed;
                job.error = Some(err.to_string());
                return job;
            }
        };
        job.duration_seconds = info.duration_seconds;
        job.width = info.width;
        job.height = info.height;

        match self.thumbnail(source, &info).await {
            Ok(path) => job.thumbnail = Some(path),
            Err(err) => warn!(job_id = %job.id, error = %err, "thumbnail generation failed"),
        }

        for format in &self.config.formats {
            for &resolution in &self.config.resolutions {
                if resolution > info.height {
                    continue;
                }
                match self.transcode(source, format, resolution).await {
                    Ok(rendition) => job.outputs.push(rendition),
                    Err(err) => warn!(
                        job_id = %job.id,
                        format,
                        resolution,
                        error = %err,
                        "rendition failed, output omitted"
                    ),
                }
            }
        }

        if self.config.watermark.enabled {
            if let Some(asset) = self.config.watermark.asset_path.clone() {
                for index in 0..job.outputs.len() {
                    let target = job.outputs[index].path.clone();
                    match self.watermark(&target, &asset).await {
                        Ok(size_bytes) => job.outputs[index].size_bytes = size_bytes,
                        Err(err) => warn!(
                            job_id = %job.id,
                            target = %target.display(),
                            error = %err,
                            "watermark overlay failed"
                        ),
                    }
                }
            }
        }

        job.status = JobStatus::Completed;
        info!(
            job_id = %job.id,
            outputs = job.outputs.len(),
            thumbnail = job.thumbnail.is_some(),
            "transcode completed"
        );
        job
    }

    async fn probe(&self, source: &Path) -> Result<SourceInfo, PipelineError> {
        let args = vec![
            "-v".to_string(),
            "quiet".to_string(),
            "-print_format".to_string(),
            "json".to_string(),
            "-show_format".to_string(),
            "-show_streams".to_string(),
            source.to_string_lossy().into_owned(),
        ];
        let output = self.runner.run(&self.config.ffprobe_path, &args).await?;
        if !output.success {
            return Err(PipelineError::Probe(output.stderr_text()));
        }
        parse_probe_output(&output.stdout)
    }

    async fn thumbnail(
        &self,
        source: &Path,
        info: &SourceInfo,
    ) -> Result<PathBuf, PipelineError> {
        tokio::fs::create_dir_all(&self.config.thumbnail_dir).await?;
        let out = self
            .config
            .thumbnail_dir
            .join(format!("thumb_{}.jpg", Uuid::new_v4().simple()));

        // Grab the frame a quarter of the way in; early frames are often
        // black or a title card.
        let seek = info.duration_seconds * 0.25;
        let args = vec![
            "-y".to_string(),
            "-ss".to_string(),
            format!("{seek:.3}"),
            "-i".to_string(),
            source.to_string_lossy().into_owned(),
            "-vframes".to_string(),
            "1".to_string(),
            "-q:v".to_string(),
            "2".to_string(),
            out.to_string_lossy().into_owned(),
        ];
        let output = self.runner.run(&self.config.ffmpeg_path, &args).await?;
        if !output.success {
            return Err(PipelineError::Encoder(output.stderr_text()));
        }
        Ok(out)
    }

    async fn transcode(
        &self,
        source: &Path,
        format: &str,
        resolution: u32,
    ) -> Result<Rendition, PipelineError> {
        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        let out = self.config.output_dir.join(format!(
            "video_{}_{resolution}p.{format}",
            Uuid::new_v4().simple()
        ));
        let bitrate = self.config.bitrate_for(resolution).to_string();

        let args = vec![
            "-y".to_string(),
            "-i".to_string(),
            source.to_string_lossy().into_owned(),
            "-vf".to_string(),
            format!("scale=-2:{resolution}"),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-b:v".to_string(),
            bitrate.clone(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-b:a".to_string(),
            "128k".to_string(),
            out.to_string_lossy().into_owned(),
        ];
        let output = self.runner.run(&self.config.ffmpeg_path, &args).await?;
        if !output.success {
            return Err(PipelineError::Encoder(output.stderr_text()));
        }

        let size_bytes = tokio::fs::metadata(&out).await?.len();
        Ok(Rendition {
            format: format.to_string(),
            resolution,
            bitrate,
            path: out,
            size_bytes,
        })
    }

    /// Overlay the watermark asset onto a finished rendition.
    ///
    /// The overlay writes to a temp sibling and renames over the target
    /// only on success, so a failed or abandoned overlay leaves the
    /// rendition intact and no half-written file behind.
    async fn watermark(&self, target: &Path, asset: &Path) -> Result<u64, PipelineError> {
        let mut tmp_name: OsString = target.as_os_str().to_os_string();
        tmp_name.push(".wm.tmp");
        let tmp = PathBuf::from(tmp_name);

        let args = vec![
            "-y".to_string(),
            "-i".to_string(),
            target.to_string_lossy().into_owned(),
            "-i".to_string(),
            asset.to_string_lossy().into_owned(),
            "-filter_complex".to_string(),
            "overlay=10:10".to_string(),
            tmp.to_string_lossy().into_owned(),
        ];
        let output = self.runner.run(&self.config.ffmpeg_path, &args).await?;
        if !output.success {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(PipelineError::Encoder(output.stderr_text()));
        }

        tokio::fs::rename(&tmp, target).await?;
        Ok(tokio::fs::metadata(target).await?.len())
    }
}
