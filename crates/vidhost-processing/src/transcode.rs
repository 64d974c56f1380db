//! FFmpeg process runner
//!
//! Every transcode in vidhost is one `ffmpeg` invocation whose output is
//! written to stdout (`pipe:1`) and collected into memory. Inputs come either
//! from a file on disk or from a buffer streamed to stdin (`pipe:0`).

use bytes::Bytes;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("Invalid ffmpeg path: {0}")]
    InvalidBinary(String),

    #[error("Failed to execute ffmpeg for {operation}: {source}")]
    Spawn {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("FFmpeg {operation} failed ({status}): {stderr}")]
    Failed {
        operation: &'static str,
        status: ExitStatus,
        stderr: String,
    },

    #[error("FFmpeg {operation} produced no output: {stderr}")]
    EmptyOutput {
        operation: &'static str,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where ffmpeg reads its input from.
#[derive(Debug, Clone, Copy)]
pub enum MediaInput<'a> {
    File(&'a Path),
    Memory(&'a Bytes),
}

/// Arguments for one ffmpeg run. `input_args` go before `-i`, `output_args`
/// after it; the output target is always `pipe:1`.
#[derive(Debug, Default, Clone)]
pub struct FfmpegArgs {
    pub input_args: Vec<String>,
    pub output_args: Vec<String>,
}

impl FfmpegArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn output<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }
}

#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    ffmpeg_path: String,
}

impl FfmpegRunner {
    pub fn new(ffmpeg_path: impl Into<String>) -> Result<Self, TranscodeError> {
        let ffmpeg_path = ffmpeg_path.into();
        let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
        if ffmpeg_path.trim().is_empty() || ffmpeg_path.chars().any(|c| dangerous_chars.contains(&c))
        {
            return Err(TranscodeError::InvalidBinary(ffmpeg_path));
        }

        Ok(Self { ffmpeg_path })
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.ffmpeg_path
    }

    /// Whether the configured binary can be executed.
    pub async fn is_available(&self) -> bool {
        Command::new(&self.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Run ffmpeg and collect stdout.
    ///
    /// A non-zero exit, or a zero exit with empty stdout, is an error carrying
    /// ffmpeg's stderr.
    pub async fn run(
        &self,
        operation: &'static str,
        input: MediaInput<'_>,
        args: &FfmpegArgs,
    ) -> Result<Bytes, TranscodeError> {
        let start = std::time::Instant::now();

        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.args(["-hide_banner", "-loglevel", "error"])
            .args(&args.input_args)
            .arg("-i");

        match input {
            MediaInput::File(path) => {
                cmd.arg(path).stdin(Stdio::null());
            }
            MediaInput::Memory(_) => {
                cmd.arg("pipe:0").stdin(Stdio::piped());
            }
        }

        cmd.args(&args.output_args)
            .arg("pipe:1")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|source| TranscodeError::Spawn { operation, source })?;

        let writer = match (input, child.stdin.take()) {
            (MediaInput::Memory(data), Some(mut stdin)) => {
                let data = data.clone();
                Some(tokio::spawn(async move {
                    // ffmpeg may close stdin early once it has what it needs
                    if let Err(e) = stdin.write_all(&data).await {
                        tracing::debug!(error = %e, "ffmpeg stdin closed before input was fully written");
                    }
                    drop(stdin);
                }))
            }
            _ => None,
        };

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| TranscodeError::Spawn { operation, source })?;

        if let Some(writer) = writer {
            if let Err(e) = writer.await {
                tracing::warn!(error = %e, "ffmpeg stdin writer task failed");
            }
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            tracing::error!(
                operation,
                status = %output.status,
                stderr = %stderr,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "FFmpeg run failed"
            );
            return Err(TranscodeError::Failed {
                operation,
                status: output.status,
                stderr,
            });
        }

        if output.stdout.is_empty() {
            tracing::error!(
                operation,
                stderr = %stderr,
                "FFmpeg run produced no output"
            );
            return Err(TranscodeError::EmptyOutput { operation, stderr });
        }

        tracing::debug!(
            operation,
            output_bytes = output.stdout.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "FFmpeg run completed"
        );

        Ok(Bytes::from(output.stdout))
    }
}
