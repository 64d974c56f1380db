use crate::staging::{StagedUpload, UploadKind, UploadStager};
use crate::transcode::{FfmpegArgs, FfmpegRunner};
use bytes::Bytes;
use std::io::Cursor;
use std::path::Path;
use std::process::Stdio;

/// Runner for the ffmpeg on PATH (or `FFMPEG_PATH`), `None` when unavailable.
pub async fn ffmpeg_runner() -> Option<FfmpegRunner> {
    let path = std::env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string());
    let runner = FfmpegRunner::new(path).ok()?;
    if runner.is_available().await {
        Some(runner)
    } else {
        eprintln!("ffmpeg not available, skipping");
        None
    }
}

pub async fn has_encoder(runner: &FfmpegRunner, encoder: &str) -> bool {
    tokio::process::Command::new(runner.ffmpeg_path())
        .args(["-hide_banner", "-encoders"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .await
        .map(|o| String::from_utf8_lossy(&o.stdout).contains(encoder))
        .unwrap_or(false)
}

/// Stage a synthetic test-pattern video of `seconds` length on disk.
pub async fn write_test_video(
    runner: &FfmpegRunner,
    stager: &UploadStager,
    seconds: u32,
) -> StagedUpload {
    let source = format!("testsrc=duration={}:size=320x240:rate=10", seconds);
    let args = FfmpegArgs::new()
        .input(["-f", "lavfi"])
        .output(["-pix_fmt", "yuv420p", "-f", "matroska"]);
    let video = runner
        .run("fixture", crate::transcode::MediaInput::File(Path::new(&source)), &args)
        .await
        .unwrap();

    let mut file = stager
        .create_file(
            UploadKind::Video,
            Some("fixture.mkv".to_string()),
            Some("video/x-matroska".to_string()),
            None,
        )
        .unwrap();
    file.write_chunk(&video).await.unwrap();
    file.finish().await.unwrap()
}

pub fn jpeg_fixture(width: u32, height: u32) -> Bytes {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 4) as u8, (y * 4) as u8, 128])
    });
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
        .unwrap();
    Bytes::from(buf)
}
