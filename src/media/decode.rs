//! Frame decoding for animated images and videos.
//!
//! GIFs are decoded with the image crate. Videos are first transcoded to a
//! GIF stream by ffmpeg, so both end up on the same decoder.

use iced::widget::image::Handle;
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, Delay, ImageDecoder};
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Seek};
use std::path::Path;
use std::process::Command;
use std::time::Duration;
use tracing::{debug, info};

use super::animation::{Animation, Frame};
use crate::error::MediaError;
use crate::process;

/// Used for frames with no delay or one too short to display
const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(100);
const MIN_FRAME_DELAY: Duration = Duration::from_millis(20);

/// Videos are sampled at this rate
const VIDEO_FPS: u32 = 10;
/// Videos wider than this are scaled down
const VIDEO_MAX_WIDTH: u32 = 640;
/// Only the start of a long video is decoded
const VIDEO_MAX_SECONDS: u32 = 20;

/// Lines of ffmpeg's stderr kept for the error message
const STDERR_TAIL_LINES: usize = 20;

/// Decode every frame of a GIF file
pub fn gif_file(path: &Path) -> Result<Animation, MediaError> {
    let file = File::open(path).map_err(|source| MediaError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    gif(path, BufReader::new(file))
}

/// Decode every frame of a GIF stream read from `reader`.
/// `path` names the source for errors and the resulting animation.
pub fn gif<R: BufRead + Seek>(path: &Path, reader: R) -> Result<Animation, MediaError> {
    let decode_error = |source: image::ImageError| MediaError::Decode {
        path: path.to_path_buf(),
        source,
    };

    let decoder = GifDecoder::new(reader).map_err(decode_error)?;
    let size = decoder.dimensions();
    let frames = decoder
        .into_frames()
        .collect_frames()
        .map_err(decode_error)?;

    if frames.is_empty() {
        return Err(MediaError::NoFrames(path.to_path_buf()));
    }

    // Frames come out composited to the full canvas
    let frames: Vec<Frame> = frames
        .into_iter()
        .map(|frame| {
            let delay = frame_delay(frame.delay());
            let buffer = frame.into_buffer();
            let (width, height) = buffer.dimensions();
            Frame {
                handle: Handle::from_rgba(width, height, buffer.into_raw()),
                delay,
            }
        })
        .collect();

    debug!("Decoded {} frames from {}", frames.len(), path.display());
    Ok(Animation::new(path.to_path_buf(), frames, size))
}

/// Decode the start of a video by transcoding it to GIF with ffmpeg
pub fn video(path: &Path, ffmpeg: &str, timeout: Duration) -> Result<Animation, MediaError> {
    info!("Decoding {} with {}", path.display(), ffmpeg);

    let mut command = Command::new(ffmpeg);
    command
        .args(["-v", "error", "-nostdin", "-i"])
        .arg(path)
        .arg("-t")
        .arg(VIDEO_MAX_SECONDS.to_string())
        .arg("-vf")
        .arg(format!(
            "fps={},scale='min({},iw)':-1",
            VIDEO_FPS, VIDEO_MAX_WIDTH
        ))
        .args(["-f", "gif", "pipe:1"]);

    let finished = process::run(command, timeout).map_err(|source| MediaError::Transcoder {
        path: path.to_path_buf(),
        source,
    })?;

    if !finished.status.success() {
        return Err(MediaError::TranscodeFailed {
            path: path.to_path_buf(),
            status: finished.status.to_string(),
            stderr: process::tail(&finished.stderr, STDERR_TAIL_LINES),
        });
    }

    gif(path, Cursor::new(finished.stdout))
}

/// Display time of a frame, with browser-style handling of tiny delays
fn frame_delay(delay: Delay) -> Duration {
    let (numer, denom) = delay.numer_denom_ms();
    let millis = if denom == 0 { 0 } else { numer / denom };
    let delay = Duration::from_millis(u64::from(millis));

    if delay < MIN_FRAME_DELAY {
        DEFAULT_FRAME_DELAY
    } else {
        delay
    }
}

/// Write a GIF with two 4x3 frames: red for 50ms, then blue with no delay
#[cfg(test)]
pub fn write_test_gif(path: &Path) {
    use image::codecs::gif::{GifEncoder, Repeat};
    use image::{Frame as ImageFrame, Rgba, RgbaImage};

    let file = File::create(path).unwrap();
    let mut encoder = GifEncoder::new(file);
    encoder.set_repeat(Repeat::Infinite).unwrap();
    encoder
        .encode_frames(vec![
            ImageFrame::from_parts(
                RgbaImage::from_pixel(4, 3, Rgba([255, 0, 0, 255])),
                0,
                0,
                Delay::from_numer_denom_ms(50, 1),
            ),
            ImageFrame::from_parts(
                RgbaImage::from_pixel(4, 3, Rgba([0, 0, 255, 255])),
                0,
                0,
                Delay::from_numer_denom_ms(0, 1),
            ),
        ])
        .unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_gif_keeps_every_frame() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("accretion.gif");
        write_test_gif(&path);

        let mut anim = gif_file(&path).unwrap();

        assert_eq!(anim.path(), path.as_path());
        assert_eq!(anim.size(), (4, 3));
        assert_eq!(anim.frame_count(), 2);
        assert!(anim.is_playing());
        assert_eq!(anim.frame().delay, Duration::from_millis(50));
        anim.advance();
        assert_eq!(anim.frame().delay, DEFAULT_FRAME_DELAY);
    }

    #[test]
    fn test_missing_gif_is_an_open_error() {
        let dir = TempDir::new().unwrap();
        let err = gif_file(&dir.path().join("gone.gif")).unwrap_err();
        assert!(matches!(err, MediaError::Open { .. }));
    }

    #[test]
    fn test_corrupt_gif_is_a_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.gif");
        std::fs::write(&path, b"GIF89a but not really").unwrap();

        let err = gif_file(&path).unwrap_err();
        assert!(matches!(err, MediaError::Decode { .. }));
    }

    #[test]
    fn test_missing_ffmpeg_is_a_transcoder_error() {
        let err = video(
            Path::new("collision.mp4"),
            "/nonexistent/bin/ffmpeg",
            Duration::from_secs(1),
        )
        .unwrap_err();

        assert!(matches!(err, MediaError::Transcoder { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_video_frames_come_from_transcoder_output() {
        let dir = TempDir::new().unwrap();
        let clip = dir.path().join("clip.gif");
        write_test_gif(&clip);
        let ffmpeg = process::fake_tool(
            dir.path(),
            "ffmpeg",
            &format!("cat '{}'", clip.display()),
        );
        let video_path = dir.path().join("collision.mp4");

        let anim = video(&video_path, &ffmpeg.to_string_lossy(), Duration::from_secs(10)).unwrap();

        assert_eq!(anim.path(), video_path.as_path());
        assert_eq!(anim.frame_count(), 2);
        assert_eq!(anim.size(), (4, 3));
    }

    #[cfg(unix)]
    #[test]
    fn test_transcoder_failure_keeps_stderr() {
        let dir = TempDir::new().unwrap();
        let ffmpeg = process::fake_tool(
            dir.path(),
            "ffmpeg",
            "echo 'collision.mp4: Invalid data found when processing input' >&2\nexit 1",
        );

        let err = video(
            &dir.path().join("collision.mp4"),
            &ffmpeg.to_string_lossy(),
            Duration::from_secs(10),
        )
        .unwrap_err();

        match err {
            MediaError::TranscodeFailed { stderr, .. } => {
                assert_eq!(stderr, "collision.mp4: Invalid data found when processing input");
            }
            other => panic!("expected a transcode failure, got {:?}", other),
        }
    }

    #[test]
    fn test_frame_delay() {
        assert_eq!(
            frame_delay(Delay::from_numer_denom_ms(70, 1)),
            Duration::from_millis(70)
        );
        assert_eq!(frame_delay(Delay::from_numer_denom_ms(0, 1)), DEFAULT_FRAME_DELAY);
        assert_eq!(frame_delay(Delay::from_numer_denom_ms(10, 1)), DEFAULT_FRAME_DELAY);
    }
}
