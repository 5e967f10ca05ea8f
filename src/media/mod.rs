/// Playback of pre-rendered media.
///
/// Still images are drawn straight from disk. Animated GIFs and videos are
/// decoded into a frame sequence that the UI steps through on a timer.
pub mod animation;
pub mod decode;

use std::path::{Path, PathBuf};

use crate::config::MediaConfig;
use crate::error::MediaError;
use crate::state::data::MediaKind;
pub use animation::Animation;

/// How a media item is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    /// Single image drawn as-is
    Still,
    /// Every frame of an animated image, played in a loop
    Animated,
    /// Video decoded to frames, played in a loop
    Video,
}

impl Viewer {
    pub fn for_kind(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Png => Viewer::Still,
            MediaKind::Gif => Viewer::Animated,
            MediaKind::Mp4 => Viewer::Video,
        }
    }

    /// Whether the item needs decoding before it can be shown
    pub fn needs_frames(self) -> bool {
        self != Viewer::Still
    }
}

/// Playback state of the selected media item
#[derive(Debug, Default)]
pub enum Playback {
    /// Nothing selected, or a still image
    #[default]
    Empty,
    /// Frames are being decoded in the background
    Loading(PathBuf),
    Ready(Animation),
    Failed { path: PathBuf, reason: String },
}

impl Playback {
    /// Whether `path` is already playing or being decoded
    pub fn covers(&self, path: &Path) -> bool {
        match self {
            Playback::Loading(loading) => loading == path,
            Playback::Ready(animation) => animation.path() == path,
            Playback::Empty | Playback::Failed { .. } => false,
        }
    }
}

/// Decode `path` into frames for its viewer.
/// Blocking; callers run it off the UI thread.
pub fn load(path: &Path, kind: MediaKind, config: &MediaConfig) -> Result<Animation, MediaError> {
    match Viewer::for_kind(kind) {
        Viewer::Video => decode::video(path, &config.ffmpeg, config.timeout),
        Viewer::Animated | Viewer::Still => decode::gif_file(path),
    }
}
