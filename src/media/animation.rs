use iced::widget::image::Handle;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One decoded frame and how long it stays on screen
#[derive(Debug, Clone)]
pub struct Frame {
    pub handle: Handle,
    pub delay: Duration,
}

/// A looping frame sequence decoded from a media file
#[derive(Debug, Clone)]
pub struct Animation {
    path: PathBuf,
    frames: Vec<Frame>,
    size: (u32, u32),
    current: usize,
    paused: bool,
}

impl Animation {
    /// `frames` must not be empty
    pub(super) fn new(path: PathBuf, frames: Vec<Frame>, size: (u32, u32)) -> Self {
        debug_assert!(!frames.is_empty());
        Self {
            path,
            frames,
            size,
            current: 0,
            paused: false,
        }
    }

    /// File the frames were decoded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn index(&self) -> usize {
        self.current
    }

    pub fn frame(&self) -> &Frame {
        &self.frames[self.current]
    }

    /// True while the timer should keep stepping frames
    pub fn is_playing(&self) -> bool {
        !self.paused && self.frames.len() > 1
    }

    pub fn toggle_paused(&mut self) {
        self.paused = !self.paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Step to the next frame, wrapping around at the end
    pub fn advance(&mut self) {
        if self.is_playing() {
            self.current = (self.current + 1) % self.frames.len();
        }
    }
}
