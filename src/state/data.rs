//! Shared data structures for the application state
//!
//! These types describe what the storage browser finds on disk and
//! what the user can pick in the sidebar. They flow between the
//! browser, the plot generator and the UI layer.

use std::fmt;
use std::path::{Path, PathBuf};

/// Extension of simulation snapshot files (Parthenon HDF5 output)
pub const SNAPSHOT_EXTENSION: &str = "phdf";

/// A named directory under the data root grouping related snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Directory name (e.g., "run_042")
    pub name: String,
    /// Full path to the scenario directory
    pub path: PathBuf,
}

/// One simulation output file inside a scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Filename only (e.g., "step_0100.phdf")
    pub name: String,
    /// Full path to the snapshot file
    pub path: PathBuf,
}

/// Kind of pre-rendered media, decided by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Png,
    Gif,
    Mp4,
}

impl MediaKind {
    /// Recognize a media kind from a path's extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "png" => Some(MediaKind::Png),
            "gif" => Some(MediaKind::Gif),
            "mp4" => Some(MediaKind::Mp4),
            _ => None,
        }
    }
}

/// A pre-rendered image or video under the media root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    /// Filename only (e.g., "collision.mp4")
    pub name: String,
    /// Full path to the media file
    pub path: PathBuf,
    pub kind: MediaKind,
}

/// Physical quantity that can be sliced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field {
    #[default]
    Density,
    Temperature,
    VelocityMagnitude,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Density, Field::Temperature, Field::VelocityMagnitude];

    /// Field name as understood by the visualization library
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Density => "density",
            Field::Temperature => "temperature",
            Field::VelocityMagnitude => "velocity_magnitude",
        }
    }
}

/// Slice axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    #[default]
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn as_str(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

// pick_list and radio labels use Display

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for MediaItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single slice plot request. Lives only for one generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRequest {
    pub snapshot: PathBuf,
    pub field: Field,
    pub axis: Axis,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_is_case_insensitive() {
        assert_eq!(MediaKind::from_path(Path::new("a/b/jet.PNG")), Some(MediaKind::Png));
        assert_eq!(MediaKind::from_path(Path::new("orbit.gif")), Some(MediaKind::Gif));
        assert_eq!(MediaKind::from_path(Path::new("collision.Mp4")), Some(MediaKind::Mp4));
        assert_eq!(MediaKind::from_path(Path::new("notes.txt")), None);
        assert_eq!(MediaKind::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_field_and_axis_names() {
        let fields: Vec<_> = Field::ALL.iter().map(|f| f.to_string()).collect();
        assert_eq!(fields, vec!["density", "temperature", "velocity_magnitude"]);

        let axes: Vec<_> = Axis::ALL.iter().map(|a| a.to_string()).collect();
        assert_eq!(axes, vec!["x", "y", "z"]);
    }
}
