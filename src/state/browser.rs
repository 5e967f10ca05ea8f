//! Storage browser: lists scenarios, snapshots and media on disk.
//!
//! Every listing is shallow (immediate children only) and sorted by name.
//! A missing or unreadable directory lists as empty; the caller decides
//! what to tell the user.

use std::path::Path;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use super::data::{MediaItem, MediaKind, Scenario, Snapshot, SNAPSHOT_EXTENSION};

/// Immediate children of `root`, sorted by file name, unreadable entries skipped
fn children(root: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                None
            }
        })
}

fn entry_name(entry: &DirEntry) -> String {
    entry.file_name().to_string_lossy().to_string()
}

/// List scenario directories directly under the data root
pub fn list_scenarios(root: &Path) -> Vec<Scenario> {
    let scenarios: Vec<Scenario> = children(root)
        .filter(|e| e.file_type().is_dir())
        .map(|e| Scenario {
            name: entry_name(&e),
            path: e.into_path(),
        })
        .collect();

    debug!("Found {} scenarios in {}", scenarios.len(), root.display());
    scenarios
}

/// List snapshot files inside a scenario directory
pub fn list_snapshots(scenario_dir: &Path) -> Vec<Snapshot> {
    let snapshots: Vec<Snapshot> = children(scenario_dir)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(SNAPSHOT_EXTENSION))
                .unwrap_or(false)
        })
        .map(|e| Snapshot {
            name: entry_name(&e),
            path: e.into_path(),
        })
        .collect();

    debug!("Found {} snapshots in {}", snapshots.len(), scenario_dir.display());
    snapshots
}

/// List pre-rendered media files (png, gif, mp4) directly under the media root
pub fn list_media(root: &Path) -> Vec<MediaItem> {
    let media: Vec<MediaItem> = children(root)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let kind = MediaKind::from_path(e.path())?;
            Some(MediaItem {
                name: entry_name(&e),
                path: e.into_path(),
                kind,
            })
        })
        .collect();

    debug!("Found {} media files in {}", media.len(), root.display());
    media
}
