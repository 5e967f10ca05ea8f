//! Sidebar selection state
//!
//! The sidebar works in one of two mutually exclusive modes. Each mode
//! carries its own selection, and the tutor and reflection actions both
//! describe "what the student is looking at" through `Mode::context`.

use super::data::{Axis, Field, MediaItem, Scenario, Snapshot};

/// Context used when nothing valid has been selected yet
pub const NO_CONTEXT: &str = "No valid context available.";

/// Selection made in simulation mode
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationSelection {
    pub scenario: Option<Scenario>,
    pub snapshot: Option<Snapshot>,
    pub field: Field,
    pub axis: Axis,
}

/// Selection made in pre-rendered media mode
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaSelection {
    pub item: Option<MediaItem>,
}

/// Which browsing flow is active
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Simulation(SimulationSelection),
    Media(MediaSelection),
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Simulation(SimulationSelection::default())
    }
}

impl Mode {
    pub fn is_media(&self) -> bool {
        matches!(self, Mode::Media(_))
    }

    /// One-line description of the current selection.
    ///
    /// Falls back to `NO_CONTEXT` when the active mode has no complete
    /// selection (e.g. the data root is empty).
    pub fn context(&self) -> String {
        match self {
            Mode::Simulation(SimulationSelection {
                scenario: Some(scenario),
                snapshot: Some(snapshot),
                field,
                axis,
            }) => format!(
                "Scenario: {}, Snapshot: {}, Field: {}, Axis: {}",
                scenario.name, snapshot.name, field, axis
            ),
            Mode::Media(MediaSelection { item: Some(item) }) => format!("Media: {}", item.name),
            _ => NO_CONTEXT.to_string(),
        }
    }
}

/// Full prompt sent to the tutor for a student question
pub fn tutor_prompt(context: &str, question: &str) -> String {
    format!("{}\nStudent says: {}", context, question)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::MediaKind;
    use std::path::PathBuf;

    fn scenario(name: &str) -> Scenario {
        Scenario {
            name: name.to_string(),
            path: PathBuf::from("simulation_data").join(name),
        }
    }

    fn snapshot(name: &str) -> Snapshot {
        Snapshot {
            name: name.to_string(),
            path: PathBuf::from(name),
        }
    }

    #[test]
    fn test_simulation_context() {
        let mode = Mode::Simulation(SimulationSelection {
            scenario: Some(scenario("run_042")),
            snapshot: Some(snapshot("step_0100.phdf")),
            field: Field::Density,
            axis: Axis::Z,
        });

        assert_eq!(
            mode.context(),
            "Scenario: run_042, Snapshot: step_0100.phdf, Field: density, Axis: z"
        );
    }

    #[test]
    fn test_media_context() {
        let mode = Mode::Media(MediaSelection {
            item: Some(MediaItem {
                name: "collision.mp4".to_string(),
                path: PathBuf::from("pre_rendered_plots/collision.mp4"),
                kind: MediaKind::Mp4,
            }),
        });

        assert_eq!(mode.context(), "Media: collision.mp4");
    }

    #[test]
    fn test_incomplete_selection_uses_sentinel() {
        assert_eq!(Mode::default().context(), NO_CONTEXT);
        assert_eq!(Mode::Media(MediaSelection::default()).context(), NO_CONTEXT);

        // Scenario chosen but it has no snapshots
        let mode = Mode::Simulation(SimulationSelection {
            scenario: Some(scenario("empty_run")),
            ..Default::default()
        });
        assert_eq!(mode.context(), NO_CONTEXT);
    }

    #[test]
    fn test_tutor_prompt_layout() {
        assert_eq!(
            tutor_prompt("Media: disk.png", "Why is the disk brighter on one side?"),
            "Media: disk.png\nStudent says: Why is the disk brighter on one side?"
        );
    }
}
