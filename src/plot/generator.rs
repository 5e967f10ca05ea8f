//! Slice plot generation
//!
//! Every plot is written to the same output path; a new request
//! overwrites the previous image. The finished file is read back and
//! decoded once so the UI gets fresh bytes and the pixel size.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task;
use tracing::{error, info};

use super::renderer::SliceRenderer;
use crate::error::PlotError;
use crate::state::data::PlotRequest;

/// A plot that has just been written to disk
#[derive(Debug, Clone)]
pub struct GeneratedPlot {
    pub request: PlotRequest,
    pub path: PathBuf,
    /// Encoded image bytes as read back from `path`
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl GeneratedPlot {
    /// Caption shown under the image (e.g., "density Slice on z-axis")
    pub fn caption(&self) -> String {
        format!("{} Slice on {}-axis", self.request.field, self.request.axis)
    }
}

/// Runs a renderer against the single shared output path
pub struct PlotGenerator<R> {
    renderer: Arc<R>,
    output: PathBuf,
}

// Manual impl: cloning only bumps the Arc, R itself need not be Clone
impl<R> Clone for PlotGenerator<R> {
    fn clone(&self) -> Self {
        Self {
            renderer: Arc::clone(&self.renderer),
            output: self.output.clone(),
        }
    }
}

impl<R: SliceRenderer> PlotGenerator<R> {
    pub fn new(renderer: R, output: impl Into<PathBuf>) -> Self {
        Self {
            renderer: Arc::new(renderer),
            output: output.into(),
        }
    }

    /// Get the path every plot is written to
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Generate a slice plot for `request`.
    ///
    /// Rendering blocks on the external library, so it runs on tokio's
    /// blocking pool.
    pub async fn generate(&self, request: PlotRequest) -> Result<GeneratedPlot, PlotError> {
        let renderer = Arc::clone(&self.renderer);
        let output = self.output.clone();

        info!(
            "Generating {} slice on {}-axis for {}",
            request.field,
            request.axis,
            request.snapshot.display()
        );

        let result = task::spawn_blocking(move || generate_blocking(renderer.as_ref(), request, output))
            .await
            .map_err(|e| PlotError::Join(e.to_string()))?;

        match &result {
            Ok(plot) => info!(
                "Plot written to {} ({}x{})",
                plot.path.display(),
                plot.width,
                plot.height
            ),
            Err(e) => error!("Plot generation failed: {}", e),
        }

        result
    }
}

/// Blocking implementation of plot generation
fn generate_blocking<R: SliceRenderer + ?Sized>(
    renderer: &R,
    request: PlotRequest,
    output: PathBuf,
) -> Result<GeneratedPlot, PlotError> {
    if !request.snapshot.is_file() {
        return Err(PlotError::SnapshotMissing(request.snapshot.clone()));
    }

    // Drop the previous plot so a silent library failure can't leave it on screen
    if output.exists() {
        std::fs::remove_file(&output).map_err(|source| PlotError::ClearOutput {
            path: output.clone(),
            source,
        })?;
    }

    renderer.render(&request, &output)?;

    if !output.is_file() {
        return Err(PlotError::OutputMissing(output));
    }

    let bytes = std::fs::read(&output).map_err(|source| PlotError::ReadOutput {
        path: output.clone(),
        source,
    })?;

    let decoded = image::load_from_memory(&bytes).map_err(|source| PlotError::Decode {
        path: output.clone(),
        source,
    })?;

    Ok(GeneratedPlot {
        request,
        path: output,
        bytes,
        width: decoded.width(),
        height: decoded.height(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::{Axis, Field};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Writes a small PNG whose width encodes the field and height the axis
    struct MockRenderer {
        calls: Mutex<Vec<PlotRequest>>,
    }

    impl MockRenderer {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl SliceRenderer for MockRenderer {
        fn render(&self, request: &PlotRequest, output: &Path) -> Result<(), PlotError> {
            self.calls.lock().unwrap().push(request.clone());

            let width = match request.field {
                Field::Density => 4,
                Field::Temperature => 5,
                Field::VelocityMagnitude => 6,
            };
            let height = match request.axis {
                Axis::X => 1,
                Axis::Y => 2,
                Axis::Z => 3,
            };
            image::RgbImage::new(width, height)
                .save(output)
                .expect("mock renderer should write png");
            Ok(())
        }
    }

    /// Succeeds without writing anything
    struct SilentRenderer;

    impl SliceRenderer for SilentRenderer {
        fn render(&self, _request: &PlotRequest, _output: &Path) -> Result<(), PlotError> {
            Ok(())
        }
    }

    /// Fails like a library crash
    struct FailingRenderer;

    impl SliceRenderer for FailingRenderer {
        fn render(&self, _request: &PlotRequest, _output: &Path) -> Result<(), PlotError> {
            Err(PlotError::Library {
                status: "exit status: 1".to_string(),
                stderr: "YTFieldNotFound: Could not find field 'temperature'".to_string(),
            })
        }
    }

    fn snapshot_in(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("step_0100.phdf");
        std::fs::write(&path, b"fake snapshot").unwrap();
        path
    }

    #[tokio::test]
    async fn test_generate_writes_constant_output() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("output_plot.png");
        let generator = PlotGenerator::new(MockRenderer::new(), &output);

        let plot = generator
            .generate(PlotRequest {
                snapshot: snapshot_in(&dir),
                field: Field::Density,
                axis: Axis::Z,
            })
            .await
            .unwrap();

        assert_eq!(plot.path, output);
        assert!(output.is_file());
        assert_eq!((plot.width, plot.height), (4, 3));
        assert_eq!(plot.caption(), "density Slice on z-axis");
        assert_eq!(plot.bytes, std::fs::read(&output).unwrap());
    }

    #[tokio::test]
    async fn test_second_request_overwrites_first() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("output_plot.png");
        let snapshot = snapshot_in(&dir);
        let generator = PlotGenerator::new(MockRenderer::new(), &output);

        let first = generator
            .generate(PlotRequest {
                snapshot: snapshot.clone(),
                field: Field::Density,
                axis: Axis::Z,
            })
            .await
            .unwrap();
        let second = generator
            .generate(PlotRequest {
                snapshot,
                field: Field::Temperature,
                axis: Axis::X,
            })
            .await
            .unwrap();

        assert_eq!(first.path, second.path);
        assert_ne!(first.bytes, second.bytes);
        assert_eq!(std::fs::read(&output).unwrap(), second.bytes);
        assert_eq!(generator.renderer.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_rejected_before_rendering() {
        let dir = TempDir::new().unwrap();
        let generator = PlotGenerator::new(MockRenderer::new(), dir.path().join("out.png"));

        let err = generator
            .generate(PlotRequest {
                snapshot: dir.path().join("gone.phdf"),
                field: Field::Density,
                axis: Axis::Y,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, PlotError::SnapshotMissing(_)));
        assert!(generator.renderer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_renderer_that_writes_nothing_is_an_error() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("output_plot.png");
        // A stale plot from an earlier run must not be reported as fresh
        std::fs::write(&output, b"stale").unwrap();
        let generator = PlotGenerator::new(SilentRenderer, &output);

        let err = generator
            .generate(PlotRequest {
                snapshot: snapshot_in(&dir),
                field: Field::Density,
                axis: Axis::Z,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, PlotError::OutputMissing(_)));
    }

    #[tokio::test]
    async fn test_library_failure_propagates() {
        let dir = TempDir::new().unwrap();
        let generator = PlotGenerator::new(FailingRenderer, dir.path().join("out.png"));

        let err = generator
            .generate(PlotRequest {
                snapshot: snapshot_in(&dir),
                field: Field::Temperature,
                axis: Axis::Z,
            })
            .await
            .unwrap_err();

        assert!(err.to_string().contains("YTFieldNotFound"));
    }
}
