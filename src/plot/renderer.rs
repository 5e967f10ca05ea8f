//! Slice rendering backends.
//!
//! The actual slicing and rasterization is done by the yt library in a
//! Python subprocess. `SliceRenderer` keeps that call behind a trait so
//! the generator can be exercised without Python installed.

use std::path::Path;
use std::process::Command;
use std::time::Duration;
use tracing::debug;

use super::colormap;
use crate::error::PlotError;
use crate::process;
use crate::state::data::PlotRequest;

/// Lines of stderr kept for the error message
const STDERR_TAIL_LINES: usize = 20;

/// Driver run with `python -c`.
/// Arguments: <snapshot> <field> <axis> <colormap> <output>
const YT_DRIVER: &str = r#"
import sys
import yt

snapshot, field, axis, cmap, output = sys.argv[1:6]
ds = yt.load(snapshot)
slc = yt.SlicePlot(ds, axis, field)
slc.set_cmap(field, cmap)
slc.save(output)
"#;

/// Produces a slice image for a request at the given output path
pub trait SliceRenderer: Send + Sync + 'static {
    /// Render `request` and write the image to `output`.
    /// Blocking; callers run it off the UI thread.
    fn render(&self, request: &PlotRequest, output: &Path) -> Result<(), PlotError>;
}

/// Renders slices by running yt in a Python interpreter
#[derive(Debug, Clone)]
pub struct YtRenderer {
    python: String,
    timeout: Duration,
}

impl YtRenderer {
    pub fn new(python: impl Into<String>, timeout: Duration) -> Self {
        Self {
            python: python.into(),
            timeout,
        }
    }

    /// Positional arguments handed to the driver script
    fn driver_args(request: &PlotRequest, output: &Path) -> Vec<String> {
        vec![
            request.snapshot.to_string_lossy().to_string(),
            request.field.as_str().to_string(),
            request.axis.as_str().to_string(),
            colormap::NAME.to_string(),
            output.to_string_lossy().to_string(),
        ]
    }
}

impl SliceRenderer for YtRenderer {
    fn render(&self, request: &PlotRequest, output: &Path) -> Result<(), PlotError> {
        debug!("Running {} with yt driver for {:?}", self.python, request);

        let mut command = Command::new(&self.python);
        command
            .arg("-c")
            .arg(YT_DRIVER)
            .args(Self::driver_args(request, output));

        let finished = process::run(command, self.timeout)?;

        // yt reports failures as a traceback on stderr; keep only its end
        if !finished.status.success() {
            return Err(PlotError::Library {
                status: finished.status.to_string(),
                stderr: process::tail(&finished.stderr, STDERR_TAIL_LINES),
            });
        }

        Ok(())
    }
}
