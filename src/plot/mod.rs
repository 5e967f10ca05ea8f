/// Slice plot module
///
/// This module handles:
/// - Delegating slice rendering to the external visualization library (renderer.rs)
/// - Writing the single shared plot output and reading it back (generator.rs)
/// - The fixed colour map used for plots and their legend (colormap.rs)

pub mod colormap;
pub mod generator;
pub mod renderer;
