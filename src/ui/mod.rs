/// UI building blocks used by the main view
///
/// - media.rs: inline viewer for pre-rendered images and videos
/// - colorbar.rs: canvas legend for the slice plot colour map

pub mod colorbar;
pub mod media;
