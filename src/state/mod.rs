/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - Directory listings for scenarios, snapshots and media (browser.rs)
/// - The active browsing mode and its selection (selection.rs)
/// - The append-only reflection log (journal.rs)

pub mod browser;
pub mod data;
pub mod journal;
pub mod selection;
