// Library crate: host plumbing that does not need a window, so it can be
// exercised from integration tests. The eframe app and GL paint callback
// stay in the binary crate.

pub mod host;
pub mod input;
pub mod settings;
