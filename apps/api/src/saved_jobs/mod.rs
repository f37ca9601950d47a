// Saved-job tracking (save, list, mark applied, delete) and apply-click views.

pub mod entry;
pub mod handlers;
pub mod store;
