pub mod github;

pub use github::{GhIssueSurface, IssueInfo, LabelAction, SurfaceError, should_auto_close};
