//! Small shared helpers used by every other crate in the workspace.

pub mod error;
