//! Operator-facing output.
//!
//! The tool runs unattended in CI, so there are no prompts; this module only
//! formats status lines.

pub mod formatter;

pub use formatter::{
    display_error, display_result, display_selection, display_status, display_success,
};
