//! Report building and rendering.

pub mod generator;
pub mod reporter;

pub use generator::{generate_json_report, generate_markdown_report};
pub use reporter::{run_report, ReportOptions};
