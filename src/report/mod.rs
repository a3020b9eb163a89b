//! Rendering of check results and measurement tables

pub mod export;
pub mod text;

pub use export::{measurements_csv, measurements_markdown};
pub use text::{render_check, render_statistics};
