pub mod report;

pub use report::{render, render_summary, render_verbose, OutputFormat, RenderOptions};
