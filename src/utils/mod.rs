pub mod logging;
pub mod report;

pub use logging::truncate_text;
pub use report::render_report;
