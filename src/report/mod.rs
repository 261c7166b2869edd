//! Expense reports rendered as downloadable PDF documents.

mod endpoint;
mod model;
mod pdf;

pub use endpoint::generate_report_endpoint;
