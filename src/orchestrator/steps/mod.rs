//! Pipeline step implementations.

mod analyze;
mod composite;
mod extract;
mod fetch;

pub use analyze::AnalyzeStep;
pub use composite::CompositeStep;
pub use extract::ExtractStep;
pub use fetch::FetchStep;
