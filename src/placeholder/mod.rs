pub mod debounce;
pub mod manager;
pub mod size;

pub use debounce::Debouncer;
pub use manager::{HandleOffset, PlaceholderManager, PlaceholderSettings};
pub use size::{MeasuredSize, ReportedSize, SizeProvider, SizeResolver};
