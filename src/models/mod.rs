pub mod listing;
pub mod source;
pub mod status;

pub use listing::Listing;
pub use source::Source;
pub use status::{MonitorStatus, PassReport};
