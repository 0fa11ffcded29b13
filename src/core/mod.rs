//! Domain records and the pure due-window matchers.

pub mod deadline;
pub mod slot;
pub mod task;
pub mod types;
pub mod window;
