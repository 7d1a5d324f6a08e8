// ABOUTME: Validated domain newtypes shared across the crate.

mod service_name;

pub use service_name::{ServiceName, ServiceNameError};
