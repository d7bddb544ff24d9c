mod service;

pub use service::{ControlService, PublishError};
