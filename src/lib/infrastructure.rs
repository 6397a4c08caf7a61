//! Adapters to the outside world: SMTP, environment and filesystem

pub mod email;
pub mod environment;
pub mod filesystem;
