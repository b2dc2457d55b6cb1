// ABOUTME: Library root for resolving user-entered SSH targets against ssh client config files
// ABOUTME: Callers hand in a connection string and read back host, user, port and key candidates

pub mod config;
pub mod env;
pub mod error;
pub mod target;

pub use env::{Environment, FixedEnvironment, SystemEnvironment};
pub use error::{PortOrigin, TargetError};
pub use target::ConnectionTarget;
