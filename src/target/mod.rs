// ABOUTME: Connection target resolution: input parsing, ssh config layering and rendering
// ABOUTME: Exposes ConnectionTarget as the single entry point for callers

pub mod descriptor;
pub mod identity;
pub mod input;
pub mod precedence;
mod resolver;
pub mod ssh_config;

pub use descriptor::ConnectionTarget;
pub use input::{HostLiteral, ParsedInput, parse_input, parse_port};
pub use precedence::{Resolved, Source};
