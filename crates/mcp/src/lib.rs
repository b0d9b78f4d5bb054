// MCP (Model Context Protocol) server exposing Harvest time tracking tools
// to assistant clients over stdio.

pub mod clock;
pub mod config;
pub mod protocol;
pub mod sanitize;
pub mod server;
pub mod throttle;
pub mod tools;
pub mod validate;

pub use config::{LogFormat, ServerOptions};
pub use server::McpServer;
pub use throttle::WriteThrottle;
