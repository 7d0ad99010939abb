// Library interface for chatrouter-cli so integration tests can reach the
// command and demo modules. main.rs declares the same files.

#[path = "commands.rs"]
pub mod commands;

#[path = "demo.rs"]
pub mod demo;

pub use commands::{build_router, run, Command, RouteArgs};
