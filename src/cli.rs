//! CLI domain: parse, route and output only. Request replay lives in [`replay`].

mod output;
mod parse;
pub mod replay;
mod route;

pub use output::{format_replay_json, format_replay_text, map_error};
pub use parse::{Cli, Commands, LogArgs, ReportFormat};
pub use replay::{ReplayFixture, ReplayOutput};
pub use route::RunContext;
