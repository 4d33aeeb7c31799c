//! Small HTTP surface next to the bot: a banner, a liveness probe and the
//! dashboard as JSON.

pub use server::{ServerState, run, run_with_listener};

mod dashboard;
mod server;
