//! LayoutKit Application
//!
//! Headless shell around the core session: configuration loading, the
//! command-line interface and the batch commands it dispatches to.

mod app;
mod cli;

pub use app::{App, AppConfig, AppError, AppResult};
pub use cli::{Cli, Command, run};
