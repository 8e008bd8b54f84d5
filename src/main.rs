//! Liftoff CLI entry point
//!
//! This is the main executable for the Liftoff launcher. It handles
//! command-line argument parsing, error display, and command execution.
//!
//! The CLI supports the launcher's lifecycle commands:
//! - `run` - Update every component, then launch the application
//! - `update` - Download pending updates without launching
//! - `launch` - Launch immediately, skipping the update check
//! - `check` - Report installed vs. latest versions without downloading

use anyhow::Result;
use clap::Parser;
use liftoff_cli::cli;
use liftoff_cli::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    // Execute the command
    match cli.execute().await {
        Ok(_) => Ok(()),
        Err(e) => {
            // Convert to user-friendly error with context and suggestions
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
