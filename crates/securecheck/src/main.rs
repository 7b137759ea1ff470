//! `securecheck` - traffic stop analytics in the terminal
//!
//! This binary renders the dashboard views, runs catalog queries and hosts
//! the interactive shell.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::Write;

use anyhow::Context;
use clap::Parser;

use securecheck::cli::{Cli, Command, ConfigCommand};
use securecheck::{init_logging, shell, Config, Session};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::View(view) => {
            let session = Session::open(config, cli.database)?;
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            session.run(view, &mut out)?;
            out.flush()?;
        }
        Command::Shell => {
            let session = Session::open(config, cli.database)?;
            shell::run(&session, &Config::history_path())?;
        }
        Command::Config(config_cmd) => handle_config(&config, config_cmd)?,
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Database]");
                println!("  Path:               {}", config.database_path().display());
                println!("  Busy timeout (ms):  {}", config.database.busy_timeout_ms);
                println!();
                println!("[Cache]");
                println!("  Enabled:            {}", config.cache.enabled);
                println!();
                println!("[Dashboard]");
                println!("  Top vehicles:       {}", config.dashboard.top_vehicles);
                println!("  Top violations:     {}", config.dashboard.top_violations);
                println!();
                println!("[Chart]");
                println!("  Enabled:            {}", config.chart.enabled);
                println!("  Width:              {}", config.chart.width);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
