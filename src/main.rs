use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use churnwatch::cli;

#[derive(Debug, Parser)]
#[command(name = "churnwatch")]
#[command(about = "Customer churn prediction client and dashboard")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Submit one prediction request and render the result
    Predict {
        /// Form field as name=value (repeatable)
        #[arg(short, long = "field", value_name = "NAME=VALUE")]
        fields: Vec<String>,
        /// JSON file holding an object of form fields
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output format: terminal (default), html
        #[arg(long, default_value = "terminal")]
        format: String,
        /// Print the final probability without counting up
        #[arg(long)]
        no_animate: bool,
    },
    /// Show model performance charts and headline stats
    Dashboard {
        /// Print final values without counting up
        #[arg(long)]
        no_animate: bool,
    },
    /// Run the local web dashboard
    Serve {
        /// Listen address (default from config: 127.0.0.1:9747)
        #[arg(long)]
        addr: Option<String>,
    },
    /// Summarize logged predictions
    History {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Only include the last N days
        #[arg(long)]
        days: Option<u32>,
    },
    /// Check config, endpoint and log status
    Health,
    /// Show or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default config to ~/.churnwatch/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Predict {
            fields,
            input,
            format,
            no_animate,
        } => {
            let request = cli::build_request(input.as_deref(), &fields)?;
            let fmt = cli::PredictFormat::from_str_opt(Some(&format));
            if !cli::run_predict(request, fmt, !no_animate)? {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Dashboard { no_animate } => cli::run_dashboard(!no_animate),
        Commands::Serve { addr } => cli::run_serve(addr),
        Commands::History { format, days } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_history(fmt, days)
        }
        Commands::Health => cli::run_health(),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
        },
    }
}
