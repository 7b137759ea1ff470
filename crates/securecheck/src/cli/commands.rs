//! CLI command definitions.
//!
//! [`ViewCommand`] is shared by the one-shot command line and the
//! interactive shell, so both accept the same syntax.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::lookup::FormInput;

/// Commands that render a view.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum ViewCommand {
    /// Show headline metrics and the violation breakdown
    Dashboard,

    /// Show metrics and violation shares for one country
    Traffic {
        /// Country to show ("All" for every country)
        #[arg(long)]
        country: Option<String>,

        /// List the available countries and exit
        #[arg(short, long)]
        list_countries: bool,
    },

    /// Run a catalog query
    Query {
        /// Query number or exact name
        #[arg(required_unless_present = "list")]
        selector: Option<String>,

        /// List the catalog
        #[arg(short, long)]
        list: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Look up a vehicle and summarize the stop
    Predict(FormArgs),

    /// Load stop records from a CSV file
    Import {
        /// CSV file to read
        file: PathBuf,

        /// Delete existing records first
        #[arg(long)]
        replace: bool,
    },

    /// Show version and database information
    About,
}

/// Stop details for a prediction.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct FormArgs {
    /// Full or partial vehicle number to look up
    #[arg(long, default_value = "")]
    pub vehicle_number: String,

    /// Stop date
    #[arg(long, default_value = "")]
    pub stop_date: String,

    /// Stop time
    #[arg(long, default_value = "")]
    pub stop_time: String,

    /// Country name
    #[arg(long, default_value = "")]
    pub country_name: String,

    /// Driver gender
    #[arg(long, default_value = "")]
    pub driver_gender: String,

    /// Driver age (16-100), defaulting to the minimum
    #[arg(long, default_value_t = 16, allow_negative_numbers = true)]
    pub driver_age: i64,

    /// Driver race
    #[arg(long, default_value = "")]
    pub driver_race: String,

    /// Whether the driver was arrested (yes/no)
    #[arg(long, default_value = "no")]
    pub is_arrested: String,

    /// Whether a search was conducted (yes/no)
    #[arg(long, default_value = "no")]
    pub search_conducted: String,

    /// Kind of search
    #[arg(long, default_value = "")]
    pub search_type: String,

    /// Stop duration
    #[arg(long, default_value = "")]
    pub stop_duration: String,

    /// Whether the stop was drug related (yes/no)
    #[arg(long, default_value = "no")]
    pub drugs_related_stop: String,

    /// Violation
    #[arg(long, default_value = "")]
    pub violation: String,

    /// Stop outcome
    #[arg(long, default_value = "")]
    pub stop_outcome: String,
}

impl From<FormArgs> for FormInput {
    fn from(args: FormArgs) -> Self {
        Self {
            stop_date: args.stop_date,
            stop_time: args.stop_time,
            country_name: args.country_name,
            driver_gender: args.driver_gender,
            driver_age: args.driver_age,
            driver_race: args.driver_race,
            is_arrested: args.is_arrested,
            search_conducted: args.search_conducted,
            search_type: args.search_type,
            stop_duration: args.stop_duration,
            drugs_related_stop: args.drugs_related_stop,
            violation: args.violation,
            stop_outcome: args.stop_outcome,
            vehicle_number: args.vehicle_number,
        }
    }
}

/// Configuration commands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for query results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pipe-separated columns
    Plain,
    /// Bordered table
    #[default]
    Table,
    /// JSON document
    Json,
}
