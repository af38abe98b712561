//! CLI definition using clap

use clap::{Parser, Subcommand};

use fleetmap_types::{DayFilter, OutputFormat};

#[derive(Parser)]
#[command(name = "fleetmap")]
#[command(author = "yuuji")]
#[command(version)]
#[command(about = "Live map of refrigerated delivery trucks and their routes")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Fleet API base URL. Overrides config and FLEETMAP_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Follow trucks live, printing the map after every poll
    Watch {
        /// Route day: all, today, 0-6 or a weekday name
        #[arg(long, default_value = "today", allow_hyphen_values = true)]
        day: DayFilter,

        /// Only draw routes matching this text
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Poll interval in milliseconds. Uses config value if not specified.
        #[arg(long)]
        interval: Option<u64>,

        /// Stop after this many polls
        #[arg(long, short = 'n')]
        ticks: Option<u64>,

        /// Do not load routes
        #[arg(long)]
        no_routes: bool,
    },

    /// Show the latest position and sensors of every truck
    Trucks,

    /// List routes for a day
    Routes {
        /// Route day: all, today, 0-6 or a weekday name
        #[arg(long, default_value = "today", allow_hyphen_values = true)]
        day: DayFilter,

        /// Only list routes matching this text
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// Show one route with its stops
    Route {
        /// Route ID
        id: String,

        /// Day to look the route up in
        #[arg(long, default_value = "all", allow_hyphen_values = true)]
        day: DayFilter,
    },

    /// Delete a route
    DeleteRoute {
        /// Route ID
        id: String,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set the fleet API base URL
        #[arg(long)]
        set_url: Option<String>,

        /// Set the truck poll interval in milliseconds
        #[arg(long)]
        set_interval: Option<u64>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_watch() {
        let cli = Cli::try_parse_from([
            "fleetmap", "-f", "json", "watch", "--day", "monday", "--ticks", "2", "-s", "north",
        ])
        .unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
        match cli.command {
            Commands::Watch { day, ticks, search, no_routes, .. } => {
                assert_eq!(day, DayFilter::Day(1));
                assert_eq!(ticks, Some(2));
                assert_eq!(search.as_deref(), Some("north"));
                assert!(!no_routes);
            }
            _ => panic!("expected watch"),
        }
    }

    #[test]
    fn test_parse_day_values() {
        let cli = Cli::try_parse_from(["fleetmap", "routes", "--day", "-1"]).unwrap();
        assert!(matches!(cli.command, Commands::Routes { day: DayFilter::All, .. }));

        let cli = Cli::try_parse_from(["fleetmap", "routes"]).unwrap();
        assert!(matches!(cli.command, Commands::Routes { day: DayFilter::Today, .. }));

        assert!(Cli::try_parse_from(["fleetmap", "routes", "--day", "9"]).is_err());
    }
}
