use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pgnav")]
#[command(about = "A TUI for browsing database catalogs and JSON values as navigable trees")]
pub struct Cli {
    /// Config file (defaults to $PGNAV_CONFIG, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Debug logging to stderr for headless commands
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the interactive TUI (default)
    Run {
        /// Catalog snapshot (JSON) to browse
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// JSON document to open in the inspector
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Apply a command script headlessly and print the rendered screen
    Screenshot {
        /// Catalog snapshot (JSON) to browse
        #[arg(long)]
        catalog: PathBuf,
        /// JSON document to open in the inspector
        #[arg(long)]
        json: Option<PathBuf>,
        /// Comma-separated commands (e.g. "expand,down,/,search:p,confirm")
        #[arg(short, long, default_value = "")]
        script: String,
        /// Output file for the screenshot (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Terminal width for rendering
        #[arg(long, default_value = "120")]
        width: u16,
        /// Terminal height for rendering
        #[arg(long, default_value = "40")]
        height: u16,
    },
    /// Print the objects a search query matches, one per line
    Filter {
        /// Catalog snapshot (JSON) to search
        #[arg(long)]
        catalog: PathBuf,
        /// Query, e.g. "t:plan" or "!f:get"
        query: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_screenshot() {
        let cli = Cli::try_parse_from([
            "pgnav",
            "-v",
            "screenshot",
            "--catalog",
            "cat.json",
            "-s",
            "expand,down",
            "--width",
            "80",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Some(Commands::Screenshot {
                catalog,
                script,
                width,
                height,
                ..
            }) => {
                assert_eq!(catalog, PathBuf::from("cat.json"));
                assert_eq!(script, "expand,down");
                assert_eq!((width, height), (80, 40));
            }
            _ => panic!("expected screenshot"),
        }
    }

    #[test]
    fn test_no_subcommand_means_run() {
        let cli = Cli::try_parse_from(["pgnav"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_filter_query_may_start_with_bang() {
        let cli = Cli::try_parse_from(["pgnav", "filter", "--catalog", "c.json", "!t:plan"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Filter { ref query, .. }) if query == "!t:plan"));
    }
}
