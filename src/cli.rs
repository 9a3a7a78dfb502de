use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::render::Theme;

/// Shell types for completion generation
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

#[derive(Parser)]
#[command(name = "ecoscore")]
#[command(author, version, about = "Sustainability scores for retail product pages", long_about = None)]
#[command(after_help = r#"Examples:
  ecoscore analyze "https://www.amazon.com/dp/B07XYZ"                Score a product page
  ecoscore analyze "https://www.amazon.com/dp/B07XYZ" --html p.html  Use a saved copy of the page
  ecoscore show "https://www.amazon.com/dp/B07XYZ"                   Show the cached result
  ecoscore extract "https://www.amazon.com/dp/B07XYZ"                See what gets sent to the relay
  ecoscore health                                                    Check the relay
"#)]
pub struct Cli {
    /// Log pipeline steps to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape a product page and score its sustainability
    #[command(after_help = r#"Examples:
  ecoscore analyze "https://www.amazon.com/dp/B07XYZ"
  ecoscore analyze "https://www.amazon.com/dp/B07XYZ" --expand shipping --expand material
  ecoscore analyze "https://www.amazon.com/dp/B07XYZ" --expand all --theme plain
  ecoscore analyze "https://www.amazon.com/dp/B07XYZ" --force --json
"#)]
    Analyze {
        /// Product page URL
        url: String,

        /// Read the page from a saved HTML file instead of downloading it
        #[arg(long, value_name = "FILE")]
        html: Option<PathBuf>,

        /// Ignore a cached result for this page
        #[arg(long)]
        force: bool,

        /// Do not read or write the result cache
        #[arg(long)]
        no_cache: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,

        /// Show the justification for a category (shipping, material, lifecycle, company, all)
        #[arg(long, short = 'e', value_name = "CATEGORY")]
        expand: Vec<String>,

        /// Dashboard theme (overrides config)
        #[arg(long, value_enum)]
        theme: Option<Theme>,
    },

    /// Show the cached result for a page without contacting the relay
    Show {
        /// Product page URL (must match the analyzed URL exactly)
        url: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Show the justification for a category (shipping, material, lifecycle, company, all)
        #[arg(long, short = 'e', value_name = "CATEGORY")]
        expand: Vec<String>,
    },

    /// Print the normalized product record for a page (no relay call)
    Extract {
        /// Product page URL
        url: String,

        /// Read the page from a saved HTML file instead of downloading it
        #[arg(long, value_name = "FILE")]
        html: Option<PathBuf>,
    },

    /// Check that the relay is reachable
    Health,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,

    /// Set the relay base URL
    SetRelay {
        /// e.g. http://localhost:3000
        url: String,
    },
}
