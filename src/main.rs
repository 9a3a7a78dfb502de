//! ecoscore - sustainability scores for retail product pages

use clap::Parser;

use ecoscore::cli::{Cli, Commands, ConfigCommands};
use ecoscore::error::Result;

mod commands;
mod utils;

fn main() {
    let cli = Cli::parse();
    ecoscore::logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        tracing::debug!(error = %e, "command failed");
        eprintln!("Error: {}", e.user_message());
        if let Some(hint) = e.hint() {
            eprintln!("\n{}", hint);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze {
            url,
            html,
            force,
            no_cache,
            json,
            expand,
            theme,
        } => commands::cmd_analyze(&url, html, force, no_cache, json, expand, theme),
        Commands::Show { url, json, expand } => commands::cmd_show(&url, json, expand),
        Commands::Extract { url, html } => commands::cmd_extract(&url, html),
        Commands::Health => commands::cmd_health(),
        Commands::Config(ConfigCommands::Show) => commands::cmd_config_show(),
        Commands::Config(ConfigCommands::SetRelay { url }) => commands::cmd_config_set_relay(&url),
        Commands::Completions { shell } => commands::cmd_completions(shell),
    }
}
