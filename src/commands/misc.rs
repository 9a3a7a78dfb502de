//! Miscellaneous commands: health, config, completions

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use colored::Colorize;
use std::io;

use ecoscore::cli::{Cli, CompletionShell};
use ecoscore::client::RelayClient;
use ecoscore::config::Config;
use ecoscore::error::Result;

/// Check that the relay answers its liveness probe
pub fn cmd_health() -> Result<()> {
    let config = Config::load()?;
    let client = RelayClient::from_config(&config);

    let health = client.health()?;
    let status = if health.status == "ok" {
        health.status.green()
    } else {
        health.status.yellow()
    };
    println!("\nRelay {} is {}", client.base_url(), status);
    if let Some(message) = health.message {
        println!("  {}", message.dimmed());
    }
    Ok(())
}

/// Print the effective configuration
pub fn cmd_config_show() -> Result<()> {
    let config = Config::load()?;

    println!("\nConfiguration\n");
    println!("  Relay:     {}", config.relay_url);
    println!("  Timeout:   {}s", config.timeout_secs);
    println!("  Theme:     {:?}", config.theme);
    println!("  Retailers: {}", config.supported_hosts.join(", "));

    if let Ok(path) = Config::config_path() {
        println!("\n  Config file: {}", path.display());
    }
    if let Ok(path) = Config::db_path() {
        println!("  Result cache: {}", path.display());
    }
    if std::env::var("ECOSCORE_RELAY_URL").is_ok() {
        println!("\n  {}", "Relay overridden by ECOSCORE_RELAY_URL".yellow());
    }
    Ok(())
}

/// Point ecoscore at a different relay
pub fn cmd_config_set_relay(url: &str) -> Result<()> {
    let path = Config::config_path()?;
    let mut config = Config::load_from(&path)?;
    config.relay_url = url.trim_end_matches('/').to_string();
    config.validate()?;
    config.save_to(&path)?;

    println!("Relay set to {}", config.relay_url.green());
    println!("Run `ecoscore health` to check it.");
    Ok(())
}

/// Generate shell completions
pub fn cmd_completions(shell: CompletionShell) -> Result<()> {
    let mut cmd = Cli::command();
    let shell = match shell {
        CompletionShell::Bash => Shell::Bash,
        CompletionShell::Zsh => Shell::Zsh,
        CompletionShell::Fish => Shell::Fish,
        CompletionShell::Powershell => Shell::PowerShell,
    };
    generate(shell, &mut cmd, "ecoscore", &mut io::stdout());
    Ok(())
}
