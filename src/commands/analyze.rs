//! Analysis commands: analyze, show, extract

use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;

use ecoscore::cache::{ResultCache, SqliteStore};
use ecoscore::client::RelayClient;
use ecoscore::config::Config;
use ecoscore::error::{EcoError, Result};
use ecoscore::normalize::{normalize, validate};
use ecoscore::page::{fetch_html, HtmlTab, HttpTab, Tab};
use ecoscore::pipeline::{Analysis, Analyzer};
use ecoscore::render::Theme;
use ecoscore::score::Category;
use ecoscore::view::{self, ExpandState};

use crate::utils::format_age;

/// Scrape a product page and score it
pub fn cmd_analyze(
    url: &str,
    html: Option<PathBuf>,
    force: bool,
    no_cache: bool,
    json: bool,
    expand: Vec<String>,
    theme: Option<Theme>,
) -> Result<()> {
    let config = Config::load()?;
    let expand = parse_expand(&expand)?;
    let cache = if no_cache { ResultCache::in_memory() } else { open_cache() };

    let analyzer = Analyzer::new(Arc::new(RelayClient::from_config(&config)), cache, &config)
        .with_theme(theme.unwrap_or(config.theme));

    let tab = download_tab(url, html, &config)?;

    // Installed after the download, so Ctrl+C during the fetch still exits at once.
    // From here it abandons the relay call; its result is neither cached nor shown.
    let token = analyzer.cancel_token();
    ctrlc::set_handler(move || token.cancel())
        .map_err(|e| EcoError::ConfigError(format!("Failed to set Ctrl+C handler: {}", e)))?;

    if !json {
        println!("\n{}", "Analyzing sustainability...".dimmed());
    }

    let analysis = analyzer.analyze(tab.as_ref(), force)?;
    print_analysis(&analysis, &expand, json)
}

/// Show the cached result for a page
pub fn cmd_show(url: &str, json: bool, expand: Vec<String>) -> Result<()> {
    let config = Config::load()?;
    let expand = parse_expand(&expand)?;
    let analyzer = Analyzer::new(Arc::new(RelayClient::from_config(&config)), open_cache(), &config);

    match analyzer.open(url) {
        Some(analysis) => print_analysis(&analysis, &expand, json),
        None => {
            println!("\nNo cached result for this page.");
            println!("Run `ecoscore analyze \"{}\"` to score it.", url);
            Ok(())
        }
    }
}

/// Print the record that would be sent to the relay
pub fn cmd_extract(url: &str, html: Option<PathBuf>) -> Result<()> {
    let tab = open_tab(url, html)?;
    let record = normalize(tab.run_extraction()?);
    println!("{}", serde_json::to_string_pretty(&record)?);
    validate(&record)
}

fn open_tab(url: &str, html: Option<PathBuf>) -> Result<Box<dyn Tab>> {
    Ok(match html {
        Some(path) => Box::new(HtmlTab::from_file(url, &path)?),
        None => Box::new(HttpTab::new(url)),
    })
}

/// Like [`open_tab`], but a supported live page is downloaded now rather than during analysis
fn download_tab(url: &str, html: Option<PathBuf>, config: &Config) -> Result<Box<dyn Tab>> {
    if html.is_none() && config.is_supported(url) {
        return Ok(Box::new(HtmlTab::new(url, fetch_html(url)?)));
    }
    open_tab(url, html)
}

/// The persistent cache, or an in-memory one if the database cannot be opened
fn open_cache() -> ResultCache {
    match SqliteStore::open() {
        Ok(store) => ResultCache::new(store),
        Err(e) => {
            tracing::warn!(error = %e, "result cache unavailable, continuing without it");
            ResultCache::in_memory()
        }
    }
}

fn parse_expand(values: &[String]) -> Result<ExpandState> {
    let mut state = ExpandState::default();
    for value in values {
        if value.eq_ignore_ascii_case("all") {
            return Ok(ExpandState::all());
        }
        let category = Category::parse(value).ok_or_else(|| {
            EcoError::ConfigError(format!(
                "Unknown category '{}'. Use shipping, material, lifecycle, company or all",
                value
            ))
        })?;
        if !state.is_expanded(category) {
            state.toggle(category);
        }
    }
    Ok(state)
}

fn print_analysis(analysis: &Analysis, expand: &ExpandState, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(analysis)?);
        return Ok(());
    }

    if let Some(ref record) = analysis.record {
        println!("\n{}", record.product_title.bold());
        if record.company_name != ecoscore::product::SENTINEL {
            println!("{}", format!("by {}", record.company_name).dimmed());
        }
    } else {
        println!("\n{}", analysis.page_url.bold());
    }

    if let Some(stored_at) = analysis.cached_at {
        println!(
            "{}",
            format!("(cached {}, use --force to re-analyze)", format_age(stored_at)).dimmed()
        );
    }

    print!("{}", view::paint(&analysis.display, expand));
    Ok(())
}
