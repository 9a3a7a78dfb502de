//! Terminal painting of a [`DisplayModel`].

use std::collections::HashSet;

use colored::{ColoredString, Colorize};

use crate::aggregate::Tier;
use crate::render::DisplayModel;
use crate::score::Category;

const BAR_WIDTH: usize = 20;

/// Which category entries show their justification. View-local; not part of the model.
#[derive(Debug, Clone, Default)]
pub struct ExpandState {
    expanded: HashSet<Category>,
}

impl ExpandState {
    pub fn all() -> Self {
        Self { expanded: Category::ALL.into_iter().collect() }
    }

    /// Flip one entry; returns whether it is now expanded
    pub fn toggle(&mut self, category: Category) -> bool {
        if !self.expanded.remove(&category) {
            self.expanded.insert(category);
            return true;
        }
        false
    }

    pub fn is_expanded(&self, category: Category) -> bool {
        self.expanded.contains(&category)
    }
}

fn tinted(text: &str, tier: Tier) -> ColoredString {
    match tier {
        Tier::Excellent => text.green(),
        Tier::Good => text.bright_green(),
        Tier::Fair => text.yellow(),
        Tier::Poor => text.red(),
    }
}

fn bar(score: u32) -> String {
    let filled = (score.min(100) as usize * BAR_WIDTH + 50) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// Render the dashboard as terminal text
pub fn paint(model: &DisplayModel, expand: &ExpandState) -> String {
    let mut out = String::new();

    out.push('\n');
    if let Some(face) = model.face {
        out.push_str(&format!("  {}\n", face.dimmed()));
    }
    out.push_str(&format!(
        "  {} {}  {}\n",
        tinted(&bar(model.overall), model.tier),
        tinted(&format!("{}%", model.overall), model.tier).bold(),
        model.tier.as_str().to_uppercase()
    ));
    out.push_str(&format!("  {}\n\n", model.tagline));

    for entry in &model.entries {
        let tier = Tier::from_score(u32::from(entry.score));
        let marker = if expand.is_expanded(entry.category) { "▾" } else { "▸" };
        out.push_str(&format!(
            "  {} {} {:<26} {} {:>3}%\n",
            marker,
            entry.icon,
            entry.label,
            tinted(&bar(u32::from(entry.score)), tier),
            entry.score
        ));
        if expand.is_expanded(entry.category) && !entry.reason.is_empty() {
            out.push_str(&format!("      {}\n", entry.reason.dimmed()));
        }
    }

    out
}
