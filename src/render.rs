//! Turns scores into a paint-ready [`DisplayModel`]. Nothing here touches the terminal.

use serde::{Deserialize, Serialize};

use crate::aggregate::Tier;
use crate::score::{Category, ScoreReport};

/// Visual theme for the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    /// Face illustrations and the "kind of Silly" tagline
    #[default]
    Silly,
    /// No illustrations, descriptive tagline
    Plain,
}

impl Theme {
    /// Illustration for a tier, if the theme has one
    pub fn face(self, tier: Tier) -> Option<&'static str> {
        match self {
            Theme::Silly => Some(match tier {
                Tier::Excellent => "images/happy.jpg",
                Tier::Good => "images/content.jpg",
                Tier::Fair => "images/suspicious.jpg",
                Tier::Poor => "images/angry.jpg",
            }),
            Theme::Plain => None,
        }
    }

    pub fn tagline(self, tier: Tier) -> &'static str {
        match (self, tier) {
            (Theme::Silly, Tier::Excellent) => "This product is kind of Silly 😊",
            (Theme::Silly, Tier::Good) => "This product is kind of Silly 😐",
            (Theme::Silly, Tier::Fair) => "This product is kind of Silly 😟",
            (Theme::Silly, Tier::Poor) => "This product is kind of Silly 😱",
            (Theme::Plain, Tier::Excellent) => "Excellent sustainability",
            (Theme::Plain, Tier::Good) => "Good sustainability",
            (Theme::Plain, Tier::Fair) => "Fair sustainability",
            (Theme::Plain, Tier::Poor) => "Poor sustainability",
        }
    }
}

/// Short label and icon for each category
pub fn category_label(category: Category) -> (&'static str, &'static str) {
    match category {
        Category::ShippingEmissions => ("Supply Emissions", "🚚"),
        Category::MaterialSustainability => ("Material Sustainability", "🌿"),
        Category::ProductLifecycle => ("Durability/Lifecycle", "♻️"),
        Category::CompanyPractices => ("Company Sustainability", "🏢"),
    }
}

/// CSS-style class for a tier
pub fn color_class(tier: Tier) -> &'static str {
    match tier {
        Tier::Excellent => "score-excellent",
        Tier::Good => "score-good",
        Tier::Fair => "score-fair",
        Tier::Poor => "score-poor",
    }
}

/// Progress bar color for a tier
pub fn progress_color(tier: Tier) -> &'static str {
    match tier {
        Tier::Excellent => "#10b981",
        Tier::Good => "#a8e063",
        Tier::Fair => "#f59e0b",
        Tier::Poor => "#ef4444",
    }
}

/// Background gradient, in finer bands than the tiers
pub fn background_gradient(overall: u32) -> &'static str {
    match overall {
        90.. => "linear-gradient(135deg, #11998e 0%, #38ef7d 100%)",
        80..=89 => "linear-gradient(135deg, #a8e063 0%, #56ab2f 100%)",
        70..=79 => "linear-gradient(135deg, #FFD700 0%, #F4A460 100%)",
        60..=69 => "linear-gradient(135deg, #f093fb 0%, #f5576c 100%)",
        40..=59 => "linear-gradient(135deg, #fa709a 0%, #fee140 100%)",
        20..=39 => "linear-gradient(135deg, #ff6b6b 0%, #ee5a24 100%)",
        _ => "linear-gradient(135deg, #c0392b 0%, #8e44ad 100%)",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayEntry {
    pub category: Category,
    pub label: &'static str,
    pub icon: &'static str,
    pub score: u8,
    /// Derived from this category's own score, not the overall tier
    pub color_class: &'static str,
    pub color: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayModel {
    pub overall: u32,
    pub tier: Tier,
    pub face: Option<&'static str>,
    pub tagline: &'static str,
    pub background: &'static str,
    pub ring_color: &'static str,
    pub entries: Vec<DisplayEntry>,
}

/// Build the display model for a scored report
pub fn render_with_theme(report: &ScoreReport, overall: u32, tier: Tier, theme: Theme) -> DisplayModel {
    let entries = report
        .iter()
        .map(|(category, score)| {
            let (label, icon) = category_label(category);
            let own_tier = Tier::from_score(u32::from(score.score));
            DisplayEntry {
                category,
                label,
                icon,
                score: score.score,
                color_class: color_class(own_tier),
                color: progress_color(own_tier),
                reason: score.reason.clone(),
            }
        })
        .collect();

    DisplayModel {
        overall,
        tier,
        face: theme.face(tier),
        tagline: theme.tagline(tier),
        background: background_gradient(overall),
        ring_color: progress_color(tier),
        entries,
    }
}

/// [`render_with_theme`] with the default theme
pub fn render(report: &ScoreReport, overall: u32, tier: Tier) -> DisplayModel {
    render_with_theme(report, overall, tier, Theme::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;

    fn sample() -> ScoreReport {
        ScoreReport::default()
            .with(Category::ShippingEmissions, 35, "Long sea freight.")
            .with(Category::ProductLifecycle, 85, "Replaceable head.")
            .with(Category::CompanyPractices, 60, "Some reporting.")
    }

    #[test]
    fn test_entries_follow_present_categories() {
        let report = sample();
        let agg = aggregate(&report).unwrap();
        let model = render(&report, agg.overall, agg.tier);

        let categories: Vec<_> = model.entries.iter().map(|e| e.category).collect();
        assert_eq!(
            categories,
            vec![Category::ShippingEmissions, Category::ProductLifecycle, Category::CompanyPractices]
        );
        assert_eq!(model.entries[0].label, "Supply Emissions");
        assert_eq!(model.entries[0].icon, "🚚");
        assert_eq!(model.entries[1].label, "Durability/Lifecycle");
        assert_eq!(model.entries[0].reason, "Long sea freight.");
    }

    #[test]
    fn test_entry_color_uses_own_score() {
        let report = sample();
        // overall = 60, good
        let model = render(&report, 60, Tier::Good);
        assert_eq!(model.entries[0].color_class, "score-poor");
        assert_eq!(model.entries[0].color, "#ef4444");
        assert_eq!(model.entries[1].color_class, "score-excellent");
        assert_eq!(model.entries[2].color_class, "score-good");
        assert_eq!(model.ring_color, "#a8e063");
    }

    #[test]
    fn test_theme_lookup() {
        let model = render_with_theme(&sample(), 85, Tier::Excellent, Theme::Silly);
        assert_eq!(model.face, Some("images/happy.jpg"));
        assert!(model.tagline.starts_with("This product is kind of Silly"));

        let model = render_with_theme(&sample(), 20, Tier::Poor, Theme::Plain);
        assert_eq!(model.face, None);
        assert_eq!(model.tagline, "Poor sustainability");
    }

    #[test]
    fn test_empty_report_renders_no_entries() {
        let model = render(&ScoreReport::default(), 50, Tier::Fair);
        assert!(model.entries.is_empty());
        assert_eq!(model.face, Some("images/suspicious.jpg"));
    }

    #[test]
    fn test_background_bands() {
        assert_eq!(background_gradient(95), "linear-gradient(135deg, #11998e 0%, #38ef7d 100%)");
        assert_eq!(background_gradient(72), "linear-gradient(135deg, #FFD700 0%, #F4A460 100%)");
        assert_eq!(background_gradient(5), "linear-gradient(135deg, #c0392b 0%, #8e44ad 100%)");
    }
}
