use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{EcoError, Result};

/// The four sustainability categories the relay scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Shipping Emissions")]
    ShippingEmissions,
    #[serde(rename = "Material Sustainability")]
    MaterialSustainability,
    #[serde(rename = "Product Lifecycle & Durability")]
    ProductLifecycle,
    #[serde(rename = "Company Sustainability Practices")]
    CompanyPractices,
}

impl Category {
    /// Display order
    pub const ALL: [Category; 4] = [
        Category::ShippingEmissions,
        Category::MaterialSustainability,
        Category::ProductLifecycle,
        Category::CompanyPractices,
    ];

    /// Key used in the relay's JSON
    pub fn key(self) -> &'static str {
        match self {
            Category::ShippingEmissions => "Shipping Emissions",
            Category::MaterialSustainability => "Material Sustainability",
            Category::ProductLifecycle => "Product Lifecycle & Durability",
            Category::CompanyPractices => "Company Sustainability Practices",
        }
    }

    /// Look up a category by key, short label, or a loose CLI alias
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Category::ALL.into_iter().find(|c| {
            c.key().to_lowercase() == lower
                || match c {
                    Category::ShippingEmissions => matches!(lower.as_str(), "shipping" | "emissions" | "supply"),
                    Category::MaterialSustainability => matches!(lower.as_str(), "material" | "materials"),
                    Category::ProductLifecycle => matches!(lower.as_str(), "lifecycle" | "durability"),
                    Category::CompanyPractices => matches!(lower.as_str(), "company" | "practices"),
                }
        })
    }
}

/// One category's score and its justification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    /// 1..=100
    #[serde(deserialize_with = "deserialize_score")]
    pub score: u8,
    #[serde(default)]
    pub reason: String,
}

impl CategoryScore {
    pub fn new(score: u8, reason: impl Into<String>) -> Self {
        Self { score: score.clamp(1, 100), reason: reason.into() }
    }
}

/// Accept any JSON number, round half up, clamp into 1..=100
fn deserialize_score<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() {
        return Err(serde::de::Error::custom("score is not a finite number"));
    }
    Ok((raw + 0.5).floor().clamp(1.0, 100.0) as u8)
}

/// Scores keyed by category. Any subset of the four may be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    #[serde(rename = "Shipping Emissions", default, skip_serializing_if = "Option::is_none")]
    pub shipping_emissions: Option<CategoryScore>,
    #[serde(rename = "Material Sustainability", default, skip_serializing_if = "Option::is_none")]
    pub material_sustainability: Option<CategoryScore>,
    #[serde(rename = "Product Lifecycle & Durability", default, skip_serializing_if = "Option::is_none")]
    pub product_lifecycle: Option<CategoryScore>,
    #[serde(rename = "Company Sustainability Practices", default, skip_serializing_if = "Option::is_none")]
    pub company_practices: Option<CategoryScore>,
}

impl ScoreReport {
    /// Parse a relay response body. Unknown keys are ignored; missing keys are fine.
    pub fn from_json(body: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(body).map_err(|e| EcoError::Parse(e.to_string()))?;
        if !value.is_object() {
            return Err(EcoError::Parse("expected a JSON object".into()));
        }
        serde_json::from_value(value).map_err(|e| EcoError::Parse(e.to_string()))
    }

    pub fn get(&self, category: Category) -> Option<&CategoryScore> {
        match category {
            Category::ShippingEmissions => self.shipping_emissions.as_ref(),
            Category::MaterialSustainability => self.material_sustainability.as_ref(),
            Category::ProductLifecycle => self.product_lifecycle.as_ref(),
            Category::CompanyPractices => self.company_practices.as_ref(),
        }
    }

    pub fn insert(&mut self, category: Category, score: CategoryScore) {
        let slot = match category {
            Category::ShippingEmissions => &mut self.shipping_emissions,
            Category::MaterialSustainability => &mut self.material_sustainability,
            Category::ProductLifecycle => &mut self.product_lifecycle,
            Category::CompanyPractices => &mut self.company_practices,
        };
        *slot = Some(score);
    }

    pub fn with(mut self, category: Category, score: u8, reason: &str) -> Self {
        self.insert(category, CategoryScore::new(score, reason));
        self
    }

    /// Present categories in display order
    pub fn iter(&self) -> impl Iterator<Item = (Category, &CategoryScore)> + '_ {
        Category::ALL
            .into_iter()
            .filter_map(move |c| self.get(c).map(|s| (c, s)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_report() {
        let body = r#"{
            "Shipping Emissions": {"score": 45, "reason": "Shipped from China by sea."},
            "Material Sustainability": {"score": 80, "reason": "Bamboo handle."},
            "Product Lifecycle & Durability": {"score": 60, "reason": "Lasts three months."},
            "Company Sustainability Practices": {"score": 70, "reason": "B-Corp certified."}
        }"#;
        let report = ScoreReport::from_json(body).unwrap();
        assert_eq!(report.len(), 4);
        assert_eq!(report.get(Category::MaterialSustainability).unwrap().score, 80);
        assert_eq!(report.get(Category::CompanyPractices).unwrap().reason, "B-Corp certified.");
    }

    #[test]
    fn test_partial_report_and_unknown_keys() {
        let body = r#"{
            "Shipping Emissions": {"score": 30, "reason": "Air freight."},
            "Overall": {"score": 99, "reason": "ignored"},
            "model": "gpt"
        }"#;
        let report = ScoreReport::from_json(body).unwrap();
        assert_eq!(report.len(), 1);
        assert!(report.get(Category::ProductLifecycle).is_none());
    }

    #[test]
    fn test_empty_object_is_valid() {
        let report = ScoreReport::from_json("{}").unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_score_leniency() {
        let body = r#"{
            "Shipping Emissions": {"score": 72.5, "reason": "x"},
            "Material Sustainability": {"score": 0, "reason": "x"},
            "Product Lifecycle & Durability": {"score": 140},
            "Company Sustainability Practices": {"score": 64.4, "reason": "x"}
        }"#;
        let report = ScoreReport::from_json(body).unwrap();
        assert_eq!(report.get(Category::ShippingEmissions).unwrap().score, 73);
        assert_eq!(report.get(Category::MaterialSustainability).unwrap().score, 1);
        assert_eq!(report.get(Category::ProductLifecycle).unwrap().score, 100);
        assert_eq!(report.get(Category::ProductLifecycle).unwrap().reason, "");
        assert_eq!(report.get(Category::CompanyPractices).unwrap().score, 64);
    }

    #[test]
    fn test_malformed_bodies() {
        for body in ["not json", "[1, 2]", "\"text\"", r#"{"Shipping Emissions": {"score": "high"}}"#] {
            assert!(
                matches!(ScoreReport::from_json(body), Err(EcoError::Parse(_))),
                "expected parse error for {}",
                body
            );
        }
    }

    #[test]
    fn test_serialization_skips_missing() {
        let report = ScoreReport::default().with(Category::ProductLifecycle, 55, "ok");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 1);
        assert_eq!(json["Product Lifecycle & Durability"]["score"], 55);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(Category::parse("shipping"), Some(Category::ShippingEmissions));
        assert_eq!(Category::parse("Product Lifecycle & Durability"), Some(Category::ProductLifecycle));
        assert_eq!(Category::parse("COMPANY"), Some(Category::CompanyPractices));
        assert_eq!(Category::parse("weather"), None);
    }
}
