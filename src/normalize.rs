use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{EcoError, Result};
use crate::product::{Field, ProductRecord, RawFields, SENTINEL};

// Pre-compiled regex for whitespace normalization (compile once, use many times)
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Invalid whitespace regex pattern")
});

// Directional marks Amazon sprinkles through detail bullets
static BIDI_MARKS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{200E}\x{200F}\x{202A}-\x{202E}]").expect("Invalid bidi regex pattern")
});

/// Clean scraped text: drop bidi marks, collapse whitespace, trim
pub fn clean_text(content: &str) -> String {
    let without_marks = BIDI_MARKS_RE.replace_all(content, "");
    WHITESPACE_RE.replace_all(&without_marks, " ").trim().to_string()
}

/// Fill every empty field with its fallback.
///
/// Non-empty values pass through untouched.
pub fn normalize(raw: RawFields) -> ProductRecord {
    let fill = |field: Field| {
        let value = raw.get(field);
        if value.trim().is_empty() {
            field.fallback().to_string()
        } else {
            value.to_string()
        }
    };

    ProductRecord {
        product_title: fill(Field::ProductTitle),
        company_name: fill(Field::CompanyName),
        user_location: fill(Field::UserLocation),
        country_of_origin: fill(Field::CountryOfOrigin),
        product_dimensions: fill(Field::ProductDimensions),
        product_weight: fill(Field::ProductWeight),
        ingredients: fill(Field::Ingredients),
        category: fill(Field::Category),
        price: fill(Field::Price),
    }
}

/// A record can only be scored when it names the product
pub fn validate(record: &ProductRecord) -> Result<()> {
    if record.product_title.trim().is_empty() || record.product_title == SENTINEL {
        return Err(EcoError::Validation("missing required product title".into()));
    }
    Ok(())
}
