//! Field extraction from a product page.
//!
//! Each field has an ordered list of [`Strategy`] values. The first strategy that
//! finds an element with non-empty text wins; later strategies are never consulted.
//! A strategy that cannot run (bad selector, no match, unparseable JSON-LD) simply
//! yields nothing.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::normalize::clean_text;
use crate::product::{Field, RawFields};

/// Leading boilerplate around brand bylines ("Visit the Acme Store", "Brand: Acme")
static BYLINE_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(brand:|visit the\b|store:)\s*").expect("Invalid byline prefix regex")
});

static BYLINE_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+store$").expect("Invalid byline suffix regex")
});

/// Text post-processing applied to a strategy's raw element text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Whitespace cleanup only
    Plain,
    /// Strip brand byline boilerplate ("Brand:", "Visit the", "Store")
    StripByline,
    /// Keep the value side of a `Label: value` pair
    AfterDelimiter(char),
}

impl Transform {
    pub fn apply(self, text: &str) -> String {
        let text = clean_text(text);
        match self {
            Transform::Plain => text,
            Transform::StripByline => {
                let stripped = BYLINE_PREFIX_RE.replace(&text, "");
                BYLINE_SUFFIX_RE.replace(&stripped, "").trim().to_string()
            }
            Transform::AfterDelimiter(delim) => text
                .split_once(delim)
                .map(|(_, value)| value.trim().to_string())
                .unwrap_or_default(),
        }
    }
}

/// Values that can be read from a schema.org `Product` JSON-LD block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonLdKey {
    Name,
    Brand,
    Price,
}

/// One way of finding a field's value in the document
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Text of the first element matching `selector`
    Text { selector: String, transform: Transform },
    /// An attribute of the first element matching `selector`
    Attr { selector: String, attr: String },
    /// Table rows: the row whose `label` cell matches `pattern` supplies the `value` cell.
    /// When several rows match, the last one wins.
    LabeledRow {
        rows: String,
        label: String,
        value: String,
        pattern: Regex,
    },
    /// List items whose text matches `pattern`, read as `Label: value`.
    /// When several items match, the last one wins.
    LabeledItem { items: String, pattern: Regex },
    /// A label element matching `pattern` followed by a sibling element holding the value.
    /// When several labels match, the last one wins.
    LabelSibling { labels: String, pattern: Regex },
    /// A value from embedded JSON-LD product data
    JsonLd(JsonLdKey),
}

impl Strategy {
    pub fn text(selector: &str) -> Self {
        Strategy::Text { selector: selector.to_string(), transform: Transform::Plain }
    }

    pub fn byline(selector: &str) -> Self {
        Strategy::Text { selector: selector.to_string(), transform: Transform::StripByline }
    }

    pub fn attr(selector: &str, attr: &str) -> Self {
        Strategy::Attr { selector: selector.to_string(), attr: attr.to_string() }
    }

    pub fn labeled_row(rows: &str, pattern: &str) -> Self {
        Strategy::LabeledRow {
            rows: rows.to_string(),
            label: "th".to_string(),
            value: "td".to_string(),
            pattern: label_pattern(pattern),
        }
    }

    pub fn labeled_item(items: &str, pattern: &str) -> Self {
        Strategy::LabeledItem { items: items.to_string(), pattern: label_pattern(pattern) }
    }

    pub fn label_sibling(labels: &str, pattern: &str) -> Self {
        Strategy::LabelSibling { labels: labels.to_string(), pattern: label_pattern(pattern) }
    }

    /// Short description for logs
    pub fn describe(&self) -> String {
        match self {
            Strategy::Text { selector, .. } => selector.clone(),
            Strategy::Attr { selector, attr } => format!("{}[{}]", selector, attr),
            Strategy::LabeledRow { rows, pattern, .. } => format!("{} ~ /{}/", rows, pattern),
            Strategy::LabeledItem { items, pattern } => format!("{} ~ /{}/", items, pattern),
            Strategy::LabelSibling { labels, pattern } => format!("{} + /{}/", labels, pattern),
            Strategy::JsonLd(key) => format!("json-ld {:?}", key),
        }
    }

    /// Run the strategy. `None` covers both "no match" and "matched but empty".
    pub fn evaluate(&self, document: &Html) -> Option<String> {
        let value = match self {
            Strategy::Text { selector, transform } => {
                let selector = parse_selector(selector)?;
                let el = document.select(&selector).next()?;
                transform.apply(&element_text(el))
            }
            Strategy::Attr { selector, attr } => {
                let selector = parse_selector(selector)?;
                let el = document.select(&selector).next()?;
                clean_text(el.value().attr(attr)?)
            }
            Strategy::LabeledRow { rows, label, value, pattern } => {
                let rows = parse_selector(rows)?;
                let label = parse_selector(label)?;
                let value = parse_selector(value)?;
                document
                    .select(&rows)
                    .filter(|row| {
                        row.select(&label)
                            .next()
                            .is_some_and(|cell| pattern.is_match(&element_text(cell)))
                    })
                    .filter_map(|row| row.select(&value).next())
                    .map(|cell| clean_text(&element_text(cell)))
                    .filter(|text| !text.is_empty())
                    .last()?
            }
            Strategy::LabeledItem { items, pattern } => {
                let items = parse_selector(items)?;
                document
                    .select(&items)
                    .map(element_text)
                    .filter(|text| pattern.is_match(text))
                    .map(|text| Transform::AfterDelimiter(':').apply(&text))
                    .filter(|text| !text.is_empty())
                    .last()?
            }
            Strategy::LabelSibling { labels, pattern } => {
                let labels = parse_selector(labels)?;
                document
                    .select(&labels)
                    .filter(|el| pattern.is_match(&element_text(*el)))
                    .filter_map(|el| el.next_siblings().find_map(ElementRef::wrap))
                    .map(|sibling| clean_text(&element_text(sibling)))
                    .filter(|text| !text.is_empty())
                    .last()?
            }
            Strategy::JsonLd(key) => jsonld_value(document, *key)?,
        };

        (!value.is_empty()).then_some(value)
    }
}

/// Ordered strategy lists, one per field
#[derive(Debug, Clone)]
pub struct FieldStrategies {
    entries: Vec<(Field, Vec<Strategy>)>,
}

impl FieldStrategies {
    pub fn new(entries: Vec<(Field, Vec<Strategy>)>) -> Self {
        Self { entries }
    }

    /// Strategies for Amazon product pages
    pub fn amazon() -> Self {
        const DETAIL_ROWS: &str =
            "#productDetails_detailBullets_sections1 tr, #prodDetails tr, .prodDetTable tr";
        const DETAIL_BULLETS: &str = "#detailBullets_feature_div li";
        const BOLD_LABELS: &str = ".a-text-bold";

        let detail = |pattern: &str| {
            vec![
                Strategy::labeled_row(DETAIL_ROWS, pattern),
                Strategy::labeled_item(DETAIL_BULLETS, pattern),
                Strategy::label_sibling(BOLD_LABELS, pattern),
            ]
        };

        Self::new(vec![
            (
                Field::ProductTitle,
                vec![
                    Strategy::text("#productTitle"),
                    Strategy::text("#title"),
                    Strategy::text(r#"h1[id*="title"]"#),
                    Strategy::text("h1.product-title"),
                    Strategy::text(".product-title"),
                    Strategy::JsonLd(JsonLdKey::Name),
                ],
            ),
            (
                Field::CompanyName,
                vec![
                    Strategy::byline("#bylineInfo"),
                    Strategy::text(".po-brand .po-break-word"),
                    Strategy::byline("a#brand"),
                    Strategy::text("tr.po-brand td.a-span9 span"),
                    Strategy::JsonLd(JsonLdKey::Brand),
                ],
            ),
            (
                Field::UserLocation,
                vec![
                    Strategy::text("#glow-ingress-line2"),
                    Strategy::text("#nav-global-location-data-modal-action"),
                    Strategy::attr("#GLUXZipUpdateInput", "value"),
                ],
            ),
            (Field::CountryOfOrigin, detail("country of origin")),
            (Field::ProductDimensions, detail("product dimensions|package dimensions")),
            (Field::ProductWeight, detail("item weight|package weight")),
            (
                Field::Ingredients,
                vec![
                    Strategy::text("#important-information .a-section.content > p:nth-child(3)"),
                    Strategy::text("#ingredientList"),
                    Strategy::text(".ingredients-list"),
                    Strategy::labeled_row(DETAIL_ROWS, "material"),
                ],
            ),
            (
                Field::Category,
                vec![
                    Strategy::text("#wayfinding-breadcrumbs_feature_div ul li:last-child a"),
                    Strategy::text("#wayfinding-breadcrumbs_container a:last-child"),
                    Strategy::text(".a-breadcrumb li:last-child a"),
                ],
            ),
            (
                Field::Price,
                vec![
                    Strategy::text(".a-price .a-offscreen"),
                    Strategy::text("#priceblock_ourprice"),
                    Strategy::text("#priceblock_dealprice"),
                    Strategy::text(".a-price-whole"),
                    Strategy::JsonLd(JsonLdKey::Price),
                ],
            ),
        ])
    }

    /// Strategies registered for `field`, in evaluation order
    pub fn for_field(&self, field: Field) -> &[Strategy] {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, strategies)| strategies.as_slice())
            .unwrap_or(&[])
    }

    /// Value of one field: the first strategy that yields non-empty text
    pub fn extract_field(&self, document: &Html, field: Field) -> Option<String> {
        for strategy in self.for_field(field) {
            if let Some(value) = strategy.evaluate(document) {
                tracing::debug!(field = field.key(), strategy = %strategy.describe(), "field extracted");
                return Some(value);
            }
        }
        tracing::debug!(field = field.key(), "no strategy matched");
        None
    }

    /// Extract every field. Fields nobody found are left empty.
    pub fn extract(&self, document: &Html) -> RawFields {
        let mut raw = RawFields::default();
        for field in Field::ALL {
            if let Some(value) = self.extract_field(document, field) {
                raw.set(field, value);
            }
        }
        raw
    }
}

impl Default for FieldStrategies {
    fn default() -> Self {
        Self::amazon()
    }
}

/// Extract fields from a parsed document using the default strategies
pub fn extract(document: &Html) -> RawFields {
    FieldStrategies::default().extract(document)
}

/// Parse `html` and extract fields using the default strategies
pub fn extract_html(html: &str) -> RawFields {
    extract(&Html::parse_document(html))
}

fn label_pattern(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){}", pattern)).unwrap_or_else(|_| {
        Regex::new(&format!("(?i){}", regex::escape(pattern))).expect("escaped pattern is valid")
    })
}

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::debug!(selector, error = ?e, "invalid selector skipped");
            None
        }
    }
}

/// Concatenated text content of an element, like the DOM's `textContent`
fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

fn jsonld_value(document: &Html, key: JsonLdKey) -> Option<String> {
    let selector = parse_selector(r#"script[type="application/ld+json"]"#)?;

    document
        .select(&selector)
        .filter_map(|script| serde_json::from_str::<serde_json::Value>(&element_text(script)).ok())
        .flat_map(|json| jsonld_products(&json))
        .find_map(|product| {
            let value = match key {
                JsonLdKey::Name => product.get("name"),
                JsonLdKey::Brand => product
                    .get("brand")
                    .map(|brand| brand.get("name").unwrap_or(brand)),
                JsonLdKey::Price => product.get("offers").and_then(|offers| {
                    offers
                        .get("price")
                        .or_else(|| offers.get(0).and_then(|o| o.get("price")))
                }),
            }?;
            let text = match value {
                serde_json::Value::String(s) => clean_text(s),
                serde_json::Value::Number(n) => n.to_string(),
                _ => return None,
            };
            (!text.is_empty()).then_some(text)
        })
}

/// Collect `Product` objects from a JSON-LD value (handles `@graph` and arrays)
fn jsonld_products(json: &serde_json::Value) -> Vec<serde_json::Value> {
    match json {
        serde_json::Value::Array(items) => items.iter().flat_map(jsonld_products).collect(),
        serde_json::Value::Object(map) => {
            if let Some(graph) = map.get("@graph") {
                return jsonld_products(graph);
            }
            let is_product = match map.get("@type") {
                Some(serde_json::Value::String(t)) => t == "Product",
                Some(serde_json::Value::Array(types)) => {
                    types.iter().any(|t| t.as_str() == Some("Product"))
                }
                _ => false,
            };
            if is_product {
                vec![json.clone()]
            } else {
                Vec::new()
            }
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> Html {
        Html::parse_document(&format!("<html><body>{}</body></html>", body))
    }

    #[test]
    fn test_first_strategy_wins() {
        let html = doc(r#"<span id="productTitle">  Bamboo
            Toothbrush </span><h1 class="product-title">Other</h1>"#);
        let strategies = FieldStrategies::amazon();
        assert_eq!(
            strategies.extract_field(&html, Field::ProductTitle).as_deref(),
            Some("Bamboo Toothbrush")
        );
    }

    #[test]
    fn test_empty_match_falls_through() {
        let html = doc(r#"<span id="productTitle">   </span><h1 class="product-title">Fallback Title</h1>"#);
        assert_eq!(extract(&html).product_title, "Fallback Title");
    }

    #[test]
    fn test_byline_boilerplate_stripped() {
        assert_eq!(Transform::StripByline.apply("Visit the EcoBrush Store"), "EcoBrush");
        assert_eq!(Transform::StripByline.apply("Brand: EcoBrush"), "EcoBrush");
        assert_eq!(Transform::StripByline.apply("store: EcoBrush"), "EcoBrush");
        assert_eq!(Transform::StripByline.apply("EcoBrush"), "EcoBrush");
    }

    #[test]
    fn test_after_delimiter() {
        assert_eq!(Transform::AfterDelimiter(':').apply("Country of Origin: China"), "China");
        assert_eq!(Transform::AfterDelimiter(':').apply("No delimiter"), "");
        assert_eq!(Transform::AfterDelimiter(':').apply("Time: 10:30"), "10:30");
    }

    #[test]
    fn test_labeled_row_last_match_wins() {
        let html = doc(r#"
            <table id="prodDetails">
              <tr><th>Country of Origin</th><td>China</td></tr>
              <tr><th>Brand</th><td>EcoBrush</td></tr>
              <tr><th>country of origin</th><td>Vietnam</td></tr>
            </table>"#);
        let strategy = Strategy::labeled_row("#prodDetails tr", "country of origin");
        assert_eq!(strategy.evaluate(&html).as_deref(), Some("Vietnam"));
    }

    #[test]
    fn test_label_sibling_last_match_wins() {
        let html = doc(r#"
            <div><span class="a-text-bold">Country of origin</span><span>China</span></div>
            <div><span class="a-text-bold">Item weight</span><span>4 ounces</span></div>
            <div><span class="a-text-bold">Country of origin</span><span>Vietnam</span></div>"#);
        let strategy = Strategy::label_sibling(".a-text-bold", "country of origin");
        assert_eq!(strategy.evaluate(&html).as_deref(), Some("Vietnam"));
    }

    #[test]
    fn test_byline_prefix_needs_whole_words() {
        assert_eq!(Transform::StripByline.apply("Visit Theory"), "Visit Theory");
        assert_eq!(Transform::StripByline.apply("Visit the Theory Store"), "Theory");
    }

    #[test]
    fn test_labeled_row_skips_empty_value() {
        let html = doc(r#"
            <table id="prodDetails">
              <tr><th>Item Weight</th><td>20 g</td></tr>
              <tr><th>Package Weight</th><td> </td></tr>
            </table>"#);
        let strategy = Strategy::labeled_row("#prodDetails tr", "item weight|package weight");
        assert_eq!(strategy.evaluate(&html).as_deref(), Some("20 g"));
    }

    #[test]
    fn test_detail_bullets_with_bidi_marks() {
        let html = doc(
            "<div id=\"detailBullets_feature_div\"><ul>\
             <li><span><span class=\"a-text-bold\">Country of Origin \u{200f}:\u{200e}</span> <span>India</span></span></li>\
             </ul></div>",
        );
        assert_eq!(extract(&html).country_of_origin, "India");
    }

    #[test]
    fn test_label_sibling() {
        let html = doc(r#"<div><span class="a-text-bold">Product Dimensions</span><span>7 x 1 x 1 inches</span></div>"#);
        let strategy = Strategy::label_sibling(".a-text-bold", "product dimensions");
        assert_eq!(strategy.evaluate(&html).as_deref(), Some("7 x 1 x 1 inches"));
    }

    #[test]
    fn test_invalid_selector_is_no_value() {
        let html = doc("<p>anything</p>");
        assert_eq!(Strategy::text("p[[[").evaluate(&html), None);
    }

    #[test]
    fn test_missing_field_left_empty() {
        let raw = extract(&doc("<p>nothing useful</p>"));
        assert_eq!(raw, RawFields::default());
    }

    #[test]
    fn test_location_from_input_value() {
        let html = doc(r#"<input id="GLUXZipUpdateInput" value="98109">"#);
        assert_eq!(extract(&html).user_location, "98109");
    }

    #[test]
    fn test_material_row_feeds_ingredients() {
        let html = doc(r#"
            <table id="productDetails_detailBullets_sections1">
              <tr><th>Material</th><td>Bamboo</td></tr>
            </table>"#);
        assert_eq!(extract(&html).ingredients, "Bamboo");
    }

    #[test]
    fn test_ingredient_list_preferred_over_material() {
        let html = doc(r#"
            <div id="ingredientList">Bamboo, castor bean bristles</div>
            <table id="prodDetails"><tr><th>Material</th><td>Bamboo</td></tr></table>"#);
        assert_eq!(extract(&html).ingredients, "Bamboo, castor bean bristles");
    }

    #[test]
    fn test_jsonld_fallback() {
        let html = Html::parse_document(r#"
            <html><head>
            <script type="application/ld+json">
            {"@context": "https://schema.org", "@graph": [
              {"@type": "BreadcrumbList"},
              {"@type": "Product", "name": "Steel Bottle", "brand": {"@type": "Brand", "name": "Klean"},
               "offers": {"@type": "Offer", "price": 24.95}}
            ]}
            </script>
            </head><body></body></html>"#);
        let raw = extract(&html);
        assert_eq!(raw.product_title, "Steel Bottle");
        assert_eq!(raw.company_name, "Klean");
        assert_eq!(raw.price, "24.95");
    }

    #[test]
    fn test_broken_jsonld_ignored() {
        let html = Html::parse_document(r#"
            <html><head><script type="application/ld+json">{not json</script></head>
            <body><span id="productTitle">Real Title</span></body></html>"#);
        assert_eq!(extract(&html).product_title, "Real Title");
    }

    #[test]
    fn test_custom_strategy_table() {
        let strategies = FieldStrategies::new(vec![(Field::Price, vec![Strategy::text(".cost")])]);
        let raw = strategies.extract(&doc(r#"<span class="cost">$3.00</span><span id="productTitle">X</span>"#));
        assert_eq!(raw.price, "$3.00");
        assert_eq!(raw.product_title, "");
    }
}
