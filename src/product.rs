use serde::{Deserialize, Serialize};

/// Literal used for any field that could not be discovered on the page
pub const SENTINEL: &str = "N/A";

/// Fallback shipping destination when the page has no delivery location
pub const DEFAULT_LOCATION: &str = "United States";

/// The fields scraped from a product page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    ProductTitle,
    CompanyName,
    UserLocation,
    CountryOfOrigin,
    ProductDimensions,
    ProductWeight,
    Ingredients,
    Category,
    Price,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::ProductTitle,
        Field::CompanyName,
        Field::UserLocation,
        Field::CountryOfOrigin,
        Field::ProductDimensions,
        Field::ProductWeight,
        Field::Ingredients,
        Field::Category,
        Field::Price,
    ];

    /// Wire name, as sent to the relay
    pub fn key(self) -> &'static str {
        match self {
            Field::ProductTitle => "productTitle",
            Field::CompanyName => "companyName",
            Field::UserLocation => "userLocation",
            Field::CountryOfOrigin => "countryOfOrigin",
            Field::ProductDimensions => "productDimensions",
            Field::ProductWeight => "productWeight",
            Field::Ingredients => "ingredients",
            Field::Category => "category",
            Field::Price => "price",
        }
    }

    /// Value used when nothing was extracted
    pub fn fallback(self) -> &'static str {
        match self {
            Field::UserLocation => DEFAULT_LOCATION,
            _ => SENTINEL,
        }
    }
}

/// Extractor output: same shape as [`ProductRecord`], any field may be empty
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFields {
    pub product_title: String,
    pub company_name: String,
    pub user_location: String,
    pub country_of_origin: String,
    pub product_dimensions: String,
    pub product_weight: String,
    pub ingredients: String,
    pub category: String,
    pub price: String,
}

impl RawFields {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::ProductTitle => &self.product_title,
            Field::CompanyName => &self.company_name,
            Field::UserLocation => &self.user_location,
            Field::CountryOfOrigin => &self.country_of_origin,
            Field::ProductDimensions => &self.product_dimensions,
            Field::ProductWeight => &self.product_weight,
            Field::Ingredients => &self.ingredients,
            Field::Category => &self.category,
            Field::Price => &self.price,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::ProductTitle => &mut self.product_title,
            Field::CompanyName => &mut self.company_name,
            Field::UserLocation => &mut self.user_location,
            Field::CountryOfOrigin => &mut self.country_of_origin,
            Field::ProductDimensions => &mut self.product_dimensions,
            Field::ProductWeight => &mut self.product_weight,
            Field::Ingredients => &mut self.ingredients,
            Field::Category => &mut self.category,
            Field::Price => &mut self.price,
        };
        *slot = value;
    }
}

/// Normalized scrape output handed to the relay.
///
/// Every field is always a string; undiscoverable values carry [`SENTINEL`]
/// (or [`DEFAULT_LOCATION`] for the user location).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub product_title: String,
    pub company_name: String,
    pub user_location: String,
    pub country_of_origin: String,
    pub product_dimensions: String,
    pub product_weight: String,
    pub ingredients: String,
    pub category: String,
    pub price: String,
}
