use thiserror::Error;

/// What the user sees for any failure that reached the top of an analysis.
pub const MSG_OPEN_PRODUCT_PAGE: &str = "Please open an Amazon product page";
pub const MSG_NO_PRODUCT_DATA: &str = "Could not read product data from this page";
pub const MSG_ANALYSIS_FAILED: &str = "Failed to analyze sustainability for this product";
pub const MSG_NO_DATA: &str = "No sustainability data available for this product";
pub const MSG_BUSY: &str = "An analysis is already running";
pub const MSG_CANCELLED: &str = "Analysis cancelled";
pub const MSG_INTERNAL: &str = "Something went wrong, please try again";

#[derive(Error, Debug)]
pub enum EcoError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unsupported page: {0}")]
    UnsupportedPage(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Relay returned HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Could not parse relay response: {0}")]
    Parse(String),

    #[error("Score report has no categories")]
    EmptyReport,

    #[error("Page fetch failed: {0}")]
    Fetch(String),

    #[error("Analysis already in flight")]
    Busy,

    #[error("Analysis cancelled")]
    Cancelled,

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] refinery::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl EcoError {
    /// The fixed message shown to the user. Raw detail only goes to the log.
    pub fn user_message(&self) -> &'static str {
        match self {
            EcoError::UnsupportedPage(_) => MSG_OPEN_PRODUCT_PAGE,
            EcoError::Validation(_) | EcoError::Fetch(_) => MSG_NO_PRODUCT_DATA,
            EcoError::Network(_) | EcoError::Server { .. } | EcoError::Parse(_) => {
                MSG_ANALYSIS_FAILED
            }
            EcoError::EmptyReport => MSG_NO_DATA,
            EcoError::Busy => MSG_BUSY,
            EcoError::Cancelled => MSG_CANCELLED,
            _ => MSG_INTERNAL,
        }
    }

    /// Get an actionable hint for how to resolve this error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            EcoError::UnsupportedPage(_) => Some(
                "Pass a product page URL, e.g.:\n  ecoscore analyze \"https://www.amazon.com/dp/B000000000\""
            ),
            EcoError::Fetch(_) => Some(
                "The retailer may be blocking plain HTTP clients. Save the page and try:\n  ecoscore analyze \"<url>\" --html page.html"
            ),
            EcoError::Network(_) => Some(
                "Check that the relay is running:\n  ecoscore health"
            ),
            EcoError::Server { .. } | EcoError::Parse(_) => Some(
                "Run with --verbose to see the relay's response"
            ),
            EcoError::ConfigError(_) => Some(
                "Check your configuration with `ecoscore config show`"
            ),
            EcoError::DatabaseError(_) | EcoError::MigrationError(_) => Some(
                "The result cache may be corrupt. Set ECOSCORE_DB to a fresh path to bypass it"
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EcoError>;
