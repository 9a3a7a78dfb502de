pub mod aggregate;
pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod logging;
pub mod normalize;
pub mod page;
pub mod pipeline;
pub mod product;
pub mod render;
pub mod score;
pub mod view;

pub use error::{EcoError, Result};
