//! Plastiscan Core Library
//!
//! Data model, vision model client and analysis logic for microplastic
//! detection in water-sample images.

pub mod analysis;
pub mod config;
pub mod error;
pub mod image;
pub mod overlay;
pub mod session;
pub mod vision;

pub use analysis::Analyzer;
pub use error::{PlastiscanError, PlastiscanResult};
