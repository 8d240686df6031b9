//! Supply-chain operations analytics
//!
//! Loads a shipment CSV, aggregates delivery, cost and inventory metrics and
//! assembles dashboard views, optionally enriched with narrative insights
//! from a text-generation service.

pub mod api;
pub mod charts;
pub mod config;
pub mod cost;
pub mod error;
pub mod insights;
pub mod inventory;
pub mod loader;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod risk;
pub mod views;

pub use error::{InsightError, LoadError, ValidationError};
pub use models::{Dataset, DeliveryStatus, Shipment};
