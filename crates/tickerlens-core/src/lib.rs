//! Core types and traits for the tickerlens analysis pipeline.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Symbol, DateRange, Quote, PriceSeries)
//! - Derived analysis types (IndicatorSet, Recommendation, CompanyProfile)
//! - The error taxonomy shared by every stage
//! - Core traits for quote providers, indicators, and validated settings

pub mod error;
pub mod traits;
pub mod types;

pub use error::{
    AnalysisError, AnalysisResult, FetchError, IndicatorError, ProviderFailure, RangeError,
    SettingsError, SymbolError,
};
pub use traits::*;
pub use types::*;
