//! Recommendation and filtering pipeline for the fleet dashboard.
//!
//! This crate provides:
//! - Feature building for the demand classifier ([`features`])
//! - The static demand-class template table ([`templates`])
//! - [`RecommendationGenerator`], which turns route summaries and classifier
//!   verdicts into reallocation suggestions
//! - BusFilter trait and FilterPipeline for the live tracking list
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FilterPipeline, RecommendationGenerator};
//!
//! let generator = RecommendationGenerator::new(index.clone(), classifier);
//! let recommendations = generator.generate().await;
//!
//! let delayed = FilterPipeline::from_query(Some("335E"), Some("delay"))
//!     .apply(index.buses().to_vec());
//! ```

pub mod traits;
pub mod filters;
pub mod filter_pipeline;
pub mod features;
pub mod templates;
pub mod generator;

// Re-export main types
pub use traits::BusFilter;
pub use filter_pipeline::FilterPipeline;
pub use features::{build_features, TimeShift};
pub use templates::{RecommendationTemplate, TEMPLATES};
pub use generator::{GenerationRun, Recommendation, RecommendationError, RecommendationGenerator, MIN_BUSES};
