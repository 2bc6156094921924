//! Library root for the `cropwater` crate
//! Crop water requirement prediction and water-conservation advice

// Error handling
pub mod errors;

// Inputs and encoding
pub mod categories;
pub mod domain;
pub mod input_parameters;
pub mod feature_vector;

// Model inference
pub mod prediction_service;

// Rule-based advice
pub mod advisory;

// Request pipeline
pub mod water_advisor;

// Configuration & logging
pub mod config;
pub mod telemetry;

// CLI and HTTP surfaces
pub mod cli;
pub mod web;

pub use advisory::{evaluate, Advisory, RuleId, Suggestion};
pub use categories::{encode, CropType, GrowthStage, IrrigationMethod, SoilType};
pub use errors::{CropWaterError, CropWaterResult};
pub use feature_vector::{assemble, FeatureColumn, FeatureVector};
pub use input_parameters::{InputParameters, InputRecord};
pub use prediction_service::{load_model, PredictionService, WaterModel, WaterRequirement};
pub use water_advisor::{AdvisoryReport, WaterAdvisor};
