//! water_advisor.rs
//! Request pipeline: encode, assemble, predict, advise.
//! Owns the injected model for the lifetime of the process.

use crate::advisory::{self, Advisory};
use crate::errors::CropWaterResult;
use crate::feature_vector::{self, FeatureVector, FEATURE_COUNT};
use crate::input_parameters::InputParameters;
use crate::prediction_service::{PredictionService, WaterModel, WaterRequirement};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Everything produced for one prediction request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryReport {
    pub request_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub model_id: String,
    pub inputs: InputParameters,
    pub features: FeatureVector,
    pub prediction: WaterRequirement,
    pub advisory: Advisory,
}

impl AdvisoryReport {
    /// `"Predicted Optimal Water Requirement: 6.42 mm/day"`
    pub fn headline(&self) -> String {
        format!("Predicted Optimal Water Requirement: {}", self.prediction)
    }

    /// Full text output: headline, then each suggestion or the balanced line.
    pub fn render(&self) -> String {
        let mut out = self.headline();
        out.push('\n');
        match &self.advisory {
            Advisory::Suggestions(list) => {
                for suggestion in list {
                    let _ = writeln!(out, "- {}", suggestion.message);
                }
            }
            Advisory::Balanced => {
                let _ = writeln!(out, "{}", advisory::BALANCED_MESSAGE);
            }
        }
        out
    }
}

pub struct WaterAdvisor {
    prediction: PredictionService,
    recheck_domains: bool,
}

impl WaterAdvisor {
    pub fn new(model: Arc<dyn WaterModel>) -> Self {
        Self {
            prediction: PredictionService::new(model),
            recheck_domains: true,
        }
    }

    /// Toggle the defensive domain re-check before assembly.
    pub fn with_domain_recheck(mut self, enabled: bool) -> Self {
        self.recheck_domains = enabled;
        self
    }

    pub fn prediction_service(&self) -> &PredictionService {
        &self.prediction
    }

    /// Encode the request into the model's feature vector.
    pub fn features(&self, params: &InputParameters) -> CropWaterResult<FeatureVector> {
        if self.recheck_domains {
            feature_vector::assemble_checked(params)
        } else {
            Ok(feature_vector::assemble(params))
        }
    }

    /// Run the full pipeline for one request.
    pub fn advise(&self, params: &InputParameters) -> CropWaterResult<AdvisoryReport> {
        let features = self.features(params)?;
        let prediction = self.prediction.predict(&features)?;
        let advisory = advisory::evaluate(params);

        let report = AdvisoryReport {
            request_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            model_id: self.prediction.metadata().model_id.clone(),
            inputs: *params,
            features,
            prediction,
            advisory,
        };

        info!(
            "Request {} predicted {} with {} suggestion(s)",
            report.request_id,
            report.prediction,
            report.advisory.suggestions().len()
        );
        Ok(report)
    }

    /// Model and pipeline status
    pub fn status(&self) -> serde_json::Value {
        let meta = self.prediction.metadata();
        serde_json::json!({
            "model_id": meta.model_id,
            "model_path": meta.path,
            "model_format": meta.format,
            "fingerprint": meta.fingerprint,
            "feature_count": FEATURE_COUNT,
            "recheck_domains": self.recheck_domains,
            "rules": advisory::RULES.iter().map(|rule| rule.id).collect::<Vec<_>>(),
        })
    }
}
