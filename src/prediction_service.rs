//! prediction_service.rs
//! Loads the pre-trained water requirement model once and runs inference.
//! The model is opaque: all the service needs is `predict(vector) -> scalar`.

use crate::errors::{CropWaterError, CropWaterResult};
use crate::feature_vector::{FeatureVector, FEATURE_COUNT};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use tract_onnx::prelude::*;

/// Artifact formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    Onnx,
    Linear,
}

impl ModelFormat {
    /// Pick a format from the artifact's file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "onnx" => Some(ModelFormat::Onnx),
            "json" => Some(ModelFormat::Linear),
            _ => None,
        }
    }
}

/// Identity of a loaded model artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_id: String,
    pub path: String,
    pub format: ModelFormat,
    /// Hex SHA-256 of the artifact bytes
    pub fingerprint: String,
}

/// A loaded regression model mapping a feature vector to mm/day.
pub trait WaterModel: Send + Sync {
    fn metadata(&self) -> &ModelMetadata;

    /// Raw model output for one feature vector.
    fn predict(&self, features: &FeatureVector) -> CropWaterResult<f64>;
}

/// Parameters of a linear water model stored as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModelSpec {
    pub model_id: String,
    pub bias: f64,
    pub weights: Vec<f64>,
}

/// bias + sum(weight_i * feature_i)
pub struct LinearWaterModel {
    metadata: ModelMetadata,
    bias: f64,
    weights: [f64; FEATURE_COUNT],
}

impl LinearWaterModel {
    pub fn new(spec: LinearModelSpec, path: &str, fingerprint: String) -> CropWaterResult<Self> {
        let weights: [f64; FEATURE_COUNT] = spec
            .weights
            .as_slice()
            .try_into()
            .map_err(|_| CropWaterError::feature_schema(FEATURE_COUNT, spec.weights.len()))?;

        Ok(Self {
            metadata: ModelMetadata {
                model_id: spec.model_id,
                path: path.to_string(),
                format: ModelFormat::Linear,
                fingerprint,
            },
            bias: spec.bias,
            weights,
        })
    }

    fn from_bytes(path: &str, bytes: &[u8], fingerprint: String) -> CropWaterResult<Self> {
        let spec: LinearModelSpec = serde_json::from_slice(bytes)
            .map_err(|e| CropWaterError::model_load(path, format!("invalid linear model: {e}")))?;
        Self::new(spec, path, fingerprint)
    }
}

impl WaterModel for LinearWaterModel {
    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    fn predict(&self, features: &FeatureVector) -> CropWaterResult<f64> {
        let score = self.bias
            + features
                .to_array()
                .iter()
                .zip(self.weights.iter())
                .map(|(f, w)| f * w)
                .sum::<f64>();
        Ok(score)
    }
}

type OnnxPlan = TypedRunnableModel<TypedModel>;

/// ONNX export of the trained regressor, run with tract.
pub struct OnnxWaterModel {
    metadata: ModelMetadata,
    plan: OnnxPlan,
}

impl OnnxWaterModel {
    fn from_bytes(path: &str, bytes: &[u8], fingerprint: String) -> CropWaterResult<Self> {
        let plan = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(bytes))
            .and_then(|model| model.with_input_fact(0, f32::fact([1, FEATURE_COUNT]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| CropWaterError::model_load(path, format!("{e:#}")))?;

        let model_id = Path::new(path)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("onnx_model")
            .to_string();

        Ok(Self {
            metadata: ModelMetadata {
                model_id,
                path: path.to_string(),
                format: ModelFormat::Onnx,
                fingerprint,
            },
            plan,
        })
    }
}

impl WaterModel for OnnxWaterModel {
    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    fn predict(&self, features: &FeatureVector) -> CropWaterResult<f64> {
        let input = Tensor::from_shape(&[1, FEATURE_COUNT], &features.to_f32_vec())
            .map_err(|e| CropWaterError::inference(e.to_string()))?;

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| CropWaterError::inference(e.to_string()))?;

        let output = outputs
            .first()
            .ok_or_else(|| CropWaterError::inference("model produced no outputs"))?;
        let values = output
            .cast_to::<f32>()
            .map_err(|e| CropWaterError::inference(e.to_string()))?;
        let first = values
            .as_slice::<f32>()
            .map_err(|e| CropWaterError::inference(e.to_string()))?
            .first()
            .copied()
            .ok_or_else(|| CropWaterError::inference("model output is empty"))?;

        Ok(f64::from(first))
    }
}

/// Load the model artifact at `path`. Called once at startup.
///
/// A missing file is `ModelNotFound`; a file that exists but cannot be read
/// or parsed is `ModelLoad`. Neither is retried.
pub fn load_model(path: impl AsRef<Path>) -> CropWaterResult<Arc<dyn WaterModel>> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CropWaterError::model_not_found(&display),
        _ => CropWaterError::model_load(&display, e.to_string()),
    })?;
    let fingerprint = format!("{:x}", Sha256::digest(&bytes));

    let model: Arc<dyn WaterModel> = match ModelFormat::from_path(path) {
        Some(ModelFormat::Onnx) => Arc::new(OnnxWaterModel::from_bytes(&display, &bytes, fingerprint)?),
        Some(ModelFormat::Linear) => {
            Arc::new(LinearWaterModel::from_bytes(&display, &bytes, fingerprint)?)
        }
        None => {
            return Err(CropWaterError::model_load(
                &display,
                "unsupported model format (expected .onnx or .json)",
            ))
        }
    };

    let meta = model.metadata();
    info!(
        "Loaded water model '{}' ({:?}) from {} [sha256 {}]",
        meta.model_id, meta.format, meta.path, meta.fingerprint
    );
    Ok(model)
}

/// Predicted optimal water requirement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterRequirement {
    pub mm_per_day: f64,
}

impl fmt::Display for WaterRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} mm/day", self.mm_per_day)
    }
}

/// Read-only wrapper around the process-wide model.
#[derive(Clone)]
pub struct PredictionService {
    model: Arc<dyn WaterModel>,
}

impl PredictionService {
    pub fn new(model: Arc<dyn WaterModel>) -> Self {
        Self { model }
    }

    /// Load the artifact and wrap it. Fails fast when the file is absent.
    pub fn from_path(path: impl AsRef<Path>) -> CropWaterResult<Self> {
        load_model(path).map(Self::new)
    }

    pub fn metadata(&self) -> &ModelMetadata {
        self.model.metadata()
    }

    pub fn predict(&self, features: &FeatureVector) -> CropWaterResult<WaterRequirement> {
        let mm_per_day = self.model.predict(features)?;
        if !mm_per_day.is_finite() {
            return Err(CropWaterError::inference(format!(
                "model '{}' returned non-finite value {mm_per_day}",
                self.metadata().model_id
            )));
        }

        debug!("Predicted {:.4} mm/day for {:?}", mm_per_day, features.to_array());
        Ok(WaterRequirement { mm_per_day })
    }
}
