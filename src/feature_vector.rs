//! Feature vector assembly for the water requirement model.
//!
//! The model consumes twelve values in a fixed column order. That order lives
//! in exactly one place, [`FeatureColumn::ALL`]; [`FeatureVector`] holds named
//! fields and only the schema turns them into a positional array.

use crate::categories::Category;
use crate::domain::numeric_domains;
use crate::errors::CropWaterResult;
use crate::input_parameters::InputParameters;
use serde::{Deserialize, Serialize};

/// Number of features the model was trained on.
pub const FEATURE_COUNT: usize = 12;

/// One model input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureColumn {
    SoilType,
    CropType,
    GrowthStage,
    Temperature,
    Humidity,
    WindSpeed,
    Evapotranspiration,
    Rainfall,
    SoilMoisture,
    WaterRetention,
    DrainageProperties,
    IrrigationMethod,
}

impl FeatureColumn {
    /// Column order the model was trained with. Do not reorder.
    pub const ALL: [FeatureColumn; FEATURE_COUNT] = [
        FeatureColumn::SoilType,
        FeatureColumn::CropType,
        FeatureColumn::GrowthStage,
        FeatureColumn::Temperature,
        FeatureColumn::Humidity,
        FeatureColumn::WindSpeed,
        FeatureColumn::Evapotranspiration,
        FeatureColumn::Rainfall,
        FeatureColumn::SoilMoisture,
        FeatureColumn::WaterRetention,
        FeatureColumn::DrainageProperties,
        FeatureColumn::IrrigationMethod,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FeatureColumn::SoilType => "soil_type",
            FeatureColumn::CropType => "crop_type",
            FeatureColumn::GrowthStage => "growth_stage",
            FeatureColumn::Temperature => "temperature",
            FeatureColumn::Humidity => "humidity",
            FeatureColumn::WindSpeed => "wind_speed",
            FeatureColumn::Evapotranspiration => "evapotranspiration",
            FeatureColumn::Rainfall => "rainfall",
            FeatureColumn::SoilMoisture => "soil_moisture",
            FeatureColumn::WaterRetention => "water_retention",
            FeatureColumn::DrainageProperties => "drainage_properties",
            FeatureColumn::IrrigationMethod => "irrigation_method",
        }
    }

    /// Position of this column in the model input.
    pub fn index(&self) -> usize {
        match self {
            FeatureColumn::SoilType => 0,
            FeatureColumn::CropType => 1,
            FeatureColumn::GrowthStage => 2,
            FeatureColumn::Temperature => 3,
            FeatureColumn::Humidity => 4,
            FeatureColumn::WindSpeed => 5,
            FeatureColumn::Evapotranspiration => 6,
            FeatureColumn::Rainfall => 7,
            FeatureColumn::SoilMoisture => 8,
            FeatureColumn::WaterRetention => 9,
            FeatureColumn::DrainageProperties => 10,
            FeatureColumn::IrrigationMethod => 11,
        }
    }

    pub fn is_categorical(&self) -> bool {
        matches!(
            self,
            FeatureColumn::SoilType
                | FeatureColumn::CropType
                | FeatureColumn::GrowthStage
                | FeatureColumn::IrrigationMethod
        )
    }
}

/// Encoded model input with one named field per column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub soil_code: u8,
    pub crop_code: u8,
    pub growth_stage_code: u8,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub evapotranspiration: f64,
    pub rainfall: f64,
    pub soil_moisture: f64,
    pub water_retention: f64,
    pub drainage_properties: u8,
    pub irrigation_code: u8,
}

impl FeatureVector {
    /// Value of a single named column.
    pub fn get(&self, column: FeatureColumn) -> f64 {
        match column {
            FeatureColumn::SoilType => f64::from(self.soil_code),
            FeatureColumn::CropType => f64::from(self.crop_code),
            FeatureColumn::GrowthStage => f64::from(self.growth_stage_code),
            FeatureColumn::Temperature => self.temperature,
            FeatureColumn::Humidity => self.humidity,
            FeatureColumn::WindSpeed => self.wind_speed,
            FeatureColumn::Evapotranspiration => self.evapotranspiration,
            FeatureColumn::Rainfall => self.rainfall,
            FeatureColumn::SoilMoisture => self.soil_moisture,
            FeatureColumn::WaterRetention => self.water_retention,
            FeatureColumn::DrainageProperties => f64::from(self.drainage_properties),
            FeatureColumn::IrrigationMethod => f64::from(self.irrigation_code),
        }
    }

    /// Positional form in model column order.
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        FeatureColumn::ALL.map(|column| self.get(column))
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.to_array().to_vec()
    }

    pub fn to_f32_vec(&self) -> Vec<f32> {
        self.to_array().iter().map(|v| *v as f32).collect()
    }

    /// Re-check every numeric column against its declared domain.
    ///
    /// A vector built by [`assemble`] always passes; this guards vectors
    /// that were deserialized or built by hand.
    pub fn validate(&self) -> CropWaterResult<()> {
        for domain in numeric_domains() {
            let value = match domain.field {
                "temperature" => self.temperature,
                "humidity" => self.humidity,
                "wind_speed" => self.wind_speed,
                "evapotranspiration" => self.evapotranspiration,
                "rainfall" => self.rainfall,
                "soil_moisture" => self.soil_moisture,
                "water_retention" => self.water_retention,
                "drainage_properties" => f64::from(self.drainage_properties),
                _ => continue,
            };
            domain.check(value)?;
        }
        Ok(())
    }
}

/// Build the model input for a validated request.
pub fn assemble(params: &InputParameters) -> FeatureVector {
    FeatureVector {
        soil_code: params.soil_type.code(),
        crop_code: params.crop_type.code(),
        growth_stage_code: params.growth_stage.code(),
        temperature: params.temperature.value(),
        humidity: params.humidity.value(),
        wind_speed: params.wind_speed.value(),
        evapotranspiration: params.evapotranspiration.value(),
        rainfall: params.rainfall.value(),
        soil_moisture: params.soil_moisture.value(),
        water_retention: params.water_retention.value(),
        drainage_properties: params.drainage_properties.value(),
        irrigation_code: params.irrigation_method.code(),
    }
}

/// [`assemble`] followed by a defensive domain re-check.
pub fn assemble_checked(params: &InputParameters) -> CropWaterResult<FeatureVector> {
    let features = assemble(params);
    features.validate()?;
    Ok(features)
}

/// Column names in model order, for diagnostics and the schema endpoint.
pub fn column_names() -> Vec<&'static str> {
    FeatureColumn::ALL.iter().map(|column| column.name()).collect()
}
