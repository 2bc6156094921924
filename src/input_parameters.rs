use crate::categories::{Category, CropType, GrowthStage, IrrigationMethod, SoilType};
use crate::domain::{
    numeric_domains, DrainageClass, Evapotranspiration, Humidity, Rainfall, SoilMoisture,
    Temperature, WaterRetention, WindSpeed,
};
use crate::feature_vector::column_names;
use crate::errors::{CropWaterError, CropWaterResult};
use serde::{Deserialize, Serialize};

/// One validated prediction request.
///
/// Every field is a closed enum or a bounded newtype, so holding an
/// `InputParameters` means all inputs are inside their domains.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InputParameters {
    pub soil_type: SoilType,
    pub crop_type: CropType,
    pub growth_stage: GrowthStage,
    pub irrigation_method: IrrigationMethod,
    pub temperature: Temperature,
    pub humidity: Humidity,
    pub wind_speed: WindSpeed,
    pub evapotranspiration: Evapotranspiration,
    pub rainfall: Rainfall,
    pub soil_moisture: SoilMoisture,
    pub water_retention: WaterRetention,
    pub drainage_properties: DrainageClass,
}

/// Untyped request as it arrives from the CLI or the HTTP API.
///
/// Categories are labels and measurements are plain numbers; missing fields
/// take the input form defaults. Convert with `InputParameters::try_from`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputRecord {
    pub soil_type: String,
    pub crop_type: String,
    pub growth_stage: String,
    pub irrigation_method: String,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub evapotranspiration: f64,
    pub rainfall: f64,
    pub soil_moisture: f64,
    pub water_retention: f64,
    pub drainage_properties: i64,
}

impl Default for InputRecord {
    fn default() -> Self {
        InputRecord::from(&InputParameters::default())
    }
}

impl From<&InputParameters> for InputRecord {
    fn from(params: &InputParameters) -> Self {
        InputRecord {
            soil_type: params.soil_type.to_string(),
            crop_type: params.crop_type.to_string(),
            growth_stage: params.growth_stage.to_string(),
            irrigation_method: params.irrigation_method.to_string(),
            temperature: params.temperature.value(),
            humidity: params.humidity.value(),
            wind_speed: params.wind_speed.value(),
            evapotranspiration: params.evapotranspiration.value(),
            rainfall: params.rainfall.value(),
            soil_moisture: params.soil_moisture.value(),
            water_retention: params.water_retention.value(),
            drainage_properties: i64::from(params.drainage_properties.value()),
        }
    }
}

impl TryFrom<InputRecord> for InputParameters {
    type Error = CropWaterError;

    fn try_from(record: InputRecord) -> CropWaterResult<Self> {
        InputParameters::try_from(&record)
    }
}

impl TryFrom<&InputRecord> for InputParameters {
    type Error = CropWaterError;

    fn try_from(record: &InputRecord) -> CropWaterResult<Self> {
        Ok(InputParameters {
            soil_type: record.soil_type.parse()?,
            crop_type: record.crop_type.parse()?,
            growth_stage: record.growth_stage.parse()?,
            irrigation_method: record.irrigation_method.parse()?,
            temperature: Temperature::new(record.temperature)?,
            humidity: Humidity::new(record.humidity)?,
            wind_speed: WindSpeed::new(record.wind_speed)?,
            evapotranspiration: Evapotranspiration::new(record.evapotranspiration)?,
            rainfall: Rainfall::new(record.rainfall)?,
            soil_moisture: SoilMoisture::new(record.soil_moisture)?,
            water_retention: WaterRetention::new(record.water_retention)?,
            drainage_properties: DrainageClass::new(record.drainage_properties)?,
        })
    }
}

/// Description of the input surface: allowed labels, numeric domains and
/// the model's column order.
pub fn input_schema() -> serde_json::Value {
    serde_json::json!({
        "categories": {
            "soil_type": SoilType::labels(),
            "crop_type": CropType::labels(),
            "growth_stage": GrowthStage::labels(),
            "irrigation_method": IrrigationMethod::labels(),
        },
        "numeric": numeric_domains(),
        "feature_columns": column_names(),
    })
}
