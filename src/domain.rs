//! Bounded numeric inputs.
//!
//! Each environmental or soil measurement is a newtype that can only be
//! constructed inside its declared domain, so a typed request never carries
//! an out-of-range value.

use crate::errors::{CropWaterError, CropWaterResult};
use serde::{Deserialize, Serialize};

/// Declared domain of one numeric input, as presented on the input surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericDomain {
    pub field: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
}

impl NumericDomain {
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    pub fn check(&self, value: f64) -> CropWaterResult<f64> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(CropWaterError::out_of_domain(self.field, value, self.min, self.max))
        }
    }
}

macro_rules! bounded_measure {
    ($(#[$meta:meta])* $name:ident {
        field: $field:literal,
        label: $label:literal,
        unit: $unit:literal,
        min: $min:expr,
        max: $max:expr,
        default: $default:expr $(,)?
    }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
        #[serde(try_from = "f64", into = "f64")]
        pub struct $name(f64);

        impl $name {
            pub const DOMAIN: NumericDomain = NumericDomain {
                field: $field,
                label: $label,
                unit: $unit,
                min: $min,
                max: $max,
                default: $default,
                step: 0.1,
            };

            pub fn new(value: f64) -> CropWaterResult<Self> {
                Self::DOMAIN.check(value).map(Self)
            }

            pub fn value(&self) -> f64 {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self(Self::DOMAIN.default)
            }
        }

        impl TryFrom<f64> for $name {
            type Error = CropWaterError;

            fn try_from(value: f64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for f64 {
            fn from(measure: $name) -> f64 {
                measure.0
            }
        }
    };
}

bounded_measure!(
    /// Air temperature
    Temperature {
        field: "temperature",
        label: "Temperature",
        unit: "°C",
        min: 15.0,
        max: 40.0,
        default: 25.0,
    }
);

bounded_measure!(
    /// Relative humidity
    Humidity {
        field: "humidity",
        label: "Humidity",
        unit: "%",
        min: 20.0,
        max: 100.0,
        default: 50.0,
    }
);

bounded_measure!(
    WindSpeed {
        field: "wind_speed",
        label: "Wind Speed",
        unit: "m/s",
        min: 0.5,
        max: 15.0,
        default: 5.0,
    }
);

bounded_measure!(
    Evapotranspiration {
        field: "evapotranspiration",
        label: "Evapotranspiration",
        unit: "mm/day",
        min: 1.0,
        max: 10.0,
        default: 5.0,
    }
);

bounded_measure!(
    Rainfall {
        field: "rainfall",
        label: "Rainfall",
        unit: "mm",
        min: 0.0,
        max: 200.0,
        default: 50.0,
    }
);

bounded_measure!(
    /// Volumetric soil moisture level
    SoilMoisture {
        field: "soil_moisture",
        label: "Soil Moisture Levels",
        unit: "%",
        min: 5.0,
        max: 40.0,
        default: 20.0,
    }
);

bounded_measure!(
    /// Water retention capacity of the soil
    WaterRetention {
        field: "water_retention",
        label: "Water Retention Capacity",
        unit: "%",
        min: 10.0,
        max: 50.0,
        default: 30.0,
    }
);

/// Drainage rating from 1 (poor) to 5 (excellent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct DrainageClass(u8);

impl DrainageClass {
    pub const DOMAIN: NumericDomain = NumericDomain {
        field: "drainage_properties",
        label: "Drainage Properties (1=Poor, 5=Excellent)",
        unit: "",
        min: 1.0,
        max: 5.0,
        default: 3.0,
        step: 1.0,
    };

    pub fn new(value: i64) -> CropWaterResult<Self> {
        if (1..=5).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(CropWaterError::out_of_domain(
                Self::DOMAIN.field,
                value as f64,
                Self::DOMAIN.min,
                Self::DOMAIN.max,
            ))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for DrainageClass {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<i64> for DrainageClass {
    type Error = CropWaterError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DrainageClass> for u8 {
    fn from(class: DrainageClass) -> u8 {
        class.0
    }
}

/// Every numeric domain, in form order.
pub fn numeric_domains() -> [NumericDomain; 8] {
    [
        Temperature::DOMAIN,
        Humidity::DOMAIN,
        WindSpeed::DOMAIN,
        Evapotranspiration::DOMAIN,
        Rainfall::DOMAIN,
        SoilMoisture::DOMAIN,
        WaterRetention::DOMAIN,
        DrainageClass::DOMAIN,
    ]
}
