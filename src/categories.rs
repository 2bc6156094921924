//! Closed categorical inputs and their fixed integer codes.
//!
//! Codes are consecutive from 0 in declaration order and must match the
//! encoding the water requirement model was trained with.

use crate::errors::{CropWaterError, CropWaterResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shared behaviour of the four closed input categories.
pub trait Category: Copy + Sized + 'static {
    /// Field name used in errors and on the wire.
    const NAME: &'static str;
    /// Every variant, in code order.
    const ALL: &'static [Self];

    fn label(&self) -> &'static str;
    fn code(&self) -> u8;

    /// Case-insensitive label lookup. Never falls back to a default variant.
    fn from_label(input: &str) -> CropWaterResult<Self> {
        let wanted = input.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|variant| variant.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CropWaterError::unknown_category(Self::NAME, input))
    }

    fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|variant| variant.label()).collect()
    }
}

macro_rules! closed_category {
    // The first variant is the input form default.
    ($(#[$meta:meta])* $name:ident, $field:literal, {
        $first:ident = $first_code:literal $(, $variant:ident = $code:literal)* $(,)?
    }) => {
        $(#[$meta])*
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            #[default]
            $first,
            $($variant),*
        }

        impl Category for $name {
            const NAME: &'static str = $field;
            const ALL: &'static [Self] = &[$name::$first, $($name::$variant),*];

            fn label(&self) -> &'static str {
                match self {
                    $name::$first => stringify!($first),
                    $($name::$variant => stringify!($variant)),*
                }
            }

            fn code(&self) -> u8 {
                match self {
                    $name::$first => $first_code,
                    $($name::$variant => $code),*
                }
            }
        }

        impl FromStr for $name {
            type Err = CropWaterError;

            fn from_str(input: &str) -> Result<Self, Self::Err> {
                <$name as Category>::from_label(input)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

closed_category!(
    /// Soil texture class
    SoilType, "soil_type", {
        Sandy = 0,
        Clay = 1,
        Loamy = 2,
        Silty = 3,
        Peaty = 4,
    }
);

closed_category!(
    /// Crop being irrigated
    CropType, "crop_type", {
        Rice = 0,
        Wheat = 1,
        Maize = 2,
        Soybean = 3,
        Cotton = 4,
    }
);

closed_category!(
    /// Phenological stage of the crop
    GrowthStage, "growth_stage", {
        Seedling = 0,
        Vegetative = 1,
        Flowering = 2,
        Fruiting = 3,
    }
);

closed_category!(
    /// How water is delivered to the field
    IrrigationMethod, "irrigation_method", {
        Drip = 0,
        Sprinkler = 1,
        Flood = 2,
        Manual = 3,
    }
);

/// Encode a categorical value by field name, e.g. `encode("soil_type", "Loamy") == Ok(2)`.
///
/// Both an unknown field name and an unknown value are errors.
pub fn encode(category: &str, value: &str) -> CropWaterResult<u8> {
    match category {
        "soil_type" => Ok(SoilType::from_label(value)?.code()),
        "crop_type" => Ok(CropType::from_label(value)?.code()),
        "growth_stage" => Ok(GrowthStage::from_label(value)?.code()),
        "irrigation_method" => Ok(IrrigationMethod::from_label(value)?.code()),
        other => Err(CropWaterError::unknown_category("category", other)),
    }
}
