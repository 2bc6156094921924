//! Rule-based water conservation advice.
//!
//! Five independent threshold rules over the raw inputs. Every rule is
//! evaluated on every request and fired rules keep table order. The engine
//! has no dependency on the model.

use crate::categories::SoilType;
use crate::input_parameters::InputParameters;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Evapotranspiration above this (mm/day) calls for mulching.
pub const HIGH_EVAPOTRANSPIRATION: f64 = 8.0;
/// Soil moisture below this (%) calls for irrigation scheduling.
pub const LOW_SOIL_MOISTURE: f64 = 15.0;
/// Water retention below this (%) calls for soil amendments.
pub const LOW_WATER_RETENTION: f64 = 20.0;
/// Drainage ratings below this are poor.
pub const POOR_DRAINAGE: u8 = 3;

pub const BALANCED_MESSAGE: &str = "All parameters are well-balanced for optimal water usage!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    SandySoil,
    HighEvapotranspiration,
    LowSoilMoisture,
    LowWaterRetention,
    PoorDrainage,
}

/// A threshold check that contributes at most one suggestion.
#[derive(Debug, Clone, Copy)]
pub struct AdvisoryRule {
    pub id: RuleId,
    pub message: &'static str,
    predicate: fn(&InputParameters) -> bool,
}

impl AdvisoryRule {
    pub const fn new(id: RuleId, message: &'static str, predicate: fn(&InputParameters) -> bool) -> Self {
        Self { id, message, predicate }
    }

    pub fn applies(&self, params: &InputParameters) -> bool {
        (self.predicate)(params)
    }
}

fn is_sandy(params: &InputParameters) -> bool {
    params.soil_type == SoilType::Sandy
}

fn has_high_evapotranspiration(params: &InputParameters) -> bool {
    params.evapotranspiration.value() > HIGH_EVAPOTRANSPIRATION
}

fn has_low_soil_moisture(params: &InputParameters) -> bool {
    params.soil_moisture.value() < LOW_SOIL_MOISTURE
}

fn has_low_water_retention(params: &InputParameters) -> bool {
    params.water_retention.value() < LOW_WATER_RETENTION
}

fn has_poor_drainage(params: &InputParameters) -> bool {
    params.drainage_properties.value() < POOR_DRAINAGE
}

/// Rule table in display order.
pub static RULES: [AdvisoryRule; 5] = [
    AdvisoryRule::new(
        RuleId::SandySoil,
        "Consider improving soil structure by adding organic matter or compost to enhance water retention.",
        is_sandy,
    ),
    AdvisoryRule::new(
        RuleId::HighEvapotranspiration,
        "High evapotranspiration detected. Use mulching to reduce evaporation and conserve soil moisture.",
        has_high_evapotranspiration,
    ),
    AdvisoryRule::new(
        RuleId::LowSoilMoisture,
        "Low soil moisture detected. Ensure proper irrigation scheduling to maintain adequate levels.",
        has_low_soil_moisture,
    ),
    AdvisoryRule::new(
        RuleId::LowWaterRetention,
        "Low water retention capacity. Incorporate soil amendments to improve retention.",
        has_low_water_retention,
    ),
    AdvisoryRule::new(
        RuleId::PoorDrainage,
        "Poor drainage detected. Improve soil aeration or use soil conditioners to balance drainage.",
        has_poor_drainage,
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub rule: RuleId,
    pub message: String,
}

/// Outcome of evaluating the rules. `Balanced` is explicit so callers can
/// tell "nothing to flag" apart from "not evaluated".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "suggestions", rename_all = "snake_case")]
pub enum Advisory {
    Suggestions(Vec<Suggestion>),
    Balanced,
}

impl Advisory {
    pub fn is_balanced(&self) -> bool {
        matches!(self, Advisory::Balanced)
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        match self {
            Advisory::Suggestions(list) => list,
            Advisory::Balanced => &[],
        }
    }

    pub fn fired_rules(&self) -> Vec<RuleId> {
        self.suggestions().iter().map(|s| s.rule).collect()
    }

    /// Text lines for display: one per suggestion, or the balanced message.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Advisory::Suggestions(list) => list.iter().map(|s| s.message.clone()).collect(),
            Advisory::Balanced => vec![BALANCED_MESSAGE.to_string()],
        }
    }
}

/// Evaluate an arbitrary rule set, preserving its order.
pub fn evaluate_rules(rules: &[AdvisoryRule], params: &InputParameters) -> Advisory {
    let suggestions: Vec<Suggestion> = rules
        .iter()
        .filter(|rule| rule.applies(params))
        .map(|rule| {
            debug!("Advisory rule fired: {:?}", rule.id);
            Suggestion {
                rule: rule.id,
                message: rule.message.to_string(),
            }
        })
        .collect();

    if suggestions.is_empty() {
        Advisory::Balanced
    } else {
        Advisory::Suggestions(suggestions)
    }
}

/// Evaluate the standard rule table.
pub fn evaluate(params: &InputParameters) -> Advisory {
    evaluate_rules(&RULES, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DrainageClass, Evapotranspiration, SoilMoisture, WaterRetention};

    fn params_with(
        soil: SoilType,
        et: f64,
        moisture: f64,
        retention: f64,
        drainage: i64,
    ) -> InputParameters {
        InputParameters {
            soil_type: soil,
            evapotranspiration: Evapotranspiration::new(et).unwrap(),
            soil_moisture: SoilMoisture::new(moisture).unwrap(),
            water_retention: WaterRetention::new(retention).unwrap(),
            drainage_properties: DrainageClass::new(drainage).unwrap(),
            ..InputParameters::default()
        }
    }

    #[test]
    fn test_default_inputs_flag_only_sandy_soil() {
        let advisory = evaluate(&InputParameters::default());
        assert_eq!(advisory.fired_rules(), vec![RuleId::SandySoil]);
        assert_eq!(advisory.lines(), vec![RULES[0].message.to_string()]);
    }

    #[test]
    fn test_every_rule_fires_in_table_order() {
        let advisory = evaluate(&params_with(SoilType::Sandy, 9.0, 10.0, 15.0, 2));
        assert_eq!(
            advisory.fired_rules(),
            vec![
                RuleId::SandySoil,
                RuleId::HighEvapotranspiration,
                RuleId::LowSoilMoisture,
                RuleId::LowWaterRetention,
                RuleId::PoorDrainage,
            ]
        );
    }

    #[test]
    fn test_no_rule_fires_returns_balanced() {
        let advisory = evaluate(&params_with(SoilType::Loamy, 5.0, 25.0, 35.0, 5));
        assert!(advisory.is_balanced());
        assert!(advisory.suggestions().is_empty());
        assert_eq!(advisory.lines(), vec![BALANCED_MESSAGE.to_string()]);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let advisory = evaluate(&params_with(SoilType::Clay, 8.0, 15.0, 20.0, 3));
        assert!(advisory.is_balanced());

        let advisory = evaluate(&params_with(SoilType::Clay, 8.1, 14.9, 19.9, 2));
        assert_eq!(advisory.suggestions().len(), 4);
    }

    #[test]
    fn test_rules_are_independent() {
        // Toggling one predicate never changes whether another fires.
        let base = params_with(SoilType::Silty, 5.0, 25.0, 35.0, 5);
        let toggled = [
            params_with(SoilType::Sandy, 5.0, 25.0, 35.0, 5),
            params_with(SoilType::Silty, 9.5, 25.0, 35.0, 5),
            params_with(SoilType::Silty, 5.0, 6.0, 35.0, 5),
            params_with(SoilType::Silty, 5.0, 25.0, 12.0, 5),
            params_with(SoilType::Silty, 5.0, 25.0, 35.0, 1),
        ];

        assert!(evaluate(&base).is_balanced());
        for (rule, params) in RULES.iter().zip(toggled.iter()) {
            assert_eq!(evaluate(params).fired_rules(), vec![rule.id]);
        }
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let params = params_with(SoilType::Sandy, 9.0, 10.0, 35.0, 4);
        assert_eq!(evaluate(&params), evaluate(&params));
    }

    #[test]
    fn test_custom_rule_subset_preserves_order() {
        let subset = [RULES[4], RULES[1]];
        let advisory = evaluate_rules(&subset, &params_with(SoilType::Sandy, 9.0, 10.0, 15.0, 2));
        assert_eq!(
            advisory.fired_rules(),
            vec![RuleId::PoorDrainage, RuleId::HighEvapotranspiration]
        );
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(Advisory::Balanced).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "balanced" }));

        let json = serde_json::to_value(evaluate(&InputParameters::default())).unwrap();
        assert_eq!(json["status"], "suggestions");
        assert_eq!(json["suggestions"][0]["rule"], "sandy_soil");
    }
}
