// 🏷️ "Not a Car" Classifier - Keyword gate for the valuation flow
// Valuations are only offered for cars; motorcycles and scooters are flagged
// by make, body type, or model-name keywords. Three static lists, no rule
// engine: the decision is binary and the lists are the whole contract.

use crate::merge::MergedVehicleDetails;
use serde::Serialize;

// ============================================================================
// KEYWORD LISTS
// ============================================================================

/// Makes that only build motorcycles; car makes never appear here
const MOTORCYCLE_MAKES: &[&str] = &[
    "HARLEY-DAVIDSON",
    "DUCATI",
    "KTM",
    "APRILIA",
    "ROYAL ENFIELD",
    "MOTO GUZZI",
    "INDIAN",
    "HUSQVARNA",
    "MV AGUSTA",
    "BENELLI",
];

/// Body classifications that identify two/three-wheelers
const MOTORCYCLE_BODY_TYPES: &[&str] = &[
    "MOTORCYCLE",
    "MOTORBIKE",
    "SCOOTER",
    "MOPED",
    "TRIKE",
    "QUAD",
    "ATV",
];

/// Model-name substrings from makes that also build cars
const MOTORCYCLE_MODEL_KEYWORDS: &[&str] = &[
    "SPORTSTER",
    "NINJA",
    "PANIGALE",
    "BONNEVILLE",
    "FIREBLADE",
    "GOLDWING",
    "FAT BOY",
    "STREET TRIPLE",
];

// ============================================================================
// CLASSIFICATION RESULT
// ============================================================================

/// Which field triggered the not-a-car decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchField {
    Make,
    BodyType,
    Model,
}

/// Classification - The gate decision plus the keyword that fired
///
/// The boolean is the contract; the matched keyword exists for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub is_not_car: bool,
    pub matched: Option<(MatchField, String)>,
}

impl Classification {
    fn car() -> Self {
        Classification {
            is_not_car: false,
            matched: None,
        }
    }

    fn not_car(field: MatchField, keyword: &str) -> Self {
        Classification {
            is_not_car: true,
            matched: Some((field, keyword.to_string())),
        }
    }
}

// ============================================================================
// CLASSIFIER
// ============================================================================

/// Classify a merged record; absent input is treated as a car
///
/// Uppercase substring matching against the three lists, checked in order:
/// make, body type, model. First hit wins.
pub fn classify(details: Option<&MergedVehicleDetails>) -> Classification {
    let details = match details {
        Some(details) => details,
        None => return Classification::car(),
    };

    let make = details.make.to_uppercase();
    let body_type = details.type_approval.to_uppercase();
    let model = details.model.to_uppercase();

    if let Some(keyword) = MOTORCYCLE_MAKES.iter().find(|k| make.contains(*k)) {
        return Classification::not_car(MatchField::Make, keyword);
    }

    if let Some(keyword) = MOTORCYCLE_BODY_TYPES.iter().find(|k| body_type.contains(*k)) {
        return Classification::not_car(MatchField::BodyType, keyword);
    }

    if let Some(keyword) = MOTORCYCLE_MODEL_KEYWORDS.iter().find(|k| model.contains(*k)) {
        return Classification::not_car(MatchField::Model, keyword);
    }

    Classification::car()
}

/// Boolean gate used by the valuation pages
pub fn is_not_car(details: Option<&MergedVehicleDetails>) -> bool {
    classify(details).is_not_car
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn details(make: &str, model: &str, type_approval: &str) -> MergedVehicleDetails {
        MergedVehicleDetails {
            make: make.to_string(),
            model: model.to_string(),
            type_approval: type_approval.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_motorcycle_make_flags_not_car() {
        let harley = details("Harley-Davidson", "Sportster S", "");
        assert!(is_not_car(Some(&harley)));

        let classification = classify(Some(&harley));
        assert_eq!(
            classification.matched,
            Some((MatchField::Make, "HARLEY-DAVIDSON".to_string()))
        );
    }

    #[test]
    fn test_car_passes_the_gate() {
        let fiesta = details("Ford", "Fiesta", "Hatchback");
        assert!(!is_not_car(Some(&fiesta)));
        assert!(classify(Some(&fiesta)).matched.is_none());
    }

    #[test]
    fn test_absent_details_treated_as_car() {
        assert!(!is_not_car(None));
    }

    #[test]
    fn test_body_type_keyword_flags_not_car() {
        let scooter = details("Honda", "PCX 125", "Scooter");
        let classification = classify(Some(&scooter));

        assert!(classification.is_not_car);
        assert_eq!(
            classification.matched,
            Some((MatchField::BodyType, "SCOOTER".to_string()))
        );
    }

    #[test]
    fn test_model_keyword_catches_bikes_from_car_makes() {
        // Honda and Triumph build cars too; the model list catches their bikes
        let fireblade = details("Honda", "CBR1000RR Fireblade", "");
        assert!(is_not_car(Some(&fireblade)));

        let triple = details("Triumph", "Street Triple RS", "");
        assert!(is_not_car(Some(&triple)));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let ducati = details("ducati", "panigale v4", "motorcycle");
        assert!(is_not_car(Some(&ducati)));
    }

    #[test]
    fn test_make_list_checked_before_model_list() {
        // Both lists would fire; provenance should name the make match
        let harley = details("Harley-Davidson", "Fat Boy", "");
        let classification = classify(Some(&harley));
        assert_eq!(
            classification.matched.map(|(field, _)| field),
            Some(MatchField::Make)
        );
    }

    #[test]
    fn test_empty_record_is_a_car() {
        let empty = MergedVehicleDetails::default();
        assert!(!is_not_car(Some(&empty)));
    }
}
