// Source Records - Wire shapes of the three data providers
// Vehicle lookup, valuation provider, and user-entered form data

use serde::{Deserialize, Serialize};

// ============================================================================
// DATA SOURCES
// ============================================================================

/// DataSource - Identifies which provider a field value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataSource {
    /// Registration lookup provider (authoritative for registered details)
    Lookup,
    /// Valuation provider (authoritative for price estimates)
    Valuation,
    /// User-entered form data (last resort for identification fields)
    Form,
}

impl DataSource {
    /// Human-readable name for display
    pub fn name(&self) -> &str {
        match self {
            DataSource::Lookup => "Vehicle Lookup",
            DataSource::Valuation => "Valuation Provider",
            DataSource::Form => "User Form",
        }
    }

    /// Short code for internal use
    pub fn code(&self) -> &str {
        match self {
            DataSource::Lookup => "lookup",
            DataSource::Valuation => "valuation",
            DataSource::Form => "form",
        }
    }
}

// ============================================================================
// LOOKUP RESULT
// ============================================================================

/// RawLookupResult - JSON shape returned by the registration lookup collaborator
///
/// Every field may be absent; the lookup provider returns whatever it holds
/// for the plate and nothing more.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawLookupResult {
    pub make: Option<String>,
    pub model: Option<String>,
    pub registration_number: Option<String>,
    pub fuel_type: Option<String>,
    /// Engine capacity in cc
    pub engine_capacity: Option<u32>,
    pub colour: Option<String>,
    pub transmission: Option<String>,
    pub type_approval: Option<String>,
    pub body_type: Option<String>,
    /// e.g. "03/2018"
    pub month_of_first_registration: Option<String>,
    pub year_of_manufacture: Option<u32>,
}

// ============================================================================
// VALUATION RESULT
// ============================================================================

/// Estimated value bands in whole-pound GBP, as supplied by the valuation API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimatedValue {
    pub private: u32,
    pub trade: u32,
    pub retail: u32,
}

/// RawValuationResult - JSON shape returned by the valuation collaborator
///
/// `vehicle_description` is free text, optionally carrying a bracketed
/// `[Fuel / Transmission]` segment, e.g.
/// `"BMW 335i M Sport Auto 335I M Sport [Petrol / Automatic]"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawValuationResult {
    pub vrm: Option<String>,
    pub mileage: Option<u32>,
    pub vehicle_description: Option<String>,
    pub estimated_value: Option<EstimatedValue>,
}

// ============================================================================
// FORM DATA
// ============================================================================

/// FormData - Fields the user entered in a prior step
///
/// Month and year are kept as entered (strings) so the merged
/// `MM/YYYY` registration period preserves the user's formatting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormData {
    pub make: Option<String>,
    pub model: Option<String>,
    pub mileage: Option<u32>,
    pub reg_month: Option<String>,
    pub reg_year: Option<String>,
    /// Free-text trim/engine/fuel description, e.g. "865 Custom Cruiser Petrol Manual (61 ps)"
    pub derivative: Option<String>,
    pub vrm: Option<String>,
    pub variant: Option<String>,
}

// ============================================================================
// LISTING SUMMARY
// ============================================================================

/// ListingSummary - Shape of a listing record from the vehicles API,
/// as consumed by the display formatters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingSummary {
    /// Server-supplied title; preferred over the generated one when present
    pub display_title: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    /// Engine size in litres
    pub engine_size: Option<f64>,
    pub variant: Option<String>,
    pub transmission: Option<String>,
    pub fuel_type: Option<String>,
    pub doors: Option<u8>,
    pub body_type: Option<String>,
    pub colour: Option<String>,
    /// Comma-separated location string, e.g. "Chelmsford, CM1 1HT"
    pub location: Option<String>,
}

// ============================================================================
// PIPELINE REQUEST
// ============================================================================

/// ValuationRequest - The three already-fetched source records, as handed
/// to the pipeline by a page render or an API call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationRequest {
    pub lookup: Option<RawLookupResult>,
    pub valuation: Option<RawValuationResult>,
    pub form: Option<FormData>,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_source_names() {
        assert_eq!(DataSource::Lookup.name(), "Vehicle Lookup");
        assert_eq!(DataSource::Valuation.name(), "Valuation Provider");
        assert_eq!(DataSource::Form.name(), "User Form");
    }

    #[test]
    fn test_data_source_codes() {
        assert_eq!(DataSource::Lookup.code(), "lookup");
        assert_eq!(DataSource::Valuation.code(), "valuation");
        assert_eq!(DataSource::Form.code(), "form");
    }

    #[test]
    fn test_lookup_result_deserializes_camel_case() {
        let json = r#"{
            "make": "BMW",
            "registrationNumber": "AB12 CDE",
            "fuelType": "PETROL",
            "engineCapacity": 2998,
            "monthOfFirstRegistration": "03/2018",
            "yearOfManufacture": 2018
        }"#;

        let lookup: RawLookupResult = serde_json::from_str(json).unwrap();
        assert_eq!(lookup.make.as_deref(), Some("BMW"));
        assert_eq!(lookup.registration_number.as_deref(), Some("AB12 CDE"));
        assert_eq!(lookup.engine_capacity, Some(2998));
        assert_eq!(lookup.year_of_manufacture, Some(2018));
        // Absent fields come back as None, not an error
        assert!(lookup.model.is_none());
        assert!(lookup.colour.is_none());
    }

    #[test]
    fn test_valuation_result_deserializes_estimated_value() {
        let json = r#"{
            "vrm": "AB12CDE",
            "mileage": 42000,
            "vehicleDescription": "BMW 335i M Sport [Petrol / Automatic]",
            "estimatedValue": { "private": 11500, "trade": 10200, "retail": 12900 }
        }"#;

        let valuation: RawValuationResult = serde_json::from_str(json).unwrap();
        assert_eq!(valuation.mileage, Some(42000));
        let value = valuation.estimated_value.unwrap();
        assert_eq!(value.private, 11500);
        assert_eq!(value.trade, 10200);
        assert_eq!(value.retail, 12900);
    }

    #[test]
    fn test_empty_request_deserializes() {
        let request: ValuationRequest = serde_json::from_str("{}").unwrap();
        assert!(request.lookup.is_none());
        assert!(request.valuation.is_none());
        assert!(request.form.is_none());
    }
}
