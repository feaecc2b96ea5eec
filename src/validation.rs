// 📐 Validation - Form field checks and per-context requirements
// Validates user-entered form data and merged records against the
// requirements of the page about to render

use crate::merge::MergedVehicleDetails;
use crate::sources::FormData;
use chrono::{Datelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

// ============================================================================
// CONTEXT TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    /// Valuation result page - needs enough identity to price the vehicle
    Valuation,
    /// Listing detail display - needs the headline identification fields
    Listing,
    /// Vehicle history report - needs the registered identity in full
    Report,
}

impl Context {
    pub fn name(&self) -> &str {
        match self {
            Context::Valuation => "Valuation",
            Context::Listing => "Listing",
            Context::Report => "Report",
        }
    }
}

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub context: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.context, self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), Vec<ValidationError>>;

// ============================================================================
// VRM PATTERNS
// ============================================================================

// Current (AB12 CDE), prefix (A123 BCD), suffix (ABC 123D) and the two
// dateless layouts. Checked against the uppercased, trimmed input.
static VRM_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^[A-Z]{2}\d{2}\s?[A-Z]{3}$",
        r"^[A-Z]\d{1,3}\s?[A-Z]{3}$",
        r"^[A-Z]{3}\s?\d{1,3}[A-Z]$",
        r"^\d{1,4}\s?[A-Z]{1,3}$",
        r"^[A-Z]{1,3}\s?\d{1,4}$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// Whether a string is shaped like a UK number plate
pub fn is_valid_vrm(vrm: &str) -> bool {
    let candidate = vrm.trim().to_uppercase();
    if candidate.is_empty() {
        return false;
    }
    VRM_PATTERNS.iter().any(|pattern| pattern.is_match(&candidate))
}

// ============================================================================
// VEHICLE VALIDATOR
// ============================================================================

const MAX_MILEAGE: u32 = 500_000;
const MIN_REG_YEAR: u32 = 1900;

pub struct VehicleValidator {
    current_year: u32,
}

impl VehicleValidator {
    pub fn new() -> Self {
        VehicleValidator {
            current_year: Utc::now().year() as u32,
        }
    }

    /// Pin the year bound, for deterministic tests
    pub fn with_current_year(current_year: u32) -> Self {
        VehicleValidator { current_year }
    }

    /// Validate user-entered form fields
    ///
    /// Absent fields are fine (the merge layer degrades gracefully);
    /// present fields must be well-formed.
    pub fn validate_form(&self, form: &FormData) -> ValidationResult {
        let mut errors = Vec::new();

        if let Some(vrm) = form.vrm.as_deref() {
            if !vrm.trim().is_empty() && !is_valid_vrm(vrm) {
                errors.push(ValidationError {
                    field: "vrm".to_string(),
                    message: format!("Not a recognised UK registration: {}", vrm.trim()),
                    context: "Form".to_string(),
                });
            }
        }

        if let Some(mileage) = form.mileage {
            if mileage > MAX_MILEAGE {
                errors.push(ValidationError {
                    field: "mileage".to_string(),
                    message: format!("Must be at most {}, got {}", MAX_MILEAGE, mileage),
                    context: "Form".to_string(),
                });
            }
        }

        if let Some(year) = form.reg_year.as_deref() {
            let year = year.trim();
            if !year.is_empty() {
                match year.parse::<u32>() {
                    Ok(value) if (MIN_REG_YEAR..=self.current_year).contains(&value) => {}
                    _ => errors.push(ValidationError {
                        field: "reg_year".to_string(),
                        message: format!(
                            "Must be a year between {} and {}",
                            MIN_REG_YEAR, self.current_year
                        ),
                        context: "Form".to_string(),
                    }),
                }
            }
        }

        if let Some(month) = form.reg_month.as_deref() {
            let month = month.trim();
            if !month.is_empty() {
                match month.parse::<u32>() {
                    Ok(value) if (1..=12).contains(&value) => {}
                    _ => errors.push(ValidationError {
                        field: "reg_month".to_string(),
                        message: "Must be a month between 1 and 12".to_string(),
                        context: "Form".to_string(),
                    }),
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate a merged record against a page context's requirements
    pub fn validate_context(
        &self,
        details: &MergedVehicleDetails,
        context: Context,
    ) -> ValidationResult {
        let mut errors = Vec::new();
        let context_name = context.name();

        let mut require = |field: &str, value: &str, message: &str| {
            if value.is_empty() {
                errors.push(ValidationError {
                    field: field.to_string(),
                    message: message.to_string(),
                    context: context_name.to_string(),
                });
            }
        };

        match context {
            Context::Valuation => {
                require("make", &details.make, "Required to price a vehicle");
                require("model", &details.model, "Required to price a vehicle");
                require(
                    "year_of_manufacture",
                    &details.year_of_manufacture,
                    "Required to price a vehicle",
                );
            }
            Context::Listing => {
                require("make", &details.make, "Required for listing display");
                require("model", &details.model, "Required for listing display");
            }
            Context::Report => {
                require(
                    "registration_number",
                    &details.registration_number,
                    "Required for a history report",
                );
                require("make", &details.make, "Required for a history report");
                require("model", &details.model, "Required for a history report");
                require(
                    "year_of_manufacture",
                    &details.year_of_manufacture,
                    "Required for a history report",
                );
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Convenience method: validate form + merged record in one call
    pub fn validate(
        &self,
        form: &FormData,
        details: &MergedVehicleDetails,
        context: Context,
    ) -> ValidationResult {
        let mut errors = Vec::new();

        if let Err(mut form_errors) = self.validate_form(form) {
            errors.append(&mut form_errors);
        }
        if let Err(mut context_errors) = self.validate_context(details, context) {
            errors.append(&mut context_errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for VehicleValidator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
