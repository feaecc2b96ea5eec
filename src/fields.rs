// 🏛️ Field Registry - Merge precedence as data
// Each canonical vehicle field declares its ordered chain of source fallbacks

use serde::Serialize;

// ============================================================================
// FIELD AND SLOT TYPES
// ============================================================================

/// VehicleField - The canonical fields of a merged vehicle record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VehicleField {
    Make,
    Model,
    RegistrationNumber,
    FuelType,
    EngineCapacity,
    Colour,
    Transmission,
    TypeApproval,
    MonthOfFirstRegistration,
    YearOfManufacture,
    Derivative,
    Power,
}

impl VehicleField {
    /// Field name as it appears on the wire / in displays
    pub fn name(&self) -> &str {
        match self {
            VehicleField::Make => "make",
            VehicleField::Model => "model",
            VehicleField::RegistrationNumber => "registration_number",
            VehicleField::FuelType => "fuel_type",
            VehicleField::EngineCapacity => "engine_capacity",
            VehicleField::Colour => "colour",
            VehicleField::Transmission => "transmission",
            VehicleField::TypeApproval => "type_approval",
            VehicleField::MonthOfFirstRegistration => "month_of_first_registration",
            VehicleField::YearOfManufacture => "year_of_manufacture",
            VehicleField::Derivative => "derivative",
            VehicleField::Power => "power",
        }
    }
}

/// SourceSlot - One fallback position in a field's precedence chain
///
/// Slots name exactly where a value is read from, so the chain for each
/// field documents the merge contract in full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourceSlot {
    /// The field's own column on the lookup result
    Lookup,
    /// lookup.body_type (fallback for type approval)
    LookupBodyType,
    /// The parsed valuation description
    Description,
    /// The parsed form derivative
    Derivative,
    /// valuation.vrm (fallback for registration number)
    ValuationVrm,
    /// The field's own column on the form
    Form,
    /// form.vrm (fallback for registration number)
    FormVrm,
    /// form.variant (fallback for type approval)
    FormVariant,
    /// "MM/YYYY" composed from form.reg_month and form.reg_year
    FormRegPeriod,
    /// A literal default, used when every source is silent
    Literal(&'static str),
}

// ============================================================================
// FIELD DEFINITION
// ============================================================================

/// FieldDefinition - A field together with its ordered fallback chain
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub field: VehicleField,
    pub chain: &'static [SourceSlot],
    pub description: &'static str,
}

// ============================================================================
// FIELD REGISTRY
// ============================================================================

/// FieldRegistry - Single source of truth for merge precedence
///
/// The per-field order is intentional and NOT one global precedence:
/// registration number trusts the valuation provider before the form,
/// while make and model trust the parsed description before the form.
pub struct FieldRegistry {
    definitions: Vec<FieldDefinition>,
}

impl FieldRegistry {
    /// Registry with the canonical precedence chains
    pub fn new() -> Self {
        use SourceSlot::*;

        let definitions = vec![
            FieldDefinition {
                field: VehicleField::Make,
                chain: &[Lookup, Description, Form],
                description: "Manufacturer name",
            },
            FieldDefinition {
                field: VehicleField::Model,
                chain: &[Lookup, Description, Form],
                description: "Model name",
            },
            FieldDefinition {
                field: VehicleField::RegistrationNumber,
                chain: &[Lookup, ValuationVrm, FormVrm],
                description: "UK number plate (VRM)",
            },
            FieldDefinition {
                field: VehicleField::FuelType,
                chain: &[Lookup, Description, Derivative],
                description: "Fuel type",
            },
            FieldDefinition {
                field: VehicleField::EngineCapacity,
                chain: &[Lookup, Derivative],
                description: "Engine capacity in cc",
            },
            FieldDefinition {
                field: VehicleField::Colour,
                chain: &[Lookup],
                description: "Paint colour as registered",
            },
            FieldDefinition {
                field: VehicleField::Transmission,
                chain: &[Lookup, Description, Derivative, Literal("Manual")],
                description: "Gearbox type; assumed Manual when unknown",
            },
            FieldDefinition {
                field: VehicleField::TypeApproval,
                chain: &[Lookup, LookupBodyType, FormVariant],
                description: "Body classification",
            },
            FieldDefinition {
                field: VehicleField::MonthOfFirstRegistration,
                chain: &[Lookup, FormRegPeriod],
                description: "First registration period, MM/YYYY",
            },
            FieldDefinition {
                field: VehicleField::YearOfManufacture,
                chain: &[Lookup, Form],
                description: "Year of manufacture",
            },
            FieldDefinition {
                field: VehicleField::Derivative,
                chain: &[Form],
                description: "Free-text derivative as entered",
            },
            FieldDefinition {
                field: VehicleField::Power,
                chain: &[Derivative],
                description: "Power figure, e.g. \"61 PS\"",
            },
        ];

        FieldRegistry { definitions }
    }

    /// Definition for a single field
    pub fn get(&self, field: VehicleField) -> Option<&FieldDefinition> {
        self.definitions.iter().find(|d| d.field == field)
    }

    /// Fallback chain for a single field
    pub fn chain(&self, field: VehicleField) -> &'static [SourceSlot] {
        self.get(field).map(|d| d.chain).unwrap_or(&[])
    }

    /// All definitions in declaration order
    pub fn definitions(&self) -> &[FieldDefinition] {
        &self.definitions
    }

    /// Number of registered fields
    pub fn field_count(&self) -> usize {
        self.definitions.len()
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
