// ⚖️ Merge Engine - One canonical record from three overlapping sources
//
// Per-field precedence is registry-driven (see fields.rs). The order differs
// between fields on purpose: each provider is authoritative for different
// data, so registration number trusts the valuation provider before the form
// while make and model trust the parsed description before the form.

use crate::fields::{FieldRegistry, SourceSlot, VehicleField};
use crate::parser::{DerivativeParser, DescriptionParser, ParsedDerivative, ParsedDescription};
use crate::sources::{FormData, ListingSummary, RawLookupResult, RawValuationResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// MERGED RECORD
// ============================================================================

/// MergedVehicleDetails - The canonical record consumed by display code
///
/// Derived, never created independently. A field is an empty string only when
/// every source in its chain was silent; `undefined` never reaches a render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergedVehicleDetails {
    pub make: String,
    pub model: String,
    pub registration_number: String,
    pub fuel_type: String,
    /// Engine capacity in cc; None when no source supplied one
    pub engine_capacity: Option<u32>,
    pub colour: String,
    pub transmission: String,
    pub type_approval: String,
    pub month_of_first_registration: String,
    pub year_of_manufacture: String,
    pub derivative: String,
    pub power: String,
}

impl MergedVehicleDetails {
    /// Engine size in litres, e.g. 1598cc → 1.6
    pub fn engine_size_litres(&self) -> Option<f64> {
        self.engine_capacity
            .map(|cc| (cc as f64 / 1000.0 * 10.0).round() / 10.0)
    }

    /// True when no source contributed anything identifying
    ///
    /// Calling pages use this as the redirect-to-earlier-step presence check.
    pub fn is_unidentified(&self) -> bool {
        self.make.is_empty() && self.model.is_empty() && self.registration_number.is_empty()
    }

    /// Listing-shaped view of this record for the display formatters
    pub fn to_listing(&self) -> ListingSummary {
        fn opt(s: &str) -> Option<String> {
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        }

        ListingSummary {
            display_title: None,
            make: opt(&self.make),
            model: opt(&self.model),
            engine_size: self.engine_size_litres(),
            variant: opt(&self.derivative),
            transmission: opt(&self.transmission),
            fuel_type: opt(&self.fuel_type),
            doors: None,
            body_type: opt(&self.type_approval),
            colour: opt(&self.colour),
            location: None,
        }
    }
}

// ============================================================================
// MERGE REPORT
// ============================================================================

/// Which slot supplied a resolved field
#[derive(Debug, Clone, Serialize)]
pub struct FieldProvenance {
    pub field: VehicleField,
    pub slot: SourceSlot,
}

/// MergeReport - The merged record plus where every field came from
#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    pub details: MergedVehicleDetails,
    pub provenance: Vec<FieldProvenance>,
    pub merged_at: DateTime<Utc>,
}

impl MergeReport {
    /// Slot that supplied a field, if it resolved at all
    pub fn slot_for(&self, field: VehicleField) -> Option<SourceSlot> {
        self.provenance
            .iter()
            .find(|p| p.field == field)
            .map(|p| p.slot)
    }

    pub fn resolved_count(&self) -> usize {
        self.provenance.len()
    }

    pub fn summary(&self) -> String {
        let plate = if self.details.registration_number.is_empty() {
            "unregistered vehicle"
        } else {
            self.details.registration_number.as_str()
        };
        format!(
            "Merged {}: {} {} ({} of 12 fields resolved)",
            plate,
            self.details.make,
            self.details.model,
            self.resolved_count()
        )
    }
}

// ============================================================================
// MERGE ENGINE
// ============================================================================

/// MergeEngine - Pure and total: never errors, never panics, regardless of
/// which sources are absent. Merging identical inputs twice yields identical
/// output.
pub struct MergeEngine {
    registry: FieldRegistry,
    derivative_parser: DerivativeParser,
    description_parser: DescriptionParser,
}

impl MergeEngine {
    pub fn new() -> Self {
        MergeEngine {
            registry: FieldRegistry::new(),
            derivative_parser: DerivativeParser::new(),
            description_parser: DescriptionParser::new(),
        }
    }

    /// Merge the three source records into one canonical vehicle record
    pub fn merge(
        &self,
        lookup: Option<&RawLookupResult>,
        valuation: Option<&RawValuationResult>,
        form: Option<&FormData>,
    ) -> MergeReport {
        let derivative = form
            .and_then(|f| f.derivative.as_deref())
            .map(|text| self.derivative_parser.parse(text))
            .unwrap_or_default();

        let description = valuation
            .and_then(|v| v.vehicle_description.as_deref())
            .map(|text| self.description_parser.parse(text))
            .unwrap_or_default();

        let context = MergeContext {
            lookup,
            valuation,
            form,
            derivative,
            description,
        };

        let mut provenance = Vec::new();

        let mut resolve = |field: VehicleField| -> String {
            for slot in self.registry.chain(field) {
                if let Some(value) = context.slot_value(field, *slot) {
                    provenance.push(FieldProvenance { field, slot: *slot });
                    return value;
                }
            }
            String::new()
        };

        let make = resolve(VehicleField::Make);
        let model = resolve(VehicleField::Model);
        let registration_number = resolve(VehicleField::RegistrationNumber);
        let fuel_type = resolve(VehicleField::FuelType);
        let colour = resolve(VehicleField::Colour);
        let transmission = resolve(VehicleField::Transmission);
        let type_approval = resolve(VehicleField::TypeApproval);
        let month_of_first_registration = resolve(VehicleField::MonthOfFirstRegistration);
        let year_of_manufacture = resolve(VehicleField::YearOfManufacture);
        let derivative_text = resolve(VehicleField::Derivative);
        let power = resolve(VehicleField::Power);

        // Engine capacity is numeric; same chain discipline, no string round-trip
        let mut engine_capacity = None;
        for slot in self.registry.chain(VehicleField::EngineCapacity) {
            let value = match slot {
                SourceSlot::Lookup => context.lookup.and_then(|l| l.engine_capacity),
                SourceSlot::Derivative => context.derivative.engine_capacity,
                _ => None,
            };
            if let Some(cc) = value {
                provenance.push(FieldProvenance {
                    field: VehicleField::EngineCapacity,
                    slot: *slot,
                });
                engine_capacity = Some(cc);
                break;
            }
        }

        MergeReport {
            details: MergedVehicleDetails {
                make,
                model,
                registration_number,
                fuel_type,
                engine_capacity,
                colour,
                transmission,
                type_approval,
                month_of_first_registration,
                year_of_manufacture,
                derivative: derivative_text,
                power,
            },
            provenance,
            merged_at: Utc::now(),
        }
    }
}

impl Default for MergeEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// MERGE CONTEXT
// ============================================================================

/// One merge invocation's view of the sources and their parsed fragments
struct MergeContext<'a> {
    lookup: Option<&'a RawLookupResult>,
    valuation: Option<&'a RawValuationResult>,
    form: Option<&'a FormData>,
    derivative: ParsedDerivative,
    description: ParsedDescription,
}

impl MergeContext<'_> {
    /// Value a slot holds for a field; blank strings count as absent so the
    /// chain falls through to the next source
    fn slot_value(&self, field: VehicleField, slot: SourceSlot) -> Option<String> {
        let value = match slot {
            SourceSlot::Lookup => self.lookup_value(field),
            SourceSlot::LookupBodyType => self.lookup.and_then(|l| l.body_type.clone()),
            SourceSlot::Description => self.description_value(field),
            SourceSlot::Derivative => self.derivative_value(field),
            SourceSlot::ValuationVrm => self.valuation.and_then(|v| v.vrm.clone()),
            SourceSlot::Form => self.form_value(field),
            SourceSlot::FormVrm => self.form.and_then(|f| f.vrm.clone()),
            SourceSlot::FormVariant => self.form.and_then(|f| f.variant.clone()),
            SourceSlot::FormRegPeriod => self.form_reg_period(),
            SourceSlot::Literal(text) => Some(text.to_string()),
        };

        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn lookup_value(&self, field: VehicleField) -> Option<String> {
        let lookup = self.lookup?;
        match field {
            VehicleField::Make => lookup.make.clone(),
            VehicleField::Model => lookup.model.clone(),
            VehicleField::RegistrationNumber => lookup.registration_number.clone(),
            VehicleField::FuelType => lookup.fuel_type.clone(),
            VehicleField::Colour => lookup.colour.clone(),
            VehicleField::Transmission => lookup.transmission.clone(),
            VehicleField::TypeApproval => lookup.type_approval.clone(),
            VehicleField::MonthOfFirstRegistration => {
                lookup.month_of_first_registration.clone()
            }
            VehicleField::YearOfManufacture => {
                lookup.year_of_manufacture.map(|year| year.to_string())
            }
            _ => None,
        }
    }

    fn description_value(&self, field: VehicleField) -> Option<String> {
        match field {
            VehicleField::Make => self.description.make.clone(),
            VehicleField::Model => self.description.model.clone(),
            VehicleField::FuelType => self.description.fuel_type.clone(),
            VehicleField::Transmission => self.description.transmission.clone(),
            _ => None,
        }
    }

    fn derivative_value(&self, field: VehicleField) -> Option<String> {
        match field {
            VehicleField::FuelType => self.derivative.fuel_type.clone(),
            VehicleField::Transmission => self.derivative.transmission.clone(),
            VehicleField::Power => self.derivative.power.clone(),
            _ => None,
        }
    }

    fn form_value(&self, field: VehicleField) -> Option<String> {
        let form = self.form?;
        match field {
            VehicleField::Make => form.make.clone(),
            VehicleField::Model => form.model.clone(),
            VehicleField::YearOfManufacture => form.reg_year.clone(),
            VehicleField::Derivative => form.derivative.clone(),
            _ => None,
        }
    }

    fn form_reg_period(&self) -> Option<String> {
        let form = self.form?;
        match (form.reg_month.as_deref(), form.reg_year.as_deref()) {
            (Some(month), Some(year))
                if !month.trim().is_empty() && !year.trim().is_empty() =>
            {
                Some(format!("{}/{}", month.trim(), year.trim()))
            }
            _ => None,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
