// Vehicle Valuation Pipeline - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod sources;      // Wire shapes of the three data providers
pub mod parser;       // Free-text derivative and description parsers
pub mod fields;       // Field registry - merge precedence as data
pub mod merge;        // Merge engine - one canonical record from three sources
pub mod classifier;   // "Not a car" keyword gate
pub mod formatter;    // Display strings for listing and valuation pages
pub mod validation;   // Form field checks and per-context requirements
pub mod store;        // SQLite-backed recent valuations cache

// Re-export commonly used types
pub use sources::{
    DataSource, EstimatedValue, FormData, ListingSummary,
    RawLookupResult, RawValuationResult, ValuationRequest,
};
pub use parser::{
    DerivativeParser, DescriptionParser, ParsedDerivative, ParsedDescription,
};
pub use fields::{FieldDefinition, FieldRegistry, SourceSlot, VehicleField};
pub use merge::{FieldProvenance, MergeEngine, MergeReport, MergedVehicleDetails};
pub use classifier::{classify, is_not_car, Classification, MatchField};
pub use formatter::{
    display_title, extract_town_name, format_color, format_engine_size,
    format_price_gbp, subtitle, variant_display,
};
pub use validation::{
    is_valid_vrm, Context, ValidationError, ValidationResult, VehicleValidator,
};
pub use store::{
    delete_valuation, get_valuation, normalize_vrm, recent_valuations,
    save_valuation, setup_database, verify_count, SavedValuation,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
