// 🔍 Free-Text Parsers
// Extract structured vehicle fields from provider-supplied description strings

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// ============================================================================
// PARSED FRAGMENTS
// ============================================================================

/// ParsedDerivative - Output of DerivativeParser::parse()
///
/// Partial by design: only the fields the text actually yielded are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedDerivative {
    /// Canonical fuel type: "Petrol", "Diesel", "Electric", "Hybrid"
    pub fuel_type: Option<String>,
    /// "Automatic" or "Manual"
    pub transmission: Option<String>,
    /// Engine capacity in cc
    pub engine_capacity: Option<u32>,
    /// e.g. "61 PS"
    pub power: Option<String>,
}

/// ParsedDescription - Output of DescriptionParser::parse()
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedDescription {
    pub make: Option<String>,
    pub model: Option<String>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
}

// ============================================================================
// KEYWORD TABLES
// ============================================================================

/// Fuel keywords checked in order; first match wins. A string carrying two
/// keywords (e.g. "Petrol Hybrid") resolves to the earlier table entry.
const FUEL_KEYWORDS: &[(&str, &str)] = &[
    ("petrol", "Petrol"),
    ("diesel", "Diesel"),
    ("tdi", "Diesel"),
    ("electric", "Electric"),
    ("hybrid", "Hybrid"),
];

static ENGINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+\.?\d*)\s*(cc|litre|l)?").unwrap());

static POWER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\((\d+)\s*(ps|bhp|hp)\)").unwrap());

// ============================================================================
// DERIVATIVE PARSER
// ============================================================================

/// DerivativeParser - Extracts fuel, transmission, engine capacity and power
/// from a free-text derivative string such as
/// `"865 Custom Cruiser Petrol Manual (61 ps)"`.
///
/// Total: any input (including empty) yields a ParsedDerivative, never an error.
pub struct DerivativeParser;

impl DerivativeParser {
    pub fn new() -> Self {
        DerivativeParser
    }

    /// Parse a derivative string into its structured fields
    pub fn parse(&self, text: &str) -> ParsedDerivative {
        if text.trim().is_empty() {
            return ParsedDerivative::default();
        }

        ParsedDerivative {
            fuel_type: self.extract_fuel_type(text),
            transmission: self.extract_transmission(text),
            engine_capacity: self.extract_engine_capacity(text),
            power: self.extract_power(text),
        }
    }

    /// First fuel keyword present in the text, checked in table order
    fn extract_fuel_type(&self, text: &str) -> Option<String> {
        let lower = text.to_lowercase();
        FUEL_KEYWORDS
            .iter()
            .find(|(keyword, _)| lower.contains(keyword))
            .map(|(_, canonical)| canonical.to_string())
    }

    /// "auto" is checked before "manual"; "auto" also covers "automatic"
    fn extract_transmission(&self, text: &str) -> Option<String> {
        let lower = text.to_lowercase();
        if lower.contains("auto") {
            Some("Automatic".to_string())
        } else if lower.contains("manual") {
            Some("Manual".to_string())
        } else {
            None
        }
    }

    /// First numeric token; values below 10 are litres and scale to cc
    fn extract_engine_capacity(&self, text: &str) -> Option<u32> {
        let captures = ENGINE_RE.captures(text)?;
        let number: f64 = captures.get(1)?.as_str().parse().ok()?;

        if number < 10.0 {
            Some((number * 1000.0).round() as u32)
        } else {
            Some(number.round() as u32)
        }
    }

    /// Bracketed power figure, unit uppercased: "(61 ps)" → "61 PS"
    fn extract_power(&self, text: &str) -> Option<String> {
        let captures = POWER_RE.captures(text)?;
        let figure = captures.get(1)?.as_str();
        let unit = captures.get(2)?.as_str().to_uppercase();
        Some(format!("{} {}", figure, unit))
    }
}

impl Default for DerivativeParser {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// DESCRIPTION PARSER
// ============================================================================

/// DescriptionParser - Splits a valuation-provider description such as
/// `"BMW 335i M Sport Auto 335I M Sport [Petrol / Automatic]"` into
/// make, model, fuel type and transmission.
///
/// A string with no bracketed segment yields an empty result.
pub struct DescriptionParser;

impl DescriptionParser {
    pub fn new() -> Self {
        DescriptionParser
    }

    /// Parse a bracketed vehicle description
    pub fn parse(&self, text: &str) -> ParsedDescription {
        let open = match text.find('[') {
            Some(pos) => pos,
            None => return ParsedDescription::default(),
        };
        let close = match text[open..].find(']') {
            Some(pos) => open + pos,
            None => return ParsedDescription::default(),
        };

        // "[Petrol / Automatic]" → fuel, transmission
        let bracketed = &text[open + 1..close];
        let mut parts = bracketed.split('/').map(str::trim);
        let fuel_type = parts.next().filter(|s| !s.is_empty()).map(String::from);
        let transmission = parts.next().filter(|s| !s.is_empty()).map(String::from);

        // Remainder: first whitespace-delimited token is the make,
        // everything after it is the model
        let remainder = format!("{} {}", &text[..open], &text[close + 1..]);
        let mut tokens = remainder.split_whitespace();
        let make = tokens.next().map(String::from);
        let model_tokens: Vec<&str> = tokens.collect();
        let model = if model_tokens.is_empty() {
            None
        } else {
            Some(model_tokens.join(" "))
        };

        ParsedDescription {
            make,
            model,
            fuel_type,
            transmission,
        }
    }
}

impl Default for DescriptionParser {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivative_full_string() {
        let parser = DerivativeParser::new();
        let parsed = parser.parse("865 Custom Cruiser Petrol Manual (61 ps)");

        assert_eq!(parsed.fuel_type.as_deref(), Some("Petrol"));
        assert_eq!(parsed.transmission.as_deref(), Some("Manual"));
        assert_eq!(parsed.engine_capacity, Some(865));
        assert_eq!(parsed.power.as_deref(), Some("61 PS"));
    }

    #[test]
    fn test_derivative_fuel_keywords() {
        let parser = DerivativeParser::new();

        assert_eq!(
            parser.parse("2.0 Sport Diesel").fuel_type.as_deref(),
            Some("Diesel")
        );
        assert_eq!(
            parser.parse("1.9 TDI SE").fuel_type.as_deref(),
            Some("Diesel")
        );
        assert_eq!(
            parser.parse("Long Range Electric Auto").fuel_type.as_deref(),
            Some("Electric")
        );
        assert_eq!(
            parser.parse("2.5 Hybrid Excel").fuel_type.as_deref(),
            Some("Hybrid")
        );
        assert_eq!(parser.parse("2.0 Sport").fuel_type, None);
    }

    #[test]
    fn test_derivative_fuel_ambiguity_first_keyword_wins() {
        // Both keywords present: table order decides, petrol is checked first
        let parser = DerivativeParser::new();
        let parsed = parser.parse("1.8 Petrol Hybrid CVT");
        assert_eq!(parsed.fuel_type.as_deref(), Some("Petrol"));
    }

    #[test]
    fn test_derivative_transmission_auto_before_manual() {
        let parser = DerivativeParser::new();

        assert_eq!(
            parser.parse("2.0 Automatic").transmission.as_deref(),
            Some("Automatic")
        );
        assert_eq!(
            parser.parse("320d Auto").transmission.as_deref(),
            Some("Automatic")
        );
        assert_eq!(
            parser.parse("1.2 Manual 5dr").transmission.as_deref(),
            Some("Manual")
        );
        assert_eq!(parser.parse("1.2 SE 5dr").transmission, None);
    }

    #[test]
    fn test_derivative_litres_scale_to_cc() {
        let parser = DerivativeParser::new();

        assert_eq!(parser.parse("1.6 TDI SE").engine_capacity, Some(1600));
        assert_eq!(parser.parse("2.0L Sport").engine_capacity, Some(2000));
        assert_eq!(parser.parse("0.9 TCe").engine_capacity, Some(900));
    }

    #[test]
    fn test_derivative_cc_values_kept() {
        let parser = DerivativeParser::new();

        assert_eq!(parser.parse("865 Custom Cruiser").engine_capacity, Some(865));
        assert_eq!(parser.parse("1200cc Tourer").engine_capacity, Some(1200));
        assert_eq!(parser.parse("125 Sport").engine_capacity, Some(125));
    }

    #[test]
    fn test_derivative_no_numeric_token() {
        let parser = DerivativeParser::new();
        let parsed = parser.parse("Sport Tourer Special Edition");
        assert_eq!(parsed.engine_capacity, None);
    }

    #[test]
    fn test_derivative_power_units_uppercased() {
        let parser = DerivativeParser::new();

        assert_eq!(
            parser.parse("Street Twin (65 bhp)").power.as_deref(),
            Some("65 BHP")
        );
        assert_eq!(
            parser.parse("865 Cruiser (61 ps)").power.as_deref(),
            Some("61 PS")
        );
        assert_eq!(
            parser.parse("Roadster (110 HP)").power.as_deref(),
            Some("110 HP")
        );
        // Bare figure without a unit in brackets is not a power figure
        assert_eq!(parser.parse("Roadster (2019)").power, None);
    }

    #[test]
    fn test_derivative_empty_input() {
        let parser = DerivativeParser::new();

        assert_eq!(parser.parse(""), ParsedDerivative::default());
        assert_eq!(parser.parse("   "), ParsedDerivative::default());
    }

    #[test]
    fn test_description_full_string() {
        let parser = DescriptionParser::new();
        let parsed =
            parser.parse("BMW 335i M Sport Auto 335I M Sport [Petrol / Automatic]");

        assert_eq!(parsed.make.as_deref(), Some("BMW"));
        assert_eq!(parsed.model.as_deref(), Some("335i M Sport Auto 335I M Sport"));
        assert_eq!(parsed.fuel_type.as_deref(), Some("Petrol"));
        assert_eq!(parsed.transmission.as_deref(), Some("Automatic"));
    }

    #[test]
    fn test_description_no_bracket_yields_empty() {
        let parser = DescriptionParser::new();
        let parsed = parser.parse("Ford Fiesta Zetec");
        assert_eq!(parsed, ParsedDescription::default());
    }

    #[test]
    fn test_description_bracket_without_transmission() {
        let parser = DescriptionParser::new();
        let parsed = parser.parse("Nissan Leaf Tekna [Electric]");

        assert_eq!(parsed.make.as_deref(), Some("Nissan"));
        assert_eq!(parsed.model.as_deref(), Some("Leaf Tekna"));
        assert_eq!(parsed.fuel_type.as_deref(), Some("Electric"));
        assert_eq!(parsed.transmission, None);
    }

    #[test]
    fn test_description_unclosed_bracket_yields_empty() {
        let parser = DescriptionParser::new();
        let parsed = parser.parse("Audi A4 [Diesel / Manual");
        assert_eq!(parsed, ParsedDescription::default());
    }

    #[test]
    fn test_description_make_only() {
        let parser = DescriptionParser::new();
        let parsed = parser.parse("Tesla [Electric / Automatic]");

        assert_eq!(parsed.make.as_deref(), Some("Tesla"));
        assert_eq!(parsed.model, None);
    }
}
