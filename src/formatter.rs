// Display Formatters - User-visible strings for listing and valuation pages
// All pure functions of their inputs; invoked fresh on each render

use crate::sources::ListingSummary;
use once_cell::sync::Lazy;
use regex::Regex;

// UK postcodes appear in location strings both with and without the
// internal space ("CM1 1HT" / "CM11HT")
static POSTCODE_SPACED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b[A-Z]{1,2}\d{1,2}[A-Z]?\s+\d[A-Z]{2}\b").unwrap());

static POSTCODE_COMPACT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b[A-Z]{1,2}\d{1,2}[A-Z]?\d[A-Z]{2}\b").unwrap());

static UNPARISHED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\(?\s*unparished area\s*\)?").unwrap());

// ============================================================================
// TITLE / SUBTITLE / VARIANT
// ============================================================================

/// Full display title: `Make Model EngineSizeL Variant Transmission`,
/// omitting any empty part. A server-supplied title is passed through.
pub fn display_title(listing: &ListingSummary) -> String {
    if let Some(title) = &listing.display_title {
        if !title.trim().is_empty() {
            return title.trim().to_string();
        }
    }

    join_non_empty(&[
        listing.make.clone(),
        listing.model.clone(),
        listing.engine_size.map(format_engine_size),
        clean_variant(listing),
        listing.transmission.clone(),
    ])
}

/// Shorter second line: `EngineSizeL Variant` when a clean variant exists,
/// otherwise `FuelType Transmission`
pub fn subtitle(listing: &ListingSummary) -> String {
    match clean_variant(listing) {
        Some(variant) => join_non_empty(&[
            listing.engine_size.map(format_engine_size),
            Some(variant),
        ]),
        None => join_non_empty(&[listing.fuel_type.clone(), listing.transmission.clone()]),
    }
}

/// Derivative-style line: engine size (omitted entirely for electric
/// vehicles), variant, then a body-style suffix
pub fn variant_display(listing: &ListingSummary) -> String {
    let electric = listing
        .fuel_type
        .as_deref()
        .map(|fuel| fuel.eq_ignore_ascii_case("electric"))
        .unwrap_or(false);

    let engine = if electric {
        None
    } else {
        listing.engine_size.map(|size| format!("{:.1}", size))
    };

    join_non_empty(&[engine, clean_variant(listing), body_style_suffix(listing)])
}

/// A variant counts as clean when present and not just the model repeated
fn clean_variant(listing: &ListingSummary) -> Option<String> {
    let variant = listing.variant.as_deref()?.trim();
    if variant.is_empty() {
        return None;
    }
    if let Some(model) = listing.model.as_deref() {
        if variant.eq_ignore_ascii_case(model.trim()) {
            return None;
        }
    }
    Some(variant.to_string())
}

/// Body-style suffix: door count when known ("5dr"), else a keyword match
/// on the body type
fn body_style_suffix(listing: &ListingSummary) -> Option<String> {
    if let Some(doors) = listing.doors {
        return Some(format!("{}dr", doors));
    }

    let body = listing.body_type.as_deref()?.to_lowercase();
    let suffix = if body.contains("estate") {
        "Estate"
    } else if body.contains("coupe") {
        "Coupe"
    } else if body.contains("convertible") || body.contains("cabriolet") {
        "Convertible"
    } else if body.contains("suv") || body.contains("4x4") {
        "SUV"
    } else if body.contains("saloon") || body.contains("sedan") {
        "Saloon"
    } else {
        return None;
    };
    Some(suffix.to_string())
}

// ============================================================================
// FIELD FORMATTERS
// ============================================================================

/// Engine size in litres for display, e.g. 1.6 → "1.6L"
pub fn format_engine_size(litres: f64) -> String {
    format!("{:.1}L", litres)
}

/// First clean town segment of a comma-separated location string, with
/// postcode tokens and the literal "unparished area" stripped
pub fn extract_town_name(location: &str) -> String {
    for segment in location.split(',') {
        let cleaned = POSTCODE_SPACED_RE.replace_all(segment, "");
        let cleaned = POSTCODE_COMPACT_RE.replace_all(&cleaned, "");
        let cleaned = UNPARISHED_RE.replace_all(&cleaned, "");
        let cleaned = cleaned.trim().trim_matches(|c| c == '(' || c == ')');
        let cleaned = cleaned.trim();
        if !cleaned.is_empty() {
            return cleaned.to_string();
        }
    }
    String::new()
}

/// Title-cased colour; absent or junk values become "Not specified"
///
/// The lookup provider has been seen returning the literal strings "null"
/// and "undefined" for unregistered colours.
pub fn format_color(color: Option<&str>) -> String {
    let raw = match color {
        Some(raw) => raw.trim(),
        None => return "Not specified".to_string(),
    };

    if raw.is_empty() {
        return "Not specified".to_string();
    }

    let lower = raw.to_lowercase();
    if lower == "null" || lower == "undefined" {
        return "Not specified".to_string();
    }

    raw.split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whole-pound GBP figure with thousands separators, e.g. 12900 → "£12,900"
pub fn format_price_gbp(amount: u32) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("£{}", grouped)
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn join_non_empty(parts: &[Option<String>]) -> String {
    parts
        .iter()
        .flatten()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn golf() -> ListingSummary {
        ListingSummary {
            display_title: None,
            make: Some("Volkswagen".to_string()),
            model: Some("Golf".to_string()),
            engine_size: Some(2.0),
            variant: Some("GTD".to_string()),
            transmission: Some("Manual".to_string()),
            fuel_type: Some("Diesel".to_string()),
            doors: Some(5),
            body_type: Some("Hatchback".to_string()),
            colour: Some("grey".to_string()),
            location: Some("Chelmsford, CM1 1HT".to_string()),
        }
    }

    #[test]
    fn test_display_title_joins_non_empty_parts() {
        assert_eq!(display_title(&golf()), "Volkswagen Golf 2.0L GTD Manual");
    }

    #[test]
    fn test_display_title_prefers_server_title() {
        let mut listing = golf();
        listing.display_title = Some("VW Golf GTD 2.0 TDI 184".to_string());
        assert_eq!(display_title(&listing), "VW Golf GTD 2.0 TDI 184");
    }

    #[test]
    fn test_display_title_omits_missing_parts() {
        let mut listing = golf();
        listing.engine_size = None;
        listing.variant = None;
        assert_eq!(display_title(&listing), "Volkswagen Golf Manual");
    }

    #[test]
    fn test_subtitle_with_clean_variant() {
        assert_eq!(subtitle(&golf()), "2.0L GTD");
    }

    #[test]
    fn test_subtitle_falls_back_to_fuel_and_transmission() {
        let mut listing = golf();
        listing.variant = None;
        assert_eq!(subtitle(&listing), "Diesel Manual");

        // A variant that merely repeats the model is not clean
        listing.variant = Some("golf".to_string());
        assert_eq!(subtitle(&listing), "Diesel Manual");
    }

    #[test]
    fn test_variant_display_regular_car() {
        assert_eq!(variant_display(&golf()), "2.0 GTD 5dr");
    }

    #[test]
    fn test_variant_display_omits_engine_size_for_electric() {
        let listing = ListingSummary {
            fuel_type: Some("Electric".to_string()),
            engine_size: Some(2.0),
            variant: Some("M50".to_string()),
            doors: Some(5),
            ..Default::default()
        };
        assert_eq!(variant_display(&listing), "M50 5dr");
    }

    #[test]
    fn test_variant_display_body_keyword_suffix() {
        let mut listing = golf();
        listing.doors = None;
        listing.body_type = Some("Sports Estate".to_string());
        assert_eq!(variant_display(&listing), "2.0 GTD Estate");

        listing.body_type = Some("Cabriolet".to_string());
        assert_eq!(variant_display(&listing), "2.0 GTD Convertible");

        listing.body_type = Some("Hatchback".to_string());
        assert_eq!(variant_display(&listing), "2.0 GTD");
    }

    #[test]
    fn test_extract_town_name_strips_postcode() {
        assert_eq!(extract_town_name("Chelmsford, CM1 1HT"), "Chelmsford");
        assert_eq!(extract_town_name("Norwich, NR21DL"), "Norwich");
    }

    #[test]
    fn test_extract_town_name_strips_unparished_area() {
        assert_eq!(
            extract_town_name("Leeds (unparished area), LS1 1AA"),
            "Leeds"
        );
    }

    #[test]
    fn test_extract_town_name_skips_postcode_only_segments() {
        assert_eq!(extract_town_name("CM1 1HT, Chelmsford"), "Chelmsford");
        assert_eq!(extract_town_name(""), "");
    }

    #[test]
    fn test_format_color_junk_inputs() {
        assert_eq!(format_color(None), "Not specified");
        assert_eq!(format_color(Some("")), "Not specified");
        assert_eq!(format_color(Some("null")), "Not specified");
        assert_eq!(format_color(Some("undefined")), "Not specified");
    }

    #[test]
    fn test_format_color_title_cases() {
        assert_eq!(format_color(Some("DARK BLUE")), "Dark Blue");
        assert_eq!(format_color(Some("red")), "Red");
        assert_eq!(format_color(Some("SoLiD black")), "Solid Black");
    }

    #[test]
    fn test_format_engine_size() {
        assert_eq!(format_engine_size(1.6), "1.6L");
        assert_eq!(format_engine_size(3.0), "3.0L");
    }

    #[test]
    fn test_format_price_gbp() {
        assert_eq!(format_price_gbp(950), "£950");
        assert_eq!(format_price_gbp(12900), "£12,900");
        assert_eq!(format_price_gbp(1250000), "£1,250,000");
    }
}
