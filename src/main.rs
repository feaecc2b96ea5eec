use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use std::env;
use std::fs;
use std::path::PathBuf;

use vehicle_valuation::{
    classify, display_title, format_color, format_price_gbp, recent_valuations,
    save_valuation, setup_database, subtitle, variant_display, verify_count,
    MergeEngine, SavedValuation, ValuationRequest, VehicleValidator,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("value") => {
            let input = args
                .get(2)
                .context("Usage: vehicle-valuation value <input.json>")?;
            run_value(input)
        }
        Some("recent") => run_recent(),
        Some("show") => {
            let vrm = args
                .get(2)
                .context("Usage: vehicle-valuation show <VRM>")?;
            run_show(vrm)
        }
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("🚗 Vehicle Valuation Pipeline v{}", vehicle_valuation::VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Usage:");
    println!("  vehicle-valuation value <input.json>   Run the pipeline over source records");
    println!("  vehicle-valuation recent               List cached valuations");
    println!("  vehicle-valuation show <VRM>           Show one cached valuation");
    println!();
    println!("Database path comes from VALUATIONS_DB (default: valuations.db)");
}

fn db_path() -> PathBuf {
    env::var("VALUATIONS_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("valuations.db"))
}

fn open_store() -> Result<Connection> {
    let path = db_path();
    let conn = Connection::open(&path)
        .with_context(|| format!("Failed to open database at {}", path.display()))?;
    setup_database(&conn)?;
    Ok(conn)
}

fn run_value(input_path: &str) -> Result<()> {
    println!("🚗 Vehicle Valuation Pipeline");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Load the three source records
    let raw = fs::read_to_string(input_path)
        .with_context(|| format!("Failed to read input file: {}", input_path))?;
    let request: ValuationRequest =
        serde_json::from_str(&raw).context("Failed to parse input JSON")?;

    if request.lookup.is_none() && request.valuation.is_none() && request.form.is_none() {
        bail!("Input holds no source records - nothing to merge");
    }

    // 2. Validate user-entered form fields
    if let Some(form) = &request.form {
        let validator = VehicleValidator::new();
        if let Err(errors) = validator.validate_form(form) {
            eprintln!("❌ Form validation failed:");
            for error in &errors {
                eprintln!("   {}", error);
            }
            bail!("{} invalid form field(s)", errors.len());
        }
    }

    // 3. Merge
    let engine = MergeEngine::new();
    let report = engine.merge(
        request.lookup.as_ref(),
        request.valuation.as_ref(),
        request.form.as_ref(),
    );
    println!("\n✓ {}", report.summary());

    if report.details.is_unidentified() {
        bail!("Sources did not identify a vehicle - go back a step and try again");
    }

    let listing = report.details.to_listing();
    println!("\n  Title:        {}", display_title(&listing));
    println!("  Subtitle:     {}", subtitle(&listing));
    let variant = variant_display(&listing);
    if !variant.is_empty() {
        println!("  Variant:      {}", variant);
    }
    println!("  Colour:       {}", format_color(listing.colour.as_deref()));
    if !report.details.registration_number.is_empty() {
        println!("  Registration: {}", report.details.registration_number);
    }
    if !report.details.month_of_first_registration.is_empty() {
        println!(
            "  First reg:    {}",
            report.details.month_of_first_registration
        );
    }

    println!("\n  Field sources:");
    for provenance in &report.provenance {
        println!(
            "    {:28} ← {:?}",
            provenance.field.name(),
            provenance.slot
        );
    }

    // 4. Valuation gate
    let classification = classify(Some(&report.details));
    if classification.is_not_car {
        if let Some((field, keyword)) = &classification.matched {
            println!(
                "\n⚠️  Not a car ({:?} matched \"{}\") - valuations are only offered for cars",
                field, keyword
            );
        }
        return Ok(());
    }

    // 5. Show the estimate and cache the result
    let estimated_value = request.valuation.as_ref().and_then(|v| v.estimated_value);
    if let Some(value) = &estimated_value {
        println!("\n💷 Estimated value:");
        println!("   Private sale: {}", format_price_gbp(value.private));
        println!("   Trade-in:     {}", format_price_gbp(value.trade));
        println!("   Retail:       {}", format_price_gbp(value.retail));
    }

    if !report.details.registration_number.is_empty() {
        let conn = open_store()?;
        let saved = SavedValuation::new(
            &report.details.registration_number,
            request.valuation.as_ref().and_then(|v| v.mileage),
            report.details.clone(),
            estimated_value,
        );
        save_valuation(&conn, &saved)?;
        println!("\n✓ Cached valuation for {}", saved.vrm);
    }

    Ok(())
}

fn run_recent() -> Result<()> {
    let conn = open_store()?;
    let valuations = recent_valuations(&conn, 10)?;
    let total = verify_count(&conn)?;

    println!("🕐 Recent valuations ({} cached)", total);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if valuations.is_empty() {
        println!("No cached valuations yet. Run: vehicle-valuation value <input.json>");
        return Ok(());
    }

    for valuation in valuations {
        let listing = valuation.details.to_listing();
        let retail = valuation
            .estimated_value
            .map(|value| format_price_gbp(value.retail))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:10} {:40} {:>10}  {}",
            valuation.vrm,
            display_title(&listing),
            retail,
            valuation.saved_at.format("%Y-%m-%d")
        );
    }

    Ok(())
}

fn run_show(vrm: &str) -> Result<()> {
    let conn = open_store()?;
    let valuation = vehicle_valuation::get_valuation(&conn, vrm)?
        .with_context(|| format!("No cached valuation for {}", vrm))?;

    let listing = valuation.details.to_listing();
    println!("🚗 {}", display_title(&listing));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Registration: {}", valuation.vrm);
    if let Some(mileage) = valuation.mileage {
        println!("  Mileage:      {} miles", mileage);
    }
    println!("  Colour:       {}", format_color(listing.colour.as_deref()));
    if let Some(value) = valuation.estimated_value {
        println!("  Private sale: {}", format_price_gbp(value.private));
        println!("  Trade-in:     {}", format_price_gbp(value.trade));
        println!("  Retail:       {}", format_price_gbp(value.retail));
    }
    println!("  Saved:        {}", valuation.saved_at.format("%Y-%m-%d %H:%M"));

    Ok(())
}
