// Vehicle Valuation Pipeline - Web Server
// JSON API over the merge/classify/format pipeline and the valuations cache

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use vehicle_valuation::{
    classify, display_title, format_color, format_price_gbp, get_valuation,
    recent_valuations, save_valuation, setup_database, subtitle, variant_display,
    EstimatedValue, MergeEngine, MergedVehicleDetails, SavedValuation,
    ValuationRequest, VehicleValidator,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn err(message: String) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message),
        }
    }
}

/// Display strings rendered from a merged record
#[derive(Serialize, Deserialize)]
struct DisplayStrings {
    title: String,
    subtitle: String,
    variant: String,
    colour: String,
}

/// Formatted GBP value bands
#[derive(Serialize, Deserialize)]
struct FormattedValue {
    private: String,
    trade: String,
    retail: String,
}

/// Valuation response: merged record + gate decision + render-ready strings
#[derive(Serialize, Deserialize)]
struct ValuationResponse {
    details: MergedVehicleDetails,
    is_not_car: bool,
    display: DisplayStrings,
    #[serde(skip_serializing_if = "Option::is_none")]
    estimated_value: Option<FormattedValue>,
}

/// Summary row for the recent-valuations list
#[derive(Serialize)]
struct RecentValuationResponse {
    vrm: String,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    mileage: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retail: Option<String>,
    saved_at: String,
}

fn build_response(
    details: MergedVehicleDetails,
    estimated_value: Option<EstimatedValue>,
) -> ValuationResponse {
    let listing = details.to_listing();
    let classification = classify(Some(&details));

    // Valuations are only offered for cars
    let estimated_value = if classification.is_not_car {
        None
    } else {
        estimated_value.map(|value| FormattedValue {
            private: format_price_gbp(value.private),
            trade: format_price_gbp(value.trade),
            retail: format_price_gbp(value.retail),
        })
    };

    ValuationResponse {
        is_not_car: classification.is_not_car,
        display: DisplayStrings {
            title: display_title(&listing),
            subtitle: subtitle(&listing),
            variant: variant_display(&listing),
            colour: format_color(listing.colour.as_deref()),
        },
        details,
        estimated_value,
    }
}

impl From<SavedValuation> for RecentValuationResponse {
    fn from(valuation: SavedValuation) -> Self {
        let listing = valuation.details.to_listing();
        Self {
            vrm: valuation.vrm,
            title: display_title(&listing),
            mileage: valuation.mileage,
            retail: valuation
                .estimated_value
                .map(|value| format_price_gbp(value.retail)),
            saved_at: valuation.saved_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// POST /api/valuations - Run the pipeline over the three source records
async fn create_valuation(
    State(state): State<AppState>,
    Json(request): Json<ValuationRequest>,
) -> impl IntoResponse {
    if let Some(form) = &request.form {
        let validator = VehicleValidator::new();
        if let Err(errors) = validator.validate_form(form) {
            let message = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::err(message)),
            )
                .into_response();
        }
    }

    let engine = MergeEngine::new();
    let report = engine.merge(
        request.lookup.as_ref(),
        request.valuation.as_ref(),
        request.form.as_ref(),
    );

    if report.details.is_unidentified() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::err(
                "Sources did not identify a vehicle".to_string(),
            )),
        )
            .into_response();
    }

    let estimated_value = request.valuation.as_ref().and_then(|v| v.estimated_value);
    let response = build_response(report.details.clone(), estimated_value);

    // Cache car valuations by plate, like the frontend's recent searches
    if !response.is_not_car && !report.details.registration_number.is_empty() {
        let saved = SavedValuation::new(
            &report.details.registration_number.clone(),
            request.valuation.as_ref().and_then(|v| v.mileage),
            report.details,
            estimated_value,
        );
        let conn = state.db.lock().unwrap();
        if let Err(e) = save_valuation(&conn, &saved) {
            eprintln!("Error caching valuation for {}: {}", saved.vrm, e);
        }
    }

    (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
}

/// GET /api/valuations - Recent cached valuations
async fn list_valuations(State(state): State<AppState>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    match recent_valuations(&conn, 20) {
        Ok(valuations) => {
            let response: Vec<RecentValuationResponse> =
                valuations.into_iter().map(|v| v.into()).collect();
            (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
        }
        Err(e) => {
            eprintln!("Error listing valuations: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::ok(Vec::<RecentValuationResponse>::new())),
            )
                .into_response()
        }
    }
}

/// GET /api/valuations/:vrm - One cached valuation by plate
async fn get_valuation_by_vrm(
    State(state): State<AppState>,
    Path(vrm): Path<String>,
) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    match get_valuation(&conn, &vrm) {
        Ok(Some(valuation)) => {
            let response = build_response(valuation.details, valuation.estimated_value);
            (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err(format!("No cached valuation for {}", vrm))),
        )
            .into_response(),
        Err(e) => {
            eprintln!("Error loading valuation for {}: {}", vrm, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err("Storage error".to_string())),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("🌐 Vehicle Valuation Pipeline - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let db_path = std::env::var("VALUATIONS_DB").unwrap_or_else(|_| "valuations.db".to_string());
    let conn = Connection::open(&db_path).expect("Failed to open database");
    setup_database(&conn).expect("Failed to set up database");
    println!("✓ Database opened: {}", db_path);

    // Create shared state
    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/valuations", post(create_valuation).get(list_valuations))
        .route("/valuations/:vrm", get(get_valuation_by_vrm))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    // Start server
    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://localhost:3000");
    println!("   POST http://localhost:3000/api/valuations");
    println!("   GET  http://localhost:3000/api/valuations");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
