//! REST API and web form for the pallet calculator.
//!
//! Provides HTTP endpoints for the embedded single-product web form and for
//! programmatic clients. Uses Axum as the web framework and supports CORS.
//! Handlers only translate between JSON and the calculator; they compute nothing.

use std::sync::OnceLock;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::{
    Router,
    http::{StatusCode, Uri, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use rust_embed::RustEmbed;
use serde::Serialize;
#[allow(unused_imports)]
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};

use crate::calculator::calculate_palletization_with_config;
use crate::config::{ApiConfig, CalculatorConfig};
use crate::input::ShipmentRequest;
use crate::model::{CalculationResult, OrientationPlan, PalletDetail, ProductPlan};
use crate::types::CONTAINER_TYPES;

#[derive(Clone)]
struct ApiState {
    calculator_config: CalculatorConfig,
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>pallet-calc API Docs</title>
        <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css" />
    </head>
    <body>
        <div id="swagger-ui"></div>
        <script src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"></script>
        <script>
            window.onload = function () {
                window.ui = SwaggerUIBundle({
                    url: "/docs/openapi.json",
                    dom_id: "#swagger-ui",
                });
            };
        </script>
    </body>
</html>"##;

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

/// Embedded Web Assets (HTML, CSS, JS)
#[derive(RustEmbed)]
#[folder = "web/"]
struct WebAssets;

/// Per-product plan in the response.
#[derive(Serialize, ToSchema)]
pub struct ProductPlanResponse {
    pub product: String,
    pub order_quantity_pcs: u64,
    pub cartons_required: u64,
    pub orientation: OrientationPlan,
    pub layers_per_pallet: u64,
    pub cartons_per_pallet: u64,
    pub full_pallets: u64,
    pub remainder_cartons: u64,
}

impl From<&ProductPlan> for ProductPlanResponse {
    fn from(plan: &ProductPlan) -> Self {
        Self {
            product: plan.product.name.clone(),
            order_quantity_pcs: plan.product.order_quantity_pcs,
            cartons_required: plan.product.cartons_required(),
            orientation: plan.orientation,
            layers_per_pallet: plan.layers_per_pallet,
            cartons_per_pallet: plan.cartons_per_pallet,
            full_pallets: plan.full_pallets,
            remainder_cartons: plan.remainder_cartons,
        }
    }
}

/// Response of the calculation endpoint.
#[derive(Serialize, ToSchema)]
pub struct CalculationResponse {
    pub product_plans: Vec<ProductPlanResponse>,
    pub pallets: Vec<PalletDetail>,
    pub total_cartons: u64,
    pub total_pallets: u64,
    pub volume_without_pallets_cbm: f64,
    pub volume_without_pallets_cuft: f64,
    pub volume_with_pallets_cbm: f64,
    pub volume_with_pallets_cuft: f64,
}

impl CalculationResponse {
    /// Creates a CalculationResponse from a CalculationResult.
    pub fn from_calculation_result(result: CalculationResult) -> Self {
        let volume_without_pallets_cuft = result.volume_without_pallets_cuft();
        let volume_with_pallets_cuft = result.volume_with_pallets_cuft();
        let CalculationResult {
            product_plans,
            pallets,
            total_cartons,
            total_pallets,
            volume_without_pallets_cbm,
            volume_with_pallets_cbm,
        } = result;

        Self {
            product_plans: product_plans.iter().map(ProductPlanResponse::from).collect(),
            pallets,
            total_cartons,
            total_pallets,
            volume_without_pallets_cbm,
            volume_without_pallets_cuft,
            volume_with_pallets_cbm,
            volume_with_pallets_cuft,
        }
    }
}

/// Selectable container in the web form.
#[derive(Serialize, ToSchema)]
pub struct ContainerOption {
    pub code: String,
    pub label: String,
    pub interior_height_cm: f64,
}

/// Defaults for the web form.
#[derive(Serialize, ToSchema)]
pub struct FormDefaults {
    #[schema(example = "40HQ")]
    pub container_height: String,
    pub base_height_cm: f64,
    pub allow_mixed_remainders: bool,
    pub container_options: Vec<ContainerOption>,
}

impl FormDefaults {
    fn from_config(config: &CalculatorConfig) -> Self {
        let calculation = config.calculation_config();
        Self {
            container_height: config.default_container().code.to_string(),
            base_height_cm: calculation.default_base_height_cm,
            allow_mixed_remainders: config.form_allow_mixed(),
            container_options: CONTAINER_TYPES
                .iter()
                .map(|container| ContainerOption {
                    code: container.code.to_string(),
                    label: container.label.to_string(),
                    interior_height_cm: container.interior_height_cm,
                })
                .collect(),
        }
    }
}

#[derive(Serialize, ToSchema)]
struct ErrorResponse {
    error: String,
    details: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }
}

fn error_response(
    status: StatusCode,
    error: impl Into<String>,
    details: impl Into<String>,
) -> Response {
    (status, Json(ErrorResponse::new(error, details))).into_response()
}

fn json_deserialize_error(err: JsonRejection) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid JSON data",
        err.to_string(),
    )
}

fn validation_error(details: impl Into<String>) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid input data",
        details,
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(handle_calculate, serve_form_defaults),
    components(
        schemas(
            ShipmentRequest,
            CalculationResponse,
            ProductPlanResponse,
            OrientationPlan,
            PalletDetail,
            FormDefaults,
            ContainerOption,
            ErrorResponse
        )
    ),
    tags((name = "pallets", description = "Pallet and shipping volume calculation"))
)]
struct ApiDoc;

fn router(config: CalculatorConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let state = ApiState {
        calculator_config: config,
    };

    Router::new()
        // API endpoints
        .route("/calculate", post(handle_calculate))
        .route("/config/defaults", get(serve_form_defaults))
        // API documentation
        .route("/docs/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_openapi_ui))
        // Web form (embedded)
        .route("/", get(serve_index))
        .route("/{*path}", get(serve_static))
        .layer(cors)
        .with_state(state)
}

/// Starts the API server and blocks until it terminates.
pub async fn start_api_server(
    config: ApiConfig,
    calculator_config: CalculatorConfig,
) -> std::io::Result<()> {
    let app = router(calculator_config);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|err| {
        error!("❌ Could not bind API server to {}: {}", addr, err);
        err
    })?;

    let display_host = config.display_host().to_string();
    info!("🚀 Server running on http://{}:{}", display_host, config.port());
    if config.binds_to_all_interfaces() && config.uses_default_host() {
        info!("💡 Local access: http://localhost:{}", config.port());
    }
    info!("📦 API endpoints: POST /calculate, GET /config/defaults");
    info!("📑 Documentation: GET /docs, GET /docs/openapi.json");

    axum::serve(listener, app).await
}

/// Handler for POST /calculate.
///
/// Takes a shipment and returns per-product plans, pallets and totals.
#[utoipa::path(
    post,
    path = "/calculate",
    request_body = ShipmentRequest,
    responses(
        (status = 200, description = "Calculation succeeded", body = CalculationResponse),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Malformed request or invalid shipment data",
            body = ErrorResponse
        )
    ),
    tag = "pallets"
)]
async fn handle_calculate(
    State(state): State<ApiState>,
    payload: Result<Json<ShipmentRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(err) => return json_deserialize_error(err),
    };

    let calculation = state.calculator_config.calculation_config();
    let input = request.into_calculation_input(calculation.default_allow_mixed);
    info!(
        "📥 New calculation request: container {}, mixed remainders {}",
        input.container_height, input.allow_mixed_remainders
    );

    match calculate_palletization_with_config(&input, &calculation) {
        Ok(result) => {
            info!(
                "📦 Result: {} pallets for {} cartons",
                result.total_pallets, result.total_cartons
            );
            let response = CalculationResponse::from_calculation_result(result);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => {
            warn!("Rejected calculation request: {}", err);
            validation_error(err.to_string())
        }
    }
}

/// Handler for GET /config/defaults.
#[utoipa::path(
    get,
    path = "/config/defaults",
    responses((status = 200, description = "Defaults for the web form", body = FormDefaults)),
    tag = "pallets"
)]
async fn serve_form_defaults(State(state): State<ApiState>) -> Json<FormDefaults> {
    Json(FormDefaults::from_config(&state.calculator_config))
}

/// Serves the index.html main page
async fn serve_index() -> Response {
    match WebAssets::get("index.html") {
        Some(content) => Html(content.data).into_response(),
        None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}

/// Serves static assets (JS, CSS, etc.)
async fn serve_static(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    match WebAssets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.as_ref())], content.data).into_response()
        }
        None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}

async fn serve_openapi_json() -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui() -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    fn state() -> ApiState {
        ApiState {
            calculator_config: CalculatorConfig::default(),
        }
    }

    fn shipment(container: &str, allow_mixed: Option<bool>) -> ShipmentRequest {
        serde_json::from_value(json!({
            "products": [
                {"name": "999-00031", "order_quantity_pcs": 800, "pcs_per_carton": 10, "carton_dimensions_cm": [56, 26, 20]},
                {"name": "999-00166", "order_quantity_pcs": 580, "pcs_per_carton": 10, "carton_dimensions_cm": [97, 26, 20]}
            ],
            "pallet_dimensions_cm": {"length_cm": 120, "width_cm": 105, "height_cm": 195},
            "allow_mixed_remainders": allow_mixed,
            "container_height": container
        }))
        .expect("valid shipment")
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        serde_json::from_slice(&bytes).expect("JSON body")
    }

    #[test]
    fn openapi_doc_lists_expected_paths() {
        let doc = openapi_doc();
        let paths = &doc.paths.paths;
        assert!(
            paths.contains_key("/calculate"),
            "OpenAPI documentation is missing the /calculate path"
        );
        assert!(
            paths.contains_key("/config/defaults"),
            "OpenAPI documentation is missing the /config/defaults path"
        );
    }

    #[test]
    fn openapi_doc_contains_key_schemas() {
        let doc = openapi_doc();
        let components = doc
            .components
            .as_ref()
            .expect("OpenAPI documentation contains no components");
        for name in ["ShipmentRequest", "CalculationResponse", "ErrorResponse"] {
            assert!(
                components.schemas.contains_key(name),
                "Expected schema '{}' is missing from OpenAPI spec",
                name
            );
        }
    }

    #[test]
    fn form_defaults_list_all_containers() {
        let defaults = FormDefaults::from_config(&CalculatorConfig::default());
        assert_eq!(defaults.container_height, "40HQ");
        assert_eq!(defaults.base_height_cm, 15.0);
        assert!(defaults.allow_mixed_remainders);
        let codes: Vec<&str> = defaults
            .container_options
            .iter()
            .map(|c| c.code.as_str())
            .collect();
        assert_eq!(codes, vec!["20CY", "40CY", "40HQ"]);
        assert_eq!(defaults.container_options[2].label, "40' High Cube");
    }

    #[tokio::test]
    async fn calculate_returns_totals() {
        let response =
            handle_calculate(State(state()), Ok(Json(shipment("20CY", Some(true))))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["total_pallets"], 3);
        assert_eq!(body["total_cartons"], 138);
        assert_eq!(body["product_plans"][0]["remainder_cartons"], 8);
        assert_eq!(body["product_plans"][1]["orientation"]["cartons_along_length"], 4);
        assert_eq!(body["pallets"][2]["label"], "Mixed remainder pallet #1");
        assert_eq!(body["pallets"][2]["cartons_by_product"]["999-00166"], 22);
        let cuft = body["volume_with_pallets_cuft"].as_f64().unwrap();
        assert!((cuft - 6.867 * 35.3146667).abs() < 1e-3);
    }

    #[tokio::test]
    async fn calculate_uses_configured_mixing_default() {
        let response = handle_calculate(State(state()), Ok(Json(shipment("20CY", None)))).await;
        let body = body_json(response).await;
        assert_eq!(body["total_pallets"], 4);
    }

    #[tokio::test]
    async fn calculate_rejects_invalid_shipment() {
        let response =
            handle_calculate(State(state()), Ok(Json(shipment("45HC", Some(true))))).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid input data");
        assert_eq!(
            body["details"],
            "Unsupported container height '45HC'. Valid values: 20CY, 40CY, 40HQ."
        );
    }

    #[test]
    fn web_form_is_embedded() {
        assert!(WebAssets::get("index.html").is_some());
        assert!(WebAssets::get("app.js").is_some());
    }
}
