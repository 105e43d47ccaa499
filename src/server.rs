//! JSON API mirroring the web front end's routes.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::Result;
use crate::interface::DayMap;
use crate::models::{MealItem, NutrientBounds, Profiles, ValidationIssue};
use crate::planner::{
    optimize, validate_values, Aggregation, Failure, Objective, PlannerConfig, Rejection,
};
use crate::state::{catalog_entries, load_catalog, load_profiles};

/// Read-only data shared by every request.
#[derive(Debug, Clone, Default)]
pub struct ApiState {
    pub catalog: Vec<MealItem>,
    pub profiles: Profiles,
    pub config: PlannerConfig,
}

impl ApiState {
    pub fn load(
        catalog: Option<&Path>,
        profiles: Option<&Path>,
        config: PlannerConfig,
    ) -> Result<Self> {
        let catalog = match catalog {
            Some(path) => load_catalog(path)?.accepted,
            None => Vec::new(),
        };
        let profiles = match profiles {
            Some(path) => load_profiles(path)?,
            None => Profiles::default(),
        };
        Ok(Self {
            catalog,
            profiles,
            config,
        })
    }
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<Failure>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    failure: Option<Failure>,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            failure: None,
        }
    }

    fn internal(error: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
            failure: None,
        }
    }
}

impl From<Failure> for ApiError {
    fn from(failure: Failure) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: failure.to_string(),
            failure: Some(failure),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            success: false,
            error: self.message,
            failure: self.failure,
        });
        (self.status, body).into_response()
    }
}

type ApiResult = std::result::Result<Json<Value>, ApiError>;

/// Per-request settings layered over the server's base config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanOptions {
    pub days: Option<usize>,
    pub meals_per_day: Option<usize>,
    pub allow_repeats: Option<bool>,
    pub max_repeat_within_days: Option<usize>,
    pub aggregation: Option<Aggregation>,
    pub max_steps: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    /// Catalog for this request; the server's catalog is used when absent.
    pub meals: Option<Vec<Value>>,
    /// Flat web-form bounds (`minCalories`, `maxSodium`, ...).
    pub requirements: Option<Value>,
    /// Keyed bounds (`{"calories": {"min": ..}}`).
    pub bounds: Option<Value>,
    pub profile: Option<String>,
    pub objective: Option<Objective>,
    /// Most times one meal may appear in the plan.
    #[serde(rename = "mealFrequency")]
    pub meal_frequency: Option<usize>,
    #[serde(default)]
    pub options: PlanOptions,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/upload", post(upload))
        .route("/generate_meal_plan", post(generate_meal_plan))
        .route("/get_sample_meals", get(get_sample_meals))
        .route("/get_all_meals", get(get_all_meals))
        .route("/get_nutritional_profiles", get(get_nutritional_profiles))
        .route("/get_config", get(get_config))
        .with_state(Arc::new(state))
}

pub async fn run_server(state: ApiState, bind: SocketAddr) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("meal planner API listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true, "version": env!("CARGO_PKG_VERSION") }))
}

async fn upload(Json(body): Json<Value>) -> ApiResult {
    let entries = catalog_entries(body).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let report = validate_values(entries);
    if report.is_empty() {
        return Err(Failure::EmptyCatalog {
            rejected: report.rejected,
        }
        .into());
    }
    Ok(Json(json!({
        "message": "Catalog accepted",
        "meals_count": report.accepted.len(),
        "rejected": report.rejected,
    })))
}

async fn get_sample_meals(State(state): State<Arc<ApiState>>) -> Json<Value> {
    Json(json!(state.catalog))
}

async fn get_all_meals(State(state): State<Arc<ApiState>>) -> Json<Value> {
    Json(json!({ "success": true, "meals": state.catalog }))
}

async fn get_nutritional_profiles(State(state): State<Arc<ApiState>>) -> Json<Value> {
    Json(json!({ "success": true, "profiles": state.profiles }))
}

/// Base planner settings, in the config file's shape.
async fn get_config(State(state): State<Arc<ApiState>>) -> Json<Value> {
    Json(json!({ "success": true, "config": { "meal_planning": state.config } }))
}

async fn generate_meal_plan(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<GenerateRequest>,
) -> ApiResult {
    let bounds = resolve_bounds(&state, &request)?;
    let config = resolve_config(&state.config, &request);

    let (catalog, rejected) = match request.meals {
        Some(meals) => {
            let report = validate_values(meals);
            if report.is_empty() {
                return Err(Failure::EmptyCatalog {
                    rejected: report.rejected,
                }
                .into());
            }
            (report.accepted, report.rejected)
        }
        None => (state.catalog.clone(), Vec::new()),
    };

    let outcome =
        tokio::task::spawn_blocking(move || plan_response(&catalog, &bounds, &config, rejected))
            .await
            .map_err(ApiError::internal)?;

    match outcome {
        Ok(body) => Ok(Json(body)),
        Err(failure) => {
            warn!(kind = failure.kind(), "plan request failed: {}", failure);
            Err(failure.into())
        }
    }
}

fn resolve_bounds(
    state: &ApiState,
    request: &GenerateRequest,
) -> std::result::Result<NutrientBounds, ApiError> {
    let to_failure = |issues: Vec<ValidationIssue>| ApiError::from(Failure::Validation { issues });

    if let Some(value) = request.bounds.as_ref().or(request.requirements.as_ref()) {
        return NutrientBounds::from_value(value).map_err(to_failure);
    }
    if let Some(name) = &request.profile {
        return match state.profiles.get(name) {
            Some(bounds) => Ok(bounds.clone()),
            None => Err(ApiError::bad_request(match state.profiles.suggest(name) {
                Some(hint) => format!("unknown profile '{}' (did you mean '{}'?)", name, hint),
                None => format!("unknown profile '{}'", name),
            })),
        };
    }
    Ok(NutrientBounds::new())
}

fn resolve_config(base: &PlannerConfig, request: &GenerateRequest) -> PlannerConfig {
    let mut config = base.clone();
    let options = &request.options;
    if let Some(days) = options.days {
        config.days = days;
    }
    if let Some(meals) = options.meals_per_day {
        config.meals_per_day = meals;
    }
    if let Some(allow) = options.allow_repeats {
        config.allow_repeats = allow;
    }
    if let Some(window) = options.max_repeat_within_days {
        config.max_repeat_within_days = window;
    }
    if let Some(aggregation) = options.aggregation {
        config.aggregation = aggregation;
    }
    if let Some(steps) = options.max_steps {
        config.max_steps = steps;
    }
    if let Some(objective) = request.objective {
        config.objective = objective;
    }
    if request.meal_frequency.is_some() {
        config.max_uses_per_item = request.meal_frequency;
    }
    config
}

/// Run the optimizer and shape the response while the plan still borrows
/// the catalog.
fn plan_response(
    catalog: &[MealItem],
    bounds: &NutrientBounds,
    config: &PlannerConfig,
    mut rejected: Vec<Rejection>,
) -> std::result::Result<Value, Failure> {
    let solution = optimize(catalog, bounds, config)?;
    rejected.extend(solution.rejected.iter().cloned());
    let summary = &solution.summary;
    Ok(json!({
        "success": true,
        "meal_plan": DayMap(&solution.plan),
        "optimization_results": {
            "status": if summary.optimal { "OPTIMAL" } else { "FEASIBLE" },
            "total_cost": summary.total_cost,
            "num_meals": summary.num_meals,
            "distinct_meals": summary.distinct_meals,
            "steps": summary.steps,
            "nutritional_summary": summary.nutrients,
        },
        "rejected": rejected,
    }))
}
