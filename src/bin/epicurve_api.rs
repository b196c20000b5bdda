use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use epicurve::controller::DEFAULT_INITIAL_STATE;
use epicurve::math::ode::MAX_STEPS;
use epicurve::model::{herd_immunity_threshold, unknown_model};
use epicurve::{
    registry, run_simulation, ControllerConfig, Model, ModelParameters, ModelState, Rk4Solver,
    RunOutcome,
};

#[derive(Debug, Deserialize)]
struct SimulateRequest {
    model: Option<String>,
    parameters: Option<ModelParameters>,
    initial_state: Option<ModelState>,
    t_end: Option<f64>,
    dt: Option<f64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "epicurve=info,epicurve_api=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ControllerConfig::from_env()?;

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8000);

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/models", get(list_models))
        .route("/simulate", post(simulate))
        .with_state(config);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("invalid HOST/PORT: {}:{}", host, port))?;
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind failed on {}", addr))?;
    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}

async fn healthz() -> impl IntoResponse {
    Json(json!({"ok": true}))
}

async fn list_models() -> impl IntoResponse {
    let models: Vec<_> = registry().iter().map(describe_model).collect();
    Json(json!({ "models": models }))
}

fn describe_model(model: &Model) -> serde_json::Value {
    let params: Vec<_> = model
        .required_parameters()
        .iter()
        .map(|p| {
            let (min, max) = p.range();
            json!({
                "name": p.as_str(),
                "label": p.label(),
                "min": min,
                "max": max,
                "default": p.default_value(),
            })
        })
        .collect();
    json!({
        "name": model.name,
        "title": model.title,
        "description": model.description,
        "normalized": model.is_normalized(),
        "parameters": params,
    })
}

async fn simulate(
    State(config): State<ControllerConfig>,
    Json(req): Json<SimulateRequest>,
) -> impl IntoResponse {
    // Integration is CPU-bound; keep it off the async workers.
    let join = tokio::task::spawn_blocking(move || simulate_sync(&config, req));

    match join.await {
        Ok(Ok(body)) => (StatusCode::OK, Json(body)).into_response(),
        Ok(Err((code, body))) => (code, Json(body)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"return_code": 2, "error": format!("join error: {e}")})),
        )
            .into_response(),
    }
}

fn simulate_sync(
    config: &ControllerConfig,
    req: SimulateRequest,
) -> Result<serde_json::Value, (StatusCode, serde_json::Value)> {
    let name = req.model.unwrap_or_else(|| "basic_sir".to_string());
    let model = registry().get(&name).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            json!({"return_code": 1, "error": unknown_model(&name)}),
        )
    })?;

    let params = req.parameters.unwrap_or_else(|| model.default_parameters());
    let initial = req.initial_state.unwrap_or_else(|| {
        if model.is_normalized() {
            DEFAULT_INITIAL_STATE
        } else {
            DEFAULT_INITIAL_STATE.scaled(params.n.unwrap_or(1.0))
        }
    });

    let mut settings = config.settings_for(model);
    if let Some(t_end) = req.t_end {
        settings.t_end = t_end;
    }
    if let Some(dt) = req.dt {
        settings.step = dt;
    }
    if !(settings.step.is_finite() && settings.step > 0.0) || settings.steps() > MAX_STEPS {
        let error = format!("dt must be positive and give at most {} steps", MAX_STEPS);
        return Err((StatusCode::BAD_REQUEST, json!({"return_code": 1, "error": error})));
    }

    let outcome = run_simulation(&Rk4Solver::new(), model, &params, &initial, settings)
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"return_code": 2, "error": e.to_string()}),
            )
        })?;

    match outcome {
        RunOutcome::Completed { result, r0 } => Ok(json!({
            "return_code": 0,
            "model": model.name,
            "r0": r0,
            "herd_immunity_threshold": herd_immunity_threshold(r0),
            "summary": result.summary(),
            "result": result,
        })),
        RunOutcome::Invalid { parameter_errors, initial_state_error } => Err((
            StatusCode::BAD_REQUEST,
            json!({
                "return_code": 1,
                "parameter_errors": parameter_errors,
                "initial_state_error": initial_state_error,
            }),
        )),
        RunOutcome::Unstable { message } => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({"return_code": 1, "error": message}),
        )),
    }
}
