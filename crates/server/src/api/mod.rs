use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, Redirect},
    routing::{get, post},
    Form, Json, Router,
};
use client_core::{SnapshotMeta, SubmitOutcome};
use serde::{Deserialize, Serialize};
use shared::{
    domain::{Country, ProjectionFields, FIELD_COUNT},
    error::{ApiError, ErrorCode},
    view::{RawViewInput, ViewParameters},
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::error;
use url::form_urlencoded;

use crate::{
    app_state::AppState,
    render::{render_page, PageModel},
};

const MAX_REQUEST_BODY_BYTES: usize = 16 * 1024;

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitForm {
    #[serde(default)]
    field1: String,
    #[serde(default)]
    field2: String,
    #[serde(default)]
    field3: String,
    #[serde(default)]
    field4: String,
    #[serde(flatten)]
    controls: RawViewInput,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiSubmitRequest {
    #[serde(default)]
    fields: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ApiSubmitResponse {
    fetched: bool,
    count: Option<usize>,
}

pub(crate) fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(page))
        .route("/healthz", get(healthz))
        .route("/submit", post(submit_form))
        .route("/api/view", get(api_view))
        .route("/api/submit", post(api_submit))
        .route("/api/snapshot", get(api_snapshot))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn page(
    State(state): State<Arc<AppState>>,
    Query(controls): Query<RawViewInput>,
) -> ApiResult<Html<String>> {
    let params = ViewParameters::from(&controls);
    let fields = state.form.fields().await;
    let data_json = state
        .form
        .view_json_with(&params)
        .await
        .map_err(internal)?;
    let meta = state.form.snapshot_meta().await;

    Ok(Html(render_page(&PageModel {
        fields: &fields,
        controls: &controls,
        data_json: data_json.as_deref(),
        meta: meta.as_ref(),
    })))
}

async fn submit_form(State(state): State<Arc<AppState>>, Form(form): Form<SubmitForm>) -> Redirect {
    let fields = ProjectionFields::new([form.field1, form.field2, form.field3, form.field4]);
    state.form.set_fields(fields).await;
    // Failures are already logged by the form; the page just keeps its old data.
    state.form.submit().await;
    Redirect::to(&page_location(&form.controls))
}

async fn api_view(
    State(state): State<Arc<AppState>>,
    Query(controls): Query<RawViewInput>,
) -> Json<Vec<Country>> {
    let params = ViewParameters::from(&controls);
    Json(state.form.view_with(&params).await)
}

async fn api_submit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ApiSubmitRequest>,
) -> ApiResult<Json<ApiSubmitResponse>> {
    if req.fields.len() > FIELD_COUNT {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(
                ErrorCode::Validation,
                format!("at most {FIELD_COUNT} fields may be requested"),
            )),
        ));
    }

    state
        .form
        .set_fields(ProjectionFields::from_values(req.fields))
        .await;
    let response = match state.form.submit().await {
        SubmitOutcome::Replaced { count } => ApiSubmitResponse {
            fetched: true,
            count: Some(count),
        },
        SubmitOutcome::Failed => ApiSubmitResponse {
            fetched: false,
            count: None,
        },
    };
    Ok(Json(response))
}

async fn api_snapshot(State(state): State<Arc<AppState>>) -> Json<Option<SnapshotMeta>> {
    Json(state.form.snapshot_meta().await)
}

fn page_location(controls: &RawViewInput) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("search", &controls.search)
        .append_pair("population", &controls.population)
        .append_pair("sort", &controls.sort)
        .append_pair("limit", &controls.limit)
        .finish();
    format!("/?{query}")
}

fn internal(err: serde_json::Error) -> (StatusCode, Json<ApiError>) {
    error!(error = %err, "failed to render country view");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::new(ErrorCode::Internal, err.to_string())),
    )
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
