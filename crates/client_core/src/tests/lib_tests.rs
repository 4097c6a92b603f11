use super::*;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use anyhow::Result;
use axum::{
    extract::{RawQuery, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use tokio::{net::TcpListener, sync::Mutex};

const COUNTRIES_BODY: &str = r#"[
    {"name":{"common":"India"},"population":1300000000},
    {"name":{"common":"Austria"},"population":9000000}
]"#;

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    body: &'static str,
    hits: Arc<AtomicUsize>,
    last_query: Arc<Mutex<Option<String>>>,
}

async fn handle_all(
    State(state): State<StubState>,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last_query.lock().await = query;
    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body,
    )
}

async fn spawn_countries_server(
    status: StatusCode,
    body: &'static str,
) -> Result<(String, StubState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = StubState {
        status,
        body,
        hits: Arc::new(AtomicUsize::new(0)),
        last_query: Arc::new(Mutex::new(None)),
    };
    let app = Router::new()
        .route("/v3.1/all", get(handle_all))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}/v3.1"), state))
}

fn fields(values: [&str; 4]) -> ProjectionFields {
    ProjectionFields::from_values(values)
}

#[test]
fn projection_url_appends_all_and_comma_joined_fields() {
    let client = RestCountriesClient::new(DEFAULT_COUNTRIES_API_URL).expect("client");
    let url = client.projection_url(&fields(["name", "population", "capital", "region"]));
    assert_eq!(
        url.as_str(),
        "https://restcountries.com/v3.1/all?fields=name,population,capital,region"
    );
}

#[test]
fn projection_url_tolerates_trailing_slash_on_base() {
    let base = Url::parse("https://example.test/v3.1/").expect("url");
    let url = projection_url(&base, &fields(["name", "", "", ""]));
    assert_eq!(url.as_str(), "https://example.test/v3.1/all?fields=name,,,");
}

#[test]
fn projection_url_keeps_empty_fields_as_empty_slots() {
    let client = RestCountriesClient::new(DEFAULT_COUNTRIES_API_URL).expect("client");
    let url = client.projection_url(&ProjectionFields::default());
    assert_eq!(url.query(), Some("fields=,,,"));
}

#[test]
fn projection_url_encodes_separators_inside_a_field() {
    let client = RestCountriesClient::new(DEFAULT_COUNTRIES_API_URL).expect("client");
    let url = client.projection_url(&fields(["name", "a&b=c", "two words", "x,y#z"]));
    assert_eq!(
        url.query(),
        Some("fields=name,a%26b%3Dc,two+words,x%2Cy%23z")
    );
}

#[test]
fn rejects_unusable_base_urls() {
    assert!(matches!(
        RestCountriesClient::new("not a url"),
        Err(FetchError::InvalidBaseUrl { .. })
    ));
    assert!(matches!(
        RestCountriesClient::new("mailto:someone@example.test"),
        Err(FetchError::InvalidBaseUrl { .. })
    ));
}

#[tokio::test]
async fn fetch_decodes_country_list_and_sends_projection() {
    let (base_url, state) = spawn_countries_server(StatusCode::OK, COUNTRIES_BODY)
        .await
        .expect("spawn server");
    let client = RestCountriesClient::new(&base_url).expect("client");

    let countries = client
        .fetch_countries(&fields(["name", "population", "", ""]))
        .await
        .expect("fetch");

    assert_eq!(countries.len(), 2);
    assert_eq!(countries[0].common_name(), Some("India"));
    assert_eq!(state.hits.load(Ordering::SeqCst), 1);
    assert_eq!(
        state.last_query.lock().await.as_deref(),
        Some("fields=name,population,,")
    );
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let (base_url, _state) =
        spawn_countries_server(StatusCode::BAD_REQUEST, r#"{"message":"bad fields"}"#)
            .await
            .expect("spawn server");
    let client = RestCountriesClient::new(&base_url).expect("client");

    let err = client
        .fetch_countries(&ProjectionFields::default())
        .await
        .expect_err("must fail");
    assert!(matches!(err, FetchError::Status(400)), "unexpected: {err}");
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let (base_url, _state) = spawn_countries_server(StatusCode::OK, "{not json")
        .await
        .expect("spawn server");
    let client = RestCountriesClient::new(&base_url).expect("client");

    let err = client
        .fetch_countries(&ProjectionFields::default())
        .await
        .expect_err("must fail");
    assert!(matches!(err, FetchError::Decode(_)), "unexpected: {err}");
}

#[tokio::test]
async fn non_object_elements_are_a_decode_error() {
    let (base_url, _state) = spawn_countries_server(StatusCode::OK, r#"[{"a":1}, 7]"#)
        .await
        .expect("spawn server");
    let client = RestCountriesClient::new(&base_url).expect("client");

    let err = client
        .fetch_countries(&ProjectionFields::default())
        .await
        .expect_err("must fail");
    assert!(err.to_string().contains("element 1"), "unexpected: {err}");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = RestCountriesClient::new(&format!("http://{addr}/v3.1")).expect("client");
    let err = client
        .fetch_countries(&ProjectionFields::default())
        .await
        .expect_err("must fail");
    assert!(matches!(err, FetchError::Transport(_)), "unexpected: {err}");
}
