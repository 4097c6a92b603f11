use async_trait::async_trait;
use reqwest::Client;
use shared::domain::{Country, ProjectionFields};
use tracing::debug;
use url::{form_urlencoded, Url};

pub mod error;
mod form;

pub use error::FetchError;
pub use form::{CountryForm, FormEvent, SnapshotMeta, SubmitOutcome};

pub const DEFAULT_COUNTRIES_API_URL: &str = "https://restcountries.com/v3.1";

/// Where country projections come from. One call is one outbound request.
#[async_trait]
pub trait CountrySource: Send + Sync {
    async fn fetch_countries(&self, fields: &ProjectionFields) -> Result<Vec<Country>, FetchError>;
}

#[derive(Clone)]
pub struct RestCountriesClient {
    http: Client,
    base_url: Url,
}

impl RestCountriesClient {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url).map_err(|e| FetchError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "url cannot carry a path".to_string(),
            });
        }
        // No timeout: a hung request simply never completes.
        Ok(Self {
            http: Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `<base>/all?fields=<f1>,<f2>,<f3>,<f4>` with each name percent-encoded.
    pub fn projection_url(&self, fields: &ProjectionFields) -> Url {
        projection_url(&self.base_url, fields)
    }
}

pub fn projection_url(base_url: &Url, fields: &ProjectionFields) -> Url {
    let mut url = base_url.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push("all");
    }
    url.set_query(Some(&format!("fields={}", encode_fields(fields))));
    url
}

fn encode_fields(fields: &ProjectionFields) -> String {
    fields
        .as_slice()
        .iter()
        .map(|field| form_urlencoded::byte_serialize(field.as_bytes()).collect::<String>())
        .collect::<Vec<_>>()
        .join(",")
}

#[async_trait]
impl CountrySource for RestCountriesClient {
    async fn fetch_countries(&self, fields: &ProjectionFields) -> Result<Vec<Country>, FetchError> {
        let url = self.projection_url(fields);
        debug!(%url, "requesting country projection");

        let body = self
            .http
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?
            .error_for_status()
            .map_err(FetchError::from_reqwest)?
            .bytes()
            .await
            .map_err(FetchError::from_reqwest)?;

        decode_countries(&body)
    }
}

fn decode_countries(body: &[u8]) -> Result<Vec<Country>, FetchError> {
    let countries: Vec<Country> =
        serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    if let Some(index) = countries.iter().position(|c| !c.as_value().is_object()) {
        return Err(FetchError::Decode(format!(
            "element {index} is not an object"
        )));
    }
    Ok(countries)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
