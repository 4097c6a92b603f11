//! Form state holder: the four projection inputs, the last fetched list and
//! the view controls, with change notifications for whoever renders them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{
    domain::{Country, FieldSlot, ProjectionFields, RawSnapshot},
    view::{
        derive_view, parse_population_ceiling, parse_record_limit, render_view_json,
        SortDirection, ViewParameters,
    },
};
use tokio::sync::{broadcast, RwLock};
use tracing::{error, info};

use crate::CountrySource;

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    RawResultReplaced { count: usize },
    FetchFailed { reason: String },
    ViewParametersChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Replaced { count: usize },
    /// The fetch failed and the previous list, if any, is still in place.
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotMeta {
    pub count: usize,
    pub fields: ProjectionFields,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Default)]
struct FormState {
    fields: ProjectionFields,
    raw: Option<RawSnapshot>,
    params: ViewParameters,
}

pub struct CountryForm {
    source: Arc<dyn CountrySource>,
    state: RwLock<FormState>,
    events: broadcast::Sender<FormEvent>,
}

impl CountryForm {
    pub fn new(source: Arc<dyn CountrySource>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            source,
            state: RwLock::new(FormState::default()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FormEvent> {
        self.events.subscribe()
    }

    pub async fn set_field(&self, slot: FieldSlot, value: impl Into<String>) {
        self.state.write().await.fields.set(slot, value);
    }

    pub async fn set_fields(&self, fields: ProjectionFields) {
        self.state.write().await.fields = fields;
    }

    pub async fn fields(&self) -> ProjectionFields {
        self.state.read().await.fields.clone()
    }

    /// Issues exactly one fetch for the current fields.
    ///
    /// Failures are logged and otherwise swallowed. The lock is not held across
    /// the request, so overlapping submissions all complete and the last one to
    /// finish wins.
    pub async fn submit(&self) -> SubmitOutcome {
        let fields = self.fields().await;

        match self.source.fetch_countries(&fields).await {
            Ok(countries) => {
                let count = countries.len();
                self.state.write().await.raw = Some(RawSnapshot::new(countries, fields));
                info!(count, "country list replaced");
                let _ = self.events.send(FormEvent::RawResultReplaced { count });
                SubmitOutcome::Replaced { count }
            }
            Err(err) => {
                error!(error = %err, fields = %fields.joined(), "error fetching country data");
                let _ = self.events.send(FormEvent::FetchFailed {
                    reason: err.to_string(),
                });
                SubmitOutcome::Failed
            }
        }
    }

    pub async fn set_search_term(&self, term: impl Into<String>) {
        self.update_params(|params| params.search_term = term.into()).await;
    }

    pub async fn set_population_ceiling(&self, raw: &str) {
        let ceiling = parse_population_ceiling(raw);
        self.update_params(|params| params.population_ceiling_millions = ceiling).await;
    }

    pub async fn set_sort_direction(&self, direction: SortDirection) {
        self.update_params(|params| params.sort_direction = direction).await;
    }

    pub async fn set_record_limit(&self, raw: &str) {
        let limit = parse_record_limit(raw);
        self.update_params(|params| params.record_limit = limit).await;
    }

    pub async fn set_view_parameters(&self, next: ViewParameters) {
        self.update_params(|params| *params = next).await;
    }

    pub async fn view_parameters(&self) -> ViewParameters {
        self.state.read().await.params.clone()
    }

    pub async fn has_data(&self) -> bool {
        self.state.read().await.raw.is_some()
    }

    pub async fn snapshot_meta(&self) -> Option<SnapshotMeta> {
        let state = self.state.read().await;
        state.raw.as_ref().map(|raw| SnapshotMeta {
            count: raw.countries.len(),
            fields: raw.fields.clone(),
            fetched_at: raw.fetched_at,
        })
    }

    /// Derived view for the stored view parameters.
    pub async fn view(&self) -> Vec<Country> {
        let state = self.state.read().await;
        owned_view(&state, &state.params)
    }

    /// Derived view for caller-supplied parameters, leaving the stored ones alone.
    pub async fn view_with(&self, params: &ViewParameters) -> Vec<Country> {
        let state = self.state.read().await;
        owned_view(&state, params)
    }

    /// Pretty JSON of the derived view, or `None` before the first successful fetch.
    pub async fn view_json_with(
        &self,
        params: &ViewParameters,
    ) -> serde_json::Result<Option<String>> {
        let state = self.state.read().await;
        let Some(raw) = state.raw.as_ref() else {
            return Ok(None);
        };
        let view = derive_view(Some(raw.countries.as_slice()), params);
        render_view_json(&view).map(Some)
    }

    pub async fn view_json(&self) -> serde_json::Result<Option<String>> {
        let params = self.view_parameters().await;
        self.view_json_with(&params).await
    }

    async fn update_params(&self, apply: impl FnOnce(&mut ViewParameters)) {
        apply(&mut self.state.write().await.params);
        let _ = self.events.send(FormEvent::ViewParametersChanged);
    }
}

fn owned_view(state: &FormState, params: &ViewParameters) -> Vec<Country> {
    let raw = state.raw.as_ref().map(|raw| raw.countries.as_slice());
    derive_view(raw, params).into_iter().cloned().collect()
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
