use std::sync::Arc;

use client_core::CountryForm;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) form: Arc<CountryForm>,
}
