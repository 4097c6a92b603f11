//! Derived view: filter, search, sort and limit over the last fetched list.

use std::{cmp::Ordering, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{collation::locale_compare, domain::Country};

const PEOPLE_PER_MILLION: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "ascend")]
    Ascending,
    #[serde(rename = "descend")]
    Descending,
}

impl SortDirection {
    pub fn as_token(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ascend",
            SortDirection::Descending => "descend",
        }
    }

    /// Lenient form parsing: anything unrecognised falls back to ascending.
    pub fn from_token(token: &str) -> Self {
        token.parse().unwrap_or_default()
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ascend" => Ok(SortDirection::Ascending),
            "descend" => Ok(SortDirection::Descending),
            other => Err(format!("unknown sort direction '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewParameters {
    pub search_term: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population_ceiling_millions: Option<f64>,
    #[serde(default)]
    pub sort_direction: SortDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_limit: Option<usize>,
}

/// View controls exactly as typed into the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawViewInput {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub population: String,
    #[serde(default)]
    pub sort: String,
    #[serde(default)]
    pub limit: String,
}

impl RawViewInput {
    pub fn from_parameters(params: &ViewParameters) -> Self {
        Self {
            search: params.search_term.clone(),
            population: params
                .population_ceiling_millions
                .map(|value| value.to_string())
                .unwrap_or_default(),
            sort: params.sort_direction.as_token().to_string(),
            limit: params
                .record_limit
                .map(|value| value.to_string())
                .unwrap_or_default(),
        }
    }
}

impl From<&RawViewInput> for ViewParameters {
    fn from(raw: &RawViewInput) -> Self {
        Self {
            search_term: raw.search.clone(),
            population_ceiling_millions: parse_population_ceiling(&raw.population),
            sort_direction: SortDirection::from_token(&raw.sort),
            record_limit: parse_record_limit(&raw.limit),
        }
    }
}

/// Non-numeric, NaN or infinite input means "no ceiling".
pub fn parse_population_ceiling(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Anything other than a non-negative integer means "no limit".
pub fn parse_record_limit(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok()
}

pub fn derive_view<'a>(raw: Option<&'a [Country]>, params: &ViewParameters) -> Vec<&'a Country> {
    let Some(countries) = raw else {
        return Vec::new();
    };

    let needle = params.search_term.to_lowercase();
    let ceiling = params
        .population_ceiling_millions
        .map(|millions| millions * PEOPLE_PER_MILLION);

    let mut view: Vec<&Country> = countries
        .iter()
        .filter(|country| matches_search(country, &needle) && below_ceiling(country, ceiling))
        .collect();

    // `sort_by` is stable, so equal names keep their filtered order either way.
    view.sort_by(|a, b| {
        let ordering = compare_names(a, b);
        match params.sort_direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });

    if let Some(limit) = params.record_limit {
        view.truncate(limit);
    }
    view
}

pub fn render_view_json(view: &[&Country]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(view)
}

fn matches_search(country: &Country, needle: &str) -> bool {
    country
        .common_name()
        .unwrap_or_default()
        .to_lowercase()
        .contains(needle)
}

fn below_ceiling(country: &Country, ceiling: Option<f64>) -> bool {
    match ceiling {
        None => true,
        Some(ceiling) => country
            .population()
            .is_some_and(|population| population < ceiling),
    }
}

fn compare_names(a: &Country, b: &Country) -> Ordering {
    locale_compare(
        a.common_name().unwrap_or_default(),
        b.common_name().unwrap_or_default(),
    )
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
