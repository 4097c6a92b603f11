use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{CountryForm, RestCountriesClient, SubmitOutcome, DEFAULT_COUNTRIES_API_URL};
use shared::{
    domain::{ProjectionFields, FIELD_COUNT},
    view::{RawViewInput, ViewParameters},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Fetch a projection of the country list and print the filtered, sorted view.
#[derive(Parser, Debug)]
#[command(name = "country-cli")]
struct Args {
    /// Attribute to request; repeat up to four times.
    #[arg(long = "field", value_name = "NAME")]
    fields: Vec<String>,
    /// Case-insensitive substring of the common name.
    #[arg(long, default_value = "")]
    search: String,
    /// Population ceiling in millions; non-numeric means none.
    #[arg(long, default_value = "")]
    population: String,
    /// `ascend` or `descend`.
    #[arg(long, default_value = "ascend")]
    sort: String,
    /// Maximum number of records; non-numeric means all.
    #[arg(long, default_value = "")]
    limit: String,
    #[arg(long, default_value = DEFAULT_COUNTRIES_API_URL)]
    api_url: String,
}

impl Args {
    fn projection_fields(&self) -> Result<ProjectionFields> {
        if self.fields.len() > FIELD_COUNT {
            anyhow::bail!(
                "at most {FIELD_COUNT} --field values are accepted, got {}",
                self.fields.len()
            );
        }
        Ok(ProjectionFields::from_values(self.fields.iter().cloned()))
    }

    fn view_parameters(&self) -> ViewParameters {
        ViewParameters::from(&RawViewInput {
            search: self.search.clone(),
            population: self.population.clone(),
            sort: self.sort.clone(),
            limit: self.limit.clone(),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let fields = args.projection_fields()?;
    let source = RestCountriesClient::new(&args.api_url)
        .with_context(|| format!("invalid --api-url '{}'", args.api_url))?;
    let form = CountryForm::new(Arc::new(source));
    form.set_fields(fields).await;
    form.set_view_parameters(args.view_parameters()).await;

    if let SubmitOutcome::Replaced { count } = form.submit().await {
        info!(count, "fetched countries");
        if let Some(rendered) = form.view_json().await? {
            println!("{rendered}");
        }
    }

    Ok(())
}
