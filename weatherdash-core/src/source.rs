use async_trait::async_trait;
use std::fmt::Debug;
use tokio_util::sync::CancellationToken;

use crate::{
    config::{API_KEY_ENV, Config},
    error::FetchError,
    model::{QueryTarget, WeatherSnapshot},
    source::weatherbit::WeatherbitClient,
};

pub mod weatherbit;

/// A source of current weather conditions.
///
/// The cancellation token is threaded into the request so the transport
/// layer can release the connection promptly when the request is
/// superseded, instead of merely having its result ignored.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn current(
        &self,
        city: &QueryTarget,
        cancel: &CancellationToken,
    ) -> Result<WeatherSnapshot, FetchError>;
}

/// Construct the weather source from config.
pub fn source_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherSource>> {
    let api_key = config.resolve_api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured.\n\
             Hint: run `weatherdash configure` or set the {API_KEY_ENV} environment variable."
        )
    })?;

    Ok(Box::new(WeatherbitClient::new(api_key)))
}
