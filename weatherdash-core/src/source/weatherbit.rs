use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::{
    error::FetchError,
    model::{QueryTarget, WeatherSnapshot},
};

use super::WeatherSource;

const DEFAULT_BASE_URL: &str = "https://api.weatherbit.io/v2.0";
const ICON_BASE_URL: &str = "https://www.weatherbit.io/static/img/icons";

/// URL of the provider-hosted icon asset for an icon code.
pub fn icon_url(icon_code: &str) -> String {
    format!("{ICON_BASE_URL}/{icon_code}.png")
}

#[derive(Debug, Clone)]
pub struct WeatherbitClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherbitClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_owned())
    }

    /// Same client against a different endpoint, used by tests.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self { api_key, base_url, http: Client::new() }
    }

    async fn fetch_current(&self, city: &QueryTarget) -> Result<WeatherSnapshot, FetchError> {
        let url = format!("{}/current", self.base_url);

        debug!("requesting current conditions for '{city}'");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("city", city.as_str()),
                ("key", self.api_key.as_str()),
                ("units", "M"),
            ])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!(
                "Weatherbit current request for '{city}' failed with status {status}: {}",
                truncate_body(&body)
            );
            return Err(FetchError::from_status(status));
        }

        let body = res.text().await?;
        let parsed: WbCurrentResponse = serde_json::from_str(&body)
            .map_err(|e| FetchError::transport(format!("Failed to parse Weatherbit JSON: {e}")))?;

        let entry = parsed.data.into_iter().next().ok_or(FetchError::NoData)?;
        let observed_at = entry.ts.and_then(unix_to_utc).unwrap_or_else(Utc::now);

        Ok(WeatherSnapshot {
            city_name: entry.city_name,
            country_code: entry.country_code,
            temp_c: entry.temp,
            feels_like_c: entry.app_temp,
            humidity_pct: entry.rh,
            wind_speed_mps: entry.wind_spd,
            pressure_mb: entry.pres,
            icon: entry.weather.icon,
            description: entry.weather.description,
            observed_at,
        })
    }
}

#[derive(Debug, Deserialize)]
struct WbCondition {
    icon: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct WbEntry {
    city_name: String,
    country_code: String,
    temp: f64,
    app_temp: f64,
    rh: u8,
    wind_spd: f64,
    pres: f64,
    ts: Option<i64>,
    weather: WbCondition,
}

#[derive(Debug, Deserialize)]
struct WbCurrentResponse {
    #[serde(default)]
    data: Vec<WbEntry>,
}

#[async_trait]
impl WeatherSource for WeatherbitClient {
    async fn current(
        &self,
        city: &QueryTarget,
        cancel: &CancellationToken,
    ) -> Result<WeatherSnapshot, FetchError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            res = self.fetch_current(city) => res,
        }
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(ts, 0).single()
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX { format!("{}...", &body[..MAX]) } else { body.to_owned() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_body() -> serde_json::Value {
        json!({
            "count": 1,
            "data": [{
                "city_name": "London",
                "country_code": "GB",
                "temp": 17.6,
                "app_temp": 16.9,
                "rh": 72,
                "wind_spd": 3.4,
                "pres": 1012.5,
                "ts": 1_724_960_400,
                "weather": { "icon": "c02d", "code": 802, "description": "Scattered clouds" }
            }]
        })
    }

    fn client_for(server: &MockServer) -> WeatherbitClient {
        WeatherbitClient::with_base_url("TESTKEY".to_owned(), server.uri())
    }

    fn london() -> QueryTarget {
        QueryTarget::new("London").unwrap()
    }

    #[tokio::test]
    async fn maps_current_conditions_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/current"))
            .and(query_param("city", "London"))
            .and(query_param("key", "TESTKEY"))
            .and(query_param("units", "M"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let snap = client.current(&london(), &CancellationToken::new()).await.unwrap();

        assert_eq!(snap.city_name, "London");
        assert_eq!(snap.country_code, "GB");
        // Stored unrounded; rounding is display-only.
        assert_eq!(snap.temp_c, 17.6);
        assert_eq!(snap.feels_like_c, 16.9);
        assert_eq!(snap.humidity_pct, 72);
        assert_eq!(snap.wind_speed_mps, 3.4);
        assert_eq!(snap.pressure_mb, 1012.5);
        assert_eq!(snap.icon, "c02d");
        assert_eq!(snap.description, "Scattered clouds");
        assert_eq!(snap.observed_at, Utc.timestamp_opt(1_724_960_400, 0).unwrap());
    }

    #[tokio::test]
    async fn error_statuses_map_to_typed_failures() {
        for (status, expected) in [
            (401, FetchError::Unauthorized),
            (404, FetchError::CityNotFound),
            (429, FetchError::RateLimited),
            (503, FetchError::Http { status: 503 }),
        ] {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/current"))
                .respond_with(ResponseTemplate::new(status))
                .mount(&server)
                .await;

            let client = client_for(&server);
            let err = client.current(&london(), &CancellationToken::new()).await.unwrap_err();
            assert_eq!(err, expected, "status {status}");
        }
    }

    #[tokio::test]
    async fn empty_data_array_is_no_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/current"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "count": 0, "data": [] })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.current(&london(), &CancellationToken::new()).await.unwrap_err();
        assert_eq!(err, FetchError::NoData);
    }

    #[tokio::test]
    async fn unparseable_body_is_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/current"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.current(&london(), &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(ref msg) if msg.contains("parse")));
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/current"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(sample_body())
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client.current(&london(), &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn icon_url_points_at_provider_asset() {
        assert_eq!(icon_url("c02d"), "https://www.weatherbit.io/static/img/icons/c02d.png");
    }
}
