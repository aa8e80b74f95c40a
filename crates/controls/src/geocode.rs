use futures_util::future::BoxFuture;
use serde::Deserialize;

use foundation::LngLat;

/// Nominatim-style reverse lookup; `{lat}` and `{lon}` are substituted.
pub const DEFAULT_GEOCODE_URL: &str =
    "https://nominatim.openstreetmap.org/reverse?format=json&lat={lat}&lon={lon}";

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("geocoding request failed with status {0}")]
    Status(u16),
    #[error("geocoding request failed: {0}")]
    Network(String),
    #[error("unreadable geocoding response: {0}")]
    Decode(String),
}

/// Coordinate-to-address lookup.
pub trait Geocoder {
    fn reverse(&self, coord: LngLat) -> BoxFuture<'_, Result<String, GeocodeError>>;
}

/// Cache key for a coordinate: both axes rounded to six decimals.
pub fn cache_key(coord: LngLat) -> String {
    format!("{:.6},{:.6}", coord[1], coord[0])
}

pub fn reverse_url(template: &str, coord: LngLat) -> String {
    template
        .replace("{lat}", &format!("{:.6}", coord[1]))
        .replace("{lon}", &format!("{:.6}", coord[0]))
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
}

/// Sent with every lookup; public Nominatim instances refuse anonymous clients.
pub const DEFAULT_USER_AGENT: &str = concat!("strata-controls/", env!("CARGO_PKG_VERSION"));

/// Reverse geocoder backed by an HTTP endpoint returning `display_name`.
pub struct HttpGeocoder {
    url_template: String,
    user_agent: String,
    client: reqwest::Client,
}

impl HttpGeocoder {
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Identify the application to the geocoding service.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

impl Default for HttpGeocoder {
    fn default() -> Self {
        Self::new(DEFAULT_GEOCODE_URL)
    }
}

impl Geocoder for HttpGeocoder {
    fn reverse(&self, coord: LngLat) -> BoxFuture<'_, Result<String, GeocodeError>> {
        let url = reverse_url(&self.url_template, coord);
        Box::pin(async move {
            tracing::debug!(%url, "reverse geocoding");
            let resp = self
                .client
                .get(&url)
                .header(reqwest::header::ACCEPT, "application/json")
                .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
                .send()
                .await
                .map_err(|e| GeocodeError::Network(e.to_string()))?;

            if !resp.status().is_success() {
                return Err(GeocodeError::Status(resp.status().as_u16()));
            }

            let body: ReverseResponse = resp
                .json()
                .await
                .map_err(|e| GeocodeError::Decode(e.to_string()))?;
            body.display_name
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| GeocodeError::Decode("missing display_name".to_string()))
        })
    }
}
