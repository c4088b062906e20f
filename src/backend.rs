//! HTTP adapter for the PHP route optimizer.
//!
//! Reads go out as `GET ?action=...`, writes as JSON `POST` bodies carrying
//! their own `action` field. Every response is wrapped in
//! `{success, data, error|message}`.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::{debug, info, warn};

use crate::error::BackendError;
use crate::model::{OptimizeRequest, Pos, RouteResult, SaveRouteRequest, SavedRoute};
use crate::traits::RouteBackend;

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub script: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost/api".to_string(),
            script: "r_route_optimizer.php".to_string(),
            timeout_secs: 30,
        }
    }
}

impl BackendConfig {
    /// Defaults overridden by `ROUTE_BACKEND_URL`, `ROUTE_BACKEND_SCRIPT`
    /// and `ROUTE_BACKEND_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`Self::from_env`], reading variables through `lookup`.
    ///
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            base_url: try_load(&lookup, "ROUTE_BACKEND_URL", defaults.base_url),
            script: try_load(&lookup, "ROUTE_BACKEND_SCRIPT", defaults.script),
            timeout_secs: try_load(&lookup, "ROUTE_BACKEND_TIMEOUT_SECS", defaults.timeout_secs),
        }
    }

    /// Full URL of the optimizer script.
    pub fn endpoint(&self) -> Result<Url, BackendError> {
        let raw = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.script.trim_start_matches('/')
        );
        Url::parse(&raw).map_err(|err| BackendError::InvalidUrl(format!("{}: {}", raw, err)))
    }
}

fn try_load<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(value) => value.parse().unwrap_or_else(|err| {
            warn!("Invalid {key} value {value:?}: {err}, using default: {default}");
            default
        }),
        None => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    endpoint: Url,
    client: reqwest::blocking::Client,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let endpoint = config.endpoint()?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn get<T: DeserializeOwned>(&self, query: &[(&str, &str)]) -> Result<T, BackendError> {
        debug!(endpoint = %self.endpoint, ?query, "backend GET");
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(query)
            .send()?;
        decode::<T>(response)?.into_data()
    }

    fn post<B, T>(&self, body: &B) -> Result<Envelope<T>, BackendError>
    where
        B: serde::Serialize,
        T: DeserializeOwned,
    {
        debug!(endpoint = %self.endpoint, "backend POST");
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(body)
            .send()?;
        decode(response)
    }
}

/// Decode the response envelope.
///
/// Error statuses still carry the script's JSON envelope; its message wins
/// over the bare status error when present.
fn decode<T: DeserializeOwned>(
    response: reqwest::blocking::Response,
) -> Result<Envelope<T>, BackendError> {
    let status_error = match response.error_for_status_ref() {
        Ok(_) => return Ok(response.json::<Envelope<T>>()?),
        Err(err) => err,
    };

    let status = response.status();
    match response
        .json::<Envelope<IgnoredAny>>()
        .map(Envelope::into_status)
    {
        Ok(Err(BackendError::Rejected(message))) => {
            debug!(%status, "backend error status carried a message");
            Err(BackendError::Rejected(message))
        }
        _ => Err(BackendError::Http(status_error)),
    }
}

impl RouteBackend for HttpBackend {
    fn available_pos(&self) -> Result<Vec<Pos>, BackendError> {
        self.get(&[("action", "getAvailablePOS")])
    }

    fn pos_by_territory(&self, territory: &str) -> Result<Vec<Pos>, BackendError> {
        self.get(&[("action", "getPOSByTerritory"), ("territory", territory)])
    }

    fn saved_route(&self, route_id: &str) -> Result<SavedRoute, BackendError> {
        self.get(&[("action", "getSavedRoute"), ("route_id", route_id)])
    }

    fn optimize_route(&self, request: &OptimizeRequest) -> Result<RouteResult, BackendError> {
        let result = self.post::<_, RouteResult>(request)?.into_data()?;
        info!(
            stops = result.stops.len(),
            total_distance = result.total_distance,
            "route optimized"
        );
        Ok(result)
    }

    fn save_route(&self, request: &SaveRouteRequest) -> Result<(), BackendError> {
        self.post::<_, IgnoredAny>(request)?.into_status()?;
        info!(name = %request.route_name, "route saved");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl<T> Envelope<T> {
    fn into_status(self) -> Result<Option<T>, BackendError> {
        if self.success {
            return Ok(self.data);
        }
        match self.error.or(self.message).filter(|text| !text.trim().is_empty()) {
            Some(message) => {
                warn!(%message, "backend rejected request");
                Err(BackendError::Rejected(message))
            }
            None => {
                warn!("backend reported failure without a message");
                Err(BackendError::Failed)
            }
        }
    }

    fn into_data(self) -> Result<T, BackendError> {
        self.into_status()?.ok_or(BackendError::MissingData)
    }
}
