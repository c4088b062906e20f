//! Data model shared by the store, the planner and the backend adapter.
//!
//! Field names follow the optimizer backend's JSON (camelCase), except for
//! the saved-route envelope which the backend emits in snake_case.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::PlannerError;

/// Shortest visit the planner accepts, in minutes.
pub const MIN_VISIT_MINUTES: u16 = 5;

/// Longest visit the planner accepts, in minutes.
pub const MAX_VISIT_MINUTES: u16 = 480;

/// Visit duration given to a POS when it enters the selection.
pub const DEFAULT_VISIT_MINUTES: u16 = 30;

/// Backend identifier of a point of sale.
///
/// The backend is inconsistent about sending ids as numbers or strings, so
/// both are accepted and normalised to text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawPosId", into = "String")]
pub struct PosId(String);

impl PosId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PosId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PosId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<PosId> for String {
    fn from(id: PosId) -> Self {
        id.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPosId {
    Text(String),
    Number(u64),
}

impl From<RawPosId> for PosId {
    fn from(raw: RawPosId) -> Self {
        match raw {
            RawPosId::Text(text) => Self(text),
            RawPosId::Number(number) => Self(number.to_string()),
        }
    }
}

/// Point of sale reference data, as served by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pos {
    pub id: PosId,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub province: String,
    #[serde(default, alias = "cap")]
    pub postal_code: String,
    #[serde(default)]
    pub territory: String,
    #[serde(default)]
    pub segment: String,
}

impl Pos {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: PosId::new(id),
            name: name.into(),
            address: String::new(),
            city: String::new(),
            province: String::new(),
            postal_code: String::new(),
            territory: String::new(),
            segment: String::new(),
        }
    }

    /// Single-line address, skipping the parts the backend left blank.
    pub fn full_address(&self) -> String {
        let locality = [self.postal_code.as_str(), self.city.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        let locality = if self.province.is_empty() {
            locality
        } else if locality.is_empty() {
            format!("({})", self.province)
        } else {
            format!("{} ({})", locality, self.province)
        };

        [self.address.as_str(), locality.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Case-insensitive match against name, address, city and territory.
    ///
    /// `needle` must already be lowercase.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        [&self.name, &self.address, &self.city, &self.territory]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Visit priority hint forwarded to the optimizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Normal,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Normal => "normal",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = PlannerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "high" => Ok(Priority::High),
            "normal" => Ok(Priority::Normal),
            "low" => Ok(Priority::Low),
            other => Err(PlannerError::InvalidPriority(other.to_string())),
        }
    }
}

/// A POS in the working selection with its per-visit settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedPos {
    #[serde(flatten)]
    pub pos: Pos,
    pub visit_duration: u16,
    #[serde(default)]
    pub priority: Priority,
}

impl SelectedPos {
    pub fn new(pos: Pos) -> Self {
        Self {
            pos,
            visit_duration: DEFAULT_VISIT_MINUTES,
            priority: Priority::Normal,
        }
    }

    pub fn id(&self) -> &PosId {
        &self.pos.id
    }
}

/// Clamp a requested visit duration into the accepted range.
pub fn clamp_visit_minutes(minutes: i32) -> u16 {
    minutes.clamp(MIN_VISIT_MINUTES.into(), MAX_VISIT_MINUTES.into()) as u16
}

/// Where the optimized route starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StartingPoint {
    #[default]
    CurrentLocation,
    CustomAddress,
    FirstInList,
}

/// Objective the optimizer minimises.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationMethod {
    Distance,
    Time,
    Priority,
    #[default]
    Balanced,
}

/// Search strategy requested from the optimizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    NearestNeighbor,
    #[default]
    TwoOpt,
    Genetic,
}

/// Parameters of an optimization request, excluding the selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationParameters {
    pub starting_point: StartingPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_address: Option<String>,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    /// Upper bound on total travel time, in minutes.
    pub max_travel_time: u32,
    pub optimization_method: OptimizationMethod,
    pub algorithm: Algorithm,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_visits: Option<u32>,
    pub consider_traffic: bool,
    pub return_to_start: bool,
}

impl Default for OptimizationParameters {
    fn default() -> Self {
        Self {
            starting_point: StartingPoint::CurrentLocation,
            custom_address: None,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            max_travel_time: 480,
            optimization_method: OptimizationMethod::Balanced,
            algorithm: Algorithm::TwoOpt,
            max_visits: None,
            consider_traffic: false,
            return_to_start: true,
        }
    }
}

impl OptimizationParameters {
    /// Local checks run before any request leaves the client.
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.starting_point == StartingPoint::CustomAddress
            && self
                .custom_address
                .as_deref()
                .is_none_or(|address| address.trim().is_empty())
        {
            return Err(PlannerError::InvalidParameters(
                "custom starting address is empty".to_string(),
            ));
        }
        if self.max_travel_time == 0 {
            return Err(PlannerError::InvalidParameters(
                "max travel time must be positive".to_string(),
            ));
        }
        if self.max_visits == Some(0) {
            return Err(PlannerError::InvalidParameters(
                "max visit count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// One stop of an optimized route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStop {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos_id: Option<PosId>,
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub arrival_time: String,
    /// Minutes spent at the stop.
    #[serde(deserialize_with = "minutes::required")]
    pub visit_duration: u32,
    pub departure_time: String,
    /// Kilometres to the following stop; absent on the last one.
    #[serde(default)]
    pub distance_to_next: Option<f64>,
    /// Minutes of travel to the following stop; absent on the last one.
    #[serde(default, deserialize_with = "minutes::optional")]
    pub travel_time_to_next: Option<u32>,
}

/// Ordered visit plan returned by the optimizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    #[serde(rename = "route", alias = "stops")]
    pub stops: Vec<RouteStop>,
    /// Minutes, travel and visits included.
    #[serde(deserialize_with = "minutes::required")]
    pub total_time: u32,
    /// Kilometres.
    pub total_distance: f64,
}

/// A route previously persisted on the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SavedRoute {
    #[serde(default)]
    pub selected_pos: Vec<SelectedPos>,
    #[serde(default)]
    pub route_result: Option<RouteResult>,
}

/// Selection entry as sent with an optimization request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedPosRef {
    pub id: PosId,
    pub visit_duration: u16,
    pub priority: Priority,
}

impl From<&SelectedPos> for SelectedPosRef {
    fn from(selected: &SelectedPos) -> Self {
        Self {
            id: selected.pos.id.clone(),
            visit_duration: selected.visit_duration,
            priority: selected.priority,
        }
    }
}

/// Body of the `optimizeRoute` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    pub action: &'static str,
    #[serde(flatten)]
    pub parameters: OptimizationParameters,
    pub selected_pos_ids: Vec<SelectedPosRef>,
}

impl OptimizeRequest {
    pub fn new(parameters: OptimizationParameters, selection: &[SelectedPos]) -> Self {
        Self {
            action: "optimizeRoute",
            parameters,
            selected_pos_ids: selection.iter().map(SelectedPosRef::from).collect(),
        }
    }
}

/// Body of the `saveRoute` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRouteRequest {
    pub action: &'static str,
    pub route_name: String,
    pub route_description: String,
    pub selected_pos: Vec<SelectedPos>,
    pub route_result: RouteResult,
}

impl SaveRouteRequest {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        selected_pos: Vec<SelectedPos>,
        route_result: RouteResult,
    ) -> Self {
        Self {
            action: "saveRoute",
            route_name: name.into(),
            route_description: description.into(),
            selected_pos,
            route_result,
        }
    }
}

/// Whole minutes sent either as integers or as integral floats (`30.0`).
mod minutes {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Integer(u64),
        Float(f64),
    }

    fn convert<E: Error>(raw: Raw) -> Result<u32, E> {
        let value = match raw {
            Raw::Integer(value) => value,
            Raw::Float(value) if value.fract() == 0.0 && value >= 0.0 => value as u64,
            Raw::Float(value) => {
                return Err(E::custom(format!("expected whole minutes, got {}", value)));
            }
        };
        u32::try_from(value).map_err(E::custom)
    }

    pub fn required<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        convert(Raw::deserialize(deserializer)?)
    }

    pub fn optional<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
        Option::<Raw>::deserialize(deserializer)?
            .map(convert::<D::Error>)
            .transpose()
    }
}

/// `HH:MM` wire format for start times.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&text, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&text, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}
