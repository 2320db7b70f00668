//! One-shot trip planning from a filled-in form
//!
//! The form is validated locally, then posted to `/plan_trip` as
//! `{"trip": {...}}`. An infeasible route is answered straight away;
//! anything else is a job that the poller resolves.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use super::submit::job_id;
use super::{SubmissionPipeline, SubmitError};
use crate::flow::ResponseShape;

pub const PLAN_TRIP_ENDPOINT: &str = "/plan_trip";

/// Longest driving day the form accepts
pub const MAX_DRIVING_HOURS: f64 = 12.0;

/// A form rule the trip broke
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TripError {
    #[error("Please enter a starting location")]
    MissingOrigin,

    #[error("Please enter a destination")]
    MissingDestination,

    #[error("Please enter a valid trip duration (at least 1 day)")]
    InvalidDuration,

    #[error("Please enter driving hours per day (1-12 hours)")]
    InvalidDrivingHours,

    #[error("Please select your route preference")]
    MissingRoutePreference,
}

/// Whether the traveller wants the fastest route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoutePreference {
    Yes,
    No,
}

impl std::str::FromStr for RoutePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yes" | "y" | "true" => Ok(Self::Yes),
            "no" | "n" | "false" => Ok(Self::No),
            _ => Err(format!("Unknown route preference: {}. Use: yes or no", s)),
        }
    }
}

/// Raw form input, possibly incomplete
#[derive(Debug, Clone, Default)]
pub struct TripForm {
    pub from: String,
    pub to: String,
    pub duration: Option<u32>,
    pub driving_hours_per_day: Option<f64>,
    pub route_preference: Option<RoutePreference>,
}

/// A validated trip, serialized as the `trip` object of the request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    pub from: String,
    pub to: String,
    pub duration: u32,
    pub driving_hours_per_day: f64,
    pub route_preference: RoutePreference,
}

impl TripForm {
    /// Check each rule in form order; the first broken rule wins
    pub fn validate(&self) -> Result<TripRequest, TripError> {
        debug!(?self, "TripForm::validate: called");
        let from = self.from.trim();
        if from.is_empty() {
            return Err(TripError::MissingOrigin);
        }
        let to = self.to.trim();
        if to.is_empty() {
            return Err(TripError::MissingDestination);
        }
        let duration = match self.duration {
            Some(days) if days >= 1 => days,
            _ => return Err(TripError::InvalidDuration),
        };
        let hours = match self.driving_hours_per_day {
            Some(h) if (1.0..=MAX_DRIVING_HOURS).contains(&h) => h,
            _ => return Err(TripError::InvalidDrivingHours),
        };
        let route_preference = self.route_preference.ok_or(TripError::MissingRoutePreference)?;

        Ok(TripRequest {
            from: from.to_string(),
            to: to.to_string(),
            duration,
            driving_hours_per_day: hours,
            route_preference,
        })
    }
}

impl TripRequest {
    pub fn body(&self) -> Value {
        serde_json::json!({ "trip": self })
    }
}

/// What the backend made of the trip
#[derive(Debug, Clone, PartialEq)]
pub enum TripOutcome {
    /// The route can't be driven as asked; the text says why
    Infeasible(String),
    Planned(String),
}

impl TripOutcome {
    pub fn text(&self) -> &str {
        match self {
            TripOutcome::Infeasible(text) | TripOutcome::Planned(text) => text,
        }
    }
}

impl SubmissionPipeline {
    /// Post a validated trip and wait for the plan
    pub async fn plan_trip(&self, trip: &TripRequest) -> Result<TripOutcome, SubmitError> {
        info!(from = %trip.from, to = %trip.to, days = trip.duration, "plan_trip: called");
        let response = self.backend().post(PLAN_TRIP_ENDPOINT, trip.body()).await?;
        let shape = ResponseShape::default();

        if response.get("feasible").and_then(Value::as_bool) == Some(false) {
            info!("plan_trip: route not feasible");
            return Ok(TripOutcome::Infeasible(shape.parse(&response).answer));
        }

        match job_id(&response) {
            Some(job_id) => {
                info!(%job_id, "plan_trip: waiting on job");
                let result = self.poller().poll(&job_id).await?;
                Ok(TripOutcome::Planned(shape.parse(&result).answer))
            }
            None => {
                debug!("plan_trip: answered directly");
                Ok(TripOutcome::Planned(shape.parse(&response).answer))
            }
        }
    }
}
