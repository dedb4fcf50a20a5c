//! In-memory registry of live flight plans.
//!
//! The registry is the only shared mutable resource in the engine. It is an
//! explicit object passed by reference into every call - there is no ambient
//! global accessor. `DashMap` gives per-callsign exclusion, which is what
//! keeps the "no partial writes on failure" guarantee intact if the host
//! dispatches events from more than one thread.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::position::PositionSample;

/// The host client's own coarse status vocabulary for an aircraft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundState {
    #[default]
    NoStatus,
    Push,
    Taxi,
    Departed,
    Arrived,
    TaxiIn,
    Closed,
}

/// Two-party departure release handshake state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseState {
    #[default]
    None,
    Requested,
    Released,
}

/// Voice capability filed for the aircraft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommCapability {
    #[default]
    Voice,
    ReceiveOnly,
    TextOnly,
    Unknown,
}

/// A named point extracted from the route, with its coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// One aircraft's controllable state.
///
/// Fields default to "unset" so a flight can be loaded from a minimal JSON
/// object carrying only a callsign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightPlan {
    pub callsign: String,
    #[serde(default)]
    pub ground_state: GroundState,
    #[serde(default)]
    pub clearance_granted: bool,
    /// Short free-text field the external display reads its coded status
    /// from. Writes go through [`FlightPlan::set_scratchpad`] so the host's
    /// marker side effects apply.
    #[serde(default)]
    pub scratchpad: String,
    #[serde(default)]
    pub release_state: ReleaseState,
    /// Feet; 0 = unset. 1 and 2 are reserved sentinels (cleared for an
    /// approach / cleared out of controlled airspace), never literal
    /// altitudes.
    #[serde(default)]
    pub cleared_altitude: i32,
    #[serde(default)]
    pub final_altitude: i32,
    /// Knots; <= 0 = unset.
    #[serde(default)]
    pub assigned_speed: i32,
    /// Hundredths of a mach number; <= 0 = unset.
    #[serde(default)]
    pub assigned_mach: i32,
    /// 4 characters, digits '0'-'7' only.
    #[serde(default)]
    pub squawk: String,
    /// Free-text route, space-delimited tokens. May embed
    /// `PROCEDURE/RUNWAY` or `AIRPORT/RUNWAY` tokens.
    #[serde(default)]
    pub route: String,
    #[serde(default)]
    pub sid: String,
    #[serde(default)]
    pub star: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub comm: CommCapability,
    /// Position identifier of the tracking controller; empty = untracked.
    #[serde(default)]
    pub tracking_controller: String,
    /// HHMM, empty = unset.
    #[serde(default)]
    pub estimated_departure_time: String,
    /// HHMM, empty = unset.
    #[serde(default)]
    pub actual_departure_time: String,
    /// Direct-to pointer as supplied by the controller.
    #[serde(default)]
    pub direct_to: String,
    /// Extracted route points, origin first.
    #[serde(default)]
    pub route_points: Vec<RoutePoint>,
    /// Index of the currently assigned (direct-to) route point.
    #[serde(default)]
    pub assigned_point_index: usize,
    /// Correlated radar target position, when one exists.
    #[serde(default)]
    pub radar_position: Option<PositionSample>,
    /// Predicted flight-plan-track position, used when uncorrelated.
    #[serde(default)]
    pub track_position: Option<PositionSample>,
}

impl FlightPlan {
    pub fn new(callsign: impl Into<String>) -> Self {
        FlightPlan {
            callsign: callsign.into(),
            ground_state: GroundState::default(),
            clearance_granted: false,
            scratchpad: String::new(),
            release_state: ReleaseState::default(),
            cleared_altitude: 0,
            final_altitude: 0,
            assigned_speed: 0,
            assigned_mach: 0,
            squawk: String::new(),
            route: String::new(),
            sid: String::new(),
            star: String::new(),
            origin: String::new(),
            destination: String::new(),
            remarks: String::new(),
            comm: CommCapability::default(),
            tracking_controller: String::new(),
            estimated_departure_time: String::new(),
            actual_departure_time: String::new(),
            direct_to: String::new(),
            route_points: Vec::new(),
            assigned_point_index: 0,
            radar_position: None,
            track_position: None,
        }
    }

    /// Write the carrier field, applying the host's marker side effects.
    ///
    /// The host has no dedicated status channel: certain short strings
    /// written to this field move the ground state, the clearance flag or
    /// the release handshake. The literal text is stored either way, since
    /// the display reads the field verbatim.
    pub fn set_scratchpad(&mut self, value: &str) {
        match value {
            "CLEA" => self.clearance_granted = true,
            "NOTC" => self.clearance_granted = false,
            "PUSH" => self.ground_state = GroundState::Push,
            "TAXI" => self.ground_state = GroundState::Taxi,
            "DEPA" => self.ground_state = GroundState::Departed,
            "ARR" => self.ground_state = GroundState::Arrived,
            "TXIN" => self.ground_state = GroundState::TaxiIn,
            "PARK" => self.ground_state = GroundState::Closed,
            "RREQ" => self.release_state = ReleaseState::Requested,
            "RREL" => self.release_state = ReleaseState::Released,
            _ => {}
        }
        self.scratchpad = value.to_string();
    }

    /// Best available position: correlated radar target first, then the
    /// predicted track position.
    pub fn best_position(&self) -> Option<&PositionSample> {
        self.radar_position.as_ref().or(self.track_position.as_ref())
    }
}

/// All live flight plans, keyed by callsign.
#[derive(Debug, Default)]
pub struct AircraftRegistry {
    flights: DashMap<String, FlightPlan>,
}

impl AircraftRegistry {
    pub fn new() -> Self {
        AircraftRegistry {
            flights: DashMap::new(),
        }
    }

    /// Insert or replace a flight plan. A new plan filed under a callsign
    /// that was deleted earlier is a fresh entity.
    pub fn insert(&self, plan: FlightPlan) {
        self.flights.insert(plan.callsign.clone(), plan);
    }

    /// Remove a plan (flight plan deletion / disconnect).
    pub fn remove(&self, callsign: &str) -> Option<FlightPlan> {
        self.flights.remove(callsign).map(|(_, plan)| plan)
    }

    /// Run a closure against a live plan. Returns `None` when the plan does
    /// not exist (including a deletion that raced this call).
    pub fn with_plan<R>(&self, callsign: &str, f: impl FnOnce(&FlightPlan) -> R) -> Option<R> {
        self.flights.get(callsign).map(|plan| f(&plan))
    }

    /// Run a closure against a live plan with write access. `None` when the
    /// plan does not exist.
    pub fn with_plan_mut<R>(
        &self,
        callsign: &str,
        f: impl FnOnce(&mut FlightPlan) -> R,
    ) -> Option<R> {
        self.flights.get_mut(callsign).map(|mut plan| f(&mut plan))
    }

    /// Whether any live flight currently holds the given squawk code.
    ///
    /// Callers must not hold a plan reference while scanning - DashMap
    /// shards would deadlock against this iteration.
    pub fn squawk_in_use(&self, code: &str) -> bool {
        self.flights.iter().any(|entry| entry.squawk == code)
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    /// Callsigns of all live flights, in no particular order.
    pub fn callsigns(&self) -> Vec<String> {
        self.flights.iter().map(|e| e.key().clone()).collect()
    }
}
