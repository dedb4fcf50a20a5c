//! Status translation between the host client's ground-state vocabulary and
//! the display program's coded statuses.
//!
//! The display has no dedicated status channel, so coded statuses travel
//! inside the scratchpad carrier field. The marker strings live in one table
//! here; if a real status channel ever appears, only this table changes.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ModifyError;
use crate::registry::{CommCapability, FlightPlan, GroundState, ReleaseState};

/// Squawk code indicating an emergency.
pub const EMERGENCY_SQUAWK: &str = "7700";
/// Squawk code indicating radio failure.
pub const RADIO_FAILURE_SQUAWK: &str = "7600";
/// Remarks substring marking a medevac flight.
pub const MEDEVAC_MARKER: &str = "STS/MEDEVAC";

/// Ground speed at or above which an aircraft is considered airborne.
const AIRBORNE_GROUND_SPEED_KTS: i32 = 40;
/// Beyond this distance from both origin and destination a cleared flight
/// shows as enroute.
const ENROUTE_DISTANCE_NM: f64 = 40.0;

// Carrier markers understood by the host. CLEA/NOTC move the clearance
// flag, RREQ/RREL move the release handshake, the rest move the ground
// state. See FlightPlan::set_scratchpad.
const MARKER_CLEARED: &str = "CLEA";
const MARKER_NOT_CLEARED: &str = "NOTC";
const MARKER_PUSH: &str = "PUSH";
const MARKER_TAXI: &str = "TAXI";
const MARKER_DEPARTED: &str = "DEPA";
const MARKER_ARRIVED: &str = "ARR";
const MARKER_TAXI_IN: &str = "TXIN";
const MARKER_PARKED: &str = "PARK";
const MARKER_RELEASE_REQUESTED: &str = "RREQ";
const MARKER_RELEASE_RELEASED: &str = "RREL";

/// Coded status shown on the external display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatusCode {
    /// No status / not updated
    Nsts,
    /// Airborne with no IFR clearance
    Abnc,
    /// IFR clearance issued
    Clrd,
    /// Pushback authorized
    Push,
    /// Taxiing on own clearance
    Txoc,
    /// Taxiing, awaiting release
    Txrq,
    /// Taxiing with a valid release
    Txrl,
    /// Airborne
    Depa,
    /// Enroute, away from both airports
    Enr,
    /// Arriving
    Arr,
    /// Taxiing in
    Txin,
    /// Flight plan closed
    Park,
}

impl StatusCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCode::Nsts => "NSTS",
            StatusCode::Abnc => "ABNC",
            StatusCode::Clrd => "CLRD",
            StatusCode::Push => "PUSH",
            StatusCode::Txoc => "TXOC",
            StatusCode::Txrq => "TXRQ",
            StatusCode::Txrl => "TXRL",
            StatusCode::Depa => "DEPA",
            StatusCode::Enr => "ENR",
            StatusCode::Arr => "ARR",
            StatusCode::Txin => "TXIN",
            StatusCode::Park => "PARK",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display-only special status, derived per update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialStatus {
    Text,
    Emergency,
    CommFailure,
    Medevac,
    ReceiveOnly,
    Unknown,
    None,
}

/// A status transition requested over the wire.
///
/// Closed enum so an added status fails to compile until every match arm
/// handles it. ABNC and ENR are derive-only and deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatusTransition {
    Nsts,
    Clrd,
    Push,
    Txoc,
    Txrq,
    Txrl,
    Depa,
    Arr,
    Txin,
    Park,
}

impl StatusTransition {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusTransition::Nsts => "NSTS",
            StatusTransition::Clrd => "CLRD",
            StatusTransition::Push => "PUSH",
            StatusTransition::Txoc => "TXOC",
            StatusTransition::Txrq => "TXRQ",
            StatusTransition::Txrl => "TXRL",
            StatusTransition::Depa => "DEPA",
            StatusTransition::Arr => "ARR",
            StatusTransition::Txin => "TXIN",
            StatusTransition::Park => "PARK",
        }
    }
}

impl FromStr for StatusTransition {
    type Err = ModifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NSTS" => Ok(StatusTransition::Nsts),
            "CLRD" => Ok(StatusTransition::Clrd),
            "PUSH" => Ok(StatusTransition::Push),
            "TXOC" => Ok(StatusTransition::Txoc),
            "TXRQ" => Ok(StatusTransition::Txrq),
            "TXRL" => Ok(StatusTransition::Txrl),
            "DEPA" => Ok(StatusTransition::Depa),
            "ARR" => Ok(StatusTransition::Arr),
            "TXIN" => Ok(StatusTransition::Txin),
            "PARK" => Ok(StatusTransition::Park),
            _ => Err(ModifyError::invalid_input("Ground status is invalid.")),
        }
    }
}

/// Derive the coded ground status from the current field snapshot.
///
/// Pure function of the plan: evaluated in fixed precedence order, first
/// match wins, so two identical snapshots always derive the same code.
pub fn derive_ground_status(plan: &FlightPlan) -> StatusCode {
    match plan.ground_state {
        GroundState::Push => return StatusCode::Push,
        GroundState::Arrived => return StatusCode::Arr,
        GroundState::TaxiIn => return StatusCode::Txin,
        GroundState::Closed => return StatusCode::Park,
        GroundState::Taxi => {
            return if plan.release_state == ReleaseState::Released {
                StatusCode::Txrl
            } else if plan.clearance_granted && plan.release_state != ReleaseState::Requested {
                StatusCode::Txoc
            } else {
                StatusCode::Txrq
            };
        }
        GroundState::NoStatus | GroundState::Departed => {}
    }

    if !plan.clearance_granted {
        return if is_airborne(plan) && plan.ground_state == GroundState::Departed {
            StatusCode::Abnc
        } else {
            StatusCode::Nsts
        };
    }

    if away_from_both_airports(plan) {
        return StatusCode::Enr;
    }

    if plan.ground_state == GroundState::Departed {
        StatusCode::Depa
    } else {
        StatusCode::Clrd
    }
}

/// Derive the display-only special status flag, first match wins.
pub fn derive_special_status(plan: &FlightPlan) -> SpecialStatus {
    if plan.comm == CommCapability::TextOnly {
        SpecialStatus::Text
    } else if plan.squawk == EMERGENCY_SQUAWK {
        SpecialStatus::Emergency
    } else if plan.squawk == RADIO_FAILURE_SQUAWK {
        SpecialStatus::CommFailure
    } else if plan.remarks.contains(MEDEVAC_MARKER) {
        SpecialStatus::Medevac
    } else if plan.comm == CommCapability::ReceiveOnly {
        SpecialStatus::ReceiveOnly
    } else if plan.comm == CommCapability::Unknown {
        SpecialStatus::Unknown
    } else {
        SpecialStatus::None
    }
}

fn is_airborne(plan: &FlightPlan) -> bool {
    plan.best_position()
        .map(|pos| pos.ground_speed_kts >= AIRBORNE_GROUND_SPEED_KTS)
        .unwrap_or(false)
}

/// True when the flight is more than the enroute threshold away from both
/// the first and last extracted route points. Without a position or a
/// usable route this cannot be established and the answer is false.
fn away_from_both_airports(plan: &FlightPlan) -> bool {
    let Some(pos) = plan.best_position() else {
        return false;
    };
    let (Some(first), Some(last)) = (plan.route_points.first(), plan.route_points.last()) else {
        return false;
    };
    if plan.route_points.len() < 2 {
        return false;
    }
    pos.distance_to_nm(first.latitude, first.longitude) > ENROUTE_DISTANCE_NM
        && pos.distance_to_nm(last.latitude, last.longitude) > ENROUTE_DISTANCE_NM
}

/// Apply a requested status transition to the plan.
///
/// Writes carrier markers in a fixed order per status; the redundant double
/// writes in some sequences are what the display host needs to repaint, so
/// the order is load-bearing. On failure the plan is left exactly as it was
/// before the call.
pub fn apply_status_transition(
    plan: &mut FlightPlan,
    transition: StatusTransition,
    departure_time: Option<&str>,
    facility: u8,
) -> Result<(), ModifyError> {
    match transition {
        StatusTransition::Nsts => {
            plan.set_scratchpad(MARKER_NOT_CLEARED);
            plan.set_scratchpad("");
        }
        StatusTransition::Clrd => {
            plan.set_scratchpad(MARKER_CLEARED);
        }
        StatusTransition::Push => {
            plan.set_scratchpad(MARKER_PUSH);
        }
        StatusTransition::Txoc => {
            plan.set_scratchpad(MARKER_CLEARED);
            plan.set_scratchpad(MARKER_TAXI);
        }
        StatusTransition::Txrq => {
            plan.set_scratchpad(MARKER_TAXI);
            plan.set_scratchpad(MARKER_RELEASE_REQUESTED);
        }
        StatusTransition::Txrl => {
            // Only FSS and centre facilities may issue a departure release.
            if (2..=4).contains(&facility) {
                return Err(ModifyError::guard_failed(
                    "Facility level cannot issue a departure release.",
                ));
            }
            plan.set_scratchpad(MARKER_TAXI);
            plan.set_scratchpad(MARKER_CLEARED);
            plan.set_scratchpad(MARKER_RELEASE_RELEASED);
        }
        StatusTransition::Depa => {
            plan.set_scratchpad(MARKER_DEPARTED);
            plan.set_scratchpad(MARKER_CLEARED);

            // Prefer an explicitly supplied departure time, fall back to a
            // previously recorded one, otherwise leave the field alone.
            match departure_time {
                Some(time) if time.len() == 4 => {
                    plan.actual_departure_time = time.to_string();
                }
                _ => {
                    if plan.actual_departure_time.len() != 4 {
                        debug!(
                            callsign = %plan.callsign,
                            "no usable departure time, leaving recorded value"
                        );
                    }
                }
            }

            plan.set_scratchpad("");
        }
        StatusTransition::Arr => {
            plan.set_scratchpad(MARKER_ARRIVED);
        }
        StatusTransition::Txin => {
            plan.set_scratchpad(MARKER_TAXI_IN);
        }
        StatusTransition::Park => {
            plan.set_scratchpad(MARKER_PARKED);
        }
    }

    metrics::counter!("status.transitions", "status" => transition.as_str()).increment(1);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::PositionSample;
    use crate::registry::RoutePoint;

    fn airborne_sample(ground_speed_kts: i32) -> PositionSample {
        PositionSample {
            latitude: 45.0,
            longitude: -78.0,
            altitude_ft: 10000,
            vertical_speed_fpm: 0,
            ground_speed_kts,
        }
    }

    #[test]
    fn test_direct_ground_state_mappings() {
        let mut plan = FlightPlan::new("ACA101");

        plan.ground_state = GroundState::Push;
        assert_eq!(derive_ground_status(&plan), StatusCode::Push);
        plan.ground_state = GroundState::Arrived;
        assert_eq!(derive_ground_status(&plan), StatusCode::Arr);
        plan.ground_state = GroundState::TaxiIn;
        assert_eq!(derive_ground_status(&plan), StatusCode::Txin);
        plan.ground_state = GroundState::Closed;
        assert_eq!(derive_ground_status(&plan), StatusCode::Park);
    }

    #[test]
    fn test_taxi_splits_on_release_and_clearance() {
        let mut plan = FlightPlan::new("ACA101");
        plan.ground_state = GroundState::Taxi;

        plan.release_state = ReleaseState::Released;
        assert_eq!(derive_ground_status(&plan), StatusCode::Txrl);

        plan.release_state = ReleaseState::None;
        plan.clearance_granted = true;
        assert_eq!(derive_ground_status(&plan), StatusCode::Txoc);

        plan.release_state = ReleaseState::Requested;
        assert_eq!(derive_ground_status(&plan), StatusCode::Txrq);

        plan.release_state = ReleaseState::None;
        plan.clearance_granted = false;
        assert_eq!(derive_ground_status(&plan), StatusCode::Txrq);
    }

    #[test]
    fn test_unclear_airborne_departed_is_abnc() {
        let mut plan = FlightPlan::new("CGABC");
        plan.ground_state = GroundState::Departed;
        plan.radar_position = Some(airborne_sample(120));
        assert_eq!(derive_ground_status(&plan), StatusCode::Abnc);

        // Below the airborne threshold it is still NSTS
        plan.radar_position = Some(airborne_sample(30));
        assert_eq!(derive_ground_status(&plan), StatusCode::Nsts);

        // Not departed: NSTS regardless of speed
        plan.ground_state = GroundState::NoStatus;
        plan.radar_position = Some(airborne_sample(120));
        assert_eq!(derive_ground_status(&plan), StatusCode::Nsts);
    }

    #[test]
    fn test_enroute_when_away_from_both_airports() {
        let mut plan = FlightPlan::new("ACA101");
        plan.clearance_granted = true;
        plan.ground_state = GroundState::Departed;
        plan.route_points = vec![
            RoutePoint {
                name: "CYVR".into(),
                latitude: 49.19,
                longitude: -123.18,
            },
            RoutePoint {
                name: "CYYZ".into(),
                latitude: 43.68,
                longitude: -79.63,
            },
        ];

        // Mid-country, far from both ends
        plan.radar_position = Some(PositionSample {
            latitude: 50.0,
            longitude: -97.0,
            altitude_ft: 35000,
            vertical_speed_fpm: 0,
            ground_speed_kts: 450,
        });
        assert_eq!(derive_ground_status(&plan), StatusCode::Enr);

        // Close to the origin: departed, not enroute
        plan.radar_position = Some(PositionSample {
            latitude: 49.3,
            longitude: -123.0,
            altitude_ft: 4000,
            vertical_speed_fpm: 1500,
            ground_speed_kts: 220,
        });
        assert_eq!(derive_ground_status(&plan), StatusCode::Depa);
    }

    #[test]
    fn test_cleared_on_ground_is_clrd() {
        let mut plan = FlightPlan::new("ACA101");
        plan.clearance_granted = true;
        assert_eq!(derive_ground_status(&plan), StatusCode::Clrd);
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let mut plan = FlightPlan::new("ACA101");
        plan.clearance_granted = true;
        plan.ground_state = GroundState::Taxi;
        let first = derive_ground_status(&plan);
        let second = derive_ground_status(&plan);
        assert_eq!(first, second);
        assert_eq!(first, StatusCode::Txoc);
    }

    #[test]
    fn test_special_status_precedence() {
        let mut plan = FlightPlan::new("ACA101");
        assert_eq!(derive_special_status(&plan), SpecialStatus::None);

        plan.comm = CommCapability::Unknown;
        assert_eq!(derive_special_status(&plan), SpecialStatus::Unknown);

        plan.comm = CommCapability::ReceiveOnly;
        assert_eq!(derive_special_status(&plan), SpecialStatus::ReceiveOnly);

        plan.remarks = "RMK/STS/MEDEVAC".into();
        assert_eq!(derive_special_status(&plan), SpecialStatus::Medevac);

        plan.squawk = RADIO_FAILURE_SQUAWK.into();
        assert_eq!(derive_special_status(&plan), SpecialStatus::CommFailure);

        plan.squawk = EMERGENCY_SQUAWK.into();
        assert_eq!(derive_special_status(&plan), SpecialStatus::Emergency);

        // Text-only wins over everything
        plan.comm = CommCapability::TextOnly;
        assert_eq!(derive_special_status(&plan), SpecialStatus::Text);
    }

    #[test]
    fn test_nsts_clears_clearance_and_carrier() {
        let mut plan = FlightPlan::new("ACA101");
        plan.clearance_granted = true;
        plan.scratchpad = "CLEA".into();

        apply_status_transition(&mut plan, StatusTransition::Nsts, None, 6).unwrap();
        assert!(!plan.clearance_granted);
        assert_eq!(plan.scratchpad, "");
    }

    #[test]
    fn test_clrd_sets_cleared_marker() {
        let mut plan = FlightPlan::new("ACA101");
        apply_status_transition(&mut plan, StatusTransition::Clrd, None, 6).unwrap();
        assert!(plan.clearance_granted);
        assert_eq!(plan.scratchpad, "CLEA");
    }

    #[test]
    fn test_txoc_ends_with_taxi_marker() {
        let mut plan = FlightPlan::new("ACA101");
        apply_status_transition(&mut plan, StatusTransition::Txoc, None, 6).unwrap();
        assert!(plan.clearance_granted);
        assert_eq!(plan.ground_state, GroundState::Taxi);
        assert_eq!(plan.scratchpad, "TAXI");
        assert_eq!(derive_ground_status(&plan), StatusCode::Txoc);
    }

    #[test]
    fn test_txrq_requests_release() {
        let mut plan = FlightPlan::new("ACA101");
        apply_status_transition(&mut plan, StatusTransition::Txrq, None, 6).unwrap();
        assert_eq!(plan.ground_state, GroundState::Taxi);
        assert_eq!(plan.release_state, ReleaseState::Requested);
        assert_eq!(plan.scratchpad, "RREQ");
        assert_eq!(derive_ground_status(&plan), StatusCode::Txrq);
    }

    #[test]
    fn test_txrl_guard_rejects_restricted_facility() {
        let mut plan = FlightPlan::new("ACA101");
        let before = plan.clone();

        let err = apply_status_transition(&mut plan, StatusTransition::Txrl, None, 3).unwrap_err();
        assert!(matches!(err, ModifyError::GuardFailed(_)));
        assert_eq!(plan, before, "guard failure must not mutate the plan");
    }

    #[test]
    fn test_txrl_allowed_for_fss_and_centre() {
        for facility in [1u8, 6] {
            let mut plan = FlightPlan::new("ACA101");
            apply_status_transition(&mut plan, StatusTransition::Txrl, None, facility).unwrap();
            assert_eq!(plan.release_state, ReleaseState::Released);
            assert_eq!(plan.scratchpad, "RREL");
            assert_eq!(derive_ground_status(&plan), StatusCode::Txrl);
        }
    }

    #[test]
    fn test_depa_prefers_supplied_time() {
        let mut plan = FlightPlan::new("ACA101");
        plan.actual_departure_time = "1200".into();

        apply_status_transition(&mut plan, StatusTransition::Depa, Some("1315"), 6).unwrap();
        assert_eq!(plan.actual_departure_time, "1315");
        assert_eq!(plan.ground_state, GroundState::Departed);
        assert!(plan.clearance_granted);
        assert_eq!(plan.scratchpad, "");
    }

    #[test]
    fn test_depa_keeps_recorded_time_when_supplied_invalid() {
        let mut plan = FlightPlan::new("ACA101");
        plan.actual_departure_time = "1200".into();

        apply_status_transition(&mut plan, StatusTransition::Depa, Some("13"), 6).unwrap();
        assert_eq!(plan.actual_departure_time, "1200");

        plan.actual_departure_time = String::new();
        apply_status_transition(&mut plan, StatusTransition::Depa, None, 6).unwrap();
        assert_eq!(plan.actual_departure_time, "");
    }

    #[test]
    fn test_transition_parse_rejects_derive_only_codes() {
        assert!("ABNC".parse::<StatusTransition>().is_err());
        assert!("ENR".parse::<StatusTransition>().is_err());
        assert!("BOGUS".parse::<StatusTransition>().is_err());
        assert_eq!(
            "TXRL".parse::<StatusTransition>().unwrap(),
            StatusTransition::Txrl
        );
    }
}
