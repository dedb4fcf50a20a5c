//! Typed event surface between the wire codec and the engine.
//!
//! The transport layer (framing, connection lifecycle) is out of scope;
//! whatever host carries the messages parses them into [`BridgeEvent`]
//! values and hands them here one at a time. Each handler validates that
//! the flight plan exists and that the acting controller may modify it,
//! invokes the engine, and answers with an [`Ack`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::BridgeConfig;
use crate::direct_to::direct_to;
use crate::errors::ModifyError;
use crate::registry::AircraftRegistry;
use crate::route::{self, Direction};
use crate::snapshot::{self, FlightSnapshot};
use crate::squawk;
use crate::status::{self, StatusTransition};

fn minus_one() -> i32 {
    -1
}

/// A named event from the display program.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BridgeEvent {
    UpdateStatus {
        callsign: String,
        status: String,
        #[serde(default)]
        departure_time: String,
    },
    UpdateSquawk {
        callsign: String,
        prefix: String,
    },
    UpdateRunway {
        callsign: String,
        runway: String,
        direction: Direction,
    },
    UpdateDirectTo {
        callsign: String,
        #[serde(default)]
        route: String,
        #[serde(default)]
        new_destination: String,
        #[serde(default)]
        altitude: i32,
    },
    UpdateAltitude {
        callsign: String,
        #[serde(default = "minus_one")]
        cleared: i32,
        #[serde(rename = "final", default = "minus_one")]
        final_alt: i32,
    },
    UpdateSpeed {
        callsign: String,
        #[serde(default)]
        assigned_mach: i32,
        #[serde(default)]
        assigned_speed: i32,
    },
    UpdateScratchpad {
        callsign: String,
        value: String,
    },
    UpdateRoute {
        callsign: String,
        value: String,
    },
    UpdateDepartureTime {
        callsign: String,
        time: String,
    },
    RequestSnapshot {
        callsign: String,
    },
}

impl BridgeEvent {
    pub fn callsign(&self) -> &str {
        match self {
            BridgeEvent::UpdateStatus { callsign, .. }
            | BridgeEvent::UpdateSquawk { callsign, .. }
            | BridgeEvent::UpdateRunway { callsign, .. }
            | BridgeEvent::UpdateDirectTo { callsign, .. }
            | BridgeEvent::UpdateAltitude { callsign, .. }
            | BridgeEvent::UpdateSpeed { callsign, .. }
            | BridgeEvent::UpdateScratchpad { callsign, .. }
            | BridgeEvent::UpdateRoute { callsign, .. }
            | BridgeEvent::UpdateDepartureTime { callsign, .. }
            | BridgeEvent::RequestSnapshot { callsign } => callsign,
        }
    }
}

/// Acknowledgement sent back for every event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub callsign: String,
    pub modified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Ack {
    fn modified(callsign: impl Into<String>) -> Self {
        Ack {
            callsign: callsign.into(),
            modified: true,
            reason: None,
        }
    }

    fn not_modified(callsign: impl Into<String>, reason: impl Into<String>) -> Self {
        Ack {
            callsign: callsign.into(),
            modified: false,
            reason: Some(reason.into()),
        }
    }
}

/// Result of handling one event: the ack, plus a snapshot when the event
/// requested one.
#[derive(Debug, Clone)]
pub struct EventOutcome {
    pub ack: Ack,
    pub snapshot: Option<FlightSnapshot>,
}

impl EventOutcome {
    fn from_result(callsign: String, result: Result<(), ModifyError>) -> Self {
        let ack = match result {
            Ok(()) => Ack::modified(callsign),
            Err(err) => {
                debug!(callsign = %callsign, reason = %err, "event rejected");
                Ack::not_modified(callsign, err.to_string())
            }
        };
        EventOutcome {
            ack,
            snapshot: None,
        }
    }
}

/// Handle one event to completion.
///
/// Never panics; every failure comes back as a `modified = false` ack with
/// a reason string. Handlers run synchronously and do not block on I/O.
pub fn handle_event(
    registry: &AircraftRegistry,
    config: &BridgeConfig,
    event: BridgeEvent,
) -> EventOutcome {
    metrics::counter!("gateway.events").increment(1);

    match event {
        BridgeEvent::UpdateStatus {
            callsign,
            status,
            departure_time,
        } => {
            let result = update_status(registry, config, &callsign, &status, &departure_time);
            EventOutcome::from_result(callsign, result)
        }
        BridgeEvent::UpdateSquawk { callsign, prefix } => {
            let result = update_squawk(registry, config, &callsign, &prefix);
            EventOutcome::from_result(callsign, result)
        }
        BridgeEvent::UpdateRunway {
            callsign,
            runway,
            direction,
        } => {
            let result = update_runway(registry, config, &callsign, &runway, direction);
            EventOutcome::from_result(callsign, result)
        }
        BridgeEvent::UpdateDirectTo {
            callsign,
            route,
            new_destination,
            altitude,
        } => {
            let result =
                update_direct_to(registry, config, &callsign, &route, &new_destination, altitude);
            EventOutcome::from_result(callsign, result)
        }
        BridgeEvent::UpdateAltitude {
            callsign,
            cleared,
            final_alt,
        } => {
            let result = with_owned_plan(registry, config, &callsign, |plan| {
                if cleared != -1 {
                    plan.cleared_altitude = cleared;
                }
                if final_alt != -1 {
                    plan.final_altitude = final_alt;
                }
            });
            EventOutcome::from_result(callsign, result)
        }
        BridgeEvent::UpdateSpeed {
            callsign,
            assigned_mach,
            assigned_speed,
        } => {
            let result = with_owned_plan(registry, config, &callsign, |plan| {
                // Mach wins when both are supplied
                if assigned_mach > 0 {
                    plan.assigned_mach = assigned_mach;
                } else if assigned_speed > 0 {
                    plan.assigned_speed = assigned_speed;
                }
            });
            EventOutcome::from_result(callsign, result)
        }
        BridgeEvent::UpdateScratchpad { callsign, value } => {
            let result = with_owned_plan(registry, config, &callsign, |plan| {
                plan.set_scratchpad(&value);
            });
            EventOutcome::from_result(callsign, result)
        }
        BridgeEvent::UpdateRoute { callsign, value } => {
            let result = with_owned_plan(registry, config, &callsign, |plan| {
                plan.route = value.clone();
            });
            EventOutcome::from_result(callsign, result)
        }
        BridgeEvent::UpdateDepartureTime { callsign, time } => {
            let result = with_owned_plan(registry, config, &callsign, |plan| {
                plan.estimated_departure_time = time.clone();
            });
            EventOutcome::from_result(callsign, result)
        }
        BridgeEvent::RequestSnapshot { callsign } => {
            match registry.with_plan(&callsign, snapshot::build_snapshot) {
                Some(snap) => EventOutcome {
                    ack: Ack::modified(callsign),
                    snapshot: Some(snap),
                },
                None => EventOutcome {
                    ack: Ack::not_modified(callsign, ModifyError::NotFound.to_string()),
                    snapshot: None,
                },
            }
        }
    }
}

/// Existence plus ownership check: modifiable when untracked or tracked by
/// the acting controller.
fn ensure_modifiable(
    registry: &AircraftRegistry,
    config: &BridgeConfig,
    callsign: &str,
) -> Result<(), ModifyError> {
    let owned = registry
        .with_plan(callsign, |plan| {
            plan.tracking_controller.is_empty()
                || plan.tracking_controller == config.controller_id
        })
        .ok_or(ModifyError::NotFound)?;
    if owned {
        Ok(())
    } else {
        Err(ModifyError::NotOwned)
    }
}

/// Check, then run a mutation that cannot itself fail. A deletion racing
/// between the check and the write degrades to NotFound.
fn with_owned_plan(
    registry: &AircraftRegistry,
    config: &BridgeConfig,
    callsign: &str,
    f: impl FnOnce(&mut crate::registry::FlightPlan),
) -> Result<(), ModifyError> {
    ensure_modifiable(registry, config, callsign)?;
    registry
        .with_plan_mut(callsign, f)
        .ok_or(ModifyError::NotFound)
}

fn update_status(
    registry: &AircraftRegistry,
    config: &BridgeConfig,
    callsign: &str,
    requested: &str,
    departure_time: &str,
) -> Result<(), ModifyError> {
    ensure_modifiable(registry, config, callsign)?;
    let transition: StatusTransition = requested.parse()?;
    let time = (!departure_time.is_empty()).then_some(departure_time);

    info!(callsign, status = requested, "applying status transition");
    registry
        .with_plan_mut(callsign, |plan| {
            status::apply_status_transition(plan, transition, time, config.facility)
        })
        .ok_or(ModifyError::NotFound)?
}

fn update_squawk(
    registry: &AircraftRegistry,
    config: &BridgeConfig,
    callsign: &str,
    prefix: &str,
) -> Result<(), ModifyError> {
    ensure_modifiable(registry, config, callsign)?;
    squawk::validate_prefix(prefix)?;

    // Allocate before taking the plan's shard lock: the scan iterates the
    // whole registry.
    let code = squawk::allocate(prefix, registry);
    info!(callsign, code = %code, "assigning squawk");
    registry
        .with_plan_mut(callsign, |plan| plan.squawk = code.clone())
        .ok_or(ModifyError::NotFound)
}

fn update_runway(
    registry: &AircraftRegistry,
    config: &BridgeConfig,
    callsign: &str,
    runway: &str,
    direction: Direction,
) -> Result<(), ModifyError> {
    ensure_modifiable(registry, config, callsign)?;
    route::validate_runway(runway)?;

    registry
        .with_plan_mut(callsign, |plan| {
            let new_route = route::insert_runway(runway, plan, direction);
            plan.route = new_route;
        })
        .ok_or(ModifyError::NotFound)
}

fn update_direct_to(
    registry: &AircraftRegistry,
    config: &BridgeConfig,
    callsign: &str,
    route_value: &str,
    new_destination: &str,
    altitude: i32,
) -> Result<(), ModifyError> {
    ensure_modifiable(registry, config, callsign)?;

    registry
        .with_plan_mut(callsign, |plan| {
            if !new_destination.is_empty() {
                plan.destination = new_destination.to_string();
                direct_to(route_value, plan, true);
            } else if route_value.starts_with("DCT") {
                direct_to(route_value, plan, true);
            } else {
                plan.route = route_value.to_string();
            }

            if altitude > 0 {
                plan.cleared_altitude = altitude;
            }
        })
        .ok_or(ModifyError::NotFound)
}
