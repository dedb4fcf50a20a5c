//! Read-only coded flight summaries for the external display.
//!
//! A snapshot is the value the excluded codec layer serializes back over
//! the wire after every mutation or radar tick. It is derived entirely from
//! the live plan - nothing here is stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::conformance;
use crate::registry::FlightPlan;
use crate::status::{self, SpecialStatus, StatusCode};

/// Altitudes at or above this are flight levels on the display.
const FLIGHT_LEVEL_FLOOR_FT: i32 = 18000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AltitudeSummary {
    /// Display abbreviation for the cleared altitude: hundreds of feet,
    /// `CAPR` (cleared approach) or `B` (cleared out of controlled
    /// airspace) for the reserved sentinel values.
    pub cleared_abbr: String,
    pub cleared: i32,
    pub final_abbr: String,
    #[serde(rename = "final")]
    pub final_ft: i32,
    pub reached: bool,
    pub error: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedSummary {
    pub assigned_abbr: String,
    pub assigned_mach: i32,
    pub assigned_speed: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSnapshot {
    pub callsign: String,
    pub timestamp: DateTime<Utc>,
    pub status: StatusCode,
    pub special: SpecialStatus,
    pub scratchpad: String,
    pub squawk: String,
    pub route: String,
    pub origin: String,
    pub destination: String,
    pub etd: String,
    pub atd: String,
    pub altitude: AltitudeSummary,
    pub speed: SpeedSummary,
}

/// Build the display summary for one flight.
pub fn build_snapshot(plan: &FlightPlan) -> FlightSnapshot {
    let cleared_abbr = match plan.cleared_altitude {
        // Not assigned: assume it is equal to cruise
        0 => (plan.final_altitude / 100).to_string(),
        1 => "CAPR".to_string(),
        2 => "B".to_string(),
        cleared => (cleared / 100).to_string(),
    };

    let final_abbr = if plan.final_altitude == 0 {
        "fld".to_string()
    } else if plan.final_altitude < FLIGHT_LEVEL_FLOOR_FT {
        format!("A{}", plan.final_altitude / 100)
    } else {
        format!("F{}", plan.final_altitude / 100)
    };

    // Conformance only makes sense against a correlated radar reading, and
    // never against the reserved sentinel clearances.
    let target = match plan.cleared_altitude {
        0 if plan.final_altitude > 0 => Some(plan.final_altitude),
        t if t > 2 => Some(t),
        _ => None,
    };
    let conformance = match (plan.radar_position.as_ref(), target) {
        (Some(pos), Some(target)) => {
            conformance::evaluate(pos.altitude_ft, target, pos.vertical_speed_fpm)
        }
        _ => conformance::Conformance::default(),
    };

    let assigned_abbr = if plan.assigned_mach > 0 {
        format!("A{:.2}", plan.assigned_mach as f64 / 100.0)
    } else if plan.assigned_speed > 0 {
        format!("A{}", plan.assigned_speed)
    } else {
        String::new()
    };

    FlightSnapshot {
        callsign: plan.callsign.clone(),
        timestamp: Utc::now(),
        status: status::derive_ground_status(plan),
        special: status::derive_special_status(plan),
        scratchpad: plan.scratchpad.clone(),
        squawk: plan.squawk.clone(),
        route: plan.route.clone(),
        origin: plan.origin.clone(),
        destination: plan.destination.clone(),
        etd: plan.estimated_departure_time.clone(),
        atd: plan.actual_departure_time.clone(),
        altitude: AltitudeSummary {
            cleared_abbr,
            cleared: plan.cleared_altitude,
            final_abbr,
            final_ft: plan.final_altitude,
            reached: conformance.reached,
            error: conformance.error,
        },
        speed: SpeedSummary {
            assigned_abbr,
            assigned_mach: plan.assigned_mach,
            assigned_speed: plan.assigned_speed,
        },
    }
}
