//! "Direct-to" route splicing from the aircraft's present position.
//!
//! Clearing an aircraft direct to a fix rewrites the route so it starts at
//! the aircraft's current coordinates in compact degrees/minutes notation,
//! anchored at the named fix.

use tracing::debug;

use crate::position::PositionSample;
use crate::registry::FlightPlan;

/// Format a position as `DDMM{N|S}DDDMM{E|W} ` - whole degrees, rounded
/// minutes, longitude degrees zero-padded to three digits, trailing space
/// separating it from the fix that follows.
pub fn format_present_position(sample: &PositionSample) -> String {
    let lat_deg = sample.latitude.trunc();
    let lat_min = ((sample.latitude - lat_deg) * 60.0).abs().round() as i32;
    let lon_deg = sample.longitude.trunc();
    let lon_min = ((sample.longitude - lon_deg) * 60.0).abs().round() as i32;

    let ns = if sample.latitude > 0.0 { "N" } else { "S" };
    let ew = if sample.longitude > 0.0 { "E" } else { "W" };

    format!(
        "{}{:02}{}{:03}{:02}{} ",
        lat_deg.abs() as i32,
        lat_min,
        ns,
        lon_deg.abs() as i32,
        lon_min,
        ew
    )
}

/// Splice a direct-to clearance into the plan's route.
///
/// The present position comes from the correlated radar target, falling
/// back to the predicted track position; with neither the route is left
/// untouched and `None` is returned. The supplied waypoint is persisted as
/// the direct-to pointer either way, matching the host's write order.
///
/// With `as_new_route` the waypoint is a `DCT <fix>`-style token whose fix
/// name begins at offset 4, and the new route is the present position
/// followed by that fix. Otherwise the existing route is truncated at the
/// waypoint when it appears, or rebuilt from the currently assigned route
/// point onward when it does not.
pub fn direct_to(waypoint: &str, plan: &mut FlightPlan, as_new_route: bool) -> Option<String> {
    plan.direct_to = waypoint.to_string();

    let Some(position) = plan.best_position().copied() else {
        debug!(callsign = %plan.callsign, "no position available for direct-to");
        return None;
    };
    let present = format_present_position(&position);

    let new_route = if as_new_route {
        let fix = waypoint.get(4..).unwrap_or("");
        format!("{present}{fix}")
    } else {
        match plan.route.find(waypoint) {
            Some(idx) => format!("{}{}", present, &plan.route[idx..]),
            None => {
                // Fix isn't in the route text; rebuild from the assigned
                // route point onward.
                let mut rebuilt = present.clone();
                for point in plan.route_points.iter().skip(plan.assigned_point_index) {
                    rebuilt.push_str(&point.name);
                    rebuilt.push(' ');
                }
                rebuilt
            }
        }
    };

    plan.route = new_route.trim_end().to_string();
    Some(plan.route.clone())
}
