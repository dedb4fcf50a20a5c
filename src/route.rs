//! Route-string runway assignment editing.
//!
//! The host encodes runway assignments as `PROCEDURE/RUNWAY` (or
//! `AIRPORT/RUNWAY` when no procedure is filed) tokens inside the free-text
//! route. Editing is pure string transformation: replace an existing
//! assignment token in place, or add one at the correct end of the route,
//! without touching unrelated tokens.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ModifyError;
use crate::registry::FlightPlan;

/// Whether a runway assignment applies to the departure or arrival end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Departure,
    Arrival,
}

static RUNWAY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(0?[1-9]|[1-2][0-9]|3[0-6])[LCR]?$").unwrap());

/// Validate a runway code (`01`..`36`, optional `L`/`C`/`R` suffix) before
/// it reaches the editor.
pub fn validate_runway(code: &str) -> Result<(), ModifyError> {
    if RUNWAY_PATTERN.is_match(code) {
        Ok(())
    } else {
        Err(ModifyError::invalid_input("Runway code is invalid."))
    }
}

/// Insert or replace a runway-assignment token in the plan's route.
///
/// Prefers the filed procedure (SID for departures, STAR for arrivals) as
/// the token anchor, falling back to the airport code. An existing
/// `/NN` or `/NNL|C|R` suffix on the matched token is overwritten rather
/// than duplicated, so re-assignment is idempotent. When neither anchor
/// appears as a route token the assignment is prepended (departure) or
/// appended (arrival). Never returns an empty string: with nothing to
/// anchor on, the original route comes back unchanged.
pub fn insert_runway(runway: &str, plan: &FlightPlan, direction: Direction) -> String {
    let (procedure, airport) = match direction {
        Direction::Departure => (plan.sid.as_str(), plan.origin.as_str()),
        Direction::Arrival => (plan.star.as_str(), plan.destination.as_str()),
    };
    let route = plan.route.trim();

    let anchor = if !procedure.is_empty() { procedure } else { airport };
    if anchor.is_empty() {
        // No procedure and no airport: nothing sensible to compose.
        return plan.route.clone();
    }
    let assignment = format!("{anchor}/{runway}");

    if !procedure.is_empty() && route.contains(procedure) {
        if let Some(replaced) = replace_assignment_token(route, procedure, airport, &assignment) {
            debug!(callsign = %plan.callsign, route = %replaced, "replaced procedure assignment");
            return replaced;
        }
    } else if procedure.is_empty() && route.contains(airport) {
        if let Some(replaced) = replace_assignment_token(route, airport, "", &assignment) {
            debug!(callsign = %plan.callsign, route = %replaced, "replaced airport assignment");
            return replaced;
        }
    }

    // The assignment token isn't in the route yet; add it at the proper end.
    if route.is_empty() {
        return assignment;
    }
    match direction {
        Direction::Departure => format!("{assignment} {route}"),
        Direction::Arrival => format!("{route} {assignment}"),
    }
}

/// Replace the first whole-token occurrence of `primary` (or `secondary`),
/// with any trailing `/NN[LCR]` runway suffix, by `assignment`. Returns
/// `None` when neither appears at a token boundary - a bare substring
/// inside a longer token must not be rewritten.
fn replace_assignment_token(
    route: &str,
    primary: &str,
    secondary: &str,
    assignment: &str,
) -> Option<String> {
    let alternation = if secondary.is_empty() {
        regex::escape(primary)
    } else {
        format!("{}|{}", regex::escape(primary), regex::escape(secondary))
    };
    let pattern = format!(r"(^|\s)(?:{alternation})(?:/[0-3]?[0-9]?[LCR]?)?(\s|$)");
    let re = Regex::new(&pattern).ok()?;

    if !re.is_match(route) {
        return None;
    }
    let replaced = re.replace(route, |caps: &regex::Captures| {
        format!("{}{}{}", &caps[1], assignment, &caps[2])
    });
    Some(replaced.into_owned())
}
