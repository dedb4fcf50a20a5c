//! Collision-free transponder code allocation.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::errors::ModifyError;
use crate::registry::AircraftRegistry;

/// Returned when every suffix under a prefix is taken. Soft-failure signal:
/// callers log it rather than erroring.
pub const EXHAUSTED_FALLBACK: &str = "1001";

static PREFIX_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-7]{2}$").unwrap());

/// Validate a two-character squawk prefix before allocation.
pub fn validate_prefix(prefix: &str) -> Result<(), ModifyError> {
    if PREFIX_PATTERN.is_match(prefix) {
        Ok(())
    } else {
        Err(ModifyError::invalid_input("Squawk prefix is invalid."))
    }
}

/// Allocate an unused code under the given prefix.
///
/// Scans suffixes 01..=77 in ascending numeric order and returns the first
/// candidate no live flight holds. Deterministic - no randomness, no state
/// beyond the registry itself, so concurrent allocations under different
/// prefixes need no coordination. When the whole range is taken the fixed
/// fallback is returned instead of an error.
pub fn allocate(prefix: &str, registry: &AircraftRegistry) -> String {
    for suffix in 1..=77u32 {
        let candidate = format!("{}{:02}", prefix, suffix);
        if !registry.squawk_in_use(&candidate) {
            return candidate;
        }
    }

    warn!(prefix, "squawk range exhausted, falling back to {EXHAUSTED_FALLBACK}");
    metrics::counter!("squawk.exhausted").increment(1);
    EXHAUSTED_FALLBACK.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FlightPlan;

    fn registry_with_squawks(codes: &[&str]) -> AircraftRegistry {
        let registry = AircraftRegistry::new();
        for (i, code) in codes.iter().enumerate() {
            let mut plan = FlightPlan::new(format!("FLT{i:03}"));
            plan.squawk = code.to_string();
            registry.insert(plan);
        }
        registry
    }

    #[test]
    fn test_first_free_code_wins() {
        let registry = registry_with_squawks(&["2201", "2202", "2204"]);
        assert_eq!(allocate("22", &registry), "2203");
    }

    #[test]
    fn test_empty_registry_allocates_first_suffix() {
        let registry = AircraftRegistry::new();
        assert_eq!(allocate("31", &registry), "3101");
    }

    #[test]
    fn test_allocation_is_unique_across_live_flights() {
        let taken: Vec<String> = (1..=40).map(|i| format!("22{:02}", i)).collect();
        let refs: Vec<&str> = taken.iter().map(String::as_str).collect();
        let registry = registry_with_squawks(&refs);

        let code = allocate("22", &registry);
        assert!(!taken.contains(&code), "allocated a code already in use");
        assert_eq!(code, "2241");
    }

    #[test]
    fn test_exhaustion_returns_fallback() {
        let taken: Vec<String> = (1..=77).map(|i| format!("22{:02}", i)).collect();
        let refs: Vec<&str> = taken.iter().map(String::as_str).collect();
        let registry = registry_with_squawks(&refs);

        assert_eq!(allocate("22", &registry), EXHAUSTED_FALLBACK);
    }

    #[test]
    fn test_other_prefixes_do_not_collide() {
        let registry = registry_with_squawks(&["3301", "3302"]);
        assert_eq!(allocate("34", &registry), "3401");
    }

    #[test]
    fn test_prefix_validation() {
        assert!(validate_prefix("22").is_ok());
        assert!(validate_prefix("07").is_ok());
        assert!(validate_prefix("78").is_err());
        assert!(validate_prefix("2").is_err());
        assert!(validate_prefix("221").is_err());
        assert!(validate_prefix("ab").is_err());
    }
}
