//! Altitude conformance from instantaneous Mode C readings.
//!
//! Mode C and vertical speed are both noisy, so conformance works in bands:
//! within 200 ft of the target counts as reached; outside the band, an
//! aircraft that is level (within 200 fpm) or moving further away is in
//! error, while one converging on the target is neither.

use serde::{Deserialize, Serialize};

/// Within this many feet of the target the altitude counts as reached.
const REACHED_BAND_FT: i32 = 200;
/// Below this absolute vertical speed the aircraft is considered level.
const LEVEL_BAND_FPM: i32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Conformance {
    pub reached: bool,
    pub error: bool,
}

/// Evaluate conformance of a Mode C reading against a cleared or final
/// altitude. At most one of `reached`/`error` is set; both stay false while
/// the aircraft is converging on the target.
pub fn evaluate(mode_c_ft: i32, target_ft: i32, vertical_speed_fpm: i32) -> Conformance {
    let delta = mode_c_ft - target_ft;

    if delta.abs() <= REACHED_BAND_FT {
        return Conformance {
            reached: true,
            error: false,
        };
    }

    // Off altitude. Level flight is an error outright; otherwise only
    // movement away from the target is.
    let error = if vertical_speed_fpm.abs() <= LEVEL_BAND_FPM {
        true
    } else if delta < -REACHED_BAND_FT && vertical_speed_fpm < -LEVEL_BAND_FPM {
        true
    } else {
        delta > REACHED_BAND_FT && vertical_speed_fpm > LEVEL_BAND_FPM
    };

    Conformance {
        reached: false,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reached_within_band() {
        assert_eq!(
            evaluate(10200, 10000, 0),
            Conformance {
                reached: true,
                error: false
            }
        );
        assert_eq!(
            evaluate(9800, 10000, 0),
            Conformance {
                reached: true,
                error: false
            }
        );
        assert!(evaluate(10000, 10000, -500).reached);
    }

    #[test]
    fn test_level_off_altitude_is_error() {
        let c = evaluate(10500, 10000, 0);
        assert!(!c.reached);
        assert!(c.error);

        let c = evaluate(9400, 10000, 150);
        assert!(!c.reached);
        assert!(c.error);
    }

    #[test]
    fn test_diverging_is_error() {
        // Above the target and still climbing
        let c = evaluate(10500, 10000, 300);
        assert!(!c.reached);
        assert!(c.error);

        // Below the target and still descending
        let c = evaluate(9500, 10000, -300);
        assert!(!c.reached);
        assert!(c.error);
    }

    #[test]
    fn test_converging_is_neither() {
        // Above the target, descending towards it
        let c = evaluate(10500, 10000, -300);
        assert!(!c.reached);
        assert!(!c.error);

        // Below the target, climbing towards it
        let c = evaluate(9500, 10000, 300);
        assert!(!c.reached);
        assert!(!c.error);
    }

    #[test]
    fn test_band_boundaries() {
        assert!(evaluate(10201, 10000, 0).error);
        assert!(evaluate(10200, 10000, 0).reached);
        // Exactly 200 fpm still counts as level
        assert!(evaluate(10500, 10000, 200).error);
        assert!(!evaluate(10500, 10000, -201).error);
    }
}
