// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The memory-state model: the forgetting curve and the difficulty damping
//! term. Pure functions, no state.
//!
//! Out-of-domain inputs are rejected rather than clamped. A negative stability
//! or an out-of-range difficulty means the caller's state is corrupt, and
//! clamping would hide that.

use crate::error::Fallible;
use crate::error::invalid;
use crate::types::timestamp::Timestamp;

/// Days until retrievability decays by a factor of e.
pub type Stability = f64;

/// Resistance to stability growth, on a 1-10 scale.
pub type Difficulty = f64;

/// Modeled probability of recall, in [0, 1].
pub type Retrievability = f64;

pub const MIN_DIFFICULTY: Difficulty = 1.0;
pub const MAX_DIFFICULTY: Difficulty = 10.0;

/// Retrievability after `elapsed_days` days for a card with the given
/// stability: `R = exp(-t / S)`.
pub fn retrievability(stability: Stability, elapsed_days: f64) -> Fallible<Retrievability> {
    check_stability(stability)?;
    if !elapsed_days.is_finite() || elapsed_days < 0.0 {
        return invalid(format!(
            "elapsed time must be a non-negative number of days, got {elapsed_days}."
        ));
    }
    Ok((-elapsed_days / stability).exp())
}

/// The factor by which difficulty scales down stability growth:
/// `1 / (1 + alpha * (D - 1))`. Equal to 1 at the easiest difficulty.
pub fn learning_damping(difficulty: Difficulty, alpha: f64) -> Fallible<f64> {
    check_difficulty(difficulty)?;
    if !alpha.is_finite() || alpha < 0.0 {
        return invalid(format!("alpha must not be negative, got {alpha}."));
    }
    Ok(1.0 / (1.0 + alpha * (difficulty - MIN_DIFFICULTY)))
}

/// Fractional days between the last LTM event and `now`. A clock that runs
/// backwards is a caller error.
pub fn elapsed_days(since: Timestamp, now: Timestamp) -> Fallible<f64> {
    let days = now.days_since(since);
    if days < 0.0 {
        return invalid(format!(
            "review at {now} predates the last long-term review at {since}."
        ));
    }
    Ok(days)
}

pub fn check_stability(stability: Stability) -> Fallible<()> {
    if !stability.is_finite() || stability <= 0.0 {
        return invalid(format!("stability must be positive, got {stability}."));
    }
    Ok(())
}

pub fn check_difficulty(difficulty: Difficulty) -> Fallible<()> {
    if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
        return invalid(format!("difficulty must lie in [1, 10], got {difficulty}."));
    }
    Ok(())
}

pub fn check_retrievability(retrievability: Retrievability) -> Fallible<()> {
    if !(0.0..=1.0).contains(&retrievability) {
        return invalid(format!(
            "retrievability must lie in [0, 1], got {retrievability}."
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_retrievability_at_zero_is_one() -> Fallible<()> {
        for s in [0.5, 1.0, 10.0, 365.0] {
            assert_eq!(retrievability(s, 0.0)?, 1.0);
        }
        Ok(())
    }

    #[test]
    fn test_retrievability_example() -> Fallible<()> {
        let r = retrievability(10.0, 14.0)?;
        assert!((r - (-1.4f64).exp()).abs() < 1e-12);
        assert!((r - 0.2466).abs() < 1e-4);
        Ok(())
    }

    #[test]
    fn test_retrievability_is_in_unit_interval() -> Fallible<()> {
        for s in [0.5, 2.0, 30.0] {
            for t in [0.0, 0.1, 1.0, 7.0, 60.0] {
                let r = retrievability(s, t)?;
                assert!(r > 0.0 && r <= 1.0, "S={s} t={t} R={r}");
            }
        }
        Ok(())
    }

    #[test]
    fn test_retrievability_decreases_with_time() -> Fallible<()> {
        let mut previous = retrievability(5.0, 0.0)?;
        for t in 1..30 {
            let r = retrievability(5.0, t as f64)?;
            assert!(r < previous);
            previous = r;
        }
        Ok(())
    }

    #[test]
    fn test_retrievability_increases_with_stability() -> Fallible<()> {
        let mut previous = retrievability(0.5, 3.0)?;
        for s in [1.0, 2.0, 4.0, 8.0, 16.0] {
            let r = retrievability(s, 3.0)?;
            assert!(r > previous);
            previous = r;
        }
        Ok(())
    }

    #[test]
    fn test_retrievability_rejects_bad_input() {
        assert!(retrievability(0.0, 1.0).is_err());
        assert!(retrievability(-1.0, 1.0).is_err());
        assert!(retrievability(1.0, -0.5).is_err());
        assert!(retrievability(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_learning_damping() -> Fallible<()> {
        assert!((learning_damping(5.0, 0.15)? - 0.625).abs() < 1e-12);
        assert_eq!(learning_damping(1.0, 0.15)?, 1.0);
        assert_eq!(learning_damping(7.0, 0.0)?, 1.0);
        Ok(())
    }

    #[test]
    fn test_learning_damping_decreases_with_difficulty() -> Fallible<()> {
        let mut previous = learning_damping(1.0, 0.15)?;
        for d in 2..=10 {
            let f = learning_damping(d as f64, 0.15)?;
            assert!(f < previous);
            previous = f;
        }
        Ok(())
    }

    #[test]
    fn test_learning_damping_domain_errors() {
        for (d, alpha) in [(0.5, 0.15), (10.5, 0.15), (5.0, -0.1)] {
            let err = learning_damping(d, alpha).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
    }

    #[test]
    fn test_elapsed_days() -> Fallible<()> {
        let then = Timestamp::parse("2026-03-01T00:00:00Z")?;
        let now = Timestamp::parse("2026-03-15T00:00:00Z")?;
        assert_eq!(elapsed_days(then, now)?, 14.0);
        assert!(elapsed_days(now, then).is_err());
        Ok(())
    }
}
