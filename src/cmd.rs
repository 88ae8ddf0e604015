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

pub mod check;
pub mod drill;
pub mod queue;
pub mod stats;

use crate::error::Fallible;
use crate::types::date::Date;
use crate::types::timestamp::Timestamp;

/// The moment and day token a command runs at.
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    pub now: Timestamp,
    pub today: Date,
}

impl Clock {
    /// Defaults: the current time, and its date in the local timezone.
    pub fn resolve(now: Option<&str>, today: Option<&str>) -> Fallible<Self> {
        let now = match now {
            Some(s) => Timestamp::parse(s)?,
            None => Timestamp::now(),
        };
        let today = match today {
            Some(s) => Date::parse(s)?,
            None => now.local_date(),
        };
        Ok(Self { now, today })
    }

    pub fn current(today: Option<&str>) -> Fallible<Self> {
        Self::resolve(None, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_explicit() -> Fallible<()> {
        let clock = Clock::resolve(Some("2026-03-15T09:00:00Z"), Some("2026-03-16"))?;
        assert_eq!(clock.now, Timestamp::parse("2026-03-15T09:00:00Z")?);
        assert_eq!(clock.today, Date::parse("2026-03-16")?);
        Ok(())
    }

    #[test]
    fn test_today_defaults_to_local_date_of_now() -> Fallible<()> {
        let clock = Clock::resolve(Some("2026-03-15T12:00:00Z"), None)?;
        assert_eq!(clock.today, clock.now.local_date());
        Ok(())
    }

    #[test]
    fn test_resolve_rejects_garbage() {
        assert!(Clock::resolve(Some("yesterday"), None).is_err());
        assert!(Clock::resolve(None, Some("15/03/2026")).is_err());
    }
}
