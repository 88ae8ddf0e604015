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

//! A per-card spaced repetition scheduler.
//!
//! Each card has a stability, a difficulty and an effective difficulty.
//! The first sufficiently spaced review of a card on a given day is a
//! long-term memory (LTM) event and updates stability and difficulty.
//! Later reviews the same day are short-term memory (STM) events and only
//! move the effective difficulty, which the next LTM event then uses.
//!
//! The scheduling modules (`model`, `ltm`, `stm`, `registry`, `pool`,
//! `review` and `session`) do no I/O: callers hand in card records and
//! feedback and get updated records and review events back. The host
//! modules (`collection`, `cli` and `cmd`) are one such caller, keeping
//! state in JSON files. They live in the library so their tests can drive
//! them, and the `lexicards` binary only calls `cli::entrypoint`.

pub mod cli;
pub mod cmd;
pub mod collection;
pub mod config;
pub mod error;
pub mod ltm;
pub mod model;
pub mod pool;
pub mod registry;
pub mod review;
pub mod session;
pub mod stm;
pub mod types;

pub use config::Config;
pub use error::ErrorKind;
pub use error::ErrorReport;
pub use error::Fallible;
pub use pool::PoolBuilder;
pub use pool::PoolItem;
pub use pool::PoolStatus;
pub use pool::Pools;
pub use registry::CardRegistry;
pub use review::EventKind;
pub use review::ReviewEvent;
pub use review::classify;
pub use review::process_review;
pub use session::Session;
pub use session::SessionState;
pub use session::SessionSummary;
pub use types::card::Card;
pub use types::card_state::CardState;
pub use types::date::Date;
pub use types::grade::FeedbackGrade;
pub use types::record::CardRecord;
pub use types::record::Feedback;
pub use types::timestamp::Timestamp;
