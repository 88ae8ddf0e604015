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

use std::path::PathBuf;

use clap::Args;
use clap::Parser;

use crate::cmd::Clock;
use crate::cmd::check::check_cards;
use crate::cmd::drill::drill;
use crate::cmd::queue::print_queue;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;
use crate::error::Fallible;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Check that a card file and configuration are valid.
    Check {
        #[command(flatten)]
        inputs: Inputs,
    },
    /// Print the study queue as JSON.
    Queue {
        #[command(flatten)]
        inputs: Inputs,
        #[command(flatten)]
        clock: ClockArgs,
        /// Number of new cards already introduced today.
        #[arg(long, default_value_t = 0)]
        new_seen: usize,
    },
    /// Print pool statistics.
    Stats {
        #[command(flatten)]
        inputs: Inputs,
        #[command(flatten)]
        clock: ClockArgs,
        /// Which format to use.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
    /// Drill cards in the terminal.
    Drill {
        #[command(flatten)]
        inputs: Inputs,
        /// The day token, as YYYY-MM-DD. Defaults to the local date.
        #[arg(long)]
        today: Option<String>,
        /// File to append review events to. Defaults to a file next to the
        /// card file.
        #[arg(long)]
        events: Option<PathBuf>,
        /// Number of new cards already introduced today.
        #[arg(long, default_value_t = 0)]
        new_seen: usize,
    },
}

#[derive(Args)]
struct Inputs {
    /// Path to the card state file (JSON).
    #[arg(long)]
    cards: PathBuf,
    /// Path to the configuration file (TOML).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct ClockArgs {
    /// The current time, as RFC 3339. Defaults to now.
    #[arg(long)]
    now: Option<String>,
    /// The day token, as YYYY-MM-DD. Defaults to the local date of `now`.
    #[arg(long)]
    today: Option<String>,
}

impl ClockArgs {
    fn resolve(&self) -> Fallible<Clock> {
        Clock::resolve(self.now.as_deref(), self.today.as_deref())
    }
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Check { inputs } => check_cards(&inputs.cards, inputs.config.as_deref()),
        Command::Queue {
            inputs,
            clock,
            new_seen,
        } => print_queue(
            &inputs.cards,
            inputs.config.as_deref(),
            clock.resolve()?,
            new_seen,
        ),
        Command::Stats {
            inputs,
            clock,
            format,
        } => print_stats(
            &inputs.cards,
            inputs.config.as_deref(),
            clock.resolve()?,
            format,
        ),
        Command::Drill {
            inputs,
            today,
            events,
            new_seen,
        } => drill(
            &inputs.cards,
            inputs.config.as_deref(),
            today.as_deref(),
            events.as_deref(),
            new_seen,
        ),
    }
}
