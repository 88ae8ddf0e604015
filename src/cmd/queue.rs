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

use std::collections::VecDeque;
use std::path::Path;

use crate::cmd::Clock;
use crate::collection::Collection;
use crate::error::Fallible;
use crate::pool::PoolBuilder;
use crate::pool::PoolItem;

pub fn print_queue(
    cards: &Path,
    config: Option<&Path>,
    clock: Clock,
    new_seen_today: usize,
) -> Fallible<()> {
    let coll = Collection::load(cards, config)?;
    let queue = build_queue(&coll, clock, new_seen_today)?;
    let json = serde_json::to_string_pretty(&queue)?;
    println!("{json}");
    Ok(())
}

fn build_queue(coll: &Collection, clock: Clock, new_seen_today: usize) -> Fallible<VecDeque<PoolItem>> {
    let pools = PoolBuilder::new(&coll.config, clock.now, clock.today)?
        .with_new_seen_today(new_seen_today)
        .build(&coll.registry)?;
    Ok(pools.into_queue(coll.config.session_size))
}
