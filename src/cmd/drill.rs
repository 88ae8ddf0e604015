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

use std::io::BufRead;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use crate::cmd::Clock;
use crate::collection::Collection;
use crate::collection::append_events;
use crate::error::Fallible;
use crate::session::Session;
use crate::session::SessionSummary;
use crate::types::date::Date;
use crate::types::grade::FeedbackGrade;
use crate::types::record::Feedback;
use crate::types::timestamp::Timestamp;

pub fn drill(
    cards: &Path,
    config: Option<&Path>,
    today: Option<&str>,
    events: Option<&Path>,
    new_seen_today: usize,
) -> Fallible<()> {
    let coll = Collection::load(cards, config)?;
    let clock = Clock::current(today)?;
    let events_path = match events {
        Some(path) => path.to_path_buf(),
        None => coll.default_events_path(),
    };
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();
    run_drill(
        &coll,
        &events_path,
        clock.today,
        new_seen_today,
        Timestamp::now,
        &mut input,
        &mut output,
    )?;
    Ok(())
}

/// Run a session on a terminal-like pair of streams. Whatever was applied
/// before the session ended, including on error, is written back.
pub fn run_drill<R: BufRead, W: Write>(
    coll: &Collection,
    events_path: &Path,
    today: Date,
    new_seen_today: usize,
    clock: impl Fn() -> Timestamp,
    input: &mut R,
    output: &mut W,
) -> Fallible<SessionSummary> {
    let mut session = Session::new(coll.config.clone(), coll.registry.clone(), today)?;
    let result = session
        .start(clock(), new_seen_today)
        .and_then(|_| drill_loop(&mut session, &clock, input, output));
    let summary = session.finish();
    if !summary.events.is_empty() {
        coll.save(&summary.registry)?;
        append_events(events_path, &summary.events)?;
    }
    result?;
    writeln!(
        output,
        "Reviewed {} cards ({} long-term, {} short-term, {} new).",
        summary.events.len(),
        summary.ltm_events,
        summary.stm_events,
        summary.new_cards_introduced
    )?;
    Ok(summary)
}

fn drill_loop<R: BufRead, W: Write>(
    session: &mut Session,
    clock: &impl Fn() -> Timestamp,
    input: &mut R,
    output: &mut W,
) -> Fallible<()> {
    loop {
        let item = match session.current() {
            Some(item) => item.clone(),
            None => break,
        };
        writeln!(
            output,
            "{} [{}] ({}, {} left)",
            item.card.content_key(),
            item.card.exercise_type(),
            item.status,
            session.remaining()
        )?;
        let shown = Instant::now();
        match read_answer(input, output)? {
            Answer::Quit => {
                session.stop();
                break;
            }
            Answer::Grade(grade) => {
                let latency = u64::try_from(shown.elapsed().as_millis()).unwrap_or(u64::MAX);
                let feedback = Feedback::new(item.card, grade, clock()).with_latency(latency);
                let event = session.submit(feedback)?;
                writeln!(
                    output,
                    "{} S={:.2}d D={:.2}",
                    event.kind(), event.state_after.stability, event.state_after.effective_difficulty
                )?;
            }
        }
    }
    Ok(())
}

enum Answer {
    Grade(FeedbackGrade),
    Quit,
}

/// End of input counts as quitting.
fn read_answer<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Fallible<Answer> {
    loop {
        writeln!(output, "Grade: (1 = Again, 2 = Hard, 3 = Medium, 4 = Easy, q = quit)")?;
        output.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(Answer::Quit);
        }
        let line = line.trim();
        if line == "q" {
            return Ok(Answer::Quit);
        }
        match line.parse::<u8>().ok().map(FeedbackGrade::from_number) {
            Some(Ok(grade)) => return Ok(Answer::Grade(grade)),
            _ => writeln!(output, "Invalid input. Please enter a number between 1 and 4, or q.")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;
    use std::fs::write;
    use std::io::Cursor;

    use tempfile::TempDir;
    use tempfile::tempdir;

    use super::*;
    use crate::collection::read_records;
    use crate::types::card::Card;

    const CARDS: &str = r#"[
        {"content_key": "hund", "exercise_type": "translation"},
        {
            "content_key": "katze",
            "exercise_type": "translation",
            "stability": 10.0,
            "difficulty": 5.0,
            "last_ltm_timestamp": "2026-03-01T09:00:00Z",
            "last_review_day": "2026-03-01",
            "review_count": 3
        }
    ]"#;

    fn setup() -> Fallible<(TempDir, Collection)> {
        let dir = tempdir()?;
        let path = dir.path().join("cards.json");
        write(&path, CARDS)?;
        let coll = Collection::load(&path, None)?;
        Ok((dir, coll))
    }

    fn run(coll: &Collection, answers: &str) -> Fallible<(SessionSummary, String)> {
        let now = Timestamp::parse("2026-03-15T09:00:00Z")?;
        let today = Date::parse("2026-03-15")?;
        let mut input = Cursor::new(answers.as_bytes().to_vec());
        let mut output: Vec<u8> = Vec::new();
        let summary = run_drill(
            coll,
            &coll.default_events_path(),
            today,
            0,
            || now,
            &mut input,
            &mut output,
        )?;
        let output = String::from_utf8_lossy(&output).to_string();
        Ok((summary, output))
    }

    #[test]
    fn test_full_drill() -> Fallible<()> {
        let (_dir, coll) = setup()?;
        let (summary, output) = run(&coll, "1\n3\n3\n")?;
        assert_eq!(summary.events.len(), 3);
        assert_eq!(summary.ltm_events, 2);
        assert_eq!(summary.stm_events, 1);
        assert!(!summary.stopped);
        assert!(output.starts_with("katze [translation] (ltm, 2 left)"));
        assert!(output.contains("Reviewed 3 cards"));

        let records = read_records(&coll.cards_path)?;
        let katze = records
            .iter()
            .find(|r| r.content_key == "katze")
            .and_then(|r| r.stability);
        assert!(katze.is_some_and(|s| (s - 8.52).abs() < 0.01));
        let events = read_to_string(coll.default_events_path())?;
        assert_eq!(events.lines().count(), 3);
        Ok(())
    }

    #[test]
    fn test_quit_saves_progress() -> Fallible<()> {
        let (_dir, coll) = setup()?;
        let (summary, output) = run(&coll, "x\n4\nq\n")?;
        assert!(output.contains("Invalid input."));
        assert!(summary.stopped);
        assert_eq!(summary.events.len(), 1);
        let saved = Collection::load(&coll.cards_path, None)?;
        let katze = Card::new("katze", "translation")?;
        let hund = Card::new("hund", "translation")?;
        assert!(saved.registry.get(&katze)?.stability > 10.0);
        assert!(saved.registry.get(&hund)?.is_new());
        Ok(())
    }

    #[test]
    fn test_end_of_input_quits_without_writing() -> Fallible<()> {
        let (_dir, coll) = setup()?;
        let (summary, _) = run(&coll, "")?;
        assert!(summary.stopped);
        assert!(summary.events.is_empty());
        assert!(!coll.default_events_path().exists());
        assert_eq!(read_to_string(&coll.cards_path)?, CARDS);
        Ok(())
    }
}
