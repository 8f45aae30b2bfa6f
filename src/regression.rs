//! Replay recorded showdowns and check the winner selection against the
//! outcomes noted when the cases were captured.
//!
//! A regression directory holds an index file `test_results.txt` whose CSV
//! lines read `case_file[,winner_id]`; a missing winner means the case was
//! recorded as a tie. Each case file holds one CSV row per hand:
//! `id,card,card,...` with 5 to 7 card tokens like `S10` or `H1`.
//! A malformed case is reported and skipped; the run never aborts on one
//! bad case.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::cards::Card;
use crate::evaluator::RoyalRule;
use crate::game::winners_by_cards;
use crate::participant::Participant;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum RegressionError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("index {0} lists no cases")]
    EmptyIndex(PathBuf),
}

/// Outcome noted in the index when the case was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    Winner(String),
    Tie,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseOutcome {
    Pass,
    /// The selection disagreed with the recording.
    Fail { winners: Vec<String> },
    /// The case could not be replayed at all.
    Invalid { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseReport {
    pub file: String,
    pub expected: Expected,
    pub outcome: CaseOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct RegressionReport {
    pub cases: Vec<CaseReport>,
}

impl RegressionReport {
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.outcome == CaseOutcome::Pass).count()
    }

    pub fn failed(&self) -> usize {
        self.cases.iter().filter(|c| matches!(c.outcome, CaseOutcome::Fail { .. })).count()
    }

    pub fn invalid(&self) -> usize {
        self.cases.iter().filter(|c| matches!(c.outcome, CaseOutcome::Invalid { .. })).count()
    }

    pub fn all_passed(&self) -> bool {
        self.passed() == self.cases.len()
    }
}

/// Run every case listed in `dir/test_results.txt`.
pub fn run_directory(dir: &Path, rule: RoyalRule) -> Result<RegressionReport, RegressionError> {
    let index = dir.join("test_results.txt");
    let text = fs::read_to_string(&index)
        .map_err(|source| RegressionError::Io { path: index.clone(), source })?;

    let mut report = RegressionReport::default();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (file, expected) = match line.split_once(',') {
            Some((file, winner)) if !winner.trim().is_empty() => {
                (file.trim(), Expected::Winner(winner.trim().to_string()))
            }
            Some((file, _)) => (file.trim(), Expected::Tie),
            None => (line, Expected::Tie),
        };
        let outcome = run_case(&dir.join(file), &expected, rule);
        report.cases.push(CaseReport { file: file.to_string(), expected, outcome });
    }
    if report.cases.is_empty() {
        return Err(RegressionError::EmptyIndex(index));
    }
    Ok(report)
}

fn run_case(path: &Path, expected: &Expected, rule: RoyalRule) -> CaseOutcome {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => return CaseOutcome::Invalid { reason: format!("unreadable: {err}") },
    };
    let hands = match parse_case(&text) {
        Ok(hands) => hands,
        Err(reason) => return CaseOutcome::Invalid { reason },
    };
    if let Expected::Winner(id) = expected {
        if !hands.iter().any(|(hand_id, _)| hand_id == id) {
            return CaseOutcome::Invalid { reason: format!("declared winner {id} not in roster") };
        }
    }

    // Seats need a live stack so winner selection does not skip them.
    let mut participants = Vec::with_capacity(hands.len());
    for (id, cards) in hands {
        let mut p = Participant::with_stack(id, 1);
        p.set_hole_cards(cards);
        if let Err(err) = p.evaluate_hand(rule) {
            return CaseOutcome::Invalid { reason: format!("{}: {err}", p.id()) };
        }
        participants.push(p);
    }
    let winners = match winners_by_cards(&participants) {
        Ok(indices) => indices
            .into_iter()
            .map(|i| participants[i].id().to_string())
            .collect::<Vec<_>>(),
        Err(err) => return CaseOutcome::Invalid { reason: err.to_string() },
    };

    let pass = match expected {
        Expected::Winner(id) => winners.len() == 1 && winners[0] == *id,
        Expected::Tie => winners.len() > 1,
    };
    if pass {
        CaseOutcome::Pass
    } else {
        CaseOutcome::Fail { winners }
    }
}

fn parse_case(text: &str) -> Result<Vec<(String, Vec<Card>)>, String> {
    let mut hands = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split(',').map(str::trim);
        let id = fields.next().unwrap_or_default();
        if id.is_empty() {
            return Err("row with empty id".to_string());
        }
        let mut cards = Vec::new();
        for token in fields {
            let card = Card::from_str(token).map_err(|err| format!("{id}: {err}"))?;
            cards.push(card);
        }
        if !(5..=7).contains(&cards.len()) {
            return Err(format!("{id}: {} cards, want 5 to 7", cards.len()));
        }
        hands.push((id.to_string(), cards));
    }
    if hands.is_empty() {
        return Err("case lists no hands".to_string());
    }
    Ok(hands)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str, files: &[(&str, &str)]) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("holdem-regression-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        for (file, content) in files {
            fs::write(dir.join(file), content).unwrap();
        }
        dir
    }

    #[test]
    fn recorded_winner_and_tie_both_pass() {
        let dir = fixture(
            "pass",
            &[
                ("test_results.txt", "quads.txt,p1\nroyals.txt\n"),
                (
                    "quads.txt",
                    "p1,S7,H7,D7,C7,S13\np2,S2,H3,C4,D5,H9\n",
                ),
                (
                    "royals.txt",
                    "p1,S10,S11,S12,S13,S1\np2,H10,H11,H12,H13,H1\n",
                ),
            ],
        );
        let report = run_directory(&dir, RoyalRule::TopValue).unwrap();
        assert_eq!(report.cases.len(), 2);
        assert!(report.all_passed(), "{:?}", report.cases);
    }

    #[test]
    fn wrong_recorded_winner_fails_the_case() {
        let dir = fixture(
            "fail",
            &[
                ("test_results.txt", "quads.txt,p2\n"),
                (
                    "quads.txt",
                    "p1,S7,H7,D7,C7,S13\np2,S2,H3,C4,D5,H9\n",
                ),
            ],
        );
        let report = run_directory(&dir, RoyalRule::TopValue).unwrap();
        assert_eq!(report.passed(), 0);
        assert_eq!(report.failed(), 1);
        match &report.cases[0].outcome {
            CaseOutcome::Fail { winners } => assert_eq!(winners, &["p1".to_string()]),
            other => panic!("expected Fail, got {other:?}"),
        }
    }

    #[test]
    fn malformed_case_is_reported_and_the_run_continues() {
        let dir = fixture(
            "invalid",
            &[
                (
                    "test_results.txt",
                    "badtoken.txt,p1\nshort.txt,p1\nmissing.txt,p1\nghost.txt,p9\ngood.txt,p1\n",
                ),
                ("badtoken.txt", "p1,S7,H7,D7,C7,X13\n"),
                ("short.txt", "p1,S7,H7,D7\n"),
                ("ghost.txt", "p1,S7,H7,D7,C7,S13\n"),
                (
                    "good.txt",
                    "p1,S7,H7,D7,C7,S13\np2,S2,H3,C4,D5,H9\n",
                ),
            ],
        );
        let report = run_directory(&dir, RoyalRule::TopValue).unwrap();
        assert_eq!(report.cases.len(), 5);
        assert_eq!(report.invalid(), 4);
        assert_eq!(report.passed(), 1);
        assert_eq!(report.cases[4].outcome, CaseOutcome::Pass);
    }

    #[test]
    fn missing_index_is_a_directory_level_error() {
        let dir = fixture("noindex", &[]);
        assert!(matches!(
            run_directory(&dir, RoyalRule::TopValue),
            Err(RegressionError::Io { .. })
        ));
    }
}
