//! The betting-round engine: deals phases, asks each seat's
//! [`ActionSource`](crate::policy::ActionSource) to act, accrues the pot and
//! settles it at showdown.
//!
//! A match is three rounds at most. Round 0 deals 2 hole cards per seat,
//! round 1 reveals 3 community cards, round 2 reveals 2 more. Every round the
//! estimator refreshes each live seat's success ratio (round 0 has no board,
//! so seats act without one), then every `Betting` seat acts exactly once.
//! The match ends early unless more than one seat placed a non-all-in wager
//! at the prevailing call level.

use std::cmp::Ordering;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::cards::Card;
use crate::deck::Deck;
use crate::evaluator::{EvalError, HandCategory, HandRank, RoyalRule};
use crate::participant::{Participant, ParticipantState};
use crate::policy::{ActionSource, Decision, TurnContext};
use crate::trainer::{TrainError, Trainer, TrainerConfig};

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum EngineError {
    #[error("deck has too few cards left to deal")]
    DeckExhausted,
    #[error("game has no participants")]
    NoParticipants,
    #[error("participant {0} has no evaluated hand")]
    NotEvaluated(String),
    #[error("operation out of sequence: {0}")]
    OutOfSequence(&'static str),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error(transparent)]
    Train(#[from] TrainError),
}

/// Rejection of an externally submitted action. The seat may act again.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ActionError {
    #[error("no participant with id {0}")]
    UnknownParticipant(String),
    #[error("participant {0} is not in a betting state")]
    NotBetting(String),
    #[error("participant {0} already acted this round")]
    AlreadyActed(String),
    #[error("wager {wager} is below the call level {call_level}")]
    WagerBelowCall { wager: u64, call_level: u64 },
    #[error("wager {wager} exceeds the stack of {stack}")]
    WagerAboveStack { wager: u64, stack: u64 },
}

#[derive(Debug, Clone, Copy)]
pub struct GameConfig {
    pub royal_rule: RoyalRule,
    pub trainer: TrainerConfig,
    /// Chips each seat starts the session with.
    pub initial_stack: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            royal_rule: RoyalRule::default(),
            trainer: TrainerConfig::default(),
            initial_stack: 100,
        }
    }
}

/// One row of [`Game::current_standings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub id: String,
    pub stack: u64,
    pub wager: u64,
    pub state: ParticipantState,
    /// Present once the seat's hand has been evaluated this board.
    pub category: Option<HandCategory>,
}

/// Outcome of a showdown: who won and what every paid-out seat received.
/// When everyone folded, `winners` is empty and the payouts are refunds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowdownResult {
    pub winners: Vec<String>,
    pub payouts: Vec<(String, u64)>,
}

pub struct Game {
    deck: Deck,
    pot: u64,
    round: u8,
    community: Vec<Card>,
    participants: Vec<Participant>,
    sources: Vec<Box<dyn ActionSource>>,
    acted: Vec<bool>,
    call_level: u64,
    phase_dealt: bool,
    rng: ChaCha8Rng,
    config: GameConfig,
}

impl Game {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut deck = Deck::standard();
        deck.shuffle_with(&mut rng);
        Self {
            deck,
            pot: 0,
            round: 0,
            community: Vec::new(),
            participants: Vec::new(),
            sources: Vec::new(),
            acted: Vec::new(),
            call_level: 0,
            phase_dealt: false,
            rng,
            config,
        }
    }

    /// Seat a participant with the configured starting stack. Seating order
    /// is the order of `add_seat` calls and never changes.
    pub fn add_seat(&mut self, id: impl Into<String>, source: Box<dyn ActionSource>) {
        self.participants.push(Participant::with_stack(id, self.config.initial_stack));
        self.sources.push(source);
        self.acted.push(false);
    }

    pub fn pot(&self) -> u64 {
        self.pot
    }
    pub fn round(&self) -> u8 {
        self.round
    }
    pub fn call_level(&self) -> u64 {
        self.call_level
    }
    pub fn community(&self) -> &[Card] {
        &self.community
    }
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }
    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id() == id)
    }

    /// Seats that still hold chips. A session is over when fewer than two
    /// remain.
    pub fn active_seats(&self) -> usize {
        self.participants.iter().filter(|p| p.stack() > 0).count()
    }

    /// Deal the current round's cards and return the newly revealed
    /// community cards (round 0 deals only private hole cards, so it
    /// reveals nothing).
    pub fn deal_next_phase(&mut self) -> Result<Vec<Card>, EngineError> {
        if self.participants.is_empty() {
            return Err(EngineError::NoParticipants);
        }
        if self.phase_dealt {
            return Err(EngineError::OutOfSequence("phase already dealt"));
        }

        for p in &mut self.participants {
            p.start_round();
        }
        self.call_level = 0;
        for acted in &mut self.acted {
            *acted = false;
        }

        let revealed = match self.round {
            0 => {
                for p in &mut self.participants {
                    if !p.is_folded() {
                        let hole = self.deck.deal(2).ok_or(EngineError::DeckExhausted)?;
                        p.set_hole_cards(hole);
                    }
                }
                Vec::new()
            }
            1 | 2 => {
                let n = if self.round == 1 { 3 } else { 2 };
                let cards = self.deck.deal(n).ok_or(EngineError::DeckExhausted)?;
                self.community.extend_from_slice(&cards);
                for p in &mut self.participants {
                    if !p.is_folded() {
                        p.set_community_cards(self.community.clone());
                    }
                }
                cards
            }
            _ => return Err(EngineError::OutOfSequence("match already complete")),
        };
        self.phase_dealt = true;
        Ok(revealed)
    }

    /// Run the estimator (rounds with a board) and the action phase, asking
    /// every seat that has not already acted via [`Game::submit_action`].
    /// Returns `true` when the match continues to another deal.
    pub fn play_betting_round(&mut self) -> Result<bool, EngineError> {
        if !self.phase_dealt {
            return Err(EngineError::OutOfSequence("round has not been dealt"));
        }

        if self.round >= 1 {
            let mut trainer = Trainer::new(
                self.participants.len(),
                self.config.trainer,
                self.config.royal_rule,
            );
            trainer.train(&mut self.participants, &self.community, &mut self.rng)?;
        }

        for i in 0..self.participants.len() {
            if self.acted[i] || !self.participants[i].is_betting() {
                continue;
            }
            let ctx = TurnContext {
                call_level: self.call_level,
                stack: self.participants[i].stack(),
                success_ratio: if self.round == 0 {
                    None
                } else {
                    Some(self.participants[i].success_ratio())
                },
            };
            let decision = self.sources[i].decide(&ctx);
            self.apply(i, decision);
        }
        self.phase_dealt = false;

        // All-in seats never qualify: only a live wager at the call level
        // keeps the betting open.
        let qualifying = self
            .participants
            .iter()
            .filter(|p| p.is_betting() && p.wager() >= self.call_level)
            .count();
        let goes_on = self.round < 2 && qualifying > 1;
        if goes_on {
            self.round += 1;
        }
        Ok(goes_on)
    }

    /// Externally driven path for a seat whose decision arrives from outside
    /// (a prompt, a UI). Folding is always legal; a wager must reach the
    /// call level and fit the stack, except that pushing the entire stack
    /// is always legal.
    pub fn submit_action(&mut self, id: &str, decision: Decision) -> Result<(), ActionError> {
        let idx = self
            .participants
            .iter()
            .position(|p| p.id() == id)
            .ok_or_else(|| ActionError::UnknownParticipant(id.to_string()))?;
        let p = &self.participants[idx];
        if !p.is_betting() {
            return Err(ActionError::NotBetting(id.to_string()));
        }
        if self.acted[idx] {
            return Err(ActionError::AlreadyActed(id.to_string()));
        }
        if let Decision::Bet(amount) = decision {
            if amount > p.stack() {
                return Err(ActionError::WagerAboveStack { wager: amount, stack: p.stack() });
            }
            if amount < self.call_level && amount != p.stack() {
                return Err(ActionError::WagerBelowCall {
                    wager: amount,
                    call_level: self.call_level,
                });
            }
        }
        self.apply(idx, decision);
        Ok(())
    }

    fn apply(&mut self, idx: usize, decision: Decision) {
        match decision {
            Decision::Fold => self.participants[idx].fold(),
            Decision::Bet(amount) => {
                let paid = self.participants[idx].place_wager(amount);
                self.pot += paid;
                let wager = self.participants[idx].wager();
                if wager > self.call_level {
                    self.call_level = wager;
                }
            }
        }
        self.acted[idx] = true;
    }

    /// Evaluate every surviving hand, pick the winners and distribute the
    /// pot. The pot is always zero afterwards.
    ///
    /// A lone survivor wins without showing down. When betting closed early
    /// (all-ins), the remaining community cards are dealt out first so every
    /// surviving hand has a full card set.
    pub fn showdown_result(&mut self) -> Result<ShowdownResult, EngineError> {
        if self.participants.is_empty() {
            return Err(EngineError::NoParticipants);
        }
        let live: Vec<usize> = (0..self.participants.len())
            .filter(|&i| !self.participants[i].is_folded())
            .collect();
        let winners = if live.len() <= 1 {
            live
        } else {
            if self.community.len() < 5 {
                let need = 5 - self.community.len();
                let cards = self.deck.deal(need).ok_or(EngineError::DeckExhausted)?;
                self.community.extend_from_slice(&cards);
                for p in &mut self.participants {
                    if !p.is_folded() {
                        p.set_community_cards(self.community.clone());
                    }
                }
            }
            for p in &mut self.participants {
                if !p.is_folded() {
                    p.evaluate_hand(self.config.royal_rule)?;
                }
            }
            winners_by_cards(&self.participants)?
        };
        let winner_ids: Vec<String> =
            winners.iter().map(|&i| self.participants[i].id().to_string()).collect();
        let payouts = self.distribute(&winners);
        Ok(ShowdownResult { winners: winner_ids, payouts })
    }

    /// Split the pot with the ceiling rule: in seating order, each payee
    /// receives `ceil(pot / payees_left)`, shrinking both as it goes. A lone
    /// winner takes everything; no winners at all means everyone folded and
    /// every seat is refunded the same way.
    fn distribute(&mut self, winners: &[usize]) -> Vec<(String, u64)> {
        let payees: Vec<usize> = if winners.is_empty() {
            (0..self.participants.len()).collect()
        } else {
            winners.to_vec()
        };
        let mut payouts = Vec::with_capacity(payees.len());
        let mut remaining = payees.len() as u64;
        for &i in &payees {
            let share = if remaining <= 1 {
                self.pot
            } else {
                (self.pot + remaining - 1) / remaining
            };
            self.participants[i].collect(share);
            self.pot -= share;
            remaining -= 1;
            payouts.push((self.participants[i].id().to_string(), share));
        }
        payouts
    }

    pub fn current_standings(&self) -> Vec<Standing> {
        self.participants
            .iter()
            .map(|p| Standing {
                id: p.id().to_string(),
                stack: p.stack(),
                wager: p.wager(),
                state: p.state(),
                category: p.hand().map(|r| r.category),
            })
            .collect()
    }

    /// Run one complete match: deal and bet until the betting closes, then
    /// settle the showdown. Stacks carry over to the next match.
    pub fn play_match(&mut self) -> Result<ShowdownResult, EngineError> {
        self.reset_for_next_match();
        loop {
            self.deal_next_phase()?;
            if !self.play_betting_round()? {
                break;
            }
        }
        self.showdown_result()
    }

    /// Fresh shuffled deck, empty board and pot. Cards, wagers and ranks are
    /// cleared; stacks persist, and a seat with no chips left sits out.
    pub fn reset_for_next_match(&mut self) {
        for p in &mut self.participants {
            p.reset_for_match();
        }
        self.deck = Deck::standard();
        self.deck.shuffle_with(&mut self.rng);
        self.pot = 0;
        self.round = 0;
        self.community.clear();
        self.call_level = 0;
        self.phase_dealt = false;
        for acted in &mut self.acted {
            *acted = false;
        }
    }
}

/// Pick the winning seats among non-folded participants, by evaluated rank
/// alone. Strictly better clears the set; ties accumulate. Every non-folded
/// participant must already carry an evaluated hand.
pub fn winners_by_cards(participants: &[Participant]) -> Result<Vec<usize>, EngineError> {
    let mut best: Option<&HandRank> = None;
    let mut winners = Vec::new();
    for (i, p) in participants.iter().enumerate() {
        if p.is_folded() {
            continue;
        }
        let rank = p.hand().ok_or_else(|| EngineError::NotEvaluated(p.id().to_string()))?;
        match best {
            None => {
                best = Some(rank);
                winners.push(i);
            }
            Some(b) => match rank.cmp(b) {
                Ordering::Greater => {
                    best = Some(rank);
                    winners.clear();
                    winners.push(i);
                }
                Ordering::Equal => winners.push(i),
                Ordering::Less => {}
            },
        }
    }
    Ok(winners)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;
    use crate::policy::{ScriptedSource, ThresholdPolicy};

    fn quick_config() -> GameConfig {
        GameConfig {
            trainer: TrainerConfig { trials: 20 },
            initial_stack: 10,
            ..GameConfig::default()
        }
    }

    fn scripted(decisions: &[Decision]) -> Box<ScriptedSource> {
        Box::new(ScriptedSource::new(decisions.iter().copied()))
    }

    #[test]
    fn ceiling_split_pays_4_3_3_from_a_pot_of_10() {
        let mut g = Game::new(quick_config(), 1);
        for id in ["a", "b", "c"] {
            g.add_seat(id, scripted(&[]));
        }
        // Board holds four 7s with the highest kicker, so all three hands
        // tie on [7, 13] regardless of hole cards.
        let board = parse_cards("S7 H7 D7 C7 S13").unwrap();
        let holes = ["S2 H3", "D4 C5", "H5 C6"];
        for (p, hole) in g.participants.iter_mut().zip(holes) {
            p.set_hole_cards(parse_cards(hole).unwrap());
            p.set_community_cards(board.clone());
        }
        g.community = board;
        g.pot = 10;

        let result = g.showdown_result().unwrap();
        assert_eq!(result.winners, vec!["a", "b", "c"]);
        assert_eq!(
            result.payouts,
            vec![
                ("a".to_string(), 4),
                ("b".to_string(), 3),
                ("c".to_string(), 3),
            ]
        );
        assert_eq!(g.pot(), 0);
    }

    #[test]
    fn lone_winner_takes_the_whole_pot() {
        let mut g = Game::new(quick_config(), 2);
        g.add_seat("winner", scripted(&[]));
        g.add_seat("loser", scripted(&[]));
        let board = parse_cards("S2 H9 D11 C4 H6").unwrap();
        g.participants[0].set_hole_cards(parse_cards("S9 D9").unwrap());
        g.participants[0].set_community_cards(board.clone());
        g.participants[1].set_hole_cards(parse_cards("H2 C3").unwrap());
        g.participants[1].set_community_cards(board.clone());
        g.community = board;
        g.pot = 7;

        let result = g.showdown_result().unwrap();
        assert_eq!(result.winners, vec!["winner"]);
        assert_eq!(result.payouts, vec![("winner".to_string(), 7)]);
        assert_eq!(g.pot(), 0);
        assert_eq!(g.participant("winner").unwrap().stack(), 17);
    }

    #[test]
    fn all_folded_refunds_every_seat() {
        let mut g = Game::new(quick_config(), 3);
        // Round 0: everyone limps at 2. Round 1: everyone folds.
        for id in ["a", "b", "c"] {
            g.add_seat(id, scripted(&[Decision::Bet(2), Decision::Fold]));
        }
        let result = g.play_match().unwrap();
        assert!(result.winners.is_empty());
        assert_eq!(g.pot(), 0);
        for p in g.participants() {
            assert_eq!(p.stack(), 10, "refund restores the starting stack");
        }
    }

    #[test]
    fn betting_closes_when_one_qualifier_remains() {
        let mut g = Game::new(quick_config(), 4);
        g.add_seat("a", scripted(&[Decision::Bet(3)]));
        g.add_seat("b", scripted(&[Decision::Fold]));
        g.add_seat("c", scripted(&[Decision::Fold]));
        g.reset_for_next_match();
        g.deal_next_phase().unwrap();
        assert!(!g.play_betting_round().unwrap(), "a single live wager ends the match");
        assert_eq!(g.pot(), 3);
        assert_eq!(g.round(), 0);
    }

    #[test]
    fn submit_action_validates_wagers() {
        let mut g = Game::new(quick_config(), 5);
        g.add_seat("a", scripted(&[]));
        g.add_seat("b", scripted(&[]));
        g.reset_for_next_match();
        g.deal_next_phase().unwrap();

        assert!(matches!(
            g.submit_action("ghost", Decision::Bet(1)),
            Err(ActionError::UnknownParticipant(_))
        ));
        assert!(matches!(
            g.submit_action("a", Decision::Bet(11)),
            Err(ActionError::WagerAboveStack { .. })
        ));
        g.submit_action("a", Decision::Bet(5)).unwrap();
        assert_eq!(g.call_level(), 5);
        assert!(matches!(
            g.submit_action("a", Decision::Bet(5)),
            Err(ActionError::AlreadyActed(_))
        ));
        assert!(matches!(
            g.submit_action("b", Decision::Bet(3)),
            Err(ActionError::WagerBelowCall { .. })
        ));
        // Pushing the whole stack is legal even below the call level.
        let mut g2 = Game::new(GameConfig { initial_stack: 3, ..quick_config() }, 5);
        g2.add_seat("a", scripted(&[]));
        g2.add_seat("b", scripted(&[]));
        g2.reset_for_next_match();
        g2.deal_next_phase().unwrap();
        g2.submit_action("a", Decision::Bet(3)).unwrap();
        assert!(g2.participant("a").unwrap().is_all_in());

        g.submit_action("b", Decision::Fold).unwrap();
        assert!(g.participant("b").unwrap().is_folded());
    }

    #[test]
    fn full_bot_match_conserves_chips() {
        let mut g = Game::new(quick_config(), 9);
        for id in ["a", "b", "c", "d"] {
            g.add_seat(id, Box::new(ThresholdPolicy::default()));
        }
        let total: u64 = g.participants().iter().map(Participant::stack).sum();
        for _ in 0..5 {
            if g.active_seats() < 2 {
                break;
            }
            g.play_match().unwrap();
            assert_eq!(g.pot(), 0);
            let now: u64 = g.participants().iter().map(Participant::stack).sum();
            assert_eq!(now, total, "chips neither created nor destroyed");
        }
    }

    #[test]
    fn deal_sequencing_is_enforced() {
        let mut g = Game::new(quick_config(), 4);
        g.add_seat("a", scripted(&[]));
        assert!(matches!(
            g.play_betting_round(),
            Err(EngineError::OutOfSequence(_))
        ));
        g.deal_next_phase().unwrap();
        assert!(matches!(g.deal_next_phase(), Err(EngineError::OutOfSequence(_))));
    }

    #[test]
    fn standings_expose_category_once_known() {
        let mut g = Game::new(quick_config(), 6);
        g.add_seat("a", scripted(&[]));
        g.participants[0].set_hole_cards(parse_cards("S9 D9").unwrap());
        g.participants[0].set_community_cards(parse_cards("H9 C2 D5").unwrap());
        assert_eq!(g.current_standings()[0].category, None);
        g.participants[0].evaluate_hand(RoyalRule::TopValue).unwrap();
        assert_eq!(
            g.current_standings()[0].category,
            Some(HandCategory::ThreeOfAKind)
        );
    }
}
