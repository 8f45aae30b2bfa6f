use crate::cards::Card;
use crate::deck::Deck;
use crate::evaluator::{EvalError, HandRank, RoyalRule};
use crate::participant::Participant;
use rand::Rng;

/// How many independent trials an estimate is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainerConfig {
    pub trials: u32,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self { trials: 3000 }
    }
}

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum TrainError {
    #[error("simulation deck ran out of cards")]
    DeckExhausted,
    #[error("trainer has no opponents to simulate")]
    NoOpponents,
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Monte-Carlo win-probability estimator.
///
/// Each trial deals a fresh random hand to one ephemeral opponent per real
/// bot seat, against the currently known community cards, and finds the
/// trial's best hand. Real seats then count how often their own fixed hand
/// would not lose to that winner. Every trial owns a private deck with the
/// known community cards removed, so the live game's deck is never touched.
pub struct Trainer {
    opponents: Vec<Participant>,
    config: TrainerConfig,
    rule: RoyalRule,
}

impl Trainer {
    pub fn new(opponent_count: usize, config: TrainerConfig, rule: RoyalRule) -> Self {
        let opponents =
            (0..opponent_count).map(|i| Participant::new(format!("sim-{i}"))).collect();
        Self { opponents, config, rule }
    }

    pub fn config(&self) -> TrainerConfig {
        self.config
    }

    /// Run one trial and return the winning rank among the ephemeral
    /// opponents. If only 3 community cards are known, the trial deals 2
    /// extra board cards for itself so the simulated board is complete.
    pub fn run_trial<R: Rng + ?Sized>(
        &mut self,
        community: &[Card],
        rng: &mut R,
    ) -> Result<HandRank, TrainError> {
        if self.opponents.is_empty() {
            return Err(TrainError::NoOpponents);
        }
        let mut deck = Deck::standard();
        deck.remove(community);
        deck.shuffle_with(rng);

        for opp in &mut self.opponents {
            opp.set_hole_cards(deck.deal(2).ok_or(TrainError::DeckExhausted)?);
        }

        let mut board = community.to_vec();
        if board.len() == 3 {
            board.extend(deck.deal(2).ok_or(TrainError::DeckExhausted)?);
        }

        let mut best: Option<HandRank> = None;
        for opp in &mut self.opponents {
            opp.set_community_cards(board.clone());
            let rank = opp.evaluate_hand(self.rule)?.clone();
            if best.as_ref().map_or(true, |b| rank > *b) {
                best = Some(rank);
            }
        }
        best.ok_or(TrainError::NoOpponents)
    }

    /// Refresh every betting participant's success estimate against the
    /// known community cards. Counters were reset when the board changed,
    /// so this always produces a fresh `trials`-sized sample.
    pub fn train<R: Rng + ?Sized>(
        &mut self,
        participants: &mut [Participant],
        community: &[Card],
        rng: &mut R,
    ) -> Result<(), TrainError> {
        for p in participants.iter_mut() {
            if p.is_betting() && p.card_count() >= 5 {
                p.evaluate_hand(self.rule)?;
            }
        }
        for _ in 0..self.config.trials {
            let winner = self.run_trial(community, rng)?;
            for p in participants.iter_mut() {
                p.record_trial(&winner);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn trial_board_is_always_complete() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut t = Trainer::new(2, TrainerConfig { trials: 1 }, RoyalRule::TopValue);
        let flop = parse_cards("S2 D9 H13").unwrap();
        let winner = t.run_trial(&flop, &mut rng).unwrap();
        // 5-card boards always allow at least a high-card rank of 5 values,
        // pairs and better shorten the sequence.
        assert!(winner.values.len() <= 5);
        for opp in &t.opponents {
            assert_eq!(opp.community_cards().len(), 5);
            assert_eq!(opp.hole_cards().len(), 2);
        }
    }

    #[test]
    fn trial_decks_exclude_known_community_cards() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut t = Trainer::new(3, TrainerConfig::default(), RoyalRule::TopValue);
        let board = parse_cards("S2 D9 H13 C4 C10").unwrap();
        for _ in 0..50 {
            t.run_trial(&board, &mut rng).unwrap();
            for opp in &t.opponents {
                for c in opp.hole_cards() {
                    assert!(!board.contains(c), "dealt a known community card");
                }
            }
        }
    }

    #[test]
    fn ratio_stays_in_unit_interval() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut t = Trainer::new(2, TrainerConfig { trials: 200 }, RoyalRule::TopValue);
        let board = parse_cards("S2 D9 H13").unwrap();

        let mut p = Participant::with_stack("0", 10);
        p.set_hole_cards(parse_cards("H7 D4").unwrap());
        p.set_community_cards(board.clone());
        let mut seats = vec![p];

        t.train(&mut seats, &board, &mut rng).unwrap();
        assert_eq!(seats[0].trials(), 200);
        let r = seats[0].success_ratio();
        assert!((0.0..=1.0).contains(&r));
    }

    #[test]
    fn strong_hand_scores_higher_than_weak_hand() {
        let board = parse_cards("S2 D9 H13").unwrap();

        let mut strong = Participant::with_stack("s", 10);
        strong.set_hole_cards(parse_cards("C13 D13").unwrap()); // trips
        strong.set_community_cards(board.clone());
        let mut weak = Participant::with_stack("w", 10);
        weak.set_hole_cards(parse_cards("H3 C6").unwrap());
        weak.set_community_cards(board.clone());
        let mut seats = vec![strong, weak];

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut t = Trainer::new(2, TrainerConfig { trials: 400 }, RoyalRule::TopValue);
        t.train(&mut seats, &board, &mut rng).unwrap();
        assert!(
            seats[0].success_ratio() > seats[1].success_ratio(),
            "trips should beat a 13-high estimate: {} vs {}",
            seats[0].success_ratio(),
            seats[1].success_ratio()
        );
    }
}
