use crate::cards::Card;
use crate::evaluator::{evaluate, EvalError, HandRank, RoyalRule};

/// Betting state of a seat. `AllIn` and `Folded` are absorbing for the rest
/// of the current match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParticipantState {
    Betting,
    Folded,
    AllIn,
}

/// One seat at the table, alive for a whole multi-match session.
///
/// Cards, wager and the evaluated rank reset between matches; the stack
/// persists until exhausted. The rank memo is an explicit `Option`: it is
/// computed at most once per distinct card set and cleared whenever the
/// card set changes.
#[derive(Debug, Clone)]
pub struct Participant {
    id: String,
    stack: u64,
    wager: u64,
    state: ParticipantState,
    hole: Vec<Card>,
    community: Vec<Card>,
    evaluated: Option<HandRank>,
    trials: u32,
    trial_wins: u32,
}

impl Participant {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            stack: 0,
            wager: 0,
            state: ParticipantState::Folded,
            hole: Vec::new(),
            community: Vec::new(),
            evaluated: None,
            trials: 0,
            trial_wins: 0,
        }
    }

    pub fn with_stack(id: impl Into<String>, stack: u64) -> Self {
        let mut p = Self::new(id);
        p.add_to_stack(stack);
        p
    }

    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn stack(&self) -> u64 {
        self.stack
    }
    /// Wager placed in the current betting round.
    pub fn wager(&self) -> u64 {
        self.wager
    }
    pub fn state(&self) -> ParticipantState {
        self.state
    }
    pub fn hole_cards(&self) -> &[Card] {
        &self.hole
    }
    pub fn community_cards(&self) -> &[Card] {
        &self.community
    }

    pub fn is_folded(&self) -> bool {
        matches!(self.state, ParticipantState::Folded)
    }
    pub fn is_all_in(&self) -> bool {
        matches!(self.state, ParticipantState::AllIn)
    }
    pub fn is_betting(&self) -> bool {
        matches!(self.state, ParticipantState::Betting)
    }

    pub fn fold(&mut self) {
        self.state = ParticipantState::Folded;
    }

    /// Move chips from the stack into the current wager. A wager that
    /// consumes the whole remaining stack forces `AllIn`; anything larger is
    /// capped at the stack.
    pub fn place_wager(&mut self, amount: u64) -> u64 {
        let paid = if amount < self.stack {
            self.stack -= amount;
            amount
        } else {
            let paid = self.stack;
            self.stack = 0;
            self.state = ParticipantState::AllIn;
            paid
        };
        self.wager = paid;
        paid
    }

    /// Award chips (pot share or refund). A seat with chips is back to
    /// `Betting` for the next match.
    pub fn collect(&mut self, amount: u64) {
        self.stack += amount;
        self.wager = 0;
        if self.stack > 0 {
            self.state = ParticipantState::Betting;
        }
    }

    pub fn add_to_stack(&mut self, amount: u64) {
        self.stack += amount;
        self.wager = 0;
        if self.stack > 0 {
            self.state = ParticipantState::Betting;
        }
    }

    /// Begin a new betting round: the previous round's wager no longer
    /// counts toward the call level.
    pub fn start_round(&mut self) {
        self.wager = 0;
    }

    pub fn set_hole_cards(&mut self, cards: Vec<Card>) {
        self.hole = cards;
        self.invalidate();
    }

    /// Replace the shared community cards. Resets the rank memo and the
    /// simulation counters: a changed board demands a fresh estimate.
    pub fn set_community_cards(&mut self, cards: Vec<Card>) {
        self.community = cards;
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.evaluated = None;
        self.trials = 0;
        self.trial_wins = 0;
    }

    /// Clear cards, wager and rank for the next match. The stack persists;
    /// a seat with no chips left sits out as `Folded`.
    pub fn reset_for_match(&mut self) {
        self.hole.clear();
        self.community.clear();
        self.wager = 0;
        self.invalidate();
        self.state =
            if self.stack == 0 { ParticipantState::Folded } else { ParticipantState::Betting };
    }

    /// Number of cards currently known to this seat.
    pub fn card_count(&self) -> usize {
        self.hole.len() + self.community.len()
    }

    /// Evaluate (and memoize) the rank of this seat's known cards.
    pub fn evaluate_hand(&mut self, rule: RoyalRule) -> Result<&HandRank, EvalError> {
        let rank = match self.evaluated.take() {
            Some(rank) => rank,
            None => {
                let mut cards = self.hole.clone();
                cards.extend_from_slice(&self.community);
                evaluate(&cards, rule)?
            }
        };
        Ok(self.evaluated.insert(rank))
    }

    /// The memoized rank, if evaluation has happened for this card set.
    pub fn hand(&self) -> Option<&HandRank> {
        self.evaluated.as_ref()
    }

    /// Record one Monte-Carlo trial against the trial winner's rank.
    /// Not-losing (tie or better) counts as a win. Folded and all-in seats
    /// skip training entirely.
    pub fn record_trial(&mut self, trial_winner: &HandRank) {
        let own = match (&self.state, &self.evaluated) {
            (ParticipantState::Betting, Some(rank)) => rank,
            _ => return,
        };
        self.trials += 1;
        if own >= trial_winner {
            self.trial_wins += 1;
        }
    }

    pub fn trials(&self) -> u32 {
        self.trials
    }
    pub fn trial_wins(&self) -> u32 {
        self.trial_wins
    }

    /// Estimated probability of not losing to a random opponent, in [0, 1].
    /// Zero before any trial has run.
    pub fn success_ratio(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            f64::from(self.trial_wins) / f64::from(self.trials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;
    use crate::evaluator::HandCategory;

    #[test]
    fn wager_consuming_stack_goes_all_in() {
        let mut p = Participant::with_stack("0", 10);
        assert!(p.is_betting());
        assert_eq!(p.place_wager(4), 4);
        assert_eq!(p.stack(), 6);
        assert!(p.is_betting());
        assert_eq!(p.place_wager(9), 6, "wager capped at remaining stack");
        assert!(p.is_all_in());
        assert_eq!(p.stack(), 0);
    }

    #[test]
    fn collect_restores_betting_state() {
        let mut p = Participant::with_stack("0", 5);
        p.place_wager(5);
        assert!(p.is_all_in());
        p.collect(12);
        assert_eq!(p.stack(), 12);
        assert!(p.is_betting());
    }

    #[test]
    fn evaluation_is_memoized_and_invalidated_by_new_board() {
        let mut p = Participant::with_stack("0", 10);
        p.set_hole_cards(parse_cards("S13 D13").unwrap());
        p.set_community_cards(parse_cards("C13 H9 S5").unwrap());
        let first = p.evaluate_hand(RoyalRule::TopValue).unwrap().clone();
        assert_eq!(first.category, HandCategory::ThreeOfAKind);
        // Same card set: evaluation is idempotent.
        assert_eq!(p.evaluate_hand(RoyalRule::TopValue).unwrap(), &first);

        p.set_community_cards(parse_cards("C13 H9 S5 H13 D2").unwrap());
        assert!(p.hand().is_none(), "new board clears the memo");
        let second = p.evaluate_hand(RoyalRule::TopValue).unwrap();
        assert_eq!(second.category, HandCategory::FourOfAKind);
    }

    #[test]
    fn trial_counters_follow_state_and_board() {
        let mut p = Participant::with_stack("0", 10);
        p.set_hole_cards(parse_cards("S1 D1").unwrap());
        p.set_community_cards(parse_cards("C1 H9 S5").unwrap());
        p.evaluate_hand(RoyalRule::TopValue).unwrap();

        let weaker = HandRank::new(HandCategory::Pair, vec![9, 8, 7, 6]);
        let stronger = HandRank::new(HandCategory::StraightFlush, vec![9]);
        p.record_trial(&weaker);
        p.record_trial(&stronger);
        assert_eq!(p.trials(), 2);
        assert_eq!(p.trial_wins(), 1);
        assert!((p.success_ratio() - 0.5).abs() < f64::EPSILON);

        p.set_community_cards(parse_cards("C1 H9 S5 D2 D3").unwrap());
        assert_eq!(p.trials(), 0, "new community cards reset the estimate");
        assert_eq!(p.success_ratio(), 0.0);

        p.fold();
        p.record_trial(&weaker);
        assert_eq!(p.trials(), 0, "folded seats do not train");
    }

    #[test]
    fn reset_between_matches_keeps_stack() {
        let mut p = Participant::with_stack("0", 20);
        p.set_hole_cards(parse_cards("S1 D1").unwrap());
        p.place_wager(8);
        p.reset_for_match();
        assert_eq!(p.stack(), 12);
        assert!(p.is_betting());
        assert!(p.hole_cards().is_empty());
        assert!(p.hand().is_none());

        p.place_wager(12);
        p.reset_for_match();
        assert!(p.is_folded(), "empty stack sits out");
    }
}
