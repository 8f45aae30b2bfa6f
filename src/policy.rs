//! Action sources: pluggable deciders for seats (threshold-table bots,
//! queued decisions fed by a UI, scripted sequences for tests).
//!
//! The engine talks to every seat through [`ActionSource`] and never
//! branches on what kind of player sits behind it.

use std::collections::VecDeque;

/// A seat's answer when asked to act: fold, or wager an amount.
///
/// A wager below the running call level is treated as a check/limp; a wager
/// equal to the seat's whole stack is an all-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Decision {
    Fold,
    Bet(u64),
}

/// Everything a source may consult when deciding.
#[derive(Debug, Clone, Copy)]
pub struct TurnContext {
    /// Highest wager any active seat has placed this round.
    pub call_level: u64,
    /// Chips the acting seat still holds.
    pub stack: u64,
    /// Monte-Carlo estimate for the acting seat, if one has been computed
    /// this round (`None` before the first board cards are revealed).
    pub success_ratio: Option<f64>,
}

/// A decider attached to one seat.
pub trait ActionSource {
    /// Called exactly once per betting round when the seat is `Betting`.
    fn decide(&mut self, ctx: &TurnContext) -> Decision;
}

/// One row of the success-ratio table: applies to ratios strictly below
/// `ratio_ceiling`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyBracket {
    pub ratio_ceiling: f64,
    pub action: BracketAction,
    pub min_wager: u64,
    pub max_wager: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketAction {
    Fold,
    Bet,
}

/// The automated betting policy: consult the first bracket whose ceiling
/// exceeds the success ratio, then raise to its minimum, call, or fold
/// depending on where the call level sits relative to the bracket.
///
/// ```
/// use holdem_sim::policy::{ActionSource, Decision, ThresholdPolicy, TurnContext};
///
/// let mut bot = ThresholdPolicy::default();
/// let ctx = TurnContext { call_level: 0, stack: 50, success_ratio: Some(0.55) };
/// assert_eq!(bot.decide(&ctx), Decision::Bet(1));
/// let ctx = TurnContext { call_level: 5, stack: 50, success_ratio: Some(0.55) };
/// assert_eq!(bot.decide(&ctx), Decision::Fold);
/// ```
#[derive(Debug, Clone)]
pub struct ThresholdPolicy {
    table: Vec<PolicyBracket>,
}

impl ThresholdPolicy {
    pub fn new(table: Vec<PolicyBracket>) -> Self {
        Self { table }
    }

    /// The standard table: fold below 0.4, then wager brackets
    /// [1,2] / [2,3] / [3,10] as the ratio climbs.
    pub fn standard_table() -> Vec<PolicyBracket> {
        vec![
            PolicyBracket {
                ratio_ceiling: 0.4,
                action: BracketAction::Fold,
                min_wager: 0,
                max_wager: 0,
            },
            PolicyBracket {
                ratio_ceiling: 0.6,
                action: BracketAction::Bet,
                min_wager: 1,
                max_wager: 2,
            },
            PolicyBracket {
                ratio_ceiling: 0.8,
                action: BracketAction::Bet,
                min_wager: 2,
                max_wager: 3,
            },
            PolicyBracket {
                ratio_ceiling: 1.0,
                action: BracketAction::Bet,
                min_wager: 3,
                max_wager: 10,
            },
        ]
    }
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self::new(Self::standard_table())
    }
}

impl ActionSource for ThresholdPolicy {
    fn decide(&mut self, ctx: &TurnContext) -> Decision {
        let ratio = match ctx.success_ratio {
            // No estimate yet (hole-card round): call the running level.
            None => return Decision::Bet(ctx.call_level),
            Some(r) => r,
        };
        for bracket in &self.table {
            if ratio < bracket.ratio_ceiling
                || (bracket.ratio_ceiling >= 1.0 && ratio >= 1.0)
            {
                match bracket.action {
                    BracketAction::Fold => return Decision::Fold,
                    BracketAction::Bet => {
                        if ctx.call_level < bracket.min_wager {
                            return Decision::Bet(bracket.min_wager);
                        }
                        if ctx.call_level > bracket.max_wager {
                            return Decision::Fold;
                        }
                        return Decision::Bet(ctx.call_level);
                    }
                }
            }
        }
        Decision::Bet(ctx.call_level)
    }
}

/// Adapter for externally driven seats (UI, prompt) polled through the
/// normal action loop: the collaborator queues a decision ahead of the
/// round, and the seat checks while the queue is empty. Collaborators that
/// own the loop themselves can use [`crate::game::Game::submit_action`]
/// instead.
#[derive(Debug, Default)]
pub struct QueuedSource {
    pending: Option<Decision>,
}

impl QueuedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a decision; rejected (returns false) while one is pending.
    pub fn queue(&mut self, decision: Decision) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(decision);
        true
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl ActionSource for QueuedSource {
    fn decide(&mut self, ctx: &TurnContext) -> Decision {
        self.pending.take().unwrap_or(Decision::Bet(ctx.call_level))
    }
}

/// Plays back a fixed sequence of decisions; checks once exhausted.
/// Test helper, kept in the library so integration tests can drive matches.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    script: VecDeque<Decision>,
}

impl ScriptedSource {
    pub fn new(decisions: impl IntoIterator<Item = Decision>) -> Self {
        Self { script: decisions.into_iter().collect() }
    }
}

impl ActionSource for ScriptedSource {
    fn decide(&mut self, ctx: &TurnContext) -> Decision {
        self.script.pop_front().unwrap_or(Decision::Bet(ctx.call_level))
    }
}
