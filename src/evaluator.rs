use crate::cards::{Card, Suit};
use core::cmp::Ordering;

/// Hand categories, strongest first: a *lower* ordinal is a *better* hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum HandCategory {
    RoyalFlush = 0,
    StraightFlush = 1,
    FourOfAKind = 2,
    FullHouse = 3,
    Flush = 4,
    Straight = 5,
    ThreeOfAKind = 6,
    TwoPair = 7,
    Pair = 8,
    HighCard = 9,
}

impl HandCategory {
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    pub const fn label(self) -> &'static str {
        match self {
            HandCategory::RoyalFlush => "Royal Flush",
            HandCategory::StraightFlush => "Straight Flush",
            HandCategory::FourOfAKind => "Four of a Kind",
            HandCategory::FullHouse => "Full House",
            HandCategory::Flush => "Flush",
            HandCategory::Straight => "Straight",
            HandCategory::ThreeOfAKind => "Three of a Kind",
            HandCategory::TwoPair => "Two Pair",
            HandCategory::Pair => "Pair",
            HandCategory::HighCard => "High Card",
        }
    }
}

/// How the Royal Flush is told apart from an ordinary straight flush.
///
/// `TopValue` is the standard rule: royal means the straight flush tops out
/// at 14. `DiamondSuit` reproduces a quirk found in older recorded
/// showdowns, where a diamond straight flush ranked royal with no tie-break
/// values; keep it only for replaying those recordings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum RoyalRule {
    #[default]
    TopValue,
    DiamondSuit,
}

/// Evaluated hand strength: category plus tie-break values, most significant
/// first. Ordering follows showdown rules: stronger hands compare `Greater`.
///
/// Equal categories compare tie-breaks element-wise; when one sequence is a
/// strict prefix of the other, the longer one wins (hands evaluated over
/// different card counts meet at showdown in this ruleset).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandRank {
    pub category: HandCategory,
    pub values: Vec<u8>,
}

impl HandRank {
    pub fn new(category: HandCategory, values: Vec<u8>) -> Self {
        Self { category, values }
    }
}

impl Ord for HandRank {
    fn cmp(&self, other: &Self) -> Ordering {
        // Lower category ordinal is the stronger hand.
        match other.category.ordinal().cmp(&self.category.ordinal()) {
            Ordering::Equal => {}
            ord => return ord,
        }
        for (a, b) in self.values.iter().zip(other.values.iter()) {
            match a.cmp(b) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }
        self.values.len().cmp(&other.values.len())
    }
}

impl PartialOrd for HandRank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EvalError {
    #[error("not enough cards to evaluate: {0} (need at least 5)")]
    NotEnoughCards(usize),
    #[error("too many cards to evaluate: {0} (at most 7)")]
    TooManyCards(usize),
}

/// Scan values sorted descending (no duplicates) for a run of 5 consecutive
/// values; returns the top of the highest run.
fn find_run(vals: &[u8]) -> Option<u8> {
    if vals.len() < 5 {
        return None;
    }
    for i in 0..=vals.len() - 5 {
        if (0..4).all(|j| vals[i + j] == vals[i + j + 1] + 1) {
            return Some(vals[i]);
        }
    }
    None
}

fn straight_flush_rank(suit: Suit, top: u8, rule: RoyalRule) -> HandRank {
    match rule {
        RoyalRule::TopValue => {
            if top == 14 {
                HandRank::new(HandCategory::RoyalFlush, vec![14])
            } else {
                HandRank::new(HandCategory::StraightFlush, vec![top])
            }
        }
        // Diamonds rank royal regardless of the top card, and these royals
        // carry no tie-break values.
        RoyalRule::DiamondSuit => {
            if suit == Suit::Diamond {
                HandRank::new(HandCategory::RoyalFlush, Vec::new())
            } else {
                HandRank::new(HandCategory::StraightFlush, vec![top])
            }
        }
    }
}

/// Classify a 5–7 card set into `(category, tie-break values)`.
///
/// Checks run in strict priority order: straight-flush family by suit group,
/// then flush, then straight, then the grouped-by-value cascade. Quads and a
/// full house override a found flush or straight; nothing weaker does.
///
/// ```
/// use holdem_sim::cards::parse_cards;
/// use holdem_sim::evaluator::{evaluate, HandCategory, RoyalRule};
///
/// let cards = parse_cards("S1 S13 S12 S11 S10 D2 H3").unwrap();
/// let rank = evaluate(&cards, RoyalRule::TopValue).unwrap();
/// assert_eq!(rank.category, HandCategory::RoyalFlush);
/// assert_eq!(rank.values, vec![14]);
/// ```
pub fn evaluate(cards: &[Card], rule: RoyalRule) -> Result<HandRank, EvalError> {
    if cards.len() < 5 {
        return Err(EvalError::NotEnoughCards(cards.len()));
    }
    if cards.len() > 7 {
        return Err(EvalError::TooManyCards(cards.len()));
    }

    // Suited sets: with at most 7 cards only one suit can reach 5.
    let mut flush: Option<HandRank> = None;
    for &suit in &Suit::ALL {
        let mut vals: Vec<u8> =
            cards.iter().filter(|c| c.suit() == suit).map(|c| c.rank_value()).collect();
        if vals.len() < 5 {
            continue;
        }
        vals.sort_unstable_by(|a, b| b.cmp(a));
        if let Some(top) = find_run(&vals) {
            return Ok(straight_flush_rank(suit, top, rule));
        }
        vals.truncate(5);
        flush = Some(HandRank::new(HandCategory::Flush, vals));
    }

    // Straight across suits, duplicate values collapsed before scanning.
    let straight = {
        let mut vals: Vec<u8> = cards.iter().map(|c| c.rank_value()).collect();
        vals.sort_unstable_by(|a, b| b.cmp(a));
        vals.dedup();
        find_run(&vals).map(|top| HandRank::new(HandCategory::Straight, vec![top]))
    };
    // A flush outranks a straight when both are present.
    let run_or_flush = flush.or(straight);

    // Grouped-by-value buckets: subtract 4/3/2/1 repeatedly from each
    // value's count. Iterating values descending leaves every bucket sorted.
    let mut counts = [0u8; 15];
    for c in cards {
        counts[c.rank_value() as usize] += 1;
    }
    let mut quads: Vec<u8> = Vec::new();
    let mut trips: Vec<u8> = Vec::new();
    let mut pairs: Vec<u8> = Vec::new();
    let mut singles: Vec<u8> = Vec::new();
    for v in (2..=14u8).rev() {
        let mut count = counts[v as usize];
        while count >= 4 {
            count -= 4;
            quads.push(v);
        }
        while count >= 3 {
            count -= 3;
            trips.push(v);
        }
        while count >= 2 {
            count -= 2;
            pairs.push(v);
        }
        while count >= 1 {
            count -= 1;
            singles.push(v);
        }
    }

    if let Some(&quad) = quads.first() {
        // Best kicker across all remaining buckets.
        let kicker = trips
            .first()
            .into_iter()
            .chain(pairs.first())
            .chain(singles.first())
            .copied()
            .max()
            .unwrap_or(0);
        return Ok(HandRank::new(HandCategory::FourOfAKind, vec![quad, kicker]));
    }

    if let Some(&triple) = trips.first() {
        // A second triple stands in for the pair (7 cards can hold two).
        let pair = pairs.first().into_iter().chain(trips.get(1)).copied().max();
        if let Some(pair) = pair {
            return Ok(HandRank::new(HandCategory::FullHouse, vec![triple, pair]));
        }
    }

    if let Some(rank) = run_or_flush {
        return Ok(rank);
    }

    if let Some(&triple) = trips.first() {
        let mut values = vec![triple];
        values.extend(singles.iter().take(2));
        return Ok(HandRank::new(HandCategory::ThreeOfAKind, values));
    }

    if pairs.len() >= 2 {
        let kicker =
            pairs.get(2).into_iter().chain(singles.first()).copied().max().unwrap_or(0);
        return Ok(HandRank::new(HandCategory::TwoPair, vec![pairs[0], pairs[1], kicker]));
    }

    if let Some(&pair) = pairs.first() {
        let mut values = vec![pair];
        values.extend(singles.iter().take(3));
        return Ok(HandRank::new(HandCategory::Pair, values));
    }

    singles.truncate(5);
    Ok(HandRank::new(HandCategory::HighCard, singles))
}
