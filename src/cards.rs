use std::fmt;
use std::str::FromStr;

/// Four suits; order has no hand-strength meaning but is fixed for ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Suit {
    Spade,
    Diamond,
    Club,
    Heart,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spade, Suit::Diamond, Suit::Club, Suit::Heart];

    pub const fn to_char(self) -> char {
        match self {
            Suit::Spade => 'S',
            Suit::Diamond => 'D',
            Suit::Club => 'C',
            Suit::Heart => 'H',
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CardParseError {
    #[error("invalid suit: '{0}'")]
    Suit(String),
    #[error("invalid card value: {0} (expected 1..=13)")]
    Value(u8),
    #[error("invalid card token: '{0}'")]
    Token(String),
}

impl TryFrom<char> for Suit {
    type Error = CardParseError;
    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c.to_ascii_uppercase() {
            'S' => Ok(Suit::Spade),
            'D' => Ok(Suit::Diamond),
            'C' => Ok(Suit::Club),
            'H' => Ok(Suit::Heart),
            _ => Err(CardParseError::Suit(c.to_string())),
        }
    }
}

impl FromStr for Suit {
    type Err = CardParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        let mut chars = t.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Suit::try_from(c),
            _ => Err(CardParseError::Suit(s.to_string())),
        }
    }
}

/// A playing card: suit plus face value 1..=13, where 1 is the Ace.
///
/// The Ace is always high: for ranking purposes its value maps to 14
/// (see [`Card::rank_value`]). Tokens use a suit letter followed by the
/// decimal value, e.g. `S10` or `H1` (Ace of Hearts).
///
/// ```
/// use holdem_sim::cards::{Card, Suit};
///
/// let ace: Card = "H1".parse().unwrap();
/// assert_eq!(ace.suit(), Suit::Heart);
/// assert_eq!(ace.value(), 1);
/// assert_eq!(ace.rank_value(), 14);
/// assert_eq!(ace.to_string(), "H1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Card {
    suit: Suit,
    value: u8,
}

impl Card {
    /// Construct a card, rejecting values outside 1..=13.
    pub const fn try_new(suit: Suit, value: u8) -> Result<Self, CardParseError> {
        if value < 1 || value > 13 {
            return Err(CardParseError::Value(value));
        }
        Ok(Self { suit, value })
    }

    pub const fn suit(self) -> Suit {
        self.suit
    }

    /// Face value, 1..=13 with 1 as the Ace.
    pub const fn value(self) -> u8 {
        self.value
    }

    /// Value used for ranking: the Ace maps to 14, everything else is its
    /// face value. There is no low-Ace straight in this ruleset.
    pub const fn rank_value(self) -> u8 {
        if self.value == 1 {
            14
        } else {
            self.value
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.suit, self.value)
    }
}

impl FromStr for Card {
    type Err = CardParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.len() < 2 {
            return Err(CardParseError::Token(s.to_string()));
        }
        let suit_ch = t.chars().next().unwrap_or(' ');
        let suit = Suit::try_from(suit_ch)?;
        let value: u8 =
            t[suit_ch.len_utf8()..].parse().map_err(|_| CardParseError::Token(s.to_string()))?;
        let card = Card::try_new(suit, value)?;
        Ok(card)
    }
}

/// Parse multiple card tokens separated by whitespace or commas.
///
/// ```
/// use holdem_sim::cards::{parse_cards, Suit};
///
/// let cards = parse_cards("S10, H1 D7").unwrap();
/// assert_eq!(cards.len(), 3);
/// assert_eq!(cards[1].suit(), Suit::Heart);
/// ```
pub fn parse_cards(input: &str) -> Result<Vec<Card>, CardParseError> {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(Card::from_str)
        .collect()
}
