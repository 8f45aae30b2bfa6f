use crate::cards::{Card, Suit};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A standard 52-card deck with a deal cursor.
///
/// Cards before the cursor have been dealt and are never handed out again.
/// [`Deck::remove`] deletes specific cards outright, which is how simulation
/// decks exclude the community cards already on the table.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
    top: usize,
}

impl Deck {
    /// ```
    /// use holdem_sim::deck::Deck;
    ///
    /// let deck = Deck::standard();
    /// assert_eq!(deck.remaining(), 52);
    /// ```
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(52);
        for &suit in &Suit::ALL {
            for value in 1..=13 {
                // value is always in range here
                if let Ok(card) = Card::try_new(suit, value) {
                    cards.push(card);
                }
            }
        }
        Self { cards, top: 0 }
    }

    /// Cards still available to deal.
    pub fn remaining(&self) -> usize {
        self.cards.len() - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Shuffle the undealt portion back into a full random order and reset
    /// the cursor. Seeded for reproducibility.
    pub fn shuffle_seeded(&mut self, seed: u64) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.shuffle_with(&mut rng);
    }

    /// Shuffle using the provided RNG.
    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
        self.top = 0;
    }

    /// Deal `n` cards from the top, or `None` if fewer than `n` remain.
    /// Running dry cannot happen under correct round sequencing; callers
    /// treat `None` as a fatal precondition violation.
    pub fn deal(&mut self, n: usize) -> Option<Vec<Card>> {
        if n == 0 || n > self.remaining() {
            return None;
        }
        let dealt = self.cards[self.top..self.top + n].to_vec();
        self.top += n;
        Some(dealt)
    }

    /// Permanently delete the given cards from the undealt portion.
    pub fn remove(&mut self, cards: &[Card]) {
        self.cards.retain(|c| !cards.contains(c));
        if self.top > self.cards.len() {
            self.top = self.cards.len();
        }
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::standard()
    }
}
