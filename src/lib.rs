//! holdem-sim: a Texas Hold'em table simulator
//!
//! Goals:
//! - Deterministic hand evaluation and winner selection for 5 to 7 cards
//! - A fixed three-round betting engine with pluggable action sources
//! - Monte-Carlo win-probability estimates driving a threshold bot policy
//! - No panics for invalid input; use `Result` for recoverable errors
//!
//! ## Quick start: rank a hand
//! ```
//! use holdem_sim::cards::parse_cards;
//! use holdem_sim::evaluator::{evaluate, HandCategory, RoyalRule};
//!
//! let cards = parse_cards("S7 H7 D7 C7 S13 H2 D4").unwrap();
//! let rank = evaluate(&cards, RoyalRule::default()).unwrap();
//! assert_eq!(rank.category, HandCategory::FourOfAKind);
//! assert_eq!(rank.values, vec![7, 13]);
//! ```
//!
//! ## Quick start: an all-bot match
//! ```
//! use holdem_sim::game::{Game, GameConfig};
//! use holdem_sim::policy::ThresholdPolicy;
//! use holdem_sim::trainer::TrainerConfig;
//!
//! let config = GameConfig { trainer: TrainerConfig { trials: 50 }, ..GameConfig::default() };
//! let mut game = Game::new(config, 42);
//! for id in ["alice", "bob", "carol"] {
//!     game.add_seat(id, Box::new(ThresholdPolicy::default()));
//! }
//! let result = game.play_match().unwrap();
//! assert_eq!(game.pot(), 0);
//! assert!(result.payouts.iter().all(|(_, award)| *award <= 3 * 100));
//! ```

pub mod cards;
pub mod deck;
pub mod evaluator;
pub mod game;
pub mod participant;
pub mod policy;
pub mod regression;
pub mod trainer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
