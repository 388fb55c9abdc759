pub mod card;
pub mod command;
pub mod deck;
pub mod deck_source;
pub mod error;
pub mod layout;
pub mod leaderboard;
pub mod session;
