use std::path::PathBuf;
use std::time::Duration;

use super::layout::Point;
use super::leaderboard::LeaderboardRecord;

pub const CARD_BACK_IMAGE: &str = "card_back.svg";
pub const QUIT_BUTTON_IMAGE: &str = "quit_button.svg";
pub const LOAD_BUTTON_IMAGE: &str = "load_deck_button.svg";

/// Full-size pictures shown centred over the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Image {
    Splash,
    CardWarning,
    Winner,
    QuitMessage,
    EndCredits,
}

impl Image {
    pub fn file_name(self) -> &'static str {
        match self {
            Image::Splash => "splash.svg",
            Image::CardWarning => "card_warning.svg",
            Image::Winner => "winner.svg",
            Image::QuitMessage => "quit_message.svg",
            Image::EndCredits => "end_credits.svg",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prompt {
    PlayerName,
    CardCount,
    DeckName,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timer {
    SplashElapsed,
    WarningElapsed,
    ResolveMatch,
    ResolveMismatch,
    CheckWin,
    BeginEndSequence,
    Terminate,
}

/// A timer tagged with the board generation it was scheduled for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deferred {
    pub generation: u64,
    pub timer: Timer,
}

/// Work the session hands to the presentation layer, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    ShowImage { image: Image, path: PathBuf },
    HideImage(Image),
    LayoutBoard {
        card_back: PathBuf,
        quit_button: PathBuf,
        load_button: PathBuf,
        positions: Vec<Point>,
    },
    ShowCardFace { index: usize, image: PathBuf },
    ShowCardBack { index: usize },
    HideCard { index: usize },
    UpdateStatus { guesses: u32, matches: u32 },
    ShowLeaderboard(Vec<LeaderboardRecord>),
    Prompt(Prompt),
    Schedule { delay: Duration, deferred: Deferred },
    EnterFullscreen,
    Fatal(String),
    Exit,
}
