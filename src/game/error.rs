use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("deck file {name} was not found in {}", dir.display())]
    Missing { name: String, dir: PathBuf },

    #[error("could not read deck file {name}")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("deck file {name} lists no card faces")]
    Empty { name: String },

    #[error("deck file {deck} references missing image {face}")]
    MissingImage { deck: String, face: String },

    #[error("deck needs {needed} distinct faces but only {available} are available")]
    InsufficientFaces { needed: usize, available: usize },
}

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("could not read leaderboard {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not write leaderboard {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed leaderboard line {line}: {content:?}")]
    Malformed { line: usize, content: String },
}
