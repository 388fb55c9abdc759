#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardStatus {
    Hidden,
    Revealed,
    Matched,
    /// Matched and taken off the board once the match delay elapsed.
    Removed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    pub face: String,
    pub status: CardStatus,
}

impl Card {
    pub fn new(face: impl Into<String>) -> Self {
        Card {
            face: face.into(),
            status: CardStatus::Hidden,
        }
    }

    pub fn is_face_up(&self) -> bool {
        matches!(self.status, CardStatus::Revealed | CardStatus::Matched)
    }

    pub fn is_matched(&self) -> bool {
        matches!(self.status, CardStatus::Matched | CardStatus::Removed)
    }

    pub fn is_in_play(&self) -> bool {
        self.status != CardStatus::Removed
    }

    /// Turns a hidden card face up. Returns false for any other status.
    pub fn reveal(&mut self) -> bool {
        if self.status != CardStatus::Hidden {
            return false;
        }
        self.status = CardStatus::Revealed;
        true
    }

    /// Turns a revealed card back down. Matched cards stay face up.
    pub fn conceal(&mut self) -> bool {
        if self.status != CardStatus::Revealed {
            return false;
        }
        self.status = CardStatus::Hidden;
        true
    }

    pub fn remove(&mut self) {
        if self.status == CardStatus::Matched {
            self.status = CardStatus::Removed;
        }
    }

    pub fn matches(&self, other: &Card) -> bool {
        self.face == other.face
    }
}

/// Marks both cards matched when their faces agree.
pub fn apply_match(first: &mut Card, second: &mut Card) -> bool {
    if !first.matches(second) {
        return false;
    }
    first.status = CardStatus::Matched;
    second.status = CardStatus::Matched;
    true
}
