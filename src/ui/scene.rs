use std::path::{Path, PathBuf};

use crate::game::command::{Command, Image};
use crate::game::layout::Point;
use crate::game::leaderboard::LeaderboardRecord;

#[derive(Clone, Debug, PartialEq)]
pub struct CardSprite {
    pub position: Point,
    pub face: Option<PathBuf>,
    pub visible: bool,
}

/// What the board canvas currently shows, rebuilt from session commands.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub card_back: Option<PathBuf>,
    pub quit_button: Option<PathBuf>,
    pub load_button: Option<PathBuf>,
    pub cards: Vec<CardSprite>,
    pub status: Option<(u32, u32)>,
    pub leaderboard: Vec<LeaderboardRecord>,
    /// Full-size pictures, most recent last.
    pub overlays: Vec<(Image, PathBuf)>,
}

pub fn status_line(guesses: u32, matches: u32) -> String {
    format!("Status: {guesses} moves, {matches} matches")
}

pub fn leaderboard_lines(records: &[LeaderboardRecord]) -> Vec<String> {
    records
        .iter()
        .map(|record| format!("{}: {} moves", record.name, record.moves))
        .collect()
}

impl Scene {
    pub fn has_board(&self) -> bool {
        self.card_back.is_some()
    }

    /// The end credits picture, which replaces everything else when shown.
    pub fn credits(&self) -> Option<&Path> {
        self.overlays
            .iter()
            .find(|(image, _)| *image == Image::EndCredits)
            .map(|(_, path)| path.as_path())
    }

    pub fn status_text(&self) -> Option<String> {
        self.status
            .map(|(guesses, matches)| status_line(guesses, matches))
    }

    /// Applies a drawing command. Returns true when the canvas needs a redraw.
    pub fn apply(&mut self, command: &Command) -> bool {
        match command {
            Command::ShowImage { image, path } => {
                self.overlays.retain(|(shown, _)| shown != image);
                self.overlays.push((*image, path.clone()));
            }
            Command::HideImage(image) => {
                self.overlays.retain(|(shown, _)| shown != image);
            }
            Command::LayoutBoard {
                card_back,
                quit_button,
                load_button,
                positions,
            } => {
                self.card_back = Some(card_back.clone());
                self.quit_button = Some(quit_button.clone());
                self.load_button = Some(load_button.clone());
                self.cards = positions
                    .iter()
                    .map(|&position| CardSprite {
                        position,
                        face: None,
                        visible: true,
                    })
                    .collect();
            }
            Command::ShowCardFace { index, image } => {
                let Some(card) = self.cards.get_mut(*index) else {
                    return false;
                };
                card.face = Some(image.clone());
            }
            Command::ShowCardBack { index } => {
                let Some(card) = self.cards.get_mut(*index) else {
                    return false;
                };
                card.face = None;
            }
            Command::HideCard { index } => {
                let Some(card) = self.cards.get_mut(*index) else {
                    return false;
                };
                card.visible = false;
            }
            Command::UpdateStatus { guesses, matches } => {
                self.status = Some((*guesses, *matches));
            }
            Command::ShowLeaderboard(records) => {
                self.leaderboard = records.clone();
            }
            Command::Prompt(_)
            | Command::Schedule { .. }
            | Command::EnterFullscreen
            | Command::Fatal(_)
            | Command::Exit => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::layout::card_positions;

    fn laid_out(count: usize) -> Scene {
        let mut scene = Scene::default();
        scene.apply(&Command::LayoutBoard {
            card_back: PathBuf::from("assets/card_back.svg"),
            quit_button: PathBuf::from("assets/quit_button.svg"),
            load_button: PathBuf::from("assets/load_deck_button.svg"),
            positions: card_positions(count),
        });
        scene
    }

    #[test]
    fn layout_replaces_previous_cards() {
        let mut scene = laid_out(12);
        scene.apply(&Command::HideCard { index: 3 });
        scene.apply(&Command::LayoutBoard {
            card_back: PathBuf::from("b.svg"),
            quit_button: PathBuf::from("q.svg"),
            load_button: PathBuf::from("l.svg"),
            positions: card_positions(8),
        });
        assert_eq!(scene.cards.len(), 8);
        assert!(scene.cards.iter().all(|card| card.visible && card.face.is_none()));
        assert_eq!(scene.card_back, Some(PathBuf::from("b.svg")));
    }

    #[test]
    fn faces_flip_and_hide() {
        let mut scene = laid_out(8);
        assert!(scene.apply(&Command::ShowCardFace {
            index: 2,
            image: PathBuf::from("assets/owl.svg"),
        }));
        assert_eq!(scene.cards[2].face, Some(PathBuf::from("assets/owl.svg")));

        scene.apply(&Command::ShowCardBack { index: 2 });
        assert_eq!(scene.cards[2].face, None);

        scene.apply(&Command::HideCard { index: 2 });
        assert!(!scene.cards[2].visible);
        assert!(!scene.apply(&Command::HideCard { index: 40 }));
    }

    #[test]
    fn overlays_stack_without_duplicates() {
        let mut scene = Scene::default();
        scene.apply(&Command::ShowImage {
            image: Image::Winner,
            path: PathBuf::from("winner.svg"),
        });
        scene.apply(&Command::ShowImage {
            image: Image::EndCredits,
            path: PathBuf::from("end_credits.svg"),
        });
        scene.apply(&Command::ShowImage {
            image: Image::Winner,
            path: PathBuf::from("winner.svg"),
        });
        let order: Vec<Image> = scene.overlays.iter().map(|(image, _)| *image).collect();
        assert_eq!(order, vec![Image::EndCredits, Image::Winner]);
        assert_eq!(scene.credits(), Some(Path::new("end_credits.svg")));

        scene.apply(&Command::HideImage(Image::EndCredits));
        assert_eq!(scene.credits(), None);
    }

    #[test]
    fn status_and_leaderboard_text() {
        let mut scene = Scene::default();
        assert_eq!(scene.status_text(), None);
        scene.apply(&Command::UpdateStatus {
            guesses: 5,
            matches: 2,
        });
        assert_eq!(
            scene.status_text().as_deref(),
            Some("Status: 5 moves, 2 matches")
        );

        let records = vec![
            LeaderboardRecord::new("Alice", 7),
            LeaderboardRecord::new("Bea", 9),
        ];
        scene.apply(&Command::ShowLeaderboard(records.clone()));
        assert_eq!(
            leaderboard_lines(&scene.leaderboard),
            vec!["Alice: 7 moves", "Bea: 9 moves"]
        );
    }

    #[test]
    fn control_commands_do_not_redraw() {
        let mut scene = Scene::default();
        assert!(!scene.apply(&Command::EnterFullscreen));
        assert!(!scene.apply(&Command::Exit));
        assert_eq!(scene, Scene::default());
    }
}
