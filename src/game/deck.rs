use rand::Rng;
use rand::seq::SliceRandom;

use super::card::{Card, apply_match};
use super::error::DeckError;

pub const CARDS_PER_FACE: usize = 2;

/// Picks `pair_count` distinct faces, deals each twice and shuffles the lot.
pub fn build_deck<R: Rng + ?Sized>(
    faces: &[String],
    pair_count: usize,
    rng: &mut R,
) -> Result<Vec<Card>, DeckError> {
    let mut face_pool: Vec<&str> = Vec::with_capacity(faces.len());
    for face in faces {
        if !face_pool.contains(&face.as_str()) {
            face_pool.push(face.as_str());
        }
    }
    if face_pool.len() < pair_count {
        return Err(DeckError::InsufficientFaces {
            needed: pair_count,
            available: face_pool.len(),
        });
    }

    face_pool.shuffle(rng);
    let mut cards = Vec::with_capacity(pair_count * CARDS_PER_FACE);
    for face in face_pool.into_iter().take(pair_count) {
        for _ in 0..CARDS_PER_FACE {
            cards.push(Card::new(face));
        }
    }

    cards.shuffle(rng);
    Ok(cards)
}

#[derive(Clone, Debug, Default)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn build<R: Rng + ?Sized>(
        faces: &[String],
        pair_count: usize,
        rng: &mut R,
    ) -> Result<Self, DeckError> {
        Ok(Deck {
            cards: build_deck(faces, pair_count, rng)?,
        })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn get(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Card> {
        self.cards.get_mut(index)
    }

    /// Two distinct cards borrowed mutably at once.
    pub fn pair_mut(&mut self, first: usize, second: usize) -> Option<(&mut Card, &mut Card)> {
        if first == second || first >= self.cards.len() || second >= self.cards.len() {
            return None;
        }
        if first < second {
            let (head, tail) = self.cards.split_at_mut(second);
            Some((&mut head[first], &mut tail[0]))
        } else {
            let (head, tail) = self.cards.split_at_mut(first);
            Some((&mut tail[0], &mut head[second]))
        }
    }

    pub fn apply_match(&mut self, first: usize, second: usize) -> bool {
        match self.pair_mut(first, second) {
            Some((a, b)) => apply_match(a, b),
            None => false,
        }
    }

    pub fn all_matched(&self) -> bool {
        !self.cards.is_empty() && self.cards.iter().all(Card::is_matched)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::game::card::CardStatus;

    fn faces(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn face_counts(cards: &[Card]) -> HashMap<&str, usize> {
        let mut counts = HashMap::new();
        for card in cards {
            *counts.entry(card.face.as_str()).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn valid_card_counts_deal_exact_pairs() {
        let pool = faces(&["a", "b", "c", "d", "e", "f", "g"]);
        let mut rng = StdRng::seed_from_u64(7);
        for card_count in [8, 10, 12] {
            let cards = build_deck(&pool, card_count / 2, &mut rng).unwrap();
            assert_eq!(cards.len(), card_count);
            let counts = face_counts(&cards);
            assert_eq!(counts.len(), card_count / 2);
            assert!(counts.values().all(|&count| count == 2));
            assert!(cards.iter().all(|card| card.status == CardStatus::Hidden));
        }
    }

    #[test]
    fn too_few_faces_is_reported() {
        let pool = faces(&["a", "b", "c"]);
        let mut rng = StdRng::seed_from_u64(1);
        let err = build_deck(&pool, 4, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            DeckError::InsufficientFaces {
                needed: 4,
                available: 3
            }
        ));
    }

    #[test]
    fn repeated_faces_count_once() {
        let pool = faces(&["a", "a", "b", "b", "c", "d"]);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(build_deck(&pool, 4, &mut rng).is_ok());
        assert!(build_deck(&pool, 5, &mut rng).is_err());
    }

    #[test]
    fn shuffle_spreads_faces_evenly_over_positions() {
        let pool = faces(&["a", "b", "c", "d"]);
        let mut rng = StdRng::seed_from_u64(2024);
        let trials = 4000;
        let mut tally: Vec<HashMap<String, usize>> = vec![HashMap::new(); 8];

        for _ in 0..trials {
            let cards = build_deck(&pool, 4, &mut rng).unwrap();
            for (position, card) in cards.iter().enumerate() {
                *tally[position].entry(card.face.clone()).or_insert(0) += 1;
            }
        }

        // Each face holds a given position a quarter of the time.
        let expected = trials / 4;
        for position in &tally {
            for face in &pool {
                let seen = position.get(face).copied().unwrap_or(0);
                assert!(
                    seen.abs_diff(expected) < expected * 15 / 100,
                    "face {face} seen {seen} times, expected about {expected}"
                );
            }
        }
    }

    #[test]
    fn pair_mut_rejects_same_index() {
        let pool = faces(&["a", "b"]);
        let mut deck = Deck::build(&pool, 2, &mut StdRng::seed_from_u64(9)).unwrap();
        assert!(deck.pair_mut(1, 1).is_none());
        assert!(deck.pair_mut(0, 4).is_none());
        let (x, y) = deck.pair_mut(3, 0).unwrap();
        assert!(x.reveal() && y.reveal());
    }

    #[test]
    fn deck_apply_match_and_all_matched() {
        let pool = faces(&["a"]);
        let mut deck = Deck::build(&pool, 1, &mut StdRng::seed_from_u64(5)).unwrap();
        assert!(!deck.all_matched());
        assert!(deck.apply_match(0, 1));
        assert!(deck.all_matched());
    }

    proptest! {
        #[test]
        fn every_dealt_face_appears_twice(pair_count in 1usize..=8, seed in any::<u64>()) {
            let pool = faces(&["a", "b", "c", "d", "e", "f", "g", "h"]);
            let mut rng = StdRng::seed_from_u64(seed);
            let cards = build_deck(&pool, pair_count, &mut rng).unwrap();
            prop_assert_eq!(cards.len(), pair_count * CARDS_PER_FACE);
            let counts = face_counts(&cards);
            prop_assert_eq!(counts.len(), pair_count);
            prop_assert!(counts.values().all(|&count| count == CARDS_PER_FACE));
        }
    }
}
