use std::time::Duration;

use log::{debug, error, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::card::Card;
use super::command::{
    CARD_BACK_IMAGE, Command, Deferred, Image, LOAD_BUTTON_IMAGE, Prompt, QUIT_BUTTON_IMAGE, Timer,
};
use super::deck::{CARDS_PER_FACE, Deck};
use super::deck_source::{DEFAULT_DECK, DeckSource};
use super::error::DeckError;
use super::layout::{self, Hit, Point};
use super::leaderboard::Leaderboard;
use crate::config::{Settings, Timings};

pub const VALID_CARD_COUNTS: [usize; 3] = [8, 10, 12];
pub const DEFAULT_CARD_COUNT: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Match,
    Mismatch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Splash,
    AwaitingName,
    AwaitingCardCount,
    BoardSetup,
    AwaitingFirstSelection,
    AwaitingSecondSelection,
    Resolving(Resolution),
    Won,
    QuitMessage,
    EndSequence,
    Terminated,
    /// The default deck is unusable; nothing can be played.
    Halted,
}

impl Phase {
    pub fn is_in_play(self) -> bool {
        matches!(
            self,
            Phase::AwaitingFirstSelection | Phase::AwaitingSecondSelection | Phase::Resolving(_)
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardCountChoice {
    Valid(usize),
    Snapped { requested: i64, count: usize },
    Default,
}

impl CardCountChoice {
    pub fn count(self) -> usize {
        match self {
            CardCountChoice::Valid(count) | CardCountChoice::Snapped { count, .. } => count,
            CardCountChoice::Default => DEFAULT_CARD_COUNT,
        }
    }
}

/// Closest valid count; on a tie the smaller count wins.
pub fn nearest_card_count(requested: i64) -> usize {
    VALID_CARD_COUNTS
        .iter()
        .copied()
        .min_by_key(|&count| (count as i64).abs_diff(requested))
        .unwrap_or(DEFAULT_CARD_COUNT)
}

fn is_integer_literal(raw: &str) -> bool {
    let digits = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit())
}

pub fn parse_card_count(input: Option<&str>) -> CardCountChoice {
    let Some(raw) = input.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return CardCountChoice::Default;
    };
    let requested = match raw.parse::<i64>() {
        Ok(requested) => requested,
        Err(_) if is_integer_literal(raw) => {
            // Out of range for i64; only the sign matters for snapping.
            if raw.starts_with('-') {
                i64::MIN
            } else {
                i64::MAX
            }
        }
        Err(_) => return CardCountChoice::Default,
    };
    match usize::try_from(requested) {
        Ok(count) if VALID_CARD_COUNTS.contains(&count) => CardCountChoice::Valid(count),
        _ => CardCountChoice::Snapped {
            requested,
            count: nearest_card_count(requested),
        },
    }
}

/// One play-through, from the splash screen to exit.
pub struct Session {
    source: DeckSource,
    leaderboard: Leaderboard,
    timings: Timings,
    rng: StdRng,
    phase: Phase,
    prompt: Option<Prompt>,
    player_name: String,
    card_count: usize,
    current_deck: String,
    deck: Deck,
    selected: Vec<usize>,
    guesses: u32,
    matches: u32,
    generation: u64,
    commands: Vec<Command>,
}

impl Session {
    pub fn new(source: DeckSource, leaderboard: Leaderboard, timings: Timings) -> Self {
        Self::with_rng(source, leaderboard, timings, StdRng::from_os_rng())
    }

    pub fn with_seed(
        source: DeckSource,
        leaderboard: Leaderboard,
        timings: Timings,
        seed: u64,
    ) -> Self {
        Self::with_rng(source, leaderboard, timings, StdRng::seed_from_u64(seed))
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            DeckSource::new(&settings.assets_dir),
            Leaderboard::new(settings.leaderboard_path()),
            settings.timings,
        )
    }

    fn with_rng(source: DeckSource, leaderboard: Leaderboard, timings: Timings, rng: StdRng) -> Self {
        Session {
            source,
            leaderboard,
            timings,
            rng,
            phase: Phase::Idle,
            prompt: None,
            player_name: String::new(),
            card_count: DEFAULT_CARD_COUNT,
            current_deck: DEFAULT_DECK.to_string(),
            deck: Deck::default(),
            selected: Vec::with_capacity(CARDS_PER_FACE),
            guesses: 0,
            matches: 0,
            generation: 0,
            commands: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pending_prompt(&self) -> Option<Prompt> {
        self.prompt
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn card_count(&self) -> usize {
        self.card_count
    }

    pub fn current_deck(&self) -> &str {
        &self.current_deck
    }

    pub fn cards(&self) -> &[Card] {
        self.deck.cards()
    }

    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    pub fn guesses(&self) -> u32 {
        self.guesses
    }

    pub fn matches(&self) -> u32 {
        self.matches
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    /// Commands queued since the last drain, oldest first.
    pub fn drain_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    fn emit(&mut self, command: Command) {
        self.commands.push(command);
    }

    fn schedule(&mut self, delay: Duration, timer: Timer) {
        let deferred = Deferred {
            generation: self.generation,
            timer,
        };
        self.emit(Command::Schedule { delay, deferred });
    }

    fn ask(&mut self, prompt: Prompt) {
        self.prompt = Some(prompt);
        self.emit(Command::Prompt(prompt));
    }

    fn show_image(&mut self, image: Image) {
        let path = self.source.image_path(image.file_name());
        self.emit(Command::ShowImage { image, path });
    }

    pub fn start(&mut self) {
        if self.phase != Phase::Idle {
            return;
        }
        self.phase = Phase::Splash;
        self.show_image(Image::Splash);
        self.schedule(self.timings.splash(), Timer::SplashElapsed);
    }

    /// Feeds back the answer to an outstanding prompt; `None` means cancelled.
    pub fn answer(&mut self, prompt: Prompt, input: Option<&str>) {
        if self.prompt != Some(prompt) {
            debug!("ignoring answer to {prompt:?}, it is not outstanding");
            return;
        }
        self.prompt = None;
        match prompt {
            Prompt::PlayerName => self.submit_name(input),
            Prompt::CardCount => self.submit_card_count(input),
            Prompt::DeckName => self.submit_deck(input),
        }
    }

    fn submit_name(&mut self, input: Option<&str>) {
        if self.phase != Phase::AwaitingName {
            return;
        }
        match input.map(str::trim) {
            Some(name) if !name.is_empty() => {
                info!("player {name} joined");
                self.player_name = name.to_string();
                self.phase = Phase::AwaitingCardCount;
                self.ask(Prompt::CardCount);
            }
            Some(_) => {
                warn!("a player name is required");
                self.ask(Prompt::PlayerName);
            }
            None => {
                info!("name prompt cancelled, no game started");
                self.terminate();
            }
        }
    }

    fn submit_card_count(&mut self, input: Option<&str>) {
        if self.phase != Phase::AwaitingCardCount {
            return;
        }
        let choice = parse_card_count(input);
        self.card_count = choice.count();
        self.phase = Phase::BoardSetup;
        if let CardCountChoice::Snapped { requested, count } = choice {
            warn!("{requested} is not a valid card count, using {count}");
            self.show_image(Image::CardWarning);
            self.schedule(self.timings.warning(), Timer::WarningElapsed);
        } else {
            self.setup_board();
        }
    }

    fn submit_deck(&mut self, input: Option<&str>) {
        if !self.phase.is_in_play() {
            debug!("deck answer arrived after play ended");
            return;
        }
        match input.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) if self.source.exists(name) => {
                info!("switching to deck {name}");
                self.current_deck = name.to_string();
            }
            Some(name) => {
                warn!(
                    "deck {name} not found in {}, using {DEFAULT_DECK}",
                    self.source.assets_dir().display()
                );
                self.current_deck = DEFAULT_DECK.to_string();
            }
            None => {
                info!("deck prompt cancelled, using {DEFAULT_DECK}");
                self.current_deck = DEFAULT_DECK.to_string();
            }
        }
        self.setup_board();
    }

    fn deal(&mut self) -> Result<Deck, DeckError> {
        let pair_count = self.card_count / CARDS_PER_FACE;
        let resolved = self.source.resolve(&self.current_deck)?;
        self.current_deck = resolved.name;
        match Deck::build(&resolved.faces, pair_count, &mut self.rng) {
            Ok(deck) => Ok(deck),
            Err(err) if self.current_deck != DEFAULT_DECK => {
                warn!("{err} in {}, using {DEFAULT_DECK}", self.current_deck);
                self.current_deck = DEFAULT_DECK.to_string();
                let fallback = self.source.resolve(DEFAULT_DECK)?;
                Deck::build(&fallback.faces, pair_count, &mut self.rng)
            }
            Err(err) => Err(err),
        }
    }

    /// Deals a fresh board. Also serves as the reload after a deck change.
    fn setup_board(&mut self) {
        self.phase = Phase::BoardSetup;
        self.generation = self.generation.wrapping_add(1);
        self.guesses = 0;
        self.matches = 0;
        self.selected.clear();
        self.deck = Deck::default();

        let deck = match self.deal() {
            Ok(deck) => deck,
            Err(err) => {
                error!("cannot start a game: {err}");
                self.phase = Phase::Halted;
                self.emit(Command::Fatal(err.to_string()));
                return;
            }
        };
        self.deck = deck;

        let card_back = self.source.image_path(CARD_BACK_IMAGE);
        let quit_button = self.source.image_path(QUIT_BUTTON_IMAGE);
        let load_button = self.source.image_path(LOAD_BUTTON_IMAGE);
        self.emit(Command::LayoutBoard {
            card_back,
            quit_button,
            load_button,
            positions: layout::card_positions(self.deck.len()),
        });
        self.emit_status();
        let ranking = self.leaderboard.top_n();
        self.emit(Command::ShowLeaderboard(ranking));
        self.phase = Phase::AwaitingFirstSelection;
        info!(
            "dealt {} cards from {} (generation {})",
            self.deck.len(),
            self.current_deck,
            self.generation
        );
    }

    fn emit_status(&mut self) {
        self.emit(Command::UpdateStatus {
            guesses: self.guesses,
            matches: self.matches,
        });
    }

    /// Click in board coordinates.
    pub fn click(&mut self, x: f64, y: f64) {
        if !self.phase.is_in_play() {
            return;
        }
        let deck = &self.deck;
        let hit = layout::hit_test(Point::new(x, y), deck.len(), |index| {
            deck.get(index).is_some_and(Card::is_in_play)
        });
        match hit {
            Hit::Card(index) => {
                self.select(index);
            }
            Hit::Quit => {
                self.quit();
            }
            Hit::LoadDeck => {
                self.request_deck_change();
            }
            Hit::Nothing => {}
        }
    }

    /// Turns a card face up. Returns false when the click is a no-op.
    pub fn select(&mut self, index: usize) -> bool {
        if !matches!(
            self.phase,
            Phase::AwaitingFirstSelection | Phase::AwaitingSecondSelection
        ) {
            return false;
        }
        if self.selected.len() >= CARDS_PER_FACE || self.selected.contains(&index) {
            return false;
        }
        let Some(card) = self.deck.get_mut(index) else {
            return false;
        };
        if !card.reveal() {
            return false;
        }
        let image = self.source.image_path(&card.face);
        self.emit(Command::ShowCardFace { index, image });
        self.selected.push(index);

        if self.selected.len() < CARDS_PER_FACE {
            self.phase = Phase::AwaitingSecondSelection;
        } else {
            self.evaluate_pair();
        }
        true
    }

    fn evaluate_pair(&mut self) {
        let (first, second) = (self.selected[0], self.selected[1]);
        self.guesses = self.guesses.saturating_add(1);
        // Counters move now; the board catches up when the timers fire.
        if self.deck.apply_match(first, second) {
            self.matches = self.matches.saturating_add(1);
            self.phase = Phase::Resolving(Resolution::Match);
            self.schedule(self.timings.flip(), Timer::ResolveMatch);
            self.schedule(self.timings.win_check(), Timer::CheckWin);
        } else {
            self.phase = Phase::Resolving(Resolution::Mismatch);
            self.schedule(self.timings.flip(), Timer::ResolveMismatch);
        }
        debug!(
            "pair {first}/{second}: {} moves, {} matches",
            self.guesses, self.matches
        );
        self.emit_status();
    }

    pub fn fire(&mut self, deferred: Deferred) {
        if deferred.generation != self.generation {
            debug!(
                "dropping stale {:?} from generation {}",
                deferred.timer, deferred.generation
            );
            return;
        }
        match deferred.timer {
            Timer::SplashElapsed => {
                if self.phase == Phase::Splash {
                    self.emit(Command::HideImage(Image::Splash));
                    self.phase = Phase::AwaitingName;
                    self.ask(Prompt::PlayerName);
                }
            }
            Timer::WarningElapsed => {
                if self.phase == Phase::BoardSetup {
                    self.emit(Command::HideImage(Image::CardWarning));
                    self.setup_board();
                }
            }
            Timer::ResolveMatch => {
                // A win check from an earlier pair can land first; the last pair still leaves.
                if matches!(
                    self.phase,
                    Phase::Resolving(Resolution::Match) | Phase::Won
                ) {
                    for index in std::mem::take(&mut self.selected) {
                        if let Some(card) = self.deck.get_mut(index) {
                            card.remove();
                        }
                        self.emit(Command::HideCard { index });
                    }
                    if self.phase.is_in_play() {
                        self.phase = Phase::AwaitingFirstSelection;
                    }
                }
            }
            Timer::ResolveMismatch => {
                if self.phase == Phase::Resolving(Resolution::Mismatch) {
                    for index in std::mem::take(&mut self.selected) {
                        if let Some(card) = self.deck.get_mut(index) {
                            card.conceal();
                        }
                        self.emit(Command::ShowCardBack { index });
                    }
                    self.phase = Phase::AwaitingFirstSelection;
                }
            }
            Timer::CheckWin => self.check_win(),
            Timer::BeginEndSequence => {
                if matches!(self.phase, Phase::Won | Phase::QuitMessage) {
                    self.begin_end_sequence();
                }
            }
            Timer::Terminate => {
                if self.phase == Phase::EndSequence {
                    self.terminate();
                }
            }
        }
    }

    fn check_win(&mut self) {
        if self.phase.is_in_play() && self.deck.all_matched() {
            self.win();
        }
    }

    fn win(&mut self) {
        self.phase = Phase::Won;
        info!("{} won in {} moves", self.player_name, self.guesses);
        let ranking = match self.leaderboard.record(&self.player_name, self.guesses) {
            Ok(ranking) => ranking,
            Err(err) => {
                error!("score not saved: {err}");
                self.leaderboard.top_n()
            }
        };
        self.emit(Command::ShowLeaderboard(ranking));
        self.show_image(Image::Winner);
        self.schedule(self.timings.winner(), Timer::BeginEndSequence);
    }

    /// The quit control. Returns false outside of play.
    pub fn quit(&mut self) -> bool {
        if !self.phase.is_in_play() {
            return false;
        }
        info!("{} quit after {} moves", self.player_name, self.guesses);
        self.generation = self.generation.wrapping_add(1);
        self.prompt = None;
        self.selected.clear();
        self.phase = Phase::QuitMessage;
        self.show_image(Image::QuitMessage);
        self.schedule(self.timings.quit_message(), Timer::BeginEndSequence);
        true
    }

    /// The load-deck control. Returns false when no prompt was opened.
    pub fn request_deck_change(&mut self) -> bool {
        if !self.phase.is_in_play() || self.prompt.is_some() {
            return false;
        }
        self.ask(Prompt::DeckName);
        true
    }

    fn begin_end_sequence(&mut self) {
        self.phase = Phase::EndSequence;
        self.emit(Command::EnterFullscreen);
        self.show_image(Image::EndCredits);
        self.schedule(self.timings.end_credits(), Timer::Terminate);
    }

    fn terminate(&mut self) {
        self.phase = Phase::Terminated;
        self.prompt = None;
        self.emit(Command::Exit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_counts_pass_through() {
        for count in VALID_CARD_COUNTS {
            let text = count.to_string();
            assert_eq!(parse_card_count(Some(&text)), CardCountChoice::Valid(count));
        }
        assert_eq!(parse_card_count(Some(" 10 ")).count(), 10);
    }

    #[test]
    fn invalid_counts_snap_to_nearest() {
        assert_eq!(
            parse_card_count(Some("7")),
            CardCountChoice::Snapped {
                requested: 7,
                count: 8
            }
        );
        assert_eq!(parse_card_count(Some("13")).count(), 12);
        assert_eq!(parse_card_count(Some("100")).count(), 12);
        assert_eq!(parse_card_count(Some("-4")).count(), 8);
        assert_eq!(parse_card_count(Some("0")).count(), 8);
        assert_eq!(
            parse_card_count(Some("99999999999999999999")),
            CardCountChoice::Snapped {
                requested: i64::MAX,
                count: 12
            }
        );
        assert_eq!(
            parse_card_count(Some("-99999999999999999999")),
            CardCountChoice::Snapped {
                requested: i64::MIN,
                count: 8
            }
        );
    }

    #[test]
    fn ties_prefer_the_smaller_count() {
        assert_eq!(nearest_card_count(9), 8);
        assert_eq!(nearest_card_count(11), 10);
    }

    #[test]
    fn non_numeric_or_missing_input_uses_default() {
        assert_eq!(parse_card_count(Some("twelve")), CardCountChoice::Default);
        assert_eq!(parse_card_count(Some("")), CardCountChoice::Default);
        assert_eq!(parse_card_count(Some("8.5")), CardCountChoice::Default);
        assert_eq!(parse_card_count(Some("-")), CardCountChoice::Default);
        assert_eq!(parse_card_count(None).count(), DEFAULT_CARD_COUNT);
    }

    #[test]
    fn only_board_phases_are_in_play() {
        assert!(Phase::AwaitingFirstSelection.is_in_play());
        assert!(Phase::Resolving(Resolution::Mismatch).is_in_play());
        assert!(!Phase::Won.is_in_play());
        assert!(!Phase::AwaitingName.is_in_play());
        assert!(!Phase::Halted.is_in_play());
    }
}
