//! Board geometry in board units: origin at the centre, y grows upwards.

pub const COLUMNS: usize = 4;
pub const CARD_WIDTH: f64 = 100.0;
pub const CARD_HEIGHT: f64 = 150.0;
pub const CARD_SPACING: f64 = 50.0;
pub const FIRST_CARD: Point = Point::new(-550.0, 300.0);

pub const QUIT_BUTTON: Rect = Rect::new(250.0, 350.0, -320.0, -220.0);
pub const LOAD_BUTTON: Rect = Rect::new(120.0, 220.0, -320.0, -220.0);
pub const QUIT_BUTTON_CENTER: Point = Point::new(275.0, -290.0);
pub const LOAD_BUTTON_CENTER: Point = Point::new(160.0, -290.0);

pub const GAME_BORDER: Rect = Rect::new(-675.0, 25.0, -200.0, 400.0);
pub const STATUS_BAR: Rect = Rect::new(-675.0, 25.0, -350.0, -250.0);
pub const STATUS_TEXT: Point = Point::new(-650.0, -300.0);
pub const LEADERBOARD_PANEL: Rect = Rect::new(100.0, 350.0, -200.0, 400.0);
pub const LEADERBOARD_TITLE: Point = Point::new(120.0, 350.0);
pub const LEADERBOARD_FIRST_ROW: Point = Point::new(120.0, 300.0);
pub const LEADERBOARD_ROW_STEP: f64 = 30.0;

/// Everything the presentation draws fits inside this rectangle.
pub const CANVAS: Rect = Rect::new(-700.0, 380.0, -370.0, 420.0);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

impl Rect {
    pub const fn new(left: f64, right: f64, bottom: f64, top: f64) -> Self {
        Rect {
            left,
            right,
            bottom,
            top,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// Strict containment; the edges themselves are outside.
    pub fn contains(&self, point: Point) -> bool {
        self.left < point.x && point.x < self.right && self.bottom < point.y && point.y < self.top
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
    Card(usize),
    Quit,
    LoadDeck,
    Nothing,
}

pub fn card_position(index: usize) -> Point {
    let row = (index / COLUMNS) as f64;
    let col = (index % COLUMNS) as f64;
    Point::new(
        FIRST_CARD.x + col * (CARD_WIDTH + CARD_SPACING),
        FIRST_CARD.y - row * (CARD_HEIGHT + CARD_SPACING),
    )
}

pub fn card_positions(card_count: usize) -> Vec<Point> {
    (0..card_count).map(card_position).collect()
}

pub fn card_bounds(index: usize) -> Rect {
    let center = card_position(index);
    Rect::new(
        center.x - CARD_WIDTH / 2.0,
        center.x + CARD_WIDTH / 2.0,
        center.y - CARD_HEIGHT / 2.0,
        center.y + CARD_HEIGHT / 2.0,
    )
}

/// Buttons first, then the first card (in deck order) accepted by `in_play`.
pub fn hit_test(point: Point, card_count: usize, in_play: impl Fn(usize) -> bool) -> Hit {
    if QUIT_BUTTON.contains(point) {
        return Hit::Quit;
    }
    if LOAD_BUTTON.contains(point) {
        return Hit::LoadDeck;
    }
    (0..card_count)
        .find(|&index| in_play(index) && card_bounds(index).contains(point))
        .map_or(Hit::Nothing, Hit::Card)
}
