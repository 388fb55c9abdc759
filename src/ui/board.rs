use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use gtk4 as gtk;
use gtk4::pango;
use gtk4::prelude::*;
use log::{debug, warn};

use super::app::pump;
use super::scene::{Scene, leaderboard_lines};
use super::state::{AppState, ImageCache};
use crate::game::layout::{
    CANVAS, CARD_HEIGHT, CARD_WIDTH, GAME_BORDER, LEADERBOARD_FIRST_ROW, LEADERBOARD_PANEL,
    LEADERBOARD_ROW_STEP, LEADERBOARD_TITLE, LOAD_BUTTON, Point, QUIT_BUTTON, Rect, STATUS_BAR,
    STATUS_TEXT,
};

pub const CONTENT_MARGIN: i32 = 12;
const TEXT_SIZE: f64 = 18.0;
const OVERLAY_FALLBACK: Rect = Rect::new(-300.0, 300.0, -200.0, 200.0);

/// Maps the fixed board coordinate system onto a widget of any size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Viewport {
    pub fn fit(width: f64, height: f64) -> Self {
        let scale = (width / CANVAS.width())
            .min(height / CANVAS.height())
            .max(f64::EPSILON);
        Viewport {
            scale,
            offset_x: (width - CANVAS.width() * scale) / 2.0,
            offset_y: (height - CANVAS.height() * scale) / 2.0,
        }
    }

    pub fn to_widget(&self, point: Point) -> (f64, f64) {
        (
            self.offset_x + (point.x - CANVAS.left) * self.scale,
            self.offset_y + (CANVAS.top - point.y) * self.scale,
        )
    }

    pub fn to_board(&self, x: f64, y: f64) -> Point {
        Point::new(
            CANVAS.left + (x - self.offset_x) / self.scale,
            CANVAS.top - (y - self.offset_y) / self.scale,
        )
    }
}

pub fn build_board_canvas(state: &Rc<RefCell<AppState>>) -> gtk::DrawingArea {
    let area = gtk::DrawingArea::builder()
        .hexpand(true)
        .vexpand(true)
        .build();
    area.add_css_class("board-canvas");

    let state_draw = state.clone();
    area.set_draw_func(move |area, cr, width, height| {
        let st = state_draw.borrow();
        let viewport = Viewport::fit(width as f64, height as f64);
        let fg = area.style_context().color();
        let ink = (fg.red() as f64, fg.green() as f64, fg.blue() as f64);
        if let Err(err) = draw_scene(cr, &viewport, &st.scene, &st.images, ink) {
            warn!("board redraw failed: {err}");
        }
    });

    let click = gtk::GestureClick::new();
    click.set_button(gtk::gdk::BUTTON_PRIMARY as u32);
    click.connect_pressed({
        let state = state.clone();
        let area_weak = area.downgrade();
        move |_, _, x, y| {
            let Some(widget) = area_weak.upgrade() else {
                return;
            };
            let viewport = Viewport::fit(widget.width() as f64, widget.height() as f64);
            let point = viewport.to_board(x, y);
            debug!("click at board ({:.0}, {:.0})", point.x, point.y);
            state.borrow_mut().session.click(point.x, point.y);
            pump(&state);
        }
    });
    area.add_controller(click);

    area
}

fn draw_scene(
    cr: &cairo::Context,
    viewport: &Viewport,
    scene: &Scene,
    images: &ImageCache,
    ink: (f64, f64, f64),
) -> Result<(), cairo::Error> {
    cr.set_antialias(cairo::Antialias::Best);

    if let Some(path) = scene.credits() {
        return draw_picture(cr, viewport, CANVAS, path, images, ink);
    }

    if scene.has_board() {
        draw_frame(cr, viewport, GAME_BORDER, ink)?;
        draw_frame(cr, viewport, STATUS_BAR, ink)?;
        draw_frame(cr, viewport, LEADERBOARD_PANEL, ink)?;

        if let Some(status) = scene.status_text() {
            draw_text(cr, viewport, STATUS_TEXT, &status, ink)?;
        }
        draw_text(cr, viewport, LEADERBOARD_TITLE, "Leaders:", ink)?;
        for (row, line) in leaderboard_lines(&scene.leaderboard).iter().enumerate() {
            let at = Point::new(
                LEADERBOARD_FIRST_ROW.x,
                LEADERBOARD_FIRST_ROW.y - row as f64 * LEADERBOARD_ROW_STEP,
            );
            draw_text(cr, viewport, at, line, ink)?;
        }

        if let Some(path) = &scene.quit_button {
            draw_picture(cr, viewport, QUIT_BUTTON, path, images, ink)?;
        }
        if let Some(path) = &scene.load_button {
            draw_picture(cr, viewport, LOAD_BUTTON, path, images, ink)?;
        }

        for card in &scene.cards {
            if !card.visible {
                continue;
            }
            let Some(path) = card.face.as_ref().or(scene.card_back.as_ref()) else {
                continue;
            };
            let bounds = Rect::new(
                card.position.x - CARD_WIDTH / 2.0,
                card.position.x + CARD_WIDTH / 2.0,
                card.position.y - CARD_HEIGHT / 2.0,
                card.position.y + CARD_HEIGHT / 2.0,
            );
            draw_picture(cr, viewport, bounds, path, images, ink)?;
        }
    }

    for (_, path) in &scene.overlays {
        let bounds = match images.get(path) {
            Some(pixbuf) => centred(pixbuf.width() as f64, pixbuf.height() as f64),
            None => OVERLAY_FALLBACK,
        };
        draw_picture(cr, viewport, bounds, path, images, ink)?;
    }
    Ok(())
}

/// Natural-size picture centred on the board origin, shrunk to fit the canvas.
fn centred(width: f64, height: f64) -> Rect {
    let shrink = (CANVAS.width() / width)
        .min(CANVAS.height() / height)
        .min(1.0);
    let (half_w, half_h) = (width * shrink / 2.0, height * shrink / 2.0);
    Rect::new(-half_w, half_w, -half_h, half_h)
}

fn widget_rect(viewport: &Viewport, rect: Rect) -> (f64, f64, f64, f64) {
    let (x, y) = viewport.to_widget(Point::new(rect.left, rect.top));
    (x, y, rect.width() * viewport.scale, rect.height() * viewport.scale)
}

fn draw_frame(
    cr: &cairo::Context,
    viewport: &Viewport,
    rect: Rect,
    ink: (f64, f64, f64),
) -> Result<(), cairo::Error> {
    let (x, y, width, height) = widget_rect(viewport, rect);
    cr.set_source_rgba(ink.0, ink.1, ink.2, 0.8);
    cr.set_line_width((2.0 * viewport.scale).max(1.0));
    cr.rectangle(x, y, width, height);
    cr.stroke()
}

fn draw_text(
    cr: &cairo::Context,
    viewport: &Viewport,
    at: Point,
    text: &str,
    ink: (f64, f64, f64),
) -> Result<(), cairo::Error> {
    let layout = pangocairo::functions::create_layout(cr);
    let mut font_desc = pango::FontDescription::new();
    font_desc.set_family("Cantarell, Noto Sans, sans");
    font_desc.set_weight(pango::Weight::Bold);
    font_desc.set_size((TEXT_SIZE * viewport.scale * pango::SCALE as f64) as i32);
    layout.set_font_description(Some(&font_desc));
    layout.set_text(text);

    let (x, y) = viewport.to_widget(at);
    let (_, text_height) = layout.pixel_size();
    cr.set_source_rgba(ink.0, ink.1, ink.2, 1.0);
    cr.move_to(x, y - text_height as f64 / 2.0);
    pangocairo::functions::show_layout(cr, &layout);
    Ok(())
}

fn draw_picture(
    cr: &cairo::Context,
    viewport: &Viewport,
    rect: Rect,
    path: &Path,
    images: &ImageCache,
    ink: (f64, f64, f64),
) -> Result<(), cairo::Error> {
    let (x, y, width, height) = widget_rect(viewport, rect);
    let Some(pixbuf) = images.get(path) else {
        // Missing artwork still gets a labelled box so the board stays usable.
        draw_frame(cr, viewport, rect, ink)?;
        let label = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let centre = Point::new(
            (rect.left + rect.right) / 2.0 - rect.width() / 3.0,
            (rect.top + rect.bottom) / 2.0,
        );
        return draw_text(cr, viewport, centre, &label, ink);
    };

    cr.save()?;
    cr.translate(x, y);
    cr.scale(
        width / pixbuf.width().max(1) as f64,
        height / pixbuf.height().max(1) as f64,
    );
    cr.set_source_pixbuf(&pixbuf, 0.0, 0.0);
    cr.paint()?;
    cr.restore()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::layout;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn board_corners_map_to_widget_corners() {
        let viewport = Viewport::fit(CANVAS.width(), CANVAS.height());
        assert!(close(viewport.scale, 1.0));
        let (x, y) = viewport.to_widget(Point::new(CANVAS.left, CANVAS.top));
        assert!(close(x, 0.0) && close(y, 0.0));
        let (x, y) = viewport.to_widget(Point::new(CANVAS.right, CANVAS.bottom));
        assert!(close(x, CANVAS.width()) && close(y, CANVAS.height()));
    }

    #[test]
    fn wide_widgets_are_letterboxed() {
        let viewport = Viewport::fit(CANVAS.width() * 3.0, CANVAS.height());
        assert!(close(viewport.scale, 1.0));
        assert!(close(viewport.offset_x, CANVAS.width()));
        assert!(close(viewport.offset_y, 0.0));
    }

    #[test]
    fn widget_clicks_map_back_to_board() {
        let viewport = Viewport::fit(540.0, 395.0);
        let card = layout::card_position(5);
        let (x, y) = viewport.to_widget(card);
        let back = viewport.to_board(x, y);
        assert!(close(back.x, card.x) && close(back.y, card.y));
        assert_eq!(
            layout::hit_test(back, 8, |_| true),
            layout::Hit::Card(5)
        );
    }

    #[test]
    fn degenerate_sizes_do_not_divide_by_zero() {
        let viewport = Viewport::fit(0.0, 0.0);
        let point = viewport.to_board(10.0, 10.0);
        assert!(point.x.is_finite() && point.y.is_finite());
    }

    #[test]
    fn large_overlays_shrink_to_the_canvas() {
        let rect = centred(CANVAS.width() * 2.0, CANVAS.height());
        assert!(close(rect.width(), CANVAS.width()));
        assert!(close(rect.left, -rect.right));
        let small = centred(200.0, 100.0);
        assert!(close(small.width(), 200.0) && close(small.height(), 100.0));
    }
}
