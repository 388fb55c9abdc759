use std::cell::RefCell;
use std::rc::Rc;

use gettextrs::gettext;
use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;
use log::debug;

use super::app::pump;
use super::state::AppState;
use crate::game::command::Prompt;
use crate::game::leaderboard::{LEADERBOARD_CAPACITY, LeaderboardRecord};
use crate::game::session::VALID_CARD_COUNTS;

fn prompt_text(prompt: Prompt) -> (String, String) {
    match prompt {
        Prompt::PlayerName => (gettext("Player Name"), gettext("Enter your name:")),
        Prompt::CardCount => {
            let choices = VALID_CARD_COUNTS
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            (
                gettext("Number of Cards"),
                gettext("Enter the number of cards to play with ({choices}):")
                    .replace("{choices}", &choices),
            )
        }
        Prompt::DeckName => (
            gettext("Load Deck"),
            gettext(
                "Put the deck file in the assets folder, then enter its name \
(for example custom_deck.txt):",
            ),
        ),
    }
}

/// Asks the player for text and feeds the answer back into the session.
pub(super) fn show_prompt_dialog(state: &Rc<RefCell<AppState>>, prompt: Prompt) -> adw::AlertDialog {
    let (heading, body) = prompt_text(prompt);
    let dialog = adw::AlertDialog::new(Some(&heading), Some(&body));

    let entry = gtk::Entry::builder()
        .activates_default(true)
        .css_classes(vec!["prompt-entry"])
        .build();
    if prompt == Prompt::DeckName {
        entry.set_placeholder_text(Some("default_deck.txt"));
    }
    dialog.set_extra_child(Some(&entry));

    dialog.add_response("cancel", &gettext("Cancel"));
    dialog.add_response("ok", &gettext("OK"));
    dialog.set_response_appearance("ok", adw::ResponseAppearance::Suggested);
    dialog.set_default_response(Some("ok"));
    dialog.set_close_response("cancel");

    dialog.connect_response(None, {
        let state = state.clone();
        let entry = entry.clone();
        move |_, response| {
            let input = (response == "ok").then(|| entry.text().to_string());
            debug!("{prompt:?} answered with {response}");
            state.borrow_mut().session.answer(prompt, input.as_deref());
            pump(&state);
        }
    });

    let window = state.borrow().window.clone();
    dialog.present(window.as_ref());
    entry.grab_focus();
    dialog
}

pub(super) fn show_fatal_dialog(state: &Rc<RefCell<AppState>>, message: &str) -> adw::AlertDialog {
    let dialog = adw::AlertDialog::new(Some(&gettext("Cannot Start a Game")), Some(message));
    dialog.add_response("quit", &gettext("Quit"));
    dialog.set_default_response(Some("quit"));
    dialog.set_close_response("quit");
    dialog.connect_response(None, {
        let state = state.clone();
        move |_, _| {
            let app = state.borrow().app.clone();
            if let Some(app) = app {
                app.quit();
            }
        }
    });
    let window = state.borrow().window.clone();
    dialog.present(window.as_ref());
    dialog
}

pub fn show_instructions_dialog(app: &adw::Application) -> adw::AlertDialog {
    let dialog = adw::AlertDialog::new(
        Some(&gettext("Instructions")),
        Some(&gettext(
            "Click two cards to turn them over.\n\
Matching pairs leave the board; other pairs turn back.\n\
Clear the board in as few moves as you can.\n\
Load Deck switches the card faces, Quit ends the game.",
        )),
    );
    dialog.add_response("ok", &gettext("Got it"));
    dialog.set_default_response(Some("ok"));
    dialog.set_close_response("ok");
    dialog.present(app.active_window().as_ref());
    dialog
}

pub fn show_about_dialog(app: &adw::Application) -> adw::AboutDialog {
    let dialog = adw::AboutDialog::builder()
        .application_name("Concentration")
        .application_icon("io.github.memorymatch.Concentration")
        .developer_name("Concentration Developers")
        .version(env!("CARGO_PKG_VERSION"))
        .comments(gettext("A card matching memory game."))
        .build();
    dialog.add_legal_section(
        "Concentration",
        None,
        gtk::License::MitX11,
        None,
    );
    dialog.present(app.active_window().as_ref());
    dialog
}

fn table_cell(text: &str, class_name: &str, width_chars: i32) -> gtk::Label {
    let label = gtk::Label::new(Some(text));
    label.add_css_class(class_name);
    label.add_css_class("body");
    label.set_halign(gtk::Align::Fill);
    label.set_hexpand(true);
    label.set_xalign(0.5);
    label.set_width_chars(width_chars);
    label
}

fn section_title(text: &str) -> gtk::Label {
    let label = gtk::Label::new(Some(text));
    label.add_css_class("score-section-title");
    label.add_css_class("heading");
    label.set_halign(gtk::Align::Center);
    label.set_xalign(0.5);
    label
}

fn build_leaderboard_grid(records: &[LeaderboardRecord]) -> gtk::Grid {
    let grid = gtk::Grid::new();
    grid.set_halign(gtk::Align::Fill);
    grid.set_hexpand(true);
    grid.set_column_homogeneous(true);
    grid.set_column_spacing(10);
    grid.set_row_spacing(5);
    grid.attach(&table_cell("#", "score-table-head", 3), 0, 0, 1, 1);
    grid.attach(&table_cell(&gettext("Player"), "score-table-head", 12), 1, 0, 1, 1);
    grid.attach(&table_cell(&gettext("Moves"), "score-table-head", 6), 2, 0, 1, 1);

    for idx in 0..LEADERBOARD_CAPACITY {
        let row = (idx + 1) as i32;
        let (name, moves) = match records.get(idx) {
            Some(record) => (record.name.clone(), record.moves.to_string()),
            None => ("---".to_string(), "---".to_string()),
        };
        grid.attach(&table_cell(&row.to_string(), "score-table-row", 3), 0, row, 1, 1);
        grid.attach(&table_cell(&name, "score-table-row", 12), 1, row, 1, 1);
        grid.attach(&table_cell(&moves, "score-table-row", 6), 2, row, 1, 1);
    }

    grid
}

pub fn show_leaderboard_dialog(app: &adw::Application, records: &[LeaderboardRecord]) -> adw::Dialog {
    let dialog = adw::Dialog::new();
    dialog.set_can_close(true);

    let title = gtk::Label::new(Some(&gettext("Leaderboard")));
    title.add_css_class("game-title-main");
    title.set_halign(gtk::Align::Center);

    let header = adw::HeaderBar::new();
    header.set_title_widget(Some(&title));
    header.set_show_end_title_buttons(true);

    let content = gtk::Box::new(gtk::Orientation::Vertical, 8);
    content.set_margin_top(10);
    content.set_margin_bottom(10);
    content.set_margin_start(10);
    content.set_margin_end(10);
    content.add_css_class("leaderboard-dialog-content");
    content.set_halign(gtk::Align::Fill);
    content.append(&section_title(&gettext("Fewest moves")));
    content.append(&build_leaderboard_grid(records));

    let toolbar = adw::ToolbarView::new();
    toolbar.add_top_bar(&header);
    toolbar.set_content(Some(&content));

    dialog.set_child(Some(&toolbar));
    dialog.present(app.active_window().as_ref());
    dialog
}
