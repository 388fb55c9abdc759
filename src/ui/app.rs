use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;

use gettextrs::gettext;
use gio::SimpleAction;
use gtk4 as gtk;
use gtk4::glib;
use gtk4::prelude::*;
use libadwaita as adw;
use adw::prelude::*;
use log::{error, info};

use super::board::{CONTENT_MARGIN, build_board_canvas};
use super::dialogs::{
    show_about_dialog, show_fatal_dialog, show_instructions_dialog, show_leaderboard_dialog,
    show_prompt_dialog,
};
use super::hud::{show_toast, update_subtitle};
use super::state::AppState;
use crate::config::Settings;
use crate::game::command::{Command, Image};
use crate::game::session::Session;

const APP_ID: &str = "io.github.memorymatch.Concentration";
const RESOURCE_PREFIX: &str = "/io/github/memorymatch/Concentration";

/// Drains the session outbox and carries every command out, in order.
pub(super) fn pump(state: &Rc<RefCell<AppState>>) {
    loop {
        let commands = state.borrow_mut().session.drain_commands();
        if commands.is_empty() {
            break;
        }
        for command in commands {
            apply_command(state, command);
        }
    }
    let st = state.borrow();
    update_subtitle(&st);
}

fn apply_command(state: &Rc<RefCell<AppState>>, command: Command) {
    match command {
        Command::Schedule { delay, deferred } => {
            let state = state.clone();
            glib::timeout_add_local_once(delay, move || {
                state.borrow_mut().session.fire(deferred);
                pump(&state);
            });
        }
        Command::Prompt(prompt) => {
            show_prompt_dialog(state, prompt);
        }
        Command::Fatal(message) => {
            error!("{message}");
            show_fatal_dialog(state, &message);
        }
        Command::EnterFullscreen => {
            let st = state.borrow();
            if let Some(window) = &st.window {
                window.fullscreen();
            }
            if let Some(canvas) = &st.canvas {
                canvas.add_css_class("credits");
            }
        }
        Command::Exit => {
            info!("session over");
            let app = state.borrow().app.clone();
            if let Some(app) = app {
                app.quit();
            }
        }
        command => {
            let mut st = state.borrow_mut();
            if let Command::LayoutBoard { .. } = &command {
                let message = gettext("Playing with {deck}")
                    .replace("{deck}", st.session.current_deck());
                show_toast(&st, &message);
            }
            if let Command::ShowImage {
                image: Image::CardWarning,
                ..
            } = &command
            {
                let message = gettext("Using {count} cards")
                    .replace("{count}", &st.session.card_count().to_string());
                show_toast(&st, &message);
            }
            if st.scene.apply(&command)
                && let Some(canvas) = &st.canvas
            {
                canvas.queue_draw();
            }
        }
    }
}

pub fn run() -> glib::ExitCode {
    glib::set_prgname(Some(APP_ID));
    let app = adw::Application::builder().application_id(APP_ID).build();

    app.connect_activate(move |app| {
        // A second activation only raises the existing window.
        if let Some(window) = app.active_window() {
            window.present();
            return;
        }
        load_css();

        let settings = Settings::load();
        info!("assets from {}", settings.assets_dir.display());
        let state = Rc::new(RefCell::new(AppState::new(Session::from_settings(
            &settings,
        ))));

        let load_deck_action = SimpleAction::new("load-deck", None);
        load_deck_action.connect_activate({
            let state = state.clone();
            move |_, _| {
                state.borrow_mut().session.request_deck_change();
                pump(&state);
            }
        });
        app.add_action(&load_deck_action);

        let leaderboard_action = SimpleAction::new("leaderboard", None);
        leaderboard_action.connect_activate({
            let app = app.clone();
            let state = state.clone();
            move |_, _| {
                let records = state.borrow().session.leaderboard().top_n();
                show_leaderboard_dialog(&app, &records);
            }
        });
        app.add_action(&leaderboard_action);

        let instructions_action = SimpleAction::new("instructions", None);
        instructions_action.connect_activate({
            let app = app.clone();
            move |_, _| {
                show_instructions_dialog(&app);
            }
        });
        app.add_action(&instructions_action);

        let about_action = SimpleAction::new("about", None);
        about_action.connect_activate({
            let app = app.clone();
            move |_, _| {
                show_about_dialog(&app);
            }
        });
        app.add_action(&about_action);

        let quit_action = SimpleAction::new("quit", None);
        quit_action.connect_activate({
            let app = app.clone();
            let state = state.clone();
            move |_, _| {
                // In play, quitting runs the farewell sequence first.
                let quitting = state.borrow_mut().session.quit();
                if quitting {
                    pump(&state);
                } else {
                    app.quit();
                }
            }
        });
        app.add_action(&quit_action);

        app.set_accels_for_action("app.load-deck", &["<Control>o"]);
        app.set_accels_for_action("app.quit", &["<Control>q"]);

        let title_box = gtk::Box::new(gtk::Orientation::Vertical, 0);
        title_box.set_valign(gtk::Align::Center);
        title_box.set_halign(gtk::Align::Center);
        title_box.set_hexpand(true);

        let title_main = gtk::Label::builder()
            .label("Concentration")
            .halign(gtk::Align::Center)
            .css_classes(vec!["game-title-main"])
            .build();

        let title_subtitle = gtk::Label::builder()
            .label("")
            .halign(gtk::Align::Center)
            .css_classes(vec!["game-title-subtitle", "caption"])
            .build();

        title_box.append(&title_main);
        title_box.append(&title_subtitle);

        let header = adw::HeaderBar::builder().title_widget(&title_box).build();
        header.add_css_class("flat");

        let menu_model = gio::Menu::new();
        menu_model.append(Some(&gettext("Load Deck")), Some("app.load-deck"));
        menu_model.append(Some(&gettext("Leaderboard")), Some("app.leaderboard"));
        menu_model.append(Some(&gettext("Instructions")), Some("app.instructions"));
        menu_model.append(Some(&gettext("About Concentration")), Some("app.about"));
        menu_model.append(Some(&gettext("Quit")), Some("app.quit"));
        let menu_button = gtk::MenuButton::builder()
            .icon_name("open-menu-symbolic")
            .menu_model(&menu_model)
            .build();
        header.pack_end(&menu_button);

        let canvas = build_board_canvas(&state);
        canvas.set_margin_top(CONTENT_MARGIN);
        canvas.set_margin_bottom(CONTENT_MARGIN);
        canvas.set_margin_start(CONTENT_MARGIN);
        canvas.set_margin_end(CONTENT_MARGIN);

        let toast_overlay = adw::ToastOverlay::new();
        toast_overlay.set_child(Some(&canvas));

        let toolbar = adw::ToolbarView::new();
        toolbar.set_hexpand(true);
        toolbar.set_vexpand(true);
        toolbar.add_top_bar(&header);
        toolbar.set_content(Some(&toast_overlay));

        let win = adw::ApplicationWindow::builder()
            .application(app)
            .title("Concentration")
            .icon_name(APP_ID)
            .default_width(1080)
            .default_height(640)
            .content(&toolbar)
            .build();
        win.set_size_request(540, 360);
        win.add_css_class("app-window");

        {
            let mut st = state.borrow_mut();
            st.app = Some(app.clone());
            st.window = Some(win.clone());
            st.toast_overlay = Some(toast_overlay);
            st.canvas = Some(canvas);
            st.title_subtitle = Some(title_subtitle);
        }

        win.present();
        state.borrow_mut().session.start();
        pump(&state);
    });

    app.run()
}

fn load_css() {
    static RESOURCES_INIT: Once = Once::new();
    RESOURCES_INIT.call_once(|| {
        if let Err(err) = gio::resources_register_include!("concentration.gresource") {
            error!("embedded resources unavailable: {err}");
        }
    });

    let Some(display) = gtk::gdk::Display::default() else {
        return;
    };

    let provider = gtk::CssProvider::new();
    provider.load_from_resource(&format!("{RESOURCE_PREFIX}/style.css"));
    gtk::style_context_add_provider_for_display(
        &display,
        &provider,
        gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}
