use gettextrs::gettext;
use libadwaita as adw;

use super::state::AppState;
use crate::game::session::Phase;

pub(super) fn update_subtitle(st: &AppState) {
    let Some(subtitle) = &st.title_subtitle else {
        return;
    };
    let session = &st.session;
    let text = match session.phase() {
        Phase::Idle | Phase::Splash => String::new(),
        Phase::AwaitingName => gettext("Who is playing?"),
        Phase::AwaitingCardCount | Phase::BoardSetup => session.player_name().to_string(),
        Phase::Won => format!("{} | {}", session.player_name(), gettext("Winner")),
        Phase::QuitMessage | Phase::EndSequence | Phase::Terminated => gettext("Thanks for playing"),
        Phase::Halted => gettext("No playable deck"),
        _ => match st.scene.status_text() {
            Some(status) => format!("{} | {status}", session.player_name()),
            None => session.player_name().to_string(),
        },
    };
    subtitle.set_text(&text);
}

pub(super) fn show_toast(st: &AppState, message: &str) {
    if let Some(overlay) = &st.toast_overlay {
        overlay.add_toast(adw::Toast::new(message));
    }
}
