use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use gtk4 as gtk;
use gtk4::gdk_pixbuf::Pixbuf;
use libadwaita as adw;
use log::warn;

use super::scene::Scene;
use crate::game::session::Session;

/// Decoded pictures keyed by path. Failed loads are remembered as `None`.
#[derive(Default)]
pub struct ImageCache {
    entries: RefCell<HashMap<PathBuf, Option<Pixbuf>>>,
}

impl ImageCache {
    pub fn get(&self, path: &Path) -> Option<Pixbuf> {
        let mut entries = self.entries.borrow_mut();
        entries
            .entry(path.to_path_buf())
            .or_insert_with(|| match Pixbuf::from_file(path) {
                Ok(pixbuf) => Some(pixbuf),
                Err(err) => {
                    warn!("cannot load {}: {err}", path.display());
                    None
                }
            })
            .clone()
    }
}

pub struct AppState {
    pub app: Option<adw::Application>,
    pub window: Option<adw::ApplicationWindow>,
    pub toast_overlay: Option<adw::ToastOverlay>,
    pub canvas: Option<gtk::DrawingArea>,
    pub title_subtitle: Option<gtk::Label>,

    pub session: Session,
    pub scene: Scene,
    pub images: ImageCache,
}

impl AppState {
    pub fn new(session: Session) -> Self {
        AppState {
            app: None,
            window: None,
            toast_overlay: None,
            canvas: None,
            title_subtitle: None,
            session,
            scene: Scene::default(),
            images: ImageCache::default(),
        }
    }
}
