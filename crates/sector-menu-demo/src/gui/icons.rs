use gdk_pixbuf::Pixbuf;
use gtk::prelude::*;
use gtk4 as gtk;
use sector_menu::{IconRef, Menu};
use std::path::{Path, PathBuf};

pub const ICON_SIZE: i32 = 128;

#[derive(Default)]
pub struct IconCache {
    pub center: Option<Pixbuf>,
    pub wedges: Vec<Option<Pixbuf>>,
}

impl IconCache {
    pub fn load(menu: &Menu) -> Self {
        Self {
            center: menu.config().center_button_icon.as_ref().and_then(load_icon),
            wedges: menu
                .sectors()
                .iter()
                .map(|s| s.icon.as_ref().and_then(load_icon))
                .collect(),
        }
    }

    pub fn wedge(&self, index: usize) -> Option<&Pixbuf> {
        self.wedges.get(index).and_then(Option::as_ref)
    }
}

/// Treats the icon as a file path first, then as a name in the current icon theme.
fn load_icon(icon: &IconRef) -> Option<Pixbuf> {
    let path = Path::new(icon.as_str());
    let file = if path.is_absolute() && path.exists() {
        Some(path.to_path_buf())
    } else {
        theme_icon_path(icon)
    };

    let file = file?;
    match Pixbuf::from_file_at_scale(&file, ICON_SIZE, ICON_SIZE, true) {
        Ok(pixbuf) => Some(pixbuf),
        Err(e) => {
            log::warn!("Failed to load icon '{}': {}", icon, e);
            None
        }
    }
}

fn theme_icon_path(icon: &IconRef) -> Option<PathBuf> {
    let display = gtk::gdk::Display::default()?;
    let theme = gtk::IconTheme::for_display(&display);
    if !theme.has_icon(icon.as_str()) {
        log::debug!("Icon '{}' not found in theme", icon);
        return None;
    }
    theme
        .lookup_icon(
            icon.as_str(),
            &[],
            ICON_SIZE,
            1,
            gtk::TextDirection::None,
            gtk::IconLookupFlags::empty(),
        )
        .file()
        .and_then(|f| f.path())
}
