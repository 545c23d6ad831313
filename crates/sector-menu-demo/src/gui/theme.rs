use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use palette::Srgba;

pub struct ThemeColors {
    pub label: Srgba<f64>,
    pub glyph: Srgba<f64>,
}

impl ThemeColors {
    pub fn from_context(context: &gtk::StyleContext) -> Self {
        Self {
            label: Self::lookup_color(
                context,
                "theme_selected_fg_color",
                Srgba::new(1.0, 1.0, 1.0, 1.0),
            ),
            glyph: Self::lookup_color(
                context,
                "theme_unfocused_fg_color",
                Srgba::new(0.33, 0.33, 0.33, 1.0),
            ),
        }
    }

    fn lookup_color(context: &gtk::StyleContext, name: &str, fallback: Srgba<f64>) -> Srgba<f64> {
        context
            .lookup_color(name)
            .map(|c| {
                Srgba::new(
                    c.red() as f64,
                    c.green() as f64,
                    c.blue() as f64,
                    c.alpha() as f64,
                )
            })
            .unwrap_or(fallback)
    }
}

const CSS: &str = "
.sector-menu-window {
    background-color: transparent;
}

.sector-menu-area {
    background: none;
    min-width: 120px;
    min-height: 120px;
}
";

pub fn load_css() {
    let Some(display) = gdk::Display::default() else {
        log::warn!("No display, skipping CSS");
        return;
    };

    let provider = gtk::CssProvider::new();
    provider.load_from_data(CSS);
    gtk::style_context_add_provider_for_display(
        &display,
        &provider,
        gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
    );
}
