use anyhow::Context;
use gui::app::AppModel;
use relm4::prelude::*;
use sector_menu::{Menu, Rect, config};

mod events;
mod gui;
mod sys;

const INITIAL_SIZE: i32 = 360;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    match config::write_default_config() {
        Ok(path) => log::info!("Edit {} to change the menu", path.display()),
        Err(e) => log::warn!("Could not write the default config: {}", e),
    }
    let config = config::load_or_default();
    let bounds = Rect::new(0.0, 0.0, INITIAL_SIZE as f64, INITIAL_SIZE as f64);
    let menu =
        Menu::new(bounds, config.sectors, config.menu).context("Invalid menu configuration")?;

    let (tx, rx) = async_channel::bounded(32);

    // Start Background Services
    sys::runtime::start_background_services(tx);

    let app = RelmApp::new("org.sectormenu.demo");

    app.run::<AppModel>((menu, rx));
    Ok(())
}
