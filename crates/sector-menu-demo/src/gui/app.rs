use crate::events::AppEvent;
use crate::gui::icons::IconCache;
use crate::gui::theme::{self, ThemeColors};
use crate::gui::view;
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use sector_menu::{Menu, Point, PointerOutcome, Rect, config};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub struct AppModel {
    pub menu: Rc<RefCell<Menu>>,
    pub icons: Rc<RefCell<IconCache>>,
    pub epoch: Instant,
    pub drawing_area: gtk::DrawingArea,
}

#[derive(Debug)]
pub enum AppMsg {
    PointerDown(Point),
    Resize(Rect),
    Selected(usize),
    ConfigReload,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (Menu, async_channel::Receiver<AppEvent>);
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        gtk::ApplicationWindow {
            set_title: Some("Sector Menu"),
            set_default_size: (crate::INITIAL_SIZE, crate::INITIAL_SIZE),
            add_css_class: "sector-menu-window",

            #[name = "drawing_area"]
            gtk::DrawingArea {
                set_hexpand: true,
                set_vexpand: true,
                add_css_class: "sector-menu-area",

                connect_resize[sender] => move |_, width, height| {
                    sender.input(AppMsg::Resize(Rect::new(0.0, 0.0, width as f64, height as f64)));
                },

                add_controller = gtk::GestureClick {
                    set_button: gtk::gdk::BUTTON_PRIMARY,
                    connect_pressed[sender] => move |_, _, x, y| {
                        sender.input(AppMsg::PointerDown(Point::new(x, y)));
                    }
                }
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (mut menu, rx) = init;

        theme::load_css();
        forward_selections(&mut menu, &sender);

        let icons = IconCache::load(&menu);
        let mut model = AppModel {
            menu: Rc::new(RefCell::new(menu)),
            icons: Rc::new(RefCell::new(icons)),
            epoch: Instant::now(),
            drawing_area: gtk::DrawingArea::default(),
        };

        let widgets = view_output!();
        model.drawing_area = widgets.drawing_area.clone();

        let (menu_draw, icons_draw, epoch) = (model.menu.clone(), model.icons.clone(), model.epoch);
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, _, _| {
                let colors = ThemeColors::from_context(&drawing_area.style_context());
                let menu = menu_draw.borrow();
                let frame = menu.frame(epoch.elapsed());
                if let Err(e) = view::draw(cr, &menu, &frame, &icons_draw.borrow(), &colors) {
                    log::error!("Drawing error: {}", e);
                }
            });

        let sender_clone = sender.clone();
        relm4::spawn_local(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>) {
        match msg {
            AppMsg::PointerDown(point) => {
                let outcome = self.menu.borrow_mut().pointer_down(point, self.now());
                if outcome != PointerOutcome::Ignored {
                    self.animate();
                }
            }
            AppMsg::Resize(bounds) => {
                self.menu.borrow_mut().set_bounds(bounds);
                self.drawing_area.queue_draw();
            }
            AppMsg::Selected(index) => {
                let menu = self.menu.borrow();
                let label = menu
                    .sectors()
                    .get(index)
                    .and_then(|s| s.label.as_ref())
                    .map(|l| l.to_string())
                    .unwrap_or_default();
                log::info!("Sector {} ({}) tapped", index, label);
            }
            AppMsg::ConfigReload => self.reload(&sender),
        }
    }
}

impl AppModel {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn animate(&self) {
        self.drawing_area.queue_draw();
        let (menu, epoch) = (self.menu.clone(), self.epoch);
        self.drawing_area.add_tick_callback(move |area, _| {
            area.queue_draw();
            if menu.borrow().is_animating(epoch.elapsed()) {
                glib::ControlFlow::Continue
            } else {
                glib::ControlFlow::Break
            }
        });
    }

    // A deleted file brings back the bundled menu, like at startup.
    fn reload(&mut self, sender: &ComponentSender<Self>) {
        let new_config = match config::get_config_path()
            .and_then(|path| config::load_config_or_builtin(&path))
        {
            Ok(c) => c,
            Err(e) => {
                log::error!("Failed to reload config: {}", e);
                return;
            }
        };

        let bounds = self.menu.borrow().bounds();
        match Menu::new(bounds, new_config.sectors, new_config.menu) {
            Ok(mut menu) => {
                forward_selections(&mut menu, sender);
                *self.icons.borrow_mut() = IconCache::load(&menu);
                *self.menu.borrow_mut() = menu;
                self.drawing_area.queue_draw();
                log::info!("Configuration reloaded");
            }
            Err(e) => log::error!("Rejected reloaded config: {}", e),
        }
    }
}

fn forward_selections(menu: &mut Menu, sender: &ComponentSender<AppModel>) {
    let sender = sender.clone();
    menu.on_select(move |index| sender.input(AppMsg::Selected(index)));
}
