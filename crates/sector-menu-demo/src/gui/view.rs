use super::icons::IconCache;
use super::theme::ThemeColors;
use cairo::{Context, LinearGradient};
use gdk_pixbuf::Pixbuf;
use gdk4::prelude::*;
use palette::Srgba;
use sector_menu::geometry::{PathCommand, Sweep};
use sector_menu::menu::{Frame, WedgeFrame};
use sector_menu::{Menu, Point, Rect, SectorConfig, ShadowSpec, Size};

const GLYPH_STROKE: f64 = 2.0;
const GLYPH_SIZE: f64 = 0.4; // relative to the button diameter

struct WedgeRenderer<'a> {
    menu: &'a Menu,
    index: usize,
    sector: &'a SectorConfig,
    frame: WedgeFrame,
    icon: Option<&'a Pixbuf>,
}

impl<'a> WedgeRenderer<'a> {
    fn draw(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        if !self.frame.is_visible() {
            return Ok(());
        }

        let center = self.menu.center();
        let scale = self.frame.effective_scale();

        cr.save()?;
        cr.translate(center.x, center.y);
        cr.scale(scale, scale);
        cr.translate(-center.x, -center.y);

        cr.push_group();
        self.draw_shape(cr)?;
        self.draw_content(cr, colors)?;
        cr.pop_group_to_source()?;
        cr.paint_with_alpha(self.frame.opacity)?;

        cr.restore()
    }

    fn draw_shape(&self, cr: &Context) -> Result<(), cairo::Error> {
        let Some(path) = self.menu.boundary_path(self.index) else {
            return Ok(());
        };
        let trace = |cr: &Context| {
            cr.new_path();
            for command in &path.commands {
                match *command {
                    PathCommand::MoveTo(p) => cr.move_to(p.x, p.y),
                    PathCommand::LineTo(p) => cr.line_to(p.x, p.y),
                    PathCommand::Arc {
                        center,
                        radius,
                        start,
                        end,
                        sweep: Sweep::Clockwise,
                    } => cr.arc(center.x, center.y, radius, start, end),
                    PathCommand::Arc {
                        center,
                        radius,
                        start,
                        end,
                        sweep: Sweep::CounterClockwise,
                    } => cr.arc_negative(center.x, center.y, radius, start, end),
                    PathCommand::Close => cr.close_path(),
                }
            }
        };

        draw_shadow(cr, &self.sector.shadow, &trace)?;

        // diagonal gradient across the square enclosing the ring
        let outer = self.menu.wedges()[self.index].outer_radius;
        let center = self.menu.center();
        let gradient = LinearGradient::new(
            center.x - outer,
            center.y - outer,
            center.x + outer,
            center.y + outer,
        );
        for (offset, color) in [0.0, 1.0].into_iter().zip(self.sector.gradient_stops()) {
            let (r, g, b, a) = color.components();
            gradient.add_color_stop_rgba(offset, r, g, b, a);
        }

        trace(cr);
        cr.set_source(&gradient)?;
        cr.fill()
    }

    fn draw_content(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        let Some(layout) = self.menu.content_layout(self.index) else {
            return Ok(());
        };
        let placement = self.menu.placements()[self.index];

        if let (Some(frame), Some(pixbuf)) = (layout.icon, self.icon) {
            draw_pixbuf(cr, pixbuf, frame, 0.0)?;
        }
        if let (Some(frame), Some(label)) = (layout.label, self.sector.label.as_ref()) {
            draw_label(cr, label, frame, placement.font_size, colors.label)?;
        }
        Ok(())
    }
}

fn set_source_color(cr: &Context, color: Srgba<f64>) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a);
}

/// Cairo has no blur, so the shadow is a single offset silhouette; `radius` is not used.
fn draw_shadow(
    cr: &Context,
    shadow: &ShadowSpec,
    trace: &dyn Fn(&Context),
) -> Result<(), cairo::Error> {
    if !shadow.is_visible() {
        return Ok(());
    }
    let (r, g, b, a) = shadow.color.components();

    cr.save()?;
    cr.translate(shadow.offset[0], shadow.offset[1]);
    trace(cr);
    cr.set_source_rgba(r, g, b, a * shadow.opacity);
    cr.fill()?;
    cr.restore()
}

fn draw_pixbuf(
    cr: &Context,
    pixbuf: &Pixbuf,
    frame: Rect,
    rotation: f64,
) -> Result<(), cairo::Error> {
    // fit icon into frame
    let icon_scale = (frame.size.width / pixbuf.width() as f64)
        .min(frame.size.height / pixbuf.height() as f64);
    let center = frame.center();

    cr.save()?;
    cr.translate(center.x, center.y);
    cr.rotate(rotation);
    cr.scale(icon_scale, icon_scale);
    cr.set_source_pixbuf(
        pixbuf,
        -pixbuf.width() as f64 / 2.0,
        -pixbuf.height() as f64 / 2.0,
    );
    cr.paint()?;
    cr.restore()
}

fn draw_label(
    cr: &Context,
    text: &str,
    frame: Rect,
    font_size: f64,
    color: Srgba<f64>,
) -> Result<(), cairo::Error> {
    set_source_color(cr, color);
    cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Normal);
    cr.set_font_size(font_size);

    let mut ext = cr.text_extents(text)?;
    if ext.width() > frame.size.width {
        // shrink long labels to the frame instead of wrapping
        cr.set_font_size(font_size * frame.size.width / ext.width());
        ext = cr.text_extents(text)?;
    }

    let center = frame.center();
    cr.move_to(
        center.x - ext.width() / 2.0 - ext.x_bearing(),
        center.y - ext.height() / 2.0 - ext.y_bearing(),
    );
    cr.show_text(text)
}

pub fn draw(
    cr: &Context,
    menu: &Menu,
    frame: &Frame,
    icons: &IconCache,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    for (index, (sector, wedge_frame)) in menu.sectors().iter().zip(&frame.wedges).enumerate() {
        WedgeRenderer {
            menu,
            index,
            sector,
            frame: *wedge_frame,
            icon: icons.wedge(index),
        }
        .draw(cr, colors)?;
    }

    draw_center_button(cr, menu, frame.center_rotation, icons, colors)
}

fn draw_center_button(
    cr: &Context,
    menu: &Menu,
    rotation: f64,
    icons: &IconCache,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    let config = menu.config();
    let center = menu.center();
    let radius = config.center_button_radius();
    let circle = |cr: &Context| {
        cr.new_path();
        cr.arc(center.x, center.y, radius, 0.0, std::f64::consts::TAU);
    };

    draw_shadow(cr, &config.shadow(), &circle)?;

    let (r, g, b, a) = config.center_button_color.components();
    cr.set_source_rgba(r, g, b, a);
    circle(cr);
    cr.fill()?;

    let size = config.center_button_size * GLYPH_SIZE;
    match &icons.center {
        Some(pixbuf) => {
            let frame = Rect::from_center(center, Size::new(size, size));
            draw_pixbuf(cr, pixbuf, frame, rotation)
        }
        None => draw_plus_glyph(cr, center, size, rotation, colors),
    }
}

/// A "+" that reads as an "x" once rotated by 45 degrees.
fn draw_plus_glyph(
    cr: &Context,
    center: Point,
    size: f64,
    rotation: f64,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    let half = size / 2.0;
    cr.save()?;
    cr.translate(center.x, center.y);
    cr.rotate(rotation);
    cr.new_path();
    cr.move_to(-half, 0.0);
    cr.line_to(half, 0.0);
    cr.move_to(0.0, -half);
    cr.line_to(0.0, half);
    set_source_color(cr, colors.glyph);
    cr.set_line_width(GLYPH_STROKE);
    cr.set_line_cap(cairo::LineCap::Round);
    cr.stroke()?;
    cr.restore()
}
