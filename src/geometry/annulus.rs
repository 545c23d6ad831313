use super::partition::AngleSpan;
use super::{FULL_TURN, Point, Rect, Size, hit};

pub const CONTENT_BASE_SIZE: Size = Size {
    width: 55.0,
    height: 45.0,
};
pub const ICON_BASE_SIZE: f64 = 24.0;
pub const LABEL_MAX_WIDTH: f64 = 60.0;
pub const LABEL_LINE_HEIGHT: f64 = 1.2; // relative to font size

// content scale = BASE + GAIN * normalized width
const CONTENT_SCALE_BASE: f64 = 0.85;
const CONTENT_SCALE_GAIN: f64 = 0.3;
const FONT_SIZE_BASE: f64 = 9.0;
const FONT_SIZE_GAIN: f64 = 3.0;

const MAX_ARC_SEGMENTS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WedgeSpec {
    pub index: usize,
    pub start_angle: f64,
    pub end_angle: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
}

impl WedgeSpec {
    pub fn new(index: usize, span: AngleSpan, inner_radius: f64, outer_radius: f64) -> Self {
        Self {
            index,
            start_angle: span.start,
            end_angle: span.end,
            inner_radius,
            outer_radius,
        }
    }

    pub fn span(&self) -> AngleSpan {
        AngleSpan::new(self.start_angle, self.end_angle)
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.outer_radius > self.inner_radius)
    }

    pub fn with_outer_radius(self, outer_radius: f64) -> Self {
        Self {
            outer_radius,
            ..self
        }
    }

    /// Closed outline of the wedge around `center`.
    ///
    /// The outer arc runs clockwise and the inner arc counter-clockwise so a non-zero fill
    /// covers the slice of the ring and not its complement.
    pub fn boundary_path(&self, center: Point) -> SectorPath {
        let (start, end) = (self.start_angle, self.end_angle);
        SectorPath {
            commands: vec![
                PathCommand::MoveTo(center.polar_offset(self.outer_radius, start)),
                PathCommand::Arc {
                    center,
                    radius: self.outer_radius,
                    start,
                    end,
                    sweep: Sweep::Clockwise,
                },
                PathCommand::LineTo(center.polar_offset(self.inner_radius, end)),
                PathCommand::Arc {
                    center,
                    radius: self.inner_radius,
                    start: end,
                    end: start,
                    sweep: Sweep::CounterClockwise,
                },
                PathCommand::Close,
            ],
        }
    }

    pub fn placement(&self, center: Point) -> ContentPlacement {
        let span = self.span();
        let normalized_width = span.normalized_width();
        let safe_radius = (self.inner_radius + self.outer_radius) / 2.0;

        // unclamped; overflow is reported by `ContentPlacement::fits_within`
        let scale_factor = CONTENT_SCALE_BASE + CONTENT_SCALE_GAIN * normalized_width;

        ContentPlacement {
            center: center.polar_offset(safe_radius, span.mid()),
            size: CONTENT_BASE_SIZE.scaled(scale_factor),
            scale_factor,
            icon_size: ICON_BASE_SIZE * scale_factor,
            font_size: FONT_SIZE_BASE + FONT_SIZE_GAIN * normalized_width,
            normalized_width,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sweep {
    Clockwise,
    CounterClockwise,
}

/// Drawing instructions with the same semantics as cairo's path API: an `Arc` first draws a
/// straight line from the current point to its own start point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    Arc {
        center: Point,
        radius: f64,
        start: f64,
        end: f64,
        sweep: Sweep,
    },
    Close,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SectorPath {
    pub commands: Vec<PathCommand>,
}

impl SectorPath {
    /// Approximates the outline with a polygon whose chords deviate from the arcs by at most
    /// `tolerance`. The polygon is implicitly closed.
    pub fn flatten(&self, tolerance: f64) -> Vec<Point> {
        let mut points: Vec<Point> = Vec::new();

        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) | PathCommand::LineTo(p) => push_distinct(&mut points, p),
                PathCommand::Arc {
                    center,
                    radius,
                    start,
                    end,
                    sweep,
                } => {
                    let delta = sweep_delta(start, end, sweep);
                    let segments = arc_segments(radius, delta.abs(), tolerance);
                    for i in 0..=segments {
                        let angle = start + delta * i as f64 / segments as f64;
                        push_distinct(&mut points, center.polar_offset(radius, angle));
                    }
                }
                PathCommand::Close => {}
            }
        }

        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        points
    }
}

fn push_distinct(points: &mut Vec<Point>, p: Point) {
    if points.last() != Some(&p) {
        points.push(p);
    }
}

fn sweep_delta(start: f64, end: f64, sweep: Sweep) -> f64 {
    match sweep {
        Sweep::Clockwise => {
            let mut end = end;
            while end < start {
                end += FULL_TURN;
            }
            end - start
        }
        Sweep::CounterClockwise => {
            let mut end = end;
            while end > start {
                end -= FULL_TURN;
            }
            end - start
        }
    }
}

fn arc_segments(radius: f64, angle: f64, tolerance: f64) -> usize {
    if !(radius > tolerance) || !(tolerance > 0.0) || angle == 0.0 {
        return 1;
    }
    // sagitta of a chord spanning `step` is r * (1 - cos(step / 2))
    let step = 2.0 * (1.0 - tolerance / radius).acos();
    ((angle / step).ceil() as usize).clamp(1, MAX_ARC_SEGMENTS)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentPlacement {
    pub center: Point,
    pub size: Size,
    pub scale_factor: f64,
    pub icon_size: f64,
    pub font_size: f64,
    pub normalized_width: f64,
}

impl ContentPlacement {
    pub fn frame(&self) -> Rect {
        Rect::from_center(self.center, self.size)
    }

    pub fn layout(&self, has_icon: bool, has_label: bool, spacing: f64) -> ContentLayout {
        let frame = self.frame();
        let icon_size = Size::new(self.icon_size, self.icon_size);
        let label_size = Size::new(LABEL_MAX_WIDTH, self.font_size * LABEL_LINE_HEIGHT);

        match (has_icon, has_label) {
            (true, true) => {
                let icon_center = Point::new(self.center.x, frame.min_y() + self.icon_size / 2.0);
                let label_center = Point::new(
                    self.center.x,
                    frame.min_y() + self.icon_size + spacing + label_size.height / 2.0,
                );
                ContentLayout {
                    icon: Some(Rect::from_center(icon_center, icon_size)),
                    label: Some(Rect::from_center(label_center, label_size)),
                }
            }
            (true, false) => ContentLayout {
                icon: Some(Rect::from_center(self.center, icon_size)),
                label: None,
            },
            (false, true) => ContentLayout {
                icon: None,
                label: Some(Rect::from_center(self.center, label_size)),
            },
            (false, false) => ContentLayout::default(),
        }
    }

    pub fn fits_within(&self, wedge: &WedgeSpec, menu_center: Point) -> bool {
        self.frame()
            .corners()
            .iter()
            .all(|corner| hit::contains(corner.relative_to(menu_center), wedge))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContentLayout {
    pub icon: Option<Rect>,
    pub label: Option<Rect>,
}
