use super::annulus::WedgeSpec;
use super::{FULL_TURN, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    CenterButton,
    Wedge(usize),
    Outside,
}

/// `atan2` angle of `point` folded into `[0, 2π)`.
pub fn normalize_angle(point: Point) -> f64 {
    let angle = point.y.atan2(point.x);
    let angle = if angle < 0.0 { angle + FULL_TURN } else { angle };
    // tiny negative angles round up to exactly a full turn
    if angle >= FULL_TURN { 0.0 } else { angle }
}

pub fn contains(point: Point, wedge: &WedgeSpec) -> bool {
    if wedge.is_degenerate() {
        return false;
    }

    let distance = point.length();
    if !(distance >= wedge.inner_radius && distance <= wedge.outer_radius) {
        return false;
    }

    let angle = normalize_angle(point);
    let (start, end) = (wedge.start_angle, wedge.end_angle);
    if start <= end {
        start <= angle && angle <= end
    } else {
        angle >= start || angle <= end
    }
}

/// Routes a pointer, relative to the menu center, to the center button or a wedge.
///
/// The center button circle is tested first and shadows any wedge underneath it. Wedges are
/// tested in index order; on a shared edge the lower index wins.
pub fn route(point: Point, center_radius: f64, wedges: &[WedgeSpec]) -> PointerTarget {
    if point.length() <= center_radius {
        return PointerTarget::CenterButton;
    }

    wedges
        .iter()
        .find(|wedge| contains(point, wedge))
        .map_or(PointerTarget::Outside, |wedge| {
            PointerTarget::Wedge(wedge.index)
        })
}
