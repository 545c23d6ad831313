use super::animation::{self, Animation, Channel, Frame, Timeline};
use crate::config::{MenuConfig, SectorConfig};
use crate::geometry::{
    self, ContentLayout, ContentPlacement, Point, PointerTarget, Rect, SectorPath, WedgeSpec,
};
use std::time::Duration;
use strum::{Display as StrumDisplay, EnumIter};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, StrumDisplay, EnumIter)]
pub enum MenuState {
    #[default]
    Collapsed,
    Expanded,
}

impl MenuState {
    pub fn toggled(self) -> Self {
        match self {
            Self::Collapsed => Self::Expanded,
            Self::Expanded => Self::Collapsed,
        }
    }

    pub fn is_expanded(self) -> bool {
        self == Self::Expanded
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MenuError {
    #[error("Inner radius must be finite and non-negative, got {0}")]
    InvalidInnerRadius(f64),
    #[error("Center button size must be finite and non-negative, got {0}")]
    InvalidCenterButtonSize(f64),
    #[error("Outer radius {outer} must be larger than inner radius {inner}")]
    InvertedRadii { inner: f64, outer: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PointerOutcome {
    Toggled {
        state: MenuState,
        animations: Vec<Animation>,
    },
    Selected {
        index: usize,
        animations: Vec<Animation>,
    },
    Ignored,
}

pub struct Menu {
    bounds: Rect,
    config: MenuConfig,
    sectors: Vec<SectorConfig>,
    wedges: Vec<WedgeSpec>,
    placements: Vec<ContentPlacement>,
    state: MenuState,
    timeline: Timeline,
    on_select: Option<Box<dyn FnMut(usize)>>,
}

impl Menu {
    pub fn new(
        bounds: Rect,
        sectors: Vec<SectorConfig>,
        config: MenuConfig,
    ) -> Result<Self, MenuError> {
        let inner = config.inner_radius;
        if !(inner.is_finite() && inner >= 0.0) {
            return Err(MenuError::InvalidInnerRadius(inner));
        }
        let button = config.center_button_size;
        if !(button.is_finite() && button >= 0.0) {
            return Err(MenuError::InvalidCenterButtonSize(button));
        }
        let outer = bounds.inscribed_radius();
        if outer <= inner {
            return Err(MenuError::InvertedRadii { inner, outer });
        }

        let wedges = geometry::partition(sectors.len())
            .into_iter()
            .enumerate()
            .map(|(index, span)| WedgeSpec::new(index, span, inner, outer))
            .collect();

        let state = MenuState::default();
        let mut menu = Self {
            bounds,
            timeline: Timeline::new(Frame::resting(state, sectors.len())),
            config,
            sectors,
            wedges,
            placements: Vec::new(),
            state,
            on_select: None,
        };
        menu.recalculate_geometries();
        Ok(menu)
    }

    pub fn with_defaults(bounds: Rect, sectors: Vec<SectorConfig>) -> Result<Self, MenuError> {
        Self::new(bounds, sectors, MenuConfig::default())
    }

    pub fn on_select(&mut self, callback: impl FnMut(usize) + 'static) {
        self.on_select = Some(Box::new(callback));
    }

    /// Re-centers the wedges in `bounds` and re-derives the outer radius from it. Safe to call
    /// repeatedly with the same bounds. Degenerate bounds produce wedges that are never hit.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        self.recalculate_geometries();
    }

    fn recalculate_geometries(&mut self) {
        let center = self.center();
        let outer = self.bounds.inscribed_radius();

        for wedge in &mut self.wedges {
            *wedge = wedge.with_outer_radius(outer);
        }
        self.placements = self.wedges.iter().map(|w| w.placement(center)).collect();

        if let Some(wedge) = self.wedges.first().filter(|w| w.is_degenerate()) {
            log::debug!(
                "Bounds {:?} leave no room between radii {} and {}",
                self.bounds,
                wedge.inner_radius,
                wedge.outer_radius
            );
            return;
        }
        for (wedge, placement) in self.wedges.iter().zip(&self.placements) {
            if !placement.fits_within(wedge, center) {
                log::debug!("Content of wedge {} overflows its sector", wedge.index);
            }
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    pub fn sectors(&self) -> &[SectorConfig] {
        &self.sectors
    }

    pub fn wedges(&self) -> &[WedgeSpec] {
        &self.wedges
    }

    pub fn placements(&self) -> &[ContentPlacement] {
        &self.placements
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn is_expanded(&self) -> bool {
        self.state.is_expanded()
    }

    pub fn boundary_path(&self, index: usize) -> Option<SectorPath> {
        self.wedges
            .get(index)
            .map(|w| w.boundary_path(self.center()))
    }

    pub fn content_layout(&self, index: usize) -> Option<ContentLayout> {
        let sector = self.sectors.get(index)?;
        let placement = self.placements.get(index)?;
        Some(placement.layout(
            sector.icon.is_some(),
            sector.label.is_some(),
            sector.spacing,
        ))
    }

    /// Classifies `location` (in bounds coordinates). Wedges of a collapsed menu are not
    /// hittable even though their shape still exists.
    pub fn hit_test(&self, location: Point) -> PointerTarget {
        let relative = location.relative_to(self.center());
        match geometry::route(relative, self.config.center_button_radius(), &self.wedges) {
            PointerTarget::Wedge(_) if !self.is_expanded() => PointerTarget::Outside,
            target => target,
        }
    }

    pub fn toggle(&mut self, now: Duration) -> Vec<Animation> {
        self.state = self.state.toggled();
        log::info!("Menu {}", self.state);

        let animations = animation::transition(
            self.state,
            self.wedges.len(),
            self.config.animation_duration,
        );
        self.timeline
            .begin(now, Channel::Transition, &animations);
        animations
    }

    pub fn pointer_down(&mut self, location: Point, now: Duration) -> PointerOutcome {
        match self.hit_test(location) {
            PointerTarget::CenterButton => {
                let animations = self.toggle(now);
                PointerOutcome::Toggled {
                    state: self.state,
                    animations,
                }
            }
            PointerTarget::Wedge(index) => {
                let animations = self.select(index, now);
                PointerOutcome::Selected { index, animations }
            }
            PointerTarget::Outside => PointerOutcome::Ignored,
        }
    }

    fn select(&mut self, index: usize, now: Duration) -> Vec<Animation> {
        log::info!("Selected wedge {}", index);
        if let Some(callback) = self.on_select.as_mut() {
            callback(index);
        }

        let animations = animation::acknowledge(index);
        self.timeline.begin(now, Channel::Feedback, &animations);
        animations
    }

    pub fn frame(&self, now: Duration) -> Frame {
        self.timeline.sample(now)
    }

    pub fn is_animating(&self, now: Duration) -> bool {
        self.timeline.is_animating(now)
    }
}
