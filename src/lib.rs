//! Geometry, hit-testing and state core for a radial sector menu.

#[macro_use]
mod macros;

pub mod config;
pub mod geometry;
pub mod menu;

pub use config::{Color, Config, IconRef, Label, MenuConfig, SectorConfig, ShadowSpec};
pub use geometry::{Point, Rect, Size};
pub use menu::{Menu, MenuError, MenuState, PointerOutcome};
