use std::f64::consts::PI;
use std::time::Duration;

pub mod animation;
pub mod model;

pub use animation::{Animation, Curve, Frame, Property, Target, Timeline, WedgeFrame};
pub use model::{Menu, MenuError, MenuState, PointerOutcome};

pub const EXPANDED_ROTATION: f64 = PI / 4.0; // center icon turns "+" into "x"
pub const COLLAPSED_SCALE: f64 = 0.5;
pub const STAGGER: Duration = Duration::from_millis(20); // per wedge index
pub const PRESS_SCALE: f64 = 0.9;
pub const PRESS_PHASE: Duration = Duration::from_millis(150);
pub const SPRING_DAMPING: f64 = 0.7;
pub const SPRING_VELOCITY: f64 = 0.5;
