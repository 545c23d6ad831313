//! Declarative animation instructions and the timeline that samples them.

use super::model::MenuState;
use super::{
    COLLAPSED_SCALE, EXPANDED_ROTATION, PRESS_PHASE, PRESS_SCALE, SPRING_DAMPING,
    SPRING_VELOCITY, STAGGER,
};
use derive_more::Display;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use strum::{Display as StrumDisplay, EnumIter};

// angular frequency per normalized duration; at damping 0.7 the spring has settled by t = 1
const SPRING_FREQUENCY: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Target {
    #[display("center button")]
    CenterButton,
    #[display("wedge {_0}")]
    Wedge(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Property {
    Opacity,
    Scale,
    /// Tap acknowledgment, multiplied into `Scale` when drawing.
    Press,
    Rotation,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    Linear,
    EaseInOut,
    /// Damped spring. `initial_velocity` is in units of total travel per duration.
    Spring {
        damping: f64,
        initial_velocity: f64,
    },
}

impl Curve {
    pub fn progress(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match *self {
            Self::Linear => t,
            Self::EaseInOut => t * t * (3.0 - 2.0 * t),
            Self::Spring {
                damping,
                initial_velocity,
            } => {
                let damping = damping.clamp(0.0, 0.999);
                let omega = SPRING_FREQUENCY;
                let omega_d = omega * (1.0 - damping * damping).sqrt();
                let decay = (-damping * omega * t).exp();
                let phase = (damping * omega - initial_velocity) / omega_d;
                1.0 - decay * ((omega_d * t).cos() + phase * (omega_d * t).sin())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub target: Target,
    pub property: Property,
    pub from: f64,
    pub to: f64,
    pub duration: Duration,
    pub delay: Duration,
    pub curve: Curve,
}

impl Animation {
    pub fn key(&self) -> (Target, Property) {
        (self.target, self.property)
    }

    pub fn total(&self) -> Duration {
        self.delay + self.duration
    }

    pub fn value_at(&self, elapsed: Duration) -> f64 {
        let Some(local) = elapsed.checked_sub(self.delay) else {
            return self.from;
        };
        if local >= self.duration {
            return self.to;
        }
        let t = local.as_secs_f64() / self.duration.as_secs_f64();
        self.from + (self.to - self.from) * self.curve.progress(t)
    }
}

pub fn transition(state: MenuState, wedge_count: usize, duration: Duration) -> Vec<Animation> {
    let expanded = state.is_expanded();
    let flip = |collapsed: f64, open: f64| {
        if expanded {
            (collapsed, open)
        } else {
            (open, collapsed)
        }
    };

    let (from, to) = flip(0.0, EXPANDED_ROTATION);
    let rotation = Animation {
        target: Target::CenterButton,
        property: Property::Rotation,
        from,
        to,
        duration,
        delay: Duration::ZERO,
        curve: Curve::Spring {
            damping: SPRING_DAMPING,
            initial_velocity: SPRING_VELOCITY,
        },
    };

    let wedges = (0..wedge_count).flat_map(|index| {
        let delay = STAGGER * index as u32;
        [
            (Property::Opacity, flip(0.0, 1.0)),
            (Property::Scale, flip(COLLAPSED_SCALE, 1.0)),
        ]
        .into_iter()
        .map(move |(property, (from, to))| Animation {
            target: Target::Wedge(index),
            property,
            from,
            to,
            duration,
            delay,
            curve: Curve::EaseInOut,
        })
    });

    std::iter::once(rotation).chain(wedges).collect()
}

pub fn acknowledge(index: usize) -> Vec<Animation> {
    let phase = |from: f64, to: f64, delay: Duration| Animation {
        target: Target::Wedge(index),
        property: Property::Press,
        from,
        to,
        duration: PRESS_PHASE,
        delay,
        curve: Curve::EaseInOut,
    };
    vec![
        phase(1.0, PRESS_SCALE, Duration::ZERO),
        phase(PRESS_SCALE, 1.0, PRESS_PHASE),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WedgeFrame {
    pub opacity: f64,
    pub scale: f64,
    pub press: f64,
}

impl WedgeFrame {
    pub fn effective_scale(&self) -> f64 {
        self.scale * self.press
    }

    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub center_rotation: f64,
    pub wedges: Vec<WedgeFrame>,
}

impl Frame {
    pub fn resting(state: MenuState, wedge_count: usize) -> Self {
        let (center_rotation, wedge) = if state.is_expanded() {
            (
                EXPANDED_ROTATION,
                WedgeFrame {
                    opacity: 1.0,
                    scale: 1.0,
                    press: 1.0,
                },
            )
        } else {
            (
                0.0,
                WedgeFrame {
                    opacity: 0.0,
                    scale: COLLAPSED_SCALE,
                    press: 1.0,
                },
            )
        };
        Self {
            center_rotation,
            wedges: vec![wedge; wedge_count],
        }
    }

    pub fn get(&self, target: Target, property: Property) -> Option<f64> {
        match (target, property) {
            (Target::CenterButton, Property::Rotation) => Some(self.center_rotation),
            (Target::Wedge(i), Property::Opacity) => self.wedges.get(i).map(|w| w.opacity),
            (Target::Wedge(i), Property::Scale) => self.wedges.get(i).map(|w| w.scale),
            (Target::Wedge(i), Property::Press) => self.wedges.get(i).map(|w| w.press),
            _ => None,
        }
    }

    fn set(&mut self, (target, property): (Target, Property), value: f64) {
        match (target, property) {
            (Target::CenterButton, Property::Rotation) => self.center_rotation = value,
            (Target::Wedge(i), property) => {
                if let Some(wedge) = self.wedges.get_mut(i) {
                    match property {
                        Property::Opacity => wedge.opacity = value,
                        Property::Scale => wedge.scale = value,
                        Property::Press => wedge.press = value,
                        Property::Rotation => {}
                    }
                }
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Transition,
    Feedback,
}

#[derive(Debug, Clone)]
struct Track {
    animation: Animation,
    channel: Channel,
    started: Duration,
}

impl Track {
    fn key(&self) -> (Target, Property) {
        self.animation.key()
    }

    fn effective_start(&self) -> Duration {
        self.started + self.animation.delay
    }

    fn finished(&self, now: Duration) -> bool {
        now >= self.started + self.animation.total()
    }

    fn value(&self, now: Duration) -> f64 {
        self.animation.value_at(now.saturating_sub(self.started))
    }
}

#[derive(Debug, Clone)]
pub struct Timeline {
    resting: Frame,
    tracks: Vec<Track>,
}

impl Timeline {
    pub fn new(resting: Frame) -> Self {
        Self {
            resting,
            tracks: Vec::new(),
        }
    }

    pub fn sample(&self, now: Duration) -> Frame {
        let mut frame = self.resting.clone();
        let mut ordered: Vec<&Track> = self.tracks.iter().collect();
        ordered.sort_by_key(|t| t.effective_start());

        let (running, pending): (Vec<&Track>, Vec<&Track>) = ordered
            .into_iter()
            .partition(|t| t.effective_start() <= now);

        let mut touched = HashSet::new();
        for track in running {
            frame.set(track.key(), track.value(now));
            touched.insert(track.key());
        }
        for track in pending {
            if touched.insert(track.key()) {
                frame.set(track.key(), track.animation.from);
            }
        }
        frame
    }

    pub fn is_animating(&self, now: Duration) -> bool {
        self.tracks.iter().any(|t| !t.finished(now))
    }

    /// Replaces same-channel tracks for the same properties. The earliest new animation per
    /// property starts from the value currently on screen.
    pub fn begin(&mut self, now: Duration, channel: Channel, animations: &[Animation]) {
        self.settle(now);
        let current = self.sample(now);

        let mut first_delay: HashMap<(Target, Property), Duration> = HashMap::new();
        for animation in animations {
            first_delay
                .entry(animation.key())
                .and_modify(|d| *d = (*d).min(animation.delay))
                .or_insert(animation.delay);
        }

        self.tracks
            .retain(|t| t.channel != channel || !first_delay.contains_key(&t.key()));
        self.resting = current.clone();

        let mut retargeted = HashSet::new();
        for animation in animations {
            let mut animation = animation.clone();
            let key = animation.key();
            if first_delay.get(&key) == Some(&animation.delay) && retargeted.insert(key) {
                if let Some(value) = current.get(animation.target, animation.property) {
                    animation.from = value;
                }
            }
            self.tracks.push(Track {
                animation,
                channel,
                started: now,
            });
        }
    }

    pub fn settle(&mut self, now: Duration) {
        let (mut finished, running): (Vec<Track>, Vec<Track>) =
            self.tracks.drain(..).partition(|t| t.finished(now));
        finished.sort_by_key(|t| t.effective_start());
        for track in finished {
            self.resting.set(track.key(), track.animation.to);
        }
        self.tracks = running;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    const EPS: f64 = 1e-9;
    const DURATION: Duration = Duration::from_millis(300);

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn spring() -> Curve {
        Curve::Spring {
            damping: SPRING_DAMPING,
            initial_velocity: SPRING_VELOCITY,
        }
    }

    #[test]
    fn test_curves_hit_endpoints() {
        for curve in [Curve::Linear, Curve::EaseInOut, spring()] {
            assert_eq!(curve.progress(-1.0), 0.0);
            assert_eq!(curve.progress(0.0), 0.0);
            assert_eq!(curve.progress(1.0), 1.0);
            assert_eq!(curve.progress(2.0), 1.0);
        }
        assert!((Curve::EaseInOut.progress(0.5) - 0.5).abs() < EPS);
    }

    #[test]
    fn test_spring_settles_and_overshoots_slightly() {
        let curve = spring();
        let samples: Vec<f64> = (0..=100).map(|i| curve.progress(i as f64 / 100.0)).collect();
        let peak = samples.iter().cloned().fold(f64::MIN, f64::max);
        assert!(peak > 1.0 && peak < 1.1, "peak {peak}");
        assert!((samples[99] - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_expand_transition_plan() {
        let plan = transition(MenuState::Expanded, 3, DURATION);
        assert_eq!(plan.len(), 7);

        let rotation = &plan[0];
        assert_eq!(rotation.key(), (Target::CenterButton, Property::Rotation));
        assert_eq!((rotation.from, rotation.to), (0.0, EXPANDED_ROTATION));
        assert!(matches!(rotation.curve, Curve::Spring { .. }));

        for animation in &plan[1..] {
            let Target::Wedge(index) = animation.target else {
                panic!("unexpected target {}", animation.target);
            };
            assert_eq!(animation.delay, ms(20) * index as u32);
            assert_eq!(animation.duration, DURATION);
            match animation.property {
                Property::Opacity => assert_eq!((animation.from, animation.to), (0.0, 1.0)),
                Property::Scale => assert_eq!((animation.from, animation.to), (0.5, 1.0)),
                other => panic!("unexpected property {other}"),
            }
        }
    }

    #[test]
    fn test_collapse_transition_mirrors_expand() {
        let expand = transition(MenuState::Expanded, 4, DURATION);
        let collapse = transition(MenuState::Collapsed, 4, DURATION);
        assert_eq!(expand.len(), collapse.len());
        for (e, c) in expand.iter().zip(&collapse) {
            assert_eq!(e.key(), c.key());
            assert_eq!(e.delay, c.delay);
            assert_eq!((e.from, e.to), (c.to, c.from));
        }
    }

    #[test]
    fn test_timeline_runs_staggered_expand() {
        let mut timeline = Timeline::new(Frame::resting(MenuState::Collapsed, 4));
        timeline.begin(
            ms(1000),
            Channel::Transition,
            &transition(MenuState::Expanded, 4, DURATION),
        );

        let early = timeline.sample(ms(1030));
        assert!(early.wedges[0].opacity > 0.0);
        assert!(early.wedges[1].opacity > 0.0);
        assert_eq!(early.wedges[3].opacity, 0.0); // still in its 60ms delay
        assert_eq!(early.wedges[3].scale, COLLAPSED_SCALE);
        assert!(early.wedges[0].opacity > early.wedges[1].opacity);

        assert!(timeline.is_animating(ms(1359)));
        assert!(!timeline.is_animating(ms(1360)));
        assert_eq!(timeline.sample(ms(1360)), Frame::resting(MenuState::Expanded, 4));

        timeline.settle(ms(2000));
        assert!(timeline.tracks.is_empty());
        assert_eq!(timeline.sample(ms(2000)), Frame::resting(MenuState::Expanded, 4));
    }

    #[test]
    fn test_interrupted_transition_reverses_from_current_value() {
        let mut timeline = Timeline::new(Frame::resting(MenuState::Collapsed, 3));
        timeline.begin(
            ms(0),
            Channel::Transition,
            &transition(MenuState::Expanded, 3, DURATION),
        );
        let before = timeline.sample(ms(100));

        timeline.begin(
            ms(100),
            Channel::Transition,
            &transition(MenuState::Collapsed, 3, DURATION),
        );
        assert_eq!(timeline.tracks.len(), 7, "old transition replaced");
        assert_eq!(timeline.sample(ms(100)), before, "no visual jump");

        let end = ms(100) + STAGGER * 2 + DURATION;
        assert_eq!(timeline.sample(end), Frame::resting(MenuState::Collapsed, 3));
    }

    #[test]
    fn test_acknowledge_pulse() {
        let mut timeline = Timeline::new(Frame::resting(MenuState::Expanded, 2));
        timeline.begin(ms(0), Channel::Feedback, &acknowledge(1));

        assert_eq!(timeline.sample(ms(0)).wedges[1].press, 1.0);
        let mid = timeline.sample(ms(75)).wedges[1].press;
        assert!(mid < 1.0 && mid > PRESS_SCALE);
        assert!((timeline.sample(ms(150)).wedges[1].press - PRESS_SCALE).abs() < EPS);
        assert_eq!(timeline.sample(ms(300)).wedges[1].press, 1.0);
        assert_eq!(timeline.sample(ms(75)).wedges[0].press, 1.0);

        let frame = timeline.sample(ms(150));
        assert!((frame.wedges[1].effective_scale() - PRESS_SCALE).abs() < EPS);
    }

    #[test]
    fn test_feedback_survives_transition_restart() {
        let mut timeline = Timeline::new(Frame::resting(MenuState::Expanded, 2));
        timeline.begin(ms(0), Channel::Feedback, &acknowledge(0));
        timeline.begin(
            ms(50),
            Channel::Transition,
            &transition(MenuState::Collapsed, 2, DURATION),
        );
        assert!(timeline.sample(ms(100)).wedges[0].press < 1.0);
        assert_eq!(timeline.sample(ms(400)).wedges[0].press, 1.0);
    }

    #[test]
    fn test_frame_get_covers_every_wedge_property() {
        let frame = Frame::resting(MenuState::Expanded, 1);
        for property in Property::iter() {
            let expected = property != Property::Rotation;
            assert_eq!(frame.get(Target::Wedge(0), property).is_some(), expected, "{property}");
        }
        assert_eq!(frame.get(Target::Wedge(5), Property::Opacity), None);
        assert_eq!(
            frame.get(Target::CenterButton, Property::Rotation),
            Some(EXPANDED_ROTATION)
        );
    }
}
