//! Animation kinds and range mapping
//!
//! [`AnimationKind`] is the closed set of properties a spring can drive,
//! and [`AnimationKind::apply`] is the one place that knows which setter
//! each kind writes to.

use crate::error::SpringError;
use crate::sink::PropertySink;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Property driven by an animation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationKind {
    TranslateX,
    TranslateY,
    RotateX,
    RotateY,
    /// In-plane (Z axis) rotation
    Rotation,
    ScaleX,
    ScaleY,
    /// Both scale axes at once
    #[serde(rename = "scale_xy")]
    ScaleXY,
    Alpha,
}

impl AnimationKind {
    pub const ALL: [AnimationKind; 9] = [
        AnimationKind::TranslateX,
        AnimationKind::TranslateY,
        AnimationKind::RotateX,
        AnimationKind::RotateY,
        AnimationKind::Rotation,
        AnimationKind::ScaleX,
        AnimationKind::ScaleY,
        AnimationKind::ScaleXY,
        AnimationKind::Alpha,
    ];

    /// Write `value` into the property selected by this kind
    pub fn apply(self, sink: &mut dyn PropertySink, value: f32) {
        match self {
            AnimationKind::TranslateX => sink.set_translation_x(value),
            AnimationKind::TranslateY => sink.set_translation_y(value),
            AnimationKind::RotateX => sink.set_rotation_x(value),
            AnimationKind::RotateY => sink.set_rotation_y(value),
            AnimationKind::Rotation => sink.set_rotation(value),
            AnimationKind::ScaleX => sink.set_scale_x(value),
            AnimationKind::ScaleY => sink.set_scale_y(value),
            AnimationKind::ScaleXY => {
                sink.set_scale_x(value);
                sink.set_scale_y(value);
            }
            AnimationKind::Alpha => sink.set_alpha(value),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AnimationKind::TranslateX => "translate_x",
            AnimationKind::TranslateY => "translate_y",
            AnimationKind::RotateX => "rotate_x",
            AnimationKind::RotateY => "rotate_y",
            AnimationKind::Rotation => "rotation",
            AnimationKind::ScaleX => "scale_x",
            AnimationKind::ScaleY => "scale_y",
            AnimationKind::ScaleXY => "scale_xy",
            AnimationKind::Alpha => "alpha",
        }
    }
}

impl fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnimationKind {
    type Err = SpringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        AnimationKind::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| SpringError::UnknownKind(s.to_string()))
    }
}

/// Linearly map `value` from `[from_low, from_high]` onto `[to_low, to_high]`
pub fn map_range(value: f64, from_low: f64, from_high: f64, to_low: f64, to_high: f64) -> f64 {
    let progress = (value - from_low) / (from_high - from_low);
    to_low + progress * (to_high - to_low)
}

/// A kind plus the value range a spring sweeps it through
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropertyMotion {
    pub kind: AnimationKind,
    pub from: f32,
    pub to: f32,
}

impl PropertyMotion {
    pub fn new(kind: AnimationKind, from: f32, to: f32) -> Self {
        Self { kind, from, to }
    }

    /// Property value for a simulation progress (0 at start, 1 at rest)
    pub fn value_at(&self, progress: f64) -> f32 {
        map_range(progress, 0.0, 1.0, self.from as f64, self.to as f64) as f32
    }

    /// Put the element in its pre-animation pose
    pub fn apply_start(&self, sink: &mut dyn PropertySink) {
        self.kind.apply(sink, self.from);
    }

    pub fn apply_progress(&self, sink: &mut dyn PropertySink, progress: f64) {
        self.kind.apply(sink, self.value_at(progress));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::ViewProperties;

    #[test]
    fn test_each_kind_writes_its_property() {
        for kind in AnimationKind::ALL {
            let mut view = ViewProperties::new();
            kind.apply(&mut view, 42.0);
            assert_eq!(view.get(kind), 42.0, "{kind}");

            let mut expected = ViewProperties::new();
            match kind {
                AnimationKind::TranslateX => expected.translation_x = 42.0,
                AnimationKind::TranslateY => expected.translation_y = 42.0,
                AnimationKind::RotateX => expected.rotation_x = 42.0,
                AnimationKind::RotateY => expected.rotation_y = 42.0,
                AnimationKind::Rotation => expected.rotation = 42.0,
                AnimationKind::ScaleX => expected.scale_x = 42.0,
                AnimationKind::ScaleY => expected.scale_y = 42.0,
                AnimationKind::ScaleXY => {
                    expected.scale_x = 42.0;
                    expected.scale_y = 42.0;
                }
                AnimationKind::Alpha => expected.alpha = 42.0,
            }
            assert_eq!(view, expected, "{kind} touched another property");
        }
    }

    #[test]
    fn test_motion_is_linear_for_every_kind() {
        for kind in AnimationKind::ALL {
            let motion = PropertyMotion::new(kind, -20.0, 80.0);
            for p in [0.0, 0.25, 0.5, 0.75, 1.0] {
                let mut view = ViewProperties::new();
                motion.apply_progress(&mut view, p);
                let expected = -20.0 + p as f32 * 100.0;
                assert!((view.get(kind) - expected).abs() < 1e-4, "{kind} at {p}");
            }
        }
    }

    #[test]
    fn test_overshoot_maps_past_end() {
        let motion = PropertyMotion::new(AnimationKind::Alpha, 0.0, 1.0);
        assert!((motion.value_at(1.1) - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_map_range() {
        assert_eq!(map_range(0.5, 0.0, 1.0, 1000.0, 0.0), 500.0);
        assert_eq!(map_range(0.0, 0.0, 1.0, -500.0, 0.0), -500.0);
        assert_eq!(map_range(1.0, 0.0, 1.0, 500.0, 0.0), 0.0);
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("scale_xy".parse(), Ok(AnimationKind::ScaleXY));
        assert_eq!("Translate-Y".parse(), Ok(AnimationKind::TranslateY));
        assert_eq!(
            "wobble".parse::<AnimationKind>(),
            Err(SpringError::UnknownKind("wobble".to_string()))
        );
        for kind in AnimationKind::ALL {
            assert_eq!(kind.name().parse(), Ok(kind));
        }
    }
}
