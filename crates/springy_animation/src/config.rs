//! Animation configuration presets
//!
//! Serializable descriptions of an animator or a list coordinator, so
//! hosts can keep them in TOML/JSON next to the rest of their settings.
//! Validation happens when the config is turned into a live component.

use crate::kind::AnimationKind;
use crate::list::EntranceStyle;
use serde::{Deserialize, Serialize};

/// Configuration for a single-element animation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimatorConfig {
    pub kind: AnimationKind,
    /// Start value, in the units of `kind`
    pub from: f32,
    /// End value, in the units of `kind`
    pub to: f32,
    /// Designer-scale tension
    #[serde(default = "default_animator_tension")]
    pub tension: f64,
    /// Designer-scale friction
    #[serde(default = "default_animator_friction")]
    pub friction: f64,
    /// Delay before the spring starts (ms)
    #[serde(default)]
    pub delay_ms: u64,
}

fn default_animator_tension() -> f64 {
    crate::animator::DEFAULT_PARAMETERS.tension()
}

fn default_animator_friction() -> f64 {
    crate::animator::DEFAULT_PARAMETERS.friction()
}

impl AnimatorConfig {
    pub fn new(kind: AnimationKind, from: f32, to: f32) -> Self {
        Self {
            kind,
            from,
            to,
            tension: default_animator_tension(),
            friction: default_animator_friction(),
            delay_ms: 0,
        }
    }

    /// Fade from transparent to opaque.
    pub fn fade_in() -> Self {
        Self::new(AnimationKind::Alpha, 0.0, 1.0)
    }

    /// Grow from nothing to full size.
    pub fn pop_in() -> Self {
        Self::new(AnimationKind::ScaleXY, 0.0, 1.0)
    }

    /// Set the spring tension and friction.
    pub fn with_spring(mut self, tension: f64, friction: f64) -> Self {
        self.tension = tension;
        self.friction = friction;
        self
    }

    /// Set the start delay.
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

/// Configuration for a staggered list entrance
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListStaggerConfig {
    pub style: EntranceStyle,
    /// Delay before the first item starts (ms)
    pub initial_delay_ms: u64,
    /// Extra delay added for every following item of the first batch (ms)
    pub item_gap_ms: u64,
    /// Raw spring tension
    pub tension: f64,
    /// Raw spring friction
    pub friction: f64,
}

impl Default for ListStaggerConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl ListStaggerConfig {
    /// Standard configuration: slide up from the bottom edge.
    pub fn standard() -> Self {
        Self {
            style: EntranceStyle::SlideFromBottom,
            initial_delay_ms: crate::list::DEFAULT_INITIAL_DELAY.as_millis() as u64,
            item_gap_ms: crate::list::DEFAULT_ITEM_GAP.as_millis() as u64,
            tension: crate::list::DEFAULT_PARAMETERS.tension(),
            friction: crate::list::DEFAULT_PARAMETERS.friction(),
        }
    }

    /// Set the entrance style.
    pub fn with_style(mut self, style: EntranceStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the initial delay.
    pub fn with_initial_delay_ms(mut self, delay_ms: u64) -> Self {
        self.initial_delay_ms = delay_ms;
        self
    }

    /// Set the per-item gap.
    pub fn with_item_gap_ms(mut self, gap_ms: u64) -> Self {
        self.item_gap_ms = gap_ms;
        self
    }

    /// Set the spring tension and friction.
    pub fn with_spring(mut self, tension: f64, friction: f64) -> Self {
        self.tension = tension;
        self.friction = friction;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_defaults() {
        let config = ListStaggerConfig::default();
        assert_eq!(config.style, EntranceStyle::SlideFromBottom);
        assert_eq!(config.initial_delay_ms, 100);
        assert_eq!(config.item_gap_ms, 100);
        assert_eq!((config.tension, config.friction), (200.0, 20.0));
    }

    #[test]
    fn test_list_config_from_partial_toml() {
        let config: ListStaggerConfig = toml::from_str(
            r#"
            style = "slide_from_left"
            item_gap_ms = 40
            "#,
        )
        .unwrap();

        assert_eq!(config.style, EntranceStyle::SlideFromLeft);
        assert_eq!(config.item_gap_ms, 40);
        assert_eq!(config.initial_delay_ms, 100);
        assert_eq!(config.tension, 200.0);
    }

    #[test]
    fn test_animator_config_from_toml() {
        let config: AnimatorConfig = toml::from_str(
            r#"
            kind = "scale_xy"
            from = 0.0
            to = 1.5
            delay_ms = 80
            "#,
        )
        .unwrap();

        assert_eq!(
            config,
            AnimatorConfig::new(AnimationKind::ScaleXY, 0.0, 1.5).with_delay_ms(80)
        );
        assert_eq!((config.tension, config.friction), (40.0, 7.0));
    }

    #[test]
    fn test_unknown_style_rejected() {
        let result: Result<ListStaggerConfig, _> = toml::from_str(r#"style = "spin""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_presets() {
        assert_eq!(AnimatorConfig::fade_in().kind, AnimationKind::Alpha);
        let pop = AnimatorConfig::pop_in();
        assert_eq!((pop.kind, pop.from, pop.to), (AnimationKind::ScaleXY, 0.0, 1.0));
    }
}
