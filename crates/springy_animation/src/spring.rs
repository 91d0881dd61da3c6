//! Spring physics simulation
//!
//! RK4-integrated damped spring that drives a normalized progress value
//! from 0 toward 1. Animators only talk to the [`Simulation`] and
//! [`SpringSystem`] traits, so any integrator can be plugged in; the
//! [`PhysicsSpringSystem`] below is the default one.

use crate::error::{Result, SpringError};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Displacement and speed below which a spring counts as settled
pub const DEFAULT_REST_THRESHOLD: f64 = 0.005;

/// Longest frame delta fed to the integrator, in seconds
const MAX_FRAME_DELTA: f64 = 0.064;

/// Tension/friction pair describing a spring's response curve
///
/// Both values are finite and strictly positive. How they translate into
/// physical stiffness and damping is decided by the consumer, see
/// [`SpringConfig::from_parameters`] and [`SpringConfig::from_origami`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawParameters")]
pub struct SpringParameters {
    tension: f64,
    friction: f64,
}

#[derive(Deserialize)]
struct RawParameters {
    tension: f64,
    friction: f64,
}

impl TryFrom<RawParameters> for SpringParameters {
    type Error = SpringError;

    fn try_from(raw: RawParameters) -> Result<Self> {
        Self::new(raw.tension, raw.friction)
    }
}

impl SpringParameters {
    /// Create validated spring parameters
    pub fn new(tension: f64, friction: f64) -> Result<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(tension) || !valid(friction) {
            return Err(SpringError::InvalidParameters { tension, friction });
        }
        Ok(Self { tension, friction })
    }

    /// For compile-time defaults already known to be valid
    pub(crate) const fn from_validated(tension: f64, friction: f64) -> Self {
        Self { tension, friction }
    }

    pub fn tension(&self) -> f64 {
        self.tension
    }

    pub fn friction(&self) -> f64 {
        self.friction
    }

    /// Same friction with the tension scaled by `factor`
    ///
    /// Non-positive factors leave the parameters unchanged.
    pub fn with_tension_scaled(self, factor: f64) -> Self {
        if !(factor.is_finite() && factor > 0.0) {
            return self;
        }
        Self {
            tension: self.tension * factor,
            friction: self.friction,
        }
    }
}

/// Physical configuration consumed by a simulation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringConfig {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
}

impl SpringConfig {
    /// Create a new spring configuration
    pub fn new(stiffness: f64, damping: f64, mass: f64) -> Self {
        Self {
            stiffness,
            damping,
            mass,
        }
    }

    /// Use tension as stiffness and friction as damping, unit mass
    pub fn from_parameters(parameters: SpringParameters) -> Self {
        Self::new(parameters.tension, parameters.friction, 1.0)
    }

    /// Interpret the parameters on the Origami designer scale
    ///
    /// Designer values are remapped linearly onto physical ones; a zero
    /// designer value stays zero.
    pub fn from_origami(parameters: SpringParameters) -> Self {
        Self::new(
            origami_tension(parameters.tension),
            origami_friction(parameters.friction),
            1.0,
        )
    }

    /// Damping ratio (< 1.0 oscillates, 1.0 is critical, > 1.0 is sluggish)
    pub fn damping_ratio(&self) -> f64 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }

    /// Check if this spring will overshoot its target
    pub fn is_underdamped(&self) -> bool {
        self.damping_ratio() < 1.0
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::new(230.2, 22.0, 1.0)
    }
}

fn origami_tension(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        (value - 30.0) * 3.62 + 194.0
    }
}

fn origami_friction(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        (value - 8.0) * 3.0 + 25.0
    }
}

/// Notification raised by a simulation while it advances
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpringEvent {
    /// Left rest and started moving toward a new target
    Activate,
    /// Value changed this step
    Update,
    /// Came to rest
    Rest,
    /// Settled at the current target; raised once per target
    EndStateChange,
}

/// Events raised during a single step, in firing order
pub type SpringEvents = SmallVec<[SpringEvent; 4]>;

/// A running numeric simulation
pub trait Simulation: Send {
    fn set_config(&mut self, config: SpringConfig);

    fn set_target(&mut self, target: f64);

    fn current_value(&self) -> f64;

    /// Advance by `dt` seconds and report what happened
    fn advance(&mut self, dt: f64) -> SpringEvents;
}

/// Factory for simulations
///
/// Implementations hold no per-simulation state and may be shared between
/// any number of jobs.
pub trait SpringSystem: Send + Sync {
    fn create_simulation(&self) -> Box<dyn Simulation>;
}

/// Default [`SpringSystem`] producing RK4 [`Spring`]s starting at 0
#[derive(Clone, Copy, Debug)]
pub struct PhysicsSpringSystem {
    rest_threshold: f64,
}

impl PhysicsSpringSystem {
    pub fn new() -> Self {
        Self {
            rest_threshold: DEFAULT_REST_THRESHOLD,
        }
    }

    /// Override the settle threshold handed to every new spring
    pub fn with_rest_threshold(mut self, threshold: f64) -> Self {
        self.rest_threshold = threshold;
        self
    }
}

impl Default for PhysicsSpringSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl SpringSystem for PhysicsSpringSystem {
    fn create_simulation(&self) -> Box<dyn Simulation> {
        Box::new(Spring::new(SpringConfig::default(), 0.0).with_rest_threshold(self.rest_threshold))
    }
}

/// A spring-based animation value
#[derive(Clone, Debug)]
pub struct Spring {
    config: SpringConfig,
    value: f64,
    velocity: f64,
    target: f64,
    rest_threshold: f64,
    at_rest: bool,
    end_state_reported: bool,
}

impl Spring {
    /// Create a spring resting at `initial`
    pub fn new(config: SpringConfig, initial: f64) -> Self {
        Self {
            config,
            value: initial,
            velocity: 0.0,
            target: initial,
            rest_threshold: DEFAULT_REST_THRESHOLD,
            at_rest: true,
            end_state_reported: true,
        }
    }

    pub fn with_rest_threshold(mut self, threshold: f64) -> Self {
        self.rest_threshold = threshold;
        self
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }

    /// Check if the spring has settled (within threshold of target with minimal velocity)
    pub fn is_settled(&self) -> bool {
        (self.value - self.target).abs() < self.rest_threshold
            && self.velocity.abs() < self.rest_threshold
    }

    /// Step the spring simulation using RK4 integration
    pub fn step(&mut self, dt: f64) {
        if self.is_settled() {
            self.value = self.target;
            self.velocity = 0.0;
            return;
        }

        let k1_v = self.acceleration(self.value, self.velocity);
        let k1_x = self.velocity;

        let k2_v = self.acceleration(
            self.value + k1_x * dt * 0.5,
            self.velocity + k1_v * dt * 0.5,
        );
        let k2_x = self.velocity + k1_v * dt * 0.5;

        let k3_v = self.acceleration(
            self.value + k2_x * dt * 0.5,
            self.velocity + k2_v * dt * 0.5,
        );
        let k3_x = self.velocity + k2_v * dt * 0.5;

        let k4_v = self.acceleration(self.value + k3_x * dt, self.velocity + k3_v * dt);
        let k4_x = self.velocity + k3_v * dt;

        self.velocity += (k1_v + 2.0 * k2_v + 2.0 * k3_v + k4_v) * dt / 6.0;
        self.value += (k1_x + 2.0 * k2_x + 2.0 * k3_x + k4_x) * dt / 6.0;
    }

    fn acceleration(&self, x: f64, v: f64) -> f64 {
        let spring_force = -self.config.stiffness * (x - self.target);
        let damping_force = -self.config.damping * v;
        (spring_force + damping_force) / self.config.mass
    }
}

impl Simulation for Spring {
    fn set_config(&mut self, config: SpringConfig) {
        self.config = config;
    }

    fn set_target(&mut self, target: f64) {
        if target == self.target {
            return;
        }
        self.target = target;
        self.end_state_reported = false;
    }

    fn current_value(&self) -> f64 {
        self.value
    }

    fn advance(&mut self, dt: f64) -> SpringEvents {
        let mut events = SpringEvents::new();

        if self.at_rest {
            if self.end_state_reported {
                return events;
            }
            self.at_rest = false;
            events.push(SpringEvent::Activate);
        }

        self.step(dt.clamp(0.0, MAX_FRAME_DELTA));
        if self.is_settled() {
            self.value = self.target;
            self.velocity = 0.0;
        }
        events.push(SpringEvent::Update);

        if self.is_settled() {
            self.at_rest = true;
            events.push(SpringEvent::Rest);
            if !self.end_state_reported {
                self.end_state_reported = true;
                events.push(SpringEvent::EndStateChange);
            }
        }

        events
    }
}
