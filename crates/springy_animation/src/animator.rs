//! Single-element spring animator
//!
//! Drives one property of one element from a start value to an end value
//! with a spring, optionally after a delay.
//!
//! ```ignore
//! let scheduler = AnimationScheduler::new();
//! let view = ViewProperties::hidden().shared();
//!
//! SingleElementSpringAnimator::new(scheduler.handle(), AnimationKind::TranslateY, 400.0, 0.0)
//!     .with_delay(Duration::from_millis(250))
//!     .start(&view);
//!
//! while scheduler.advance(Duration::from_millis(16)) {}
//! ```

use crate::config::AnimatorConfig;
use crate::error::Result;
use crate::job::{ElementAnimationJob, SpringyListener};
use crate::kind::{AnimationKind, PropertyMotion};
use crate::scheduler::{JobId, SchedulerHandle};
use crate::sink::{ElementRef, PropertySink};
use crate::spring::{PhysicsSpringSystem, SpringConfig, SpringParameters, SpringSystem};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Designer-scale defaults for single-element animations
pub const DEFAULT_PARAMETERS: SpringParameters = SpringParameters::from_validated(40.0, 7.0);

/// Animates one property of one element with a spring
///
/// Parameters are read on the Origami designer scale. The animator can be
/// started any number of times; every start is an independent job.
pub struct SingleElementSpringAnimator {
    kind: AnimationKind,
    start_value: f32,
    end_value: f32,
    parameters: SpringParameters,
    delay: Duration,
    listener: Option<Arc<dyn SpringyListener>>,
    system: Arc<dyn SpringSystem>,
    scheduler: SchedulerHandle,
}

impl SingleElementSpringAnimator {
    /// Animator with the default tension and friction
    pub fn new(
        scheduler: SchedulerHandle,
        kind: AnimationKind,
        start_value: f32,
        end_value: f32,
    ) -> Self {
        Self::with_parameters(scheduler, kind, DEFAULT_PARAMETERS, start_value, end_value)
    }

    pub fn with_parameters(
        scheduler: SchedulerHandle,
        kind: AnimationKind,
        parameters: SpringParameters,
        start_value: f32,
        end_value: f32,
    ) -> Self {
        Self {
            kind,
            start_value,
            end_value,
            parameters,
            delay: Duration::ZERO,
            listener: None,
            system: Arc::new(PhysicsSpringSystem::new()),
            scheduler,
        }
    }

    pub fn from_config(scheduler: SchedulerHandle, config: &AnimatorConfig) -> Result<Self> {
        let parameters = SpringParameters::new(config.tension, config.friction)?;
        Ok(
            Self::with_parameters(scheduler, config.kind, parameters, config.from, config.to)
                .with_delay(Duration::from_millis(config.delay_ms)),
        )
    }

    /// Replace the spring system simulations are created from
    pub fn with_system(mut self, system: Arc<dyn SpringSystem>) -> Self {
        self.system = system;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.set_delay(delay);
        self
    }

    pub fn with_listener<L: SpringyListener + 'static>(mut self, listener: L) -> Self {
        self.set_listener(listener);
        self
    }

    /// Delay between `start` and the spring actually moving
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Register the lifecycle listener, replacing any previous one
    pub fn set_listener<L: SpringyListener + 'static>(&mut self, listener: L) {
        self.listener = Some(Arc::new(listener));
    }

    pub fn kind(&self) -> AnimationKind {
        self.kind
    }

    pub fn start_value(&self) -> f32 {
        self.start_value
    }

    pub fn end_value(&self) -> f32 {
        self.end_value
    }

    pub fn parameters(&self) -> SpringParameters {
        self.parameters
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Put `element` in its start pose and schedule the spring
    ///
    /// The start value is written immediately; the spring is created once
    /// the delay elapses, and every update also marks the element visible.
    /// Returns `None` if the scheduler is gone.
    pub fn start<S>(&self, element: &Arc<Mutex<S>>) -> Option<JobId>
    where
        S: PropertySink + Send + 'static,
    {
        let job = ElementAnimationJob::new(
            ElementRef::new(element),
            PropertyMotion::new(self.kind, self.start_value, self.end_value),
            SpringConfig::from_origami(self.parameters),
            self.system.clone(),
        )
        .revealing(true)
        .with_listener(self.listener.clone());

        job.apply_start_pose();
        self.scheduler.schedule(self.delay, job)
    }
}
