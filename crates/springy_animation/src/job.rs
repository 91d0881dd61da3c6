//! Element animation jobs
//!
//! A job binds one element, one [`PropertyMotion`] and one spring
//! configuration. It is handed to the scheduler, which creates the
//! simulation once the pre-start delay has elapsed and feeds every
//! [`SpringEvent`] back through [`ElementAnimationJob::handle`].

use crate::kind::PropertyMotion;
use crate::sink::ElementRef;
use crate::spring::{Simulation, SpringConfig, SpringEvent, SpringSystem};
use std::sync::Arc;

/// Lifecycle callbacks for a spring animation
///
/// Every method defaults to a no-op.
pub trait SpringyListener: Send + Sync {
    /// The simulation became active
    fn on_spring_start(&self) {}

    /// The simulation came to rest
    fn on_spring_stop(&self) {}

    /// The simulation settled at its target
    fn on_spring_end_state_change(&self) {}

    /// The element went away before the spring settled
    ///
    /// No further callbacks follow for this animation.
    fn on_spring_abandoned(&self) {}
}

type Callback = Box<dyn Fn() + Send + Sync>;

/// [`SpringyListener`] built from closures
#[derive(Default)]
pub struct CallbackListener {
    on_start: Option<Callback>,
    on_stop: Option<Callback>,
}

impl CallbackListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_start<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_start = Some(Box::new(f));
        self
    }

    pub fn on_stop<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_stop = Some(Box::new(f));
        self
    }
}

impl SpringyListener for CallbackListener {
    fn on_spring_start(&self) {
        if let Some(ref f) = self.on_start {
            f();
        }
    }

    fn on_spring_stop(&self) {
        if let Some(ref f) = self.on_stop {
            f();
        }
    }
}

/// Outcome of feeding one event to a job
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum JobStatus {
    Running,
    Finished,
}

/// One spring animation bound to one element
pub struct ElementAnimationJob {
    element: ElementRef,
    motion: PropertyMotion,
    config: SpringConfig,
    system: Arc<dyn SpringSystem>,
    /// Mark the element visible on every update
    reveal: bool,
    listener: Option<Arc<dyn SpringyListener>>,
    started: bool,
    stopped: bool,
    abandoned: bool,
}

impl ElementAnimationJob {
    pub fn new(
        element: ElementRef,
        motion: PropertyMotion,
        config: SpringConfig,
        system: Arc<dyn SpringSystem>,
    ) -> Self {
        Self {
            element,
            motion,
            config,
            system,
            reveal: false,
            listener: None,
            started: false,
            stopped: false,
            abandoned: false,
        }
    }

    pub fn revealing(mut self, reveal: bool) -> Self {
        self.reveal = reveal;
        self
    }

    pub fn with_listener(mut self, listener: Option<Arc<dyn SpringyListener>>) -> Self {
        self.listener = listener;
        self
    }

    pub fn motion(&self) -> PropertyMotion {
        self.motion
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }

    /// Write the start value into the element
    pub fn apply_start_pose(&self) -> bool {
        let motion = self.motion;
        self.element.write(|sink| motion.apply_start(sink))
    }

    /// Create the simulation and aim it at 1.0
    ///
    /// Returns `None` when the element is already gone, in which case the
    /// job is dropped without ever writing.
    pub(crate) fn activate(&mut self) -> Option<Box<dyn Simulation>> {
        if !self.element.is_alive() {
            tracing::debug!("Skipping spring start for dropped {} element", self.motion.kind);
            self.abandon();
            return None;
        }

        let mut simulation = self.system.create_simulation();
        simulation.set_config(self.config);
        simulation.set_target(1.0);
        tracing::debug!(
            "Spring started: {} {} -> {} (stiffness={}, damping={}, ratio={:.2})",
            self.motion.kind,
            self.motion.from,
            self.motion.to,
            self.config.stiffness,
            self.config.damping,
            self.config.damping_ratio()
        );
        Some(simulation)
    }

    pub(crate) fn handle(&mut self, event: SpringEvent, progress: f64) -> JobStatus {
        if self.abandoned {
            return JobStatus::Finished;
        }

        match event {
            SpringEvent::Activate => {
                if !self.started {
                    self.started = true;
                    if let Some(ref listener) = self.listener {
                        listener.on_spring_start();
                    }
                }
            }
            SpringEvent::Update => {
                let motion = self.motion;
                let reveal = self.reveal;
                let written = self.element.write(|sink| {
                    if reveal {
                        sink.set_visible(true);
                    }
                    motion.apply_progress(sink, progress);
                });
                if !written {
                    tracing::debug!("Element dropped mid-animation, releasing spring");
                    self.abandon();
                    return JobStatus::Finished;
                }
                tracing::trace!("{} = {}", motion.kind, motion.value_at(progress));
            }
            SpringEvent::Rest => {
                if self.started && !self.stopped {
                    self.stopped = true;
                    if let Some(ref listener) = self.listener {
                        listener.on_spring_stop();
                    }
                }
            }
            SpringEvent::EndStateChange => {
                if let Some(ref listener) = self.listener {
                    listener.on_spring_end_state_change();
                }
            }
        }

        if self.stopped {
            JobStatus::Finished
        } else {
            JobStatus::Running
        }
    }

    fn abandon(&mut self) {
        if self.abandoned {
            return;
        }
        self.abandoned = true;
        if let Some(ref listener) = self.listener {
            listener.on_spring_abandoned();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::AnimationKind;
    use crate::sink::ViewProperties;
    use crate::spring::PhysicsSpringSystem;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn job_for(view: &Arc<parking_lot::Mutex<ViewProperties>>) -> ElementAnimationJob {
        ElementAnimationJob::new(
            ElementRef::new(view),
            PropertyMotion::new(AnimationKind::Alpha, 0.0, 1.0),
            SpringConfig::default(),
            Arc::new(PhysicsSpringSystem::new()),
        )
    }

    #[test]
    fn test_update_writes_mapped_value() {
        let view = ViewProperties::hidden().shared();
        let mut job = job_for(&view);

        assert_eq!(job.handle(SpringEvent::Update, 0.5), JobStatus::Running);

        let props = view.lock();
        assert_eq!(props.alpha, 0.5);
        assert!(!props.visible);
    }

    #[test]
    fn test_revealing_job_marks_visible() {
        let view = ViewProperties::hidden().shared();
        let mut job = job_for(&view).revealing(true);

        job.handle(SpringEvent::Update, 0.1);
        assert!(view.lock().visible);
    }

    #[test]
    fn test_start_and_stop_fire_once() {
        let starts = Arc::new(AtomicUsize::new(0));
        let stops = Arc::new(AtomicUsize::new(0));
        let listener = {
            let starts = starts.clone();
            let stops = stops.clone();
            CallbackListener::new()
                .on_start(move || {
                    starts.fetch_add(1, Ordering::SeqCst);
                })
                .on_stop(move || {
                    stops.fetch_add(1, Ordering::SeqCst);
                })
        };
        let view = ViewProperties::new().shared();
        let mut job = job_for(&view).with_listener(Some(Arc::new(listener)));

        job.handle(SpringEvent::Activate, 0.0);
        job.handle(SpringEvent::Activate, 0.0);
        assert_eq!(job.handle(SpringEvent::Rest, 1.0), JobStatus::Finished);
        job.handle(SpringEvent::Rest, 1.0);

        assert_eq!(starts.load(Ordering::SeqCst), 1);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_rest_before_start_is_ignored() {
        let view = ViewProperties::new().shared();
        let mut job = job_for(&view);

        assert_eq!(job.handle(SpringEvent::Rest, 0.0), JobStatus::Running);
    }

    #[test]
    fn test_dropped_element_finishes_job() {
        let view = ViewProperties::new().shared();
        let mut job = job_for(&view);
        drop(view);

        assert!(job.activate().is_none());
        assert_eq!(job.handle(SpringEvent::Update, 0.5), JobStatus::Finished);
    }

    #[derive(Default)]
    struct AbandonCounter {
        abandoned: AtomicUsize,
        other: AtomicUsize,
    }

    impl SpringyListener for AbandonCounter {
        fn on_spring_start(&self) {
            self.other.fetch_add(1, Ordering::SeqCst);
        }

        fn on_spring_stop(&self) {
            self.other.fetch_add(1, Ordering::SeqCst);
        }

        fn on_spring_abandoned(&self) {
            self.abandoned.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_abandoned_once_when_element_dropped_mid_animation() {
        let view = ViewProperties::new().shared();
        let counter = Arc::new(AbandonCounter::default());
        let listener: Arc<dyn SpringyListener> = counter.clone();
        let mut job = job_for(&view).with_listener(Some(listener));

        assert!(job.activate().is_some());
        assert_eq!(job.handle(SpringEvent::Activate, 0.0), JobStatus::Running);
        drop(view);

        assert_eq!(job.handle(SpringEvent::Update, 0.5), JobStatus::Finished);
        assert_eq!(job.handle(SpringEvent::Rest, 1.0), JobStatus::Finished);
        assert_eq!(job.handle(SpringEvent::Update, 1.0), JobStatus::Finished);

        assert_eq!(counter.abandoned.load(Ordering::SeqCst), 1);
        // Only the start fired; no stop after abandoning
        assert_eq!(counter.other.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_abandoned_when_element_dropped_before_start() {
        let view = ViewProperties::new().shared();
        let counter = Arc::new(AbandonCounter::default());
        let listener: Arc<dyn SpringyListener> = counter.clone();
        let mut job = job_for(&view).with_listener(Some(listener));
        drop(view);

        assert!(job.activate().is_none());
        assert_eq!(counter.abandoned.load(Ordering::SeqCst), 1);
        assert_eq!(counter.other.load(Ordering::SeqCst), 0);
    }
}
