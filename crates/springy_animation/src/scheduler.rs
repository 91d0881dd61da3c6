//! Animation scheduler
//!
//! The execution context every animation runs on. Jobs are submitted with
//! a pre-start delay through a [`SchedulerHandle`] and then move through
//! a small state machine driven by the clock and by simulation events:
//!
//! - `Pending(due)` until the clock reaches `due`
//! - `Active(simulation)` while the spring moves
//! - `Settled` once it comes to rest, after which the job is released
//!
//! The clock only moves when [`AnimationScheduler::advance`] (or the
//! wall-clock [`AnimationScheduler::tick`]) is called. Job callbacks run
//! with the scheduler lock released, so listeners are free to schedule
//! more work.

use crate::job::{ElementAnimationJob, JobStatus};
use crate::spring::Simulation;
use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

new_key_type! {
    /// Handle to a scheduled animation job
    pub struct JobId;
}

enum JobState {
    Pending { due: Duration },
    Active { simulation: Box<dyn Simulation> },
    Settled,
}

struct ScheduledJob {
    /// Submission order, breaks ties between equal due times
    seq: u64,
    state: JobState,
    job: ElementAnimationJob,
}

impl ScheduledJob {
    fn sort_key(&self) -> (Duration, u64) {
        match self.state {
            JobState::Pending { due } => (due, self.seq),
            _ => (Duration::ZERO, self.seq),
        }
    }

    /// Drive the job across the window `[start, end]` of the clock
    fn drive(&mut self, start: Duration, end: Duration) {
        let elapsed = match self.state {
            JobState::Pending { due } if due > end => return,
            JobState::Pending { due } => match self.job.activate() {
                Some(simulation) => {
                    self.state = JobState::Active { simulation };
                    end - due.max(start)
                }
                None => {
                    self.state = JobState::Settled;
                    return;
                }
            },
            JobState::Active { .. } => end - start,
            JobState::Settled => return,
        };

        let JobState::Active { ref mut simulation } = self.state else {
            return;
        };
        let events = simulation.advance(elapsed.as_secs_f64());
        let progress = simulation.current_value();

        let mut finished = false;
        for event in events {
            if self.job.handle(event, progress) == JobStatus::Finished {
                finished = true;
            }
        }
        if finished {
            self.state = JobState::Settled;
        }
    }
}

/// Internal state of the animation scheduler
struct SchedulerInner {
    /// `None` while a job is being driven outside the lock
    jobs: SlotMap<JobId, Option<ScheduledJob>>,
    now: Duration,
    next_seq: u64,
    last_frame: Instant,
}

impl SchedulerInner {
    fn count(&self, pred: impl Fn(&JobState) -> bool) -> usize {
        self.jobs
            .values()
            .filter(|slot| slot.as_ref().is_some_and(|job| pred(&job.state)))
            .count()
    }
}

/// The scheduler that owns and ticks all animation jobs
///
/// This is typically held by whatever owns the view tree; components get a
/// [`SchedulerHandle`] to submit work.
pub struct AnimationScheduler {
    inner: Arc<Mutex<SchedulerInner>>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SchedulerInner {
                jobs: SlotMap::with_key(),
                now: Duration::ZERO,
                next_seq: 0,
                last_frame: Instant::now(),
            })),
        }
    }

    /// Get a handle to this scheduler for passing to components
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Current reading of the scheduler clock
    pub fn now(&self) -> Duration {
        self.inner.lock().now
    }

    /// Advance by the wall-clock time since the previous tick
    ///
    /// Returns true if any job still needs ticking.
    pub fn tick(&self) -> bool {
        let dt = {
            let mut inner = self.inner.lock();
            let now = Instant::now();
            let dt = now - inner.last_frame;
            inner.last_frame = now;
            dt
        };
        self.advance(dt)
    }

    /// Move the clock forward by `dt` and drive every job
    ///
    /// Pending jobs whose delay elapses inside this window start in order of
    /// due time, then submission order, and are integrated only for the part
    /// of the window after they became due. Returns true if any job still
    /// needs ticking.
    pub fn advance(&self, dt: Duration) -> bool {
        let (start, end, mut batch) = {
            let mut inner = self.inner.lock();
            let start = inner.now;
            inner.now = inner.now.saturating_add(dt);
            let batch: Vec<(JobId, ScheduledJob)> = inner
                .jobs
                .iter_mut()
                .filter_map(|(id, slot)| slot.take().map(|job| (id, job)))
                .collect();
            (start, inner.now, batch)
        };

        batch.sort_by_key(|(_, job)| job.sort_key());
        for (_, job) in batch.iter_mut() {
            job.drive(start, end);
        }

        let mut inner = self.inner.lock();
        for (id, job) in batch {
            if matches!(job.state, JobState::Settled) {
                inner.jobs.remove(id);
            } else if let Some(slot) = inner.jobs.get_mut(id) {
                *slot = Some(job);
            }
        }
        !inner.jobs.is_empty()
    }

    /// Check if any job is waiting or running
    pub fn has_active_animations(&self) -> bool {
        !self.inner.lock().jobs.is_empty()
    }

    /// Number of jobs still waiting on their delay
    pub fn pending_count(&self) -> usize {
        self.inner
            .lock()
            .count(|state| matches!(state, JobState::Pending { .. }))
    }

    /// Number of jobs with a running simulation
    pub fn active_count(&self) -> usize {
        self.inner
            .lock()
            .count(|state| matches!(state, JobState::Active { .. }))
    }

    /// Number of jobs not yet released
    pub fn job_count(&self) -> usize {
        self.inner.lock().jobs.len()
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// A weak handle to the animation scheduler
///
/// It won't keep the scheduler alive; once the scheduler is dropped every
/// operation is a no-op.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<Mutex<SchedulerInner>>,
}

impl SchedulerHandle {
    /// Submit `job` to start once `delay` has elapsed on the scheduler clock
    ///
    /// Fire-and-forget: there is no way to cancel a submitted job. Returns
    /// `None` if the scheduler is gone.
    pub fn schedule(&self, delay: Duration, job: ElementAnimationJob) -> Option<JobId> {
        let inner = self.inner.upgrade()?;
        let mut inner = inner.lock();
        let due = inner.now.saturating_add(delay);
        let seq = inner.next_seq;
        inner.next_seq += 1;
        Some(inner.jobs.insert(Some(ScheduledJob {
            seq,
            state: JobState::Pending { due },
            job,
        })))
    }

    /// Check if `id` has not been released yet
    pub fn is_scheduled(&self, id: JobId) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|inner| inner.lock().jobs.contains_key(id))
    }

    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::CallbackListener;
    use crate::kind::{AnimationKind, PropertyMotion};
    use crate::sink::{ElementRef, ViewProperties};
    use crate::spring::{PhysicsSpringSystem, SpringConfig, SpringSystem};
    use crate::testing::ScriptedSpringSystem;

    const FRAME: Duration = Duration::from_millis(16);

    fn job(
        view: &Arc<Mutex<ViewProperties>>,
        kind: AnimationKind,
        system: Arc<dyn SpringSystem>,
    ) -> ElementAnimationJob {
        ElementAnimationJob::new(
            ElementRef::new(view),
            PropertyMotion::new(kind, 0.0, 100.0),
            SpringConfig::default(),
            system,
        )
    }

    #[test]
    fn test_job_waits_for_delay() {
        let scheduler = AnimationScheduler::new();
        let system = Arc::new(ScriptedSpringSystem::new(vec![0.5, 1.0]));
        let view = ViewProperties::new().shared();

        scheduler.handle().schedule(
            Duration::from_millis(100),
            job(&view, AnimationKind::TranslateX, system.clone()),
        );
        assert_eq!(scheduler.pending_count(), 1);

        scheduler.advance(Duration::from_millis(99));
        assert_eq!(scheduler.pending_count(), 1);
        assert_eq!(system.created(), 0);
        assert_eq!(view.lock().translation_x, 0.0);

        scheduler.advance(Duration::from_millis(1));
        assert_eq!(scheduler.active_count(), 1);
        assert_eq!(system.created(), 1);
        assert_eq!(view.lock().translation_x, 50.0);

        assert!(!scheduler.advance(FRAME));
        assert_eq!(view.lock().translation_x, 100.0);
        assert_eq!(scheduler.job_count(), 0);
    }

    #[test]
    fn test_jobs_start_in_due_order() {
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle();
        let system = Arc::new(ScriptedSpringSystem::new(vec![1.0]));
        let order = Arc::new(Mutex::new(Vec::new()));
        let view = ViewProperties::new().shared();

        for (label, delay_ms) in [("late", 30), ("early", 10), ("tied", 10)] {
            let order = order.clone();
            let listener = CallbackListener::new().on_start(move || order.lock().push(label));
            handle.schedule(
                Duration::from_millis(delay_ms),
                job(&view, AnimationKind::TranslateX, system.clone())
                    .with_listener(Some(Arc::new(listener))),
            );
        }

        scheduler.advance(Duration::from_millis(50));

        assert_eq!(*order.lock(), vec!["early", "tied", "late"]);
        assert_eq!(system.created(), 3);
        assert_eq!(view.lock().translation_x, 100.0);
    }

    #[test]
    fn test_listener_may_schedule_more_work() {
        let scheduler = AnimationScheduler::new();
        let handle = scheduler.handle();
        let system = Arc::new(ScriptedSpringSystem::new(vec![1.0]));
        let first = ViewProperties::new().shared();
        let second = ViewProperties::new().shared();

        let follow_up = Mutex::new(Some(job(&second, AnimationKind::ScaleXY, system.clone())));
        let chained = handle.clone();
        let listener = CallbackListener::new().on_stop(move || {
            if let Some(next) = follow_up.lock().take() {
                chained.schedule(Duration::ZERO, next);
            }
        });
        handle.schedule(
            Duration::ZERO,
            job(&first, AnimationKind::Alpha, system.clone()).with_listener(Some(Arc::new(listener))),
        );

        assert!(scheduler.advance(FRAME));
        assert_eq!(first.lock().alpha, 100.0);
        assert_eq!(scheduler.pending_count(), 1);

        assert!(!scheduler.advance(FRAME));
        assert_eq!(second.lock().scale_x, 100.0);
        assert_eq!(second.lock().scale_y, 100.0);
    }

    #[test]
    fn test_job_integrates_only_after_due() {
        let scheduler = AnimationScheduler::new();
        let system: Arc<dyn SpringSystem> = Arc::new(PhysicsSpringSystem::new());
        let exact = ViewProperties::new().shared();
        let late = ViewProperties::new().shared();

        scheduler.handle().schedule(
            Duration::ZERO,
            job(&exact, AnimationKind::Alpha, system.clone()),
        );
        scheduler.handle().schedule(
            Duration::from_millis(12),
            job(&late, AnimationKind::Alpha, system),
        );
        scheduler.advance(FRAME);

        // Late job only ran for 4ms of the 16ms frame
        assert!(late.lock().alpha > 0.0);
        assert!(late.lock().alpha < exact.lock().alpha);
    }

    #[test]
    fn test_dropped_element_never_written() {
        let scheduler = AnimationScheduler::new();
        let system = Arc::new(ScriptedSpringSystem::new(vec![0.5, 1.0]));
        let view = ViewProperties::new().shared();
        let id = scheduler
            .handle()
            .schedule(
                Duration::from_millis(50),
                job(&view, AnimationKind::Alpha, system.clone()),
            )
            .unwrap();
        drop(view);

        scheduler.advance(Duration::from_millis(100));

        assert_eq!(system.created(), 0);
        assert!(!scheduler.handle().is_scheduled(id));
        assert!(!scheduler.has_active_animations());
    }

    #[test]
    fn test_huge_delay_and_frame_saturate_clock() {
        let scheduler = AnimationScheduler::new();
        let system = Arc::new(ScriptedSpringSystem::new(vec![1.0]));
        let view = ViewProperties::new().shared();

        scheduler.advance(FRAME);
        let id = scheduler
            .handle()
            .schedule(Duration::MAX, job(&view, AnimationKind::Alpha, system.clone()))
            .unwrap();

        scheduler.advance(Duration::MAX);
        scheduler.advance(Duration::MAX);
        assert_eq!(scheduler.now(), Duration::MAX);
        assert!(!scheduler.handle().is_scheduled(id));
        assert_eq!(system.created(), 1);
        assert_eq!(view.lock().alpha, 100.0);
    }

    #[test]
    fn test_handle_weak_reference() {
        let handle = {
            let scheduler = AnimationScheduler::new();
            scheduler.handle()
        };

        assert!(!handle.is_alive());

        let view = ViewProperties::new().shared();
        let system = Arc::new(PhysicsSpringSystem::new());
        assert!(handle
            .schedule(Duration::ZERO, job(&view, AnimationKind::Alpha, system))
            .is_none());
    }

    #[test]
    fn test_physics_job_settles_and_is_released() {
        let scheduler = AnimationScheduler::new();
        let view = ViewProperties::new().shared();
        let id = scheduler
            .handle()
            .schedule(
                Duration::ZERO,
                job(&view, AnimationKind::Rotation, Arc::new(PhysicsSpringSystem::new())),
            )
            .unwrap();

        let mut frames = 0;
        while scheduler.advance(FRAME) {
            frames += 1;
            assert!(frames < 1000, "spring never settled");
        }

        assert!(!scheduler.handle().is_scheduled(id));
        assert_eq!(view.lock().rotation, 100.0);
    }

    #[test]
    fn test_clock_advances() {
        let scheduler = AnimationScheduler::new();
        scheduler.advance(Duration::from_millis(40));
        scheduler.advance(Duration::from_millis(2));
        assert_eq!(scheduler.now(), Duration::from_millis(42));
    }
}
