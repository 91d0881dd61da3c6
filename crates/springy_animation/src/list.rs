//! Staggered list entrances
//!
//! [`ListStaggerCoordinator`] hooks into a list's item-create and item-bind
//! events. Items created during the first layout slide (or scale) in one
//! after another with a growing delay. Once the first of those springs
//! settles the staggering phase is over for good; from then on, items are
//! animated only when a position is bound for the first time while
//! scrolling, with no delay and a softer spring.

use crate::config::ListStaggerConfig;
use crate::error::{Result, SpringError};
use crate::job::{ElementAnimationJob, SpringyListener};
use crate::kind::{AnimationKind, PropertyMotion};
use crate::scheduler::{JobId, SchedulerHandle};
use crate::sink::{ElementRef, PropertySink};
use crate::spring::{PhysicsSpringSystem, SpringConfig, SpringParameters, SpringSystem};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Delay before the first item of the first batch starts
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(100);

/// Extra delay for each following item of the first batch
pub const DEFAULT_ITEM_GAP: Duration = Duration::from_millis(100);

/// Raw tension/friction for list items
pub const DEFAULT_PARAMETERS: SpringParameters = SpringParameters::from_validated(200.0, 20.0);

/// Tension multiplier for items revealed by scrolling
pub const SCROLL_TENSION_FACTOR: f64 = 0.75;

/// Where list items enter from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntranceStyle {
    #[default]
    SlideFromBottom,
    SlideFromLeft,
    SlideFromRight,
    /// Grow from zero scale
    Scale,
}

impl EntranceStyle {
    pub const ALL: [EntranceStyle; 4] = [
        EntranceStyle::SlideFromBottom,
        EntranceStyle::SlideFromLeft,
        EntranceStyle::SlideFromRight,
        EntranceStyle::Scale,
    ];

    /// Property and range an item sweeps through for this style
    pub fn motion(self, viewport: Viewport) -> PropertyMotion {
        let height = viewport.height as f32;
        let width = viewport.width as f32;
        match self {
            EntranceStyle::SlideFromBottom => {
                PropertyMotion::new(AnimationKind::TranslateY, height, 0.0)
            }
            EntranceStyle::SlideFromLeft => {
                PropertyMotion::new(AnimationKind::TranslateX, -width, 0.0)
            }
            EntranceStyle::SlideFromRight => {
                PropertyMotion::new(AnimationKind::TranslateX, width, 0.0)
            }
            EntranceStyle::Scale => PropertyMotion::new(AnimationKind::ScaleXY, 0.0, 1.0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EntranceStyle::SlideFromBottom => "slide_from_bottom",
            EntranceStyle::SlideFromLeft => "slide_from_left",
            EntranceStyle::SlideFromRight => "slide_from_right",
            EntranceStyle::Scale => "scale",
        }
    }
}

impl fmt::Display for EntranceStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntranceStyle {
    type Err = SpringError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        EntranceStyle::ALL
            .into_iter()
            .find(|style| style.name() == normalized)
            .ok_or_else(|| SpringError::UnknownStyle(s.to_string()))
    }
}

/// Size of the list's visible area
pub trait ContainerMetrics {
    fn viewport_height(&self) -> u32;

    fn viewport_width(&self) -> u32;
}

/// Viewport size in pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Capture the current size reported by `metrics`
    pub fn from_metrics(metrics: &dyn ContainerMetrics) -> Self {
        Self::new(metrics.viewport_width(), metrics.viewport_height())
    }
}

impl ContainerMetrics for Viewport {
    fn viewport_height(&self) -> u32 {
        self.height
    }

    fn viewport_width(&self) -> u32 {
        self.width
    }
}

/// Staggering bookkeeping of one coordinator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StaggerState {
    first_batch_in_progress: bool,
    highest_animated_position: Option<usize>,
    accumulated_delay: Duration,
    staggered_items: usize,
    abandoned_items: usize,
}

impl StaggerState {
    fn new(initial_delay: Duration) -> Self {
        Self {
            first_batch_in_progress: true,
            highest_animated_position: None,
            accumulated_delay: initial_delay,
            staggered_items: 0,
            abandoned_items: 0,
        }
    }

    /// True until the first item spring settles (or every staggered item
    /// is dropped first); never true again after
    pub fn is_first_batch_in_progress(&self) -> bool {
        self.first_batch_in_progress
    }

    /// Highest position animated by scrolling, `None` before any
    pub fn highest_animated_position(&self) -> Option<usize> {
        self.highest_animated_position
    }

    /// Delay the next first-batch item will get
    pub fn accumulated_delay(&self) -> Duration {
        self.accumulated_delay
    }

    /// Number of items scheduled by `on_item_create`
    pub fn staggered_items(&self) -> usize {
        self.staggered_items
    }

    fn end_first_batch(&mut self, reason: &str) {
        if self.first_batch_in_progress {
            self.first_batch_in_progress = false;
            tracing::debug!("First batch {}, staggering finished", reason);
        }
    }
}

/// Ends the staggering phase when any item spring settles, or once every
/// staggered item was dropped before it could
struct FirstBatchListener {
    state: Arc<Mutex<StaggerState>>,
}

impl SpringyListener for FirstBatchListener {
    fn on_spring_end_state_change(&self) {
        self.state.lock().end_first_batch("settled");
    }

    fn on_spring_abandoned(&self) {
        let mut state = self.state.lock();
        if !state.first_batch_in_progress {
            return;
        }
        state.abandoned_items += 1;
        if state.abandoned_items >= state.staggered_items {
            state.end_first_batch("dropped");
        }
    }
}

/// What a create/bind call scheduled
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemAnimation {
    pub job: JobId,
    pub delay: Duration,
    pub parameters: SpringParameters,
}

/// Coordinates entrance animations for the items of one list
pub struct ListStaggerCoordinator {
    viewport: Viewport,
    style: Option<EntranceStyle>,
    parameters: SpringParameters,
    item_gap: Duration,
    state: Arc<Mutex<StaggerState>>,
    system: Arc<dyn SpringSystem>,
    scheduler: SchedulerHandle,
}

impl ListStaggerCoordinator {
    /// Bind a coordinator to a container
    ///
    /// The viewport size is read once, here.
    pub fn new(scheduler: SchedulerHandle, container: &dyn ContainerMetrics) -> Self {
        Self {
            viewport: Viewport::from_metrics(container),
            style: Some(EntranceStyle::SlideFromBottom),
            parameters: DEFAULT_PARAMETERS,
            item_gap: DEFAULT_ITEM_GAP,
            state: Arc::new(Mutex::new(StaggerState::new(DEFAULT_INITIAL_DELAY))),
            system: Arc::new(PhysicsSpringSystem::new()),
            scheduler,
        }
    }

    pub fn from_config(
        scheduler: SchedulerHandle,
        container: &dyn ContainerMetrics,
        config: &ListStaggerConfig,
    ) -> Result<Self> {
        let mut coordinator = Self::new(scheduler, container);
        coordinator.set_entrance_style(config.style);
        coordinator.set_initial_delay(Duration::from_millis(config.initial_delay_ms));
        coordinator.set_item_gap(Duration::from_millis(config.item_gap_ms));
        coordinator.set_spring_parameters(config.tension, config.friction)?;
        Ok(coordinator)
    }

    /// Replace the spring system item simulations are created from
    pub fn with_system(mut self, system: Arc<dyn SpringSystem>) -> Self {
        self.system = system;
        self
    }

    pub fn set_entrance_style(&mut self, style: EntranceStyle) {
        self.style = Some(style);
    }

    /// Forget the entrance style; items fall back to sliding from the bottom
    pub fn clear_entrance_style(&mut self) {
        self.style = None;
    }

    /// Delay before the first item's animation starts
    ///
    /// Ignored once `on_item_create` has scheduled an item, so delays never
    /// go backwards.
    pub fn set_initial_delay(&mut self, delay: Duration) {
        let mut state = self.state.lock();
        if state.staggered_items > 0 {
            tracing::debug!("Initial delay set after staggering began, ignoring");
            return;
        }
        state.accumulated_delay = delay;
    }

    pub fn set_item_gap(&mut self, gap: Duration) {
        self.item_gap = gap;
    }

    pub fn set_spring_parameters(&mut self, tension: f64, friction: f64) -> Result<()> {
        self.parameters = SpringParameters::new(tension, friction)?;
        Ok(())
    }

    pub fn entrance_style(&self) -> EntranceStyle {
        self.style.unwrap_or_default()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn parameters(&self) -> SpringParameters {
        self.parameters
    }

    /// Snapshot of the staggering state
    pub fn state(&self) -> StaggerState {
        *self.state.lock()
    }

    /// Call when the list creates a new item view
    ///
    /// While the first batch is in progress the item is put in its start
    /// pose and scheduled after the accumulated delay, which then grows by
    /// the item gap. Afterwards this does nothing.
    pub fn on_item_create<S>(&self, item: &Arc<Mutex<S>>) -> Option<ItemAnimation>
    where
        S: PropertySink + Send + 'static,
    {
        let delay = {
            let mut state = self.state.lock();
            if !state.first_batch_in_progress {
                return None;
            }
            let delay = state.accumulated_delay;
            state.accumulated_delay = delay.saturating_add(self.item_gap);
            state.staggered_items += 1;
            delay
        };

        let scheduled = self.animate(item, delay, self.parameters);
        if scheduled.is_none() {
            self.state.lock().staggered_items -= 1;
        }
        scheduled
    }

    /// Call when the list binds an item view to `position`
    ///
    /// Once the first batch is over, positions past the highest one seen so
    /// far animate straight away with a softened spring. Everything else is
    /// a no-op, so rebinding a recycled view never replays its entrance.
    pub fn on_item_bind<S>(&self, item: &Arc<Mutex<S>>, position: usize) -> Option<ItemAnimation>
    where
        S: PropertySink + Send + 'static,
    {
        {
            let mut state = self.state.lock();
            if state.first_batch_in_progress {
                return None;
            }
            if state
                .highest_animated_position
                .is_some_and(|highest| position <= highest)
            {
                tracing::trace!("Position {} already animated", position);
                return None;
            }
            state.highest_animated_position = Some(position);
        }

        let softened = self.parameters.with_tension_scaled(SCROLL_TENSION_FACTOR);
        self.animate(item, Duration::ZERO, softened)
    }

    fn animate<S>(
        &self,
        item: &Arc<Mutex<S>>,
        delay: Duration,
        parameters: SpringParameters,
    ) -> Option<ItemAnimation>
    where
        S: PropertySink + Send + 'static,
    {
        let listener: Arc<dyn SpringyListener> = Arc::new(FirstBatchListener {
            state: self.state.clone(),
        });
        let job = ElementAnimationJob::new(
            ElementRef::new(item),
            self.entrance_style().motion(self.viewport),
            SpringConfig::from_parameters(parameters),
            self.system.clone(),
        )
        .with_listener(Some(listener));

        job.apply_start_pose();
        let id = self.scheduler.schedule(delay, job)?;
        tracing::debug!(
            "Item scheduled: style={}, delay={:?}, tension={}",
            self.entrance_style(),
            delay,
            parameters.tension()
        );
        Some(ItemAnimation {
            job: id,
            delay,
            parameters,
        })
    }
}
