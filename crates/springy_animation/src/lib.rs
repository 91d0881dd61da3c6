//! Springy Animation System
//!
//! Spring-driven property animation for on-screen elements, and staggered
//! entrance animations for the items of a scrolling list.
//!
//! # Features
//!
//! - **Spring Physics**: RK4-integrated springs behind a pluggable [`SpringSystem`]
//! - **Property Mapping**: Normalized spring progress mapped onto translation,
//!   rotation, scale or opacity
//! - **Single-Element Animator**: One property, one spring, optional delay and
//!   start/stop listener
//! - **List Staggering**: Cascading first-layout entrances, then one-shot
//!   softer entrances for items revealed by scrolling
//! - **Deterministic Scheduling**: Delays and simulations run on an explicit
//!   clock that the host advances
//!
//! # Example
//!
//! ```rust
//! use springy_animation::{AnimationScheduler, ListStaggerCoordinator, ViewProperties, Viewport};
//! use std::time::Duration;
//!
//! let scheduler = AnimationScheduler::new();
//! let list = ListStaggerCoordinator::new(scheduler.handle(), &Viewport::new(480, 800));
//!
//! let rows: Vec<_> = (0..3).map(|_| ViewProperties::new().shared()).collect();
//! for row in &rows {
//!     list.on_item_create(row);
//! }
//!
//! while scheduler.advance(Duration::from_millis(16)) {}
//! assert!(rows.iter().all(|row| row.lock().translation_y == 0.0));
//! ```

pub mod animator;
pub mod config;
pub mod error;
pub mod job;
pub mod kind;
pub mod list;
pub mod scheduler;
pub mod sink;
pub mod spring;
pub mod testing;

pub use animator::SingleElementSpringAnimator;
pub use config::{AnimatorConfig, ListStaggerConfig};
pub use error::{Result, SpringError};
pub use job::{CallbackListener, ElementAnimationJob, SpringyListener};
pub use kind::{map_range, AnimationKind, PropertyMotion};
pub use list::{
    ContainerMetrics, EntranceStyle, ItemAnimation, ListStaggerCoordinator, StaggerState, Viewport,
};
pub use scheduler::{AnimationScheduler, JobId, SchedulerHandle};
pub use sink::{ElementRef, PropertySink, SharedSink, ViewProperties};
pub use spring::{
    PhysicsSpringSystem, Simulation, Spring, SpringConfig, SpringEvent, SpringEvents,
    SpringParameters, SpringSystem,
};
