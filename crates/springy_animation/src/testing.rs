//! Deterministic spring system for tests and headless replays
//!
//! [`ScriptedSpringSystem`] hands out simulations that report a fixed
//! sequence of progress values, one per frame, then come to rest. It also
//! records every configuration and target it was given so callers can
//! check what the animators asked for.

use crate::spring::{Simulation, SpringConfig, SpringEvent, SpringEvents, SpringSystem};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Default)]
struct ScriptLog {
    created: usize,
    configs: Vec<SpringConfig>,
    targets: Vec<f64>,
}

/// A spring system replaying a fixed progress script
#[derive(Clone)]
pub struct ScriptedSpringSystem {
    frames: Vec<f64>,
    log: Arc<Mutex<ScriptLog>>,
}

impl ScriptedSpringSystem {
    /// Every simulation yields `frames` in order, one per advance, and
    /// settles on the last one
    pub fn new(frames: Vec<f64>) -> Self {
        Self {
            frames,
            log: Arc::new(Mutex::new(ScriptLog::default())),
        }
    }

    /// Number of simulations created so far
    pub fn created(&self) -> usize {
        self.log.lock().created
    }

    /// Configurations applied to simulations, in the order they were set
    pub fn configs(&self) -> Vec<SpringConfig> {
        self.log.lock().configs.clone()
    }

    /// Targets applied to simulations, in the order they were set
    pub fn targets(&self) -> Vec<f64> {
        self.log.lock().targets.clone()
    }
}

impl SpringSystem for ScriptedSpringSystem {
    fn create_simulation(&self) -> Box<dyn Simulation> {
        self.log.lock().created += 1;
        Box::new(ScriptedSimulation {
            frames: self.frames.iter().copied().collect(),
            value: 0.0,
            active: false,
            settled: false,
            log: self.log.clone(),
        })
    }
}

struct ScriptedSimulation {
    frames: VecDeque<f64>,
    value: f64,
    active: bool,
    settled: bool,
    log: Arc<Mutex<ScriptLog>>,
}

impl Simulation for ScriptedSimulation {
    fn set_config(&mut self, config: SpringConfig) {
        self.log.lock().configs.push(config);
    }

    fn set_target(&mut self, target: f64) {
        self.log.lock().targets.push(target);
    }

    fn current_value(&self) -> f64 {
        self.value
    }

    fn advance(&mut self, _dt: f64) -> SpringEvents {
        let mut events = SpringEvents::new();
        if self.settled {
            return events;
        }
        if !self.active {
            self.active = true;
            events.push(SpringEvent::Activate);
        }
        if let Some(value) = self.frames.pop_front() {
            self.value = value;
        }
        events.push(SpringEvent::Update);
        if self.frames.is_empty() {
            self.settled = true;
            events.push(SpringEvent::Rest);
            events.push(SpringEvent::EndStateChange);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_replays_then_rests() {
        let system = ScriptedSpringSystem::new(vec![0.25, 1.0]);
        let mut sim = system.create_simulation();
        sim.set_target(1.0);

        let first = sim.advance(0.016);
        assert_eq!(
            first.as_slice(),
            &[SpringEvent::Activate, SpringEvent::Update]
        );
        assert_eq!(sim.current_value(), 0.25);

        let second = sim.advance(0.016);
        assert_eq!(
            second.as_slice(),
            &[
                SpringEvent::Update,
                SpringEvent::Rest,
                SpringEvent::EndStateChange
            ]
        );
        assert!(sim.advance(0.016).is_empty());
        assert_eq!(system.created(), 1);
        assert_eq!(system.targets(), vec![1.0]);
    }
}
