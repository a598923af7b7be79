//! Drives the `t` slider for animated plots.
//!
//! One tick advances `t` at 0.45 revolutions per second, so a parametric
//! curve over [0, 2pi] loops in just over two seconds. When the value runs
//! past the slider's max it wraps continuously, carrying the overshoot
//! past min instead of snapping.

use crate::graph::store::GraphStore;

/// Advance per second of wall time.
const RADIANS_PER_SECOND: f64 = 2.0 * std::f64::consts::PI * 0.45;

#[derive(Debug, Default)]
pub struct AnimationClock {
    running: bool,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Idempotent.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advances the `t` slider by `dt` seconds of animation. A stopped
    /// clock or a store without a `t` slider makes this a no-op.
    pub fn tick(&self, store: &mut GraphStore, dt: f64) {
        if !self.running {
            return;
        }
        let Some(slider) = store.slider("t") else {
            return;
        };
        let (min, max) = (slider.min, slider.max);
        let mut value = slider.value + dt * RADIANS_PER_SECOND;
        if value > max {
            value = min + (value - max);
        }
        store.update_slider("t", value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn store_with_t() -> GraphStore {
        let mut store = GraphStore::new();
        store.add_expression("(cos(t), sin(t))");
        store
    }

    #[test]
    fn test_tick_advances_t_at_fixed_rate() {
        let mut store = store_with_t();
        let mut clock = AnimationClock::new();
        clock.start();

        clock.tick(&mut store, 1.0);
        assert_relative_eq!(
            store.slider("t").unwrap().value,
            1.0 + 2.0 * std::f64::consts::PI * 0.45,
        );
    }

    #[test]
    fn test_stopped_clock_does_not_advance() {
        let mut store = store_with_t();
        let clock = AnimationClock::new();
        clock.tick(&mut store, 1.0);
        assert_eq!(store.slider("t").unwrap().value, 1.0);
    }

    #[test]
    fn test_wraps_past_max_with_overshoot() {
        let mut store = store_with_t();
        store.set_slider_bounds("t", 0.0, 10.0, 0.1);
        store.update_slider("t", 9.9);

        let mut clock = AnimationClock::new();
        clock.start();
        clock.tick(&mut store, 0.1); // advance ~0.283

        let t = store.slider("t").unwrap().value;
        let expected = 0.0 + (9.9 + 0.1 * 2.0 * std::f64::consts::PI * 0.45 - 10.0);
        assert_relative_eq!(t, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_no_t_slider_is_a_noop() {
        let mut store = GraphStore::new();
        store.add_expression("y = x^2");
        let mut clock = AnimationClock::new();
        clock.start();
        clock.tick(&mut store, 1.0); // nothing to advance
        assert!(store.slider("t").is_none());
    }

    #[test]
    fn test_start_and_stop_are_idempotent() {
        let mut clock = AnimationClock::new();
        clock.start();
        clock.start();
        assert!(clock.is_running());
        clock.stop();
        clock.stop();
        assert!(!clock.is_running());
    }
}
