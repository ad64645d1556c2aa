//! Exponential easing of current settings toward user targets.

use crate::params::{SettingKey, Settings, SmoothingConfig};

/// One smoothing step over every key.
///
/// For each key whose current value differs from its target,
/// `current += (target - current) * rate`. Equality is exact, so without
/// snapping a value can approach its target forever.
pub fn smooth(current: &mut Settings, target: &Settings, rate: f32) {
    for key in SettingKey::ALL {
        let goal = target.get(key);
        let value = current.get_mut(key);
        if *value != goal {
            *value += (goal - *value) * rate;
        }
    }
}

/// Holds the current/target pair and advances it once per frame.
///
/// Input handlers write only the target (through [`set_target`]); only
/// [`step`] writes the current values.
///
/// [`set_target`]: ParameterSmoother::set_target
/// [`step`]: ParameterSmoother::step
#[derive(Debug, Clone)]
pub struct ParameterSmoother {
    current: Settings,
    target: Settings,
    config: SmoothingConfig,
}

impl ParameterSmoother {
    /// Create a smoother with current == target == `initial`
    pub fn new(initial: Settings, config: SmoothingConfig) -> Self {
        Self {
            current: initial,
            target: initial,
            config,
        }
    }

    pub fn current(&self) -> &Settings {
        &self.current
    }

    pub fn target(&self) -> &Settings {
        &self.target
    }

    pub fn config(&self) -> SmoothingConfig {
        self.config
    }

    /// Set the raw target of one setting (non-finite values are ignored)
    pub fn set_target(&mut self, key: SettingKey, value: f32) {
        if value.is_finite() {
            self.target.set(key, value);
        }
    }

    /// Whether every current value has reached its target
    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }

    /// Advance one tick. Returns whether any current value changed.
    pub fn step(&mut self) -> bool {
        if self.is_settled() {
            return false;
        }
        let before = self.current;
        smooth(&mut self.current, &self.target, self.config.rate);

        // Snap values within epsilon of their target
        let eps = self.config.snap_epsilon;
        if eps > 0.0 {
            for key in SettingKey::ALL {
                let goal = self.target.get(key);
                let value = self.current.get_mut(key);
                if (goal - *value).abs() <= eps {
                    *value = goal;
                }
            }
        }
        self.current != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unsnapped() -> SmoothingConfig {
        SmoothingConfig {
            rate: 0.05,
            snap_epsilon: 0.0,
        }
    }

    #[test]
    fn test_single_step_zoom() {
        let mut smoother = ParameterSmoother::new(Settings::default(), unsnapped());
        smoother.set_target(SettingKey::Zoom, 2.0);
        smoother.step();
        assert_relative_eq!(smoother.current().zoom, 1.05, epsilon = 1e-6);
        // Untouched keys stay put
        assert_eq!(smoother.current().iterations, 200.0);
    }

    #[test]
    fn test_gap_follows_geometric_decay() {
        let mut smoother = ParameterSmoother::new(Settings::default(), unsnapped());
        smoother.set_target(SettingKey::Zoom, 2.0);
        for _ in 0..100 {
            smoother.step();
        }
        // 0.95^100 ~= 0.00592
        let gap = 2.0 - smoother.current().zoom;
        assert_relative_eq!(gap, 0.95f32.powi(100), max_relative = 1e-2);
        assert!(gap < 1e-2);

        for _ in 100..140 {
            smoother.step();
        }
        assert!(2.0 - smoother.current().zoom < 1e-3);
    }

    #[test]
    fn test_gap_strictly_decreases_without_overshoot() {
        let mut current = Settings::default();
        let target = Settings {
            iterations: 50.0,
            zoom: 4.0,
            speed: 0.0,
            audio_reactivity: 3.3,
            kaleidoscope_segments: 12.0,
        };
        for _ in 0..50 {
            let before = current;
            smooth(&mut current, &target, 0.05);
            for key in SettingKey::ALL {
                let (b, a, t) = (before.get(key), current.get(key), target.get(key));
                assert!((t - a).abs() < (t - b).abs(), "{} did not converge", key);
                // Same side of the target as before
                assert!((t - a).signum() == (t - b).signum(), "{} overshot", key);
            }
        }
    }

    #[test]
    fn test_equal_values_are_left_unchanged() {
        let mut current = Settings::default();
        let target = Settings::default();
        smooth(&mut current, &target, 0.05);
        assert_eq!(current, target);

        let mut smoother = ParameterSmoother::new(Settings::default(), unsnapped());
        assert!(!smoother.step());
        assert!(smoother.is_settled());
    }

    #[test]
    fn test_snap_settles_exactly() {
        let mut smoother = ParameterSmoother::new(Settings::default(), SmoothingConfig::default());
        smoother.set_target(SettingKey::Zoom, 2.0);
        let mut ticks = 0;
        while smoother.step() {
            ticks += 1;
            assert!(ticks < 1000, "smoother never settled");
        }
        assert_eq!(smoother.current().zoom, 2.0);
        assert!(smoother.is_settled());
    }

    #[test]
    fn test_snap_step_never_moves_away() {
        let config = SmoothingConfig {
            rate: 0.05,
            snap_epsilon: 0.5,
        };
        let mut smoother = ParameterSmoother::new(Settings::default(), config);
        smoother.set_target(SettingKey::Speed, 1.4);
        assert!(smoother.step());
        assert_eq!(smoother.current().speed, 1.4);
    }

    #[test]
    fn test_target_writes_do_not_touch_current() {
        let mut smoother = ParameterSmoother::new(Settings::default(), unsnapped());
        smoother.set_target(SettingKey::KaleidoscopeSegments, 9.0);
        smoother.set_target(SettingKey::Zoom, f32::NAN);
        assert_eq!(smoother.current(), &Settings::default());
        assert_eq!(smoother.target().kaleidoscope_segments, 9.0);
        assert_eq!(smoother.target().zoom, 1.0);
    }
}
