use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration error detected by [`GameSettings::validate`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SettingsError {
    #[display("speed range is empty: min {min} is greater than max {max}")]
    EmptySpeedRange { min: i32, max: i32 },
    #[display("default speed {default} is outside {min}..={max}")]
    DefaultSpeedOutOfRange { default: i32, min: i32, max: i32 },
    #[display("speed 0 is not a valid speed")]
    ZeroSpeed,
    #[display("speed range {min}..={max} must not end at 0")]
    ZeroSpeedBound { min: i32, max: i32 },
    #[display("speed step must be positive")]
    ZeroSpeedStep,
    #[display("speed {speed} has no positive gravity interval")]
    NonPositiveInterval { speed: i32 },
}

/// Bounds and progression of the game speed.
///
/// Speed is a non-zero integer. Negative speeds are slower than the default
/// one; every `step` points of score raise the speed by one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedSettings {
    pub min: i32,
    pub max: i32,
    pub default: i32,
    pub step: usize,
}

impl Default for SpeedSettings {
    fn default() -> Self {
        Self {
            min: -4,
            max: 25,
            default: 1,
            step: 12,
        }
    }
}

impl SpeedSettings {
    fn interval_millis(speed: i32) -> i64 {
        let speed = i64::from(speed);
        if speed < 0 {
            600 - 300 * speed
        } else {
            850 - 32 * speed
        }
    }

    /// Returns the time between two gravity ticks at `speed`.
    ///
    /// ```
    /// use std::time::Duration;
    /// use brickfall_engine::SpeedSettings;
    ///
    /// assert_eq!(SpeedSettings::gravity_interval(1), Duration::from_millis(818));
    /// assert_eq!(SpeedSettings::gravity_interval(-2), Duration::from_millis(1200));
    /// ```
    #[must_use]
    pub fn gravity_interval(speed: i32) -> Duration {
        let millis = u64::try_from(Self::interval_millis(speed)).unwrap_or(0);
        Duration::from_millis(millis)
    }

    /// Applies `delta` to `speed`, skipping 0 and clamping to `min..=max`.
    ///
    /// The result is never 0: if clamping would land there, `speed` is
    /// returned unchanged.
    #[must_use]
    pub fn changed(&self, speed: i32, delta: i32) -> i32 {
        let mut changed = speed + delta;
        if changed == 0 {
            changed += delta;
        }
        match changed.clamp(self.min, self.max) {
            0 => speed,
            changed => changed,
        }
    }

    /// Number of completed speed steps reached with `score`.
    #[must_use]
    pub fn tier(&self, score: usize) -> usize {
        score / self.step
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let Self {
            min,
            max,
            default,
            step,
        } = *self;
        if min > max {
            return Err(SettingsError::EmptySpeedRange { min, max });
        }
        if !(min..=max).contains(&default) {
            return Err(SettingsError::DefaultSpeedOutOfRange { default, min, max });
        }
        if default == 0 {
            return Err(SettingsError::ZeroSpeed);
        }
        if min == 0 || max == 0 {
            return Err(SettingsError::ZeroSpeedBound { min, max });
        }
        if step == 0 {
            return Err(SettingsError::ZeroSpeedStep);
        }
        if Self::interval_millis(max) <= 0 {
            return Err(SettingsError::NonPositiveInterval { speed: max });
        }
        Ok(())
    }
}

/// Settings of a game session.
///
/// Every field has a default, so a partial JSON document is accepted.
///
/// # Example
///
/// ```
/// use brickfall_engine::GameSettings;
///
/// let settings: GameSettings = serde_json::from_str(r#"{"speed": {"default": 3}}"#).unwrap();
/// assert_eq!(settings.speed.default, 3);
/// assert_eq!(settings.speed.max, 25);
/// assert!(settings.show_shadow);
/// settings.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub speed: SpeedSettings,
    /// Initial shadow visibility for front ends. The session does not read
    /// it; renderers pass their current choice to [`crate::Session::snapshot`].
    pub show_shadow: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            speed: SpeedSettings::default(),
            show_shadow: true,
        }
    }
}

impl GameSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.speed.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gravity_interval() {
        assert_eq!(
            SpeedSettings::gravity_interval(-4),
            Duration::from_millis(1800)
        );
        assert_eq!(
            SpeedSettings::gravity_interval(-1),
            Duration::from_millis(900)
        );
        assert_eq!(SpeedSettings::gravity_interval(1), Duration::from_millis(818));
        assert_eq!(SpeedSettings::gravity_interval(25), Duration::from_millis(50));
    }

    #[test]
    fn test_interval_shrinks_as_speed_grows() {
        let settings = SpeedSettings::default();
        let speeds: Vec<_> = (settings.min..=settings.max).filter(|s| *s != 0).collect();
        for pair in speeds.windows(2) {
            assert!(
                SpeedSettings::gravity_interval(pair[0]) > SpeedSettings::gravity_interval(pair[1]),
                "{pair:?}"
            );
        }
    }

    #[test]
    fn test_changed_skips_zero() {
        let settings = SpeedSettings::default();
        assert_eq!(settings.changed(1, -1), -1);
        assert_eq!(settings.changed(-1, 1), 1);
        assert_eq!(settings.changed(1, 1), 2);
        assert_eq!(settings.changed(-2, 1), -1);
    }

    #[test]
    fn test_changed_clamps() {
        let settings = SpeedSettings::default();
        assert_eq!(settings.changed(25, 1), 25);
        assert_eq!(settings.changed(-4, -1), -4);
    }

    #[test]
    fn test_changed_never_reaches_zero_bound() {
        let settings = SpeedSettings {
            min: 0,
            max: 25,
            default: 1,
            step: 12,
        };
        assert_eq!(settings.changed(1, -1), 1);
        assert_eq!(settings.changed(1, 1), 2);

        let settings = SpeedSettings {
            min: -4,
            max: 0,
            default: -1,
            step: 12,
        };
        assert_eq!(settings.changed(-1, 1), -1);
        assert_eq!(settings.changed(-1, -1), -2);
    }

    #[test]
    fn test_tier() {
        let settings = SpeedSettings::default();
        assert_eq!(settings.tier(0), 0);
        assert_eq!(settings.tier(11), 0);
        assert_eq!(settings.tier(12), 1);
        assert_eq!(settings.tier(25), 2);
    }

    #[test]
    fn test_validate() {
        assert_eq!(GameSettings::default().validate(), Ok(()));

        let mut speed = SpeedSettings {
            min: 3,
            max: 2,
            ..SpeedSettings::default()
        };
        assert_eq!(
            speed.validate(),
            Err(SettingsError::EmptySpeedRange { min: 3, max: 2 })
        );

        speed = SpeedSettings {
            default: 30,
            ..SpeedSettings::default()
        };
        assert!(matches!(
            speed.validate(),
            Err(SettingsError::DefaultSpeedOutOfRange { default: 30, .. })
        ));

        speed = SpeedSettings {
            default: 0,
            ..SpeedSettings::default()
        };
        assert_eq!(speed.validate(), Err(SettingsError::ZeroSpeed));

        speed = SpeedSettings {
            min: 0,
            ..SpeedSettings::default()
        };
        assert_eq!(
            speed.validate(),
            Err(SettingsError::ZeroSpeedBound { min: 0, max: 25 })
        );

        speed = SpeedSettings {
            min: -4,
            max: 0,
            default: -1,
            step: 12,
        };
        assert_eq!(
            speed.validate(),
            Err(SettingsError::ZeroSpeedBound { min: -4, max: 0 })
        );

        speed = SpeedSettings {
            step: 0,
            ..SpeedSettings::default()
        };
        assert_eq!(speed.validate(), Err(SettingsError::ZeroSpeedStep));

        speed = SpeedSettings {
            max: 27,
            ..SpeedSettings::default()
        };
        assert_eq!(
            speed.validate(),
            Err(SettingsError::NonPositiveInterval { speed: 27 })
        );
    }

    #[test]
    fn test_error_message() {
        let err = SettingsError::DefaultSpeedOutOfRange {
            default: 30,
            min: -4,
            max: 25,
        };
        assert_eq!(err.to_string(), "default speed 30 is outside -4..=25");
    }

    #[test]
    fn test_deserialize_partial() {
        let settings: GameSettings = serde_json::from_str(r#"{"show_shadow": false}"#).unwrap();
        assert!(!settings.show_shadow);
        assert_eq!(settings.speed, SpeedSettings::default());
    }
}
