//! Process-wide curve settings.
//!
//! The kernel reads these values but never persists them. Hosts load a
//! [`CurveSettings`] from their own configuration (it is `serde`
//! serializable) and install it with [`set_curve_settings`]. Every operation
//! that consults the settings also has a variant taking them explicitly.

use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// Lowest accepted approximation scale.
pub const MIN_APPROXIMATION_SCALE: f64 = 0.2;
/// Highest accepted approximation scale.
pub const MAX_APPROXIMATION_SCALE: f64 = 10.0;
/// Fallback used when a curve carries an out-of-range scale.
pub const DEFAULT_APPROXIMATION_SCALE: f64 = 0.5;
/// Scale of newly built curves. Out of range on purpose, so it resolves to
/// the configured default when the curve is used.
pub const UNSET_APPROXIMATION_SCALE: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveSettings {
    /// Scale used by curves whose own scale is outside
    /// `[MIN_APPROXIMATION_SCALE, MAX_APPROXIMATION_SCALE]`.
    pub default_approximation_scale: f64,
    /// Turn out-of-range cut lengths into errors instead of warnings.
    pub pedantic: bool,
}

impl CurveSettings {
    pub const DEFAULT: Self = Self {
        default_approximation_scale: DEFAULT_APPROXIMATION_SCALE,
        pedantic: false,
    };

    #[must_use]
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    #[must_use]
    pub const fn default_approximation_scale(mut self, scale: f64) -> Self {
        self.default_approximation_scale = scale;
        self
    }

    #[must_use]
    pub const fn pedantic(mut self, pedantic: bool) -> Self {
        self.pedantic = pedantic;
        self
    }

    /// Resolve a curve's approximation scale to the one actually used.
    #[must_use]
    pub fn effective_scale(&self, scale: f64) -> f64 {
        if is_valid_scale(scale) {
            scale
        } else if is_valid_scale(self.default_approximation_scale) {
            self.default_approximation_scale
        } else {
            DEFAULT_APPROXIMATION_SCALE
        }
    }
}

impl Default for CurveSettings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[must_use]
pub fn is_valid_scale(scale: f64) -> bool {
    (MIN_APPROXIMATION_SCALE..=MAX_APPROXIMATION_SCALE).contains(&scale)
}

static SETTINGS: RwLock<CurveSettings> = RwLock::new(CurveSettings::DEFAULT);

/// Snapshot of the global settings.
#[must_use]
pub fn curve_settings() -> CurveSettings {
    *SETTINGS.read().unwrap_or_else(PoisonError::into_inner)
}

/// Replace the global settings.
pub fn set_curve_settings(settings: CurveSettings) {
    *SETTINGS.write().unwrap_or_else(PoisonError::into_inner) = settings;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_scale_falls_back() {
        let settings = CurveSettings::new().default_approximation_scale(2.0);
        assert_eq!(settings.effective_scale(5.0), 5.0);
        assert_eq!(settings.effective_scale(0.0), 2.0);
        assert_eq!(settings.effective_scale(11.0), 2.0);
        assert_eq!(settings.effective_scale(f64::NAN), 2.0);

        let broken = CurveSettings::new().default_approximation_scale(-1.0);
        assert_eq!(broken.effective_scale(0.0), DEFAULT_APPROXIMATION_SCALE);
    }

    #[test]
    fn test_unset_scale_follows_configured_default() {
        let settings = CurveSettings::new().default_approximation_scale(4.0);
        assert!(!is_valid_scale(UNSET_APPROXIMATION_SCALE));
        assert_eq!(settings.effective_scale(UNSET_APPROXIMATION_SCALE), 4.0);
    }

    #[test]
    fn test_settings_from_json() {
        let settings: CurveSettings = serde_json::from_str(r#"{ "pedantic": true }"#).unwrap();
        assert!(settings.pedantic);
        assert_eq!(settings.default_approximation_scale, DEFAULT_APPROXIMATION_SCALE);

        let text = serde_json::to_string(&settings).unwrap();
        assert!(text.contains("\"pedantic\":true"));
    }
}
