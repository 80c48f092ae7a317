use serde::Serialize;

use super::calories::REFERENCE_WEIGHT_KG;

pub const DEFAULT_STRIDE_LENGTH_M: f64 = 0.762;
pub const DEFAULT_CALORIES_PER_STEP: f64 = 0.04;

/// Fixed-ratio conversion from a step count to distance and energy
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepConversion {
    pub stride_length_m: f64,
    pub calories_per_step: f64,
}

impl Default for StepConversion {
    fn default() -> Self {
        Self {
            stride_length_m: DEFAULT_STRIDE_LENGTH_M,
            calories_per_step: DEFAULT_CALORIES_PER_STEP,
        }
    }
}

impl StepConversion {
    /// Uses the profile stride when set and scales energy by body weight
    pub fn for_profile(stride_length_cm: Option<f64>, weight_kg: Option<f64>) -> Self {
        let stride_length_m = stride_length_cm
            .filter(|s| s.is_finite() && *s > 0.0)
            .map(|s| s / 100.0)
            .unwrap_or(DEFAULT_STRIDE_LENGTH_M);

        let calories_per_step = weight_kg
            .filter(|w| w.is_finite() && *w > 0.0)
            .map(|w| DEFAULT_CALORIES_PER_STEP * w / REFERENCE_WEIGHT_KG)
            .unwrap_or(DEFAULT_CALORIES_PER_STEP);

        Self {
            stride_length_m,
            calories_per_step,
        }
    }

    pub fn distance_km(&self, steps: i64) -> f64 {
        steps.max(0) as f64 * self.stride_length_m / 1000.0
    }

    pub fn calories(&self, steps: i64) -> f64 {
        steps.max(0) as f64 * self.calories_per_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_conversion() {
        let conversion = StepConversion::default();
        assert!((conversion.distance_km(10_000) - 7.62).abs() < 1e-9);
        assert!((conversion.calories(10_000) - 400.0).abs() < 1e-9);
        assert_eq!(conversion.distance_km(-5), 0.0);
    }

    #[test]
    fn test_profile_conversion() {
        let conversion = StepConversion::for_profile(Some(80.0), Some(105.0));
        assert!((conversion.stride_length_m - 0.8).abs() < 1e-12);
        assert!((conversion.calories_per_step - 0.06).abs() < 1e-12);

        let fallback = StepConversion::for_profile(None, Some(0.0));
        assert_eq!(fallback, StepConversion::default());
    }

    proptest! {
        #[test]
        fn prop_conversion_is_linear(steps in 0i64..100_000) {
            let conversion = StepConversion::default();
            prop_assert!((conversion.distance_km(2 * steps) - 2.0 * conversion.distance_km(steps)).abs() < 1e-9);
            prop_assert!((conversion.calories(2 * steps) - 2.0 * conversion.calories(steps)).abs() < 1e-9);
        }
    }
}
