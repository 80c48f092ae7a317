use chrono::NaiveDate;

/// `current / target * 100`, clamped to [0, 100]
pub fn progress_percentage(current: f64, target: f64) -> f64 {
    if !current.is_finite() || !target.is_finite() || target <= 0.0 {
        return 0.0;
    }
    ((current / target) * 100.0).clamp(0.0, 100.0)
}

pub fn is_achieved(current: f64, target: f64) -> bool {
    target > 0.0 && current >= target
}

/// Negative once the end date has passed
pub fn days_remaining(end_date: NaiveDate, today: NaiveDate) -> i64 {
    (end_date - today).num_days()
}

/// Body mass index rounded to one decimal
pub fn body_mass_index(weight_kg: f64, height_cm: f64) -> Option<f64> {
    if weight_kg <= 0.0 || height_cm <= 0.0 {
        return None;
    }
    let height_m = height_cm / 100.0;
    let bmi = weight_kg / (height_m * height_m);
    Some((bmi * 10.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_progress_percentage() {
        assert_eq!(progress_percentage(200.0, 400.0), 50.0);
        assert_eq!(progress_percentage(400.0, 400.0), 100.0);
        assert_eq!(progress_percentage(450.0, 400.0), 100.0);
        assert_eq!(progress_percentage(-10.0, 400.0), 0.0);
        assert_eq!(progress_percentage(10.0, 0.0), 0.0);
        assert_eq!(progress_percentage(f64::INFINITY, 10.0), 0.0);
    }

    #[test]
    fn test_achievement_threshold() {
        assert!(is_achieved(10.0, 10.0));
        assert!(is_achieved(11.0, 10.0));
        assert!(!is_achieved(9.99, 10.0));
        assert!(!is_achieved(0.0, 0.0));
    }

    #[test]
    fn test_days_remaining() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(days_remaining(NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(), today), 30);
        assert_eq!(days_remaining(NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(), today), -1);
    }

    #[test]
    fn test_bmi() {
        assert_eq!(body_mass_index(80.0, 180.0), Some(24.7));
        assert_eq!(body_mass_index(80.0, 0.0), None);
    }

    proptest! {
        #[test]
        fn prop_progress_is_monotonic(target in 1.0f64..1e6, a in 0.0f64..2e6, b in 0.0f64..2e6) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(progress_percentage(low, target) <= progress_percentage(high, target));
        }

        #[test]
        fn prop_progress_is_bounded(target in -1e6f64..1e6, current in -1e6f64..1e6) {
            let pct = progress_percentage(current, target);
            prop_assert!((0.0..=100.0).contains(&pct));
        }
    }
}
