use grain_core::types::{ClassVector, CLASS_COUNT};
use grain_grade::{differences, fineness_modulus, passing_rates, proportions, summary_error};
use proptest::prelude::*;

fn class_vector() -> impl Strategy<Value = ClassVector> {
    prop::array::uniform6(0.0f64..10.0)
}

proptest! {
    #[test]
    fn summary_error_bounds_signed_sum(label in class_vector(), measured in class_vector()) {
        let diff = differences(&proportions(&label), &proportions(&measured));
        let signed: f64 = diff.iter().sum();
        let error = summary_error(&diff);
        prop_assert!(error >= 0.0);
        prop_assert!(signed.abs() <= error + 1e-12);
    }

    #[test]
    fn proportions_sum_to_one_or_zero(values in class_vector()) {
        let shares = proportions(&values);
        let total: f64 = shares.iter().sum();
        prop_assert!(total == 0.0 || (total - 1.0).abs() < 1e-9);
        prop_assert!(shares.iter().all(|s| (0.0..=1.0).contains(s)));
    }

    #[test]
    fn passing_rates_are_non_decreasing(values in class_vector()) {
        let rates = passing_rates(&values);
        for pair in rates.windows(2) {
            prop_assert!(pair[0] <= pair[1] + 1e-12);
        }
        if values.iter().sum::<f64>() > 0.0 {
            prop_assert!((rates[CLASS_COUNT - 1] - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn fineness_modulus_is_bounded(values in class_vector()) {
        let fm = fineness_modulus(&proportions(&values));
        prop_assert!((-1e-9..=5.0 + 1e-9).contains(&fm));
    }
}
