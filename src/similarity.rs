/// Distance-to-similarity conversion
///
/// Two independent percentages are derived from the verifier's distance:
/// - threshold-relative: how much margin is left under the model's cutoff
/// - absolute: a rough inverse of the raw distance
///
/// Both are clamped from below at 0 and never rounded here.

use crate::state::data::SimilarityScores;

/// Convert a (distance, threshold) pair into the two similarity percentages
///
/// Expects `distance >= 0` and `threshold > 0`; the threshold comes from the
/// model itself, never from user input.
pub fn convert(distance: f64, threshold: f64) -> SimilarityScores {
    let threshold_relative = ((1.0 - distance / threshold) * 100.0).max(0.0);
    let absolute = ((1.0 - distance) * 100.0).max(0.0);

    SimilarityScores {
        threshold_relative,
        absolute,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_zero_distance_is_full_similarity() {
        let scores = convert(0.0, 0.68);
        assert_eq!(scores.threshold_relative, 100.0);
        assert_eq!(scores.absolute, 100.0);
    }

    #[test]
    fn test_distance_at_threshold() {
        let scores = convert(0.68, 0.68);
        assert_eq!(scores.threshold_relative, 0.0);
    }

    #[test]
    fn test_distance_beyond_threshold_clamps() {
        let scores = convert(0.9, 0.68);
        assert_eq!(scores.threshold_relative, 0.0);
        assert!((scores.absolute - 10.0).abs() < EPS);
    }

    #[test]
    fn test_distance_above_one_clamps_absolute() {
        let scores = convert(1.3, 1.5);
        assert_eq!(scores.absolute, 0.0);
        assert!(scores.threshold_relative > 0.0);
    }

    #[test]
    fn test_same_person_example() {
        let scores = convert(0.25, 0.68);
        assert!((scores.threshold_relative - 63.235294117647).abs() < 1e-6);
        assert_eq!(scores.absolute, 75.0);
    }

    #[test]
    fn test_scores_stay_in_range() {
        let thresholds = [0.01, 0.4, 0.68, 1.0, 1.04, 10.0];
        for &threshold in &thresholds {
            for step in 0..=400 {
                let distance = step as f64 * 0.01;
                let scores = convert(distance, threshold);
                for value in [scores.threshold_relative, scores.absolute] {
                    assert!(
                        (0.0..=100.0).contains(&value),
                        "distance={} threshold={} gave {}",
                        distance,
                        threshold,
                        value
                    );
                }
            }
        }
    }
}
