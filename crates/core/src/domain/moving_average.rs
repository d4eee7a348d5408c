/// Trailing simple moving average, aligned with `values`.
///
/// Position `i` holds the mean of `values[i + 1 - window..=i]`, or `None` while fewer than
/// `window` observations are available. A zero window yields all `None`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 || values.len() < window {
        return vec![None; values.len()];
    }

    // Each window is summed on its own so that no running-sum drift leaks into comparisons.
    let mut out = vec![None; window - 1];
    out.extend(
        values
            .windows(window)
            .map(|w| Some(w.iter().sum::<f64>() / window as f64)),
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_mean_fills_after_window() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(
            rolling_mean(&v, 3),
            vec![None, None, Some(2.0), Some(3.0), Some(4.0)]
        );
    }

    #[test]
    fn rolling_mean_shorter_than_window_is_all_none() {
        assert_eq!(rolling_mean(&[1.0, 2.0], 3), vec![None, None]);
        assert_eq!(rolling_mean(&[1.0, 2.0], 0), vec![None, None]);
        assert!(rolling_mean(&[], 0).is_empty());
    }

    #[test]
    fn last_value_is_mean_of_final_window() {
        let v: Vec<f64> = (1..=60).map(|i| i as f64).collect();
        let sma = rolling_mean(&v, 20);
        assert_eq!(sma.len(), 60);
        // Mean of 41..=60.
        assert_eq!(sma.last().copied().flatten(), Some(50.5));
    }

    #[test]
    fn exactly_one_full_window() {
        assert_eq!(rolling_mean(&[2.0; 50], 50).last(), Some(&Some(2.0)));
        assert_eq!(rolling_mean(&[1.0; 49], 50).last(), Some(&None));
    }
}
