use serde::Serialize;

use super::sort::sort_by_key;

/// Interpolated percentile of `values` for `p` in [0, 100].
///
/// p = 0 returns the minimum and p = 100 the maximum; values of `p` outside
/// the range clamp to those ends. In between, the fractional rank
/// `(p/100)·(n−1)` is linearly interpolated between its neighboring sorted
/// elements. Empty input returns the 0.0 sentinel; callers must check size
/// when 0.0 is a meaningful value.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let sorted = sort_by_key(values.to_vec(), |v| *v, false);
    let n = sorted.len();
    if p <= 0.0 {
        return sorted[0];
    }
    if p >= 100.0 {
        return sorted[n - 1];
    }

    let position = (p / 100.0) * (n - 1) as f64;
    let lower = position.floor() as usize;
    let upper = (lower + 1).min(n - 1);
    let weight = position - lower as f64;
    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}

/// IQR fence values computed from one population, reusable against another.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OutlierBounds {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
}

impl OutlierBounds {
    pub fn from_quartiles(q1: f64, q3: f64, multiplier: f64) -> Self {
        let iqr = q3 - q1;
        Self {
            q1,
            q3,
            iqr,
            lower: q1 - multiplier * iqr,
            upper: q3 + multiplier * iqr,
        }
    }

    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

/// IQR outlier detection. Returns the indices of values strictly outside
/// `[Q1 − m·IQR, Q3 + m·IQR]` together with the bounds themselves. Fewer
/// than 4 values cannot support quartiles: no outliers, no bounds.
pub fn detect_outliers_iqr(values: &[f64], multiplier: f64) -> (Vec<usize>, Option<OutlierBounds>) {
    if values.len() < 4 {
        return (Vec::new(), None);
    }

    let q1 = percentile(values, 25.0);
    let q3 = percentile(values, 75.0);
    let bounds = OutlierBounds::from_quartiles(q1, q3, multiplier);

    let outliers = values
        .iter()
        .enumerate()
        .filter(|(_, value)| bounds.is_outlier(**value))
        .map(|(index, _)| index)
        .collect();

    (outliers, Some(bounds))
}

/// Descriptive statistics over one pass of the input.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
}

/// Single-pass mean, population variance (divide by n), standard deviation,
/// min, max, and range via Welford's update. `None` for empty input.
pub fn describe(values: &[f64]) -> Option<Summary> {
    let first = *values.first()?;

    let mut mean = 0.0;
    let mut m2 = 0.0;
    let mut min = first;
    let mut max = first;
    for (i, value) in values.iter().enumerate() {
        let delta = value - mean;
        mean += delta / (i + 1) as f64;
        m2 += delta * (value - mean);
        if *value < min {
            min = *value;
        }
        if *value > max {
            max = *value;
        }
    }

    let variance = m2 / values.len() as f64;
    Some(Summary {
        count: values.len(),
        mean,
        variance,
        std_dev: variance.sqrt(),
        min,
        max,
        range: max - min,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_to_ten() -> Vec<f64> {
        (1..=10).map(f64::from).collect()
    }

    #[test]
    fn percentile_interpolates_fractional_ranks() {
        let values = one_to_ten();
        assert_eq!(percentile(&values, 50.0), 5.5);
        assert_eq!(percentile(&values, 25.0), 3.25);
    }

    #[test]
    fn percentile_extremes_are_min_and_max() {
        let values = vec![45.2, 23.8, 67.1, 12.5, 89.3, 34.7];
        assert_eq!(percentile(&values, 0.0), 12.5);
        assert_eq!(percentile(&values, 100.0), 89.3);
    }

    #[test]
    fn percentile_empty_input_returns_sentinel() {
        assert_eq!(percentile(&[], 50.0), 0.0);
    }

    #[test]
    fn iqr_partitions_values_exactly_at_the_fences() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 100.0];
        let (outliers, bounds) = detect_outliers_iqr(&values, 1.5);
        let bounds = bounds.expect("enough values for quartiles");

        assert_eq!(outliers, vec![8]);
        for (index, value) in values.iter().enumerate() {
            if outliers.contains(&index) {
                assert!(*value < bounds.lower || *value > bounds.upper);
            } else {
                assert!(*value >= bounds.lower && *value <= bounds.upper);
            }
        }
    }

    #[test]
    fn iqr_needs_at_least_four_values() {
        let (outliers, bounds) = detect_outliers_iqr(&[1.0, 2.0, 900.0], 1.5);
        assert!(outliers.is_empty());
        assert!(bounds.is_none());
    }

    #[test]
    fn bounds_computed_on_a_sample_apply_to_other_values() {
        let bounds = OutlierBounds::from_quartiles(100.0, 200.0, 2.0);
        assert_eq!(bounds.lower, -100.0);
        assert_eq!(bounds.upper, 400.0);
        assert!(bounds.is_outlier(401.0));
        assert!(!bounds.is_outlier(400.0));
        assert!(bounds.is_outlier(-100.5));
    }

    #[test]
    fn describe_computes_population_statistics() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let summary = describe(&values).expect("non-empty input");

        assert_eq!(summary.count, 8);
        assert!((summary.mean - 5.0).abs() < 1e-9);
        assert!((summary.variance - 4.0).abs() < 1e-9);
        assert!((summary.std_dev - 2.0).abs() < 1e-9);
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 9.0);
        assert_eq!(summary.range, 7.0);
    }

    #[test]
    fn describe_empty_input_is_none() {
        assert!(describe(&[]).is_none());
    }
}
