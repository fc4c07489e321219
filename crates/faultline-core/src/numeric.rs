//! Small statistics helpers shared by the analysis crates.

/// Arithmetic mean, 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance, 0.0 for an empty slice.
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Shannon entropy (bits) of a frequency distribution.
pub fn shannon_entropy<I>(counts: I) -> f64
where
    I: IntoIterator<Item = usize>,
{
    let counts: Vec<usize> = counts.into_iter().filter(|c| *c > 0).collect();
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    counts
        .iter()
        .map(|c| {
            let p = *c as f64 / total as f64;
            -p * p.log2()
        })
        .sum()
}

/// Gaps between consecutive timestamps of an ascending series.
pub fn intervals(timestamps: &[i64]) -> Vec<f64> {
    timestamps
        .windows(2)
        .map(|w| (w[1] - w[0]) as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_dev_of_constant_series_is_zero() {
        assert_eq!(std_dev(&[3.0, 3.0, 3.0]), 0.0);
    }

    #[test]
    fn entropy_of_uniform_pair_is_one_bit() {
        assert!((shannon_entropy([5, 5]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn intervals_of_even_series() {
        assert_eq!(intervals(&[0, 10, 20, 30]), vec![10.0, 10.0, 10.0]);
    }
}
