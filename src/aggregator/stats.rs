//! Descriptive statistics over sample sequences.

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator)
///
/// Undefined for fewer than two samples.
pub fn sample_stdev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - avg).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Most frequent item; ties go to the one seen first
pub fn majority_vote<T, I>(items: I) -> Option<T>
where
    T: PartialEq + Copy,
    I: IntoIterator<Item = T>,
{
    // Insertion order is first-seen order
    let mut tally: Vec<(T, usize)> = Vec::new();
    for item in items {
        match tally.iter_mut().find(|(seen, _)| *seen == item) {
            Some((_, count)) => *count += 1,
            None => tally.push((item, 1)),
        }
    }

    let best = tally.iter().map(|(_, count)| *count).max()?;
    tally
        .into_iter()
        .find(|(_, count)| *count == best)
        .map(|(item, _)| item)
}
