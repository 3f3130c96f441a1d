use std::collections::BTreeMap;

use crate::data::model::Value;

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Middle value, or the average of the two middle values for even counts.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Most frequent non-missing value; ties go to the smallest value.
pub fn mode<'a>(values: impl IntoIterator<Item = &'a Value>) -> Option<Value> {
    let mut counts: BTreeMap<&Value, usize> = BTreeMap::new();
    for v in values.into_iter().filter(|v| !v.is_missing()) {
        *counts.entry(v).or_default() += 1;
    }
    let mut best: Option<(&Value, usize)> = None;
    for (value, count) in counts {
        // Strictly greater keeps the first (smallest) value on ties.
        match best {
            Some((_, n)) if count <= n => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(v, _)| v.clone())
}

/// `(min, max)` of a slice; `None` for an empty slice.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_and_median() {
        assert_relative_eq!(mean(&[1.0, 2.0, 6.0]).unwrap(), 3.0);
        assert_relative_eq!(median(&[5.0, 1.0, 3.0]).unwrap(), 3.0);
        assert_relative_eq!(median(&[4.0, 1.0, 3.0, 2.0]).unwrap(), 2.5);
        assert!(mean(&[]).is_none());
        assert!(median(&[]).is_none());
    }

    #[test]
    fn mode_breaks_ties_on_smallest_value() {
        let values = vec![
            Value::Text("b".into()),
            Value::Text("a".into()),
            Value::Text("b".into()),
            Value::Text("a".into()),
            Value::Null,
            Value::Null,
            Value::Null,
        ];
        assert_eq!(mode(&values), Some(Value::Text("a".into())));
    }

    #[test]
    fn mode_of_only_missing_values_is_none() {
        let values = vec![Value::Null, Value::Float(f64::NAN)];
        assert_eq!(mode(&values), None);
    }

    #[test]
    fn min_max_of_values() {
        assert_eq!(min_max(&[3.0, -1.0, 7.5]), Some((-1.0, 7.5)));
        assert_eq!(min_max(&[]), None);
    }
}
