//! Differencing and integration of series

use crate::{MathError, Result};

/// First difference; the leading undefined value is dropped, so the output
/// is one element shorter than the input.
pub fn difference(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// A series differenced `order` times, together with the last value of every
/// intermediate level so forecasts can be integrated back.
#[derive(Debug, Clone, PartialEq)]
pub struct Differenced {
    /// The differenced values
    pub values: Vec<f64>,
    /// `anchors[k]` is the last value of the series differenced `k` times
    pub anchors: Vec<f64>,
}

impl Differenced {
    /// Differencing order applied
    pub fn order(&self) -> usize {
        self.anchors.len()
    }

    /// Undo the differencing for values that continue the differenced series.
    pub fn integrate(&self, continuation: &[f64]) -> Vec<f64> {
        integrate(continuation, &self.anchors)
    }
}

/// Difference `values` `order` times.
///
/// Fails when the series has no more than `order` observations, since nothing
/// would be left.
pub fn difference_n(values: &[f64], order: usize) -> Result<Differenced> {
    if values.len() <= order {
        return Err(MathError::InsufficientData(format!(
            "Cannot difference {} observations {} times",
            values.len(),
            order
        )));
    }

    let mut anchors = Vec::with_capacity(order);
    let mut current = values.to_vec();
    for _ in 0..order {
        // non-empty: len > order guarantees at least one value remains per level
        anchors.push(current[current.len() - 1]);
        current = difference(&current);
    }

    Ok(Differenced {
        values: current,
        anchors,
    })
}

/// Cumulatively sum `continuation` back up through every differencing level.
pub fn integrate(continuation: &[f64], anchors: &[f64]) -> Vec<f64> {
    let mut level = continuation.to_vec();
    for &anchor in anchors.iter().rev() {
        let mut running = anchor;
        for value in level.iter_mut() {
            running += *value;
            *value = running;
        }
    }
    level
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_difference() {
        assert_eq!(difference(&[1.0, 4.0, 9.0, 16.0]), vec![3.0, 5.0, 7.0]);
        assert!(difference(&[1.0]).is_empty());
    }

    #[test]
    fn test_difference_n_keeps_anchors() {
        let squares = [1.0, 4.0, 9.0, 16.0, 25.0];
        let diffed = difference_n(&squares, 2).unwrap();

        assert_eq!(diffed.values, vec![2.0, 2.0, 2.0]);
        assert_eq!(diffed.anchors, vec![25.0, 9.0]);
        assert_eq!(diffed.order(), 2);
    }

    #[test]
    fn test_integrate_continues_series() {
        let squares = [1.0, 4.0, 9.0, 16.0, 25.0];
        let diffed = difference_n(&squares, 2).unwrap();

        // second differences of n^2 are constant 2
        let next = diffed.integrate(&[2.0, 2.0, 2.0]);
        assert_eq!(next, vec![36.0, 49.0, 64.0]);
    }

    #[test]
    fn test_zero_order_is_identity() {
        let values = [3.0, 1.0, 2.0];
        let diffed = difference_n(&values, 0).unwrap();
        assert_eq!(diffed.values, values.to_vec());
        assert_eq!(diffed.integrate(&[5.0]), vec![5.0]);
    }

    #[test]
    fn test_too_short() {
        assert!(difference_n(&[1.0, 2.0], 2).is_err());
    }
}
