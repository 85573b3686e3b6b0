//! Vose's alias method for drawing from a discrete weighted distribution.

use crate::xoshiro::Xoshiro256;

/// Reasons a set of weights cannot form a distribution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("negative probability encountered")]
    NegativeProbability,
    #[error("probabilities don't sum to a positive value")]
    NonPositiveSum,
}

/// A sampler over `0..weights.len()` built with Vose's alias method.
#[derive(Debug)]
pub struct Weighted {
    probs: Vec<f64>,
    aliases: Vec<usize>,
}

#[allow(clippy::cast_precision_loss)]
impl Weighted {
    /// # Errors
    ///
    /// Fails for negative weights and for weights that sum to zero.
    pub fn new(weights: &[f64]) -> Result<Self, Error> {
        if weights.iter().any(|&w| w < 0.0) {
            return Err(Error::NegativeProbability);
        }
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(Error::NonPositiveSum);
        }
        let count = weights.len();
        let scale = count as f64 / total;
        let mut scaled: Vec<f64> = weights.iter().map(|w| w * scale).collect();

        let (mut small, mut large) = (Vec::new(), Vec::new());
        for j in (0..count).rev() {
            if scaled[j] < 1.0 {
                small.push(j);
            } else {
                large.push(j);
            }
        }

        // entries left over on either stack keep probability one
        let mut probs = vec![1.0; count];
        let mut aliases = vec![0; count];
        while let (Some(&less), Some(&more)) = (small.last(), large.last()) {
            small.pop();
            large.pop();
            probs[less] = scaled[less];
            aliases[less] = more;
            scaled[more] += scaled[less] - 1.0;
            if scaled[more] < 1.0 {
                small.push(more);
            } else {
                large.push(more);
            }
        }
        Ok(Self { probs, aliases })
    }

    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_sign_loss)]
    pub fn next(&self, rng: &mut Xoshiro256) -> usize {
        let column = rng.next_double();
        let coin = rng.next_double();
        let i = (self.probs.len() as f64 * column) as usize;
        if coin < self.probs[i] {
            i
        } else {
            self.aliases[i]
        }
    }
}

/// Draws the number of fragments mixed into one part.
///
/// Degree `d` in `1..=fragment_count` has probability proportional to `1/d`.
#[allow(clippy::cast_precision_loss)]
pub fn choose_degree(fragment_count: usize, rng: &mut Xoshiro256) -> usize {
    let weights: Vec<f64> = (1..=fragment_count.max(1)).map(|d| 1.0 / d as f64).collect();
    Weighted::new(&weights).map_or(1, |sampler| sampler.next(rng) + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampler() {
        let mut rng = Xoshiro256::new(b"Wolf");
        let sampler = Weighted::new(&[1.0, 2.0, 4.0, 8.0]).unwrap();

        let expected_samples: Vec<usize> = vec![
            3, 3, 3, 3, 3, 3, 3, 0, 2, 3, 3, 3, 3, 1, 2, 2, 1, 3, 3, 2, 3, 3, 1, 1, 2, 1, 1, 3, 1,
            3, 1, 2, 0, 2, 1, 0, 3, 3, 3, 1, 3, 3, 3, 3, 1, 3, 2, 3, 2, 2, 3, 3, 3, 3, 2, 3, 3, 0,
            3, 3, 3, 3, 1, 2, 3, 3, 2, 2, 2, 1, 2, 2, 1, 2, 3, 1, 3, 0, 3, 2, 3, 3, 3, 3, 3, 3, 3,
            3, 2, 3, 1, 3, 3, 2, 0, 2, 2, 3, 1, 1, 2, 3, 2, 3, 3, 3, 3, 2, 3, 3, 3, 3, 3, 2, 3, 1,
            2, 1, 1, 3, 1, 3, 2, 2, 3, 3, 3, 1, 3, 3, 3, 3, 3, 3, 3, 3, 2, 3, 2, 3, 3, 1, 2, 3, 3,
            1, 3, 2, 3, 3, 3, 2, 3, 1, 3, 0, 3, 2, 1, 1, 3, 1, 3, 2, 3, 3, 3, 3, 2, 0, 3, 3, 1, 3,
            0, 2, 1, 3, 3, 1, 1, 3, 1, 2, 3, 3, 3, 0, 2, 3, 2, 0, 1, 3, 3, 3, 2, 2, 2, 3, 3, 3, 3,
            3, 2, 3, 3, 3, 3, 2, 3, 3, 2, 0, 2, 3, 3, 3, 3, 2, 1, 1, 1, 2, 1, 3, 3, 3, 2, 2, 3, 3,
            1, 2, 3, 0, 3, 2, 3, 3, 3, 3, 0, 2, 2, 3, 2, 2, 3, 3, 3, 3, 1, 3, 2, 3, 3, 3, 3, 3, 2,
            2, 3, 1, 3, 0, 2, 1, 3, 3, 3, 3, 3, 3, 3, 3, 1, 3, 3, 3, 3, 2, 2, 2, 3, 1, 1, 3, 2, 2,
            0, 3, 2, 1, 2, 1, 0, 3, 3, 3, 2, 2, 3, 2, 1, 2, 0, 0, 3, 3, 2, 3, 3, 2, 3, 3, 3, 3, 3,
            2, 2, 2, 3, 3, 3, 3, 3, 1, 1, 3, 2, 2, 3, 1, 1, 0, 1, 3, 2, 3, 3, 2, 3, 3, 2, 3, 3, 2,
            2, 2, 2, 3, 2, 2, 2, 2, 2, 1, 2, 3, 3, 2, 2, 2, 2, 3, 3, 2, 0, 2, 1, 3, 3, 3, 3, 0, 3,
            3, 3, 3, 2, 2, 3, 1, 3, 3, 3, 2, 3, 3, 3, 2, 3, 3, 3, 3, 2, 3, 2, 1, 3, 3, 3, 3, 2, 2,
            0, 1, 2, 3, 2, 0, 3, 3, 3, 3, 3, 3, 1, 3, 3, 2, 3, 2, 2, 3, 3, 3, 3, 3, 2, 2, 3, 3, 2,
            2, 2, 1, 3, 3, 3, 3, 1, 2, 3, 2, 3, 3, 2, 3, 2, 3, 3, 3, 2, 3, 1, 2, 3, 2, 1, 1, 3, 3,
            2, 3, 3, 2, 3, 3, 0, 0, 1, 3, 3, 2, 3, 3, 3, 3, 1, 3, 3, 0, 3, 2, 3, 3, 1, 3, 3, 3, 3,
            3, 3, 3, 0, 3, 3, 2,
        ];
        let drawn: Vec<usize> = (0..expected_samples.len())
            .map(|_| sampler.next(&mut rng))
            .collect();
        assert_eq!(drawn, expected_samples);
    }

    #[test]
    fn test_choose_degree() {
        let message = crate::xoshiro::test_utils::make_message("Wolf", 1024);
        let fragment_length = crate::fountain::fragment_length(message.len(), 100);
        let fragments = crate::fountain::partition(message, fragment_length);
        let expected_degrees: [usize; 200] = [
            11, 3, 6, 5, 2, 1, 2, 11, 1, 3, 9, 10, 10, 4, 2, 1, 1, 2, 1, 1, 5, 2, 4, 10, 3, 2, 1,
            1, 3, 11, 2, 6, 2, 9, 9, 2, 6, 7, 2, 5, 2, 4, 3, 1, 6, 11, 2, 11, 3, 1, 6, 3, 1, 4, 5,
            3, 6, 1, 1, 3, 1, 2, 2, 1, 4, 5, 1, 1, 9, 1, 1, 6, 4, 1, 5, 1, 2, 2, 3, 1, 1, 5, 2, 6,
            1, 7, 11, 1, 8, 1, 5, 1, 1, 2, 2, 6, 4, 10, 1, 2, 5, 5, 5, 1, 1, 4, 1, 1, 1, 3, 5, 5,
            5, 1, 4, 3, 3, 5, 1, 11, 3, 2, 8, 1, 2, 1, 1, 4, 5, 2, 1, 1, 1, 5, 6, 11, 10, 7, 4, 7,
            1, 5, 3, 1, 1, 9, 1, 2, 5, 5, 2, 2, 3, 10, 1, 3, 2, 3, 3, 1, 1, 2, 1, 3, 2, 2, 1, 3, 8,
            4, 1, 11, 6, 3, 1, 1, 1, 1, 1, 3, 1, 2, 1, 10, 1, 1, 8, 2, 7, 1, 2, 1, 9, 2, 10, 2, 1,
            3, 4, 10,
        ];
        for (nonce, expected) in (1..).zip(expected_degrees) {
            let mut rng = Xoshiro256::new(format!("Wolf-{nonce}").as_bytes());
            assert_eq!(choose_degree(fragments.len(), &mut rng), expected, "nonce {nonce}");
        }
        let mut rng = Xoshiro256::new(b"Wolf");
        for _ in 0..10 {
            assert_eq!(choose_degree(1, &mut rng), 1);
        }
    }

    #[test]
    fn test_weight_errors() {
        assert_eq!(
            Weighted::new(&[2.0, -1.0]).unwrap_err().to_string(),
            "negative probability encountered"
        );
        assert_eq!(
            Weighted::new(&[0.0]).unwrap_err().to_string(),
            "probabilities don't sum to a positive value"
        );
    }
}
