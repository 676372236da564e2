//! Small feed-forward steering network
//!
//! Architecture: rays -> hidden layers (ReLU) -> one output (tanh).
//! Weights are stored row-major per layer, `weights[out * inputs + in]`.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::policy::{Policy, PolicyError};

/// Default hidden layer sizes
pub const DEFAULT_HIDDEN: &[usize] = &[5];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct DenseLayer {
    inputs: usize,
    outputs: usize,
    weights: Vec<f32>,
    biases: Vec<f32>,
}

impl DenseLayer {
    fn zeros(inputs: usize, outputs: usize) -> Self {
        Self {
            inputs,
            outputs,
            weights: vec![0.0; inputs * outputs],
            biases: vec![0.0; outputs],
        }
    }

    /// Xavier/Glorot uniform weights, zero biases
    fn xavier<R: Rng + ?Sized>(inputs: usize, outputs: usize, rng: &mut R) -> Self {
        let limit = (6.0 / (inputs + outputs) as f32).sqrt();
        let weights = (0..inputs * outputs)
            .map(|_| rng.random_range(-limit..=limit))
            .collect();
        Self {
            inputs,
            outputs,
            weights,
            biases: vec![0.0; outputs],
        }
    }

    fn forward(&self, input: &[f32], output: &mut Vec<f32>) {
        output.clear();
        output.extend((0..self.outputs).map(|o| {
            let row = &self.weights[o * self.inputs..(o + 1) * self.inputs];
            row.iter().zip(input).map(|(w, x)| w * x).sum::<f32>() + self.biases[o]
        }));
    }

    fn parameters_mut(&mut self) -> impl Iterator<Item = &mut f32> {
        self.weights.iter_mut().chain(self.biases.iter_mut())
    }
}

/// Multi-layer perceptron steering policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlpPolicy {
    layers: Vec<DenseLayer>,
    #[serde(skip)]
    scratch: (Vec<f32>, Vec<f32>),
}

impl MlpPolicy {
    /// All-zero network; steers straight until randomized
    pub fn new(inputs: usize, hidden: &[usize]) -> Self {
        Self::build(inputs, hidden, DenseLayer::zeros)
    }

    /// Randomly initialized network
    pub fn random<R: Rng + ?Sized>(inputs: usize, hidden: &[usize], rng: &mut R) -> Self {
        Self::build(inputs, hidden, |i, o| DenseLayer::xavier(i, o, &mut *rng))
    }

    fn build(inputs: usize, hidden: &[usize], mut layer: impl FnMut(usize, usize) -> DenseLayer) -> Self {
        let mut sizes = Vec::with_capacity(hidden.len() + 2);
        sizes.push(inputs);
        sizes.extend_from_slice(hidden);
        sizes.push(1);

        let layers = sizes.windows(2).map(|pair| layer(pair[0], pair[1])).collect();
        Self {
            layers,
            scratch: Default::default(),
        }
    }

    pub fn input_dim(&self) -> usize {
        self.layers.first().map_or(0, |layer| layer.inputs)
    }

    /// Hidden layer widths, input and output excluded
    pub fn hidden_dims(&self) -> Vec<usize> {
        let count = self.layers.len().saturating_sub(1);
        self.layers[..count].iter().map(|layer| layer.outputs).collect()
    }

    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|layer| layer.weights.len() + layer.biases.len())
            .sum()
    }

    /// Flat copy of every weight and bias, layer by layer
    pub fn parameters(&self) -> Vec<f32> {
        self.layers
            .iter()
            .flat_map(|layer| layer.weights.iter().chain(&layer.biases).copied())
            .collect()
    }

    /// Forward pass without dimension checks on the hot path
    fn forward(&mut self, observation: &[f32]) -> f32 {
        let (current, next) = &mut self.scratch;
        current.clear();
        current.extend_from_slice(observation);

        let last = self.layers.len() - 1;
        for (index, layer) in self.layers.iter().enumerate() {
            layer.forward(current.as_slice(), next);
            if index < last {
                next.iter_mut().for_each(|value| *value = value.max(0.0));
            }
            std::mem::swap(current, next);
        }

        current.first().copied().unwrap_or(0.0).tanh()
    }
}

impl Policy for MlpPolicy {
    fn think(&mut self, observation: &[f32]) -> Result<f32, PolicyError> {
        let expected = self.input_dim();
        if observation.len() != expected {
            return Err(PolicyError::ObservationSize {
                expected,
                actual: observation.len(),
            });
        }
        Ok(self.forward(observation))
    }

    fn mutate<R: Rng + ?Sized>(&self, rate: f32, rng: &mut R) -> Result<Self, PolicyError> {
        if !rate.is_finite() || rate < 0.0 {
            return Err(PolicyError::Backend(format!("invalid mutation rate {rate}")));
        }

        let mut child = self.clone();
        for layer in &mut child.layers {
            for parameter in layer.parameters_mut() {
                *parameter += gaussian(rng) * rate;
            }
        }
        Ok(child)
    }

    fn randomize<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let hidden = self.hidden_dims();
        Self::random(self.input_dim(), &hidden, rng)
    }

    fn observation_size(&self) -> Option<usize> {
        Some(self.input_dim())
    }
}

/// Standard normal sample (Box-Muller)
fn gaussian<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    let u1 = rng.random::<f32>().max(f32::EPSILON);
    let u2 = rng.random::<f32>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    #[test]
    fn test_shape() {
        let policy = MlpPolicy::new(5, DEFAULT_HIDDEN);
        assert_eq!(policy.input_dim(), 5);
        assert_eq!(policy.hidden_dims(), vec![5]);
        // 5x5 + 5 hidden, 5x1 + 1 output
        assert_eq!(policy.parameter_count(), 36);
        assert_eq!(policy.observation_size(), Some(5));
    }

    #[test]
    fn test_zero_network_steers_straight() {
        let mut policy = MlpPolicy::new(3, &[4, 4]);
        assert_eq!(policy.think(&[1.0, 0.5, 0.2]).unwrap(), 0.0);
    }

    #[test]
    fn test_think_rejects_wrong_size() {
        let mut policy = MlpPolicy::new(5, DEFAULT_HIDDEN);
        assert_eq!(
            policy.think(&[0.1, 0.2, 0.3]),
            Err(PolicyError::ObservationSize {
                expected: 5,
                actual: 3
            })
        );
    }

    #[test]
    fn test_output_in_range() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(3);
        let mut policy = MlpPolicy::random(5, DEFAULT_HIDDEN, &mut rng);
        for i in 0..50 {
            let x = i as f32 / 50.0;
            let steering = policy.think(&[x, 1.0 - x, 0.5, x * x, 0.0]).unwrap();
            assert!((-1.0..=1.0).contains(&steering));
        }
    }

    #[test]
    fn test_think_is_deterministic() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(11);
        let mut policy = MlpPolicy::random(3, &[6], &mut rng);
        let observation = [0.3, 0.9, 0.1];
        let first = policy.think(&observation).unwrap();
        assert_eq!(policy.think(&observation).unwrap(), first);
    }

    #[test]
    fn test_xavier_bounds_and_zero_biases() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(5);
        let policy = MlpPolicy::random(5, &[5], &mut rng);
        for layer in &policy.layers {
            let limit = (6.0 / (layer.inputs + layer.outputs) as f32).sqrt();
            assert!(layer.weights.iter().all(|w| w.abs() <= limit));
            assert!(layer.biases.iter().all(|&b| b == 0.0));
        }
    }

    #[test]
    fn test_randomize_keeps_shape() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(9);
        let prototype = MlpPolicy::new(3, &[7, 2]);
        let fresh = prototype.randomize(&mut rng);
        assert_eq!(fresh.input_dim(), 3);
        assert_eq!(fresh.hidden_dims(), vec![7, 2]);
        assert_ne!(fresh.parameters(), prototype.parameters());
    }

    #[test]
    fn test_mutate_leaves_parent_untouched() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let parent = MlpPolicy::random(5, DEFAULT_HIDDEN, &mut rng);
        let before = parent.parameters();

        let child = parent.mutate(0.01, &mut rng).unwrap();
        assert_eq!(parent.parameters(), before);
        assert_ne!(child.parameters(), before);

        // Noise with std 0.01 stays small
        for (c, p) in child.parameters().iter().zip(&before) {
            assert!((c - p).abs() < 0.1);
        }
    }

    #[test]
    fn test_zero_rate_is_a_copy() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let parent = MlpPolicy::random(5, DEFAULT_HIDDEN, &mut rng);
        let child = parent.mutate(0.0, &mut rng).unwrap();
        assert_eq!(child.parameters(), parent.parameters());
    }

    #[test]
    fn test_negative_rate_rejected() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let parent = MlpPolicy::new(5, DEFAULT_HIDDEN);
        assert!(matches!(parent.mutate(-1.0, &mut rng), Err(PolicyError::Backend(_))));
    }

    #[test]
    fn test_gaussian_statistics() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(21);
        let samples: Vec<f32> = (0..20_000).map(|_| gaussian(&mut rng)).collect();
        let mean = samples.iter().sum::<f32>() / samples.len() as f32;
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f32>() / samples.len() as f32;
        assert!(mean.abs() < 0.05);
        assert!((variance - 1.0).abs() < 0.05);
    }

    #[test]
    fn test_bincode_round_trip() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(8);
        let policy = MlpPolicy::random(5, DEFAULT_HIDDEN, &mut rng);

        let bytes = bincode_next::serde::encode_to_vec(&policy, bincode_next::config::standard()).unwrap();
        let (decoded, _): (MlpPolicy, usize) =
            bincode_next::serde::decode_from_slice(&bytes, bincode_next::config::standard()).unwrap();
        assert_eq!(decoded.parameters(), policy.parameters());
        assert_eq!(decoded.hidden_dims(), policy.hidden_dims());
    }
}
