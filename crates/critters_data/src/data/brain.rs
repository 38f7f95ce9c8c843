use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};

/// One layer of a fixed-topology feed-forward network.
///
/// `weights[i][j]` connects neuron `i` of the previous layer to neuron `j` of
/// this layer. The input layer carries no weights and no biases.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub struct Layer {
    /// Incoming weight matrix, rows = previous layer size, columns = this layer size.
    pub weights: Vec<Vec<f32>>,
    /// One bias per neuron of this layer.
    pub biases: Vec<f32>,
    /// Activations from the most recent forward pass (not serialized).
    #[serde(skip, default)]
    #[with(rkyv::with::Skip)]
    pub values: Vec<f32>,
}

impl Layer {
    /// An input layer holding `size` neurons and no parameters.
    #[must_use]
    pub fn input(size: usize) -> Self {
        Self {
            weights: Vec::new(),
            biases: Vec::new(),
            values: vec![0.0; size],
        }
    }

    /// Whether the serialized parameters of two layers are identical.
    #[must_use]
    pub fn same_parameters(&self, other: &Layer) -> bool {
        self.weights == other.weights && self.biases == other.biases
    }
}

/// The neural controller of a critter: layer 0 is the input layer, the last
/// layer is the output layer.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub struct Brain {
    pub layers: Vec<Layer>,
}

impl Brain {
    /// Whether two brains carry identical weights and biases, ignoring activations.
    #[must_use]
    pub fn same_parameters(&self, other: &Brain) -> bool {
        self.layers.len() == other.layers.len()
            && self
                .layers
                .iter()
                .zip(&other.layers)
                .all(|(a, b)| a.same_parameters(b))
    }
}
