use crate::error::{PredictError, PredictResult};
use ndarray::{Array1, Array2, Array3, ArrayView2, Axis, s};
use serde::{Deserialize, Serialize};

/// Loaded inference artifact. Implementations must be deterministic and safe
/// to call concurrently from many requests.
pub trait ModelRuntime: Send + Sync {
    /// Timesteps per input window.
    fn window_size(&self) -> usize;

    /// Feature slots per timestep.
    fn feature_width(&self) -> usize;

    /// Forward pass over a `(1, window_size, feature_width)` tensor.
    fn infer(&self, tensor: &Array3<f64>) -> PredictResult<f64>;
}

/// On-disk layout of the exported network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LstmModelFile {
    pub window_size: usize,
    pub feature_width: usize,
    pub lstm_layers: Vec<LstmLayerFile>,
    pub dense: DenseFile,
}

/// Gate blocks are laid out input, forget, cell, output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LstmLayerFile {
    pub units: usize,
    pub kernel: Vec<Vec<f64>>,
    pub recurrent_kernel: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseFile {
    pub kernel: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

#[derive(Debug, Clone)]
struct LstmLayer {
    units: usize,
    kernel: Array2<f64>,
    recurrent_kernel: Array2<f64>,
    bias: Array1<f64>,
}

/// Stacked LSTM with a single-output dense head.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "LstmModelFile")]
pub struct LstmModel {
    window_size: usize,
    feature_width: usize,
    layers: Vec<LstmLayer>,
    dense_kernel: Array1<f64>,
    dense_bias: f64,
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn to_array2(
    name: &str,
    rows: Vec<Vec<f64>>,
    expected_rows: usize,
    expected_cols: usize,
) -> PredictResult<Array2<f64>> {
    if rows.len() != expected_rows || rows.iter().any(|r| r.len() != expected_cols) {
        return Err(PredictError::configuration(format!(
            "{} must be {}x{}",
            name, expected_rows, expected_cols
        )));
    }
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    check_finite(name, &flat)?;
    Array2::from_shape_vec((expected_rows, expected_cols), flat)
        .map_err(|e| PredictError::configuration(format!("{}: {}", name, e)))
}

fn check_finite(name: &str, values: &[f64]) -> PredictResult<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(PredictError::configuration(format!(
            "{} contains non-finite weights",
            name
        )))
    }
}

impl TryFrom<LstmModelFile> for LstmModel {
    type Error = PredictError;

    fn try_from(file: LstmModelFile) -> Result<Self, Self::Error> {
        if file.window_size == 0 || file.feature_width == 0 {
            return Err(PredictError::configuration(
                "window_size and feature_width must be positive",
            ));
        }
        if file.lstm_layers.is_empty() {
            return Err(PredictError::configuration(
                "model needs at least one LSTM layer",
            ));
        }

        let mut input_dim = file.feature_width;
        let mut layers = Vec::with_capacity(file.lstm_layers.len());

        for (n, layer) in file.lstm_layers.into_iter().enumerate() {
            let units = layer.units;
            if units == 0 {
                return Err(PredictError::configuration(format!(
                    "lstm_layers[{}] has zero units",
                    n
                )));
            }
            let gates = 4 * units;
            let kernel = to_array2(
                &format!("lstm_layers[{}].kernel", n),
                layer.kernel,
                input_dim,
                gates,
            )?;
            let recurrent_kernel = to_array2(
                &format!("lstm_layers[{}].recurrent_kernel", n),
                layer.recurrent_kernel,
                units,
                gates,
            )?;
            if layer.bias.len() != gates {
                return Err(PredictError::configuration(format!(
                    "lstm_layers[{}].bias must have {} entries",
                    n, gates
                )));
            }
            check_finite(&format!("lstm_layers[{}].bias", n), &layer.bias)?;

            layers.push(LstmLayer {
                units,
                kernel,
                recurrent_kernel,
                bias: Array1::from(layer.bias),
            });
            input_dim = units;
        }

        let dense = to_array2("dense.kernel", file.dense.kernel, input_dim, 1)?;
        if file.dense.bias.len() != 1 {
            return Err(PredictError::configuration(
                "dense.bias must have exactly one entry",
            ));
        }
        check_finite("dense.bias", &file.dense.bias)?;

        Ok(Self {
            window_size: file.window_size,
            feature_width: file.feature_width,
            layers,
            dense_kernel: dense.column(0).to_owned(),
            dense_bias: file.dense.bias[0],
        })
    }
}

impl LstmLayer {
    /// Runs the layer over every timestep and returns the full hidden sequence.
    fn run(&self, input: ArrayView2<f64>) -> Array2<f64> {
        let u = self.units;
        let mut h = Array1::<f64>::zeros(u);
        let mut c = Array1::<f64>::zeros(u);
        let mut out = Array2::<f64>::zeros((input.nrows(), u));

        for (t, x) in input.outer_iter().enumerate() {
            let z = x.dot(&self.kernel) + h.dot(&self.recurrent_kernel) + &self.bias;
            let i = z.slice(s![0..u]).mapv(sigmoid);
            let f = z.slice(s![u..2 * u]).mapv(sigmoid);
            let g = z.slice(s![2 * u..3 * u]).mapv(f64::tanh);
            let o = z.slice(s![3 * u..4 * u]).mapv(sigmoid);

            c = &f * &c + &i * &g;
            h = &o * &c.mapv(f64::tanh);
            out.row_mut(t).assign(&h);
        }

        out
    }
}

impl ModelRuntime for LstmModel {
    fn window_size(&self) -> usize {
        self.window_size
    }

    fn feature_width(&self) -> usize {
        self.feature_width
    }

    fn infer(&self, tensor: &Array3<f64>) -> PredictResult<f64> {
        let expected = [1, self.window_size, self.feature_width];
        if tensor.shape() != &expected[..] {
            return Err(PredictError::internal(format!(
                "model expects input shape {:?}, got {:?}",
                expected,
                tensor.shape()
            )));
        }

        let mut sequence = tensor.index_axis(Axis(0), 0).to_owned();
        for layer in &self.layers {
            sequence = layer.run(sequence.view());
        }

        let last = sequence.row(self.window_size - 1);
        let output = last.dot(&self.dense_kernel) + self.dense_bias;

        if !output.is_finite() {
            return Err(PredictError::internal("model produced a non-finite output"));
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_support::constant_model_file;

    #[test]
    fn test_zero_weights_yield_dense_bias() {
        let model = LstmModel::try_from(constant_model_file(60, 9, 0.42)).unwrap();
        let tensor = Array3::from_elem((1, 60, 9), 0.7);
        let out = model.infer(&tensor).unwrap();
        assert!((out - 0.42).abs() < 1e-12);
    }

    #[test]
    fn test_cell_bias_drives_hidden_state() {
        // One unit, no input or recurrent weights: i = f = o = 0.5, g = tanh(1).
        // c_t = 0.5 * c_{t-1} + 0.5 * g converges to g, h = 0.5 * tanh(c).
        let file = LstmModelFile {
            window_size: 60,
            feature_width: 1,
            lstm_layers: vec![LstmLayerFile {
                units: 1,
                kernel: vec![vec![0.0; 4]],
                recurrent_kernel: vec![vec![0.0; 4]],
                bias: vec![0.0, 0.0, 1.0, 0.0],
            }],
            dense: DenseFile {
                kernel: vec![vec![1.0]],
                bias: vec![0.0],
            },
        };
        let model = LstmModel::try_from(file).unwrap();
        let out = model.infer(&Array3::zeros((1, 60, 1))).unwrap();

        let g = 1.0_f64.tanh();
        let c = g * (1.0 - 0.5_f64.powi(60));
        let expected = 0.5 * c.tanh();
        assert!((out - expected).abs() < 1e-12);
    }

    #[test]
    fn test_input_kernel_reacts_to_input() {
        let file = LstmModelFile {
            window_size: 3,
            feature_width: 2,
            lstm_layers: vec![LstmLayerFile {
                units: 1,
                kernel: vec![vec![0.0, 0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0, 0.0]],
                recurrent_kernel: vec![vec![0.0; 4]],
                bias: vec![0.0; 4],
            }],
            dense: DenseFile {
                kernel: vec![vec![1.0]],
                bias: vec![0.0],
            },
        };
        let model = LstmModel::try_from(file).unwrap();
        let low = model.infer(&Array3::from_elem((1, 3, 2), 0.1)).unwrap();
        let high = model.infer(&Array3::from_elem((1, 3, 2), 0.9)).unwrap();
        assert!(high > low);
    }

    #[test]
    fn test_stacked_layers_load_and_run() {
        let mut file = constant_model_file(5, 3, 1.5);
        file.lstm_layers.push(LstmLayerFile {
            units: 2,
            kernel: vec![vec![0.1; 8]; 4],
            recurrent_kernel: vec![vec![0.1; 8]; 2],
            bias: vec![0.0; 8],
        });
        file.dense.kernel = vec![vec![0.0]; 2];
        let model = LstmModel::try_from(file).unwrap();
        let out = model.infer(&Array3::from_elem((1, 5, 3), 0.3)).unwrap();
        assert!((out - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_shape_mismatch_is_internal_error() {
        let model = LstmModel::try_from(constant_model_file(60, 9, 0.0)).unwrap();
        let err = model.infer(&Array3::zeros((1, 60, 1))).unwrap_err();
        assert!(matches!(err, PredictError::Internal(_)));
    }

    #[test]
    fn test_malformed_weights_rejected() {
        let mut file = constant_model_file(60, 9, 0.0);
        file.lstm_layers[0].kernel.pop();
        assert!(matches!(
            LstmModel::try_from(file),
            Err(PredictError::Configuration(_))
        ));

        let mut file = constant_model_file(60, 9, 0.0);
        file.dense.bias = vec![f64::NAN];
        assert!(LstmModel::try_from(file).is_err());

        let mut file = constant_model_file(60, 9, 0.0);
        file.lstm_layers.clear();
        assert!(LstmModel::try_from(file).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let json = serde_json::to_string(&constant_model_file(4, 2, 0.3)).unwrap();
        let model: LstmModel = serde_json::from_str(&json).unwrap();
        assert_eq!(model.window_size(), 4);
        assert_eq!(model.feature_width(), 2);
    }
}
