use crate::error::PinnError;
use crate::jet::Jet;
use crate::sampling::SampleSet;
use burn::config::Config;
use burn::module::{Ignored, Module};
use burn::nn::{Linear, LinearConfig};
use burn::prelude::Backend;
use burn::tensor::Tensor;
use burn::tensor::activation::{relu, sigmoid};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 隠れ層の活性化関数。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Sigmoid,
    Tanh,
    Relu,
    Linear,
}

impl Activation {
    pub fn apply<B: Backend>(&self, z: Tensor<B, 2>) -> Tensor<B, 2> {
        match self {
            Self::Sigmoid => sigmoid(z),
            Self::Tanh => z.tanh(),
            Self::Relu => relu(z),
            Self::Linear => z,
        }
    }

    /// 活性化 `f(z)` を、`f'(z)` と `f''(z)` と共に返します。
    ///
    /// 恒等写像の場合は `None` を返し、呼び出し側はジェットをそのまま使います。
    fn derivatives<B: Backend>(
        &self,
        z: Tensor<B, 2>,
    ) -> Option<(Tensor<B, 2>, Tensor<B, 2>, Tensor<B, 2>)> {
        match self {
            Self::Sigmoid => {
                let s = sigmoid(z);
                let slope = s.clone() * s.clone().neg().add_scalar(1.0);
                let curvature = slope.clone() * s.clone().mul_scalar(-2.0).add_scalar(1.0);
                Some((s, slope, curvature))
            }
            Self::Tanh => {
                let t = z.tanh();
                let slope = (t.clone() * t.clone()).neg().add_scalar(1.0);
                let curvature = t.clone().mul_scalar(-2.0) * slope.clone();
                Some((t, slope, curvature))
            }
            Self::Relu => {
                let slope = z.clone().greater_elem(0.0).float();
                let curvature = slope.zeros_like();
                Some((relu(z), slope, curvature))
            }
            Self::Linear => None,
        }
    }
}

impl FromStr for Activation {
    type Err = PinnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sigmoid" => Ok(Self::Sigmoid),
            "tanh" => Ok(Self::Tanh),
            "relu" => Ok(Self::Relu),
            "linear" | "identity" => Ok(Self::Linear),
            _ => Err(PinnError::UnknownActivation(s.to_string())),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sigmoid => "sigmoid",
            Self::Tanh => "tanh",
            Self::Relu => "relu",
            Self::Linear => "linear",
        };
        f.write_str(name)
    }
}

/// 出力層の `n_o` チャネルを1つの解の値にまとめる方法。
///
/// 積を取る構成では、いずれかの出力が境界で消えるように作れば
/// 解も自然にその境界で消えます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputReduction {
    Product,
    Sum,
}

impl OutputReduction {
    fn reduce<B: Backend>(&self, outputs: Tensor<B, 2>) -> Tensor<B, 2> {
        let [n, width] = outputs.dims();
        match self {
            Self::Sum => outputs.sum_dim(1),
            Self::Product => {
                let mut acc = outputs.clone().slice([0..n, 0..1]);
                for k in 1..width {
                    acc = acc * outputs.clone().slice([0..n, k..k + 1]);
                }
                acc
            }
        }
    }

    fn reduce_jet<B: Backend>(&self, outputs: Jet<B>) -> Jet<B> {
        let width = outputs.value.dims()[1];
        let mut acc = outputs.column(0);
        for k in 1..width {
            acc = match self {
                Self::Sum => acc.add(outputs.column(k)),
                Self::Product => acc.mul(outputs.column(k)),
            };
        }
        acc
    }
}

impl FromStr for OutputReduction {
    type Err = PinnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "product" | "prod" => Ok(Self::Product),
            "sum" => Ok(Self::Sum),
            _ => Err(PinnError::UnknownReduction(s.to_string())),
        }
    }
}

/// [`Model`] の構成。
#[derive(Config, Debug)]
pub struct ModelConfig {
    /// 入力座標の次元
    pub n_inputs: usize,
    /// 隠れ層の幅
    pub n_hidden: usize,
    /// 出力層の幅
    #[config(default = 2)]
    pub n_outputs: usize,
    #[config(default = "Activation::Sigmoid")]
    pub activation: Activation,
    #[config(default = "OutputReduction::Product")]
    pub reduction: OutputReduction,
}

impl ModelConfig {
    /// 各層の幅が1以上であることを確認します。
    pub fn validate(&self) -> Result<(), PinnError> {
        for (name, width) in [
            ("n_inputs", self.n_inputs),
            ("n_hidden", self.n_hidden),
            ("n_outputs", self.n_outputs),
        ] {
            if width == 0 {
                return Err(PinnError::invalid_argument(name, "1以上の整数が必要です"));
            }
        }
        Ok(())
    }

    /// 新しいモデルを初期化します。パラメータはフレームワーク既定の方法で初期化されます。
    pub fn init<B: Backend>(&self, device: &B::Device) -> Model<B> {
        Model {
            hidden: LinearConfig::new(self.n_inputs, self.n_hidden).init(device),
            output: LinearConfig::new(self.n_hidden, self.n_outputs).init(device),
            activation: Ignored(self.activation),
            reduction: Ignored(self.reduction),
        }
    }
}

/// PINNの本体となるニューラルネットワークモデル。
///
/// 座標を入力とし、隠れ層1層の多層パーセプトロンの出力チャネルを
/// [`OutputReduction`] でまとめて、各点での解の近似値を1つ返します。
/// 損失関数については何も知りません。
#[derive(Module, Debug)]
pub struct Model<B: Backend> {
    hidden: Linear<B>,
    output: Linear<B>,
    activation: Ignored<Activation>,
    reduction: Ignored<OutputReduction>,
}

impl<B: Backend> Model<B> {
    pub fn n_inputs(&self) -> usize {
        self.hidden.weight.val().dims()[0]
    }

    pub fn n_outputs(&self) -> usize {
        self.output.weight.val().dims()[1]
    }

    pub fn device(&self) -> B::Device {
        self.hidden.weight.val().device()
    }

    /// 出力層のチャネルを集約する前の値 `[サンプル数, n_o]` を返します。
    pub fn forward_outputs(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.hidden.forward(input);
        let x = self.activation.0.apply(x);
        self.output.forward(x)
    }

    /// モデルの順伝播を実行し、各サンプルの解の近似値 `[サンプル数]` を返します。
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 1> {
        let outputs = self.forward_outputs(input);
        self.reduction.0.reduce(outputs).squeeze::<1>(1)
    }

    /// 解の近似値と、入力座標に関する1階・2階微分を同時に求めます。
    pub fn forward_jet(&self, input: Tensor<B, 2>) -> Jet<B> {
        let jet = Jet::seed(input).linear(&self.hidden);
        let jet = match self.activation.0.derivatives(jet.value.clone()) {
            Some((value, slope, curvature)) => jet.chain(value, slope, curvature),
            None => jet,
        };
        self.reduction.0.reduce_jet(jet.linear(&self.output))
    }

    /// サンプル集合上でモデルを評価します。
    pub fn predict(&self, samples: &SampleSet) -> Tensor<B, 1> {
        self.forward(samples.to_tensor(&self.device()))
    }
}
