use crate::error::PinnError;
use crate::model::Model;
use burn::optim::{AdaGradConfig, AdamConfig, GradientsParams, Optimizer, SgdConfig};
use burn::tensor::backend::AutodiffBackend;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 学習に使うオプティマイザの種類。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    Adam,
    Sgd,
    AdaGrad,
}

impl FromStr for OptimizerKind {
    type Err = PinnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "adam" => Ok(Self::Adam),
            "sgd" => Ok(Self::Sgd),
            "adagrad" => Ok(Self::AdaGrad),
            _ => Err(PinnError::UnknownOptimizer(s.to_string())),
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Adam => "adam",
            Self::Sgd => "sgd",
            Self::AdaGrad => "adagrad",
        };
        f.write_str(name)
    }
}

type StepFn<B> = Box<dyn FnMut(f64, Model<B>, GradientsParams) -> Model<B>>;

/// [`Model`] を更新するオプティマイザ。
///
/// `burn` のオプティマイザは種類ごとに型が異なるため、更新処理をクロージャに包んで保持します。
pub struct ModelOptimizer<B: AutodiffBackend> {
    kind: OptimizerKind,
    step: StepFn<B>,
}

impl<B: AutodiffBackend> ModelOptimizer<B> {
    pub fn new(kind: OptimizerKind) -> Self {
        let step: StepFn<B> = match kind {
            OptimizerKind::Adam => {
                let mut optim = AdamConfig::new().init::<B, Model<B>>();
                Box::new(move |lr: f64, model: Model<B>, grads: GradientsParams| {
                    optim.step(lr, model, grads)
                })
            }
            OptimizerKind::Sgd => {
                let mut optim = SgdConfig::new().init::<B, Model<B>>();
                Box::new(move |lr: f64, model: Model<B>, grads: GradientsParams| {
                    optim.step(lr, model, grads)
                })
            }
            OptimizerKind::AdaGrad => {
                let mut optim = AdaGradConfig::new().init::<B, Model<B>>();
                Box::new(move |lr: f64, model: Model<B>, grads: GradientsParams| {
                    optim.step(lr, model, grads)
                })
            }
        };
        Self { kind, step }
    }

    pub fn kind(&self) -> OptimizerKind {
        self.kind
    }

    /// 勾配に従ってパラメータを1回更新したモデルを返します。
    pub fn step(&mut self, learning_rate: f64, model: Model<B>, grads: GradientsParams) -> Model<B> {
        (self.step)(learning_rate, model, grads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelConfig;
    use crate::sampling::to_host;
    use burn::backend::{Autodiff, NdArray};
    use burn::tensor::Tensor;

    type TestBackend = Autodiff<NdArray<f32>>;

    #[test]
    fn names_are_parsed() {
        assert_eq!("Adam".parse::<OptimizerKind>().unwrap(), OptimizerKind::Adam);
        assert_eq!("SGD".parse::<OptimizerKind>().unwrap(), OptimizerKind::Sgd);
        assert_eq!("Adagrad".parse::<OptimizerKind>().unwrap(), OptimizerKind::AdaGrad);
        assert_eq!(
            "rmsprop".parse::<OptimizerKind>().unwrap_err(),
            PinnError::UnknownOptimizer("rmsprop".to_string())
        );
    }

    #[test]
    fn every_optimizer_moves_parameters() {
        let device = Default::default();
        let input = Tensor::<TestBackend, 2>::ones([3, 2], &device);
        for kind in [OptimizerKind::Adam, OptimizerKind::Sgd, OptimizerKind::AdaGrad] {
            let model = ModelConfig::new(2, 4).init::<TestBackend>(&device);
            let before = to_host(model.forward(input.clone())).unwrap();

            let mut optim = ModelOptimizer::new(kind);
            assert_eq!(optim.kind(), kind);
            let loss = model.forward(input.clone()).add_scalar(-5.0).powf_scalar(2.0).sum();
            let grads = GradientsParams::from_grads(loss.backward(), &model);
            let model = optim.step(0.1, model, grads);

            let after = to_host(model.forward(input.clone())).unwrap();
            assert_ne!(before, after, "{kind} did not update the model");
        }
    }
}
