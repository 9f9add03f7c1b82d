use crate::error::PinnError;
use crate::model::Model;
use crate::sampling::SampleSet;
use burn::prelude::Backend;
use burn::tensor::Tensor;

/// PDE残差損失。
///
/// サンプル集合の各点での残差の二乗を `[サンプル数]` のベクトルで返します。
/// スカラーへの集約（総和）は呼び出し側が行います。
/// `eigenvalue` は固有値問題でのみ使われます。
pub trait ResidualLoss<B: Backend> {
    fn residual(
        &self,
        model: &Model<B>,
        samples: &SampleSet,
        eigenvalue: Option<f64>,
    ) -> Result<Tensor<B, 1>, PinnError>;
}

impl<B, F> ResidualLoss<B> for F
where
    B: Backend,
    F: Fn(&Model<B>, &SampleSet, Option<f64>) -> Result<Tensor<B, 1>, PinnError>,
{
    fn residual(
        &self,
        model: &Model<B>,
        samples: &SampleSet,
        eigenvalue: Option<f64>,
    ) -> Result<Tensor<B, 1>, PinnError> {
        self(model, samples, eigenvalue)
    }
}

/// ポアソン方程式 `Δu = f(x)` の残差損失。
#[derive(Debug, Clone, Copy)]
pub struct Poisson {
    source: fn(&[f32]) -> f32,
}

impl Poisson {
    pub fn new(source: fn(&[f32]) -> f32) -> Self {
        Self { source }
    }
}

impl<B: Backend> ResidualLoss<B> for Poisson {
    fn residual(
        &self,
        model: &Model<B>,
        samples: &SampleSet,
        _eigenvalue: Option<f64>,
    ) -> Result<Tensor<B, 1>, PinnError> {
        let device = model.device();
        let laplacian = model.forward_jet(samples.to_tensor(&device)).laplacian();
        let source = Tensor::<B, 1>::from_floats(samples.map(&self.source).as_slice(), &device);
        let residual = laplacian - source;
        Ok(residual.clone() * residual)
    }
}

/// ヘルムホルツ型の固有値問題 `Δu + λu = 0` の残差損失。
#[derive(Debug, Clone, Copy, Default)]
pub struct Helmholtz;

impl<B: Backend> ResidualLoss<B> for Helmholtz {
    fn residual(
        &self,
        model: &Model<B>,
        samples: &SampleSet,
        eigenvalue: Option<f64>,
    ) -> Result<Tensor<B, 1>, PinnError> {
        let lambda = eigenvalue.ok_or(PinnError::MissingEigenvalue)?;
        let jet = model.forward_jet(samples.to_tensor(&model.device()));
        let residual = jet.laplacian() + jet.values().mul_scalar(lambda);
        Ok(residual.clone() * residual)
    }
}
