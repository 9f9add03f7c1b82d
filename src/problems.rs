//! 単位正方形 [0,1]² 上で定義済みの問題設定。

use crate::boundary::BoundaryCondition;
use crate::error::PinnError;
use crate::model::Model;
use crate::pinn::{Helmholtz, Poisson, ResidualLoss};
use crate::sampling::SampleSet;
use burn::prelude::Backend;
use burn::tensor::Tensor;
use clap::ValueEnum;
use std::f32::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Problem {
    /// Δu = 4、厳密解 u = x² + y²、四辺でディリクレ条件
    Poisson,
    /// Poisson と同じ方程式で、x = 1 の辺だけノイマン条件 ∂u/∂x = 2
    PoissonNeumann,
    /// Δu + λu = 0 (λ = 2π²)、厳密解 u = sin(πx)sin(πy)
    Helmholtz,
}

fn quadratic(p: &[f32]) -> f32 {
    p[0] * p[0] + p[1] * p[1]
}

fn constant_source(_: &[f32]) -> f32 {
    4.0
}

fn standing_wave(p: &[f32]) -> f32 {
    (PI * p[0]).sin() * (PI * p[1]).sin()
}

impl Problem {
    /// 厳密解。
    pub fn exact(&self) -> fn(&[f32]) -> f32 {
        match self {
            Self::Poisson | Self::PoissonNeumann => quadratic,
            Self::Helmholtz => standing_wave,
        }
    }

    /// 方程式が固有値を含む場合、その既定値。
    pub fn eigenvalue(&self) -> Option<f64> {
        match self {
            Self::Helmholtz => Some(2.0 * std::f64::consts::PI.powi(2)),
            _ => None,
        }
    }

    /// 各辺に `points_per_edge` 点を取った境界条件の列を作ります。
    pub fn conditions(&self, points_per_edge: usize) -> Result<Vec<BoundaryCondition>, PinnError> {
        let exact = self.exact();
        let mut conditions = Vec::new();
        for axis in 0..2 {
            for value in [0.0, 1.0] {
                let edge = SampleSet::face(points_per_edge, 2, axis, value)?;
                let condition = if *self == Self::PoissonNeumann && axis == 0 && value == 1.0 {
                    BoundaryCondition::neumann(0, edge, |p: &[f32]| 2.0 * p[0])
                } else {
                    BoundaryCondition::dirichlet(edge, exact)
                };
                conditions.push(condition);
            }
        }
        if *self == Self::Helmholtz {
            // 自明解 u = 0 を避けるための正規化
            let center = SampleSet::new(2, vec![0.5, 0.5])?;
            conditions.push(BoundaryCondition::dirichlet(center, exact));
        }
        Ok(conditions)
    }
}

impl<B: Backend> ResidualLoss<B> for Problem {
    fn residual(
        &self,
        model: &Model<B>,
        samples: &SampleSet,
        eigenvalue: Option<f64>,
    ) -> Result<Tensor<B, 1>, PinnError> {
        match self {
            Self::Poisson | Self::PoissonNeumann => {
                Poisson::new(constant_source).residual(model, samples, eigenvalue)
            }
            Self::Helmholtz => Helmholtz.residual(model, samples, eigenvalue),
        }
    }
}
