use crate::error::PinnError;
use crate::model::Model;
use crate::sampling::SampleSet;
use burn::prelude::Backend;
use burn::tensor::Tensor;
use std::fmt;
use std::str::FromStr;

/// 境界条件の種類。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKind {
    /// 解の値を固定します。
    Dirichlet,
    /// `axis` 方向の1階微分を固定します。
    Neumann { axis: usize },
}

impl FromStr for ConditionKind {
    type Err = PinnError;

    /// `dirichlet`, `neumann` (`neuman` も可), `neumann:<axis>` を受け付けます。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let (name, axis) = match lower.split_once(':') {
            Some((name, axis)) => {
                let axis = axis
                    .parse::<usize>()
                    .map_err(|_| PinnError::UnknownConditionKind(s.to_string()))?;
                (name, Some(axis))
            }
            None => (lower.as_str(), None),
        };
        match (name, axis) {
            ("dirichlet", None) => Ok(Self::Dirichlet),
            ("neumann" | "neuman", axis) => Ok(Self::Neumann {
                axis: axis.unwrap_or(0),
            }),
            _ => Err(PinnError::UnknownConditionKind(s.to_string())),
        }
    }
}

/// 境界上の目標値を与える関数。
pub type TargetFn = Box<dyn Fn(&[f32]) -> f32 + Send + Sync>;

/// 1つの境界条件。
///
/// `points` の各点で、モデルの値（ディリクレ）または1階微分（ノイマン）が
/// `target` の値に一致することを要求します。
pub struct BoundaryCondition {
    kind: ConditionKind,
    points: SampleSet,
    target: TargetFn,
}

impl BoundaryCondition {
    pub fn new<F>(kind: ConditionKind, points: SampleSet, target: F) -> Self
    where
        F: Fn(&[f32]) -> f32 + Send + Sync + 'static,
    {
        Self {
            kind,
            points,
            target: Box::new(target),
        }
    }

    pub fn dirichlet<F>(points: SampleSet, target: F) -> Self
    where
        F: Fn(&[f32]) -> f32 + Send + Sync + 'static,
    {
        Self::new(ConditionKind::Dirichlet, points, target)
    }

    pub fn neumann<F>(axis: usize, points: SampleSet, target: F) -> Self
    where
        F: Fn(&[f32]) -> f32 + Send + Sync + 'static,
    {
        Self::new(ConditionKind::Neumann { axis }, points, target)
    }

    /// 種類を文字列で指定して作ります。未知の種類は設定エラーになります。
    pub fn parse<F>(kind: &str, points: SampleSet, target: F) -> Result<Self, PinnError>
    where
        F: Fn(&[f32]) -> f32 + Send + Sync + 'static,
    {
        Ok(Self::new(kind.parse()?, points, target))
    }

    pub fn kind(&self) -> ConditionKind {
        self.kind
    }

    pub fn points(&self) -> &SampleSet {
        &self.points
    }

    /// 各点での目標値。
    pub fn targets(&self) -> Vec<f32> {
        self.points.map(&*self.target)
    }

    /// 入力次元 `n_inputs` のモデルに適用できるかを確認します。
    pub fn validate(&self, index: usize, n_inputs: usize) -> Result<(), PinnError> {
        if self.points.dim() != n_inputs {
            return Err(PinnError::InvalidCondition {
                index,
                reason: format!(
                    "評価点の次元 {} がモデルの入力次元 {} と一致しません",
                    self.points.dim(),
                    n_inputs
                ),
            });
        }
        if let ConditionKind::Neumann { axis } = self.kind {
            if axis >= n_inputs {
                return Err(PinnError::InvalidCondition {
                    index,
                    reason: format!("微分の軸 {} が入力次元 {} の範囲外です", axis, n_inputs),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundaryCondition")
            .field("kind", &self.kind)
            .field("points", &self.points.len())
            .finish_non_exhaustive()
    }
}

/// 境界損失の重みが0以上の有限値であることを確認します。
pub(crate) fn check_multiplier(multiplier: f64) -> Result<(), PinnError> {
    if !multiplier.is_finite() || multiplier < 0.0 {
        return Err(PinnError::invalid_argument(
            "boundary_multiplier",
            format!("0以上の有限値が必要です (指定: {})", multiplier),
        ));
    }
    Ok(())
}

/// 境界損失を計算します。
///
/// 各条件の評価点でモデルの値（またはノイマン条件では1階微分）と目標値の
/// 差の二乗を足し合わせ、`multiplier` を掛けた値を返します。
/// 条件が空のときは0になります。
pub fn loss_boundary<B: Backend>(
    model: &Model<B>,
    conditions: &[BoundaryCondition],
    multiplier: f64,
) -> Result<Tensor<B, 1>, PinnError> {
    check_multiplier(multiplier)?;
    let device = model.device();
    let mut total = Tensor::<B, 1>::zeros([1], &device);
    for (index, condition) in conditions.iter().enumerate() {
        condition.validate(index, model.n_inputs())?;
        if condition.points.is_empty() {
            continue;
        }
        let input = condition.points.to_tensor::<B>(&device);
        let prediction = match condition.kind {
            ConditionKind::Dirichlet => model.forward(input),
            ConditionKind::Neumann { axis } => model.forward_jet(input).gradient(axis),
        };
        let target = Tensor::<B, 1>::from_floats(condition.targets().as_slice(), &device);
        let diff = prediction - target;
        total = total + (diff.clone() * diff).sum();
    }
    Ok(total.mul_scalar(multiplier))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelConfig;
    use crate::sampling::{scalar, to_host};
    use approx::assert_relative_eq;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray<f32>>;

    fn square_edges() -> Vec<BoundaryCondition> {
        let mut conditions = Vec::new();
        for axis in 0..2 {
            for value in [0.0, 1.0] {
                let face = SampleSet::face(10, 2, axis, value).unwrap();
                conditions.push(BoundaryCondition::dirichlet(face, |p: &[f32]| p[0] + p[1]));
            }
        }
        conditions
    }

    #[test]
    fn kind_names_are_parsed() {
        assert_eq!("dirichlet".parse::<ConditionKind>().unwrap(), ConditionKind::Dirichlet);
        assert_eq!(
            "neuman".parse::<ConditionKind>().unwrap(),
            ConditionKind::Neumann { axis: 0 }
        );
        assert_eq!(
            "Neumann:1".parse::<ConditionKind>().unwrap(),
            ConditionKind::Neumann { axis: 1 }
        );
        for bad in ["unknown", "dirichlet:1", "neumann:x", ""] {
            assert!(matches!(
                bad.parse::<ConditionKind>(),
                Err(PinnError::UnknownConditionKind(_))
            ));
        }
    }

    #[test]
    fn unknown_kind_is_a_configuration_error() {
        let points = SampleSet::face(5, 2, 0, 0.0).unwrap();
        let result = BoundaryCondition::parse("unknown", points, |_: &[f32]| 0.0);
        assert_eq!(
            result.unwrap_err(),
            PinnError::UnknownConditionKind("unknown".to_string())
        );
    }

    #[test]
    fn empty_condition_list_has_zero_loss() {
        let device = Default::default();
        let model = ModelConfig::new(2, 10).init::<TestBackend>(&device);
        let loss = loss_boundary(&model, &[], 10.0).unwrap();
        assert_eq!(scalar(loss), 0.0);
    }

    #[test]
    fn boundary_loss_is_non_negative() {
        let device = Default::default();
        let model = ModelConfig::new(2, 10).init::<TestBackend>(&device);
        let conditions = square_edges();
        for multiplier in [0.0, 1.0, 10.0] {
            let loss = scalar(loss_boundary(&model, &conditions, multiplier).unwrap());
            assert!(loss.is_finite());
            assert!(loss >= 0.0);
        }
    }

    #[test]
    fn dirichlet_loss_is_weighted_sum_of_squares() {
        let device = Default::default();
        let model = ModelConfig::new(2, 4).init::<TestBackend>(&device);
        let points = SampleSet::new(2, vec![0.0, 0.5, 1.0, 0.25]).unwrap();
        let predictions = to_host(model.predict(&points)).unwrap();
        let expected: f32 = predictions.iter().map(|u| (u - 1.0) * (u - 1.0)).sum::<f32>() * 3.0;

        let conditions = vec![BoundaryCondition::dirichlet(points, |_: &[f32]| 1.0)];
        let loss = scalar(loss_boundary(&model, &conditions, 3.0).unwrap());
        assert_relative_eq!(loss, expected, epsilon = 1e-5);
    }

    #[test]
    fn neumann_loss_uses_derivative_along_axis() {
        let device = Default::default();
        let model = ModelConfig::new(2, 4).init::<TestBackend>(&device);
        let points = SampleSet::face(3, 2, 0, 1.0).unwrap();
        let slope = to_host(model.forward_jet(points.to_tensor(&device)).gradient(1)).unwrap();
        let expected: f32 = slope.iter().map(|d| d * d).sum();

        let conditions = vec![BoundaryCondition::neumann(1, points, |_: &[f32]| 0.0)];
        let loss = scalar(loss_boundary(&model, &conditions, 1.0).unwrap());
        assert_relative_eq!(loss, expected, epsilon = 1e-5);
    }

    #[test]
    fn malformed_conditions_are_rejected() {
        let device = Default::default();
        let model = ModelConfig::new(2, 4).init::<TestBackend>(&device);

        let wrong_dim = SampleSet::unit_grid(3, 3).unwrap();
        let conditions = vec![BoundaryCondition::dirichlet(wrong_dim, |_: &[f32]| 0.0)];
        assert!(matches!(
            loss_boundary(&model, &conditions, 1.0),
            Err(PinnError::InvalidCondition { index: 0, .. })
        ));

        let edge = SampleSet::face(3, 2, 0, 0.0).unwrap();
        let conditions = vec![BoundaryCondition::neumann(2, edge, |_: &[f32]| 0.0)];
        assert!(loss_boundary(&model, &conditions, 1.0).is_err());
        assert!(loss_boundary(&model, &[], -1.0).is_err());
    }
}
