use crate::error::PinnError;
use burn::prelude::Backend;
use burn::tensor::{ElementConversion, Tensor};
use rand::Rng;

/// 学習に使う座標点の集合。
///
/// 座標は `[x0, y0, x1, y1, ...]` のように行優先で平坦化して保持します。
/// 構築後は変更されず、学習関数には参照で渡されます。
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    dim: usize,
    coords: Vec<f32>,
}

impl SampleSet {
    /// 平坦化された座標列から集合を作ります。
    pub fn new(dim: usize, coords: Vec<f32>) -> Result<Self, PinnError> {
        if dim == 0 {
            return Err(PinnError::InvalidSamples("次元は1以上である必要があります".into()));
        }
        if coords.len() % dim != 0 {
            return Err(PinnError::InvalidSamples(format!(
                "座標数 {} が次元 {} で割り切れません",
                coords.len(),
                dim
            )));
        }
        Ok(Self { dim, coords })
    }

    /// 単位超立方体 [0,1]^dim 上の一様格子を作ります。
    ///
    /// 各軸に `points_per_axis` 点を取り、先頭の軸が最も外側のループになります。
    pub fn unit_grid(points_per_axis: usize, dim: usize) -> Result<Self, PinnError> {
        let axis = linspace(points_per_axis)?;
        let mut coords = Vec::with_capacity(points_per_axis.pow(dim as u32) * dim);
        let mut index = vec![0usize; dim];
        for _ in 0..points_per_axis.pow(dim as u32) {
            coords.extend(index.iter().map(|&i| axis[i]));
            // 最後の軸から桁上がり
            for d in (0..dim).rev() {
                index[d] += 1;
                if index[d] < points_per_axis {
                    break;
                }
                index[d] = 0;
            }
        }
        Self::new(dim, coords)
    }

    /// 単位超立方体の面 `x[axis] = value` 上の格子点を作ります。
    pub fn face(points_per_axis: usize, dim: usize, axis: usize, value: f32) -> Result<Self, PinnError> {
        if axis >= dim {
            return Err(PinnError::InvalidSamples(format!(
                "軸 {} は次元 {} の範囲外です",
                axis, dim
            )));
        }
        if dim == 1 {
            return Self::new(1, vec![value]);
        }
        let inner = Self::unit_grid(points_per_axis, dim - 1)?;
        let mut coords = Vec::with_capacity(inner.len() * dim);
        for point in inner.iter() {
            coords.extend_from_slice(&point[..axis]);
            coords.push(value);
            coords.extend_from_slice(&point[axis..]);
        }
        Self::new(dim, coords)
    }

    /// [0,1)^dim 上の一様乱数点を `n` 個作ります。
    pub fn random<R: Rng>(n: usize, dim: usize, rng: &mut R) -> Result<Self, PinnError> {
        let coords = (0..n * dim).map(|_| rng.random::<f32>()).collect();
        Self::new(dim, coords)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.coords.len() / self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn point(&self, index: usize) -> &[f32] {
        &self.coords[index * self.dim..(index + 1) * self.dim]
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f32]> {
        self.coords.chunks_exact(self.dim)
    }

    /// 各点で関数を評価した値の列を返します。
    pub fn map<F: Fn(&[f32]) -> f32 + ?Sized>(&self, f: &F) -> Vec<f32> {
        self.iter().map(f).collect()
    }

    /// `[len, dim]` のテンソルに変換します。
    pub fn to_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        Tensor::<B, 1>::from_floats(self.coords.as_slice(), device).reshape([self.len(), self.dim])
    }
}

fn linspace(n: usize) -> Result<Vec<f32>, PinnError> {
    if n < 2 {
        return Err(PinnError::InvalidSamples(format!(
            "格子の点数は各軸2以上である必要があります (指定: {})",
            n
        )));
    }
    Ok((0..n).map(|i| i as f32 / (n - 1) as f32).collect())
}

/// テンソルをホスト側の `f32` 列に変換します。
pub(crate) fn to_host<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f32>, PinnError> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| PinnError::Data(format!("{:?}", e)))
}

/// 要素数1のテンソルをスカラー値として読み出します。
pub(crate) fn scalar<B: Backend>(tensor: Tensor<B, 1>) -> f32 {
    tensor.into_scalar().elem::<f32>()
}
