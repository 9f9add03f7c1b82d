//! 入力座標に関する微分を順方向に伝播させるためのジェット。
//!
//! `burn` の自動微分バックエンドは勾配をもう一度微分できないため、
//! ラプラシアンのような入力に関する2階微分は、値と一緒に1階・2階微分の
//! テンソルをネットワークの各層へ流して求めます。すべてテンソル演算で
//! 構成されるので、パラメータに関する勾配は通常どおり `backward` で得られます。

use burn::nn::Linear;
use burn::prelude::Backend;
use burn::tensor::Tensor;

/// 値と、各入力座標に関する1階微分・混合項を除いた2階微分の組。
///
/// すべてのテンソルは `[サンプル数, 幅]` の形状を持ち、
/// `first[i]` と `second[i]` は入力座標 `i` に関する微分です。
#[derive(Debug, Clone)]
pub struct Jet<B: Backend> {
    pub value: Tensor<B, 2>,
    pub first: Vec<Tensor<B, 2>>,
    pub second: Vec<Tensor<B, 2>>,
}

impl<B: Backend> Jet<B> {
    /// 入力座標そのものを表すジェットを作ります。
    ///
    /// `x_j` の `x_i` に関する1階微分は単位行列の列、2階微分はゼロです。
    pub fn seed(input: Tensor<B, 2>) -> Self {
        let [n, dim] = input.dims();
        let device = input.device();
        let first = (0..dim)
            .map(|axis| {
                Tensor::zeros([n, dim], &device)
                    .slice_assign([0..n, axis..axis + 1], Tensor::ones([n, 1], &device))
            })
            .collect();
        let second = (0..dim).map(|_| Tensor::zeros([n, dim], &device)).collect();
        Self {
            value: input,
            first,
            second,
        }
    }

    /// 全結合層を適用します。バイアスは微分に寄与しません。
    pub fn linear(self, layer: &Linear<B>) -> Self {
        let weight = layer.weight.val();
        Self {
            value: layer.forward(self.value),
            first: self
                .first
                .into_iter()
                .map(|d| d.matmul(weight.clone()))
                .collect(),
            second: self
                .second
                .into_iter()
                .map(|d| d.matmul(weight.clone()))
                .collect(),
        }
    }

    /// 要素ごとの関数 `f` を連鎖律で適用します。
    ///
    /// `value`, `slope`, `curvature` はそれぞれ `f(z)`, `f'(z)`, `f''(z)` です。
    pub fn chain(self, value: Tensor<B, 2>, slope: Tensor<B, 2>, curvature: Tensor<B, 2>) -> Self {
        let second = self
            .first
            .iter()
            .zip(self.second)
            .map(|(d, dd)| curvature.clone() * d.clone() * d.clone() + slope.clone() * dd)
            .collect();
        let first = self.first.into_iter().map(|d| slope.clone() * d).collect();
        Self {
            value,
            first,
            second,
        }
    }

    /// 出力チャネル `k` だけを取り出します。
    pub fn column(&self, k: usize) -> Self {
        let n = self.value.dims()[0];
        let pick = |t: &Tensor<B, 2>| t.clone().slice([0..n, k..k + 1]);
        Self {
            value: pick(&self.value),
            first: self.first.iter().map(pick).collect(),
            second: self.second.iter().map(pick).collect(),
        }
    }

    /// 積の微分法則に従って要素ごとの積を取ります。
    pub fn mul(self, rhs: Self) -> Self {
        let mut first = Vec::with_capacity(self.first.len());
        let mut second = Vec::with_capacity(self.second.len());
        for i in 0..self.first.len() {
            let (da, db) = (self.first[i].clone(), rhs.first[i].clone());
            first.push(da.clone() * rhs.value.clone() + self.value.clone() * db.clone());
            second.push(
                self.second[i].clone() * rhs.value.clone()
                    + (da * db).mul_scalar(2.0)
                    + self.value.clone() * rhs.second[i].clone(),
            );
        }
        Self {
            value: self.value * rhs.value,
            first,
            second,
        }
    }

    /// 要素ごとの和を取ります。
    pub fn add(self, rhs: Self) -> Self {
        Self {
            value: self.value + rhs.value,
            first: self.first.into_iter().zip(rhs.first).map(|(a, b)| a + b).collect(),
            second: self.second.into_iter().zip(rhs.second).map(|(a, b)| a + b).collect(),
        }
    }

    /// 幅1のジェットの値を `[サンプル数]` のベクトルとして返します。
    pub fn values(&self) -> Tensor<B, 1> {
        self.value.clone().squeeze::<1>(1)
    }

    /// 幅1のジェットの `axis` 方向の1階微分を返します。
    pub fn gradient(&self, axis: usize) -> Tensor<B, 1> {
        self.first[axis].clone().squeeze::<1>(1)
    }

    /// 幅1のジェットのラプラシアン（混合項を除く2階微分の和）を返します。
    pub fn laplacian(&self) -> Tensor<B, 1> {
        let mut total = self.second[0].clone();
        for dd in &self.second[1..] {
            total = total + dd.clone();
        }
        total.squeeze::<1>(1)
    }
}
