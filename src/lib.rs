//! # 物理情報ニューラルネットワーク (PINN) ソルバー
//!
//! `burn` フレームワークを使用して、PDE残差と境界条件の誤差を組み合わせた損失を
//! 最小化することで偏微分方程式を解く、物理情報ニューラルネットワーク（PINN）の
//! 主要なコンポーネントを提供します。
//!
//! - [`model`]: 座標から解の近似値を返す2層パーセプトロン
//! - [`pinn`]: PDE残差損失（ポアソン方程式、ヘルムホルツ型固有値問題）
//! - [`boundary`]: ディリクレ・ノイマン境界条件と境界損失
//! - [`training`]: 残差と境界を交互に最小化する学習ループ

pub mod boundary;
pub mod cli;
pub mod error;
pub mod evaluation;
pub mod jet;
pub mod model;
pub mod optim;
pub mod pinn;
pub mod plot;
pub mod problems;
pub mod sampling;
pub mod training;

pub use boundary::{BoundaryCondition, ConditionKind, loss_boundary};
pub use error::PinnError;
pub use model::{Activation, Model, ModelConfig, OutputReduction};
pub use optim::OptimizerKind;
pub use pinn::{Helmholtz, Poisson, ResidualLoss};
pub use sampling::SampleSet;
pub use training::{LossHistory, TrainingConfig, train};
