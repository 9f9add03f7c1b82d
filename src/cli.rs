use crate::model::{Activation, OutputReduction};
use crate::optim::OptimizerKind;
use crate::problems::Problem;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// clapでコマンドラインの構造を定義します。
#[derive(Parser, Debug)]
#[command(author, version, about = "A Physics-Informed Neural Network (PINN) PDE solver with Burn", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 実行するサブコマンド。
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// PINNモデルを学習し、厳密解との誤差を報告してグラフを出力します
    Train(TrainArgs),
}

/// `train` サブコマンドの引数。
///
/// 学習設定は `--config` のJSONファイルから読み込み、個別の引数で上書きできます。
#[derive(Args, Debug, Clone)]
pub struct TrainArgs {
    /// 解く問題
    #[arg(long, value_enum, default_value_t = Problem::Poisson)]
    pub problem: Problem,

    /// 学習設定 (TrainingConfig) のJSONファイル
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub epochs: Option<usize>,

    /// 隠れ層の幅
    #[arg(long, default_value_t = 10)]
    pub hidden: usize,

    /// 出力層の幅
    #[arg(long, default_value_t = 2)]
    pub outputs: usize,

    #[arg(long, default_value = "sigmoid")]
    pub activation: Activation,

    #[arg(long, default_value = "product")]
    pub reduction: OutputReduction,

    /// 格子の1辺あたりの点数（学習点と境界点の両方）
    #[arg(long, default_value_t = 10)]
    pub grid: usize,

    /// 指定すると、格子の代わりにこの数の一様乱数点で学習します
    #[arg(long)]
    pub random_points: Option<usize>,

    #[arg(long)]
    pub optimizer: Option<OptimizerKind>,

    #[arg(long)]
    pub learning_rate: Option<f64>,

    #[arg(long)]
    pub boundary_multiplier: Option<f64>,

    #[arg(long)]
    pub message_frequency: Option<usize>,

    /// 学習中の損失を出力しません
    #[arg(long)]
    pub quiet: bool,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, default_value = "loss_graph.png")]
    pub loss_plot: PathBuf,

    #[arg(long, default_value = "solution.png")]
    pub solution_plot: PathBuf,
}
