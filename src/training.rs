use crate::boundary::{BoundaryCondition, check_multiplier, loss_boundary};
use crate::cli::TrainArgs;
use crate::error::PinnError;
use crate::evaluation::{evaluate, predict};
use crate::model::{Model, ModelConfig};
use crate::optim::{ModelOptimizer, OptimizerKind};
use crate::pinn::ResidualLoss;
use crate::plot::{plot_loss_history, plot_solution};
use crate::sampling::{SampleSet, scalar};
use anyhow::anyhow;
use burn::backend::{Autodiff, NdArray};
use burn::config::Config;
use burn::optim::GradientsParams;
use burn::tensor::backend::{AutodiffBackend, Backend};
use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Instant;

type MyBackend = Autodiff<NdArray<f32>>;

/// `--epochs` も設定ファイルもないときのエポック数
const DEFAULT_EPOCHS: usize = 1000;
/// 評価・描画に使う格子の1辺あたりの点数
const EVAL_POINTS: usize = 50;

/// 学習の設定。
#[derive(Config, Debug)]
pub struct TrainingConfig {
    /// エポック数（1以上）
    pub epochs: usize,
    /// 固有値問題の固有値
    pub eigenvalue: Option<f64>,
    #[config(default = true)]
    pub verbose: bool,
    /// 損失を出力する間隔（1以上）
    #[config(default = 1)]
    pub message_frequency: usize,
    #[config(default = 0.1)]
    pub learning_rate: f64,
    /// 境界損失に掛ける重み
    #[config(default = 10.0)]
    pub boundary_multiplier: f64,
    #[config(default = "OptimizerKind::Adam")]
    pub optimizer: OptimizerKind,
}

impl TrainingConfig {
    /// 学習を始める前に設定値を検証します。
    pub fn validate(&self) -> Result<(), PinnError> {
        if self.epochs == 0 {
            return Err(PinnError::invalid_argument("epochs", "1以上の整数が必要です"));
        }
        if self.message_frequency == 0 {
            return Err(PinnError::invalid_argument(
                "message_frequency",
                "1以上の整数が必要です",
            ));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(PinnError::invalid_argument(
                "learning_rate",
                format!("正の有限値が必要です (指定: {})", self.learning_rate),
            ));
        }
        check_multiplier(self.boundary_multiplier)
    }
}

/// エポックごとの損失の記録。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LossHistory {
    pub residual: Vec<f32>,
    pub boundary: Vec<f32>,
}

impl LossHistory {
    pub fn len(&self) -> usize {
        self.residual.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residual.is_empty()
    }

    /// 最後のエポックの (残差損失, 境界損失)。
    pub fn last(&self) -> Option<(f32, f32)> {
        Some((*self.residual.last()?, *self.boundary.last()?))
    }
}

/// モデルを学習します。
///
/// 各エポックで、まずPDE残差損失の勾配で1回、続いて更新後のパラメータで
/// 計算した境界損失の勾配でもう1回、それぞれ独立にパラメータを更新します。
/// 引数や境界条件に誤りがある場合は、パラメータを変更する前にエラーを返します。
pub fn train<B, L>(
    model: &mut Model<B>,
    samples: &SampleSet,
    loss_fn: &L,
    conditions: &[BoundaryCondition],
    config: &TrainingConfig,
) -> Result<LossHistory, PinnError>
where
    B: AutodiffBackend,
    L: ResidualLoss<B> + ?Sized,
{
    config.validate()?;
    if samples.dim() != model.n_inputs() {
        return Err(PinnError::InvalidSamples(format!(
            "サンプルの次元 {} がモデルの入力次元 {} と一致しません",
            samples.dim(),
            model.n_inputs()
        )));
    }
    for (index, condition) in conditions.iter().enumerate() {
        condition.validate(index, model.n_inputs())?;
    }

    let mut optim = ModelOptimizer::<B>::new(config.optimizer);
    let mut history = LossHistory::default();

    for epoch in 1..=config.epochs {
        // --- PDE残差 ---
        let loss_residual = loss_fn.residual(model, samples, config.eigenvalue)?.sum();
        let residual_val = scalar(loss_residual.clone());
        let grads = GradientsParams::from_grads(loss_residual.backward(), &*model);
        *model = optim.step(config.learning_rate, model.clone(), grads);

        // --- 境界条件 ---
        let loss_bc = loss_boundary(model, conditions, config.boundary_multiplier)?;
        let boundary_val = scalar(loss_bc.clone());
        let grads = GradientsParams::from_grads(loss_bc.backward(), &*model);
        *model = optim.step(config.learning_rate, model.clone(), grads);

        history.residual.push(residual_val);
        history.boundary.push(boundary_val);

        if config.verbose && epoch % config.message_frequency == 0 {
            info!(
                "[Epoch {}] Residual Loss: {:.6}, Boundary Loss: {:.6}",
                epoch, residual_val, boundary_val
            );
        } else {
            debug!(
                "epoch {}: residual={} boundary={}",
                epoch, residual_val, boundary_val
            );
        }
    }

    Ok(history)
}

/// `train`サブコマンドを実行します。
///
/// 学習の後、厳密解との誤差を報告し、損失グラフと解のヒートマップを出力します。
pub fn run(args: &TrainArgs) -> anyhow::Result<()> {
    let device = Default::default();
    MyBackend::seed(args.seed);

    // --- 設定 ---
    let mut config = match &args.config {
        Some(path) => TrainingConfig::load(path).map_err(|e| {
            anyhow!("設定ファイル '{}' を読み込めません: {:?}", path.display(), e)
        })?,
        None => TrainingConfig::new(DEFAULT_EPOCHS),
    };
    if let Some(epochs) = args.epochs {
        config.epochs = epochs;
    }
    if let Some(optimizer) = args.optimizer {
        config.optimizer = optimizer;
    }
    if let Some(learning_rate) = args.learning_rate {
        config.learning_rate = learning_rate;
    }
    if let Some(multiplier) = args.boundary_multiplier {
        config.boundary_multiplier = multiplier;
    }
    if let Some(frequency) = args.message_frequency {
        config.message_frequency = frequency;
    }
    if args.quiet {
        config.verbose = false;
    }
    if config.eigenvalue.is_none() {
        config.eigenvalue = args.problem.eigenvalue();
    }
    debug!("学習設定: {}", config);

    // --- データセットの準備 ---
    let samples = match args.random_points {
        Some(n) => SampleSet::random(n, 2, &mut StdRng::seed_from_u64(args.seed))?,
        None => SampleSet::unit_grid(args.grid, 2)?,
    };
    let conditions = args.problem.conditions(args.grid)?;

    // --- モデルの初期化 ---
    let model_config = ModelConfig::new(2, args.hidden)
        .with_n_outputs(args.outputs)
        .with_activation(args.activation)
        .with_reduction(args.reduction);
    model_config.validate()?;
    let mut model = model_config.init::<MyBackend>(&device);
    debug!(
        "モデル: 入力 {} / 隠れ層 {} / 出力 {}",
        model.n_inputs(),
        args.hidden,
        model.n_outputs()
    );

    info!(
        "学習を開始します ({:?}, 学習点 {} 個, 境界条件 {} 個, {}) - バックエンド: NdArray (CPU)",
        args.problem,
        samples.len(),
        conditions.len(),
        config.optimizer
    );
    let training_start = Instant::now();
    let history = train(&mut model, &samples, &args.problem, &conditions, &config)?;
    info!("学習が完了しました。");
    info!("=> 学習時間: {:.2?}", training_start.elapsed());

    // --- 評価 ---
    let eval_grid = SampleSet::unit_grid(EVAL_POINTS, 2)?;
    let report = evaluate(&model, &eval_grid, args.problem.exact())?;
    info!(
        "=> 厳密解との誤差 ({} 点): 最大 {:.6}, RMSE {:.6}",
        report.points, report.max_abs, report.rmse
    );

    // --- 描画 ---
    match plot_loss_history(&args.loss_plot, &history) {
        Ok(()) => info!("=> 損失グラフを '{}' に保存しました。", args.loss_plot.display()),
        Err(e) => warn!("損失グラフの描画に失敗しました: {}", e),
    }
    let values = predict(&model, &eval_grid)?;
    match plot_solution(&args.solution_plot, EVAL_POINTS, &values) {
        Ok(()) => info!("=> 解のヒートマップを '{}' に保存しました。", args.solution_plot.display()),
        Err(e) => warn!("解のヒートマップの描画に失敗しました: {}", e),
    }

    Ok(())
}
