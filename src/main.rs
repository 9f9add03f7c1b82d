//! # 物理情報ニューラルネットワーク (PINN) ソルバー
//!
//! `burn` フレームワークを使用して、単位正方形上の偏微分方程式を
//! 物理情報ニューラルネットワーク（PINN）で解くプログラムです。
//!
//! ## 使い方
//!
//! ```bash
//! cargo run --release -- train --problem poisson --epochs 2000
//! cargo run --release -- train --problem helmholtz --optimizer adagrad
//! ```
//!
//! ログの詳細度は `RUST_LOG` で変更できます（既定は `info`）。

use clap::Parser;
use pinn_solver::cli::{Cli, Commands};
use pinn_solver::training;

/// プログラムのエントリーポイント。
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Train(args) => training::run(args),
    }
}
