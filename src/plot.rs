use crate::training::LossHistory;
use plotters::prelude::*;
use std::path::Path;

// 損失0を log10 に渡さないための下限
const LOSS_FLOOR: f32 = 1e-12;

/// 学習過程の残差損失と境界損失をグラフとしてPNGファイルに出力します。
pub fn plot_loss_history(path: &Path, history: &LossHistory) -> Result<(), Box<dyn std::error::Error>> {
    let log_loss = |v: &f32| v.max(LOSS_FLOOR).log10();
    let all = history.residual.iter().chain(&history.boundary).map(log_loss);
    let (min_log_loss, max_log_loss) = all.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min_log_loss.is_finite() {
        return Err("損失の記録が空です".into());
    }

    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Loss History", ("sans-serif", 40).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(1..history.len().max(2), (min_log_loss - 0.5)..(max_log_loss + 0.5))?;
    chart
        .configure_mesh()
        .y_desc("Loss (log10 scale)")
        .x_desc("Epochs")
        .draw()?;
    chart
        .draw_series(LineSeries::new(
            history
                .residual
                .iter()
                .enumerate()
                .map(|(i, v)| (i + 1, log_loss(v))),
            &RED,
        ))?
        .label("Residual Loss")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));
    chart
        .draw_series(LineSeries::new(
            history
                .boundary
                .iter()
                .enumerate()
                .map(|(i, v)| (i + 1, log_loss(v))),
            &BLUE,
        ))?
        .label("Boundary Loss")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));
    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

/// 単位正方形上の `n × n` 格子での予測値をヒートマップとして出力します。
///
/// `values` は [`SampleSet::unit_grid`](crate::sampling::SampleSet::unit_grid) と同じ順序
/// （x が外側のループ）で並んでいる必要があります。
pub fn plot_solution(path: &Path, n: usize, values: &[f32]) -> Result<(), Box<dyn std::error::Error>> {
    if n < 2 || values.len() != n * n {
        return Err(format!("格子 {}x{} と値の数 {} が一致しません", n, n, values.len()).into());
    }
    let lo = values.iter().copied().fold(f32::INFINITY, f32::min);
    let hi = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let span = (hi - lo).max(f32::EPSILON);
    let cell = 1.0 / (n - 1) as f64;

    let root = BitMapBackend::new(path, (640, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Prediction (min {:.3}, max {:.3})", lo, hi),
            ("sans-serif", 28).into_font(),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(-cell / 2.0..1.0 + cell / 2.0, -cell / 2.0..1.0 + cell / 2.0)?;
    chart.configure_mesh().x_desc("x").y_desc("y").disable_mesh().draw()?;
    chart.draw_series(values.iter().enumerate().map(|(index, &v)| {
        let x = (index / n) as f64 * cell;
        let y = (index % n) as f64 * cell;
        let t = ((v - lo) / span) as f64;
        let color = HSLColor(0.7 * (1.0 - t), 0.9, 0.5);
        Rectangle::new(
            [(x - cell / 2.0, y - cell / 2.0), (x + cell / 2.0, y + cell / 2.0)],
            color.filled(),
        )
    }))?;
    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_is_not_plotted() {
        let path = std::env::temp_dir().join("pinn_solver_empty_history.png");
        assert!(plot_loss_history(&path, &LossHistory::default()).is_err());
    }

    #[test]
    fn mismatched_grid_is_not_plotted() {
        let path = std::env::temp_dir().join("pinn_solver_bad_grid.png");
        assert!(plot_solution(&path, 3, &[0.0; 8]).is_err());
    }
}
