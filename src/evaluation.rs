use crate::error::PinnError;
use crate::model::Model;
use crate::sampling::{SampleSet, to_host};
use burn::prelude::Backend;

/// 厳密解との誤差の要約。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorReport {
    pub points: usize,
    pub max_abs: f32,
    pub rmse: f32,
}

/// サンプル集合上でのモデルの予測値をホスト側の値として返します。
pub fn predict<B: Backend>(model: &Model<B>, samples: &SampleSet) -> Result<Vec<f32>, PinnError> {
    to_host(model.predict(samples))
}

/// 予測値を厳密解 `exact` と比較します。
pub fn evaluate<B, F>(model: &Model<B>, samples: &SampleSet, exact: F) -> Result<ErrorReport, PinnError>
where
    B: Backend,
    F: Fn(&[f32]) -> f32,
{
    if samples.is_empty() {
        return Err(PinnError::InvalidSamples("評価点がありません".into()));
    }
    let predictions = predict(model, samples)?;
    let mut max_abs = 0.0f32;
    let mut sum_sq = 0.0f64;
    for (point, prediction) in samples.iter().zip(&predictions) {
        let err = (prediction - exact(point)).abs();
        max_abs = max_abs.max(err);
        sum_sq += (err as f64).powi(2);
    }
    Ok(ErrorReport {
        points: predictions.len(),
        max_abs,
        rmse: (sum_sq / predictions.len() as f64).sqrt() as f32,
    })
}
