use thiserror::Error;

/// このクレートで発生するエラー。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PinnError {
    #[error("引数 `{name}` が不正です: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("境界条件 #{index} が不正です: {reason}")]
    InvalidCondition { index: usize, reason: String },

    // 設定ミスとして扱う
    #[error("未知の境界条件タイプです: '{0}' (dirichlet / neumann のいずれか)")]
    UnknownConditionKind(String),

    #[error("未知のオプティマイザです: '{0}' (adam / sgd / adagrad のいずれか)")]
    UnknownOptimizer(String),

    #[error("未知の活性化関数です: '{0}' (sigmoid / tanh / relu / linear のいずれか)")]
    UnknownActivation(String),

    #[error("未知の出力集約方法です: '{0}' (product / sum のいずれか)")]
    UnknownReduction(String),

    #[error("サンプル集合が不正です: {0}")]
    InvalidSamples(String),

    #[error("固有値問題の残差には固有値が必要です")]
    MissingEigenvalue,

    #[error("テンソルデータの変換に失敗しました: {0}")]
    Data(String),
}

impl PinnError {
    pub(crate) fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}
