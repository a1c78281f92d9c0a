use mallab_filter_enum::FilterError;

#[derive(thiserror::Error, Debug)]
pub enum ProbeError {
    #[error("{0}")]
    Args(String),

    #[error("invalid value for {key}: {message}")]
    Config { key: String, message: String },

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[cfg_attr(windows, allow(dead_code))]
    #[error("filter manager enumeration is only available on Windows")]
    Unsupported,

    #[error("failed to render report: {0}")]
    Json(#[from] serde_json::Error),
}
