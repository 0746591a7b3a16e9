use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeymapError {
    #[error("line {line}: unknown key '{token}'")]
    UnknownKey { line: usize, token: String },
    #[error("line {line}: invalid layer '{token}'")]
    InvalidLayer { line: usize, token: String },
    #[error("line {line}: malformed cell '{token}'")]
    MalformedCell { line: usize, token: String },
    #[error("line {line}: key row outside of any [layer] section")]
    RowOutsideSection { line: usize },
    #[error("line {line}: row or column index exceeds 255")]
    MatrixTooLarge { line: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("tapping_term_ms must be greater than zero")]
    ZeroTappingTerm,
}
