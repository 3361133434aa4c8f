use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("unknown drug-use source '{0}' (expected TFB, UDS or UDSAB)")]
    UnknownSource(String),
    #[error("invalid symbol '{0}'")]
    InvalidSymbol(char),
    #[error("invalid project id '{0}'")]
    InvalidProjectId(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
