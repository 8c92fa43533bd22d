pub(crate) type SignprepResult<T> = Result<T, SignprepError>;

macro_rules! bail {
    ($($arg:tt)*) => {{
        return Err(SignprepError::Other(format!($($arg)*)));
    }};
}

pub(crate) use bail;

#[derive(Debug, thiserror::Error)]
pub(crate) enum SignprepError {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Polars(#[from] polars::error::PolarsError),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Regex(#[from] regex::Error),

    #[error("missing column '{0}' in input table")]
    MissingColumn(String),

    #[error("duplicate sample id '{0}'")]
    DuplicateId(String),

    /// A split cannot be produced from the given samples.
    #[error("infeasible split: {0}")]
    Infeasible(String),

    /// A post-split invariant does not hold. This is a logic error in
    /// the partitioning, not a data problem.
    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error("empty result: {0}")]
    Empty(String),

    #[error("{0}")]
    Other(String),
}

impl SignprepError {
    #[inline]
    pub(crate) fn other<T: ToString>(s: T) -> Self {
        Self::Other(s.to_string())
    }
}
