use thiserror::Error;

#[derive(Error, Debug)]
pub enum PanelError {
    #[error("Columnar engine error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Failed to read panel source: {0}")]
    Io(#[from] std::io::Error),

    #[error("Panel source is missing required column '{0}'")]
    MissingColumn(String),

    #[error("Panel schema error: {0}")]
    Schema(String),
}
