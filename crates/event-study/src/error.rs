use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudyError {
    #[error("Columnar engine error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Event catalog error: {0}")]
    Catalog(#[from] event_catalog::CatalogError),

    #[error("Panel error: {0}")]
    Panel(#[from] panel::PanelError),

    #[error("Invalid window radius {0}: must be a positive number of trading days")]
    InvalidWindow(u32),

    #[error("Failed to export window rows: {0}")]
    Export(#[from] std::io::Error),
}
