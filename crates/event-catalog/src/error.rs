use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Columnar engine error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Panel error while building the catalog: {0}")]
    Panel(#[from] panel::PanelError),
}
