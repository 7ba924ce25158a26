pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("catalog request failed: {0}")]
    Catalog(#[from] reqwest::Error),
    #[error("catalog responded with status {0}")]
    CatalogStatus(u16),
    #[error("storage error: {0}")]
    Storage(#[from] mongodb::error::Error),
    #[error("environment variable `{0}` must be provided")]
    MissingEnv(&'static str),
    #[error("failed to set up logger: {0}")]
    Logger(String),
}

impl Error {
    /// Whether the error came from the card catalog rather than the store.
    pub fn is_catalog(&self) -> bool {
        matches!(self, Error::Catalog(_) | Error::CatalogStatus(_))
    }
}
