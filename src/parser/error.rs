/// Failure to read the feed itself. Fatal to the whole ingestion.
#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    #[error("failed to read calendar feed: {0}")]
    Io(#[from] std::io::Error),
}
