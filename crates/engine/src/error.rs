use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Report error: {0}")]
    Report(#[from] reporting::ReportError),
}
