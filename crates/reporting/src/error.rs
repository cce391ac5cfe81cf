use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("No daily scores available for the reporting period")]
    NoScores,
}
