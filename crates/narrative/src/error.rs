use thiserror::Error;

#[derive(Error, Debug)]
pub enum NarrativeError {
    #[error("Narrative generation is disabled")]
    Disabled,

    #[error("Narrative generation failed: {0}")]
    Generation(String),
}
