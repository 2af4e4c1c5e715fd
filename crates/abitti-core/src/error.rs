#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("archive entry not found: {0}")]
    MissingEntry(&'static str),
    #[error("The question type '{0}' is not yet supported.")]
    UnsupportedQuestionType(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("exam content has no sections")]
    NoSections,
    // Froms
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
