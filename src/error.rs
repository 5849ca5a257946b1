pub type VerseframeResult<T> = Result<T, VerseframeError>;

#[derive(thiserror::Error, Debug)]
pub enum VerseframeError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("evaluation error: {0}")]
    Evaluation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VerseframeError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            VerseframeError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            VerseframeError::evaluation("x")
                .to_string()
                .contains("evaluation error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = VerseframeError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
