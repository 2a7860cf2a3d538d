use thiserror::Error;

/// Fatal failures raised while inspecting captured output.
///
/// Command failures are not errors: [`ConsoleRunner::execute`] reports them
/// through its boolean result and the exit code.
///
/// [`ConsoleRunner::execute`]: crate::ConsoleRunner::execute
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The configured encoding code has no entry in the code page table.
    #[error("unknown encoding code `{0}`")]
    UnknownEncoding(String),

    /// A pattern failed to compile.
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl RunnerError {
    pub(crate) fn invalid_pattern(pattern: &str, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_encoding_names_the_code() {
        let error = RunnerError::UnknownEncoding("1200".to_string());
        assert_eq!(error.to_string(), "unknown encoding code `1200`");
    }

    #[test]
    fn invalid_pattern_keeps_regex_source() {
        let source = regex::bytes::Regex::new("(unclosed").err();
        let Some(source) = source else {
            panic!("pattern should not compile");
        };
        let error = RunnerError::invalid_pattern("(unclosed", source);
        assert!(error.to_string().starts_with("invalid pattern `(unclosed`"));
        assert!(std::error::Error::source(&error).is_some());
    }
}
