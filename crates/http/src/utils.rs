//! Utility macros used across the parser and codec.

/// Returns early with an error if a condition is not met.
///
/// The error-returning counterpart of `assert!`, used for validation checks while parsing.
///
/// ```ignore
/// ensure!(self.headers.len() < self.config.max_headers, ParseError::too_many_headers(self.config.max_headers));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
