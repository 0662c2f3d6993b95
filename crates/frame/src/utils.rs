//! Small helpers shared by the codec and connection layers.

/// Returns early with `$error` unless `$predicate` holds.
///
/// Like `assert!`, but for conditions that come from the peer: a violated
/// check turns into an `Err` instead of a panic.
///
/// # Example
///
/// ```ignore
/// ensure!(header_end <= max_header_bytes, ParseError::too_large_header(header_end, max_header_bytes));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
