//! Single-range `Range: bytes=...` parsing for the streaming endpoint.

/// Why a `Range` header could not be honored. Malformed headers are the
/// client's fault (400); well-formed ranges outside the file are 416.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    Malformed,
    Unsatisfiable,
}

/// Parse a single-range header against a file of `file_size` bytes.
///
/// Returns the inclusive `(start, end)` byte positions. The closed form
/// `bytes=a-b` clamps `b` to the last byte; the open form `bytes=a-` runs
/// to the end; the suffix form `bytes=-n` takes the final `min(n, size)`
/// bytes.
pub fn parse_range(header: &str, file_size: u64) -> Result<(u64, u64), RangeError> {
    let value = header.strip_prefix("bytes=").ok_or(RangeError::Malformed)?;
    let (start_str, end_str) = value.split_once('-').ok_or(RangeError::Malformed)?;

    if file_size == 0 {
        return Err(RangeError::Unsatisfiable);
    }

    if start_str.is_empty() {
        let suffix: u64 = end_str.parse().map_err(|_| RangeError::Malformed)?;
        if suffix == 0 {
            return Err(RangeError::Unsatisfiable);
        }
        let start = file_size - suffix.min(file_size);
        return Ok((start, file_size - 1));
    }

    let start: u64 = start_str.parse().map_err(|_| RangeError::Malformed)?;
    if start >= file_size {
        return Err(RangeError::Unsatisfiable);
    }

    let end = if end_str.is_empty() {
        file_size - 1
    } else {
        let end: u64 = end_str.parse().map_err(|_| RangeError::Malformed)?;
        if end < start {
            return Err(RangeError::Unsatisfiable);
        }
        end.min(file_size - 1)
    };

    Ok((start, end))
}
