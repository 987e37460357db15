use std::collections::HashSet;

use crate::JobId;

/// Maximum number of URLs accepted in one batch.
pub const MAX_URLS: usize = 10;

/// Result of turning raw multi-line input into an ordered URL list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedInput {
    pub urls: Vec<String>,
    pub dropped_invalid: usize,
    pub dropped_duplicates: usize,
    pub dropped_over_cap: usize,
}

impl NormalizedInput {
    /// Number of valid, distinct URLs found before the cap was applied.
    pub fn detected(&self) -> usize {
        self.urls.len() + self.dropped_over_cap
    }

    pub fn exceeds_cap(&self) -> bool {
        self.dropped_over_cap > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("please enter at least one valid URL")]
    NoValidUrls,
    #[error("maximum {max} URLs allowed, got {actual}")]
    TooManyUrls { max: usize, actual: usize },
}

/// Default validation collaborator: an absolute `http`/`https` URL.
pub fn is_valid_url(candidate: &str) -> bool {
    match url::Url::parse(candidate) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Split on line breaks, trim, drop empty/invalid/duplicate lines and cap at [`MAX_URLS`].
pub fn normalize(raw: &str, is_valid: impl Fn(&str) -> bool) -> NormalizedInput {
    let mut out = NormalizedInput::default();
    let mut seen = HashSet::new();

    for line in raw.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if !is_valid(line) {
            out.dropped_invalid += 1;
            continue;
        }
        if !seen.insert(line) {
            out.dropped_duplicates += 1;
            continue;
        }
        if out.urls.len() >= MAX_URLS {
            out.dropped_over_cap += 1;
            continue;
        }
        out.urls.push(line.to_owned());
    }
    out
}

/// Rejects lists that cannot form a batch.
pub fn check_batch_len(len: usize) -> Result<(), InputError> {
    match len {
        0 => Err(InputError::NoValidUrls),
        n if n > MAX_URLS => Err(InputError::TooManyUrls {
            max: MAX_URLS,
            actual: n,
        }),
        _ => Ok(()),
    }
}

/// Normalize and number the accepted URLs `1..=n` in input order.
pub fn prepare_batch(
    raw: &str,
    is_valid: impl Fn(&str) -> bool,
) -> Result<Vec<(JobId, String)>, InputError> {
    let normalized = normalize(raw, is_valid);
    check_batch_len(normalized.urls.len())?;
    Ok(number_jobs(normalized.urls))
}

pub(crate) fn number_jobs(urls: Vec<String>) -> Vec<(JobId, String)> {
    urls.into_iter()
        .enumerate()
        .map(|(idx, url)| (idx as JobId + 1, url))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_schemes() {
        assert!(is_valid_url("https://www.iqcars.net/en/car/1"));
        assert!(is_valid_url("http://a.test/2"));
        assert!(!is_valid_url("ftp://a.test/file"));
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url("www.dubizzle.com/cars"));
    }

    #[test]
    fn check_batch_len_bounds() {
        assert_eq!(check_batch_len(0), Err(InputError::NoValidUrls));
        assert_eq!(check_batch_len(MAX_URLS), Ok(()));
        assert_eq!(
            check_batch_len(MAX_URLS + 1),
            Err(InputError::TooManyUrls {
                max: MAX_URLS,
                actual: MAX_URLS + 1
            })
        );
    }
}
