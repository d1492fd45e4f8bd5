//! Lazily-compiled static regex patterns.
//!
//! Content heuristics in the validators are all literal patterns, so they go
//! through [`static_regex!`]: compiled once on first use, cached for the life
//! of the process, and shared across rayon workers.

/// Declare a module-private function returning `&'static regex::Regex`,
/// backed by a `std::sync::OnceLock`.
///
/// The calling module must have `use regex::Regex;` in scope.
///
/// # Panics
///
/// Panics on first call if `$pattern` is not a valid regex. Patterns are
/// string literals, so this can only fire on a programming error, and every
/// pattern is exercised by unit tests. The message names the pattern.
///
/// # Example
///
/// ```ignore
/// use regex::Regex;
/// use crate::regex_util::static_regex;
///
/// static_regex!(fn curl_heading, r"(?i)###\s*curl");
///
/// assert!(curl_heading().is_match("### curl"));
/// ```
macro_rules! static_regex {
    (fn $fname:ident, $pattern:expr) => {
        fn $fname() -> &'static Regex {
            static STORE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
            STORE.get_or_init(|| {
                Regex::new($pattern).expect(concat!("BUG: invalid static regex: ", $pattern))
            })
        }
    };
}
pub(crate) use static_regex;

/// True when any pattern in `patterns` matches `text`.
pub(crate) fn any_match(patterns: &[fn() -> &'static regex::Regex], text: &str) -> bool {
    patterns.iter().any(|pattern| pattern().is_match(text))
}
