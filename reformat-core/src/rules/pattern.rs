use crate::error::{ReformatError, Result};
use crate::types::Pattern;
use regex::{Regex, RegexBuilder};

/// Whether a pattern should match in line-aware mode.
///
/// This is a plain textual scan of the source for `^` or `$`, not a parse.
/// Escaped `\$` or a negated class `[^...]` also switch the mode on.
pub fn wants_multi_line(source: &str) -> bool {
    source.contains('^') || source.contains('$')
}

/// Build the regex the engine matches with for one call.
///
/// Always returns a fresh regex; for `Pattern::Compiled` only the source
/// text is reused.
pub fn build_pattern(pattern: &Pattern) -> Result<Regex> {
    if pattern.is_empty() {
        return Err(ReformatError::EmptyPattern);
    }

    // `\r` ends a line too, for both anchors and `.`
    let source = pattern.source();
    RegexBuilder::new(source)
        .multi_line(wants_multi_line(source))
        .crlf(true)
        .build()
        .map_err(|source_err| ReformatError::InvalidPattern {
            pattern: source.to_string(),
            source: source_err,
        })
}
