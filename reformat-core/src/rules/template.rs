// Backreference expansion for template replacements.
//
// `$` followed by digits is a token. The longest digit prefix naming an
// existing group wins, so `$10` is group 10 only when the pattern has at
// least ten groups; otherwise it is group 1 followed by a literal `0`.
// Tokens for groups that did not participate stay literal. Inserted group
// text is never re-scanned.

/// Expand `$k` tokens in `template` using `groups` (group 1 is `groups[0]`).
pub fn expand(template: &str, groups: &[Option<&str>]) -> String {
    if !template.contains('$') {
        return template.to_string();
    }

    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(dollar) = rest.find('$') {
        out.push_str(&rest[..dollar]);
        let after = &rest[dollar + 1..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();

        match group_reference(&after[..digits], groups.len()) {
            Some((index, token_len)) => {
                match groups[index - 1] {
                    Some(text) => out.push_str(text),
                    None => out.push_str(&rest[dollar..dollar + 1 + token_len]),
                }
                rest = &after[token_len..];
            }
            None => {
                out.push('$');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Longest prefix of `digits` that names a group in `1..=group_count`.
/// Returns the group index and the number of digits consumed.
fn group_reference(digits: &str, group_count: usize) -> Option<(usize, usize)> {
    (1..=digits.len()).rev().find_map(|len| {
        digits[..len]
            .parse::<usize>()
            .ok()
            .filter(|index| (1..=group_count).contains(index))
            .map(|index| (index, len))
    })
}
