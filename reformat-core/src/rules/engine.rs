use crate::config::RuleSetConfig;
use crate::error::{ReformatError, Result};
use crate::types::*;
use std::time::Instant;
use tracing::{debug, trace, warn};

use super::claims::ClaimMap;
use super::pattern::build_pattern;

/// Rewrite `text` with `rules`, earlier rules taking precedence.
///
/// Every rule matches against the original text. A match is kept only when
/// none of its characters were claimed by an earlier rule or an earlier
/// match; kept matches are then substituted in one left-to-right pass.
/// Rules that cannot be applied are skipped and logged.
pub fn transform(text: &str, rules: &[Rule]) -> String {
    transform_with_report(text, rules).output
}

/// `transform` for callers whose text or rule list may be absent.
/// Absent text stays absent; absent rules leave the text unchanged.
pub fn transform_opt(text: Option<&str>, rules: Option<&[Rule]>) -> Option<String> {
    let text = text?;
    match rules {
        Some(rules) => Some(transform(text, rules)),
        None => Some(text.to_string()),
    }
}

/// `transform`, also returning the accepted claims and the skipped rules.
pub fn transform_with_report(text: &str, rules: &[Rule]) -> TransformReport {
    if text.is_empty() || rules.is_empty() {
        return TransformReport::passthrough(text);
    }

    let started = Instant::now();
    let mut claims = ClaimMap::new();
    let mut skipped = Vec::new();

    // Phase 1: match every rule against the untouched input
    for (rule_index, rule) in rules.iter().enumerate() {
        match claim_matches(text, rule_index, rule, &claims) {
            Ok(pending) => {
                trace!(rule_index, claimed = pending.len(), "rule applied");
                claims.commit(pending);
            }
            Err(reason) => {
                let pattern = rule.pattern.as_ref().map(|p| p.source().to_string());
                warn!(
                    rule_index,
                    pattern = pattern.as_deref().unwrap_or("<none>"),
                    "skipping rule: {reason}"
                );
                skipped.push(SkippedRule {
                    rule_index,
                    pattern,
                    reason: reason.to_string(),
                });
            }
        }
    }

    // Phase 2: substitute claimed spans
    let output = render(text, &claims);
    let elapsed_micros = started.elapsed().as_micros() as u64;

    debug!(
        rules = rules.len(),
        claims = claims.len(),
        skipped = skipped.len(),
        elapsed_micros,
        "transform complete"
    );

    TransformReport {
        output,
        claims: claims.into_vec(),
        skipped,
        elapsed_micros,
    }
}

/// Collect the claims one rule would make. Nothing is committed here, so a
/// failing callback drops every claim of this rule for the call.
fn claim_matches(
    text: &str,
    rule_index: usize,
    rule: &Rule,
    claims: &ClaimMap,
) -> Result<Vec<Claim>> {
    let pattern = rule.pattern.as_ref().ok_or(ReformatError::EmptyPattern)?;
    let regex = build_pattern(pattern)?;

    let mut pending: Vec<Claim> = Vec::new();
    for caps in regex.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let (start, end) = (whole.start(), whole.end());

        // Zero-width spans cover no position and can never be claimed
        if start == end {
            continue;
        }

        let after_pending = pending.last().map_or(true, |prev| prev.end <= start);
        if !after_pending || !claims.is_free(start, end) {
            trace!(rule_index, start, end, "match overlaps an existing claim");
            continue;
        }

        let groups: Vec<Option<&str>> = caps
            .iter()
            .skip(1)
            .map(|group| group.map(|g| g.as_str()))
            .collect();
        let replacement = rule.replacement.resolve(whole.as_str(), &groups)?;

        pending.push(Claim {
            rule_index,
            original: whole.as_str().to_string(),
            replacement,
            start,
            end,
        });
    }

    Ok(pending)
}

/// Walk the original text, emitting claimed replacements and unclaimed text.
fn render(text: &str, claims: &ClaimMap) -> String {
    let mut output = String::with_capacity(text.len());
    let mut position = 0;

    for claim in claims.iter() {
        output.push_str(&text[position..claim.start]);
        output.push_str(&claim.replacement);
        position = claim.end;
    }
    output.push_str(&text[position..]);

    output
}

/// An ordered rule list applied as a unit.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    rules: Vec<Rule>,
}

impl RuleEngine {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn from_config(config: &RuleSetConfig) -> Self {
        debug!(
            rule_set = %config.name,
            rules = config.rules.len(),
            "building rule engine"
        );
        Self::new(config.to_rules())
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn apply(&self, text: &str) -> String {
        transform(text, &self.rules)
    }

    pub fn apply_with_report(&self, text: &str) -> TransformReport {
        transform_with_report(text, &self.rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn rules(pairs: &[(&str, &str)]) -> Vec<Rule> {
        pairs.iter().map(|(p, r)| Rule::new(*p, *r)).collect()
    }

    #[test]
    fn test_passthrough_on_missing_input() {
        let any = rules(&[("a", "b")]);
        assert_eq!(transform("", &any), "");
        assert_eq!(transform_opt(None, Some(any.as_slice())), None);
        assert_eq!(transform_opt(Some("abc"), None), Some("abc".to_string()));
        assert_eq!(transform("abc", &[]), "abc");
    }

    #[test]
    fn test_literal_replace_all() {
        let out = transform("cat and cat", &rules(&[("cat", "dog")]));
        assert_eq!(out, "dog and dog");
    }

    #[test]
    fn test_capture_template() {
        let out = transform("**bold**", &rules(&[(r"\*\*(.+?)\*\*", "*$1*")]));
        assert_eq!(out, "*bold*");
    }

    #[test]
    fn test_line_anchor_inference() {
        let out = transform("#Title\nbody", &rules(&[("^#(.*)$", "*_$1_*")]));
        assert_eq!(out, "*_Title_*\nbody");
    }

    #[test]
    fn test_earlier_rule_blocks_overlap() {
        let out = transform("abcd", &rules(&[("abc", "X"), ("bcd", "Y")]));
        assert_eq!(out, "Xd");
    }

    #[test]
    fn test_later_rule_fills_unclaimed_gaps() {
        let out = transform("abc abc", &rules(&[("b", "B"), ("abc", "Z"), ("c", "C")]));
        assert_eq!(out, "aBC aBC");
    }

    #[test]
    fn test_malformed_rule_skipped() {
        let report = transform_with_report("a", &rules(&[("(", "X"), ("a", "Z")]));
        assert_eq!(report.output, "Z");
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].rule_index, 0);
        assert_eq!(report.skipped[0].pattern.as_deref(), Some("("));
    }

    #[test]
    fn test_missing_and_empty_patterns_skipped() {
        let list = vec![
            Rule::without_pattern("X"),
            Rule::new("", "Y"),
            Rule::new("a", "Z"),
        ];
        let report = transform_with_report("aa", &list);
        assert_eq!(report.output, "ZZ");
        let skipped: Vec<_> = report.skipped.iter().map(|s| s.rule_index).collect();
        assert_eq!(skipped, vec![0, 1]);
    }

    #[test]
    fn test_rules_see_original_text_only() {
        // Rule 2 would match rule 1's output under sequential replace
        let out = transform("a", &rules(&[("a", "b"), ("b", "c")]));
        assert_eq!(out, "b");
    }

    #[test]
    fn test_computed_replacement_receives_groups() {
        let rule = Rule::computed(r"(\w+)(?:=(\d+))?", |matched, groups| {
            Ok(format!(
                "{}:{}:{}",
                matched,
                groups[0].unwrap_or("-"),
                groups[1].unwrap_or("none")
            ))
        });
        let out = transform("x=1 y", &[rule]);
        assert_eq!(out, "x=1:x:1 y:y:none");
    }

    #[test]
    fn test_failing_callback_skips_whole_rule() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let failing = Rule::computed("a", move |m, _| {
            if counter.fetch_add(1, Ordering::SeqCst) == 1 {
                Err("second call fails".into())
            } else {
                Ok(m.to_uppercase())
            }
        });
        let list = vec![Rule::new("b", "B"), failing, Rule::new("a", "z")];

        let report = transform_with_report("aba", &list);
        assert_eq!(report.output, "zBz");
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].rule_index, 1);
        assert!(report.skipped[0].reason.contains("second call fails"));
    }

    #[test]
    fn test_compiled_pattern_not_modified() {
        let regex = Regex::new("^b").unwrap();
        let rule = Rule::new(regex.clone(), "B");
        assert_eq!(transform("a\nb", &[rule]), "a\nB");
        assert!(!regex.is_match("a\nb"));
    }

    #[test]
    fn test_zero_width_matches_claim_nothing() {
        let report = transform_with_report("abc", &rules(&[("x*", "-"), ("b", "B")]));
        assert_eq!(report.output, "aBc");
        assert_eq!(report.claims.len(), 1);
    }

    #[test]
    fn test_multibyte_text() {
        let out = transform("héllo wörld", &rules(&[("ö", "oe"), ("é", "e")]));
        assert_eq!(out, "hello woerld");
    }

    #[test]
    fn test_claims_report_sorted() {
        let report = transform_with_report("abcabc", &rules(&[("c", "3"), ("a", "1")]));
        let spans: Vec<_> = report
            .claims
            .iter()
            .map(|c| (c.start, c.end, c.rule_index))
            .collect();
        assert_eq!(spans, vec![(0, 1, 1), (2, 3, 0), (3, 4, 1), (5, 6, 0)]);
        assert_eq!(report.output, "1b31b3");
    }

    #[test]
    fn test_engine_applies_owned_rules() {
        let mut engine = RuleEngine::new(rules(&[("cat", "dog")]));
        engine.push(Rule::new("dog", "cat"));
        assert_eq!(engine.rules().len(), 2);
        assert_eq!(engine.apply("cat dog"), "dog cat");
    }
}
