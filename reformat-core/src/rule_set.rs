use crate::config::{default_rules, RuleSetConfig};
use crate::error::{ReformatError, Result};
use crate::types::{Rule, RuleRecord};
use tracing::debug;
use uuid::Uuid;

/// Generate a list-identity id for a rule record.
pub fn generate_id() -> String {
    format!("id_{}", Uuid::new_v4().simple())
}

/// Editable, ordered list of rule records with stable ids.
///
/// Every record held by a `RuleSet` has an id. Order is priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    name: String,
    records: Vec<RuleRecord>,
}

impl RuleSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
        }
    }

    pub fn from_records(name: impl Into<String>, records: Vec<RuleRecord>) -> Self {
        let mut set = Self {
            name: name.into(),
            records,
        };
        set.ensure_ids();
        set
    }

    pub fn from_config(config: &RuleSetConfig) -> Self {
        Self::from_records(config.name.clone(), config.rules.clone())
    }

    pub fn to_config(&self) -> RuleSetConfig {
        RuleSetConfig::new(self.name.clone(), self.records.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[RuleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&RuleRecord> {
        self.records.iter().find(|r| r.id.as_deref() == Some(id))
    }

    /// Assign generated ids to records that have none.
    pub fn ensure_ids(&mut self) {
        for record in self.records.iter_mut().filter(|r| r.id.is_none()) {
            record.id = Some(generate_id());
        }
    }

    /// Append a rule, keeping its id if it has one. Returns the id.
    pub fn add(&mut self, mut record: RuleRecord) -> String {
        let id = record.id.get_or_insert_with(generate_id).clone();
        self.records.push(record);
        debug!(rule_set = %self.name, %id, "rule added");
        id
    }

    /// Append a rule with empty pattern and replacement.
    pub fn add_empty(&mut self) -> String {
        self.add(RuleRecord::new("", ""))
    }

    /// Replace the fields of rule `id`; the id itself is kept.
    pub fn edit(&mut self, id: &str, record: RuleRecord) -> Result<()> {
        let idx = self.index_of(id)?;
        self.records[idx] = RuleRecord {
            id: Some(id.to_string()),
            ..record
        };
        Ok(())
    }

    pub fn delete(&mut self, id: &str) -> Result<RuleRecord> {
        let idx = self.index_of(id)?;
        Ok(self.records.remove(idx))
    }

    /// Move rule `from_id` to the position currently held by `to_id`.
    pub fn move_rule(&mut self, from_id: &str, to_id: &str) -> Result<()> {
        if from_id == to_id {
            return Ok(());
        }
        let from = self.index_of(from_id)?;
        let to = self.index_of(to_id)?;

        let record = self.records.remove(from);
        self.records.insert(to, record);
        debug!(rule_set = %self.name, from, to, "rule moved");
        Ok(())
    }

    /// Replace every rule with the built-in defaults under fresh ids.
    pub fn reset_to_defaults(&mut self) {
        self.records = default_rules();
        for record in &mut self.records {
            record.id = Some(generate_id());
        }
    }

    /// Rules in engine form. Rules with empty patterns are kept; the
    /// engine skips them.
    pub fn to_rules(&self) -> Vec<Rule> {
        self.records.iter().map(Rule::from).collect()
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.records
            .iter()
            .position(|r| r.id.as_deref() == Some(id))
            .ok_or_else(|| ReformatError::UnknownRule(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::transform;

    fn patterns(set: &RuleSet) -> Vec<&str> {
        set.records().iter().map(|r| r.pattern.as_str()).collect()
    }

    fn sample() -> RuleSet {
        RuleSet::from_records(
            "sample",
            vec![
                RuleRecord::new("a", "1"),
                RuleRecord::new("b", "2"),
                RuleRecord::new("c", "3"),
            ],
        )
    }

    fn id_at(set: &RuleSet, idx: usize) -> String {
        set.records()[idx].id.clone().unwrap()
    }

    #[test]
    fn test_ids_assigned_and_kept() {
        let mut existing = RuleRecord::new("x", "y");
        existing.id = Some("keep-me".to_string());
        let set = RuleSet::from_records("s", vec![existing, RuleRecord::new("p", "q")]);

        assert_eq!(set.records()[0].id.as_deref(), Some("keep-me"));
        let generated = set.records()[1].id.as_deref().unwrap();
        assert!(generated.starts_with("id_"));
        assert_ne!(generated, "keep-me");
    }

    #[test]
    fn test_add_and_add_empty() {
        let mut set = RuleSet::new("s");
        let id = set.add(RuleRecord::new("cat", "dog"));
        let empty_id = set.add_empty();

        assert_eq!(set.len(), 2);
        assert_eq!(set.get(&id).unwrap().pattern, "cat");
        assert_eq!(set.get(&empty_id).unwrap().pattern, "");
        // The empty rule is skipped by the engine
        assert_eq!(transform("cat", &set.to_rules()), "dog");
    }

    #[test]
    fn test_edit_keeps_id() {
        let mut set = sample();
        let id = id_at(&set, 1);
        set.edit(&id, RuleRecord::new("B", "two")).unwrap();

        assert_eq!(set.records()[1].pattern, "B");
        assert_eq!(set.records()[1].id.as_deref(), Some(id.as_str()));
    }

    #[test]
    fn test_delete() {
        let mut set = sample();
        let id = id_at(&set, 0);
        let removed = set.delete(&id).unwrap();
        assert_eq!(removed.pattern, "a");
        assert_eq!(patterns(&set), vec!["b", "c"]);
        assert!(matches!(set.delete(&id), Err(ReformatError::UnknownRule(_))));
    }

    #[test]
    fn test_move_rule_forward_and_back() {
        let mut set = sample();
        let (a, c) = (id_at(&set, 0), id_at(&set, 2));

        set.move_rule(&a, &c).unwrap();
        assert_eq!(patterns(&set), vec!["b", "c", "a"]);

        let b = id_at(&set, 0);
        set.move_rule(&a, &b).unwrap();
        assert_eq!(patterns(&set), vec!["a", "b", "c"]);

        set.move_rule(&a, &a).unwrap();
        assert_eq!(patterns(&set), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_move_changes_precedence() {
        let mut set = RuleSet::from_records(
            "s",
            vec![RuleRecord::new("abc", "X"), RuleRecord::new("bcd", "Y")],
        );
        assert_eq!(transform("abcd", &set.to_rules()), "Xd");

        let (first, second) = (id_at(&set, 0), id_at(&set, 1));
        set.move_rule(&second, &first).unwrap();
        assert_eq!(transform("abcd", &set.to_rules()), "aY");
    }

    #[test]
    fn test_move_unknown_id() {
        let mut set = sample();
        let a = id_at(&set, 0);
        assert!(set.move_rule(&a, "missing").is_err());
        assert_eq!(patterns(&set), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_reset_to_defaults() {
        let mut set = sample();
        set.reset_to_defaults();
        assert_eq!(set.len(), default_rules().len());
        assert!(set.records().iter().all(|r| r.id.is_some()));
    }

    #[test]
    fn test_config_round_trip_keeps_ids() {
        let set = sample();
        let restored = RuleSet::from_config(&set.to_config());
        assert_eq!(restored, set);
    }
}
