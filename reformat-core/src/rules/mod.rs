// Rule application.
//
// - engine.rs: transform entry points and RuleEngine
// - pattern.rs: flag inference and regex construction
// - template.rs: `$k` backreference expansion
// - claims.rs: per-call claimed-span map

pub mod claims;
pub mod engine;
pub mod pattern;
pub mod template;

pub use engine::*;
