//! Format compatibility policy
//!
//! Maps an input extension to the set of output formats the vendor is allowed
//! to produce from it. The policy is built once at startup and injected into
//! the conversion service; the single-target mode is a table with one
//! wildcard entry.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::types::{AppError, AppResult};

/// Input key matching every extension.
pub const ANY_INPUT: &str = "*";

const DEFAULT_TABLE: &[(&str, &[&str])] = &[
    ("docx", &["pdf", "txt", "png", "csv"]),
    ("pdf", &["docx", "txt", "png", "csv"]),
    ("txt", &["docx", "pdf", "png", "csv"]),
    ("csv", &["docx", "pdf", "txt", "png"]),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatPolicy {
    rules: BTreeMap<String, BTreeSet<String>>,
}

impl FormatPolicy {
    pub fn new<I, K, V>(rules: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        let rules = rules
            .into_iter()
            .map(|(input, outputs)| {
                let input: String = input.into();
                let outputs = outputs
                    .into_iter()
                    .map(|output| normalize(&Into::<String>::into(output)))
                    .collect();
                (normalize(&input), outputs)
            })
            .collect();
        Self { rules }
    }

    /// Every input may only be converted to `target`.
    pub fn single_target(target: impl Into<String>) -> Self {
        let target: String = target.into();
        Self::new([(ANY_INPUT, vec![target])])
    }

    pub fn from_config(config: &crate::config::FormatsConfig) -> Self {
        match &config.single_target {
            Some(target) => Self::single_target(target.clone()),
            None => Self::default(),
        }
    }

    pub fn allowed_outputs(&self, input: &str) -> Option<&BTreeSet<String>> {
        self.rules
            .get(&normalize(input))
            .or_else(|| self.rules.get(ANY_INPUT))
    }

    pub fn is_allowed(&self, input: &str, target: &str) -> bool {
        self.allowed_outputs(input)
            .is_some_and(|outputs| outputs.contains(&normalize(target)))
    }

    pub fn validate(&self, input: &str, target: &str) -> AppResult<()> {
        if self.is_allowed(input, target) {
            Ok(())
        } else {
            Err(AppError::UnsupportedConversion {
                input: input.to_string(),
                target: target.to_string(),
            })
        }
    }

    pub fn rules(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.rules
    }
}

impl Default for FormatPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_TABLE
                .iter()
                .map(|(input, outputs)| (*input, outputs.to_vec())),
        )
    }
}

fn normalize(format: &str) -> String {
    format.trim().to_lowercase()
}

/// Lowercased text after the last dot of `filename`, empty when there is none.
pub fn input_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_FORMATS: &[&str] = &["docx", "pdf", "txt", "png", "csv", "xlsx", "jpg", ""];

    #[test]
    fn test_default_table_accepts_exactly_listed_pairs() {
        let policy = FormatPolicy::default();

        for input in ALL_FORMATS {
            for target in ALL_FORMATS {
                let listed = DEFAULT_TABLE
                    .iter()
                    .any(|(i, outputs)| i == input && outputs.contains(target));
                assert_eq!(
                    policy.validate(input, target).is_ok(),
                    listed,
                    "{} -> {}",
                    input,
                    target
                );
            }
        }
    }

    #[test]
    fn test_rejection_carries_the_pair() {
        let err = FormatPolicy::default().validate("exe", "pdf").unwrap_err();
        match err {
            AppError::UnsupportedConversion { input, target } => {
                assert_eq!(input, "exe");
                assert_eq!(target, "pdf");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_target_is_case_insensitive() {
        let policy = FormatPolicy::default();
        assert!(policy.is_allowed("DOCX", "PDF"));
        assert!(policy.is_allowed("pdf", " docx "));
    }

    #[test]
    fn test_single_target_policy() {
        let policy = FormatPolicy::single_target("pdf");
        assert!(policy.is_allowed("docx", "pdf"));
        assert!(policy.is_allowed("anything", "pdf"));
        assert!(policy.is_allowed("", "pdf"));
        assert!(!policy.is_allowed("docx", "txt"));
        assert_eq!(policy.rules().len(), 1);
    }

    #[test]
    fn test_specific_rule_wins_over_wildcard() {
        let policy = FormatPolicy::new([("*", vec!["pdf"]), ("csv", vec!["txt"])]);
        assert!(policy.is_allowed("csv", "txt"));
        assert!(!policy.is_allowed("csv", "pdf"));
        assert!(policy.is_allowed("docx", "pdf"));
    }

    #[test]
    fn test_input_extension() {
        assert_eq!(input_extension("report.DOCX"), "docx");
        assert_eq!(input_extension("archive.tar.gz"), "gz");
        assert_eq!(input_extension("README"), "");
        assert_eq!(input_extension(".hidden"), "");
        assert_eq!(input_extension("trailing."), "");
    }
}
