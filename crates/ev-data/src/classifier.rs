//! Powertrain category rules compiled for matching.

use ev_core::config::{default_categories, CategoryRule, TagMatcher};
use ev_core::error::{EvError, Result};
use regex::Regex;

#[derive(Debug, Clone)]
enum Matcher {
    Contains(String),
    Pattern(Regex),
}

impl Matcher {
    fn is_match(&self, tag: &str) -> bool {
        match self {
            Matcher::Contains(needle) => tag.contains(needle.as_str()),
            Matcher::Pattern(re) => re.is_match(tag),
        }
    }
}

/// Ordered list of `(label, matcher)` rules.
///
/// Every rule is tested on its own: a tag may match several rules, or none.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<(String, Matcher)>,
}

impl Classifier {
    /// Compile `rules`, failing on the first pattern that is not a valid
    /// regular expression.
    pub fn new(rules: &[CategoryRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| -> Result<(String, Matcher)> {
                let matcher = match &rule.matcher {
                    TagMatcher::Contains(needle) => Matcher::Contains(needle.clone()),
                    TagMatcher::Pattern(pattern) => {
                        Matcher::Pattern(Regex::new(pattern).map_err(|source| {
                            EvError::InvalidPattern {
                                label: rule.label.clone(),
                                source,
                            }
                        })?)
                    }
                };
                Ok((rule.label.clone(), matcher))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Labels in emission order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(label, _)| label.as_str())
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Indices of the rules matching `tag`, in rule order.
    pub fn matching<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.rules
            .iter()
            .enumerate()
            .filter(move |(_, (_, matcher))| matcher.is_match(tag))
            .map(|(i, _)| i)
    }
}

impl Default for Classifier {
    /// The same rules as [`default_categories`], built without compiling.
    fn default() -> Self {
        Self {
            rules: vec![
                ("BEV".to_string(), Matcher::Contains("BEV".to_string())),
                ("PHEV".to_string(), Matcher::Contains("PHEV".to_string())),
            ],
        }
    }
}
