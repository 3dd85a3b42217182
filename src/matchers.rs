use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{config_error, ChapcutError, Result};

/// Predicate deciding whether a chapter title marks it for removal
pub trait ChapterMatcher: Send + Sync {
    /// Name of the matcher
    fn name(&self) -> &str;

    /// Description of what this matcher does
    fn description(&self) -> &str;

    /// True if the chapter with this title should be removed
    fn matches(&self, title: &str) -> bool;
}

/// How the filter string is compared against chapter titles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[default]
    Substring,
    Exact,
    Regex,
}

impl MatchMode {
    pub const ALL: [MatchMode; 3] = [MatchMode::Substring, MatchMode::Exact, MatchMode::Regex];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Substring => "substring",
            MatchMode::Exact => "exact",
            MatchMode::Regex => "regex",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MatchMode::Substring => "Title contains the filter, ignoring case (empty filter matches all)",
            MatchMode::Exact => "Title equals the filter, ignoring case and surrounding whitespace",
            MatchMode::Regex => "Title matches the filter as a case-insensitive regular expression",
        }
    }

    /// Build the matcher for a filter string
    pub fn build(&self, filter: &str) -> Result<Box<dyn ChapterMatcher>> {
        Ok(match self {
            MatchMode::Substring => Box::new(SubstringMatcher::new(filter)),
            MatchMode::Exact => Box::new(ExactMatcher::new(filter)),
            MatchMode::Regex => Box::new(RegexMatcher::new(filter)?),
        })
    }
}

impl std::str::FromStr for MatchMode {
    type Err = ChapcutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "substring" => Ok(MatchMode::Substring),
            "exact" => Ok(MatchMode::Exact),
            "regex" => Ok(MatchMode::Regex),
            _ => Err(config_error(
                "match_mode",
                format!("Invalid match mode '{}'. Valid options: substring, exact, regex", s),
            )),
        }
    }
}

impl std::fmt::Display for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive substring match
pub struct SubstringMatcher {
    needle: String,
}

impl SubstringMatcher {
    pub fn new(filter: &str) -> Self {
        Self {
            needle: filter.to_lowercase(),
        }
    }
}

impl ChapterMatcher for SubstringMatcher {
    fn name(&self) -> &str {
        MatchMode::Substring.as_str()
    }

    fn description(&self) -> &str {
        MatchMode::Substring.description()
    }

    fn matches(&self, title: &str) -> bool {
        title.to_lowercase().contains(&self.needle)
    }
}

/// Case-insensitive whole-title match
pub struct ExactMatcher {
    title: String,
}

impl ExactMatcher {
    pub fn new(filter: &str) -> Self {
        Self {
            title: filter.trim().to_lowercase(),
        }
    }
}

impl ChapterMatcher for ExactMatcher {
    fn name(&self) -> &str {
        MatchMode::Exact.as_str()
    }

    fn description(&self) -> &str {
        MatchMode::Exact.description()
    }

    fn matches(&self, title: &str) -> bool {
        title.trim().to_lowercase() == self.title
    }
}

/// Case-insensitive regular expression match
pub struct RegexMatcher {
    regex: Regex,
}

impl RegexMatcher {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| config_error("filter_string", format!("Invalid regex '{}': {}", pattern, e)))?;
        Ok(Self { regex })
    }
}

impl ChapterMatcher for RegexMatcher {
    fn name(&self) -> &str {
        MatchMode::Regex.as_str()
    }

    fn description(&self) -> &str {
        MatchMode::Regex.description()
    }

    fn matches(&self, title: &str) -> bool {
        self.regex.is_match(title)
    }
}
