use memchr::memmem::Finder;

/// Strategy for testing a single line
#[derive(Debug, Clone)]
enum MatchStrategy {
    /// Empty target: every line matches
    Any,
    /// Contiguous, case-sensitive byte sequence
    Literal(Finder<'static>),
}

/// Decides whether a line contains the target substring
#[derive(Debug, Clone)]
pub struct LineMatcher {
    strategy: MatchStrategy,
}

impl LineMatcher {
    /// Creates a matcher for the given target
    pub fn new(target: &str) -> Self {
        let strategy = if target.is_empty() {
            MatchStrategy::Any
        } else {
            MatchStrategy::Literal(Finder::new(target.as_bytes()).into_owned())
        };
        Self { strategy }
    }

    /// Returns true if `line` contains the target
    pub fn is_match(&self, line: &[u8]) -> bool {
        match &self.strategy {
            MatchStrategy::Any => true,
            MatchStrategy::Literal(finder) => finder.find(line).is_some(),
        }
    }
}
