//! Line-oriented robots.txt parser focused on Disallow rules
//!
//! Intentionally conservative and simple. Disallow entries from every group
//! relevant to the configured User-Agent are accumulated into one list, so
//! multiple matching `User-agent` sections union their restrictions.

use std::time::Duration;

/// Parsed robots.txt ruleset for one host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotsRules {
    disallow: Vec<String>,
    crawl_delay: Duration,
}

impl RobotsRules {
    /// Permissive ruleset used when robots.txt is missing or unreadable
    pub fn allow_all() -> Self {
        Self {
            disallow: Vec::new(),
            crawl_delay: Duration::ZERO,
        }
    }

    /// Checks a request path against every disallow prefix
    ///
    /// A match on any non-empty prefix denies.
    pub fn is_allowed(&self, path: &str) -> bool {
        !self
            .disallow
            .iter()
            .any(|prefix| !prefix.is_empty() && path.starts_with(prefix))
    }

    /// Crawl delay declared for the relevant agent groups, zero if absent
    pub fn crawl_delay(&self) -> Duration {
        self.crawl_delay
    }
}

/// Parses robots.txt content against the configured User-Agent string
///
/// Scans lines sequentially: blank lines and `#` comments are skipped. A
/// `User-agent:` line re-evaluates whether the following block is relevant
/// (its value is `*`, or the configured User-Agent contains the value,
/// case-insensitively). While relevant, `Disallow:` lines append a path
/// prefix and a `Crawl-delay:` line with an integer number of seconds
/// overwrites the delay.
pub fn parse(body: &str, user_agent: &str) -> RobotsRules {
    let agent_lower = user_agent.to_lowercase();
    let mut disallow = Vec::new();
    let mut crawl_delay = Duration::ZERO;
    let mut in_relevant_section = false;

    for raw_line in body.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let lower = line.to_lowercase();

        if let Some(value) = directive_value(line, &lower, "user-agent:") {
            let value_lower = value.to_lowercase();
            in_relevant_section = value_lower == "*" || agent_lower.contains(&value_lower);
            continue;
        }
        if !in_relevant_section {
            continue;
        }

        if let Some(path) = directive_value(line, &lower, "disallow:") {
            disallow.push(path.to_string());
        } else if let Some(value) = directive_value(line, &lower, "crawl-delay:") {
            if let Ok(seconds) = value.parse::<u64>() {
                crawl_delay = Duration::from_secs(seconds);
            }
        }
    }

    RobotsRules {
        disallow,
        crawl_delay,
    }
}

/// Returns the trimmed value of a directive line, matched case-insensitively
fn directive_value<'a>(line: &'a str, lower: &str, directive: &str) -> Option<&'a str> {
    if lower.starts_with(directive) {
        Some(line[directive.len()..].trim())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UA: &str = "rag-webcrawler/0.1";

    #[test]
    fn test_allow_all_permits_everything() {
        let rules = RobotsRules::allow_all();
        assert!(rules.is_allowed("/"));
        assert!(rules.is_allowed("/private/page"));
        assert_eq!(rules.crawl_delay(), Duration::ZERO);
    }

    #[test]
    fn test_wildcard_disallow_prefix() {
        let rules = parse("User-agent: *\nDisallow: /private\n", UA);
        assert!(!rules.is_allowed("/private/page"));
        assert!(!rules.is_allowed("/private"));
        assert!(rules.is_allowed("/public"));
    }

    #[test]
    fn test_empty_disallow_is_permissive() {
        let rules = parse("User-agent: *\nDisallow:\n", UA);
        assert!(rules.is_allowed("/anything"));
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let body = "# crawler policy\n\nUser-agent: *\n# block the admin area\nDisallow: /admin\n";
        let rules = parse(body, UA);
        assert!(!rules.is_allowed("/admin/users"));
        assert!(rules.is_allowed("/docs"));
    }

    #[test]
    fn test_irrelevant_group_ignored() {
        let body = "User-agent: otherbot\nDisallow: /\n\nUser-agent: *\nDisallow: /tmp\n";
        let rules = parse(body, UA);
        assert!(rules.is_allowed("/docs"));
        assert!(!rules.is_allowed("/tmp/file"));
    }

    #[test]
    fn test_agent_substring_match_is_case_insensitive() {
        let body = "User-agent: RAG-WebCrawler\nDisallow: /internal\n";
        let rules = parse(body, UA);
        assert!(!rules.is_allowed("/internal"));
    }

    #[test]
    fn test_matching_groups_union_their_disallows() {
        let body = concat!(
            "User-agent: *\n",
            "Disallow: /a\n",
            "\n",
            "User-agent: rag-webcrawler\n",
            "Disallow: /b\n",
        );
        let rules = parse(body, UA);
        assert!(!rules.is_allowed("/a/x"));
        assert!(!rules.is_allowed("/b/y"));
        assert!(rules.is_allowed("/c"));
    }

    #[test]
    fn test_crawl_delay_parsed_as_integer_seconds() {
        let rules = parse("User-agent: *\nCrawl-delay: 3\n", UA);
        assert_eq!(rules.crawl_delay(), Duration::from_secs(3));
    }

    #[test]
    fn test_unparseable_crawl_delay_ignored() {
        let rules = parse("User-agent: *\nCrawl-delay: soon\n", UA);
        assert_eq!(rules.crawl_delay(), Duration::ZERO);
    }

    #[test]
    fn test_crawl_delay_outside_relevant_group_ignored() {
        let rules = parse("User-agent: otherbot\nCrawl-delay: 9\n", UA);
        assert_eq!(rules.crawl_delay(), Duration::ZERO);
    }

    #[test]
    fn test_crlf_line_endings() {
        let rules = parse("User-agent: *\r\nDisallow: /private\r\n", UA);
        assert!(!rules.is_allowed("/private/page"));
    }
}
