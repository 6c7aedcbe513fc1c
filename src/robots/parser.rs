//! Robots.txt parser implementation
//!
//! Allow/Disallow matching is delegated to the robotstxt crate. Crawl-delay and
//! Sitemap directives, which that matcher ignores, are read here directly.

use robotstxt::DefaultMatcher;
use std::time::Duration;

/// Longest crawl-delay honored; larger declared values are clamped to this
pub const MAX_CRAWL_DELAY: Duration = Duration::from_secs(60);

/// Parsed robots.txt data
///
/// An empty document, like an explicit allow-all policy, permits every path.
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content
    content: String,
    /// Permissive policy used when robots.txt is missing or unreadable
    allow_all: bool,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            allow_all: false,
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// This is the policy used whenever robots.txt cannot be fetched.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
        }
    }

    /// Returns whether this policy permits everything without consulting any rules
    pub fn is_allow_all(&self) -> bool {
        self.allow_all || self.content.trim().is_empty()
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - The URL or path to check (e.g., "https://example.test/page" or "/page")
    /// * `user_agent` - The robots.txt product token (e.g., "KiteCrawler")
    ///
    /// # Returns
    ///
    /// * `true` - If the URL is allowed
    /// * `false` - If the URL is disallowed
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.is_allow_all() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// Gets the crawl delay, in seconds, that applies to a user agent
    ///
    /// A group naming the agent wins over the `*` group. Agent names are
    /// compared case-insensitively.
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        if self.is_allow_all() {
            return None;
        }

        let agent = user_agent.to_lowercase();
        let mut group_agents: Vec<String> = Vec::new();
        let mut in_agent_list = false;
        let mut for_agent = None;
        let mut for_wildcard = None;

        for (key, value) in directives(&self.content) {
            if key == "user-agent" {
                // A user-agent line after rules starts a new group
                if !in_agent_list {
                    group_agents.clear();
                }
                in_agent_list = true;
                group_agents.push(value.to_lowercase());
                continue;
            }
            in_agent_list = false;

            if key != "crawl-delay" {
                continue;
            }
            let Ok(delay) = value.parse::<f64>() else {
                continue;
            };

            if group_agents.iter().any(|ua| *ua == agent) {
                for_agent.get_or_insert(delay);
            } else if group_agents.iter().any(|ua| ua == "*") {
                for_wildcard.get_or_insert(delay);
            }
        }

        for_agent.or(for_wildcard)
    }

    /// Gets the crawl delay for a user agent as a Duration
    ///
    /// Zero, negative and NaN delays are ignored. Anything above
    /// [`MAX_CRAWL_DELAY`], including values too large for a `Duration`, is clamped.
    pub fn crawl_delay_duration(&self, user_agent: &str) -> Option<Duration> {
        let seconds = self
            .crawl_delay(user_agent)
            .filter(|seconds| !seconds.is_nan() && *seconds > 0.0)?;
        let delay = Duration::try_from_secs_f64(seconds).unwrap_or(MAX_CRAWL_DELAY);
        Some(delay.min(MAX_CRAWL_DELAY))
    }

    /// Returns the sitemap URLs declared with `Sitemap:` lines, in file order
    ///
    /// Sitemap directives are not tied to a user-agent group.
    pub fn sitemaps(&self) -> Vec<String> {
        directives(&self.content)
            .filter(|(key, value)| key == "sitemap" && !value.is_empty())
            .map(|(_, value)| value.to_string())
            .collect()
    }
}

/// Iterates `(lowercased key, trimmed value)` pairs, skipping comments and blank lines
fn directives(content: &str) -> impl Iterator<Item = (String, &str)> {
    content.lines().filter_map(|line| {
        let line = match line.find('#') {
            Some(idx) => &line[..idx],
            None => line,
        };
        let (key, value) = line.trim().split_once(':')?;
        Some((key.trim().to_lowercase(), value.trim()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_all() {
        let robots = ParsedRobots::allow_all();
        assert!(robots.is_allowed("/any/path", "TestBot"));
        assert!(robots.is_allowed("/admin", "TestBot"));
    }

    #[test]
    fn test_parse_disallow_all() {
        let robots = ParsedRobots::from_content("User-agent: *\nDisallow: /");
        assert!(!robots.is_allowed("/", "TestBot"));
        assert!(!robots.is_allowed("/page", "TestBot"));
    }

    #[test]
    fn test_parse_disallow_prefix() {
        let robots = ParsedRobots::from_content("User-agent: *\nDisallow: /private/");
        assert!(robots.is_allowed("https://example.test/", "KiteCrawler"));
        assert!(robots.is_allowed("https://example.test/privacy", "KiteCrawler"));
        assert!(!robots.is_allowed("https://example.test/private/page", "KiteCrawler"));
    }

    #[test]
    fn test_parse_allow_overrides_disallow() {
        let robots =
            ParsedRobots::from_content("User-agent: *\nDisallow: /private\nAllow: /private/public");
        assert!(!robots.is_allowed("/private", "TestBot"));
        assert!(robots.is_allowed("/private/public", "TestBot"));
    }

    #[test]
    fn test_parse_specific_user_agent() {
        let robots = ParsedRobots::from_content("User-agent: BadBot\nDisallow: /\n\nUser-agent: *\nAllow: /");
        assert!(robots.is_allowed("/page", "GoodBot"));
        assert!(!robots.is_allowed("/page", "BadBot"));
    }

    #[test]
    fn test_garbage_content_allows_everything() {
        let robots = ParsedRobots::from_content("This is not valid robots.txt {{{");
        assert!(robots.is_allowed("/any/path", "TestBot"));
    }

    #[test]
    fn test_whitespace_content_is_allow_all() {
        let robots = ParsedRobots::from_content("  \n\n");
        assert!(robots.is_allow_all());
    }

    #[test]
    fn test_crawl_delay_wildcard() {
        let robots = ParsedRobots::from_content("User-agent: *\nCrawl-delay: 10\nDisallow: /admin");
        assert_eq!(robots.crawl_delay("TestBot"), Some(10.0));
    }

    #[test]
    fn test_crawl_delay_specific_agent_wins() {
        let robots = ParsedRobots::from_content(
            "User-agent: *\nCrawl-delay: 10\n\nUser-agent: TestBot\nCrawl-delay: 5",
        );
        assert_eq!(robots.crawl_delay("TestBot"), Some(5.0));
        assert_eq!(robots.crawl_delay("testbot"), Some(5.0));
        assert_eq!(robots.crawl_delay("OtherBot"), Some(10.0));
    }

    #[test]
    fn test_crawl_delay_grouped_agents() {
        let robots = ParsedRobots::from_content(
            "User-agent: BotA\nUser-agent: BotB\nDisallow: /x\nCrawl-delay: 3\n\nUser-agent: BotC\nDisallow: /",
        );
        assert_eq!(robots.crawl_delay("BotA"), Some(3.0));
        assert_eq!(robots.crawl_delay("BotB"), Some(3.0));
        assert_eq!(robots.crawl_delay("BotC"), None);
    }

    #[test]
    fn test_crawl_delay_duration() {
        let robots = ParsedRobots::from_content("User-agent: *\nCrawl-delay: 1.5");
        assert_eq!(
            robots.crawl_delay_duration("TestBot"),
            Some(Duration::from_millis(1500))
        );

        let robots = ParsedRobots::from_content("User-agent: *\nCrawl-delay: 0");
        assert_eq!(robots.crawl_delay_duration("TestBot"), None);
    }

    #[test]
    fn test_crawl_delay_duration_is_clamped() {
        for declared in ["86400", "1e300", "inf"] {
            let robots =
                ParsedRobots::from_content(&format!("User-agent: *\nCrawl-delay: {}\n", declared));
            assert_eq!(
                robots.crawl_delay_duration("KiteCrawler"),
                Some(MAX_CRAWL_DELAY),
                "Crawl-delay: {}",
                declared
            );
        }

        let robots = ParsedRobots::from_content("User-agent: *\nCrawl-delay: NaN\n");
        assert_eq!(robots.crawl_delay_duration("KiteCrawler"), None);
        let robots = ParsedRobots::from_content("User-agent: *\nCrawl-delay: -5\n");
        assert_eq!(robots.crawl_delay_duration("KiteCrawler"), None);
    }

    #[test]
    fn test_sitemaps() {
        let robots = ParsedRobots::from_content(
            "User-agent: *\nDisallow: /tmp\nSitemap: https://example.test/sitemap.xml # main\nsitemap:https://example.test/news.xml\nSitemap:",
        );
        assert_eq!(
            robots.sitemaps(),
            vec![
                "https://example.test/sitemap.xml".to_string(),
                "https://example.test/news.xml".to_string()
            ]
        );
    }

    #[test]
    fn test_no_sitemaps_when_allow_all() {
        assert!(ParsedRobots::allow_all().sitemaps().is_empty());
    }
}
