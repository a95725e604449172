//! Job configuration domain types

/// Query parameter appended to suite URLs when cache busting is enabled
pub const CACHE_BUST_PARAM: &str = "cache_killer";

/// A single test suite to run in every browser of the browser set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSuite {
    pub name: String,
    pub url: String,
    pub cache_bust: bool,
    pub disabled: bool,
}

impl TestSuite {
    /// Returns the URL to submit for this suite
    ///
    /// When cache busting is enabled the submission timestamp is appended as a
    /// `cache_killer` query parameter, joined with `&` if the URL already has a
    /// query string and with `?` otherwise.
    pub fn submission_url(&self, submitted_at_millis: i64) -> String {
        if !self.cache_bust {
            return self.url.clone();
        }

        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}{}={}",
            self.url, separator, CACHE_BUST_PARAM, submitted_at_millis
        )
    }
}

/// Validated job configuration
///
/// Built once from the raw configuration surface and never mutated afterwards.
/// Template placeholders in the job name, server URL and suites are still
/// unresolved here; resolution produces separate values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobConfig {
    pub server_url: String,
    pub job_name: String,
    pub project_id: String,
    pub auth_token: String,
    pub max_runs: u32,
    pub browser_set: String,
    pub polling_interval_secs: u64,
    pub timeout_minutes: u64,
    pub minimum_passing: u32,
    pub test_suites: Vec<TestSuite>,
}

impl JobConfig {
    /// Suites that are skipped, in configured order
    pub fn disabled_suites(&self) -> impl Iterator<Item = &TestSuite> {
        self.test_suites.iter().filter(|suite| suite.disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suite(url: &str, cache_bust: bool) -> TestSuite {
        TestSuite {
            name: "core".to_string(),
            url: url.to_string(),
            cache_bust,
            disabled: false,
        }
    }

    #[test]
    fn test_submission_url_without_cache_bust() {
        let suite = suite("http://x/test?x=1", false);
        assert_eq!(suite.submission_url(42), "http://x/test?x=1");
    }

    #[test]
    fn test_submission_url_appends_to_existing_query() {
        let suite = suite("http://x/test?x=1", true);
        assert_eq!(
            suite.submission_url(1700000000123),
            "http://x/test?x=1&cache_killer=1700000000123"
        );
    }

    #[test]
    fn test_submission_url_starts_query() {
        let suite = suite("http://x/test", true);
        assert_eq!(
            suite.submission_url(1700000000123),
            "http://x/test?cache_killer=1700000000123"
        );
    }

    #[test]
    fn test_disabled_suites_keep_order() {
        let mut disabled = suite("http://x/b", false);
        disabled.name = "b".to_string();
        disabled.disabled = true;
        let mut also_disabled = suite("http://x/d", false);
        also_disabled.name = "d".to_string();
        also_disabled.disabled = true;

        let config = JobConfig {
            server_url: "http://swarm".to_string(),
            job_name: "job".to_string(),
            project_id: "ci".to_string(),
            auth_token: "secret".to_string(),
            max_runs: 1,
            browser_set: "popular".to_string(),
            polling_interval_secs: 10,
            timeout_minutes: 5,
            minimum_passing: 1,
            test_suites: vec![
                suite("http://x/a", false),
                disabled,
                suite("http://x/c", true),
                also_disabled,
            ],
        };

        let skipped: Vec<_> = config.disabled_suites().map(|s| s.name.as_str()).collect();
        assert_eq!(skipped, vec!["b", "d"]);
    }
}
