// src/models/session.rs

//! Crawl session parameters: target view, tab order, quota.

use crate::error::{AppError, Result};

/// Which feed view to crawl. Exactly one target per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    Home,
    Profile(String),
    Hashtag(String),
    Query(String),
}

impl TargetSpec {
    /// Build a target from the mutually exclusive CLI-style options.
    pub fn from_options(
        username: Option<String>,
        hashtag: Option<String>,
        query: Option<String>,
    ) -> Result<Self> {
        let set = [username.is_some(), hashtag.is_some(), query.is_some()]
            .iter()
            .filter(|&&b| b)
            .count();
        if set > 1 {
            return Err(AppError::validation(
                "specify only one of username, hashtag, or query",
            ));
        }

        Ok(if let Some(user) = username {
            Self::Profile(user)
        } else if let Some(tag) = hashtag {
            Self::Hashtag(tag.trim_start_matches('#').to_string())
        } else if let Some(q) = query {
            Self::Query(q)
        } else {
            Self::Home
        })
    }

    /// Human-readable label for logging.
    pub fn describe(&self) -> String {
        match self {
            Self::Home => "home timeline".to_string(),
            Self::Profile(user) => format!("@{user}"),
            Self::Hashtag(tag) => format!("#{tag}"),
            Self::Query(q) => format!("search \"{q}\""),
        }
    }
}

/// Result ordering for hashtag and search views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TabOrder {
    #[default]
    Latest,
    Top,
}

impl TabOrder {
    /// Resolve from the latest/top flags. Defaults to Latest; both set is
    /// rejected.
    pub fn from_flags(latest: bool, top: bool) -> Result<Self> {
        match (latest, top) {
            (true, true) => Err(AppError::validation(
                "specify either latest or top, not both",
            )),
            (_, true) => Ok(Self::Top),
            _ => Ok(Self::Latest),
        }
    }
}

/// Parameters for one crawl invocation.
#[derive(Debug, Clone)]
pub struct CrawlSession {
    pub target: TargetSpec,
    pub tab: TabOrder,
    /// Stop after this many records (unless `no_limit`)
    pub quota: usize,
    /// Ignore the quota and crawl until exhaustion or cancellation
    pub no_limit: bool,
    /// Collect poster details alongside each record
    pub poster_details: bool,
}

impl CrawlSession {
    pub fn new(target: TargetSpec, tab: TabOrder, quota: usize, no_limit: bool) -> Self {
        Self {
            target,
            tab,
            quota,
            no_limit,
            poster_details: false,
        }
    }

    /// URL of the target view on the given host.
    pub fn target_url(&self, base: &str) -> String {
        let base = base.trim_end_matches('/');
        let live = matches!(self.tab, TabOrder::Latest);
        match &self.target {
            TargetSpec::Home => format!("{base}/home"),
            TargetSpec::Profile(user) => format!("{base}/{user}"),
            TargetSpec::Hashtag(tag) => {
                let mut url = format!("{base}/hashtag/{tag}?src=hashtag_click");
                if live {
                    url.push_str("&f=live");
                }
                url
            }
            TargetSpec::Query(q) => {
                let mut pairs = url::form_urlencoded::Serializer::new(String::new());
                pairs.append_pair("q", q).append_pair("src", "typed_query");
                if live {
                    pairs.append_pair("f", "live");
                }
                format!("{base}/search?{}", pairs.finish())
            }
        }
    }

    /// Whether the collected count satisfies the quota.
    pub fn quota_reached(&self, collected: usize) -> bool {
        !self.no_limit && collected >= self.quota
    }
}

/// Why a crawl stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Quota reached
    Quota,
    /// The surface stopped yielding new content
    Exhausted,
    /// External cancellation
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_exclusivity() {
        assert!(
            TargetSpec::from_options(Some("a".into()), Some("b".into()), None).is_err()
        );
        assert_eq!(
            TargetSpec::from_options(None, None, None).unwrap(),
            TargetSpec::Home
        );
        assert_eq!(
            TargetSpec::from_options(None, Some("#rust".into()), None).unwrap(),
            TargetSpec::Hashtag("rust".into())
        );
    }

    #[test]
    fn test_tab_order() {
        assert!(TabOrder::from_flags(true, true).is_err());
        assert_eq!(TabOrder::from_flags(false, false).unwrap(), TabOrder::Latest);
        assert_eq!(TabOrder::from_flags(false, true).unwrap(), TabOrder::Top);
    }

    #[test]
    fn test_target_urls() {
        let base = "https://example.com";
        let session = CrawlSession::new(
            TargetSpec::Hashtag("rust".into()),
            TabOrder::Latest,
            10,
            false,
        );
        assert_eq!(
            session.target_url(base),
            "https://example.com/hashtag/rust?src=hashtag_click&f=live"
        );

        let session = CrawlSession::new(
            TargetSpec::Query("hello world".into()),
            TabOrder::Top,
            10,
            false,
        );
        assert_eq!(
            session.target_url(base),
            "https://example.com/search?q=hello+world&src=typed_query"
        );

        let session = CrawlSession::new(
            TargetSpec::Query("rust & async?".into()),
            TabOrder::Latest,
            10,
            false,
        );
        assert_eq!(
            session.target_url(base),
            "https://example.com/search?q=rust+%26+async%3F&src=typed_query&f=live"
        );
    }

    #[test]
    fn test_quota() {
        let session = CrawlSession::new(TargetSpec::Home, TabOrder::Latest, 5, false);
        assert!(!session.quota_reached(4));
        assert!(session.quota_reached(5));

        let unlimited = CrawlSession::new(TargetSpec::Home, TabOrder::Latest, 5, true);
        assert!(!unlimited.quota_reached(500));
    }
}
