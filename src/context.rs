//! Platform configuration and per-thread context.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Limits and addressing for the platform a thread is published to.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use posse_thread::context::PlatformConfig;
///
/// let config = PlatformConfig::from_json(r#"{ "char_limit": 500 }"#).unwrap();
/// assert_eq!(config.char_limit, 500);
/// assert_eq!(config.reserved_link_width, 24);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Maximum characters per message
    pub char_limit: usize,
    /// Characters a link occupies once the platform shortens it
    pub reserved_link_width: usize,
    /// Base URL of the platform, used to recognize reply targets and build permalinks
    pub base_url: String,
    /// Maximum images attached to one message
    pub max_media_per_unit: usize,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            char_limit: 240,
            reserved_link_width: 24,
            base_url: "https://twitter.com".to_string(),
            max_media_per_unit: 4,
        }
    }
}

impl PlatformConfig {
    /// Parse a platform configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the limits leave room for text.
    pub fn validate(&self) -> Result<()> {
        if self.char_limit <= self.reserved_link_width + 2 {
            return Err(Error::Config(format!(
                "char_limit {} leaves no room for text beside a {}-character link",
                self.char_limit, self.reserved_link_width
            )));
        }
        if self.max_media_per_unit == 0 {
            return Err(Error::Config(
                "max_media_per_unit must be at least 1".to_string(),
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err(Error::Config("base_url is required".to_string()));
        }
        Ok(())
    }

    /// Budget for the first message, which carries the permalink.
    pub fn first_budget(&self) -> usize {
        self.char_limit
            .saturating_sub(1)
            .saturating_sub(self.reserved_link_width)
    }

    /// Budget for every message after the first.
    pub fn rest_budget(&self) -> usize {
        self.char_limit
    }
}

/// Everything one assembly needs to know about its destination.
///
/// # Example
///
/// ```
/// use posse_thread::context::ThreadContext;
///
/// let ctx = ThreadContext::new("https://kongaloosh.com/e/2018/8/1/dlss")
///     .reply_target("https://twitter.com/someone/status/555");
/// assert_eq!(ctx.first_budget(), 215);
/// assert_eq!(ctx.rest_budget(), 240);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadContext {
    link: String,
    reply_target: Option<String>,
    platform: PlatformConfig,
}

impl ThreadContext {
    /// Create a context for a post at `link`, using the default platform.
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            reply_target: None,
            platform: PlatformConfig::default(),
        }
    }

    /// Set the URL of the post this one replies to.
    pub fn reply_target(mut self, target: impl Into<String>) -> Self {
        self.reply_target = Some(target.into());
        self
    }

    /// Set the reply target from an optional URL.
    pub fn maybe_reply_target(mut self, target: Option<impl Into<String>>) -> Self {
        self.reply_target = target.map(Into::into);
        self
    }

    /// Use a specific platform configuration.
    pub fn platform(mut self, platform: PlatformConfig) -> Self {
        self.platform = platform;
        self
    }

    /// The destination permalink.
    pub fn link(&self) -> &str {
        &self.link
    }

    /// The URL this post replies to, if any.
    pub fn target(&self) -> Option<&str> {
        self.reply_target.as_deref()
    }

    /// The platform configuration.
    pub fn platform_config(&self) -> &PlatformConfig {
        &self.platform
    }

    /// Budget for the first message.
    pub fn first_budget(&self) -> usize {
        self.platform.first_budget()
    }

    /// Budget for every later message.
    pub fn rest_budget(&self) -> usize {
        self.platform.rest_budget()
    }

    /// Check the context before assembly.
    pub fn validate(&self) -> Result<()> {
        if self.link.trim().is_empty() {
            return Err(Error::Config("a destination link is required".to_string()));
        }
        self.platform.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budgets() {
        let config = PlatformConfig::default();
        assert_eq!(config.first_budget(), 240 - 1 - 24);
        assert_eq!(config.rest_budget(), 240);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_rejects_tiny_limit() {
        let err = PlatformConfig::from_json(r#"{ "char_limit": 20 }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = PlatformConfig::from_json("char_limit = 20").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_zero_media_is_invalid() {
        let config = PlatformConfig {
            max_media_per_unit: 0,
            ..PlatformConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_context_requires_link() {
        assert!(ThreadContext::new("  ").validate().is_err());
        assert!(ThreadContext::new("example.com/e/1").validate().is_ok());
    }

    #[test]
    fn test_maybe_reply_target() {
        let ctx = ThreadContext::new("l").maybe_reply_target(None::<String>);
        assert_eq!(ctx.target(), None);
        let ctx = ctx.maybe_reply_target(Some("https://twitter.com/a/status/1"));
        assert_eq!(ctx.target(), Some("https://twitter.com/a/status/1"));
    }
}
