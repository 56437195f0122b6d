use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

pub const DEFAULT_HIDDEN_SCORE_THRESHOLD: i64 = -4;

/// Read side of whatever preference store the host provides.
pub trait PreferenceSource {
    fn get_string(&self, key: &str) -> Option<String>;

    fn get_number(&self, key: &str) -> Option<i64> {
        self.get_string(key)?.trim().parse().ok()
    }
}

impl PreferenceSource for HashMap<String, String> {
    fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Preferences {
    /// Signed-in viewer, used to flag the viewer's own comments.
    pub username: Option<String>,
    /// Modhash sent as `uh` with every state-changing request.
    pub user_hash: Option<String>,
    /// Comments scoring below this start collapsed.
    pub hidden_comment_score_threshold: i64,
    pub log_level: Option<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            username: None,
            user_hash: None,
            hidden_comment_score_threshold: DEFAULT_HIDDEN_SCORE_THRESHOLD,
            log_level: None,
        }
    }
}

impl Preferences {
    pub fn from_source(source: &dyn PreferenceSource) -> Self {
        let defaults = Self::default();
        Self {
            username: source.get_string("username").filter(|name| !name.is_empty()),
            user_hash: source
                .get_string("redditUserIdentifierHash")
                .filter(|hash| !hash.is_empty()),
            hidden_comment_score_threshold: source
                .get_number("hiddenCommentScoreThreshold")
                .unwrap_or(defaults.hidden_comment_score_threshold),
            log_level: source.get_string("logLevel"),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn reads_known_keys_and_defaults_the_rest() {
        let mut source = HashMap::new();
        source.insert("username".to_string(), "viewer".to_string());
        source.insert("hiddenCommentScoreThreshold".to_string(), "-10".to_string());
        source.insert("redditUserIdentifierHash".to_string(), String::new());

        let prefs = Preferences::from_source(&source);
        assert_eq!(prefs.username.as_deref(), Some("viewer"));
        assert_eq!(prefs.hidden_comment_score_threshold, -10);
        assert_eq!(prefs.user_hash, None);
    }

    #[test]
    fn unparsable_threshold_falls_back_to_default() {
        let mut source = HashMap::new();
        source.insert("hiddenCommentScoreThreshold".to_string(), "lots".to_string());
        let prefs = Preferences::from_source(&source);
        assert_eq!(prefs.hidden_comment_score_threshold, DEFAULT_HIDDEN_SCORE_THRESHOLD);
    }
}
