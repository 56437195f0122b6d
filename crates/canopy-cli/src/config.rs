use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use canopy_core::Preferences;

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("canopy").join("config.toml"))
}

/// Reads preferences from `explicit` if given, else from the default location. A missing
/// default file is not an error; a missing explicit one is.
pub fn load_preferences(explicit: Option<&Path>) -> Result<Preferences, Box<dyn std::error::Error>> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => return Ok(Preferences::default()),
        },
    };
    match fs::read_to_string(&path) {
        Ok(text) => parse_preferences(&text)
            .map_err(|err| format!("invalid config {}: {err}", path.display()).into()),
        Err(err) if err.kind() == io::ErrorKind::NotFound && !required => {
            Ok(Preferences::default())
        }
        Err(err) => Err(format!("failed to read config {}: {err}", path.display()).into()),
    }
}

pub fn parse_preferences(text: &str) -> Result<Preferences, toml::de::Error> {
    toml::from_str(text)
}

#[cfg(test)]
mod tests {
    use canopy_core::DEFAULT_HIDDEN_SCORE_THRESHOLD;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn partial_files_keep_defaults() {
        let prefs = parse_preferences("username = \"viewer\"\n").expect("parses");
        assert_eq!(prefs.username.as_deref(), Some("viewer"));
        assert_eq!(prefs.hidden_comment_score_threshold, DEFAULT_HIDDEN_SCORE_THRESHOLD);
    }

    #[test]
    fn explicit_paths_must_exist() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(load_preferences(Some(&dir.path().join("nope.toml"))).is_err());

        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "hidden_comment_score_threshold = -8\nuser_hash = \"abc\"\nlog_level = \"debug\"\n",
        )
        .expect("write config");
        let prefs = load_preferences(Some(&path)).expect("loads");
        assert_eq!(prefs.hidden_comment_score_threshold, -8);
        assert_eq!(prefs.user_hash.as_deref(), Some("abc"));
        assert_eq!(prefs.log_level.as_deref(), Some("debug"));
    }
}
