//! Text lookup and relative timestamps.
//!
//! Messages use positional `$1`, `$2`, ... placeholders. A missing key renders as the key
//! itself so a gap in a catalogue is visible instead of blank.

use std::collections::HashMap;

use chrono::DateTime;
use chrono::Utc;

use super::error::EngineError;

const EN_CATALOGUE: &str = include_str!("../locales/en.yaml");

pub trait Localiser {
    fn lookup(&self, key: &str) -> Option<&str>;

    fn get(&self, key: &str) -> String {
        self.lookup(key).unwrap_or(key).to_string()
    }

    fn format(&self, key: &str, args: &[&str]) -> String {
        let mut text = self.get(key);
        // Highest index first so `$1` does not eat the prefix of `$10`.
        for (idx, arg) in args.iter().enumerate().rev() {
            text = text.replace(&format!("${}", idx + 1), arg);
        }
        text
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    messages: HashMap<String, String>,
}

impl Catalogue {
    pub fn from_yaml(yaml: &str) -> Result<Self, EngineError> {
        let messages: HashMap<String, String> = serde_yaml::from_str(yaml)
            .map_err(|err| EngineError::malformed(format!("localisation catalogue: {err}")))?;
        Ok(Self { messages })
    }

    /// The bundled English strings. A broken bundle is logged and leaves every key
    /// rendering as itself.
    pub fn english() -> Self {
        Self::from_yaml(EN_CATALOGUE).unwrap_or_else(|err| {
            log::warn!("bundled English catalogue is unusable: {err}");
            Self::default()
        })
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.messages.insert(key.into(), value.into());
    }
}

impl Localiser for Catalogue {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }
}

/// "3 hours ago" style text for `then`, measured from `now`.
pub fn relative_timestamp(
    now: DateTime<Utc>,
    then: DateTime<Utc>,
    localiser: &dyn Localiser,
) -> String {
    let secs = (now - then).num_seconds().unsigned_abs() as f64;
    let units = [
        ("year", (secs / 60.0 / 60.0 / 24.0 / 365.27).floor()),
        ("month", (secs / 60.0 / 60.0 / 24.0 / 30.0).floor()),
        ("day", (secs / 60.0 / 60.0 / 24.0).floor()),
        ("hour", (secs / 60.0 / 60.0).floor()),
        ("minute", (secs / 60.0).floor()),
        ("second", secs),
    ];

    for (unit, amount) in units {
        if amount >= 1.0 {
            let unit_key = if amount > 1.0 {
                format!("timestamp_format_{unit}_plural")
            } else {
                format!("timestamp_format_{unit}")
            };
            let count = (amount as u64).to_string();
            let unit = localiser.get(&unit_key);
            return localiser.format("timestamp_format", &[count.as_str(), unit.as_str()]);
        }
    }
    let unit = localiser.get("timestamp_format_second_plural");
    localiser.format("timestamp_format", &["0", unit.as_str()])
}
