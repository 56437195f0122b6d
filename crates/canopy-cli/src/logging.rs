use std::io;
use std::str::FromStr;

use log::LevelFilter;

/// `--verbose` wins over the configured level; the default is warnings only.
pub fn level_for(verbose: bool, configured: Option<&str>) -> LevelFilter {
    if verbose {
        return LevelFilter::Debug;
    }
    configured
        .and_then(|level| LevelFilter::from_str(level.trim()).ok())
        .unwrap_or(LevelFilter::Warn)
}

pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{}] {}", record.level(), message))
        })
        .level(level)
        .chain(io::stderr())
        .apply()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn verbose_overrides_the_configured_level() {
        assert_eq!(level_for(true, Some("error")), LevelFilter::Debug);
        assert_eq!(level_for(false, Some("info")), LevelFilter::Info);
        assert_eq!(level_for(false, Some("loud")), LevelFilter::Warn);
        assert_eq!(level_for(false, None), LevelFilter::Warn);
    }
}
