//! TOML configuration file loading and merging with the command line
//!
//! An explicitly named file must exist. Without one, the default
//! `<config dir>/AsyncQueue/asyncqueue.toml` is read when present. Command
//! line values always win over the file.

use crate::app::cli::args::Args;
use crate::app::error::AppError;
use crate::core::logging::{adjust_level, LogFormat};
use crate::queue::api::QueueOptions;
use crate::subscribers::api::SubscriberOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_LOG_LEVEL: &str = "info";

/// Contents of `asyncqueue.toml`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub queue: QueueOptions,
    pub subscribers: SubscribersSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct SubscribersSection {
    pub lossless: bool,
    pub subjects: Vec<String>,
    pub idle_timeout: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    pub level: Option<String>,
    pub format: Option<LogFormat>,
    pub file: Option<PathBuf>,
    pub color: Option<bool>,
}

/// Settings for one relay run
#[derive(Debug, Clone, PartialEq)]
pub struct RelaySettings {
    pub subjects: Vec<String>,
    pub options: SubscriberOptions,
    pub idle_timeout: Option<Duration>,
    pub color: bool,
}

/// Fully resolved settings after merging file and command line
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub relay: RelaySettings,
    pub log_level: String,
    pub log_format: LogFormat,
    pub log_file: Option<PathBuf>,
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("AsyncQueue").join("asyncqueue.toml"))
}

/// Load the configuration file, or an empty configuration if there is none
pub fn load_config(explicit: Option<&Path>) -> Result<ConfigFile, AppError> {
    let path = match explicit {
        Some(path) if !path.exists() => {
            return Err(AppError::ConfigMissing {
                path: path.to_path_buf(),
            })
        }
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => {
                log::trace!("No configuration file found, using defaults");
                return Ok(ConfigFile::default());
            }
        },
    };

    let contents = std::fs::read_to_string(&path).map_err(|source| AppError::ConfigRead {
        path: path.clone(),
        source,
    })?;
    parse_config(&contents, &path)
}

pub fn parse_config(contents: &str, path: &Path) -> Result<ConfigFile, AppError> {
    toml::from_str(contents).map_err(|source| AppError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

impl Settings {
    /// Merge the command line over the configuration file
    ///
    /// `is_terminal` decides colour when neither the command line nor the
    /// file chooses.
    pub fn resolve(args: &Args, config: ConfigFile, is_terminal: bool) -> Result<Self, AppError> {
        let ConfigFile {
            queue,
            subscribers,
            logging,
        } = config;

        let subjects = if args.subjects.is_empty() {
            subscribers.subjects
        } else {
            args.subjects.clone()
        };
        let subjects = normalise_subjects(subjects)?;

        let options = SubscriberOptions {
            lossless: args.lossless || subscribers.lossless,
            capacity: args.capacity.unwrap_or(queue.capacity),
        };

        let idle_timeout = args
            .idle_timeout
            .or(subscribers.idle_timeout)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let color = args
            .color_choice()
            .or(logging.color)
            .unwrap_or(is_terminal);

        let log_format = match &args.log_format {
            Some(format) => format.parse::<LogFormat>()?,
            None => logging.format.unwrap_or_default(),
        };

        let base_level = args
            .log_level
            .clone()
            .or(logging.level)
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        let log_level = adjust_level(&base_level, args.verbosity()).to_string();

        Ok(Settings {
            relay: RelaySettings {
                subjects,
                options,
                idle_timeout,
                color,
            },
            log_level,
            log_format,
            log_file: args.log_file.clone().or(logging.file),
        })
    }
}

// Trim, reject blank or whitespace-containing names, drop duplicates keeping first
fn normalise_subjects(subjects: Vec<String>) -> Result<Vec<String>, AppError> {
    let mut unique: Vec<String> = Vec::with_capacity(subjects.len());
    for subject in subjects {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(AppError::Invalid("subject names cannot be empty".to_string()));
        }
        if subject.contains(char::is_whitespace) {
            return Err(AppError::Invalid(format!(
                "subject '{}' contains whitespace",
                subject
            )));
        }
        if !unique.iter().any(|existing| existing == subject) {
            unique.push(subject.to_string());
        }
    }

    if unique.is_empty() {
        return Err(AppError::Invalid(
            "at least one subject is required (--subject or [subscribers] subjects)".to_string(),
        ));
    }
    Ok(unique)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FULL_CONFIG: &str = r#"
[queue]
capacity = 64

[subscribers]
lossless = true
subjects = ["alerts", "metrics"]
idle-timeout = 30

[logging]
level = "warn"
format = "json"
file = "/tmp/asyncqueue.log"
color = false
"#;

    fn args(list: &[&str]) -> Args {
        let mut argv = vec!["asyncqueue"];
        argv.extend_from_slice(list);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(FULL_CONFIG, Path::new("asyncqueue.toml")).unwrap();

        assert_eq!(config.queue.capacity, 64);
        assert!(config.subscribers.lossless);
        assert_eq!(config.subscribers.subjects, vec!["alerts", "metrics"]);
        assert_eq!(config.subscribers.idle_timeout, Some(30));
        assert_eq!(config.logging.level.as_deref(), Some("warn"));
        assert_eq!(config.logging.format, Some(LogFormat::Json));
        assert_eq!(config.logging.color, Some(false));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let result = parse_config("[queue]\nsize = 3\n", Path::new("bad.toml"));
        match result {
            Err(AppError::ConfigParse { path, .. }) => assert_eq!(path, Path::new("bad.toml")),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(FULL_CONFIG.as_bytes()).unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.queue.capacity, 64);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        assert!(matches!(
            load_config(Some(&path)),
            Err(AppError::ConfigMissing { .. })
        ));
    }

    #[test]
    fn test_config_only_settings() {
        let config = parse_config(FULL_CONFIG, Path::new("asyncqueue.toml")).unwrap();
        let settings = Settings::resolve(&args(&[]), config, true).unwrap();

        assert_eq!(settings.relay.subjects, vec!["alerts", "metrics"]);
        assert_eq!(
            settings.relay.options,
            SubscriberOptions {
                lossless: true,
                capacity: 64
            }
        );
        assert_eq!(settings.relay.idle_timeout, Some(Duration::from_secs(30)));
        assert!(!settings.relay.color);
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.log_format, LogFormat::Json);
        assert_eq!(settings.log_file, Some(PathBuf::from("/tmp/asyncqueue.log")));
    }

    #[test]
    fn test_cli_overrides_config() {
        let config = parse_config(FULL_CONFIG, Path::new("asyncqueue.toml")).unwrap();
        let cli = args(&[
            "-s",
            "jobs",
            "--capacity",
            "0",
            "--idle-timeout",
            "0",
            "--color",
            "--log-level",
            "error",
            "-v",
            "--log-format",
            "ext",
        ]);
        let settings = Settings::resolve(&cli, config, false).unwrap();

        assert_eq!(settings.relay.subjects, vec!["jobs"]);
        assert_eq!(settings.relay.options.capacity, 0);
        assert!(settings.relay.options.lossless);
        assert_eq!(settings.relay.idle_timeout, None);
        assert!(settings.relay.color);
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.log_format, LogFormat::Ext);
    }

    #[test]
    fn test_color_follows_terminal_by_default() {
        let settings = Settings::resolve(&args(&["-s", "a"]), ConfigFile::default(), true).unwrap();
        assert!(settings.relay.color);
        assert_eq!(settings.log_level, DEFAULT_LOG_LEVEL);

        let settings =
            Settings::resolve(&args(&["-s", "a"]), ConfigFile::default(), false).unwrap();
        assert!(!settings.relay.color);
    }

    #[test]
    fn test_subjects_are_deduplicated() {
        let settings = Settings::resolve(
            &args(&["-s", "b,a", "-s", " b "]),
            ConfigFile::default(),
            false,
        )
        .unwrap();
        assert_eq!(settings.relay.subjects, vec!["b", "a"]);
    }

    #[test]
    fn test_subjects_required() {
        let result = Settings::resolve(&args(&[]), ConfigFile::default(), false);
        assert!(matches!(result, Err(AppError::Invalid(_))));

        let result = Settings::resolve(&args(&["-s", "two words"]), ConfigFile::default(), false);
        assert!(matches!(result, Err(AppError::Invalid(message)) if message.contains("whitespace")));
    }
}
