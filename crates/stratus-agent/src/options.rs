//! Command line and environment options for the agent binary.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};

/// Environment variable naming the settings file.
pub const CONFIG_ENV: &str = "STRATUS_CONFIG";

/// Environment variable overriding the poll interval, in seconds.
pub const POLL_INTERVAL_ENV: &str = "STRATUS_POLL_INTERVAL_SECS";

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Options that aren't part of the ingestion settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentOptions {
    /// Settings file, if any. Environment variables still apply without one.
    pub config_path: Option<PathBuf>,
    /// How often every provider is listed.
    pub poll_interval: Duration,
}

impl AgentOptions {
    /// Reads options from the process arguments and environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::parse(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// Reads options from explicit arguments and a variable lookup.
    ///
    /// The first argument, when present, is the settings file and wins over
    /// `STRATUS_CONFIG`.
    pub fn parse<I, F>(args: I, var: F) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut args = args.into_iter();
        let config_path = args
            .next()
            .or_else(|| var(CONFIG_ENV))
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        if let Some(extra) = args.next() {
            bail!("unexpected argument '{}', usage: stratus-agent [SETTINGS_FILE]", extra);
        }

        let poll_interval = match var(POLL_INTERVAL_ENV) {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("{} must be a number of seconds, got '{}'", POLL_INTERVAL_ENV, raw))?;
                if secs == 0 {
                    bail!("{} must be greater than zero", POLL_INTERVAL_ENV);
                }
                Duration::from_secs(secs)
            },
            None => DEFAULT_POLL_INTERVAL,
        };

        Ok(Self {
            config_path,
            poll_interval,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(args: &[&str], vars: &[(&str, &str)]) -> anyhow::Result<AgentOptions> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AgentOptions::parse(args.iter().map(|a| a.to_string()), |key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let options = parse(&[], &[]).unwrap();
        assert_eq!(options.config_path, None);
        assert_eq!(options.poll_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_argument_wins_over_environment() {
        let options = parse(&["/etc/stratus/agent.yml"], &[(CONFIG_ENV, "/tmp/other.yml")]).unwrap();
        assert_eq!(options.config_path, Some(PathBuf::from("/etc/stratus/agent.yml")));

        let options = parse(&[], &[(CONFIG_ENV, "/tmp/other.yml")]).unwrap();
        assert_eq!(options.config_path, Some(PathBuf::from("/tmp/other.yml")));
    }

    #[test]
    fn test_poll_interval() {
        let options = parse(&[], &[(POLL_INTERVAL_ENV, "5")]).unwrap();
        assert_eq!(options.poll_interval, Duration::from_secs(5));

        assert!(parse(&[], &[(POLL_INTERVAL_ENV, "0")]).is_err());
        assert!(parse(&[], &[(POLL_INTERVAL_ENV, "soon")]).is_err());
    }

    #[test]
    fn test_extra_argument_is_rejected() {
        assert!(parse(&["a.yml", "b.yml"], &[]).is_err());
    }
}
