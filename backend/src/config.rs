//! Runtime settings from environment variables.
//!
//! | Variable             | Default     | Meaning                              |
//! |----------------------|-------------|--------------------------------------|
//! | `EXPANDER_PORT`      | `3000`      | HTTP server port                     |
//! | `EXPANDER_MAX_ROWS`  | `1000000`   | Row limit per expansion, `0` = none  |
//! | `EXPANDER_DELIMITER` | `,`         | CSV output delimiter                 |
//!
//! A `.env` file in the working directory is loaded first, if present.

use std::env;

use crate::api::logs::log_warning;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_ROWS: usize = 1_000_000;
pub const DEFAULT_DELIMITER: char = ',';

/// Settings shared by the CLI and the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub port: u16,
    /// `None` disables the row limit.
    pub max_rows: Option<usize>,
    pub delimiter: char,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_rows: Some(DEFAULT_MAX_ROWS),
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl Settings {
    /// Load `.env` and read settings from the environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`; invalid values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(raw) = lookup("EXPANDER_PORT") {
            match raw.trim().parse::<u16>() {
                Ok(port) => settings.port = port,
                Err(_) => log_warning(format!("Ignoring invalid EXPANDER_PORT '{}'", raw)),
            }
        }

        if let Some(raw) = lookup("EXPANDER_MAX_ROWS") {
            match raw.trim().parse::<usize>() {
                Ok(0) => settings.max_rows = None,
                Ok(n) => settings.max_rows = Some(n),
                Err(_) => log_warning(format!("Ignoring invalid EXPANDER_MAX_ROWS '{}'", raw)),
            }
        }

        if let Some(raw) = lookup("EXPANDER_DELIMITER") {
            match parse_delimiter(&raw) {
                Some(d) => settings.delimiter = d,
                None => log_warning(format!("Ignoring invalid EXPANDER_DELIMITER '{}'", raw)),
            }
        }

        settings
    }
}

/// A single ASCII delimiter; `\t` and `tab` mean tab.
pub fn parse_delimiter(raw: &str) -> Option<char> {
    match raw {
        "\\t" | "tab" | "TAB" | "\t" => Some('\t'),
        _ => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() && c != '"' && c != '\n' => Some(c),
                _ => None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&[]));
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.max_rows, Some(DEFAULT_MAX_ROWS));
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("EXPANDER_PORT", "8080"),
            ("EXPANDER_MAX_ROWS", "500"),
            ("EXPANDER_DELIMITER", ";"),
        ]));
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.max_rows, Some(500));
        assert_eq!(settings.delimiter, ';');
    }

    #[test]
    fn test_zero_disables_limit() {
        let settings = Settings::from_lookup(lookup(&[("EXPANDER_MAX_ROWS", "0")]));
        assert_eq!(settings.max_rows, None);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let settings = Settings::from_lookup(lookup(&[
            ("EXPANDER_PORT", "not-a-port"),
            ("EXPANDER_DELIMITER", ";;"),
        ]));
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.delimiter, DEFAULT_DELIMITER);
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter("\\t"), Some('\t'));
        assert_eq!(parse_delimiter("|"), Some('|'));
        assert_eq!(parse_delimiter(""), None);
        assert_eq!(parse_delimiter("é"), None);
    }
}
