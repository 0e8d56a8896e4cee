//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[collector]
output_file = all_stocks.csv
delay_seconds = 2
limit = 50

[source]
listing_url = https://api.nasdaq.com/api/screener/stocks
user_agent = Mozilla/5.0
timeout_seconds = 15
"#;

    #[test]
    fn from_string_parses_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_string("collector", "output_file"),
            Some("all_stocks.csv".to_string())
        );
        assert_eq!(
            adapter.get_string("source", "user_agent"),
            Some("Mozilla/5.0".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("collector", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_value_or_default() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_int("collector", "limit", 0), 50);
        assert_eq!(adapter.get_int("collector", "missing", 42), 42);
    }

    #[test]
    fn get_int_returns_default_for_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[collector]\nlimit = many\n").unwrap();
        assert_eq!(adapter.get_int("collector", "limit", 42), 42);
    }

    #[test]
    fn get_double_returns_value_or_default() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_double("collector", "delay_seconds", 1.0), 2.0);
        assert_eq!(adapter.get_double("collector", "missing", 1.5), 1.5);
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("source", "listing_url"),
            Some("https://api.nasdaq.com/api/screener/stocks".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        assert!(FileConfigAdapter::from_file("/nonexistent/path/config.ini").is_err());
    }
}
