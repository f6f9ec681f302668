use crate::palette::ColorTable;
use std::env;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:4000/dev/";

#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub api_base_url: String,
    pub access_token: Option<String>,
    pub colors: ColorTable,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let api_base_url = lookup("EXPENSE_API_BASE_URL")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let access_token = lookup("EXPENSE_API_TOKEN").filter(|value| !value.is_empty());

        let colors = lookup("EXPENSE_CATEGORY_COLORS")
            .map(|spec| ColorTable::with_overrides(&spec))
            .unwrap_or_default();

        Self {
            port,
            api_base_url,
            access_token,
            colors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let settings = settings(&[]);
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(settings.access_token, None);
        assert_eq!(settings.colors, ColorTable::default());
    }

    #[test]
    fn environment_overrides_defaults() {
        let settings = settings(&[
            ("PORT", "9000"),
            ("EXPENSE_API_BASE_URL", "https://api.example.test/prod"),
            ("EXPENSE_API_TOKEN", "abc"),
            ("EXPENSE_CATEGORY_COLORS", "Rent=orange"),
        ]);
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.api_base_url, "https://api.example.test/prod");
        assert_eq!(settings.access_token.as_deref(), Some("abc"));
        assert_eq!(settings.colors.resolve("Rent"), "orange");
    }

    #[test]
    fn bad_port_falls_back() {
        assert_eq!(settings(&[("PORT", "http")]).port, DEFAULT_PORT);
    }
}
