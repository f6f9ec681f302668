use std::collections::HashMap;
use tracing::warn;

const DEFAULT_COLOR: &str = "gray";

#[derive(Debug, Clone, PartialEq)]
pub struct ColorTable {
    colors: HashMap<String, String>,
    fallback: String,
}

impl Default for ColorTable {
    fn default() -> Self {
        let colors = [
            ("Food", "red"),
            ("Travel", "blue"),
            ("Utilities", "green"),
            ("Shopping", "purple"),
        ]
        .into_iter()
        .map(|(category, color)| (category.to_string(), color.to_string()))
        .collect();

        Self {
            colors,
            fallback: DEFAULT_COLOR.to_string(),
        }
    }
}

impl ColorTable {
    pub fn with_overrides(spec: &str) -> Self {
        let mut table = Self::default();
        for pair in spec.split(',').map(str::trim).filter(|pair| !pair.is_empty()) {
            match pair.split_once('=') {
                Some((category, color)) if !category.trim().is_empty() && !color.trim().is_empty() => {
                    table
                        .colors
                        .insert(category.trim().to_string(), color.trim().to_string());
                }
                _ => warn!("ignoring malformed category color entry: {pair}"),
            }
        }
        table
    }

    pub fn resolve(&self, category: &str) -> &str {
        self.colors
            .get(category)
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }
}
