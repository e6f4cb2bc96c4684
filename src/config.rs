use crate::navigator::DEFAULT_EXTENSIONS;
use tracing::warn;

pub const ENV_EXTENSIONS: &str = "LABEL_SORTER_EXTENSIONS";
pub const ENV_WINDOW: &str = "LABEL_SORTER_WINDOW";
pub const ENV_TITLE: &str = "LABEL_SORTER_TITLE";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub extensions: Vec<String>,
    pub window_size: (f32, f32),
    pub title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            window_size: (530.0, 530.0),
            title: "Image Viewer".to_owned(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns. Bad values are logged and
    /// ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_EXTENSIONS) {
            let exts: Vec<String> = raw
                .split(',')
                .map(|e| e.trim().trim_start_matches('.').to_owned())
                .filter(|e| !e.is_empty())
                .collect();
            if exts.is_empty() {
                warn!("{} is empty, using default extensions", ENV_EXTENSIONS);
            } else {
                config.extensions = exts;
            }
        }

        if let Some(raw) = lookup(ENV_WINDOW) {
            match parse_window_size(&raw) {
                Some(size) => config.window_size = size,
                None => warn!("Invalid {} value {:?}, expected WIDTHxHEIGHT", ENV_WINDOW, raw),
            }
        }

        if let Some(title) = lookup(ENV_TITLE) {
            if !title.trim().is_empty() {
                config.title = title;
            }
        }

        config
    }
}

fn parse_window_size(raw: &str) -> Option<(f32, f32)> {
    let (w, h) = raw.trim().split_once(['x', 'X'])?;
    let w: f32 = w.trim().parse().ok()?;
    let h: f32 = h.trim().parse().ok()?;
    if w >= 1.0 && h >= 1.0 && w.is_finite() && h.is_finite() {
        Some((w, h))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_overrides() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
        assert_eq!(config.extensions, vec!["png", "jpg", "jpeg", "tiff", "bmp", "gif"]);
        assert_eq!(config.window_size, (530.0, 530.0));
    }

    #[test]
    fn extension_list_is_trimmed() {
        let config = Config::from_lookup(lookup_from(&[(ENV_EXTENSIONS, " png, .webp ,,tif")]));
        assert_eq!(config.extensions, vec!["png", "webp", "tif"]);
    }

    #[test]
    fn blank_extension_list_keeps_defaults() {
        let config = Config::from_lookup(lookup_from(&[(ENV_EXTENSIONS, " , ")]));
        assert_eq!(config.extensions, Config::default().extensions);
    }

    #[test]
    fn window_size_parsing() {
        let config = Config::from_lookup(lookup_from(&[(ENV_WINDOW, "800x600")]));
        assert_eq!(config.window_size, (800.0, 600.0));

        let config = Config::from_lookup(lookup_from(&[(ENV_WINDOW, "big")]));
        assert_eq!(config.window_size, (530.0, 530.0));

        let config = Config::from_lookup(lookup_from(&[(ENV_WINDOW, "0x600")]));
        assert_eq!(config.window_size, (530.0, 530.0));
    }

    #[test]
    fn title_override() {
        let config = Config::from_lookup(lookup_from(&[(ENV_TITLE, "Sorter")]));
        assert_eq!(config.title, "Sorter");
    }
}
