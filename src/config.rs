//! Application-level configuration loading: the envelope palette and the prize catalogue.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use rand::{Rng, seq::IndexedRandom};
use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "LUCKY_ENVELOPES_CONFIG_PATH";
/// Colour used when the configured palette is empty.
const FALLBACK_COLOR: &str = "coral";

const DEFAULT_PALETTE: [&str; 6] = ["coral", "mint", "sky", "sage", "warm-yellow", "blush"];

const DEFAULT_PRIZES: [&str; 28] = [
    "Golden Gate Bridge bike ride to Sausalito with ferry return",
    "Sunrise hot air balloon ride over Napa Valley",
    "Sunset kayaking tour under the Golden Gate Bridge",
    "Point Bonita Lighthouse sunset hike with suspension bridge",
    "Whale watching cruise around San Francisco Bay",
    "Private airplane sunset tour over the bay",
    "Foreign Cinema: dinner while watching movies under the stars",
    "Couples pottery class with 'Ghost' movie vibes",
    "Private dance lesson: salsa, swing, or ballroom",
    "California Academy of Sciences NightLife with planetarium",
    "Candlelight classical concert at St. Ignatius Church",
    "Private chef five-star dinner experience at home",
    "Church of 8 Wheels: adults-only roller disco in converted church",
    "Mission Bowling Club: upscale bowling with craft dining",
    "Berber: Moroccan supper club with live cirque performances",
    "Alcatraz night tour: explore the infamous prison after dark",
    "Waterbar dinner with Bay Bridge views (popular proposal spot)",
    "Atelier Crenn: Michelin-starred 'poetic culinaria' tasting menu",
    "Quince: opulent Michelin-starred Italian with plush interiors",
    "Boulevard: classic American cuisine near Bay Bridge",
    "Verjus: French bistro with glossy maroon ceiling & candlelight",
    "L'Ardoise: Parisian-style bistro with dark leather booths",
    "Japanese Tea Garden: tranquil paths, koi ponds, traditional architecture",
    "San Francisco Botanical Garden: 55 acres in Golden Gate Park",
    "Crissy Field picnic with Golden Gate Bridge views",
    "Lands End Trail: coastal hike with ocean views & Sutro Baths ruins",
    "Alamo Square: Painted Ladies views for romantic picnics",
    "Battery Park: former masonry fort with Golden Gate & downtown views",
];

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    palette: Vec<String>,
    prizes: Vec<String>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the baked-in palette and
    /// prize catalogue.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        palette = app_config.palette.len(),
                        prizes = app_config.prizes.len(),
                        "loaded palette and prize catalogue from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Palette entry for a zero-based index, wrapping around the palette.
    pub fn color_for_index(&self, index: usize) -> &str {
        if self.palette.is_empty() {
            return FALLBACK_COLOR;
        }
        &self.palette[index % self.palette.len()]
    }

    /// Draw up to `count` distinct prize ideas, each paired with the palette colour of its index.
    pub fn prize_suggestions<R>(&self, count: usize, rng: &mut R) -> Vec<(String, String)>
    where
        R: Rng + ?Sized,
    {
        self.prizes
            .choose_multiple(rng, count)
            .enumerate()
            .map(|(index, prize)| (prize.clone(), self.color_for_index(index).to_owned()))
            .collect()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            prizes: DEFAULT_PRIZES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
/// Omitted sections keep their built-in values.
struct RawConfig {
    #[serde(default)]
    palette: Option<Vec<String>>,
    #[serde(default)]
    prizes: Option<Vec<String>>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        let keep_non_blank = |entries: Vec<String>| {
            entries
                .into_iter()
                .map(|entry| entry.trim().to_owned())
                .filter(|entry| !entry.is_empty())
                .collect::<Vec<_>>()
        };

        let palette = value
            .palette
            .map(keep_non_blank)
            .filter(|palette| !palette.is_empty())
            .unwrap_or(defaults.palette);
        let prizes = value
            .prizes
            .map(keep_non_blank)
            .filter(|prizes| !prizes.is_empty())
            .unwrap_or(defaults.prizes);

        Self { palette, prizes }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn colors_wrap_around_the_palette() {
        let config = AppConfig::default();
        assert_eq!(config.color_for_index(0), "coral");
        assert_eq!(config.color_for_index(5), "blush");
        assert_eq!(config.color_for_index(6), "coral");
        assert_eq!(config.color_for_index(8), "sky");
    }

    #[test]
    fn suggestions_are_distinct_and_coloured_by_index() {
        let config = AppConfig::default();
        let mut rng = StdRng::seed_from_u64(42);

        let suggestions = config.prize_suggestions(8, &mut rng);
        assert_eq!(suggestions.len(), 8);

        let distinct: HashSet<_> = suggestions.iter().map(|(prize, _)| prize).collect();
        assert_eq!(distinct.len(), 8);
        assert!(suggestions.iter().all(|(prize, _)| config.prizes.contains(prize)));
        assert_eq!(suggestions[6].1, "coral");
        assert_eq!(suggestions[7].1, "mint");
    }

    #[test]
    fn suggestions_are_capped_by_the_catalogue() {
        let config = AppConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(config.prize_suggestions(32, &mut rng).len(), DEFAULT_PRIZES.len());
    }

    #[test]
    fn raw_config_keeps_defaults_for_missing_or_blank_sections() {
        let raw: RawConfig =
            serde_json::from_str(r#"{"palette": ["  ", "teal"], "prizes": []}"#).unwrap();
        let config: AppConfig = raw.into();

        assert_eq!(config.palette, ["teal".to_string()]);
        assert_eq!(config.prizes.len(), DEFAULT_PRIZES.len());

        let raw: RawConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(AppConfig::from(raw), AppConfig::default());
    }
}
