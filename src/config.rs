use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info};
use serde::Deserialize;

use crate::auto_scroll::AutoScrollMode;
use crate::progress_bar::{ProgressBarPosition, ReadingDirection};
use crate::tap_zone::{TapZoneInvertMode, TapZoneLayout};

// ---------------------------------------------------------------------------
// ConfigFile — deserialized from TOML (all fields optional)
// ---------------------------------------------------------------------------

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub reader: ReaderConfigFile,
    pub viewer: ViewerConfigFile,
}

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct ReaderConfigFile {
    pub tap_zone_layout: Option<TapZoneLayout>,
    pub tap_zone_invert: Option<TapZoneInvertMode>,
    pub static_nav: Option<bool>,
    pub reading_direction: Option<ReadingDirection>,
    pub progress_bar_position: Option<ProgressBarPosition>,
    pub overlay_idle_hide_ms: Option<u64>,
    pub hide_overlay_on_chapter_change: Option<bool>,
    pub auto_scroll: AutoScrollConfigFile,
}

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct AutoScrollConfigFile {
    pub interval_ms: Option<u64>,
    pub smooth: Option<bool>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct ViewerConfigFile {
    pub frame_budget_ms: Option<u64>,
    pub watch_interval_ms: Option<u64>,
    pub page_rows: Option<u16>,
    pub preload_rows: Option<u32>,
}

// ---------------------------------------------------------------------------
// Config — resolved (all fields concrete)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub reader: ReaderConfig,
    pub viewer: ViewerConfig,
}

/// Reader settings: read at session start, never written by the reader.
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderConfig {
    pub tap_zone_layout: TapZoneLayout,
    pub tap_zone_invert: TapZoneInvertMode,
    pub static_nav: bool,
    pub reading_direction: ReadingDirection,
    pub progress_bar_position: ProgressBarPosition,
    /// `None` disables idle auto-hide.
    pub overlay_idle_hide: Option<Duration>,
    pub hide_overlay_on_chapter_change: bool,
    pub auto_scroll_interval: Duration,
    pub auto_scroll_mode: AutoScrollMode,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ConfigFile::default().resolve().reader
    }
}

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub frame_budget: Duration,
    pub watch_interval: Duration,
    /// Terminal rows per manga page.
    pub page_rows: u16,
    /// Distance (rows) from a window edge at which the next chapter preloads.
    pub preload_rows: u32,
}

/// CLI values that take precedence over the config file.
///
/// Kept around so they can be re-applied when the file is reloaded.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub tap_zone_layout: Option<TapZoneLayout>,
    pub static_nav: bool,
}

impl ConfigFile {
    /// Merge CLI values (overwrites non-None fields).
    pub fn merge_cli(&mut self, overrides: &CliOverrides) {
        if let Some(v) = overrides.tap_zone_layout {
            debug!("config: CLI override tap_zone_layout={}", v.name());
            self.reader.tap_zone_layout = Some(v);
        }
        if overrides.static_nav {
            debug!("config: CLI override static_nav=true");
            self.reader.static_nav = Some(true);
        }
    }

    /// Resolve to a Config by applying defaults to missing fields.
    pub fn resolve(self) -> Config {
        let r = self.reader;
        let idle_ms = r.overlay_idle_hide_ms.unwrap_or(3000);
        let config = Config {
            reader: ReaderConfig {
                tap_zone_layout: r.tap_zone_layout.unwrap_or_default(),
                tap_zone_invert: r.tap_zone_invert.unwrap_or_default(),
                static_nav: r.static_nav.unwrap_or(false),
                reading_direction: r.reading_direction.unwrap_or_default(),
                progress_bar_position: r.progress_bar_position.unwrap_or_default(),
                overlay_idle_hide: (idle_ms > 0).then(|| Duration::from_millis(idle_ms)),
                hide_overlay_on_chapter_change: r.hide_overlay_on_chapter_change.unwrap_or(true),
                auto_scroll_interval: Duration::from_millis(
                    r.auto_scroll.interval_ms.unwrap_or(5000).max(100),
                ),
                auto_scroll_mode: if r.auto_scroll.smooth.unwrap_or(true) {
                    AutoScrollMode::Smooth
                } else {
                    AutoScrollMode::Paged
                },
            },
            viewer: ViewerConfig {
                frame_budget: Duration::from_millis(self.viewer.frame_budget_ms.unwrap_or(32)),
                watch_interval: Duration::from_millis(
                    self.viewer.watch_interval_ms.unwrap_or(200),
                ),
                page_rows: self.viewer.page_rows.unwrap_or(12).max(1),
                preload_rows: self.viewer.preload_rows.unwrap_or(24),
            },
        };
        info!(
            "config: resolved tap_zone_layout={}, invert=({}, {}), static_nav={}, \
             reading_direction={:?}, progress_bar={:?}, idle_hide={:?}, \
             auto_scroll={:?}/{}ms, page_rows={}, preload_rows={}",
            config.reader.tap_zone_layout.name(),
            config.reader.tap_zone_invert.horizontal,
            config.reader.tap_zone_invert.vertical,
            config.reader.static_nav,
            config.reader.reading_direction,
            config.reader.progress_bar_position,
            config.reader.overlay_idle_hide,
            config.reader.auto_scroll_mode,
            config.reader.auto_scroll_interval.as_millis(),
            config.viewer.page_rows,
            config.viewer.preload_rows,
        );
        config
    }
}

/// Resolve the XDG config path for mangaview.
pub fn default_config_path() -> Option<PathBuf> {
    let config_dir = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
    Some(config_dir.join("mangaview").join("config.toml"))
}

/// Load a config file. Returns `ConfigFile::default()` if no file exists.
/// Returns an error if the file exists but cannot be parsed.
pub fn load_config_from(path: &Path) -> anyhow::Result<ConfigFile> {
    debug!("config: looking for {}", path.display());
    match std::fs::read_to_string(path) {
        Ok(text) => {
            info!("config: loaded from {}", path.display());
            let cfg: ConfigFile = toml::from_str(&text)
                .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("config: {} not found, using defaults", path.display());
            Ok(ConfigFile::default())
        }
        Err(e) => Err(anyhow::anyhow!("failed to read {}: {e}", path.display())),
    }
}

/// Load the config at `path`, or at the XDG default location.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<ConfigFile> {
    match path {
        Some(p) => load_config_from(p),
        None => match default_config_path() {
            Some(p) => load_config_from(&p),
            None => {
                info!("config: no HOME or XDG_CONFIG_HOME set, using defaults");
                Ok(ConfigFile::default())
            }
        },
    }
}
