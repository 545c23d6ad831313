use derive_more::{Deref, From, Into};
use directories::ProjectDirs;
use palette::{Srgb, Srgba};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, DurationSecondsWithFrac, SerializeDisplay, serde_as};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const ENV_PREFIX: &str = "SECTOR_MENU";

pub const DEFAULT_INNER_RADIUS: f64 = 50.0;
pub const DEFAULT_CENTER_BUTTON_SIZE: f64 = 50.0;
pub const DEFAULT_CENTER_BUTTON_ICON: &str = "xmark";
pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(300);
pub const DEFAULT_SHADOW_RADIUS: f64 = 4.0;
pub const DEFAULT_SHADOW_OPACITY: f64 = 0.2;
pub const DEFAULT_SECTOR_SPACING: f64 = 4.0;
pub const MENU_SHADOW_OFFSET: [f64; 2] = [0.0, 2.0];
pub const GRADIENT_END_ALPHA: f64 = 0.9;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("Invalid hex color '#{0}', expected #rgb, #rrggbb or #rrggbbaa")]
    InvalidHex(String),
    #[error("Unknown color name '{0}'")]
    UnknownName(String),
}

/// An sRGB color with alpha. Parsed from `#rgb`, `#rrggbb`, `#rrggbbaa`, `clear` or a CSS
/// color name; printed as hex.
#[derive(Debug, Clone, Copy, PartialEq, Deref, From, Into, SerializeDisplay, DeserializeFromStr)]
pub struct Color(Srgba<f64>);

impl Color {
    pub fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self(Srgba::new(red, green, blue, alpha))
    }

    pub fn white() -> Self {
        Self::rgba(1.0, 1.0, 1.0, 1.0)
    }

    pub fn black() -> Self {
        Self::rgba(0.0, 0.0, 0.0, 1.0)
    }

    pub fn clear() -> Self {
        Self::rgba(0.0, 0.0, 0.0, 0.0)
    }

    pub fn system_blue() -> Self {
        Self::from_rgb8(0, 122, 255, 255)
    }

    pub fn components(&self) -> (f64, f64, f64, f64) {
        self.0.into_components()
    }

    pub fn with_alpha_scaled(&self, factor: f64) -> Self {
        let (r, g, b, a) = self.components();
        Self::rgba(r, g, b, a * factor)
    }

    fn from_rgb8(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        let rgb: Srgb<f64> = Srgb::new(red, green, blue).into_format();
        Self::rgba(rgb.red, rgb.green, rgb.blue, f64::from(alpha) / 255.0)
    }

    fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let invalid = || ColorParseError::InvalidHex(hex.to_string());
        if !hex.is_ascii() {
            return Err(invalid());
        }
        let byte = |i: usize, width: usize| {
            u8::from_str_radix(&hex[i..i + width], 16)
                .map(|v| if width == 1 { v * 17 } else { v })
                .map_err(|_| invalid())
        };

        match hex.len() {
            3 => Ok(Self::from_rgb8(byte(0, 1)?, byte(1, 1)?, byte(2, 1)?, 255)),
            6 => Ok(Self::from_rgb8(byte(0, 2)?, byte(2, 2)?, byte(4, 2)?, 255)),
            8 => Ok(Self::from_rgb8(
                byte(0, 2)?,
                byte(2, 2)?,
                byte(4, 2)?,
                byte(6, 2)?,
            )),
            _ => Err(invalid()),
        }
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return Self::from_hex(hex);
        }

        let name = s.to_ascii_lowercase();
        if name == "clear" {
            return Ok(Self::clear());
        }
        palette::named::from_str(&name)
            .map(|rgb| Self::from_rgb8(rgb.red, rgb.green, rgb.blue, 255))
            .ok_or_else(|| ColorParseError::UnknownName(s.to_string()))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b, a) = self.components();
        let to_u8 = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        write!(f, "#{:02x}{:02x}{:02x}", to_u8(r), to_u8(g), to_u8(b))?;
        if to_u8(a) != u8::MAX {
            write!(f, "{:02x}", to_u8(a))?;
        }
        Ok(())
    }
}

string_newtype!(IconRef);

string_newtype!(Label);

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ShadowSpec {
    pub color: Color,
    pub offset: [f64; 2],
    pub radius: f64,
    pub opacity: f64,
}

impl Default for ShadowSpec {
    fn default() -> Self {
        Self {
            color: Color::clear(),
            offset: [0.0, 0.0],
            radius: 0.0,
            opacity: 0.0,
        }
    }
}

impl ShadowSpec {
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0 && self.color.components().3 > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SectorConfig {
    pub icon: Option<IconRef>,
    pub label: Option<Label>,
    pub color: Color,
    pub spacing: f64,
    pub shadow: ShadowSpec,
}

impl Default for SectorConfig {
    fn default() -> Self {
        Self {
            icon: None,
            label: None,
            color: Color::system_blue(),
            spacing: DEFAULT_SECTOR_SPACING,
            shadow: ShadowSpec::default(),
        }
    }
}

impl SectorConfig {
    pub fn new(icon: Option<IconRef>, label: Option<Label>, color: Color) -> Self {
        Self {
            icon,
            label,
            color,
            ..Self::default()
        }
    }

    pub fn gradient_stops(&self) -> [Color; 2] {
        [self.color, self.color.with_alpha_scaled(GRADIENT_END_ALPHA)]
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MenuConfig {
    pub inner_radius: f64,
    pub center_button_size: f64,
    pub center_button_icon: Option<IconRef>,
    pub center_button_color: Color,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub animation_duration: Duration,
    pub shadow_radius: f64,
    pub shadow_opacity: f64,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            inner_radius: DEFAULT_INNER_RADIUS,
            center_button_size: DEFAULT_CENTER_BUTTON_SIZE,
            center_button_icon: Some(IconRef::new(DEFAULT_CENTER_BUTTON_ICON)),
            center_button_color: Color::white(),
            animation_duration: DEFAULT_ANIMATION_DURATION,
            shadow_radius: DEFAULT_SHADOW_RADIUS,
            shadow_opacity: DEFAULT_SHADOW_OPACITY,
        }
    }
}

impl MenuConfig {
    pub fn center_button_radius(&self) -> f64 {
        self.center_button_size / 2.0
    }

    pub fn shadow(&self) -> ShadowSpec {
        ShadowSpec {
            color: Color::black(),
            offset: MENU_SHADOW_OFFSET,
            radius: self.shadow_radius,
            opacity: self.shadow_opacity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    pub menu: MenuConfig,
    pub sectors: Vec<SectorConfig>,
}

impl Config {
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let s = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        Ok(s.try_deserialize()?)
    }

    pub fn builtin() -> Self {
        Self::from_toml(DEFAULT_CONFIG).unwrap_or_else(|e| {
            log::error!("Bundled configuration is invalid: {}", e);
            Self::default()
        })
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs = ProjectDirs::from("org", "sectormenu", "sector-menu")
        .ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&get_config_path()?)
}

/// Reads `path` (optional) layered under `SECTOR_MENU_*` environment variables, e.g.
/// `SECTOR_MENU_MENU__INNER_RADIUS=60`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(s.try_deserialize()?)
}

/// Like [`load_config_from`], except that a missing file yields the bundled menu.
pub fn load_config_or_builtin(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        log::info!("No config at {}, using the bundled menu", path.display());
        return Ok(Config::builtin());
    }
    load_config_from(path)
}

pub fn load_or_default() -> Config {
    match get_config_path().and_then(|path| load_config_or_builtin(&path)) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Failed to load config, using the bundled menu: {}", e);
            Config::builtin()
        }
    }
}

pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

pub const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn assert_color(color: Color, expected: (f64, f64, f64, f64)) {
        let (r, g, b, a) = color.components();
        for (got, want) in [(r, expected.0), (g, expected.1), (b, expected.2), (a, expected.3)] {
            assert!((got - want).abs() < 1e-9, "{color} vs {expected:?}");
        }
    }

    #[test]
    fn test_color_deserialization() {
        let cases = vec![
            ("\"#ff0000\"", (1.0, 0.0, 0.0, 1.0)),
            ("\"#FFF\"", (1.0, 1.0, 1.0, 1.0)),
            ("\"#00000080\"", (0.0, 0.0, 0.0, 128.0 / 255.0)),
            ("\"white\"", (1.0, 1.0, 1.0, 1.0)),
            ("\"Black\"", (0.0, 0.0, 0.0, 1.0)),
            ("\"clear\"", (0.0, 0.0, 0.0, 0.0)),
        ];

        for (json, expected) in cases {
            let deserialized: Color = serde_json::from_str(json).unwrap();
            assert_color(deserialized, expected);
        }
    }

    #[test]
    fn test_color_rejects_garbage() {
        assert!(matches!(
            "#12345".parse::<Color>(),
            Err(ColorParseError::InvalidHex(_))
        ));
        assert!(matches!(
            "#gg0000".parse::<Color>(),
            Err(ColorParseError::InvalidHex(_))
        ));
        assert!(matches!(
            "#ééé".parse::<Color>(),
            Err(ColorParseError::InvalidHex(_))
        ));
        assert!(matches!(
            "not-a-color".parse::<Color>(),
            Err(ColorParseError::UnknownName(_))
        ));
    }

    #[test]
    fn test_color_display_round_trips_through_serde() {
        let color = Color::system_blue();
        assert_eq!(color.to_string(), "#007aff");
        assert_eq!(serde_json::to_string(&color).unwrap(), "\"#007aff\"");
        assert_eq!(Color::clear().to_string(), "#00000000");
    }

    #[test]
    fn test_gradient_stops() {
        let sector = SectorConfig::new(None, None, Color::rgba(0.2, 0.4, 0.6, 1.0));
        let [start, end] = sector.gradient_stops();
        assert_eq!(start, sector.color);
        assert_color(end, (0.2, 0.4, 0.6, 0.9));
    }

    #[test]
    fn test_menu_config_defaults() {
        let config = MenuConfig::default();
        assert_eq!(config.inner_radius, 50.0);
        assert_eq!(config.center_button_size, 50.0);
        assert_eq!(config.center_button_radius(), 25.0);
        assert_eq!(config.animation_duration, Duration::from_millis(300));
        assert_eq!(config.shadow_radius, 4.0);
        assert_eq!(config.shadow_opacity, 0.2);
        assert_eq!(config.center_button_icon.as_deref().map(String::as_str), Some("xmark"));

        let shadow = config.shadow();
        assert_eq!(shadow.offset, [0.0, 2.0]);
        assert!(shadow.is_visible());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = Config::from_toml(
            r##"
            [menu]
            inner_radius = 60
            animation_duration = 0.5

            [[sectors]]
            label = "Add"

            [[sectors]]
            icon = "edit-delete"
            color = "#ff3b30"
            [sectors.shadow]
            color = "black"
            offset = [0, 2]
            radius = 3
            opacity = 0.3
            "##,
        )
        .unwrap();

        assert_eq!(config.menu.inner_radius, 60.0);
        assert_eq!(config.menu.center_button_size, 50.0);
        assert_eq!(config.menu.animation_duration, Duration::from_millis(500));
        assert_eq!(config.sectors.len(), 2);

        let first = &config.sectors[0];
        assert_eq!(first.label, Some(Label::new("Add")));
        assert_eq!(first.icon, None);
        assert_eq!(first.color, Color::system_blue());
        assert_eq!(first.spacing, 4.0);
        assert!(!first.shadow.is_visible());

        let second = &config.sectors[1];
        assert_eq!(second.icon, Some(IconRef::new("edit-delete")));
        assert_eq!(second.shadow.offset, [0.0, 2.0]);
        assert!(second.shadow.is_visible());
    }

    #[test]
    fn test_invalid_color_is_a_config_error() {
        let result = Config::from_toml(
            r#"
            [[sectors]]
            color = "chartreuse-ish"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Config(_))));
    }

    #[test]
    fn test_builtin_config_parses() {
        let config = Config::from_toml(DEFAULT_CONFIG).unwrap();
        let defaults = MenuConfig::default();
        assert_eq!(config.menu.inner_radius, defaults.inner_radius);
        assert_eq!(config.menu.center_button_size, defaults.center_button_size);
        assert_eq!(config.menu.center_button_icon, defaults.center_button_icon);
        assert_eq!(config.menu.center_button_color, defaults.center_button_color);
        let drift = config
            .menu
            .animation_duration
            .abs_diff(defaults.animation_duration);
        assert!(drift < Duration::from_micros(1));
        assert_eq!(config.sectors.len(), 5);
        assert!(config.sectors.iter().all(|s| s.label.is_some()));
    }

    // Tests that read SECTOR_MENU_* variables must not overlap with one that sets them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_load_config_from_file() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = std::env::temp_dir().join(format!("sector-menu-test-{}", std::process::id()));
        fs_err::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs_err::write(&path, "[menu]\ncenter_button_size = 64\n").unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.menu.center_button_size, 64.0);
        assert!(config.sectors.is_empty());

        let missing = load_config_from(&dir.join("missing.toml")).unwrap();
        assert_eq!(missing.menu, MenuConfig::default());

        fs_err::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_env_overrides_file() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = std::env::temp_dir().join(format!("sector-menu-env-{}", std::process::id()));
        fs_err::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs_err::write(&path, "[menu]\ninner_radius = 40\ncenter_button_size = 64\n").unwrap();

        // SAFETY: ENV_LOCK serializes every test that touches these variables.
        unsafe { std::env::set_var("SECTOR_MENU_MENU__INNER_RADIUS", "61") };
        let layered = load_config_from(&path);
        let missing = load_config_from(&dir.join("missing.toml"));
        unsafe { std::env::remove_var("SECTOR_MENU_MENU__INNER_RADIUS") };

        let layered = layered.unwrap();
        assert_eq!(layered.menu.inner_radius, 61.0);
        assert_eq!(layered.menu.center_button_size, 64.0);
        assert_eq!(missing.unwrap().menu.inner_radius, 61.0);

        fs_err::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_falls_back_to_builtin() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = std::env::temp_dir().join(format!("sector-menu-fallback-{}", std::process::id()));
        fs_err::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        let builtin = load_config_or_builtin(&path).unwrap();
        assert_eq!(builtin.sectors.len(), 5);

        fs_err::write(&path, "[menu]\ninner_radius = 40\n").unwrap();
        let from_file = load_config_or_builtin(&path).unwrap();
        assert_eq!(from_file.menu.inner_radius, 40.0);
        assert!(from_file.sectors.is_empty());

        fs_err::write(&path, "[menu]\ncenter_button_color = \"nope\"\n").unwrap();
        assert!(load_config_or_builtin(&path).is_err());

        fs_err::remove_dir_all(&dir).unwrap();
    }
}
