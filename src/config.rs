//! Configuration for httui
//!
//! Settings live in a small INI file (default `~/.httui/config`):
//!
//! ```ini
//! [theme]
//! color_mode = 8bit
//! title = 178
//! active_border = 178
//!
//! [http]
//! scheme = https
//! timeout_secs = 30
//!
//! [log]
//! level = debug
//! ```
//!
//! A missing file yields the defaults; a malformed value is an error.

use anyhow::{anyhow, bail, Context, Result};
use ini::{Ini, Properties};
use std::path::Path;
use std::time::Duration;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "~/.httui/config";

/// Environment variable name for overriding the configuration path
pub const CONFIG_PATH_ENV_VAR: &str = "HTTUI_CONFIG_PATH";

/// Default log file path
pub const DEFAULT_LOG_PATH: &str = "~/.httui/httui.log";

/// Environment variable holding an `EnvFilter` directive for logging
pub const LOG_ENV_VAR: &str = "HTTUI_LOG";

const SECTION_THEME: &str = "theme";
const SECTION_HTTP: &str = "http";
const SECTION_LOG: &str = "log";

const KEY_COLOR_MODE: &str = "color_mode";
const KEY_TITLE: &str = "title";
const KEY_BORDER: &str = "border";
const KEY_ACTIVE_BORDER: &str = "active_border";
const KEY_SELECTED: &str = "selected";
const KEY_ERROR: &str = "error";
const KEY_STATUS: &str = "status";
const KEY_SCHEME: &str = "scheme";
const KEY_TIMEOUT_SECS: &str = "timeout_secs";
const KEY_INSECURE: &str = "insecure";
const KEY_LEVEL: &str = "level";
const KEY_FILE: &str = "file";

/// Get the config file path, checking environment variable first, then falling back to default
pub fn get_config_path() -> String {
    std::env::var_os(CONFIG_PATH_ENV_VAR)
        .and_then(|val| val.into_string().ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

/// Colour depth the terminal is driven with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    FourBit,
    #[default]
    EightBit,
    TrueColor,
}

impl ColorMode {
    pub fn parse(text: &str) -> Result<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "4bit" | "4" | "16" => Ok(ColorMode::FourBit),
            "8bit" | "8" | "256" => Ok(ColorMode::EightBit),
            "24bit" | "24" | "truecolor" => Ok(ColorMode::TrueColor),
            other => bail!("unknown color_mode '{other}', expected 4bit, 8bit or 24bit"),
        }
    }
}

/// A validated colour, handed to the render backend as-is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpec {
    /// 4-bit palette index, 0..=15
    Indexed16(u8),
    /// 8-bit palette index, 0..=255
    Indexed256(u8),
    /// 24-bit colour
    Rgb(u8, u8, u8),
}

impl ColorSpec {
    /// Parse a colour spec for `mode`.
    ///
    /// 4-bit and 8-bit modes take a palette index; 24-bit mode takes
    /// `r,g,b` or `#rrggbb`.
    pub fn parse(mode: ColorMode, text: &str) -> Result<Self> {
        let text = text.trim();
        match mode {
            ColorMode::FourBit => {
                let index: u8 = text
                    .parse()
                    .with_context(|| format!("'{text}' is not a 4-bit colour index"))?;
                if index > 15 {
                    bail!("4-bit colour index {index} is out of range 0..=15");
                }
                Ok(ColorSpec::Indexed16(index))
            }
            ColorMode::EightBit => text
                .parse()
                .map(ColorSpec::Indexed256)
                .with_context(|| format!("'{text}' is not an 8-bit colour index")),
            ColorMode::TrueColor => parse_rgb(text).map(|(r, g, b)| ColorSpec::Rgb(r, g, b)),
        }
    }
}

fn parse_rgb(text: &str) -> Result<(u8, u8, u8)> {
    if let Some(hex) = text.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            bail!("'{text}' is not a #rrggbb colour");
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .with_context(|| format!("'{text}' is not a #rrggbb colour"))
        };
        return Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?));
    }

    let channels = text
        .split(',')
        .map(|part| part.trim().parse::<u8>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("'{text}' is not an r,g,b colour"))?;

    match channels.as_slice() {
        [r, g, b] => Ok((*r, *g, *b)),
        _ => Err(anyhow!("'{text}' is not an r,g,b colour")),
    }
}

/// Colours used by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub mode: ColorMode,
    pub title: ColorSpec,
    pub border: ColorSpec,
    pub active_border: ColorSpec,
    pub selected: ColorSpec,
    pub error: ColorSpec,
    pub status: ColorSpec,
}

impl Theme {
    pub fn defaults_for(mode: ColorMode) -> Self {
        match mode {
            ColorMode::FourBit => Self {
                mode,
                title: ColorSpec::Indexed16(11),
                border: ColorSpec::Indexed16(8),
                active_border: ColorSpec::Indexed16(11),
                selected: ColorSpec::Indexed16(11),
                error: ColorSpec::Indexed16(9),
                status: ColorSpec::Indexed16(7),
            },
            ColorMode::EightBit => Self {
                mode,
                title: ColorSpec::Indexed256(178),
                border: ColorSpec::Indexed256(244),
                active_border: ColorSpec::Indexed256(178),
                selected: ColorSpec::Indexed256(178),
                error: ColorSpec::Indexed256(160),
                status: ColorSpec::Indexed256(250),
            },
            ColorMode::TrueColor => Self {
                mode,
                title: ColorSpec::Rgb(215, 175, 0),
                border: ColorSpec::Rgb(128, 128, 128),
                active_border: ColorSpec::Rgb(215, 175, 0),
                selected: ColorSpec::Rgb(215, 175, 0),
                error: ColorSpec::Rgb(215, 0, 0),
                status: ColorSpec::Rgb(188, 188, 188),
            },
        }
    }

    fn from_section(section: Option<&Properties>) -> Result<Self> {
        let Some(section) = section else {
            return Ok(Self::default());
        };

        let mode = match section.get(KEY_COLOR_MODE) {
            Some(value) => ColorMode::parse(value)?,
            None => ColorMode::default(),
        };

        let mut theme = Self::defaults_for(mode);
        let slots: [(&str, &mut ColorSpec); 6] = [
            (KEY_TITLE, &mut theme.title),
            (KEY_BORDER, &mut theme.border),
            (KEY_ACTIVE_BORDER, &mut theme.active_border),
            (KEY_SELECTED, &mut theme.selected),
            (KEY_ERROR, &mut theme.error),
            (KEY_STATUS, &mut theme.status),
        ];
        for (key, slot) in slots {
            if let Some(value) = section.get(key) {
                *slot = ColorSpec::parse(mode, value)
                    .with_context(|| format!("invalid [{SECTION_THEME}] {key}"))?;
            }
        }

        Ok(theme)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::defaults_for(ColorMode::default())
    }
}

/// Settings for the request executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Scheme used when a request target is a path and a Host is given
    pub scheme: String,
    pub timeout: Option<Duration>,
    pub insecure: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            timeout: None,
            insecure: false,
        }
    }
}

impl HttpConfig {
    fn from_section(section: Option<&Properties>) -> Result<Self> {
        let mut config = Self::default();
        let Some(section) = section else {
            return Ok(config);
        };

        if let Some(scheme) = section.get(KEY_SCHEME) {
            let scheme = scheme.trim().to_ascii_lowercase();
            if scheme != "http" && scheme != "https" {
                bail!("invalid [{SECTION_HTTP}] {KEY_SCHEME} '{scheme}', expected http or https");
            }
            config.scheme = scheme;
        }

        if let Some(secs) = section.get(KEY_TIMEOUT_SECS) {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("invalid [{SECTION_HTTP}] {KEY_TIMEOUT_SECS}"))?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        if let Some(insecure) = section.get(KEY_INSECURE) {
            config.insecure = parse_bool(insecure)
                .with_context(|| format!("invalid [{SECTION_HTTP}] {KEY_INSECURE}"))?;
        }

        Ok(config)
    }
}

fn parse_bool(text: &str) -> Result<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => bail!("'{other}' is not a boolean"),
    }
}

/// Logging destination and default level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: Option<String>,
    pub file: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: None,
            file: DEFAULT_LOG_PATH.to_string(),
        }
    }
}

impl LogConfig {
    fn from_section(section: Option<&Properties>) -> Self {
        let mut config = Self::default();
        if let Some(section) = section {
            config.level = section.get(KEY_LEVEL).map(|s| s.trim().to_string());
            if let Some(file) = section.get(KEY_FILE) {
                config.file = file.trim().to_string();
            }
        }
        config
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub theme: Theme,
    pub http: HttpConfig,
    pub log: LogConfig,
}

impl Config {
    /// Load the config file at `file_path` (`~` is expanded)
    pub fn load(file_path: &str) -> Result<Self> {
        let expanded_path = shellexpand::tilde(file_path).to_string();
        if !Path::new(&expanded_path).exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(&expanded_path)
            .with_context(|| format!("failed to read config file {expanded_path}"))?;
        Self::from_ini(&ini).with_context(|| format!("invalid config file {expanded_path}"))
    }

    pub fn from_ini(ini: &Ini) -> Result<Self> {
        Ok(Self {
            theme: Theme::from_section(ini.section(Some(SECTION_THEME)))?,
            http: HttpConfig::from_section(ini.section(Some(SECTION_HTTP)))?,
            log: LogConfig::from_section(ini.section(Some(SECTION_LOG))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(text: &str) -> Result<Config> {
        Config::from_ini(&Ini::load_from_str(text)?)
    }

    #[test]
    fn test_default_config_path() {
        assert_eq!(DEFAULT_CONFIG_PATH, "~/.httui/config");
        assert_eq!(CONFIG_PATH_ENV_VAR, "HTTUI_CONFIG_PATH");
    }

    #[test]
    fn test_get_config_path_env_override() {
        // Save current env var state
        let original = std::env::var_os(CONFIG_PATH_ENV_VAR);

        let test_path = "/custom/config/path";
        std::env::set_var(CONFIG_PATH_ENV_VAR, test_path);
        assert_eq!(get_config_path(), test_path);

        std::env::remove_var(CONFIG_PATH_ENV_VAR);
        assert_eq!(get_config_path(), DEFAULT_CONFIG_PATH);

        // Restore original state
        if let Some(val) = original {
            std::env::set_var(CONFIG_PATH_ENV_VAR, val);
        }
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent");
        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.http.scheme, "http");
        assert_eq!(config.theme.title, ColorSpec::Indexed256(178));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        std::fs::write(
            &path,
            "[theme]\ncolor_mode = 24bit\ntitle = 255,128,0\nerror = 255,0,0\n\n[http]\nscheme = https\ntimeout_secs = 5\ninsecure = yes\n\n[log]\nlevel = debug\nfile = /tmp/httui.log\n",
        )
        .unwrap();

        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.theme.mode, ColorMode::TrueColor);
        assert_eq!(config.theme.title, ColorSpec::Rgb(255, 128, 0));
        assert_eq!(config.theme.error, ColorSpec::Rgb(255, 0, 0));
        assert_eq!(config.theme.border, ColorSpec::Rgb(128, 128, 128));
        assert_eq!(config.http.scheme, "https");
        assert_eq!(config.http.timeout, Some(Duration::from_secs(5)));
        assert!(config.http.insecure);
        assert_eq!(config.log.level.as_deref(), Some("debug"));
        assert_eq!(config.log.file, "/tmp/httui.log");
    }

    #[test]
    fn test_colour_specs_are_validated_against_mode() {
        assert_eq!(
            ColorSpec::parse(ColorMode::FourBit, "9").unwrap(),
            ColorSpec::Indexed16(9)
        );
        assert!(ColorSpec::parse(ColorMode::FourBit, "16").is_err());
        assert!(ColorSpec::parse(ColorMode::EightBit, "256").is_err());
        assert!(ColorSpec::parse(ColorMode::TrueColor, "1,2").is_err());
        assert!(ColorSpec::parse(ColorMode::TrueColor, "#12345").is_err());
        assert_eq!(
            ColorSpec::parse(ColorMode::TrueColor, " 1, 2 ,3 ").unwrap(),
            ColorSpec::Rgb(1, 2, 3)
        );
        assert_eq!(
            ColorSpec::parse(ColorMode::TrueColor, "#ff8000").unwrap(),
            ColorSpec::Rgb(255, 128, 0)
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(config_from("[theme]\ncolor_mode = 12bit\n").is_err());
        assert!(config_from("[theme]\ncolor_mode = 4bit\ntitle = 200\n").is_err());
        assert!(config_from("[http]\nscheme = ftp\n").is_err());
        assert!(config_from("[http]\ntimeout_secs = soon\n").is_err());
        assert!(config_from("[http]\ninsecure = maybe\n").is_err());
    }

    #[test]
    fn test_four_bit_mode_uses_four_bit_defaults() {
        let config = config_from("[theme]\ncolor_mode = 4bit\n").unwrap();
        assert_eq!(config.theme, Theme::defaults_for(ColorMode::FourBit));
    }
}
