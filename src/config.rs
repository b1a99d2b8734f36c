//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/flexitex/flexitex.toml`
//! 3. Project config: `./flexitex.toml`, or the file given with `--config`
//! 4. Environment variables: `FLEXITEX__*` (e.g. `FLEXITEX__OUTPUT__FOLDER`)
//! 5. Command line overrides
//!
//! Relative folders in a config file are resolved against that file's directory.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::relocate::DEFAULT_GRAPHICS_MACROS;
use crate::domain::{Rule, RuleSet};

/// File name of both the global and the project configuration.
pub const CONFIG_FILE_NAME: &str = "flexitex.toml";

/// Where the LaTeX project and its token stream live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InputSettings {
    /// Root of the source project, also the root of the static asset scan
    pub folder: PathBuf,
    /// Token stream of the main file, relative to `folder`
    pub tokens: PathBuf,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("."),
            tokens: PathBuf::from("main.tokens.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputSettings {
    pub folder: PathBuf,
    pub main_file: String,
    /// Destination of relocated graphics, relative to `folder`
    pub figure_folder: String,
    /// Remove the output folder before writing
    pub clear: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("out"),
            main_file: "main.tex".into(),
            figure_folder: "figs".into(),
            clear: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AssetSettings {
    /// Macros whose last brace argument names an embedded resource
    pub macros: Vec<String>,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            macros: DEFAULT_GRAPHICS_MACROS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// Unified configuration for flexitex.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub input: InputSettings,
    pub output: OutputSettings,
    pub assets: AssetSettings,
    /// Split rules, tried in order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub structure: Vec<Rule>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawInputSettings {
    pub folder: Option<PathBuf>,
    pub tokens: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawOutputSettings {
    pub folder: Option<PathBuf>,
    pub main_file: Option<String>,
    pub figure_folder: Option<String>,
    pub clear: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawAssetSettings {
    pub macros: Option<Vec<String>>,
}

/// Raw settings for intermediate parsing.
///
/// `None` means "not specified, inherit". Lists replace inherited lists as a
/// whole: rule order is significant and never merged.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub input: RawInputSettings,
    pub output: RawOutputSettings,
    pub assets: RawAssetSettings,
    pub structure: Option<Vec<Rule>>,
}

impl RawSettings {
    /// Anchor relative folders at `base`, the directory holding the config file.
    fn resolve_relative(mut self, base: &Path) -> Self {
        if let Some(folder) = self.input.folder.take() {
            self.input.folder = Some(base.join(expand_path(&folder)));
        }
        if let Some(folder) = self.output.folder.take() {
            self.output.folder = Some(base.join(expand_path(&folder)));
        }
        self
    }
}

/// Command line overrides; `None` keeps the configured value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub input_folder: Option<PathBuf>,
    pub tokens: Option<PathBuf>,
    pub output_folder: Option<PathBuf>,
    pub main_file: Option<String>,
    pub figure_folder: Option<String>,
    pub clear: Option<bool>,
}

/// Get the XDG config directory for flexitex.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "flexitex").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Project config in the current directory.
pub fn project_config_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE_NAME)
}

fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(&raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => path.to_path_buf(),
    }
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    let raw: RawSettings = toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(raw.resolve_relative(base))
}

impl Settings {
    /// Path of the token stream, resolved against the input folder.
    pub fn tokens_path(&self) -> PathBuf {
        self.input.folder.join(&self.input.tokens)
    }

    /// Output root plus rules, as consumed by the rule engine.
    pub fn rule_set(&self) -> RuleSet {
        RuleSet::new(
            self.output.folder.clone(),
            self.output.main_file.clone(),
            self.structure.clone(),
        )
    }

    /// Expand shell variables and tilde in path-like fields.
    ///
    /// Handles `~`, `$VAR`, and `${VAR}` syntax.
    fn expand_paths(&mut self) {
        self.input.folder = expand_path(&self.input.folder);
        self.input.tokens = expand_path(&self.input.tokens);
        self.output.folder = expand_path(&self.output.folder);
    }

    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            input: InputSettings {
                folder: overlay
                    .input
                    .folder
                    .clone()
                    .unwrap_or_else(|| self.input.folder.clone()),
                tokens: overlay
                    .input
                    .tokens
                    .clone()
                    .unwrap_or_else(|| self.input.tokens.clone()),
            },
            output: OutputSettings {
                folder: overlay
                    .output
                    .folder
                    .clone()
                    .unwrap_or_else(|| self.output.folder.clone()),
                main_file: overlay
                    .output
                    .main_file
                    .clone()
                    .unwrap_or_else(|| self.output.main_file.clone()),
                figure_folder: overlay
                    .output
                    .figure_folder
                    .clone()
                    .unwrap_or_else(|| self.output.figure_folder.clone()),
                clear: overlay.output.clear.unwrap_or(self.output.clear),
            },
            assets: AssetSettings {
                macros: overlay
                    .assets
                    .macros
                    .clone()
                    .unwrap_or_else(|| self.assets.macros.clone()),
            },
            structure: overlay
                .structure
                .clone()
                .unwrap_or_else(|| self.structure.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_path` - Explicit project config; must exist when given.
    ///   Without it `./flexitex.toml` is used if present.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("loading global config {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        let project = match config_path {
            Some(path) if !path.exists() => {
                return Err(ApplicationError::config(format!(
                    "config file not found: {}",
                    path.display()
                )))
            }
            Some(path) => Some(path.to_path_buf()),
            None => Some(project_config_path()).filter(|p| p.exists()),
        };
        if let Some(path) = project {
            debug!("loading project config {}", path.display());
            current = current.merge_with(&load_raw_settings(&path)?);
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Load a single config file on top of the compiled defaults.
    ///
    /// Neither global config nor environment variables are consulted.
    pub fn from_file(path: &Path) -> Result<Self, ApplicationError> {
        let mut settings = Self::default().merge_with(&load_raw_settings(path)?);
        settings.expand_paths();
        Ok(settings)
    }

    /// Apply FLEXITEX__* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("FLEXITEX")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("assets.macros")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("input.folder") {
            settings.input.folder = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("input.tokens") {
            settings.input.tokens = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("output.folder") {
            settings.output.folder = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("output.main_file") {
            settings.output.main_file = val;
        }
        if let Ok(val) = config.get_string("output.figure_folder") {
            settings.output.figure_folder = val;
        }
        if let Ok(val) = config.get_bool("output.clear") {
            settings.output.clear = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("assets.macros") {
            settings.assets.macros = val;
        }

        Ok(settings)
    }

    /// Apply command line overrides; unset fields keep their value.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(folder) = &overrides.input_folder {
            self.input.folder = expand_path(folder);
        }
        if let Some(tokens) = &overrides.tokens {
            self.input.tokens = expand_path(tokens);
        }
        if let Some(folder) = &overrides.output_folder {
            self.output.folder = expand_path(folder);
        }
        if let Some(main_file) = &overrides.main_file {
            self.output.main_file = main_file.clone();
        }
        if let Some(figure_folder) = &overrides.figure_folder {
            self.output.figure_folder = figure_folder.clone();
        }
        if let Some(clear) = overrides.clear {
            self.output.clear = clear;
        }
    }

    /// Check the settings against the filesystem, reporting every problem at once.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let mut errors = Vec::new();

        if self.input.folder.as_os_str().is_empty() {
            errors.push("missing input folder".to_string());
        } else if !self.input.folder.is_dir() {
            errors.push(format!(
                "input folder does not exist: {}",
                self.input.folder.display()
            ));
        } else if !self.tokens_path().is_file() {
            errors.push(format!(
                "token file does not exist: {}",
                self.tokens_path().display()
            ));
        }
        if self.output.folder.as_os_str().is_empty() {
            errors.push("missing output folder".to_string());
        }
        if self.output.main_file.trim().is_empty() {
            errors.push("missing output main file".to_string());
        }
        if self.output.figure_folder.trim().is_empty() {
            errors.push("missing output figure folder".to_string());
        }
        if self.output.clear && same_location(&self.input.folder, &self.output.folder) {
            errors.push(format!(
                "output folder equals input folder and would be cleared: {}",
                self.output.folder.display()
            ));
        }
        for (i, rule) in self.structure.iter().enumerate() {
            if rule.name.trim().is_empty() {
                errors.push(format!("structure rule {} has an empty name", i + 1));
            }
            if rule.file_name.trim().is_empty() {
                errors.push(format!("structure rule {} has an empty file_name", i + 1));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApplicationError::config(errors.join("; ")))
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# flexitex configuration
#
# Locations (by precedence, lowest to highest):
#   Global:  ~/.config/flexitex/flexitex.toml
#   Project: ./flexitex.toml or --config <file>
#   Env:     FLEXITEX__<SECTION>__<KEY>, e.g. FLEXITEX__OUTPUT__FOLDER

[input]
# folder = "."
# tokens = "main.tokens.json"

[output]
# folder = "out"
# main_file = "main.tex"
# figure_folder = "figs"
# clear = true

[assets]
# macros = ["includegraphics"]

# Rules are tried in order; the first match wins.
# [[structure]]
# type = "macro"
# name = "section"
# file_name = "sec-[section].tex"
# condition = "<length> > 40"
"#
        .to_string()
    }
}

fn same_location(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
