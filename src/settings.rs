//! Layered settings resolution
//!
//! Settings start from compiled-in defaults, are overridden by `RUNNER_*`
//! environment variables, and finally by a YAML config file. The resolved
//! [`Settings`] value is built once at startup and handed by reference to
//! every consumer; nothing mutates it afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;
use serde_yaml::Value;

use crate::error::{Result, SettingsError};

/// Prefix prepended to the upper-cased key name for environment overrides.
pub const ENV_PREFIX: &str = "RUNNER_";

/// Exported to the supervised child when a config file was named explicitly.
pub const CONFIG_PATH_ENV: &str = "RUNNER_CONFIG_PATH";

/// Config file probed when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "runner.conf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SettingKey {
    RootPath,
    TmpPath,
    BuildPath,
    BuildLogName,
    ValidExt,
    NoRebuildExt,
    Ignored,
    BuildDelay,
    Colors,
    LogColorMain,
    LogColorBuild,
    LogColorRunner,
    LogColorWatcher,
    LogColorApp,
}

impl SettingKey {
    pub const ALL: [SettingKey; 14] = [
        SettingKey::RootPath,
        SettingKey::TmpPath,
        SettingKey::BuildPath,
        SettingKey::BuildLogName,
        SettingKey::ValidExt,
        SettingKey::NoRebuildExt,
        SettingKey::Ignored,
        SettingKey::BuildDelay,
        SettingKey::Colors,
        SettingKey::LogColorMain,
        SettingKey::LogColorBuild,
        SettingKey::LogColorRunner,
        SettingKey::LogColorWatcher,
        SettingKey::LogColorApp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::RootPath => "root_path",
            SettingKey::TmpPath => "tmp_path",
            SettingKey::BuildPath => "build_path",
            SettingKey::BuildLogName => "build_log_name",
            SettingKey::ValidExt => "valid_ext",
            SettingKey::NoRebuildExt => "no_rebuild_ext",
            SettingKey::Ignored => "ignored",
            SettingKey::BuildDelay => "build_delay",
            SettingKey::Colors => "colors",
            SettingKey::LogColorMain => "log_color_main",
            SettingKey::LogColorBuild => "log_color_build",
            SettingKey::LogColorRunner => "log_color_runner",
            SettingKey::LogColorWatcher => "log_color_watcher",
            SettingKey::LogColorApp => "log_color_app",
        }
    }

    pub fn default_value(self) -> &'static str {
        match self {
            SettingKey::RootPath => ".",
            SettingKey::TmpPath => "./tmp",
            SettingKey::BuildPath => ".",
            SettingKey::BuildLogName => "runner-build-errors.log",
            SettingKey::ValidExt => ".go, .tpl, .tmpl, .html",
            SettingKey::NoRebuildExt => ".tpl, .tmpl, .html",
            SettingKey::Ignored => "assets, tmp",
            SettingKey::BuildDelay => "600",
            SettingKey::Colors => "1",
            SettingKey::LogColorMain => "cyan",
            SettingKey::LogColorBuild => "yellow",
            SettingKey::LogColorRunner => "green",
            SettingKey::LogColorWatcher => "magenta",
            SettingKey::LogColorApp => "",
        }
    }

    /// Environment variable overriding this key, e.g. `RUNNER_BUILD_DELAY`.
    pub fn env_var(self) -> String {
        format!("{}{}", ENV_PREFIX, self.as_str().to_uppercase())
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| SettingsError::UnknownKey(s.to_string()))
    }
}

/// Output channel that can be colored independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Main,
    Build,
    Runner,
    Watcher,
    App,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Main, Role::Build, Role::Runner, Role::Watcher, Role::App];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Main => "main",
            Role::Build => "build",
            Role::Runner => "runner",
            Role::Watcher => "watcher",
            Role::App => "app",
        }
    }

    pub fn color_key(self) -> SettingKey {
        match self {
            Role::Main => SettingKey::LogColorMain,
            Role::Build => SettingKey::LogColorBuild,
            Role::Runner => SettingKey::LogColorRunner,
            Role::Watcher => SettingKey::LogColorWatcher,
            Role::App => SettingKey::LogColorApp,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| SettingsError::UnknownRole(s.to_string()))
    }
}

/// The resolved settings table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub root_path: String,
    pub tmp_path: String,
    pub build_path: String,
    pub build_log_name: String,
    pub valid_ext: String,
    pub no_rebuild_ext: String,
    pub ignored: String,
    pub build_delay: String,
    pub colors: String,
    pub log_color_main: String,
    pub log_color_build: String,
    pub log_color_runner: String,
    pub log_color_watcher: String,
    pub log_color_app: String,
    /// Keys found in a config file that no accessor reads.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
    #[serde(skip)]
    source_root: PathBuf,
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

impl Settings {
    /// Compiled-in defaults, with relative paths anchored at `source_root`.
    pub fn with_source_root<P: Into<PathBuf>>(source_root: P) -> Self {
        let mut settings = Self {
            root_path: String::new(),
            tmp_path: String::new(),
            build_path: String::new(),
            build_log_name: String::new(),
            valid_ext: String::new(),
            no_rebuild_ext: String::new(),
            ignored: String::new(),
            build_delay: String::new(),
            colors: String::new(),
            log_color_main: String::new(),
            log_color_build: String::new(),
            log_color_runner: String::new(),
            log_color_watcher: String::new(),
            log_color_app: String::new(),
            extra: BTreeMap::new(),
            source_root: source_root.into(),
            config_path: None,
        };
        for key in SettingKey::ALL {
            settings.set(key, key.default_value());
        }
        settings
    }

    /// Resolve settings from defaults, the process environment and a config file.
    ///
    /// A non-empty `config_path` that does not exist is the one fatal case and
    /// is returned as [`SettingsError::ConfigNotFound`]. Without a path,
    /// [`DEFAULT_CONFIG_FILE`] is merged if present. Read and parse failures
    /// are logged and leave the already-resolved values in place.
    pub fn resolve(config_path: Option<&Path>) -> Result<Self> {
        Self::resolve_with(config_path, Path::new(DEFAULT_CONFIG_FILE), |name| {
            std::env::var(name).ok()
        })
    }

    /// Like [`Settings::resolve`] with an injected environment lookup and
    /// discovery path.
    pub fn resolve_with<F>(config_path: Option<&Path>, discovery_path: &Path, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_path = config_path.filter(|path| !path.as_os_str().is_empty());

        if let Some(path) = config_path {
            if fs::metadata(path).is_err() {
                return Err(SettingsError::ConfigNotFound {
                    path: path.to_path_buf(),
                });
            }
        }

        let mut settings = Self::with_source_root(toolchain_source_root(&env));
        settings.apply_env(&env);

        match config_path {
            Some(path) => {
                settings.config_path = Some(path.to_path_buf());
                settings.merge_file_logged(path);
            }
            None if fs::metadata(discovery_path).is_ok() => {
                settings.merge_file_logged(discovery_path);
            }
            None => {
                tracing::debug!("No config file at {}, using defaults", discovery_path.display());
            }
        }

        Ok(settings)
    }

    /// Overwrite every key whose `RUNNER_<KEY>` variable is set and non-empty.
    pub fn apply_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in SettingKey::ALL {
            let name = key.env_var();
            if let Some(value) = env(&name).filter(|value| !value.is_empty()) {
                tracing::debug!("{} overridden by {}", key, name);
                self.set(key, value);
            }
        }
    }

    /// Merge a YAML config file over the current values.
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        tracing::info!("Loading settings from {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.merge_yaml(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Merge YAML text over the current values.
    ///
    /// Scalars of any type are stored in their string form. Unknown keys land
    /// in [`Settings::extra`].
    pub fn merge_yaml(&mut self, content: &str) -> std::result::Result<(), serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(());
        }

        let overrides: Option<BTreeMap<String, Value>> = serde_yaml::from_str(content)?;
        for (name, value) in overrides.unwrap_or_default() {
            match name.parse::<SettingKey>() {
                Ok(key) => match scalar_to_string(&value) {
                    Some(value) => self.set(key, value),
                    None => tracing::warn!("Ignoring non-scalar value for setting {}", key),
                },
                Err(_) => {
                    self.extra.insert(name, value);
                }
            }
        }
        Ok(())
    }

    fn merge_file_logged(&mut self, path: &Path) {
        if let Err(err) = self.merge_file(path) {
            tracing::warn!("{}", err);
        }
    }

    pub fn get(&self, key: SettingKey) -> &str {
        match key {
            SettingKey::RootPath => &self.root_path,
            SettingKey::TmpPath => &self.tmp_path,
            SettingKey::BuildPath => &self.build_path,
            SettingKey::BuildLogName => &self.build_log_name,
            SettingKey::ValidExt => &self.valid_ext,
            SettingKey::NoRebuildExt => &self.no_rebuild_ext,
            SettingKey::Ignored => &self.ignored,
            SettingKey::BuildDelay => &self.build_delay,
            SettingKey::Colors => &self.colors,
            SettingKey::LogColorMain => &self.log_color_main,
            SettingKey::LogColorBuild => &self.log_color_build,
            SettingKey::LogColorRunner => &self.log_color_runner,
            SettingKey::LogColorWatcher => &self.log_color_watcher,
            SettingKey::LogColorApp => &self.log_color_app,
        }
    }

    pub fn set<S: Into<String>>(&mut self, key: SettingKey, value: S) {
        let slot = match key {
            SettingKey::RootPath => &mut self.root_path,
            SettingKey::TmpPath => &mut self.tmp_path,
            SettingKey::BuildPath => &mut self.build_path,
            SettingKey::BuildLogName => &mut self.build_log_name,
            SettingKey::ValidExt => &mut self.valid_ext,
            SettingKey::NoRebuildExt => &mut self.no_rebuild_ext,
            SettingKey::Ignored => &mut self.ignored,
            SettingKey::BuildDelay => &mut self.build_delay,
            SettingKey::Colors => &mut self.colors,
            SettingKey::LogColorMain => &mut self.log_color_main,
            SettingKey::LogColorBuild => &mut self.log_color_build,
            SettingKey::LogColorRunner => &mut self.log_color_runner,
            SettingKey::LogColorWatcher => &mut self.log_color_watcher,
            SettingKey::LogColorApp => &mut self.log_color_app,
        };
        *slot = value.into();
    }

    /// Recognized keys and their values, in key order.
    pub fn entries(&self) -> impl Iterator<Item = (SettingKey, &str)> + '_ {
        SettingKey::ALL.into_iter().map(move |key| (key, self.get(key)))
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// The explicitly requested config file, if any.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Variables to export to the supervised child process.
    pub fn child_env(&self) -> Vec<(String, String)> {
        self.config_path
            .iter()
            .map(|path| (CONFIG_PATH_ENV.to_string(), path.display().to_string()))
            .collect()
    }

    pub fn root_path(&self) -> PathBuf {
        self.source_root.join(&self.root_path)
    }

    pub fn build_path(&self) -> PathBuf {
        self.root_path().join(&self.build_path)
    }

    pub fn tmp_path(&self) -> PathBuf {
        self.root_path().join(&self.tmp_path)
    }

    pub fn build_log_name(&self) -> &str {
        &self.build_log_name
    }

    pub fn build_errors_file_path(&self) -> PathBuf {
        self.tmp_path().join(&self.build_log_name)
    }

    pub fn valid_ext(&self) -> &str {
        &self.valid_ext
    }

    pub fn no_rebuild_ext(&self) -> &str {
        &self.no_rebuild_ext
    }

    pub fn ignored(&self) -> &str {
        &self.ignored
    }

    /// Delay before a rebuild, in milliseconds. Malformed or negative values
    /// mean no delay.
    pub fn build_delay(&self) -> Duration {
        let millis = self.build_delay.parse::<i64>().unwrap_or(0);
        Duration::from_millis(millis.max(0) as u64)
    }

    pub fn colors_enabled(&self) -> bool {
        self.colors == "1"
    }

    pub fn role_color(&self, role: Role) -> &str {
        self.get(role.color_key())
    }

    /// Configured color name for a role given by name; `""` for unknown roles.
    pub fn log_color(&self, role: &str) -> &str {
        role.parse::<Role>().map(|role| self.role_color(role)).unwrap_or("")
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// `$GOPATH/src`, falling back to `~/go/src`. Only the first `GOPATH` entry is used.
pub fn toolchain_source_root<F>(env: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    let gopath = env("GOPATH")
        .filter(|value| !value.is_empty())
        .and_then(|value| std::env::split_paths(&value).next())
        .or_else(|| dirs::home_dir().map(|home| home.join("go")))
        .unwrap_or_else(|| PathBuf::from("go"));
    gopath.join("src")
}
