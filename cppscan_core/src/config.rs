use crate::error::{CppScanError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{debug, error, info, trace, warn};

pub const CONFIG_FILE_NAME: &str = "cppscan.toml";

/// Matches `${VAR_NAME}` or `${VAR_NAME:-default}`.
static ENV_VAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}")
        .expect("Invalid regex for environment variable substitution")
});

/// Settings shared by all commands.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct GeneralConfig {
    /// Only enums whose name matches this regex are processed.
    #[serde(default)]
    pub enum_name_pattern: Option<String>,
}

/// Names used in the generated enum printing functions.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct EnumToStringConfig {
    /// Namespace the generated declarations and definitions are placed in.
    pub namespace: String,
    /// Macro wrapping a string literal so it is stored in flash.
    pub flash_string_macro: String,
    /// Macro that is true when compiling for the host rather than the device.
    pub host_target_macro: String,
    /// Function printing a value that has no enumerator.
    pub unknown_value_printer: String,
}

impl Default for EnumToStringConfig {
    fn default() -> Self {
        Self {
            namespace: "alpaca".to_string(),
            flash_string_macro: "MCU_FLASHSTR".to_string(),
            host_target_macro: "MCU_HOST_TARGET".to_string(),
            unknown_value_printer: "mcucore::PrintUnknownEnumValueTo".to_string(),
        }
    }
}

/// Settings for wrapping string literals and auditing calls.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct FlashStrConfig {
    /// Macro wrapped around string literals in logging statements.
    pub wrapper: String,
    /// A statement starting with an identifier with one of these prefixes is
    /// a logging statement.
    pub statement_prefixes: Vec<String>,
    /// Calls to these never need their string literals wrapped.
    pub exempt_identifiers: Vec<String>,
    /// Regexes for further exempt identifiers.
    pub exempt_patterns: Vec<String>,
}

impl Default for FlashStrConfig {
    fn default() -> Self {
        Self {
            wrapper: "FLASHSTR".to_string(),
            statement_prefixes: ["TAS_VLOG", "TAS_CHECK", "TAS_DCHECK"]
                .map(String::from)
                .to_vec(),
            exempt_identifiers: ["TASLIT", "FLASHSTR", "TASENUMERATOR", "static_assert"]
                .map(String::from)
                .to_vec(),
            exempt_patterns: vec![r"^TAS_DEFINE_.*_LITERAL".to_string()],
        }
    }
}

/// Root configuration, read from `cppscan.toml`.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CppScanConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub enum_to_string: EnumToStringConfig,
    #[serde(default)]
    pub flashstr: FlashStrConfig,
}

impl CppScanConfig {
    /// Loads the configuration from `explicit_path` if given, else from the
    /// first `cppscan.toml` found in the current directory or its ancestors.
    /// Without either, the defaults apply.
    pub fn load(explicit_path: Option<&Path>) -> Result<CppScanConfig> {
        info!("Loading cppscan configuration");
        let config_path = match explicit_path {
            Some(path) => {
                if !path.is_file() {
                    error!("Configuration file {:?} does not exist", path);
                    return Err(CppScanError::invalid_path(path));
                }
                Some(path.to_path_buf())
            }
            None => Self::find_config_file(&env::current_dir()?),
        };

        match config_path {
            Some(path) => {
                info!("Found configuration file at: {:?}", path);
                Self::from_file(&path)
            }
            None => {
                debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                Ok(CppScanConfig::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<CppScanConfig> {
        let contents = fs::read_to_string(path).map_err(|e| {
            error!("Failed to read configuration file: {}", e);
            CppScanError::from(e)
        })?;
        debug!("Configuration file size: {} bytes", contents.len());
        Self::from_toml_str(&contents)
    }

    /// Parses TOML text, then substitutes environment variable references
    /// in every string value.
    pub fn from_toml_str(contents: &str) -> Result<CppScanConfig> {
        let mut config: CppScanConfig = toml::from_str(contents).map_err(|e| {
            error!("Failed to parse TOML configuration: {}", e);
            CppScanError::from(e)
        })?;
        config.substitute_all_env_vars()?;
        config.validate()?;
        debug!(
            "Configuration: namespace {}, wrapper {}, {} statement prefixes",
            config.enum_to_string.namespace,
            config.flashstr.wrapper,
            config.flashstr.statement_prefixes.len()
        );
        Ok(config)
    }

    /// Searches for `cppscan.toml` in `start` and then each of its ancestors.
    fn find_config_file(start: &Path) -> Option<PathBuf> {
        debug!("Starting config file search from: {:?}", start);
        for path in start.ancestors() {
            let config_path = path.join(CONFIG_FILE_NAME);
            trace!("Checking for config at: {:?}", config_path);
            if config_path.is_file() {
                return Some(config_path);
            }
        }
        None
    }

    fn substitute_all_env_vars(&mut self) -> Result<()> {
        if let Some(pattern) = &self.general.enum_name_pattern {
            self.general.enum_name_pattern = Some(Self::substitute_env_vars(pattern)?);
        }

        let e2s = &mut self.enum_to_string;
        for value in [
            &mut e2s.namespace,
            &mut e2s.flash_string_macro,
            &mut e2s.host_target_macro,
            &mut e2s.unknown_value_printer,
        ] {
            *value = Self::substitute_env_vars(value)?;
        }

        let flashstr = &mut self.flashstr;
        flashstr.wrapper = Self::substitute_env_vars(&flashstr.wrapper)?;
        for value in flashstr
            .statement_prefixes
            .iter_mut()
            .chain(flashstr.exempt_identifiers.iter_mut())
            .chain(flashstr.exempt_patterns.iter_mut())
        {
            *value = Self::substitute_env_vars(value)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.flashstr.wrapper.is_empty() {
            return Err(CppScanError::config("flashstr.wrapper must not be empty"));
        }
        if self.flashstr.statement_prefixes.iter().any(String::is_empty) {
            return Err(CppScanError::config(
                "flashstr.statement_prefixes must not contain an empty prefix",
            ));
        }
        Ok(())
    }

    /// Substitute environment variables in config strings.
    /// Supports ${VAR_NAME:-default} syntax.
    fn substitute_env_vars(value: &str) -> Result<String> {
        trace!("Substituting environment variables in: {}", value);
        let mut result = value.to_string();

        for cap in ENV_VAR_RE.captures_iter(value) {
            let var_name = &cap[1];
            let default_value = cap.get(2).map(|m| m.as_str());

            let replacement = match env::var(var_name) {
                Ok(val) => {
                    debug!("Resolved environment variable: {}", var_name);
                    val
                }
                Err(_) => match default_value {
                    Some(default) => {
                        warn!(
                            "Environment variable {} not set, using default: {}",
                            var_name, default
                        );
                        default.to_string()
                    }
                    None => {
                        error!(
                            "Environment variable {} not set and no default provided",
                            var_name
                        );
                        return Err(CppScanError::EnvVarNotSet(var_name.to_string()));
                    }
                },
            };

            result = result.replace(&cap[0], &replacement);
        }

        Ok(result)
    }

    /// The compiled `general.enum_name_pattern`, if one is set.
    pub fn enum_name_regex(&self) -> Result<Option<Regex>> {
        match &self.general.enum_name_pattern {
            Some(pattern) => Ok(Some(Regex::new(pattern)?)),
            None => Ok(None),
        }
    }
}

impl FlashStrConfig {
    /// Compiles the exemption list into a predicate over identifiers.
    pub fn exemptions(&self) -> Result<Exemptions> {
        let patterns = self
            .exempt_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Exemptions {
            identifiers: self.exempt_identifiers.clone(),
            patterns,
        })
    }
}

/// Identifiers whose calls may take plain string literals.
#[derive(Debug, Clone)]
pub struct Exemptions {
    identifiers: Vec<String>,
    patterns: Vec<Regex>,
}

impl Exemptions {
    pub fn is_exempt(&self, identifier: &str) -> bool {
        self.identifiers.iter().any(|i| i == identifier)
            || self.patterns.iter().any(|re| re.is_match(identifier))
    }
}
