use crate::utils::error::{CleanError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_GITLEAKS_IMAGE: &str = "zricethezav/gitleaks:latest";
pub const DEFAULT_BFG_URL: &str =
    "https://repo1.maven.org/maven2/com/madgag/bfg/1.14.0/bfg-1.14.0.jar";
pub const DEFAULT_BFG_JAR_NAME: &str = "bfg.jar";
pub const DEFAULT_VOLUME_NAME: &str = "CaseSensitiveGit";

/// Tool locations and images. Every section and key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub gitleaks: GitleaksConfig,
    pub bfg: BfgConfig,
    pub filter_repo: FilterRepoConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitleaksConfig {
    pub image: String,
}

impl Default for GitleaksConfig {
    fn default() -> Self {
        Self {
            image: DEFAULT_GITLEAKS_IMAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BfgConfig {
    pub url: String,
    pub jar_name: String,
    /// Defaults to `~/.bfg`.
    pub cache_dir: Option<PathBuf>,
}

impl Default for BfgConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BFG_URL.to_string(),
            jar_name: DEFAULT_BFG_JAR_NAME.to_string(),
            cache_dir: None,
        }
    }
}

impl BfgConfig {
    pub fn cache_dir(&self) -> Result<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::home_dir()
                .map(|home| home.join(".bfg"))
                .ok_or_else(|| CleanError::MissingConfigError {
                    field: "bfg.cache_dir (no home directory found)".to_string(),
                }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterRepoConfig {
    /// Run git-filter-repo on a case-sensitive disk image (macOS `hdiutil`).
    pub use_disk_image: bool,
    /// Defaults to `~/CaseSensitiveGit.dmg`.
    pub disk_image: Option<PathBuf>,
    pub volume_name: String,
    pub size: String,
}

impl Default for FilterRepoConfig {
    fn default() -> Self {
        Self {
            use_disk_image: cfg!(target_os = "macos"),
            disk_image: None,
            volume_name: DEFAULT_VOLUME_NAME.to_string(),
            size: "1g".to_string(),
        }
    }
}

impl FilterRepoConfig {
    pub fn disk_image(&self) -> Result<PathBuf> {
        match &self.disk_image {
            Some(path) => Ok(path.clone()),
            None => dirs::home_dir()
                .map(|home| home.join(format!("{}.dmg", self.volume_name)))
                .ok_or_else(|| CleanError::MissingConfigError {
                    field: "filter_repo.disk_image (no home directory found)".to_string(),
                }),
        }
    }

    pub fn volume_path(&self) -> PathBuf {
        Path::new("/Volumes").join(&self.volume_name)
    }
}

impl ToolConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CleanError::InvalidConfigValueError {
                field: "config".to_string(),
                value: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are
    /// left as written.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex is valid"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    /// Loads `path` when given, otherwise the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }
}

impl Validate for ToolConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("gitleaks.image", &self.gitleaks.image)?;
        validation::validate_http_url("bfg.url", &self.bfg.url)?;
        validation::validate_non_empty_string("bfg.jar_name", &self.bfg.jar_name)?;
        validation::validate_non_empty_string("filter_repo.volume_name", &self.filter_repo.volume_name)?;
        validation::validate_non_empty_string("filter_repo.size", &self.filter_repo.size)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ToolConfig::from_toml_str("").unwrap();
        assert_eq!(config, ToolConfig::default());
        assert_eq!(config.gitleaks.image, DEFAULT_GITLEAKS_IMAGE);
        assert_eq!(config.bfg.url, DEFAULT_BFG_URL);
        assert_eq!(config.filter_repo.volume_path(), PathBuf::from("/Volumes/CaseSensitiveGit"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = ToolConfig::from_toml_str(
            r#"
[gitleaks]
image = "ghcr.io/gitleaks/gitleaks:v8.18.4"

[filter_repo]
use_disk_image = false
"#,
        )
        .unwrap();
        assert_eq!(config.gitleaks.image, "ghcr.io/gitleaks/gitleaks:v8.18.4");
        assert!(!config.filter_repo.use_disk_image);
        assert_eq!(config.filter_repo.size, "1g");
        assert_eq!(config.bfg.jar_name, DEFAULT_BFG_JAR_NAME);
    }

    #[test]
    fn test_environment_variable_substitution() {
        std::env::set_var("GITCLEAN_TEST_CACHE", "/opt/bfg-cache");
        let config = ToolConfig::from_toml_str(
            r#"
[bfg]
cache_dir = "${GITCLEAN_TEST_CACHE}"
"#,
        )
        .unwrap();
        assert_eq!(config.bfg.cache_dir().unwrap(), PathBuf::from("/opt/bfg-cache"));
        std::env::remove_var("GITCLEAN_TEST_CACHE");
    }

    #[test]
    fn test_invalid_bfg_url_rejected() {
        let config = ToolConfig::from_toml_str(
            r#"
[bfg]
url = "ftp://mirror.example.com/bfg.jar"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        assert!(matches!(
            ToolConfig::from_toml_str("[gitleaks"),
            Err(CleanError::TomlError(_))
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[filter_repo]\nvolume_name = \"ScrubVolume\"\n")
            .unwrap();

        let config = ToolConfig::load(Some(temp_file.path())).unwrap();
        assert_eq!(config.filter_repo.volume_name, "ScrubVolume");
        assert_eq!(config.filter_repo.volume_path(), PathBuf::from("/Volumes/ScrubVolume"));
    }

    #[test]
    fn test_unreadable_config_file_exits_as_config_error() {
        let err = ToolConfig::load(Some(Path::new("/nonexistent/gitclean.toml"))).unwrap_err();
        assert!(matches!(err, CleanError::InvalidConfigValueError { ref field, .. } if field == "config"));
        assert_eq!(err.exit_code(), 2);
    }
}
