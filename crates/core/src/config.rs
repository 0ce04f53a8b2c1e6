//! Configuration management for the Agrinet advisor.
//!
//! Configuration is loaded and merged from multiple sources, later sources
//! winning:
//! - Built-in defaults
//! - Config file (`.agrinet/config.yaml` in the workspace, or `AGRINET_CONFIG`)
//! - Environment variables
//! - Command-line flags (`AppConfig::with_overrides`)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Providers the LLM factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 1] = ["ollama"];

/// Canonical search language; sub-queries are always issued in it.
pub const CANONICAL_LANGUAGE: &str = "en";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .agrinet/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// LLM provider used for answer generation
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Log level override
    pub log_level: Option<String>,

    /// Log output format ("pretty" or "json")
    pub log_format: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations
    pub llm: Option<LlmConfig>,

    /// Orchestration engine settings
    pub advisor: AdvisorConfig,

    /// Document search settings
    pub search: SearchConfig,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub model: String,
    /// Request timeout in seconds
    pub timeout: Option<u64>,
}

/// Settings for the classification and retrieval engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdvisorConfig {
    /// How many prior turns the classifier may look back over
    pub lookback_turns: usize,

    /// Timeout for a single sub-query search call, in milliseconds
    pub sub_query_timeout_ms: u64,

    /// Deadline for all retrieval work of one turn, in milliseconds
    pub turn_deadline_ms: u64,

    /// Upper bound of sub-queries per topic cluster (2..=5)
    pub max_sub_queries_per_cluster: usize,

    /// Result limit passed to each search call
    pub max_results_per_sub_query: usize,

    /// Evidence documents handed to generation
    pub max_evidence_documents: usize,

    /// Language tag of the regional response language
    pub regional_language: String,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            lookback_turns: 5,
            sub_query_timeout_ms: 8_000,
            turn_deadline_ms: 20_000,
            max_sub_queries_per_cluster: 4,
            max_results_per_sub_query: 10,
            max_evidence_documents: 8,
            regional_language: "gu".to_string(),
        }
    }
}

impl AdvisorConfig {
    pub fn sub_query_timeout(&self) -> Duration {
        Duration::from_millis(self.sub_query_timeout_ms)
    }

    pub fn turn_deadline(&self) -> Duration {
        Duration::from_millis(self.turn_deadline_ms)
    }

    /// The fixed pair of response languages: English first, then regional.
    pub fn supported_languages(&self) -> [&str; 2] {
        [CANONICAL_LANGUAGE, self.regional_language.as_str()]
    }

    /// Validate engine settings.
    pub fn validate(&self) -> AppResult<()> {
        if !(2..=5).contains(&self.max_sub_queries_per_cluster) {
            return Err(AppError::Config(format!(
                "maxSubQueriesPerCluster must be between 2 and 5, got {}",
                self.max_sub_queries_per_cluster
            )));
        }
        if self.lookback_turns == 0 {
            return Err(AppError::Config(
                "lookbackTurns must be at least 1".to_string(),
            ));
        }
        if self.sub_query_timeout_ms == 0 || self.turn_deadline_ms == 0 {
            return Err(AppError::Config(
                "subQueryTimeoutMs and turnDeadlineMs must be positive".to_string(),
            ));
        }
        if self.max_results_per_sub_query == 0 || self.max_evidence_documents == 0 {
            return Err(AppError::Config(
                "maxResultsPerSubQuery and maxEvidenceDocuments must be positive".to_string(),
            ));
        }
        if self.regional_language.trim().is_empty()
            || self.regional_language.eq_ignore_ascii_case(CANONICAL_LANGUAGE)
        {
            return Err(AppError::Config(format!(
                "regionalLanguage must be a non-English language tag, got '{}'",
                self.regional_language
            )));
        }
        Ok(())
    }
}

/// Document search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchConfig {
    /// Base URL of the Marqo search service
    pub endpoint: Option<String>,

    /// Index holding the advisory documents
    pub index_name: String,

    /// JSON glossary of English/regional term pairs
    pub glossary_path: Option<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            index_name: "sunbird-va-index".to_string(),
            glossary_path: None,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    advisor: Option<AdvisorConfig>,
    search: Option<SearchConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    format: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(),
            model: "llama3.2".to_string(),
            log_level: None,
            log_format: None,
            verbose: false,
            no_color: false,
            llm: None,
            advisor: AdvisorConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file and environment.
    ///
    /// Environment variables:
    /// - `AGRINET_WORKSPACE`: Override workspace path
    /// - `AGRINET_CONFIG`: Path to config file
    /// - `AGRINET_PROVIDER`: LLM provider
    /// - `AGRINET_MODEL`: Model identifier
    /// - `AGRINET_SEARCH_ENDPOINT` (or `MARQO_ENDPOINT_URL`): search service URL
    /// - `AGRINET_SEARCH_INDEX`: search index name
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use agrinet_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Lookback: {}", config.advisor.lookback_turns);
    /// ```
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("AGRINET_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("AGRINET_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.agrinet_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("AGRINET_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("AGRINET_MODEL") {
            config.model = model;
        }

        if let Ok(endpoint) =
            std::env::var("AGRINET_SEARCH_ENDPOINT").or_else(|_| std::env::var("MARQO_ENDPOINT_URL"))
        {
            config.search.endpoint = Some(endpoint);
        }

        if let Ok(index) = std::env::var("AGRINET_SEARCH_INDEX") {
            config.search.index_name = index;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into a copy of this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(format) = logging.format {
                result.log_format = Some(format);
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();
            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model.clone();
            }
            result.llm = Some(llm);
        }

        if let Some(advisor) = config_file.advisor {
            result.advisor = advisor;
        }

        if let Some(search) = config_file.search {
            result.search = search;
        }

        tracing::debug!("Merged configuration from {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .agrinet directory.
    pub fn agrinet_dir(&self) -> PathBuf {
        self.workspace.join(".agrinet")
    }

    /// Get the active provider configuration.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm.as_ref().and_then(|llm| llm.providers.get(provider))
    }

    /// Resolve the glossary path, relative paths being taken from the workspace.
    pub fn glossary_path(&self) -> Option<PathBuf> {
        self.search.glossary_path.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                self.workspace.join(p)
            }
        })
    }

    /// Validate the configuration.
    pub fn validate(&self) -> AppResult<()> {
        if !KNOWN_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        self.advisor.validate()?;

        if self.search.index_name.trim().is_empty() {
            return Err(AppError::Config(
                "Search index name cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.advisor.lookback_turns, 5);
        assert_eq!(config.advisor.max_sub_queries_per_cluster, 4);
        assert_eq!(config.search.index_name, "sunbird-va-index");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_overrides() {
        let overridden = AppConfig::default().with_overrides(
            None,
            None,
            Some("ollama".to_string()),
            Some("qwen2.5".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.model, "qwen2.5");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cluster_size_bounds() {
        let mut advisor = AdvisorConfig::default();
        advisor.max_sub_queries_per_cluster = 1;
        assert!(advisor.validate().is_err());
        advisor.max_sub_queries_per_cluster = 6;
        assert!(advisor.validate().is_err());
        advisor.max_sub_queries_per_cluster = 5;
        assert!(advisor.validate().is_ok());
    }

    #[test]
    fn test_regional_language_must_not_be_english() {
        let mut advisor = AdvisorConfig::default();
        advisor.regional_language = "EN".to_string();
        assert!(advisor.validate().is_err());
        assert_eq!(AdvisorConfig::default().supported_languages(), ["en", "gu"]);
    }

    #[test]
    fn test_merge_yaml_sections() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
llm:
  activeProvider: ollama
  providers:
    ollama:
      endpoint: http://localhost:11434
      model: gemma2
logging:
  level: warn
  color: false
  format: json
advisor:
  lookbackTurns: 3
  subQueryTimeoutMs: 1500
search:
  endpoint: http://marqo:8882
  indexName: krishi-docs
"#,
        )
        .unwrap();

        let merged = AppConfig::default().merge_yaml(&path).unwrap();
        assert_eq!(merged.model, "gemma2");
        assert_eq!(merged.log_level, Some("warn".to_string()));
        assert_eq!(merged.log_format, Some("json".to_string()));
        assert!(merged.no_color);
        assert_eq!(merged.advisor.lookback_turns, 3);
        assert_eq!(merged.advisor.sub_query_timeout(), Duration::from_millis(1500));
        // Unspecified advisor keys keep their defaults
        assert_eq!(merged.advisor.max_sub_queries_per_cluster, 4);
        assert_eq!(merged.search.endpoint.as_deref(), Some("http://marqo:8882"));
        assert_eq!(merged.search.index_name, "krishi-docs");
    }

    #[test]
    fn test_merge_yaml_rejects_garbage() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "advisor: [unterminated").unwrap();
        assert!(AppConfig::default().merge_yaml(&path).is_err());
    }

    #[test]
    fn test_relative_glossary_path_resolves_against_workspace() {
        let mut config = AppConfig::default();
        config.workspace = PathBuf::from("/srv/agrinet");
        config.search.glossary_path = Some(PathBuf::from("assets/glossary.json"));
        assert_eq!(
            config.glossary_path(),
            Some(PathBuf::from("/srv/agrinet/assets/glossary.json"))
        );
    }
}
