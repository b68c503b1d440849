use anyhow::{Context, Result};
use intent_recognizer::CluSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use task_dialog::DialogConfig;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognizerBackend {
    /// Remote conversation-analysis project
    #[default]
    Clu,
    /// Offline keyword patterns
    Keyword,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the robot-control API
    pub gateway_url: String,
    pub recognizer: RecognizerBackend,
    pub clu: CluSettings,
    pub dialog: DialogConfig,
    /// Keep conversations on disk here; in memory when unset
    pub state_dir: Option<PathBuf>,
    /// Conversations idle longer than this are dropped
    pub session_idle_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gateway_url: "http://localhost:5000".to_string(),
            recognizer: RecognizerBackend::default(),
            clu: CluSettings::default(),
            dialog: DialogConfig::default(),
            state_dir: None,
            session_idle_secs: 3600,
        }
    }
}

impl AppConfig {
    /// Read the config file, writing the defaults first if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
        } else {
            let config = Self::default();
            config.save(path)?;
            Ok(config)
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Environment variables win over the file.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let set = |target: &mut String, key: &str| {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *target = value;
            }
        };
        set(&mut self.gateway_url, "ROBOT_API_ENDPOINT");
        set(&mut self.clu.endpoint, "CLU_ENDPOINT");
        set(&mut self.clu.api_key, "CLU_API_KEY");
        set(&mut self.clu.project_name, "CLU_PROJECT_NAME");
        set(&mut self.clu.deployment_name, "CLU_DEPLOYMENT_NAME");
    }
}
