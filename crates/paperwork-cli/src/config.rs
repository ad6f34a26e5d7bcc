use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use paperwork_export::pdf::PdfConverter;

use crate::catalog::{TemplateSpec, builtin_templates};

/// Current config version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`migrate`].
const CURRENT_VERSION: u32 = 1;

pub const CONFIG_ENV: &str = "PAPERWORK_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperworkConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    #[serde(default)]
    pub config_version: u32,
    /// Counter file holding `"<base>,<offset>"`.
    pub serial_path: PathBuf,
    pub template_dir: PathBuf,
    pub output_dir: PathBuf,
    /// External PDF converter. `None` disables conversion.
    #[serde(default)]
    pub converter: Option<PdfConverter>,
    pub templates: Vec<TemplateSpec>,
}

impl PaperworkConfig {
    /// Defaults rooted at `base` (normally the config directory).
    pub fn defaults_in(base: &Path) -> Self {
        Self {
            config_version: CURRENT_VERSION,
            serial_path: base.join("serial.txt"),
            template_dir: base.join("templates"),
            output_dir: PathBuf::from("generated"),
            converter: Some(PdfConverter::default()),
            templates: builtin_templates(),
        }
    }

    pub fn template(&self, id: &str) -> eyre::Result<&TemplateSpec> {
        self.templates.iter().find(|t| t.id == id).ok_or_else(|| {
            let known: Vec<&str> = self.templates.iter().map(|t| t.id.as_str()).collect();
            eyre::eyre!("unknown template '{id}' (available: {})", known.join(", "))
        })
    }

    pub fn template_path(&self, spec: &TemplateSpec) -> PathBuf {
        if spec.file.is_absolute() {
            spec.file.clone()
        } else {
            self.template_dir.join(&spec.file)
        }
    }
}

pub fn config_dir() -> eyre::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("paperwork"))
}

pub fn default_config_path() -> eyre::Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

/// Load the config at `path`, or fall back to built-in defaults rooted next to
/// it when the file does not exist yet.
pub fn load_or_default(path: &Path) -> eyre::Result<PaperworkConfig> {
    if path.exists() {
        return load_config(path);
    }
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    tracing::debug!(path = %path.display(), "no config file, using defaults");
    Ok(PaperworkConfig::defaults_in(base))
}

pub fn load_config(path: &Path) -> eyre::Result<PaperworkConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;

    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    let on_disk_version = match json.get("config_version") {
        None | Some(serde_json::Value::Null) => 0,
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| eyre::eyre!("config_version {v} in {} is not supported", path.display()))?,
    };

    let migrated = migrate(json, on_disk_version)?;
    let config: PaperworkConfig = serde_json::from_value(migrated)?;

    for template in &config.templates {
        template
            .validate()
            .map_err(|e| eyre::eyre!("template '{}' in {}: {e}", template.id, path.display()))?;
    }
    Ok(config)
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION}). \
             Please update paperwork."
        ));
    }

    // v0 → v1: pre-versioned files have the same shape; stamp them.
    if from_version < 1 {
        json.as_object_mut()
            .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?
            .insert("config_version".to_string(), serde_json::Value::Number(1.into()));
        tracing::info!("migrated config v0 → v1");
    }

    Ok(json)
}

pub fn save_config(path: &Path, config: &PaperworkConfig) -> eyre::Result<()> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }

    // Always write the current version, regardless of what was loaded.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;

    let json = serde_json::to_string_pretty(&stamped)?;

    // Write to a temp file then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;
    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
