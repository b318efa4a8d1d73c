//! gcloud Defaults
//!
//! Reads the default project, region and zone from the environment and the
//! gcloud CLI configuration directory. These feed the ambient defaults used
//! during resolution.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

const PROJECT_ENV_VARS: &[&str] = &[
    "CLOUDSDK_CORE_PROJECT",
    "GOOGLE_CLOUD_PROJECT",
    "GCLOUD_PROJECT",
];
const ZONE_ENV_VAR: &str = "CLOUDSDK_COMPUTE_ZONE";
const REGION_ENV_VAR: &str = "CLOUDSDK_COMPUTE_REGION";

/// Get the gcloud configuration directory
pub fn get_gcloud_config_dir() -> Option<PathBuf> {
    // Check CLOUDSDK_CONFIG environment variable first
    if let Ok(path) = std::env::var("CLOUDSDK_CONFIG") {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir().map(|p| p.join("gcloud"))
}

/// Validate a GCP project ID format
/// Project IDs must be 6-30 characters, lowercase letters, digits, and hyphens
/// Must start with a letter and cannot end with a hyphen
pub fn validate_project_id(project: &str) -> bool {
    if project.len() < 6 || project.len() > 30 {
        return false;
    }

    match project.chars().next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }

    if project.ends_with('-') {
        return false;
    }

    project
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Region containing a zone: `us-central1-a` -> `us-central1`
pub fn region_of_zone(zone: &str) -> Option<String> {
    let (region, suffix) = zone.rsplit_once('-')?;
    if region.is_empty() || suffix.is_empty() || !region.contains('-') {
        return None;
    }
    Some(region.to_string())
}

/// Parsed gcloud properties (INI-style sections)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GcloudProperties {
    sections: HashMap<String, HashMap<String, String>>,
}

impl GcloudProperties {
    /// Parse a properties file. Keys before any section header belong to `core`.
    pub fn parse(content: &str) -> Self {
        let mut properties = Self::default();
        let mut section = "core".to_string();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                section = name.trim().to_string();
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                properties
                    .sections
                    .entry(section.clone())
                    .or_default()
                    .insert(key.trim().to_string(), value.trim().to_string());
            }
        }

        properties
    }

    /// Load installation properties overlaid with the active configuration
    pub fn load() -> Self {
        match get_gcloud_config_dir() {
            Some(dir) => Self::load_from(&dir),
            None => Self::default(),
        }
    }

    /// Load from a specific gcloud configuration directory
    pub fn load_from(config_dir: &Path) -> Self {
        let mut properties = std::fs::read_to_string(config_dir.join("properties"))
            .map(|content| Self::parse(&content))
            .unwrap_or_default();

        let Ok(active_config) = std::fs::read_to_string(config_dir.join("active_config")) else {
            return properties;
        };
        let config_name = active_config.trim();

        // Security: Validate config name to prevent path traversal
        if !config_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            tracing::warn!("Invalid characters in active_config name");
            return properties;
        }

        let config_path = config_dir
            .join("configurations")
            .join(format!("config_{}", config_name));

        if let Ok(content) = std::fs::read_to_string(&config_path) {
            tracing::debug!("Reading gcloud configuration {:?}", config_path);
            properties.merge(Self::parse(&content));
        }

        properties
    }

    /// Overlay `other` on top of these properties
    pub fn merge(&mut self, other: GcloudProperties) {
        for (section, values) in other.sections {
            self.sections.entry(section).or_default().extend(values);
        }
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|values| values.get(key))
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }
}

/// Defaults detected from the gcloud environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GcloudDefaults {
    pub project: Option<String>,
    pub region: Option<String>,
    pub zone: Option<String>,
}

impl GcloudDefaults {
    /// Detect from the process environment and gcloud configuration files
    pub fn detect() -> Self {
        Self::from_sources(|key| std::env::var(key).ok(), &GcloudProperties::load())
    }

    /// Environment variables take precedence over properties
    pub fn from_sources(env: impl Fn(&str) -> Option<String>, properties: &GcloudProperties) -> Self {
        let project = PROJECT_ENV_VARS
            .iter()
            .filter_map(|var| {
                let value = env(var)?;
                if validate_project_id(&value) {
                    Some(value)
                } else {
                    tracing::warn!("Invalid project ID format in {}", var);
                    None
                }
            })
            .next()
            .or_else(|| {
                let value = properties.get("core", "project")?;
                if validate_project_id(value) {
                    Some(value.to_string())
                } else {
                    tracing::warn!("Invalid project ID format in gcloud properties");
                    None
                }
            });

        let zone = env(ZONE_ENV_VAR)
            .filter(|z| !z.is_empty())
            .or_else(|| properties.get("compute", "zone").map(String::from));

        let region = env(REGION_ENV_VAR)
            .filter(|r| !r.is_empty())
            .or_else(|| properties.get("compute", "region").map(String::from));

        Self {
            project,
            region,
            zone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
# gcloud configuration
[core]
account = someone@example.com
project = my-project-42

[compute]
zone = europe-west1-b
; region left unset
"#;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_validate_project_id() {
        assert!(validate_project_id("my-proj"));
        assert!(!validate_project_id("short"));
        assert!(!validate_project_id("1starts-with-digit"));
        assert!(!validate_project_id("ends-with-hyphen-"));
        assert!(!validate_project_id("Upper-Case-Project"));
    }

    #[test]
    fn test_region_of_zone() {
        assert_eq!(region_of_zone("us-central1-a").as_deref(), Some("us-central1"));
        assert_eq!(
            region_of_zone("northamerica-northeast1-c").as_deref(),
            Some("northamerica-northeast1")
        );
        assert_eq!(region_of_zone("us-central1"), None);
        assert_eq!(region_of_zone("zone"), None);
    }

    #[test]
    fn test_parse_properties() {
        let props = GcloudProperties::parse(CONFIG);
        assert_eq!(props.get("core", "project"), Some("my-project-42"));
        assert_eq!(props.get("compute", "zone"), Some("europe-west1-b"));
        assert_eq!(props.get("compute", "region"), None);
    }

    #[test]
    fn test_sectionless_keys_are_core() {
        let props = GcloudProperties::parse("project = legacy-project\n");
        assert_eq!(props.get("core", "project"), Some("legacy-project"));
    }

    #[test]
    fn test_merge_overrides() {
        let mut base = GcloudProperties::parse("[compute]\nzone = a-b1-c\nregion = a-b1\n");
        base.merge(GcloudProperties::parse("[compute]\nzone = x-y1-z\n"));
        assert_eq!(base.get("compute", "zone"), Some("x-y1-z"));
        assert_eq!(base.get("compute", "region"), Some("a-b1"));
    }

    #[test]
    fn test_defaults_from_properties() {
        let defaults = GcloudDefaults::from_sources(no_env, &GcloudProperties::parse(CONFIG));
        assert_eq!(defaults.project.as_deref(), Some("my-project-42"));
        assert_eq!(defaults.zone.as_deref(), Some("europe-west1-b"));
        assert_eq!(defaults.region, None);
    }

    #[test]
    fn test_env_overrides_properties() {
        let env = |key: &str| match key {
            "GOOGLE_CLOUD_PROJECT" => Some("env-project".to_string()),
            "CLOUDSDK_COMPUTE_REGION" => Some("asia-east1".to_string()),
            _ => None,
        };
        let defaults = GcloudDefaults::from_sources(env, &GcloudProperties::parse(CONFIG));
        assert_eq!(defaults.project.as_deref(), Some("env-project"));
        assert_eq!(defaults.region.as_deref(), Some("asia-east1"));
        assert_eq!(defaults.zone.as_deref(), Some("europe-west1-b"));
    }

    #[test]
    fn test_invalid_env_project_skipped() {
        let env = |key: &str| match key {
            "CLOUDSDK_CORE_PROJECT" => Some("BAD".to_string()),
            _ => None,
        };
        let defaults = GcloudDefaults::from_sources(env, &GcloudProperties::parse(CONFIG));
        assert_eq!(defaults.project.as_deref(), Some("my-project-42"));
    }

    #[test]
    fn test_load_from_active_configuration() {
        let dir = std::env::temp_dir().join(format!("gcpref-gcloud-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("configurations")).unwrap();
        std::fs::write(dir.join("properties"), "[core]\nproject = install-project\n").unwrap();
        std::fs::write(dir.join("active_config"), "work\n").unwrap();
        std::fs::write(
            dir.join("configurations").join("config_work"),
            "[core]\nproject = work-project\n[compute]\nregion = us-west1\n",
        )
        .unwrap();

        let props = GcloudProperties::load_from(&dir);
        assert_eq!(props.get("core", "project"), Some("work-project"));
        assert_eq!(props.get("compute", "region"), Some("us-west1"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
