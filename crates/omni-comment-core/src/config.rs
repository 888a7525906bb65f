//! Configuration types and loading.
//!
//! Defines [`CommentConfig`], loaded from `omni-comment.yml` in the calling
//! repository. The file is optional: an absent path yields defaults, while a
//! present-but-malformed file is a configuration error surfaced before any
//! network call. All fields use snake_case to match YAML conventions.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CoreError;

/// Comment defaults loaded from `omni-comment.yml`.
///
/// # Examples
///
/// ```
/// use omni_comment_core::CommentConfig;
///
/// let yaml = r###"
/// preamble: "## CI results"
/// default_collapsed: true
/// sections:
///   lint:
///     title: "Lint"
///     collapsed: false
/// "###;
///
/// let config: CommentConfig = serde_yaml::from_str(yaml).unwrap();
/// assert_eq!(config.preamble.as_deref(), Some("## CI results"));
/// assert_eq!(config.sections["lint"].title.as_deref(), Some("Lint"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentConfig {
    /// Banner text placed between the signature marker and the first
    /// fragment when the managed comment is first created. Existing
    /// comments keep whatever banner bytes they already carry.
    pub preamble: Option<String>,

    /// Title applied to any section whose invocation did not supply one.
    pub default_title: Option<String>,

    /// Collapsed default for any section whose invocation did not decide.
    pub default_collapsed: Option<bool>,

    /// Per-section overrides keyed by section id.
    pub sections: HashMap<String, SectionDefaults>,
}

/// Per-section title/collapsed defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionDefaults {
    /// Title for this section when the invocation did not supply one.
    pub title: Option<String>,

    /// Collapsed default for this section.
    pub collapsed: Option<bool>,
}

impl CommentConfig {
    /// Loads configuration from the given YAML file path.
    ///
    /// An absent file is not an error; CI jobs are not required to ship a
    /// config at all.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Config` if the file exists but cannot be read or
    /// contains invalid YAML.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file; using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("Cannot read config at {}: {e}", path.display()))
        })?;
        serde_yaml::from_str(&content).map_err(|e| {
            CoreError::Config(format!("Invalid YAML in config at {}: {e}", path.display()))
        })
    }

    /// Resolves the effective title for a section.
    ///
    /// Precedence: the invocation's own title, then the per-section config
    /// entry, then the global default.
    pub fn resolve_title(&self, section_id: &str, requested: Option<&str>) -> Option<String> {
        requested
            .map(String::from)
            .or_else(|| {
                self.sections
                    .get(section_id)
                    .and_then(|s| s.title.clone())
            })
            .or_else(|| self.default_title.clone())
    }

    /// Resolves the effective collapsed flag for a section.
    ///
    /// Precedence: the invocation's own flag, then the per-section config
    /// entry, then the global default, then `false`.
    pub fn resolve_collapsed(&self, section_id: &str, requested: Option<bool>) -> bool {
        requested
            .or_else(|| self.sections.get(section_id).and_then(|s| s.collapsed))
            .or(self.default_collapsed)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_default_to_empty_config() {
        let config = CommentConfig::default();
        assert!(config.preamble.is_none());
        assert!(config.default_title.is_none());
        assert!(config.default_collapsed.is_none());
        assert!(config.sections.is_empty());
    }

    #[test]
    fn test_should_deserialize_full_config() {
        let yaml = r#"
preamble: |
  ## CI results
default_title: "Job output"
default_collapsed: true
sections:
  lint:
    title: "Lint"
    collapsed: false
  tests:
    title: "Tests"
"#;
        let config: CommentConfig = serde_yaml::from_str(yaml).expect("deserialize");
        assert!(config.preamble.as_deref().unwrap().contains("## CI results"));
        assert_eq!(config.default_title.as_deref(), Some("Job output"));
        assert_eq!(config.default_collapsed, Some(true));
        assert_eq!(config.sections.len(), 2);
        assert_eq!(config.sections["lint"].collapsed, Some(false));
        assert!(config.sections["tests"].collapsed.is_none());
    }

    #[test]
    fn test_should_load_defaults_when_file_is_absent() {
        let config =
            CommentConfig::load(Path::new("/nonexistent/omni-comment.yml")).expect("load");
        assert!(config.preamble.is_none());
        assert!(config.sections.is_empty());
    }

    #[test]
    fn test_should_load_config_from_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("omni-comment.yml");
        std::fs::write(&path, "preamble: \"## Results\"\ndefault_collapsed: true\n")
            .expect("write config");

        let config = CommentConfig::load(&path).expect("load");
        assert_eq!(config.preamble.as_deref(), Some("## Results"));
        assert_eq!(config.default_collapsed, Some(true));
    }

    #[test]
    fn test_should_error_on_malformed_config_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("omni-comment.yml");
        std::fs::write(&path, "preamble: [unclosed\n").expect("write config");

        let err = CommentConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid YAML"));
    }

    #[test]
    fn test_should_round_trip_yaml() {
        let config = CommentConfig {
            preamble: Some("banner".into()),
            default_title: None,
            default_collapsed: Some(false),
            sections: HashMap::from([(
                "lint".to_string(),
                SectionDefaults {
                    title: Some("Lint".into()),
                    collapsed: None,
                },
            )]),
        };
        let yaml = serde_yaml::to_string(&config).expect("serialize");
        let loaded: CommentConfig = serde_yaml::from_str(&yaml).expect("deserialize");
        assert_eq!(loaded.preamble.as_deref(), Some("banner"));
        assert_eq!(loaded.sections["lint"].title.as_deref(), Some("Lint"));
    }

    // ── resolve_* ───────────────────────────────────────────────────

    #[test]
    fn test_should_prefer_requested_title_over_config() {
        let mut config = CommentConfig::default();
        config.default_title = Some("global".into());
        config.sections.insert(
            "lint".into(),
            SectionDefaults {
                title: Some("per-section".into()),
                collapsed: None,
            },
        );
        assert_eq!(
            config.resolve_title("lint", Some("requested")).as_deref(),
            Some("requested"),
        );
    }

    #[test]
    fn test_should_fall_back_to_section_then_global_title() {
        let mut config = CommentConfig::default();
        config.default_title = Some("global".into());
        config.sections.insert(
            "lint".into(),
            SectionDefaults {
                title: Some("per-section".into()),
                collapsed: None,
            },
        );
        assert_eq!(config.resolve_title("lint", None).as_deref(), Some("per-section"));
        assert_eq!(config.resolve_title("tests", None).as_deref(), Some("global"));
    }

    #[test]
    fn test_should_resolve_title_to_none_without_any_default() {
        let config = CommentConfig::default();
        assert!(config.resolve_title("lint", None).is_none());
    }

    #[test]
    fn test_should_resolve_collapsed_with_request_over_config() {
        let mut config = CommentConfig::default();
        config.default_collapsed = Some(true);
        assert!(!config.resolve_collapsed("lint", Some(false)));
        assert!(config.resolve_collapsed("lint", None));
    }

    #[test]
    fn test_should_resolve_collapsed_from_section_config() {
        let mut config = CommentConfig::default();
        config.default_collapsed = Some(false);
        config.sections.insert(
            "tests".into(),
            SectionDefaults {
                title: None,
                collapsed: Some(true),
            },
        );
        assert!(config.resolve_collapsed("tests", None));
        assert!(!config.resolve_collapsed("lint", None));
    }

    #[test]
    fn test_should_default_collapsed_to_false() {
        let config = CommentConfig::default();
        assert!(!config.resolve_collapsed("lint", None));
    }
}
