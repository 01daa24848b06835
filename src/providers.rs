//! Profiles generated from other tools' local configuration.
//!
//! Each provider owns one variable (`AWS_PROFILE`, `DOCKER_CONTEXT`, ...) and
//! knows where its tool keeps the values that variable may take. Importing
//! turns every value into a profile named `<provider>:<value>`.

use crate::config::{validate_profile_name, EnvProfile, StoreSnapshot, Var};
use crate::error::{ImportError, SwitchError};
use crate::settings;
use clap::ValueEnum;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static AWS_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\[\s*([^\]\n]*?)\s*\]").expect("AWS_SECTION regex is valid"));
static TFENV_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+\.\d+\.\d+(?:-(?:alpha\d+|beta\d+|rc\d+|oci|alpha\d{8}))?$")
        .expect("TFENV_VERSION regex is valid")
});
static GOENV_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+\.\d+(?:\.\d+)?(?:beta\d+|rc\d+)?$").expect("GOENV_VERSION regex is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    /// Profiles in ~/.aws/config, as AWS_PROFILE
    Aws,
    /// Contexts in ~/.docker/contexts/meta, as DOCKER_CONTEXT
    DockerContext,
    /// Terraform versions installed by tfenv, as TFENV_TERRAFORM_VERSION
    Tfenv,
    /// Go versions installed by goenv, as GOENV_VERSION
    Goenv,
}

impl Provider {
    pub fn name(self) -> &'static str {
        match self {
            Provider::Aws => "aws",
            Provider::DockerContext => "docker-context",
            Provider::Tfenv => "tfenv",
            Provider::Goenv => "goenv",
        }
    }

    pub fn target_var(self) -> &'static str {
        match self {
            Provider::Aws => "AWS_PROFILE",
            Provider::DockerContext => "DOCKER_CONTEXT",
            Provider::Tfenv => "TFENV_TERRAFORM_VERSION",
            Provider::Goenv => "GOENV_VERSION",
        }
    }

    pub fn profile_name(self, value: &str) -> String {
        format!("{}:{value}", self.name())
    }

    /// Where the tool keeps its data. `AWS_CONFIG_FILE` is honored like the
    /// aws CLI does.
    pub fn default_source(self) -> Result<PathBuf, ImportError> {
        if self == Provider::Aws {
            if let Some(path) = std::env::var_os("AWS_CONFIG_FILE").filter(|v| !v.is_empty()) {
                return Ok(PathBuf::from(path));
            }
        }
        let home = settings::home_dir().ok_or(ImportError::NoSource {
            provider: self.name(),
        })?;
        Ok(match self {
            Provider::Aws => home.join(".aws").join("config"),
            Provider::DockerContext => home.join(".docker").join("contexts").join("meta"),
            Provider::Tfenv => home.join(".tfenv").join("versions"),
            Provider::Goenv => home.join(".goenv").join("versions"),
        })
    }

    /// Values found at `source`, without duplicates. AWS profiles keep file
    /// order; directory listings are sorted.
    pub fn read_values(self, source: &Path) -> Result<Vec<String>, ImportError> {
        let read_error = |err: io::Error| ImportError::Read {
            provider: self.name(),
            path: source.to_path_buf(),
            source: err,
        };

        let found = match self {
            Provider::Aws => parse_aws_profiles(&fs::read_to_string(source).map_err(read_error)?),
            Provider::DockerContext => read_docker_contexts(source).map_err(read_error)?,
            Provider::Tfenv => read_version_dirs(source, &TFENV_VERSION).map_err(read_error)?,
            Provider::Goenv => read_version_dirs(source, &GOENV_VERSION).map_err(read_error)?,
        };

        let values: Vec<String> = found
            .into_iter()
            .filter(|value| match validate_profile_name(&self.profile_name(value)) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("skipping {} entry: {e}", self.name());
                    false
                }
            })
            .collect();

        if values.is_empty() {
            return Err(ImportError::Empty {
                provider: self.name(),
                path: source.to_path_buf(),
            });
        }
        log::debug!(
            "found {} {} entries in {}",
            values.len(),
            self.name(),
            source.display()
        );
        Ok(values)
    }
}

/// Upsert one profile per value. A profile that already exists keeps its
/// other variables and position.
pub fn import_values(
    snapshot: &StoreSnapshot,
    provider: Provider,
    values: &[String],
) -> Result<StoreSnapshot, SwitchError> {
    let mut next = snapshot.clone();
    for value in values {
        let name = provider.profile_name(value);
        let mut profile = next
            .get_profile(&name)
            .cloned()
            .unwrap_or_else(|_| EnvProfile::new(&name));
        profile.set(Var::new(provider.target_var(), value))?;
        next = next.upsert_profile(profile)?;
    }
    Ok(next)
}

/// `[default]` and `[profile NAME]` sections. Other sections such as
/// `[sso-session ...]` are not profiles.
fn parse_aws_profiles(contents: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in AWS_SECTION.captures_iter(contents) {
        let section = &caps[1];
        let name = if section == "default" {
            section
        } else if let Some(rest) = section
            .strip_prefix("profile")
            .filter(|rest| rest.starts_with(char::is_whitespace))
        {
            rest.trim()
        } else {
            continue;
        };
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

#[derive(Debug, Deserialize)]
struct DockerContextMeta {
    #[serde(rename = "Name")]
    name: String,
}

fn read_docker_contexts(meta_dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(meta_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let meta_path = entry.path().join("meta.json");
        let text = match fs::read_to_string(&meta_path) {
            Ok(text) => text,
            Err(e) => {
                log::debug!("skipping {}: {e}", meta_path.display());
                continue;
            }
        };
        match serde_json::from_str::<DockerContextMeta>(&text) {
            Ok(meta) if !meta.name.is_empty() => names.push(meta.name),
            Ok(_) => {}
            Err(e) => log::debug!("skipping {}: {e}", meta_path.display()),
        }
    }
    names.sort();
    names.dedup();
    Ok(names)
}

fn read_version_dirs(dir: &Path, pattern: &Regex) -> io::Result<Vec<String>> {
    let mut versions = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        match entry.file_name().to_str() {
            Some(name) if pattern.is_match(name) => versions.push(name.to_string()),
            _ => log::debug!("ignoring {}", entry.path().display()),
        }
    }
    versions.sort();
    Ok(versions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ActiveProfile;
    use anyhow::Result;
    use tempfile::TempDir;

    fn make_dirs(root: &Path, names: &[&str]) -> Result<()> {
        for name in names {
            fs::create_dir_all(root.join(name))?;
        }
        Ok(())
    }

    #[test]
    fn aws_sections_become_profile_names() {
        let config = "\
[default]
region = eu-west-1

[profile staging]
region = us-east-1
# [profile commented]
[profile  prod-admin ]
[sso-session corp]
sso_start_url = https://example.awsapps.com/start
[profile staging]
[profileless]
";
        assert_eq!(
            parse_aws_profiles(config),
            vec!["default", "staging", "prod-admin"]
        );
        assert!(parse_aws_profiles("").is_empty());
    }

    #[test]
    fn tfenv_ignores_invalid_versions() -> Result<()> {
        let dir = TempDir::new()?;
        make_dirs(dir.path(), &["11.2.0", "0.1.0.100", "1.6.0-rc1", "latest"])?;
        fs::write(dir.path().join("1.5.0"), "not a directory")?;

        assert_eq!(
            Provider::Tfenv.read_values(dir.path())?,
            vec!["1.6.0-rc1", "11.2.0"]
        );
        Ok(())
    }

    #[test]
    fn goenv_ignores_invalid_versions() -> Result<()> {
        let dir = TempDir::new()?;
        make_dirs(dir.path(), &["1.18.0.100", "1.19.1", "1.20beta1", "1.20.0-beta1"])?;

        assert_eq!(
            Provider::Goenv.read_values(dir.path())?,
            vec!["1.19.1", "1.20beta1"]
        );
        Ok(())
    }

    #[test]
    fn docker_contexts_come_from_meta_files() -> Result<()> {
        let dir = TempDir::new()?;
        make_dirs(dir.path(), &["ctx-1", "ctx-2", "broken", "no-meta"])?;
        fs::write(dir.path().join("ctx-1").join("meta.json"), r#"{"Name":"remote"}"#)?;
        fs::write(
            dir.path().join("ctx-2").join("meta.json"),
            r#"{"Name":"colima","Metadata":{},"Endpoints":{}}"#,
        )?;
        fs::write(dir.path().join("broken").join("meta.json"), "{")?;

        assert_eq!(
            Provider::DockerContext.read_values(dir.path())?,
            vec!["colima", "remote"]
        );
        Ok(())
    }

    #[test]
    fn empty_and_missing_sources_are_errors() -> Result<()> {
        let dir = TempDir::new()?;
        assert!(matches!(
            Provider::Goenv.read_values(dir.path()),
            Err(ImportError::Empty { provider: "goenv", .. })
        ));
        assert!(matches!(
            Provider::Tfenv.read_values(&dir.path().join("missing")),
            Err(ImportError::Read { provider: "tfenv", .. })
        ));
        Ok(())
    }

    #[test]
    fn import_creates_and_updates_profiles() -> Result<()> {
        let mut existing = EnvProfile::new("aws:staging");
        existing.set(Var::new("AWS_REGION", "us-east-1"))?;
        existing.set(Var::new("AWS_PROFILE", "old"))?;
        let snapshot = StoreSnapshot {
            profiles: vec![existing],
            active: Some(ActiveProfile {
                name: "aws:staging".to_string(),
                injected: vec!["AWS_REGION".to_string(), "AWS_PROFILE".to_string()],
            }),
        };

        let values = vec!["staging".to_string(), "default".to_string()];
        let next = import_values(&snapshot, Provider::Aws, &values)?;

        assert_eq!(next.list_profiles(), vec!["aws:staging", "aws:default"]);
        let staging = next.get_profile("aws:staging")?;
        assert_eq!(staging.get("AWS_REGION"), Some("us-east-1"));
        assert_eq!(staging.get("AWS_PROFILE"), Some("staging"));
        assert_eq!(
            next.get_profile("aws:default")?.get("AWS_PROFILE"),
            Some("default")
        );
        assert_eq!(next.active, snapshot.active);
        Ok(())
    }
}
