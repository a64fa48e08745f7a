//! Registry loading from `agents/<owner>/agent.yml`.
//!
//! A missing directory yields an empty catalog, not an error: a repository
//! without registered agents is a valid deployment. Individual files that
//! fail to parse are logged and skipped so one broken definition cannot take
//! the registry down.

use std::{fs, path::Path};

use tracing::{info, warn};

use crate::registry::{
    catalog::{AgentCatalog, AgentSpec},
    error::RegistryError,
};

const AGENT_FILE: &str = "agent.yml";
const PROMPT_FILE: &str = "prompt.md";

/// Load the catalog. Disabled entries are excluded unless requested.
pub fn load_catalog(agents_dir: &Path, include_disabled: bool) -> Result<AgentCatalog, RegistryError> {
    let mut catalog = AgentCatalog::default();

    if !agents_dir.exists() {
        warn!(dir = %agents_dir.display(), "agents directory not found");
        return Ok(catalog);
    }

    let entries = fs::read_dir(agents_dir).map_err(|source| RegistryError::DirUnreadable {
        path: agents_dir.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "failed to iterate agents directory entry");
                continue;
            }
        };
        let dir = entry.path();
        if !dir.is_dir() {
            continue;
        }
        let dir_name = entry.file_name();
        if dir_name.to_string_lossy().starts_with('_') {
            continue;
        }

        let agent_yml = dir.join(AGENT_FILE);
        if !agent_yml.exists() {
            continue;
        }

        let raw = match fs::read_to_string(&agent_yml) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(path = %agent_yml.display(), error = %err, "failed to read agent definition");
                continue;
            }
        };

        let mut spec: AgentSpec = match serde_yaml::from_str(&raw) {
            Ok(spec) => spec,
            Err(err) => {
                warn!(path = %agent_yml.display(), error = %err, "failed to parse agent definition");
                continue;
            }
        };

        if spec.owner.is_empty() {
            warn!(path = %agent_yml.display(), "agent definition missing 'owner' or 'username'");
            continue;
        }

        if !include_disabled && !spec.enabled {
            info!(agent = %spec.owner, "agent is disabled, skipping");
            continue;
        }

        spec.prompt = load_prompt(&dir.join(PROMPT_FILE));
        catalog.insert(spec);
    }

    Ok(catalog)
}

/// Read a prompt body, stripping any YAML front matter. Missing files mean an
/// empty prompt.
fn load_prompt(path: &Path) -> String {
    let Ok(raw) = fs::read_to_string(path) else {
        return String::new();
    };
    strip_front_matter(&raw).to_string()
}

fn strip_front_matter(raw: &str) -> &str {
    let Some(rest) = raw.strip_prefix("---") else {
        return raw;
    };
    match rest.find("\n---") {
        Some(end) => {
            let after = &rest[end + "\n---".len()..];
            after.trim_start_matches(['-']).trim_start_matches('\n')
        }
        None => raw,
    }
}
