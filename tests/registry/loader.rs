use std::{fs, path::Path};

use moot::registry::load_catalog;
use tempfile::TempDir;

fn write_agent(agents_dir: &Path, owner: &str, agent_yml: &str, prompt_md: Option<&str>) {
    let dir = agents_dir.join(owner);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("agent.yml"), agent_yml).unwrap();
    if let Some(prompt) = prompt_md {
        fs::write(dir.join("prompt.md"), prompt).unwrap();
    }
}

#[test]
fn loads_agents_with_prompts_and_strips_front_matter() {
    let tmp = TempDir::new().unwrap();
    let agents_dir = tmp.path().join("agents");
    write_agent(
        &agents_dir,
        "moderator",
        "name: moderator\nowner: moderator\ndescription: triage and flow control\nrepository: moot-labs/agents\n",
        Some("---\nagent: moderator\ndescription: test\n---\n# Moderator\nv1"),
    );

    let catalog = load_catalog(&agents_dir, false).unwrap();
    assert_eq!(catalog.len(), 1);

    let spec = catalog.get("moderator").expect("moderator present");
    assert_eq!(spec.description, "triage and flow control");
    assert!(spec.prompt.contains("v1"));
    assert!(!spec.prompt.starts_with("---"));
}

#[test]
fn username_is_accepted_as_owner_spelling() {
    let tmp = TempDir::new().unwrap();
    let agents_dir = tmp.path().join("agents");
    write_agent(
        &agents_dir,
        "deepdive",
        "name: deep-research\nusername: deepdive\ndescription: staged deep research\nmultistage: true\n",
        None,
    );

    let catalog = load_catalog(&agents_dir, false).unwrap();
    let spec = catalog.get("deepdive").expect("deepdive present");
    assert!(spec.multistage);
    assert_eq!(spec.prompt, "");
}

#[test]
fn disabled_agents_are_excluded_unless_requested() {
    let tmp = TempDir::new().unwrap();
    let agents_dir = tmp.path().join("agents");
    write_agent(
        &agents_dir,
        "dormant",
        "owner: dormant\ndescription: off\nenabled: false\n",
        None,
    );

    let without = load_catalog(&agents_dir, false).unwrap();
    assert!(!without.contains("dormant"));

    let with = load_catalog(&agents_dir, true).unwrap();
    assert!(with.contains("dormant"));
}

#[test]
fn broken_and_incomplete_definitions_are_skipped_not_fatal() {
    let tmp = TempDir::new().unwrap();
    let agents_dir = tmp.path().join("agents");
    write_agent(&agents_dir, "broken", "owner: [unclosed\n", None);
    write_agent(&agents_dir, "anonymous", "description: no owner key\n", None);
    write_agent(&agents_dir, "ok", "owner: ok\ndescription: fine\n", None);
    // Underscore-prefixed directories are infrastructure, not agents.
    fs::create_dir_all(agents_dir.join("_shared")).unwrap();
    fs::write(agents_dir.join("_shared").join("agent.yml"), "owner: nope\n").unwrap();
    // A directory without agent.yml is not a registration.
    fs::create_dir_all(agents_dir.join("empty")).unwrap();

    let catalog = load_catalog(&agents_dir, false).unwrap();
    assert_eq!(catalog.names(), vec!["ok".to_string()]);
}

#[test]
fn missing_agents_directory_is_an_empty_catalog() {
    let tmp = TempDir::new().unwrap();
    let catalog = load_catalog(&tmp.path().join("does-not-exist"), false).unwrap();
    assert!(catalog.is_empty());
}

#[test]
fn null_trigger_conditions_mean_auto_detect() {
    let tmp = TempDir::new().unwrap();
    let agents_dir = tmp.path().join("agents");
    write_agent(
        &agents_dir,
        "observer",
        "owner: observer\ndescription: watches threads\ntrigger_conditions:\n",
        None,
    );

    let catalog = load_catalog(&agents_dir, false).unwrap();
    let spec = catalog.get("observer").expect("observer present");
    assert!(spec.trigger_conditions.is_none());
}
