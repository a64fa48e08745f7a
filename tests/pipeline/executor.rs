use std::sync::{Arc, Mutex};

use moot::{
    pipeline::{
        ExecutionRequest, FanOutExecutor, PromptError, PromptReply, UsageStats,
        error::PromptErrorKind,
        ports::PromptRequest,
        testing::{HookRunner, boxed},
    },
    registry::{AgentCatalog, AgentSpec},
};

fn spec(owner: &str, multistage: bool) -> AgentSpec {
    AgentSpec {
        name: owner.to_string(),
        owner: owner.to_string(),
        description: String::new(),
        repository: String::new(),
        enabled: true,
        trigger_conditions: None,
        multistage,
        prompt: format!("system prompt for {owner}"),
    }
}

fn ok_reply(text: &str) -> Result<PromptReply, PromptError> {
    Ok(PromptReply {
        response: text.to_string(),
        usage: UsageStats {
            cost_usd: 0.01,
            num_turns: 1,
            input_tokens: 5,
            output_tokens: 5,
            total_tokens: 10,
            tool_calls: Vec::new(),
        },
    })
}

/// Runner that fails for agents named `bad*` and records every request.
fn per_agent_runner() -> (Arc<HookRunner>, Arc<Mutex<Vec<PromptRequest>>>) {
    let seen: Arc<Mutex<Vec<PromptRequest>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_in_hook = Arc::clone(&seen);
    let runner = HookRunner::shared(Arc::new(move |req: PromptRequest| {
        seen_in_hook.lock().unwrap().push(req.clone());
        boxed(async move {
            if req.agent.starts_with("bad") {
                Err(PromptError::new(PromptErrorKind::Timeout, "deadline exceeded"))
            } else {
                ok_reply(&format!("[Agent: {}] done", req.agent))
            }
        })
    }));
    (runner, seen)
}

#[tokio::test]
async fn every_requested_agent_appears_exactly_once_even_on_failure() {
    let (runner, _) = per_agent_runner();
    let executor = FanOutExecutor::new(runner, Arc::new(AgentCatalog::default()));

    let agents = vec![
        "moderator".to_string(),
        "bad_actor".to_string(),
        "reviewer_a".to_string(),
    ];
    let request = ExecutionRequest::new(7, agents, "context", 0);
    let results = executor.run_all(&request).await;

    assert_eq!(results.len(), 3);
    assert!(results["moderator"].ok);
    assert!(results["reviewer_a"].ok);

    let failed = &results["bad_actor"];
    assert!(!failed.ok);
    assert_eq!(failed.failed_stage.as_deref(), Some("Single"));
    assert_eq!(failed.error_kind, Some(PromptErrorKind::Timeout));

    // Isolation: the failure did not leak into the siblings' results.
    assert!(results["moderator"].response.contains("moderator"));
    assert!(results["reviewer_a"].response.contains("reviewer_a"));
}

#[tokio::test]
async fn duplicate_agents_collapse_to_one_entry_and_one_run() {
    let (runner, seen) = per_agent_runner();
    let executor = FanOutExecutor::new(runner, Arc::new(AgentCatalog::default()));

    let agents = vec![
        "moderator".to_string(),
        "moderator".to_string(),
        "reviewer_a".to_string(),
    ];
    let request = ExecutionRequest::new(7, agents, "context", 0);
    let results = executor.run_all(&request).await;

    assert_eq!(results.len(), 2);
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn history_note_is_added_when_comments_exist() {
    let (runner, seen) = per_agent_runner();
    let executor = FanOutExecutor::new(runner, Arc::new(AgentCatalog::default()));

    let request = ExecutionRequest::new(3, vec!["moderator".to_string()], "context", 4);
    executor.run_all(&request).await;

    let requests = seen.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].prompt.contains("4 historical comments"));
    assert!(requests[0].prompt.contains("[Agent: moderator]"));

    drop(requests);
    let request = ExecutionRequest::new(3, vec!["reviewer_a".to_string()], "context", 0);
    executor.run_all(&request).await;
    let requests = seen.lock().unwrap();
    assert!(!requests[1].prompt.contains("historical comments"));
}

#[tokio::test]
async fn multistage_agents_take_the_staged_path() {
    let (runner, seen) = per_agent_runner();
    let mut catalog = AgentCatalog::default();
    catalog.insert(spec("deepdive", true));
    catalog.insert(spec("moderator", false));

    let executor = FanOutExecutor::new(runner, Arc::new(catalog));
    let agents = vec!["deepdive".to_string(), "moderator".to_string()];
    let request = ExecutionRequest::new(9, agents, "context", 0);
    let results = executor.run_all(&request).await;

    assert_eq!(results.len(), 2);

    let requests = seen.lock().unwrap();
    let deepdive_first = requests
        .iter()
        .find(|req| req.agent == "deepdive")
        .expect("deepdive ran");
    assert_eq!(deepdive_first.stage.as_deref(), Some("Researcher"));
    assert_eq!(deepdive_first.system_prompt, "system prompt for deepdive");

    let moderator = requests
        .iter()
        .find(|req| req.agent == "moderator")
        .expect("moderator ran");
    assert_eq!(moderator.stage, None);
}

#[tokio::test]
async fn multistage_kill_switch_forces_single_shot() {
    let (runner, seen) = per_agent_runner();
    let mut catalog = AgentCatalog::default();
    catalog.insert(spec("deepdive", true));

    let executor =
        FanOutExecutor::new(runner, Arc::new(catalog)).with_multistage(false);
    let request = ExecutionRequest::new(9, vec!["deepdive".to_string()], "context", 0);
    let results = executor.run_all(&request).await;

    assert!(results["deepdive"].ok);
    assert_eq!(results["deepdive"].stages, vec!["Single".to_string()]);

    let requests = seen.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].stage, None);
}
