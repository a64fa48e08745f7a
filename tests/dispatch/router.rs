use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use moot::dispatch::{
    DispatchError, DispatchMechanism, DispatchRouter, TriggerPort,
    error::command_failed, is_builtin_agent,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Workflow { agent: String, issue: u64 },
    Repository { agent: String, issue: u64, title: String, body: String },
}

/// Trigger double that records calls instead of shelling out.
struct RecordingTrigger {
    calls: Mutex<Vec<Call>>,
    fail: bool,
}

impl RecordingTrigger {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail,
        })
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TriggerPort for RecordingTrigger {
    async fn run_workflow(&self, agent: &str, issue: u64) -> Result<(), DispatchError> {
        self.calls.lock().unwrap().push(Call::Workflow {
            agent: agent.to_string(),
            issue,
        });
        if self.fail {
            Err(command_failed("workflow dispatch exited with 1"))
        } else {
            Ok(())
        }
    }

    async fn repository_dispatch(
        &self,
        agent: &str,
        issue: u64,
        title: &str,
        body: &str,
    ) -> Result<(), DispatchError> {
        self.calls.lock().unwrap().push(Call::Repository {
            agent: agent.to_string(),
            issue,
            title: title.to_string(),
            body: body.to_string(),
        });
        if self.fail {
            Err(command_failed("repository dispatch exited with 1"))
        } else {
            Ok(())
        }
    }
}

#[test]
fn builtin_classification_is_case_insensitive_and_closed() {
    assert!(is_builtin_agent("moderator"));
    assert!(is_builtin_agent("Moderator"));
    assert!(is_builtin_agent("SUMMARIZER"));
    assert!(is_builtin_agent("video_manim"));
    assert!(!is_builtin_agent("deepdive"));
    assert!(!is_builtin_agent(""));
}

#[tokio::test]
async fn builtin_agents_go_through_workflow_dispatch() {
    let trigger = RecordingTrigger::new(false);
    let router = DispatchRouter::new(Arc::clone(&trigger) as Arc<dyn TriggerPort>);

    let outcome = router.dispatch("moderator", 12, "title", "body").await;

    assert!(outcome.triggered);
    assert_eq!(outcome.mechanism, DispatchMechanism::Workflow);
    assert_eq!(outcome.target, "moderator");
    assert_eq!(
        trigger.calls(),
        vec![Call::Workflow {
            agent: "moderator".to_string(),
            issue: 12
        }]
    );
}

#[tokio::test]
async fn user_agents_carry_thread_context_through_repository_dispatch() {
    let trigger = RecordingTrigger::new(false);
    let router = DispatchRouter::new(Arc::clone(&trigger) as Arc<dyn TriggerPort>);

    let outcome = router
        .dispatch("deepdive", 34, "memory leak", "repro steps attached")
        .await;

    assert!(outcome.triggered);
    assert_eq!(outcome.mechanism, DispatchMechanism::Repository);
    assert_eq!(
        trigger.calls(),
        vec![Call::Repository {
            agent: "deepdive".to_string(),
            issue: 34,
            title: "memory leak".to_string(),
            body: "repro steps attached".to_string(),
        }]
    );
}

#[tokio::test]
async fn trigger_failure_reports_false_and_is_not_retried() {
    let trigger = RecordingTrigger::new(true);
    let router = DispatchRouter::new(Arc::clone(&trigger) as Arc<dyn TriggerPort>);

    let outcome = router.dispatch("moderator", 5, "t", "b").await;

    assert!(!outcome.triggered);
    assert_eq!(trigger.calls().len(), 1);

    let outcome = router.dispatch("someone_else", 5, "t", "b").await;
    assert!(!outcome.triggered);
    assert_eq!(trigger.calls().len(), 2);
}
