use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use moot::{
    cli::{Cli, Command, ThreadArgs},
    config::Config,
    dispatch::{DispatchRouter, GhTrigger},
    identity::parse_agents_arg,
    logging::init_tracing,
    observer::{Observer, agent_matrix_markdown},
    pipeline::{ExecutionRequest, FanOutExecutor, ports::PromptRunnerPort},
    registry::RegistryCache,
    response::processor::ResponseProcessor,
    runner::HttpPromptRunner,
    surface::{GhIssueSurface, should_auto_close},
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(cli.config.as_deref())?;
    let logging_guard = init_tracing(&config.logging)?;
    info!(run_id = %logging_guard.run_id(), "moot started");

    match cli.command {
        Command::Execute(args) => {
            let agents = parse_agents_arg(&args.agents);
            anyhow::ensure!(!agents.is_empty(), "no agents given");
            run_agents(&config, &args.thread, agents).await
        }
        Command::Review(thread) => {
            let panel = vec![
                "moderator".to_string(),
                "reviewer_a".to_string(),
                "reviewer_b".to_string(),
                "summarizer".to_string(),
            ];
            run_agents(&config, &thread, panel).await
        }
        Command::Observe(thread) => run_observer(&config, &thread).await,
        Command::ListAgents => list_agents(&config),
    }
}

fn surface_for(config: &Config) -> GhIssueSurface {
    let mut surface = GhIssueSurface::new(
        config.mention_policy.clone(),
        config.surface.footer_max_mentions,
    );
    if !config.dispatch.repository.is_empty() {
        surface = surface.with_repository(config.dispatch.repository.clone());
    }
    surface
}

fn router_for(config: &Config) -> DispatchRouter {
    DispatchRouter::new(Arc::new(
        GhTrigger::new(config.dispatch.repository.clone())
            .with_workflow_file(config.dispatch.workflow_file.clone()),
    ))
}

/// Fill in thread fields from the tracker when the caller gave no context.
async fn resolve_thread(config: &Config, thread: &ThreadArgs) -> ThreadArgs {
    if !thread.context.is_empty() {
        return clone_thread(thread);
    }
    match surface_for(config).issue_info(thread.issue).await {
        Ok(info) => ThreadArgs {
            issue: thread.issue,
            context: info.body,
            title: info.title,
            comments: info.comments,
            comment_count: info.comment_count,
            post: thread.post,
        },
        Err(err) => {
            tracing::warn!(issue = thread.issue, error = %err, "could not fetch issue info");
            clone_thread(thread)
        }
    }
}

fn clone_thread(thread: &ThreadArgs) -> ThreadArgs {
    ThreadArgs {
        issue: thread.issue,
        context: thread.context.clone(),
        title: thread.title.clone(),
        comments: thread.comments.clone(),
        comment_count: thread.comment_count,
        post: thread.post,
    }
}

/// Assemble the context text handed to every agent.
fn build_context(thread: &ThreadArgs) -> String {
    let mut context = String::new();
    if !thread.context.is_empty() {
        context = format!(
            "**Issue title**: {}\n\n**Issue body**:\n{}",
            thread.title, thread.context
        );
    }
    if thread.comment_count > 0 && !thread.comments.is_empty() {
        context.push_str(&format!(
            "\n\n**This issue has {} historical comments; read them carefully:**\n\n{}",
            thread.comment_count, thread.comments
        ));
    }
    // The workflow that invoked us may forward the comment that triggered it.
    if let Ok(trigger) = std::env::var("MOOT_TRIGGER_COMMENT") {
        if !trigger.is_empty() {
            context.push_str(&format!("\n\n**Trigger comment**:\n{trigger}"));
        }
    }
    context
}

async fn run_agents(config: &Config, thread: &ThreadArgs, agents: Vec<String>) -> Result<()> {
    let thread = resolve_thread(config, thread).await;

    let cache = RegistryCache::new(&config.registry.agents_dir);
    let catalog = cache.catalog().context("failed to load agent registry")?;
    let runner: Arc<dyn PromptRunnerPort> = Arc::new(HttpPromptRunner::new(config.runner.clone()));

    let executor = FanOutExecutor::new(runner, Arc::clone(&catalog))
        .with_multistage(config.runner.multistage_enabled);
    let request = ExecutionRequest::new(
        thread.issue,
        agents,
        build_context(&thread),
        thread.comment_count,
    );
    let results = executor.run_all(&request).await;

    let processor = ResponseProcessor::new(config.mention_policy.clone(), router_for(config));
    let surface = surface_for(config);

    for (agent, result) in &results {
        println!("\n=== {agent} result ===");
        println!("{}", result.response);

        if !result.ok {
            // Failures stay off the thread unless explicitly enabled, to
            // avoid spamming it with guardrail noise.
            if thread.post && config.surface.post_failure_comment {
                let posted = surface
                    .post_comment(thread.issue, &result.failure_summary(), None)
                    .await;
                println!(
                    "{} failure summary for {agent}",
                    if posted { "posted" } else { "failed to post" }
                );
            }
            continue;
        }

        let processed = processor
            .process(
                agent,
                &result.response,
                thread.issue,
                &thread.title,
                &thread.context,
                thread.post,
            )
            .await;

        if thread.post {
            let posted = surface
                .post_comment(
                    thread.issue,
                    &processed.clean_response,
                    Some(&processed.allowed_mentions),
                )
                .await;
            println!(
                "{} {agent} response to issue #{}",
                if posted { "posted" } else { "failed to post" },
                thread.issue
            );

            if should_auto_close(&result.response, agent) && surface.close_issue(thread.issue).await
            {
                println!("issue #{} closed", thread.issue);
            }
        }
    }

    Ok(())
}

async fn run_observer(config: &Config, thread: &ThreadArgs) -> Result<()> {
    let thread = resolve_thread(config, thread).await;

    let cache = RegistryCache::new(&config.registry.agents_dir);
    let catalog = cache.catalog().context("failed to load agent registry")?;
    let runner: Arc<dyn PromptRunnerPort> = Arc::new(HttpPromptRunner::new(config.runner.clone()));

    let observer = Observer::new(runner, catalog);
    let decision = observer
        .analyze(thread.issue, &thread.title, &thread.context, &thread.comments)
        .await
        .map_err(|err| anyhow::anyhow!("observer run failed: {err}"))?;

    println!("\n=== Observer analysis for issue #{} ===", thread.issue);
    println!("\nAnalysis:\n{}", or_na(&decision.analysis));
    println!("\nShould trigger: {}", decision.should_trigger);

    if decision.should_trigger {
        println!("Agent: {}", or_na(&decision.agent));
        println!("Trigger comment: {}", or_na(&decision.comment));
        println!("Reason: {}", or_na(&decision.reason));

        if thread.post && !decision.comment.is_empty() {
            let posted = surface_for(config)
                .post_comment(thread.issue, &decision.comment, None)
                .await;
            println!(
                "{} trigger comment to issue #{}",
                if posted { "posted" } else { "failed to post" },
                thread.issue
            );
        }
    } else {
        println!("Skip reason: {}", or_na(&decision.reason));
    }

    Ok(())
}

fn or_na(value: &str) -> &str {
    if value.is_empty() { "N/A" } else { value }
}

fn list_agents(config: &Config) -> Result<()> {
    let cache = RegistryCache::new(&config.registry.agents_dir);
    let catalog = cache.catalog().context("failed to load agent registry")?;

    println!("\n=== Available agents ===\n");
    println!("{:<15} {:<50} Trigger conditions", "Agent", "Description");
    println!("{}", "-".repeat(100));
    for (name, spec) in catalog.iter() {
        let conditions = match &spec.trigger_conditions {
            Some(conditions) if !conditions.is_empty() => conditions.join(", "),
            _ => "auto-detect".to_string(),
        };
        let description: String = spec.description.chars().take(48).collect();
        let conditions: String = conditions.chars().take(40).collect();
        println!("{name:<15} {description:<50} {conditions}");
    }

    println!("\n\n=== Agent matrix (for the observer) ===\n");
    println!("{}", agent_matrix_markdown(&catalog));
    Ok(())
}
