use anyhow::Context;
use codexplain::action::{ExplainAction, GenerateTestsAction, RefactorAction};
use codexplain::api::types::*;
use codexplain::api::ApiClient;
use codexplain::{paths, session};
use std::io::Read;
use std::path::Path;

pub async fn cmd_explain(
    client: &ApiClient,
    file: Option<&Path>,
    language: Option<String>,
) -> anyhow::Result<()> {
    let (code, language) = resolve_input(file, language)?;

    let action = ExplainAction::default();
    action
        .run(client, &ExplainRequest { code, language })
        .await;

    if let Some(err) = action.state.error() {
        anyhow::bail!(err);
    }
    let result = action
        .state
        .result()
        .context("explain finished without a result")?;

    println!("{}", result.explanation.trim_end());
    print_meta(
        &result.provider,
        result.placeholder,
        result.line_count,
        result.character_count,
    );
    Ok(())
}

pub async fn cmd_refactor(
    client: &ApiClient,
    file: Option<&Path>,
    language: Option<String>,
    goal: Option<String>,
) -> anyhow::Result<()> {
    let (code, language) = resolve_input(file, language)?;

    let action = RefactorAction::default();
    action
        .run(client, &RefactorRequest { code, language, goal })
        .await;

    if let Some(err) = action.state.error() {
        anyhow::bail!(err);
    }
    let result = action
        .state
        .result()
        .context("refactor finished without a result")?;

    println!("{}", result.refactored_code.trim_end());
    println!();
    println!("Explanation:");
    println!("{}", result.explanation.trim_end());
    if !result.improvements.is_empty() {
        println!();
        println!("Improvements:");
        for note in &result.improvements {
            println!("  - {note}");
        }
    }
    print_meta(
        &result.provider,
        result.placeholder,
        result.line_count,
        result.character_count,
    );
    Ok(())
}

pub async fn cmd_tests(
    client: &ApiClient,
    file: Option<&Path>,
    language: Option<String>,
    test_framework: Option<String>,
) -> anyhow::Result<()> {
    let (code, language) = resolve_input(file, language)?;

    let action = GenerateTestsAction::default();
    action
        .run(
            client,
            &GenerateTestsRequest {
                code,
                language,
                test_framework,
            },
        )
        .await;

    if let Some(err) = action.state.error() {
        anyhow::bail!(err);
    }
    let result = action
        .state
        .result()
        .context("test generation finished without a result")?;

    println!("{}", result.test_code.trim_end());
    println!();
    println!("Framework: {}", result.test_framework);
    if !result.test_cases.is_empty() {
        println!("Covers:");
        for case in &result.test_cases {
            println!("  - {case}");
        }
    }
    if let Some(setup) = result.setup_instructions.as_deref() {
        println!();
        println!("Setup:");
        println!("{}", setup.trim_end());
    }
    print_meta(
        &result.provider,
        result.placeholder,
        result.line_count,
        result.character_count,
    );
    Ok(())
}

pub async fn cmd_health(client: &ApiClient) -> anyhow::Result<()> {
    let health = client.health().await?;
    println!("status:      {}", health.status);
    println!("version:     {}", health.version);
    println!("api version: {}", health.api_version);
    println!("provider:    {}", health.ai_provider);
    println!("environment: {}", health.environment);
    println!("timestamp:   {}", health.timestamp);
    Ok(())
}

pub async fn cmd_ping(client: &ApiClient) -> anyhow::Result<()> {
    let ping = client.ping().await?;
    match ping.message {
        Some(msg) => println!("{}: {msg}", ping.status),
        None => println!("{}", ping.status),
    }
    Ok(())
}

pub fn cmd_reset() -> anyhow::Result<()> {
    let path = paths::session_path()?;
    session::clear(&path)?;
    println!("Session cleared.");
    Ok(())
}

/// Resolve the code to analyze: the given file, else stdin, else the saved
/// session. Whatever was resolved becomes the new saved session.
fn resolve_input(
    file: Option<&Path>,
    language: Option<String>,
) -> anyhow::Result<(String, Option<String>)> {
    let code = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read code from stdin")?;
            buf
        }
    };

    let session_path = paths::session_path()?;

    if code.trim().is_empty() {
        if let Some(saved) = session::load(&session_path)? {
            if !saved.code.trim().is_empty() {
                tracing::info!("no input given, restoring saved session");
                let language = language.or(saved.language.clone());
                return Ok((saved.code, language));
            }
        }
        // Let the action report the validation error uniformly.
        return Ok((code, language));
    }

    let session = session::Session {
        code: code.clone(),
        language: language.clone(),
    };
    if let Err(e) = session::save_atomic(&session_path, &session) {
        // Session persistence is best-effort; the request still proceeds.
        tracing::warn!(error = %e, "failed to save session");
    }

    Ok((code, language))
}

fn print_meta(provider: &str, placeholder: bool, line_count: u64, character_count: u64) {
    println!();
    if placeholder {
        println!("provider: {provider} (placeholder response, no AI backend)");
    } else {
        println!("provider: {provider}");
    }
    println!("input: {line_count} lines, {character_count} characters");
}
