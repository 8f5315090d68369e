//! AgriBot application binary - composition root.
//!
//! Ties the AgriBot crates together into one interactive chat executable:
//! 1. Load configuration from TOML
//! 2. Build the Gemini client, weather client, and the process-wide
//!    report store
//! 3. Wire the specialist set and the orchestrator
//! 4. Run the stdin chat loop

use std::io::{BufRead, Write};
use std::sync::Arc;

use clap::Parser;

use agribot_agents::{ReportStore, SpecialistSet};
use agribot_chat::{ChatError, Orchestrator};
use agribot_core::config::AgribotConfig;
use agribot_core::types::{ImageAttachment, Query};
use agribot_llm::{GeminiClient, LanguageModel};
use agribot_weather::WeatherClient;

mod cli;

use cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = AgribotConfig::load_or_default(&config_file);
    if let Some(level) = args.log_level.clone() {
        config.general.log_level = level;
    }
    if let Some(model) = args.model.clone() {
        config.llm.model = model;
    }

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.general.log_level.clone())),
        )
        .init();

    tracing::info!("Starting AgriBot v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Collaborators. A missing Gemini key is a startup error, not a per-call
    // surprise.
    let llm: Arc<dyn LanguageModel> = Arc::new(GeminiClient::from_config(&config.llm)?);
    let weather = Arc::new(WeatherClient::from_config(&config.weather));

    // The report store is process-wide: created once, shared by reference.
    let reports = Arc::new(ReportStore::new());

    let specialists = SpecialistSet::new(llm.clone(), weather, reports);
    let mut orchestrator = Orchestrator::new(llm, specialists);

    tracing::info!(model = %config.llm.model, "Specialists wired");

    print_welcome();
    chat_loop(&mut orchestrator).await;

    Ok(())
}

fn print_welcome() {
    println!("AgriBot — your farming assistant");
    println!("================================");
    println!("Ask me anything about farming. Try:");
    println!("  - 'My tomato leaves have spots'          (disease detection)");
    println!("  - 'What crops for red soil in Udaipur?'  (crop advice)");
    println!("  - 'Where to sell wheat in Punjab?'       (market info)");
    println!("  - 'Disease alerts in my area?'           (alert check)");
    println!();
    println!("Commands: /image <path> <question>, /report <crop> <disease> <location>,");
    println!("          /profile, /history, /stats, /clear, /quit");
    println!();
}

async fn chat_loop(orchestrator: &mut Orchestrator) {
    let stdin = std::io::stdin();
    loop {
        print!("You: ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "Failed to read input");
                break;
            }
        }
        let line = line.trim();
        if line.is_empty() {
            println!("Try asking about crops, diseases, markets, or alerts!");
            continue;
        }

        match line.split_whitespace().next() {
            Some("/quit") | Some("/exit") => {
                println!("Happy farming!");
                break;
            }
            Some("/profile") => print_profile(orchestrator),
            Some("/history") => print_history(orchestrator),
            Some("/stats") => {
                let stats = orchestrator.session_stats();
                println!(
                    "Queries: {}  |  Image analyses: {}",
                    stats.total_queries, stats.image_queries
                );
            }
            Some("/clear") => {
                orchestrator.clear_session();
                println!("Session cleared.");
            }
            Some("/report") => handle_report(orchestrator, line).await,
            Some("/image") => {
                if let Some(query) = parse_image_command(line) {
                    run_query(orchestrator, query).await;
                }
            }
            _ => run_query(orchestrator, Query::text(line)).await,
        }
    }
}

async fn run_query(orchestrator: &mut Orchestrator, query: Query) {
    match orchestrator.process(&query).await {
        Ok(reply) => {
            println!("\nAgriBot:\n{}\n", reply.response);
            println!(
                "[intent: {} | agents: {} | {}]",
                reply.intent,
                reply.agents_called.join(", "),
                chrono::Local::now().format("%H:%M:%S"),
            );
        }
        Err(ChatError::EmptyQuery) => {
            println!("Please enter a question or attach an image.");
        }
    }
}

async fn handle_report(orchestrator: &Orchestrator, line: &str) {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 4 {
        println!("Usage: /report <crop> <disease> <location>");
        return;
    }
    match orchestrator
        .specialists()
        .alert_system
        .submit_report(parts[1], parts[2], parts[3])
        .await
    {
        Ok(message) => println!("\nAgriBot:\n{message}\n"),
        Err(e) => println!("Could not generate the alert message: {e}"),
    }
}

/// Parse `/image <path> <question...>` into a query with the image attached.
fn parse_image_command(line: &str) -> Option<Query> {
    let rest = line.strip_prefix("/image").map(str::trim)?;
    let (path, text) = match rest.split_once(' ') {
        Some((path, text)) => (path, text.trim()),
        None if !rest.is_empty() => (rest, ""),
        None => {
            println!("Usage: /image <path> <question>");
            return None;
        }
    };

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            println!("Could not read image '{path}': {e}");
            return None;
        }
    };

    Some(Query::with_image(
        text,
        ImageAttachment {
            mime_type: mime_for_path(path).to_string(),
            bytes,
        },
    ))
}

fn mime_for_path(path: &str) -> &'static str {
    let lower = path.to_lowercase();
    if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else if lower.ends_with(".webp") {
        "image/webp"
    } else {
        "application/octet-stream"
    }
}

fn print_profile(orchestrator: &Orchestrator) {
    let profile = orchestrator.profile();
    if profile.location.is_none()
        && profile.current_crop.is_none()
        && profile.soil_type.is_none()
        && profile.interests.is_empty()
    {
        println!("No profile data yet. Start chatting to build your profile!");
        return;
    }
    if let Some(ref location) = profile.location {
        println!("Location: {location}");
    }
    if let Some(ref crop) = profile.current_crop {
        println!("Current crop: {crop}");
    }
    if let Some(ref soil) = profile.soil_type {
        println!("Soil type: {soil}");
    }
    if !profile.interests.is_empty() {
        println!("Interests:");
        for (task, count) in &profile.interests {
            println!("  - {}: {} queries", task.as_str(), count);
        }
    }
}

fn print_history(orchestrator: &Orchestrator) {
    let history = orchestrator.history();
    if history.is_empty() {
        println!("No conversation yet.");
        return;
    }
    for turn in history {
        let image_note = if turn.had_image { " [image]" } else { "" };
        println!(
            "[{}] You: {}{}",
            turn.timestamp.format("%H:%M:%S"),
            turn.user_input,
            image_note
        );
        println!("      -> {} via {}", turn.intent, turn.agents_called.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path("leaf.PNG"), "image/png");
        assert_eq!(mime_for_path("leaf.jpeg"), "image/jpeg");
        assert_eq!(mime_for_path("leaf.jpg"), "image/jpeg");
        assert_eq!(mime_for_path("leaf.webp"), "image/webp");
        assert_eq!(mime_for_path("leaf.bmp"), "application/octet-stream");
    }

    #[test]
    fn test_parse_image_command_missing_file() {
        assert!(parse_image_command("/image /nonexistent/leaf.jpg what is this").is_none());
    }
}
