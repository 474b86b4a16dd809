//! An interactive chat client for a hosted completion API, with multiple
//! named conversation threads.

#[macro_use]
extern crate tracing;

mod seed;

use std::env;
use std::io::Write as _;
use std::time::Duration;

use companion_core::conversation::ChatRole;
use companion_core::{Session, SessionBuilder, Snapshot};
use companion_openrouter_model::{OpenRouterConfigBuilder, OpenRouterProvider};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt};
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::sleep;

enum UiEvent {
    Idle,
    Message {
        conversation_id: String,
        role: ChatRole,
        content: String,
    },
}

enum CommandOutcome {
    Continue,
    Quit,
}

const BAR_CHAR: &str = "▎";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let api_key = env::var("OPENROUTER_API_KEY").unwrap_or_default();
    if api_key.is_empty() {
        // Deliberately not fatal: the missing credential surfaces as an
        // assistant reply on the first submission.
        warn!("OPENROUTER_API_KEY is not set, submissions will fail");
    }
    let mut config = OpenRouterConfigBuilder::with_api_key(api_key);
    if let Ok(model) = env::var("OPENROUTER_MODEL") {
        config = config.with_model(model);
    }
    if let Ok(base_url) = env::var("OPENROUTER_BASE_URL") {
        config = config.with_base_url(base_url);
    }
    let provider = OpenRouterProvider::new(config.build());

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let session = SessionBuilder::with_completion_provider(provider)
        .with_system_prompt(include_str!("./system_prompt.md"))
        .with_conversations(seed::conversations())
        .on_message({
            let event_tx = event_tx.clone();
            move |conversation_id, message| {
                event_tx
                    .send(UiEvent::Message {
                        conversation_id: conversation_id.to_owned(),
                        role: message.role(),
                        content: message.content().to_owned(),
                    })
                    .ok();
            }
        })
        .on_idle({
            let event_tx = event_tx.clone();
            move || {
                event_tx.send(UiEvent::Idle).ok();
            }
        })
        .build();

    let mut active_id = {
        let snapshot = session.snapshot().await;
        print_threads(&snapshot);
        snapshot.active_id
    };

    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    'outer: loop {
        print!("{active_id} > ");
        std::io::stdout().flush().unwrap();

        let Some(line) = read_line().await else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            match handle_command(command, &session).await {
                CommandOutcome::Continue => {
                    active_id = session.snapshot().await.active_id;
                    continue;
                }
                CommandOutcome::Quit => break,
            }
        }

        session.submit(line);

        let mut progress_bar = None;

        loop {
            // Create a new progress bar if it has been finished.
            progress_bar
                .get_or_insert_with(|| {
                    let progress_bar = ProgressBar::new_spinner();
                    progress_bar.set_style(progress_style.clone());
                    progress_bar.set_message("Typing...");
                    progress_bar
                })
                .inc(1);

            let sleep = sleep(Duration::from_millis(100));
            let event = select! {
                event = event_rx.recv() => {
                    let Some(event) = event else {
                        break 'outer;
                    };
                    event
                },
                _ = sleep => {
                    continue;
                }
            };

            // Finish the progress bar before printing anything else.
            if let Some(progress_bar) = &progress_bar {
                progress_bar.finish_and_clear();
            }
            progress_bar = None;

            match event {
                UiEvent::Message {
                    conversation_id,
                    role,
                    content,
                } => {
                    if role == ChatRole::Assistant {
                        print_reply(&conversation_id, &active_id, &content);
                    }
                }
                UiEvent::Idle => {
                    break;
                }
            }
        }
    }
}

fn print_reply(conversation_id: &str, active_id: &str, content: &str) {
    if conversation_id == active_id {
        println!("{}{}", BAR_CHAR.bright_cyan(), content.bright_white());
    } else {
        // A reply that settled after the user switched away still lands
        // in its own thread.
        println!(
            "{}{} {}",
            BAR_CHAR.bright_magenta(),
            format!("(in {conversation_id})").dimmed(),
            content.bright_white()
        );
    }
}

fn print_threads(snapshot: &Snapshot) {
    println!("{}", "Threads:".bold());
    for conversation in &snapshot.conversations {
        let marker = if conversation.id() == snapshot.active_id {
            "*"
        } else {
            " "
        };
        let mut badges = String::new();
        if conversation.pinned() {
            badges.push_str(" [pinned]");
        }
        if conversation.unread() > 0 {
            badges.push_str(&format!(" ({} new)", conversation.unread()));
        }
        println!(
            "{marker} {} {} ({}){badges}",
            conversation.id().bold(),
            conversation.title(),
            conversation.timestamp().dimmed(),
        );
    }
}

fn print_transcript(snapshot: &Snapshot) {
    let Some(conversation) = snapshot
        .conversations
        .iter()
        .find(|c| c.id() == snapshot.active_id)
    else {
        return;
    };
    println!(
        "{} {}",
        conversation.title().bold(),
        conversation.description().dimmed()
    );
    for message in conversation.messages() {
        match message.role() {
            ChatRole::User => {
                println!(
                    "{}{}",
                    BAR_CHAR.bright_yellow(),
                    message.content()
                );
            }
            ChatRole::Assistant => {
                println!(
                    "{}{}",
                    BAR_CHAR.bright_cyan(),
                    message.content().bright_white()
                );
            }
        }
    }
}

async fn handle_command(command: &str, session: &Session) -> CommandOutcome {
    let mut parts = command.split_whitespace();
    match parts.next() {
        Some("threads") => {
            print_threads(&session.snapshot().await);
        }
        Some("switch") => {
            let Some(id) = parts.next() else {
                println!("usage: /switch <thread-id>");
                return CommandOutcome::Continue;
            };
            session.select_conversation(id);
            let snapshot = session.snapshot().await;
            if snapshot.active_id == id {
                print_transcript(&snapshot);
            } else {
                println!("unknown thread: {id}");
            }
        }
        Some("quit") | Some("q") => return CommandOutcome::Quit,
        _ => {
            println!("commands: /threads, /switch <thread-id>, /quit");
        }
    }
    CommandOutcome::Continue
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
