//! Interactive chat application for talking with the CareMind companion.
//!
//! This binary provides a REPL interface over the CareMind backend. Replies
//! from the companion are revealed incrementally, like typing.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage against a local backend
//! caremind-chat
//!
//! # Point at a different backend
//! caremind-chat --url https://care.example.com/
//!
//! # Disable colors and typing animation (useful for piping output)
//! caremind-chat --no-color --no-typing
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/new` - Discard the conversation and start over
//! - `/stats` - Show session statistics
//! - `/logout` - Log out and clear the saved session
//! - `/quit` - Exit the application

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use time::OffsetDateTime;

use caremind::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, PlainTextRenderer, Renderer, SessionState,
    help_text, parse_command,
};
use caremind::{Backend, CareMind, Session, SessionStore, UserProfile};

/// Main entry point for the caremind-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("caremind-chat [OPTIONS]");
    let config = ChatConfig::from(args);
    let use_color = config.use_color;

    let store = SessionStore::new(config.store_path.clone());
    let mut renderer = PlainTextRenderer::with_color(use_color);
    let mut rl = DefaultEditor::new()?;

    // Flag for interrupt handling during the reveal animation
    let interrupted = Arc::new(AtomicBool::new(false));

    // Set up Ctrl+C handler
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    let saved = store.load();
    let client = if saved.is_authenticated() {
        CareMind::with_token(Some(config.base_url.clone()), saved.token.clone())?
    } else {
        login(&config, &store, &mut rl, &mut renderer).await?
    };

    let display_name = store
        .load()
        .user
        .as_ref()
        .map(|user| user.display_name().to_string())
        .unwrap_or_else(|| "there".to_string());

    let mut session = ChatSession::with_policy(client, store, config.reveal.clone());

    renderer.print_meta(&format!("CareMind - welcome, {display_name}"));
    renderer.print_meta("Type /help for commands, /quit to exit\n");

    companion_label();
    if let Err(err) = session.start(&mut renderer, interrupted.clone()).await {
        if err.is_unauthorized() {
            renderer.print_error("Your session has expired. Please log in again.");
            return Ok(());
        }
        renderer.print_error(&err.to_string());
    }

    loop {
        // Reset interrupt flag before each input
        interrupted.store(false, Ordering::Relaxed);

        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                // Check for slash commands
                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Take care!");
                            break;
                        }
                        ChatCommand::New => {
                            companion_label();
                            match session.reset(&mut renderer, interrupted.clone()).await {
                                Ok(true) => {}
                                Ok(false) => {
                                    renderer.print_info("Hold on, still working on a reply.")
                                }
                                Err(err) if err.is_unauthorized() => {
                                    renderer.print_error(
                                        "Your session has expired. Please log in again.",
                                    );
                                    break;
                                }
                                Err(err) => renderer.print_error(&err.to_string()),
                            }
                        }
                        ChatCommand::Stats => {
                            print_stats(&session);
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Logout => {
                            session.logout().await;
                            renderer.print_info("Logged out.");
                            break;
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                // Regular message - send to the backend
                companion_label();
                if let Err(e) = session
                    .submit_user_text(line, &mut renderer, interrupted.clone())
                    .await
                {
                    if e.is_unauthorized() {
                        renderer.print_error("Your session has expired. Please log in again.");
                        break;
                    }
                    renderer.print_error(&e.to_string());
                }
                if session.state() == SessionState::Idle {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nTake care!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

/// Prompt for credentials until a login succeeds, then persist the session.
async fn login(
    config: &ChatConfig,
    store: &SessionStore,
    rl: &mut DefaultEditor,
    renderer: &mut PlainTextRenderer,
) -> Result<CareMind, Box<dyn std::error::Error>> {
    let mut client = CareMind::new(Some(config.base_url.clone()))?;

    loop {
        let email = rl.readline("Email: ")?;
        let email = email.trim();
        if email.is_empty() {
            continue;
        }
        let password = rl.readline("Password: ")?;

        match client.login(email, password.trim()).await {
            Ok(outcome) => {
                let profile = UserProfile::new(email, outcome.display_name.clone());
                store.save(&Session::new(outcome.token.clone(), profile));
                client.set_token(Some(outcome.token));
                // Ask the backend for a fresh conversation; not fatal if it
                // is unreachable here, start() falls back on its own.
                if let Err(err) = client.notify_login().await {
                    renderer.print_info(&format!("Note: could not reset server state: {err}"));
                }
                return Ok(client);
            }
            Err(err) if err.is_authentication() => {
                renderer.print_error("Login failed. Check your email and password.");
            }
            Err(err) => {
                renderer.print_error(&format!("Login failed: {err}"));
            }
        }
    }
}

/// Print the timestamped speaker label without a newline so the reveal
/// continues it.
fn companion_label() {
    let now = OffsetDateTime::now_utc();
    print!("[{}] Companion: ", caremind::utils::time::clock(&now));
    let _ = std::io::stdout().flush();
}

fn print_stats<B: Backend>(session: &ChatSession<B>) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Messages: {}", stats.message_count);
    println!("      Turns: {}", stats.turns);
    println!("      Resets: {}", stats.resets);
    println!(
        "      Logged in: {}",
        if stats.authenticated { "yes" } else { "no" }
    );
    println!("      State: {:?}", stats.state);
}
