//! Interactive chat for local reasoning models.
//!
//! This binary provides a full-screen REPL that streams responses from a
//! llama-server-compatible endpoint, hiding the model's thinking until the
//! answer begins.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings
//! thinker-chat
//!
//! # Specify a model and sampling parameters
//! thinker-chat --model qwen3-30b --temp 0.2 --seed 42
//!
//! # Point at a different server
//! thinker-chat --endpoint http://127.0.0.1:9090
//! ```
//!
//! # Commands
//!
//! While chatting:
//! - `q` or `quit` - exit the session
//! - `/clear` - wipe the conversation and replay the start screen
//! - Ctrl-D - exit the session

use std::io::{self, Write};
use std::sync::Arc;

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use thinker::chat::{ChatArgs, ChatConfig, ChatInput, ChatSession, classify_input, interrupt_cleanup};
use thinker::client::ModelServer;
use thinker::progress::ProgressIndicator;
use thinker::screen;

/// Main entry point for the thinker-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("thinker-chat [OPTIONS]");
    let config = ChatConfig::from(args);

    // Probe the server before any terminal-mode change so a dead server is
    // reported on the normal screen.
    let server = ModelServer::new(&config)?;
    println!("Loading model {} via {}...", config.model, server.endpoint());
    if let Err(err) = server.ensure_ready().await {
        eprintln!("{err}");
        eprintln!("Please ensure the model server is running and the model path is correct.");
        std::process::exit(1);
    }
    println!("Model loaded successfully.");

    let indicator = Arc::new(ProgressIndicator::new());

    // Registered before the screen switch so an interrupt in between cannot
    // strand the terminal in the alternate buffer. Restoring while the
    // normal buffer is active is a no-op.
    let handler_indicator = Arc::clone(&indicator);
    ctrlc::set_handler(move || {
        println!("Caught interrupt, stopping generation...");
        interrupt_cleanup(&handler_indicator);
        std::process::exit(0);
    })?;

    // From here on the terminal is in the alternate buffer; the guard, the
    // panic hook, and the interrupt handler all release it.
    let _screen = screen::enter()?;

    let mut session = ChatSession::new(server, Arc::clone(&indicator));
    let mut rl = DefaultEditor::new()?;

    play_start_screen(&config)?;

    loop {
        match rl.readline(">> ") {
            Ok(line) => match classify_input(&line) {
                ChatInput::Empty => continue,
                ChatInput::Quit => {
                    println!("Exiting chat.");
                    break;
                }
                ChatInput::Clear => {
                    session.clear();
                    screen::clear_and_home()?;
                    play_start_screen(&config)?;
                }
                ChatInput::Prompt(text) => {
                    let _ = rl.add_history_entry(text);
                    let mut out = io::stdout();
                    session.run_turn(text, &mut out).await?;
                }
            },
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at the prompt: rustyline's raw mode consumes the
                // signal, so this is the interrupt path while not generating.
                println!("\nCaught interrupt, stopping generation...");
                break;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit.
                println!("\nExiting.");
                break;
            }
            Err(err) => {
                eprintln!("Input error: {err}");
                break;
            }
        }
    }

    Ok(())
}

/// The banner animation plus the session info block, shown at startup and
/// replayed by `/clear`.
fn play_start_screen(config: &ChatConfig) -> io::Result<()> {
    let mut out = io::stdout();
    thinker::banner::animate_banner(&mut out)?;
    thinker::banner::print_info(&mut out, config)?;
    out.flush()
}
