//! Interactive terminal chat with command plugins.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings
//! a0
//!
//! # Specify a model and an OpenAI-compatible endpoint
//! a0 --model gpt-4o-mini --base-url http://localhost:8080/v1/
//!
//! # Disable colors (useful for piping output)
//! a0 --no-color
//! ```
//!
//! # Commands
//!
//! Input whose first word is a plugin command is handled by that plugin:
//! - `-c` copies the last response to the clipboard
//! - `-f <prompt>` asks for a bare code fix
//! - `-dbstore`, `-dbquery`, `-dbclear`, `-dbembed` manage the document store
//!
//! `exit` or `quit` leaves the session, as do Ctrl+C and Ctrl+D.
//!
//! Logging goes to stderr and is controlled by `A0_LOG` (default `warn`).

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use a0::chat::{
    ChatArgs, ChatConfig, ChatSession, Interrupt, LoopControl, PlainTextRenderer, Renderer,
    TerminalWidth,
};
use a0::plugin::builtin_plugins;
use a0::{CommandRegistry, OpenAi};

fn init_logging() {
    let filter = EnvFilter::try_from_env("A0_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

/// Main entry point for the a0 application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let (args, _) = ChatArgs::from_command_line_relaxed("a0 [OPTIONS]");
    let config = ChatConfig::from(args);
    let mut renderer = PlainTextRenderer::with_color(config.use_color);

    let client = OpenAi::with_options(None, config.base_url.clone(), None)?;
    let registry = CommandRegistry::discover(builtin_plugins(&config.plugin_paths()));
    let listing = registry
        .descriptors()
        .into_iter()
        .map(|d| (d.command().to_string(), d.handler().description().to_string()))
        .collect::<Vec<_>>();

    renderer.print_banner(&config.model.to_string());
    renderer.print_plugins(&listing);

    let mut session = ChatSession::new(client, config, registry);
    let mut rl = DefaultEditor::new()?;

    // On a terminal rustyline sees Ctrl+C at the prompt itself.  With piped
    // input the read blocks outside rustyline, so the handler leaves directly.
    let interrupt = Interrupt::new();
    let handler = interrupt.clone();
    ctrlc::set_handler(move || {
        if handler.is_streaming() {
            handler.trigger();
        } else {
            println!("\nGoodbye!");
            std::process::exit(0);
        }
    })?;

    loop {
        interrupt.reset();

        match rl.readline("You: ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                interrupt.set_streaming(true);
                let control = session
                    .process_input(line, &mut renderer, &TerminalWidth, &interrupt)
                    .await;
                interrupt.set_streaming(false);
                if control == LoopControl::Exit {
                    renderer.print_info("Goodbye!");
                    break;
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                renderer.print_info("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {err}"));
                break;
            }
        }
    }

    Ok(())
}
