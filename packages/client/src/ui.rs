//! Terminal input and prompt utilities for the client.

use std::io::Write;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;

/// Input prompt shown to the user.
pub const PROMPT: &str = "you> ";

/// Redisplay the prompt after printing asynchronous output
pub fn redisplay_prompt() {
    print!("{}", PROMPT);
    std::io::stdout().flush().ok();
}

/// Spawn the blocking readline thread.
///
/// Non-empty lines are trimmed and forwarded over the channel. The channel
/// closes when the user exits (Ctrl+C / Ctrl+D) or the receiver is dropped,
/// which is what tears the session loop down.
pub fn spawn_readline_thread(input_tx: mpsc::UnboundedSender<String>) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Receiver gone, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    })
}
