use eyre::Result;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::command::{self, Action};
use crate::dispatch::Dispatcher;
use crate::pretty;
use crate::store::ResultStore;

type InputLines = Lines<BufReader<Stdin>>;

enum Flow {
    Continue,
    Exit,
}

/// The read-eval loop. Owns the prompt and shutdown; scans never block it,
/// they only share the result store and the console.
pub struct Repl {
    dispatcher: Dispatcher,
    store: Arc<ResultStore>,
    drain_grace: Duration,
}

impl Repl {
    pub fn new(dispatcher: Dispatcher, store: Arc<ResultStore>, drain_grace: Duration) -> Self {
        Self {
            dispatcher,
            store,
            drain_grace,
        }
    }

    pub async fn run(&self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            pretty::prompt();
            tokio::select! {
                line = lines.next_line() => {
                    match line? {
                        // end of input
                        None => break,
                        Some(text) => {
                            if matches!(self.handle(&text, &mut lines).await?, Flow::Exit) {
                                break;
                            }
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    println!();
                    if confirm("Really exit?", &mut lines).await? {
                        break;
                    }
                }
            }
        }

        if !self.store.is_empty() {
            println!("Session summary: {} scans performed", self.store.len());
        }
        log::info!("[repl] session_ended: scans={}", self.store.len());
        self.dispatcher.shutdown(self.drain_grace).await;
        Ok(())
    }

    async fn handle(&self, line: &str, lines: &mut InputLines) -> Result<Flow> {
        match command::interpret(line) {
            Action::Nothing => {}
            Action::Help => pretty::print_help(),
            Action::Session => pretty::print_session(&self.store.summarize()),
            Action::Export => {
                export_session(&self.store);
            }
            Action::Clear => pretty::clear_and_banner(),
            Action::Exit => {
                if !self.store.is_empty() {
                    let save = confirm("Save session results before exiting?", lines).await?;
                    export_if_confirmed(&self.store, save);
                }
                return Ok(Flow::Exit);
            }
            Action::Scan(request) => self.dispatcher.dispatch(request),
            Action::Unknown(keyword) => {
                log::debug!("[repl] unknown_command: keyword={}", keyword);
                println!("unknown command: {keyword}");
                println!("type 'help' for available commands");
            }
            Action::MissingArgument(command) => {
                log::debug!(
                    "[repl] missing_argument: keyword={}",
                    command.keyword()
                );
                println!("missing target, usage: {}", command.usage());
            }
        }
        Ok(Flow::Continue)
    }
}

/// Export the ledger and report the artifact path. Persistence failures are
/// reported and the session continues.
fn export_session(store: &ResultStore) -> Option<PathBuf> {
    if store.is_empty() {
        println!("No results to export.");
        return None;
    }
    match store.export_all() {
        Ok(path) => {
            println!("Session exported to: {}", path.display());
            Some(path)
        }
        Err(e) => {
            log::error!("[repl] export_failed: error={}", e);
            println!("Error exporting session: {e}");
            None
        }
    }
}

/// Export-before-quit: only touches disk when the user confirmed.
fn export_if_confirmed(store: &ResultStore, confirmed: bool) -> Option<PathBuf> {
    if confirmed {
        export_session(store)
    } else {
        None
    }
}

async fn confirm(question: &str, lines: &mut InputLines) -> Result<bool> {
    print!("{question} [y/N] ");
    let _ = std::io::stdout().flush();
    let answer = lines.next_line().await?;
    Ok(answer.map(|a| is_affirmative(&a)).unwrap_or(false))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    )
}
