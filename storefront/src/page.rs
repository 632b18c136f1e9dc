//! Terminal rendition of the page chrome.
//!
//! Standard input is read on a dedicated thread and handed out line by line.
//! The interactive shell and the confirmation prompt share that feed, so a
//! prompt takes the next line the user types.

use rifa_core::environment::Page;
use std::io::BufRead;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Lines typed on standard input
#[derive(Clone, Debug)]
pub struct ConsoleInput {
    lines: Arc<Mutex<mpsc::Receiver<String>>>,
}

impl ConsoleInput {
    /// Start reading standard input
    #[must_use]
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel(16);
        std::thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
        });
        Self::from_receiver(rx)
    }

    /// Feed lines from an existing channel
    #[must_use]
    pub fn from_receiver(rx: mpsc::Receiver<String>) -> Self {
        Self {
            lines: Arc::new(Mutex::new(rx)),
        }
    }

    /// Next line; `None` once input is closed
    pub async fn next_line(&self) -> Option<String> {
        self.lines.lock().await.recv().await
    }

    /// Next line, blocking the current thread
    ///
    /// Must not be called from an async context.
    #[must_use]
    pub fn blocking_next_line(&self) -> Option<String> {
        self.lines.blocking_lock().blocking_recv()
    }
}

/// Whether a typed answer means yes
#[must_use]
pub fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "s" | "si" | "sí" | "y" | "yes"
    )
}

/// [`Page`] printing to standard output
#[derive(Clone, Debug)]
pub struct TerminalPage {
    input: ConsoleInput,
}

impl TerminalPage {
    /// Page answering prompts from `input`
    #[must_use]
    pub const fn new(input: ConsoleInput) -> Self {
        Self { input }
    }
}

impl Page for TerminalPage {
    fn alert(&self, message: &str) {
        println!("[aviso] {message}");
    }

    fn confirm(&self, message: &str) -> bool {
        println!("{message} [s/N]");
        self.input
            .blocking_next_line()
            .is_some_and(|answer| is_affirmative(&answer))
    }

    fn open_in_new_context(&self, url: &str) {
        println!("[abrir] {url}");
    }

    fn reload(&self) {
        println!("[recarga]");
    }

    fn replace_location(&self, location: &str) {
        println!("[dirección] {location}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affirmative_answers() {
        assert!(is_affirmative("s"));
        assert!(is_affirmative(" Sí "));
        assert!(is_affirmative("yes"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("no"));
    }

    #[tokio::test]
    async fn confirm_reads_the_next_line() {
        let (tx, rx) = mpsc::channel(4);
        let page = TerminalPage::new(ConsoleInput::from_receiver(rx));
        tx.send("s".to_string()).await.ok();
        tx.send("n".to_string()).await.ok();

        let first = {
            let page = page.clone();
            tokio::task::spawn_blocking(move || page.confirm("¿seguro?")).await.ok()
        };
        let second = tokio::task::spawn_blocking(move || page.confirm("¿seguro?")).await.ok();
        assert_eq!(first, Some(true));
        assert_eq!(second, Some(false));
    }
}
