//! Terminal stand-ins for the UI primitives the dish-detail core calls.

use std::io::{self, BufRead, Write};

use async_trait::async_trait;
use client_core::{Confirmation, ConfirmationPrompt, ConfirmationRequest, DetailHost};
use shared::protocol::ShareContent;

/// Answers every prompt the same way, for scripted runs.
pub struct FixedAnswer(pub Confirmation);

#[async_trait]
impl ConfirmationPrompt for FixedAnswer {
    async fn confirm(&self, request: &ConfirmationRequest) -> Confirmation {
        tracing::debug!(title = %request.title, answer = ?self.0, "auto-answered prompt");
        self.0
    }
}

/// Asks on stdin. End of input counts as dismissing the prompt.
pub struct StdinPrompt;

#[async_trait]
impl ConfirmationPrompt for StdinPrompt {
    async fn confirm(&self, request: &ConfirmationRequest) -> Confirmation {
        let request = request.clone();
        let answer = tokio::task::spawn_blocking(move || -> io::Result<Option<String>> {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", request.title)?;
            write!(stdout, "{} [ok/cancel] ", request.message)?;
            stdout.flush()?;
            let mut line = String::new();
            let read = io::stdin().lock().read_line(&mut line)?;
            Ok((read > 0).then_some(line))
        })
        .await;

        match answer {
            Ok(Ok(Some(line))) => parse_answer(&line),
            Ok(Ok(None)) => Confirmation::Dismissed,
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "prompt input failed; treating as dismissed");
                Confirmation::Dismissed
            }
            Err(err) => {
                tracing::warn!(error = %err, "prompt task failed; treating as dismissed");
                Confirmation::Dismissed
            }
        }
    }
}

pub fn parse_answer(line: &str) -> Confirmation {
    match line.trim().to_ascii_lowercase().as_str() {
        "ok" | "y" | "yes" => Confirmation::Affirmed,
        "cancel" | "n" | "no" => Confirmation::Declined,
        _ => Confirmation::Dismissed,
    }
}

pub struct ConsoleHost;

impl DetailHost for ConsoleHost {
    fn acknowledge_grant(&self) {
        tracing::debug!("touch granted");
    }

    fn share(&self, content: &ShareContent) {
        println!("{}", content.dialog_title);
        println!("{}", content.message);
    }
}
