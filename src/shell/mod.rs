//! Interactive read-respond loop over any async line source.

use std::io::{self, BufRead, Write};

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::agent::{Agent, AgentResponse};
use crate::error::CourierError;

pub const DEFAULT_BANNER: &str = "Courier assistant. Type 'exit' or 'quit' to leave.";
const PROMPT: &str = "You: ";

/// Anything that can answer a line of user input.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, input: &str) -> Result<AgentResponse, CourierError>;
}

#[async_trait]
impl Responder for Agent {
    async fn respond(&self, input: &str) -> Result<AgentResponse, CourierError> {
        Agent::respond(self, input).await
    }
}

/// Where the shell reads user input from.
///
/// `next_line` must be cancel safe: the shell drops it when interrupted.
#[async_trait]
pub trait LineSource: Send {
    /// The next line, or `None` once input has ended.
    async fn next_line(&mut self) -> io::Result<Option<String>>;
}

#[async_trait]
impl<R> LineSource for R
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        match self.read_line(&mut line).await? {
            0 => Ok(None),
            _ => Ok(Some(line)),
        }
    }
}

/// Lines read on a dedicated OS thread and handed over through a channel.
///
/// Blocking reads such as a terminal's stdin cannot be cancelled. Keeping them
/// off the runtime lets the process exit while a read is still pending.
pub struct ThreadedLines {
    lines: mpsc::Receiver<io::Result<String>>,
}

impl ThreadedLines {
    pub fn spawn<R>(reader: R) -> io::Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let (tx, lines) = mpsc::channel(1);
        std::thread::Builder::new()
            .name("courier-input".into())
            .spawn(move || {
                for line in reader.lines() {
                    let failed = line.is_err();
                    if tx.blocking_send(line).is_err() || failed {
                        break;
                    }
                }
            })?;
        Ok(Self { lines })
    }

    pub fn stdin() -> io::Result<Self> {
        Self::spawn(io::BufReader::new(io::stdin()))
    }
}

#[async_trait]
impl LineSource for ThreadedLines {
    async fn next_line(&mut self) -> io::Result<Option<String>> {
        self.lines.recv().await.transpose()
    }
}

/// How a shell session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellExit {
    /// `exit`, `quit`, or end of input.
    Finished,
    Interrupted,
}

pub struct Shell<R> {
    responder: R,
    banner: String,
}

impl<R: Responder> Shell<R> {
    pub fn new(responder: R) -> Self {
        Self {
            responder,
            banner: DEFAULT_BANNER.to_string(),
        }
    }

    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = banner.into();
        self
    }

    /// Run until the user leaves, input ends, or `cancel` fires while waiting for input.
    ///
    /// Responder failures are printed and the loop continues; only I/O errors
    /// on `output` end the session with `Err`.
    pub async fn run<I, W>(
        &self,
        mut input: I,
        output: &mut W,
        cancel: CancellationToken,
    ) -> Result<ShellExit, CourierError>
    where
        I: LineSource,
        W: Write,
    {
        writeln!(output, "{}", self.banner)?;

        loop {
            write!(output, "{PROMPT}")?;
            output.flush()?;

            let next = tokio::select! {
                _ = cancel.cancelled() => {
                    writeln!(output, "\nExiting gracefully...")?;
                    return Ok(ShellExit::Interrupted);
                }
                next = input.next_line() => next?,
            };

            let Some(line) = next else {
                writeln!(output, "Goodbye!")?;
                return Ok(ShellExit::Finished);
            };
            let message = line.trim();
            if is_exit_command(message) {
                writeln!(output, "Goodbye!")?;
                return Ok(ShellExit::Finished);
            }
            if message.is_empty() {
                continue;
            }

            debug!(chars = message.len(), "shell input");
            let answer = match self.responder.respond(message).await {
                Ok(response) => {
                    write!(output, "Assistant: ")?;
                    response.drain_into(output).await
                }
                Err(e) => Err(e),
            };
            match answer {
                Ok(_) => writeln!(output)?,
                Err(CourierError::Io(e)) => return Err(CourierError::Io(e)),
                Err(e) => {
                    warn!(error = %e, "turn failed");
                    writeln!(output, "\nError: {e}")?;
                    writeln!(output, "Please try again.")?;
                }
            }
        }
    }
}

fn is_exit_command(message: &str) -> bool {
    message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit")
}
