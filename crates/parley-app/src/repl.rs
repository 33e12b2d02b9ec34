//! Line-oriented chat loop on stdin/stdout.

use std::io::{BufRead, Write};
use std::sync::Arc;

use parley_ai::Session;
use tokio::sync::{mpsc, Notify};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::render;

const HELP: &str = "\
Commands:
  /clear    start a new conversation (usage totals are kept)
  /history  show the conversation so far
  /usage    show cumulative token usage
  /test     check the connection to the provider
  /help     show this help
  /quit     exit
Press Ctrl-C while a reply is streaming to cancel it, or at the prompt to exit.";

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Input<'a> {
    Blank,
    Clear,
    History,
    Usage,
    Test,
    Help,
    Quit,
    Unknown(&'a str),
    Chat(&'a str),
}

impl<'a> Input<'a> {
    pub(crate) fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Input::Blank;
        }
        let Some(command) = trimmed.strip_prefix('/') else {
            return Input::Chat(trimmed);
        };
        match command {
            "clear" => Input::Clear,
            "history" => Input::History,
            "usage" => Input::Usage,
            "test" => Input::Test,
            "help" | "?" => Input::Help,
            "quit" | "exit" => Input::Quit,
            other => Input::Unknown(other),
        }
    }
}

/// Ctrl-C presses, delivered to whichever part of the loop is waiting.
///
/// A press that arrives while nobody waits is kept until the next wait.
pub(crate) struct Interrupts {
    notify: Arc<Notify>,
}

impl Interrupts {
    /// Install the process-wide Ctrl-C listener.
    pub(crate) fn listen() -> Self {
        let interrupts = Self::detached();
        let notify = interrupts.notify.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                notify.notify_one();
            }
            debug!("ctrl-c listener stopped");
        });
        interrupts
    }

    /// Not tied to any signal; only `trigger` fires it.
    pub(crate) fn detached() -> Self {
        Self {
            notify: Arc::new(Notify::new()),
        }
    }

    #[cfg(test)]
    pub(crate) fn trigger(&self) {
        self.notify.notify_one();
    }

    pub(crate) async fn wait(&self) {
        self.notify.notified().await;
    }
}

type Lines = mpsc::Receiver<std::io::Result<String>>;

/// Read stdin on a plain thread so a pending read never holds up runtime
/// shutdown.
fn stdin_lines() -> Lines {
    let (tx, rx) = mpsc::channel(1);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

pub async fn run(session: &Session) -> anyhow::Result<()> {
    println!("parley {} | type /help for commands", env!("CARGO_PKG_VERSION"));
    let interrupts = Interrupts::listen();
    run_with(session, stdin_lines(), &interrupts).await
}

pub(crate) async fn run_with(
    session: &Session,
    mut lines: Lines,
    interrupts: &Interrupts,
) -> anyhow::Result<()> {
    loop {
        prompt()?;
        let next = tokio::select! {
            biased;
            line = lines.recv() => line,
            _ = interrupts.wait() => {
                println!();
                break;
            }
        };
        let Some(line) = next.transpose()? else {
            break;
        };

        match Input::parse(&line) {
            Input::Blank => continue,
            Input::Quit => break,
            Input::Help => println!("{HELP}"),
            Input::Clear => {
                session.clear();
                println!("History cleared.");
            }
            Input::History => {
                for message in session.history() {
                    println!("{}", render::history_line(&message));
                }
            }
            Input::Usage => println!(
                "{}",
                render::usage_summary(&session.token_usage(), session.call_count())
            ),
            Input::Test => {
                if session.test_connection().await {
                    println!("Connection OK.");
                } else {
                    println!("Connection failed.");
                }
            }
            Input::Unknown(command) => println!("Unknown command /{command}. Type /help."),
            Input::Chat(text) => chat_turn(session, text, interrupts).await,
        }
    }

    debug!("chat loop finished");
    Ok(())
}

/// Forwards reply fragments to `out`. After the first failed write the
/// rest of the reply is dropped.
pub(crate) struct ChunkWriter<W> {
    out: W,
    wrote: bool,
    failed: bool,
}

impl<W: Write> ChunkWriter<W> {
    pub(crate) fn new(out: W) -> Self {
        Self {
            out,
            wrote: false,
            failed: false,
        }
    }

    pub(crate) fn forward(&mut self, chunk: &str) {
        if self.failed {
            return;
        }
        let written = self
            .out
            .write_all(chunk.as_bytes())
            .and_then(|()| self.out.flush());
        match written {
            Ok(()) => self.wrote = true,
            Err(e) => {
                debug!("stdout write failed, dropping the rest of the reply: {e}");
                self.failed = true;
            }
        }
    }

    pub(crate) fn wrote(&self) -> bool {
        self.wrote
    }
}

/// Stream one reply to stdout. Ctrl-C cancels it.
async fn chat_turn(session: &Session, text: &str, interrupts: &Interrupts) {
    let token = CancellationToken::new();
    let mut writer = ChunkWriter::new(std::io::stdout());

    let outcome = {
        let send = session.send_with_cancel(text, |chunk: &str| writer.forward(chunk), &token);
        tokio::pin!(send);

        loop {
            tokio::select! {
                outcome = &mut send => break outcome,
                _ = interrupts.wait() => token.cancel(),
            }
        }
    };

    if outcome.is_ok() {
        println!();
        return;
    }
    if writer.wrote() {
        println!();
    }
    println!("{}", render::render_outcome(&outcome));
}

fn prompt() -> std::io::Result<()> {
    let mut out = std::io::stdout().lock();
    out.write_all(b"> ")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use parley_ai::{OpenAiClient, OpenAiConfig, SessionConfig};
    use parley_common::MemoryCredentialStore;

    use super::*;

    fn idle_session() -> Session {
        let client = OpenAiClient::new(OpenAiConfig::default()).unwrap();
        Session::new(
            Arc::new(client),
            Arc::new(MemoryCredentialStore::new()),
            SessionConfig::default(),
        )
    }

    /// Accepts `budget` bytes, then fails every write.
    struct FailingWriter {
        budget: usize,
        written: Vec<u8>,
        attempts: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.attempts += 1;
            if self.written.len() + buf.len() > self.budget {
                return Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(Input::parse(""), Input::Blank);
        assert_eq!(Input::parse("   \t"), Input::Blank);
    }

    #[test]
    fn commands_are_recognized() {
        assert_eq!(Input::parse("/clear"), Input::Clear);
        assert_eq!(Input::parse(" /history "), Input::History);
        assert_eq!(Input::parse("/usage"), Input::Usage);
        assert_eq!(Input::parse("/test"), Input::Test);
        assert_eq!(Input::parse("/?"), Input::Help);
        assert_eq!(Input::parse("/exit"), Input::Quit);
    }

    #[test]
    fn unknown_command_is_reported() {
        assert_eq!(Input::parse("/frob"), Input::Unknown("frob"));
    }

    #[test]
    fn other_text_is_chat() {
        assert_eq!(Input::parse("  Hello there "), Input::Chat("Hello there"));
        assert_eq!(Input::parse("a/b"), Input::Chat("a/b"));
    }

    #[tokio::test]
    async fn interrupt_before_wait_is_not_lost() {
        let interrupts = Interrupts::detached();
        interrupts.trigger();
        tokio::time::timeout(Duration::from_secs(1), interrupts.wait())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn interrupt_at_the_prompt_ends_the_loop() {
        let session = idle_session();
        // Keep the sender alive so the loop only ends on the interrupt.
        let (_tx, rx) = mpsc::channel(1);
        let interrupts = Interrupts::detached();

        let run = run_with(&session, rx, &interrupts);
        tokio::pin!(run);
        assert!(tokio::time::timeout(Duration::from_millis(50), &mut run)
            .await
            .is_err());

        interrupts.trigger();
        tokio::time::timeout(Duration::from_secs(1), run)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn interrupt_still_ends_the_loop_after_a_chat_turn() {
        let session = idle_session();
        let (tx, rx) = mpsc::channel(1);
        tx.send(Ok("hello".to_string())).await.unwrap();
        let interrupts = Interrupts::detached();

        let run = run_with(&session, rx, &interrupts);
        tokio::pin!(run);
        assert!(tokio::time::timeout(Duration::from_millis(50), &mut run)
            .await
            .is_err());
        // Without a key the turn fails before anything is recorded.
        assert_eq!(session.message_count(), 1);

        interrupts.trigger();
        tokio::time::timeout(Duration::from_secs(1), run)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn end_of_input_ends_the_loop() {
        let session = idle_session();
        let (tx, rx) = mpsc::channel(1);
        drop(tx);
        run_with(&session, rx, &Interrupts::detached()).await.unwrap();
    }

    #[test]
    fn chunk_writer_forwards_fragments() {
        let mut writer = ChunkWriter::new(Vec::new());
        assert!(!writer.wrote());
        writer.forward("Hi");
        writer.forward(" there");
        assert!(writer.wrote());
        assert_eq!(writer.out, b"Hi there");
    }

    #[test]
    fn chunk_writer_stops_after_a_failed_write() {
        let mut writer = ChunkWriter::new(FailingWriter {
            budget: 2,
            written: Vec::new(),
            attempts: 0,
        });
        writer.forward("Hi");
        writer.forward(" there");
        writer.forward("!");
        assert_eq!(writer.out.written, b"Hi");
        assert_eq!(writer.out.attempts, 2);
    }
}
