//! Line relay over a subscriber map
//!
//! Input lines of the form `subject payload` are published to the map. Each
//! configured subject has its own subscription queue and a consumer task that
//! formats what it receives. Formatted lines go through one more queue to a
//! single printer task so output lines never interleave mid-line.
//!
//! End of input drains the subscription queues before shutting the map down.
//! The shutdown future (Ctrl-C in the binary) shuts it down immediately.

use crate::app::cli::config::RelaySettings;
use crate::app::error::AppError;
use crate::core::timing;
use crate::queue::api::{AsyncQueue, Delivery, QueueConsumer};
use crate::subscribers::api::SubscriberMap;
use colored::Colorize;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

const DRAIN_POLL: Duration = Duration::from_millis(5);
const DRAIN_LIMIT: Duration = Duration::from_secs(5);

/// One input line, classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedLine<'a> {
    /// Empty or a `#` comment
    Blank,
    Message {
        subject: &'a str,
        payload: &'a str,
    },
    /// A subject with no payload
    Malformed,
}

pub fn parse_line(line: &str) -> ParsedLine<'_> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return ParsedLine::Blank;
    }

    match line.split_once(char::is_whitespace) {
        Some((subject, payload)) => ParsedLine::Message {
            subject,
            payload: payload.trim_start(),
        },
        None => ParsedLine::Malformed,
    }
}

/// Counters reported when the relay ends
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelaySummary {
    /// Input lines read, including blank and malformed ones
    pub lines: u64,
    /// Messages accepted by at least one subscriber
    pub published: u64,
    /// Messages no subscriber accepted
    pub unrouted: u64,
    pub malformed: u64,
    /// Items each subject's consumer received
    pub delivered: BTreeMap<String, u64>,
    /// The relay was stopped by the shutdown future rather than end of input
    pub interrupted: bool,
}

impl RelaySummary {
    pub fn total_delivered(&self) -> u64 {
        self.delivered.values().sum()
    }
}

impl fmt::Display for RelaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {} line(s), {} published, {} unrouted, {} malformed{}",
            "Relay summary:".bold(),
            self.lines,
            self.published,
            self.unrouted,
            self.malformed,
            if self.interrupted { " (interrupted)" } else { "" }
        )?;
        for (subject, count) in &self.delivered {
            writeln!(f, "  {:<24} {} delivered", subject, count)?;
        }
        Ok(())
    }
}

pub fn format_line(subject: &str, payload: &str, color: bool) -> String {
    let tag = format!("[{}]", subject);
    if color {
        format!("{} {}", tag.cyan().bold(), payload)
    } else {
        format!("{} {}", tag, payload)
    }
}

/// Relay `input` to `output` until end of input or `shutdown` completes
///
/// Returns the summary together with the output writer.
pub async fn run_relay<R, W, S>(
    input: R,
    output: W,
    settings: &RelaySettings,
    shutdown: S,
) -> Result<(RelaySummary, W), AppError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
    S: Future<Output = ()>,
{
    let map = SubscriberMap::with_options(settings.options);
    let printed = AsyncQueue::new();
    let printer = tokio::spawn(print_lines(printed.consume()?, output));

    let mut subscriptions = Vec::with_capacity(settings.subjects.len());
    let mut workers = Vec::with_capacity(settings.subjects.len());
    for subject in &settings.subjects {
        let queue = map.subscribe(subject.as_str());
        let worker = tokio::spawn(forward(
            subject.clone(),
            queue.consume()?,
            printed.clone(),
            settings.idle_timeout,
            settings.color,
        ));
        workers.push((subject.clone(), worker));
        subscriptions.push(queue);
    }

    let mut summary = RelaySummary::default();
    let read = read_input(input, &map, &mut summary, shutdown).await;

    if read.is_ok() && !summary.interrupted {
        wait_drained(&subscriptions).await;
    }
    map.shutdown();

    for (subject, worker) in workers {
        let delivered = worker.await?;
        summary.delivered.insert(subject, delivered);
    }

    if !printer.is_finished() {
        wait_drained(std::slice::from_ref(&printed)).await;
    }
    printed.stop();
    let printed_result = printer.await?;

    read?;
    let output = printed_result?;
    log::debug!(
        "Relay finished: {} line(s), {} delivered",
        summary.lines,
        summary.total_delivered()
    );
    Ok((summary, output))
}

async fn read_input<R, S>(
    input: R,
    map: &SubscriberMap<String>,
    summary: &mut RelaySummary,
    shutdown: S,
) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    S: Future<Output = ()>,
{
    let mut lines = BufReader::new(input).lines();
    tokio::pin!(shutdown);

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = &mut shutdown => {
                summary.interrupted = true;
                return Ok(());
            }
        };
        let Some(line) = line else {
            return Ok(());
        };

        summary.lines += 1;
        match parse_line(&line) {
            ParsedLine::Blank => {}
            ParsedLine::Malformed => {
                summary.malformed += 1;
                log::warn!(
                    "Skipping line {}: expected 'subject payload'",
                    summary.lines
                );
            }
            ParsedLine::Message { subject, payload } => {
                if map.post(subject, payload.to_string()) == 0 {
                    summary.unrouted += 1;
                    log::debug!("No subscriber accepted line {} for '{}'", summary.lines, subject);
                } else {
                    summary.published += 1;
                }
            }
        }
    }
}

// Consume one subject's queue until its cycle ends; returns the item count
async fn forward(
    subject: String,
    mut consumer: QueueConsumer<String>,
    printed: AsyncQueue<String>,
    idle_timeout: Option<Duration>,
    color: bool,
) -> u64 {
    let mut delivered = 0;
    loop {
        let next = match idle_timeout {
            Some(limit) => match consumer.next_within(limit).await {
                Ok(next) => next,
                Err(idle) => {
                    log::info!("Subject '{}': {}", subject, idle);
                    continue;
                }
            },
            None => consumer.next().await,
        };

        match next {
            Some(Ok(payload)) => {
                delivered += 1;
                printed.post(format_line(&subject, &payload, color), Delivery::Always);
            }
            Some(Err(error)) => {
                log::warn!("Subject '{}' consumer ended: {}", subject, error);
                break;
            }
            None => break,
        }
    }

    log::debug!("Subject '{}' consumer finished after {} item(s)", subject, delivered);
    delivered
}

async fn print_lines<W>(mut consumer: QueueConsumer<String>, mut output: W) -> io::Result<W>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = consumer.next().await {
        match line {
            Ok(line) => {
                output.write_all(line.as_bytes()).await?;
                output.write_all(b"\n").await?;
            }
            Err(error) => {
                log::warn!("Printer stopped: {}", error);
                break;
            }
        }
    }
    output.flush().await?;
    Ok(output)
}

// Wait until every queue has delivered all it holds, bounded by DRAIN_LIMIT
async fn wait_drained<T>(queues: &[AsyncQueue<T>]) {
    let drained = timing::timeout(DRAIN_LIMIT, "draining queues", async {
        while queues.iter().any(|queue| !queue.is_empty()) {
            tokio::time::sleep(DRAIN_POLL).await;
        }
    })
    .await;

    if let Err(error) = drained {
        log::warn!("Gave up {}", error);
    }
}
