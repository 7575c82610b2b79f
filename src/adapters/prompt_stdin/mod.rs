//! Duplicate resolution policies

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::model::*;
use crate::ports::*;
use crate::utils::time::TimeParser;

/// Always keeps the existing clip
#[derive(Debug, Default)]
pub struct AutoSkipResolver;

#[async_trait]
impl DuplicateResolver for AutoSkipResolver {
    async fn decide(&self, _request: &ClipRequest, _existing: &ClipRecord) -> DuplicateDecision {
        DuplicateDecision::Skip
    }
}

/// Asks on the terminal whether to skip a duplicate or cut it again.
///
/// One buffered reader serves every question, so answers piped in ahead of
/// time are consumed one line per duplicate.
pub struct StdinDuplicatePrompt<R = BufReader<Stdin>> {
    input: Mutex<R>,
}

impl StdinDuplicatePrompt<BufReader<Stdin>> {
    pub fn new() -> Self {
        Self::with_reader(BufReader::new(tokio::io::stdin()))
    }
}

impl Default for StdinDuplicatePrompt<BufReader<Stdin>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> StdinDuplicatePrompt<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    /// Read answers from `input` instead of stdin
    pub fn with_reader(input: R) -> Self {
        Self {
            input: Mutex::new(input),
        }
    }
}

#[async_trait]
impl<R> DuplicateResolver for StdinDuplicatePrompt<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async fn decide(&self, request: &ClipRequest, existing: &ClipRecord) -> DuplicateDecision {
        let mut input = self.input.lock().await;
        eprintln!(
            "Clip {} - {} ({}) already exists as {}",
            TimeParser::format_time(request.start_seconds),
            TimeParser::format_time(request.end_seconds),
            request.label,
            existing.filename
        );
        read_decision(&mut *input).await
    }
}

/// Keep asking until the answer is understood; end of input means skip
pub async fn read_decision<R>(reader: &mut R) -> DuplicateDecision
where
    R: AsyncBufRead + Unpin,
{
    loop {
        eprint!("  [1] skip  [2] create again > ");
        let mut line = String::new();
        match reader.read_line(&mut line).await {
            Ok(0) | Err(_) => {
                debug!("No answer on stdin, skipping duplicate");
                return DuplicateDecision::Skip;
            }
            Ok(_) => {
                if let Some(decision) = parse_answer(&line) {
                    return decision;
                }
                eprintln!("  Please answer 1 or 2.");
            }
        }
    }
}

pub fn parse_answer(answer: &str) -> Option<DuplicateDecision> {
    match answer.trim().to_lowercase().as_str() {
        "1" | "s" | "skip" => Some(DuplicateDecision::Skip),
        "2" | "r" | "recreate" | "o" | "overwrite" => Some(DuplicateDecision::Recreate),
        _ => None,
    }
}
