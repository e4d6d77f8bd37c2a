//! Task sources feeding the pipeline.
//!
//! Two kinds of source exist: JSON lines read from a file or stdin, and a
//! generator producing `Task1..TaskN` on a fixed interval.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use contracts::{Inbound, Task};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, info, warn};

use crate::error::CliError;

/// Where tasks come from
#[derive(Debug, Clone, PartialEq)]
pub enum SourceSpec {
    /// JSON lines on standard input
    Stdin,
    /// JSON lines in a file
    File(PathBuf),
    /// Generated demo tasks followed by the quit sentinel
    Generate { count: u64, interval: Duration },
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => write!(f, "stdin"),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Generate { count, interval } => {
                write!(f, "generator ({count} tasks every {}ms)", interval.as_millis())
            }
        }
    }
}

type LineReader = Box<dyn AsyncBufRead + Unpin + Send>;

/// An open task source
pub enum TaskSource {
    Lines {
        name: String,
        reader: LineReader,
        buf: Vec<u8>,
        line_no: u64,
    },
    Generator(TaskGenerator),
}

impl TaskSource {
    /// Open the source described by `spec`
    pub async fn open(spec: &SourceSpec) -> Result<Self, CliError> {
        match spec {
            SourceSpec::Stdin => Ok(Self::from_reader("stdin", tokio::io::stdin())),
            SourceSpec::File(path) => {
                let name = path.display().to_string();
                let file = tokio::fs::File::open(path)
                    .await
                    .map_err(|e| CliError::input(&name, e))?;
                Ok(Self::from_reader(name, file))
            }
            SourceSpec::Generate { count, interval } => {
                Ok(Self::Generator(TaskGenerator::new(*count, *interval)))
            }
        }
    }

    /// Read JSON lines from any async reader
    pub fn from_reader<R>(name: impl Into<String>, reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        Self::Lines {
            name: name.into(),
            reader: Box::new(BufReader::new(reader)),
            buf: Vec::new(),
            line_no: 0,
        }
    }

    /// Next item, or `None` once the source is exhausted
    pub async fn next(&mut self) -> Result<Option<Inbound>, CliError> {
        match self {
            Self::Lines {
                name,
                reader,
                buf,
                line_no,
            } => loop {
                buf.clear();
                let read = reader
                    .read_until(b'\n', buf)
                    .await
                    .map_err(|e| CliError::input(name.as_str(), e))?;
                if read == 0 {
                    debug!(source = %name, lines = *line_no, "Task input exhausted");
                    return Ok(None);
                }
                *line_no += 1;

                let line = match std::str::from_utf8(buf) {
                    Ok(line) => parse_line(line),
                    Err(e) => {
                        warn!(
                            source = %name,
                            line = *line_no,
                            error = %e,
                            "Input line is not valid UTF-8"
                        );
                        lossy_line(buf)
                    }
                };
                if let Some(item) = line {
                    return Ok(Some(item));
                }
            },
            Self::Generator(generator) => Ok(generator.next().await.map(Inbound::from)),
        }
    }
}

/// Parse one input line
///
/// Blank lines yield `None`. Lines that are not JSON are passed on as JSON
/// strings so the dispatcher rejects them like any other malformed item.
pub fn parse_line(line: &str) -> Option<Inbound> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let value = serde_json::from_str::<Value>(line)
        .unwrap_or_else(|_| Value::String(line.to_string()));
    Some(Inbound::Value(value))
}

/// A line that is not UTF-8 is never a task
///
/// It is passed on as a JSON string so the validation policy decides
/// whether the stream stops or skips it.
fn lossy_line(bytes: &[u8]) -> Option<Inbound> {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(Inbound::Value(Value::String(text.to_string())))
}

/// 演示用任务生成器
///
/// 依次产生 `Task1..TaskN` (payload 为序号)，相邻任务间隔 `interval`，
/// 最后产生一个 quit 哨兵。
#[derive(Debug, Clone)]
pub struct TaskGenerator {
    count: u64,
    interval: Duration,
    next: u64,
    quit_sent: bool,
}

impl TaskGenerator {
    pub fn new(count: u64, interval: Duration) -> Self {
        Self {
            count,
            interval,
            next: 1,
            quit_sent: false,
        }
    }

    /// Number of tasks already produced, sentinel excluded
    pub fn produced(&self) -> u64 {
        self.next - 1
    }

    pub async fn next(&mut self) -> Option<Task> {
        if self.next <= self.count {
            if self.next > 1 && !self.interval.is_zero() {
                tokio::time::sleep(self.interval).await;
            }
            let n = self.next;
            self.next += 1;
            debug!(n, "Generated task");
            return Some(Task::new(format!("Task{n}"), n));
        }

        if self.quit_sent {
            return None;
        }
        self.quit_sent = true;
        info!(produced = self.produced(), "Generator finished, sending quit");
        Some(Task::quit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_line() {
        assert!(parse_line("").is_none());
        assert!(parse_line("   ").is_none());

        let Some(Inbound::Value(value)) = parse_line(r#"{"kind": "Task1", "payload": 1}"#) else {
            panic!("expected a JSON value");
        };
        assert_eq!(value, json!({"kind": "Task1", "payload": 1}));

        let Some(Inbound::Value(value)) = parse_line("not json") else {
            panic!("expected a JSON value");
        };
        assert_eq!(value, Value::String("not json".into()));
    }

    #[tokio::test]
    async fn test_generator_sequence() {
        let mut generator = TaskGenerator::new(3, Duration::ZERO);
        let mut kinds = Vec::new();
        while let Some(task) = generator.next().await {
            kinds.push(task.kind().to_string());
        }
        assert_eq!(kinds, vec!["Task1", "Task2", "Task3", "quit"]);
        assert_eq!(generator.produced(), 3);
        assert!(generator.next().await.is_none());
    }

    #[tokio::test]
    async fn test_generator_payload_is_index() {
        let mut generator = TaskGenerator::new(2, Duration::ZERO);
        let first = generator.next().await.unwrap();
        assert_eq!(first.payload(), &json!(1));
    }

    #[tokio::test]
    async fn test_zero_generator_only_quits() {
        let mut generator = TaskGenerator::new(0, Duration::ZERO);
        assert!(generator.next().await.unwrap().is_sentinel());
        assert!(generator.next().await.is_none());
    }

    #[tokio::test]
    async fn test_lines_source_skips_blank_lines() {
        let input = "{\"kind\": \"a\"}\n\n{\"kind\": \"quit\"}\n";
        let mut source = TaskSource::from_reader("test", std::io::Cursor::new(input.as_bytes().to_vec()));

        let mut items = Vec::new();
        while let Some(item) = source.next().await.unwrap() {
            items.push(item);
        }
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_non_utf8_line_becomes_string_item() {
        let input: &[u8] = b"{\"kind\": \"a\"}\n\xff\xfe\n{\"kind\": \"b\"}";
        let mut source = TaskSource::from_reader("bytes", std::io::Cursor::new(input.to_vec()));

        let mut items = Vec::new();
        while let Some(item) = source.next().await.unwrap() {
            items.push(item);
        }
        assert_eq!(items.len(), 3);
        let Inbound::Value(Value::String(text)) = &items[1] else {
            panic!("expected a JSON string for the undecodable line");
        };
        assert!(text.contains('\u{FFFD}'));
        let Inbound::Value(last) = &items[2] else {
            panic!("expected a JSON value");
        };
        assert_eq!(last, &json!({"kind": "b"}));
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let spec = SourceSpec::File(PathBuf::from("/definitely/not/here.jsonl"));
        let err = TaskSource::open(&spec).await.err().unwrap();
        assert!(matches!(err, CliError::Input { .. }));
    }
}
