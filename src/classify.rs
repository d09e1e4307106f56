//! Heuristic classification of captured interpreter output into leveled log
//! entries.
//!
//! The marker table below encodes the PHP CLI diagnostic line format
//! (`PHP Fatal error: ...` on stderr, bare `Fatal error: ...` when
//! `display_errors` echoes to stdout, `Stack trace:` / `#N ...` /
//! `thrown in ...` continuation lines). It is a text heuristic, not a
//! protocol: it is only as reliable as that format, and programs with other
//! diagnostic conventions simply produce no classified entries.

use crate::logging::LogLevel;
use regex::Regex;

/// One leveled entry produced from captured output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifiedEntry {
    pub level: LogLevel,
    pub message: String,
}

/// Category of a single raw line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LineCategory {
    /// Fatal / parse error marker; opens an error block.
    Fatal,
    /// Warning / notice / deprecation marker; opens a warning block.
    Warning,
    /// Stack-trace continuation; extends whichever block is open.
    Trace,
    Plain,
}

/// Block state while scanning stderr.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Block {
    None,
    Error,
    Warning,
}

/// The marker table. The defaults match the PHP CLI; swapping the patterns
/// retargets the classifier at another interpreter's diagnostic format.
pub struct OutputClassifier {
    /// Fatal/parse-error lines on stderr; open an error block.
    pub fatal: Regex,
    /// Warning/notice/deprecation lines on stderr; open a warning block.
    pub warning: Regex,
    /// Marker lines as they appear on stdout, without the `PHP ` prefix.
    pub bare_diagnostic: Regex,
    /// Stack-trace header, numbered frame, or `thrown in` suffix lines.
    pub trace: Regex,
}

impl Default for OutputClassifier {
    fn default() -> Self {
        OutputClassifier {
            fatal: Regex::new(r"^PHP (Fatal error|Parse error):").expect("hard-coded pattern"),
            warning: Regex::new(r"^PHP (Warning|Notice|Deprecated):").expect("hard-coded pattern"),
            bare_diagnostic: Regex::new(r"^(Fatal error|Parse error|Warning|Notice|Deprecated):")
                .expect("hard-coded pattern"),
            trace: Regex::new(r"^\s*(Stack trace:|#\d+|thrown in)").expect("hard-coded pattern"),
        }
    }
}

impl OutputClassifier {
    /// Classify one cycle's captured output. Stderr entries first, then the
    /// stdout debug entry, matching the order they are forwarded to the sink.
    pub fn classify(&self, stdout: &str, stderr: &str) -> Vec<ClassifiedEntry> {
        let mut entries = Vec::new();

        if !stderr.is_empty() {
            entries.extend(self.classify_stderr(stderr));
        }
        if !stdout.is_empty() {
            entries.extend(self.classify_stdout(stdout));
        }

        entries
    }

    /// Scan stderr with the block state machine. Blocks of the same severity
    /// accumulate into one bucket, so at most one ERROR and one WARNING entry
    /// come out of a single capture.
    fn classify_stderr(&self, stderr: &str) -> Vec<ClassifiedEntry> {
        let mut error_lines: Vec<&str> = Vec::new();
        let mut warning_lines: Vec<&str> = Vec::new();
        let mut block = Block::None;

        for line in stderr.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match self.line_category(line) {
                LineCategory::Fatal => {
                    block = Block::Error;
                    error_lines.push(trimmed);
                }
                LineCategory::Warning => {
                    block = Block::Warning;
                    warning_lines.push(trimmed);
                }
                LineCategory::Trace => match block {
                    Block::Error => error_lines.push(trimmed),
                    Block::Warning => warning_lines.push(trimmed),
                    // Orphan trace line, no block open.
                    Block::None => {}
                },
                LineCategory::Plain => {}
            }
        }

        let mut entries = Vec::new();
        if !error_lines.is_empty() {
            entries.push(ClassifiedEntry {
                level: LogLevel::Error,
                message: format!("Output: {}", error_lines.join(" | ")),
            });
        }
        if !warning_lines.is_empty() {
            entries.push(ClassifiedEntry {
                level: LogLevel::Warning,
                message: format!("Output: {}", warning_lines.join(" | ")),
            });
        }
        entries
    }

    /// Collect stdout lines that are neither diagnostic markers nor trace
    /// continuations into a single DEBUG entry.
    fn classify_stdout(&self, stdout: &str) -> Option<ClassifiedEntry> {
        let mut debug_lines: Vec<&str> = Vec::new();

        for line in stdout.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if self.bare_diagnostic.is_match(line) || self.trace.is_match(line) {
                continue;
            }
            debug_lines.push(trimmed);
        }

        (!debug_lines.is_empty()).then(|| ClassifiedEntry {
            level: LogLevel::Debug,
            message: format!("Output: {}", debug_lines.join(" ")),
        })
    }

    fn line_category(&self, line: &str) -> LineCategory {
        if self.fatal.is_match(line) {
            LineCategory::Fatal
        } else if self.warning.is_match(line) {
            LineCategory::Warning
        } else if self.trace.is_match(line) {
            LineCategory::Trace
        } else {
            LineCategory::Plain
        }
    }
}
