//! Line-oriented import extraction
//!
//! Deliberately non-semantic: each line is classified on its own against a
//! handful of literal tokens, and a two-value state decides whether lines
//! are being collected as imports.
//!
//! ```text
//!            "import ("                ")"
//! Seeking ─────────────▶ Capturing ─────────▶ done (record kept)
//!                            │
//!                            └── EOF ───────▶ done (record dropped)
//! ```
//!
//! A `)` line met before any `import (` is ignored rather than ending the
//! file, so only explicitly closed blocks ever produce a record.

use crate::scanner::types::PackageInfo;

/// Keyword that starts a package declaration line
pub const PACKAGE_KEYWORD: &str = "package";
/// Exact line that opens an import block
pub const IMPORT_OPEN: &str = "import (";
/// Exact line that closes an import block
pub const IMPORT_CLOSE: &str = ")";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseState {
    #[default]
    Seeking,
    Capturing,
}

/// What a single line means in the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEvent<'a> {
    Package(&'a str),
    /// A `package` line inside an import block: renames and is captured
    PackageImport { package: &'a str, import: &'a str },
    OpenBlock,
    CloseBlock,
    Import(&'a str),
    Ignored,
}

/// Whether the caller should keep feeding lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Done,
}

/// Result of parsing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Import block opened and closed
    Complete(PackageInfo),
    /// Import block opened but the file ended first
    Unterminated { package: String, imports: usize },
    /// No import block was ever opened
    NoImportBlock,
}

/// Strip surrounding quotes and whitespace
pub fn clean(value: &str) -> &str {
    value.trim_matches(|c: char| c == '"' || c.is_whitespace())
}

/// Classify a line (terminator already removed) in the given state
pub fn classify(state: ParseState, line: &str) -> LineEvent<'_> {
    if let Some(rest) = line.strip_prefix(PACKAGE_KEYWORD) {
        let package = clean(rest);
        return match state {
            ParseState::Seeking => LineEvent::Package(package),
            ParseState::Capturing => LineEvent::PackageImport {
                package,
                import: clean(line),
            },
        };
    }

    match state {
        ParseState::Seeking if line == IMPORT_OPEN => LineEvent::OpenBlock,
        ParseState::Seeking => LineEvent::Ignored,
        ParseState::Capturing if line == IMPORT_CLOSE => LineEvent::CloseBlock,
        ParseState::Capturing => match clean(line) {
            "" => LineEvent::Ignored,
            import => LineEvent::Import(import),
        },
    }
}

/// State after `event` has been observed in `state`
pub fn transition(state: ParseState, event: &LineEvent<'_>) -> ParseState {
    match (state, event) {
        (ParseState::Seeking, LineEvent::OpenBlock) => ParseState::Capturing,
        (ParseState::Capturing, LineEvent::CloseBlock) => ParseState::Seeking,
        (state, _) => state,
    }
}

/// Per-file accumulator driven one line at a time
#[derive(Debug, Default)]
pub struct FileParser {
    state: ParseState,
    name: String,
    imports: Vec<String>,
    closed: bool,
}

impl FileParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn feed(&mut self, line: &str) -> Flow {
        let event = classify(self.state, line);
        match event {
            LineEvent::Package(name) => self.name = name.to_string(),
            LineEvent::PackageImport { package, import } => {
                self.name = package.to_string();
                self.imports.push(import.to_string());
            }
            LineEvent::Import(import) => self.imports.push(import.to_string()),
            LineEvent::CloseBlock => self.closed = true,
            LineEvent::OpenBlock | LineEvent::Ignored => {}
        }
        self.state = transition(self.state, &event);

        // Nothing after the import block is of interest
        if self.closed {
            Flow::Done
        } else {
            Flow::Continue
        }
    }

    pub fn finish(self) -> FileOutcome {
        match (self.closed, self.state) {
            (true, _) => FileOutcome::Complete(PackageInfo::new(self.name, self.imports)),
            (false, ParseState::Capturing) => FileOutcome::Unterminated {
                package: self.name,
                imports: self.imports.len(),
            },
            (false, ParseState::Seeking) => FileOutcome::NoImportBlock,
        }
    }
}

/// Parse in-memory source text
pub fn parse_source(source: &str) -> FileOutcome {
    let mut parser = FileParser::new();
    for line in source.lines() {
        if parser.feed(line) == Flow::Done {
            break;
        }
    }
    parser.finish()
}
