//! Scanner Component
//!
//! Walks a checked-out repository, picks the candidate source files, and
//! pulls the package name and import block out of each one.
//!
//! ## Failure scope
//!
//! - A failing directory walk, or a tree with no candidate files, abandons
//!   the whole scan ([`ScanError`]).
//! - A file that cannot be opened or read, or that has a line longer than
//!   the configured maximum, is skipped ([`FileError`]) and the scan goes on.
//! - A file whose import block never closes contributes nothing.

pub mod error;
pub mod filter;
pub mod parser;
pub mod types;

pub use error::{FileError, ScanError, ScanResult};
pub use filter::CandidateFilter;
pub use parser::{FileOutcome, ParseState};
pub use types::PackageInfo;

use parser::{FileParser, Flow};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Longest line accepted before a file is skipped
pub const DEFAULT_MAX_LINE_LENGTH: usize = 4096;

/// Scanner settings
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub max_line_length: usize,
    /// Extra glob patterns (relative to the scan root) to leave out
    pub exclude: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            exclude: Vec::new(),
        }
    }
}

/// Something worth reporting about an individual file
#[derive(Debug)]
pub enum FileDiagnostic {
    Skipped(FileError),
    Unterminated {
        path: PathBuf,
        package: String,
        imports: usize,
    },
}

/// Records of one pass plus how many candidate files were read
#[derive(Debug, Default)]
pub struct TreeScan {
    pub packages: Vec<PackageInfo>,
    pub files_scanned: usize,
}

/// Import extractor for one kind of project
#[derive(Debug, Clone)]
pub struct Scanner {
    filter: CandidateFilter,
    max_line_length: usize,
}

enum LineRead {
    Line,
    TooLong,
    Eof,
}

impl Scanner {
    pub fn new(config: &ScannerConfig) -> ScanResult<Self> {
        Ok(Self {
            filter: CandidateFilter::go().with_excludes(&config.exclude)?,
            max_line_length: config.max_line_length,
        })
    }

    /// List candidate files under `root`, in a stable order
    pub fn collect_candidates(&self, root: &Path) -> ScanResult<Vec<PathBuf>> {
        let relative = |path: &Path| path.strip_prefix(root).unwrap_or(path).to_path_buf();

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !self.filter.is_pruned_dir(&relative(entry.path()))
            });

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|source| ScanError::Walk {
                root: root.to_path_buf(),
                source,
            })?;

            if entry.file_type().is_dir() {
                continue;
            }
            if self.filter.is_candidate(&relative(entry.path())) {
                log::debug!("scanning path: {}", entry.path().display());
                files.push(entry.into_path());
            }
        }

        if files.is_empty() {
            return Err(ScanError::NoFilesFound {
                root: root.to_path_buf(),
            });
        }

        Ok(files)
    }

    /// Extract one record per candidate file with a closed import block
    pub fn extract(&self, root: &Path) -> ScanResult<Vec<PackageInfo>> {
        self.extract_with(root, |_| {})
    }

    /// Like [`extract`](Self::extract), reporting per-file problems to `observer`
    pub fn extract_with<F>(&self, root: &Path, observer: F) -> ScanResult<Vec<PackageInfo>>
    where
        F: FnMut(FileDiagnostic),
    {
        self.scan_tree(root, observer).map(|scan| scan.packages)
    }

    /// Full pass over `root`, keeping the file count alongside the records
    pub fn scan_tree<F>(&self, root: &Path, mut observer: F) -> ScanResult<TreeScan>
    where
        F: FnMut(FileDiagnostic),
    {
        let files = self.collect_candidates(root)?;
        let files_scanned = files.len();
        let mut packages = Vec::new();

        for path in files {
            match self.extract_file(&path) {
                Ok(FileOutcome::Complete(info)) => packages.push(info),
                Ok(FileOutcome::Unterminated { package, imports }) => {
                    log::debug!(
                        "import block in {} never closed; discarding {} import(s)",
                        path.display(),
                        imports
                    );
                    observer(FileDiagnostic::Unterminated {
                        path,
                        package,
                        imports,
                    });
                }
                Ok(FileOutcome::NoImportBlock) => {}
                Err(e) => {
                    log::warn!("{}", e);
                    observer(FileDiagnostic::Skipped(e));
                }
            }
        }

        for info in &packages {
            log::debug!("{}", info);
        }

        Ok(TreeScan {
            packages,
            files_scanned,
        })
    }

    /// Run the line parser over a single file
    pub fn extract_file(&self, path: &Path) -> Result<FileOutcome, FileError> {
        let file = File::open(path).map_err(|source| FileError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = BufReader::new(file);
        let mut parser = FileParser::new();
        let mut buf = Vec::new();
        let mut line_number = 0;

        loop {
            let read = read_line_bounded(&mut reader, &mut buf, self.max_line_length).map_err(
                |source| FileError::Read {
                    path: path.to_path_buf(),
                    source,
                },
            )?;
            line_number += 1;

            match read {
                LineRead::Eof => break,
                LineRead::TooLong => {
                    return Err(FileError::LineTooLong {
                        path: path.to_path_buf(),
                        line: line_number,
                        max: self.max_line_length,
                    })
                }
                LineRead::Line => {
                    let line = String::from_utf8_lossy(&buf);
                    if parser.feed(&line) == Flow::Done {
                        break;
                    }
                }
            }
        }

        Ok(parser.finish())
    }
}

/// Read one line into `buf` without its terminator, refusing lines over `max` bytes
fn read_line_bounded<R: BufRead>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max: usize,
) -> io::Result<LineRead> {
    buf.clear();
    // One byte beyond the limit plus room for "\r\n"
    let limit = max as u64 + 2;
    let read = reader.by_ref().take(limit).read_until(b'\n', buf)?;
    if read == 0 {
        return Ok(LineRead::Eof);
    }

    let terminated = buf.last() == Some(&b'\n');
    if terminated {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }

    if buf.len() > max || (!terminated && read as u64 == limit) {
        return Ok(LineRead::TooLong);
    }
    Ok(LineRead::Line)
}

#[cfg(test)]
mod tests;
