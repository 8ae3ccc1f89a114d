//! Public checking API shared by the CLI and library users.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::board::{Board, DesignRules, ObjectFlag};
use crate::drc::{
    run_drc, write_report, CancelToken, DrcSummary, FlagApplication, FlagJournal, Violation,
    ViolationList,
};

/// Suffix identifying board files during directory discovery
pub const BOARD_FILE_SUFFIX: &str = ".board.json";

#[derive(Debug, thiserror::Error)]
pub enum BoardCheckError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("DRCReport: must run DRC check first")]
    NoScan,
    #[error("out of memory while recording violations")]
    Allocation,
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for BoardCheckError {
    fn from(e: serde_json::Error) -> Self {
        BoardCheckError::Parse(e.to_string())
    }
}

/// Options for one DRC run.
#[derive(Clone, Debug)]
pub struct DrcOptions {
    /// Replaces the board's own rules when set
    pub rules: Option<DesignRules>,
    /// Log every violation as it is found
    pub log_violations: bool,
    /// Log the rule set before scanning
    pub log_overview: bool,
    pub cancel: Option<CancelToken>,
}

impl Default for DrcOptions {
    fn default() -> Self {
        Self {
            rules: None,
            log_violations: true,
            log_overview: true,
            cancel: None,
        }
    }
}

/// Per-file check result.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub file: PathBuf,
    pub summary: DrcSummary,
    /// Full list, starting with the scope notice
    pub violations: ViolationList,
}

impl CheckResult {
    pub fn has_violations(&self) -> bool {
        self.summary.violations > 0
    }

    /// Violations produced by rule checks, without the scope notice and advisory
    pub fn rule_violations(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| {
            v.title() != crate::drc::SCOPE_NOTICE && v.title() != crate::drc::OVERLAP_ADVISORY
        })
    }
}

/// Read a board file.
pub fn load_board(path: &Path) -> Result<Board, BoardCheckError> {
    let text = std::fs::read_to_string(path)?;
    let board = Board::from_json(&text)
        .map_err(|e| BoardCheckError::Parse(format!("{}: {}", path.display(), e)))?;
    debug!(
        "loaded {} ({} layers, {} elements, {} vias)",
        path.display(),
        board.layers.len(),
        board.elements.len(),
        board.vias.len()
    );
    Ok(board)
}

/// Write a board file.
pub fn save_board(path: &Path, board: &Board) -> Result<(), BoardCheckError> {
    std::fs::write(path, board.to_json()?)?;
    Ok(())
}

/// Recursively discover board files in a directory.
pub fn discover_board_files(dir: &Path) -> Result<Vec<PathBuf>, BoardCheckError> {
    let mut files = Vec::new();
    walk_dir(dir, &mut files, 0)?;
    files.sort();
    Ok(files)
}

fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>, depth: usize) -> Result<(), BoardCheckError> {
    if depth > 20 {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if path.is_dir() {
            if name.starts_with('.') || name == "target" || name == "build" {
                continue;
            }
            walk_dir(&path, files, depth + 1)?;
        } else if path.is_file() && name.ends_with(BOARD_FILE_SUFFIX) {
            files.push(path);
        }
    }
    Ok(())
}

/// Holds the violation list of the most recent successful scan.
///
/// A failed scan leaves the previous list in place.
#[derive(Debug, Default)]
pub struct DrcSession {
    last: Option<(DrcSummary, ViolationList)>,
}

impl DrcSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(&mut self, board: &Board, options: &DrcOptions) -> Result<DrcSummary, BoardCheckError> {
        let run = run_drc(board, options)?;
        let summary = run.summary;
        self.last = Some((summary, run.violations));
        Ok(summary)
    }

    pub fn summary(&self) -> Result<DrcSummary, BoardCheckError> {
        self.last.as_ref().map(|(s, _)| *s).ok_or(BoardCheckError::NoScan)
    }

    pub fn violations(&self) -> Result<&ViolationList, BoardCheckError> {
        self.last.as_ref().map(|(_, l)| l).ok_or(BoardCheckError::NoScan)
    }

    /// Write the text report of the last scan.
    pub fn write_report<W: Write>(&self, out: &mut W) -> Result<(), BoardCheckError> {
        write_report(out, self.violations()?)?;
        Ok(())
    }

    /// Set `flag` on the objects implicated by every violation of the last scan.
    pub fn apply_flag(
        &self,
        board: &mut Board,
        flag: ObjectFlag,
        journal: &mut dyn FlagJournal,
    ) -> Result<FlagApplication, BoardCheckError> {
        let mut total = FlagApplication::default();
        for violation in self.violations()? {
            let outcome = violation.apply_flag(board, flag, journal);
            total.applied += outcome.applied;
            total.stale.extend(outcome.stale);
        }
        Ok(total)
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}

/// Core checking API used by the CLI.
pub struct BoardCheckCore;

impl BoardCheckCore {
    /// Check a single board file.
    pub fn check_board(path: &Path, options: &DrcOptions) -> Result<CheckResult, BoardCheckError> {
        let board = load_board(path)?;
        let run = run_drc(&board, options)?;
        info!("{}: {} violations", path.display(), run.summary.violations);
        Ok(CheckResult {
            file: path.to_path_buf(),
            summary: run.summary,
            violations: run.violations,
        })
    }

    /// Check every board file in a directory tree.
    pub fn check_project(dir: &Path, options: &DrcOptions) -> Result<Vec<CheckResult>, BoardCheckError> {
        let files = discover_board_files(dir)?;
        let mut results = Vec::with_capacity(files.len());
        for path in files {
            if options.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                break;
            }
            results.push(Self::check_board(&path, options)?);
        }
        Ok(results)
    }
}
