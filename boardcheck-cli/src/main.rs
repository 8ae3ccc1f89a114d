//! BoardCheck CLI - printed-circuit-board design rule checks from the command line.

use boardcheck::drc::{report_json, write_report, OVERLAP_ADVISORY};
use boardcheck::{
    discover_board_files, load_board, save_board, Board, BoardCheckError, CheckResult, Coord,
    DesignRules, DrcOptions, DrcSession, ObjectFlag, UndoJournal, Violation,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "boardcheck")]
#[command(about = "Printed-circuit-board design rule checker", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a single board file
    Check {
        /// Path to a .board.json file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        scan: ScanArgs,

        /// Write a copy of the board with every implicated object selected
        #[arg(long, value_name = "OUT")]
        write_marked: Option<PathBuf>,
    },

    /// Check all board files in a directory
    Project {
        /// Path to project directory
        #[arg(value_name = "DIR", default_value = ".")]
        dir: PathBuf,

        #[command(flatten)]
        scan: ScanArgs,
    },

    /// List the checks and their default limits
    Rules {
        /// Show rule explanations
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Args)]
struct ScanArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Exit with error code if any design rule error is found
    #[arg(long)]
    fail_on_violations: bool,

    /// Minimum copper spacing (overrides the board rules)
    #[arg(long, value_name = "NM")]
    bloat: Option<Coord>,

    /// Minimum copper overlap (overrides the board rules)
    #[arg(long, value_name = "NM")]
    shrink: Option<Coord>,

    /// Minimum copper width
    #[arg(long, value_name = "NM")]
    min_width: Option<Coord>,

    /// Minimum silkscreen width
    #[arg(long, value_name = "NM")]
    min_silk: Option<Coord>,

    /// Minimum drill diameter
    #[arg(long, value_name = "NM")]
    min_drill: Option<Coord>,

    /// Minimum annular ring
    #[arg(long, value_name = "NM")]
    min_ring: Option<Coord>,

    /// Log progress to stderr (-v violations, -vv summary, -vvv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl ScanArgs {
    fn rules_for(&self, board: &Board) -> DesignRules {
        let base = board.rules;
        DesignRules {
            bloat: self.bloat.unwrap_or(base.bloat),
            shrink: self.shrink.unwrap_or(base.shrink),
            min_width: self.min_width.unwrap_or(base.min_width),
            min_silk: self.min_silk.unwrap_or(base.min_silk),
            min_drill: self.min_drill.unwrap_or(base.min_drill),
            min_ring: self.min_ring.unwrap_or(base.min_ring),
        }
    }

    fn options_for(&self, board: &Board) -> DrcOptions {
        DrcOptions {
            rules: Some(self.rules_for(board)),
            log_violations: self.verbose > 0,
            log_overview: self.verbose > 1,
            cancel: None,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for CI/CD
    Json,
    /// Plain violation report, one block per violation
    Report,
    /// GitHub Actions format
    Github,
}

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Check {
            file,
            scan,
            write_marked,
        } => {
            init_logging(scan.verbose);
            handle_check(&file, &scan, write_marked.as_deref())
        }
        Commands::Project { dir, scan } => {
            init_logging(scan.verbose);
            handle_project(&dir, &scan)
        }
        Commands::Rules { verbose } => {
            handle_rules(verbose);
            0
        }
    };

    process::exit(exit_code);
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn check_file(path: &Path, scan: &ScanArgs) -> Result<(Board, DrcSession, CheckResult), BoardCheckError> {
    let board = load_board(path)?;
    let mut session = DrcSession::new();
    let summary = session.run(&board, &scan.options_for(&board))?;
    let result = CheckResult {
        file: path.to_path_buf(),
        summary,
        violations: session.violations()?.clone(),
    };
    Ok((board, session, result))
}

fn handle_check(file: &Path, scan: &ScanArgs, write_marked: Option<&Path>) -> i32 {
    let (mut board, session, result) = match check_file(file, scan) {
        Ok(checked) => checked,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    if let Some(out) = write_marked {
        if let Err(e) = write_marked_board(&mut board, &session, out) {
            eprintln!("Error: {}", e);
            return 1;
        }
    }

    output_results(std::slice::from_ref(&result), &scan.format);
    if scan.fail_on_violations && result.has_violations() {
        return 1;
    }
    0
}

fn write_marked_board(board: &mut Board, session: &DrcSession, out: &Path) -> Result<(), BoardCheckError> {
    let mut journal = UndoJournal::new();
    let outcome = session.apply_flag(board, ObjectFlag::Selected, &mut journal)?;
    save_board(out, board)?;
    info!(
        "marked {} objects ({} stale) in {}",
        outcome.applied,
        outcome.stale.len(),
        out.display()
    );
    Ok(())
}

fn handle_project(dir: &Path, scan: &ScanArgs) -> i32 {
    let files = match discover_board_files(dir) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let mut results = Vec::with_capacity(files.len());
    for path in &files {
        match check_file(path, scan) {
            Ok((_, _, result)) => results.push(result),
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        }
    }

    output_results(&results, &scan.format);
    if scan.fail_on_violations && results.iter().any(CheckResult::has_violations) {
        return 1;
    }
    0
}

fn output_results(results: &[CheckResult], format: &OutputFormat) {
    match format {
        OutputFormat::Human => output_human(results),
        OutputFormat::Json => output_json(results),
        OutputFormat::Report => output_report(results),
        OutputFormat::Github => output_github(results),
    }
}

fn location_text(violation: &Violation) -> String {
    match violation.location() {
        Some(at) => at.to_string(),
        None => "unspecified".to_string(),
    }
}

fn output_human(results: &[CheckResult]) {
    for result in results {
        println!("\nFile: {}", result.file.display());
        println!("{}", "─".repeat(60));

        if let Some(advisory) = result.violations.iter().find(|v| v.title() == OVERLAP_ADVISORY) {
            println!(
                "  NOTE: {} object(s) narrower than {}",
                advisory.object_count(),
                advisory.required()
            );
        }

        if !result.has_violations() {
            println!("  No DRC problems found");
            continue;
        }

        for violation in result.rule_violations() {
            println!("  - {}", violation.title());
            println!("      near {}", location_text(violation));
            match violation.measured() {
                Some(measured) => println!(
                    "      measured {}, required {}",
                    measured,
                    violation.required()
                ),
                None => println!("      required {}", violation.required()),
            }
            let ids: Vec<String> = violation
                .objects()
                .iter()
                .map(|o| format!("{} #{}", o.kind, o.id))
                .collect();
            if !ids.is_empty() {
                println!("      objects: {}", ids.join(", "));
            }
        }

        println!("\n  Summary:");
        println!("    Violations: {}", result.summary.violations);
        println!("    Duplicates: {}", result.summary.duplicates);
        if result.summary.no_paste_pads > 0 {
            println!("    Nopaste pads: {}", result.summary.no_paste_pads);
        }
    }
}

fn output_json(results: &[CheckResult]) {
    let output = serde_json::json!({
        "results": results.iter().map(|r| {
            let mut entry = report_json(&r.violations, &r.summary);
            entry["file"] = serde_json::json!(r.file.display().to_string());
            entry
        }).collect::<Vec<_>>(),
        "summary": {
            "total_files": results.len(),
            "total_violations": results.iter().map(|r| r.summary.violations).sum::<usize>(),
        }
    });
    match serde_json::to_string_pretty(&output) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Error: {}", e),
    }
}

fn output_report(results: &[CheckResult]) {
    let mut out = std::io::stdout().lock();
    for result in results {
        let written = if results.len() > 1 {
            writeln!(out, "File: {}", result.file.display())
                .and_then(|_| write_report(&mut out, &result.violations))
        } else {
            write_report(&mut out, &result.violations)
        };
        if let Err(e) = written {
            eprintln!("Error: {}", e);
            return;
        }
    }
}

fn output_github(results: &[CheckResult]) {
    for result in results {
        for violation in result.rule_violations() {
            println!(
                "::error file={},title={}::near {}: required {}{}",
                result.file.display(),
                violation.title(),
                location_text(violation),
                violation.required(),
                violation
                    .measured()
                    .map(|m| format!(", measured {}", m))
                    .unwrap_or_default()
            );
        }
    }
}

fn handle_rules(verbose: bool) {
    let defaults = DesignRules::default();
    println!("Design rule checks:\n");

    let rules = [
        (
            "bloat",
            "Copper areas too close",
            "Copper of different nets must be at least this far apart",
            defaults.bloat,
        ),
        (
            "shrink",
            "Potential for broken trace",
            "Joined copper must overlap by at least this much",
            defaults.shrink,
        ),
        (
            "min_width",
            "Line, arc and pad width",
            "Copper narrower than this may not be reproduced reliably",
            defaults.min_width,
        ),
        (
            "min_silk",
            "Silk line width",
            "Silkscreen narrower than this may not be printed",
            defaults.min_silk,
        ),
        (
            "min_drill",
            "Drill size",
            "Pin and via holes smaller than this cannot be drilled",
            defaults.min_drill,
        ),
        (
            "min_ring",
            "Annular ring",
            "Copper ring around a pin or via hole, measured per side",
            defaults.min_ring,
        ),
    ];

    for (name, short, long, default) in &rules {
        println!("  {} (default {})", name, default);
        println!("    {}", short);
        if verbose {
            println!("    {}", long);
        }
        println!();
    }

    println!("  polygon clearance");
    println!("    Features inside a clearing polygon must keep bloat clear of it");
    if verbose {
        println!("    Features that do not clear a polygon must bond to it");
    }
}
