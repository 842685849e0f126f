//! Interactive batch mode: walk a directory of statements, convert each one
//! with accept/skip/replace prompts, and keep a run log. One file's failure
//! never stops the run.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use fatura::normalize::format_brl;
use fatura::{checksum, export, ExportFormat, ParseOptions};
use logger::{FileStatus, RunLog};

pub struct BatchOptions {
    pub dir: PathBuf,
    pub format: ExportFormat,
    pub password: Option<String>,
    pub verbose: bool,
}

enum ExistingAction {
    Skip,
    Replace,
}

pub fn run(opts: &BatchOptions) -> Result<()> {
    if !opts.dir.is_dir() {
        bail!("Not a directory: {}", opts.dir.display());
    }

    let mut files = Vec::new();
    find_statements(&opts.dir, &mut files)
        .with_context(|| format!("Scanning {}", opts.dir.display()))?;
    files.sort();

    if files.is_empty() {
        println!("❌ No statement files (.csv/.pdf) found in {}", opts.dir.display());
        return Ok(());
    }

    println!("Fatura - Interactive Batch Mode");
    println!("═════════════════════════════════════════");
    println!("Root directory: {}", opts.dir.display());
    println!("Export format:  {}", opts.format.as_str());
    println!("Statements:     {}", files.len());
    println!();

    if !prompt_yes_no("Continue?", true)? {
        println!("Aborted.");
        return Ok(());
    }

    let mut log = RunLog::create(&opts.dir, opts.format.as_str())?;
    println!("Log file: {}", log.path().display());

    let parse_opts = ParseOptions {
        kind: None,
        password: opts.password.clone(),
        period: None,
    };

    for (index, path) in files.iter().enumerate() {
        println!();
        println!("═════════════════════════════════════════");
        println!("[{}/{}] {}", index + 1, files.len(), path.display());

        let output = crate::default_output_path(path, opts.format);
        if output.exists() {
            println!("Output exists: {}", output.display());
            match prompt_existing(&output)? {
                ExistingAction::Skip => {
                    println!("Skipped.");
                    log.record(FileStatus::Skipped, path, "output already exists")?;
                    continue;
                }
                ExistingAction::Replace => {}
            }
        }

        match checksum::file_sha256(path) {
            Ok(digest) => println!("🔐 SHA-256: {digest}"),
            Err(e) => println!("⚠️  Could not hash file: {e}"),
        }

        let parsed = fatura::load_source(path, &parse_opts)
            .and_then(|source| fatura::parse_source(&source, &parse_opts).map(|r| (source, r)));
        let (source, result) = match parsed {
            Ok(pair) => pair,
            Err(e) => {
                println!("❌ {e}");
                log.record(FileStatus::Error, path, &e.to_string())?;
                continue;
            }
        };

        println!(
            "✓ {} transaction(s) from {} source",
            result.transactions.len(),
            source.label()
        );
        crate::print_warnings(&result.warnings, opts.verbose);
        crate::print_totals(&source, result.total_cents());

        if prompt_yes_no("Accept and save?", true)? {
            let rendered = export::render(&result, opts.format)?;
            fs::write(&output, rendered)
                .with_context(|| format!("Writing {}", output.display()))?;
            println!("✅ Saved: {}", output.display());
            log.record(
                FileStatus::Accepted,
                path,
                &format!("exported to {}", output.display()),
            )?;
        } else {
            println!("Rejected.");
            log.record(FileStatus::Rejected, path, "user rejected")?;
        }
    }

    let summary = log.finish()?;
    println!();
    println!("═════════════════════════════════════════");
    println!("BATCH PROCESSING COMPLETE");
    println!("  Accepted: {}", summary.accepted);
    println!("  Rejected: {}", summary.rejected);
    println!("  Skipped:  {}", summary.skipped);
    println!("  Errors:   {}", summary.errors);

    Ok(())
}

fn find_statements(dir: &Path, found: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            find_statements(&path, found)?;
            continue;
        }
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());
        // Outputs from earlier runs are named <stem>_parsed.<ext>; they are
        // not inputs.
        let is_own_output = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.ends_with("_parsed"));
        if matches!(ext.as_deref(), Some("csv") | Some("pdf")) && !is_own_output {
            found.push(path);
        }
    }
    Ok(())
}

fn prompt_yes_no(question: &str, default: bool) -> Result<bool> {
    let suffix = if default { "[Y/n]" } else { "[y/N]" };
    loop {
        print!("{question} {suffix}: ");
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(default);
        }
        match line.trim().to_lowercase().as_str() {
            "" => return Ok(default),
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => println!("Please answer 'y' or 'n'."),
        }
    }
}

fn prompt_existing(output: &Path) -> Result<ExistingAction> {
    loop {
        print!("[s]kip, [r]eplace, or [v]iew? ");
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(ExistingAction::Skip);
        }
        match line.trim().to_lowercase().as_str() {
            "s" | "skip" => return Ok(ExistingAction::Skip),
            "r" | "replace" => return Ok(ExistingAction::Replace),
            "v" | "view" => {
                let contents = fs::read_to_string(output).unwrap_or_default();
                println!("Contents of {}:", output.display());
                for line in contents.lines().take(10) {
                    println!("  {line}");
                }
                if contents.lines().count() > 10 {
                    println!("  ... (truncated)");
                }
            }
            _ => println!("Please answer 's', 'r' or 'v'."),
        }
    }
}
