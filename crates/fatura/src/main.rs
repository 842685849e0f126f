use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use fatura::normalize::format_brl;
use fatura::{checksum, export, ExportFormat, InputKind, ParseOptions, SourceDocument};

mod batch;

const USAGE: &str = "\
Usage:
  fatura <input> [options]          convert one statement (CSV or PDF)
  fatura --batch <dir> [options]    interactively convert every statement under <dir>

Options:
  -o, --output <file>          output path (default: <input>_parsed.<ext>)
  -f, --format <csv|json|ynab> output format (default: csv)
  -t, --type <csv|pdf>         input type override (default: auto-detect)
  -p, --password-file <file>   file containing the PDF password
  -v, --verbose                print every skipped-row warning
  -h, --help                   show this help";

struct Options {
    batch_dir: Option<PathBuf>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    format: ExportFormat,
    kind: Option<InputKind>,
    password_file: Option<PathBuf>,
    verbose: bool,
}

fn parse_args(args: &[String]) -> Result<Option<Options>> {
    let mut opts = Options {
        batch_dir: None,
        input: None,
        output: None,
        format: ExportFormat::Csv,
        kind: None,
        password_file: None,
        verbose: false,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                println!("{USAGE}");
                return Ok(None);
            }
            "--batch" => {
                opts.batch_dir = Some(PathBuf::from(next_value(args, &mut i, "--batch")?))
            }
            "-o" | "--output" => {
                opts.output = Some(PathBuf::from(next_value(args, &mut i, "--output")?))
            }
            "-f" | "--format" => {
                let v = next_value(args, &mut i, "--format")?;
                opts.format = ExportFormat::from_arg(&v)
                    .with_context(|| format!("unknown format '{v}' (csv, json or ynab)"))?;
            }
            "-t" | "--type" => {
                let v = next_value(args, &mut i, "--type")?;
                opts.kind = Some(
                    InputKind::from_arg(&v)
                        .with_context(|| format!("unknown input type '{v}' (csv or pdf)"))?,
                );
            }
            "-p" | "--password-file" => {
                opts.password_file =
                    Some(PathBuf::from(next_value(args, &mut i, "--password-file")?))
            }
            "-v" | "--verbose" => opts.verbose = true,
            flag if flag.starts_with('-') => bail!("unknown option '{flag}'\n{USAGE}"),
            arg => {
                if opts.input.is_some() {
                    bail!("only one input file is accepted\n{USAGE}");
                }
                opts.input = Some(PathBuf::from(arg));
            }
        }
        i += 1;
    }

    Ok(Some(opts))
}

fn next_value(args: &[String], i: &mut usize, name: &str) -> Result<String> {
    *i += 1;
    args.get(*i)
        .cloned()
        .with_context(|| format!("{name} expects a value"))
}

fn read_password(path: Option<&Path>) -> Result<Option<String>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Cannot read password file {}", path.display()))?;
    Ok(Some(contents.trim().to_string()))
}

pub(crate) fn default_output_path(input: &Path, format: ExportFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("fatura");
    input.with_file_name(format!("{stem}_parsed.{}", format.output_extension()))
}

pub(crate) fn print_warnings(warnings: &[String], verbose: bool) {
    if warnings.is_empty() {
        return;
    }
    if verbose {
        for warning in warnings {
            println!("⚠️  {warning}");
        }
    } else {
        println!(
            "⚠️  {} row(s) skipped (run with -v to list them)",
            warnings.len()
        );
    }
}

pub(crate) fn print_totals(source: &SourceDocument, computed_cents: i64) {
    println!("─────────────────────────────────────────");
    println!("Calculated from rows:  {}", format_brl(computed_cents));
    if let SourceDocument::Pdf(pdf) = source {
        if let Some(declared) = pdf.summary.total_cents {
            println!("Statement total:       {}", format_brl(declared));
            let difference = declared - computed_cents;
            if difference == 0 {
                println!("Difference:            {} ✓", format_brl(0));
            } else {
                println!("Difference:            {}", format_brl(difference));
            }
        }
        if let Some(payment) = pdf.summary.payment_cents {
            println!("Payment credited:      {}", format_brl(payment));
        }
    }
    println!("─────────────────────────────────────────");
}

fn run_single(opts: &Options) -> Result<()> {
    let input = opts
        .input
        .as_ref()
        .with_context(|| format!("an input file is required (or use --batch)\n{USAGE}"))?;

    let parse_opts = ParseOptions {
        kind: opts.kind,
        password: read_password(opts.password_file.as_deref())?,
        period: None,
    };

    println!("📖 Parsing {}", input.display());
    let source = fatura::load_source(input, &parse_opts)
        .with_context(|| format!("Failed reading {}", input.display()))?;
    let result = fatura::parse_source(&source, &parse_opts)
        .with_context(|| format!("Failed parsing {}", input.display()))?;

    let rendered = export::render(&result, opts.format)?;
    let output = opts
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(input, opts.format));
    fs::write(&output, rendered)
        .with_context(|| format!("Failed writing {}", output.display()))?;

    println!(
        "✓ {} transaction(s) from {} source",
        result.transactions.len(),
        source.label()
    );
    print_warnings(&result.warnings, opts.verbose);
    print_totals(&source, result.total_cents());
    println!("🔐 SHA-256: {}", checksum::file_sha256(input)?);
    println!("✅ Output written to: {}", output.display());

    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let Some(opts) = parse_args(&args)? else {
        return Ok(());
    };

    if let Some(dir) = &opts.batch_dir {
        let batch_opts = batch::BatchOptions {
            dir: dir.clone(),
            format: opts.format,
            password: read_password(opts.password_file.as_deref())?,
            verbose: opts.verbose,
        };
        return batch::run(&batch_opts);
    }

    run_single(&opts)
}
