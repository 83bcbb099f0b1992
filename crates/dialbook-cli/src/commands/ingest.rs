use crate::commands::print_json;
use crate::error::{invalid_input, partial};
use crate::open_store;
use anyhow::{Context as _, Result};
use clap::{ArgAction, Args};
use dialbook_config::AppConfig;
use dialbook_core::time::now_utc;
use dialbook_core::{ContactRecord, Locale};
use dialbook_ingest::export::write_records_file;
use dialbook_ingest::{
    build_table, detect_mapping, discover_inputs, read_table, ColumnMapping, RejectSink,
    RejectedRow,
};
use dialbook_store::upsert::UpsertReport;
use dialbook_store::Store;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// CSV files, or directories searched with --pattern
    #[arg(value_name = "PATH")]
    pub inputs: Vec<PathBuf>,
    /// Directory whose matching files are ingested (repeatable)
    #[arg(long, value_name = "DIR")]
    pub input_folder: Vec<PathBuf>,
    /// Glob applied inside directories [default: *.csv]
    #[arg(long)]
    pub pattern: Option<String>,
    /// Normalize without writing to the store; write a preview CSV instead
    #[arg(long, action = ArgAction::SetTrue)]
    pub dry_run: bool,
    #[arg(long, value_name = "PATH")]
    pub rejects_out: Option<PathBuf>,
    #[arg(long, value_name = "PATH")]
    pub preview_out: Option<PathBuf>,
    /// Records per transaction [default: 1000]
    #[arg(long)]
    pub batch_size: Option<usize>,
    /// Files processed in parallel [default: 1]
    #[arg(long)]
    pub jobs: Option<usize>,
}

pub struct IngestSettings<'a> {
    pub db_path: &'a Path,
    pub json: bool,
    pub config: &'a AppConfig,
}

struct RunOptions<'a> {
    db_path: &'a Path,
    locale: &'a Locale,
    batch_size: usize,
    dry_run: bool,
    now_utc: i64,
}

#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping: Option<ColumnMapping>,
    pub rows: usize,
    pub valid: usize,
    pub rejected: usize,
    pub upsert: UpsertReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct IngestReport {
    pub dry_run: bool,
    pub files: Vec<FileReport>,
    pub rows: usize,
    pub valid: usize,
    pub rejected: usize,
    pub inserted: usize,
    pub updated: usize,
    pub inserted_or_updated: usize,
    pub failed: usize,
    pub failed_files: usize,
    pub rejects_path: Option<String>,
    pub preview_path: Option<String>,
}

impl IngestReport {
    fn absorb(&mut self, file: FileReport) {
        self.rows += file.rows;
        self.valid += file.valid;
        self.rejected += file.rejected;
        self.inserted += file.upsert.inserted;
        self.updated += file.upsert.updated;
        self.inserted_or_updated += file.upsert.inserted_or_updated();
        self.failed += file.upsert.failed;
        if file.error.is_some() {
            self.failed_files += 1;
        }
        self.files.push(file);
    }
}

struct FileOutcome {
    report: FileReport,
    records: Vec<ContactRecord>,
    rejected: Vec<RejectedRow>,
}

impl FileOutcome {
    fn failed(path: String, error: String) -> Self {
        Self {
            report: FileReport {
                path,
                mapping: None,
                rows: 0,
                valid: 0,
                rejected: 0,
                upsert: UpsertReport::default(),
                error: Some(error),
            },
            records: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

pub fn ingest(settings: &IngestSettings<'_>, args: IngestArgs) -> Result<()> {
    let defaults = &settings.config.ingest;
    let batch_size = args.batch_size.unwrap_or(defaults.batch_size);
    if batch_size == 0 {
        return Err(invalid_input("batch size must be at least 1"));
    }
    let jobs = args.jobs.unwrap_or(defaults.jobs);
    if jobs == 0 {
        return Err(invalid_input("jobs must be at least 1"));
    }
    let pattern = args.pattern.as_deref().unwrap_or(&defaults.pattern);
    let rejects_path = args
        .rejects_out
        .unwrap_or_else(|| defaults.rejects_path.clone());
    let preview_path = args
        .preview_out
        .unwrap_or_else(|| defaults.preview_path.clone());

    let inputs = discover_inputs(&args.inputs, &args.input_folder, pattern)
        .with_context(|| "discover input files")?;
    if inputs.is_empty() {
        if settings.json {
            return print_json(&IngestReport {
                dry_run: args.dry_run,
                ..Default::default()
            });
        }
        println!("No input files found.");
        return Ok(());
    }
    debug!(
        files = inputs.len(),
        jobs,
        batch_size,
        dry_run = args.dry_run,
        "ingest starting"
    );

    if !args.dry_run {
        // Workers open their own connections; the schema must exist first.
        open_store(settings.db_path)?;
    }

    let options = RunOptions {
        db_path: settings.db_path,
        locale: &settings.config.locale,
        batch_size,
        dry_run: args.dry_run,
        now_utc: now_utc(),
    };
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .with_context(|| "start ingest workers")?;
    let outcomes: Vec<FileOutcome> = pool.install(|| {
        inputs
            .par_iter()
            .map_init(
                || worker_store(&options),
                |store, path| process_file(path, store, &options),
            )
            .collect()
    });

    let mut report = IngestReport {
        dry_run: args.dry_run,
        ..Default::default()
    };
    let mut rejects = RejectSink::new();
    let mut preview = Vec::new();
    for outcome in outcomes {
        rejects.extend(&outcome.rejected);
        preview.extend(outcome.records);
        report.absorb(outcome.report);
    }

    if !rejects.is_empty() {
        rejects
            .write(&rejects_path)
            .with_context(|| format!("write rejected rows to {}", rejects_path.display()))?;
        warn!(
            path = %rejects_path.display(),
            rows = rejects.len(),
            "rejected rows written"
        );
        report.rejects_path = Some(rejects_path.display().to_string());
    }

    if args.dry_run {
        write_records_file(&preview_path, &preview)
            .with_context(|| format!("write preview to {}", preview_path.display()))?;
        report.preview_path = Some(preview_path.display().to_string());
    }

    if settings.json {
        print_json(&report)?;
    } else {
        print_report(&report);
    }

    if report.failed > 0 || report.failed_files > 0 {
        return Err(partial(format!(
            "{} rows failed to write, {} files could not be processed",
            report.failed, report.failed_files
        )));
    }
    Ok(())
}

fn worker_store(options: &RunOptions<'_>) -> Option<Result<Store>> {
    if options.dry_run {
        return None;
    }
    Some(
        Store::open(options.db_path)
            .with_context(|| format!("open database {}", options.db_path.display())),
    )
}

fn process_file(
    path: &Path,
    store: &mut Option<Result<Store>>,
    options: &RunOptions<'_>,
) -> FileOutcome {
    let path_display = path.display().to_string();
    let store = match store.as_ref() {
        None => None,
        Some(Ok(store)) => Some(store),
        Some(Err(err)) => return FileOutcome::failed(path_display, format!("{err:#}")),
    };

    let table = match read_table(path) {
        Ok(table) => table,
        Err(err) => {
            warn!(path = %path_display, error = %err, "file skipped");
            return FileOutcome::failed(path_display, err.to_string());
        }
    };

    let mapping = detect_mapping(&table.headers);
    info!(path = %path_display, mapping = ?mapping, "column mapping detected");
    if mapping.phone.is_none() {
        debug!(path = %path_display, "no phone header, guessing phone per row");
    }

    let built = build_table(&table, &mapping, options.locale);
    for rejected in &built.rejected {
        debug!(path = %path_display, line = rejected.line, reason = %rejected.reason, "row rejected");
    }

    let upsert = match store {
        Some(store) => store
            .upsert_engine(options.locale)
            .with_batch_size(options.batch_size)
            .run(options.now_utc, &built.records),
        None => UpsertReport::default(),
    };

    FileOutcome {
        report: FileReport {
            path: path_display,
            mapping: Some(mapping),
            rows: table.rows.len(),
            valid: built.records.len(),
            rejected: built.rejected.len(),
            upsert,
            error: None,
        },
        records: if options.dry_run {
            built.records
        } else {
            Vec::new()
        },
        rejected: built.rejected,
    }
}

fn print_report(report: &IngestReport) {
    for file in &report.files {
        match &file.error {
            Some(error) => println!("{}: skipped ({})", file.path, error),
            None => println!(
                "{}: {} rows, {} valid, {} rejected, {} failed",
                file.path, file.rows, file.valid, file.rejected, file.upsert.failed
            ),
        }
    }

    if report.dry_run {
        println!(
            "Dry run: {} valid, {} rejected across {} files",
            report.valid,
            report.rejected,
            report.files.len()
        );
    } else {
        println!(
            "Upserted {} contacts (inserted {}, updated {}), {} failed, {} rejected",
            report.inserted_or_updated,
            report.inserted,
            report.updated,
            report.failed,
            report.rejected
        );
    }
    if let Some(path) = &report.preview_path {
        println!("Preview written to {path}");
    }
    if let Some(path) = &report.rejects_path {
        println!("Rejected rows written to {path}");
    }
}
