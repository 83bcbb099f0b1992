use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use anyhow::{Context as _, Result};
use clap::{ArgAction, Args};
use dialbook_core::time::format_timestamp_datetime;
use dialbook_core::GeographyBucket;
use dialbook_ingest::export::write_contacts_file;
use dialbook_store::query::ContactQuery;
use serde::Serialize;
use std::path::PathBuf;

pub const DEFAULT_LIST_LIMIT: i64 = 100;

#[derive(Debug, Args)]
pub struct CountArgs {
    #[arg(long, value_parser = parse_bucket)]
    pub bucket: Option<GeographyBucket>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Restrict to these buckets (repeatable)
    #[arg(long, value_parser = parse_bucket, value_name = "BUCKET")]
    pub bucket: Vec<GeographyBucket>,
    #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
    pub limit: i64,
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "limit")]
    pub all: bool,
    /// Write the selected contacts to a CSV file
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct CountReport {
    bucket: Option<GeographyBucket>,
    count: i64,
}

#[derive(Debug, Serialize)]
struct ExportReport {
    count: usize,
    output: String,
}

pub fn count_contacts(ctx: &Context<'_>, args: CountArgs) -> Result<()> {
    let repo = ctx.store.contacts();
    let count = match args.bucket {
        Some(bucket) => repo.count_by_bucket(bucket)?,
        None => repo.count()?,
    };

    if ctx.json {
        return print_json(&CountReport {
            bucket: args.bucket,
            count,
        });
    }
    println!("{count}");
    Ok(())
}

pub fn list_contacts(ctx: &Context<'_>, args: ListArgs) -> Result<()> {
    if args.limit < 0 {
        return Err(invalid_input("limit cannot be negative"));
    }
    let limit = if args.all { None } else { Some(args.limit) };
    let query = ContactQuery::in_buckets(&args.bucket).with_limit(limit);
    let contacts = ctx.store.contacts().list_contacts(&query)?;

    if let Some(path) = args.export {
        write_contacts_file(&path, &contacts)
            .with_context(|| format!("export contacts to {}", path.display()))?;
        if ctx.json {
            return print_json(&ExportReport {
                count: contacts.len(),
                output: path.display().to_string(),
            });
        }
        println!("Exported {} contacts to {}", contacts.len(), path.display());
        return Ok(());
    }

    if ctx.json {
        return print_json(&contacts);
    }

    if contacts.is_empty() {
        println!("No contacts found.");
        return Ok(());
    }
    for contact in contacts {
        println!(
            "{}  {:<17}  {}  {}  (updated {})",
            contact.phone,
            contact.geography_bucket,
            contact.name.as_deref().unwrap_or("-"),
            contact.city.as_deref().unwrap_or("-"),
            format_timestamp_datetime(contact.updated_at)
        );
    }
    Ok(())
}

fn parse_bucket(raw: &str) -> std::result::Result<GeographyBucket, String> {
    GeographyBucket::parse(raw).ok_or_else(|| {
        let expected: Vec<&str> = GeographyBucket::ALL.iter().map(|b| b.as_str()).collect();
        format!("expected one of {}", expected.join(", "))
    })
}
