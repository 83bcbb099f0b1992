use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use anyhow::Result;
use clap::Args;
use dialbook_core::time::now_utc;
use dialbook_store::repo::{BucketCount, DailyCount};
use serde::Serialize;

pub const DEFAULT_STATS_DAYS: i64 = 30;

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Number of UTC days, today included, for the daily additions
    #[arg(long, default_value_t = DEFAULT_STATS_DAYS)]
    pub days: i64,
}

#[derive(Debug, Serialize)]
struct StatsReport {
    total: i64,
    primary_city: String,
    primary_state: String,
    buckets: Vec<BucketCount>,
    days: i64,
    daily_added: Vec<DailyCount>,
}

pub fn stats(ctx: &Context<'_>, args: StatsArgs) -> Result<()> {
    if args.days < 1 {
        return Err(invalid_input("days must be at least 1"));
    }

    let repo = ctx.store.contacts();
    let report = StatsReport {
        total: repo.count()?,
        primary_city: ctx.config.locale.primary_city.clone(),
        primary_state: ctx.config.locale.primary_state.clone(),
        buckets: repo.distribution()?,
        days: args.days,
        daily_added: repo.daily_added(now_utc(), args.days)?,
    };

    if ctx.json {
        return print_json(&report);
    }

    println!(
        "Contacts: {} (primary city {}, primary state {})",
        report.total, report.primary_city, report.primary_state
    );
    for entry in &report.buckets {
        println!("  {:<17} {}", entry.bucket, entry.count);
    }
    println!("Added per day, last {} days:", report.days);
    if report.daily_added.is_empty() {
        println!("  none");
    }
    for entry in &report.daily_added {
        println!("  {}  {}", entry.day, entry.count);
    }
    Ok(())
}
