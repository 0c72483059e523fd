//! Output module for crawl summaries
//!
//! This module handles:
//! - Store statistics (totals, today's fetches, top URL prefixes)
//! - The end-of-run report

pub mod stats;

pub use stats::{load_statistics, print_statistics, start_of_today, StoreStatistics};

use crate::crawler::RunReport;

/// Prints the counters of a finished run to stdout
pub fn print_run_report(report: &RunReport) {
    let stats = &report.stats;

    println!("=== Crawl Run ===\n");
    println!("Stopped: {}", report.stop_reason);
    println!("Elapsed: {:.1}s", report.elapsed.as_secs_f64());
    println!();

    println!("URLs processed: {}", stats.processed);
    println!("  New:          {}", stats.new);
    println!("  Changed:      {}", stats.changed);
    println!("  Unchanged:    {}", stats.unchanged);
    println!("  Skipped:      {}", stats.skipped);
    println!("  Out of scope: {}", stats.out_of_scope);
    println!("  Failed:       {}", stats.failed);
    println!("  Non-HTML:     {}", stats.not_html);
    println!("Links queued:   {}", stats.enqueued);
    if stats.errors > 0 {
        println!("Errors:         {}", stats.errors);
    }
    println!();
}
