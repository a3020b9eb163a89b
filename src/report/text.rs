//! Plain-text rendering of check results for terminals and logs

use std::fmt::Write;

use crate::campaign::{
    rules, CampaignSource, CheckReport, Condition, DayCountCheck, ShareCheck,
};
use crate::stats::Statistics;

/// Aligned count/avg/min/max table
pub fn render_statistics(stats: &Statistics) -> String {
    let mut out = String::new();
    if stats.is_empty() {
        out.push_str("  no measurements\n");
        return out;
    }
    let _ = writeln!(out, "  {:<18} {:>10} {:>10} {:>10}", "", "avg", "min", "max");
    for (label, summary) in [
        ("Download (Mbit/s)", stats.download),
        ("Upload (Mbit/s)", stats.upload),
        ("Ping (ms)", stats.latency),
    ] {
        let _ = writeln!(
            out,
            "  {:<18} {:>10.2} {:>10.2} {:>10.2}",
            label, summary.avg, summary.min, summary.max
        );
    }
    let _ = writeln!(out, "  {:<18} {:>10}", "Measurements", stats.count);
    out
}

fn source_label(report: &CheckReport) -> String {
    let stats = &report.result.stats;
    match report.source {
        CampaignSource::AsProvided => format!(
            "all measurements ({} measurements, {})",
            stats.total_measurements,
            stats.date_range_label()
        ),
        CampaignSource::Selected => format!(
            "selected subset ({} measurements, {})",
            stats.total_measurements,
            stats.date_range_label()
        ),
        CampaignSource::Insufficient => format!(
            "too few measurements ({}/{})",
            stats.total_measurements,
            rules::REQUIRED_MEASUREMENTS
        ),
        CampaignSource::NotConstructible => format!(
            "no compliant subset in {} measurements over {} days",
            stats.total_measurements, stats.day_count
        ),
    }
}

fn status(failed: bool) -> &'static str {
    if failed {
        "FAILED"
    } else {
        "ok"
    }
}

fn day_line(n: usize, condition: &Condition<DayCountCheck>) -> String {
    format!(
        "  {}. {}: download {}/{} days, upload {}/{} days -> {}",
        n,
        condition.check,
        condition.download.days,
        rules::REQUIRED_DAYS,
        condition.upload.days,
        rules::REQUIRED_DAYS,
        status(condition.failed)
    )
}

fn share_line(n: usize, condition: &Condition<ShareCheck>) -> String {
    format!(
        "  {}. {}: download {:.1}%, upload {:.1}% -> {}",
        n,
        condition.check,
        condition.download.percentage,
        condition.upload.percentage,
        status(condition.failed)
    )
}

/// Human-readable summary of a check
pub fn render_check(report: &CheckReport) -> String {
    let result = &report.result;
    let mut out = String::new();

    out.push_str("BNetzA underperformance check\n");
    out.push_str("=============================\n");
    let _ = writeln!(
        out,
        "Contract:  {:.2} / {:.2} Mbit/s (download / upload)",
        report.contract.download, report.contract.upload
    );
    let _ = writeln!(out, "Campaign:  {}", source_label(report));
    let _ = writeln!(out, "Valid:     {}", if result.valid { "yes" } else { "no" });
    let verdict = match (&result.breakdown, result.underperformance) {
        (None, _) => "not evaluated",
        (Some(_), true) => "UNDERPERFORMANCE",
        (Some(_), false) => "no underperformance",
    };
    let _ = writeln!(out, "Verdict:   {}", verdict);
    if !result.reason.is_empty() {
        let _ = writeln!(out, "Reason:    {}", result.reason);
    }

    if let Some(breakdown) = &result.breakdown {
        out.push_str("\nConditions\n");
        let _ = writeln!(out, "{}", day_line(1, &breakdown.peak));
        let _ = writeln!(out, "{}", share_line(2, &breakdown.aggregate));
        let _ = writeln!(out, "{}", day_line(3, &breakdown.floor));
    }

    out.push_str("\nStatistics\n");
    out.push_str(&render_statistics(&result.stats.statistics));

    if !result.errors.is_empty() {
        out.push_str("\nErrors\n");
        for e in &result.errors {
            let _ = writeln!(out, "  - {}", e);
        }
    }
    if !result.warnings.is_empty() {
        out.push_str("\nWarnings\n");
        for w in &result.warnings {
            let _ = writeln!(out, "  - {}", w);
        }
    }
    out
}
