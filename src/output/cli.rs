//! CLI table output formatter
//!
//! Human-readable terminal output with colored tables.

use colored::Colorize;
use prettytable::{format, Cell, Row, Table};

use crate::report::{AuditReport, CrawlSummary, Severity, Violation};

/// Format and print an audit report to the terminal
pub fn print_report(report: &AuditReport) {
    println!();
    print_header(report);
    print_scores(report);

    let violations: Vec<&Violation> = report.violations.iter().collect();
    if !violations.is_empty() {
        print_violations_table(&violations);
    }

    print_top_issues(report);
    print_auxiliary(report);
    print_footer(report);
}

fn print_header(report: &AuditReport) {
    println!("{}", "═".repeat(70).cyan());
    println!(
        "{} {}",
        "Accessibility Report".cyan().bold(),
        format!("({})", report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")).dimmed()
    );
    println!("{}", "═".repeat(70).cyan());
    println!();
    println!("{} {}", "URL:".bold(), report.url);
    println!(
        "{} {} · engine {}",
        "Browser:".bold(),
        report.meta.browser_version,
        report.meta.engine_version
    );
    println!();
}

fn colored_score(score: u8) -> colored::ColoredString {
    let text = score.to_string();
    if score >= 90 {
        text.green().bold()
    } else if score >= 70 {
        text.yellow().bold()
    } else {
        text.red().bold()
    }
}

fn print_scores(report: &AuditReport) {
    println!("{}", "Summary".bold().underline());
    println!();
    println!("  {} {} / 100", "Score:".bold(), colored_score(report.score));
    println!(
        "  {} {} ({} critical)",
        "Violations:".bold(),
        report.stats.total_violations,
        report.stats.critical_count
    );
    println!();

    let buckets = &report.violations;
    println!(
        "  {} {}   {} {}   {} {}   {} {}",
        "Critical:".red().bold(),
        buckets.critical.len(),
        "Serious:".truecolor(255, 165, 0).bold(),
        buckets.serious.len(),
        "Moderate:".yellow().bold(),
        buckets.moderate.len(),
        "Minor:".dimmed().bold(),
        buckets.minor.len()
    );
    println!();
}

fn print_violations_table(violations: &[&Violation]) {
    println!("{}", "Violations".bold().underline());
    println!();

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.add_row(Row::new(vec![
        Cell::new("Rule").style_spec("bFc"),
        Cell::new("Severity").style_spec("bFc"),
        Cell::new("Nodes").style_spec("bFc"),
        Cell::new("Title").style_spec("bFc"),
    ]));

    for violation in violations {
        let severity_cell = match violation.severity {
            Severity::Critical => Cell::new("CRITICAL").style_spec("Fr"),
            Severity::Serious => Cell::new("Serious").style_spec("Fy"),
            Severity::Moderate => Cell::new("Moderate").style_spec("Fw"),
            Severity::Minor => Cell::new("Minor").style_spec("Fd"),
        };

        let title = if violation.title.len() > 48 {
            format!("{}...", &violation.title[..45])
        } else {
            violation.title.clone()
        };

        table.add_row(Row::new(vec![
            Cell::new(&violation.id),
            severity_cell,
            Cell::new(&violation.count.to_string()),
            Cell::new(&title),
        ]));
    }

    table.printstd();
    println!();
}

fn print_top_issues(report: &AuditReport) {
    if report.human_readable.top_issues.is_empty() {
        return;
    }
    println!("{}", "Top Issues".bold().underline());
    println!();
    for (i, issue) in report.human_readable.top_issues.iter().enumerate() {
        println!("  {}. {}", i + 1, issue);
    }
    println!();

    println!("{}", "Suggested Fixes".bold().underline());
    println!();
    for item in report.human_readable.action_items.iter().take(5) {
        println!(
            "  {} {} [{}] {}",
            "•".cyan(),
            item.rule_id.bold(),
            item.priority,
            item.category.dimmed()
        );
        println!("    {}", item.fix.dimmed());
    }
    println!();
}

fn print_auxiliary(report: &AuditReport) {
    if let Some(perf) = &report.performance {
        println!("{}", "Core Web Vitals".bold().underline());
        println!();
        let fmt = |name: &str, metric: Option<crate::report::MetricValue>, unit: &str| {
            if let Some(m) = metric {
                let rating = match m.rating {
                    crate::report::MetricRating::Good => "good".green(),
                    crate::report::MetricRating::NeedsImprovement => {
                        "needs-improvement".yellow()
                    }
                    crate::report::MetricRating::Poor => "poor".red(),
                };
                println!("  {:<6} {:>8.1}{} ({})", name, m.value, unit, rating);
            }
        };
        fmt("LCP", perf.lcp, "ms");
        fmt("CLS", perf.cls, "");
        fmt("INP", perf.inp, "ms");
        fmt("TBT", perf.tbt, "ms");
        fmt("FCP", perf.fcp, "ms");
        fmt("TTFB", perf.ttfb, "ms");
        println!();
    }

    if let Some(keyboard) = &report.keyboard_navigation {
        println!(
            "{} {} steps, {} issues",
            "Keyboard:".bold(),
            keyboard.steps_taken,
            keyboard.issues.len()
        );
    }
    if let Some(headings) = &report.heading_structure {
        println!(
            "{} {} headings, {} issues",
            "Headings:".bold(),
            headings.headings.len(),
            headings.issues.len()
        );
    }
    if let Some(links) = &report.broken_links {
        let broken = links.broken.len();
        let label = format!("{} checked, {} broken", links.total_checked, broken);
        println!(
            "{} {}",
            "Links:".bold(),
            if broken > 0 {
                label.red().to_string()
            } else {
                label.green().to_string()
            }
        );
    }
    println!();
}

fn print_footer(report: &AuditReport) {
    let verdict = if report.score >= 70 && report.violations.critical.is_empty() {
        "PASS".green().bold()
    } else {
        "NEEDS IMPROVEMENT".red().bold()
    };
    println!("{}", "═".repeat(70).cyan());
    println!("{} {}", "Overall:".bold(), verdict);
    println!("{}", "═".repeat(70).cyan());
    println!();
}

/// Format and print a crawl summary to the terminal
pub fn print_summary(summary: &CrawlSummary) {
    println!();
    println!("{}", "═".repeat(70).cyan());
    println!("{}", "Crawl Summary".cyan().bold());
    println!("{}", "═".repeat(70).cyan());
    println!();
    println!("{} {}", "Root:".bold(), summary.root_url);
    println!("{} {}", "Pages scanned:".bold(), summary.total_pages_scanned);
    println!(
        "  {} {} / 100",
        "Average score:".bold(),
        colored_score(summary.average_score)
    );
    println!(
        "  {} {} ({} critical)",
        "Total violations:".bold(),
        summary.total_violations,
        summary.total_critical_violations
    );
    println!();

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.add_row(Row::new(vec![
        Cell::new("URL").style_spec("bFc"),
        Cell::new("Score").style_spec("bFc"),
        Cell::new("Violations").style_spec("bFc"),
        Cell::new("Critical").style_spec("bFc"),
    ]));
    for page in &summary.pages {
        let url = if page.url.len() > 50 {
            format!("{}...", &page.url[..47])
        } else {
            page.url.clone()
        };
        table.add_row(Row::new(vec![
            Cell::new(&url),
            Cell::new(&page.score.to_string()),
            Cell::new(&page.stats.total_violations.to_string()),
            Cell::new(&page.stats.critical_count.to_string()),
        ]));
    }
    table.printstd();

    if let Some(perf) = &summary.performance_summary {
        println!();
        println!("{}", "Average Web Vitals".bold().underline());
        if let Some(lcp) = perf.lcp {
            println!("  LCP {:.0}ms", lcp);
        }
        if let Some(cls) = perf.cls {
            println!("  CLS {:.3}", cls);
        }
        if let Some(inp) = perf.inp {
            println!("  INP {:.0}ms", inp);
        }
        if let Some(tbt) = perf.tbt {
            println!("  TBT {:.0}ms", tbt);
        }
    }
    println!();
}
