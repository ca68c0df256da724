use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use crate::simulation::GameReport;

pub fn generate_console_report(
    out: &mut dyn Write,
    reports: &[GameReport],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Casino Simulation Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "============================".cyan())?;

    let total = reports.len();
    let passed = reports.iter().filter(|r| r.passed).count();
    writeln!(out, "Total runs: {total}")?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", (total - passed).to_string().red())?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for report in reports {
        let status = if report.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(
            out,
            "{} {} (seed {})",
            status,
            report.game.key().bold(),
            report.seed
        )?;
        writeln!(
            out,
            "   Rounds: {}  wagered: {}  paid: {}",
            report.rounds, report.wagered, report.paid
        )?;
        match report.expected_return {
            Some(expected) => writeln!(
                out,
                "   Return to player: {:.3} (configured {expected:.3})",
                report.return_to_player
            )?,
            None => writeln!(out, "   Return to player: {:.3}", report.return_to_player)?,
        }
        for (label, count) in &report.hits {
            writeln!(out, "     {label:>10}: {count}")?;
        }
        if !report.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &report.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, reports: &[GameReport]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(reports)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, reports: &[GameReport]) -> Result<()> {
    writeln!(out, "# Egg Casino Simulation Results\n")?;

    let total = reports.len();
    let passed = reports.iter().filter(|r| r.passed).count();
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total runs**: {total}")?;
    writeln!(out, "- **Passed**: {passed}")?;
    writeln!(out, "- **Failed**: {}\n", total - passed)?;

    writeln!(out, "## Detailed Results\n")?;
    writeln!(out, "| Game | Seed | Rounds | Wagered | Paid | RTP | Status |")?;
    writeln!(out, "|------|------|--------|---------|------|-----|--------|")?;
    for report in reports {
        let status = if report.passed { "✅" } else { "❌" };
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {:.3} | {status} |",
            report.game.key(),
            report.seed,
            report.rounds,
            report.wagered,
            report.paid,
            report.return_to_player
        )?;
    }

    let failing: Vec<_> = reports.iter().filter(|r| !r.passed).collect();
    if !failing.is_empty() {
        writeln!(out, "\n## Failures\n")?;
        for report in failing {
            writeln!(out, "### {} seed {}\n", report.game.key(), report.seed)?;
            for failure in &report.failures {
                writeln!(out, "- {failure}")?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}
