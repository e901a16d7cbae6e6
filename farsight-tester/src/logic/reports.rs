use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use super::checks::CheckResult;
use super::simulation::PlaySummary;

#[allow(clippy::cast_precision_loss)]
fn success_rate(results: &[CheckResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let passed = results.iter().filter(|r| r.passed).count();
    (passed as f64 / results.len() as f64) * 100.0
}

pub fn generate_console_report(
    out: &mut dyn Write,
    results: &[CheckResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Check Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "========================".cyan())?;

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    writeln!(out, "Total checks: {total}")?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", (total - passed).to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(results))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(out, "{} {}", status, result.check_name.bold())?;
        writeln!(out, "   {}", result.description)?;
        writeln!(
            out,
            "   Seeds: {} | Time: {:?}",
            result.seeds_run, result.duration
        )?;
        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }

    let plays: Vec<&PlaySummary> = results.iter().flat_map(|r| &r.plays).collect();
    if !plays.is_empty() {
        writeln!(out, "{}", "🎯 Simulated Play Summary".bright_yellow().bold())?;
        writeln!(out, "{}", "=========================".yellow())?;
        for play in plays {
            writeln!(
                out,
                "{:<8} {:<10} stages {:>3} mean {:>5.1} perfect {:>3} zero {:>3}",
                play.strategy,
                play.category.label(),
                play.stages_played,
                play.mean_score(),
                play.perfect_stages,
                play.zero_stages
            )?;
        }
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, results: &[CheckResult]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(results)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, results: &[CheckResult]) -> Result<()> {
    writeln!(out, "# Farsight Check Results\n")?;

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total checks**: {total}")?;
    writeln!(out, "- **Passed**: {passed}")?;
    writeln!(out, "- **Failed**: {}", total - passed)?;
    writeln!(out, "- **Success rate**: {:.1}%\n", success_rate(results))?;

    writeln!(out, "## Detailed Results\n")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(out, "### {} {}\n", status, result.check_name)?;
        writeln!(out, "{}\n", result.description)?;
        writeln!(out, "- **Seeds**: {}", result.seeds_run)?;
        writeln!(out, "- **Time**: {:?}", result.duration)?;
        if !result.failures.is_empty() {
            writeln!(out, "- **Failures**:")?;
            for failure in &result.failures {
                writeln!(out, "  - {failure}")?;
            }
        }
        if !result.plays.is_empty() {
            writeln!(out, "\n| Strategy | Category | Stages | Mean | Perfect |")?;
            writeln!(out, "|---|---|---|---|---|")?;
            for play in &result.plays {
                writeln!(
                    out,
                    "| {} | {} | {} | {:.1} | {} |",
                    play.strategy,
                    play.category.label(),
                    play.stages_played,
                    play.mean_score(),
                    play.perfect_stages
                )?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, failures: &[&str]) -> CheckResult {
        CheckResult {
            check_name: name.to_string(),
            description: "demo".to_string(),
            passed: failures.is_empty(),
            seeds_run: 1,
            failures: failures.iter().map(ToString::to_string).collect(),
            plays: Vec::new(),
            duration: Duration::from_millis(3),
        }
    }

    #[test]
    fn markdown_lists_failures() {
        let mut out = Vec::new();
        generate_markdown_report(&mut out, &[result("a", &[]), result("b", &["broken"])]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("- **Passed**: 1"));
        assert!(text.contains("### ❌ b"));
        assert!(text.contains("  - broken"));
    }

    #[test]
    fn json_serializes_duration_in_millis() {
        let mut out = Vec::new();
        generate_json_report(&mut out, &[result("a", &[])]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["duration"], 3);
        assert!(value[0].get("plays").is_none());
    }

    #[test]
    fn console_reports_rate() {
        let mut out = Vec::new();
        generate_console_report(&mut out, &[result("a", &[])], Duration::ZERO).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Success rate: 100.0%"));
    }
}
