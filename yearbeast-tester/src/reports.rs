use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use crate::draws::DrawSummary;
use crate::simulation::PlayRecord;

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    plays: &'a [PlayRecord],
    draws: &'a [DrawSummary],
}

fn pass_counts(plays: &[PlayRecord], draws: &[DrawSummary]) -> (usize, usize) {
    let total = plays.len() + draws.len();
    let passed = plays.iter().filter(|p| p.passed()).count()
        + draws.iter().filter(|d| d.passed()).count();
    (total, passed)
}

pub fn generate_console_report(
    out: &mut dyn Write,
    plays: &[PlayRecord],
    draws: &[DrawSummary],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Session Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "==================".cyan())?;

    let (total, passed) = pass_counts(plays, draws);
    writeln!(out, "Total runs: {total}")?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", (total - passed).to_string().red())?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for play in plays {
        let status = if play.passed() {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(out, "{} {}", status, format!("play seed {}", play.seed).bold())?;
        writeln!(
            out,
            "   Levels cleared: {} (now level {})",
            play.levels_cleared, play.final_level
        )?;
        writeln!(
            out,
            "   Taps: {} ({} hits, {} throttled, {:.1}% critical)",
            play.taps,
            play.hits,
            play.rate_limited,
            play.critical_rate() * 100.0
        )?;
        writeln!(
            out,
            "   Tasks claimed: {} (+{} firecrackers)",
            if play.tasks_claimed.is_empty() {
                "none".to_string()
            } else {
                play.tasks_claimed.join(", ")
            },
            play.task_rewards
        )?;
        writeln!(out, "   Firecrackers left: {}", play.currency_left)?;
        if play.ran_dry {
            writeln!(out, "   {}", "Ran out of firecrackers".yellow())?;
        }
        write_failures(out, &play.failures)?;
        writeln!(out)?;
    }

    for summary in draws {
        let status = if summary.passed() {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(
            out,
            "{} {}",
            status,
            format!("omikuji seed {} ({} draws)", summary.seed, summary.draws).bold()
        )?;
        for share in &summary.shares {
            writeln!(
                out,
                "   {:9} {:3} {:>6} {:5.1}% (expected {:4.1}%)",
                share.level_id,
                share.japanese,
                share.count,
                share.observed * 100.0,
                share.expected * 100.0
            )?;
        }
        write_failures(out, &summary.failures)?;
        writeln!(out)?;
    }
    Ok(())
}

fn write_failures(out: &mut dyn Write, failures: &[String]) -> Result<()> {
    if !failures.is_empty() {
        writeln!(out, "   Failures:")?;
        for failure in failures {
            writeln!(out, "     • {}", failure.red())?;
        }
    }
    Ok(())
}

pub fn generate_json_report(
    out: &mut dyn Write,
    plays: &[PlayRecord],
    draws: &[DrawSummary],
) -> Result<()> {
    let json_output = serde_json::to_string_pretty(&JsonReport { plays, draws })?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(
    out: &mut dyn Write,
    plays: &[PlayRecord],
    draws: &[DrawSummary],
) -> Result<()> {
    writeln!(out, "# Year Beast Session Results\n")?;

    let (total, passed) = pass_counts(plays, draws);
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total runs**: {total}")?;
    writeln!(out, "- **Passed**: {passed}")?;
    writeln!(out, "- **Failed**: {}\n", total - passed)?;

    if !plays.is_empty() {
        writeln!(out, "## Play Sessions\n")?;
        writeln!(
            out,
            "| Seed | Levels | Taps | Hits | Throttled | Crit % | Tasks | Left | Status |"
        )?;
        writeln!(out, "|---|---|---|---|---|---|---|---|---|")?;
        for play in plays {
            writeln!(
                out,
                "| {} | {} | {} | {} | {} | {:.1} | {} | {} | {} |",
                play.seed,
                play.levels_cleared,
                play.taps,
                play.hits,
                play.rate_limited,
                play.critical_rate() * 100.0,
                play.tasks_claimed.len(),
                play.currency_left,
                if play.passed() { "✅" } else { "❌" }
            )?;
        }
        writeln!(out)?;
    }

    for summary in draws {
        let status = if summary.passed() { "✅" } else { "❌" };
        writeln!(
            out,
            "## {} Omikuji seed {} ({} draws)\n",
            status, summary.seed, summary.draws
        )?;
        writeln!(out, "| Level | Count | Observed | Expected |")?;
        writeln!(out, "|---|---|---|---|")?;
        for share in &summary.shares {
            writeln!(
                out,
                "| {} {} | {} | {:.1}% | {:.1}% |",
                share.japanese,
                share.level_id,
                share.count,
                share.observed * 100.0,
                share.expected * 100.0
            )?;
        }
        for failure in &summary.failures {
            writeln!(out, "- {failure}")?;
        }
        writeln!(out)?;
    }

    for play in plays.iter().filter(|p| !p.passed()) {
        writeln!(out, "### Failures for seed {}\n", play.seed)?;
        for failure in &play.failures {
            writeln!(out, "- {failure}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_play(passed: bool) -> PlayRecord {
        PlayRecord {
            seed: 42,
            levels_cleared: 2,
            final_level: 3,
            taps: 220,
            hits: 220,
            critical_hits: 33,
            tasks_claimed: vec!["daily_login".to_string()],
            task_rewards: 50,
            currency_left: 4_830,
            failures: if passed {
                Vec::new()
            } else {
                vec!["broken".to_string()]
            },
            ..PlayRecord::default()
        }
    }

    #[test]
    fn json_report_nests_plays_and_draws() {
        let mut buf = Vec::new();
        generate_json_report(&mut buf, &[sample_play(true)], &[]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["plays"][0]["seed"], 42);
        assert!(value["draws"].as_array().unwrap().is_empty());
    }

    #[test]
    fn markdown_lists_failures() {
        let mut buf = Vec::new();
        generate_markdown_report(&mut buf, &[sample_play(false)], &[]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("# Year Beast Session Results"));
        assert!(text.contains("- **Failed**: 1"));
        assert!(text.contains("- broken"));
    }

    #[test]
    fn console_report_shows_claims() {
        colored::control::set_override(false);
        let mut buf = Vec::new();
        generate_console_report(&mut buf, &[sample_play(true)], &[], Duration::ZERO).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("play seed 42"));
        assert!(text.contains("daily_login (+50 firecrackers)"));
        assert!(text.contains("15.0% critical"));
    }
}
