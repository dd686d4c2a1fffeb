// Plain-text tables for stdout.

use std::fmt::{self, Write};

use crease_core::aggregate::YearRange;
use crease_core::corpus::MatchFormat;
use crease_core::optimizer::SelectionResult;
use crease_core::selector::SelectionQuery;
use crease_core::summary::{
    BattingLine, BowlingLine, Contributions, FormatLeaders, Leader, PlayerComparison,
    PlayerSummary, SeasonLine, YearContributions,
};

const NAME_WIDTH: usize = 28;

fn label(format: MatchFormat) -> String {
    format.key().to_uppercase()
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".into())
}

pub fn selection(
    out: &mut impl Write,
    query: &SelectionQuery,
    result: &SelectionResult,
) -> fmt::Result {
    writeln!(out, "Optimal {} XI, {}", label(query.format), query.range)?;
    writeln!(
        out,
        "{:<3} {:<NAME_WIDTH$} {:<7} {:>8} {:>8} {:>8}",
        "#", "Player", "Role", "Bat", "Bowl", "Total"
    )?;
    for (i, selected) in result.players.iter().enumerate() {
        let p = &selected.player;
        writeln!(
            out,
            "{:<3} {:<NAME_WIDTH$} {:<7} {:>8.2} {:>8.2} {:>8.2}",
            i + 1,
            p.name(),
            selected.assigned_role.to_string(),
            p.bat_points(),
            p.bowl_points(),
            p.total_points()
        )?;
    }
    writeln!(out, "Team points: {:.2}", result.objective())
}

pub fn player_summary(out: &mut impl Write, summary: &PlayerSummary) -> fmt::Result {
    writeln!(out, "{}, {}", summary.name, summary.range)?;
    if summary.is_empty() {
        return writeln!(out, "No records.");
    }
    for fs in &summary.formats {
        let label = label(fs.format);
        if let Some(bat) = &fs.batting {
            writeln!(out, "{label:<5} {}", batting_line(bat))?;
        }
        if let Some(bowl) = &fs.bowling {
            writeln!(out, "{label:<5} {}", bowling_line(bowl))?;
        }
    }
    let (bat, bowl) = summary.totals();
    writeln!(out, "{:<5} {}", "All", batting_line(&bat))?;
    writeln!(out, "{:<5} {}", "All", bowling_line(&bowl))
}

fn batting_line(line: &BattingLine) -> String {
    format!(
        "bat   inns {:>4}  runs {:>6}  avg {:>6.2}  sr {:>6.2}  4s {:>4}  6s {:>4}",
        line.innings,
        line.runs,
        line.average(),
        line.strike_rate(),
        line.fours,
        line.sixes
    )
}

fn bowling_line(line: &BowlingLine) -> String {
    format!(
        "bowl  inns {:>4}  wkts {:>6}  avg {:>6}  econ {:>6}  overs {:.1}",
        line.innings,
        line.wickets,
        optional(line.average()),
        optional(line.economy()),
        line.overs
    )
}

fn leader_rows(out: &mut impl Write, title: &str, rows: &[Leader]) -> fmt::Result {
    writeln!(out, "  {:<NAME_WIDTH$} {:>8} {:>8}", title, "", "Avg")?;
    for l in rows {
        writeln!(
            out,
            "    {:<NAME_WIDTH$} {:>8} {:>8}",
            l.name,
            l.value,
            optional(l.average)
        )?;
    }
    Ok(())
}

pub fn format_leaders(
    out: &mut impl Write,
    format: MatchFormat,
    range: YearRange,
    leaders: &FormatLeaders,
) -> fmt::Result {
    writeln!(out, "{} leaders, {}", label(format), range)?;
    leader_rows(out, "Runs", &leaders.run_scorers)?;
    leader_rows(out, "Wickets", &leaders.wicket_takers)
}

fn contribution_rows(out: &mut impl Write, title: &str, c: &Contributions) -> fmt::Result {
    let total = c.total();
    let share = |v: f64| if total > 0.0 { v / total * 100.0 } else { 0.0 };
    writeln!(out, "  {title} ({total} total)")?;
    for row in &c.top {
        writeln!(
            out,
            "    {:<NAME_WIDTH$} {:>8} {:>6.1}%",
            row.name,
            row.value,
            share(row.value)
        )?;
    }
    writeln!(
        out,
        "    {:<NAME_WIDTH$} {:>8} {:>6.1}%",
        "Others",
        c.others,
        share(c.others)
    )
}

pub fn year_contributions(
    out: &mut impl Write,
    format: MatchFormat,
    year: &YearContributions,
) -> fmt::Result {
    writeln!(out, "{} in {}", label(format), year.year)?;
    contribution_rows(out, "Runs", &year.runs)?;
    contribution_rows(out, "Wickets", &year.wickets)
}

fn season_cell(line: &SeasonLine) -> String {
    let runs = line.runs.map(|r| r.to_string()).unwrap_or_else(|| "-".into());
    let wickets = line.wickets.map(|w| w.to_string()).unwrap_or_else(|| "-".into());
    format!("{runs:>6} / {wickets:<4}")
}

pub fn comparison(out: &mut impl Write, cmp: &PlayerComparison) -> fmt::Result {
    let (a, b) = (&cmp.first.name, &cmp.second.name);
    writeln!(out, "{a} vs {b}, {} (runs / wickets)", cmp.first.range)?;
    writeln!(out, "{:<5} {:<6} {:<20} {:<20}", "", "Year", a, b)?;
    for season in &cmp.seasons {
        writeln!(
            out,
            "{:<5} {:<6} {:<20} {:<20}",
            label(season.format),
            season.year,
            season_cell(&season.first),
            season_cell(&season.second)
        )?;
    }

    for summary in [&cmp.first, &cmp.second] {
        writeln!(out)?;
        player_summary(out, summary)?;
    }
    Ok(())
}
