use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use evopath_engine::{Attribute, EvolutionId, Player, SearchOutcome, WorkRateSide};

use crate::common::util::csv_field;

const CSV_HEADER: &str = "name,pac,sho,pas,dri,def,phy,ovr,skills,wf,positions,plus_trait,traits,att_wr,def_wr,rarity,evolutions";

fn join_tags<'a, I>(tags: I, separator: &str) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    tags.into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(separator)
}

fn trail(ids: &[EvolutionId], separator: &str) -> String {
    ids.iter()
        .map(EvolutionId::as_str)
        .collect::<Vec<_>>()
        .join(separator)
}

/// Escape pipes so free text stays inside one markdown table cell.
fn md_cell(value: &str) -> String {
    value.replace('|', "\\|")
}

fn or_dash(value: String) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value
    }
}

pub fn generate_console_report<W: Write>(
    writer: &mut W,
    outcome: &SearchOutcome,
    total_duration: Duration,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "🔎 Evopath Search Results".bright_cyan().bold())?;
    writeln!(writer, "{}", "=========================".cyan())?;

    let stats = &outcome.stats;
    writeln!(writer, "Cards searched: {}", outcome.starting_players)?;
    if outcome.skipped_goalkeepers > 0 {
        writeln!(
            writer,
            "Goalkeepers skipped: {}",
            outcome.skipped_goalkeepers.to_string().yellow()
        )?;
    }
    writeln!(writer, "Evolutions: {}", trail(&outcome.evolutions, ", "))?;
    writeln!(
        writer,
        "Paths explored: {} ({} leaves, {} filtered out, {} duplicates)",
        stats.visited, stats.leaves, stats.rejected, stats.duplicates
    )?;
    writeln!(
        writer,
        "Results: {}",
        outcome.results.len().to_string().green()
    )?;
    writeln!(writer, "Search time: {total_duration:?}")?;
    writeln!(writer)?;

    if outcome.results.is_empty() {
        writeln!(writer, "{}", "No evolved cards matched.".yellow())?;
        return Ok(());
    }

    for player in &outcome.results {
        writeln!(writer, "{player}")?;
        writeln!(writer)?;
    }
    Ok(())
}

pub fn generate_json_report<W: Write>(writer: &mut W, outcome: &SearchOutcome) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, outcome)?;
    writeln!(writer)?;
    Ok(())
}

pub fn generate_markdown_report<W: Write>(writer: &mut W, outcome: &SearchOutcome) -> Result<()> {
    writeln!(writer, "# Evopath Search Results\n")?;

    writeln!(writer, "## Summary\n")?;
    writeln!(writer, "- **Cards searched**: {}", outcome.starting_players)?;
    writeln!(
        writer,
        "- **Goalkeepers skipped**: {}",
        outcome.skipped_goalkeepers
    )?;
    writeln!(
        writer,
        "- **Evolutions**: {}",
        trail(&outcome.evolutions, ", ")
    )?;
    writeln!(writer, "- **Paths explored**: {}", outcome.stats.visited)?;
    writeln!(writer, "- **Results**: {}\n", outcome.results.len())?;

    if outcome.results.is_empty() {
        writeln!(writer, "No evolved cards matched.")?;
        return Ok(());
    }

    writeln!(writer, "## Evolved Cards\n")?;
    writeln!(
        writer,
        "| Name | OVR | PAC | SHO | PAS | DRI | DEF | PHY | SM | WF | Positions | Plus trait | Traits | Work rates | Rarity | Evolutions |"
    )?;
    writeln!(
        writer,
        "|------|-----|-----|-----|-----|-----|-----|-----|----|----|-----------|------------|--------|------------|--------|------------|"
    )?;
    for player in &outcome.results {
        let r = player.ratings();
        writeln!(
            writer,
            "| {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {}/{} | {} | {} |",
            md_cell(player.name()),
            r.overall,
            r.pace,
            r.shooting,
            r.passing,
            r.dribbling,
            r.defending,
            r.physical,
            r.skill_moves,
            r.weak_foot,
            md_cell(&or_dash(join_tags(player.positions(), ", "))),
            md_cell(player.plus_trait().unwrap_or("-")),
            md_cell(&or_dash(join_tags(player.traits(), ", "))),
            player.work_rate(WorkRateSide::Attacking),
            player.work_rate(WorkRateSide::Defensive),
            md_cell(player.rarity()),
            md_cell(&trail(player.evolutions(), " → ")),
        )?;
    }
    Ok(())
}

fn csv_row(player: &Player) -> String {
    let mut fields = vec![csv_field(player.name())];
    fields.extend(
        [
            Attribute::Pace,
            Attribute::Shooting,
            Attribute::Passing,
            Attribute::Dribbling,
            Attribute::Defending,
            Attribute::Physical,
            Attribute::Overall,
            Attribute::SkillMoves,
            Attribute::WeakFoot,
        ]
        .map(|attribute| player.rating(attribute).to_string()),
    );
    fields.push(csv_field(&or_dash(join_tags(player.positions(), ","))));
    fields.push(csv_field(player.plus_trait().unwrap_or("None")));
    fields.push(csv_field(&or_dash(join_tags(player.traits(), ","))));
    fields.push(player.work_rate(WorkRateSide::Attacking).to_string());
    fields.push(player.work_rate(WorkRateSide::Defensive).to_string());
    fields.push(csv_field(player.rarity()));
    fields.push(csv_field(&trail(player.evolutions(), ";")));
    fields.join(",")
}

pub fn generate_csv_report<W: Write>(writer: &mut W, outcome: &SearchOutcome) -> Result<()> {
    writeln!(writer, "{CSV_HEADER}")?;
    for player in &outcome.results {
        writeln!(writer, "{}", csv_row(player))?;
    }
    Ok(())
}
