use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use std::fmt::Write;

use crate::billing::{CostBreakdown, CostReport, SizeAggregate};

/// How a report is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Totals only
    Summary,
    /// Price and size tables plus unused volume ids
    Verbose,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub format: OutputFormat,
    pub color: bool,
}

#[derive(Clone, Copy)]
enum Tone {
    Warning,
    Fail,
}

fn paint(text: &str, tone: Tone, color: bool) -> String {
    if !color {
        return text.to_string();
    }

    #[cfg(feature = "color")]
    {
        use ansi_term::Colour;
        let colour = match tone {
            Tone::Warning => Colour::Yellow,
            Tone::Fail => Colour::Red,
        };
        colour.paint(text).to_string()
    }

    #[cfg(not(feature = "color"))]
    {
        let _ = tone;
        text.to_string()
    }
}

fn price_table(costs: &CostBreakdown) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["type", "price"]);
    for (tier, cost) in &costs.by_tier {
        table.add_row(vec![tier.to_string(), format!("${}", cost)]);
    }
    table
}

fn size_table(sizes: &SizeAggregate) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["type", "size"]);
    for (tier, size) in sizes.iter() {
        table.add_row(vec![tier.to_string(), format!("{} GiB", size)]);
    }
    table
}

fn unpriced_notes(report: &CostReport, color: bool) -> String {
    let mut out = String::new();
    for unpriced in report.unpriced_with_capacity() {
        let note = format!(
            "note: {} GiB of {} volumes ({} GiB unused) have no price and are excluded from totals",
            unpriced.size_units, unpriced.tier, unpriced.unused_size_units
        );
        let _ = writeln!(out, "{}", paint(&note, Tone::Warning, color));
    }
    out
}

/// Totals only: fleet cost, and unused cost when there are unused volumes
pub fn render_summary(report: &CostReport, options: RenderOptions) -> String {
    let color = options.color;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}${}",
        paint("total: ", Tone::Warning, color),
        report.costs.total
    );
    if report.has_unused_volumes() {
        let _ = writeln!(
            out,
            "{}${}",
            paint("unused: ", Tone::Fail, color),
            report.unused_costs.total
        );
    }
    out.push_str(&unpriced_notes(report, color));
    out
}

/// Price and size tables for the fleet, then for unused volumes if any
pub fn render_verbose(report: &CostReport, options: RenderOptions) -> String {
    let color = options.color;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "\n{}",
        paint("Total expenditures per EBS type", Tone::Warning, color)
    );
    let _ = writeln!(out, "{}\n", price_table(&report.costs));
    let _ = writeln!(
        out,
        "{}",
        paint("Total sizes per EBS type", Tone::Warning, color)
    );
    let _ = writeln!(out, "{}\n", size_table(&report.size_by_tier));

    if report.has_unused_volumes() {
        let _ = writeln!(
            out,
            "{}",
            paint("There are unused EBS volumes", Tone::Fail, color)
        );
        let _ = writeln!(out, "{}\n", price_table(&report.unused_costs));
        let _ = writeln!(
            out,
            "{}",
            paint("Total sizes per EBS type", Tone::Fail, color)
        );
        let _ = writeln!(out, "{}\n", size_table(&report.unused_size_by_tier));
        let _ = writeln!(
            out,
            "{}",
            paint("Here are unused volume IDs", Tone::Fail, color)
        );
        let _ = writeln!(out, "------------------------");
        for volume_id in &report.unused_volume_ids {
            let _ = writeln!(out, "{}", volume_id);
        }
    }

    out.push_str(&unpriced_notes(report, color));
    out
}

/// Render `report` in the requested format
pub fn render(report: &CostReport, options: RenderOptions) -> Result<String, serde_json::Error> {
    match options.format {
        OutputFormat::Summary => Ok(render_summary(report, options)),
        OutputFormat::Verbose => Ok(render_verbose(report, options)),
        OutputFormat::Json => serde_json::to_string_pretty(report).map(|mut s| {
            s.push('\n');
            s
        }),
    }
}
