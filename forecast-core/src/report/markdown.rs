//! Full Markdown report: current conditions, narrative and all four tables per site.

use super::{NO_OBSERVATION, ReportContext, observed_text, rh_text, temp_text, wind_text};
use crate::{interval::IntervalTable, package::SitePackage};

pub fn render(ctx: &ReportContext, packages: &[SitePackage]) -> String {
    let mut out = format!(
        "> {}\n\n# Weather / Forecasts – {}\n**Valid through {}**\n\n",
        ctx.stamp_human(),
        ctx.title,
        ctx.valid_through().format("%b %d, %Y"),
    );

    let sections: Vec<String> = packages.iter().map(|p| site_section(ctx, p)).collect();
    out.push_str(&sections.join("\n\n---\n\n"));
    out.push('\n');
    out
}

fn site_section(ctx: &ReportContext, pkg: &SitePackage) -> String {
    let mut md = vec![format!("## {}\n", pkg.name), "### Current Conditions".to_string()];

    match &pkg.current {
        Some(curr) => {
            md.push(format!("**Observed at {} ({})**", observed_text(curr), curr.station_id));
            md.push(format!("- Conditions: {}", curr.conditions));
            md.push(format!("- Temp: {}", temp_text(curr)));
            md.push(format!("- Wind: {}", wind_text(curr)));
            md.push(format!("- RH: {}", rh_text(curr)));
            if let Some(vis) = curr.visibility_mi {
                md.push(format!("- Visibility: {vis:.1} mi"));
            }
            if let Some(p) = curr.pressure_inhg {
                md.push(format!("- Pressure: {p:.2} inHg"));
            }
        }
        None => md.push(format!("_{NO_OBSERVATION}_")),
    }
    md.push(format!("- Alerts: {}", pkg.alert_note));
    md.push(format!("- Source: [NWS Gridpoint & Stations]({})", pkg.source_url));

    md.push("\n### Short-term Forecast (36 Hours, High Detail)\n".to_string());
    md.extend(pkg.narrative.iter().map(|l| format!("- {l}")));
    push_table(&mut md, &pkg.short_metric);
    push_table(&mut md, &pkg.short_imperial);

    md.push(format!(
        "\n### Extended Forecast (through {}, 6h blocks)",
        ctx.valid_through().format("%b %d")
    ));
    push_table(&mut md, &pkg.long_metric);
    push_table(&mut md, &pkg.long_imperial);

    md.join("\n")
}

fn push_table(md: &mut Vec<String>, table: &IntervalTable) {
    md.push(format!("\n**{}**\n", table.units.label()));
    md.push(table_markdown(table));
}

/// Pipe table with a header row; an empty table renders a placeholder line.
pub fn table_markdown(table: &IntervalTable) -> String {
    if table.is_empty() {
        return "_No data available._".to_string();
    }

    let headers = table.headers();
    let mut lines = vec![
        format!("| {} |", headers.join(" | ")),
        format!("|{}|", vec!["---"; headers.len()].join("|")),
    ];
    lines.extend(table.rows.iter().map(|r| format!("| {} |", r.cells().join(" | "))));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::UnitSystem,
        package::{
            build_site_package,
            tests::{StaticSource, sample_current, site},
        },
        table::tests::{at, hourly},
    };

    #[test]
    fn empty_table_placeholder() {
        let table = IntervalTable::empty(UnitSystem::Metric, "EST");
        assert_eq!(table_markdown(&table), "_No data available._");
    }

    #[tokio::test]
    async fn report_contains_tables_and_conditions() {
        let mut first = hourly(0, 32.0);
        first.pop_pct = None;
        let mut samples = vec![first];
        samples.extend((1..48).map(|i| hourly(i, 32.0)));
        let source = StaticSource {
            current: Some(sample_current()),
            hourly: samples,
            ..StaticSource::default()
        };
        let pkg = build_site_package(&source, &site(), at(0)).await.unwrap();

        let md = render(&ReportContext::new("Lake Placid Area", at(0)), &[pkg]);

        assert!(md.contains("# Weather / Forecasts – Lake Placid Area"));
        assert!(md.contains("**Valid through Jan 22, 2025**"));
        assert!(md.contains("## Test Base"));
        assert!(md.contains("- Visibility: 4.0 mi"));
        assert!(md.contains("- Pressure: 30.01 inHg"));
        assert!(md.contains(
            "| Date/Time (EST) | Temp (°C) | Feels (°C) | Wind (km/h) | Gusts (km/h) | Dir | RH (%) | PoP (%) | Cloud (%) |"
        ));
        assert!(md.contains("| Jan 15 00:00 | 32 | 27 | 5 |  | NW | 60 |  |  |"));
        assert!(md.contains("### Extended Forecast (through Jan 22, 6h blocks)"));
    }

    #[tokio::test]
    async fn report_without_observation_uses_placeholder() {
        let pkg = build_site_package(&StaticSource::default(), &site(), at(0)).await.unwrap();
        let md = render(&ReportContext::new("Lake Placid Area", at(0)), &[pkg]);

        assert!(md.contains(&format!("_{NO_OBSERVATION}_")));
        assert!(md.contains("- Limited short-term data available from NWS at this time."));
        assert_eq!(md.matches("_No data available._").count(), 4);
    }
}
