//! Chat-style plain text summaries (WhatsApp flavoured `*bold*` / `_italic_`).

use super::{NO_OBSERVATION, ReportContext, observed_text, rh_text, temp_text, wind_text};
use crate::package::SitePackage;

/// One section per site: current conditions followed by the 36 h narrative.
pub fn chat_summary(ctx: &ReportContext, packages: &[SitePackage]) -> String {
    let sections: Vec<String> = packages.iter().map(site_section).collect();

    let mut out = format!("*Weather Forecast - {}*\n_{}_\n\n", ctx.title, ctx.stamp_human());
    out.push_str(&sections.join("\n\n---\n\n"));
    out
}

fn site_section(pkg: &SitePackage) -> String {
    let mut lines = vec![format!("*{}*", pkg.name), "*Current Conditions*".to_string()];

    match &pkg.current {
        Some(curr) => {
            lines.push(format!("- Observed: {} ({})", observed_text(curr), curr.station_id));
            lines.push(format!("- Conditions: {}", curr.conditions));
            lines.push(format!("- Temp: {}", temp_text(curr)));
            lines.push(format!("- Wind: {}", wind_text(curr)));
            lines.push(format!("- RH: {}", rh_text(curr)));
        }
        None => lines.push(format!("_{NO_OBSERVATION}_")),
    }

    lines.push(String::new());
    lines.push("*Short-term Forecast (36h)*".to_string());
    lines.extend(pkg.narrative.iter().map(|l| format!("- {l}")));

    lines.join("\n")
}

/// All current conditions first, then every site's narrative.
pub fn chat_combined(ctx: &ReportContext, packages: &[SitePackage]) -> String {
    let mut lines = vec![
        format!("*{} Forecast*", ctx.title),
        format!("_{}_", ctx.stamp_human()),
        String::new(),
        "*Current Conditions*".to_string(),
    ];

    for pkg in packages {
        lines.push(format!("- *{}*:", pkg.name));
        match &pkg.current {
            Some(curr) => {
                lines.push(format!("  {};", curr.conditions));
                lines.push(format!("  Temp: {};", temp_text(curr)));
                lines.push(format!("  Wind: {};", wind_text(curr)));
                lines.push(format!("  RH: {}.", rh_text(curr)));
            }
            None => lines.push(format!("  {NO_OBSERVATION}")),
        }
        lines.push(format!("  Source: {}", pkg.source_url));
        lines.push(String::new());
    }

    lines.push("*Short-term Forecast (36h)*".to_string());
    for pkg in packages {
        lines.push(format!("- *{}*", pkg.name));
        lines.extend(pkg.narrative.iter().map(|l| format!("  - {l}")));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        package::{
            build_site_package,
            tests::{StaticSource, sample_current, site},
        },
        table::tests::{at, hourly},
    };

    async fn package(with_current: bool) -> SitePackage {
        let source = StaticSource {
            current: with_current.then(sample_current),
            hourly: (0..36).map(|i| hourly(i, 30.0)).collect(),
            ..StaticSource::default()
        };
        build_site_package(&source, &site(), at(0)).await.unwrap()
    }

    fn ctx() -> ReportContext {
        ReportContext::new("Lake Placid Area", at(9))
    }

    #[tokio::test]
    async fn summary_lists_conditions_and_narrative() {
        let pkg = package(true).await;
        let text = chat_summary(&ctx(), &[pkg.clone(), pkg]);

        assert!(text.starts_with("*Weather Forecast - Lake Placid Area*\n_Generated: Jan 15, 2025"));
        assert!(text.contains("- Conditions: Light Snow"));
        assert!(text.contains("- Temp: -3 °C / 27 °F"));
        assert!(text.contains("- Wind: 10 mph (16 km/h), from WNW, gusting 22 mph (35 km/h)"));
        assert!(text.contains("- Next 36 hours: mostly clear and dry."));
        assert_eq!(text.matches("\n\n---\n\n").count(), 1);
    }

    #[tokio::test]
    async fn missing_observation_renders_placeholder() {
        let pkg = package(false).await;

        let summary = chat_summary(&ctx(), std::slice::from_ref(&pkg));
        assert!(summary.contains(NO_OBSERVATION));
        assert!(!summary.contains("- Temp:"));

        let combined = chat_combined(&ctx(), &[pkg]);
        assert!(combined.contains(&format!("  {NO_OBSERVATION}")));
        assert!(combined.contains("Source: https://forecast.weather.gov/MapClick.php"));
    }

    #[tokio::test]
    async fn combined_groups_current_before_narratives() {
        let text = chat_combined(&ctx(), &[package(true).await]);

        let current_at = text.find("*Current Conditions*").unwrap();
        let forecast_at = text.find("*Short-term Forecast (36h)*").unwrap();
        assert!(current_at < forecast_at);
        assert!(text.contains("  Light Snow;"));
        assert!(text.contains("  RH: 85%."));
        assert!(text.contains("  - Temperatures range from about 30–30 °F (-1–-1 °C)."));
    }
}
