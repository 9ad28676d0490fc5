//! Three-line plain-language synopsis of the short-term table.

use crate::{
    interval::IntervalTable,
    units::{f_to_c, mph_to_kmh},
};

pub const NO_DATA_SENTENCE: &str = "Limited short-term data available from NWS at this time.";

/// Summarise an imperial interval table as sky/precipitation, temperature and
/// wind sentences. An empty table yields the single [`NO_DATA_SENTENCE`].
pub fn summarize(table: &IntervalTable) -> Vec<String> {
    let rows = &table.rows;
    if rows.is_empty() {
        return vec![NO_DATA_SENTENCE.to_string()];
    }

    let temps: Vec<i64> = rows.iter().filter_map(|r| r.temp).collect();
    let avg_wind =
        (rows.iter().map(|r| r.wind.unwrap_or(0)).sum::<i64>() as f64 / rows.len() as f64) as i64;
    let gusts = rows.iter().map(|r| r.gust.unwrap_or(0)).max().unwrap_or(0);
    let pop_max = rows.iter().map(|r| r.pop_pct.unwrap_or(0)).max().unwrap_or(0);
    let cloud_mid = median(rows.iter().filter_map(|r| r.cloud_pct).collect()).unwrap_or(0);

    let temp_line = match (temps.iter().min(), temps.iter().max()) {
        (Some(&lo), Some(&hi)) => format!(
            "Temperatures range from about {lo}–{hi} °F ({}–{} °C).",
            f_to_c(lo as f64).round() as i64,
            f_to_c(hi as f64).round() as i64,
        ),
        _ => "Temperature data unavailable.".to_string(),
    };

    vec![
        format!("Next 36 hours: {} and {}.", sky_label(cloud_mid), precip_label(pop_max)),
        temp_line,
        wind_sentence(avg_wind, gusts),
    ]
}

fn sky_label(cloud_pct: i64) -> &'static str {
    match cloud_pct {
        ..=25 => "mostly clear",
        26..=60 => "partly cloudy",
        _ => "mostly cloudy",
    }
}

fn precip_label(pop_pct: i64) -> &'static str {
    match pop_pct {
        ..=10 => "dry",
        11..=30 => "a slight chance of showers",
        _ => "showers possible",
    }
}

fn wind_sentence(avg_mph: i64, gust_mph: i64) -> String {
    let avg_kmh = mph_to_kmh(avg_mph as f64).round() as i64;
    let mut line = format!("Winds generally around {avg_mph} mph ({avg_kmh} km/h)");

    if gust_mph > 0 {
        let gust_kmh = mph_to_kmh(gust_mph as f64).round() as i64;
        line.push_str(&format!(" with gusts up to ~{gust_mph} mph ({gust_kmh} km/h)."));
    } else {
        line.push('.');
    }

    line
}

/// Median truncated to a whole number; `None` for no values.
fn median(mut values: Vec<i64>) -> Option<i64> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();

    let mid = values.len() / 2;
    let m = if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) as f64 / 2.0
    } else {
        values[mid] as f64
    };

    Some(m as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{interval::project, model::UnitSystem, table::build_combined, table::tests::hourly};

    fn imperial_table(rows: Vec<crate::model::HourlySample>) -> IntervalTable {
        let table = build_combined(&rows, &[]);
        IntervalTable {
            units: UnitSystem::Imperial,
            zone: "EST".into(),
            rows: table.rows().iter().map(|r| project(r, UnitSystem::Imperial)).collect(),
        }
    }

    #[test]
    fn empty_table_gives_single_sentence() {
        let lines = summarize(&IntervalTable::empty(UnitSystem::Imperial, "EST"));
        assert_eq!(lines, vec![NO_DATA_SENTENCE.to_string()]);
    }

    #[test]
    fn summary_has_three_lines() {
        let mut a = hourly(0, 41.0);
        a.wind_mph = 4.0;
        a.pop_pct = Some(20.0);
        let mut b = hourly(2, 59.0);
        b.wind_mph = 9.0;
        b.gust_mph = Some(18.0);
        b.pop_pct = None;

        let lines = summarize(&imperial_table(vec![a, b]));

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Next 36 hours: mostly clear and a slight chance of showers.");
        assert_eq!(lines[1], "Temperatures range from about 41–59 °F (5–15 °C).");
        assert_eq!(
            lines[2],
            "Winds generally around 6 mph (10 km/h) with gusts up to ~18 mph (29 km/h)."
        );
    }

    #[test]
    fn no_gust_clause_without_gusts() {
        let lines = summarize(&imperial_table(vec![hourly(0, 70.0)]));
        assert_eq!(lines[2], "Winds generally around 5 mph (8 km/h).");
        assert_eq!(lines[0], "Next 36 hours: mostly clear and dry.");
    }

    #[test]
    fn cloud_median_ignores_missing_values() {
        let mut table = imperial_table(vec![hourly(0, 50.0), hourly(1, 50.0), hourly(2, 50.0)]);
        table.rows[0].cloud_pct = Some(70);
        table.rows[1].cloud_pct = Some(90);

        assert!(summarize(&table)[0].starts_with("Next 36 hours: mostly cloudy"));

        table.rows[0].cloud_pct = Some(30);
        table.rows[1].cloud_pct = Some(50);
        assert!(summarize(&table)[0].starts_with("Next 36 hours: partly cloudy"));
    }

    #[test]
    fn high_pop_means_showers_possible() {
        let mut table = imperial_table(vec![hourly(0, 50.0)]);
        table.rows[0].pop_pct = Some(31);
        assert_eq!(summarize(&table)[0], "Next 36 hours: mostly clear and showers possible.");
    }

    #[test]
    fn missing_temperatures_are_reported() {
        let mut sample = hourly(0, 50.0);
        sample.temp_f = None;
        let lines = summarize(&imperial_table(vec![sample]));
        assert_eq!(lines[1], "Temperature data unavailable.");
    }

    #[test]
    fn median_truncates() {
        assert_eq!(median(vec![]), None);
        assert_eq!(median(vec![3, 1, 2]), Some(2));
        assert_eq!(median(vec![10, 15]), Some(12));
    }
}
