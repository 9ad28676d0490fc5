//! Excel workbook: four sheets per site plus a `Meta` sheet.

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::Path;

use super::{ReportContext, tables};
use crate::{ForecastError, interval::IntervalTable, package::SitePackage};

/// Excel refuses sheet names longer than this.
const MAX_SHEET_NAME: usize = 31;

impl From<XlsxError> for ForecastError {
    fn from(e: XlsxError) -> Self {
        ForecastError::Render(e.to_string())
    }
}

/// `DHI_Short_Metric` and friends, cut to Excel's limit.
fn sheet_name(code: &str, suffix: &str) -> String {
    let name = format!("{code}_{suffix}");
    name.chars().take(MAX_SHEET_NAME).collect()
}

pub fn write(ctx: &ReportContext, packages: &[SitePackage], path: &Path) -> Result<(), ForecastError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    for pkg in packages {
        for (suffix, table) in tables(pkg) {
            let sheet = workbook.add_worksheet();
            sheet.set_name(sheet_name(&pkg.code, suffix))?;
            write_table(sheet, table, &header)?;
        }
    }

    let meta = workbook.add_worksheet();
    meta.set_name("Meta")?;
    meta.write_string_with_format(0, 0, "Generated", &header)?;
    meta.write_string_with_format(0, 1, "Notes", &header)?;
    meta.write_string(1, 0, ctx.stamp_human())?;
    meta.write_string(1, 1, "Whole numbers; NWS Gridpoint API")?;

    workbook.save(path)?;
    Ok(())
}

fn write_table(sheet: &mut Worksheet, table: &IntervalTable, header: &Format) -> Result<(), XlsxError> {
    for (col, title) in table.headers().iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, title.as_str(), header)?;
    }

    for (i, row) in table.rows.iter().enumerate() {
        let r = i as u32 + 1;
        let cells = row.cells();
        for (col, value) in row.numbers().iter().enumerate() {
            match value {
                Some(n) => {
                    sheet.write_number(r, col as u16, *n as f64)?;
                }
                None if !cells[col].is_empty() => {
                    sheet.write_string(r, col as u16, cells[col].as_str())?;
                }
                None => {}
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        package::{
            build_site_package,
            tests::{StaticSource, site},
        },
        table::tests::{at, hourly},
    };

    #[test]
    fn long_codes_are_truncated() {
        let name = sheet_name("AVERYLONGSITECODEXYZ", "Short_Imperial");
        assert_eq!(name.chars().count(), MAX_SHEET_NAME);
    }

    #[tokio::test]
    async fn workbook_is_written() {
        let source = StaticSource {
            hourly: (0..48).map(|i| hourly(i, 40.0)).collect(),
            ..StaticSource::default()
        };
        let pkg = build_site_package(&source, &site(), at(0)).await.unwrap();

        let names: Vec<_> = tables(&pkg)
            .into_iter()
            .map(|(suffix, _)| sheet_name(&pkg.code, suffix))
            .collect();
        assert_eq!(names, vec!["TB_Short_Metric", "TB_Short_Imperial", "TB_Long_Metric", "TB_Long_Imperial"]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        write(&ReportContext::new("Lake Placid Area", at(0)), &[pkg], &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.len() > 1000);
        assert_eq!(&bytes[..2], b"PK");
    }
}
