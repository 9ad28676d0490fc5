//! PDF reports: the full report with all four tables per site, and a
//! summary with current conditions and the narrative only.
//!
//! Content is laid out as a flat list of [`Block`]s first, then flowed onto
//! Letter pages with the built-in Helvetica and Courier faces.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use std::{fs::File, io::BufWriter, path::Path};

use super::{NO_OBSERVATION, ReportContext, rh_text, temp_text, wind_text};
use crate::{ForecastError, interval::IntervalTable, package::SitePackage};

const PAGE_WIDTH: Mm = Mm(215.9);
const PAGE_HEIGHT: Mm = Mm(279.4);
const MARGIN_MM: f32 = 14.0;
const PT_TO_MM: f32 = 0.3528;

/// Character widths of the nine table columns, Courier.
const COLUMN_WIDTHS: [usize; 9] = [16, 10, 11, 12, 13, 5, 7, 8, 10];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Stamp,
    Heading,
    SubHeading,
    Body,
    Bold,
    TableHeader,
    TableRow,
}

impl Style {
    fn size(self) -> f32 {
        match self {
            Style::Heading => 14.0,
            Style::SubHeading => 12.0,
            Style::Stamp | Style::Body | Style::Bold => 8.0,
            Style::TableHeader | Style::TableRow => 7.0,
        }
    }

    fn leading_mm(self) -> f32 {
        self.size() * 1.25 * PT_TO_MM
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Block {
    Text(Style, String),
    Space(f32),
}

fn text(style: Style, s: impl Into<String>) -> Block {
    Block::Text(style, s.into())
}

pub fn write_full(ctx: &ReportContext, packages: &[SitePackage], path: &Path) -> Result<(), ForecastError> {
    render(&ctx.title, &full_blocks(ctx, packages), path)
}

pub fn write_summary(ctx: &ReportContext, packages: &[SitePackage], path: &Path) -> Result<(), ForecastError> {
    render(&ctx.title, &summary_blocks(ctx, packages), path)
}

fn summary_blocks(ctx: &ReportContext, packages: &[SitePackage]) -> Vec<Block> {
    let mut blocks = title_blocks(ctx);

    blocks.push(text(Style::SubHeading, "Current Conditions"));
    for pkg in packages {
        blocks.extend(conditions_blocks(pkg));
        blocks.push(Block::Space(2.0));
    }

    blocks.push(text(Style::SubHeading, "Short-term Forecast (36 Hours, Narrative)"));
    for pkg in packages {
        blocks.push(text(Style::Bold, pkg.name.as_str()));
        blocks.extend(pkg.narrative.iter().map(|l| text(Style::Body, format!("  - {l}"))));
        blocks.push(Block::Space(4.0));
    }

    blocks
}

fn full_blocks(ctx: &ReportContext, packages: &[SitePackage]) -> Vec<Block> {
    let mut blocks = summary_blocks(ctx, packages);

    blocks.push(text(Style::SubHeading, "Short-term Tables (36 Hours)"));
    for pkg in packages {
        blocks.extend(table_blocks(&pkg.name, &pkg.short_metric));
        blocks.extend(table_blocks(&pkg.name, &pkg.short_imperial));
    }

    blocks.push(text(Style::SubHeading, "Extended Forecast (7-Day)"));
    for pkg in packages {
        blocks.extend(table_blocks(&pkg.name, &pkg.long_metric));
        blocks.extend(table_blocks(&pkg.name, &pkg.long_imperial));
    }

    blocks
}

fn title_blocks(ctx: &ReportContext) -> Vec<Block> {
    vec![
        text(Style::Stamp, ctx.stamp_human()),
        text(Style::Heading, format!("Weather / Forecasts - {}", ctx.title)),
        text(
            Style::Body,
            format!("Valid through {}", ctx.valid_through().format("%b %d, %Y")),
        ),
        Block::Space(4.0),
    ]
}

fn conditions_blocks(pkg: &SitePackage) -> Vec<Block> {
    let mut blocks = vec![text(Style::Bold, format!("{}:", pkg.name))];

    match &pkg.current {
        Some(curr) => {
            blocks.push(text(Style::Body, format!("{};", curr.conditions)));
            blocks.push(text(Style::Body, format!("Temp: {};", temp_text(curr))));
            blocks.push(text(Style::Body, format!("Wind: {};", wind_text(curr))));
            blocks.push(text(Style::Body, format!("RH: {}.", rh_text(curr))));
        }
        None => blocks.push(text(Style::Body, NO_OBSERVATION)),
    }
    blocks.push(text(Style::Body, format!("Source: {}", pkg.source_url)));

    blocks
}

fn table_blocks(site: &str, table: &IntervalTable) -> Vec<Block> {
    let mut blocks = vec![text(Style::Body, format!("{site} - {}", table.units.label()))];

    if table.is_empty() {
        blocks.push(text(Style::Body, "No data available."));
    } else {
        blocks.push(text(Style::TableHeader, fixed_row(&table.headers())));
        blocks.extend(
            table
                .rows
                .iter()
                .map(|r| text(Style::TableRow, fixed_row(&r.cells()))),
        );
    }
    blocks.push(Block::Space(3.0));

    blocks
}

fn fixed_row(cells: &[String; 9]) -> String {
    cells
        .iter()
        .zip(COLUMN_WIDTHS)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// The built-in faces only cover Latin-1.
fn latin1(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '–' | '—' => '-',
            c if (c as u32) < 0x100 => c,
            _ => '?',
        })
        .collect()
}

fn pdf_error(e: impl std::fmt::Display) -> ForecastError {
    ForecastError::Render(format!("PDF: {e}"))
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    mono: IndirectFontRef,
    mono_bold: IndirectFontRef,
}

impl Fonts {
    fn for_style(&self, style: Style) -> &IndirectFontRef {
        match style {
            Style::Heading | Style::SubHeading | Style::Bold => &self.bold,
            Style::Stamp | Style::Body => &self.regular,
            Style::TableHeader => &self.mono_bold,
            Style::TableRow => &self.mono,
        }
    }
}

fn render(title: &str, blocks: &[Block], path: &Path) -> Result<(), ForecastError> {
    let (doc, page, layer) = PdfDocument::new(title, PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?,
        mono: doc.add_builtin_font(BuiltinFont::Courier).map_err(pdf_error)?,
        mono_bold: doc.add_builtin_font(BuiltinFont::CourierBold).map_err(pdf_error)?,
    };

    let top = PAGE_HEIGHT.0 - MARGIN_MM;
    let mut current: PdfLayerReference = doc.get_page(page).get_layer(layer);
    let mut y = top;

    for block in blocks {
        match block {
            Block::Space(mm) => y -= mm,
            Block::Text(style, s) => {
                let step = style.leading_mm();
                if y - step < MARGIN_MM {
                    let (page, layer) = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
                    current = doc.get_page(page).get_layer(layer);
                    y = top;
                }
                y -= step;

                let line = latin1(s);
                let x = match style {
                    // Helvetica averages about half an em per character.
                    Style::Stamp => {
                        let width = line.chars().count() as f32 * style.size() * 0.5 * PT_TO_MM;
                        (PAGE_WIDTH.0 - MARGIN_MM - width).max(MARGIN_MM)
                    }
                    _ => MARGIN_MM,
                };
                current.use_text(line, style.size(), Mm(x), Mm(y), fonts.for_style(*style));
            }
        }
    }

    let file = File::create(path)?;
    doc.save(&mut BufWriter::new(file)).map_err(pdf_error)
}
