use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use forecast_core::{
    Config, ForecastError, ReportContext, Site, SitePackage, SourceAdapter, build_site_package,
    provider_from_config,
    report::{markdown, pdf, spreadsheet, text},
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{error, info};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "NWS point forecast report generator")]
pub struct Cli {
    /// Use this config file instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch forecasts for the configured sites and write all reports.
    Run {
        /// Root folder for the timestamped output folder.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Only build these site codes (repeatable), e.g. `--site DHI`.
        #[arg(long = "site")]
        sites: Vec<String>,
    },

    /// List the configured sites.
    Sites,

    /// Interactively set the User-Agent contact and output folder.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = self.load_config()?;

        match self.command {
            Command::Run { output_dir, sites } => run_reports(&config, output_dir, &sites).await,
            Command::Sites => {
                for site in &config.sites {
                    println!(
                        "{:<6} {} ({}, {})",
                        site.code, site.name, site.latitude, site.longitude
                    );
                }
                Ok(())
            }
            Command::Configure => configure(config, self.config.as_deref()),
        }
    }

    fn load_config(&self) -> anyhow::Result<Config> {
        match &self.config {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        }
    }
}

fn select_sites<'a>(config: &'a Config, codes: &[String]) -> anyhow::Result<Vec<&'a Site>> {
    if codes.is_empty() {
        return Ok(config.sites.iter().collect());
    }

    codes
        .iter()
        .map(|code| {
            config.site(code).ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown site '{code}'.\n\
                     Hint: run `forecast sites` to list configured site codes."
                )
            })
        })
        .collect()
}

async fn run_reports(
    config: &Config,
    output_dir: Option<PathBuf>,
    codes: &[String],
) -> anyhow::Result<()> {
    config.validate().context("Invalid configuration")?;

    let tz = config.tz()?;
    let now = Utc::now().with_timezone(&tz);
    let source = provider_from_config(config)?;
    let sites = select_sites(config, codes)?;

    info!("Starting forecast generation for {} site(s)", sites.len());
    let packages = build_packages(source.as_ref(), &sites, now).await?;

    let ctx = ReportContext::new(config.report_title.clone(), now);
    let root = output_dir.unwrap_or_else(|| config.output_root());
    let written = write_reports(&ctx, &packages, &root, &config.file_prefix)?;

    println!("\nDone. Files created in: {}", root.join(ctx.stamp_tag()).display());
    for path in written {
        println!("   {}", path.display());
    }

    Ok(())
}

/// Build one package per site. A failed site is logged and left out; the
/// run fails only when no site succeeds.
pub async fn build_packages(
    source: &dyn SourceAdapter,
    sites: &[&Site],
    now: DateTime<Tz>,
) -> anyhow::Result<Vec<SitePackage>> {
    let mut packages = Vec::with_capacity(sites.len());
    for (i, site) in sites.iter().enumerate() {
        info!("[{}/{}] Building data package for {}", i + 1, sites.len(), site.name);
        match build_site_package(source, site, now).await {
            Ok(pkg) => packages.push(pkg),
            Err(e) => error!(site = %site.name, error = %e, "site skipped"),
        }
    }

    if packages.is_empty() {
        bail!("No site package could be built; no reports written.");
    }
    Ok(packages)
}

type PdfWriter = fn(&ReportContext, &[SitePackage], &Path) -> Result<(), ForecastError>;

/// Write every report format into `<root>/<stamp>/` and return the paths.
pub fn write_reports(
    ctx: &ReportContext,
    packages: &[SitePackage],
    root: &Path,
    prefix: &str,
) -> anyhow::Result<Vec<PathBuf>> {
    let dir = root.join(ctx.stamp_tag());
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let base = format!("{prefix}_{}", ctx.stamp_tag());
    let mut written = Vec::new();

    let text_reports = [
        ("chat summary", format!("{base}_Whatsapp.txt"), text::chat_summary(ctx, packages)),
        (
            "combined chat summary",
            format!("{base}_Whatsapp_Combined.txt"),
            text::chat_combined(ctx, packages),
        ),
        ("Markdown report", format!("{base}_Full.md"), markdown::render(ctx, packages)),
    ];

    for (what, name, body) in text_reports {
        info!("Generating {what}...");
        let path = dir.join(name);
        fs::write(&path, body)
            .with_context(|| format!("Failed to write {what}: {}", path.display()))?;
        written.push(path);
    }

    info!("Generating spreadsheet...");
    let xlsx = dir.join(format!("{base}_Full.xlsx"));
    spreadsheet::write(ctx, packages, &xlsx)
        .with_context(|| format!("Failed to write spreadsheet: {}", xlsx.display()))?;
    written.push(xlsx);

    let pdf_reports: [(&str, String, PdfWriter); 2] = [
        ("full PDF report", format!("{prefix}_With_Tables_{}.pdf", ctx.stamp_tag()), pdf::write_full),
        ("summary PDF report", format!("{prefix}_Summary_{}.pdf", ctx.stamp_tag()), pdf::write_summary),
    ];
    for (what, name, write) in pdf_reports {
        info!("Generating {what}...");
        let path = dir.join(name);
        write(ctx, packages, &path).with_context(|| format!("Failed to write {what}: {}", path.display()))?;
        written.push(path);
    }

    Ok(written)
}

fn configure(mut config: Config, path: Option<&Path>) -> anyhow::Result<()> {
    let user_agent = inquire::Text::new("User-Agent (include a contact address):")
        .with_default(&config.user_agent)
        .prompt()
        .context("Failed to read User-Agent")?;

    let current_dir = config.output_root().display().to_string();
    let output_dir = inquire::Text::new("Output folder:")
        .with_default(&current_dir)
        .prompt()
        .context("Failed to read output folder")?;

    config.user_agent = user_agent.trim().to_string();
    config.output_dir = Some(PathBuf::from(output_dir.trim()));

    match path {
        Some(p) => config.save_to(p)?,
        None => config.save()?,
    }

    println!("Configuration saved.");
    Ok(())
}
