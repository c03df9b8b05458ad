use std::path::Path;
use tracing::{info, warn};

use crate::cli::{Cli, Commands};
use crate::domain::models::VersionGroups;
use crate::github::GithubClient;
use crate::services::artifacts;
use crate::services::config::{self, Settings};
use crate::services::extract;
use crate::services::fixed_in;
use crate::services::group;
use crate::services::output::{print_one, print_out};
use crate::services::release;
use crate::services::report::{self, ReportFilters};
use crate::services::rollup;

pub fn handle_pipeline_commands(cli: &Cli) -> anyhow::Result<()> {
    let file = config::load_config(Path::new(&cli.config))?;
    match &cli.command {
        Commands::Run {
            refresh,
            no_cache,
            pages,
            checkout,
        } => {
            let settings = config::resolve(cli, &file, *pages);
            run_pipeline(cli, &settings, *refresh, *no_cache, checkout.as_deref())
        }
        Commands::Stats => {
            let settings = config::resolve(cli, &file, None);
            show_stats(cli, &settings)
        }
        Commands::Tags { no_cache } => {
            let settings = config::resolve(cli, &file, None);
            show_tags(cli, &settings, *no_cache)
        }
    }
}

fn run_pipeline(
    cli: &Cli,
    settings: &Settings,
    refresh: bool,
    no_cache: bool,
    checkout: Option<&str>,
) -> anyhow::Result<()> {
    let data_dir = Path::new(&cli.data_dir);
    let reports_dir = Path::new(&cli.reports_dir);

    if refresh {
        let client = GithubClient::new(&settings.owner, &settings.repo, &settings.label)?;
        let fetched = client.fetch_issues(settings.pages);
        info!(count = fetched.len(), "fetched issues");
        let old = artifacts::load_issues(data_dir).unwrap_or_default();
        let merged = artifacts::merge_issues(fetched, old);
        artifacts::save_issues(data_dir, &merged)?;

        let mut with_fixed = merged;
        fixed_in::resolve_fixed_in(&mut with_fixed, &client);
        artifacts::save_issues_with_fixed(data_dir, &with_fixed)?;
    }

    let scanned = artifacts::load_issues(data_dir)?.len();
    let issues = artifacts::load_issues_with_fixed(data_dir)?;

    let enriched = extract::enrich(&issues, &settings.product);
    artifacts::save_enriched(data_dir, &enriched)?;

    let groups = group::group_by_version(&enriched);
    artifacts::save_groups(data_dir, &groups.by_version)?;

    let order = rollup::display_order(&groups.by_version);
    let per_version = rollup::version_counts(&groups.by_version, &order);
    let per_major_minor = rollup::major_minor_counts(&groups.by_version, &order);
    let stats = report::compute_stats(scanned, &enriched, &groups);
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();

    std::fs::create_dir_all(reports_dir)?;
    std::fs::write(
        reports_dir.join("stats_by_version.csv"),
        report::version_counts_csv(&per_version),
    )?;
    std::fs::write(
        reports_dir.join("stats_by_major_minor_version.csv"),
        report::version_counts_csv(&per_major_minor),
    )?;

    let stats_txt = report::render_stats_txt(&per_version, &stats, &settings.product, &date);
    std::fs::write(reports_dir.join("stats.txt"), &stats_txt)?;

    for (filters, name) in [
        (ReportFilters::OPEN_ONLY, "open_report.md"),
        (ReportFilters::CLOSED_ONLY, "closed_report.md"),
        (ReportFilters::ALL, "all_report.md"),
    ] {
        let md = report::render_markdown(
            &groups.by_version,
            &order,
            &stats,
            &settings.product,
            &date,
            filters,
        );
        std::fs::write(reports_dir.join(name), md)?;
    }

    let tags = load_or_fetch_tags(data_dir, settings, no_cache);
    let tags_desc = release::sort_tags_desc(&tags);
    let rows = release::release_rows(&tags_desc, &groups.by_version, checkout.map(Path::new));
    std::fs::write(
        reports_dir.join("release_stats.csv"),
        release::release_csv(&rows),
    )?;
    std::fs::write(
        reports_dir.join("major_minor_release_stats.csv"),
        release::release_csv(&release::major_minor_release_rows(&rows)),
    )?;

    info!(reports = %reports_dir.display(), "reports written");
    print_one(cli.json, &stats, |_| stats_txt.clone())?;
    Ok(())
}

fn show_stats(cli: &Cli, settings: &Settings) -> anyhow::Result<()> {
    let data_dir = Path::new(&cli.data_dir);
    let scanned = artifacts::load_issues(data_dir)?.len();
    let enriched = artifacts::load_enriched(data_dir)?;

    let groups = VersionGroups {
        by_version: artifacts::load_groups(data_dir)?,
        line_only: enriched
            .iter()
            .filter(|i| i.found_in_line.is_some())
            .map(group::summarize)
            .collect(),
    };
    let order = rollup::display_order(&groups.by_version);
    let per_version = rollup::version_counts(&groups.by_version, &order);
    let stats = report::compute_stats(scanned, &enriched, &groups);
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();

    let text = report::render_stats_txt(&per_version, &stats, &settings.product, &date);
    print_one(cli.json, &stats, |_| text.clone())?;
    Ok(())
}

fn show_tags(cli: &Cli, settings: &Settings, no_cache: bool) -> anyhow::Result<()> {
    let data_dir = Path::new(&cli.data_dir);
    let tags = release::sort_tags_desc(&load_or_fetch_tags(data_dir, settings, no_cache));
    print_out(cli.json, &tags, Clone::clone)?;
    Ok(())
}

/// Serve tags from the local cache unless it is absent, unreadable, or
/// explicitly bypassed. A failed refetch degrades to an empty tag set so
/// report derivation still completes.
fn load_or_fetch_tags(data_dir: &Path, settings: &Settings, no_cache: bool) -> Vec<String> {
    if !no_cache && artifacts::tags_path(data_dir).exists() {
        match artifacts::load_tags(data_dir) {
            Ok(tags) => return tags,
            Err(e) => warn!(error = %e, "tag cache unreadable, refetching"),
        }
    }
    let fetched = GithubClient::new(&settings.owner, &settings.repo, &settings.label)
        .and_then(|client| client.fetch_tags());
    match fetched {
        Ok(tags) => {
            if let Err(e) = artifacts::save_tags(data_dir, &tags) {
                warn!(error = %e, "failed to cache tags");
            }
            tags
        }
        Err(e) => {
            warn!(error = %e, "tag fetch failed, release stats will be empty");
            Vec::new()
        }
    }
}
