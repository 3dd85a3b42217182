use clap::{Arg, Command};
use log::{info, warn};
use std::path::PathBuf;

use chapcut::error::config_error;
use chapcut::{config, dependencies, engine, tags, timeline};
use chapcut::{Config, ConfigBuilder, ConfigFile, FfmpegCodec, MatchMode, ProgressOperation, Result};

fn build_cli() -> Command {
    Command::new("chapcut")
        .about("Removes chapters whose title matches a filter from chaptered MP3 files")
        .version("0.1.0")
        .arg(
            Arg::new("input_file")
                .short('i')
                .long("input_file")
                .visible_alias("input-file")
                .value_name("FILE")
                .help("Input MP3 file with ID3 chapters")
                .required(false) // Will be validated in parse_config
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output_file")
                .short('o')
                .long("output_file")
                .visible_alias("output-file")
                .value_name("FILE")
                .help("Output MP3 file (optional, defaults to input_edited.mp3)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("filter_string")
                .short('f')
                .long("filter_string")
                .visible_alias("filter-string")
                .value_name("TEXT")
                .help("Remove chapters whose title matches this (empty removes all)"),
        )
        .arg(
            Arg::new("match")
                .short('m')
                .long("match")
                .value_name("MODE")
                .help("How the filter is compared with titles")
                .value_parser(["substring", "exact", "regex"]),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (YAML/JSON)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("profile")
                .short('p')
                .long("profile")
                .value_name("NAME")
                .help("Filter profile to use (from config file)"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Show what would be removed without writing anything")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-progress")
                .long("no-progress")
                .help("Disable progress indicators")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-chapters")
                .long("list-chapters")
                .help("List the chapters of the input file and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-profiles")
                .long("list-profiles")
                .help("List available filter profiles")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-matchers")
                .long("list-matchers")
                .help("List available match modes")
                .action(clap::ArgAction::SetTrue),
        )
}

fn input_file(matches: &clap::ArgMatches) -> Result<PathBuf> {
    matches
        .get_one::<PathBuf>("input_file")
        .cloned()
        .ok_or_else(|| config_error("input_file", "Input file is required"))
}

async fn load_config_file(matches: &clap::ArgMatches) -> Result<Option<ConfigFile>> {
    match matches.get_one::<PathBuf>("config") {
        Some(config_path) => Ok(Some(ConfigFile::load(config_path).await?)),
        None => Ok(ConfigFile::load_from_default_locations().await),
    }
}

fn parse_config(matches: &clap::ArgMatches, config_file: Option<&ConfigFile>) -> Result<Config> {
    let mut builder = ConfigBuilder::new().input_file(input_file(matches)?);

    let profile_name = matches.get_one::<String>("profile");
    match (config_file, profile_name) {
        (Some(cf), Some(name)) => builder = cf.apply_profile_to_builder(name, builder)?,
        (Some(cf), None) => builder = cf.apply_to_builder(builder)?,
        // Built-in profiles work without a config file
        (None, Some(name)) => builder = ConfigFile::default().apply_profile_to_builder(name, builder)?,
        (None, None) => {}
    }

    if let Some(output) = matches.get_one::<PathBuf>("output_file") {
        builder = builder.output_file(output.clone());
    }

    if let Some(filter) = matches.get_one::<String>("filter_string") {
        builder = builder.filter_string(filter.clone());
    }

    if let Some(mode_str) = matches.get_one::<String>("match") {
        let mode: MatchMode = mode_str.parse()?;
        builder = builder.match_mode(mode);
    }

    builder.dry_run(matches.get_flag("dry-run")).build()
}

fn list_matchers() {
    println!("Available match modes:");
    for mode in MatchMode::ALL {
        println!("  {}: {}", mode, mode.description());
    }
}

fn list_profiles(config_file: &ConfigFile) {
    println!("Available filter profiles:");
    let profiles = config_file.profiles.clone().unwrap_or_default();
    for profile_name in config_file.list_profiles() {
        let description = profiles
            .get(&profile_name)
            .and_then(|p| p.description.as_deref())
            .unwrap_or("No description");
        println!("  {}: {}", profile_name, description);
    }
}

fn list_chapters(matches: &clap::ArgMatches) -> Result<()> {
    let input = input_file(matches)?;
    config::validate_input_file(&input)?;

    let timeline = timeline::extract(&tags::read_tags(&input)?);
    println!(
        "Table of contents: {}",
        timeline.toc().map(|t| t.element_id.as_str()).unwrap_or("(none)")
    );
    for (index, chapter) in timeline.chapters().iter().enumerate() {
        println!(
            "  {:>3}  {:<12} {:>9}ms - {:>9}ms  {}",
            index + 1,
            chapter.id(),
            chapter.start_ms(),
            chapter.end_ms(),
            chapter.title()
        );
    }
    Ok(())
}

fn report(summary: &engine::RunSummary) {
    info!(
        "Removed {} of {} chapters ({}ms)",
        summary.removed_titles.len(),
        summary.chapters_before,
        summary.removed_duration_ms
    );
    for chapter in &summary.chapters_after {
        info!(
            "  {} {}-{}ms {}",
            chapter.id(),
            chapter.start_ms(),
            chapter.end_ms(),
            chapter.title()
        );
    }

    match &summary.output_file {
        Some(output) => info!("✓ Successfully wrote {}", output.display()),
        None => info!("Dry run complete, nothing written"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let app = build_cli();
    let matches = app.get_matches();

    // Initialize logging
    let default_filter = if matches.get_flag("verbose") { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    // Handle listing commands first
    if matches.get_flag("list-matchers") {
        list_matchers();
        return Ok(());
    }

    let config_file = load_config_file(&matches).await?;

    if matches.get_flag("list-profiles") {
        list_profiles(config_file.as_ref().unwrap_or(&ConfigFile::default()));
        return Ok(());
    }

    if matches.get_flag("list-chapters") {
        return list_chapters(&matches);
    }

    let config = parse_config(&matches, config_file.as_ref())?;
    let show_progress = !matches.get_flag("no-progress")
        && config_file
            .as_ref()
            .and_then(|cf| cf.show_progress)
            .unwrap_or(true);
    let progress = ProgressOperation::new(show_progress);

    info!("Starting chapcut with config: {:?}", config);

    if config.filter_string.is_empty() {
        warn!("Empty filter string: every chapter will be removed");
    }

    if !config.dry_run {
        progress
            .with_stage("Validating system dependencies", || {
                dependencies::validate_dependencies(&config.ffmpeg_path, &config.ffprobe_path)
            })
            .await?;
    }

    let codec = FfmpegCodec::new(config.ffmpeg_path.clone(), config.ffprobe_path.clone());
    let summary = engine::run(&config, &codec, &progress).await?;
    report(&summary);

    Ok(())
}
