//! Chapter removal pipeline.
//!
//! [`remove_chapters`] is the in-memory transform: timeline extraction,
//! planning, splicing and tag rebuilding, with no I/O. [`run`] wraps it with
//! the tag and audio codecs and writes the result atomically.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use log::{debug, info};

use crate::audio::AudioBuffer;
use crate::chapters::{OriginalChapter, RebuiltChapter, TagSet};
use crate::config::Config;
use crate::error::{fs_error, IntoChapcutError, Result};
use crate::ffmpeg::AudioCodec;
use crate::matchers::ChapterMatcher;
use crate::planner::{self, ChapterPlan};
use crate::progress::ProgressOperation;
use crate::rebuild::rebuild;
use crate::splicer::splice_with;
use crate::tags;
use crate::timeline::{self, Timeline};

/// New audio and tags for one file, plus the plan that produced them
#[derive(Debug, Clone)]
pub struct EditOutcome {
    pub plan: ChapterPlan,
    pub audio: AudioBuffer,
    pub tags: TagSet,
}

/// What a run did, for reporting
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub input_file: PathBuf,
    /// `None` on a dry run
    pub output_file: Option<PathBuf>,
    pub chapters_before: usize,
    /// Titles of removed chapters, timeline order
    pub removed_titles: Vec<String>,
    pub chapters_after: Vec<RebuiltChapter>,
    pub removed_duration_ms: u64,
    /// Audio durations; `None` when audio was never decoded
    pub input_duration_ms: Option<u64>,
    pub output_duration_ms: Option<u64>,
}

impl RunSummary {
    fn from_plan(config: &Config, chapters_before: usize, plan: &ChapterPlan) -> Self {
        Self {
            input_file: config.input_file.clone(),
            output_file: None,
            chapters_before,
            removed_titles: plan.removed().iter().map(|c| c.title().to_string()).collect(),
            chapters_after: plan.rebuilt().to_vec(),
            removed_duration_ms: plan.removed_duration_ms(),
            input_duration_ms: None,
            output_duration_ms: None,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.output_file.is_none()
    }
}

/// Extract the timeline from `tags` and plan which chapters go
pub fn plan_removal(tags: &TagSet, matcher: &dyn ChapterMatcher) -> (Timeline, ChapterPlan) {
    let timeline = timeline::extract(tags);
    let plan = planner::plan(timeline.chapters(), matcher);
    (timeline, plan)
}

/// Splice the kept chapters out of `audio` and rebuild the tag set.
///
/// `on_chapter` is called after each kept chapter is spliced.
pub fn apply_plan<F>(
    timeline: &Timeline,
    plan: &ChapterPlan,
    audio: &AudioBuffer,
    processed_on: NaiveDate,
    on_chapter: F,
) -> Result<EditOutcome>
where
    F: FnMut(usize, &OriginalChapter),
{
    let spliced = splice_with(audio, plan.kept(), on_chapter)?;
    let tags = rebuild(
        plan.rebuilt(),
        timeline.toc(),
        timeline.passthrough(),
        processed_on,
    );

    debug!(
        "Audio {}ms -> {}ms, {} -> {} chapters",
        audio.duration_ms(),
        spliced.duration_ms(),
        timeline.chapters().len(),
        plan.rebuilt().len()
    );

    Ok(EditOutcome {
        plan: plan.clone(),
        audio: spliced,
        tags,
    })
}

/// Remove every chapter whose title `matcher` accepts, from both the audio
/// and the tag set
pub fn remove_chapters(
    tags: &TagSet,
    audio: &AudioBuffer,
    matcher: &dyn ChapterMatcher,
    processed_on: NaiveDate,
) -> Result<EditOutcome> {
    let (timeline, plan) = plan_removal(tags, matcher);
    apply_plan(&timeline, &plan, audio, processed_on, |_, _| {})
}

/// Run the whole edit for `config`: read, plan, splice, rebuild, write.
///
/// A dry run stops after planning and touches neither audio nor output.
pub async fn run(
    config: &Config,
    codec: &dyn AudioCodec,
    progress: &ProgressOperation,
) -> Result<RunSummary> {
    let matcher = config.matcher()?;
    let input = config.input_file.as_path();
    info!(
        "Filtering chapters of {} with {} match '{}'",
        input.display(),
        config.match_mode,
        config.filter_string
    );

    let input_tags = progress
        .with_stage("Reading chapter tags", || async { tags::read_tags(input) })
        .await?;
    let (timeline, plan) = plan_removal(&input_tags, matcher.as_ref());
    let mut summary = RunSummary::from_plan(config, timeline.chapters().len(), &plan);

    if config.dry_run {
        info!("Dry run: no files written");
        return Ok(summary);
    }

    let output = config.output_path()?;

    let audio = progress
        .with_stage("Decoding audio", || codec.decode(input))
        .await?;

    let bar = progress.chapter_bar(plan.kept().len() as u64, "Splicing chapters");
    let edit = apply_plan(
        &timeline,
        &plan,
        &audio,
        Local::now().date_naive(),
        |_, _| {
            if let Some(bar) = &bar {
                bar.inc(1);
            }
        },
    );
    if let Some(bar) = bar {
        match edit {
            Ok(_) => bar.finish_with_message("✓ Spliced chapters"),
            Err(_) => bar.abandon_with_message("✗ Splicing chapters"),
        }
    }
    let edit = edit?;

    progress
        .with_stage("Writing output", || {
            write_output(codec, &edit.audio, &edit.tags, input, output)
        })
        .await?;

    info!(
        "Audio duration {}ms -> {}ms",
        audio.duration_ms(),
        edit.audio.duration_ms()
    );

    summary.output_file = Some(output.to_path_buf());
    summary.input_duration_ms = Some(audio.duration_ms());
    summary.output_duration_ms = Some(edit.audio.duration_ms());
    Ok(summary)
}

/// Encode into a staging file beside `output`, tag it, then rename it into
/// place. On failure the staging file is removed and `output` is untouched.
///
/// The output takes the permissions of `input`; staging files are created
/// owner-only.
async fn write_output(
    codec: &dyn AudioCodec,
    audio: &AudioBuffer,
    tags: &TagSet,
    input: &Path,
    output: &Path,
) -> Result<()> {
    let dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let staged = tempfile::Builder::new()
        .prefix(".chapcut-")
        .suffix(".mp3")
        .tempfile_in(dir)
        .with_path(dir.to_path_buf())?;
    debug!("Staging output in {}", staged.path().display());

    // tags are written into the encoded file, so audio goes first
    codec.encode(audio, staged.path()).await?;
    tags::write_tags(tags, staged.path())?;

    let permissions = tokio::fs::metadata(input)
        .await
        .with_path(input.to_path_buf())?
        .permissions();
    tokio::fs::set_permissions(staged.path(), permissions)
        .await
        .with_path(staged.path().to_path_buf())?;

    staged
        .persist(output)
        .map_err(|e| fs_error(e.error, output.to_path_buf()))?;
    info!("Wrote {}", output.display());
    Ok(())
}
