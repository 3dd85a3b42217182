//! Decides which chapters go and where the survivors land.
//!
//! Chapters are walked in timeline order while a running total of removed
//! duration is kept. A surviving chapter is moved earlier by everything
//! removed before it and takes the next sequential id (`ch1`, `ch2`, ...).

use std::collections::HashSet;

use log::{debug, info};

use crate::chapters::{OriginalChapter, RebuiltChapter};
use crate::matchers::{ChapterMatcher, SubstringMatcher};

/// Prefix of the sequential ids given to surviving chapters
pub const CHAPTER_ID_PREFIX: &str = "ch";

/// Output of the planner. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct ChapterPlan {
    removed: Vec<OriginalChapter>,
    kept: Vec<OriginalChapter>,
    rebuilt: Vec<RebuiltChapter>,
    shifts: Vec<u32>,
}

impl ChapterPlan {
    /// Removed chapters, timeline order
    pub fn removed(&self) -> &[OriginalChapter] {
        &self.removed
    }

    /// Surviving chapters with their source offsets, for the splicer
    pub fn kept(&self) -> &[OriginalChapter] {
        &self.kept
    }

    /// Surviving chapters with output offsets and new ids, for the rebuilder
    pub fn rebuilt(&self) -> &[RebuiltChapter] {
        &self.rebuilt
    }

    pub fn removed_ids(&self) -> HashSet<&str> {
        self.removed.iter().map(|chapter| chapter.id()).collect()
    }

    /// Cumulative removed duration at each timeline index, inclusive
    pub fn shifts(&self) -> &[u32] {
        &self.shifts
    }

    pub fn removed_duration_ms(&self) -> u64 {
        self.removed.iter().map(|c| u64::from(c.duration_ms())).sum()
    }

    pub fn kept_duration_ms(&self) -> u64 {
        self.rebuilt.iter().map(|c| u64::from(c.duration_ms())).sum()
    }

    pub fn is_unchanged(&self) -> bool {
        self.removed.is_empty()
    }
}

pub fn chapter_id(position: usize) -> String {
    format!("{}{}", CHAPTER_ID_PREFIX, position)
}

/// Plan removal of every chapter whose title `matcher` accepts.
///
/// `timeline` must already be in ascending start order.
pub fn plan(timeline: &[OriginalChapter], matcher: &dyn ChapterMatcher) -> ChapterPlan {
    let mut plan = ChapterPlan::default();
    let mut shift_ms: u32 = 0;

    for chapter in timeline {
        if matcher.matches(chapter.title()) {
            shift_ms = shift_ms.saturating_add(chapter.duration_ms());
            info!(
                "Removing chapter '{}' ({}) {}-{}ms",
                chapter.title(),
                chapter.id(),
                chapter.start_ms(),
                chapter.end_ms()
            );
            plan.removed.push(chapter.clone());
        } else {
            let new_id = chapter_id(plan.kept.len() + 1);
            let rebuilt = chapter.retimed(new_id, shift_ms);
            debug!(
                "Keeping chapter '{}' ({} -> {}) {}-{}ms -> {}-{}ms",
                chapter.title(),
                chapter.id(),
                rebuilt.id(),
                chapter.start_ms(),
                chapter.end_ms(),
                rebuilt.start_ms(),
                rebuilt.end_ms()
            );
            plan.kept.push(chapter.clone());
            plan.rebuilt.push(rebuilt);
        }
        plan.shifts.push(shift_ms);
    }

    info!(
        "Planned removal of {} of {} chapters ({}ms)",
        plan.removed.len(),
        timeline.len(),
        plan.removed_duration_ms()
    );
    plan
}

/// Plan with the case-insensitive substring filter
pub fn plan_with_filter(timeline: &[OriginalChapter], filter: &str) -> ChapterPlan {
    plan(timeline, &SubstringMatcher::new(filter))
}
