use id3::Frame;
use log::{debug, warn};

use crate::chapters::{OriginalChapter, TagFrame, TagSet, TocEntry};

/// Chapters of one file in ascending start order, plus its TOC and the
/// frames that pass through untouched
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    chapters: Vec<OriginalChapter>,
    toc: Option<TocEntry>,
    passthrough: Vec<Frame>,
}

/// Place where consecutive chapters do not touch
#[derive(Debug, Clone, PartialEq)]
pub enum Discontinuity {
    Gap { after: String, before: String, gap_ms: u32 },
    Overlap { after: String, before: String, overlap_ms: u32 },
}

impl Timeline {
    pub fn chapters(&self) -> &[OriginalChapter] {
        &self.chapters
    }

    pub fn toc(&self) -> Option<&TocEntry> {
        self.toc.as_ref()
    }

    pub fn passthrough(&self) -> &[Frame] {
        &self.passthrough
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// Gaps and overlaps between neighbours. Reported only, never repaired.
    pub fn discontinuities(&self) -> Vec<Discontinuity> {
        self.chapters
            .windows(2)
            .filter_map(|pair| {
                let (prev, next) = (&pair[0], &pair[1]);
                if next.start_ms() > prev.end_ms() {
                    Some(Discontinuity::Gap {
                        after: prev.id().to_string(),
                        before: next.id().to_string(),
                        gap_ms: next.start_ms() - prev.end_ms(),
                    })
                } else if next.start_ms() < prev.end_ms() {
                    Some(Discontinuity::Overlap {
                        after: prev.id().to_string(),
                        before: next.id().to_string(),
                        overlap_ms: prev.end_ms() - next.start_ms(),
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}

/// Build the chapter timeline from a decoded tag set.
///
/// Chapters are stably sorted by start time, so equal starts keep tag order.
/// With several TOC frames the last one wins.
pub fn extract(tags: &TagSet) -> Timeline {
    let mut chapters = Vec::new();
    let mut toc: Option<TocEntry> = None;
    let mut passthrough = Vec::new();

    for frame in tags.frames() {
        match frame {
            TagFrame::Chapter(chapter) => {
                chapters.push(OriginalChapter::from_frame(chapter.clone()));
            }
            TagFrame::TableOfContents(entry) => {
                if let Some(previous) = toc.replace(entry.clone()) {
                    warn!(
                        "Multiple table of contents frames; dropping '{}' in favour of '{}'",
                        previous.element_id, entry.element_id
                    );
                }
            }
            TagFrame::Other(other) => passthrough.push(other.clone()),
        }
    }

    chapters.sort_by_key(|chapter| chapter.start_ms());

    if chapters.is_empty() {
        warn!("No chapter frames found; nothing to remove");
    }
    if toc.is_none() {
        warn!("No table of contents frame found; a default one will be written");
    }

    let timeline = Timeline {
        chapters,
        toc,
        passthrough,
    };

    for issue in timeline.discontinuities() {
        match issue {
            Discontinuity::Gap { after, before, gap_ms } => {
                warn!("{}ms gap between chapters '{}' and '{}'", gap_ms, after, before)
            }
            Discontinuity::Overlap { after, before, overlap_ms } => {
                warn!("Chapters '{}' and '{}' overlap by {}ms", after, before, overlap_ms)
            }
        }
    }

    debug!(
        "Extracted {} chapters, {} passthrough frames",
        timeline.chapters.len(),
        timeline.passthrough.len()
    );
    timeline
}
