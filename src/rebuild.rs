use chrono::NaiveDate;
use id3::Frame;
use log::debug;

use crate::chapters::{RebuiltChapter, TagFrame, TagSet, TocEntry};

/// TOC id written when the input had none
pub const DEFAULT_TOC_ID: &str = "toc";

/// Frame stamped with the processing date (ID3v2.4 tagging time)
pub const PROCESSING_DATE_FRAME_ID: &str = "TDTG";

/// Assemble the output tag set.
///
/// Passthrough frames come first in their original order, minus any older
/// processing date, then the new date, the TOC and one frame per chapter.
/// TOC children are exactly the chapter ids in order.
pub fn rebuild(
    chapters: &[RebuiltChapter],
    toc: Option<&TocEntry>,
    passthrough: &[Frame],
    processed_on: NaiveDate,
) -> TagSet {
    let mut tags = TagSet::new();

    for frame in passthrough {
        if frame.id() == PROCESSING_DATE_FRAME_ID {
            debug!("Replacing previous processing date frame");
            continue;
        }
        tags.push(TagFrame::Other(frame.clone()));
    }

    tags.push(TagFrame::Other(processing_date_frame(processed_on)));
    tags.push(TagFrame::TableOfContents(rebuild_toc(chapters, toc)));

    for chapter in chapters {
        tags.push(TagFrame::Chapter(chapter.to_frame()));
    }

    debug!("Rebuilt tag with {} frames", tags.len());
    tags
}

/// TOC keeping the original id and flags, children regenerated
pub fn rebuild_toc(chapters: &[RebuiltChapter], toc: Option<&TocEntry>) -> TocEntry {
    let child_ids = chapters.iter().map(|c| c.id().to_string()).collect();
    match toc {
        Some(original) => TocEntry {
            child_ids,
            ..original.clone()
        },
        None => TocEntry::new(DEFAULT_TOC_ID, child_ids),
    }
}

pub fn processing_date_frame(date: NaiveDate) -> Frame {
    Frame::text(PROCESSING_DATE_FRAME_ID, date.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chapters::{ChapterFrame, OriginalChapter, TITLE_FRAME_ID};
    use crate::planner::plan_with_filter;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    fn sample_plan(filter: &str) -> crate::planner::ChapterPlan {
        let timeline: Vec<OriginalChapter> = [("Intro", 0, 1000), ("Ad: Buy now", 1000, 4000), ("Outro", 4000, 6000)]
            .iter()
            .enumerate()
            .map(|(i, (title, start, end))| {
                let mut frame = ChapterFrame::new(format!("chp{}", i), *start, *end).with_title(*title);
                frame.sub_frames.push(Frame::text("TIT3", format!("part {}", i)));
                OriginalChapter::from_frame(frame)
            })
            .collect();
        plan_with_filter(&timeline, filter)
    }

    #[test]
    fn test_toc_lists_new_ids_in_order() {
        let plan = sample_plan("ad");
        let original = TocEntry::new("toc1", vec!["chp0".into(), "chp1".into(), "chp2".into()]);
        let tags = rebuild(plan.rebuilt(), Some(&original), &[], date());

        let toc = tags.tables_of_contents().next().unwrap();
        assert_eq!(toc.element_id, "toc1");
        assert_eq!(toc.child_ids, vec!["ch1", "ch2"]);
        assert_eq!(tags.tables_of_contents().count(), 1);

        let chapter_ids: Vec<&str> = tags.chapters().map(|c| c.element_id.as_str()).collect();
        assert_eq!(chapter_ids, toc.child_ids.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn test_missing_toc_gets_default_id() {
        let plan = sample_plan("zzz");
        let tags = rebuild(plan.rebuilt(), None, &[], date());

        let toc = tags.tables_of_contents().next().unwrap();
        assert_eq!(toc.element_id, DEFAULT_TOC_ID);
        assert!(toc.top_level);
        assert!(toc.ordered);
        assert_eq!(toc.child_ids, vec!["ch1", "ch2", "ch3"]);
    }

    #[test]
    fn test_toc_flags_and_subframes_preserved() {
        let plan = sample_plan("ad");
        let mut original = TocEntry::new("root", vec![]);
        original.ordered = false;
        original.sub_frames.push(Frame::text(TITLE_FRAME_ID, "Contents"));

        let toc = rebuild_toc(plan.rebuilt(), Some(&original));
        assert!(!toc.ordered);
        assert_eq!(toc.sub_frames, original.sub_frames);
    }

    #[test]
    fn test_chapter_frames_carry_new_offsets_and_subframes() {
        let plan = sample_plan("ad");
        let tags = rebuild(plan.rebuilt(), None, &[], date());
        let chapters: Vec<&ChapterFrame> = tags.chapters().collect();

        assert_eq!(chapters.len(), 2);
        assert_eq!((chapters[1].start_ms, chapters[1].end_ms), (1000, 3000));
        assert_eq!(chapters[1].title(), "Outro");
        assert_eq!(chapters[1].sub_frames[1], Frame::text("TIT3", "part 2"));
    }

    #[test]
    fn test_passthrough_copied_and_date_replaced() {
        let passthrough = vec![
            Frame::text("TALB", "Weekly Show"),
            Frame::text(PROCESSING_DATE_FRAME_ID, "1999-01-01"),
            Frame::text("TPE1", "Host"),
        ];
        let tags = rebuild(&[], None, &passthrough, date());

        assert_eq!(tags.text("TALB"), Some("Weekly Show"));
        assert_eq!(tags.text("TPE1"), Some("Host"));
        assert_eq!(tags.text(PROCESSING_DATE_FRAME_ID), Some("2024-03-09"));
        assert_eq!(
            tags.others().filter(|f| f.id() == PROCESSING_DATE_FRAME_ID).count(),
            1
        );
    }

    #[test]
    fn test_all_removed_leaves_empty_toc() {
        let plan = sample_plan("");
        let tags = rebuild(plan.rebuilt(), None, &[], date());

        assert_eq!(tags.chapters().count(), 0);
        assert!(tags.tables_of_contents().next().unwrap().child_ids.is_empty());
    }
}
