//! Chapter model and the decoded tag set.
//!
//! A tag set is an ordered list of [`TagFrame`]s, each one of three closed
//! kinds: a chapter, a table of contents, or an opaque frame that is carried
//! through untouched. Chapters come in two views that are never mixed up:
//! [`OriginalChapter`] keeps the offsets found in the input file and is the
//! only thing the splicer accepts, [`RebuiltChapter`] carries the shifted
//! offsets and the new id and is the only thing the rebuilder accepts.

use id3::Frame;

/// Sub-frame holding a chapter's title
pub const TITLE_FRAME_ID: &str = "TIT2";

/// A chapter frame as stored in the tag
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterFrame {
    pub element_id: String,
    pub start_ms: u32,
    pub end_ms: u32,
    pub sub_frames: Vec<Frame>,
}

impl ChapterFrame {
    pub fn new(element_id: impl Into<String>, start_ms: u32, end_ms: u32) -> Self {
        Self {
            element_id: element_id.into(),
            start_ms,
            end_ms,
            sub_frames: Vec::new(),
        }
    }

    /// Attach a title sub-frame
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.sub_frames.push(Frame::text(TITLE_FRAME_ID, title.into()));
        self
    }

    /// First title sub-frame, or the empty string
    pub fn title(&self) -> String {
        self.sub_frames
            .iter()
            .find(|frame| frame.id().starts_with(TITLE_FRAME_ID))
            .and_then(|frame| frame.content().text())
            .unwrap_or_default()
            .to_string()
    }
}

/// Table of contents entry listing chapter ids in navigation order
#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    pub element_id: String,
    pub top_level: bool,
    pub ordered: bool,
    pub child_ids: Vec<String>,
    pub sub_frames: Vec<Frame>,
}

impl TocEntry {
    pub fn new(element_id: impl Into<String>, child_ids: Vec<String>) -> Self {
        Self {
            element_id: element_id.into(),
            top_level: true,
            ordered: true,
            child_ids,
            sub_frames: Vec::new(),
        }
    }
}

/// One frame of a decoded tag
#[derive(Debug, Clone, PartialEq)]
pub enum TagFrame {
    Chapter(ChapterFrame),
    TableOfContents(TocEntry),
    Other(Frame),
}

/// Decoded tag: frames in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagSet {
    frames: Vec<TagFrame>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_frames(frames: Vec<TagFrame>) -> Self {
        Self { frames }
    }

    pub fn push(&mut self, frame: TagFrame) {
        self.frames.push(frame);
    }

    pub fn frames(&self) -> &[TagFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn chapters(&self) -> impl Iterator<Item = &ChapterFrame> {
        self.frames.iter().filter_map(|frame| match frame {
            TagFrame::Chapter(chapter) => Some(chapter),
            _ => None,
        })
    }

    pub fn tables_of_contents(&self) -> impl Iterator<Item = &TocEntry> {
        self.frames.iter().filter_map(|frame| match frame {
            TagFrame::TableOfContents(toc) => Some(toc),
            _ => None,
        })
    }

    pub fn others(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter().filter_map(|frame| match frame {
            TagFrame::Other(other) => Some(other),
            _ => None,
        })
    }

    /// Text of the first opaque frame with the given id
    pub fn text(&self, frame_id: &str) -> Option<&str> {
        self.others()
            .find(|frame| frame.id() == frame_id)
            .and_then(|frame| frame.content().text())
    }
}

/// A chapter with the offsets it had in the input file
#[derive(Debug, Clone, PartialEq)]
pub struct OriginalChapter {
    id: String,
    title: String,
    start_ms: u32,
    end_ms: u32,
    sub_frames: Vec<Frame>,
}

impl OriginalChapter {
    pub fn from_frame(frame: ChapterFrame) -> Self {
        let title = frame.title();
        Self {
            id: frame.element_id,
            title,
            start_ms: frame.start_ms,
            end_ms: frame.end_ms,
            sub_frames: frame.sub_frames,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start_ms(&self) -> u32 {
        self.start_ms
    }

    pub fn end_ms(&self) -> u32 {
        self.end_ms
    }

    pub fn sub_frames(&self) -> &[Frame] {
        &self.sub_frames
    }

    /// Length in ms; inverted bounds count as zero
    pub fn duration_ms(&self) -> u32 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Move this chapter `shift_ms` earlier under a new id
    pub(crate) fn retimed(&self, new_id: String, shift_ms: u32) -> RebuiltChapter {
        RebuiltChapter {
            id: new_id,
            title: self.title.clone(),
            start_ms: self.start_ms.saturating_sub(shift_ms),
            end_ms: self.end_ms.saturating_sub(shift_ms),
            sub_frames: self.sub_frames.clone(),
        }
    }
}

/// A surviving chapter placed on the output timeline
#[derive(Debug, Clone, PartialEq)]
pub struct RebuiltChapter {
    id: String,
    title: String,
    start_ms: u32,
    end_ms: u32,
    sub_frames: Vec<Frame>,
}

impl RebuiltChapter {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start_ms(&self) -> u32 {
        self.start_ms
    }

    pub fn end_ms(&self) -> u32 {
        self.end_ms
    }

    pub fn duration_ms(&self) -> u32 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    pub fn to_frame(&self) -> ChapterFrame {
        ChapterFrame {
            element_id: self.id.clone(),
            start_ms: self.start_ms,
            end_ms: self.end_ms,
            sub_frames: self.sub_frames.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_from_first_title_subframe() {
        let mut frame = ChapterFrame::new("chp0", 0, 1000).with_title("Intro");
        frame.sub_frames.push(Frame::text(TITLE_FRAME_ID, "Second"));
        assert_eq!(frame.title(), "Intro");
    }

    #[test]
    fn test_title_defaults_to_empty() {
        let mut frame = ChapterFrame::new("chp0", 0, 1000);
        frame.sub_frames.push(Frame::text("TIT3", "Subtitle only"));
        assert_eq!(frame.title(), "");
    }

    #[test]
    fn test_retimed_keeps_subframes_and_shifts() {
        let original = OriginalChapter::from_frame(
            ChapterFrame::new("chp7", 4000, 6000).with_title("Outro"),
        );
        let rebuilt = original.retimed("ch2".to_string(), 3000);

        assert_eq!(rebuilt.id(), "ch2");
        assert_eq!(rebuilt.title(), "Outro");
        assert_eq!((rebuilt.start_ms(), rebuilt.end_ms()), (1000, 3000));
        assert_eq!(rebuilt.to_frame().sub_frames, original.sub_frames().to_vec());
        // the source view is untouched
        assert_eq!((original.start_ms(), original.end_ms()), (4000, 6000));
    }

    #[test]
    fn test_inverted_bounds_have_zero_duration() {
        let original = OriginalChapter::from_frame(ChapterFrame::new("bad", 500, 100));
        assert_eq!(original.duration_ms(), 0);
    }

    #[test]
    fn test_tag_set_views() {
        let tags = TagSet::from_frames(vec![
            TagFrame::Other(Frame::text("TALB", "Show")),
            TagFrame::Chapter(ChapterFrame::new("a", 0, 10)),
            TagFrame::TableOfContents(TocEntry::new("toc", vec!["a".to_string()])),
            TagFrame::Chapter(ChapterFrame::new("b", 10, 20)),
        ]);

        assert_eq!(tags.len(), 4);
        assert_eq!(tags.chapters().count(), 2);
        assert_eq!(tags.tables_of_contents().count(), 1);
        assert_eq!(tags.text("TALB"), Some("Show"));
        assert_eq!(tags.text("TIT2"), None);
    }
}
