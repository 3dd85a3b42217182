//! ID3v2 boundary: converts between `id3` tags and [`TagSet`].

use std::path::Path;

use id3::frame::{Chapter, Content, TableOfContents};
use id3::{ErrorKind, Frame, Tag, TagLike, Version};
use log::{debug, warn};

use crate::chapters::{ChapterFrame, TagFrame, TagSet, TocEntry};
use crate::error::{decode_error, encode_error, Result, Stage};

/// CHAP byte offset meaning "not set"
pub const UNUSED_BYTE_OFFSET: u32 = u32::MAX;

/// Version written on output
pub const OUTPUT_VERSION: Version = Version::Id3v24;

/// Read the ID3v2 tag of `path`. A file without a tag gives an empty set.
pub fn read_tags(path: &Path) -> Result<TagSet> {
    match Tag::read_from_path(path) {
        Ok(tag) => {
            debug!("Read {:?} tag from {}", tag.version(), path.display());
            Ok(from_id3(&tag))
        }
        Err(e) if matches!(e.kind, ErrorKind::NoTag) => {
            warn!("{} has no ID3v2 tag", path.display());
            Ok(TagSet::new())
        }
        Err(e) => Err(decode_error(Stage::Tags, format!("{}: {}", path.display(), e))),
    }
}

/// Write `tags` into `path`, replacing any tag already there
pub fn write_tags(tags: &TagSet, path: &Path) -> Result<()> {
    to_id3(tags)
        .write_to_path(path, OUTPUT_VERSION)
        .map_err(|e| encode_error(Stage::Tags, format!("{}: {}", path.display(), e)))?;
    debug!("Wrote {} frames to {}", tags.len(), path.display());
    Ok(())
}

pub fn from_id3(tag: &Tag) -> TagSet {
    let frames = tag
        .frames()
        .map(|frame| match frame.content() {
            Content::Chapter(chapter) => TagFrame::Chapter(ChapterFrame {
                element_id: chapter.element_id.clone(),
                start_ms: chapter.start_time,
                end_ms: chapter.end_time,
                sub_frames: chapter.frames.clone(),
            }),
            Content::TableOfContents(toc) => TagFrame::TableOfContents(TocEntry {
                element_id: toc.element_id.clone(),
                top_level: toc.top_level,
                ordered: toc.ordered,
                child_ids: toc.elements.clone(),
                sub_frames: toc.frames.clone(),
            }),
            _ => TagFrame::Other(frame.clone()),
        })
        .collect();
    TagSet::from_frames(frames)
}

pub fn to_id3(tags: &TagSet) -> Tag {
    let mut tag = Tag::with_version(OUTPUT_VERSION);

    for frame in tags.frames() {
        let frame = match frame {
            TagFrame::Chapter(chapter) => Frame::with_content(
                "CHAP",
                Content::Chapter(Chapter {
                    element_id: chapter.element_id.clone(),
                    start_time: chapter.start_ms,
                    end_time: chapter.end_ms,
                    // audio bytes were re-encoded, old offsets mean nothing
                    start_offset: UNUSED_BYTE_OFFSET,
                    end_offset: UNUSED_BYTE_OFFSET,
                    frames: chapter.sub_frames.clone(),
                }),
            ),
            TagFrame::TableOfContents(toc) => Frame::with_content(
                "CTOC",
                Content::TableOfContents(TableOfContents {
                    element_id: toc.element_id.clone(),
                    top_level: toc.top_level,
                    ordered: toc.ordered,
                    elements: toc.child_ids.clone(),
                    frames: toc.sub_frames.clone(),
                }),
            ),
            TagFrame::Other(other) => {
                if let Content::Unknown(unknown) = other.content() {
                    if unknown.version != OUTPUT_VERSION {
                        warn!("Dropping frame {} that cannot be re-encoded as ID3v2.4", other.id());
                        continue;
                    }
                }
                other.clone()
            }
        };
        if let Some(replaced) = tag.add_frame(frame) {
            warn!("Duplicate {} frame replaced on output", replaced.id());
        }
    }

    tag
}
