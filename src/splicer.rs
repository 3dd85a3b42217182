use log::debug;

use crate::audio::AudioBuffer;
use crate::chapters::OriginalChapter;
use crate::error::Result;

/// Concatenate the source ranges of `chapters`, in the order given.
///
/// Only [`OriginalChapter`] values are accepted: their offsets address the
/// source buffer. Output keeps the source format; no resampling or fades.
pub fn splice(source: &AudioBuffer, chapters: &[OriginalChapter]) -> Result<AudioBuffer> {
    splice_with(source, chapters, |_, _| {})
}

/// [`splice`], calling `on_chapter` after each chapter is appended
pub fn splice_with<F>(
    source: &AudioBuffer,
    chapters: &[OriginalChapter],
    mut on_chapter: F,
) -> Result<AudioBuffer>
where
    F: FnMut(usize, &OriginalChapter),
{
    let mut output = AudioBuffer::empty(*source.format());

    for (index, chapter) in chapters.iter().enumerate() {
        let segment = source.slice(chapter.start_ms(), chapter.end_ms());
        debug!(
            "Chapter {} '{}' {}-{}ms: {}ms of audio",
            index + 1,
            chapter.title(),
            chapter.start_ms(),
            chapter.end_ms(),
            segment.duration_ms()
        );
        output.append(&segment)?;
        on_chapter(index, chapter);
    }

    debug!("Spliced audio duration: {}ms", output.duration_ms());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioFormat;
    use crate::chapters::ChapterFrame;
    use crate::planner::plan_with_filter;

    fn chapter(title: &str, start: u32, end: u32) -> OriginalChapter {
        OriginalChapter::from_frame(ChapterFrame::new(title, start, end).with_title(title))
    }

    /// 1 kHz mono where each sample equals its ms position
    fn ramp(ms: i16) -> AudioBuffer {
        AudioBuffer::from_samples(AudioFormat::new(1000, 1), (0..ms).collect())
    }

    #[test]
    fn test_splices_surviving_ranges() {
        let source = ramp(6000);
        let timeline = vec![
            chapter("Intro", 0, 1000),
            chapter("Ad: Buy now", 1000, 4000),
            chapter("Outro", 4000, 6000),
        ];
        let plan = plan_with_filter(&timeline, "Ad");

        let output = splice(&source, plan.kept()).unwrap();
        assert_eq!(output.duration_ms(), 3000);
        assert_eq!(output.samples()[999], 999);
        // first sample after the cut comes from the outro
        assert_eq!(output.samples()[1000], 4000);
        assert_eq!(output.duration_ms(), plan.kept_duration_ms());
    }

    #[test]
    fn test_no_removal_keeps_duration() {
        let source = ramp(6000);
        let timeline = vec![chapter("A", 0, 2500), chapter("B", 2500, 6000)];
        let plan = plan_with_filter(&timeline, "ZZZ");

        let output = splice(&source, plan.kept()).unwrap();
        assert_eq!(output, source);
    }

    #[test]
    fn test_nothing_kept_gives_empty_audio() {
        let source = ramp(3000);
        let output = splice(&source, &[]).unwrap();
        assert!(output.is_empty());
        assert_eq!(output.duration_ms(), 0);
        assert_eq!(output.format(), source.format());
    }

    #[test]
    fn test_duration_conserved_with_several_cuts() {
        let source = AudioBuffer::from_samples(AudioFormat::new(8000, 2), vec![7; 8000 * 2 * 10]);
        let timeline = vec![
            chapter("One", 0, 1200),
            chapter("sponsor", 1200, 2000),
            chapter("Two", 2000, 5500),
            chapter("Sponsor again", 5500, 7000),
            chapter("Three", 7000, 10000),
        ];
        let plan = plan_with_filter(&timeline, "sponsor");

        let output = splice(&source, plan.kept()).unwrap();
        let expected: u64 = plan
            .rebuilt()
            .iter()
            .map(|c| u64::from(c.end_ms() - c.start_ms()))
            .sum();
        assert_eq!(output.duration_ms(), expected);
        assert_eq!(output.duration_ms(), 7700);
    }

    #[test]
    fn test_callback_sees_each_chapter() {
        let source = ramp(300);
        let kept = vec![chapter("a", 0, 100), chapter("b", 200, 300)];
        let mut seen = Vec::new();

        splice_with(&source, &kept, |index, c| seen.push((index, c.id().to_string()))).unwrap();
        assert_eq!(seen, vec![(0, "a".to_string()), (1, "b".to_string())]);
    }
}
