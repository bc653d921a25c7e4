//! Sentence segmentation capability
//!
//! The semantic enhancer only needs sentences with their byte offsets. When no
//! segmenter is available the enhancer contributes nothing and the pipeline
//! runs on pattern matches alone.

/// A sentence and its byte offset within the segmented text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentence<'a> {
    pub offset: usize,
    pub text: &'a str,
}

pub trait SentenceSegmenter: Send + Sync {
    fn segment<'a>(&self, text: &'a str) -> Vec<Sentence<'a>>;

    /// False when this segmenter cannot produce sentences at all
    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str;
}

/// Stand-in used when sentence segmentation is disabled or unavailable
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSegmenter;

impl SentenceSegmenter for NoopSegmenter {
    fn segment<'a>(&self, _text: &'a str) -> Vec<Sentence<'a>> {
        Vec::new()
    }

    fn is_available(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "noop"
    }
}

/// UAX #29 sentence boundaries
#[cfg(feature = "sentence-segmentation")]
#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodeSentenceSegmenter;

#[cfg(feature = "sentence-segmentation")]
impl SentenceSegmenter for UnicodeSentenceSegmenter {
    fn segment<'a>(&self, text: &'a str) -> Vec<Sentence<'a>> {
        use unicode_segmentation::UnicodeSegmentation;

        text.split_sentence_bound_indices()
            .map(|(offset, text)| Sentence { offset, text })
            .collect()
    }

    fn name(&self) -> &str {
        "unicode"
    }
}

/// Best segmenter compiled into this build
pub fn default_segmenter() -> Box<dyn SentenceSegmenter> {
    #[cfg(feature = "sentence-segmentation")]
    {
        Box::new(UnicodeSentenceSegmenter)
    }
    #[cfg(not(feature = "sentence-segmentation"))]
    {
        Box::new(NoopSegmenter)
    }
}
