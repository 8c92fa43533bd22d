//! Debounced segmentation of a per-frame binary prediction stream.
//!
//! A frame classifier decides for every frame whether the interpreter
//! is signing in the target language. Single frames are often
//! misclassified, so a change of the prediction is only accepted after
//! it persisted for a number of consecutive frames (the tolerance).

/// Smooths a stream of binary predictions.
#[derive(Debug, Clone)]
pub(crate) struct Debouncer {
    tolerance: f64,
    stable: bool,
    pending: usize,
}

impl Debouncer {
    /// Creates a new debouncer. A changed prediction is accepted once
    /// `tolerance` consecutive frames disagree with the stable label.
    pub(crate) fn new(tolerance: f64, start: bool) -> Self {
        Self {
            tolerance,
            stable: start,
            pending: 0,
        }
    }

    /// Creates a debouncer with a tolerance given in seconds.
    pub(crate) fn with_seconds(seconds: f64, fps: f64, start: bool) -> Self {
        Self::new(seconds * fps, start)
    }

    #[inline]
    pub(crate) fn stable(&self) -> bool {
        self.stable
    }

    /// Feeds the next raw prediction and returns the stable label.
    pub(crate) fn push(&mut self, prediction: bool) -> bool {
        if prediction == self.stable {
            self.pending = 0;
            return self.stable;
        }

        self.pending += 1;
        if (self.pending as f64) >= self.tolerance {
            self.pending = 0;
            self.stable = prediction;
        }

        self.stable
    }
}

/// A closed range of frames with a positive stable label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Segment {
    pub(crate) start_frame: u64,
    pub(crate) end_frame: u64,
}

impl Segment {
    /// Returns the start and end of the segment in whole seconds.
    pub(crate) fn seconds(&self, fps: f64) -> (u64, u64) {
        let to_secs = |frame: u64| (frame as f64 / fps).floor() as u64;
        (to_secs(self.start_frame), to_secs(self.end_frame))
    }
}

/// Tracks segment boundaries of the stable label stream.
#[derive(Debug)]
pub(crate) struct Segmenter {
    debouncer: Debouncer,
    segments: Vec<Segment>,
    open: Option<u64>,
    last: Option<u64>,
}

impl Segmenter {
    pub(crate) fn new(debouncer: Debouncer) -> Self {
        Self {
            debouncer,
            segments: vec![],
            open: None,
            last: None,
        }
    }

    /// Processes the raw prediction of `frame`. Frames must be passed
    /// in ascending order.
    ///
    /// A segment opens on a false to true transition of the stable
    /// label. If the debouncer starts with a true label, the stream is
    /// treated as already signing and a segment opens at the first
    /// frame. It is discarded, if the label drops at that very frame.
    pub(crate) fn push(&mut self, frame: u64, prediction: bool) {
        let previous = match self.last {
            Some(_) => self.debouncer.stable(),
            None => {
                if self.debouncer.stable() {
                    self.open = Some(frame);
                }

                self.debouncer.stable()
            }
        };

        let current = self.debouncer.push(prediction);

        match (previous, current) {
            (false, true) => self.open = Some(frame),
            (true, false) => {
                if let (Some(start), Some(last)) = (self.open.take(), self.last)
                {
                    self.segments.push(Segment {
                        start_frame: start,
                        end_frame: last,
                    });
                }
            }
            _ => {}
        }

        self.last = Some(frame);
    }

    /// Closes an open segment at the last frame and returns all
    /// segments.
    pub(crate) fn finish(mut self) -> Vec<Segment> {
        if let (Some(start), Some(last)) = (self.open.take(), self.last) {
            self.segments.push(Segment {
                start_frame: start,
                end_frame: last,
            });
        }

        self.segments
    }
}

/// Segments a stream of `(frame, prediction)` pairs.
pub(crate) fn segments<I>(predictions: I, debouncer: Debouncer) -> Vec<Segment>
where
    I: IntoIterator<Item = (u64, bool)>,
{
    let mut segmenter = Segmenter::new(debouncer);
    for (frame, prediction) in predictions {
        segmenter.push(frame, prediction);
    }

    segmenter.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(pattern: &str) -> Vec<(u64, bool)> {
        pattern
            .chars()
            .enumerate()
            .map(|(idx, c)| (idx as u64, c == '1'))
            .collect()
    }

    #[test]
    fn debouncer_ignores_short_flips() {
        let mut debouncer = Debouncer::new(3.0, false);
        let out: Vec<bool> = [true, true, false, true, true, true, true]
            .into_iter()
            .map(|p| debouncer.push(p))
            .collect();

        assert_eq!(out, vec![false, false, false, false, false, true, true]);
    }

    #[test]
    fn debouncer_with_seconds() {
        // 2.5 frames
        let mut debouncer = Debouncer::with_seconds(0.1, 25.0, true);
        assert!(debouncer.push(false));
        assert!(debouncer.push(false));
        assert!(!debouncer.push(false));
    }

    #[test]
    fn segments_simple() {
        let segments =
            segments(frames("0001111111000000111"), Debouncer::new(1.0, false));

        assert_eq!(
            segments,
            vec![
                Segment {
                    start_frame: 3,
                    end_frame: 9
                },
                Segment {
                    start_frame: 16,
                    end_frame: 18
                },
            ]
        );
    }

    #[test]
    fn segments_debounced() {
        let segments = segments(
            frames("00100111111101111000000"),
            Debouncer::new(3.0, false),
        );

        assert_eq!(
            segments,
            vec![Segment {
                start_frame: 7,
                end_frame: 18
            }]
        );
    }

    #[test]
    fn segments_start_positive() {
        let segments =
            segments(frames("1111000"), Debouncer::new(2.0, true));

        assert_eq!(
            segments,
            vec![Segment {
                start_frame: 0,
                end_frame: 4
            }]
        );
    }

    #[test]
    fn segments_start_positive_dropped_at_first_frame() {
        let segments =
            segments(frames("0001100"), Debouncer::new(1.0, true));

        assert_eq!(
            segments,
            vec![Segment {
                start_frame: 3,
                end_frame: 4
            }]
        );
    }

    #[test]
    fn segments_with_frame_offset() {
        let predictions = (100..110).map(|frame| (frame, frame >= 104));
        let segments = segments(predictions, Debouncer::new(1.0, false));

        assert_eq!(
            segments,
            vec![Segment {
                start_frame: 104,
                end_frame: 109
            }]
        );
    }

    #[test]
    fn segments_empty_stream() {
        assert!(segments(vec![], Debouncer::new(1.0, true)).is_empty());
    }

    #[test]
    fn segment_seconds() {
        let segment = Segment {
            start_frame: 50,
            end_frame: 124,
        };

        assert_eq!(segment.seconds(25.0), (2, 4));
    }
}
