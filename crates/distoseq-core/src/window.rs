//! Chain sub-sampling used for augmentation.
//!
//! In training mode every call draws a fresh contiguous window; in evaluation
//! mode the window is fixed so test losses are comparable between epochs. The
//! caller supplies the random source, which keeps windows reproducible and lets
//! parallel workers each own an independent generator.
use crate::config::SizeConfig;
use rand::Rng;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Train,
    Eval,
}

/// Half-open residue window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: usize,
    pub end: usize,
}

impl Window {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Slice a sequence with this window. Residues are ASCII so byte offsets
    /// and residue offsets agree; non-ASCII input falls back to char slicing.
    pub fn slice_sequence<'a>(&self, sequence: &'a str) -> std::borrow::Cow<'a, str> {
        if sequence.is_ascii() {
            std::borrow::Cow::Borrowed(&sequence[self.start..self.end])
        } else {
            std::borrow::Cow::Owned(
                sequence
                    .chars()
                    .skip(self.start)
                    .take(self.len())
                    .collect(),
            )
        }
    }
}

/// Choose the residue window for one example of a sequence of `seq_len` residues.
pub fn select_window<R: Rng + ?Sized>(
    seq_len: usize,
    mode: Mode,
    sizes: &SizeConfig,
    rng: &mut R,
) -> Window {
    match mode {
        Mode::Eval => Window {
            start: 0,
            end: seq_len.min(sizes.max_training_size),
        },
        Mode::Train => {
            let length = rng
                .gen_range(sizes.min_size..=sizes.max_size)
                .min(sizes.max_training_size);
            let start = rng.gen_range(0..=seq_len.saturating_sub(length));
            Window {
                start,
                end: (start + length).min(seq_len),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sizes(min_size: usize, max_size: usize, max_training_size: usize) -> SizeConfig {
        SizeConfig {
            min_size,
            max_size,
            max_training_size,
        }
    }

    #[test]
    fn test_eval_window_is_fixed() {
        let sizes = sizes(10, 250, 64);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            select_window(200, Mode::Eval, &sizes, &mut rng),
            Window { start: 0, end: 64 }
        );
        assert_eq!(
            select_window(30, Mode::Eval, &sizes, &mut rng),
            Window { start: 0, end: 30 }
        );
    }

    #[test]
    fn test_train_window_lower_bounds() {
        // an all-zero generator always draws the low end of each range
        let mut rng = StepRng::new(0, 0);
        let window = select_window(100, Mode::Train, &sizes(10, 250, 250), &mut rng);
        assert_eq!(window, Window { start: 0, end: 10 });
    }

    #[test]
    fn test_train_window_is_clipped_to_sequence() {
        let mut rng = StepRng::new(0, 0);
        let window = select_window(6, Mode::Train, &sizes(10, 250, 250), &mut rng);
        assert_eq!(window, Window { start: 0, end: 6 });
    }

    #[test]
    fn test_train_window_bounds_hold() {
        let sizes = sizes(10, 40, 32);
        let mut rng = StdRng::seed_from_u64(42);
        for seq_len in [5usize, 10, 33, 120] {
            for _ in 0..200 {
                let window = select_window(seq_len, Mode::Train, &sizes, &mut rng);
                assert!(window.end <= seq_len);
                assert!(window.len() <= 32);
                assert!(window.len() >= sizes.min_size.min(seq_len));
            }
        }
    }

    #[test]
    fn test_seeded_windows_repeat() {
        let sizes = SizeConfig::default();
        let draw = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..10)
                .map(|_| select_window(400, Mode::Train, &sizes, &mut rng))
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(7), draw(7));
    }

    #[test]
    fn test_slice_sequence() {
        let window = Window { start: 1, end: 3 };
        assert_eq!(window.slice_sequence("ACDE"), "CD");
    }
}
