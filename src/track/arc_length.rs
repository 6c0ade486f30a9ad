use crate::sim::{Float3, EPSILON};

/// Location inside the arc-length table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    pub index: usize,
    /// Fraction of the way from sample `index` to the next sample, in [0, 1].
    pub t: f32,
}

/// Direction in which [`ArcLengthTable::locate`] walks from its hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDirection {
    Forward,
    Backward,
}

impl ScanDirection {
    pub fn of_delta(delta: f32) -> Self {
        if delta >= 0.0 {
            ScanDirection::Forward
        } else {
            ScanDirection::Backward
        }
    }
}

/// Cumulative length index over a closed polyline.
///
/// `cumulative[i]` is the distance traveled from sample 0 to the end of
/// segment `i` (sample `i` to sample `i + 1`), so the last entry is the full
/// loop length. Bucket `i` spans `[cumulative[i - 1], cumulative[i]]` with
/// `cumulative[-1] = 0`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArcLengthTable {
    lengths: Vec<f32>,
    cumulative: Vec<f32>,
}

impl ArcLengthTable {
    /// Builds the table from the cyclic segment directions of a sample set.
    pub fn new(directions: &[Float3]) -> Self {
        let lengths: Vec<f32> = directions.iter().map(|d| d.magnitude()).collect();
        let mut cumulative = Vec::with_capacity(lengths.len());
        let mut total = 0.0;
        for &len in &lengths {
            total += len;
            cumulative.push(total);
        }
        Self {
            lengths,
            cumulative,
        }
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    pub fn total_length(&self) -> f32 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    pub fn cumulative(&self) -> &[f32] {
        &self.cumulative
    }

    pub fn segment_length(&self, index: usize) -> f32 {
        self.lengths.get(index).copied().unwrap_or(0.0)
    }

    /// `(start, end)` distances of a bucket.
    pub fn bounds(&self, index: usize) -> (f32, f32) {
        let start = if index == 0 {
            0.0
        } else {
            self.cumulative[index - 1]
        };
        (start, self.cumulative[index])
    }

    fn contains(&self, index: usize, value: f32) -> bool {
        let (start, end) = self.bounds(index);
        start <= value && value <= end
    }

    /// Folds any distance into `[0, total_length)`.
    ///
    /// Negative values are lifted by whole loops before the remainder is
    /// taken. Returns `None` for an empty or zero-length table or a
    /// non-finite value.
    pub fn wrap(&self, value: f32) -> Option<f32> {
        let total = self.total_length();
        if total.is_nan() || total <= 0.0 || !value.is_finite() {
            return None;
        }
        let mut v = value;
        if v < 0.0 {
            // whole loops first so very negative inputs do not spin
            v += (-v / total).ceil() * total;
            while v < 0.0 {
                v += total;
            }
        }
        Some(v % total)
    }

    /// Fraction of `value` inside `index`, clamped to [0, 1]. Zero-length
    /// buckets divide by [`EPSILON`] instead of zero.
    pub fn fraction(&self, index: usize, value: f32) -> f32 {
        let (start, end) = self.bounds(index);
        ((value - start) / (end - start).max(EPSILON)).clamp(0.0, 1.0)
    }

    /// Finds the bucket containing `value` by walking one bucket at a time
    /// from `hint` in `direction`, wrapping around the loop.
    ///
    /// Riders rarely cross more than a bucket per tick, so this is usually
    /// one or two comparisons. `value` must already be wrapped.
    pub fn locate(&self, value: f32, hint: usize, direction: ScanDirection) -> Option<Bucket> {
        let n = self.len();
        if n == 0 || !value.is_finite() {
            return None;
        }

        let mut index = hint % n;
        for _ in 0..n {
            if self.contains(index, value) {
                return Some(Bucket {
                    index,
                    t: self.fraction(index, value),
                });
            }
            index = match direction {
                ScanDirection::Forward => (index + 1) % n,
                ScanDirection::Backward => (index + n - 1) % n,
            };
        }
        None
    }

    /// Full forward scan from bucket 0.
    pub fn locate_from_start(&self, value: f32) -> Option<Bucket> {
        self.locate(value, 0, ScanDirection::Forward)
    }
}
