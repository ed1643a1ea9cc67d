use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    Linear,
    Step,
    CubicSpline,
}

/// How far a cursor scans linearly before falling back to binary search.
const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the keyframe interval of the previous sample so that sampling a
/// steadily advancing time is O(1).
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// Keyframes of a single property.
///
/// For `CubicSpline`, `values` holds `[in_tangent, value, out_tangent]` per
/// keyframe, so it is three times as long as `times`.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    pub values: Vec<T>,
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Self {
        Self {
            times,
            values,
            interpolation,
        }
    }

    /// Whether `values` has the length the interpolation mode requires.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let expected = match self.interpolation {
            InterpolationMode::CubicSpline => self.times.len() * 3,
            _ => self.times.len(),
        };
        !self.times.is_empty() && self.values.len() == expected
    }

    /// Time of the last keyframe, 0 for an empty track.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Stateless sampling (binary search).
    #[must_use]
    pub fn sample(&self, time: f32) -> T {
        let mut cursor = KeyframeCursor::default();
        self.sample_with_cursor(time, &mut cursor)
    }

    /// Samples at `time`, starting the keyframe search at the cursor.
    ///
    /// Times before the first keyframe clamp to it, times past the last clamp
    /// to the last one.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> T {
        match self.times.len() {
            0 => return T::default(),
            1 => return self.value_at(0),
            _ => {}
        }

        let index = self.scan_from(cursor.last_index, time).unwrap_or_else(|| {
            let next = self.times.partition_point(|&t| t <= time);
            next.saturating_sub(1)
        });
        cursor.last_index = index;

        self.sample_at_frame(index, time)
    }

    /// Looks for the interval containing `time` within a few keyframes of
    /// `start`, forward or backward depending on direction.
    fn scan_from(&self, start: usize, time: f32) -> Option<usize> {
        let last = self.times.len() - 1;
        let start = start.min(last);

        if time >= self.times[start] {
            for idx in start..=(start + MAX_SCAN_OFFSET).min(last) {
                if idx == last || time < self.times[idx + 1] {
                    return Some(idx);
                }
            }
            None
        } else {
            (start.saturating_sub(MAX_SCAN_OFFSET)..start)
                .rev()
                .find(|&idx| time >= self.times[idx])
        }
    }

    fn value_at(&self, index: usize) -> T {
        match self.interpolation {
            InterpolationMode::CubicSpline => self.values[index * 3 + 1],
            _ => self.values[index],
        }
    }

    fn sample_at_frame(&self, index: usize, time: f32) -> T {
        let last = self.times.len() - 1;
        if index >= last {
            return self.value_at(last);
        }

        let next = index + 1;
        let t0 = self.times[index];
        let t1 = self.times[next];
        let dt = t1 - t0;
        let t = if dt > 1e-6 { ((time - t0) / dt).clamp(0.0, 1.0) } else { 0.0 };

        match self.interpolation {
            InterpolationMode::Step => self.value_at(index),
            InterpolationMode::Linear => T::interpolate_linear(self.value_at(index), self.value_at(next), t),
            InterpolationMode::CubicSpline => {
                let v0 = self.values[index * 3 + 1];
                let out_tangent0 = self.values[index * 3 + 2];
                let in_tangent1 = self.values[next * 3];
                let v1 = self.values[next * 3 + 1];
                T::interpolate_cubic(v0, out_tangent0, in_tangent1, v1, t, dt)
            }
        }
    }
}
