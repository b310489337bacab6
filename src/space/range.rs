//! Stepped numeric range.

/// An inclusive numeric range walked from `min` towards `max` by `step`.
///
/// The number of grid points is `floor((max - min) / step) + 1`; the last
/// point may fall short of `max` when the width is not a multiple of
/// `step`.
///
/// # Examples
///
/// ```
/// use u_tuner::space::Range;
///
/// let r = Range::new(-10.0, 10.0, 0.5);
/// assert_eq!(r.steps(), Some(41));
/// assert_eq!(r.value_at(1), -9.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Range {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Number of grid points, or `None` if the range is malformed.
    pub fn steps(&self) -> Option<u64> {
        self.checked_steps().ok()
    }

    /// Grid point `index`, never beyond `max`.
    pub fn value_at(&self, index: u64) -> f64 {
        (self.min + index as f64 * self.step).min(self.max)
    }

    /// Iterator over every grid point, `min` first.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.steps().unwrap_or(0)).map(move |i| self.value_at(i))
    }

    /// Width of the range.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Step count, or a description of why the range is unusable.
    pub(crate) fn checked_steps(&self) -> Result<u64, String> {
        if !(self.min.is_finite() && self.max.is_finite() && self.step.is_finite()) {
            return Err(format!(
                "bounds and step must be finite (min={}, max={}, step={})",
                self.min, self.max, self.step
            ));
        }
        if self.step <= 0.0 {
            return Err(format!("step must be positive, got {}", self.step));
        }
        if self.min > self.max {
            return Err(format!(
                "min ({}) must not exceed max ({})",
                self.min, self.max
            ));
        }
        let steps = ((self.max - self.min) / self.step).floor() + 1.0;
        if steps <= 0.0 {
            return Err(format!("range yields {steps} steps"));
        }
        if steps > super::MAX_SAFE_INTEGER as f64 {
            return Err(format!("range yields {steps} steps, beyond integer precision"));
        }
        Ok(steps as u64)
    }
}
