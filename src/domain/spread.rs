//! Time-indexed spread series.

use chrono::NaiveDateTime;

/// One observation of a curve spread (e.g. 2s10s), quoted in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// A spread series sorted ascending by timestamp.
#[derive(Debug, Clone, Default)]
pub struct SpreadSeries {
    name: String,
    points: Vec<SpreadPoint>,
}

impl SpreadSeries {
    /// Builds a series, sorting the points by timestamp. The sort is stable so
    /// duplicate timestamps keep their input order.
    pub fn new(name: impl Into<String>, mut points: Vec<SpreadPoint>) -> Self {
        points.sort_by_key(|p| p.timestamp);
        Self {
            name: name.into(),
            points,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[SpreadPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&SpreadPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&SpreadPoint> {
        self.points.last()
    }

    /// Inclusive label slice `[start, end]`.
    ///
    /// Empty when `start > end` or when no observation falls in the range.
    pub fn slice(&self, start: NaiveDateTime, end: NaiveDateTime) -> &[SpreadPoint] {
        let lo = self.points.partition_point(|p| p.timestamp < start);
        let hi = self.points.partition_point(|p| p.timestamp <= end);
        if hi <= lo {
            return &[];
        }
        &self.points[lo..hi]
    }
}
