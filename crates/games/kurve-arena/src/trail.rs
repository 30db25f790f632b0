use serde::{Deserialize, Serialize};

/// A position in arena coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// One recorded trail entry. A gap means no line is drawn through this index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TrailEntry {
    Point(Point),
    Gap,
}

/// Run of trail entries, starting at `start_index`, drawn at `width`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailSegment {
    pub start_index: usize,
    pub width: f64,
}

/// Append-only trail with its width history.
///
/// Segments are ordered by non-decreasing `start_index`, the first one starts
/// at 0, and the last one always carries the owner's current line width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trail {
    entries: Vec<TrailEntry>,
    segments: Vec<TrailSegment>,
}

impl Trail {
    pub fn new(width: f64) -> Self {
        Self {
            entries: Vec::new(),
            segments: vec![TrailSegment {
                start_index: 0,
                width,
            }],
        }
    }

    pub fn entries(&self) -> &[TrailEntry] {
        &self.entries
    }

    pub fn segments(&self) -> &[TrailSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Width of the segment currently being drawn.
    pub fn current_width(&self) -> f64 {
        self.segments.last().map_or(0.0, |s| s.width)
    }

    /// The most recent entry, if it is a point.
    pub fn last_point(&self) -> Option<Point> {
        match self.entries.last() {
            Some(TrailEntry::Point(p)) => Some(*p),
            _ => None,
        }
    }

    pub fn push_point(&mut self, point: Point) {
        self.entries.push(TrailEntry::Point(point));
    }

    /// Break the line here; drawing resumes in a fresh segment.
    pub fn push_gap(&mut self, width: f64) {
        self.entries.push(TrailEntry::Gap);
        self.open_segment(self.entries.len(), width);
    }

    /// Continue the line at a new width. The last recorded point joins the
    /// new segment so the line stays connected.
    pub fn change_width(&mut self, width: f64) {
        self.open_segment(self.entries.len().saturating_sub(1), width);
    }

    /// Wipe every entry and the width history.
    pub fn clear(&mut self, width: f64) {
        self.entries.clear();
        self.segments.clear();
        self.segments.push(TrailSegment {
            start_index: 0,
            width,
        });
    }

    fn open_segment(&mut self, start: usize, width: f64) {
        let last_start = self.segments.last().map_or(0, |s| s.start_index);
        let start = start.max(last_start);
        match self.segments.last_mut() {
            Some(last) if last.start_index == start => last.width = width,
            _ => self.segments.push(TrailSegment {
                start_index: start,
                width,
            }),
        }
    }

    /// Walk the first `count` entries in order, yielding every point with
    /// the width it was drawn at. Gaps are skipped.
    pub fn points_with_width(&self, count: usize) -> impl Iterator<Item = (Point, f64)> + '_ {
        let count = count.min(self.entries.len());
        let mut seg = 0;
        self.entries[..count]
            .iter()
            .enumerate()
            .filter_map(move |(i, entry)| {
                while seg + 1 < self.segments.len() && self.segments[seg + 1].start_index <= i {
                    seg += 1;
                }
                match entry {
                    TrailEntry::Point(p) => Some((*p, self.segments[seg].width)),
                    TrailEntry::Gap => None,
                }
            })
    }

    /// Width in effect at `index`.
    pub fn width_at(&self, index: usize) -> f64 {
        self.segments
            .iter()
            .take_while(|s| s.start_index <= index)
            .last()
            .map_or(self.current_width(), |s| s.width)
    }
}
