use super::FULL_TURN;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleSpan {
    pub start: f64,
    pub end: f64,
}

impl AngleSpan {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn mid(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        (self.end - self.start).abs()
    }

    pub fn normalized_width(&self) -> f64 {
        self.width() / FULL_TURN
    }

    pub fn wraps(&self) -> bool {
        self.start > self.end
    }
}

/// Splits a full turn into `count` equal spans starting east and proceeding clockwise.
///
/// Bounds are computed by multiplication rather than accumulation so neighbouring spans share
/// bit-identical edges, and the final span is pinned to exactly a full turn.
pub fn partition(count: usize) -> Vec<AngleSpan> {
    let n = count as f64;
    (0..count)
        .map(|i| {
            let start = FULL_TURN * i as f64 / n;
            let end = if i + 1 == count {
                FULL_TURN
            } else {
                FULL_TURN * (i + 1) as f64 / n
            };
            AngleSpan::new(start, end)
        })
        .collect()
}
