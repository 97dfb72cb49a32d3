/// One WPM sample, `t` in seconds of active play
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesPoint {
    pub t: f64,
    pub wpm: f64,
}

impl TimeSeriesPoint {
    pub fn new(t: f64, wpm: f64) -> Self {
        Self { t, wpm }
    }
}

impl From<TimeSeriesPoint> for (f64, f64) {
    fn from(p: TimeSeriesPoint) -> Self {
        (p.t, p.wpm)
    }
}

/// Appends a sample whenever `t` crosses into a new whole second.
/// Returns true if a sample was recorded.
pub fn record_per_second(coords: &mut Vec<TimeSeriesPoint>, t: f64, wpm: f64) -> bool {
    let second = t.floor();
    if second < 1.0 {
        return false;
    }
    match coords.last() {
        Some(last) if last.t >= second => false,
        _ => {
            coords.push(TimeSeriesPoint::new(second, wpm));
            true
        }
    }
}

/// Points as the `(x, y)` tuples the chart widget wants
pub fn as_chart_data(coords: &[TimeSeriesPoint]) -> Vec<(f64, f64)> {
    coords.iter().copied().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_once_per_second() {
        let mut coords = Vec::new();
        assert!(!record_per_second(&mut coords, 0.5, 0.0));
        assert!(record_per_second(&mut coords, 1.01, 30.0));
        assert!(!record_per_second(&mut coords, 1.5, 40.0));
        assert!(record_per_second(&mut coords, 2.0, 45.0));
        assert_eq!(coords, vec![TimeSeriesPoint::new(1.0, 30.0), TimeSeriesPoint::new(2.0, 45.0)]);
        assert_eq!(as_chart_data(&coords), vec![(1.0, 30.0), (2.0, 45.0)]);
    }
}
