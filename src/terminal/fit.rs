use std::time::{Duration, Instant};

use super::surface::Dimensions;

pub const MIN_COLS: u16 = 2;
pub const MIN_ROWS: u16 = 1;

/// Size of one character cell in container units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontMetrics {
    pub cell_width: u16,
    pub cell_height: u16,
}

impl FontMetrics {
    pub fn new(cell_width: u16, cell_height: u16) -> Self {
        Self {
            cell_width: cell_width.max(1),
            cell_height: cell_height.max(1),
        }
    }
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerSize {
    pub width: u32,
    pub height: u32,
}

impl ContainerSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

pub fn fit_dimensions(container: ContainerSize, metrics: FontMetrics) -> Dimensions {
    let cols = container.width / u32::from(metrics.cell_width.max(1));
    let rows = container.height / u32::from(metrics.cell_height.max(1));
    Dimensions::new(
        clamp_cells(rows).max(MIN_ROWS),
        clamp_cells(cols).max(MIN_COLS),
    )
}

fn clamp_cells(value: u32) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

/// Trailing-edge debounce for container resizes.
///
/// Every request restarts the settle timer; `poll` hands out the last
/// requested size once the container has been quiet for the settle delay,
/// and only when it differs from the size applied previously.
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    settle: Duration,
    pending: Option<(ContainerSize, Instant)>,
    applied: Option<ContainerSize>,
}

impl ResizeDebouncer {
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            pending: None,
            applied: None,
        }
    }

    pub fn request(&mut self, size: ContainerSize, now: Instant) {
        self.pending = Some((size, now));
    }

    pub fn poll(&mut self, now: Instant) -> Option<ContainerSize> {
        let (size, requested_at) = self.pending?;
        if now.saturating_duration_since(requested_at) < self.settle {
            return None;
        }
        self.pending = None;
        if self.applied == Some(size) {
            return None;
        }
        self.applied = Some(size);
        Some(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fit_divides_by_cell_metrics() {
        let dims = fit_dimensions(ContainerSize::new(160, 48), FontMetrics::new(2, 2));
        assert_eq!(dims, Dimensions::new(24, 80));
    }

    #[test]
    fn fit_never_goes_below_minimum() {
        let dims = fit_dimensions(ContainerSize::new(0, 0), FontMetrics::default());
        assert_eq!(dims, Dimensions::new(MIN_ROWS, MIN_COLS));
    }

    #[test]
    fn debouncer_waits_for_settle_and_keeps_last_request() {
        let start = Instant::now();
        let settle = Duration::from_millis(100);
        let mut debouncer = ResizeDebouncer::new(settle);
        debouncer.request(ContainerSize::new(80, 24), start);
        debouncer.request(ContainerSize::new(100, 30), start + Duration::from_millis(50));
        assert_eq!(debouncer.poll(start + Duration::from_millis(120)), None);
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(150)),
            Some(ContainerSize::new(100, 30))
        );
        assert_eq!(debouncer.poll(start + Duration::from_millis(400)), None);
    }

    #[test]
    fn debouncer_skips_unchanged_size() {
        let start = Instant::now();
        let mut debouncer = ResizeDebouncer::new(Duration::ZERO);
        debouncer.request(ContainerSize::new(80, 24), start);
        assert!(debouncer.poll(start).is_some());
        debouncer.request(ContainerSize::new(80, 24), start);
        assert_eq!(debouncer.poll(start), None);
    }
}
