//! Obstacle stream
//!
//! Pipes scroll right-to-left at a speed derived from the screen width, so a
//! pipe always takes the same wall-clock time to cross. Spawning is paced so
//! that consecutive pipes are exactly `PIPE_SPACING` pixels apart no matter
//! how wide the screen is.

use rand::Rng;

use crate::consts::*;
use crate::{Rect, Viewport};

/// A pipe pair: a top column down to `top`, a gap of `gap`, then a bottom column
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    /// Left edge
    pub x: f32,
    /// Height of the top column (gap starts here)
    pub top: f32,
    /// Vertical opening
    pub gap: f32,
    /// Set once the drone has flown past this pipe
    pub scored: bool,
}

impl Pipe {
    pub fn new(x: f32, top: f32, gap: f32) -> Self {
        Self {
            x,
            top,
            gap,
            scored: false,
        }
    }

    /// Trailing (right) edge
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + PIPE_WIDTH
    }

    /// Lower boundary of the gap
    #[inline]
    pub fn gap_bottom(&self) -> f32 {
        self.top + self.gap
    }

    pub fn top_rect(&self) -> Rect {
        Rect::new(self.x, 0.0, PIPE_WIDTH, self.top)
    }

    pub fn bottom_rect(&self, screen_height: f32) -> Rect {
        let y = self.gap_bottom();
        Rect::new(self.x, y, PIPE_WIDTH, (screen_height - y).max(0.0))
    }

    /// Scrolled fully past the left edge
    #[inline]
    pub fn is_off_screen(&self) -> bool {
        self.right() < 0.0
    }
}

/// Gap size `elapsed_ms` after session start.
///
/// Shrinks linearly from `BASE_GAP * INITIAL_GAP_MULTIPLIER` to `BASE_GAP`
/// over `GAP_RAMP_MS`, then stays at `BASE_GAP`.
pub fn gap_size(elapsed_ms: f64) -> f32 {
    let progress = (elapsed_ms.max(0.0) / GAP_RAMP_MS).min(1.0) as f32;
    BASE_GAP * INITIAL_GAP_MULTIPLIER - BASE_GAP * (INITIAL_GAP_MULTIPLIER - 1.0) * progress
}

/// Ordered pipes (spawn order == left-to-right) plus spawn pacing
#[derive(Debug, Clone)]
pub struct PipeStream {
    pipes: Vec<Pipe>,
    /// Scroll speed (px/ms)
    speed: f32,
    /// Time between spawns at the current speed
    spawn_interval_ms: f32,
    /// Time accumulated toward the next spawn
    since_spawn_ms: f32,
}

impl PipeStream {
    pub fn new(viewport: Viewport) -> Self {
        let mut stream = Self {
            pipes: Vec::new(),
            speed: 0.0,
            spawn_interval_ms: f32::INFINITY,
            since_spawn_ms: 0.0,
        };
        stream.resize(viewport.width);
        stream
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub fn pipes_mut(&mut self) -> &mut [Pipe] {
        &mut self.pipes
    }

    pub fn len(&self) -> usize {
        self.pipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipes.is_empty()
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn spawn_interval_ms(&self) -> f32 {
        self.spawn_interval_ms
    }

    /// Append an already-built pipe (it must lie right of the current last one)
    pub fn push(&mut self, pipe: Pipe) {
        self.pipes.push(pipe);
    }

    pub fn clear(&mut self) {
        self.pipes.clear();
        self.since_spawn_ms = 0.0;
    }

    /// Recompute speed and spawn interval for a new screen width.
    ///
    /// Spawn pacing is re-anchored on the last pipe, measured from the new
    /// right edge, so the next pipe still lands `PIPE_SPACING` behind it.
    /// With no pipe on the board the distance already covered is kept.
    pub fn resize(&mut self, width: f32) {
        let covered_px = match self.pipes.last() {
            Some(last) => width - last.x,
            None => self.since_spawn_ms * self.speed,
        };
        self.speed = width.max(1.0) / PIPE_CROSS_TIME_MS;
        self.spawn_interval_ms = PIPE_SPACING / self.speed;
        self.since_spawn_ms = covered_px / self.speed;
    }

    /// Append a pipe at `x` with a random gap position that keeps the gap
    /// at least `PIPE_MARGIN` away from both screen edges.
    pub fn spawn<R: Rng>(&mut self, x: f32, gap: f32, screen_height: f32, rng: &mut R) {
        let range = (screen_height - gap - 2.0 * PIPE_MARGIN).max(0.0);
        let top = PIPE_MARGIN + rng.random::<f32>() * range;
        self.pipes.push(Pipe::new(x, top, gap));
    }

    /// Scroll every pipe left by `delta_ms * speed`
    pub fn advance(&mut self, delta_ms: f32) {
        let dx = delta_ms * self.speed;
        for pipe in &mut self.pipes {
            pipe.x -= dx;
        }
    }

    /// Advance, then spawn at the right edge whenever a spawn interval has
    /// elapsed. A spawn that became due partway through the tick is placed
    /// as if it had been scrolling since then.
    pub fn update<R: Rng>(&mut self, delta_ms: f32, viewport: Viewport, gap: f32, rng: &mut R) {
        self.advance(delta_ms);

        self.since_spawn_ms += delta_ms;
        while self.since_spawn_ms >= self.spawn_interval_ms {
            self.since_spawn_ms -= self.spawn_interval_ms;
            let x = viewport.width - self.since_spawn_ms * self.speed;
            self.spawn(x, gap, viewport.height, rng);
        }
    }

    /// Drop pipes that have scrolled fully off the left edge
    pub fn prune(&mut self) {
        self.pipes.retain(|p| !p.is_off_screen());
    }

    /// Fill the screen right of the drone with pipes at fixed spacing.
    ///
    /// The first pipe sits at `min(entity_x + BACKFILL_LEAD, width)`, so a new
    /// life never starts with a long empty glide. Spawn pacing is aligned so
    /// the next regular spawn keeps the spacing.
    pub fn backfill<R: Rng>(&mut self, entity_x: f32, viewport: Viewport, gap: f32, rng: &mut R) {
        let start = (entity_x + BACKFILL_LEAD).min(viewport.width);
        let mut x = start;
        while x < viewport.width {
            self.spawn(x, gap, viewport.height, rng);
            x += PIPE_SPACING;
        }

        let last_x = self
            .pipes
            .last()
            .map(|p| p.x)
            .unwrap_or(start - PIPE_SPACING);
        self.since_spawn_ms = (viewport.width - last_x) / self.speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const VIEW: Viewport = Viewport::new(1000.0, 600.0);

    #[test]
    fn test_gap_ramp_endpoints() {
        assert_eq!(gap_size(0.0), 280.0);
        assert_eq!(gap_size(30_000.0), 210.0);
        assert_eq!(gap_size(60_000.0), BASE_GAP);
        assert_eq!(gap_size(600_000.0), BASE_GAP);
    }

    #[test]
    fn test_speed_derived_from_width() {
        let stream = PipeStream::new(VIEW);
        assert!((stream.speed() - 0.2).abs() < 1e-6);
        assert!((stream.spawn_interval_ms() - 3000.0).abs() < 1e-3);

        let narrow = PipeStream::new(Viewport::new(400.0, 600.0));
        // Narrow screens scroll slower, so spawns are further apart in time
        assert!(narrow.spawn_interval_ms() > stream.spawn_interval_ms());
    }

    #[test]
    fn test_spawn_respects_margins() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut stream = PipeStream::new(VIEW);
        for _ in 0..500 {
            stream.spawn(0.0, 200.0, VIEW.height, &mut rng);
        }
        for pipe in stream.pipes() {
            assert!(pipe.top >= PIPE_MARGIN);
            assert!(pipe.gap_bottom() <= VIEW.height - PIPE_MARGIN);
            assert!(!pipe.scored);
        }
    }

    #[test]
    fn test_spawn_on_tiny_screen_pins_to_margin() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut stream = PipeStream::new(Viewport::new(300.0, 200.0));
        stream.spawn(0.0, 280.0, 200.0, &mut rng);
        assert_eq!(stream.pipes()[0].top, PIPE_MARGIN);
    }

    #[test]
    fn test_spawn_is_deterministic_for_seed() {
        let mut a = PipeStream::new(VIEW);
        let mut b = PipeStream::new(VIEW);
        let mut rng_a = Pcg32::seed_from_u64(42);
        let mut rng_b = Pcg32::seed_from_u64(42);
        a.backfill(250.0, VIEW, 280.0, &mut rng_a);
        b.backfill(250.0, VIEW, 280.0, &mut rng_b);
        assert_eq!(a.pipes(), b.pipes());
    }

    #[test]
    fn test_backfill_starts_near_drone() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut stream = PipeStream::new(Viewport::new(2000.0, 600.0));
        stream.backfill(500.0, Viewport::new(2000.0, 600.0), 280.0, &mut rng);
        let xs: Vec<f32> = stream.pipes().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![900.0, 1500.0]);
    }

    #[test]
    fn test_backfill_narrow_screen_spawns_nothing() {
        let mut rng = Pcg32::seed_from_u64(1);
        let view = Viewport::new(400.0, 600.0);
        let mut stream = PipeStream::new(view);
        stream.backfill(100.0, view, 280.0, &mut rng);
        assert!(stream.is_empty());

        // The first regular spawn follows right away at the edge
        stream.update(16.0, view, 280.0, &mut rng);
        assert_eq!(stream.len(), 1);
        assert!((stream.pipes()[0].x - (400.0 - 16.0 * stream.speed())).abs() < 1e-3);
    }

    #[test]
    fn test_next_spawn_after_backfill_keeps_spacing() {
        let mut rng = Pcg32::seed_from_u64(3);
        let view = Viewport::new(2000.0, 600.0);
        let mut stream = PipeStream::new(view);
        stream.backfill(500.0, view, 280.0, &mut rng);
        assert_eq!(stream.len(), 2);

        for _ in 0..400 {
            stream.update(16.0, view, 280.0, &mut rng);
        }
        assert!(stream.len() > 2);
        for pair in stream.pipes().windows(2) {
            assert!((pair[1].x - pair[0].x - PIPE_SPACING).abs() < 0.1);
        }
    }

    #[test]
    fn test_prune_keeps_order() {
        let mut stream = PipeStream::new(VIEW);
        stream.pipes = vec![
            Pipe::new(-61.0, 100.0, 140.0),
            Pipe::new(-59.0, 110.0, 140.0),
            Pipe::new(541.0, 120.0, 140.0),
        ];
        stream.prune();
        let tops: Vec<f32> = stream.pipes().iter().map(|p| p.top).collect();
        assert_eq!(tops, vec![110.0, 120.0]);
    }

    /// Run `before` updates at `from`, resize to `to`, run `after` more
    fn spacing_across_resize(from: f32, to: f32, before: usize, after: usize) -> Vec<f32> {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut view = Viewport::new(from, 600.0);
        let mut stream = PipeStream::new(view);
        stream.backfill(from * DRONE_COLUMN, view, 280.0, &mut rng);
        for _ in 0..before {
            stream.update(16.0, view, 280.0, &mut rng);
        }
        view = Viewport::new(to, 600.0);
        stream.resize(view.width);
        for _ in 0..after {
            stream.update(16.0, view, 280.0, &mut rng);
        }
        stream
            .pipes()
            .windows(2)
            .map(|pair| pair[1].x - pair[0].x)
            .collect()
    }

    #[test]
    fn test_resize_preserves_spacing() {
        let gaps = spacing_across_resize(1000.0, 1400.0, 100, 300);
        assert!(gaps.len() >= 2);
        for gap in gaps {
            assert!((gap - PIPE_SPACING).abs() < 0.1, "gap {}", gap);
        }
    }

    #[test]
    fn test_widening_mid_run_keeps_spacing() {
        let gaps = spacing_across_resize(1000.0, 1400.0, 250, 400);
        assert!(gaps.len() >= 3);
        for gap in gaps {
            assert!((gap - PIPE_SPACING).abs() < 0.1, "gap {}", gap);
        }
    }

    #[test]
    fn test_narrowing_mid_run_keeps_spacing() {
        let gaps = spacing_across_resize(1600.0, 900.0, 120, 500);
        assert!(gaps.len() >= 3);
        for gap in gaps {
            assert!((gap - PIPE_SPACING).abs() < 0.1, "gap {}", gap);
        }
    }

    #[test]
    fn test_pipe_rects() {
        let pipe = Pipe::new(10.0, 100.0, 140.0);
        assert_eq!(pipe.top_rect(), Rect::new(10.0, 0.0, PIPE_WIDTH, 100.0));
        assert_eq!(pipe.bottom_rect(600.0), Rect::new(10.0, 240.0, PIPE_WIDTH, 360.0));
    }

    proptest! {
        #[test]
        fn prop_gap_never_grows(t1 in 0.0f64..120_000.0, dt in 0.0f64..120_000.0) {
            let t2 = t1 + dt;
            prop_assert!(gap_size(t1) >= gap_size(t2));
            prop_assert!(gap_size(t2) >= BASE_GAP);
        }

        #[test]
        fn prop_spacing_constant(
            seed in any::<u64>(),
            width in 300.0f32..2500.0,
            deltas in proptest::collection::vec(1.0f32..60.0, 50..400),
        ) {
            let view = Viewport::new(width, 700.0);
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut stream = PipeStream::new(view);
            stream.backfill(width * DRONE_COLUMN, view, 280.0, &mut rng);
            for delta in deltas {
                stream.update(delta, view, 280.0, &mut rng);
                stream.prune();
            }
            for pair in stream.pipes().windows(2) {
                prop_assert!((pair[1].x - pair[0].x - PIPE_SPACING).abs() < 0.5);
            }
        }
    }
}
