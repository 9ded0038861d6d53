/// Call counting for the render and physics hot paths.
/// Counters only move when the `profiling` feature is enabled.
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters, one per instrumented event
pub struct FunctionCounters {
    // Render pipeline
    pub render_mesh_calls: AtomicU64,
    pub triangles_submitted: AtomicU64,
    pub triangles_clipped_away: AtomicU64,
    pub triangles_culled: AtomicU64,

    // Rasterization
    pub pixels_tested: AtomicU64,
    pub depth_passed: AtomicU64,
    pub depth_failed: AtomicU64,
    pub transparent_texels_skipped: AtomicU64,

    // Physics
    pub physics_substeps: AtomicU64,
    pub collision_candidates: AtomicU64,
    pub contacts_resolved: AtomicU64,
}

impl FunctionCounters {
    pub const fn new() -> Self {
        Self {
            render_mesh_calls: AtomicU64::new(0),
            triangles_submitted: AtomicU64::new(0),
            triangles_clipped_away: AtomicU64::new(0),
            triangles_culled: AtomicU64::new(0),
            pixels_tested: AtomicU64::new(0),
            depth_passed: AtomicU64::new(0),
            depth_failed: AtomicU64::new(0),
            transparent_texels_skipped: AtomicU64::new(0),
            physics_substeps: AtomicU64::new(0),
            collision_candidates: AtomicU64::new(0),
            contacts_resolved: AtomicU64::new(0),
        }
    }

    fn all(&self) -> [&AtomicU64; 11] {
        [
            &self.render_mesh_calls,
            &self.triangles_submitted,
            &self.triangles_clipped_away,
            &self.triangles_culled,
            &self.pixels_tested,
            &self.depth_passed,
            &self.depth_failed,
            &self.transparent_texels_skipped,
            &self.physics_substeps,
            &self.collision_candidates,
            &self.contacts_resolved,
        ]
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        for counter in self.all() {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> CounterSnapshot {
        let [
            render_mesh_calls,
            triangles_submitted,
            triangles_clipped_away,
            triangles_culled,
            pixels_tested,
            depth_passed,
            depth_failed,
            transparent_texels_skipped,
            physics_substeps,
            collision_candidates,
            contacts_resolved,
        ] = self.all().map(|c| c.load(Ordering::Relaxed));
        CounterSnapshot {
            render_mesh_calls,
            triangles_submitted,
            triangles_clipped_away,
            triangles_culled,
            pixels_tested,
            depth_passed,
            depth_failed,
            transparent_texels_skipped,
            physics_substeps,
            collision_candidates,
            contacts_resolved,
        }
    }
}

impl Default for FunctionCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of counter values at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub render_mesh_calls: u64,
    pub triangles_submitted: u64,
    pub triangles_clipped_away: u64,
    pub triangles_culled: u64,
    pub pixels_tested: u64,
    pub depth_passed: u64,
    pub depth_failed: u64,
    pub transparent_texels_skipped: u64,
    pub physics_substeps: u64,
    pub collision_candidates: u64,
    pub contacts_resolved: u64,
}

impl CounterSnapshot {
    /// Fraction of tested pixels that passed the depth test, if any were tested
    pub fn depth_pass_rate(&self) -> Option<f64> {
        (self.pixels_tested > 0).then(|| self.depth_passed as f64 / self.pixels_tested as f64)
    }

    /// Log a formatted report at info level
    pub fn print_report(&self) {
        log::info!("=== Performance Counters Report ===");
        log::info!("Render pipeline:");
        log::info!("  render_mesh calls:          {:12}", self.render_mesh_calls);
        log::info!("  triangles submitted:        {:12}", self.triangles_submitted);
        log::info!("  triangles clipped away:     {:12}", self.triangles_clipped_away);
        log::info!("  triangles culled:           {:12}", self.triangles_culled);

        log::info!("Pixel operations:");
        log::info!("  pixels tested:              {:12}", self.pixels_tested);
        log::info!("  depth test passed:          {:12}", self.depth_passed);
        log::info!("  depth test failed:          {:12}", self.depth_failed);
        if let Some(rate) = self.depth_pass_rate() {
            log::info!("  depth test pass rate:       {:11.2}%", rate * 100.0);
        }
        log::info!("  transparent texels skipped: {:12}", self.transparent_texels_skipped);

        log::info!("Physics:");
        log::info!("  substeps:                   {:12}", self.physics_substeps);
        log::info!("  collision candidates:       {:12}", self.collision_candidates);
        log::info!("  contacts resolved:          {:12}", self.contacts_resolved);
    }
}

/// Global function counters instance
pub static FUNCTION_COUNTERS: FunctionCounters = FunctionCounters::new();

/// Macro for incrementing a counter (only when profiling feature is enabled)
#[macro_export]
macro_rules! count_call {
    ($counter:expr) => {
        #[cfg(feature = "profiling")]
        {
            $counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }
    };
}

/// Macro for adding to a counter (only when profiling feature is enabled)
#[macro_export]
macro_rules! count_add {
    ($counter:expr, $value:expr) => {
        #[cfg(feature = "profiling")]
        {
            $counter.fetch_add($value as u64, std::sync::atomic::Ordering::Relaxed);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_local_counters() {
        let counters = FunctionCounters::new();
        counters.depth_passed.fetch_add(3, Ordering::Relaxed);
        counters.pixels_tested.fetch_add(4, Ordering::Relaxed);
        let snap = counters.snapshot();
        assert_eq!(snap.depth_passed, 3);
        assert_eq!(snap.depth_pass_rate(), Some(0.75));

        counters.reset();
        assert_eq!(counters.snapshot(), CounterSnapshot::default());
    }
}
