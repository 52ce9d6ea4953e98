//! Counters and timings gathered while a run progresses.

use std::time::Duration;

/// Template generation counters for one stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageCounters {
    /// Templates the stage tried to create.
    pub attempted: usize,
    /// Creations that failed, including images that could not be loaded.
    pub errors: usize,
    /// Summed wall time of successful creations.
    pub success_time: Duration,
    /// Size of the first successful template.
    pub template_size: Option<usize>,
}

impl StageCounters {
    /// Record one successful creation.
    pub fn record_success(&mut self, elapsed: Duration, template_len: usize) {
        self.attempted += 1;
        self.success_time += elapsed;
        self.template_size.get_or_insert(template_len);
    }

    /// Record one failed creation.
    pub fn record_failure(&mut self) {
        self.attempted += 1;
        self.errors += 1;
    }

    /// Successful creations.
    #[must_use]
    pub fn successes(&self) -> usize {
        self.attempted - self.errors
    }

    /// Mean time of successful creations.
    #[must_use]
    pub fn mean_generation_time(&self) -> Duration {
        mean(self.success_time, self.successes())
    }
}

/// Search counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCounters {
    /// Searches issued.
    pub attempted: usize,
    /// Searches the engine failed.
    pub errors: usize,
    /// Summed wall time of every search call.
    pub total_time: Duration,
}

impl SearchCounters {
    /// Record one search.
    pub fn record(&mut self, elapsed: Duration, ok: bool) {
        self.attempted += 1;
        self.total_time += elapsed;
        if !ok {
            self.errors += 1;
        }
    }

    /// Mean time over all search calls, failed ones included.
    #[must_use]
    pub fn mean_time(&self) -> Duration {
        mean(self.total_time, self.attempted)
    }
}

/// Everything measured during a run apart from the search results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunContext {
    /// Enrollment template creation.
    pub enrollment: StageCounters,
    /// Search template creation.
    pub identification: StageCounters,
    /// Gallery searches.
    pub search: SearchCounters,
    /// Time spent opening the enrollment session.
    pub enrollment_init: Duration,
    /// Time spent finalizing the gallery.
    pub finalize: Duration,
    /// Time spent opening the identification session.
    pub identification_init: Duration,
}

fn mean(total: Duration, count: usize) -> Duration {
    match u32::try_from(count) {
        Ok(0) => Duration::ZERO,
        Ok(n) => total / n,
        Err(_) => Duration::from_secs_f64(total.as_secs_f64() / count as f64),
    }
}
