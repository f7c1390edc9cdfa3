//! Tick callback that logs a farm summary at day boundaries.

use std::ops::ControlFlow;

use agroswarm_core::runner::TickCallback;
use agroswarm_core::{Simulator, TickSummary};
use tracing::{debug, info};

/// Logs yield, resource use, and scores every `every_days` days.
#[derive(Debug, Clone, Copy)]
pub struct DaySummaryCallback {
    every_days: u64,
}

impl DaySummaryCallback {
    /// Log every `every_days` days; 0 disables the summary.
    pub const fn new(every_days: u64) -> Self {
        Self { every_days }
    }

    /// Whether the tick just run closes a day that should be summarised.
    pub fn is_due(&self, summary: &TickSummary) -> bool {
        summary.weather_changed && summary.day.checked_rem(self.every_days) == Some(0)
    }
}

impl TickCallback for DaySummaryCallback {
    fn on_tick(&mut self, summary: &TickSummary, sim: &Simulator) -> ControlFlow<()> {
        if summary.spread.pest_infections > 0 || summary.spread.disease_infections > 0 {
            debug!(
                tick = summary.tick,
                pest = summary.spread.pest_infections,
                disease = summary.spread.disease_infections,
                "Spread"
            );
        }

        if self.is_due(summary) {
            let totals = sim.totals();
            let planted = sim.grid().planted_count();
            info!(
                day = summary.day,
                tick = summary.tick,
                planted,
                total_yield = totals.total_yield,
                water_used = totals.water_used,
                chem_used = totals.chem_used,
                monitoring = totals.monitoring_count,
                biodiversity = summary.biodiversity,
                sustainability = sim.sustainability_index(),
                "Day summary"
            );
        }
        ControlFlow::Continue(())
    }
}
