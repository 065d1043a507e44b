//! Line performance indicators (KPIs).
//!
//! Computes throughput-oriented metrics from a built or composed schedule.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Completed | Jobs exiting the last stage within `[0, horizon]` |
//! | Throughput / h | completed / horizon * 60 |
//! | Makespan | Latest finish of any record |
//! | Avg Flow Time | Mean(exit - entry) over fully routed jobs |
//! | Server Utilization | Busy minutes inside the horizon / horizon |
//! | Bottleneck | Stage with the highest mean server utilization |
//!
//! # Reference
//! Hopp & Spearman (2011), "Factory Physics", Ch. 7: Basic Factory Dynamics

use std::collections::HashMap;

use crate::models::{Schedule, Stage};

/// Line performance indicators. All times are in minutes.
#[derive(Debug, Clone)]
pub struct LineKpi {
    /// Horizon the metrics refer to (minutes).
    pub horizon_minutes: f64,
    /// Distinct jobs in the schedule.
    pub jobs_scheduled: usize,
    /// Jobs exiting the last stage within the horizon.
    pub jobs_completed: usize,
    /// Completions per hour over the horizon.
    pub throughput_per_hour: f64,
    /// Latest finish of any record.
    pub makespan: f64,
    /// Mean time from first-stage start to last-stage finish.
    pub avg_flow_time: f64,
    /// Utilization per stage, per server.
    pub utilization_by_server: Vec<Vec<f64>>,
    /// Mean server utilization per stage.
    pub utilization_by_stage: Vec<f64>,
    /// Mean utilization over all servers of the line.
    pub avg_utilization: f64,
    /// Stage with the highest mean utilization.
    pub bottleneck: Option<usize>,
}

impl LineKpi {
    /// Computes KPIs for `schedule` over `shifts` shifts of `shift_minutes`.
    ///
    /// # Arguments
    /// * `schedule` - Build or horizon schedule.
    /// * `stages` - Topology the schedule was built for (for server counts).
    /// * `shift_minutes` - Shift length.
    /// * `shifts` - Number of shifts in the horizon.
    pub fn calculate(
        schedule: &Schedule,
        stages: &[Stage],
        shift_minutes: f64,
        shifts: usize,
    ) -> Self {
        let horizon = (shift_minutes * shifts as f64).max(0.0);

        let exits = schedule.job_exits();
        let jobs_completed = exits
            .iter()
            .filter(|&&(_, t)| t >= 0.0 && t <= horizon)
            .count();

        let entries: HashMap<usize, f64> = schedule.job_entries().into_iter().collect();
        let flows: Vec<f64> = exits
            .iter()
            .filter_map(|(job, exit)| entries.get(job).map(|entry| exit - entry))
            .collect();
        let avg_flow_time = if flows.is_empty() {
            0.0
        } else {
            flows.iter().sum::<f64>() / flows.len() as f64
        };

        let mut busy: Vec<Vec<f64>> = stages
            .iter()
            .map(|s| vec![0.0; s.server_count()])
            .collect();
        for r in schedule.iter() {
            if let Some(slot) = busy
                .get_mut(r.stage_index)
                .and_then(|lanes| lanes.get_mut(r.server_index))
            {
                let lo = r.start.max(0.0);
                let hi = r.finish.min(horizon);
                if hi > lo {
                    *slot += hi - lo;
                }
            }
        }

        let utilization_by_server: Vec<Vec<f64>> = if horizon > 0.0 {
            busy.iter()
                .map(|lanes| lanes.iter().map(|b| b / horizon).collect())
                .collect()
        } else {
            busy.iter().map(|lanes| vec![0.0; lanes.len()]).collect()
        };

        let utilization_by_stage: Vec<f64> = utilization_by_server
            .iter()
            .map(|lanes| lanes.iter().sum::<f64>() / lanes.len() as f64)
            .collect();

        let server_total: usize = utilization_by_server.iter().map(Vec::len).sum();
        let avg_utilization = if server_total == 0 {
            0.0
        } else {
            utilization_by_server.iter().flatten().sum::<f64>() / server_total as f64
        };

        let bottleneck = utilization_by_stage
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);

        let throughput_per_hour = if horizon > 0.0 {
            jobs_completed as f64 / horizon * 60.0
        } else {
            0.0
        };

        Self {
            horizon_minutes: horizon,
            jobs_scheduled: schedule.job_count(),
            jobs_completed,
            throughput_per_hour,
            makespan: schedule.makespan(),
            avg_flow_time,
            utilization_by_server,
            utilization_by_stage,
            avg_utilization,
            bottleneck,
        }
    }

    /// Whether the line reaches `jobs_per_shift` on average per shift.
    pub fn meets_target(&self, jobs_per_shift: f64, shift_minutes: f64) -> bool {
        if self.horizon_minutes <= 0.0 || shift_minutes <= 0.0 {
            return jobs_per_shift <= 0.0;
        }
        let shifts = self.horizon_minutes / shift_minutes;
        self.jobs_completed as f64 / shifts >= jobs_per_shift
    }
}
