mod service;

pub use service::{AggregateStatistics, MetricStats, PeakReport, StatisticsService};
