use std::collections::HashSet;

use chrono::Datelike;

use crate::db::{
    models::{Metric, MonthYear, SensorReading},
    store::{ReadingStore, StoreError},
};

/// Derived views over the stored readings.
///
/// Everything is recomputed from the table on each call; nothing here is
/// cached.
#[derive(Clone)]
pub struct StatisticsService {
    store: ReadingStore,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricStats {
    /// Rounded to 2 decimal places.
    pub average: f64,
    pub minimum: f64,
    pub maximum: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateStatistics {
    pub temperature: MetricStats,
    pub humidity: MetricStats,
    pub light: MetricStats,
    pub total_records: i64,
}

/// Peak-value report: temperature stats, the readings that attain the
/// global temperature or humidity maximum, and the months those fall in.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakReport {
    pub temperature: MetricStats,
    pub peak_readings: Vec<SensorReading>,
    pub month_years: Vec<MonthYear>,
}

impl StatisticsService {
    pub fn new(store: ReadingStore) -> Self {
        Self { store }
    }

    /// Average/min/max for each metric plus the total row count. An empty
    /// table yields all zeros, not an error.
    pub async fn aggregate_statistics(&self) -> Result<AggregateStatistics, StoreError> {
        let temperature = self.metric_stats(Metric::Temperature).await?;
        let humidity = self.metric_stats(Metric::Humidity).await?;
        let light = self.metric_stats(Metric::Light).await?;
        let total_records = self.store.count_all().await?;
        Ok(AggregateStatistics {
            temperature,
            humidity,
            light,
            total_records,
        })
    }

    /// Build the peak report.
    ///
    /// Both collections fall back rather than coming up empty against a
    /// non-empty table: no max rows → the 5 highest-temperature readings;
    /// no months from those rows → the 5 most recent distinct months
    /// table-wide. The dashboard charts index straight into these arrays.
    pub async fn peak_report(&self) -> Result<PeakReport, StoreError> {
        let temperature = self.metric_stats(Metric::Temperature).await?;

        let at_max_temperature = self.store.readings_at_max(Metric::Temperature).await?;
        let at_max_humidity = self.store.readings_at_max(Metric::Humidity).await?;

        // Union by id, first-seen order: temperature maxima first, then
        // humidity maxima, each list already newest-first.
        let mut peak_readings: Vec<SensorReading> = Vec::new();
        let mut seen = HashSet::new();
        for reading in at_max_temperature.into_iter().chain(at_max_humidity) {
            if seen.insert(reading.id) {
                peak_readings.push(reading);
            }
        }
        if peak_readings.is_empty() {
            peak_readings = self.store.top_n_by_metric(Metric::Temperature, 5).await?;
        }

        let mut month_years: Vec<MonthYear> = Vec::new();
        for reading in &peak_readings {
            let pair = MonthYear {
                month: reading.timestamp.month(),
                year: reading.timestamp.year(),
            };
            if !month_years.contains(&pair) {
                month_years.push(pair);
            }
        }
        if month_years.is_empty() {
            month_years = self.store.distinct_month_years(5).await?;
        }

        Ok(PeakReport {
            temperature,
            peak_readings,
            month_years,
        })
    }

    async fn metric_stats(&self, metric: Metric) -> Result<MetricStats, StoreError> {
        let agg = self.store.aggregate(metric).await?;
        Ok(MetricStats {
            average: round2(agg.average),
            minimum: agg.minimum,
            maximum: agg.maximum,
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
