use chrono::NaiveDateTime;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    db::models::{MonthYear, SensorReading},
    mqtt::models::RelayState,
    reading_cache::LatestReading,
    stats::{AggregateStatistics, MetricStats, PeakReport},
};

/// Timestamps cross the API as `YYYY-MM-DD HH:MM:SS`, the format the
/// dashboard parses.
pub(crate) fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LatestReadingDto {
    pub suhu: f64,
    pub humidity: f64,
    pub lux: f64,
    pub timestamp: String,
}

impl From<LatestReading> for LatestReadingDto {
    fn from(r: LatestReading) -> Self {
        Self {
            suhu: r.suhu,
            humidity: r.humidity,
            lux: r.lux,
            timestamp: format_timestamp(r.timestamp),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadingDto {
    pub id: i64,
    pub suhu: f64,
    pub humidity: f64,
    pub lux: f64,
    pub timestamp: String,
}

impl From<SensorReading> for ReadingDto {
    fn from(r: SensorReading) -> Self {
        Self {
            id: r.id,
            suhu: r.suhu,
            humidity: r.humidity,
            lux: r.lux,
            timestamp: format_timestamp(r.timestamp),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MetricStatsDto {
    pub average: f64,
    pub minimum: f64,
    pub maximum: f64,
}

impl From<MetricStats> for MetricStatsDto {
    fn from(m: MetricStats) -> Self {
        Self {
            average: m.average,
            minimum: m.minimum,
            maximum: m.maximum,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatisticsDto {
    pub temperature: MetricStatsDto,
    pub humidity: MetricStatsDto,
    pub light: MetricStatsDto,
    pub total_records: i64,
}

impl From<AggregateStatistics> for StatisticsDto {
    fn from(s: AggregateStatistics) -> Self {
        Self {
            temperature: s.temperature.into(),
            humidity: s.humidity.into(),
            light: s.light.into(),
            total_records: s.total_records,
        }
    }
}

/// Row shape inside `nilai_suhu_max_humid_max`. The field names are the
/// column aliases the dashboard was built against.
#[derive(Debug, Serialize, ToSchema)]
pub struct PeakReadingDto {
    pub idx: i64,
    pub suhun: f64,
    pub humid: f64,
    pub kecerahan: f64,
    pub timestamp: String,
}

impl From<SensorReading> for PeakReadingDto {
    fn from(r: SensorReading) -> Self {
        Self {
            idx: r.id,
            suhun: r.suhu,
            humid: r.humidity,
            kecerahan: r.lux,
            timestamp: format_timestamp(r.timestamp),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthYearDto {
    /// `"M-YYYY"`, month without a leading zero.
    pub month_year: String,
}

impl From<MonthYear> for MonthYearDto {
    fn from(pair: MonthYear) -> Self {
        Self {
            month_year: format!("{}-{}", pair.month, pair.year),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PeakReportDto {
    pub suhumax: f64,
    pub suhumin: f64,
    pub suhurata: f64,
    pub nilai_suhu_max_humid_max: Vec<PeakReadingDto>,
    pub month_year_max: Vec<MonthYearDto>,
}

impl From<PeakReport> for PeakReportDto {
    fn from(r: PeakReport) -> Self {
        Self {
            suhumax: r.temperature.maximum,
            suhumin: r.temperature.minimum,
            suhurata: r.temperature.average,
            nilai_suhu_max_humid_max: r.peak_readings.into_iter().map(Into::into).collect(),
            month_year_max: r.month_years.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, serde::Deserialize, ToSchema)]
pub struct RelayControlRequest {
    pub state: RelayState,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RelayControlResponse {
    pub status: String,
    pub relay_state: RelayState,
}
