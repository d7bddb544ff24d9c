use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of the `data_sensor` table.
///
/// `suhu` is temperature (°C) and `lux` the light level; the column names
/// are part of the wire contract with the device and its dashboard.
/// `id` is assigned by the database on insert, `timestamp` by the
/// database's `CURRENT_TIMESTAMP` (UTC, second resolution). Rows are never
/// updated or deleted.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct SensorReading {
    pub id: i64,
    pub suhu: f64,
    pub humidity: f64,
    pub lux: f64,
    pub timestamp: NaiveDateTime,
}

/// Selects which `data_sensor` column an aggregate query runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Temperature,
    Humidity,
    Light,
}

impl Metric {
    /// Column name in `data_sensor`. Callers never hand the store raw
    /// column strings.
    pub(crate) fn column(self) -> &'static str {
        match self {
            Metric::Temperature => "suhu",
            Metric::Humidity => "humidity",
            Metric::Light => "lux",
        }
    }
}

/// A calendar month a reading set touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthYear {
    pub month: u32,
    pub year: i32,
}
