use sqlx::SqlitePool;
use thiserror::Error;

use super::models::{Metric, MonthYear, SensorReading};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database unreachable: {0}")]
    Connection(#[source] sqlx::Error),
    #[error("constraint violation: {0}")]
    Constraint(#[source] sqlx::Error),
    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Connection(e)
            }
            sqlx::Error::Database(db)
                if db.is_unique_violation()
                    || db.is_check_violation()
                    || db.is_foreign_key_violation() =>
            {
                StoreError::Constraint(e)
            }
            _ => StoreError::Query(e),
        }
    }
}

/// Average/min/max of one metric over the whole table.
///
/// An empty table reports all zeros (never NULL) so the HTTP contract
/// stays stable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricAggregate {
    pub average: f64,
    pub minimum: f64,
    pub maximum: f64,
}

/// Cheap-to-clone handle over the `data_sensor` table.
///
/// Every operation checks a connection out of the pool only for its own
/// duration; nothing is held between calls, so concurrent API traffic is
/// bounded by the pool and the database's own locking.
#[derive(Clone)]
pub struct ReadingStore {
    pool: SqlitePool,
}

impl ReadingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert one reading. Id and timestamp are assigned by the database.
    pub async fn insert(
        &self,
        suhu: f64,
        humidity: f64,
        lux: f64,
    ) -> Result<SensorReading, StoreError> {
        let reading = sqlx::query_as::<_, SensorReading>(
            "INSERT INTO data_sensor (suhu, humidity, lux)
             VALUES (?, ?, ?)
             RETURNING id, suhu, humidity, lux, timestamp",
        )
        .bind(suhu)
        .bind(humidity)
        .bind(lux)
        .fetch_one(&self.pool)
        .await?;
        Ok(reading)
    }

    /// All readings, newest first. Ids break ties within the same second.
    pub async fn list_all(&self) -> Result<Vec<SensorReading>, StoreError> {
        let rows = sqlx::query_as::<_, SensorReading>(
            "SELECT id, suhu, humidity, lux, timestamp
             FROM data_sensor
             ORDER BY timestamp DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn aggregate(&self, metric: Metric) -> Result<MetricAggregate, StoreError> {
        let col = metric.column();
        let sql = format!(
            "SELECT COALESCE(AVG({col}), 0.0) AS average,
                    COALESCE(MIN({col}), 0.0) AS minimum,
                    COALESCE(MAX({col}), 0.0) AS maximum
             FROM data_sensor"
        );
        let (average, minimum, maximum): (f64, f64, f64) =
            sqlx::query_as(&sql).fetch_one(&self.pool).await?;
        Ok(MetricAggregate {
            average,
            minimum,
            maximum,
        })
    }

    pub async fn count_all(&self) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM data_sensor")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Readings whose `metric` value equals the global maximum, ties
    /// included, newest first, capped at 10. Empty table yields an empty
    /// list (the MAX subquery is NULL and matches nothing).
    pub async fn readings_at_max(&self, metric: Metric) -> Result<Vec<SensorReading>, StoreError> {
        let col = metric.column();
        let sql = format!(
            "SELECT id, suhu, humidity, lux, timestamp
             FROM data_sensor
             WHERE {col} = (SELECT MAX({col}) FROM data_sensor)
             ORDER BY timestamp DESC, id DESC
             LIMIT 10"
        );
        let rows = sqlx::query_as::<_, SensorReading>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Top `n` readings by `metric`, descending, newest-first tiebreak.
    pub async fn top_n_by_metric(
        &self,
        metric: Metric,
        n: i64,
    ) -> Result<Vec<SensorReading>, StoreError> {
        let col = metric.column();
        let sql = format!(
            "SELECT id, suhu, humidity, lux, timestamp
             FROM data_sensor
             ORDER BY {col} DESC, timestamp DESC, id DESC
             LIMIT ?"
        );
        let rows = sqlx::query_as::<_, SensorReading>(&sql)
            .bind(n)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Distinct (month, year) pairs across all readings, newest first.
    pub async fn distinct_month_years(&self, limit: i64) -> Result<Vec<MonthYear>, StoreError> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT DISTINCT CAST(strftime('%m', timestamp) AS INTEGER) AS month,
                             CAST(strftime('%Y', timestamp) AS INTEGER) AS year
             FROM data_sensor
             ORDER BY year DESC, month DESC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(month, year)| MonthYear {
                month: month as u32,
                year: year as i32,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::SqlitePool;

    async fn insert_at(pool: &SqlitePool, suhu: f64, humidity: f64, lux: f64, ts: &str) {
        sqlx::query("INSERT INTO data_sensor (suhu, humidity, lux, timestamp) VALUES (?, ?, ?, ?)")
            .bind(suhu)
            .bind(humidity)
            .bind(lux)
            .bind(ts)
            .execute(pool)
            .await
            .unwrap();
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn insert_assigns_increasing_ids_and_timestamp(pool: SqlitePool) {
        let store = ReadingStore::new(pool);
        let a = store.insert(25.5, 60.0, 300.0).await.unwrap();
        let b = store.insert(26.0, 61.0, 310.0).await.unwrap();

        assert!(b.id > a.id);
        assert_eq!(a.suhu, 25.5);
        assert_eq!(a.humidity, 60.0);
        assert_eq!(a.lux, 300.0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn list_all_is_newest_first(pool: SqlitePool) {
        insert_at(&pool, 20.0, 50.0, 100.0, "2025-01-01 10:00:00").await;
        insert_at(&pool, 21.0, 51.0, 110.0, "2025-01-02 10:00:00").await;
        insert_at(&pool, 22.0, 52.0, 120.0, "2025-01-01 12:00:00").await;

        let store = ReadingStore::new(pool);
        let rows = store.list_all().await.unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].suhu, 21.0);
        assert_eq!(rows[1].suhu, 22.0);
        assert_eq!(rows[2].suhu, 20.0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn list_all_breaks_same_second_ties_by_id(pool: SqlitePool) {
        insert_at(&pool, 1.0, 0.0, 0.0, "2025-01-01 10:00:00").await;
        insert_at(&pool, 2.0, 0.0, 0.0, "2025-01-01 10:00:00").await;

        let store = ReadingStore::new(pool);
        let rows = store.list_all().await.unwrap();

        assert_eq!(rows[0].suhu, 2.0);
        assert_eq!(rows[1].suhu, 1.0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn aggregate_on_empty_table_is_all_zero(pool: SqlitePool) {
        let store = ReadingStore::new(pool);
        for metric in [Metric::Temperature, Metric::Humidity, Metric::Light] {
            let agg = store.aggregate(metric).await.unwrap();
            assert_eq!(agg.average, 0.0);
            assert_eq!(agg.minimum, 0.0);
            assert_eq!(agg.maximum, 0.0);
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn aggregate_computes_avg_min_max(pool: SqlitePool) {
        let store = ReadingStore::new(pool);
        store.insert(20.0, 40.0, 100.0).await.unwrap();
        store.insert(30.0, 60.0, 300.0).await.unwrap();

        let temp = store.aggregate(Metric::Temperature).await.unwrap();
        assert_eq!(temp.average, 25.0);
        assert_eq!(temp.minimum, 20.0);
        assert_eq!(temp.maximum, 30.0);

        let lux = store.aggregate(Metric::Light).await.unwrap();
        assert_eq!(lux.maximum, 300.0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn count_all_counts_rows(pool: SqlitePool) {
        let store = ReadingStore::new(pool.clone());
        assert_eq!(store.count_all().await.unwrap(), 0);

        store.insert(1.0, 2.0, 3.0).await.unwrap();
        store.insert(4.0, 5.0, 6.0).await.unwrap();
        assert_eq!(store.count_all().await.unwrap(), 2);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn readings_at_max_includes_all_ties_newest_first(pool: SqlitePool) {
        insert_at(&pool, 30.0, 50.0, 100.0, "2025-01-01 10:00:00").await;
        insert_at(&pool, 25.0, 50.0, 100.0, "2025-01-02 10:00:00").await;
        insert_at(&pool, 30.0, 50.0, 100.0, "2025-01-03 10:00:00").await;

        let store = ReadingStore::new(pool);
        let rows = store.readings_at_max(Metric::Temperature).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.suhu == 30.0));
        assert!(rows[0].timestamp > rows[1].timestamp);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn readings_at_max_on_empty_table_is_empty(pool: SqlitePool) {
        let store = ReadingStore::new(pool);
        let rows = store.readings_at_max(Metric::Humidity).await.unwrap();
        assert!(rows.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn top_n_orders_by_metric_and_respects_limit(pool: SqlitePool) {
        insert_at(&pool, 10.0, 0.0, 0.0, "2025-01-01 10:00:00").await;
        insert_at(&pool, 30.0, 0.0, 0.0, "2025-01-02 10:00:00").await;
        insert_at(&pool, 20.0, 0.0, 0.0, "2025-01-03 10:00:00").await;

        let store = ReadingStore::new(pool);
        let rows = store.top_n_by_metric(Metric::Temperature, 2).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].suhu, 30.0);
        assert_eq!(rows[1].suhu, 20.0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn distinct_month_years_is_deduped_and_newest_first(pool: SqlitePool) {
        insert_at(&pool, 1.0, 0.0, 0.0, "2024-11-05 10:00:00").await;
        insert_at(&pool, 2.0, 0.0, 0.0, "2025-01-10 10:00:00").await;
        insert_at(&pool, 3.0, 0.0, 0.0, "2025-01-20 10:00:00").await;
        insert_at(&pool, 4.0, 0.0, 0.0, "2025-03-01 10:00:00").await;

        let store = ReadingStore::new(pool);
        let pairs = store.distinct_month_years(5).await.unwrap();

        assert_eq!(
            pairs,
            vec![
                MonthYear { month: 3, year: 2025 },
                MonthYear { month: 1, year: 2025 },
                MonthYear { month: 11, year: 2024 },
            ]
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn concurrent_inserts_never_expose_partial_rows(pool: SqlitePool) {
        let store = ReadingStore::new(pool);

        let writer_a = {
            let store = store.clone();
            async move {
                for i in 0..5 {
                    store.insert(20.0 + i as f64, 50.0, 100.0).await.unwrap();
                }
            }
        };
        let writer_b = {
            let store = store.clone();
            async move {
                for i in 0..5 {
                    store.insert(30.0 + i as f64, 60.0, 200.0).await.unwrap();
                }
            }
        };
        let reader = {
            let store = store.clone();
            async move {
                for _ in 0..5 {
                    for row in store.list_all().await.unwrap() {
                        assert!(row.id > 0);
                        assert!(row.suhu >= 20.0);
                        assert!(row.humidity >= 50.0);
                        assert!(row.lux >= 100.0);
                    }
                }
            }
        };

        tokio::join!(writer_a, writer_b, reader);
        assert_eq!(store.count_all().await.unwrap(), 10);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn distinct_month_years_respects_limit(pool: SqlitePool) {
        for month in 1..=6 {
            insert_at(&pool, 1.0, 0.0, 0.0, &format!("2025-{month:02}-01 10:00:00")).await;
        }

        let store = ReadingStore::new(pool);
        let pairs = store.distinct_month_years(4).await.unwrap();

        assert_eq!(pairs.len(), 4);
        assert_eq!(pairs[0], MonthYear { month: 6, year: 2025 });
    }
}
