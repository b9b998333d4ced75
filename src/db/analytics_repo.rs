// src/db/analytics_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::analytics::{AnalyticsSummary, DailyRevenue, TopItem},
};

// Receita = soma de preço x quantidade dos itens embutidos (JSONB)
const ITEM_REVENUE: &str =
    "COALESCE(SUM((item->>'price')::numeric * (item->>'quantity')::int), 0)";

#[derive(Clone)]
pub struct AnalyticsRepository {
    pool: PgPool,
}

impl AnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resumo do intervalo [start, end). Limites nulos são abertos.
    pub async fn summary<'e, E>(
        &self,
        executor: E,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<AnalyticsSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        // REPEATABLE READ: todas as consultas abaixo veem o mesmo snapshot
        let mut tx = executor.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let (total, pending, completed): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE status = 'Pending'),
                COUNT(*) FILTER (WHERE status = 'Completed')
            FROM orders
            WHERE ($1::timestamptz IS NULL OR created_at >= $1)
              AND ($2::timestamptz IS NULL OR created_at < $2)
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&mut *tx)
        .await?;

        let revenue_sql = format!(
            "SELECT {ITEM_REVENUE}
             FROM orders o
             CROSS JOIN LATERAL jsonb_array_elements(o.items) AS item
             WHERE ($1::timestamptz IS NULL OR o.created_at >= $1)
               AND ($2::timestamptz IS NULL OR o.created_at < $2)"
        );
        let total_revenue: Decimal = sqlx::query_scalar(&revenue_sql)
            .bind(start)
            .bind(end)
            .fetch_one(&mut *tx)
            .await?;

        let top_items = sqlx::query_as::<_, TopItem>(
            r#"
            SELECT
                item->>'name' AS name,
                SUM((item->>'quantity')::int)::bigint AS quantity
            FROM orders o
            CROSS JOIN LATERAL jsonb_array_elements(o.items) AS item
            WHERE ($1::timestamptz IS NULL OR o.created_at >= $1)
              AND ($2::timestamptz IS NULL OR o.created_at < $2)
            GROUP BY item->>'name'
            ORDER BY quantity DESC, name
            LIMIT 3
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(AnalyticsSummary {
            total_orders_today: total,
            pending_count: pending,
            completed_count: completed,
            total_revenue,
            top_items,
        })
    }

    /// Receita por dia (YYYY-MM-DD, UTC), em ordem crescente.
    pub async fn daily_revenue(&self, since: Option<DateTime<Utc>>) -> Result<Vec<DailyRevenue>, AppError> {
        let sql = format!(
            "SELECT
                to_char(o.created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD') AS day,
                {ITEM_REVENUE} AS total
             FROM orders o
             LEFT JOIN LATERAL jsonb_array_elements(o.items) AS item ON TRUE
             WHERE ($1::timestamptz IS NULL OR o.created_at >= $1)
             GROUP BY day
             ORDER BY day"
        );
        let rows = sqlx::query_as::<_, DailyRevenue>(&sql)
            .bind(since)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
