use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::order::{Order, OrderStatus};
use crate::utils::errors::AppError;

pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insertar un pedido recién creado. Recibe el executor para poder
    /// ejecutarse en la misma transacción que la reserva del vehículo.
    pub async fn insert<'e, E: PgExecutor<'e>>(
        executor: E,
        order: &Order,
    ) -> Result<Order, AppError> {
        let inserted = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                id, vehicle_id, user_id, driver_id, start_date, end_date,
                duration_days, daily_rate, with_driver, total_amount, dp_amount,
                payment_method, payment_status, payment_proof_url, status,
                edit_request, balance_request, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING *
            "#,
        )
        .bind(order.id)
        .bind(order.vehicle_id)
        .bind(order.user_id)
        .bind(order.driver_id)
        .bind(order.start_date)
        .bind(order.end_date)
        .bind(order.duration_days)
        .bind(order.daily_rate)
        .bind(order.with_driver)
        .bind(order.total_amount)
        .bind(order.dp_amount)
        .bind(order.payment_method)
        .bind(order.payment_status)
        .bind(order.payment_proof_url.clone())
        .bind(order.status)
        .bind(order.edit_request.clone())
        .bind(order.balance_request.clone())
        .bind(order.created_at)
        .bind(order.updated_at)
        .fetch_one(executor)
        .await?;

        Ok(inserted)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, AppError> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    pub async fn list_all(
        &self,
        status: Option<OrderStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, AppError> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE ($1::order_status IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, AppError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    pub async fn list_by_driver(&self, driver_id: Uuid) -> Result<Vec<Order>, AppError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE driver_id = $1 ORDER BY created_at DESC",
        )
        .bind(driver_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Persistir el resultado de una transición. El WHERE sobre el estado
    /// previo actúa como guard optimista: si otro actor ganó la carrera no
    /// se afecta ninguna fila y el caller reporta el conflicto.
    pub async fn update_from_transition<'e, E: PgExecutor<'e>>(
        executor: E,
        order: &Order,
        previous_status: OrderStatus,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                start_date = $3, end_date = $4, duration_days = $5,
                total_amount = $6, dp_amount = $7,
                payment_method = $8, payment_status = $9, payment_proof_url = $10,
                status = $11, edit_request = $12, balance_request = $13,
                updated_at = now()
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(order.id)
        .bind(previous_status)
        .bind(order.start_date)
        .bind(order.end_date)
        .bind(order.duration_days)
        .bind(order.total_amount)
        .bind(order.dp_amount)
        .bind(order.payment_method)
        .bind(order.payment_status)
        .bind(order.payment_proof_url.clone())
        .bind(order.status)
        .bind(order.edit_request.clone())
        .bind(order.balance_request.clone())
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn assign_driver(&self, id: Uuid, driver_id: Uuid) -> Result<Order, AppError> {
        let order = sqlx::query_as::<_, Order>(
            "UPDATE orders SET driver_id = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(driver_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(order)
    }
}
