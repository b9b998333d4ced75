// src/db/menu_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::menu::{MenuItem, MenuItemInput, NewMenuItem},
};

const MENU_COLUMNS: &str = "id, name, description, price, category, image, in_stock, \
                            is_published, is_veg, created_at, updated_at";

#[derive(Clone)]
pub struct MenuRepository {
    pool: PgPool,
}

impl MenuRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<MenuItem>, AppError> {
        let sql = format!("SELECT {MENU_COLUMNS} FROM menu_items ORDER BY category, name");
        let items = sqlx::query_as::<_, MenuItem>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<MenuItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {MENU_COLUMNS} FROM menu_items WHERE id = $1");
        let item = sqlx::query_as::<_, MenuItem>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(item)
    }

    /// Busca vários itens de uma vez (resolução dos itens de um pedido).
    pub async fn find_many<'e, E>(&self, executor: E, ids: &[Uuid]) -> Result<Vec<MenuItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {MENU_COLUMNS} FROM menu_items WHERE id = ANY($1)");
        let items = sqlx::query_as::<_, MenuItem>(&sql)
            .bind(ids)
            .fetch_all(executor)
            .await?;
        Ok(items)
    }

    pub async fn create(&self, item: &NewMenuItem) -> Result<MenuItem, AppError> {
        let sql = format!(
            "INSERT INTO menu_items
                (name, description, price, category, image, in_stock, is_published, is_veg)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {MENU_COLUMNS}"
        );
        let created = sqlx::query_as::<_, MenuItem>(&sql)
            .bind(&item.name)
            .bind(&item.description)
            .bind(item.price)
            .bind(&item.category)
            .bind(&item.image)
            .bind(item.in_stock)
            .bind(item.is_published)
            .bind(item.is_veg)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    // Só altera os campos enviados
    pub async fn update(&self, id: Uuid, input: &MenuItemInput) -> Result<Option<MenuItem>, AppError> {
        let sql = format!(
            "UPDATE menu_items SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                category = COALESCE($5, category),
                image = COALESCE($6, image),
                in_stock = COALESCE($7, in_stock),
                is_published = COALESCE($8, is_published),
                is_veg = COALESCE($9, is_veg),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {MENU_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, MenuItem>(&sql)
            .bind(id)
            .bind(input.name.as_deref())
            .bind(input.description.as_deref())
            .bind(input.price)
            .bind(input.category.as_deref())
            .bind(input.image.as_deref())
            .bind(input.in_stock)
            .bind(input.is_published)
            .bind(input.is_veg)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
