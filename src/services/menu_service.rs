// src/services/menu_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::path::{Path, PathBuf};
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::{
    common::error::AppError,
    db::MenuRepository,
    models::menu::{MenuItem, MenuItemInput, NewMenuItem, DEFAULT_CATEGORY},
};

/// Arquivo de imagem recebido no multipart.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

fn field_error(errors: &mut ValidationErrors, field: &'static str, code: &'static str, message: &'static str) {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    errors.add(field, err);
}

/// Valida os campos obrigatórios e aplica os defaults de um item novo.
pub fn build_new_item(input: MenuItemInput) -> Result<NewMenuItem, AppError> {
    let mut errors = ValidationErrors::new();

    let name = input.name.filter(|n| !n.trim().is_empty());
    if name.is_none() {
        field_error(&mut errors, "name", "required", "The name is required.");
    }
    match input.price {
        None => field_error(&mut errors, "price", "required", "The price is required."),
        Some(p) if p.is_sign_negative() => {
            field_error(&mut errors, "price", "range", "The price cannot be negative.")
        }
        _ => {}
    }
    if input.is_veg.is_none() {
        field_error(&mut errors, "isVeg", "required", "The isVeg flag is required.");
    }

    let (Some(name), Some(price), Some(is_veg)) = (name, input.price, input.is_veg) else {
        return Err(AppError::ValidationError(errors));
    };
    if !errors.is_empty() {
        return Err(AppError::ValidationError(errors));
    }

    Ok(NewMenuItem {
        name,
        description: input.description.unwrap_or_default(),
        price,
        category: input
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        image: input.image.unwrap_or_default(),
        in_stock: input.in_stock.unwrap_or(true),
        is_published: input.is_published.unwrap_or(true),
        is_veg,
    })
}

/// Nome gravado em disco: `<millis>-<nome original sem diretórios>`.
pub fn stored_file_name(original: &str, millis: i64) -> String {
    let base = Path::new(original)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("image");
    format!("{}-{}", millis, base.replace(' ', "_"))
}

#[derive(Clone)]
pub struct MenuService {
    repo: MenuRepository,
    pool: PgPool,
    upload_dir: PathBuf,
}

impl MenuService {
    pub fn new(repo: MenuRepository, pool: PgPool, upload_dir: PathBuf) -> Self {
        Self { repo, pool, upload_dir }
    }

    pub async fn list_items(&self) -> Result<Vec<MenuItem>, AppError> {
        self.repo.list_all().await
    }

    pub async fn get_item(&self, id: Uuid) -> Result<MenuItem, AppError> {
        self.repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Menu item".into()))
    }

    pub async fn create_item(
        &self,
        mut input: MenuItemInput,
        upload: Option<UploadedImage>,
    ) -> Result<MenuItem, AppError> {
        self.resolve_image(&mut input, upload).await?;
        let new_item = build_new_item(input)?;
        let item = self.repo.create(&new_item).await?;
        tracing::info!(id = %item.id, name = %item.name, "Item do cardápio criado");
        Ok(item)
    }

    pub async fn update_item(
        &self,
        id: Uuid,
        mut input: MenuItemInput,
        upload: Option<UploadedImage>,
    ) -> Result<MenuItem, AppError> {
        if input.price.is_some_and(|p: Decimal| p.is_sign_negative()) {
            let mut errors = ValidationErrors::new();
            field_error(&mut errors, "price", "range", "The price cannot be negative.");
            return Err(AppError::ValidationError(errors));
        }
        if input.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            input.name = None;
        }

        self.resolve_image(&mut input, upload).await?;
        self.repo
            .update(id, &input)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Menu item".into()))
    }

    pub async fn delete_item(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::ResourceNotFound("Menu item".into()));
        }
        tracing::info!(%id, "Item do cardápio removido");
        Ok(())
    }

    // URL informada pelo cliente tem prioridade sobre o upload
    async fn resolve_image(
        &self,
        input: &mut MenuItemInput,
        upload: Option<UploadedImage>,
    ) -> Result<(), AppError> {
        if input.image.as_deref().is_some_and(|url| !url.trim().is_empty()) {
            return Ok(());
        }
        input.image = None;

        if let Some(file) = upload {
            let name = stored_file_name(&file.file_name, Utc::now().timestamp_millis());
            tokio::fs::create_dir_all(&self.upload_dir)
                .await
                .map_err(|e| anyhow::anyhow!("Falha ao criar a pasta de uploads: {}", e))?;
            tokio::fs::write(self.upload_dir.join(&name), &file.bytes)
                .await
                .map_err(|e| anyhow::anyhow!("Falha ao gravar a imagem: {}", e))?;
            input.image = Some(format!("/uploads/{}", name));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> MenuItemInput {
        MenuItemInput {
            name: Some("Paneer Tikka".into()),
            price: Some(Decimal::new(1250, 2)),
            is_veg: Some(true),
            ..Default::default()
        }
    }

    #[test]
    fn new_item_gets_defaults() {
        let item = build_new_item(input()).unwrap();
        assert_eq!(item.category, DEFAULT_CATEGORY);
        assert_eq!(item.description, "");
        assert_eq!(item.image, "");
        assert!(item.in_stock);
        assert!(item.is_published);
    }

    #[test]
    fn missing_required_fields_are_reported_together() {
        let err = build_new_item(MenuItemInput::default()).unwrap_err();
        let AppError::ValidationError(errors) = err else {
            panic!("expected validation error");
        };
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("price"));
        assert!(fields.contains_key("isVeg"));
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut bad = input();
        bad.price = Some(Decimal::new(-1, 0));
        assert!(matches!(build_new_item(bad), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn stored_names_strip_directories() {
        assert_eq!(stored_file_name("naan.jpg", 42), "42-naan.jpg");
        assert_eq!(stored_file_name("../../etc/passwd", 1), "1-passwd");
        assert_eq!(stored_file_name("my photo.png", 7), "7-my_photo.png");
    }
}
