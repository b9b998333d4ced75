// src/models/menu.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

pub const DEFAULT_CATEGORY: &str = "Uncategorized";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: Uuid,
    #[schema(example = "Paneer Tikka")]
    pub name: String,
    pub description: String,
    #[schema(example = "12.50")]
    pub price: Decimal,
    #[schema(example = "Starters")]
    pub category: String,
    // Caminho tipo /uploads/123-foto.jpg ou URL externa
    pub image: String,
    pub in_stock: bool,
    pub is_published: bool,
    pub is_veg: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// O frontend antigo lê `imageUrl`, então espelhamos o campo `image`
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemResponse {
    #[serde(flatten)]
    pub item: MenuItem,
    pub image_url: String,
}

impl From<MenuItem> for MenuItemResponse {
    fn from(item: MenuItem) -> Self {
        let image_url = item.image.clone();
        Self { item, image_url }
    }
}

/// Campos vindos do formulário multipart; `None` significa "não enviado".
#[derive(Debug, Default, Clone)]
pub struct MenuItemInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub in_stock: Option<bool>,
    pub is_published: Option<bool>,
    pub is_veg: Option<bool>,
}

/// Dados já validados para inserir um item novo.
#[derive(Debug, Clone)]
pub struct NewMenuItem {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub image: String,
    pub in_stock: bool,
    pub is_published: bool,
    pub is_veg: bool,
}

/// Formulário multipart do cardápio. Tudo chega como texto; `image` é o arquivo opcional.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemForm {
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(example = "12.50")]
    pub price: Option<String>,
    pub category: Option<String>,
    /// URL externa; tem prioridade sobre o arquivo
    pub image_url: Option<String>,
    #[schema(example = "true")]
    pub in_stock: Option<String>,
    pub is_published: Option<String>,
    pub is_veg: Option<String>,
    #[serde(skip)]
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
    #[serde(skip)]
    #[schema(ignore)]
    pub image_file_name: Option<String>,
}

fn parse_flag(field: &str, value: Option<String>) -> Result<Option<bool>, String> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some("true") | Some("1") | Some("on") => Ok(Some(true)),
        Some("false") | Some("0") | Some("off") => Ok(Some(false)),
        Some(other) => Err(format!("{} must be true or false, got '{}'", field, other)),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl MenuItemForm {
    /// Converte os campos de texto. O erro descreve o campo inválido.
    pub fn into_input(self) -> Result<MenuItemInput, String> {
        let price = match non_blank(self.price) {
            None => None,
            Some(raw) => Some(
                raw.parse::<Decimal>()
                    .map_err(|_| format!("price must be a number, got '{}'", raw))?,
            ),
        };

        Ok(MenuItemInput {
            name: non_blank(self.name),
            description: self.description,
            price,
            category: non_blank(self.category),
            image: non_blank(self.image_url),
            in_stock: parse_flag("inStock", self.in_stock)?,
            is_published: parse_flag("isPublished", self.is_published)?,
            is_veg: parse_flag("isVeg", self.is_veg)?,
        })
    }
}
