// src/handlers/menu.rs

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{ManagerOrAdmin, RequireRole},
    },
    models::{
        auth::MessageResponse,
        menu::{MenuItemForm, MenuItemInput, MenuItemResponse},
    },
    services::menu_service::UploadedImage,
};

// Lê o multipart inteiro: campos de texto no formulário, arquivo em `image`
async fn read_form(mut multipart: Multipart) -> Result<MenuItemForm, AppError> {
    let mut form = MenuItemForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidMultipart(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(file_name) = field.file_name().map(str::to_string) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidMultipart(e.to_string()))?;
            if name == "image" && !bytes.is_empty() {
                form.image = Some(bytes.to_vec());
                form.image_file_name = Some(file_name);
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::InvalidMultipart(e.to_string()))?;
        match name.as_str() {
            "name" => form.name = Some(value),
            "description" => form.description = Some(value),
            "price" => form.price = Some(value),
            "category" => form.category = Some(value),
            // `image` em texto é tratado como URL
            "imageUrl" | "image" => form.image_url = Some(value),
            "inStock" => form.in_stock = Some(value),
            "isPublished" => form.is_published = Some(value),
            "isVeg" => form.is_veg = Some(value),
            _ => {}
        }
    }

    Ok(form)
}

fn split_form(
    mut form: MenuItemForm,
) -> Result<(MenuItemInput, Option<UploadedImage>), AppError> {
    let upload = match (form.image.take(), form.image_file_name.take()) {
        (Some(bytes), file_name) => Some(UploadedImage {
            file_name: file_name.unwrap_or_default(),
            bytes,
        }),
        _ => None,
    };
    let input = form.into_input().map_err(AppError::InvalidMultipart)?;
    Ok((input, upload))
}

#[utoipa::path(
    get,
    path = "/api/menu",
    tag = "Menu",
    responses((status = 200, description = "Todos os itens do cardápio", body = Vec<MenuItemResponse>))
)]
pub async fn list_menu(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let items = app_state
        .menu_service
        .list_items()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let items: Vec<MenuItemResponse> = items.into_iter().map(MenuItemResponse::from).collect();
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/api/menu/{id}",
    tag = "Menu",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 200, description = "Item do cardápio", body = MenuItemResponse),
        (status = 404, description = "Item não encontrado")
    )
)]
pub async fn get_menu_item(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let item = app_state
        .menu_service
        .get_item(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(MenuItemResponse::from(item)))
}

#[utoipa::path(
    post,
    path = "/api/menu",
    tag = "Menu",
    request_body(content = MenuItemForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Item criado", body = MenuItemResponse),
        (status = 400, description = "Campos obrigatórios ausentes")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_menu_item(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<ManagerOrAdmin>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_form(multipart)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    let (input, upload) = split_form(form).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let item = app_state
        .menu_service
        .create_item(input, upload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(MenuItemResponse::from(item))))
}

#[utoipa::path(
    put,
    path = "/api/menu/{id}",
    tag = "Menu",
    params(("id" = Uuid, Path, description = "ID do item")),
    request_body(content = MenuItemForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Item atualizado", body = MenuItemResponse),
        (status = 404, description = "Item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_menu_item(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<ManagerOrAdmin>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_form(multipart)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    let (input, upload) = split_form(form).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let item = app_state
        .menu_service
        .update_item(id, input, upload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(MenuItemResponse::from(item)))
}

#[utoipa::path(
    delete,
    path = "/api/menu/{id}",
    tag = "Menu",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 200, description = "Item removido", body = MessageResponse),
        (status = 404, description = "Item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_menu_item(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<ManagerOrAdmin>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .menu_service
        .delete_item(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(MessageResponse {
        message: "Menu item deleted".into(),
    }))
}
