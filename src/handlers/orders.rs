// src/handlers/orders.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        i18n::I18nStore,
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{AdminOnly, AllStaff, ManagerOrAdmin, RequireRole},
    },
    models::{
        audit::AuditLogEntry,
        orders::{
            CompletedOrdersQuery, CompletedOrdersResponse, CreateOrderPayload, DineInOrderPayload,
            EditOrderPayload, HistoryQuery, ItemStatusPayload, ItemStatusResponse,
            ModifyOrderPayload, Order, OrderMessageResponse, OrderResponse, OrderType,
            OrdersResponse, PendingOrdersQuery, RecordPaymentPayload, StartCookingResponse,
        },
    },
};

// Criação compartilhada pelos endpoints de balcão
async fn place_staff_order(
    app_state: &AppState,
    locale: &Locale,
    payload: CreateOrderPayload,
    default_type: OrderType,
    forced_type: Option<OrderType>,
    message: &str,
) -> Result<(StatusCode, Json<OrderMessageResponse>), ApiError> {
    let store: &I18nStore = &app_state.i18n_store;
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(locale, store))?;

    let order = app_state
        .order_service
        .place_order(payload, default_type, forced_type, false)
        .await
        .map_err(|e| e.to_api_error(locale, store))?;

    Ok((
        StatusCode::CREATED,
        Json(OrderMessageResponse {
            message: message.to_string(),
            order,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = CreateOrderPayload,
    responses(
        (status = 201, description = "Pedido online registrado", body = OrderMessageResponse),
        (status = 400, description = "Nome ou itens ausentes"),
        (status = 404, description = "Item do cardápio não encontrado")
    )
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let order = app_state
        .order_service
        .place_order(payload, OrderType::Online, None, true)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::CREATED,
        Json(OrderMessageResponse {
            message: "Order placed".into(),
            order,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/orders/instore",
    tag = "Orders",
    request_body = CreateOrderPayload,
    responses((status = 201, description = "Pedido de balcão (tipo do corpo, padrão walk-in)", body = OrderMessageResponse)),
    security(("api_jwt" = []))
)]
pub async fn create_instore_order(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AllStaff>,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    place_staff_order(
        &app_state,
        &locale,
        payload,
        OrderType::WalkIn,
        None,
        "In-store order placed successfully",
    )
    .await
}

#[utoipa::path(
    post,
    path = "/api/orders/walkin",
    tag = "Orders",
    request_body = CreateOrderPayload,
    responses((status = 201, description = "Pedido walk-in", body = OrderMessageResponse)),
    security(("api_jwt" = []))
)]
pub async fn create_walkin_order(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AllStaff>,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    place_staff_order(
        &app_state,
        &locale,
        payload,
        OrderType::WalkIn,
        Some(OrderType::WalkIn),
        "Walk-in order placed successfully",
    )
    .await
}

#[utoipa::path(
    post,
    path = "/api/orders/togo",
    tag = "Orders",
    request_body = CreateOrderPayload,
    responses((status = 201, description = "Pedido para viagem", body = OrderMessageResponse)),
    security(("api_jwt" = []))
)]
pub async fn create_togo_order(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AllStaff>,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    place_staff_order(
        &app_state,
        &locale,
        payload,
        OrderType::ToGo,
        Some(OrderType::ToGo),
        "To-go order placed successfully",
    )
    .await
}

#[utoipa::path(
    post,
    path = "/api/orders/callin",
    tag = "Orders",
    request_body = CreateOrderPayload,
    responses((status = 201, description = "Pedido por telefone", body = OrderMessageResponse)),
    security(("api_jwt" = []))
)]
pub async fn create_callin_order(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AllStaff>,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    place_staff_order(
        &app_state,
        &locale,
        payload,
        OrderType::CallIn,
        Some(OrderType::CallIn),
        "Call-in order placed successfully",
    )
    .await
}

#[utoipa::path(
    post,
    path = "/api/orders/dinein",
    tag = "Orders",
    request_body = DineInOrderPayload,
    responses(
        (status = 201, description = "Pedido de mesa; a mesa fica ocupada", body = OrderMessageResponse),
        (status = 404, description = "Mesa não encontrada"),
        (status = 409, description = "Mesa já ocupada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_dinein_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<AllStaff>,
    Json(payload): Json<DineInOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let order = app_state
        .order_service
        .place_dine_in(payload, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::CREATED,
        Json(OrderMessageResponse {
            message: "Dine-in order placed".into(),
            order,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Orders",
    params(PendingOrdersQuery),
    responses((status = 200, description = "Pedidos pendentes, mais recentes primeiro", body = OrdersResponse)),
    security(("api_jwt" = []))
)]
pub async fn list_pending_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AllStaff>,
    Query(query): Query<PendingOrdersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = app_state
        .order_service
        .list_pending(query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(OrdersResponse { orders }))
}

#[utoipa::path(
    get,
    path = "/api/orders/completed",
    tag = "Orders",
    params(CompletedOrdersQuery),
    responses((status = 200, description = "Pedidos concluídos paginados", body = CompletedOrdersResponse)),
    security(("api_jwt" = []))
)]
pub async fn list_completed_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AllStaff>,
    Query(query): Query<CompletedOrdersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = app_state
        .order_service
        .list_completed(query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/orders/history",
    tag = "Orders",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Histórico do cliente", body = Vec<Order>),
        (status = 400, description = "Informe email ou nome"),
        (status = 404, description = "Nenhum pedido encontrado")
    )
)]
pub async fn order_history(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = app_state
        .order_service
        .history(query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(orders))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Pedido", body = OrderResponse),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AllStaff>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = app_state
        .order_service
        .get_order(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(OrderResponse { order }))
}

#[utoipa::path(
    get,
    path = "/api/orders/by-table/{table_id}",
    tag = "Orders",
    params(("table_id" = Uuid, Path, description = "ID da mesa")),
    responses(
        (status = 200, description = "Pedido ativo da mesa", body = OrderResponse),
        (status = 404, description = "Mesa livre ou inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_order_by_table(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AllStaff>,
    Path(table_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = app_state
        .order_service
        .order_for_table(table_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(OrderResponse { order }))
}

#[utoipa::path(
    get,
    path = "/api/orders/dinein/pending",
    tag = "Orders",
    responses((status = 200, description = "Pedidos de mesa pendentes", body = OrdersResponse)),
    security(("api_jwt" = []))
)]
pub async fn list_pending_dinein(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = app_state
        .order_service
        .pending_dine_in()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(OrdersResponse { orders }))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/modify",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    request_body = ModifyOrderPayload,
    responses(
        (status = 200, description = "Itens trocados e auditoria gravada", body = OrderMessageResponse),
        (status = 400, description = "Lista vazia, itemId ausente ou pedido concluído"),
        (status = 404, description = "Pedido ou item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn modify_order(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<AllStaff>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ModifyOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let order = app_state
        .order_service
        .modify_order(id, &payload.updated_items, payload.reason, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(OrderMessageResponse {
        message: "Order updated & logged".into(),
        order,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/edit",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    request_body = EditOrderPayload,
    responses(
        (status = 200, description = "Itens trocados (sem auditoria)", body = OrderMessageResponse),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn edit_order(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AllStaff>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EditOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let order = app_state
        .order_service
        .edit_order(id, &payload.items)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(OrderMessageResponse {
        message: "Order updated".into(),
        order,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/complete",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Pedido concluído; mesa liberada", body = OrderMessageResponse),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn complete_order(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AllStaff>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = app_state
        .order_service
        .complete_order(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(OrderMessageResponse {
        message: "Order marked as completed & email sent".into(),
        order,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/start-cooking",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Preparo iniciado", body = StartCookingResponse),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn start_cooking(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let started_cooking_at = app_state
        .order_service
        .start_cooking(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(StartCookingResponse {
        message: "Cooking started".into(),
        started_cooking_at,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/item/{item_id}/status",
    tag = "Orders",
    params(
        ("id" = Uuid, Path, description = "ID do pedido"),
        ("item_id" = Uuid, Path, description = "itemId do item no pedido")
    ),
    request_body = ItemStatusPayload,
    responses(
        (status = 200, description = "Status do item atualizado", body = ItemStatusResponse),
        (status = 400, description = "Status inválido"),
        (status = 404, description = "Pedido ou item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_item_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path((order_id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ItemStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let item = app_state
        .order_service
        .update_item_status(order_id, item_id, &payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(ItemStatusResponse {
        message: "Item status updated".into(),
        item,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}/pay",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    request_body = RecordPaymentPayload,
    responses(
        (status = 200, description = "Pagamento registrado", body = OrderMessageResponse),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AllStaff>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecordPaymentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let order = app_state
        .order_service
        .record_payment(id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(OrderMessageResponse {
        message: "Payment recorded successfully.".into(),
        order,
    }))
}

#[utoipa::path(
    get,
    path = "/api/orders/modifications",
    tag = "Orders",
    responses((status = 200, description = "Todas as alterações auditadas", body = Vec<AuditLogEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_modifications(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = app_state
        .order_service
        .all_modifications()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(entries))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}/modifications",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses((status = 200, description = "Alterações de um pedido", body = Vec<AuditLogEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_order_modifications(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<ManagerOrAdmin>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = app_state
        .order_service
        .order_modifications(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(entries))
}
