// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::Role,
};

/// Lista de cargos aceitos por uma rota.
pub trait RoleSet: Send + Sync + 'static {
    fn allowed() -> &'static [Role];
}

/// Guardião: rejeita com 403 quem não tem um dos cargos do `RoleSet`.
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleSet,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_request_parts(parts, state)
            .await
            .unwrap_or_default();

        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::MissingToken.to_api_error(&locale, &app_state.i18n_store))?;

        if !T::allowed().contains(&user.role) {
            return Err(AppError::AccessDenied(user.role.as_str().to_string())
                .to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// CONJUNTOS DE CARGOS
// ---

pub struct AllStaff;
impl RoleSet for AllStaff {
    fn allowed() -> &'static [Role] {
        &[Role::Waiter, Role::Manager, Role::Admin]
    }
}

pub struct ManagerOrAdmin;
impl RoleSet for ManagerOrAdmin {
    fn allowed() -> &'static [Role] {
        &[Role::Manager, Role::Admin]
    }
}

pub struct AdminOnly;
impl RoleSet for AdminOnly {
    fn allowed() -> &'static [Role] {
        &[Role::Admin]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_sets() {
        assert!(AllStaff::allowed().contains(&Role::Waiter));
        assert!(!ManagerOrAdmin::allowed().contains(&Role::Waiter));
        assert!(ManagerOrAdmin::allowed().contains(&Role::Manager));
        assert_eq!(AdminOnly::allowed(), &[Role::Admin]);
    }
}
