// src/web/extractors.rs
use crate::error::AppError;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// `Json<T>` que também corre as regras do `validator`.
/// Corpo malformado ou regra falhada dão `AppError::Validation` (400).
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;

        value.validate().map_err(|e| {
            // Devolve a primeira mensagem de erro encontrada
            let mensagem = e
                .field_errors()
                .values()
                .next()
                .and_then(|erros| erros.first())
                .and_then(|erro| erro.message.as_ref())
                .map(|msg| msg.to_string())
                .unwrap_or_else(|| "Dados inválidos".to_string());
            AppError::validation(mensagem)
        })?;

        Ok(ValidatedJson(value))
    }
}

/// `axum::extract::Path` cuja rejeição sai no envelope de erro da API.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct Path<T>(pub T);

/// `axum::extract::Query` cuja rejeição sai no envelope de erro da API.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);
