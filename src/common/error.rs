use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::order::OrderStatus;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Rejeitado ANTES de qualquer acesso ao banco.
    #[error("Parâmetro inválido: {0}")]
    InvalidParameter(String),

    #[error("Coordenada inválida: {0}")]
    InvalidCoordinate(String),

    #[error("Local não encontrado")]
    VenueNotFound,

    #[error("Sala não encontrada")]
    RoomNotFound,

    #[error("Pacote não encontrado")]
    PackageNotFound,

    #[error("Pedido não encontrado")]
    OrderNotFound,

    // Conflito detectado pela re-verificação dentro da transação.
    #[error("O recurso já está reservado no período solicitado")]
    ResourceConflict,

    #[error("Addon inválido ou indisponível para este recurso: {0}")]
    InvalidAddon(i64),

    #[error("Transição de status inválida: {from} -> {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    // Só chega ao cliente se TODOS os retries internos colidirem.
    #[error("Colisão de referência de reserva")]
    DuplicateReference,

    // Falha transitória de infraestrutura; o cliente pode repetir.
    #[error("Banco de dados indisponível")]
    StoreUnavailable,

    #[error("Erro de banco de dados")]
    DatabaseError(sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

// Conversão manual (sem #[from]) para desviar falhas de pool/conexão para
// StoreUnavailable: toda chamada ao banco tem timeout de aquisição, e o
// cliente precisa distinguir "tente de novo" de erro permanente.
impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::StoreUnavailable
            }
            other => AppError::DatabaseError(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::InvalidParameter(ref msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidCoordinate(ref msg) => (StatusCode::BAD_REQUEST, msg.clone()),

            AppError::VenueNotFound => (StatusCode::NOT_FOUND, "Local não encontrado.".into()),
            AppError::RoomNotFound => (StatusCode::NOT_FOUND, "Sala não encontrada.".into()),
            AppError::PackageNotFound => (StatusCode::NOT_FOUND, "Pacote não encontrado.".into()),
            AppError::OrderNotFound => (StatusCode::NOT_FOUND, "Pedido não encontrado.".into()),

            AppError::ResourceConflict => (
                StatusCode::CONFLICT,
                "O recurso já está reservado no período solicitado.".into(),
            ),
            AppError::InvalidStatusTransition { from, to } => (
                StatusCode::CONFLICT,
                format!("Transição de status inválida: {from} -> {to}."),
            ),
            AppError::DuplicateReference => (
                StatusCode::CONFLICT,
                "Não foi possível gerar uma referência de reserva única.".into(),
            ),

            AppError::InvalidAddon(id) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Addon inválido ou indisponível para este recurso: {id}."),
            ),

            AppError::StoreUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Banco de dados indisponível. Tente novamente.".into(),
            ),

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada; o cliente vê algo opaco.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".into(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

// Contrato erro -> HTTP: cada variante tem status e corpo estáveis. Não
// precisa de servidor; chama IntoResponse direto no valor.
#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    #[tokio::test]
    async fn parametro_invalido_vira_400() {
        let (status, json) =
            error_to_response(AppError::InvalidParameter("janela inválida".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "janela inválida");
    }

    #[tokio::test]
    async fn coordenada_invalida_vira_400() {
        let (status, _) =
            error_to_response(AppError::InvalidCoordinate("latitude 91".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn nao_encontrado_vira_404() {
        for err in [
            AppError::VenueNotFound,
            AppError::RoomNotFound,
            AppError::PackageNotFound,
            AppError::OrderNotFound,
        ] {
            let (status, _) = error_to_response(err).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn conflito_de_reserva_vira_409() {
        let (status, json) = error_to_response(AppError::ResourceConflict).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            json["error"],
            "O recurso já está reservado no período solicitado."
        );
    }

    #[tokio::test]
    async fn transicao_invalida_vira_409() {
        let (status, json) = error_to_response(AppError::InvalidStatusTransition {
            from: OrderStatus::Confirmed,
            to: OrderStatus::Cancelled,
        })
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            json["error"],
            "Transição de status inválida: confirmed -> cancelled."
        );
    }

    #[tokio::test]
    async fn addon_invalido_vira_422() {
        let (status, json) = error_to_response(AppError::InvalidAddon(42)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            json["error"],
            "Addon inválido ou indisponível para este recurso: 42."
        );
    }

    #[tokio::test]
    async fn banco_indisponivel_vira_503() {
        let (status, _) = error_to_response(AppError::StoreUnavailable).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn timeout_de_pool_vira_store_unavailable() {
        let err: AppError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, AppError::StoreUnavailable));

        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::DatabaseError(_)));
    }

    #[tokio::test]
    async fn erro_interno_nao_vaza_detalhes() {
        let (status, json) =
            error_to_response(AppError::InternalServerError(anyhow::anyhow!(
                "segredo interno"
            )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Ocorreu um erro inesperado.");
    }

    #[tokio::test]
    async fn erro_de_validacao_detalha_os_campos() {
        let mut errors = validator::ValidationErrors::new();
        let mut field_err = validator::ValidationError::new("range");
        field_err.message = Some("O número de participantes deve ser positivo.".into());
        errors.add("delegates", field_err);

        let (status, json) = error_to_response(AppError::ValidationError(errors)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Um ou mais campos são inválidos.");
        assert_eq!(
            json["details"]["delegates"][0],
            "O número de participantes deve ser positivo."
        );
    }
}
