use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

#[derive(Debug)]
pub enum RequestError {
    /// Entity absent, or present but invisible to the viewer. The two cases
    /// must stay indistinguishable on the wire.
    NotFound,
    NotAuthorized(&'static str),
    /// Soft-fail: the denial is answered with a redirect instead of an
    /// error page.
    Redirect(String),
    RunTimeError(&'static str),
    ServerError,
    DatabaseError(sqlx::Error),
}

#[derive(serde::Serialize)]
pub struct RequestErrorJsonWrapper {
    errors: RequestErrorJson,
}

#[derive(serde::Serialize)]
pub struct RequestErrorJson {
    body: Vec<String>,
}

impl RequestErrorJsonWrapper {
    pub fn new(error: &str) -> RequestErrorJsonWrapper {
        RequestErrorJsonWrapper {
            errors: RequestErrorJson {
                body: vec![error.to_string()],
            },
        }
    }
}

impl From<sqlx::Error> for RequestError {
    fn from(value: sqlx::Error) -> Self {
        Self::DatabaseError(value)
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> axum::response::Response {
        let (status_code, json) = match self {
            RequestError::NotFound => (
                StatusCode::NOT_FOUND,
                RequestErrorJsonWrapper::new("Not Found"),
            ),
            RequestError::NotAuthorized(message) => (
                StatusCode::UNAUTHORIZED,
                RequestErrorJsonWrapper::new(message),
            ),
            RequestError::Redirect(location) => {
                return (
                    StatusCode::SEE_OTHER,
                    [(header::LOCATION, location)],
                )
                    .into_response();
            }
            RequestError::RunTimeError(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                RequestErrorJsonWrapper::new(message),
            ),
            RequestError::ServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                RequestErrorJsonWrapper::new("Internal Server Error"),
            ),
            RequestError::DatabaseError(e) => {
                tracing::error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    RequestErrorJsonWrapper::new("Internal Server Error"),
                )
            }
        };
        (status_code, Json(json)).into_response()
    }
}
