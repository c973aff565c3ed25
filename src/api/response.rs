//! API response helpers
//!
//! Every response body is an envelope: `{ "ok": true, "<key>": data }` on success,
//! `{ "ok": false, "error": "...", "details": "..." }` on failure.

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;
use serde::Serializer;
use serde::ser::SerializeMap;

/// Hold data for a successful API interaction
pub struct Success<V>
where
    V: Serialize,
{
    status_code: StatusCode,
    key: &'static str,
    data: Option<V>,
}

impl<V> Success<V>
where
    V: Serialize,
{
    pub fn ok(key: &'static str, data: V) -> Self {
        Self {
            status_code: StatusCode::OK,
            key,
            data: Some(data),
        }
    }

    pub fn created(key: &'static str, data: V) -> Self {
        Self {
            status_code: StatusCode::CREATED,
            key,
            data: Some(data),
        }
    }
}

impl Success<()> {
    /// Acknowledge without data, like after a delete
    pub fn done() -> Self {
        Self {
            status_code: StatusCode::OK,
            key: "",
            data: None,
        }
    }
}

/// The success envelope
struct Envelope<'a, V> {
    key: &'static str,
    data: Option<&'a V>,
}

impl<V> Serialize for Envelope<'_, V>
where
    V: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;

        map.serialize_entry("ok", &true)?;

        if let Some(data) = self.data {
            map.serialize_entry(self.key, data)?;
        }

        map.end()
    }
}

impl<V> IntoResponse for Success<V>
where
    V: Serialize,
{
    fn into_response(self) -> Response {
        let envelope = Envelope {
            key: self.key,
            data: self.data.as_ref(),
        };

        (self.status_code, Json(envelope)).into_response()
    }
}

/// Hold data for a failed API interaction
#[derive(Debug)]
pub struct Error {
    status_code: StatusCode,
    message: String,
    details: Option<String>,
}

impl Error {
    pub fn bad_request<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code: StatusCode::BAD_REQUEST,
            message: message.to_string(),
            details: None,
        }
    }

    pub fn forbidden<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code: StatusCode::FORBIDDEN,
            message: message.to_string(),
            details: None,
        }
    }

    pub fn not_found<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code: StatusCode::NOT_FOUND,
            message: message.to_string(),
            details: None,
        }
    }

    /// Something went wrong on our side
    ///
    /// The cause is logged, not exposed
    pub fn internal_server_error<M>(cause: M) -> Self
    where
        M: ToString,
    {
        tracing::error!("Internal server error: {}", cause.to_string());

        Self {
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal server error".to_string(),
            details: None,
        }
    }

    pub fn with_details<M>(self, details: M) -> Self
    where
        M: ToString,
    {
        Self {
            details: Some(details.to_string()),
            ..self
        }
    }
}

#[derive(Serialize)]
struct ErrorEnvelope {
    ok: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (
            self.status_code,
            Json(ErrorEnvelope {
                ok: false,
                error: self.message,
                details: self.details,
            }),
        )
            .into_response()
    }
}
