//! API request helpers

use axum::extract::FromRequest;
use axum::extract::FromRequestParts;
use axum::extract::Json;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::Request;
use axum::extract::rejection::JsonRejection;
use axum::extract::rejection::PathRejection;
use axum::extract::rejection::QueryRejection;
use axum::http::request::Parts;
use serde::Deserialize;
use serde::Deserializer;
use serde::de::DeserializeOwned;
use url::Url;

use super::Error;

/// Parse and validate a URL
///
/// ```rust
/// let url = "https://www.example.com/";
/// assert!(parse_url(url).is_ok())
/// ```
pub fn parse_url<I>(url: I) -> Result<Url, Error>
where
    I: AsRef<str>,
{
    Url::parse(url.as_ref()).map_err(|err| Error::bad_request("Invalid URL").with_details(err))
}

fn parse_json<J>(json: Result<Json<J>, JsonRejection>) -> Result<J, Error> {
    match json {
        Ok(Json(json)) => Ok(json),
        Err(err) => match err {
            JsonRejection::JsonDataError(err) => {
                Err(Error::bad_request("Data error").with_details(err.body_text()))
            }
            JsonRejection::JsonSyntaxError(err) => {
                let details = std::error::Error::source(&err)
                    .map_or_else(|| err.body_text(), ToString::to_string);

                Err(Error::bad_request("JSON syntax error").with_details(details))
            }
            JsonRejection::MissingJsonContentType(_err) => Err(Error::bad_request(
                "Missing `application/json` content type",
            )),
            JsonRejection::BytesRejection(err) => {
                Err(Error::bad_request("Invalid characters in JSON").with_details(err))
            }
            err => Err(Error::bad_request("Unknown JSON error").with_details(err)),
        },
    }
}

/// Wrapper for the JSON extractor
pub struct Form<F>(pub F);

impl<S, F> FromRequest<S> for Form<F>
where
    S: Send + Sync,
    F: DeserializeOwned,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        parse_json(Json::<F>::from_request(req, state).await).map(Form)
    }
}

fn parse_path<P>(path: Result<Path<P>, PathRejection>) -> Result<P, Error> {
    match path {
        Ok(Path(path)) => Ok(path),
        Err(err) => match err {
            PathRejection::FailedToDeserializePathParams(err) => {
                Err(Error::bad_request("Invalid path parameter").with_details(err.body_text()))
            }
            PathRejection::MissingPathParams(err) => {
                Err(Error::bad_request("Missing path parameter").with_details(err))
            }
            err => Err(Error::bad_request("Unknown path error").with_details(err)),
        },
    }
}

/// Wrapper for the path extractor
pub struct PathParameters<P>(pub P);

impl<S, P> FromRequestParts<S> for PathParameters<P>
where
    S: Send + Sync,
    P: DeserializeOwned + Send,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        parse_path(Path::<P>::from_request_parts(parts, state).await).map(PathParameters)
    }
}

/// Wrapper for the query string extractor
pub struct QueryParameters<Q>(pub Q);

impl<S, Q> FromRequestParts<S> for QueryParameters<Q>
where
    S: Send + Sync,
    Q: DeserializeOwned,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<Q>::from_request_parts(parts, state).await {
            Ok(Query(query)) => Ok(QueryParameters(query)),
            Err(QueryRejection::FailedToDeserializeQueryString(err)) => {
                Err(Error::bad_request("Invalid query parameter").with_details(err.body_text()))
            }
            Err(err) => Err(Error::bad_request("Unknown query error").with_details(err)),
        }
    }
}

/// A field of a PATCH body
///
/// Tells apart a field that is left out from a field that is explicitly `null`. Use with
/// `#[serde(default)]` so a missing field becomes [`Patch::Missing`].
#[derive(Clone, Debug, PartialEq)]
pub enum Patch<T> {
    /// Not provided, leave the field untouched
    Missing,

    /// Provided as `null`, clear the field
    Null,

    /// Provided with a value
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Missing
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|value| value.map_or(Patch::Null, Patch::Value))
    }
}

impl<T> Patch<T> {
    /// For a field that can not be cleared, `null` is rejected
    pub fn required(self, field: &str) -> Result<Option<T>, Error> {
        match self {
            Patch::Missing => Ok(None),
            Patch::Null => {
                Err(Error::bad_request("Invalid field")
                    .with_details(format!("`{field}` can not be null")))
            }
            Patch::Value(value) => Ok(Some(value)),
        }
    }

    /// For a field that can be cleared, `Some(None)` clears it
    pub fn nullable(self) -> Option<Option<T>> {
        match self {
            Patch::Missing => None,
            Patch::Null => Some(None),
            Patch::Value(value) => Some(Some(value)),
        }
    }
}
