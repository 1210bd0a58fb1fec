use actix_multipart::Multipart;
use actix_web::{
    dev::Payload,
    http::header::CONTENT_TYPE,
    web::{Bytes, BytesMut},
    FromRequest, HttpRequest,
};
use futures_util::{future::LocalBoxFuture, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::errors::AppError;

pub const DEFAULT_PAYLOAD_LIMIT: usize = 64 * 1024;

/// Upper bound for a form body, registered as app data.
#[derive(Debug, Clone, Copy)]
pub struct PayloadLimit(pub usize);

/// Browser form body: `application/x-www-form-urlencoded` or `multipart/form-data`.
/// Usage: Add `form: FormBody<ContactPayload>` as a parameter to your handler function.
#[derive(Debug)]
pub struct FormBody<T>(pub T);

/// Like `FormBody`, but `application/json` is accepted as well.
#[derive(Debug)]
pub struct FormOrJsonBody<T>(pub T);

impl<T> FromRequest for FormBody<T>
where
    T: DeserializeOwned + 'static,
{
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        let payload = payload.take();
        Box::pin(async move { read_fields(req, payload, false).await.map(FormBody) })
    }
}

impl<T> FromRequest for FormOrJsonBody<T>
where
    T: DeserializeOwned + 'static,
{
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        let payload = payload.take();
        Box::pin(async move { read_fields(req, payload, true).await.map(FormOrJsonBody) })
    }
}

async fn read_fields<T>(req: HttpRequest, payload: Payload, accept_json: bool) -> Result<T, AppError>
where
    T: DeserializeOwned,
{
    let limit = req
        .app_data::<PayloadLimit>()
        .map(|l| l.0)
        .unwrap_or(DEFAULT_PAYLOAD_LIMIT);

    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();

    let result = if content_type.starts_with("multipart/form-data") {
        match read_multipart(&req, payload, limit).await {
            Ok(pairs) => decode_pairs(pairs),
            Err(e) => Err(e),
        }
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        match read_bytes(payload, limit).await {
            Ok(body) => decode_pairs(url::form_urlencoded::parse(&body).into_owned()),
            Err(e) => Err(e),
        }
    } else if accept_json && content_type.contains("application/json") {
        match read_bytes(payload, limit).await {
            Ok(body) => serde_json::from_slice(&body).map_err(AppError::from),
            Err(e) => Err(e),
        }
    } else {
        Err(AppError::InternalError(format!("Unsupported content type: {:?}", content_type)))
    };

    result.inspect_err(|e| match e {
        AppError::PayloadTooLarge => tracing::debug!(path = %req.path(), limit, "Submission body over the ceiling"),
        _ => tracing::error!(path = %req.path(), "Could not read submission: {}", e),
    })
}

async fn read_bytes(mut payload: Payload, limit: usize) -> Result<Bytes, AppError> {
    let mut body = BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk?;
        if body.len() + chunk.len() > limit {
            return Err(AppError::PayloadTooLarge);
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}

/// Text parts of a multipart body; file parts are drained and dropped.
async fn read_multipart(req: &HttpRequest, payload: Payload, limit: usize) -> Result<Vec<(String, String)>, AppError> {
    let mut multipart = Multipart::new(req.headers(), payload);
    let mut pairs = Vec::new();
    let mut total = 0usize;

    while let Some(mut field) = multipart.try_next().await? {
        let name = field.name().map(str::to_owned);
        let is_file = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .is_some();

        let mut value = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            total += chunk.len();
            if total > limit {
                return Err(AppError::PayloadTooLarge);
            }
            if !is_file {
                value.extend_from_slice(&chunk);
            }
        }

        if let (Some(name), false) = (name, is_file) {
            pairs.push((name, String::from_utf8_lossy(&value).into_owned()));
        }
    }

    Ok(pairs)
}

/// First occurrence of a key wins, like `FormData.get`.
fn decode_pairs<T, I>(pairs: I) -> Result<T, AppError>
where
    T: DeserializeOwned,
    I: IntoIterator<Item = (String, String)>,
{
    let mut fields = Map::new();
    for (key, value) in pairs {
        fields.entry(key).or_insert(Value::String(value));
    }
    Ok(serde_json::from_value(Value::Object(fields))?)
}
