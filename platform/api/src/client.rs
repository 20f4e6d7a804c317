use reqwest::{Method, header};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};
use url::Url;

use crate::{ApiError, ApiResult};

/// Handle on the remote API. Cloning is cheap; clones share the connection pool.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let base =
            Url::parse(base_url).map_err(|err| ApiError::InvalidUrl(format!("{base_url}: {err}")))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!("{base_url}: not a base url")));
        }
        let http = reqwest::Client::builder()
            .build()
            .map_err(ApiError::transport)?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve path segments below the base url. Segments are percent-encoded,
    /// so a department called `R&D / Labs` stays a single segment.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(self.base.to_string()))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    pub(crate) async fn get<T>(&self, segments: &[&str], resource: &'static str) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        self.send::<(), T>(Method::GET, segments, None, resource)
            .await
    }

    pub(crate) async fn send<B, T>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
        resource: &'static str,
    ) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        debug!(%method, %url, "api request");
        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(|err| {
            warn!(%method, %url, error = %err, "api request did not complete");
            ApiError::transport(err)
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(ApiError::transport)?;
        if !status.is_success() {
            let message = error_message(status.as_u16(), &bytes);
            warn!(%method, %url, status = status.as_u16(), %message, "api request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        decode_body(&bytes, resource)
    }
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

fn error_message(status: u16, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("request failed with status {status}"))
}

/// Empty bodies (204 on delete) decode as JSON `null`, which satisfies `()`
/// and `Option<_>` targets.
pub(crate) fn decode_body<T>(bytes: &[u8], resource: &'static str) -> ApiResult<T>
where
    T: DeserializeOwned,
{
    let payload: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        bytes
    };
    serde_json::from_slice(payload).map_err(|err| ApiError::decode(resource, err))
}
