//! HTTP transport over the browser Fetch API.
//!
//! Listing requests are raced against a timeout; downloads are not.

use async_trait::async_trait;
use js_sys::{Array, Promise, Uint8Array};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

use filete_core::{ApiRequest, FetchError, HttpResponse, HttpTransport};

use crate::config::LISTING_TIMEOUT_MS;

/// Response headers copied into [`HttpResponse`].
const FORWARDED_HEADERS: &[&str] = &["content-type", "content-length"];

// =============================================================================
// Promise Racing Utilities
// =============================================================================

/// Result of a promise race with timeout.
#[derive(Debug)]
pub enum RaceResult {
    /// The promise completed before timeout.
    Completed(JsValue),
    /// Timeout occurred before promise completed.
    TimedOut,
    /// Promise rejected with an error.
    Error(String),
}

/// Race a promise against a timeout.
///
/// # Returns
/// * `RaceResult::Completed` if promise resolves before timeout
/// * `RaceResult::TimedOut` if timeout occurs first
/// * `RaceResult::Error` if promise rejects
pub async fn race_with_timeout(promise: Promise, timeout_ms: i32) -> RaceResult {
    let Some(window) = web_sys::window() else {
        return RaceResult::Error("Window not available".to_string());
    };

    // Create timeout promise that resolves to undefined
    let timeout_promise = Promise::new(&mut |resolve, _| {
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, timeout_ms);
    });

    let race_array = Array::new();
    race_array.push(&promise);
    race_array.push(&timeout_promise);
    let race_promise = Promise::race(&race_array);

    match JsFuture::from(race_promise).await {
        Ok(result) => {
            if result.is_undefined() {
                RaceResult::TimedOut
            } else {
                RaceResult::Completed(result)
            }
        }
        Err(e) => RaceResult::Error(js_error_message(&e)),
    }
}

fn js_error_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| "Unknown error".to_string())
}

// =============================================================================
// Transport
// =============================================================================

/// [`HttpTransport`] backed by `window.fetch`.
#[derive(Clone, Copy, Debug)]
pub struct FetchTransport {
    timeout_ms: i32,
}

impl FetchTransport {
    pub fn new() -> Self {
        Self {
            timeout_ms: LISTING_TIMEOUT_MS,
        }
    }
}

impl Default for FetchTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl HttpTransport for FetchTransport {
    async fn get(&self, request: ApiRequest) -> Result<HttpResponse, FetchError> {
        let window = web_sys::window().ok_or(FetchError::NoWindow)?;

        let headers = Headers::new().map_err(|_| FetchError::RequestCreationFailed)?;
        headers
            .set("Authorization", &request.authorization)
            .map_err(|_| FetchError::RequestCreationFailed)?;

        let opts = RequestInit::new();
        opts.set_method("GET");
        opts.set_mode(RequestMode::Cors);
        opts.set_headers(&headers);

        let js_request = Request::new_with_str_and_init(&request.url, &opts)
            .map_err(|_| FetchError::RequestCreationFailed)?;
        let fetch_promise = window.fetch_with_request(&js_request);

        let result = if request.timeout {
            match race_with_timeout(fetch_promise, self.timeout_ms).await {
                RaceResult::Completed(value) => value,
                RaceResult::TimedOut => return Err(FetchError::Timeout),
                RaceResult::Error(msg) => return Err(FetchError::Network(msg)),
            }
        } else {
            JsFuture::from(fetch_promise)
                .await
                .map_err(|e| FetchError::Network(js_error_message(&e)))?
        };

        let resp: Response = result.dyn_into().map_err(|_| FetchError::InvalidContent)?;
        read_response(resp).await
    }
}

async fn read_response(resp: Response) -> Result<HttpResponse, FetchError> {
    let mut response = HttpResponse::new(resp.status(), Vec::<u8>::new());

    let resp_headers = resp.headers();
    for name in FORWARDED_HEADERS {
        if let Ok(Some(value)) = resp_headers.get(name) {
            response = response.with_header(name, &value);
        }
    }

    let buffer = JsFuture::from(
        resp.array_buffer()
            .map_err(|_| FetchError::ResponseReadFailed)?,
    )
    .await
    .map_err(|_| FetchError::ResponseReadFailed)?;
    response.body = Uint8Array::new(&buffer).to_vec();

    Ok(response)
}
