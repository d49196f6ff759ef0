use anyhow::{bail, Result};
use embedded_svc::http::client::Client;
use embedded_svc::http::Method;
use embedded_svc::io::{Read, Write};
use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
use log::debug;
use std::sync::{Mutex, OnceLock};

const TIMEOUT_MS: u64 = 15_000;
const MAX_RESPONSE_SIZE: usize = 16_384;

// One response buffer for the whole firmware, allocated at first use
// and reused afterwards.  All HTTP calls are serialized through its
// mutex, so a second request can never grow the heap mid-flight.
static BODY_BUF: OnceLock<Mutex<Vec<u8>>> = OnceLock::new();

fn body_buf() -> &'static Mutex<Vec<u8>> {
    BODY_BUF.get_or_init(|| Mutex::new(Vec::with_capacity(MAX_RESPONSE_SIZE)))
}

fn make_config() -> Configuration {
    Configuration {
        timeout: Some(std::time::Duration::from_millis(TIMEOUT_MS)),
        use_global_ca_store: true,
        crt_bundle_attach: Some(esp_idf_sys::esp_crt_bundle_attach),
        ..Default::default()
    }
}

/// Run the request and stream the response body into `buf`.
///
/// Separated into its own function so that the large stack frame
/// (EspHttpConnection, Client, Response, chunk[1024]) is fully popped
/// off the stack before the caller invokes the parse callback.  In
/// debug builds inner scopes do NOT shrink the frame — only a
/// function return does.
fn http_fetch_into(
    method: Method,
    url: &str,
    headers: &[(&str, &str)],
    payload: Option<&[u8]>,
    buf: &mut Vec<u8>,
) -> Result<()> {
    let connection = EspHttpConnection::new(&make_config())?;
    let mut client = Client::wrap(connection);
    let mut request = client.request(method, url, headers)?;
    if let Some(payload) = payload {
        request.write_all(payload)?;
    }
    let response = request.submit()?;

    let status = response.status();
    debug!(
        "HTTP {:?} {} -> status {}",
        method,
        url.chars().take(80).collect::<String>(),
        status
    );

    if status == 429 {
        bail!("rate limited (HTTP 429)");
    }
    if status != 200 {
        bail!("HTTP error: status {}", status);
    }

    let mut chunk = [0u8; 1024];
    let mut reader = response;
    loop {
        let n = reader.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        if buf.len() + n > MAX_RESPONSE_SIZE {
            bail!("response too large (>{}B)", MAX_RESPONSE_SIZE);
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    Ok(())
} // connection, client, reader, chunk[1024] all freed here

/// HTTPS GET; the whole body lands in the pooled buffer, then `f`
/// parses a `&str` view of it.
pub fn https_get_json<T, F>(url: &str, headers: &[(&str, &str)], f: F) -> Result<T>
where
    F: FnOnce(&str) -> Result<T>,
{
    request_json(Method::Get, url, headers, None, f)
}

/// HTTPS POST with a request body; same buffer discipline as
/// [`https_get_json`].
pub fn https_post_json<T, F>(
    url: &str,
    headers: &[(&str, &str)],
    payload: &[u8],
    f: F,
) -> Result<T>
where
    F: FnOnce(&str) -> Result<T>,
{
    request_json(Method::Post, url, headers, Some(payload), f)
}

fn request_json<T, F>(
    method: Method,
    url: &str,
    headers: &[(&str, &str)],
    payload: Option<&[u8]>,
    f: F,
) -> Result<T>
where
    F: FnOnce(&str) -> Result<T>,
{
    let mut body = body_buf()
        .lock()
        .map_err(|_| anyhow::anyhow!("HTTP body-buf lock poisoned"))?;
    body.clear();

    http_fetch_into(method, url, headers, payload, &mut body)?;

    let text = std::str::from_utf8(&body)
        .map_err(|e| anyhow::anyhow!("HTTP response not UTF-8: {}", e))?;
    if !text.trim_start().starts_with('{') {
        bail!("response is not JSON");
    }

    f(text)
}
