//! `gloo-net` transport for the request client.
//!
//! Client-side (hydrate): real `fetch` calls.
//! Server-side (SSR): every send fails, since no request is ever issued while
//! rendering on the server.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;

use session::{HttpRequest, HttpResponse, Transport, TransportError};

/// Stateless handle; the browser owns the connection pool.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlooTransport;

impl Transport for GlooTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        #[cfg(feature = "hydrate")]
        {
            fetch(request).await
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Err(unavailable(&request))
        }
    }
}

#[cfg(any(test, not(feature = "hydrate")))]
fn unavailable(request: &HttpRequest) -> TransportError {
    TransportError::new(format!(
        "{} {}: HTTP is only available in the browser",
        request.method.as_str(),
        request.url
    ))
}

#[cfg(feature = "hydrate")]
async fn fetch(request: HttpRequest) -> Result<HttpResponse, TransportError> {
    use gloo_net::http::Request;
    use session::Method;

    let mut builder = match request.method {
        Method::Get => Request::get(&request.url),
        Method::Post => Request::post(&request.url),
        Method::Put => Request::put(&request.url),
        Method::Delete => Request::delete(&request.url),
    };
    if let Some(authorization) = &request.authorization {
        builder = builder.header("Authorization", authorization);
    }
    let prepared = match &request.body {
        Some(body) => builder.json(body),
        None => builder.build(),
    }
    .map_err(|e| TransportError::new(e.to_string()))?;

    let response = prepared
        .send()
        .await
        .map_err(|e| TransportError::new(e.to_string()))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| TransportError::new(e.to_string()))?;
    Ok(HttpResponse { status, body })
}
