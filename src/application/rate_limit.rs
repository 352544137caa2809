use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

struct Window {
    started: Instant,
    hits: u32,
}

/// Fixed-window per-IP request limiter for the synthesis endpoint.
pub struct RateLimiter {
    windows: Mutex<HashMap<IpAddr, Window>>,
    max_per_window: u32,
    window: Duration,
}

impl RateLimiter {
    /// Allow `requests` per minute per IP.
    pub fn per_minute(requests: u32) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_per_window: requests,
            window: Duration::from_secs(60),
        }
    }

    fn check(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let window = windows.entry(ip).or_insert(Window {
            started: now,
            hits: 0,
        });

        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.hits = 0;
        }

        if window.hits < self.max_per_window {
            window.hits += 1;
            true
        } else {
            false
        }
    }
}

/// Middleware enforcing the limiter. Falls open if the client IP cannot be
/// determined (e.g. missing `ConnectInfo`).
pub async fn enforce(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip());

    if let Some(ip) = ip
        && !limiter.check(ip)
    {
        return StatusCode::TOO_MANY_REQUESTS.into_response();
    }

    next.run(request).await
}
