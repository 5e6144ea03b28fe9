//! Sliding-window rate limiting keyed by client IP.
//!
//! Guards the transaction submission route. The client address comes from
//! axum's [`ConnectInfo`]; requests without it (e.g. in-process tests) share
//! a single bucket.

use std::{
  collections::{HashMap, VecDeque},
  net::{IpAddr, Ipv4Addr, SocketAddr},
  sync::Arc,
  time::{Duration, Instant},
};

use axum::{
  extract::{ConnectInfo, Request, State},
  middleware::Next,
  response::{IntoResponse, Response},
};
use tokio::sync::Mutex;

use crate::error::ApiError;

/// Stale clients are not swept until at least this many are tracked.
const SWEEP_FLOOR: usize = 10_000;

struct Hits {
  clients:  HashMap<IpAddr, VecDeque<Instant>>,
  /// Sweep once the map reaches this size; doubles the survivors after each
  /// sweep so the cost is amortised over the growth.
  sweep_at: usize,
}

pub struct RateLimiter {
  max_requests: usize,
  window:       Duration,
  sweep_floor:  usize,
  hits:         Mutex<Hits>,
}

impl RateLimiter {
  pub fn new(max_requests: usize, window: Duration) -> Self {
    Self::with_sweep_floor(max_requests, window, SWEEP_FLOOR)
  }

  fn with_sweep_floor(max_requests: usize, window: Duration, sweep_floor: usize) -> Self {
    Self {
      max_requests,
      window,
      sweep_floor,
      hits: Mutex::new(Hits { clients: HashMap::new(), sweep_at: sweep_floor }),
    }
  }

  /// Record a hit for `client` at `now`. Returns `false` if the client has
  /// already used up its allowance within the window; rejected hits are not
  /// recorded.
  pub async fn check_at(&self, client: IpAddr, now: Instant) -> bool {
    let mut hits = self.hits.lock().await;

    if hits.clients.len() >= hits.sweep_at {
      hits.clients.retain(|_, times| {
        times
          .back()
          .is_some_and(|last| now.duration_since(*last) < self.window)
      });
      let survivors = hits.clients.len();
      hits.sweep_at = self.sweep_floor.max(survivors * 2);
    }

    let times = hits.clients.entry(client).or_default();
    while times
      .front()
      .is_some_and(|first| now.duration_since(*first) >= self.window)
    {
      times.pop_front();
    }

    if times.len() >= self.max_requests {
      return false;
    }
    times.push_back(now);
    true
  }

  pub async fn check(&self, client: IpAddr) -> bool { self.check_at(client, Instant::now()).await }
}

fn client_ip(req: &Request) -> IpAddr {
  req
    .extensions()
    .get::<ConnectInfo<SocketAddr>>()
    .map(|ConnectInfo(addr)| addr.ip())
    .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Middleware for `axum::middleware::from_fn_with_state`.
pub async fn limit(
  State(limiter): State<Arc<RateLimiter>>,
  req: Request,
  next: Next,
) -> Response {
  let client = client_ip(&req);
  if !limiter.check(client).await {
    tracing::warn!(%client, "rate limit exceeded");
    return ApiError::TooManyRequests.into_response();
  }
  next.run(req).await
}

#[cfg(test)]
mod tests {
  use super::*;

  const CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7));
  const OTHER: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 8));

  #[tokio::test]
  async fn allows_up_to_max_within_window() {
    let limiter = RateLimiter::new(2, Duration::from_secs(60));
    let t0 = Instant::now();
    assert!(limiter.check_at(CLIENT, t0).await);
    assert!(limiter.check_at(CLIENT, t0 + Duration::from_secs(1)).await);
    assert!(!limiter.check_at(CLIENT, t0 + Duration::from_secs(2)).await);
    // Other clients have their own window.
    assert!(limiter.check_at(OTHER, t0 + Duration::from_secs(2)).await);
  }

  #[tokio::test]
  async fn window_slides() {
    let limiter = RateLimiter::new(2, Duration::from_secs(60));
    let t0 = Instant::now();
    assert!(limiter.check_at(CLIENT, t0).await);
    assert!(limiter.check_at(CLIENT, t0 + Duration::from_secs(30)).await);
    assert!(!limiter.check_at(CLIENT, t0 + Duration::from_secs(59)).await);
    // The first hit has aged out; the second has not.
    assert!(limiter.check_at(CLIENT, t0 + Duration::from_secs(60)).await);
    assert!(!limiter.check_at(CLIENT, t0 + Duration::from_secs(61)).await);
  }

  fn ip(n: u8) -> IpAddr { IpAddr::V4(Ipv4Addr::new(10, 0, 1, n)) }

  #[tokio::test]
  async fn stale_clients_are_swept_and_the_next_sweep_backs_off() {
    let limiter = RateLimiter::with_sweep_floor(5, Duration::from_secs(60), 3);
    let t0 = Instant::now();
    for n in 0..3 {
      assert!(limiter.check_at(ip(n), t0).await);
    }

    // The map is at the threshold and every entry has aged out.
    let later = t0 + Duration::from_secs(120);
    assert!(limiter.check_at(ip(10), later).await);
    {
      let hits = limiter.hits.lock().await;
      assert_eq!(hits.clients.len(), 1);
      assert_eq!(hits.sweep_at, 3);
    }

    // Live clients survive, and the threshold moves past them.
    assert!(limiter.check_at(ip(11), later).await);
    assert!(limiter.check_at(ip(12), later).await);
    assert!(limiter.check_at(ip(13), later).await);
    let hits = limiter.hits.lock().await;
    assert_eq!(hits.clients.len(), 4);
    assert_eq!(hits.sweep_at, 6);
  }
}
