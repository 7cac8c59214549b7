//! Bounded HTTP GET over curl.
//!
//! Each hop runs one request with a header callback (status line and
//! declared length) and a write callback (running byte budget). Redirects are
//! not followed by curl; every `Location` target goes back through the
//! validator before the next hop.

use super::error::reason_phrase;
use super::pin::resolve_pinned;
use super::{DownloadError, DownloadOptions};
use crate::url_guard::{self, HostPolicy, Rejection};
use std::cell::RefCell;
use std::io::{self, Write};
use std::str;
use std::time::{Duration, Instant};
use url::Url;

/// Client label sent with every request.
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; Tapestry/1.0)";

/// Receive buffer size; the write callback sees at most this many bytes.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Redirect hops followed before giving up.
pub const MAX_REDIRECTS: u32 = 5;

/// Why a callback stopped the transfer.
enum Abort {
    Declared(u64),
    Exceeded,
    NotSuccess,
    Write(io::Error),
}

#[derive(Default)]
struct ResponseState {
    status: u32,
    reason: String,
    received: u64,
    abort: Option<Abort>,
}

enum Hop {
    Done(u64),
    Redirect(Url),
}

/// Streams `url` into `sink` under the byte and time budgets of `opts`.
/// Returns the number of body bytes written.
pub(crate) fn fetch_into<W: Write>(
    url: Url,
    sink: &mut W,
    opts: &DownloadOptions,
) -> Result<u64, DownloadError> {
    let deadline = Instant::now() + opts.timeout;
    let mut current = url;
    let mut redirects = 0u32;
    loop {
        match fetch_hop(&current, sink, opts, deadline)? {
            Hop::Done(n) => return Ok(n),
            Hop::Redirect(next) => {
                redirects += 1;
                if redirects > MAX_REDIRECTS {
                    return Err(DownloadError::NetworkError(format!(
                        "too many redirects (max {MAX_REDIRECTS})"
                    )));
                }
                tracing::debug!(from = %current, to = %next, "following redirect");
                current = url_guard::validate_with(next.as_str(), opts.host_policy)?.into_url();
            }
        }
    }
}

fn fetch_hop<W: Write>(
    url: &Url,
    sink: &mut W,
    opts: &DownloadOptions,
    deadline: Instant,
) -> Result<Hop, DownloadError> {
    let pin = if opts.check_resolved_addresses && opts.host_policy == HostPolicy::Public {
        resolve_pinned(url, opts, deadline)?
    } else {
        None
    };
    // The lookup spends from the same deadline as the transfer.
    let remaining = deadline.saturating_duration_since(Instant::now());
    if remaining.is_zero() {
        return Err(timed_out(opts));
    }

    let mut easy = curl::easy::Easy::new();
    configure(&mut easy, url, remaining, pin.as_deref()).map_err(network)?;

    let max = opts.max_bytes;
    let state = RefCell::new(ResponseState::default());
    let result = {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|line| on_header(&mut state.borrow_mut(), line, max))
            .map_err(network)?;
        transfer
            .write_function(|data| Ok(on_body(&mut state.borrow_mut(), sink, data, max)))
            .map_err(network)?;
        transfer.perform()
    };
    let state = state.into_inner();

    let stopped_on_status = matches!(state.abort, Some(Abort::NotSuccess));
    match state.abort {
        Some(Abort::Declared(declared)) => {
            tracing::warn!(%url, declared, max, "declared size over budget");
            return Err(DownloadError::TooLarge { declared, max });
        }
        Some(Abort::Exceeded) => {
            tracing::warn!(%url, max, "body exceeded budget mid-stream");
            return Err(DownloadError::SizeExceeded { max });
        }
        Some(Abort::Write(e)) => {
            return Err(DownloadError::FilesystemError(format!("write failed: {e}")));
        }
        Some(Abort::NotSuccess) | None => {}
    }
    if let Err(e) = result {
        if !stopped_on_status {
            return Err(if e.is_operation_timedout() {
                timed_out(opts)
            } else {
                network(e)
            });
        }
    }

    let status = easy.response_code().map_err(network)?;
    if matches!(status, 301 | 302 | 303 | 307 | 308) {
        if let Some(location) = easy.redirect_url().map_err(network)? {
            let next = Url::parse(location)
                .map_err(|e| Rejection::MalformedUrl(e.to_string()))?;
            return Ok(Hop::Redirect(next));
        }
    }
    if !is_success(status) {
        let reason = if state.reason.is_empty() {
            reason_phrase(status).to_string()
        } else {
            state.reason
        };
        return Err(DownloadError::HttpError { status, reason });
    }

    tracing::debug!(%url, bytes = state.received, "transfer complete");
    Ok(Hop::Done(state.received))
}

fn configure(
    easy: &mut curl::easy::Easy,
    url: &Url,
    remaining: Duration,
    pin: Option<&str>,
) -> Result<(), curl::Error> {
    easy.url(url.as_str())?;
    easy.get(true)?;
    easy.useragent(USER_AGENT)?;
    easy.follow_location(false)?;
    easy.signal(false)?;
    easy.buffer_size(CHUNK_SIZE)?;
    easy.timeout(remaining.max(Duration::from_millis(1)))?;
    if let Some(entry) = pin {
        let mut list = curl::easy::List::new();
        list.append(entry)?;
        easy.resolve(list)?;
    }
    Ok(())
}

/// Header callback: tracks the status line and rejects an oversized
/// declared length before any body byte arrives.
fn on_header(state: &mut ResponseState, line: &[u8], max: u64) -> bool {
    let Ok(text) = str::from_utf8(line) else {
        return true;
    };
    let text = text.trim_end();

    // Interim (1xx) and proxy responses each start with a new status line.
    if let Some(rest) = text.strip_prefix("HTTP/") {
        let mut parts = rest.splitn(3, ' ');
        let _version = parts.next();
        state.status = parts.next().and_then(|c| c.parse().ok()).unwrap_or(0);
        state.reason = parts.next().unwrap_or_default().trim().to_string();
        return true;
    }

    if let Some((name, value)) = text.split_once(':') {
        if name.trim().eq_ignore_ascii_case("content-length") && is_success(state.status) {
            if let Ok(declared) = value.trim().parse::<u64>() {
                if declared > max {
                    state.abort = Some(Abort::Declared(declared));
                    return false;
                }
            }
        }
    }
    true
}

/// Write callback. Returning fewer bytes than offered makes curl abort.
fn on_body<W: Write>(state: &mut ResponseState, sink: &mut W, data: &[u8], max: u64) -> usize {
    if !is_success(state.status) {
        state.abort = Some(Abort::NotSuccess);
        return 0;
    }
    let total = state.received + data.len() as u64;
    if total > max {
        state.abort = Some(Abort::Exceeded);
        return 0;
    }
    if let Err(e) = sink.write_all(data) {
        state.abort = Some(Abort::Write(e));
        return 0;
    }
    state.received = total;
    data.len()
}

fn is_success(status: u32) -> bool {
    (200..300).contains(&status)
}

pub(super) fn timed_out(opts: &DownloadOptions) -> DownloadError {
    DownloadError::Timeout {
        seconds: opts.timeout.as_secs(),
    }
}

fn network(e: curl::Error) -> DownloadError {
    DownloadError::NetworkError(e.to_string())
}
