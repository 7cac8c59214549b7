//! Resolve-then-pin for public hosts.
//!
//! The literal denylist cannot see where a DNS name points. Before each
//! request the host is resolved here, every address is checked, and the
//! connection is pinned to a checked address so curl does not resolve again.
//!
//! The system resolver has no timeout of its own, so lookups run on a
//! helper thread and the caller stops waiting at the request deadline. A
//! lookup abandoned that way finishes in the background and is discarded.

use super::transfer::timed_out;
use super::{DownloadError, DownloadOptions};
use crate::url_guard::{is_internal_addr, Rejection};
use std::io;
use std::net::{IpAddr, ToSocketAddrs};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Instant;
use url::{Host, Url};

/// Checks the addresses behind `url` and returns a `CURLOPT_RESOLVE` entry
/// (`host:port:addr`) for domain hosts. IP-literal hosts are checked and
/// need no pin. A lookup still running at `deadline` is a timeout.
pub(crate) fn resolve_pinned(
    url: &Url,
    opts: &DownloadOptions,
    deadline: Instant,
) -> Result<Option<String>, DownloadError> {
    let port = url.port_or_known_default().unwrap_or(80);
    let domain = match url.host() {
        Some(Host::Domain(domain)) => domain,
        Some(Host::Ipv4(v4)) => {
            ensure_public(IpAddr::V4(v4), url)?;
            return Ok(None);
        }
        Some(Host::Ipv6(v6)) => {
            ensure_public(IpAddr::V6(v6), url)?;
            return Ok(None);
        }
        None => return Err(Rejection::MissingHost.into()),
    };

    let addrs = match lookup(domain, port, deadline) {
        Lookup::Done(result) => result.map_err(|e| {
            DownloadError::NetworkError(format!("could not resolve {domain}: {e}"))
        })?,
        Lookup::TimedOut => {
            tracing::debug!(%domain, "lookup outlived the deadline");
            return Err(timed_out(opts));
        }
    };
    let first = *addrs.first().ok_or_else(|| {
        DownloadError::NetworkError(format!("could not resolve {domain}: no addresses"))
    })?;
    for addr in &addrs {
        ensure_public(*addr, url)?;
    }

    let entry = match first {
        IpAddr::V4(v4) => format!("{domain}:{port}:{v4}"),
        IpAddr::V6(v6) => format!("{domain}:{port}:[{v6}]"),
    };
    tracing::debug!(%entry, "pinned resolved address");
    Ok(Some(entry))
}

enum Lookup {
    Done(io::Result<Vec<IpAddr>>),
    TimedOut,
}

fn lookup(domain: &str, port: u16, deadline: Instant) -> Lookup {
    let budget = deadline.saturating_duration_since(Instant::now());
    if budget.is_zero() {
        return Lookup::TimedOut;
    }

    let (tx, rx) = mpsc::channel();
    let name = domain.to_string();
    let spawned = thread::Builder::new()
        .name("tapestry-resolve".into())
        .spawn(move || {
            let result = (name.as_str(), port)
                .to_socket_addrs()
                .map(|addrs| addrs.map(|sa| sa.ip()).collect::<Vec<IpAddr>>());
            // The receiver is gone once the caller stopped waiting.
            let _ = tx.send(result);
        });
    if let Err(e) = spawned {
        return Lookup::Done(Err(e));
    }

    match rx.recv_timeout(budget) {
        Ok(result) => Lookup::Done(result),
        Err(RecvTimeoutError::Timeout) => Lookup::TimedOut,
        Err(RecvTimeoutError::Disconnected) => Lookup::Done(Err(io::Error::other(
            "resolver thread exited without an answer",
        ))),
    }
}

fn ensure_public(addr: IpAddr, url: &Url) -> Result<(), DownloadError> {
    if is_internal_addr(addr) {
        let host = url.host_str().unwrap_or_default().to_string();
        tracing::warn!(%host, %addr, "host resolves to an internal address");
        return Err(Rejection::InternalHostBlocked { host }.into());
    }
    Ok(())
}
