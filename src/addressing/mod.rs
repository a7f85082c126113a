/*!
 * Object Reference Addressing
 *
 * Best-effort extraction of host/port from the string form of an object
 * reference. Every parser returns `None` instead of failing.
 */

mod ior;

pub use ior::{encode_ior, IiopProfile, Ior, TAG_INTERNET_IOP};

/// Network location of a remote object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: Option<u16>,
}

/// Parse any supported string form: `IOR:`, `corbaloc:`/`corbaname:`, or `scheme://host:port/...`
pub fn parse_endpoint(reference: &str) -> Option<Endpoint> {
    let reference = reference.trim();

    if reference
        .get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("IOR:"))
    {
        let ior = Ior::parse(reference)?;
        let profile = ior.primary()?;
        return Some(Endpoint {
            host: profile.host.clone(),
            port: Some(profile.port),
        });
    }

    if let Some(rest) = reference
        .strip_prefix("corbaloc:")
        .or_else(|| reference.strip_prefix("corbaname:"))
    {
        return parse_object_url(rest);
    }

    if reference.contains("://") {
        return parse_scheme_url(reference);
    }

    None
}

/// `scheme://host[:port][/path]`: split on the scheme separator, then `/`, then `:`
fn parse_scheme_url(reference: &str) -> Option<Endpoint> {
    let after_scheme = reference.split("://").nth(1)?;
    let host_port = after_scheme.split('/').next()?;
    let mut parts = host_port.split(':');

    let host = parts.next().filter(|h| !h.is_empty())?;
    let port = parts.next().and_then(|p| p.parse::<u16>().ok());
    Some(Endpoint {
        host: host.to_string(),
        port,
    })
}

/// Body of a `corbaloc:` URL: `[iiop]:[ver@]host[:port][,more]/key`
fn parse_object_url(body: &str) -> Option<Endpoint> {
    let addr_list = body.split(['/', '#']).next()?;
    let first = addr_list.split(',').next()?;

    let addr = if let Some(rest) = first.strip_prefix("iiop:") {
        rest
    } else if let Some(rest) = first.strip_prefix(':') {
        rest
    } else {
        // rir: and other non-network protocols carry no endpoint
        return None;
    };

    let addr = match addr.split_once('@') {
        Some((_version, host_port)) => host_port,
        None => addr,
    };

    let (host, port) = if let Some(v6) = addr.strip_prefix('[') {
        let (host, tail) = v6.split_once(']')?;
        (host, tail.strip_prefix(':'))
    } else {
        match addr.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (addr, None),
        }
    };

    if host.is_empty() {
        return None;
    }

    Some(Endpoint {
        host: host.to_string(),
        // Unspecified port defaults to the IIOP well-known port
        port: match port {
            Some(p) => Some(p.parse::<u16>().ok()?),
            None => Some(2809),
        },
    })
}
