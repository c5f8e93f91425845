//! Channel endpoint derivation.
//!
//! The browser page connects to its own origin; the terminal client is given
//! that origin (or a full socket URL) on the command line.

use logcast_core::ChannelError;
use url::Url;

/// Path of the channel endpoint on the server.
pub const SOCKET_PATH: &str = "/socket";

/// Query parameter asking the server to replay its history first.
pub const REPLAY_PARAM: &str = "replay";

/// Derive the WebSocket endpoint for `origin`.
///
/// - `http://host:port[/prefix]` becomes `ws://host:port[/prefix]/socket`
/// - `https://…` becomes `wss://…/socket`
/// - `ws://…` and `wss://…` are used as-is
pub fn socket_endpoint(origin: &str) -> Result<Url, ChannelError> {
    let mut url =
        Url::parse(origin).map_err(|e| ChannelError::invalid_endpoint(origin, e.to_string()))?;

    if url.host_str().is_none_or(str::is_empty) {
        return Err(ChannelError::invalid_endpoint(origin, "missing host"));
    }

    let scheme = match url.scheme() {
        "ws" | "wss" => return Ok(url),
        "http" => "ws",
        "https" => "wss",
        other => {
            return Err(ChannelError::invalid_endpoint(
                origin,
                format!("unsupported scheme '{other}'"),
            ));
        }
    };

    url.set_scheme(scheme)
        .map_err(|()| ChannelError::invalid_endpoint(origin, "cannot switch scheme"))?;

    let path = format!("{}{SOCKET_PATH}", url.path().trim_end_matches('/'));
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Copy of `endpoint` requesting a history replay.
pub fn with_replay(endpoint: &Url) -> Url {
    let mut url = endpoint.clone();
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != REPLAY_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(REPLAY_PARAM, "true");
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_origin_maps_to_ws_socket() {
        let url = socket_endpoint("http://127.0.0.1:5000").unwrap();
        assert_eq!(url.as_str(), "ws://127.0.0.1:5000/socket");
    }

    #[test]
    fn test_https_origin_maps_to_wss() {
        let url = socket_endpoint("https://logs.example.com/").unwrap();
        assert_eq!(url.as_str(), "wss://logs.example.com/socket");
    }

    #[test]
    fn test_origin_prefix_is_kept() {
        let url = socket_endpoint("http://host:8080/console?x=1#top").unwrap();
        assert_eq!(url.as_str(), "ws://host:8080/console/socket");
    }

    #[test]
    fn test_ws_url_used_verbatim() {
        let url = socket_endpoint("ws://host:9000/custom").unwrap();
        assert_eq!(url.as_str(), "ws://host:9000/custom");
    }

    #[test]
    fn test_rejects_other_schemes() {
        let err = socket_endpoint("ftp://host/").unwrap_err();
        assert!(matches!(err, ChannelError::InvalidEndpoint { .. }));
        assert!(socket_endpoint("not a url").is_err());
    }

    #[test]
    fn test_with_replay_sets_single_param() {
        let base = socket_endpoint("http://host:1").unwrap();
        let once = with_replay(&base);
        let twice = with_replay(&once);
        assert_eq!(twice.as_str(), "ws://host:1/socket?replay=true");
    }
}
