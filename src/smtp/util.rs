use std::time::{SystemTime, UNIX_EPOCH};

use rand::{Rng, distributions::Alphanumeric};

/// Local part that cannot plausibly exist: `prefix`, the current time in
/// microseconds (hex) and a random lower-case alphanumeric salt.
pub(crate) fn unique_local_part(prefix: &str) -> String {
    let micros = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_micros())
        .unwrap_or_default();
    let salt: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|byte| char::from(byte).to_ascii_lowercase())
        .collect();
    format!("{prefix}{micros:x}{salt}")
}

pub(crate) fn resolve_socket_addrs(
    host: &str,
    port: u16,
) -> std::io::Result<Vec<std::net::SocketAddr>> {
    use std::net::ToSocketAddrs;

    (host, port).to_socket_addrs().map(|iter| iter.collect())
}
