use url::Url;

/// Whether `url`'s host is one of `hosts` or a subdomain of one.
///
/// Unparseable URLs and URLs without a host never match.
pub fn matches_live_host(url: &str, hosts: &[String]) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.trim_end_matches('.').to_ascii_lowercase();

    hosts.iter().any(|known| {
        let known = known.to_ascii_lowercase();
        host == known
            || host
                .strip_suffix(known.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}
