use url::Url;

/// Canonicalizes a URL so that equivalent spellings map to one string
///
/// # Canonicalization Steps
///
/// 1. Strip the fragment
/// 2. Lowercase the scheme and host
/// 3. Drop the port when it is the scheme's default (80 for http, 443 for https)
/// 4. Collapse repeated `/` in the path
/// 5. Split the query on `&`, sort the tokens, rejoin with `&`
/// 6. Reassemble; an empty query leaves no trailing `?`
///
/// This never fails: an input that cannot be parsed is returned unchanged.
///
/// # Examples
///
/// ```
/// use search_crawler::url::canonicalize;
///
/// assert_eq!(
///     canonicalize("http://Example.com:80/a//b?b=2&a=1#frag"),
///     "http://example.com/a/b?a=1&b=2"
/// );
/// assert_eq!(canonicalize("not a url"), "not a url");
/// ```
pub fn canonicalize(raw_url: &str) -> String {
    let mut url = match Url::parse(raw_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!("Keeping unparsable URL {} as-is: {}", raw_url, e);
            return raw_url.to_string();
        }
    };

    url.set_fragment(None);

    // Parsing already lowercases the scheme and, for http(s), the host, and
    // drops default ports. Other schemes keep the host as written.
    if let Some(host) = url.host_str() {
        let lowered = host.to_lowercase();
        if lowered != host && url.set_host(Some(&lowered)).is_err() {
            return url.to_string();
        }
    }

    if !url.cannot_be_a_base() {
        let path = collapse_slashes(url.path());
        url.set_path(&path);
    }

    match url.query().map(sort_query) {
        Some(query) if !query.is_empty() => url.set_query(Some(&query)),
        _ => url.set_query(None),
    }

    url.to_string()
}

/// Replaces every run of `/` with a single `/`
fn collapse_slashes(path: &str) -> String {
    let mut collapsed = String::with_capacity(path.len());
    let mut previous_slash = false;
    for c in path.chars() {
        if c == '/' {
            if !previous_slash {
                collapsed.push(c);
            }
            previous_slash = true;
        } else {
            collapsed.push(c);
            previous_slash = false;
        }
    }
    collapsed
}

/// Sorts the raw `&`-separated query tokens lexicographically
fn sort_query(query: &str) -> String {
    let mut params: Vec<&str> = query.split('&').collect();
    params.sort_unstable();
    params.join("&")
}
