/// Name of the cookie the service puts its CSRF token in.
pub const CSRF_COOKIE: &str = "csrftoken";
/// Header every mutating request echoes the token back in.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Pull the CSRF token out of a `Cookie` header value (`a=1; csrftoken=xyz`).
/// Empty when the cookie is not set.
pub fn token_from_cookies(cookies: &str) -> String {
    cookies
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == CSRF_COOKIE)
        .map(|(_, value)| value.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_token_among_cookies() {
        assert_eq!(token_from_cookies("sessionid=abc; csrftoken=tok123; theme=dark"), "tok123");
    }

    #[test]
    fn missing_token_is_empty() {
        assert_eq!(token_from_cookies("sessionid=abc"), "");
        assert_eq!(token_from_cookies(""), "");
    }

    #[test]
    fn similar_names_do_not_match() {
        assert_eq!(token_from_cookies("xcsrftoken=nope; csrftoken2=no"), "");
    }
}
