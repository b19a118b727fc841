use regex::Regex;

use super::RequestHead;

/// Origin acceptance strategy
///
/// Given the request's `Origin` value and the request itself, returns the
/// value to send back in `Access-Control-Allow-Origin`, or `None` to reject
/// the origin. A returned empty string is treated as a rejection too.
///
/// The returned value does not have to equal the request origin; a validator
/// may canonicalise or rewrite it. A validator installed on a policy has full
/// authority: the static allow-list is not consulted.
///
/// Validators are shared by every request the policy evaluates, so they must
/// be `Send + Sync`.
///
/// Closures with the matching signature implement this trait:
///
/// ```rust
/// use preflight::middleware::{OriginValidator, RequestHead};
///
/// let v = |origin: &str, _req: &dyn RequestHead| {
///     origin.ends_with(".example.com").then(|| origin.to_string())
/// };
/// let req = http::Request::new(());
/// assert_eq!(v.allow_origin("https://a.example.com", &req).as_deref(), Some("https://a.example.com"));
/// assert_eq!(v.allow_origin("https://evil.test", &req), None);
/// ```
pub trait OriginValidator: Send + Sync {
    fn allow_origin(&self, origin: &str, req: &dyn RequestHead) -> Option<String>;
}

impl<F> OriginValidator for F
where
    F: Fn(&str, &dyn RequestHead) -> Option<String> + Send + Sync,
{
    fn allow_origin(&self, origin: &str, req: &dyn RequestHead) -> Option<String> {
        self(origin, req)
    }
}

/// Default validator built from `allow_origins` and `allow_origin_patterns`
///
/// Echoes the request origin verbatim when it is listed exactly, when the
/// list contains `"*"`, or when it matches one of the compiled patterns.
#[derive(Debug, Clone)]
pub struct AllowList {
    origins: Vec<String>,
    any: bool,
    patterns: Vec<Regex>,
}

impl AllowList {
    #[must_use]
    pub fn new(origins: Vec<String>, patterns: Vec<Regex>) -> Self {
        let any = origins.iter().any(|o| o == "*");
        Self {
            origins,
            any,
            patterns,
        }
    }

    /// Whether `"*"` is among the allowed origins.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.any
    }

    fn matches(&self, origin: &str) -> bool {
        self.any
            || self.origins.iter().any(|o| o == origin)
            || self.patterns.iter().any(|re| re.is_match(origin))
    }
}

impl OriginValidator for AllowList {
    fn allow_origin(&self, origin: &str, _req: &dyn RequestHead) -> Option<String> {
        self.matches(origin).then(|| origin.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req() -> http::Request<()> {
        http::Request::new(())
    }

    #[test]
    fn test_wildcard_echoes_request_origin() {
        let list = AllowList::new(vec!["*".into()], vec![]);
        assert!(list.is_wildcard());
        assert_eq!(
            list.allow_origin("https://anything.test", &req()).as_deref(),
            Some("https://anything.test")
        );
    }

    #[test]
    fn test_exact_match_is_case_sensitive() {
        let list = AllowList::new(vec!["test.org".into()], vec![]);
        assert_eq!(list.allow_origin("test.org", &req()).as_deref(), Some("test.org"));
        assert_eq!(list.allow_origin("Test.org", &req()), None);
        assert_eq!(list.allow_origin("not-allowed.org", &req()), None);
    }

    #[test]
    fn test_empty_list_rejects_everything() {
        let list = AllowList::new(vec![], vec![]);
        assert_eq!(list.allow_origin("test.org", &req()), None);
    }

    #[test]
    fn test_pattern_match() {
        let re = Regex::new(r"^https://[a-z0-9-]+\.example\.com$").unwrap();
        let list = AllowList::new(vec![], vec![re]);
        assert_eq!(
            list.allow_origin("https://api.example.com", &req()).as_deref(),
            Some("https://api.example.com")
        );
        assert_eq!(list.allow_origin("https://example.com.evil.test", &req()), None);
    }

    #[test]
    fn test_closure_sees_request() {
        let v = |origin: &str, req: &dyn RequestHead| {
            req.header("x-tenant").map(|t| format!("{origin}/{t}"))
        };
        let with_tenant = http::Request::builder()
            .header("X-Tenant", "acme")
            .body(())
            .unwrap();
        assert_eq!(
            v.allow_origin("https://a.test", &with_tenant).as_deref(),
            Some("https://a.test/acme")
        );
        assert_eq!(v.allow_origin("https://a.test", &req()), None);
    }
}
