//! Navigation guard between public auth pages and protected pages.
//!
//! The only signal used is whether an access cookie is present. The token
//! inside it is neither decoded nor checked for expiry, so a stale token
//! still passes here and fails later at the API.

pub const LOGIN_PATH: &str = "/login";
pub const BOARDS_PATH: &str = "/boards";

const AUTH_PREFIXES: [&str; 2] = ["/login", "/register"];
const PROTECTED_PREFIXES: [&str; 3] = ["/boards", "/cards", "/sprints"];
const UNGUARDED_PREFIXES: [&str; 4] = ["/api", "/_next/static", "/_next/image", "/favicon.ico"];

/// Answers whether the current client holds an access cookie
pub trait AccessCookie {
    fn has_access_cookie(&self) -> bool;
}

/// Kind of page a path belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Login and registration pages
    Auth,
    /// Pages that need a session
    Protected,
    /// Everything else the guard sees
    Public,
    /// Assets and API routes the guard never inspects
    Unguarded,
}

/// Outcome of evaluating a navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Continue,
    Redirect(String),
}

impl Navigation {
    pub fn redirect(path: &str) -> Self {
        Self::Redirect(path.to_string())
    }
}

pub fn classify(path: &str) -> RouteKind {
    if UNGUARDED_PREFIXES.iter().any(|p| path.starts_with(p)) {
        RouteKind::Unguarded
    } else if AUTH_PREFIXES.iter().any(|p| path.starts_with(p)) {
        RouteKind::Auth
    } else if PROTECTED_PREFIXES.iter().any(|p| path.starts_with(p)) {
        RouteKind::Protected
    } else {
        RouteKind::Public
    }
}

/// Decides whether a navigation to `path` proceeds or redirects
pub fn guard(path: &str, cookies: &impl AccessCookie) -> Navigation {
    match classify(path) {
        RouteKind::Protected if !cookies.has_access_cookie() => Navigation::redirect(LOGIN_PATH),
        RouteKind::Auth if cookies.has_access_cookie() => Navigation::redirect(BOARDS_PATH),
        RouteKind::Protected | RouteKind::Auth | RouteKind::Public | RouteKind::Unguarded => {
            Navigation::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Cookie(bool);

    impl AccessCookie for Cookie {
        fn has_access_cookie(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("/login"), RouteKind::Auth);
        assert_eq!(classify("/register/confirm"), RouteKind::Auth);
        assert_eq!(classify("/boards/4"), RouteKind::Protected);
        assert_eq!(classify("/sprints"), RouteKind::Protected);
        assert_eq!(classify("/"), RouteKind::Public);
        assert_eq!(classify("/api/kanban/boards/"), RouteKind::Unguarded);
        assert_eq!(classify("/favicon.ico"), RouteKind::Unguarded);
    }

    #[test]
    fn test_protected_without_cookie_redirects_to_login() {
        assert_eq!(guard("/boards", &Cookie(false)), Navigation::redirect("/login"));
        assert_eq!(guard("/cards/3", &Cookie(false)), Navigation::redirect("/login"));
        assert_eq!(guard("/boards", &Cookie(true)), Navigation::Continue);
    }

    #[test]
    fn test_auth_page_with_cookie_redirects_to_boards() {
        assert_eq!(guard("/login", &Cookie(true)), Navigation::redirect("/boards"));
        assert_eq!(guard("/login", &Cookie(false)), Navigation::Continue);
    }

    #[test]
    fn test_public_and_unguarded_always_continue() {
        for has_cookie in [true, false] {
            assert_eq!(guard("/", &Cookie(has_cookie)), Navigation::Continue);
            assert_eq!(guard("/api/token/", &Cookie(has_cookie)), Navigation::Continue);
        }
    }
}
