use http::StatusCode;

/// Produces the body of an error response.
pub trait ErrorResponder: Send + Sync {
    fn error_page(&self, status: StatusCode, message: &str) -> String;
}

/// Minimal html error pages.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultErrorPages;

impl ErrorResponder for DefaultErrorPages {
    fn error_page(&self, status: StatusCode, message: &str) -> String {
        format!("<h1>Oh no! {}!</h1><p>{message}</p>", status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::{DefaultErrorPages, ErrorResponder};
    use http::StatusCode;

    #[test]
    fn test_default_error_page() {
        assert_eq!(DefaultErrorPages.error_page(StatusCode::NOT_FOUND, ""), "<h1>Oh no! 404!</h1><p></p>");
    }
}
