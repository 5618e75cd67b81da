//! Response checks shared by every flow step

use wooload_http::HttpResponse;

/// Class WooCommerce puts on its login form
pub const LOGIN_FORM_CLASS: &str = "woocommerce-form-login";

pub const CHECK_STATUS_OK: &str = "status is 2xx";
pub const CHECK_LOGIN_ACCEPTED: &str = "login accepted";
pub const CHECK_NOT_LOGIN: &str = "page is not login";

pub fn is_ok(response: &HttpResponse) -> bool {
    response.is_success()
}

/// True when the page does not show the login form, i.e. the session is
/// still signed in
pub fn page_is_not_login(response: &HttpResponse) -> bool {
    !response.body.contains(LOGIN_FORM_CLASS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse::new(Url::parse("https://shop.example.com/my-account/").unwrap(), status)
            .with_body(body)
    }

    #[test]
    fn test_is_ok() {
        assert!(is_ok(&response(200, "")));
        assert!(is_ok(&response(201, "")));
        assert!(!is_ok(&response(302, "")));
        assert!(!is_ok(&response(403, "")));
        assert!(!is_ok(&response(500, "")));
    }

    #[test]
    fn test_page_is_not_login() {
        assert!(page_is_not_login(&response(200, "<h2>Orders</h2>")));
        assert!(!page_is_not_login(&response(
            200,
            r#"<form class="woocommerce-form woocommerce-form-login login" method="post">"#
        )));
    }
}
