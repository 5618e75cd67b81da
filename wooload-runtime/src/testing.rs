//! In-memory doubles for flow and executor tests

use parking_lot::Mutex;
use url::Url;
use wooload_http::{CookieStore, HttpClient, HttpError, HttpResponse, Session, SessionFactory};

const ACCOUNT_PATH: &str = "/my-account/";
const ORDERS_PATH: &str = "/my-account/orders/";

const FOOTNOTE: &str = "<!-- plugin=object-cache-pro client=phpredis metric#hits=120 metric#hit-ratio=98.2 metric#store-reads=14 metric#store-writes=1 metric#ms-cache=3.2 metric#ms-cache-median=0.12 metric#ms-cache-ratio=2.5 -->";
const NONCE: &str = "5f2b9c";

/// In-memory WooCommerce site holding a single session's state
pub(crate) struct FakeShop {
    pub base: Url,
    pub accept_login: bool,
    pub show_login_form: bool,
    pub orders_status: u16,
    pub homepage_unreachable: bool,
    pub signed_in: Mutex<bool>,
    pub cookies: Mutex<Vec<String>>,
}

impl FakeShop {
    pub fn new() -> Self {
        Self {
            base: Url::parse("https://shop.example.com/").unwrap(),
            accept_login: true,
            show_login_form: true,
            orders_status: 200,
            homepage_unreachable: false,
            signed_in: Mutex::new(false),
            cookies: Mutex::new(Vec::new()),
        }
    }

    fn page(&self, url: &Url, status: u16, content: &str, footnote: bool) -> HttpResponse {
        let footnote = if footnote { FOOTNOTE } else { "" };
        HttpResponse::new(url.clone(), status)
            .with_header("x-cache-status", "MISS")
            .with_body(format!("<html><body>{}</body></html>\n{}", content, footnote))
    }

    fn login_page(&self, url: &Url) -> HttpResponse {
        let form = if self.show_login_form {
            format!(
                r#"<form class="woocommerce-form woocommerce-form-login login" method="post">
<input type="text" name="username" value=""><input type="password" name="password">
<input type="hidden" name="woocommerce-login-nonce" value="{}">
<button type="submit" name="login" value="Log in">Log in</button></form>"#,
                NONCE
            )
        } else {
            "<p>Maintenance</p>".to_string()
        };
        self.page(url, 200, &form, false)
    }
}

#[async_trait::async_trait]
impl HttpClient for FakeShop {
    async fn get(&self, url: &Url) -> Result<HttpResponse, HttpError> {
        let signed_in = *self.signed_in.lock();
        match url.path() {
            "/" if self.homepage_unreachable => Err(HttpError::InvalidUrl(url.to_string())),
            "/" => Ok(self.page(url, 200, "<h1>Shop</h1>", true)),
            ACCOUNT_PATH if signed_in => Ok(self.page(url, 200, "<h2>Dashboard</h2>", true)),
            ORDERS_PATH if signed_in => Ok(self.page(url, self.orders_status, "<h2>Orders</h2>", true)),
            ACCOUNT_PATH | ORDERS_PATH => Ok(self.login_page(url)),
            _ => Ok(self.page(url, 404, "Not found", false)),
        }
    }

    async fn post_form(
        &self,
        url: &Url,
        fields: &[(String, String)],
    ) -> Result<HttpResponse, HttpError> {
        let field = |name: &str| {
            fields
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        };
        let valid = self.accept_login
            && field("username").is_some_and(|u| u.starts_with("test"))
            && field("password") == Some("3405691582")
            && field("rememberme") == Some("forever")
            && field("woocommerce-login-nonce") == Some(NONCE);

        if valid {
            *self.signed_in.lock() = true;
            Ok(self.page(url, 200, "<h2>Dashboard</h2>", true))
        } else {
            Ok(self.login_page(url))
        }
    }
}

impl CookieStore for FakeShop {
    fn set_cookie(&self, site: &Url, name: &str, value: &str, path: &str) -> Result<(), HttpError> {
        assert_eq!(site, &self.base);
        self.cookies.lock().push(format!("{}={}; Path={}", name, value, path));
        Ok(())
    }
}

/// Hands out a fresh [`FakeShop`] per session
pub(crate) struct FakeShopFactory {
    pub accept_login: bool,
}

impl FakeShopFactory {
    pub fn new() -> Self {
        Self { accept_login: true }
    }
}

impl SessionFactory for FakeShopFactory {
    fn create_session(&self) -> Result<Box<dyn Session>, HttpError> {
        Ok(Box::new(FakeShop {
            accept_login: self.accept_login,
            ..FakeShop::new()
        }))
    }
}
