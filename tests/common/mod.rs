//! Mock WooCommerce shop served over real HTTP

#![allow(dead_code)]

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::Response,
    routing::get,
    Form, Router,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

pub const PASSWORD: &str = "3405691582";
pub const NONCE: &str = "9d2e41f0ab";
const SESSION_COOKIE: &str = "wordpress_logged_in_4f1c";

const FOOTNOTE: &str = "<!-- plugin=object-cache-pro client=phpredis metric#hits=2150 metric#misses=31 metric#hit-ratio=98.6 metric#bytes=904112 metric#prefetches=0 metric#store-reads=58 metric#store-writes=4 metric#store-hits=52 metric#store-misses=6 metric#sql-queries=12 metric#ms-total=184.22 metric#ms-cache=9.81 metric#ms-cache-avg=0.1691 metric#ms-cache-median=0.1102 metric#ms-cache-ratio=5.3 -->";

/// Observable and tweakable state of the mock shop
#[derive(Default)]
pub struct ShopState {
    sessions: Mutex<HashMap<String, String>>,
    next_session: AtomicU64,
    pub logins: AtomicU64,
    pub reject_logins: AtomicBool,
    pub orders_status: AtomicU16,
    pub cookie_headers: Mutex<Vec<String>>,
}

impl ShopState {
    fn signed_in_user(&self, headers: &HeaderMap) -> Option<String> {
        let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
        let token = cookies
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, value)| value.to_string())?;
        self.sessions.lock().get(&token).cloned()
    }

    fn observe(&self, headers: &HeaderMap) {
        if let Some(cookies) = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) {
            self.cookie_headers.lock().push(cookies.to_string());
        }
    }
}

pub struct MockShop {
    pub addr: SocketAddr,
    pub state: Arc<ShopState>,
}

impl MockShop {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Start the shop on an ephemeral port
pub async fn start_shop() -> MockShop {
    let state = Arc::new(ShopState {
        orders_status: AtomicU16::new(200),
        ..Default::default()
    });

    let app = Router::new()
        .route("/", get(homepage))
        .route("/my-account/", get(account).post(login))
        .route("/my-account/orders/", get(orders))
        .with_state(Arc::clone(&state));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockShop { addr, state }
}

fn page(status: StatusCode, cache: &str, content: &str, footnote: bool) -> Response {
    let body = format!(
        "<!DOCTYPE html>\n<html><head><title>Shop</title></head><body>{}</body></html>\n{}",
        content,
        if footnote { FOOTNOTE } else { "" }
    );
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/html; charset=UTF-8")
        .header("x-cache-status", cache)
        .body(Body::from(body))
        .unwrap()
}

fn login_form(error: Option<&str>) -> Response {
    let notice = error
        .map(|e| format!(r#"<ul class="woocommerce-error" role="alert"><li>{}</li></ul>"#, e))
        .unwrap_or_default();
    let content = format!(
        r#"{notice}<h2>Login</h2>
<form class="woocommerce-form woocommerce-form-login login" method="post">
  <p><label for="username">Username or email address</label>
  <input type="text" class="woocommerce-Input input-text" name="username" id="username" autocomplete="username" value="" /></p>
  <p><label for="password">Password</label>
  <input class="woocommerce-Input input-text" type="password" name="password" id="password" autocomplete="current-password" /></p>
  <p><label><input class="woocommerce-form__input-checkbox" name="rememberme" type="checkbox" id="rememberme" value="forever" /> <span>Remember me</span></label>
  <input type="hidden" id="woocommerce-login-nonce" name="woocommerce-login-nonce" value="{nonce}" />
  <input type="hidden" name="_wp_http_referer" value="/my-account/" />
  <button type="submit" class="woocommerce-button button woocommerce-form-login__submit" name="login" value="Log in">Log in</button></p>
</form>"#,
        notice = notice,
        nonce = NONCE
    );
    page(StatusCode::OK, "MISS", &content, false)
}

async fn homepage(State(state): State<Arc<ShopState>>, headers: HeaderMap) -> Response {
    state.observe(&headers);
    let bypassed = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|cookies| cookies.contains("wordpress_no_cache=1"));
    let cache = if bypassed { "BYPASS" } else { "HIT" };
    page(StatusCode::OK, cache, "<h1>Welcome to the shop</h1>", true)
}

async fn account(State(state): State<Arc<ShopState>>, headers: HeaderMap) -> Response {
    state.observe(&headers);
    match state.signed_in_user(&headers) {
        Some(user) => page(
            StatusCode::OK,
            "BYPASS",
            &format!("<p>Hello <strong>{}</strong></p>", user),
            true,
        ),
        None => login_form(None),
    }
}

async fn login(
    State(state): State<Arc<ShopState>>,
    headers: HeaderMap,
    Form(fields): Form<HashMap<String, String>>,
) -> Response {
    state.observe(&headers);
    let field = |name: &str| fields.get(name).map(String::as_str);

    let username = field("username").unwrap_or_default().to_string();
    let valid_user = username
        .strip_prefix("test")
        .and_then(|n| n.parse::<u64>().ok())
        .is_some_and(|n| (1..=100).contains(&n));
    let accepted = !state.reject_logins.load(Ordering::SeqCst)
        && valid_user
        && field("password") == Some(PASSWORD)
        && field("woocommerce-login-nonce") == Some(NONCE)
        && field("login") == Some("Log in");

    if !accepted {
        return login_form(Some("Unknown username. Check again or try your email address."));
    }

    state.logins.fetch_add(1, Ordering::SeqCst);
    let token = format!("{:016x}", state.next_session.fetch_add(1, Ordering::SeqCst) + 1);
    state.sessions.lock().insert(token.clone(), username.clone());

    let mut response = page(
        StatusCode::OK,
        "BYPASS",
        &format!("<p>Hello <strong>{}</strong></p>", username),
        true,
    );
    response.headers_mut().insert(
        header::SET_COOKIE,
        format!("{}={}; Path=/; HttpOnly", SESSION_COOKIE, token)
            .parse()
            .unwrap(),
    );
    response
}

async fn orders(State(state): State<Arc<ShopState>>, headers: HeaderMap) -> Response {
    state.observe(&headers);
    match state.signed_in_user(&headers) {
        Some(_) => {
            let status = StatusCode::from_u16(state.orders_status.load(Ordering::SeqCst))
                .unwrap_or(StatusCode::OK);
            page(
                status,
                "BYPASS",
                r#"<table class="woocommerce-orders-table"><tr><td>#1042</td></tr></table>"#,
                true,
            )
        }
        None => login_form(None),
    }
}
