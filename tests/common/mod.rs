//! In-process fake of the EasyFund backend.
//!
//! Serves the `/api/v1` routes the client uses from shared, mutable
//! fixtures so each test can shape the responses it needs.

#![allow(dead_code)]

use std::{
    collections::HashSet,
    net::TcpListener,
    sync::{Arc, Mutex},
};

use actix_web::{
    dev::ServerHandle, get, post, web, App, HttpRequest, HttpResponse, HttpServer,
};
use serde_json::{json, Value};
use url::Url;

use easyfund::{
    configuration::{AppState, Config, SessionMode, State},
    provider::MemoryStorage,
};

pub const TOKEN: &str = "fake-backend-token";
pub const USER_ID: i64 = 7;
pub const EMAIL: &str = "anna@example.com";
pub const PASSWORD: &str = "secret-pass";

#[derive(Debug)]
pub struct Fixtures {
    pub balance: Value,
    pub accounts: Value,
    pub debt: Value,
    pub loans: Value,
    pub transactions: Value,
    pub banks: Value,
    pub applications: Vec<Value>,
    /// Route keys answering 500.
    pub failing: HashSet<&'static str>,
    /// Every authenticated route answers 401.
    pub expired: bool,
    /// Status of `/auth/login` when not 200.
    pub login_status: Option<u16>,
    pub submitted: Vec<Value>,
}

impl Default for Fixtures {
    fn default() -> Self {
        Fixtures {
            balance: json!({ "total_balance": "0", "currency": "RUB" }),
            accounts: json!([]),
            debt: json!({ "total_debt": "0" }),
            loans: json!([]),
            transactions: json!({ "transactions": [], "total_spent": "0" }),
            banks: json!([]),
            applications: vec![],
            failing: HashSet::new(),
            expired: false,
            login_status: None,
            submitted: vec![],
        }
    }
}

pub type Shared = Arc<Mutex<Fixtures>>;

pub struct FakeBackend {
    pub fixtures: Shared,
    pub base_url: Url,
    handle: ServerHandle,
}

impl FakeBackend {
    pub fn start(fixtures: Fixtures) -> FakeBackend {
        let fixtures = Arc::new(Mutex::new(fixtures));
        let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let port = listener.local_addr().unwrap().port();

        let data = fixtures.clone();
        let server = HttpServer::new(move || {
            App::new().app_data(web::Data::new(data.clone())).service(
                web::scope("/api/v1")
                    .service(login)
                    .service(register)
                    .service(logout)
                    .service(me)
                    .service(profile)
                    .service(balance)
                    .service(accounts)
                    .service(debt)
                    .service(loans)
                    .service(transactions)
                    .service(bank_transactions)
                    .service(applications)
                    .service(create_application)
                    .service(banks),
            )
        })
        .workers(1)
        .listen(listener)
        .unwrap()
        .disable_signals()
        .run();

        let handle = server.handle();
        actix_web::rt::spawn(server);

        FakeBackend {
            fixtures,
            base_url: Url::parse(&format!("http://127.0.0.1:{}/api/v1", port)).unwrap(),
            handle,
        }
    }

    pub fn config(&self, mode: SessionMode) -> Config {
        let mut config = Config::new(self.base_url.clone());
        config.session_mode = mode;
        config.timeout = 5;
        config
    }

    pub fn state(&self, mode: SessionMode) -> AppState<State> {
        self.state_with_storage(mode, Arc::new(MemoryStorage::new()))
    }

    /// State over storage the test keeps a handle on.
    pub fn state_with_storage(
        &self,
        mode: SessionMode,
        storage: Arc<MemoryStorage>,
    ) -> AppState<State> {
        AppState::new(State::with_storage(self.config(mode), storage).unwrap())
    }

    /// State already logged in against this backend.
    pub async fn signed_in(&self) -> AppState<State> {
        let state = self.state(SessionMode::Backend);
        state.auth.login(EMAIL, PASSWORD).await.unwrap();
        state
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut Fixtures) -> R) -> R {
        f(&mut self.fixtures.lock().unwrap())
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

/// Local address nothing listens on.
pub fn unreachable_config(mode: SessionMode) -> Config {
    let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mut config = Config::new(Url::parse(&format!("http://127.0.0.1:{}/api/v1", port)).unwrap());
    config.session_mode = mode;
    config.timeout = 2;
    config
}

fn user() -> Value {
    json!({
        "user_id": USER_ID,
        "email": EMAIL,
        "full_name": "Анна Петрова",
        "role": "client",
    })
}

/// Auth and failure checks shared by the data routes.
fn guard(req: &HttpRequest, fixtures: &Fixtures, key: &str) -> Option<HttpResponse> {
    let bearer = req
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok());

    let expected = format!("Bearer {}", TOKEN);

    if fixtures.expired || bearer != Some(expected.as_str()) {
        return Some(HttpResponse::Unauthorized().json(json!({ "error": "Token expired" })));
    }

    if fixtures.failing.contains(key) {
        return Some(
            HttpResponse::InternalServerError().json(json!({ "error": "Internal error" })),
        );
    }

    None
}

fn respond(
    req: &HttpRequest,
    data: &web::Data<Shared>,
    key: &str,
    pick: fn(&Fixtures) -> Value,
) -> HttpResponse {
    let fixtures = data.lock().unwrap();
    if let Some(response) = guard(req, &fixtures, key) {
        return response;
    }
    HttpResponse::Ok().json(pick(&fixtures))
}

#[post("/auth/login")]
async fn login(data: web::Data<Shared>, body: web::Json<Value>) -> HttpResponse {
    let fixtures = data.lock().unwrap();

    if let Some(status) = fixtures.login_status {
        let status = actix_web::http::StatusCode::from_u16(status).unwrap();
        return HttpResponse::build(status).json(json!({ "error": "Неверный email или пароль" }));
    }

    if body["email"] != EMAIL || body["password"] != PASSWORD {
        return HttpResponse::Unauthorized().json(json!({ "error": "Неверный email или пароль" }));
    }

    HttpResponse::Ok().json(json!({ "token": TOKEN, "user": user(), "expires_in": 3600 }))
}

#[post("/auth/register")]
async fn register(data: web::Data<Shared>) -> HttpResponse {
    let fixtures = data.lock().unwrap();
    if let Some(status) = fixtures.login_status {
        let status = actix_web::http::StatusCode::from_u16(status).unwrap();
        return HttpResponse::build(status).json(json!({ "error": "Registration failed" }));
    }
    HttpResponse::Created().json(json!({ "user_id": USER_ID }))
}

#[post("/auth/logout")]
async fn logout(data: web::Data<Shared>) -> HttpResponse {
    if data.lock().unwrap().failing.contains("logout") {
        return HttpResponse::InternalServerError().json(json!({ "error": "Internal error" }));
    }
    HttpResponse::NoContent().finish()
}

#[get("/auth/me")]
async fn me(req: HttpRequest, data: web::Data<Shared>) -> HttpResponse {
    respond(&req, &data, "me", |_| user())
}

#[get("/users/{id}")]
async fn profile(req: HttpRequest, data: web::Data<Shared>) -> HttpResponse {
    respond(&req, &data, "profile", |_| user())
}

#[get("/users/{id}/accounts")]
async fn accounts(req: HttpRequest, data: web::Data<Shared>) -> HttpResponse {
    respond(&req, &data, "accounts", |f| f.accounts.clone())
}

#[get("/users/{id}/balance")]
async fn balance(req: HttpRequest, data: web::Data<Shared>) -> HttpResponse {
    respond(&req, &data, "balance", |f| f.balance.clone())
}

#[get("/users/{id}/debt")]
async fn debt(req: HttpRequest, data: web::Data<Shared>) -> HttpResponse {
    respond(&req, &data, "debt", |f| f.debt.clone())
}

#[get("/users/{id}/loans")]
async fn loans(req: HttpRequest, data: web::Data<Shared>) -> HttpResponse {
    respond(&req, &data, "loans", |f| f.loans.clone())
}

#[get("/users/{id}/transactions")]
async fn transactions(req: HttpRequest, data: web::Data<Shared>) -> HttpResponse {
    respond(&req, &data, "transactions", |f| f.transactions.clone())
}

#[get("/users/{id}/banks/{bank_id}/transactions")]
async fn bank_transactions(req: HttpRequest, data: web::Data<Shared>) -> HttpResponse {
    respond(&req, &data, "bank_transactions", |f| f.transactions.clone())
}

#[get("/users/{id}/applications")]
async fn applications(req: HttpRequest, data: web::Data<Shared>) -> HttpResponse {
    respond(&req, &data, "applications", |f| Value::Array(f.applications.clone()))
}

#[get("/banks")]
async fn banks(req: HttpRequest, data: web::Data<Shared>) -> HttpResponse {
    respond(&req, &data, "banks", |f| f.banks.clone())
}

#[post("/applications")]
async fn create_application(
    req: HttpRequest,
    data: web::Data<Shared>,
    body: web::Json<Value>,
) -> HttpResponse {
    let mut fixtures = data.lock().unwrap();
    if let Some(response) = guard(&req, &fixtures, "create_application") {
        return response;
    }

    let body = body.into_inner();
    let id = fixtures.applications.len() + 100;
    let created = json!({
        "application_id": id,
        "bank_id": body["bank_id"],
        "type_code": body["type_code"],
        "requested_amount": body["requested_amount"],
        "status_code": "PENDING",
        "submitted_at": format!("2025-03-{:02}T10:00:00Z", 1 + fixtures.submitted.len()),
    });

    fixtures.submitted.push(body);
    fixtures.applications.push(created.clone());

    HttpResponse::Created().json(created)
}
