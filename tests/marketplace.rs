mod common;

use std::sync::Arc;

use bigdecimal::BigDecimal;
use serde_json::json;

use common::{unreachable_config, FakeBackend, Fixtures, EMAIL, PASSWORD, TOKEN, USER_ID};
use easyfund::{
    configuration::{AppState, SessionMode, State},
    error::Error,
    handler::{
        applications::{ApplicationsPage, OFFERS_FAILED},
        dashboard::DashboardPage,
        new_application::{MessageKind, NewApplicationForm, NO_BANK_SELECTED, SUBMIT_SUCCESS},
        transactions::TransactionsPage,
        PageState,
    },
    helpers::status::Tone,
    model::{OfferKind, Role, Section, User},
    provider::{
        is_token_expired, AuthState, KeyValueStorage, MemoryStorage, SessionEvent, TOKEN_KEY,
        USER_KEY,
    },
    types::{RegisterRequest, TransactionQuery},
};

#[actix_web::test]
async fn test_submit_application_refreshes_history() {
    let backend = FakeBackend::start(Fixtures::default());
    let state = backend.signed_in().await;

    let mut form = NewApplicationForm::new(state);
    form.load().await.unwrap();

    let history = form.history.state();
    assert_eq!(history.ready().map(|h| h.entries.len()), Some(0));

    form.select_template("PERSONAL").unwrap();
    form.select_bank(2).unwrap();
    form.set_amount_text("150000");

    let created = form.submit().await.unwrap();
    assert_eq!(created.len(), 1);

    let submitted = backend.with(|f| f.submitted.clone());
    assert_eq!(
        submitted,
        vec![json!({ "bank_id": 2, "type_code": "PERSONAL", "requested_amount": "150000" })]
    );

    let message = form.message().unwrap();
    assert_eq!(message.kind, MessageKind::Success);
    assert_eq!(message.text, SUBMIT_SUCCESS);

    let history = form.history.state();
    let entries = &history.ready().unwrap().entries;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "Потребительский кредит");
    assert_eq!(entries[0].bank_name, "ВТБ");
    assert_eq!(entries[0].status.label, "На рассмотрении");
    assert_eq!(entries[0].status.tone, Tone::Warning);
    assert_eq!(entries[0].amount, "150 000 ₽");
    assert_eq!(entries[0].date, "01.03.2025");

    backend.stop().await;
}

#[actix_web::test]
async fn test_submit_without_bank_sends_nothing() {
    let backend = FakeBackend::start(Fixtures::default());
    let state = backend.signed_in().await;

    let mut form = NewApplicationForm::new(state);
    form.set_amount_text("50 000");

    let error = form.submit().await.unwrap_err();
    assert!(matches!(error, Error::Validation(_)));
    assert_eq!(form.message().unwrap().text, NO_BANK_SELECTED);
    assert!(backend.with(|f| f.submitted.is_empty()));

    backend.stop().await;
}

#[actix_web::test]
async fn test_multi_bank_submit_splits_amount() {
    let backend = FakeBackend::start(Fixtures::default());
    let state = backend.signed_in().await;

    let mut form = NewApplicationForm::new(state);
    form.load().await.unwrap();
    form.select_template("auto").unwrap();
    form.select_bank(1).unwrap();
    form.select_bank(3).unwrap();
    form.set_share(1, 70);
    form.set_amount_text("100 001");

    form.submit().await.unwrap();

    // Requests go out concurrently; arrival order is not fixed.
    let submitted = backend.with(|f| f.submitted.clone());
    let mut amounts: Vec<(i64, String)> = submitted
        .iter()
        .map(|body| {
            (
                body["bank_id"].as_i64().unwrap(),
                body["requested_amount"].as_str().unwrap().to_owned(),
            )
        })
        .collect();
    amounts.sort();
    assert_eq!(
        amounts,
        vec![(1, String::from("70000")), (3, String::from("30001"))]
    );
    assert!(submitted.iter().all(|body| body["type_code"] == "AUTO"));

    let history = form.history.state();
    assert_eq!(history.ready().unwrap().entries.len(), 2);

    backend.stop().await;
}

#[actix_web::test]
async fn test_dashboard_recomputes_zero_debt_from_loans() {
    let backend = FakeBackend::start(Fixtures {
        balance: json!({ "total_balance": "25 000", "currency": "RUB" }),
        debt: json!({ "total_debt": "0" }),
        loans: json!([
            { "loan_id": 1, "bank_id": 1, "amount": 200000, "remaining_balance": 100000, "status": "ACTIVE" },
            { "loan_id": 2, "bank_id": 3, "amount": 80000, "remaining_balance": "50 000", "status": "active" }
        ]),
        ..Fixtures::default()
    });
    let state = backend.signed_in().await;

    let page = DashboardPage::new(state);
    let dashboard = match page.load().await.unwrap() {
        PageState::Ready(dashboard) => dashboard,
        other => panic!("unexpected state {:?}", other),
    };

    assert_eq!(dashboard.total_debt, BigDecimal::from(150_000));
    assert_eq!(dashboard.total_debt_formatted, "150 000 ₽");
    assert_eq!(dashboard.total_balance_formatted, "25 000 ₽");
    assert_eq!(dashboard.active_loan_count, 2);
    assert_eq!(dashboard.debt_by_bank.len(), 2);
    assert_eq!(
        dashboard.debt_by_bank.iter().map(|s| s.percent).sum::<u32>(),
        100
    );
    assert_eq!(dashboard.debt_segments.len(), 2);
    assert!(dashboard.failed_sections.is_empty());

    backend.stop().await;
}

#[actix_web::test]
async fn test_dashboard_isolates_failed_sections() {
    let backend = FakeBackend::start(Fixtures {
        balance: json!({ "total_balance": 1200, "total_debt": "40 000" }),
        ..Fixtures::default()
    });
    backend.with(|f| {
        f.failing.insert("debt");
        f.failing.insert("transactions");
        f.failing.insert("banks");
    });
    let state = backend.signed_in().await;

    let page = DashboardPage::new(state.clone());
    let state_after = page.load().await.unwrap();
    let dashboard = state_after.ready().unwrap();

    assert_eq!(dashboard.failed_sections, vec![Section::Debt, Section::Transactions]);
    assert_eq!(dashboard.total_balance, BigDecimal::from(1200));
    // Debt endpoint down, the balance payload still carries the total.
    assert_eq!(dashboard.total_debt, BigDecimal::from(40_000));
    assert!(dashboard.recent_transactions.is_empty());
    assert!(state.session.is_authenticated());

    backend.stop().await;
}

#[actix_web::test]
async fn test_unauthorized_tears_down_session() {
    let backend = FakeBackend::start(Fixtures::default());
    let state = backend.signed_in().await;
    let mut events = state.session.subscribe();
    assert_eq!(state.session.token().as_deref(), Some(TOKEN));

    backend.with(|f| f.expired = true);

    let page = DashboardPage::new(state.clone());
    let error = page.load().await.unwrap_err();

    assert!(matches!(error, Error::Unauthorized()));
    assert!(matches!(page.page.state(), PageState::Failed(_)));
    assert_eq!(state.session.state(), AuthState::Anonymous);
    assert!(state.session.token().is_none());
    assert!(events.has_changed().unwrap());
    assert_eq!(*events.borrow_and_update(), SessionEvent::Expired);

    // Nothing is sent without a session afterwards.
    let page = ApplicationsPage::new(state);
    assert!(matches!(page.load().await, Err(Error::Unauthorized())));

    backend.stop().await;
}

#[actix_web::test]
async fn test_applications_page_merges_and_filters() {
    let backend = FakeBackend::start(Fixtures {
        loans: json!([
            { "loan_id": 5, "bank_id": 2, "amount": 300000, "status": "ACTIVE", "purpose": "Ремонт квартиры" }
        ]),
        applications: vec![
            json!({ "application_id": 9, "bank_id": 1, "type_code": "MORTGAGE", "requested_amount": "2 500 000", "status": "APPROVED" }),
        ],
        ..Fixtures::default()
    });
    let state = backend.signed_in().await;

    let page = ApplicationsPage::new(state);
    let offers = page.load().await.unwrap();
    let offers = offers.ready().unwrap();

    assert_eq!(offers.len(), 2);
    assert!(offers.iter().any(|o| o.kind == OfferKind::Loan && o.name == "Кредит #5"));
    assert!(offers.iter().any(|o| o.kind == OfferKind::Application && o.name == "Заявка #9"));

    assert_eq!(page.filtered("ремонт", None).len(), 1);
    assert_eq!(page.filtered("", Some("approved")).len(), 1);
    assert_eq!(page.filtered("", Some("all")).len(), 2);

    backend.with(|f| {
        f.failing.insert("loans");
        f.failing.insert("applications");
    });
    assert_eq!(
        page.retry().await.unwrap(),
        PageState::Failed(String::from(OFFERS_FAILED))
    );

    backend.with(|f| {
        f.failing.remove("loans");
    });
    let offers = page.retry().await.unwrap();
    assert_eq!(offers.ready().map(Vec::len), Some(1));

    backend.stop().await;
}

#[actix_web::test]
async fn test_bank_scoped_transactions() {
    let backend = FakeBackend::start(Fixtures {
        transactions: json!([
            { "transaction_id": 1, "bank_id": 2, "amount": "-1 500", "category": "food", "occurred_at": "2025-02-03T12:00:00Z" },
            { "transaction_id": 2, "bank_id": 2, "amount": 40000, "category": "salary", "occurred_at": "2025-02-05T09:00:00Z" },
            { "transaction_id": 3, "bank_id": 2, "amount": -500, "category": "transport", "occurred_at": "2025-02-06T18:30:00Z" }
        ]),
        ..Fixtures::default()
    });
    backend.with(|f| {
        f.failing.insert("transactions");
    });
    let state = backend.signed_in().await;

    let page = TransactionsPage::new(state);
    let query = TransactionQuery {
        limit: Some(20),
        bank_id: Some(2),
        ..TransactionQuery::default()
    };
    let history = page.load(&query).await.unwrap();
    let history = history.ready().unwrap();

    assert_eq!(history.transactions.len(), 3);
    assert_eq!(history.total_spent, BigDecimal::from(2000));

    backend.stop().await;
}

#[actix_web::test]
async fn test_fallback_uses_demo_when_backend_is_down() {
    let state = State::with_storage(
        unreachable_config(SessionMode::Fallback),
        Arc::new(MemoryStorage::new()),
    )
    .unwrap();
    let state = AppState::new(state);

    let session = state.auth.login("maria@example.com", "anything").await.unwrap();
    assert_eq!(session.user.user_id, "1");
    assert_eq!(session.user.full_name, "maria");
    assert_eq!(session.user.role, Role::Client);
    assert!(!is_token_expired(&session.token, chrono::Utc::now().timestamp()));
    assert_eq!(state.session.last_event(), SessionEvent::LoggedIn);
}

#[actix_web::test]
async fn test_backend_mode_surfaces_transport_failure() {
    let state = State::with_storage(
        unreachable_config(SessionMode::Backend),
        Arc::new(MemoryStorage::new()),
    )
    .unwrap();

    let error = state.auth.login(EMAIL, PASSWORD).await.unwrap_err();
    assert!(error.is_unavailable());
    assert_eq!(state.session.state(), AuthState::Anonymous);
}

#[actix_web::test]
async fn test_fallback_never_masks_rejected_credentials() {
    let backend = FakeBackend::start(Fixtures::default());
    let state = backend.state(SessionMode::Fallback);

    let error = state.auth.login(EMAIL, "wrong-password").await.unwrap_err();
    match error {
        Error::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Неверный email или пароль");
        },
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(state.session.state(), AuthState::Anonymous);

    backend.with(|f| f.login_status = Some(503));
    let session = state.auth.login(EMAIL, PASSWORD).await.unwrap();
    assert_eq!(session.user.user_id, "1");

    backend.stop().await;
}

#[actix_web::test]
async fn test_demo_admin_and_logout() {
    let backend = FakeBackend::start(Fixtures::default());
    let state = backend.state(SessionMode::Demo);

    let session = state
        .auth
        .login("admin@easyfund.com", "admin123")
        .await
        .unwrap();
    assert_eq!(session.user.full_name, "Admin User");
    assert_eq!(session.user.role, Role::BankRiskManager);

    state.auth.logout().await.unwrap();
    assert_eq!(state.session.state(), AuthState::Anonymous);
    assert_eq!(state.session.last_event(), SessionEvent::LoggedOut);

    backend.stop().await;
}

#[actix_web::test]
async fn test_failed_login_keeps_existing_session() {
    let backend = FakeBackend::start(Fixtures::default());
    let storage = Arc::new(MemoryStorage::new());
    let state = backend.state_with_storage(SessionMode::Backend, storage.clone());
    let session = state.auth.login(EMAIL, PASSWORD).await.unwrap();

    assert!(state.auth.login(EMAIL, "wrong-password").await.is_err());
    assert_eq!(state.session.state(), AuthState::Authenticated(session.clone()));

    backend.with(|f| f.login_status = Some(500));
    let request = RegisterRequest {
        full_name: String::from("Иван Петров"),
        email: String::from("ivan@example.com"),
        phone: String::new(),
        password: String::from("another-pass"),
    };
    assert!(state.auth.register(&request).await.is_err());
    assert_eq!(state.session.current_session(), Some(session.clone()));

    // A restart restores the same user that memory holds.
    let restarted = backend.state_with_storage(SessionMode::Backend, storage.clone());
    assert_eq!(restarted.session.current_session(), Some(session));
    assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some(TOKEN));

    backend.stop().await;
}

#[actix_web::test]
async fn test_logout_clears_local_state_when_backend_fails() {
    let backend = FakeBackend::start(Fixtures::default());
    let storage = Arc::new(MemoryStorage::new());
    let state = backend.state_with_storage(SessionMode::Backend, storage.clone());
    state.auth.login(EMAIL, PASSWORD).await.unwrap();
    assert!(storage.get(USER_KEY).unwrap().is_some());

    backend.with(|f| {
        f.failing.insert("logout");
    });
    state.auth.logout().await.unwrap();

    assert_eq!(state.session.state(), AuthState::Anonymous);
    assert_eq!(state.session.last_event(), SessionEvent::LoggedOut);
    assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    assert_eq!(storage.get(USER_KEY).unwrap(), None);

    backend.stop().await;
}

#[actix_web::test]
async fn test_user_profile_and_accounts() {
    let backend = FakeBackend::start(Fixtures {
        accounts: json!([
            { "account_id": 11, "bank_id": 2, "balance": "5 000", "currency": "RUB" },
            { "account_id": "12", "bank_id": "4", "balance": 0 }
        ]),
        ..Fixtures::default()
    });
    let state = backend.signed_in().await;
    let user_id = state.session.current_session().unwrap().user.user_id;
    assert_eq!(user_id, USER_ID.to_string());

    let user = User::decode(state.api.get_user(&user_id).await.unwrap()).unwrap();
    assert_eq!(user.email, EMAIL);
    assert_eq!(user.role, Role::Client);

    let accounts = state.api.get_accounts(&user_id).await.unwrap();
    let banks: Vec<Option<i64>> = accounts
        .iter()
        .map(|account| account.bank_id.as_ref().and_then(|id| id.as_i64()))
        .collect();
    assert_eq!(banks, vec![Some(2), Some(4)]);

    backend.with(|f| f.expired = true);
    assert!(matches!(
        state.api.get_accounts(&user_id).await,
        Err(Error::Unauthorized())
    ));

    backend.stop().await;
}
