//! Admin panel actions through a running Store

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use rifa_core::error::ApiError;
use rifa_core::wire::SaleOutcome;
use rifa_runtime::Store;
use rifa_storefront::admin::{CancelRequest, SALE_CONNECTIVITY_NOTICE, SaleRequest};
use rifa_storefront::{AdminAction, AdminEnvironment, AdminReducer, AdminState};
use rifa_testing::{RecordingPage, ScriptedAdminApi};
use std::sync::Arc;

type AdminPanel = Store<AdminState, AdminAction, AdminEnvironment, AdminReducer>;

fn panel() -> (AdminPanel, ScriptedAdminApi, RecordingPage) {
    let api = ScriptedAdminApi::new();
    let page = RecordingPage::new();
    let store = Store::new(
        AdminState::default(),
        AdminReducer::new(),
        AdminEnvironment::new(Arc::new(api.clone()), Arc::new(page.clone())),
    );
    (store, api, page)
}

fn sale() -> SaleRequest {
    SaleRequest {
        action: "/panel/reservas/31/confirmar/".into(),
        csrf_token: "tok-123".into(),
        ticket: "045".into(),
        buyer_name: "Ana María".into(),
        phone: "5551234".into(),
    }
}

async fn press(store: &AdminPanel, action: AdminAction) {
    store.send(action).await.unwrap().wait().await;
}

#[tokio::test]
async fn confirmed_sale_opens_messaging_and_reloads() {
    let (store, api, page) = panel();
    page.answer_confirm(true);
    api.push_sale(Ok(SaleOutcome::Confirmed {
        whatsapp_url: Some("https://wa.me/5551234?text=hola".into()),
        message: None,
    }));

    press(&store, AdminAction::ConfirmSaleRequested(sale())).await;

    let requests = api.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].action, sale().action);
    assert_eq!(requests[0].csrf_token, "tok-123");
    assert_eq!(page.prompts(), vec![sale().prompt()]);
    assert_eq!(page.opened(), vec!["https://wa.me/5551234?text=hola".to_string()]);
    assert_eq!(page.alerts(), vec![sale().confirmed_notice()]);
    assert_eq!(page.reloads(), 1);
    assert!(!store.state(|s| s.is_pending(&sale().action)).await);
}

#[tokio::test]
async fn declined_prompt_sends_nothing() {
    let (store, api, page) = panel();
    page.answer_confirm(false);

    press(&store, AdminAction::ConfirmSaleRequested(sale())).await;

    assert!(api.requests().is_empty());
    assert!(page.alerts().is_empty());
    assert_eq!(page.reloads(), 0);
    assert!(!store.state(|s| s.is_pending(&sale().action)).await);
}

#[tokio::test]
async fn rejected_sale_shows_server_message() {
    let (store, api, page) = panel();
    page.answer_confirm(true);
    api.push_sale(Ok(SaleOutcome::Rejected {
        message: Some("El número ya fue vendido".into()),
    }));

    press(&store, AdminAction::ConfirmSaleRequested(sale())).await;

    assert_eq!(
        page.alerts(),
        vec!["Error al confirmar venta: El número ya fue vendido".to_string()]
    );
    assert!(page.opened().is_empty());
    assert_eq!(page.reloads(), 0);
}

#[tokio::test]
async fn unreachable_server_shows_connectivity_notice() {
    let (store, api, page) = panel();
    page.answer_confirm(true);
    api.push_sale(Err(ApiError::RequestFailed("connection refused".into())));

    press(&store, AdminAction::ConfirmSaleRequested(sale())).await;

    assert_eq!(page.alerts(), vec![SALE_CONNECTIVITY_NOTICE.to_string()]);
    assert_eq!(page.reloads(), 0);
}

#[tokio::test]
async fn cancellation_reloads_the_panel() {
    let (store, api, page) = panel();
    let request = CancelRequest {
        action: "/panel/reservas/31/cancelar/".into(),
        csrf_token: "tok-123".into(),
        ticket: "045".into(),
    };

    press(&store, AdminAction::CancelReservationRequested(request.clone())).await;

    let requests = api.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].action, request.action);
    assert_eq!(page.reloads(), 1);
    assert!(page.alerts().is_empty());
}
