//! Raffle storefront client binary
//!
//! Loads the page, keeps it reconciled with the server and drives it from an
//! interactive shell.

use anyhow::Context;
use rifa_core::environment::{RaffleApi, SystemClock};
use rifa_core::wire::StatusReport;
use rifa_runtime::metrics::MetricsServer;
use rifa_runtime::{Poller, Store};
use rifa_storefront::admin::AdminAction;
use rifa_storefront::http::HttpClient;
use rifa_storefront::page::{ConsoleInput, TerminalPage};
use rifa_storefront::shell::{Command, HELP};
use rifa_storefront::storage::FileStorage;
use rifa_storefront::summary::ModalTarget;
use rifa_storefront::{
    AdminEnvironment, AdminReducer, AdminState, Config, StorefrontAction, StorefrontEnvironment,
    StorefrontReducer, StorefrontState, view,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Storefront = Store<StorefrontState, StorefrontAction, StorefrontEnvironment, StorefrontReducer>;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("loading configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("rifa_storefront={0},rifa_runtime={0}", config.log_filter).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(addr) = config.metrics_addr {
        let mut metrics_server = MetricsServer::new(addr);
        metrics_server.start().context("starting metrics server")?;
    }

    let http = Arc::new(
        HttpClient::new(config.base_url.clone(), config.http_timeout)
            .context("building HTTP client")?,
    );
    let input = ConsoleInput::spawn();
    let page = Arc::new(TerminalPage::new(input.clone()));
    let ticket_count = config.ticket_count;

    // The server-rendered page: whatever the status endpoint reports right now
    let tickets = match http.ticket_statuses().await {
        Ok(StatusReport::Snapshot(tickets)) => tickets,
        Ok(StatusReport::Unavailable { status, message }) => {
            tracing::warn!(status = %status, message = ?message, "No tickets to show");
            Vec::new()
        },
        Err(error) => {
            tracing::warn!(error = %error, "Could not load tickets, starting empty");
            Vec::new()
        },
    };

    let store: Storefront = Store::new(
        StorefrontState::default(),
        StorefrontReducer::new(),
        StorefrontEnvironment::new(
            Arc::new(FileStorage::new(&config.storage_path)),
            http.clone(),
            page.clone(),
            Arc::new(SystemClock),
            config.settings(),
        ),
    );
    let admin = Store::new(
        AdminState::default(),
        AdminReducer::new(),
        AdminEnvironment::new(http, page),
    );

    let last_view = Arc::new(Mutex::new(String::new()));
    spawn_view_printer(&store, Arc::clone(&last_view), ticket_count);

    store
        .send(StorefrontAction::PageLoaded {
            raffle_id: config.raffle_id.clone(),
            location: config.page_location()?,
            tickets,
        })
        .await?
        .wait()
        .await;
    print_view(&store, &last_view, ticket_count, true).await;

    let poller = Poller::spawn(store.clone(), config.poll_interval, || StorefrontAction::PollTick);
    println!("Escribe `help` para ver los comandos.");

    while let Some(line) = input.next_line().await {
        let command = match Command::parse(&line, ticket_count) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(error) => {
                println!("{error}");
                continue;
            },
        };

        let action = match command {
            Command::Quit => break,
            Command::Help => {
                println!("{HELP}");
                continue;
            },
            Command::Grid => {
                print_view(&store, &last_view, ticket_count, true).await;
                continue;
            },
            Command::Sale(request) => {
                // The confirmation prompt reads the next line, so wait for the whole exchange
                admin.send(AdminAction::ConfirmSaleRequested(request)).await?.wait().await;
                continue;
            },
            Command::Cancel(request) => {
                admin
                    .send(AdminAction::CancelReservationRequested(request))
                    .await?
                    .wait()
                    .await;
                continue;
            },
            Command::Click(id) => StorefrontAction::TicketClicked { id },
            Command::Buy => StorefrontAction::PurchaseButtonClicked,
            Command::Chip(id) => StorefrontAction::SummaryChipClicked { id },
            Command::Close => StorefrontAction::ModalClicked {
                target: ModalTarget::CloseButton,
            },
            Command::Backdrop => StorefrontAction::ModalClicked {
                target: ModalTarget::Backdrop,
            },
            Command::Modal => StorefrontAction::ModalClicked {
                target: ModalTarget::Content,
            },
            Command::Search(text) => StorefrontAction::SearchInputChanged { text },
            Command::Range(range) => StorefrontAction::RangeRequested { range },
        };

        store.send(action).await?;
        print_view(&store, &last_view, ticket_count, true).await;
    }

    poller.stop();
    if let Err(error) = store.shutdown(SHUTDOWN_TIMEOUT).await {
        tracing::warn!(error = %error, "Storefront did not shut down cleanly");
    }
    if let Err(error) = admin.shutdown(SHUTDOWN_TIMEOUT).await {
        tracing::warn!(error = %error, "Admin panel did not shut down cleanly");
    }
    Ok(())
}

/// Print the view after effect-produced actions whenever it changed
fn spawn_view_printer(store: &Storefront, last_view: Arc<Mutex<String>>, ticket_count: u32) {
    let mut actions = store.subscribe_actions();
    let store = store.clone();
    tokio::spawn(async move {
        loop {
            match actions.recv().await {
                Ok(_) => print_view(&store, &last_view, ticket_count, false).await,
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "View printer lagged");
                },
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

async fn print_view(store: &Storefront, last_view: &Mutex<String>, ticket_count: u32, always: bool) {
    let text = store.state(|state| view::render(state, ticket_count)).await;
    let Ok(mut last) = last_view.lock() else {
        return;
    };
    if always || *last != text {
        println!("{text}");
        *last = text;
    }
}
