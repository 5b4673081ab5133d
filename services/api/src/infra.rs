use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use travel_desk::accounts::AccountService;
use travel_desk::auth::TokenService;
use travel_desk::config::AppConfig;
use travel_desk::notifications::Notifier;
use travel_desk::storage::{PgPool, PgTripRequestStore, PgUserRepository};
use travel_desk::trips::TripRequestService;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Application services wired against Postgres.
pub(crate) struct Services {
    pub(crate) trips: Arc<TripRequestService<PgTripRequestStore>>,
    pub(crate) accounts: Arc<AccountService<PgUserRepository>>,
    pub(crate) notifier: Notifier,
    pub(crate) tokens: Arc<TokenService>,
}

pub(crate) fn build_services(config: &AppConfig, pool: PgPool) -> Services {
    let tokens = Arc::new(TokenService::from_config(&config.auth));
    let notifier = Notifier::from_config(&config.mail);

    let trips = Arc::new(TripRequestService::new(
        Arc::new(PgTripRequestStore::new(pool.clone())),
        notifier.clone(),
    ));
    let accounts = Arc::new(AccountService::new(
        Arc::new(PgUserRepository::new(pool)),
        tokens.clone(),
    ));

    Services {
        trips,
        accounts,
        notifier,
        tokens,
    }
}
