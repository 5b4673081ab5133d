use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{info, warn};

use super::mailer::{EmailMessage, Mailbox, Mailer, MailerError};
use super::templates::{self, RenderedEmail};
use crate::contact::ContactMessage;
use crate::trips::domain::TripRequest;
use crate::validation::is_valid_email;

pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of one message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryOutcome {
    pub sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeliveryOutcome {
    pub fn delivered() -> Self {
        Self {
            sent: true,
            error: None,
        }
    }

    pub fn failed(reason: impl ToString) -> Self {
        Self {
            sent: false,
            error: Some(reason.to_string()),
        }
    }
}

/// Per-recipient outcomes for one notification. Logged, never returned to
/// HTTP clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResult {
    pub agency_email: DeliveryOutcome,
    pub customer_email: DeliveryOutcome,
}

/// Best-effort email fan-out. Each message gets its own timeout and error
/// boundary, so one failing recipient never affects the other.
#[derive(Debug, Clone)]
pub struct Notifier {
    mailer: Result<Arc<dyn Mailer>, MailerError>,
    agency_address: Option<String>,
    sender: Option<Mailbox>,
    timeout: Duration,
    in_flight: Arc<InFlight>,
}

/// Detached notification tasks that have not finished yet.
#[derive(Debug, Default)]
struct InFlight {
    running: AtomicUsize,
    idle: Notify,
}

impl InFlight {
    fn enter(self: &Arc<Self>) -> InFlightGuard {
        self.running.fetch_add(1, Ordering::AcqRel);
        InFlightGuard(Arc::clone(self))
    }

    fn running(&self) -> usize {
        self.running.load(Ordering::Acquire)
    }

    async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.running() == 0 {
                return;
            }
            notified.await;
        }
    }
}

struct InFlightGuard(Arc<InFlight>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.0.running.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

impl Notifier {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        agency_address: impl Into<String>,
        sender: Mailbox,
    ) -> Self {
        Self {
            mailer: Ok(mailer),
            agency_address: Some(agency_address.into()),
            sender: Some(sender),
            timeout: DEFAULT_SEND_TIMEOUT,
            in_flight: Arc::default(),
        }
    }

    /// A notifier whose every send fails with `reason`; used when no provider
    /// can be built from the environment.
    pub fn unconfigured(reason: MailerError) -> Self {
        Self {
            mailer: Err(reason),
            agency_address: None,
            sender: None,
            timeout: DEFAULT_SEND_TIMEOUT,
            in_flight: Arc::default(),
        }
    }

    pub(crate) fn from_parts(
        mailer: Result<Arc<dyn Mailer>, MailerError>,
        agency_address: Option<String>,
        sender: Option<Mailbox>,
        timeout: Duration,
    ) -> Self {
        Self {
            mailer,
            agency_address,
            sender,
            timeout,
            in_flight: Arc::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn provider(&self) -> Option<&'static str> {
        self.mailer.as_ref().ok().map(|mailer| mailer.provider())
    }

    /// Dispatched notifications that are still sending.
    pub fn in_flight(&self) -> usize {
        self.in_flight.running()
    }

    /// Wait up to `limit` for dispatched notifications to finish and return
    /// how many were still running when the wait ended.
    pub async fn drain(&self, limit: Duration) -> usize {
        let _ = timeout(limit, self.in_flight.wait_idle()).await;
        self.in_flight.running()
    }

    /// Send the agency lead and, when the traveler's address is usable, the
    /// confirmation. Both run concurrently.
    pub async fn notify_new_request(&self, trip: &TripRequest) -> NotificationResult {
        let (agency_email, customer_email) = tokio::join!(
            self.deliver(self.agency_recipient(), templates::trip_lead(trip)),
            self.deliver_to_customer(&trip.email, templates::trip_confirmation(trip)),
        );
        NotificationResult {
            agency_email,
            customer_email,
        }
    }

    pub async fn notify_contact(&self, message: &ContactMessage) -> NotificationResult {
        let (agency_email, customer_email) = tokio::join!(
            self.deliver(self.agency_recipient(), templates::contact_lead(message)),
            self.deliver_to_customer(
                &message.email,
                templates::contact_acknowledgement(message)
            ),
        );
        NotificationResult {
            agency_email,
            customer_email,
        }
    }

    /// Fire-and-forget wrapper around [`Notifier::notify_new_request`]. The
    /// handle may be dropped; the task keeps running and logs its outcome.
    pub fn dispatch_new_request(&self, trip: TripRequest) -> JoinHandle<NotificationResult> {
        let notifier = self.clone();
        let guard = self.in_flight.enter();
        tokio::spawn(async move {
            let _guard = guard;
            let result = notifier.notify_new_request(&trip).await;
            log_result("trip_request", &trip.id.to_string(), &result);
            result
        })
    }

    pub fn dispatch_contact(&self, message: ContactMessage) -> JoinHandle<NotificationResult> {
        let notifier = self.clone();
        let guard = self.in_flight.enter();
        tokio::spawn(async move {
            let _guard = guard;
            let result = notifier.notify_contact(&message).await;
            log_result("contact", &message.email, &result);
            result
        })
    }

    fn agency_recipient(&self) -> Result<&str, MailerError> {
        self.agency_address
            .as_deref()
            .ok_or_else(|| MailerError::Configuration("MAIL_ADMIN_ADDRESS is not set".to_string()))
    }

    /// HTTP intake already rejects malformed addresses; this covers other
    /// callers such as replays of stored records.
    async fn deliver_to_customer(&self, address: &str, email: RenderedEmail) -> DeliveryOutcome {
        if !is_valid_email(address) {
            return DeliveryOutcome::failed(format!(
                "skipped: '{address}' is not a deliverable address"
            ));
        }
        self.deliver(Ok(address), email).await
    }

    async fn deliver(
        &self,
        recipient: Result<&str, MailerError>,
        email: RenderedEmail,
    ) -> DeliveryOutcome {
        let (mailer, message) = match self.compose(recipient, email) {
            Ok(ready) => ready,
            Err(err) => return DeliveryOutcome::failed(err),
        };

        match timeout(self.timeout, mailer.send(&message)).await {
            Ok(Ok(())) => DeliveryOutcome::delivered(),
            Ok(Err(err)) => DeliveryOutcome::failed(err),
            Err(_) => DeliveryOutcome::failed(MailerError::Timeout(self.timeout)),
        }
    }

    fn compose(
        &self,
        recipient: Result<&str, MailerError>,
        email: RenderedEmail,
    ) -> Result<(&Arc<dyn Mailer>, EmailMessage), MailerError> {
        let mailer = self.mailer.as_ref().map_err(|err| err.clone())?;
        let from = self
            .sender
            .clone()
            .ok_or_else(|| MailerError::Configuration("MAIL_FROM_ADDRESS is not set".to_string()))?;
        let to = recipient?.to_string();
        Ok((
            mailer,
            EmailMessage {
                from,
                to,
                subject: email.subject,
                html: email.html,
            },
        ))
    }
}

fn log_result(kind: &'static str, reference: &str, result: &NotificationResult) {
    for (channel, outcome) in [
        ("agency", &result.agency_email),
        ("customer", &result.customer_email),
    ] {
        match &outcome.error {
            None => info!(kind, reference, channel, "notification sent"),
            Some(error) => warn!(kind, reference, channel, %error, "notification failed"),
        }
    }
}
