//! Inline widgets hosted inside chat messages.
//!
//! Each widget owns its own form state and steps through its own state
//! machine. The host only sees [`WidgetSignal`]s: a request to run a timer,
//! or a completion that is turned into a dispatcher action.

pub mod booking;
pub mod coverage;
pub mod policy;
pub mod providers;
pub mod telemedicine;

use std::sync::Arc;

use chrono::NaiveDate;
use travelcare_core::catalog::Catalog;
use travelcare_core::types::Profile;

use crate::error::WidgetError;
use crate::types::{ActionId, ActionPayload, WidgetInit, WidgetKind, WidgetRef};

pub use booking::{BookingForm, BookingStep};
pub use coverage::CoverageSearch;
pub use policy::{PolicySummary, PolicyView};
pub use providers::{ProviderFilter, ProviderSearch};
pub use telemedicine::{TelemedicineConnect, TelemedicineStep};

/// A deferred step a widget asks the host to run later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetTimer {
    /// Telemedicine connection established.
    Connected,
    /// Confirmed booking closes itself.
    AutoComplete,
}

/// How a widget finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetOutcome {
    Finished { kind: WidgetKind, summary: String },
    Cancelled(WidgetKind),
    /// A provider was picked from the search results.
    BookProvider { provider_id: u32 },
}

impl WidgetOutcome {
    /// The dispatcher action this outcome is wired to.
    pub fn action(&self) -> (ActionId, ActionPayload) {
        match self {
            WidgetOutcome::Finished { .. } | WidgetOutcome::Cancelled(_) => {
                (ActionId::CloseWidget, ActionPayload::None)
            }
            WidgetOutcome::BookProvider { provider_id } => (
                ActionId::BookDoctor,
                ActionPayload::Provider {
                    provider_id: *provider_id,
                },
            ),
        }
    }
}

/// What the host must do after a widget interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetSignal {
    /// Local state changed; nothing for the host to do.
    Updated,
    /// Run the timer after its configured delay.
    Schedule(WidgetTimer),
    Complete(WidgetOutcome),
}

/// The live state of the one open widget.
#[derive(Debug, Clone)]
pub enum WidgetSession {
    Policy(PolicyView),
    Providers(ProviderSearch),
    Booking(BookingForm),
    Telemedicine(TelemedicineConnect),
    Coverage(CoverageSearch),
}

impl WidgetSession {
    /// Build a widget from its reference.
    ///
    /// Init data that does not fit the widget kind, or names an id missing
    /// from the catalog, is ignored.
    pub fn open(
        widget: &WidgetRef,
        catalog: Arc<Catalog>,
        profile: Option<&Profile>,
        today: NaiveDate,
    ) -> Self {
        let session = match widget.kind {
            WidgetKind::Policy => {
                WidgetSession::Policy(PolicyView::open(profile, &catalog, today))
            }
            WidgetKind::Providers => {
                let mut search = ProviderSearch::new(catalog);
                if let WidgetInit::ProviderKind { provider_kind } = widget.init {
                    search.set_filter(ProviderFilter::Kind(provider_kind));
                }
                WidgetSession::Providers(search)
            }
            WidgetKind::Booking => {
                let mut form = BookingForm::new(catalog, today);
                let preselected = match widget.init {
                    WidgetInit::Doctor { doctor_id } => form.select_doctor(doctor_id).map(|_| ()),
                    WidgetInit::ProviderVisit { provider_id } => {
                        form.select_provider(provider_id).map(|_| ())
                    }
                    _ => Ok(()),
                };
                if let Err(e) = preselected {
                    tracing::warn!(error = %e, "Ignoring booking preselection");
                }
                WidgetSession::Booking(form)
            }
            WidgetKind::Telemedicine => {
                let mut call = TelemedicineConnect::new(catalog);
                if let WidgetInit::TelemedicineDoctor { doctor_id } = widget.init {
                    if let Err(e) = call.select_doctor(doctor_id) {
                        tracing::warn!(error = %e, "Ignoring telemedicine preselection");
                    }
                }
                WidgetSession::Telemedicine(call)
            }
            WidgetKind::Coverage => WidgetSession::Coverage(CoverageSearch::new(catalog)),
        };

        tracing::debug!(kind = %widget.kind, init = ?widget.init, "Opened widget");
        session
    }

    pub fn kind(&self) -> WidgetKind {
        match self {
            WidgetSession::Policy(_) => WidgetKind::Policy,
            WidgetSession::Providers(_) => WidgetKind::Providers,
            WidgetSession::Booking(_) => WidgetKind::Booking,
            WidgetSession::Telemedicine(_) => WidgetKind::Telemedicine,
            WidgetSession::Coverage(_) => WidgetKind::Coverage,
        }
    }

    /// Run a timer the widget requested earlier.
    ///
    /// A timer that no longer applies to the current step is a no-op.
    pub fn fire(&mut self, timer: WidgetTimer) -> WidgetSignal {
        match (self, timer) {
            (WidgetSession::Telemedicine(call), WidgetTimer::Connected) => call.on_connected(),
            (WidgetSession::Booking(form), WidgetTimer::AutoComplete) => {
                form.finish().unwrap_or(WidgetSignal::Updated)
            }
            _ => WidgetSignal::Updated,
        }
    }

    /// Close the widget without finishing it.
    pub fn cancel(&mut self) -> WidgetSignal {
        match self {
            WidgetSession::Booking(form) => form.cancel(),
            WidgetSession::Telemedicine(call) => call.cancel(),
            other => WidgetSignal::Complete(WidgetOutcome::Cancelled(other.kind())),
        }
    }

    /// Give a signed-in profile to a widget that was waiting for one.
    pub fn profile_loaded(&mut self, profile: &Profile, catalog: &Catalog, today: NaiveDate) {
        if let WidgetSession::Policy(view) = self {
            *view = PolicyView::open(Some(profile), catalog, today);
        }
    }

    /// Human-readable rendering for text front-ends.
    pub fn describe(&self) -> String {
        match self {
            WidgetSession::Policy(view) => view.describe(),
            WidgetSession::Providers(search) => search.describe(),
            WidgetSession::Booking(form) => form.describe(),
            WidgetSession::Telemedicine(call) => call.describe(),
            WidgetSession::Coverage(search) => search.describe(),
        }
    }

    pub fn booking_mut(&mut self) -> Result<&mut BookingForm, WidgetError> {
        match self {
            WidgetSession::Booking(form) => Ok(form),
            other => Err(wrong(WidgetKind::Booking, other.kind())),
        }
    }

    pub fn telemedicine_mut(&mut self) -> Result<&mut TelemedicineConnect, WidgetError> {
        match self {
            WidgetSession::Telemedicine(call) => Ok(call),
            other => Err(wrong(WidgetKind::Telemedicine, other.kind())),
        }
    }

    pub fn providers_mut(&mut self) -> Result<&mut ProviderSearch, WidgetError> {
        match self {
            WidgetSession::Providers(search) => Ok(search),
            other => Err(wrong(WidgetKind::Providers, other.kind())),
        }
    }

    pub fn coverage_mut(&mut self) -> Result<&mut CoverageSearch, WidgetError> {
        match self {
            WidgetSession::Coverage(search) => Ok(search),
            other => Err(wrong(WidgetKind::Coverage, other.kind())),
        }
    }

    pub fn policy(&self) -> Result<&PolicyView, WidgetError> {
        match self {
            WidgetSession::Policy(view) => Ok(view),
            other => Err(wrong(WidgetKind::Policy, other.kind())),
        }
    }
}

fn wrong(expected: WidgetKind, found: WidgetKind) -> WidgetError {
    WidgetError::WrongWidget { expected, found }
}
