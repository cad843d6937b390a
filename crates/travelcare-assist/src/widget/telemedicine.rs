//! Telemedicine connect simulation.
//!
//! No media is carried. Connecting only waits out the configured delay.

use std::fmt;
use std::sync::Arc;

use travelcare_core::catalog::{Catalog, TelemedicineDoctor};

use super::{WidgetOutcome, WidgetSignal, WidgetTimer};
use crate::error::WidgetError;
use crate::types::WidgetKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemedicineStep {
    SelectDoctor,
    Connecting,
    Connected,
    Ended,
}

impl fmt::Display for TelemedicineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemedicineStep::SelectDoctor => write!(f, "select_doctor"),
            TelemedicineStep::Connecting => write!(f, "connecting"),
            TelemedicineStep::Connected => write!(f, "connected"),
            TelemedicineStep::Ended => write!(f, "ended"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelemedicineConnect {
    catalog: Arc<Catalog>,
    step: TelemedicineStep,
    doctor_id: Option<u32>,
}

impl TelemedicineConnect {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            step: TelemedicineStep::SelectDoctor,
            doctor_id: None,
        }
    }

    pub fn step(&self) -> TelemedicineStep {
        self.step
    }

    pub fn doctor(&self) -> Option<&TelemedicineDoctor> {
        self.doctor_id
            .and_then(|id| self.catalog.telemedicine_doctor(id))
    }

    pub fn select_doctor(&mut self, doctor_id: u32) -> Result<WidgetSignal, WidgetError> {
        self.expect(TelemedicineStep::SelectDoctor, "select doctor")?;
        if self.catalog.telemedicine_doctor(doctor_id).is_none() {
            return Err(WidgetError::UnknownDoctor(doctor_id));
        }
        self.doctor_id = Some(doctor_id);
        Ok(WidgetSignal::Updated)
    }

    /// Start connecting to the selected doctor.
    pub fn connect(&mut self) -> Result<WidgetSignal, WidgetError> {
        self.expect(TelemedicineStep::SelectDoctor, "connect")?;
        let doctor = self.doctor().ok_or_else(|| WidgetError::InvalidStep {
            widget: WidgetKind::Telemedicine,
            step: "connect without a doctor".to_string(),
        })?;
        tracing::info!(doctor = %doctor.name, "Connecting video consultation");
        self.step = TelemedicineStep::Connecting;
        Ok(WidgetSignal::Schedule(WidgetTimer::Connected))
    }

    /// Select a doctor and connect in one step.
    pub fn connect_to(&mut self, doctor_id: u32) -> Result<WidgetSignal, WidgetError> {
        self.select_doctor(doctor_id)?;
        self.connect()
    }

    pub(crate) fn on_connected(&mut self) -> WidgetSignal {
        if self.step == TelemedicineStep::Connecting {
            self.step = TelemedicineStep::Connected;
        }
        WidgetSignal::Updated
    }

    pub fn end_call(&mut self) -> Result<WidgetSignal, WidgetError> {
        if !matches!(
            self.step,
            TelemedicineStep::Connecting | TelemedicineStep::Connected
        ) {
            return Err(WidgetError::InvalidStep {
                widget: WidgetKind::Telemedicine,
                step: format!("end call from {}", self.step),
            });
        }
        self.step = TelemedicineStep::Ended;
        let name = self.doctor().map(|d| d.name.clone()).unwrap_or_default();
        Ok(WidgetSignal::Complete(WidgetOutcome::Finished {
            kind: WidgetKind::Telemedicine,
            summary: format!("Consultation with {} ended", name),
        }))
    }

    pub fn cancel(&mut self) -> WidgetSignal {
        self.step = TelemedicineStep::Ended;
        WidgetSignal::Complete(WidgetOutcome::Cancelled(WidgetKind::Telemedicine))
    }

    fn expect(&self, step: TelemedicineStep, attempted: &str) -> Result<(), WidgetError> {
        if self.step == step {
            Ok(())
        } else {
            Err(WidgetError::InvalidStep {
                widget: WidgetKind::Telemedicine,
                step: format!("{} from {}", attempted, self.step),
            })
        }
    }

    pub fn describe(&self) -> String {
        let mut lines = vec![format!("[telemedicine: {}]", self.step)];
        match self.step {
            TelemedicineStep::SelectDoctor => {
                for d in &self.catalog.telemedicine_doctors {
                    let marker = if Some(d.id) == self.doctor_id { "*" } else { " " };
                    lines.push(format!(
                        " {}{}. {} - {} - {} - {} (wait {}) - {}",
                        marker,
                        d.id,
                        d.name,
                        d.specialty,
                        d.fee,
                        d.availability,
                        d.wait_time,
                        d.languages.join(", ")
                    ));
                }
            }
            TelemedicineStep::Connecting => {
                let name = self.doctor().map(|d| d.name.as_str()).unwrap_or("?");
                lines.push(format!("  Connecting to {}...", name));
            }
            TelemedicineStep::Connected => {
                let name = self.doctor().map(|d| d.name.as_str()).unwrap_or("?");
                lines.push(format!("  Connected to {} (Live)", name));
            }
            TelemedicineStep::Ended => lines.push("  Call ended".into()),
        }
        lines.join("\n")
    }
}
