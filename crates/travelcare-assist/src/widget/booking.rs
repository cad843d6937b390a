//! Appointment booking form.
//!
//! Steps: SelectProvider -> SelectDate -> SelectTime -> EnterReason ->
//! Confirm -> Booked. Any step before Booked may move to Cancelled.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use travelcare_core::catalog::Catalog;

use super::{WidgetOutcome, WidgetSignal, WidgetTimer};
use crate::error::WidgetError;
use crate::types::WidgetKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStep {
    SelectProvider,
    SelectDate,
    SelectTime,
    EnterReason,
    Confirm,
    Booked,
    Cancelled,
}

impl fmt::Display for BookingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStep::SelectProvider => write!(f, "select_provider"),
            BookingStep::SelectDate => write!(f, "select_date"),
            BookingStep::SelectTime => write!(f, "select_time"),
            BookingStep::EnterReason => write!(f, "enter_reason"),
            BookingStep::Confirm => write!(f, "confirm"),
            BookingStep::Booked => write!(f, "booked"),
            BookingStep::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Validate a booking step transition.
pub fn validate_transition(from: BookingStep, to: BookingStep) -> Result<(), WidgetError> {
    let valid = matches!(
        (from, to),
        (BookingStep::SelectProvider, BookingStep::SelectDate)
            | (BookingStep::SelectDate, BookingStep::SelectTime)
            | (BookingStep::SelectTime, BookingStep::EnterReason)
            | (BookingStep::EnterReason, BookingStep::Confirm)
            | (BookingStep::Confirm, BookingStep::Booked)
            | (BookingStep::SelectProvider, BookingStep::Cancelled)
            | (BookingStep::SelectDate, BookingStep::Cancelled)
            | (BookingStep::SelectTime, BookingStep::Cancelled)
            | (BookingStep::EnterReason, BookingStep::Cancelled)
            | (BookingStep::Confirm, BookingStep::Cancelled)
    );

    if valid {
        Ok(())
    } else {
        Err(WidgetError::InvalidStep {
            widget: WidgetKind::Booking,
            step: format!("{} -> {}", from, to),
        })
    }
}

/// Who the appointment is with.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Practitioner {
    Doctor(u32),
    Provider(u32),
}

#[derive(Debug, Clone)]
pub struct BookingForm {
    catalog: Arc<Catalog>,
    today: NaiveDate,
    step: BookingStep,
    practitioner: Option<Practitioner>,
    date: Option<NaiveDate>,
    time: Option<String>,
    reason: Option<String>,
}

impl BookingForm {
    pub fn new(catalog: Arc<Catalog>, today: NaiveDate) -> Self {
        Self {
            catalog,
            today,
            step: BookingStep::SelectProvider,
            practitioner: None,
            date: None,
            time: None,
            reason: None,
        }
    }

    pub fn step(&self) -> BookingStep {
        self.step
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn time(&self) -> Option<&str> {
        self.time.as_deref()
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Display name of the selected doctor or provider.
    pub fn practitioner_name(&self) -> Option<&str> {
        match self.practitioner.as_ref()? {
            Practitioner::Doctor(id) => self.catalog.doctor(*id).map(|d| d.name.as_str()),
            Practitioner::Provider(id) => self.catalog.provider(*id).map(|p| p.name.as_str()),
        }
    }

    pub fn select_doctor(&mut self, doctor_id: u32) -> Result<WidgetSignal, WidgetError> {
        validate_transition(self.step, BookingStep::SelectDate)?;
        if self.catalog.doctor(doctor_id).is_none() {
            return Err(WidgetError::UnknownDoctor(doctor_id));
        }
        self.practitioner = Some(Practitioner::Doctor(doctor_id));
        self.step = BookingStep::SelectDate;
        Ok(WidgetSignal::Updated)
    }

    pub fn select_provider(&mut self, provider_id: u32) -> Result<WidgetSignal, WidgetError> {
        validate_transition(self.step, BookingStep::SelectDate)?;
        if self.catalog.provider(provider_id).is_none() {
            return Err(WidgetError::UnknownProvider(provider_id));
        }
        self.practitioner = Some(Practitioner::Provider(provider_id));
        self.step = BookingStep::SelectDate;
        Ok(WidgetSignal::Updated)
    }

    pub fn select_date(&mut self, date: NaiveDate) -> Result<WidgetSignal, WidgetError> {
        validate_transition(self.step, BookingStep::SelectTime)?;
        if date < self.today {
            return Err(WidgetError::DateInPast(date));
        }
        self.date = Some(date);
        self.step = BookingStep::SelectTime;
        Ok(WidgetSignal::Updated)
    }

    pub fn select_time(&mut self, slot: &str) -> Result<WidgetSignal, WidgetError> {
        validate_transition(self.step, BookingStep::EnterReason)?;
        if !self.catalog.has_time_slot(slot) {
            return Err(WidgetError::UnknownTimeSlot(slot.to_string()));
        }
        self.time = Some(slot.to_string());
        self.step = BookingStep::EnterReason;
        Ok(WidgetSignal::Updated)
    }

    pub fn enter_reason(&mut self, reason: &str) -> Result<WidgetSignal, WidgetError> {
        validate_transition(self.step, BookingStep::Confirm)?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(WidgetError::EmptyReason);
        }
        self.reason = Some(reason.to_string());
        self.step = BookingStep::Confirm;
        Ok(WidgetSignal::Updated)
    }

    /// Book the appointment. The form closes itself after a delay.
    pub fn confirm(&mut self) -> Result<WidgetSignal, WidgetError> {
        validate_transition(self.step, BookingStep::Booked)?;
        self.step = BookingStep::Booked;
        tracing::info!(
            with = self.practitioner_name().unwrap_or("unknown"),
            date = ?self.date,
            time = self.time.as_deref().unwrap_or(""),
            "Appointment booked"
        );
        Ok(WidgetSignal::Schedule(WidgetTimer::AutoComplete))
    }

    /// Leave the confirmation screen.
    pub fn finish(&mut self) -> Result<WidgetSignal, WidgetError> {
        if self.step != BookingStep::Booked {
            return Err(WidgetError::InvalidStep {
                widget: WidgetKind::Booking,
                step: format!("finish from {}", self.step),
            });
        }
        Ok(WidgetSignal::Complete(WidgetOutcome::Finished {
            kind: WidgetKind::Booking,
            summary: self.summary(),
        }))
    }

    /// Cancel from any unfinished step. A booked form finishes instead.
    pub fn cancel(&mut self) -> WidgetSignal {
        if self.step == BookingStep::Booked {
            return WidgetSignal::Complete(WidgetOutcome::Finished {
                kind: WidgetKind::Booking,
                summary: self.summary(),
            });
        }
        self.step = BookingStep::Cancelled;
        WidgetSignal::Complete(WidgetOutcome::Cancelled(WidgetKind::Booking))
    }

    pub fn summary(&self) -> String {
        let date = self
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        format!(
            "Your appointment with {} is confirmed for {} at {}",
            self.practitioner_name().unwrap_or("your doctor"),
            date,
            self.time.as_deref().unwrap_or("")
        )
    }

    pub fn describe(&self) -> String {
        let mut lines = vec![format!("[booking: {}]", self.step)];
        match self.step {
            BookingStep::SelectProvider => {
                for d in &self.catalog.doctors {
                    lines.push(format!(
                        "  {}. {} ({}) - {} - {} - ★{}",
                        d.id, d.name, d.specialty, d.next_available, d.fee, d.rating
                    ));
                }
            }
            BookingStep::SelectDate => {
                lines.push(format!(
                    "  With {}. Pick a date from {}",
                    self.practitioner_name().unwrap_or("?"),
                    self.today
                ));
            }
            BookingStep::SelectTime => {
                lines.push(format!("  Slots: {}", self.catalog.time_slots.join(", ")));
            }
            BookingStep::EnterReason => lines.push("  Describe the reason for your visit".into()),
            BookingStep::Confirm => {
                lines.push(format!(
                    "  {} on {} at {}: {}",
                    self.practitioner_name().unwrap_or("?"),
                    self.date.map(|d| d.to_string()).unwrap_or_default(),
                    self.time.as_deref().unwrap_or(""),
                    self.reason.as_deref().unwrap_or("")
                ));
            }
            BookingStep::Booked => {
                lines.push(format!("  Booking Confirmed! {}", self.summary()));
                lines.push("  Confirmation sent to your email".into());
            }
            BookingStep::Cancelled => lines.push("  Booking cancelled".into()),
        }
        lines.join("\n")
    }
}
