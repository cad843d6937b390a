//! Error types for the assistant.

use chrono::NaiveDate;
use travelcare_core::error::TravelCareError;
use travelcare_core::types::MessageId;

use crate::types::{ActionId, ActionPayload, WidgetKind};

/// Errors from chat session operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChatError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Message is too long: {0} characters")]
    MessageTooLong(usize),
    #[error("Message not found: {0}")]
    MessageNotFound(MessageId),
    #[error("Message {message} has no button at index {index}")]
    NoSuchAction { message: MessageId, index: usize },
    #[error("No widget is open")]
    NoActiveWidget,
    #[error("Session is closed")]
    SessionClosed,
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
    #[error("Widget error: {0}")]
    Widget(#[from] WidgetError),
}

impl From<ChatError> for TravelCareError {
    fn from(err: ChatError) -> Self {
        TravelCareError::Chat(err.to_string())
    }
}

/// Errors from the action dispatcher.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    #[error("Invalid payload for {action}: {payload}")]
    InvalidPayload {
        action: ActionId,
        payload: ActionPayload,
    },
}

/// Errors from widget steppers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WidgetError {
    #[error("Invalid {widget} step: {step}")]
    InvalidStep { widget: WidgetKind, step: String },
    #[error("Unknown doctor: {0}")]
    UnknownDoctor(u32),
    #[error("Unknown provider: {0}")]
    UnknownProvider(u32),
    #[error("Unknown time slot: {0}")]
    UnknownTimeSlot(String),
    #[error("Date is in the past: {0}")]
    DateInPast(NaiveDate),
    #[error("Reason for visit is empty")]
    EmptyReason,
    #[error("Expected a {expected} widget, found {found}")]
    WrongWidget {
        expected: WidgetKind,
        found: WidgetKind,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        assert_eq!(ChatError::EmptyMessage.to_string(), "Message is empty");
        assert_eq!(
            ChatError::MessageTooLong(2001).to_string(),
            "Message is too long: 2001 characters"
        );
        assert_eq!(
            ChatError::NoSuchAction {
                message: MessageId(3),
                index: 5
            }
            .to_string(),
            "Message #3 has no button at index 5"
        );
    }

    #[test]
    fn test_dispatch_error_display() {
        let err = DispatchError::InvalidPayload {
            action: ActionId::BookDoctor,
            payload: ActionPayload::Doctor { doctor_id: 99 },
        };
        assert_eq!(err.to_string(), "Invalid payload for book_doctor: doctor 99");
    }

    #[test]
    fn test_widget_error_display() {
        let err = WidgetError::InvalidStep {
            widget: WidgetKind::Booking,
            step: "booked".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid booking step: booked");
        assert_eq!(
            WidgetError::WrongWidget {
                expected: WidgetKind::Booking,
                found: WidgetKind::Policy
            }
            .to_string(),
            "Expected a booking widget, found policy"
        );
    }

    #[test]
    fn test_chat_error_converts_to_top_level() {
        let err: TravelCareError = ChatError::NoActiveWidget.into();
        assert!(matches!(err, TravelCareError::Chat(_)));
        assert_eq!(err.to_string(), "Chat error: No widget is open");
    }

    #[test]
    fn test_from_dispatch_error() {
        let err: ChatError = DispatchError::InvalidPayload {
            action: ActionId::BookTelemedicine,
            payload: ActionPayload::None,
        }
        .into();
        assert!(matches!(err, ChatError::Dispatch(_)));
    }
}
