//! Canned replies keyed by intent.
//!
//! Every function here is a pure lookup. Nothing touches the message log;
//! appending is the session's job.

use travelcare_core::catalog::ProviderKind;

use crate::types::{
    ActionButton, ActionId, Intent, ResponsePayload, WidgetInit, WidgetKind, WidgetRef,
};

pub const GREETING: &str = "Hi! I'm your TravelCare AI assistant. I can help you with medical \
emergencies, find doctors, book appointments, check coverage, and more. How can I assist you today?";

pub const EMERGENCY_TEXT: &str = "🚨 I understand this is urgent. I've found emergency contacts \
near you. Shall I call emergency services or find the nearest hospital?";

pub const SYMPTOM_TEXT: &str = "I'm sorry to hear you're not feeling well. Can you describe your \
symptoms? I can help find the right care based on what you're experiencing.";

pub const FALLBACK_TEXT: &str = "I can help you with medical care, policy information, booking \
appointments, or emergency assistance. What would you like to do?";

pub const FOLLOW_UP_TEXT: &str = "Is there anything else I can help you with?";

pub const ACTION_COMPLETED_TEXT: &str = "Action completed! How else can I help you?";

/// The reply for a classified intent.
pub fn respond(intent: Intent) -> ResponsePayload {
    match intent {
        Intent::Emergency => emergency(),
        Intent::FindCare => ResponsePayload::text(
            "I found healthcare providers near your location. You can search and filter below:",
        )
        .with_widget(WidgetRef::new(WidgetKind::Providers)),
        Intent::BookAppointment => ResponsePayload::text(
            "Let's get you booked. Pick a doctor, a date and a time below:",
        )
        .with_widget(WidgetRef::new(WidgetKind::Booking)),
        Intent::Telemedicine => ResponsePayload::text(
            "Perfect! I can connect you with a doctor via video call. Available specialists:",
        )
        .with_widget(WidgetRef::new(WidgetKind::Telemedicine)),
        Intent::ViewPolicy => ResponsePayload::text("Here is your current TravelCare policy:")
            .with_widget(WidgetRef::new(WidgetKind::Policy)),
        Intent::CheckCoverage => ResponsePayload::text(
            "Search your coverage to see what is included in your plan:",
        )
        .with_widget(WidgetRef::new(WidgetKind::Coverage)),
        Intent::SymptomReport => ResponsePayload::text(SYMPTOM_TEXT).with_actions(vec![
            ActionButton::new("Find General Practitioner", ActionId::FindGp),
            ActionButton::new("Find Specialist", ActionId::FindSpecialist),
            ActionButton::new("Start Symptom Checker", ActionId::SymptomChecker),
            ActionButton::new("Emergency Care", ActionId::Emergency).primary(),
        ]),
        Intent::Fallback => ResponsePayload::text(FALLBACK_TEXT).with_actions(vec![
            ActionButton::new("Find Doctors", ActionId::FindDoctors),
            ActionButton::new("Book Telemedicine", ActionId::Telemedicine),
            ActionButton::new("Check Coverage", ActionId::CheckCoverage),
            ActionButton::new("Emergency Help", ActionId::Emergency),
        ]),
    }
}

pub fn emergency() -> ResponsePayload {
    ResponsePayload::text(EMERGENCY_TEXT).with_actions(vec![
        ActionButton::new("Call Emergency (112)", ActionId::Call112).primary(),
        ActionButton::new("Find Nearest Hospital", ActionId::FindHospital),
        ActionButton::new("Start Emergency Chat", ActionId::EmergencyChat),
    ])
}

/// First message of every session.
pub fn greeting() -> ResponsePayload {
    ResponsePayload::text(GREETING).with_actions(vec![
        ActionButton::new("Find Nearby Doctors", ActionId::FindDoctors).primary(),
        ActionButton::new("Emergency Help", ActionId::Emergency),
        ActionButton::new("Check Coverage", ActionId::CheckCoverage),
        ActionButton::new("Book Telemedicine", ActionId::Telemedicine),
    ])
}

/// Appended after a widget is dismissed or completes.
pub fn widget_follow_up() -> ResponsePayload {
    ResponsePayload::text(FOLLOW_UP_TEXT).with_actions(vec![
        ActionButton::new("Find Doctors", ActionId::FindDoctors),
        ActionButton::new("View Policy", ActionId::ViewPolicy),
        ActionButton::new("Check Coverage", ActionId::CheckCoverage),
        ActionButton::new("Emergency Help", ActionId::Emergency),
    ])
}

pub fn symptom_checker() -> ResponsePayload {
    ResponsePayload::text(
        "Let's check your symptoms. Please describe what you're feeling, when it started, \
and how severe it is. If it is life-threatening, call emergency services now.",
    )
    .with_actions(vec![
        ActionButton::new("Book Telemedicine", ActionId::Telemedicine),
        ActionButton::new("Find General Practitioner", ActionId::FindGp),
        ActionButton::new("Emergency Care", ActionId::Emergency).primary(),
    ])
}

pub fn action_completed() -> ResponsePayload {
    ResponsePayload::text(ACTION_COMPLETED_TEXT)
}

/// Reply used when a button carried a payload the dispatcher rejected.
pub fn invalid_payload() -> ResponsePayload {
    ResponsePayload::text(
        "Sorry, I couldn't complete that request. The selected option is no longer available.",
    )
    .with_actions(vec![
        ActionButton::new("Find Doctors", ActionId::FindDoctors),
        ActionButton::new("Emergency Help", ActionId::Emergency),
    ])
}

/// Reply hosting a widget, used by the dispatcher in inline mode.
pub fn widget_reply(kind: WidgetKind, init: WidgetInit) -> ResponsePayload {
    let text = match (kind, init) {
        (WidgetKind::Policy, _) => "Here is your current TravelCare policy:",
        (WidgetKind::Coverage, _) => "Search your coverage to see what is included in your plan:",
        (WidgetKind::Providers, WidgetInit::ProviderKind { provider_kind: ProviderKind::Hospital }) => {
            "Here are the nearest hospitals that accept your insurance:"
        }
        (WidgetKind::Providers, _) => "Here are healthcare providers near you:",
        (WidgetKind::Booking, _) => "Let's book your appointment:",
        (WidgetKind::Telemedicine, _) => "Choose a doctor for your video consultation:",
    };
    ResponsePayload::text(text).with_widget(WidgetRef::new(kind).with_init(init))
}
