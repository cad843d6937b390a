//! Action dispatcher.
//!
//! Maps a button's action id and typed payload to a [`DispatchResult`].
//! Dispatching is pure: the session applies the result to the log, the
//! scheduler and the effect outbox.

use std::sync::Arc;

use travelcare_core::catalog::{Catalog, ProviderKind};
use travelcare_core::config::{DispatchMode, EmergencyConfig};
use travelcare_core::routes::Route;

use crate::error::DispatchError;
use crate::response;
use crate::types::{
    ActionButton, ActionId, ActionPayload, DispatchResult, MessageDraft, NavigationState,
    ResponsePayload, WidgetInit, WidgetKind,
};

/// Resolves button presses against the catalog.
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    catalog: Arc<Catalog>,
    mode: DispatchMode,
    emergency: EmergencyConfig,
}

impl ActionDispatcher {
    pub fn new(catalog: Arc<Catalog>, mode: DispatchMode, emergency: EmergencyConfig) -> Self {
        Self {
            catalog,
            mode,
            emergency,
        }
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Dispatch one action.
    ///
    /// Unknown ids are acknowledged, never rejected. Payloads of the wrong
    /// kind, or naming ids missing from the catalog, yield
    /// [`DispatchError::InvalidPayload`].
    pub fn dispatch(
        &self,
        action: &ActionId,
        payload: &ActionPayload,
    ) -> Result<DispatchResult, DispatchError> {
        tracing::info!(action = %action, payload = %payload, mode = ?self.mode, "Dispatching action");

        let result = match action {
            ActionId::Unknown(id) => acknowledge(id),
            ActionId::BookDoctor => self.book_doctor(action, payload)?,
            ActionId::BookTelemedicine => self.book_telemedicine(action, payload)?,
            _ => {
                self.expect_no_payload(action, payload)?;
                self.dispatch_plain(action)
            }
        };

        Ok(result)
    }

    fn dispatch_plain(&self, action: &ActionId) -> DispatchResult {
        let inline = self.mode == DispatchMode::Inline;

        match action {
            ActionId::Emergency => append(response::emergency()),
            ActionId::Call112 | ActionId::CallEmergency => {
                DispatchResult::OpenExternal(self.emergency.dial_uri())
            }
            ActionId::EmergencyChat => navigate(Route::Support, None),
            ActionId::CloseWidget => DispatchResult::RemoveLastAndAppend(MessageDraft::assistant(
                response::widget_follow_up(),
            )),
            ActionId::SymptomChecker => append(response::symptom_checker()),

            ActionId::ViewPolicy if inline => widget(WidgetKind::Policy, WidgetInit::Default),
            ActionId::ViewPolicy => navigate(Route::Policy, None),

            ActionId::CheckCoverage | ActionId::CheckSpecific if inline => {
                widget(WidgetKind::Coverage, WidgetInit::Default)
            }
            ActionId::CheckCoverage | ActionId::CheckSpecific => navigate(Route::Coverage, None),

            ActionId::FindHospital if inline => widget(
                WidgetKind::Providers,
                WidgetInit::ProviderKind {
                    provider_kind: ProviderKind::Hospital,
                },
            ),
            ActionId::FindDoctors
            | ActionId::FindGp
            | ActionId::FindSpecialist
            | ActionId::ShowAllDoctors
                if inline =>
            {
                widget(WidgetKind::Providers, WidgetInit::Default)
            }
            ActionId::FindDoctors => self.doctor_list(),
            ActionId::FindHospital
            | ActionId::FindGp
            | ActionId::FindSpecialist
            | ActionId::ShowAllDoctors => navigate(Route::Providers, None),

            ActionId::Telemedicine if inline => {
                widget(WidgetKind::Telemedicine, WidgetInit::Default)
            }
            ActionId::Telemedicine => navigate(Route::TelemedicineBooking, None),

            // Payload-bearing and unknown ids are routed before this point.
            ActionId::BookDoctor | ActionId::BookTelemedicine | ActionId::Unknown(_) => {
                acknowledge(action.as_str())
            }
        }
    }

    fn book_doctor(
        &self,
        action: &ActionId,
        payload: &ActionPayload,
    ) -> Result<DispatchResult, DispatchError> {
        let inline = self.mode == DispatchMode::Inline;

        let result = match *payload {
            ActionPayload::None if inline => widget(WidgetKind::Booking, WidgetInit::Default),
            ActionPayload::None => navigate(Route::Booking, None),
            ActionPayload::Doctor { doctor_id } => {
                if self.catalog.doctor(doctor_id).is_none() {
                    return Err(invalid(action, payload));
                }
                if inline {
                    widget(WidgetKind::Booking, WidgetInit::Doctor { doctor_id })
                } else {
                    navigate(Route::Booking, Some(NavigationState::Doctor { doctor_id }))
                }
            }
            ActionPayload::Provider { provider_id } => {
                if self.catalog.provider(provider_id).is_none() {
                    return Err(invalid(action, payload));
                }
                if inline {
                    widget(WidgetKind::Booking, WidgetInit::ProviderVisit { provider_id })
                } else {
                    navigate(
                        Route::Booking,
                        Some(NavigationState::Provider { provider_id }),
                    )
                }
            }
            ActionPayload::TelemedicineDoctor { .. } => return Err(invalid(action, payload)),
        };

        Ok(result)
    }

    fn book_telemedicine(
        &self,
        action: &ActionId,
        payload: &ActionPayload,
    ) -> Result<DispatchResult, DispatchError> {
        let inline = self.mode == DispatchMode::Inline;

        let result = match *payload {
            ActionPayload::None if inline => {
                widget(WidgetKind::Telemedicine, WidgetInit::Default)
            }
            ActionPayload::None => navigate(Route::TelemedicineBooking, None),
            ActionPayload::TelemedicineDoctor { doctor_id } => {
                if self.catalog.telemedicine_doctor(doctor_id).is_none() {
                    return Err(invalid(action, payload));
                }
                if inline {
                    widget(
                        WidgetKind::Telemedicine,
                        WidgetInit::TelemedicineDoctor { doctor_id },
                    )
                } else {
                    navigate(
                        Route::TelemedicineBooking,
                        Some(NavigationState::TelemedicineDoctor { doctor_id }),
                    )
                }
            }
            _ => return Err(invalid(action, payload)),
        };

        Ok(result)
    }

    fn expect_no_payload(
        &self,
        action: &ActionId,
        payload: &ActionPayload,
    ) -> Result<(), DispatchError> {
        match payload {
            ActionPayload::None => Ok(()),
            _ => Err(invalid(action, payload)),
        }
    }

    /// Echo plus a delayed list of bookable doctors, used in screens mode.
    fn doctor_list(&self) -> DispatchResult {
        let mut actions: Vec<ActionButton> = self
            .catalog
            .doctors
            .iter()
            .map(|d| {
                ActionButton::new(
                    format!("{} - {} - {}", d.name, d.next_available, d.fee),
                    ActionId::BookDoctor,
                )
                .with_payload(ActionPayload::Doctor { doctor_id: d.id })
            })
            .collect();
        actions.push(ActionButton::new("Show All Doctors", ActionId::ShowAllDoctors));

        let text = format!(
            "Found {} doctors near your location. All accept your TravelCare insurance:",
            self.catalog.doctors.len()
        );

        DispatchResult::EchoThenReply {
            echo: MessageDraft::user("Looking for doctors near you..."),
            reply: MessageDraft::assistant(ResponsePayload::text(text).with_actions(actions)),
        }
    }
}

fn append(payload: ResponsePayload) -> DispatchResult {
    DispatchResult::AppendMessage(MessageDraft::assistant(payload))
}

fn widget(kind: WidgetKind, init: WidgetInit) -> DispatchResult {
    append(response::widget_reply(kind, init))
}

fn navigate(route: Route, state: Option<NavigationState>) -> DispatchResult {
    DispatchResult::Navigate { route, state }
}

fn acknowledge(id: &str) -> DispatchResult {
    DispatchResult::EchoThenReply {
        echo: MessageDraft::user(format!("Executing: {}", id)),
        reply: MessageDraft::assistant(response::action_completed()),
    }
}

fn invalid(action: &ActionId, payload: &ActionPayload) -> DispatchError {
    tracing::warn!(action = %action, payload = %payload, "Rejected action payload");
    DispatchError::InvalidPayload {
        action: action.clone(),
        payload: *payload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use travelcare_core::types::Sender;

    fn dispatcher(mode: DispatchMode) -> ActionDispatcher {
        ActionDispatcher::new(Arc::new(Catalog::demo()), mode, EmergencyConfig::default())
    }

    fn widget_of(result: &DispatchResult) -> Option<(WidgetKind, WidgetInit)> {
        match result {
            DispatchResult::AppendMessage(draft) => {
                draft.body.widget.map(|w| (w.kind, w.init))
            }
            _ => None,
        }
    }

    #[test]
    fn test_call_112_opens_dialer() {
        let d = dispatcher(DispatchMode::Inline);
        for action in [ActionId::Call112, ActionId::CallEmergency] {
            let result = d.dispatch(&action, &ActionPayload::None).unwrap();
            assert_eq!(result, DispatchResult::OpenExternal("tel:112".to_string()));
        }
    }

    #[test]
    fn test_dialer_uses_configured_number() {
        let d = ActionDispatcher::new(
            Arc::new(Catalog::demo()),
            DispatchMode::Inline,
            EmergencyConfig {
                number: "911".to_string(),
            },
        );
        let result = d.dispatch(&ActionId::Call112, &ActionPayload::None).unwrap();
        assert_eq!(result, DispatchResult::OpenExternal("tel:911".to_string()));
    }

    #[test]
    fn test_external_effects_are_repeatable() {
        let d = dispatcher(DispatchMode::Screens);
        let first = d.dispatch(&ActionId::Call112, &ActionPayload::None).unwrap();
        let second = d.dispatch(&ActionId::Call112, &ActionPayload::None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_action_is_acknowledged() {
        let d = dispatcher(DispatchMode::Inline);
        let result = d
            .dispatch(&ActionId::parse("xyz123"), &ActionPayload::None)
            .unwrap();
        match result {
            DispatchResult::EchoThenReply { echo, reply } => {
                assert_eq!(echo.body.text, "Executing: xyz123");
                assert_eq!(echo.sender, Sender::User);
                assert_eq!(reply.body.text, "Action completed! How else can I help you?");
                assert_eq!(reply.sender, Sender::Assistant);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_action_ignores_payload() {
        let d = dispatcher(DispatchMode::Inline);
        let result = d.dispatch(
            &ActionId::parse("mystery"),
            &ActionPayload::Doctor { doctor_id: 42 },
        );
        assert!(matches!(result, Ok(DispatchResult::EchoThenReply { .. })));
    }

    #[test]
    fn test_emergency_appends_emergency_payload() {
        let d = dispatcher(DispatchMode::Screens);
        let result = d.dispatch(&ActionId::Emergency, &ActionPayload::None).unwrap();
        match result {
            DispatchResult::AppendMessage(draft) => {
                assert_eq!(draft.body, response::emergency());
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_close_widget_removes_last() {
        let d = dispatcher(DispatchMode::Inline);
        let result = d.dispatch(&ActionId::CloseWidget, &ActionPayload::None).unwrap();
        assert_eq!(
            result,
            DispatchResult::RemoveLastAndAppend(MessageDraft::assistant(
                response::widget_follow_up()
            ))
        );
    }

    #[test]
    fn test_emergency_chat_navigates_to_support() {
        let d = dispatcher(DispatchMode::Inline);
        let result = d.dispatch(&ActionId::EmergencyChat, &ActionPayload::None).unwrap();
        assert_eq!(
            result,
            DispatchResult::Navigate {
                route: Route::Support,
                state: None
            }
        );
    }

    #[test]
    fn test_inline_mode_embeds_widgets() {
        let d = dispatcher(DispatchMode::Inline);
        let cases = [
            (ActionId::ViewPolicy, WidgetKind::Policy, WidgetInit::Default),
            (ActionId::CheckCoverage, WidgetKind::Coverage, WidgetInit::Default),
            (ActionId::CheckSpecific, WidgetKind::Coverage, WidgetInit::Default),
            (ActionId::FindDoctors, WidgetKind::Providers, WidgetInit::Default),
            (ActionId::FindGp, WidgetKind::Providers, WidgetInit::Default),
            (ActionId::ShowAllDoctors, WidgetKind::Providers, WidgetInit::Default),
            (
                ActionId::FindHospital,
                WidgetKind::Providers,
                WidgetInit::ProviderKind {
                    provider_kind: ProviderKind::Hospital,
                },
            ),
            (ActionId::Telemedicine, WidgetKind::Telemedicine, WidgetInit::Default),
            (ActionId::BookDoctor, WidgetKind::Booking, WidgetInit::Default),
        ];
        for (action, kind, init) in cases {
            let result = d.dispatch(&action, &ActionPayload::None).unwrap();
            assert_eq!(widget_of(&result), Some((kind, init)), "action {}", action);
        }
    }

    #[test]
    fn test_screens_mode_navigates() {
        let d = dispatcher(DispatchMode::Screens);
        let cases = [
            (ActionId::ViewPolicy, Route::Policy),
            (ActionId::CheckCoverage, Route::Coverage),
            (ActionId::FindHospital, Route::Providers),
            (ActionId::FindGp, Route::Providers),
            (ActionId::FindSpecialist, Route::Providers),
            (ActionId::ShowAllDoctors, Route::Providers),
            (ActionId::Telemedicine, Route::TelemedicineBooking),
            (ActionId::BookDoctor, Route::Booking),
        ];
        for (action, route) in cases {
            let result = d.dispatch(&action, &ActionPayload::None).unwrap();
            assert_eq!(
                result,
                DispatchResult::Navigate { route, state: None },
                "action {}",
                action
            );
        }
    }

    #[test]
    fn test_screens_find_doctors_lists_catalog() {
        let d = dispatcher(DispatchMode::Screens);
        let result = d.dispatch(&ActionId::FindDoctors, &ActionPayload::None).unwrap();
        match result {
            DispatchResult::EchoThenReply { echo, reply } => {
                assert_eq!(echo.body.text, "Looking for doctors near you...");
                let actions = &reply.body.actions;
                assert_eq!(actions.len(), 4);
                assert_eq!(actions[0].label, "Dr. Sarah Chen - Today 2:30 PM - €45");
                assert_eq!(actions[0].payload, ActionPayload::Doctor { doctor_id: 1 });
                assert_eq!(actions[3].action, ActionId::ShowAllDoctors);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_book_doctor_with_doctor_payload() {
        let payload = ActionPayload::Doctor { doctor_id: 2 };

        let inline = dispatcher(DispatchMode::Inline)
            .dispatch(&ActionId::BookDoctor, &payload)
            .unwrap();
        assert_eq!(
            widget_of(&inline),
            Some((WidgetKind::Booking, WidgetInit::Doctor { doctor_id: 2 }))
        );

        let screens = dispatcher(DispatchMode::Screens)
            .dispatch(&ActionId::BookDoctor, &payload)
            .unwrap();
        assert_eq!(
            screens,
            DispatchResult::Navigate {
                route: Route::Booking,
                state: Some(NavigationState::Doctor { doctor_id: 2 })
            }
        );
    }

    #[test]
    fn test_book_doctor_with_provider_payload() {
        let d = dispatcher(DispatchMode::Inline);
        let result = d
            .dispatch(&ActionId::BookDoctor, &ActionPayload::Provider { provider_id: 3 })
            .unwrap();
        assert_eq!(
            widget_of(&result),
            Some((WidgetKind::Booking, WidgetInit::ProviderVisit { provider_id: 3 }))
        );
    }

    #[test]
    fn test_book_telemedicine_preselects_doctor() {
        let payload = ActionPayload::TelemedicineDoctor { doctor_id: 3 };
        let screens = dispatcher(DispatchMode::Screens)
            .dispatch(&ActionId::BookTelemedicine, &payload)
            .unwrap();
        assert_eq!(
            screens,
            DispatchResult::Navigate {
                route: Route::TelemedicineBooking,
                state: Some(NavigationState::TelemedicineDoctor { doctor_id: 3 })
            }
        );

        let inline = dispatcher(DispatchMode::Inline)
            .dispatch(&ActionId::BookTelemedicine, &payload)
            .unwrap();
        assert_eq!(
            widget_of(&inline),
            Some((
                WidgetKind::Telemedicine,
                WidgetInit::TelemedicineDoctor { doctor_id: 3 }
            ))
        );
    }

    #[test]
    fn test_invalid_payloads_rejected() {
        let d = dispatcher(DispatchMode::Inline);
        let cases = [
            (ActionId::BookDoctor, ActionPayload::Doctor { doctor_id: 99 }),
            (ActionId::BookDoctor, ActionPayload::Provider { provider_id: 99 }),
            (
                ActionId::BookDoctor,
                ActionPayload::TelemedicineDoctor { doctor_id: 1 },
            ),
            (ActionId::BookTelemedicine, ActionPayload::Doctor { doctor_id: 1 }),
            (
                ActionId::BookTelemedicine,
                ActionPayload::TelemedicineDoctor { doctor_id: 42 },
            ),
            (ActionId::ViewPolicy, ActionPayload::Provider { provider_id: 1 }),
        ];
        for (action, payload) in cases {
            let err = d.dispatch(&action, &payload).unwrap_err();
            assert_eq!(
                err,
                DispatchError::InvalidPayload {
                    action: action.clone(),
                    payload
                }
            );
        }
    }

    #[test]
    fn test_symptom_checker_appends_prompt() {
        let d = dispatcher(DispatchMode::Screens);
        let result = d.dispatch(&ActionId::SymptomChecker, &ActionPayload::None).unwrap();
        assert_eq!(
            result,
            DispatchResult::AppendMessage(MessageDraft::assistant(response::symptom_checker()))
        );
    }
}
