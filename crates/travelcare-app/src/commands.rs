//! Line commands typed at the chat prompt.
//!
//! Plain lines are chat messages. Lines starting with `/` drive buttons and
//! the open widget.

use chrono::NaiveDate;
use travelcare_assist::widget::coverage::parse_category;
use travelcare_assist::widget::ProviderFilter;
use travelcare_assist::{
    ActionId, ActionPayload, SessionInput, WidgetError, WidgetKind, WidgetSession, WidgetSignal,
};
use travelcare_core::catalog::CoverageCategory;
use travelcare_core::types::MessageId;

pub const HELP: &str = "\
Type a message to chat, or:
  /press <message> <button>   press a numbered button
  /action <id>                dispatch an action directly
  /close                      close the open widget
  /cancel                     cancel the open widget
  /book doctor|provider <id>  pick who to book
  /book date <YYYY-MM-DD>
  /book time <slot>           e.g. /book time 2:00 PM
  /book reason <text>
  /book confirm | finish
  /call [doctor]              start a video consultation
  /hangup                     end the consultation
  /search <term>              search providers or coverage
  /filter <name>              provider type or coverage category
  /visit <provider>           book the provider
  /help
  /quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingCommand {
    Doctor(u32),
    Provider(u32),
    Date(NaiveDate),
    Time(String),
    Reason(String),
    Confirm,
    Finish,
}

/// A parsed prompt line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Say(String),
    Press { message: MessageId, button: usize },
    Action(ActionId),
    Close,
    Cancel,
    Book(BookingCommand),
    Call(Option<u32>),
    Hangup,
    Search(String),
    Filter(Filter),
    Visit(u32),
    Help,
    Quit,
}

/// A filter name resolved against both searchable widgets.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    name: String,
    providers: Option<ProviderFilter>,
    coverage: Option<Option<CoverageCategory>>,
}

impl Filter {
    fn parse(name: &str) -> Result<Self, String> {
        let providers = name.parse::<ProviderFilter>().ok();
        let coverage = parse_category(name);
        if providers.is_none() && coverage.is_none() {
            return Err(format!("Unknown filter: {}", name));
        }
        Ok(Self {
            name: name.to_string(),
            providers,
            coverage,
        })
    }

    fn apply(&self, widget: &mut WidgetSession) -> Result<WidgetSignal, WidgetError> {
        let unknown = |kind| WidgetError::InvalidStep {
            widget: kind,
            step: format!("filter {}", self.name),
        };
        match widget {
            WidgetSession::Providers(search) => self
                .providers
                .map(|f| search.set_filter(f))
                .ok_or_else(|| unknown(WidgetKind::Providers)),
            WidgetSession::Coverage(search) => self
                .coverage
                .map(|c| search.set_category(c))
                .ok_or_else(|| unknown(WidgetKind::Coverage)),
            other => Err(WidgetError::WrongWidget {
                expected: WidgetKind::Providers,
                found: other.kind(),
            }),
        }
    }
}

/// Parse one prompt line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Some(Command::Say(line.to_string())));
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    let command = match name {
        "press" => {
            let mut parts = args.split_whitespace();
            let message = number(parts.next(), "message")?;
            let button: usize = number(parts.next(), "button")?;
            if button == 0 {
                return Err("Buttons are numbered from 1".to_string());
            }
            Command::Press {
                message: MessageId(message),
                button,
            }
        }
        "action" => {
            if args.is_empty() {
                return Err("Usage: /action <id>".to_string());
            }
            Command::Action(ActionId::parse(args))
        }
        "close" => Command::Close,
        "cancel" => Command::Cancel,
        "book" => Command::Book(parse_booking(args)?),
        "call" => {
            if args.is_empty() {
                Command::Call(None)
            } else {
                Command::Call(Some(number(Some(args), "doctor")?))
            }
        }
        "hangup" => Command::Hangup,
        "search" => Command::Search(args.to_string()),
        "filter" => Command::Filter(Filter::parse(args)?),
        "visit" => Command::Visit(number(Some(args), "provider")?),
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("Unknown command: /{}", other)),
    };
    Ok(Some(command))
}

fn parse_booking(args: &str) -> Result<BookingCommand, String> {
    let (step, value) = match args.split_once(char::is_whitespace) {
        Some((step, value)) => (step, value.trim()),
        None => (args, ""),
    };
    match step {
        "doctor" => Ok(BookingCommand::Doctor(number(Some(value), "doctor")?)),
        "provider" => Ok(BookingCommand::Provider(number(Some(value), "provider")?)),
        "date" => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(BookingCommand::Date)
            .map_err(|e| format!("Invalid date {:?}: {}", value, e)),
        "time" if !value.is_empty() => Ok(BookingCommand::Time(value.to_string())),
        "reason" => Ok(BookingCommand::Reason(value.to_string())),
        "confirm" => Ok(BookingCommand::Confirm),
        "finish" => Ok(BookingCommand::Finish),
        _ => Err("Usage: /book doctor|provider|date|time|reason|confirm|finish".to_string()),
    }
}

fn number<T: std::str::FromStr>(value: Option<&str>, what: &str) -> Result<T, String> {
    value
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| format!("Expected a {} number", what))
}

impl Command {
    /// Convert into driver input. `Help` and `Quit` stay with the prompt.
    pub fn into_input(self) -> Option<SessionInput> {
        let input = match self {
            Command::Say(text) => SessionInput::Text(text),
            Command::Press { message, button } => SessionInput::Press {
                message,
                index: button - 1,
            },
            Command::Action(action) => SessionInput::Dispatch(action, ActionPayload::None),
            Command::Close => SessionInput::DismissWidget,
            Command::Cancel => interact(|w| Ok(w.cancel())),
            Command::Book(step) => interact(move |w| {
                let form = w.booking_mut()?;
                match step {
                    BookingCommand::Doctor(id) => form.select_doctor(id),
                    BookingCommand::Provider(id) => form.select_provider(id),
                    BookingCommand::Date(date) => form.select_date(date),
                    BookingCommand::Time(slot) => form.select_time(&slot),
                    BookingCommand::Reason(reason) => form.enter_reason(&reason),
                    BookingCommand::Confirm => form.confirm(),
                    BookingCommand::Finish => form.finish(),
                }
            }),
            Command::Call(doctor) => interact(move |w| {
                let call = w.telemedicine_mut()?;
                match doctor {
                    Some(id) => call.connect_to(id),
                    None => call.connect(),
                }
            }),
            Command::Hangup => interact(|w| w.telemedicine_mut()?.end_call()),
            Command::Search(term) => interact(move |w| match w {
                WidgetSession::Providers(search) => Ok(search.search(&term)),
                WidgetSession::Coverage(search) => Ok(search.search(&term)),
                other => Err(WidgetError::WrongWidget {
                    expected: WidgetKind::Providers,
                    found: other.kind(),
                }),
            }),
            Command::Filter(filter) => interact(move |w| filter.apply(w)),
            Command::Visit(id) => interact(move |w| w.providers_mut()?.book(id)),
            Command::Help | Command::Quit => return None,
        };
        Some(input)
    }
}

fn interact<F>(f: F) -> SessionInput
where
    F: FnOnce(&mut WidgetSession) -> Result<WidgetSignal, WidgetError> + Send + 'static,
{
    SessionInput::Interact(Box::new(f))
}
