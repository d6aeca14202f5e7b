//! Time-off workflow: classify fetched events, cancel the recurring ones and
//! compose rescheduling emails for the rest.

pub mod cancellation;
pub mod classifier;
pub mod composer;
pub mod models;
pub mod providers;
pub mod templates;

pub use cancellation::{cancel_all, CancellationFailure, CancellationReport};
pub use classifier::{classify, ClassifiedEvents};
pub use composer::{CompositionContext, Draft, NotificationComposer};
pub use models::{Account, Attendee, CalendarEvent, OutgoingMail, TimeOffRange};
pub use providers::{Authenticator, CalendarProvider, LanguageModel, MailTransport};
pub use templates::MessageTemplate;
