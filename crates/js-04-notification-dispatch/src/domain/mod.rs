//! Domain layer: templates, contacts, recipient selection, retry policy.

pub mod contact;
pub mod errors;
pub mod recipients;
pub mod report;
pub mod retry;
pub mod template;

pub use contact::{normalize_phone, Contact, DEFAULT_COUNTRY_CODE};
pub use errors::{ChannelError, DispatchError, DispatchResult};
pub use recipients::select_recipients;
pub use report::{DeliveryOutcome, DispatchReport, SkipReason};
pub use retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS};
pub use template::{render, Audience, RenderedMessage, TemplateKey};
