//! Recipient contact details.

use serde::{Deserialize, Serialize};
use shared_types::NotificationChannel;

/// Dialing prefix applied to numbers stored without one.
pub const DEFAULT_COUNTRY_CODE: &str = "+254";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub preference: NotificationChannel,
}

impl Contact {
    /// A contact reachable by email, preferring both media.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: Some(email.into()),
            phone: None,
            preference: NotificationChannel::Both,
        }
    }

    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn with_preference(mut self, preference: NotificationChannel) -> Self {
        self.preference = preference;
        self
    }

    /// Delivery address on a concrete channel.
    pub fn address(&self, channel: NotificationChannel) -> Option<String> {
        match channel {
            NotificationChannel::Email => self.email.clone().filter(|e| !e.trim().is_empty()),
            NotificationChannel::Sms => self
                .phone
                .as_deref()
                .map(normalize_phone)
                .filter(|p| p.len() > DEFAULT_COUNTRY_CODE.len()),
            NotificationChannel::Both => None,
        }
    }

    /// Channels to notify on: the preferred ones that have an address, or
    /// any that has one when the preference cannot be honored.
    pub fn channels(&self) -> Vec<NotificationChannel> {
        let preferred: Vec<_> = self
            .preference
            .expand()
            .iter()
            .copied()
            .filter(|c| self.address(*c).is_some())
            .collect();
        if !preferred.is_empty() {
            return preferred;
        }
        NotificationChannel::Both
            .expand()
            .iter()
            .copied()
            .filter(|c| self.address(*c).is_some())
            .collect()
    }
}

/// Strip formatting and apply the default country code to local numbers.
pub fn normalize_phone(raw: &str) -> String {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    if compact.starts_with('+') {
        compact
    } else {
        format!("{DEFAULT_COUNTRY_CODE}{}", compact.trim_start_matches('0'))
    }
}
