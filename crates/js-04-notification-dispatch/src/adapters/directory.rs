//! Fixed in-memory contact directory.

use crate::domain::Contact;
use crate::ports::outbound::RecipientDirectory;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::Recipient;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct StaticDirectory {
    contacts: RwLock<HashMap<Recipient, Contact>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a contact.
    pub fn insert(&self, recipient: Recipient, contact: Contact) {
        self.contacts.write().insert(recipient, contact);
    }

    pub fn remove(&self, recipient: &Recipient) -> Option<Contact> {
        self.contacts.write().remove(recipient)
    }

    pub fn len(&self) -> usize {
        self.contacts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.read().is_empty()
    }
}

#[async_trait]
impl RecipientDirectory for StaticDirectory {
    async fn lookup(&self, recipient: &Recipient) -> Option<Contact> {
        self.contacts.read().get(recipient).cloned()
    }
}
