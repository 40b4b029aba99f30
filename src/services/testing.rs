use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use super::offers::OfferBook;
use crate::delivery::{AuditEntry, AuditLog, Notifier, OfferNotice};
use crate::domain::{Category, Day, Document, OfferDecision, Referee};
use crate::errors::OpsError;
use crate::store::DataStore;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Script {
    Accept,
    Decline,
    /// Delivery to this recipient fails
    Unreachable,
    /// Offer is delivered but never answered
    Ignore,
    /// Recipient leaves the roster, then accepts
    LeaveThenAccept,
}

/// Answers offers through the offer book as soon as they are delivered
pub struct ScriptedNotifier {
    book: Arc<OfferBook>,
    store: Option<Arc<DataStore>>,
    scripts: HashMap<String, Script>,
    pub messages: Mutex<Vec<(String, String)>>,
    pub offered: Mutex<Vec<(String, Uuid)>>,
}

impl ScriptedNotifier {
    pub fn new(book: Arc<OfferBook>) -> Self {
        Self {
            book,
            store: None,
            scripts: HashMap::new(),
            messages: Mutex::new(Vec::new()),
            offered: Mutex::new(Vec::new()),
        }
    }

    pub fn script(mut self, recipient: &str, script: Script) -> Self {
        self.scripts.insert(recipient.to_string(), script);
        self
    }

    pub fn with_store(mut self, store: Arc<DataStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn messages_to(&self, recipient: &str) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, _)| to == recipient)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn offered_to(&self) -> HashSet<String> {
        self.offered.lock().unwrap().iter().map(|(to, _)| to.clone()).collect()
    }

    fn script_for(&self, recipient: &str) -> Script {
        self.scripts.get(recipient).copied().unwrap_or(Script::Ignore)
    }
}

#[async_trait]
impl Notifier for ScriptedNotifier {
    async fn deliver_offer(&self, recipient: &str, offer: &OfferNotice) -> Result<(), OpsError> {
        let decision = match self.script_for(recipient) {
            Script::Unreachable => return Err(OpsError::delivery(recipient, "dms closed")),
            Script::Ignore => None,
            Script::Accept => Some(OfferDecision::Accept),
            Script::Decline => Some(OfferDecision::Decline),
            Script::LeaveThenAccept => {
                if let Some(store) = &self.store {
                    store.update(|doc| {
                        doc.referees.remove(recipient);
                        Ok(())
                    })?;
                }
                Some(OfferDecision::Accept)
            }
        };
        self.offered
            .lock()
            .unwrap()
            .push((recipient.to_string(), offer.offer_id));
        if let Some(decision) = decision {
            self.book.respond(offer.offer_id, recipient, decision).await?;
        }
        Ok(())
    }

    async fn send_message(&self, recipient: &str, message: &str) -> Result<(), OpsError> {
        if self.script_for(recipient) == Script::Unreachable {
            return Err(OpsError::delivery(recipient, "dms closed"));
        }
        self.messages
            .lock()
            .unwrap()
            .push((recipient.to_string(), message.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingAudit {
    pub entries: Mutex<Vec<AuditEntry>>,
}

impl RecordingAudit {
    pub fn titles(&self) -> Vec<String> {
        self.entries.lock().unwrap().iter().map(|e| e.title.clone()).collect()
    }
}

#[async_trait]
impl AuditLog for RecordingAudit {
    async fn record(&self, entry: AuditEntry) {
        self.entries.lock().unwrap().push(entry);
    }
}

/// Active referee who works every day and has no club conflicts
pub fn referee(referee_id: &str, name: &str, category: Category) -> Referee {
    Referee {
        referee_id: referee_id.to_string(),
        name: name.to_string(),
        strikes: 0,
        matches_completed: 0,
        category,
        joined_at: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        clubs: vec![],
        availability: Day::ALL.to_vec(),
        suspended: false,
        ratings: vec![],
        loa_until: None,
        current_match: None,
    }
}

pub fn store_with(dir: &tempfile::TempDir, referees: Vec<(&str, Referee)>) -> Arc<DataStore> {
    let store = DataStore::new(
        dir.path().join("referee_data.json"),
        dir.path().join("backup_referee_data.json"),
    );
    let mut document = Document::new();
    for (user_id, referee) in referees {
        document.referees.insert(user_id.to_string(), referee);
    }
    document.config.id_counter = document.referees.len() as u32 + 1;
    store.save(&document).unwrap();
    Arc::new(store)
}
