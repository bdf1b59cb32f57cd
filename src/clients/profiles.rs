use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::NotifyError;
use crate::models::recipient::RecipientProfile;

#[async_trait]
pub trait RecipientProfiles: Send + Sync {
    async fn get(&self, recipient_id: &str) -> Result<Option<RecipientProfile>, NotifyError>;
}

#[derive(Default)]
pub struct InMemoryProfiles {
    profiles: Mutex<HashMap<String, RecipientProfile>>,
}

impl InMemoryProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, profile: RecipientProfile) {
        let mut profiles = self.profiles.lock().unwrap();
        profiles.insert(profile.recipient_id.clone(), profile);
    }
}

#[async_trait]
impl RecipientProfiles for InMemoryProfiles {
    async fn get(&self, recipient_id: &str) -> Result<Option<RecipientProfile>, NotifyError> {
        let profiles = self.profiles.lock().unwrap();
        Ok(profiles.get(recipient_id).cloned())
    }
}
