use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::NotifyError;
use crate::models::template::Template;

#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn get(&self, template_id: &str) -> Result<Option<Template>, NotifyError>;
}

#[derive(Default)]
pub struct InMemoryTemplateStore {
    templates: Mutex<HashMap<String, Template>>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, template: Template) {
        let mut templates = self.templates.lock().unwrap();
        templates.insert(template.id.clone(), template);
    }
}

#[async_trait]
impl TemplateStore for InMemoryTemplateStore {
    async fn get(&self, template_id: &str) -> Result<Option<Template>, NotifyError> {
        let templates = self.templates.lock().unwrap();
        Ok(templates.get(template_id).cloned())
    }
}
