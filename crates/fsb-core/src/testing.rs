//! Fakes shared by the unit tests.

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    config::Config,
    domain::{ChatId, Destination, MessageId, MessageRef, UserId},
    errors::{Error, PlatformErrorKind},
    messaging::{
        port::MessagingPort,
        types::{BotIdentity, LinkKeyboard, MessagingCapabilities},
    },
    scheduler::{Job, OnceScheduler},
    Result,
};

pub fn test_config() -> Config {
    Config {
        telegram_bot_token: "x".to_string(),
        bot_username: Some("FileShareBot".to_string()),
        public_channel: Some(Destination::Channel("@files_public".to_string())),
        private_channel_id: None,
        catalog_path: PathBuf::from("/tmp/catalog.json"),
        delete_after: Duration::from_secs(1200),
        auto_setup_buttons: false,
        button_setup_delay: Duration::from_secs(2),
        throttle_global: Duration::ZERO,
        throttle_per_chat: Duration::ZERO,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Text(ChatId, String),
    Document {
        chat_id: ChatId,
        file_ref: String,
        caption: String,
    },
    Delete(MessageRef),
    Keyboard(Destination, String, LinkKeyboard),
}

#[derive(Default)]
pub struct FakeMessenger {
    next_id: Mutex<i32>,
    calls: Mutex<Vec<Call>>,
    document_failures: Mutex<HashMap<String, PlatformErrorKind>>,
    text_failure: Mutex<Option<PlatformErrorKind>>,
    delete_failure: Mutex<Option<PlatformErrorKind>>,
}

impl FakeMessenger {
    pub fn new() -> Self {
        Self {
            next_id: Mutex::new(100),
            ..Default::default()
        }
    }

    pub fn fail_document(&self, file_ref: &str, kind: PlatformErrorKind) {
        self.document_failures
            .lock()
            .unwrap()
            .insert(file_ref.to_string(), kind);
    }

    pub fn fail_texts(&self, kind: PlatformErrorKind) {
        *self.text_failure.lock().unwrap() = Some(kind);
    }

    pub fn fail_deletes(&self, kind: PlatformErrorKind) {
        *self.delete_failure.lock().unwrap() = Some(kind);
    }

    fn alloc(&self, chat_id: ChatId) -> MessageRef {
        let mut guard = self.next_id.lock().unwrap();
        let id = *guard;
        *guard += 1;
        MessageRef {
            chat_id,
            message_id: MessageId(id),
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Every text message attempted, in order.
    pub fn texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Text(_, t) => Some(t),
                _ => None,
            })
            .collect()
    }

    /// Every document send attempted, as `(file_ref, caption)`.
    pub fn documents(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Document {
                    file_ref, caption, ..
                } => Some((file_ref, caption)),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> Vec<MessageRef> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn keyboards(&self) -> Vec<(Destination, String, LinkKeyboard)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Keyboard(d, t, k) => Some((d, t, k)),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities {
            max_caption_len: 1024,
        }
    }

    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
        self.record(Call::Text(chat_id, html.to_string()));
        let failure = *self.text_failure.lock().unwrap();
        if let Some(kind) = failure {
            return Err(Error::platform(kind, "text rejected"));
        }
        Ok(self.alloc(chat_id))
    }

    async fn send_document(
        &self,
        chat_id: ChatId,
        file_ref: &str,
        caption: &str,
    ) -> Result<MessageRef> {
        self.record(Call::Document {
            chat_id,
            file_ref: file_ref.to_string(),
            caption: caption.to_string(),
        });
        let failure = self.document_failures.lock().unwrap().get(file_ref).copied();
        if let Some(kind) = failure {
            return Err(Error::platform(kind, format!("cannot send {file_ref}")));
        }
        Ok(self.alloc(chat_id))
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        self.record(Call::Delete(msg));
        let failure = *self.delete_failure.lock().unwrap();
        if let Some(kind) = failure {
            return Err(Error::platform(kind, "delete rejected"));
        }
        Ok(())
    }

    async fn send_link_keyboard(
        &self,
        destination: &Destination,
        html: &str,
        keyboard: LinkKeyboard,
    ) -> Result<MessageRef> {
        self.record(Call::Keyboard(
            destination.clone(),
            html.to_string(),
            keyboard,
        ));
        let chat_id = match destination {
            Destination::Chat(id) => *id,
            Destination::Channel(_) => ChatId(-100),
        };
        Ok(self.alloc(chat_id))
    }

    async fn identity(&self) -> Result<BotIdentity> {
        Ok(BotIdentity {
            id: UserId(42),
            username: "FileShareBot".to_string(),
        })
    }
}

/// Scheduler that only records jobs; tests fire them explicitly.
#[derive(Default)]
pub struct ManualScheduler {
    jobs: Mutex<Vec<(Duration, Job)>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outstanding(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.jobs.lock().unwrap().iter().map(|(d, _)| *d).collect()
    }

    pub async fn fire_all(&self) {
        let jobs: Vec<(Duration, Job)> = self.jobs.lock().unwrap().drain(..).collect();
        for (_, job) in jobs {
            job.await;
        }
    }
}

impl OnceScheduler for ManualScheduler {
    fn schedule_once(&self, delay: Duration, job: Job) {
        self.jobs.lock().unwrap().push((delay, job));
    }

    fn outstanding(&self) -> usize {
        ManualScheduler::outstanding(self)
    }
}
