//! Scripted language backend for tests.

use async_trait::async_trait;

use crate::conversation::Message;
use crate::llm::{LanguageBackend, LlmError};

enum Mode {
    Reply(String),
    Fail(LlmError),
    Hang,
}

pub(crate) struct FakeBackend {
    mode: Mode,
}

impl FakeBackend {
    pub fn replies(text: &str) -> Self {
        Self {
            mode: Mode::Reply(text.to_string()),
        }
    }

    pub fn fails(error: LlmError) -> Self {
        Self {
            mode: Mode::Fail(error),
        }
    }

    pub fn hangs() -> Self {
        Self { mode: Mode::Hang }
    }
}

#[async_trait]
impl LanguageBackend for FakeBackend {
    async fn complete(
        &self,
        _system: &str,
        _history: &[Message],
        _input: &str,
    ) -> Result<String, LlmError> {
        match &self.mode {
            Mode::Reply(text) => Ok(text.clone()),
            Mode::Fail(error) => Err(error.clone()),
            Mode::Hang => {
                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
                Ok(String::new())
            }
        }
    }
}
