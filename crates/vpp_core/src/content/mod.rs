//! Script and metadata generation through a chat-completions service.

mod chat;
mod script;
mod seo;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;

pub use chat::{strip_code_fence, ChatClient, ChatError, ChatService};
pub use script::ChatScriptGenerator;
pub use seo::ChatMetadataGenerator;

use crate::collaborators::{StageError, StepResult};

/// Write `value` as pretty JSON to `<dir>/<prefix>_<timestamp>.json`.
pub(crate) fn write_timestamped_json<T: Serialize>(
    dir: &Path,
    prefix: &str,
    value: &T,
) -> StepResult<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| StageError::storage("creating output directory", e))?;

    let path = dir.join(format!("{}_{}.json", prefix, Local::now().format("%Y%m%d_%H%M%S")));
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| StageError::storage(format!("serializing {}", prefix), e.into()))?;
    fs::write(&path, json).map_err(|e| StageError::storage(format!("writing {}", prefix), e))?;

    tracing::info!("Saved {} to {}", prefix, path.display());
    Ok(path)
}

/// Timestamp stamped on generated payloads.
pub(crate) fn generated_at() -> String {
    Local::now().to_rfc3339()
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use super::{ChatError, ChatService};

    /// Chat service replaying canned replies and recording prompts.
    pub struct ScriptedChat {
        replies: RefCell<VecDeque<Result<String, ChatError>>>,
        pub prompts: RefCell<Vec<String>>,
    }

    impl ScriptedChat {
        pub fn new(replies: Vec<Result<String, ChatError>>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl ChatService for ScriptedChat {
        fn complete(&self, prompt: &str, _temperature: f32, _max_tokens: u32) -> Result<String, ChatError> {
            self.prompts.borrow_mut().push(prompt.to_string());
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(ChatError::EmptyReply))
        }

        fn model(&self) -> &str {
            "test-model"
        }
    }

    impl<T: ChatService> ChatService for Rc<T> {
        fn complete(&self, prompt: &str, temperature: f32, max_tokens: u32) -> Result<String, ChatError> {
            self.as_ref().complete(prompt, temperature, max_tokens)
        }

        fn model(&self) -> &str {
            self.as_ref().model()
        }
    }
}
