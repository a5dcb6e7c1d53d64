use std::collections::VecDeque;

pub const CANCELLATION_PROMPT: &str = "Are you sure you want to cancel this appointment?";

/// Blocking yes/no prompt. The page asks it and waits for the answer.
pub trait ConfirmDialog {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F> ConfirmDialog for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

/// Answers prompts from a queue, falling back to a default once the queue
/// runs dry. Every prompt is recorded.
#[derive(Debug, Clone)]
pub struct ScriptedConfirm {
    responses: VecDeque<bool>,
    default_response: bool,
    prompts: Vec<String>,
}

impl Default for ScriptedConfirm {
    fn default() -> Self {
        Self {
            responses: VecDeque::new(),
            default_response: true,
            prompts: Vec::new(),
        }
    }
}

impl ScriptedConfirm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue_response(&mut self, accepted: bool) {
        self.responses.push_back(accepted);
    }

    pub fn set_default_response(&mut self, accepted: bool) {
        self.default_response = accepted;
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn take_prompts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.prompts)
    }
}

impl ConfirmDialog for ScriptedConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        self.prompts.push(message.to_string());
        self.responses.pop_front().unwrap_or(self.default_response)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmGate {
    Cancellation,
    Action(String),
}

impl ConfirmGate {
    pub fn message(&self) -> &str {
        match self {
            Self::Cancellation => CANCELLATION_PROMPT,
            Self::Action(message) => message,
        }
    }

    pub fn ask(&self, dialog: &mut dyn ConfirmDialog) -> bool {
        dialog.confirm(self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_confirm_drains_queue_then_uses_default() {
        let mut dialog = ScriptedConfirm::new();
        dialog.enqueue_response(false);
        dialog.set_default_response(true);

        assert!(!ConfirmGate::Cancellation.ask(&mut dialog));
        assert!(ConfirmGate::Action("Delete?".into()).ask(&mut dialog));
        assert_eq!(
            dialog.take_prompts(),
            vec![CANCELLATION_PROMPT.to_string(), "Delete?".to_string()]
        );
        assert!(dialog.prompts().is_empty());
    }

    #[test]
    fn closures_act_as_dialogs() {
        let mut seen = Vec::new();
        let mut dialog = |message: &str| {
            seen.push(message.to_string());
            message.contains("cancel")
        };
        assert!(ConfirmGate::Cancellation.ask(&mut dialog));
        assert!(!ConfirmGate::Action("Proceed?".into()).ask(&mut dialog));
        assert_eq!(seen.len(), 2);
    }
}
