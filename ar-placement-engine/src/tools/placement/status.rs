use bevy::prelude::*;

/// Receiver for user-visible status messages. Fire and forget.
pub trait StatusSink {
    fn report(&mut self, message: &str);
}

impl StatusSink for Vec<String> {
    fn report(&mut self, message: &str) {
        self.push(message.to_string());
    }
}

/// Status messages queued for the overlay and the page.
#[derive(Resource, Debug, Default)]
pub struct StatusLog {
    pending: Vec<String>,
}

impl StatusLog {
    /// Messages reported since the last drain, oldest first.
    pub fn drain(&mut self) -> std::vec::Drain<'_, String> {
        self.pending.drain(..)
    }
}

impl StatusSink for StatusLog {
    fn report(&mut self, message: &str) {
        info!("AR status: {}", message);
        self.pending.push(message.to_string());
    }
}
