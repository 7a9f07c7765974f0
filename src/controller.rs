use std::time::Duration;
use tracing::trace;

use ratatui::crossterm::event::{self, Event, KeyCode};
use crate::domain::{Message, TableConfig, TableError};
use crate::model::Model;

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &TableConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    /// Waits up to the poll time for one terminal event. Returning `None` on a
    /// timeout lets the caller redraw, which is how copy confirmations revert
    /// on screen without input.
    pub fn handle_event(&self, _model: &Model) -> Result<Option<Message>, TableError> {
        if event::poll(Duration::from_millis(self.event_poll_time))? {
            return Ok(match event::read()? {
                Event::Key(key) if key.kind == event::KeyEventKind::Press => self.handle_key(key),
                Event::Resize(width, height) => {
                    Some(Message::Resize(width as usize, height as usize))
                }
                _ => None,
            });
        }
        Ok(None)
    }

    fn handle_key(&self, key: event::KeyEvent) -> Option<Message> {
        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Up | KeyCode::Char('k') => Some(Message::MoveUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Message::MoveDown),
            KeyCode::Left | KeyCode::Char('h') => Some(Message::MoveLeft),
            KeyCode::Right | KeyCode::Char('l') => Some(Message::MoveRight),
            KeyCode::Home | KeyCode::Char('g') => Some(Message::MoveBeginning),
            KeyCode::End | KeyCode::Char('G') => Some(Message::MoveEnd),
            KeyCode::Enter => Some(Message::ActivateRow),
            KeyCode::Char('c') | KeyCode::Char('y') => Some(Message::CopyCell),
            KeyCode::Char('r') => Some(Message::Rerender),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Esc => Some(Message::Exit),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::{KeyEvent, KeyModifiers};

    fn key(code: KeyCode) -> Option<Message> {
        Controller::new(&TableConfig::default()).handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn maps_keys_to_messages() {
        assert_eq!(key(KeyCode::Char('q')), Some(Message::Quit));
        assert_eq!(key(KeyCode::Enter), Some(Message::ActivateRow));
        assert_eq!(key(KeyCode::Char('y')), Some(Message::CopyCell));
        assert_eq!(key(KeyCode::Char('c')), Some(Message::CopyCell));
        assert_eq!(key(KeyCode::Char('j')), Some(Message::MoveDown));
        assert_eq!(key(KeyCode::Left), Some(Message::MoveLeft));
        assert_eq!(key(KeyCode::Char('?')), Some(Message::Help));
        assert_eq!(key(KeyCode::Esc), Some(Message::Exit));
        assert_eq!(key(KeyCode::Char('z')), None);
    }
}
