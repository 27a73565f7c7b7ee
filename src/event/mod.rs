use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::app::App;
use crate::async_task::Task;
use crate::error::Result;

pub mod navigator;

pub use navigator::*;

/// Whether the screen needs a redraw
pub type EventResult = Result<bool>;

pub fn handle_event(
    event: Event,
    app: &mut App,
    task_sender: &mpsc::Sender<Task>,
) -> EventResult {
    let changed = match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
        Event::Resize(_, _) => true,
        _ => false,
    };

    let refused = dispatch_tasks(app, task_sender);
    Ok(changed || refused > 0)
}

/// Hand queued loads to the worker. A load the channel refuses is installed
/// as a failed load. Returns how many were refused.
pub fn dispatch_tasks(app: &mut App, task_sender: &mpsc::Sender<Task>) -> usize {
    let mut refused = 0;
    for task in app.drain_tasks() {
        log::debug!("event: queueing {:?}", task);
        if let Err(e) = task_sender.try_send(task) {
            let reason = match &e {
                TrySendError::Full(_) => "loader queue full",
                TrySendError::Closed(_) => "loader stopped",
            };
            app.fail_task(e.into_inner(), reason);
            refused += 1;
        }
    }
    refused
}

/// Route one key press. Global bindings first, then the focused panel.
pub fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return false;
    }

    if let Some(pending) = app.pending_key.take() {
        return match complete_pending(pending, key) {
            Some(event) => {
                app.send_to_focused(event);
                true
            }
            None => {
                app.status_message.clear();
                true
            }
        };
    }

    let composing = app.is_composing();
    if !composing {
        match key.code {
            KeyCode::Char(c) if c == app.config.keybindings.quit => {
                app.should_quit = true;
                return false;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                app.next_panel();
                return true;
            }
            _ => {}
        }
    }

    match navigator_key_action(key, composing, &app.config) {
        KeyAction::Event(event) => app.send_to_focused(event),
        KeyAction::Pending(pending) => {
            app.pending_key = Some(pending);
            app.status_message = "waiting for a key...".to_string();
            true
        }
        KeyAction::Ignored => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::PanelFocus;
    use crate::async_task::execute_task;
    use crate::catalog::{fixtures, CatalogLoader, CatalogSnapshot};
    use crate::config::Config;
    use crate::search::SearchMode;

    fn press(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    /// App with the root listing installed and `app` expanded
    fn loaded_app() -> (App, CatalogLoader) {
        let loader =
            CatalogLoader::new(&CatalogSnapshot::from_json(fixtures::CATALOG).unwrap());
        let mut app = App::new(Config::default(), "local");
        for task in app.drain_tasks() {
            app.handle_task_result(execute_task(&loader, task));
        }
        (app, loader)
    }

    #[test]
    fn test_expand_key_queues_load() {
        let (mut app, _loader) = loaded_app();
        let (task_sender, mut task_receiver) = mpsc::channel::<Task>(32);

        let changed = handle_event(key(KeyCode::Right), &mut app, &task_sender).unwrap();
        assert!(changed);
        assert_eq!(
            task_receiver.try_recv().unwrap(),
            Task::LoadChildren { id: "app".into() }
        );
        assert!(app.is_loading());
    }

    #[test]
    fn test_quit_key_is_typed_while_composing() {
        let (mut app, _loader) = loaded_app();
        let (task_sender, _task_receiver) = mpsc::channel::<Task>(32);

        handle_event(press('/'), &mut app, &task_sender).unwrap();
        handle_event(press('q'), &mut app, &task_sender).unwrap();
        assert!(!app.should_quit);
        assert_eq!(app.browser.search().input(), "q");

        handle_event(key(KeyCode::Esc), &mut app, &task_sender).unwrap();
        assert_eq!(app.browser.search().mode(), SearchMode::Off);
        handle_event(press('q'), &mut app, &task_sender).unwrap();
        assert!(app.should_quit);
    }

    #[test]
    fn test_tab_switches_focus() {
        let (mut app, _loader) = loaded_app();
        assert!(handle_key(&mut app, KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)));
        assert_eq!(app.active_panel, PanelFocus::Inspector);
        handle_key(&mut app, KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT));
        assert_eq!(app.active_panel, PanelFocus::Browser);
    }

    #[test]
    fn test_mark_takes_two_keys() {
        let (mut app, _loader) = loaded_app();
        let (task_sender, _task_receiver) = mpsc::channel::<Task>(32);

        handle_event(press('m'), &mut app, &task_sender).unwrap();
        assert!(app.pending_key.is_some());
        handle_event(press('a'), &mut app, &task_sender).unwrap();
        assert!(app.pending_key.is_none());
        assert_eq!(app.browser.marks().get('a'), Some("app"));

        // Esc abandons a pending prefix without touching the navigator
        handle_event(press('\''), &mut app, &task_sender).unwrap();
        handle_event(key(KeyCode::Esc), &mut app, &task_sender).unwrap();
        assert!(app.pending_key.is_none());
    }

    #[test]
    fn test_full_queue_turns_load_into_error_row() {
        let (mut app, _loader) = loaded_app();
        let (task_sender, _task_receiver) = mpsc::channel::<Task>(1);
        task_sender
            .try_send(Task::LoadChildren { id: "busy".into() })
            .unwrap();

        let changed = handle_event(key(KeyCode::Right), &mut app, &task_sender).unwrap();
        assert!(changed);
        assert!(!app.is_loading());
        assert_eq!(app.status_message, "app: load failed: loader queue full");
        let error = app.browser.tree().find_by_id("app#error").unwrap();
        assert_eq!(
            app.browser.tree().get(error).unwrap().display_label(),
            "load failed: loader queue full"
        );
    }

    #[test]
    fn test_stopped_worker_fails_every_drained_load() {
        let mut app = App::new(Config::default(), "local");
        let (task_sender, task_receiver) = mpsc::channel::<Task>(4);
        drop(task_receiver);

        assert_eq!(dispatch_tasks(&mut app, &task_sender), 1);
        assert!(!app.is_loading());
        assert!(app.browser.tree().find_by_id("#error").is_some());
        assert_eq!(app.status_message, "/: load failed: loader stopped");
    }

    #[test]
    fn test_ctrl_c_quits_even_while_composing() {
        let (mut app, _loader) = loaded_app();
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('/'), KeyModifiers::NONE));
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }
}
