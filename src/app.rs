use crate::async_task::{Task, TaskResult};
use crate::catalog::{browser_tree, DbNavigator};
use crate::command::Command;
use crate::config::Config;
use crate::error::LoaderError;
use crate::json_view::{json_navigator, JsonNavigator};
use crate::navigation::Direction;
use crate::navigator::{Navigator, NavigatorEvent, NavigatorOutput};
use crate::tree::NodeIdx;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    Browser,
    Inspector,
}

/// A key that waits for the next character before it means anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingKey {
    SetMark,
    JumpToMark,
    QuickJump(Direction),
}

#[derive(Debug)]
pub struct App {
    pub config: Config,
    pub browser: DbNavigator,
    pub inspector: JsonNavigator,
    pub active_panel: PanelFocus,
    pub pending_key: Option<PendingKey>,
    pub status_message: String,
    pub should_quit: bool,
    /// Loads sent to the worker and not answered yet
    pub loads_in_flight: usize,
    /// Browser node currently shown in the inspector
    pub inspected: Option<String>,
    queued: Vec<Task>,
}

impl App {
    /// Fresh application for `connection`. The root listing is queued
    /// straight away; callers pick it up with [`App::drain_tasks`].
    pub fn new(config: Config, connection: &str) -> Self {
        Self {
            config,
            browser: Navigator::new(browser_tree(connection)),
            inspector: json_navigator(&Value::Null, "nothing selected"),
            active_panel: PanelFocus::Browser,
            pending_key: None,
            status_message: format!("Connecting to {}", connection),
            should_quit: false,
            loads_in_flight: 0,
            inspected: None,
            queued: vec![Task::LoadChildren { id: String::new() }],
        }
    }

    /// Show `document` in the inspector until a browser node is selected
    pub fn with_document(mut self, document: &Value, label: &str) -> Self {
        self.inspector = json_navigator(document, label);
        self.inspected = None;
        self
    }

    pub fn next_panel(&mut self) {
        self.active_panel = match self.active_panel {
            PanelFocus::Browser => PanelFocus::Inspector,
            PanelFocus::Inspector => PanelFocus::Browser,
        };
    }

    pub fn is_loading(&self) -> bool {
        self.loads_in_flight > 0
    }

    /// Whether keys go to a search prompt rather than to bindings
    pub fn is_composing(&self) -> bool {
        match self.active_panel {
            PanelFocus::Browser => self.browser.is_composing(),
            PanelFocus::Inspector => self.inspector.is_composing(),
        }
    }

    /// Status line text for the focused panel: search status when a
    /// search is active, else the last message.
    pub fn status_line(&self) -> String {
        let search = match self.active_panel {
            PanelFocus::Browser => self.browser.search_status(),
            PanelFocus::Inspector => self.inspector.search_status(),
        };
        if search.is_empty() {
            self.status_message.clone()
        } else {
            search
        }
    }

    /// Send an event to whichever navigator has focus
    pub fn send_to_focused(&mut self, event: NavigatorEvent) -> bool {
        match self.active_panel {
            PanelFocus::Browser => self.browser.handle_event(event),
            PanelFocus::Inspector => self.inspector.handle_event(event),
        }
    }

    /// Apply a script command. Returns whether anything changed.
    pub fn apply_command(&mut self, command: &Command) -> bool {
        log::debug!("apply_command: {}", command);
        match command {
            Command::NextPanel => {
                self.next_panel();
                true
            }
            Command::Quit => {
                self.should_quit = true;
                false
            }
            Command::Sequence(commands) => commands
                .iter()
                .fold(false, |changed, c| self.apply_command(c) || changed),
            other => match other.navigator_event() {
                Some(event) => self.send_to_focused(event),
                None => false,
            },
        }
    }

    /// React to navigator side effects and hand back the loads to run
    pub fn drain_tasks(&mut self) -> Vec<Task> {
        let mut tasks = std::mem::take(&mut self.queued);

        for output in self.browser.take_events() {
            match output {
                NavigatorOutput::LoadRequested(id) => {
                    self.status_message = format!("Loading {}...", display_id(&id));
                    tasks.push(Task::LoadChildren { id });
                }
                NavigatorOutput::Selected { node, .. } => self.inspect_browser_node(node),
                NavigatorOutput::Toggled { id, expanded, .. } => {
                    log::debug!("browser: {:?} expanded={}", id, expanded);
                }
            }
        }

        for output in self.inspector.take_events() {
            if let NavigatorOutput::Selected { id, .. } = output {
                self.status_message = format!("JSON pointer: {}", display_id(&id));
            }
        }

        self.loads_in_flight += tasks.len();
        tasks
    }

    /// Install a finished load into the browser
    pub fn handle_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::ChildrenLoaded { id, result } => {
                self.loads_in_flight = self.loads_in_flight.saturating_sub(1);
                self.status_message = match &result {
                    Ok(children) => format!("{}: {} objects", display_id(&id), children.len()),
                    Err(e) => format!("{}: {}", display_id(&id), e),
                };
                self.browser.install_children(&id, result);
            }
        }
    }

    /// Report a load that never reached the worker. The node gets the same
    /// error row a failed load would produce.
    pub fn fail_task(&mut self, task: Task, reason: &str) {
        let Task::LoadChildren { id } = task;
        log::warn!("load for {:?} not queued: {}", id, reason);
        self.handle_task_result(TaskResult::ChildrenLoaded {
            id,
            result: Err(LoaderError::Failed(reason.to_string())),
        });
    }

    fn inspect_browser_node(&mut self, idx: NodeIdx) {
        let Some(node) = self.browser.tree().get(idx) else {
            return;
        };
        let document = json!({
            "id": node.id,
            "kind": node.kind,
            "name": node.label,
            "path": self.browser.context_path(idx),
            "meta": node.meta,
        });
        let label = node.display_label();
        let id = node.id.clone();

        self.inspector = json_navigator(&document, &label);
        self.status_message = format!("Inspecting {}", display_id(&id));
        self.inspected = Some(id);
    }
}

fn display_id(id: &str) -> &str {
    if id.is_empty() {
        "/"
    } else {
        id
    }
}
