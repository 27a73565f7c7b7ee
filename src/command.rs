use crate::error::{PgnavError, Result};
use crate::navigation::Direction;
use crate::navigator::NavigatorEvent;
use crate::query::TypeFilter;
use std::fmt;

/// Represents all possible user commands that can be executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Global commands
    NextPanel,
    Quit,

    // Cursor movement
    Up,
    Down,
    PageUp,
    PageDown,
    HalfPageUp,
    HalfPageDown,
    Top,
    Bottom,

    // Tree shape
    Expand,
    Collapse,
    Toggle,
    Enter,

    // Structural jumps
    Parent,
    NextSibling,
    PrevSibling,
    NextOfType(TypeFilter),
    PrevOfType(TypeFilter),
    QuickJump(char),
    QuickJumpBack(char),
    SetMark(char),
    JumpToMark(char),

    // Search prompt
    StartSearch,
    SearchInput(char),
    TypeQuery(String),
    SearchBackspace,
    ConfirmSearch,
    CancelSearch,

    // Multi-step commands for scripts and tests
    Sequence(Vec<Command>),
}

fn single_char(arg: &str, s: &str) -> Result<char> {
    let mut chars = arg.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(PgnavError::Command(format!("{} (expected one character)", s))),
    }
}

fn type_filter(arg: &str, s: &str) -> Result<TypeFilter> {
    TypeFilter::from_prefix(arg)
        .ok_or_else(|| PgnavError::Command(format!("{} (unknown object type)", s)))
}

impl Command {
    /// Parse a command from a string representation
    pub fn from_string(s: &str) -> Result<Self> {
        let s = s.trim();
        let keyword = match s.to_lowercase().as_str() {
            "tab" | "next_panel" => Some(Command::NextPanel),
            "quit" | "q" => Some(Command::Quit),
            "up" => Some(Command::Up),
            "down" => Some(Command::Down),
            "page_up" => Some(Command::PageUp),
            "page_down" => Some(Command::PageDown),
            "half_page_up" => Some(Command::HalfPageUp),
            "half_page_down" => Some(Command::HalfPageDown),
            "top" | "g" => Some(Command::Top),
            "bottom" => Some(Command::Bottom),
            "expand" | "right" => Some(Command::Expand),
            "collapse" | "left" => Some(Command::Collapse),
            "toggle" => Some(Command::Toggle),
            "enter" => Some(Command::Enter),
            "parent" => Some(Command::Parent),
            "next_sibling" => Some(Command::NextSibling),
            "prev_sibling" => Some(Command::PrevSibling),
            "/" | "start_search" => Some(Command::StartSearch),
            "backspace" => Some(Command::SearchBackspace),
            "confirm" => Some(Command::ConfirmSearch),
            "cancel" | "escape" => Some(Command::CancelSearch),
            _ => None,
        };
        if let Some(command) = keyword {
            return Ok(command);
        }

        if let Some(inner) = s
            .strip_prefix("sequence:[")
            .and_then(|rest| rest.strip_suffix(']'))
        {
            // Parse sequence: sequence:[cmd1,cmd2,cmd3]
            if inner.trim().is_empty() {
                return Ok(Command::Sequence(vec![]));
            }
            let commands = inner
                .split(',')
                .map(|part| {
                    Command::from_string(part).map_err(|e| {
                        PgnavError::Command(format!("in sequence '{}': {}", part.trim(), e))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            return Ok(Command::Sequence(commands));
        }

        let Some((name, arg)) = s.split_once(':') else {
            return Err(PgnavError::Command(s.to_string()));
        };
        match name.to_lowercase().as_str() {
            "next" => Ok(Command::NextOfType(type_filter(arg, s)?)),
            "prev" => Ok(Command::PrevOfType(type_filter(arg, s)?)),
            "quick" => Ok(Command::QuickJump(single_char(arg, s)?)),
            "quick_back" => Ok(Command::QuickJumpBack(single_char(arg, s)?)),
            "mark" => Ok(Command::SetMark(single_char(arg, s)?)),
            "jump" => Ok(Command::JumpToMark(single_char(arg, s)?)),
            "search" => Ok(Command::SearchInput(single_char(arg, s)?)),
            "type" => Ok(Command::TypeQuery(arg.to_string())),
            _ => Err(PgnavError::Command(s.to_string())),
        }
    }

    /// Parse a comma-separated script, the form the CLI accepts
    pub fn parse_script(script: &str) -> Result<Vec<Command>> {
        let script = script.trim();
        if script.is_empty() {
            return Ok(Vec::new());
        }
        if script.starts_with("sequence:[") {
            return Ok(vec![Command::from_string(script)?]);
        }
        script.split(',').map(Command::from_string).collect()
    }

    /// The navigator event this command maps to; `None` for commands the
    /// application handles itself.
    pub fn navigator_event(&self) -> Option<NavigatorEvent> {
        let event = match self {
            Command::Up => NavigatorEvent::MoveUp,
            Command::Down => NavigatorEvent::MoveDown,
            Command::PageUp => NavigatorEvent::PageUp,
            Command::PageDown => NavigatorEvent::PageDown,
            Command::HalfPageUp => NavigatorEvent::HalfPageUp,
            Command::HalfPageDown => NavigatorEvent::HalfPageDown,
            Command::Top => NavigatorEvent::Top,
            Command::Bottom => NavigatorEvent::Bottom,
            Command::Expand => NavigatorEvent::Expand,
            Command::Collapse => NavigatorEvent::Collapse,
            Command::Toggle => NavigatorEvent::Toggle,
            Command::Enter => NavigatorEvent::Select,
            Command::Parent => NavigatorEvent::Parent,
            Command::NextSibling => NavigatorEvent::Sibling(Direction::Forward),
            Command::PrevSibling => NavigatorEvent::Sibling(Direction::Backward),
            Command::NextOfType(filter) => NavigatorEvent::TypeJump(*filter, Direction::Forward),
            Command::PrevOfType(filter) => NavigatorEvent::TypeJump(*filter, Direction::Backward),
            Command::QuickJump(c) => NavigatorEvent::QuickJump(*c, Direction::Forward),
            Command::QuickJumpBack(c) => NavigatorEvent::QuickJump(*c, Direction::Backward),
            Command::SetMark(c) => NavigatorEvent::SetMark(*c),
            Command::JumpToMark(c) => NavigatorEvent::JumpToMark(*c),
            Command::StartSearch => NavigatorEvent::StartSearch,
            Command::SearchInput(c) => NavigatorEvent::SearchInput(*c),
            Command::TypeQuery(text) => NavigatorEvent::SetSearchQuery(text.clone()),
            Command::SearchBackspace => NavigatorEvent::SearchBackspace,
            Command::ConfirmSearch => NavigatorEvent::ConfirmSearch,
            Command::CancelSearch => NavigatorEvent::CancelSearch,
            Command::NextPanel | Command::Quit | Command::Sequence(_) => return None,
        };
        Some(event)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::NextPanel => f.write_str("tab"),
            Command::Quit => f.write_str("quit"),
            Command::Up => f.write_str("up"),
            Command::Down => f.write_str("down"),
            Command::PageUp => f.write_str("page_up"),
            Command::PageDown => f.write_str("page_down"),
            Command::HalfPageUp => f.write_str("half_page_up"),
            Command::HalfPageDown => f.write_str("half_page_down"),
            Command::Top => f.write_str("top"),
            Command::Bottom => f.write_str("bottom"),
            Command::Expand => f.write_str("expand"),
            Command::Collapse => f.write_str("collapse"),
            Command::Toggle => f.write_str("toggle"),
            Command::Enter => f.write_str("enter"),
            Command::Parent => f.write_str("parent"),
            Command::NextSibling => f.write_str("next_sibling"),
            Command::PrevSibling => f.write_str("prev_sibling"),
            Command::NextOfType(filter) => write!(f, "next:{}", filter),
            Command::PrevOfType(filter) => write!(f, "prev:{}", filter),
            Command::QuickJump(c) => write!(f, "quick:{}", c),
            Command::QuickJumpBack(c) => write!(f, "quick_back:{}", c),
            Command::SetMark(c) => write!(f, "mark:{}", c),
            Command::JumpToMark(c) => write!(f, "jump:{}", c),
            Command::StartSearch => f.write_str("/"),
            Command::SearchInput(c) => write!(f, "search:{}", c),
            Command::TypeQuery(text) => write!(f, "type:{}", text),
            Command::SearchBackspace => f.write_str("backspace"),
            Command::ConfirmSearch => f.write_str("confirm"),
            Command::CancelSearch => f.write_str("cancel"),
            Command::Sequence(commands) => {
                let parts: Vec<String> = commands.iter().map(|c| c.to_string()).collect();
                write!(f, "sequence:[{}]", parts.join(","))
            }
        }
    }
}
