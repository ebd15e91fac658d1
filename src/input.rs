use crossterm::event::KeyCode;

use crate::model::order::OrderType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    SwitchTab(OrderType),
    IncreaseQuantity,
    DecreaseQuantity,
    LeverageUp,
    LeverageDown,
    Buy,
    Sell,
    EditQuantity,
    EditLimitPrice,
    NextPage,
    PrevPage,
    Refresh,
}

/// Keys while a text field (quantity or limit price) has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCommand {
    Push(char),
    Pop,
    Commit,
    Cancel,
}

pub fn parse_main_command(key_code: &KeyCode) -> Option<UiCommand> {
    match key_code {
        KeyCode::Right => Some(UiCommand::IncreaseQuantity),
        KeyCode::Left => Some(UiCommand::DecreaseQuantity),
        KeyCode::Up => Some(UiCommand::LeverageUp),
        KeyCode::Down => Some(UiCommand::LeverageDown),
        KeyCode::PageDown => Some(UiCommand::NextPage),
        KeyCode::PageUp => Some(UiCommand::PrevPage),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(UiCommand::IncreaseQuantity),
        KeyCode::Char('-') | KeyCode::Char('_') => Some(UiCommand::DecreaseQuantity),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'o' => Some(UiCommand::SwitchTab(OrderType::Market)),
            'l' => Some(UiCommand::SwitchTab(OrderType::Limit)),
            'b' => Some(UiCommand::Buy),
            's' => Some(UiCommand::Sell),
            'e' => Some(UiCommand::EditQuantity),
            'p' => Some(UiCommand::EditLimitPrice),
            'n' => Some(UiCommand::NextPage),
            'v' => Some(UiCommand::PrevPage),
            'r' => Some(UiCommand::Refresh),
            _ => None,
        },
        _ => None,
    }
}

pub fn parse_edit_command(key_code: &KeyCode) -> Option<EditCommand> {
    match key_code {
        KeyCode::Enter => Some(EditCommand::Commit),
        KeyCode::Esc => Some(EditCommand::Cancel),
        KeyCode::Backspace => Some(EditCommand::Pop),
        KeyCode::Char(c) if !c.is_control() => Some(EditCommand::Push(*c)),
        _ => None,
    }
}
