//! Pure view state and transitions.

use crate::code::ShareCode;
use crate::model::suggestion::SuggestionCategory;

/// Main screen selected by the bottom navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Home,
    Create,
    Past,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// UI-local state. Owns nothing from the store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    pub screen: Screen,
    /// At most one hang card is expanded.
    pub expanded: Option<ShareCode>,
    /// Category applied to the next suggestion submitted.
    pub category: SuggestionCategory,
    pub theme: Theme,
    /// Hang selected through an invite link or code entry.
    pub active: Option<ShareCode>,
    /// Inline, non-blocking message (e.g. unknown code on join).
    pub notice: Option<String>,
    /// Flat blocking error; cleared only by an explicit dismiss/retry.
    pub error: Option<String>,
}

/// Direct user-triggered transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    Navigate(Screen),
    /// Expands the hang, or collapses it when it is already expanded.
    ToggleExpanded(ShareCode),
    SelectCategory(SuggestionCategory),
    ToggleTheme,
    SelectHang(Option<ShareCode>),
    ShowNotice(String),
    ShowError(String),
    DismissMessages,
}

/// Applies one transition.
pub fn reduce(mut state: ViewState, action: UiAction) -> ViewState {
    match action {
        UiAction::Navigate(screen) => {
            state.screen = screen;
            state.notice = None;
        }
        UiAction::ToggleExpanded(code) => {
            state.expanded = match state.expanded {
                Some(current) if current == code => None,
                _ => Some(code),
            };
        }
        UiAction::SelectCategory(category) => state.category = category,
        UiAction::ToggleTheme => state.theme = state.theme.toggled(),
        UiAction::SelectHang(code) => {
            state.expanded = code.clone();
            state.active = code;
            state.notice = None;
        }
        UiAction::ShowNotice(message) => state.notice = Some(message),
        UiAction::ShowError(message) => state.error = Some(message),
        UiAction::DismissMessages => {
            state.notice = None;
            state.error = None;
        }
    }
    state
}
