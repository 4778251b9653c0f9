//! View controller: the one place UI actions meet the store.
//!
//! # Responsibility
//! - Own `ViewState`, the cached hang list and the session vote lock.
//! - Run store-backed commands with optimistic update + reconciliation.
//!
//! # Invariants
//! - A mutation is applied to the cached hang first, then sent to the store.
//! - On success the cached hang is replaced by the store's record.
//! - On failure the pre-mutation snapshot is restored and the error is
//!   shown as one flat message; nothing is retried.
//! - Not-found on join is an inline notice, never a blocking error.

use crate::code::ShareCode;
use crate::model::attendee::{AttendeeId, RsvpStatus};
use crate::model::hang::{Hang, NewHang};
use crate::model::suggestion::{Suggestion, SuggestionId, VoteDirection};
use crate::repo::hang_repo::HangRepository;
use crate::service::hang_service::{HangService, HangServiceError, ServiceResult};
use crate::service::vote_session::VoteSession;
use crate::view::invite;
use crate::view::state::{reduce, Screen, UiAction, ViewState};
use log::warn;

/// Store-backed or purely local user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ui(UiAction),
    /// Re-fetches the full hang list.
    Refresh,
    CreateHang(NewHang),
    /// Resolves a typed or linked share code.
    Join(String),
    Rsvp {
        code: ShareCode,
        attendee_id: AttendeeId,
        status: RsvpStatus,
    },
    /// RSVP as the viewing user, adding them to the hang when needed.
    RsvpAsViewer { code: ShareCode, status: RsvpStatus },
    /// Suggestion in the currently selected category.
    Suggest { code: ShareCode, content: String },
    Vote {
        suggestion_id: SuggestionId,
        direction: VoteDirection,
    },
    RemoveSuggestion(SuggestionId),
}

pub struct ViewController<R: HangRepository> {
    service: HangService<R>,
    state: ViewState,
    hangs: Vec<Hang>,
    session: VoteSession,
    viewer: String,
    today: String,
}

impl<R: HangRepository> ViewController<R> {
    /// `viewer` is the display name used as host and RSVP identity;
    /// `today` (`YYYY-MM-DD`) splits home from past hangs.
    pub fn new(service: HangService<R>, viewer: impl Into<String>, today: impl Into<String>) -> Self {
        Self {
            service,
            state: ViewState::default(),
            hangs: Vec::new(),
            session: VoteSession::new(),
            viewer: viewer.into(),
            today: today.into(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn hangs(&self) -> &[Hang] {
        &self.hangs
    }

    pub fn hang(&self, code: &ShareCode) -> Option<&Hang> {
        self.hangs.iter().find(|hang| &hang.code == code)
    }

    pub fn session(&self) -> &VoteSession {
        &self.session
    }

    pub fn service(&self) -> &HangService<R> {
        &self.service
    }

    /// Hangs listed by the current screen: upcoming on home, past on past,
    /// none while the create form is open.
    pub fn visible_hangs(&self) -> Vec<&Hang> {
        match self.state.screen {
            Screen::Home => self
                .hangs
                .iter()
                .filter(|hang| !hang.is_past(&self.today))
                .collect(),
            Screen::Past => self
                .hangs
                .iter()
                .filter(|hang| hang.is_past(&self.today))
                .collect(),
            Screen::Create => Vec::new(),
        }
    }

    /// Page-load entry: refreshes and selects the hang named by the URL's
    /// `code` parameter, if any.
    pub fn load(&mut self, url: Option<&str>) {
        self.dispatch(Command::Refresh);
        if let Some(raw) = url.and_then(invite::code_from_url) {
            self.dispatch(Command::Join(raw));
        }
    }

    pub fn dispatch(&mut self, command: Command) {
        match command {
            Command::Ui(action) => self.apply(action),
            Command::Refresh => self.refresh(),
            Command::CreateHang(input) => self.create(input),
            Command::Join(raw) => self.join(&raw),
            Command::Rsvp {
                code,
                attendee_id,
                status,
            } => {
                self.optimistic(
                    &code,
                    |hang| {
                        hang.set_status(attendee_id, status);
                    },
                    |service, _| service.set_rsvp(&code, attendee_id, status).map(|_| ()),
                );
            }
            Command::RsvpAsViewer { code, status } => {
                let viewer = self.viewer.clone();
                self.optimistic(
                    &code,
                    |hang| {
                        hang.upsert_rsvp(&viewer, status);
                    },
                    |service, _| service.rsvp_as(&code, &viewer, status).map(|_| ()),
                );
            }
            Command::Suggest { code, content } => {
                let category = self.state.category;
                let Some(draft) = Suggestion::new(category, &content) else {
                    return;
                };
                let author = self.viewer.clone();
                self.optimistic(
                    &code,
                    |hang| hang.suggestions.push(draft),
                    |service, _| {
                        service
                            .add_suggestion_as(&code, category, &content, Some(&author))
                            .map(|_| ())
                    },
                );
            }
            Command::Vote {
                suggestion_id,
                direction,
            } => self.vote(suggestion_id, direction),
            Command::RemoveSuggestion(suggestion_id) => {
                let Some(code) = self.owner_of(suggestion_id) else {
                    return;
                };
                self.optimistic(
                    &code,
                    |hang| {
                        hang.remove_suggestion(suggestion_id);
                    },
                    |service, _| service.remove_suggestion(suggestion_id).map(|_| ()),
                );
            }
        }
    }

    fn apply(&mut self, action: UiAction) {
        self.state = reduce(std::mem::take(&mut self.state), action);
    }

    fn refresh(&mut self) {
        match self.service.list_hangs() {
            Ok(hangs) => self.hangs = hangs,
            Err(err) => self.fail(err),
        }
    }

    fn create(&mut self, input: NewHang) {
        match self.service.create_hang(input, &self.viewer) {
            Ok(hang) => {
                self.hangs.insert(0, hang);
                self.apply(UiAction::Navigate(Screen::Home));
            }
            Err(err) => self.fail(err),
        }
    }

    fn join(&mut self, raw: &str) {
        match self.service.join(raw) {
            Ok(hang) => {
                let code = hang.code.clone();
                self.replace_cached(&code, Some(hang));
                self.apply(UiAction::Navigate(Screen::Home));
                self.apply(UiAction::SelectHang(Some(code)));
            }
            Err(err) if err.is_not_found() => {
                self.apply(UiAction::ShowNotice(format!(
                    "No hang found for code {}",
                    raw.trim().to_ascii_uppercase()
                )));
            }
            Err(err) => self.fail(err),
        }
    }

    fn vote(&mut self, suggestion_id: SuggestionId, direction: VoteDirection) {
        if self.session.has_voted(suggestion_id) {
            return;
        }
        let Some(code) = self.owner_of(suggestion_id) else {
            return;
        };
        self.optimistic(
            &code,
            |hang| {
                hang.apply_vote(suggestion_id, direction.delta());
            },
            |service, session| service.vote(session, suggestion_id, direction).map(|_| ()),
        );
    }

    /// Applies `local` to the cached hang, runs `remote`, then reconciles.
    fn optimistic(
        &mut self,
        code: &ShareCode,
        local: impl FnOnce(&mut Hang),
        remote: impl FnOnce(&HangService<R>, &mut VoteSession) -> ServiceResult<()>,
    ) {
        let snapshot = self.hang(code).cloned();
        if let Some(hang) = self.hangs.iter_mut().find(|hang| &hang.code == code) {
            local(hang);
        }

        if let Err(err) = remote(&self.service, &mut self.session) {
            if let Some(previous) = snapshot {
                self.replace_cached(code, Some(previous));
            }
            self.fail(err);
            return;
        }

        match self.service.get_hang(code) {
            Ok(latest) => self.replace_cached(code, latest),
            Err(err) => self.fail(err),
        }
    }

    /// Replaces (or inserts at the front) the cached copy; `None` drops it.
    fn replace_cached(&mut self, code: &ShareCode, latest: Option<Hang>) {
        let index = self.hangs.iter().position(|hang| &hang.code == code);
        match (index, latest) {
            (Some(index), Some(hang)) => self.hangs[index] = hang,
            (Some(index), None) => {
                self.hangs.remove(index);
            }
            (None, Some(hang)) => self.hangs.insert(0, hang),
            (None, None) => {}
        }
    }

    /// Code of the hang holding the suggestion. A hang missing from the cache
    /// is fetched into it so the optimistic path has a snapshot.
    fn owner_of(&mut self, suggestion_id: SuggestionId) -> Option<ShareCode> {
        if let Some(hang) = self
            .hangs
            .iter()
            .find(|hang| hang.suggestion(suggestion_id).is_some())
        {
            return Some(hang.code.clone());
        }

        let fetched = self
            .service
            .suggestion_hang(suggestion_id)
            .and_then(|code| match code {
                Some(code) => Ok(self.service.get_hang(&code)?.map(|hang| (code, hang))),
                None => Ok(None),
            });
        match fetched {
            Ok(Some((code, hang))) => {
                self.replace_cached(&code, Some(hang));
                Some(code)
            }
            Ok(None) => None,
            Err(err) => {
                self.fail(err);
                None
            }
        }
    }

    fn fail(&mut self, err: HangServiceError) {
        warn!("event=view_dispatch module=view status=error error={err}");
        self.apply(UiAction::ShowError(err.to_string()));
    }
}
