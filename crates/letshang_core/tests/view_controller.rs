use letshang_core::db::open_db_in_memory;
use letshang_core::{
    AttendeeId, Command, Hang, HangRepository, HangService, NewHang, RepoError, RepoResult,
    RsvpStatus, Screen, ShareCode, SqliteHangRepository, Suggestion, SuggestionCategory,
    SuggestionId, UiAction, ViewController, VoteDirection,
};
use std::cell::Cell;

/// Delegates to SQLite but can be switched to fail every write.
struct FlakyRepo<'conn> {
    inner: SqliteHangRepository<'conn>,
    offline: Cell<bool>,
}

impl FlakyRepo<'_> {
    fn guard(&self) -> RepoResult<()> {
        if self.offline.get() {
            Err(RepoError::InvalidData("backend unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

impl HangRepository for FlakyRepo<'_> {
    fn create_hang(&self, hang: &Hang) -> RepoResult<ShareCode> {
        self.guard()?;
        self.inner.create_hang(hang)
    }

    fn get_hang(&self, code: &ShareCode) -> RepoResult<Option<Hang>> {
        self.inner.get_hang(code)
    }

    fn list_hangs(&self) -> RepoResult<Vec<Hang>> {
        self.inner.list_hangs()
    }

    fn code_exists(&self, code: &ShareCode) -> RepoResult<bool> {
        self.inner.code_exists(code)
    }

    fn set_attendee_status(
        &self,
        code: &ShareCode,
        attendee_id: AttendeeId,
        status: RsvpStatus,
    ) -> RepoResult<()> {
        self.guard()?;
        self.inner.set_attendee_status(code, attendee_id, status)
    }

    fn upsert_attendee(
        &self,
        code: &ShareCode,
        name: &str,
        status: RsvpStatus,
    ) -> RepoResult<AttendeeId> {
        self.guard()?;
        self.inner.upsert_attendee(code, name, status)
    }

    fn insert_suggestion(&self, code: &ShareCode, suggestion: &Suggestion) -> RepoResult<()> {
        self.guard()?;
        self.inner.insert_suggestion(code, suggestion)
    }

    fn adjust_votes(&self, suggestion_id: SuggestionId, delta: i64) -> RepoResult<i64> {
        self.guard()?;
        self.inner.adjust_votes(suggestion_id, delta)
    }

    fn delete_suggestion(&self, suggestion_id: SuggestionId) -> RepoResult<ShareCode> {
        self.guard()?;
        self.inner.delete_suggestion(suggestion_id)
    }

    fn find_suggestion_hang(&self, suggestion_id: SuggestionId) -> RepoResult<Option<ShareCode>> {
        self.inner.find_suggestion_hang(suggestion_id)
    }
}

fn game_night(date: &str) -> NewHang {
    NewHang {
        title: "Game Night".to_string(),
        date: date.to_string(),
        time: "19:00".to_string(),
        location: "My place".to_string(),
        ..NewHang::default()
    }
}

fn controller(conn: &rusqlite::Connection) -> ViewController<FlakyRepo<'_>> {
    controller_as(conn, "Alex")
}

fn controller_as<'conn>(
    conn: &'conn rusqlite::Connection,
    viewer: &str,
) -> ViewController<FlakyRepo<'conn>> {
    let repo = FlakyRepo {
        inner: SqliteHangRepository::new(conn),
        offline: Cell::new(false),
    };
    ViewController::new(HangService::new(repo), viewer, "2024-01-10")
}

fn go_offline(view: &ViewController<FlakyRepo<'_>>) {
    view.service().repository().offline.set(true);
}

#[test]
fn create_returns_home_and_caches_new_hang() {
    let conn = open_db_in_memory().unwrap();
    let mut view = controller(&conn);

    view.dispatch(Command::Ui(UiAction::Navigate(Screen::Create)));
    assert!(view.visible_hangs().is_empty());
    view.dispatch(Command::CreateHang(game_night("2024-01-15")));

    assert_eq!(view.state().screen, Screen::Home);
    assert_eq!(view.hangs().len(), 1);
    assert_eq!(view.visible_hangs().len(), 1);
    assert_eq!(view.hangs()[0].attendees[0].name, "Alex");
    assert!(view.state().error.is_none());
}

#[test]
fn past_screen_lists_only_past_hangs() {
    let conn = open_db_in_memory().unwrap();
    let mut view = controller(&conn);
    view.dispatch(Command::CreateHang(game_night("2024-01-01")));
    view.dispatch(Command::CreateHang(game_night("2024-02-01")));

    assert_eq!(view.visible_hangs().len(), 1);
    view.dispatch(Command::Ui(UiAction::Navigate(Screen::Past)));
    let past = view.visible_hangs();
    assert_eq!(past.len(), 1);
    assert_eq!(past[0].date, "2024-01-01");
}

#[test]
fn suggestion_uses_selected_category_and_reconciles_with_store() {
    let conn = open_db_in_memory().unwrap();
    let mut view = controller(&conn);
    view.dispatch(Command::CreateHang(game_night("2024-01-15")));
    let code = view.hangs()[0].code.clone();

    view.dispatch(Command::Ui(UiAction::SelectCategory(SuggestionCategory::Time)));
    view.dispatch(Command::Suggest {
        code: code.clone(),
        content: "  6pm?  ".to_string(),
    });
    view.dispatch(Command::Suggest {
        code: code.clone(),
        content: "   ".to_string(),
    });

    let cached = view.hang(&code).unwrap().clone();
    let stored = view.service().get_hang(&code).unwrap().unwrap();
    assert_eq!(cached, stored);
    assert_eq!(cached.suggestions.len(), 1);
    assert_eq!(cached.suggestions[0].category, SuggestionCategory::Time);
    assert_eq!(cached.suggestions[0].author.as_deref(), Some("Alex"));
}

#[test]
fn vote_lock_rejects_second_vote_in_session() {
    let conn = open_db_in_memory().unwrap();
    let mut view = controller(&conn);
    view.dispatch(Command::CreateHang(game_night("2024-01-15")));
    let code = view.hangs()[0].code.clone();
    view.dispatch(Command::Suggest {
        code: code.clone(),
        content: "6pm?".to_string(),
    });
    let suggestion_id = view.hang(&code).unwrap().suggestions[0].id;

    view.dispatch(Command::Vote {
        suggestion_id,
        direction: VoteDirection::Up,
    });
    view.dispatch(Command::Vote {
        suggestion_id,
        direction: VoteDirection::Down,
    });

    assert_eq!(view.hang(&code).unwrap().suggestions[0].votes, 1);
    let stored = view.service().get_hang(&code).unwrap().unwrap();
    assert_eq!(stored.suggestions[0].votes, 1);
    assert!(view.session().has_voted(suggestion_id));
}

#[test]
fn failed_write_rolls_back_optimistic_change() {
    let conn = open_db_in_memory().unwrap();
    let mut view = controller(&conn);
    view.dispatch(Command::CreateHang(game_night("2024-01-15")));
    let code = view.hangs()[0].code.clone();
    let host = view.hangs()[0].attendees[0].id;
    go_offline(&view);

    view.dispatch(Command::Rsvp {
        code: code.clone(),
        attendee_id: host,
        status: RsvpStatus::NotGoing,
    });

    assert_eq!(
        view.hang(&code).unwrap().attendees[0].status,
        RsvpStatus::Going
    );
    let message = view.state().error.clone().unwrap();
    assert!(message.contains("backend unreachable"));

    view.dispatch(Command::Ui(UiAction::DismissMessages));
    assert!(view.state().error.is_none());
}

#[test]
fn failed_vote_does_not_lock_session() {
    let conn = open_db_in_memory().unwrap();
    let mut view = controller(&conn);
    view.dispatch(Command::CreateHang(game_night("2024-01-15")));
    let code = view.hangs()[0].code.clone();
    view.dispatch(Command::Suggest {
        code: code.clone(),
        content: "6pm?".to_string(),
    });
    let suggestion_id = view.hang(&code).unwrap().suggestions[0].id;
    go_offline(&view);

    view.dispatch(Command::Vote {
        suggestion_id,
        direction: VoteDirection::Up,
    });

    assert_eq!(view.hang(&code).unwrap().suggestions[0].votes, 0);
    assert!(!view.session().has_voted(suggestion_id));
}

#[test]
fn remove_suggestion_updates_cache() {
    let conn = open_db_in_memory().unwrap();
    let mut view = controller(&conn);
    view.dispatch(Command::CreateHang(game_night("2024-01-15")));
    let code = view.hangs()[0].code.clone();
    for content in ["6pm?", "7pm?"] {
        view.dispatch(Command::Suggest {
            code: code.clone(),
            content: content.to_string(),
        });
    }
    let doomed = view.hang(&code).unwrap().suggestions[0].id;

    view.dispatch(Command::RemoveSuggestion(doomed));

    let suggestions = &view.hang(&code).unwrap().suggestions;
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].content, "7pm?");
}

#[test]
fn invite_link_selects_hang_and_unknown_code_shows_notice() {
    let conn = open_db_in_memory().unwrap();
    let code = {
        let mut host_view = controller(&conn);
        host_view.dispatch(Command::CreateHang(game_night("2024-01-15")));
        host_view.hangs()[0].code.clone()
    };

    let mut guest = controller_as(&conn, "Bo");
    let link = format!(
        "https://letshang.app/?code={}",
        code.as_str().to_ascii_lowercase()
    );
    guest.load(Some(&link));
    assert_eq!(guest.state().active, Some(code.clone()));
    assert_eq!(guest.state().expanded, Some(code.clone()));

    guest.dispatch(Command::RsvpAsViewer {
        code: code.clone(),
        status: RsvpStatus::Maybe,
    });
    let attendees = &guest.hang(&code).unwrap().attendees;
    assert_eq!(attendees.len(), 2);
    assert_eq!(attendees[1].name, "Bo");
    assert_eq!(attendees[1].status, RsvpStatus::Maybe);

    guest.dispatch(Command::Join("ZZZ999".to_string()));
    assert_eq!(
        guest.state().notice.as_deref(),
        Some("No hang found for code ZZZ999")
    );
    assert!(guest.state().error.is_none());
}

#[test]
fn vote_and_remove_resolve_suggestions_missing_from_cache() {
    let conn = open_db_in_memory().unwrap();
    let (code, voted, doomed) = {
        let seed = controller_as(&conn, "Sam");
        let service = seed.service();
        let hang = service.create_hang(game_night("2024-01-15"), "Sam").unwrap();
        let voted = service
            .add_suggestion(&hang.code, SuggestionCategory::Time, "6pm?")
            .unwrap()
            .unwrap();
        let doomed = service
            .add_suggestion(&hang.code, SuggestionCategory::Location, "the park")
            .unwrap()
            .unwrap();
        (hang.code, voted.id, doomed.id)
    };

    let mut voter = controller(&conn);
    assert!(voter.hang(&code).is_none());
    voter.dispatch(Command::Vote {
        suggestion_id: voted,
        direction: VoteDirection::Up,
    });
    assert!(voter.session().has_voted(voted));
    assert_eq!(voter.hang(&code).unwrap().suggestions[0].votes, 1);

    let mut remover = controller(&conn);
    assert!(remover.hang(&code).is_none());
    remover.dispatch(Command::RemoveSuggestion(doomed));

    let stored = remover.service().get_hang(&code).unwrap().unwrap();
    assert_eq!(stored.suggestions.len(), 1);
    assert_eq!(stored.suggestions[0].id, voted);
    assert_eq!(remover.hang(&code).unwrap(), &stored);
    assert!(remover.state().error.is_none());
}

#[test]
fn vote_on_unknown_suggestion_changes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let mut view = controller(&conn);
    let missing = uuid::Uuid::new_v4();

    view.dispatch(Command::Vote {
        suggestion_id: missing,
        direction: VoteDirection::Up,
    });

    assert!(!view.session().has_voted(missing));
    assert!(view.hangs().is_empty());
    assert!(view.state().error.is_none());
}
