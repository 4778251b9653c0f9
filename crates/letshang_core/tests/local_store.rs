use letshang_core::{
    HangRepository, HangService, LocalHangRepository, NewHang, RepoError, RsvpStatus, ShareCode,
    SnapshotError, SuggestionCategory, VoteDirection, VoteOutcome, VoteSession,
};
use serde_json::Value;

fn picnic() -> NewHang {
    NewHang {
        title: "Picnic".to_string(),
        date: "2024-06-01".to_string(),
        time: "12:30".to_string(),
        location: "Riverside".to_string(),
        description: Some("  ".to_string()),
        max_attendees: None,
    }
}

#[test]
fn missing_file_is_an_empty_collection() {
    let dir = tempfile::tempdir().unwrap();
    let repo = LocalHangRepository::new(dir.path().join("hangs.json"));

    assert!(repo.list_hangs().unwrap().is_empty());
    assert!(!repo.path().exists());
}

#[test]
fn mutations_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("hangs.json");

    let service = HangService::new(LocalHangRepository::new(&path));
    let hang = service.create_hang(picnic(), "Alex").unwrap();
    let guest = service
        .rsvp_as(&hang.code, "Bo", RsvpStatus::Maybe)
        .unwrap()
        .unwrap();
    let suggestion = service
        .add_suggestion(&hang.code, SuggestionCategory::Location, "the pier")
        .unwrap()
        .unwrap();
    let mut session = VoteSession::new();
    assert_eq!(
        service
            .vote(&mut session, suggestion.id, VoteDirection::Up)
            .unwrap(),
        VoteOutcome::Applied { votes: 1 }
    );
    drop(service);

    let reopened = HangService::new(LocalHangRepository::new(&path));
    let loaded = reopened.join(hang.code.as_str()).unwrap();
    assert_eq!(loaded.description, None);
    assert_eq!(loaded.max_attendees, 10);
    assert_eq!(loaded.attendee(guest).unwrap().status, RsvpStatus::Maybe);
    assert_eq!(loaded.suggestions.len(), 1);
    assert_eq!(loaded.suggestions[0].votes, 1);
}

#[test]
fn snapshot_is_rewritten_as_whole_collection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hangs.json");
    let service = HangService::new(LocalHangRepository::new(&path));

    let first = service.create_hang(picnic(), "Alex").unwrap();
    let second = service.create_hang(picnic(), "Sam").unwrap();

    let raw: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(raw["version"], 1);
    let hangs = raw["hangs"].as_array().unwrap();
    assert_eq!(hangs.len(), 2);
    assert_eq!(hangs[0]["code"], first.code.as_str());
    assert_eq!(hangs[1]["code"], second.code.as_str());
    assert_eq!(hangs[0]["attendees"][0]["status"], "going");

    let listed = service.list_hangs().unwrap();
    assert_eq!(listed[0].code, second.code);
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn failed_mutation_leaves_file_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hangs.json");
    let repo = LocalHangRepository::new(&path);
    let service = HangService::new(LocalHangRepository::new(&path));
    let hang = service.create_hang(picnic(), "Alex").unwrap();
    let before = std::fs::read(&path).unwrap();

    let err = repo
        .set_attendee_status(&hang.code, uuid::Uuid::new_v4(), RsvpStatus::Maybe)
        .unwrap_err();
    assert!(matches!(err, RepoError::AttendeeNotFound(_)));
    let err = repo.create_hang(&hang).unwrap_err();
    assert!(matches!(err, RepoError::DuplicateCode(_)));

    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn removing_suggestion_keeps_siblings() {
    let dir = tempfile::tempdir().unwrap();
    let service = HangService::new(LocalHangRepository::new(dir.path().join("hangs.json")));
    let hang = service.create_hang(picnic(), "Alex").unwrap();
    let keep = service
        .add_suggestion(&hang.code, SuggestionCategory::Time, "1pm")
        .unwrap()
        .unwrap();
    let doomed = service
        .add_suggestion(&hang.code, SuggestionCategory::Time, "2pm")
        .unwrap()
        .unwrap();

    assert!(service.remove_suggestion(doomed.id).unwrap());
    let loaded = service.get_hang(&hang.code).unwrap().unwrap();
    assert_eq!(loaded.suggestions, vec![keep]);
}

#[test]
fn corrupt_or_future_snapshot_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hangs.json");
    let repo = LocalHangRepository::new(&path);

    std::fs::write(&path, b"{not json").unwrap();
    assert!(matches!(
        repo.list_hangs(),
        Err(RepoError::Snapshot(SnapshotError::Json(_)))
    ));

    std::fs::write(&path, br#"{"version": 9, "hangs": []}"#).unwrap();
    assert!(matches!(
        repo.list_hangs(),
        Err(RepoError::Snapshot(SnapshotError::UnsupportedVersion { found: 9, .. }))
    ));

    let code = ShareCode::parse("ABCDEF").unwrap();
    assert!(repo.get_hang(&code).is_err());
}
