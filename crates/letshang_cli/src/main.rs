//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `letshang_core` linkage.
//! - Run one in-memory walkthrough so store wiring is checked end to end.

use letshang_core::db::open_db_in_memory;
use letshang_core::view::invite;
use letshang_core::{
    HangService, NewHang, RsvpStatus, SqliteHangRepository, SuggestionCategory, VoteDirection,
    VoteSession,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("letshang_core ping={}", letshang_core::ping());
    println!("letshang_core version={}", letshang_core::core_version());

    match walkthrough() {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("walkthrough failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn walkthrough() -> Result<String, Box<dyn std::error::Error>> {
    let conn = open_db_in_memory()?;
    let service = HangService::new(SqliteHangRepository::new(&conn));

    let input = NewHang {
        title: "Smoke Test".to_string(),
        date: "2030-01-01".to_string(),
        time: "18:00".to_string(),
        location: "Nowhere".to_string(),
        ..NewHang::default()
    };
    let hang = service.create_hang(input, "cli")?;
    service.rsvp_as(&hang.code, "guest", RsvpStatus::Maybe)?;
    let suggestion = service.add_suggestion(&hang.code, SuggestionCategory::Time, "19:00?")?;
    if let Some(suggestion) = suggestion {
        service.vote(&mut VoteSession::new(), suggestion.id, VoteDirection::Up)?;
    }

    let hang = service.join(hang.code.as_str())?;
    Ok(format!(
        "hang code={} going={} attendees={} suggestions={} invite={}",
        hang.code,
        hang.headcount_label(),
        hang.attendees.len(),
        hang.suggestions.len(),
        invite::invite_url("https://letshang.app/", &hang.code)
    ))
}
