use chrono::{DateTime, Utc};
use planwise_core::{BlockKind, TimeBlock, WeeklySchedule};

pub struct CalendarEvent {
    pub uid: String,
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
    pub summary: String,
    pub description: String,
}

/// Work and unavailable blocks become events; breaks are left implicit.
pub fn blocks_to_events(blocks: &[TimeBlock]) -> Vec<CalendarEvent> {
    blocks
        .iter()
        .filter(|b| b.kind != BlockKind::Break)
        .map(|b| {
            let summary = match b.kind {
                BlockKind::Unavailable => format!("Unavailable: {}", b.description),
                _ => b.title.clone(),
            };
            let description = match &b.task_id {
                Some(id) => format!("TaskId: {id}\n{}", b.description),
                None => b.description.clone(),
            };
            CalendarEvent {
                uid: format!(
                    "planwise-{}-{}@planwise",
                    b.start_time.format("%Y%m%dT%H%M%SZ"),
                    b.task_id.as_deref().unwrap_or("busy")
                ),
                start_utc: b.start_time,
                end_utc: b.end_time,
                summary,
                description,
            }
        })
        .collect()
}

pub fn week_to_events(week: &WeeklySchedule) -> Vec<CalendarEvent> {
    week.iter().flat_map(|(_, blocks)| blocks_to_events(blocks)).collect()
}

/// Emit a minimal ICS calendar containing VEVENT blocks.
///
/// DTSTART/DTEND are UTC. UIDs are derived from start time and task id, so
/// re-importing the same plan updates events instead of duplicating them.
pub fn events_to_ics(events: &[CalendarEvent]) -> String {
    let mut s = String::new();
    s.push_str("BEGIN:VCALENDAR\nVERSION:2.0\nPRODID:-//Planwise//EN\n");

    for e in events {
        let dtstart = e.start_utc.format("%Y%m%dT%H%M%SZ");
        let dtend = e.end_utc.format("%Y%m%dT%H%M%SZ");

        s.push_str("BEGIN:VEVENT\n");
        s.push_str(&format!("UID:{}\n", e.uid));
        s.push_str(&format!("DTSTART:{}\n", dtstart));
        s.push_str(&format!("DTEND:{}\n", dtend));
        s.push_str(&format!("SUMMARY:{}\n", escape_ics(&e.summary)));
        s.push_str(&format!("DESCRIPTION:{}\n", escape_ics(&e.description)));
        s.push_str("END:VEVENT\n");
    }

    s.push_str("END:VCALENDAR\n");
    s
}

fn escape_ics(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace(',', "\\,")
        .replace(';', "\\;")
}
