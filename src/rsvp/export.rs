//! CSV exports of RSVP answers and seating charts.

use std::collections::HashMap;

use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::error::{ApiError, RepositoryError};
use crate::models::event::Model as EventModel;
use crate::models::event_guest::Model as EventGuestModel;
use crate::models::guest::Model as GuestModel;
use crate::models::seating_table::Model as TableModel;
use crate::repositories::{
    EventRepository, GuestRepository, InvitationRepository, SeatingRepository, TenantScope,
};

use super::state::{RsvpState, headcount};

pub const RSVP_EXPORT_HEADERS: [&str; 11] = [
    "Guest Name",
    "Email",
    "Phone",
    "Party",
    "Event",
    "Status",
    "Plus Ones",
    "Plus One Name",
    "Meal Choice",
    "Dietary Notes",
    "Responded At",
];

pub const SEATING_EXPORT_HEADERS: [&str; 6] = [
    "Table",
    "Guest Name",
    "Party",
    "Headcount",
    "Meal Choice",
    "Dietary Notes",
];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV buffer flush failed: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Repository(err) => err.into(),
            other => anyhow::Error::new(other).into(),
        }
    }
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, ExportError> {
    writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))
}

/// One row per (guest, event) invitation, guests in list order and events in
/// display order. Guests without invitations still get a row with empty event
/// columns.
pub fn rsvp_csv(
    guests: &[GuestModel],
    events: &[EventModel],
    rows: &[EventGuestModel],
) -> Result<Vec<u8>, ExportError> {
    let event_order: HashMap<Uuid, (i32, &str)> = events
        .iter()
        .map(|e| (e.id, (e.position, e.name.as_str())))
        .collect();

    let mut by_guest: HashMap<Uuid, Vec<&EventGuestModel>> = HashMap::new();
    for row in rows {
        if event_order.contains_key(&row.event_id) {
            by_guest.entry(row.guest_id).or_default().push(row);
        }
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(RSVP_EXPORT_HEADERS)?;

    for guest in guests {
        let email = guest.email.as_deref().unwrap_or_default();
        let phone = guest.phone.as_deref().unwrap_or_default();
        let party = guest.party.as_deref().unwrap_or_default();

        let Some(invitations) = by_guest.get_mut(&guest.id) else {
            writer.write_record([
                guest.name.as_str(),
                email,
                phone,
                party,
                "",
                "",
                "",
                "",
                "",
                "",
                "",
            ])?;
            continue;
        };
        invitations.sort_by_key(|row| event_order.get(&row.event_id).map(|(pos, _)| *pos));

        for row in invitations.iter() {
            let event_name = event_order
                .get(&row.event_id)
                .map(|(_, name)| *name)
                .unwrap_or_default();
            let state = RsvpState::from(*row);
            let plus_ones = if state == RsvpState::Attending {
                row.plus_one_count.to_string()
            } else {
                String::new()
            };
            let responded_at = row
                .responded_at
                .map(|at| at.to_rfc3339())
                .unwrap_or_default();

            writer.write_record([
                guest.name.as_str(),
                email,
                phone,
                party,
                event_name,
                state.label(),
                plus_ones.as_str(),
                row.plus_one_name.as_deref().unwrap_or_default(),
                row.meal_choice.as_deref().unwrap_or_default(),
                row.dietary_notes.as_deref().unwrap_or_default(),
                responded_at.as_str(),
            ])?;
        }
    }

    finish(writer)
}

/// Attending, seated guests of one event, sorted by table then guest name.
pub fn seating_csv(
    event_id: Uuid,
    guests: &[GuestModel],
    tables: &[TableModel],
    rows: &[EventGuestModel],
) -> Result<Vec<u8>, ExportError> {
    let table_names: HashMap<Uuid, &str> =
        tables.iter().map(|t| (t.id, t.name.as_str())).collect();
    let attending: HashMap<Uuid, &EventGuestModel> = rows
        .iter()
        .filter(|row| row.event_id == event_id && RsvpState::from(*row) == RsvpState::Attending)
        .map(|row| (row.guest_id, row))
        .collect();

    let mut seated: Vec<(&str, &GuestModel, &EventGuestModel)> = guests
        .iter()
        .filter_map(|guest| {
            let table = table_names.get(&guest.table_id?)?;
            let row = attending.get(&guest.id)?;
            Some((*table, guest, *row))
        })
        .collect();
    seated.sort_by(|a, b| a.0.cmp(b.0).then_with(|| a.1.name.cmp(&b.1.name)));

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(SEATING_EXPORT_HEADERS)?;
    for (table, guest, row) in seated {
        writer.write_record([
            table,
            guest.name.as_str(),
            guest.party.as_deref().unwrap_or_default(),
            headcount(row).to_string().as_str(),
            row.meal_choice.as_deref().unwrap_or_default(),
            row.dietary_notes.as_deref().unwrap_or_default(),
        ])?;
    }

    finish(writer)
}

/// Build the RSVP export for a wedding.
pub async fn export_rsvps<C: ConnectionTrait>(
    db: &C,
    scope: TenantScope,
) -> Result<Vec<u8>, ExportError> {
    let guests = GuestRepository::new(db).list(scope).await?;
    let events = EventRepository::new(db).list(scope).await?;
    let rows = InvitationRepository::new(db).for_wedding(scope).await?;
    rsvp_csv(&guests, &events, &rows)
}

/// Build the seating chart export for one event of a wedding.
pub async fn export_seating<C: ConnectionTrait>(
    db: &C,
    scope: TenantScope,
    event_id: Uuid,
) -> Result<Vec<u8>, ExportError> {
    EventRepository::new(db)
        .find(scope, event_id)
        .await?
        .ok_or(RepositoryError::NotFound("Event"))?;
    let guests = GuestRepository::new(db).list(scope).await?;
    let tables = SeatingRepository::new(db).list_tables(scope).await?;
    let rows = InvitationRepository::new(db)
        .for_event(scope, event_id)
        .await?;
    seating_csv(event_id, &guests, &tables, &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event_guest::RsvpStatus;
    use chrono::{TimeZone, Utc};
    use sea_orm::prelude::DateTimeWithTimeZone;

    fn now() -> DateTimeWithTimeZone {
        Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap().into()
    }

    fn guest(name: &str, table_id: Option<Uuid>) -> GuestModel {
        GuestModel {
            id: Uuid::new_v4(),
            wedding_id: Uuid::nil(),
            name: name.to_string(),
            name_key: name.to_lowercase(),
            email: Some(format!("{}@example.com", name.to_lowercase())),
            phone: None,
            party: Some("Smith, family".to_string()),
            party_size: 1,
            table_id,
            created_at: now(),
        }
    }

    fn event(name: &str, position: i32) -> EventModel {
        EventModel {
            id: Uuid::new_v4(),
            wedding_id: Uuid::nil(),
            name: name.to_string(),
            description: None,
            location: None,
            starts_at: now(),
            ends_at: None,
            is_public: false,
            meal_options: serde_json::json!(["Fish"]),
            position,
            created_at: now(),
        }
    }

    fn invitation(
        guest: &GuestModel,
        event: &EventModel,
        status: Option<RsvpStatus>,
        plus_ones: i32,
    ) -> EventGuestModel {
        EventGuestModel {
            id: Uuid::new_v4(),
            event_id: event.id,
            guest_id: guest.id,
            rsvp_status: status,
            plus_one_count: plus_ones,
            plus_one_name: None,
            meal_choice: status.map(|_| "Fish".to_string()),
            dietary_notes: None,
            responded_at: status.map(|_| now()),
            created_at: now(),
            updated_at: now(),
        }
    }

    fn lines(bytes: Vec<u8>) -> Vec<String> {
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn rsvp_export_lists_each_invitation_in_event_order() {
        let ana = guest("Ana", None);
        let ben = guest("Ben", None);
        let ceremony = event("Ceremony", 0);
        let reception = event("Reception", 1);
        let rows = vec![
            invitation(&ana, &reception, Some(RsvpStatus::Attending), 2),
            invitation(&ana, &ceremony, None, 0),
        ];

        let out = lines(rsvp_csv(&[ana, ben], &[ceremony, reception], &rows).unwrap());

        assert_eq!(out[0], RSVP_EXPORT_HEADERS.join(","));
        assert_eq!(
            out[1],
            "Ana,ana@example.com,,\"Smith, family\",Ceremony,Pending,,,,,"
        );
        assert!(out[2].starts_with("Ana,ana@example.com,,\"Smith, family\",Reception,Attending,2,,Fish,,2026-05-01T12:00:00"));
        assert_eq!(out[3], "Ben,ben@example.com,,\"Smith, family\",,,,,,,");
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn seating_export_keeps_only_attending_seated_guests() {
        let table_a = TableModel {
            id: Uuid::new_v4(),
            wedding_id: Uuid::nil(),
            name: "A".to_string(),
            capacity: 8,
            created_at: now(),
        };
        let table_b = TableModel {
            name: "B".to_string(),
            id: Uuid::new_v4(),
            ..table_a.clone()
        };
        let reception = event("Reception", 0);

        let zoe = guest("Zoe", Some(table_a.id));
        let amy = guest("Amy", Some(table_b.id));
        let cal = guest("Cal", Some(table_a.id));
        let unseated = guest("Dan", None);
        let declined = guest("Eve", Some(table_a.id));
        let rows = vec![
            invitation(&zoe, &reception, Some(RsvpStatus::Attending), 1),
            invitation(&amy, &reception, Some(RsvpStatus::Attending), 0),
            invitation(&cal, &reception, Some(RsvpStatus::Attending), 0),
            invitation(&unseated, &reception, Some(RsvpStatus::Attending), 0),
            invitation(&declined, &reception, Some(RsvpStatus::Declined), 0),
        ];

        let out = lines(
            seating_csv(
                reception.id,
                &[zoe, amy, cal, unseated, declined],
                &[table_a, table_b],
                &rows,
            )
            .unwrap(),
        );

        assert_eq!(out[0], SEATING_EXPORT_HEADERS.join(","));
        assert_eq!(out[1], "A,Cal,\"Smith, family\",1,Fish,");
        assert_eq!(out[2], "A,Zoe,\"Smith, family\",2,Fish,");
        assert_eq!(out[3], "B,Amy,\"Smith, family\",1,Fish,");
        assert_eq!(out.len(), 4);
    }
}
