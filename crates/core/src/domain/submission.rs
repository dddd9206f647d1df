use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::quote::QuoteConfiguration;
use crate::domain::stay::{AgeBracketId, RoomTypeId, StayId, StaySnapshot};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
}

/// What the visitor fills in on the final step, next to the configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    #[serde(flatten)]
    pub contact: ContactDetails,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupantCount {
    pub age_range_id: AgeBracketId,
    pub count: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRoom {
    pub room_id: RoomTypeId,
    pub quantity: u32,
    pub occupants: Vec<OccupantCount>,
}

/// Payload handed to the persistence collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
    pub stay_id: StayId,
    pub rooms: Vec<SubmissionRoom>,
    pub participants: Vec<OccupantCount>,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("contact field `{0}` is required")]
    MissingContactField(String),
    #[error("`{0}` is not a valid email address")]
    InvalidEmail(String),
    #[error("check-out {check_out} must be after check-in {check_in}")]
    InvalidDateRange { check_in: NaiveDate, check_out: NaiveDate },
    #[error("dates {check_in}..{check_out} fall outside the stay ({start}..{end})")]
    OutsideStay { check_in: NaiveDate, check_out: NaiveDate, start: NaiveDate, end: NaiveDate },
    #[error("this stay must be booked in full, from {start} to {end}")]
    PartialBookingNotAllowed { start: NaiveDate, end: NaiveDate },
    #[error("{nights} nights is shorter than the minimum of {min}")]
    StayTooShort { nights: u32, min: u32 },
    #[error("{nights} nights is longer than the maximum of {max}")]
    StayTooLong { nights: u32, max: u32 },
}

pub fn validate_contact(contact: &ContactDetails) -> Result<(), SubmissionError> {
    let required = [
        ("firstName", &contact.first_name),
        ("lastName", &contact.last_name),
        ("email", &contact.email),
        ("phone", &contact.phone),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(SubmissionError::MissingContactField(field.to_string()));
        }
    }

    if !is_plausible_email(contact.email.trim()) {
        return Err(SubmissionError::InvalidEmail(contact.email.clone()));
    }
    Ok(())
}

/// Checks the requested dates against the stay and returns the night count.
pub fn validate_dates(
    snapshot: &StaySnapshot,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Result<u32, SubmissionError> {
    if check_in >= check_out {
        return Err(SubmissionError::InvalidDateRange { check_in, check_out });
    }
    if check_in < snapshot.start_date || check_out > snapshot.end_date {
        return Err(SubmissionError::OutsideStay {
            check_in,
            check_out,
            start: snapshot.start_date,
            end: snapshot.end_date,
        });
    }
    if !snapshot.allow_partial_booking
        && (check_in != snapshot.start_date || check_out != snapshot.end_date)
    {
        return Err(SubmissionError::PartialBookingNotAllowed {
            start: snapshot.start_date,
            end: snapshot.end_date,
        });
    }

    let nights = u32::try_from((check_out - check_in).num_days()).unwrap_or(u32::MAX);
    if let Some(min) = snapshot.min_days {
        if nights < min {
            return Err(SubmissionError::StayTooShort { nights, min });
        }
    }
    if let Some(max) = snapshot.max_days {
        if nights > max {
            return Err(SubmissionError::StayTooLong { nights, max });
        }
    }
    Ok(nights)
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

impl QuoteSubmission {
    /// Assembles the payload. Flow completeness is the caller's concern; this
    /// only checks the contact block and the dates.
    pub fn build(
        request: &SubmissionRequest,
        snapshot: &StaySnapshot,
        configuration: &QuoteConfiguration,
    ) -> Result<Self, SubmissionError> {
        validate_contact(&request.contact)?;
        validate_dates(snapshot, request.check_in, request.check_out)?;

        let rooms = snapshot
            .rooms
            .iter()
            .filter_map(|room| {
                let quantity = configuration.quantity(&room.id);
                if quantity == 0 {
                    return None;
                }
                let occupants = snapshot
                    .ordered_age_brackets()
                    .into_iter()
                    .filter_map(|bracket| {
                        let count: u32 = configuration
                            .assignments()
                            .iter()
                            .filter(|assignment| assignment.instance.room_type_id == room.id)
                            .map(|assignment| assignment.count(&bracket.id))
                            .fold(0, u32::saturating_add);
                        (count > 0)
                            .then(|| OccupantCount { age_range_id: bracket.id.clone(), count })
                    })
                    .collect();
                Some(SubmissionRoom { room_id: room.id.clone(), quantity, occupants })
            })
            .collect();

        let participants = snapshot
            .ordered_age_brackets()
            .into_iter()
            .filter_map(|bracket| {
                let count = configuration.allocation(&bracket.id);
                (count > 0).then(|| OccupantCount { age_range_id: bracket.id.clone(), count })
            })
            .collect();

        let contact = &request.contact;
        Ok(Self {
            first_name: contact.first_name.trim().to_string(),
            last_name: contact.last_name.trim().to_string(),
            email: contact.email.trim().to_string(),
            phone: contact.phone.trim().to_string(),
            check_in: request.check_in,
            check_out: request.check_out,
            special_requests: contact
                .special_requests
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string),
            stay_id: configuration.stay_id.clone(),
            rooms,
            participants,
        })
    }
}
