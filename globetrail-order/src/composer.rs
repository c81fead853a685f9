use chrono::{DateTime, NaiveDate, Utc};
use globetrail_catalog::{compute_total, validate_guests, GuestCountError, Package};
use globetrail_core::Identity;

use crate::models::{Booking, BookingStatus, UNKNOWN_EMAIL, UNKNOWN_LOCATION};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("Invalid travel date: {0}")]
    InvalidDate(String),

    #[error("Invalid guest count: {0}")]
    InvalidGuestCount(#[from] GuestCountError),

    #[error("Sign in to book this trip")]
    Unauthenticated,
}

/// Builds a booking from the booking form.
///
/// Checks run in order: date (`YYYY-MM-DD`, not before `now`'s UTC date),
/// guest count (1..=20), identity. Nothing is persisted here.
pub fn compose(
    pkg: &Package,
    date: &str,
    guests: i64,
    identity: Option<&Identity>,
    now: DateTime<Utc>,
) -> Result<Booking, BookingError> {
    let date = parse_travel_date(date, now.date_naive())?;
    let guests = validate_guests(guests)?;
    let identity = identity.ok_or(BookingError::Unauthenticated)?;

    Ok(Booking {
        package_id: pkg.id.clone(),
        package_title: pkg.title.clone(),
        price_per_person: pkg.price,
        total_price: compute_total(pkg.price, guests),
        date,
        guests,
        location: pkg
            .location
            .clone()
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
        user_id: identity.uid.clone(),
        user_email: identity.email.clone().unwrap_or_else(|| UNKNOWN_EMAIL.to_string()),
        status: BookingStatus::Confirmed,
        created_at: now,
    })
}

fn parse_travel_date(input: &str, today: NaiveDate) -> Result<NaiveDate, BookingError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(BookingError::InvalidDate("no date selected".to_string()));
    }

    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| BookingError::InvalidDate(format!("'{}' is not a calendar date", trimmed)))?;

    if date < today {
        return Err(BookingError::InvalidDate(format!("{} is in the past", date)));
    }
    Ok(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 18, 0, 0).unwrap()
    }

    fn paris() -> Package {
        Package::new("1", "Charming Paris", 95000.0).with_location("Paris, France")
    }

    fn ana() -> Identity {
        Identity::user("u-1", "ana@example.com")
    }

    #[test]
    fn test_compose_totals_price() {
        let booking = compose(&paris(), "2026-11-02", 3, Some(&ana()), now()).unwrap();
        assert_eq!(booking.total_price, 285000.0);
        assert_eq!(booking.price_per_person, 95000.0);
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.user_id, "u-1");
        assert_eq!(booking.location, "Paris, France");
        assert_eq!(booking.created_at, now());
    }

    #[test]
    fn test_today_is_allowed() {
        assert!(compose(&paris(), "2026-10-19", 1, Some(&ana()), now()).is_ok());
    }

    #[test]
    fn test_yesterday_is_rejected() {
        let yesterday = (now() - Duration::days(1)).date_naive().to_string();
        let err = compose(&paris(), &yesterday, 2, Some(&ana()), now()).unwrap_err();
        assert!(matches!(err, BookingError::InvalidDate(_)));
    }

    #[test]
    fn test_missing_or_garbled_date() {
        assert!(matches!(
            compose(&paris(), "", 2, Some(&ana()), now()),
            Err(BookingError::InvalidDate(_))
        ));
        assert!(matches!(
            compose(&paris(), "19/10/2026", 2, Some(&ana()), now()),
            Err(BookingError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_guest_bounds() {
        for bad in [0, 21] {
            assert!(matches!(
                compose(&paris(), "2026-11-02", bad, Some(&ana()), now()),
                Err(BookingError::InvalidGuestCount(_))
            ));
        }
        let one = compose(&paris(), "2026-11-02", 1, Some(&ana()), now()).unwrap();
        assert_eq!(one.total_price, 95000.0);
        let twenty = compose(&paris(), "2026-11-02", 20, Some(&ana()), now()).unwrap();
        assert_eq!(twenty.total_price, 1900000.0);
    }

    #[test]
    fn test_validation_order() {
        // a bad date wins over a bad guest count and a missing identity
        assert!(matches!(
            compose(&paris(), "2020-01-01", 0, None, now()),
            Err(BookingError::InvalidDate(_))
        ));
        assert!(matches!(
            compose(&paris(), "2026-11-02", 0, None, now()),
            Err(BookingError::InvalidGuestCount(_))
        ));
        assert_eq!(
            compose(&paris(), "2026-11-02", 2, None, now()).unwrap_err(),
            BookingError::Unauthenticated
        );
    }

    #[test]
    fn test_anonymous_identity_placeholders() {
        let pkg = Package::new("9", "Mystery Trip", 1000.0);
        let booking =
            compose(&pkg, "2026-11-02", 2, Some(&Identity::anonymous("anon-7")), now()).unwrap();
        assert_eq!(booking.user_id, "anon-7");
        assert_eq!(booking.user_email, UNKNOWN_EMAIL);
        assert_eq!(booking.location, UNKNOWN_LOCATION);
    }
}
