use serde::{Deserialize, Serialize};

pub const MIN_GUESTS: u32 = 1;
pub const MAX_GUESTS: u32 = 20;

/// Total for a party: `unit_price * guests`.
///
/// Callers validate the guest count first (see [`validate_guests`]); an
/// out-of-range count here is a contract violation, not an error path.
pub fn compute_total(unit_price: f64, guests: u32) -> f64 {
    debug_assert!((MIN_GUESTS..=MAX_GUESTS).contains(&guests));
    unit_price * f64::from(guests)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuestCountError {
    #[error("Guest count is not a whole number: {0}")]
    NotANumber(String),

    #[error("Guest count {0} is outside {MIN_GUESTS}..={MAX_GUESTS}")]
    OutOfRange(i64),
}

pub fn validate_guests(guests: i64) -> Result<u32, GuestCountError> {
    if (i64::from(MIN_GUESTS)..=i64::from(MAX_GUESTS)).contains(&guests) {
        Ok(guests as u32)
    } else {
        Err(GuestCountError::OutOfRange(guests))
    }
}

/// Parses guest-count form input.
pub fn parse_guests(input: &str) -> Result<u32, GuestCountError> {
    let guests = input
        .trim()
        .parse::<i64>()
        .map_err(|_| GuestCountError::NotANumber(input.to_string()))?;
    validate_guests(guests)
}

/// Price summary shown next to the booking form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub unit_price: f64,
    pub guests: u32,
    pub total: f64,
}

impl Quote {
    pub fn new(unit_price: f64, guests: u32) -> Self {
        Self {
            unit_price,
            guests,
            total: compute_total(unit_price, guests),
        }
    }
}
