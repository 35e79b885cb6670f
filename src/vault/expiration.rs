//! Expiration tracking for dated records.
//!
//! Each tracked date carries a `notified` flag. The flag goes from false to true
//! at most once per date value, the first time the date falls inside the notice
//! window, and that transition is what creates a notification. Changing the date
//! re-arms the flag.

use chrono::{Days, NaiveDate};

pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Last day that counts as "expiring soon" when seen on `today`.
#[must_use]
pub fn threshold(today: NaiveDate, window_days: u32) -> NaiveDate {
    today
        .checked_add_days(Days::new(u64::from(window_days)))
        .unwrap_or(NaiveDate::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Expiry {
    pub date: Option<NaiveDate>,
    pub notified: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryStatus {
    Expired(NaiveDate),
    ExpiringSoon(NaiveDate),
}

impl Expiry {
    #[must_use]
    pub const fn new(date: Option<NaiveDate>, notified: bool) -> Self {
        Self { date, notified }
    }

    /// State for an edit: the flag survives only if the date is unchanged.
    #[must_use]
    pub fn rearm(previous: Self, date: Option<NaiveDate>) -> Self {
        Self {
            date,
            notified: previous.notified && previous.date == date,
        }
    }

    /// Flip the flag when the date is due and not yet notified, returning the
    /// date that needs a notice.
    pub fn check(&mut self, today: NaiveDate, window_days: u32) -> Option<NaiveDate> {
        let date = self.date?;
        if self.notified || date > threshold(today, window_days) {
            return None;
        }
        self.notified = true;
        Some(date)
    }

    #[must_use]
    pub fn status(&self, today: NaiveDate, window_days: u32) -> Option<ExpiryStatus> {
        let date = self.date?;
        if date < today {
            Some(ExpiryStatus::Expired(date))
        } else if date <= threshold(today, window_days) {
            Some(ExpiryStatus::ExpiringSoon(date))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryKind {
    CreditCard,
    Passport,
    DriversLicense,
}

impl ExpiryKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreditCard => "credit_card",
            Self::Passport => "passport",
            Self::DriversLicense => "drivers_license",
        }
    }

    #[must_use]
    pub const fn document(self) -> &'static str {
        match self {
            Self::CreditCard => "credit card",
            Self::Passport => "passport",
            Self::DriversLicense => "driver's license",
        }
    }
}

/// A notification to be created for the record's owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: ExpiryKind,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn credit_card(card_number: &str) -> Self {
        Self {
            kind: ExpiryKind::CreditCard,
            message: format!(
                "Your credit card ending in {} is expiring soon.",
                last_four(card_number)
            ),
        }
    }

    #[must_use]
    pub fn document(kind: ExpiryKind, date: NaiveDate) -> Self {
        Self {
            kind,
            message: format!(
                "Your {} is expiring on {}.",
                kind.document(),
                date.format("%Y-%m-%d")
            ),
        }
    }
}

/// Last four characters; shorter values are returned whole.
#[must_use]
pub fn last_four(card_number: &str) -> &str {
    let count = card_number.chars().count();
    card_number
        .char_indices()
        .nth(count.saturating_sub(4))
        .and_then(|(index, _)| card_number.get(index..))
        .unwrap_or(card_number)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    #[test]
    fn due_date_notifies_once() {
        let today = day(2026, 1, 1);
        let mut expiry = Expiry::new(Some(day(2026, 1, 6)), false);
        assert_eq!(expiry.check(today, DEFAULT_WINDOW_DAYS), Some(day(2026, 1, 6)));
        assert!(expiry.notified);
        assert_eq!(expiry.check(today, DEFAULT_WINDOW_DAYS), None);
    }

    #[test]
    fn threshold_is_inclusive() {
        let today = day(2026, 1, 1);
        let mut on_edge = Expiry::new(Some(day(2026, 1, 31)), false);
        assert!(on_edge.check(today, 30).is_some());
        let mut past_edge = Expiry::new(Some(day(2026, 2, 1)), false);
        assert!(past_edge.check(today, 30).is_none());
        assert!(!past_edge.notified);
    }

    #[test]
    fn already_expired_date_still_notifies() {
        let mut expiry = Expiry::new(Some(day(2025, 6, 1)), false);
        assert!(expiry.check(day(2026, 1, 1), 30).is_some());
    }

    #[test]
    fn missing_date_never_notifies() {
        let mut expiry = Expiry::default();
        assert!(expiry.check(day(2026, 1, 1), 30).is_none());
    }

    #[test]
    fn rearm_on_changed_date() {
        let previous = Expiry::new(Some(day(2026, 1, 6)), true);
        assert!(Expiry::rearm(previous, Some(day(2026, 1, 6))).notified);
        assert!(!Expiry::rearm(previous, Some(day(2026, 1, 20))).notified);
        assert!(!Expiry::rearm(previous, None).notified);
    }

    #[test]
    fn status_distinguishes_expired_and_soon() {
        let today = day(2026, 1, 10);
        let expired = Expiry::new(Some(day(2026, 1, 9)), false);
        let today_exp = Expiry::new(Some(today), false);
        let later = Expiry::new(Some(day(2026, 6, 1)), false);
        assert_eq!(
            expired.status(today, 30),
            Some(ExpiryStatus::Expired(day(2026, 1, 9)))
        );
        assert_eq!(
            today_exp.status(today, 30),
            Some(ExpiryStatus::ExpiringSoon(today))
        );
        assert_eq!(later.status(today, 30), None);
    }

    #[test]
    fn notice_messages() {
        assert_eq!(
            Notice::credit_card("4111111111111111").message,
            "Your credit card ending in 1111 is expiring soon."
        );
        assert_eq!(
            Notice::document(ExpiryKind::Passport, day(2026, 3, 4)).message,
            "Your passport is expiring on 2026-03-04."
        );
        assert_eq!(
            Notice::document(ExpiryKind::DriversLicense, day(2026, 3, 4)).message,
            "Your driver's license is expiring on 2026-03-04."
        );
    }

    #[test]
    fn last_four_handles_short_numbers() {
        assert_eq!(last_four("123"), "123");
        assert_eq!(last_four("12345"), "2345");
        assert_eq!(last_four(""), "");
    }
}
