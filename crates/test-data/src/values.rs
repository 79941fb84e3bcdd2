//! Realistic scalar values for generated rows.
//!
//! Text comes from the `fake` crate. Emails and phone numbers are unique for the
//! lifetime of one [`ValueSource`], which is scoped to one generation run.

use std::collections::HashSet;

use fake::Fake;
use fake::faker::address::en::CityName;
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::{Paragraph, Sentence, Word};
use fake::faker::name::en::Name;
use fake::faker::phone_number::en::PhoneNumber;
use rand::Rng;
use time::{Duration, OffsetDateTime, Time};

use crate::error::SeedError;

/// Draws allowed before a unique generator gives up.
pub const MAX_UNIQUE_ATTEMPTS: usize = 1000;

const IMAGE_SIZES: &[(u32, u32)] = &[(64, 64), (128, 128), (256, 256), (640, 480), (800, 600)];

/// Source of names, text, handles and timestamps.
#[derive(Debug, Clone)]
pub struct ValueSource {
    clock: OffsetDateTime,
    year_start: OffsetDateTime,
    emails: HashSet<String>,
    phones: HashSet<String>,
}

impl ValueSource {
    /// Creates a value source whose clock is the current time.
    pub fn new() -> Self {
        Self::with_clock(OffsetDateTime::now_utc())
    }

    /// Creates a value source with a fixed clock.
    pub fn with_clock(clock: OffsetDateTime) -> Self {
        let year_start =
            (clock - Duration::days(i64::from(clock.ordinal()) - 1)).replace_time(Time::MIDNIGHT);

        Self {
            clock,
            year_start,
            emails: HashSet::new(),
            phones: HashSet::new(),
        }
    }

    /// Returns an email address never handed out before by this source.
    pub fn unique_email(&mut self, rng: &mut impl Rng) -> Result<String, SeedError> {
        draw_unique(&mut self.emails, "emails", rng, |rng| {
            SafeEmail().fake_with_rng(rng)
        })
    }

    /// Returns a phone number never handed out before by this source.
    pub fn unique_phone(&mut self, rng: &mut impl Rng) -> Result<String, SeedError> {
        draw_unique(&mut self.phones, "phone numbers", rng, |rng| {
            PhoneNumber().fake_with_rng(rng)
        })
    }

    /// Returns a 64 hex digit string shaped like a SHA-256 digest.
    pub fn password_digest(&self, rng: &mut impl Rng) -> String {
        let bytes: [u8; 32] = rng.r#gen();
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    pub fn person_name(&self, rng: &mut impl Rng) -> String {
        Name().fake_with_rng(rng)
    }

    pub fn company_name(&self, rng: &mut impl Rng) -> String {
        CompanyName().fake_with_rng(rng)
    }

    pub fn sentence(&self, rng: &mut impl Rng) -> String {
        Sentence(4..12).fake_with_rng(rng)
    }

    pub fn paragraph(&self, rng: &mut impl Rng) -> String {
        Paragraph(2..5).fake_with_rng(rng)
    }

    pub fn word(&self, rng: &mut impl Rng) -> String {
        Word().fake_with_rng(rng)
    }

    pub fn city(&self, rng: &mut impl Rng) -> String {
        CityName().fake_with_rng(rng)
    }

    pub fn image_url(&self, rng: &mut impl Rng) -> String {
        let (width, height) = IMAGE_SIZES[rng.gen_range(0..IMAGE_SIZES.len())];
        let seed: u32 = rng.r#gen();
        format!("https://picsum.photos/seed/{seed:08x}/{width}/{height}")
    }

    /// Returns a time between the start of the current year and now.
    pub fn date_time_this_year(&self, rng: &mut impl Rng) -> OffsetDateTime {
        let span = (self.clock - self.year_start).whole_seconds();
        self.year_start + Duration::seconds(rng.gen_range(0..=span))
    }

    /// Returns the run's clock.
    pub fn now(&self) -> OffsetDateTime {
        self.clock
    }
}

impl Default for ValueSource {
    fn default() -> Self {
        Self::new()
    }
}

fn draw_unique<R, F>(
    seen: &mut HashSet<String>,
    what: &'static str,
    rng: &mut R,
    draw: F,
) -> Result<String, SeedError>
where
    R: Rng + ?Sized,
    F: Fn(&mut R) -> String,
{
    for _ in 0..MAX_UNIQUE_ATTEMPTS {
        let value = draw(rng);
        if seen.insert(value.clone()) {
            return Ok(value);
        }
    }

    Err(SeedError::UniquenessExhausted {
        what,
        attempts: MAX_UNIQUE_ATTEMPTS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use time::macros::datetime;

    #[test]
    fn test_unique_handles() {
        let mut values = ValueSource::new();
        let mut rng = StdRng::seed_from_u64(1);

        let emails: HashSet<String> = (0..2000)
            .map(|_| values.unique_email(&mut rng).unwrap())
            .collect();
        let phones: HashSet<String> = (0..2000)
            .map(|_| values.unique_phone(&mut rng).unwrap())
            .collect();

        assert_eq!(emails.len(), 2000);
        assert_eq!(phones.len(), 2000);
        assert!(emails.iter().all(|e| e.contains('@')));
    }

    #[test]
    fn test_uniqueness_exhausted() {
        let mut seen = HashSet::new();
        let mut rng = rand::thread_rng();

        let first = draw_unique(&mut seen, "constants", &mut rng, |_| "same".to_string());
        assert_eq!(first.unwrap(), "same");

        let second = draw_unique(&mut seen, "constants", &mut rng, |_| "same".to_string());
        assert!(matches!(
            second,
            Err(SeedError::UniquenessExhausted {
                what: "constants",
                attempts: MAX_UNIQUE_ATTEMPTS
            })
        ));
    }

    #[test]
    fn test_date_time_this_year() {
        let clock = datetime!(2026-10-17 12:30:00 UTC);
        let values = ValueSource::with_clock(clock);
        let mut rng = rand::thread_rng();

        for _ in 0..500 {
            let t = values.date_time_this_year(&mut rng);
            assert_eq!(t.year(), 2026);
            assert!(t <= clock);
        }
        assert_eq!(values.now(), clock);
    }

    #[test]
    fn test_date_time_on_new_year() {
        let clock = datetime!(2027-01-01 00:00:00 UTC);
        let values = ValueSource::with_clock(clock);
        let mut rng = rand::thread_rng();

        assert_eq!(values.date_time_this_year(&mut rng), clock);
    }

    #[test]
    fn test_password_digest() {
        let values = ValueSource::new();
        let digest = values.password_digest(&mut rand::thread_rng());

        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_text_values() {
        let values = ValueSource::new();
        let mut rng = rand::thread_rng();

        assert!(!values.person_name(&mut rng).is_empty());
        assert!(!values.sentence(&mut rng).is_empty());
        assert!(!values.paragraph(&mut rng).is_empty());
        assert!(!values.word(&mut rng).is_empty());
        assert!(values.image_url(&mut rng).starts_with("https://"));
    }
}
