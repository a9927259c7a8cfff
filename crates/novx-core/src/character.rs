//! Character entity and age arithmetic.

use chrono::{Datelike, NaiveDate};

use crate::element::{Element, ElementBase, Noted, Tagged};
use crate::observer::{set_field, ChangeHook};

/// A character: a world element with biography data and a major/minor flag.
#[derive(Debug, Clone, Default)]
pub struct Character {
    base: ElementBase,
    notes: Option<String>,
    tags: Vec<String>,
    aka: Option<String>,
    full_name: Option<String>,
    bio: Option<String>,
    goals: Option<String>,
    birth_date: Option<NaiveDate>,
    death_date: Option<NaiveDate>,
    is_major: bool,
}

impl Character {
    #[must_use]
    pub fn new(hook: ChangeHook) -> Self {
        Self {
            base: ElementBase::new(hook),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn aka(&self) -> Option<&str> {
        self.aka.as_deref()
    }

    pub fn set_aka(&mut self, aka: Option<String>) {
        set_field(&mut self.aka, aka, self.base.hook());
    }

    #[must_use]
    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    pub fn set_full_name(&mut self, full_name: Option<String>) {
        set_field(&mut self.full_name, full_name, self.base.hook());
    }

    /// Biography as formatted text, paragraphs joined by `\n`.
    #[must_use]
    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    pub fn set_bio(&mut self, bio: Option<String>) {
        set_field(&mut self.bio, bio, self.base.hook());
    }

    #[must_use]
    pub fn goals(&self) -> Option<&str> {
        self.goals.as_deref()
    }

    pub fn set_goals(&mut self, goals: Option<String>) {
        set_field(&mut self.goals, goals, self.base.hook());
    }

    #[must_use]
    pub fn birth_date(&self) -> Option<NaiveDate> {
        self.birth_date
    }

    pub fn set_birth_date(&mut self, birth_date: Option<NaiveDate>) {
        set_field(&mut self.birth_date, birth_date, self.base.hook());
    }

    #[must_use]
    pub fn death_date(&self) -> Option<NaiveDate> {
        self.death_date
    }

    pub fn set_death_date(&mut self, death_date: Option<NaiveDate>) {
        set_field(&mut self.death_date, death_date, self.base.hook());
    }

    #[must_use]
    pub fn is_major(&self) -> bool {
        self.is_major
    }

    pub fn set_is_major(&mut self, is_major: bool) {
        set_field(&mut self.is_major, is_major, self.base.hook());
    }

    /// Age in whole years at `now`.
    ///
    /// Positive values are the age (at death, if the character has died);
    /// negative values count the years since death. None without a birth
    /// date, unless the death date alone decides the sign.
    #[must_use]
    pub fn age(&self, now: NaiveDate) -> Option<i64> {
        if let Some(death) = self.death_date {
            if now > death {
                return Some(-years_between(death, now));
            }
        }
        self.birth_date.map(|birth| years_between(birth, now))
    }
}

impl Element for Character {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ElementBase {
        &mut self.base
    }
}

impl Noted for Character {
    fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    fn set_notes(&mut self, notes: Option<String>) {
        set_field(&mut self.notes, notes, self.base.hook());
    }
}

impl Tagged for Character {
    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn set_tags(&mut self, tags: Vec<String>) {
        set_field(&mut self.tags, tags, self.base.hook());
    }
}

/// Whole years from `start` to `end`, fractional years truncated.
#[must_use]
pub fn years_between(start: NaiveDate, end: NaiveDate) -> i64 {
    let full_years = i64::from(end.year() - start.year());
    let shifted_start = start.with_year(end.year()).unwrap_or(end);
    let remainder_days = end.signed_duration_since(shifted_start).num_days() as f64;
    let days_in_year = if NaiveDate::from_ymd_opt(end.year(), 2, 29).is_some() {
        366.0
    } else {
        365.0
    };
    (full_years as f64 + remainder_days / days_in_year) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn age_counts_completed_years() {
        let mut character = Character::new(ChangeHook::none());
        character.set_birth_date(Some(date(1990, 6, 15)));
        assert_eq!(character.age(date(2024, 6, 14)), Some(33));
        assert_eq!(character.age(date(2024, 6, 15)), Some(34));
    }

    #[test]
    fn years_since_death_are_negative() {
        let mut character = Character::new(ChangeHook::none());
        character.set_birth_date(Some(date(1900, 1, 1)));
        character.set_death_date(Some(date(1970, 1, 1)));
        assert_eq!(character.age(date(1975, 6, 1)), Some(-5));
    }

    #[test]
    fn age_before_death_uses_the_birth_date() {
        let mut character = Character::new(ChangeHook::none());
        character.set_birth_date(Some(date(1900, 1, 1)));
        character.set_death_date(Some(date(1970, 1, 1)));
        assert_eq!(character.age(date(1960, 1, 1)), Some(60));
    }

    #[test]
    fn age_without_birth_date_is_unknown() {
        let character = Character::new(ChangeHook::none());
        assert_eq!(character.age(date(2024, 1, 1)), None);
    }
}
