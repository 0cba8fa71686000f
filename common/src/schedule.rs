use chrono::Weekday as ChronoWeekday;
use serde::{Deserialize, Serialize};

use crate::clock::TimeParts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    pub fn index(self) -> usize {
        match self {
            Self::Mon => 0,
            Self::Tue => 1,
            Self::Wed => 2,
            Self::Thu => 3,
            Self::Fri => 4,
            Self::Sat => 5,
            Self::Sun => 6,
        }
    }

    pub fn from_index(index: usize) -> Self {
        match index % 7 {
            0 => Self::Mon,
            1 => Self::Tue,
            2 => Self::Wed,
            3 => Self::Thu,
            4 => Self::Fri,
            5 => Self::Sat,
            _ => Self::Sun,
        }
    }

    pub fn from_chrono(weekday: ChronoWeekday) -> Self {
        match weekday {
            ChronoWeekday::Mon => Self::Mon,
            ChronoWeekday::Tue => Self::Tue,
            ChronoWeekday::Wed => Self::Wed,
            ChronoWeekday::Thu => Self::Thu,
            ChronoWeekday::Fri => Self::Fri,
            ChronoWeekday::Sat => Self::Sat,
            ChronoWeekday::Sun => Self::Sun,
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Self::Mon => "Mon",
            Self::Tue => "Tue",
            Self::Wed => "Wed",
            Self::Thu => "Thu",
            Self::Fri => "Fri",
            Self::Sat => "Sat",
            Self::Sun => "Sun",
        }
    }
}

/// Set of weekdays an entry may fire on, kept in the order the caller gave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekdaySet(Vec<Weekday>);

impl WeekdaySet {
    pub fn new(days: Vec<Weekday>) -> Self {
        Self(days)
    }

    pub fn everyday() -> Self {
        Self(vec![
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ])
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0.contains(&day)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn days(&self) -> &[Weekday] {
        &self.0
    }
}

/// One row of the schedule table. Hour and minute of `-1` match any value;
/// the second field is always an exact match. The year/month/day fields are
/// carried in the persisted record but never consulted when matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub name: String,
    pub weekdays: WeekdaySet,
    pub hour: i8,
    pub minute: i8,
    pub second: u8,
    #[serde(default)]
    pub year: u16,
    #[serde(default)]
    pub month: u8,
    #[serde(default)]
    pub day: u8,
    #[serde(rename = "sceneName")]
    pub scene_name: String,
    pub active: bool,
}

impl ScheduleEntry {
    pub fn validate(&self) -> bool {
        (-1..=23).contains(&self.hour)
            && (-1..=59).contains(&self.minute)
            && self.second <= 59
            && !self.weekdays.is_empty()
    }

    pub fn matches(&self, parts: &TimeParts) -> bool {
        self.active
            && self.weekdays.contains(parts.weekday)
            && (self.hour < 0 || parts.hour == self.hour as u8)
            && (self.minute < 0 || parts.minute == self.minute as u8)
            && parts.second == self.second
    }
}

/// Ordered schedule table. Entries are addressed by positional index; removing
/// an entry shifts every later index down by one, so an index held across a
/// delete addresses a different entry afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleTable {
    entries: Vec<ScheduleEntry>,
}

impl ScheduleTable {
    pub fn new(entries: Vec<ScheduleEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ScheduleEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn push(&mut self, entry: ScheduleEntry) {
        self.entries.push(entry);
    }

    /// Whole-entry replace; partial field updates are never visible.
    pub fn replace(&mut self, index: usize, entry: ScheduleEntry) -> bool {
        match self.entries.get_mut(index) {
            Some(slot) => {
                *slot = entry;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, index: usize) -> Option<ScheduleEntry> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn entry(hour: i8, minute: i8, second: u8) -> ScheduleEntry {
        ScheduleEntry {
            name: "entry".to_string(),
            weekdays: WeekdaySet::everyday(),
            hour,
            minute,
            second,
            year: 0,
            month: 0,
            day: 0,
            scene_name: "Evening".to_string(),
            active: true,
        }
    }

    fn parts(weekday: Weekday, hour: u8, minute: u8, second: u8) -> TimeParts {
        TimeParts {
            year: 2026,
            month: 8,
            day: 3,
            weekday,
            hour,
            minute,
            second,
        }
    }

    #[test]
    fn wildcard_hour_and_minute_match_any_time() {
        let entry = entry(-1, -1, 30);

        assert!(entry.matches(&parts(Weekday::Mon, 0, 0, 30)));
        assert!(entry.matches(&parts(Weekday::Sun, 23, 59, 30)));
        assert!(!entry.matches(&parts(Weekday::Mon, 0, 0, 29)));
    }

    #[test]
    fn second_is_always_exact() {
        let entry = entry(12, 0, 0);

        assert!(entry.matches(&parts(Weekday::Wed, 12, 0, 0)));
        assert!(!entry.matches(&parts(Weekday::Wed, 12, 0, 1)));
    }

    #[test]
    fn inactive_entry_never_matches() {
        let mut entry = entry(-1, -1, 30);
        entry.active = false;

        assert!(!entry.matches(&parts(Weekday::Mon, 10, 10, 30)));
    }

    #[test]
    fn weekday_outside_set_never_matches() {
        let mut entry = entry(-1, -1, 0);
        entry.weekdays = WeekdaySet::new(vec![Weekday::Sat, Weekday::Sun]);

        assert!(entry.matches(&parts(Weekday::Sat, 7, 0, 0)));
        assert!(!entry.matches(&parts(Weekday::Fri, 7, 0, 0)));
    }

    #[test]
    fn validate_rejects_out_of_range_fields() {
        assert!(entry(-1, -1, 30).validate());
        assert!(!entry(24, 0, 0).validate());
        assert!(!entry(0, 60, 0).validate());
        assert!(!entry(0, 0, 60).validate());

        let mut empty_days = entry(0, 0, 0);
        empty_days.weekdays = WeekdaySet::new(Vec::new());
        assert!(!empty_days.validate());
    }

    #[test]
    fn delete_shifts_following_indices() {
        // An index held across a delete addresses the next entry afterwards.
        let mut table = ScheduleTable::default();
        for name in ["first", "second", "third"] {
            let mut e = entry(0, 0, 0);
            e.name = name.to_string();
            table.push(e);
        }

        let removed = table.remove(1).unwrap();
        assert_eq!(removed.name, "second");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1).unwrap().name, "third");
    }

    #[test]
    fn remove_out_of_range_is_none() {
        let mut table = ScheduleTable::default();
        table.push(entry(0, 0, 0));

        assert!(table.remove(5).is_none());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn replace_swaps_whole_entry() {
        let mut table = ScheduleTable::default();
        table.push(entry(0, 0, 0));

        let mut updated = entry(12, 30, 15);
        updated.name = "updated".to_string();
        assert!(table.replace(0, updated.clone()));
        assert_eq!(table.get(0), Some(&updated));

        assert!(!table.replace(3, entry(0, 0, 0)));
    }

    #[test]
    fn chrono_weekday_maps_monday_to_zero() {
        assert_eq!(Weekday::from_chrono(ChronoWeekday::Mon).index(), 0);
        assert_eq!(Weekday::from_chrono(ChronoWeekday::Sun).index(), 6);
    }

    #[test]
    fn entry_serializes_with_scene_name_key() {
        let entry = entry(7, 30, 0);
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["sceneName"], "Evening");
        assert_eq!(json["hour"], 7);
        assert_eq!(json["weekdays"][0], "MON");
    }
}
