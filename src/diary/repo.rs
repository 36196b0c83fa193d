use std::collections::BTreeMap;

use time::{Date, Duration};
use uuid::Uuid;

use super::dto::{DailyStats, DayCalories};
use super::repo_types::{FoodItem, ProfileUpdate, UserProfile};

/// In-memory owner of the profile, the food log and water intake.
#[derive(Debug, Default)]
pub struct Diary {
    profile: UserProfile,
    items: Vec<FoodItem>,
    water: BTreeMap<Date, u32>,
}

impl Diary {
    pub fn new(profile: UserProfile) -> Self {
        Self {
            profile,
            ..Default::default()
        }
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn update_profile(&mut self, update: ProfileUpdate) -> &UserProfile {
        self.profile.apply(update);
        &self.profile
    }

    pub fn log_item(&mut self, item: FoodItem) {
        self.items.push(item);
    }

    /// Whole log, newest first.
    pub fn items(&self) -> Vec<FoodItem> {
        let mut out = self.items.clone();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
        out
    }

    pub fn item(&self, id: Uuid) -> Option<&FoodItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn remove_item(&mut self, id: Uuid) -> Option<FoodItem> {
        let pos = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(pos))
    }

    pub fn water(&self, date: Date) -> u32 {
        self.water.get(&date).copied().unwrap_or(0)
    }

    pub fn add_water(&mut self, date: Date) -> u32 {
        let n = self.water.entry(date).or_insert(0);
        *n += 1;
        *n
    }

    pub fn remove_water(&mut self, date: Date) -> u32 {
        let n = self.water.entry(date).or_insert(0);
        *n = n.saturating_sub(1);
        *n
    }

    pub fn stats_for(&self, date: Date) -> DailyStats {
        let items = self
            .items()
            .into_iter()
            .filter(|i| i.timestamp.date() == date)
            .collect();
        DailyStats::new(date, items, self.water(date))
    }

    /// Calorie totals for the seven days ending on `end`, oldest first.
    pub fn week_ending(&self, end: Date) -> Vec<DayCalories> {
        (0..7)
            .rev()
            .filter_map(|back| end.checked_sub(Duration::days(back)))
            .map(|date| DayCalories {
                date,
                weekday: date.weekday().to_string(),
                calories: self
                    .items
                    .iter()
                    .filter(|i| i.timestamp.date() == date)
                    .map(|i| i.calories)
                    .sum(),
            })
            .collect()
    }
}
