use serde::{Deserialize, Serialize};
use time::Date;

use super::repo_types::{FoodItem, UserProfile, WaterReminder};
use crate::recognition::dto::FoodEstimate;

/// Everything logged on one day. Built on read from the diary.
#[derive(Debug, Clone, Serialize)]
pub struct DailyStats {
    pub date: Date,
    pub items: Vec<FoodItem>,
    pub water: u32,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl DailyStats {
    pub fn new(date: Date, items: Vec<FoodItem>, water: u32) -> Self {
        let sum = |f: fn(&FoodItem) -> f64| items.iter().map(f).sum::<f64>();
        let (calories, protein, carbs, fat) = (
            sum(|i| i.calories),
            sum(|i| i.protein),
            sum(|i| i.carbs),
            sum(|i| i.fat),
        );
        Self {
            date,
            items,
            water,
            calories,
            protein,
            carbs,
            fat,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MacroProgress {
    pub consumed: f64,
    pub goal: u32,
    /// Share of the goal reached, capped at 100.
    pub percent: f64,
}

impl MacroProgress {
    fn new(consumed: f64, goal: u32) -> Self {
        Self {
            consumed,
            goal,
            percent: percent_of(consumed, goal),
        }
    }
}

fn percent_of(consumed: f64, goal: u32) -> f64 {
    if goal == 0 {
        return 0.0;
    }
    (consumed / f64::from(goal) * 100.0).min(100.0)
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub name: String,
    pub calories_consumed: f64,
    pub calories_left: f64,
    pub calorie_percent: f64,
    pub protein: MacroProgress,
    pub carbs: MacroProgress,
    pub fat: MacroProgress,
    pub water: u32,
    pub water_reminder: WaterReminder,
    pub stats: DailyStats,
}

impl Dashboard {
    pub fn new(stats: DailyStats, profile: &UserProfile) -> Self {
        Self {
            name: profile.name.clone(),
            calories_consumed: stats.calories,
            calories_left: (f64::from(profile.daily_goal) - stats.calories).max(0.0),
            calorie_percent: percent_of(stats.calories, profile.daily_goal),
            protein: MacroProgress::new(stats.protein, profile.protein_goal),
            carbs: MacroProgress::new(stats.carbs, profile.carbs_goal),
            fat: MacroProgress::new(stats.fat, profile.fat_goal),
            water: stats.water,
            water_reminder: profile.water_reminder.clone(),
            stats,
        }
    }
}

/// One point of the weekly calorie trend.
#[derive(Debug, Serialize, PartialEq)]
pub struct DayCalories {
    pub date: Date,
    pub weekday: String,
    pub calories: f64,
}

#[derive(Debug, Deserialize)]
pub struct LogItemRequest {
    pub estimate: FoodEstimate,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WaterResponse {
    pub date: Date,
    pub water: u32,
}
