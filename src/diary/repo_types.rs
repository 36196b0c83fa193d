use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: Uuid,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub ingredients: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaterReminder {
    pub enabled: bool,
    pub interval_minutes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub name: String,
    pub daily_goal: u32,
    pub protein_goal: u32,
    pub carbs_goal: u32,
    pub fat_goal: u32,
    /// Free-form label such as "Lose weight".
    pub goal: String,
    pub allergies: Vec<String>,
    pub water_reminder: WaterReminder,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "Guest".into(),
            daily_goal: 2000,
            protein_goal: 100,
            carbs_goal: 250,
            fat_goal: 60,
            goal: "Maintain weight".into(),
            allergies: Vec::new(),
            water_reminder: WaterReminder {
                enabled: false,
                interval_minutes: 60,
            },
        }
    }
}

/// Field-wise profile patch; absent fields are left as they are.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub daily_goal: Option<u32>,
    pub protein_goal: Option<u32>,
    pub carbs_goal: Option<u32>,
    pub fat_goal: Option<u32>,
    pub goal: Option<String>,
    pub allergies: Option<Vec<String>>,
    pub water_reminder_enabled: Option<bool>,
    pub water_reminder_interval: Option<u32>,
}

impl UserProfile {
    pub fn apply(&mut self, u: ProfileUpdate) {
        if let Some(v) = u.name {
            self.name = v;
        }
        if let Some(v) = u.daily_goal {
            self.daily_goal = v;
        }
        if let Some(v) = u.protein_goal {
            self.protein_goal = v;
        }
        if let Some(v) = u.carbs_goal {
            self.carbs_goal = v;
        }
        if let Some(v) = u.fat_goal {
            self.fat_goal = v;
        }
        if let Some(v) = u.goal {
            self.goal = v;
        }
        if let Some(v) = u.allergies {
            self.allergies = v;
        }
        if let Some(v) = u.water_reminder_enabled {
            self.water_reminder.enabled = v;
        }
        if let Some(v) = u.water_reminder_interval {
            self.water_reminder.interval_minutes = v;
        }
    }
}
