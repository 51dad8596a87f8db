use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// User-supplied preference record behind `/api/profile`.
///
/// Fields the client does not model are kept in `extra` so a save never drops
/// data the backend added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub career_goals: Option<String>,
    #[serde(default)]
    pub work_style_preferences: Option<String>,
    #[serde(default)]
    pub preferred_work_arrangement: Option<String>,
    #[serde(default)]
    pub desired_salary_min: Option<i64>,
    #[serde(default)]
    pub desired_salary_max: Option<i64>,
    #[serde(default)]
    pub salary_currency: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub willing_to_relocate: Option<bool>,
    #[serde(default)]
    pub resume_text: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Partial body of `PUT /api/profile`. Absent fields are left untouched server-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub career_goals: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_style_preferences: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_work_arrangement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_salary_min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_salary_max: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub willing_to_relocate: Option<bool>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Sets a field by its wire name. Used by the CLI's `profile set key=value`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        let text = || Some(value.to_string());
        match key {
            "full_name" => self.full_name = text(),
            "career_goals" => self.career_goals = text(),
            "work_style_preferences" => self.work_style_preferences = text(),
            "preferred_work_arrangement" => self.preferred_work_arrangement = text(),
            "salary_currency" => self.salary_currency = text(),
            "location" => self.location = text(),
            "desired_salary_min" => self.desired_salary_min = Some(parse_amount(key, value)?),
            "desired_salary_max" => self.desired_salary_max = Some(parse_amount(key, value)?),
            "willing_to_relocate" => {
                self.willing_to_relocate = Some(
                    value
                        .parse()
                        .map_err(|_| format!("{key} must be true or false"))?,
                )
            }
            other => return Err(format!("unknown profile field '{other}'")),
        }
        Ok(())
    }
}

fn parse_amount(key: &str, value: &str) -> Result<i64, String> {
    value
        .replace(['_', ','], "")
        .parse()
        .map_err(|_| format!("{key} must be a whole number"))
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumeTextRequest<'a> {
    pub resume_text: &'a str,
}
