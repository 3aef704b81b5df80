use serde::{Deserialize, Deserializer, Serialize};

/// Health profile record kept by the backend. Every field may be absent,
/// `null`, or empty for accounts that never finished setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub health_conditions: Vec<String>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub food_preferences: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub allergies: Vec<String>,
}

/// Never-filled profile columns arrive as explicit `null`; read them the
/// same as missing keys.
fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl UserProfile {
    /// Name shown in the header, falling back to the account email when
    /// the profile carries no usable name.
    pub fn display_name(&self, email: &str) -> String {
        match &self.full_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => email.to_string(),
        }
    }

    pub fn conditions_summary(&self) -> String {
        if self.health_conditions.is_empty() {
            "None specified".to_string()
        } else {
            self.health_conditions.join(", ")
        }
    }

    pub fn preferences_summary(&self) -> String {
        if self.food_preferences.is_empty() {
            "Not specified".to_string()
        } else {
            self.food_preferences.clone()
        }
    }

    pub fn allergies_summary(&self) -> String {
        if self.allergies.is_empty() {
            "None specified".to_string()
        } else {
            self.allergies.join(", ")
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProfileResponse {
    pub profile: Option<UserProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeRequest {
    pub ingredients: Vec<String>,
    pub preferences: String,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionsResponse {
    pub suggestions: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageAnalysisRequest {
    /// Data URL of the picked photo. The backend expects the camelCase key.
    #[serde(rename = "imageBase64")]
    pub image_base64: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisResponse {
    pub analysis: String,
}
