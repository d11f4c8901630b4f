use chrono::{DateTime, NaiveDate, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    #[default]
    Gradient,
    Image,
}

/// Site-wide presentation settings. Stored as a singleton document.
///
/// `#[serde(default)]` is the default-merge: any field missing from the
/// stored document is taken from [`Settings::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub couple_name: String,
    #[serde(deserialize_with = "date_or_anniversary_default")]
    pub anniversary_date: NaiveDate,
    pub background_type: BackgroundType,
    pub gradient_color1: String,
    pub gradient_color2: String,
    #[serde(deserialize_with = "blank_as_none")]
    pub background_url: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub avatar1_url: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub avatar2_url: Option<String>,
    pub enable_hearts: bool,
    pub enable_particles: bool,
    pub enable_gradient: bool,
    pub enable_parallax: bool,
    pub animation_intensity: u8,
    pub theme_color: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            couple_name: "Tuyền & Trang".to_string(),
            anniversary_date: default_anniversary(),
            background_type: BackgroundType::Gradient,
            gradient_color1: "#FF6B9D".to_string(),
            gradient_color2: "#C06C84".to_string(),
            background_url: None,
            avatar1_url: None,
            avatar2_url: None,
            enable_hearts: true,
            enable_particles: true,
            enable_gradient: true,
            enable_parallax: true,
            animation_intensity: 5,
            theme_color: "#FF6B9D".to_string(),
        }
    }
}

/// Partial settings update. Present fields replace, absent ones stay.
///
/// Asset references are not patchable here; they change through uploads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub couple_name: Option<String>,
    /// A blank date input means "leave it".
    #[serde(default, deserialize_with = "optional_date")]
    pub anniversary_date: Option<NaiveDate>,
    pub background_type: Option<BackgroundType>,
    pub gradient_color1: Option<String>,
    pub gradient_color2: Option<String>,
    pub enable_hearts: Option<bool>,
    pub enable_particles: Option<bool>,
    pub enable_gradient: Option<bool>,
    pub enable_parallax: Option<bool>,
    pub animation_intensity: Option<u8>,
    pub theme_color: Option<String>,
}

impl Settings {
    pub fn merge(&mut self, patch: SettingsPatch) {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        set(&mut self.couple_name, patch.couple_name);
        set(&mut self.anniversary_date, patch.anniversary_date);
        set(&mut self.background_type, patch.background_type);
        set(&mut self.gradient_color1, patch.gradient_color1);
        set(&mut self.gradient_color2, patch.gradient_color2);
        set(&mut self.enable_hearts, patch.enable_hearts);
        set(&mut self.enable_particles, patch.enable_particles);
        set(&mut self.enable_gradient, patch.enable_gradient);
        set(&mut self.enable_parallax, patch.enable_parallax);
        set(&mut self.animation_intensity, patch.animation_intensity);
        set(&mut self.theme_color, patch.theme_color);
    }
}

/// Which of the two avatars an upload replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarSlot {
    First,
    Second,
}

impl FromStr for AvatarSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "1" => Ok(AvatarSlot::First),
            "2" => Ok(AvatarSlot::Second),
            other => Err(format!("avatar slot must be \"1\" or \"2\", got {:?}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: Uuid,
    pub url: String,
    #[serde(default)]
    pub caption: String,
    #[serde(deserialize_with = "flexible_date")]
    pub photo_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Accepts a plain `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn parse_photo_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

fn default_anniversary() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 4).unwrap_or_default()
}

// Older documents store "" for an absent reference.
fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

fn optional_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => parse_photo_date(raw)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid date {:?}", raw))),
    }
}

fn date_or_anniversary_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    Ok(optional_date(deserializer)?.unwrap_or_else(default_anniversary))
}

// Dates written as full timestamps keep only their calendar day.
fn flexible_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_photo_date(&raw).ok_or_else(|| D::Error::custom(format!("invalid date {:?}", raw)))
}

/// The two people whose songs live here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Owner {
    #[default]
    Tuyen,
    Trang,
}

impl Owner {
    pub const ALL: [Owner; 2] = [Owner::Tuyen, Owner::Trang];

    pub fn as_str(self) -> &'static str {
        match self {
            Owner::Tuyen => "tuyen",
            Owner::Trang => "trang",
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Owner {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Owner::ALL
            .into_iter()
            .find(|owner| owner.as_str() == s.trim())
            .ok_or_else(|| format!("unknown owner {:?}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub owner: Owner,
    /// External link, opened outside the app.
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Stored audio asset.
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub cover_art_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Song {
    /// Only songs with a stored audio asset can be played in-app.
    pub fn is_playable(&self) -> bool {
        self.file_url.as_deref().is_some_and(|u| !u.is_empty())
    }

    pub fn is_link_only(&self) -> bool {
        !self.is_playable() && self.url.as_deref().is_some_and(|u| !u.is_empty())
    }

    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }

    pub fn display_artist(&self) -> &str {
        if self.artist.trim().is_empty() {
            "Unknown Artist"
        } else {
            &self.artist
        }
    }
}

/// Text fields of a song upload.
#[derive(Debug, Clone, Default)]
pub struct NewSong {
    pub title: String,
    pub artist: Option<String>,
    pub owner: Option<Owner>,
    pub url: Option<String>,
}

/// One uploaded file, already buffered.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: Some(file_name.into()),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub photo_count: usize,
    pub song_count: usize,
    pub days: i64,
    pub hours: i64,
}

impl Stats {
    /// Whole days and hours since midnight UTC on the anniversary, floored.
    pub fn compute(settings: &Settings, photos: usize, songs: usize, now: DateTime<Utc>) -> Self {
        let start = settings.anniversary_date.and_time(chrono::NaiveTime::MIN).and_utc();
        let elapsed = (now - start).num_seconds();

        Self {
            photo_count: photos,
            song_count: songs,
            days: elapsed.div_euclid(86_400),
            hours: elapsed.div_euclid(3_600),
        }
    }
}
