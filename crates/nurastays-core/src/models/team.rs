use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
}

impl SocialLinks {
    /// Drop blank entries so they are not sent as empty strings
    pub fn normalized(&self) -> Self {
        fn keep(v: &Option<String>) -> Option<String> {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        }
        Self {
            instagram: keep(&self.instagram),
            linkedin: keep(&self.linkedin),
            twitter: keep(&self.twitter),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct TeamMember {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub order_index: i32,
    #[serde(default)]
    pub social_links: SocialLinks,
}

/// A photo attached to a team member form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Create/update payload for team members. Sent as multipart because of the
/// optional photo upload; `social_links` travels as a JSON string field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamMemberForm {
    pub name: String,
    pub role: String,
    pub bio: String,
    pub order_index: i32,
    pub social_links: SocialLinks,
    pub photo: Option<Photo>,
}

impl From<&TeamMember> for TeamMemberForm {
    fn from(m: &TeamMember) -> Self {
        Self {
            name: m.name.clone(),
            role: m.role.clone(),
            bio: m.bio.clone().unwrap_or_default(),
            order_index: m.order_index,
            social_links: m.social_links.clone(),
            photo: None,
        }
    }
}
