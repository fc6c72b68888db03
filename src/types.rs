use serde::{Deserialize, Serialize};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

const MESSAGE_TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour repr:12 padding:zero]:[minute padding:zero] [period case:upper]");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
}

/// One entry of the conversation log. Built by the session reducer, which
/// assigns the id; never edited after it is appended.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub id: u64,
    pub role: Role,
    pub content: String,
    pub attachment: Option<AttachmentRef>,
    pub sources: Vec<CitationSource>,
    pub created_at: OffsetDateTime,
}

impl Message {
    /// Creation time as local 12-hour clock, e.g. `09:41 PM`.
    pub fn display_time(&self) -> Option<String> {
        let mut datetime = self.created_at;
        if let Ok(offset) = UtcOffset::current_local_offset() {
            datetime = datetime.to_offset(offset);
        }
        datetime.format(MESSAGE_TIME_FORMAT).ok()
    }
}

/// Turn contents before the reducer stamps an id on them.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnDraft {
    pub role: Role,
    pub content: String,
    pub attachment: Option<AttachmentRef>,
    pub sources: Vec<CitationSource>,
    pub created_at: OffsetDateTime,
}

impl TurnDraft {
    pub fn user(content: impl Into<String>, attachment: Option<AttachmentRef>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            attachment,
            sources: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: Role::Ai,
            content: content.into(),
            attachment: None,
            sources: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn with_sources(mut self, sources: Vec<CitationSource>) -> Self {
        self.sources = sources;
        self
    }

    pub(crate) fn into_message(self, id: u64) -> Message {
        Message {
            id,
            role: self.role,
            content: self.content,
            attachment: self.attachment,
            sources: self.sources,
            created_at: self.created_at,
        }
    }
}

/// What a user turn shows for its attached image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachmentRef {
    pub name: String,
    pub media_type: Option<String>,
    pub preview_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationSource {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl CitationSource {
    pub fn new(uri: impl Into<String>, title: Option<String>) -> Self {
        Self {
            uri: uri.into(),
            title,
        }
    }

    /// Title if the service gave a non-blank one, else the URI host, else the URI.
    pub fn display_title(&self) -> String {
        if let Some(title) = self.title.as_deref()
            && !title.trim().is_empty()
        {
            return title.trim().to_string();
        }

        reqwest::Url::parse(&self.uri)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| self.uri.clone())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_title_prefers_title() {
        let source = CitationSource::new(
            "https://weather.example.com/today",
            Some("Today's forecast".to_string()),
        );
        assert_eq!(source.display_title(), "Today's forecast");
    }

    #[test]
    fn test_display_title_falls_back_to_host() {
        let source = CitationSource::new("https://weather.example.com/today", None);
        assert_eq!(source.display_title(), "weather.example.com");

        let blank = CitationSource::new("https://news.example.org/a?b=c", Some("  ".to_string()));
        assert_eq!(blank.display_title(), "news.example.org");
    }

    #[test]
    fn test_display_title_unparsable_uri() {
        let source = CitationSource::new("not a uri", None);
        assert_eq!(source.display_title(), "not a uri");
    }

    #[test]
    fn test_display_time_is_twelve_hour() {
        let message = TurnDraft::ai("hi").into_message(0);
        let shown = message.display_time().unwrap();
        assert_eq!(shown.len(), 8);
        assert!(shown.ends_with("AM") || shown.ends_with("PM"));
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Ai).unwrap(), "\"ai\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    }
}
