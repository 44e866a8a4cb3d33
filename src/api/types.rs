use serde::{Deserialize, Serialize};

/// Reading status of a book in the user's library. Ids match the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadingStatus {
    WantToRead,
    CurrentlyReading,
    Read,
    Paused,
    DidNotFinish,
    Ignored,
}

impl ReadingStatus {
    pub const ALL: [ReadingStatus; 6] = [
        ReadingStatus::WantToRead,
        ReadingStatus::CurrentlyReading,
        ReadingStatus::Read,
        ReadingStatus::Paused,
        ReadingStatus::DidNotFinish,
        ReadingStatus::Ignored,
    ];

    pub fn id(self) -> i64 {
        match self {
            ReadingStatus::WantToRead => 1,
            ReadingStatus::CurrentlyReading => 2,
            ReadingStatus::Read => 3,
            ReadingStatus::Paused => 4,
            ReadingStatus::DidNotFinish => 5,
            ReadingStatus::Ignored => 6,
        }
    }

    pub fn from_id(id: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }

    pub fn label(self) -> &'static str {
        match self {
            ReadingStatus::WantToRead => "Want to Read",
            ReadingStatus::CurrentlyReading => "Currently Reading",
            ReadingStatus::Read => "Read",
            ReadingStatus::Paused => "Paused",
            ReadingStatus::DidNotFinish => "Did Not Finish",
            ReadingStatus::Ignored => "Ignored",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pro: bool,
    #[serde(default)]
    pub books_count: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Contribution {
    pub author: Author,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Author {
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Book {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub pages: Option<i64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub release_year: Option<i64>,
    #[serde(default)]
    pub contributions: Vec<Contribution>,
}

impl Book {
    /// Comma-separated author names, or "Unknown author".
    pub fn authors(&self) -> String {
        if self.contributions.is_empty() {
            return "Unknown author".to_string();
        }
        self.contributions
            .iter()
            .map(|c| c.author.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A book as it sits in the user's library.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct UserBook {
    pub id: i64,
    pub book_id: i64,
    pub status_id: i64,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review: Option<String>,
    pub book: Book,
    /// Newest read first; at most one is requested.
    #[serde(default)]
    pub user_book_reads: Vec<UserBookRead>,
}

impl UserBook {
    pub fn status(&self) -> Option<ReadingStatus> {
        ReadingStatus::from_id(self.status_id)
    }

    pub fn current_read(&self) -> Option<&UserBookRead> {
        self.user_book_reads.first()
    }
}

/// One pass through a book: page progress and dates.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct UserBookRead {
    pub id: i64,
    #[serde(default)]
    pub progress_pages: Option<i64>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub finished_at: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct JournalEntry {
    pub id: i64,
    pub event: String,
    #[serde(default)]
    pub entry: Option<String>,
    #[serde(default)]
    pub action_at: String,
}

impl JournalEntry {
    /// `YYYY-MM-DD [event] text`, text cut to `max` chars.
    pub fn summary(&self, max: usize) -> String {
        let date = self.action_at.get(..10).unwrap_or(&self.action_at);
        let mut line = format!("{date} [{}]", self.event);
        if let Some(text) = self.entry.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            line.push(' ');
            if text.chars().count() > max {
                line.extend(text.chars().take(max.saturating_sub(1)));
                line.push('…');
            } else {
                line.push_str(text);
            }
        }
        line
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct BookList {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub books_count: i64,
}

/// A list membership row. `id` is the membership id, not the book id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ListBook {
    pub id: i64,
    pub book_id: i64,
    pub book: Book,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Tag {
    pub tag: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ReviewAuthor {
    pub username: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Review {
    pub id: i64,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review: Option<String>,
    pub user: ReviewAuthor,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CoverHolder {
    #[serde(default)]
    pub image: Option<Image>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct StatusCount {
    pub status_id: i64,
    pub count: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Goal {
    pub goal: i64,
    #[serde(default)]
    pub progress: i64,
    #[serde(default)]
    pub start_date: Option<String>,
}
