use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{non_blank, required};
use crate::domain::DomainError;

/// News post published to a team (and optionally a squad)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct News {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub team_id: Option<Uuid>,
    pub squad_id: Option<Uuid>,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Editable attributes of a news post
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsDetails {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub team_id: Option<Uuid>,
    pub squad_id: Option<Uuid>,
}

impl News {
    pub fn new(details: NewsDetails, author_id: Uuid) -> Result<Self, DomainError> {
        let mut news = Self {
            id: Uuid::new_v4(),
            title: String::new(),
            content: String::new(),
            image_url: None,
            team_id: None,
            squad_id: None,
            author_id,
            created_at: Utc::now(),
        };
        news.apply(details)?;
        Ok(news)
    }

    pub fn apply(&mut self, details: NewsDetails) -> Result<(), DomainError> {
        let title = required(details.title, "Title cannot be empty")?;
        let content = required(details.content, "Content cannot be empty")?;

        self.title = title;
        self.content = content;
        self.image_url = non_blank(details.image_url);
        self.team_id = details.team_id;
        self.squad_id = details.squad_id;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> NewsDetails {
        NewsDetails {
            title: "Kickoff".to_string(),
            content: "Season starts Monday".to_string(),
            team_id: Some(Uuid::new_v4()),
            ..Default::default()
        }
    }

    #[test]
    fn create_news() {
        let author = Uuid::new_v4();
        let news = News::new(details(), author).unwrap();
        assert_eq!(news.title, "Kickoff");
        assert_eq!(news.author_id, author);
    }

    #[test]
    fn title_and_content_required() {
        let mut d = details();
        d.title = " ".to_string();
        assert_eq!(
            News::new(d, Uuid::new_v4()).unwrap_err().to_string(),
            "Title cannot be empty"
        );

        let mut d = details();
        d.content = String::new();
        assert!(News::new(d, Uuid::new_v4()).is_err());
    }

    #[test]
    fn failed_apply_leaves_news_untouched() {
        let mut news = News::new(details(), Uuid::new_v4()).unwrap();
        let mut d = details();
        d.content = String::new();
        assert!(news.apply(d).is_err());
        assert_eq!(news.content, "Season starts Monday");
    }
}
