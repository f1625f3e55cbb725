use crate::http;
use crate::types::TrelloAction;
use std::error::Error;

pub const BASE_URL: &str = "https://api.trello.com";

pub struct Trello {
    key: String,
    token: String,
    base_url: String,
}

impl Trello {
    pub fn new(key: &str, token: &str) -> Self {
        Self::with_base_url(key, token, BASE_URL)
    }

    pub fn with_base_url(key: &str, token: &str, base_url: &str) -> Self {
        Self {
            key: key.to_string(),
            token: token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Board exports cap the action list at 1000 entries, so comments are
    /// fetched from the live API instead of the export.
    pub async fn fetch_card_comments(
        &self,
        card_id: &str,
    ) -> Result<Vec<TrelloAction>, Box<dyn Error>> {
        let url = format!("{}/1/cards/{}/actions", self.base_url, card_id);
        let response = http::CLIENT
            .get(url.as_str())
            .query(&[
                ("limit", "1000"),
                ("key", self.key.as_str()),
                ("token", self.token.as_str()),
            ])
            .send()
            .await?;
        let payload = &response.text().await?;
        let actions: Vec<TrelloAction> = serde_json::from_str(payload)?;
        Ok(actions
            .into_iter()
            .filter(|action| action.kind == "commentCard")
            .collect())
    }
}
