use serde::{Deserialize, Serialize};

/// One affiliate page: a slug plus the four links the public page renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffiliatePage {
    pub id: String,
    pub slug: String,
    pub main_link: String,
    pub button1_link: String,
    pub button2_link: String,
    pub button3_link: String,
    pub created_at: i64,
}

/// Input for creating an affiliate page. Field names match what the panel
/// posts.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAffiliatePage {
    pub main_affiliate_link: String,
    pub button1_link: String,
    pub button2_link: String,
    pub button3_link: String,
}

impl CreateAffiliatePage {
    /// All four links, main first.
    pub fn links(&self) -> [&str; 4] {
        [
            &self.main_affiliate_link,
            &self.button1_link,
            &self.button2_link,
            &self.button3_link,
        ]
    }
}
