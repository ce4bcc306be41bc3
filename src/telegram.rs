use async_trait::async_trait;
use teloxide::prelude::*;

use crate::reminder::OwnerId;
use crate::scheduling::DeliveryChannel;

/// Delivers notifications over Telegram. Owner ids double as chat ids.
pub struct TelegramDeliveryChannel {
    bot: Bot,
}

impl TelegramDeliveryChannel {
    pub fn new(token: String) -> Self {
        Self {
            bot: Bot::new(token),
        }
    }
}

#[async_trait]
impl DeliveryChannel for TelegramDeliveryChannel {
    async fn deliver_primary(&self, owner: OwnerId, text: &str) -> anyhow::Result<()> {
        self.bot
            .send_message(ChatId(owner), format!("⏰ Time for: {text}"))
            .await?;
        Ok(())
    }

    async fn deliver_follow_up(&self, owner: OwnerId, text: &str) -> anyhow::Result<()> {
        self.bot
            .send_message(ChatId(owner), format!("Did you get to it? {text} 😼"))
            .await?;
        Ok(())
    }
}
