//! Telegram adapter (teloxide).
//!
//! This crate implements the `vmb-core` MessagingPort over Telegram Bot API.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{InputFile, ParseMode},
};

use tokio::time::sleep;

pub mod catalog;
pub mod handlers;
pub mod router;

use vmb_core::{
    compose::Attachment,
    domain::{ChatId, MessageId, MessageRef},
    embed::Embed,
    errors::Error,
    formatting::{embed_to_html_blocks, pack_blocks, MIN_MESSAGE_LEN},
    messaging::{port::MessagingPort, types::MessagingCapabilities},
    Result,
};

const MAX_MESSAGE_LEN: usize = 4096;

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
    max_message_len: usize,
}

impl TelegramMessenger {
    pub fn new(bot: Bot, max_message_len: usize) -> Self {
        Self {
            bot,
            max_message_len: max_message_len.clamp(MIN_MESSAGE_LEN, MAX_MESSAGE_LEN),
        }
    }

    pub fn bot(&self) -> Bot {
        self.bot.clone()
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn msg_ref(chat_id: ChatId, msg: &Message) -> MessageRef {
        MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        }
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        tracing::warn!(retry_after = ?d, "telegram flood control, retrying");
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }

    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
        let msg = self
            .with_retry(|| {
                self.bot
                    .send_message(Self::tg_chat(chat_id), html.to_string())
                    .parse_mode(ParseMode::Html)
            })
            .await?;
        Ok(Self::msg_ref(chat_id, &msg))
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities {
            supports_attachments: true,
            max_message_len: self.max_message_len,
        }
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
        let msg = self
            .with_retry(|| self.bot.send_message(Self::tg_chat(chat_id), text.to_string()))
            .await?;
        Ok(Self::msg_ref(chat_id, &msg))
    }

    async fn send_embed(&self, chat_id: ChatId, embed: &Embed) -> Result<Vec<MessageRef>> {
        let blocks = embed_to_html_blocks(embed, self.max_message_len);
        let messages = pack_blocks(blocks, self.max_message_len);
        tracing::debug!(
            chat_id = chat_id.0,
            fields = embed.fields().len(),
            messages = messages.len(),
            "sending embed"
        );

        let mut sent = Vec::with_capacity(messages.len());
        for html in &messages {
            sent.push(self.send_html(chat_id, html).await?);
        }
        Ok(sent)
    }

    async fn send_attachment(&self, chat_id: ChatId, file: &Attachment) -> Result<MessageRef> {
        tracing::debug!(
            chat_id = chat_id.0,
            filename = %file.filename,
            bytes = file.content.len(),
            "sending attachment"
        );
        let document = InputFile::memory(file.content.clone()).file_name(file.filename.clone());
        let msg = self
            .with_retry(|| {
                self.bot
                    .send_document(Self::tg_chat(chat_id), document.clone())
            })
            .await?;
        Ok(Self::msg_ref(chat_id, &msg))
    }
}
