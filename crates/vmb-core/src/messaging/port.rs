use async_trait::async_trait;

use crate::{
    chunk::split_lines_hard,
    compose::{Attachment, OutgoingMessage},
    domain::{ChatId, MessageRef},
    embed::Embed,
    messaging::types::MessagingCapabilities,
    Result,
};

/// Cross-messenger port.
///
/// Adapters receive finished, size-checked embeds and attachments; they only
/// decide how to put them on the wire.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    fn capabilities(&self) -> MessagingCapabilities;

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef>;

    /// Send an embed; may take several platform messages.
    async fn send_embed(&self, chat_id: ChatId, embed: &Embed) -> Result<Vec<MessageRef>>;

    async fn send_attachment(&self, chat_id: ChatId, file: &Attachment) -> Result<MessageRef>;
}

/// Send a composed message: the embed first, then each attachment.
///
/// Messengers without attachment support get each file as plain text
/// messages, headed by the file name.
pub async fn deliver(
    port: &dyn MessagingPort,
    chat_id: ChatId,
    msg: &OutgoingMessage,
) -> Result<Vec<MessageRef>> {
    let caps = port.capabilities();
    let mut sent = Vec::new();
    if let Some(embed) = &msg.embed {
        sent.extend(port.send_embed(chat_id, embed).await?);
    }
    for file in &msg.files {
        if caps.supports_attachments {
            sent.push(port.send_attachment(chat_id, file).await?);
            continue;
        }
        let text = format!("{}\n{}", file.filename, String::from_utf8_lossy(&file.content));
        for chunk in split_lines_hard(&text, caps.max_message_len)? {
            sent.push(port.send_text(chat_id, chunk).await?);
        }
    }
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::domain::MessageId;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
        text_only: Option<usize>,
    }

    impl Recorder {
        fn record(&self, chat_id: ChatId, call: String) -> MessageRef {
            let mut calls = self.calls.lock().unwrap();
            calls.push(call);
            MessageRef {
                chat_id,
                message_id: MessageId(calls.len() as i32),
            }
        }
    }

    #[async_trait]
    impl MessagingPort for Recorder {
        fn capabilities(&self) -> MessagingCapabilities {
            match self.text_only {
                Some(max_message_len) => MessagingCapabilities {
                    supports_attachments: false,
                    max_message_len,
                },
                None => MessagingCapabilities::default(),
            }
        }

        async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef> {
            Ok(self.record(chat_id, format!("text:{text}")))
        }

        async fn send_embed(&self, chat_id: ChatId, embed: &Embed) -> Result<Vec<MessageRef>> {
            let title = embed.title().unwrap_or_default().to_string();
            Ok(vec![self.record(chat_id, format!("embed:{title}"))])
        }

        async fn send_attachment(&self, chat_id: ChatId, file: &Attachment) -> Result<MessageRef> {
            Ok(self.record(chat_id, format!("file:{}", file.filename)))
        }
    }

    #[tokio::test]
    async fn delivers_embed_before_files() {
        let port = Recorder::default();
        let mut embed = Embed::new();
        embed.set_title("eval").unwrap();
        let msg = OutgoingMessage {
            embed: Some(embed),
            files: vec![
                Attachment::text("returned.py", "1"),
                Attachment::text("stdout.py", "2"),
            ],
        };

        let sent = deliver(&port, ChatId(7), &msg).await.unwrap();
        assert_eq!(sent.len(), 3);
        assert_eq!(
            *port.calls.lock().unwrap(),
            ["embed:eval", "file:returned.py", "file:stdout.py"]
        );
    }

    #[tokio::test]
    async fn file_only_message_skips_embed() {
        let port = Recorder::default();
        let msg = OutgoingMessage::file(Attachment::text("tb_error.py", "boom"));
        deliver(&port, ChatId(1), &msg).await.unwrap();
        assert_eq!(*port.calls.lock().unwrap(), ["file:tb_error.py"]);
    }

    #[tokio::test]
    async fn files_become_text_without_attachment_support() {
        let port = Recorder {
            text_only: Some(10),
            ..Recorder::default()
        };
        let msg = OutgoingMessage::file(Attachment::text("tb.py", "line one\nline two\n"));
        let sent = deliver(&port, ChatId(1), &msg).await.unwrap();
        assert_eq!(sent.len(), 3);
        assert_eq!(
            *port.calls.lock().unwrap(),
            ["text:tb.py\n", "text:line one\n", "text:line two\n"]
        );
    }
}
