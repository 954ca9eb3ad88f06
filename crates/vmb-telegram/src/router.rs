use std::{sync::Arc, time::Duration};

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use vmb_core::{
    compose::error_report,
    config::Config,
    domain::ChatId,
    embed::Embed,
    help::{Category, HelpRenderer},
    messaging::port::{deliver, MessagingPort},
};

use crate::{catalog, handlers, TelegramMessenger};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub messenger: Arc<dyn MessagingPort>,
    pub help: HelpRenderer,
    pub categories: Arc<Vec<Category>>,
}

impl AppState {
    pub fn new(cfg: Arc<Config>, messenger: Arc<dyn MessagingPort>) -> Self {
        let help = HelpRenderer::new(
            &cfg.command_prefix,
            &cfg.bot_description,
            cfg.default_embed_colour,
        );
        Self {
            cfg,
            messenger,
            help,
            categories: Arc::new(catalog::categories()),
        }
    }

    /// Fresh embed in the configured colour.
    pub fn default_embed(&self) -> Embed {
        Embed::with_colour(self.cfg.default_embed_colour)
    }

    pub fn owner_chat(&self) -> ChatId {
        ChatId(self.cfg.owner_id)
    }

    /// Log a failure and send its traceback to the owner (embed or file).
    pub async fn report_error(&self, title: &str, filename: &str, log_msg: &str, err: &anyhow::Error) {
        tracing::error!(error = ?err, "{log_msg}");

        let traceback = format!("{log_msg}\n{err:?}");
        let policy = self.cfg.error_report_policy();
        let out = match error_report(self.default_embed(), title, &traceback, filename, &policy) {
            Ok(out) => out,
            Err(e) => {
                tracing::error!(error = %e, "failed to compose error report");
                return;
            }
        };
        if let Err(e) = deliver(self.messenger.as_ref(), self.owner_chat(), &out).await {
            tracing::error!(error = %e, "failed to deliver error report");
        }
    }
}

pub async fn run_polling(cfg: Arc<Config>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.bot_token.clone());

    match bot.get_me().await {
        Ok(me) => tracing::info!(username = %me.username(), "login success"),
        Err(e) => tracing::warn!(error = %e, "get_me failed"),
    }

    let messenger: Arc<dyn MessagingPort> =
        Arc::new(TelegramMessenger::new(bot.clone(), cfg.message_limit));
    let state = Arc::new(AppState::new(cfg, messenger));

    // Tell the owner we are up (best-effort).
    {
        let state = state.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            if let Err(e) = state.messenger.send_text(state.owner_chat(), "Started.").await {
                tracing::warn!(error = %e, "startup notification failed");
            }
        });
    }

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
