//! `toron turn`: One user turn, optionally followed by its reply.

use toron_config::AppConfig;
use toron_context::ContextMediator;

pub fn run(
    config: &AppConfig,
    message: &str,
    reply: Option<&str>,
    pretty: bool,
) -> toron_core::Result<()> {
    let mut mediator = ContextMediator::new(config);

    super::emit(&mediator.begin_turn(message), pretty)?;
    if let Some(reply) = reply {
        super::emit(&mediator.update_after_llm(reply), pretty)?;
    }
    Ok(())
}
