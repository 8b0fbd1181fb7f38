use super::{CommandOutput, format_ticket_detail, open_app};
use crate::config::Config;
use crate::detail::DetailState;
use crate::error::{DocketError, Result};
use crate::navigation::Route;
use crate::types::TicketId;

/// Display one ticket
pub async fn cmd_show(config: &Config, id: &str, output_json: bool) -> Result<()> {
    let href = Route::Detail(TicketId::new(id)).path();
    let app = open_app(config, &href).await;

    let Some(state) = app.detail_state() else {
        return Err(DocketError::InvalidRoute(href));
    };
    match state {
        DetailState::Loaded(ticket) => CommandOutput::new(serde_json::to_value(ticket)?)
            .with_text(format_ticket_detail(ticket))
            .print(output_json),
        DetailState::NotFound => Err(DocketError::TicketNotFound(id.to_string())),
        DetailState::Failed { message, .. } => Err(DocketError::Other(message.to_string())),
        DetailState::Loading => Err(DocketError::Other("ticket query did not complete".to_string())),
    }
}
