use async_channel::Sender;
use spokes::events::InputEvent;
use spokes::menu::ShowRequest;

/// Outgoing line queue of one connected client.
pub type Reply = Sender<String>;

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// `reply` is told when the menu fails to open or is replaced by another one.
    Show {
        request: Box<ShowRequest>,
        reply: Option<Reply>,
    },
    Hide,
    /// Asks for the render snapshot of the current state.
    Frame { reply: Option<Reply> },
    /// Asks for the static layouts of all items.
    Layout { reply: Option<Reply> },
    Input(InputEvent),
    ConfigReload,
}

impl AppEvent {
    /// Routes the answers to this event to `client`.
    pub fn reply_to(mut self, client: &Reply) -> Self {
        match &mut self {
            Self::Show { reply, .. } | Self::Frame { reply } | Self::Layout { reply } => {
                *reply = Some(client.clone());
            }
            _ => {}
        }
        self
    }
}
