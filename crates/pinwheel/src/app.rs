use crate::config::{self, Config, ThemeConfig};
use crate::events::{AppEvent, Reply};
use crate::protocol;
use crate::sys::server::Subscribers;
use async_channel::{Receiver, TrySendError};
use serde::Serialize;
use spokes::events::MenuEvent;
use spokes::menu::{Menu, ShowRequest};

/// Owns the menu and feeds it with everything arriving on the event channel.
pub struct App {
    menu: Menu<ThemeConfig>,
    subscribers: Subscribers,
    /// Client waiting for the visible menu to finish.
    owner: Option<Reply>,
}

impl App {
    pub fn new(config: &Config, subscribers: Subscribers) -> Self {
        Self {
            menu: Menu::new(config.theme, config.menu),
            subscribers,
            owner: None,
        }
    }

    pub fn menu(&self) -> &Menu<ThemeConfig> {
        &self.menu
    }

    /// Processes events until every sender is gone.
    pub fn run(mut self, rx: Receiver<AppEvent>) {
        while let Ok(event) = rx.recv_blocking() {
            self.update(event);
        }
    }

    pub fn update(&mut self, event: AppEvent) {
        match event {
            AppEvent::Show { request, reply } => {
                if self.menu.is_visible() {
                    log::debug!("Replacing visible menu");
                    self.release_owner();
                }

                let ShowRequest { root, options } = *request;
                match self.menu.show(root, options) {
                    Ok(events) => {
                        self.owner = reply;
                        self.dispatch(events);
                    }
                    Err(e) => {
                        log::error!("Failed to show menu: {}", e);
                        if let Some(reply) = &reply {
                            Self::respond(reply, protocol::error_line(&e));
                        }
                    }
                }
            }
            AppEvent::Hide => {
                if self.menu.is_visible() {
                    self.release_owner();
                    self.menu.hide();
                    log::debug!("Menu hidden");
                }
            }
            AppEvent::Frame { reply } => {
                if let Some(reply) = reply {
                    Self::respond_json(&reply, "frame", &self.menu.frame());
                }
            }
            AppEvent::Layout { reply } => {
                if let Some(reply) = reply {
                    Self::respond_json(&reply, "layout", &self.menu.node_layouts());
                }
            }
            AppEvent::Input(input) => {
                let events = self.menu.handle(input);
                self.dispatch(events);
            }
            AppEvent::ConfigReload => match config::load_config() {
                Ok(new_config) => {
                    self.apply_config(&new_config);
                    log::info!("Configuration reloaded");
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
        }
    }

    pub fn apply_config(&mut self, config: &Config) {
        self.menu.set_settings(config.menu);
        self.menu.set_theme(config.theme);
    }

    /// Broadcasts `events` and closes the menu once it is done.
    fn dispatch(&mut self, events: Vec<MenuEvent>) {
        let mut done = false;
        for event in events {
            done |= matches!(event, MenuEvent::Select(_) | MenuEvent::Cancel);
            self.broadcast(&event.to_string());
        }

        if done {
            self.owner = None;
            self.menu.hide();
        }
    }

    /// Tells the client of the visible menu that it is gone without a selection.
    fn release_owner(&mut self) {
        if let Some(owner) = self.owner.take() {
            Self::respond(&owner, MenuEvent::Cancel.to_string());
        }
    }

    fn respond(reply: &Reply, line: String) {
        log::debug!("=> {}", line);
        if let Err(e) = reply.try_send(line) {
            log::warn!("Failed to answer client: {}", e);
        }
    }

    fn respond_json(reply: &Reply, name: &str, value: &impl Serialize) {
        match serde_json::to_string(value) {
            Ok(json) => Self::respond(reply, format!("{} {}", name, json)),
            Err(e) => Self::respond(reply, protocol::error_line(&e)),
        }
    }

    fn broadcast(&self, line: &str) {
        log::debug!("-> {}", line);
        self.subscribers
            .lock()
            .retain(|subscriber| match subscriber.try_send(line.to_string()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    log::warn!("Client is not reading, dropping '{}'", line);
                    true
                }
                Err(TrySendError::Closed(_)) => false,
            });
    }
}
