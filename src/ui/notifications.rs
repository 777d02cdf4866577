//! Transient notice area for operation outcomes (import, search, export,
//! drawing errors).

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::config::ConfigResetNotification;
use crate::constants::NOTICE_DURATION_SECS;
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    remaining: f32,
}

/// Queue of notices shown in the bottom-right corner until they expire.
#[derive(Resource, Default)]
pub struct Notices {
    items: Vec<Notice>,
}

impl Notices {
    pub fn push(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.items.push(Notice {
            level,
            text: text.into(),
            remaining: NOTICE_DURATION_SECS,
        });
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(NoticeLevel::Info, text);
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(NoticeLevel::Success, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(NoticeLevel::Error, text);
    }

    pub fn items(&self) -> &[Notice] {
        &self.items
    }

    /// Age every notice by `dt` seconds and drop the expired ones.
    pub fn tick(&mut self, dt: f32) {
        for notice in &mut self.items {
            notice.remaining -= dt;
        }
        self.items.retain(|n| n.remaining > 0.0);
    }

    pub fn dismiss(&mut self, index: usize) {
        if index < self.items.len() {
            self.items.remove(index);
        }
    }
}

pub fn expire_notices(time: Res<Time>, mut notices: ResMut<Notices>) {
    if notices.items.is_empty() {
        return;
    }
    notices.tick(time.delta_secs());
}

pub fn notices_ui(mut contexts: EguiContexts, mut notices: ResMut<Notices>) -> Result {
    if notices.items.is_empty() {
        return Ok(());
    }

    let mut dismissed = None;
    egui::Area::new(egui::Id::new("notice_area"))
        .anchor(egui::Align2::RIGHT_BOTTOM, [-12.0, -12.0])
        .show(contexts.ctx_mut()?, |ui| {
            for (index, notice) in notices.items.iter().enumerate() {
                let color = match notice.level {
                    NoticeLevel::Info => theme::ui::INFO_TEXT,
                    NoticeLevel::Success => theme::ui::SUCCESS_TEXT,
                    NoticeLevel::Error => theme::ui::ERROR_TEXT,
                };
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(360.0);
                    ui.horizontal(|ui| {
                        ui.colored_label(color, &notice.text);
                        if ui.small_button("x").clicked() {
                            dismissed = Some(index);
                        }
                    });
                });
            }
        });

    if let Some(index) = dismissed {
        notices.dismiss(index);
    }
    Ok(())
}

/// Shows a notification when config was reset due to an error
pub fn config_reset_notification_ui(
    mut contexts: EguiContexts,
    mut notification: ResMut<ConfigResetNotification>,
) -> Result {
    if !notification.show {
        return Ok(());
    }

    egui::Window::new("Configuration Reset")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.label("Your configuration was reset to defaults.");
            if let Some(reason) = &notification.reason {
                ui.add_space(4.0);
                ui.colored_label(theme::ui::HINT_TEXT, reason);
            }
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                notification.show = false;
                notification.reason = None;
            }
        });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notices_expire() {
        let mut notices = Notices::default();
        notices.error("boom");
        notices.tick(NOTICE_DURATION_SECS / 2.0);
        assert_eq!(notices.items().len(), 1);
        notices.tick(NOTICE_DURATION_SECS);
        assert!(notices.items().is_empty());
    }

    #[test]
    fn test_notices_keep_order_and_level() {
        let mut notices = Notices::default();
        notices.info("a");
        notices.success("b");
        let levels: Vec<_> = notices.items().iter().map(|n| n.level).collect();
        assert_eq!(levels, vec![NoticeLevel::Info, NoticeLevel::Success]);
    }

    #[test]
    fn test_dismiss_out_of_range_is_ignored() {
        let mut notices = Notices::default();
        notices.info("a");
        notices.dismiss(5);
        assert_eq!(notices.items().len(), 1);
        notices.dismiss(0);
        assert!(notices.items().is_empty());
    }
}
