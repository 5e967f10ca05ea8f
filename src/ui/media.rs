//! Inline viewer for pre-rendered media.
//!
//! Still images are drawn from disk. GIFs and videos are drawn one decoded
//! frame at a time, with a pause control and a hand-off to the system player.

use iced::widget::{button, column, container, image::Handle, row, text, Image};
use iced::{Alignment, Element, Length};
use std::path::Path;
use std::process::Command;
use tracing::{info, warn};

use crate::media::{Animation, Playback, Viewer};
use crate::state::data::MediaItem;
use crate::Message;

/// Build the viewer for one media item, dispatched on its kind
pub fn view<'a>(item: &'a MediaItem, playback: &'a Playback) -> Element<'a, Message> {
    let viewer = Viewer::for_kind(item.kind);
    if !viewer.needs_frames() {
        return column![
            Image::new(Handle::from_path(&item.path)).width(Length::Fill),
            text(format!("Media: {}", item.name)).size(14),
        ]
        .spacing(8)
        .into();
    }

    match playback {
        Playback::Ready(animation) if animation.path() == item.path => {
            player(item, viewer, animation)
        }
        Playback::Failed { path, reason } if *path == item.path => card(
            item,
            viewer,
            text(format!("Could not decode {}: {}", item.name, reason)).size(14),
        ),
        _ => card(item, viewer, text(format!("Decoding {}...", item.name)).size(14)),
    }
}

fn player<'a>(
    item: &'a MediaItem,
    viewer: Viewer,
    animation: &'a Animation,
) -> Element<'a, Message> {
    let (width, height) = animation.size();

    let mut controls = row![
        button(if animation.is_paused() { "▶ Play" } else { "⏸ Pause" })
            .on_press(Message::TogglePlayback)
            .padding(8),
        text(format!(
            "Frame {}/{}",
            animation.index() + 1,
            animation.frame_count()
        ))
        .size(14),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    if viewer == Viewer::Video {
        controls = controls.push(open_button(item));
    }

    column![
        Image::new(animation.frame().handle.clone()).width(Length::Fill),
        controls,
        text(format!("Media: {} ({}x{})", item.name, width, height)).size(14),
    ]
    .spacing(8)
    .into()
}

/// Placeholder shown while frames are decoding or after decoding failed
fn card<'a>(
    item: &'a MediaItem,
    viewer: Viewer,
    message: iced::widget::Text<'a>,
) -> Element<'a, Message> {
    let icon = if viewer == Viewer::Video { "🎬" } else { "🖼️" };
    let mut body = column![text(format!("{} {}", icon, item.name)).size(20), message].spacing(12);

    if viewer == Viewer::Video {
        body = body.push(open_button(item));
    }

    container(body)
        .padding(20)
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
}

fn open_button(item: &MediaItem) -> iced::widget::Button<'_, Message> {
    button("Open in player")
        .on_press(Message::OpenMedia(item.path.clone()))
        .padding(8)
}

/// Open a file with the platform's default application
pub fn open_externally(path: &Path) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    let mut cmd = Command::new("open");

    #[cfg(target_os = "windows")]
    let mut cmd = {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]);
        cmd
    };

    #[cfg(all(unix, not(target_os = "macos")))]
    let mut cmd = Command::new("xdg-open");

    let mut child = cmd.arg(path).spawn()?;
    info!("Opened {} in external player", path.display());

    // Reap the opener so it doesn't linger as a zombie
    std::thread::spawn(move || {
        if let Err(e) = child.wait() {
            warn!("External player exited abnormally: {}", e);
        }
    });

    Ok(())
}
