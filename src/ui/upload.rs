use iced::widget::{button, column, container, text};
use iced::{Alignment, Element, Length};

use crate::Message;

/// Clickable drop zone showing the current selection
pub fn upload_area<'a>(selected: usize, hovering: bool) -> Element<'a, Message> {
    let (icon, title, subtitle) = if hovering {
        ("📥", "Release to add files".to_string(), "PNG files only")
    } else if selected > 0 {
        (
            "✅",
            format!("{} PNG file(s) selected", selected),
            "Click to select different files",
        )
    } else {
        ("📁", "Drop PNG files here".to_string(), "or click to browse")
    };

    let content = column![
        text(icon).size(40),
        text(title).size(22),
        text(subtitle).size(14),
    ]
    .spacing(8)
    .align_x(Alignment::Center);

    let area = button(
        container(content)
            .width(Length::Fill)
            .padding(30)
            .center_x(Length::Fill),
    )
    .on_press(Message::ChooseFiles)
    .width(Length::Fill);

    if hovering {
        area.style(button::primary).into()
    } else {
        area.style(button::secondary).into()
    }
}
