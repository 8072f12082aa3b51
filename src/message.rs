use chrono::NaiveDate;

use crate::domain::{Notification, UpcomingEvent};

const DISPLAY_DATE: &str = "%Y-%m-%d";
const DATA_SOURCE: &str = "2026 annual macro calendar";
const REMINDER_RULE: &str = "reminders go out 2 days and 1 day before each event";

/// Builds the title and HTML body for a batch of upcoming events.
///
/// Events are listed by `(days_until, date)` regardless of input order.
pub fn render(events: &[UpcomingEvent], today: NaiveDate) -> Notification {
    let today = today.format(DISPLAY_DATE).to_string();
    let title = format!("[{}] Macro event reminder - {today}", events.len());

    let mut content = format!("<h2>Macro calendar reminder {today}</h2>");
    if events.is_empty() {
        content.push_str("<p>No upcoming events in the next 2 days.</p>");
        push_footer(&mut content);
        return Notification { title, content };
    }

    let mut ordered = events.to_vec();
    crate::schedule::sort_upcoming(&mut ordered);

    content.push_str("<p><strong>Upcoming important events:</strong></p>");
    content.push_str("<ul>");
    for event in &ordered {
        push_item(&mut content, event);
    }
    content.push_str("</ul>");
    push_footer(&mut content);

    Notification { title, content }
}

fn push_item(content: &mut String, event: &UpcomingEvent) {
    let urgency = event.urgency();
    content.push_str(&format!(
        "<li>{marker} <strong>{date}</strong> ({label})<br>\
         <span style='color:{color};'>{description}</span></li>",
        marker = urgency.marker(),
        date = event.date.format(DISPLAY_DATE),
        label = urgency.label(),
        color = urgency.color(),
        description = escape_html(&event.event),
    ));
}

fn push_footer(content: &mut String) {
    content.push_str(&format!(
        "<p><small>Data source: {DATA_SOURCE}<br>Reminder rule: {REMINDER_RULE}</small></p>"
    ));
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
