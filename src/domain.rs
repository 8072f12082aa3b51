use chrono::NaiveDate;

// Domain data structures shared across modules.

/// One calendar entry: the raw date text and its description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventRecord {
    pub date: String,
    pub event: String,
}

/// An event that falls inside the reminder window, decorated with its offset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpcomingEvent {
    pub date: NaiveDate,
    pub raw_date: String,
    pub event: String,
    pub days_until: i64,
}

impl UpcomingEvent {
    pub fn urgency(&self) -> Urgency {
        if self.days_until <= 1 {
            Urgency::Tomorrow
        } else {
            Urgency::InTwoDays
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Urgency {
    Tomorrow,
    InTwoDays,
}

impl Urgency {
    pub fn label(&self) -> &'static str {
        match self {
            Urgency::Tomorrow => "tomorrow",
            Urgency::InTwoDays => "in 2 days",
        }
    }

    pub fn marker(&self) -> &'static str {
        match self {
            Urgency::Tomorrow => "🔴",
            Urgency::InTwoDays => "🔵",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Urgency::Tomorrow => "#E53935",
            Urgency::InTwoDays => "#1E90FF",
        }
    }
}

/// Rendered message, ready to hand to the push service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub content: String,
}
