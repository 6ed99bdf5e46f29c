use chrono::{DateTime, Utc};
use clap::ValueEnum;

use crate::error::FeedError;
use crate::model::Distance;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Locale {
    #[default]
    En,
    Pt,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Pt => "pt",
        }
    }

    pub fn timeline_title(self) -> &'static str {
        match self {
            Locale::En => "Timeline",
            Locale::Pt => "Linha do tempo",
        }
    }

    pub fn anonymous_label(self) -> &'static str {
        match self {
            Locale::En => "anonymous",
            Locale::Pt => "anônimo",
        }
    }

    pub fn feed_error(self, error: FeedError) -> &'static str {
        match (self, error) {
            (Locale::En, FeedError::Connection) => {
                "There was a connection error while loading posts. Check that you are connected to the internet."
            }
            (Locale::En, FeedError::Unexpected) => "An unexpected error occurred while loading posts.",
            (Locale::Pt, FeedError::Connection) => {
                "Houve um erro de conexão ao carregar os posts. Verifique se está conectado à internet."
            }
            (Locale::Pt, FeedError::Unexpected) => {
                "Um erro inesperado ocorreu ao carregar os posts."
            }
        }
    }

    pub fn distance(self, distance: Distance) -> &'static str {
        match (self, distance) {
            (Locale::En, Distance::Here) => "here",
            (Locale::En, Distance::VeryClose) => "very close",
            (Locale::En, Distance::Close) => "close",
            (Locale::En, Distance::Far) => "far",
            (Locale::En, Distance::VeryFar) => "very far",
            (Locale::Pt, Distance::Here) => "aqui",
            (Locale::Pt, Distance::VeryClose) => "muito perto",
            (Locale::Pt, Distance::Close) => "perto",
            (Locale::Pt, Distance::Far) => "longe",
            (Locale::Pt, Distance::VeryFar) => "muito longe",
            (_, Distance::Unknown) => "",
        }
    }

    /// Humanized age of `at`, e.g. "3 hours ago".
    pub fn relative_time(self, at: DateTime<Utc>, now: DateTime<Utc>) -> String {
        let secs = (now - at).num_seconds().max(0) as f64;
        let minutes = secs / 60.0;
        let hours = minutes / 60.0;
        let days = hours / 24.0;

        let span = if secs < 45.0 {
            Span::Seconds
        } else if secs < 90.0 {
            Span::One(Unit::Minute)
        } else if minutes < 45.0 {
            Span::Many(Unit::Minute, minutes.round() as u64)
        } else if minutes < 90.0 {
            Span::One(Unit::Hour)
        } else if hours < 22.0 {
            Span::Many(Unit::Hour, hours.round() as u64)
        } else if hours < 36.0 {
            Span::One(Unit::Day)
        } else if days < 26.0 {
            Span::Many(Unit::Day, days.round() as u64)
        } else if days < 45.0 {
            Span::One(Unit::Month)
        } else if days < 320.0 {
            Span::Many(Unit::Month, (days / 30.4).round() as u64)
        } else if days < 548.0 {
            Span::One(Unit::Year)
        } else {
            Span::Many(Unit::Year, (days / 365.25).round().max(2.0) as u64)
        };

        match self {
            Locale::En => span.english(),
            Locale::Pt => span.portuguese(),
        }
    }
}

#[derive(Clone, Copy)]
enum Unit {
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

enum Span {
    Seconds,
    One(Unit),
    Many(Unit, u64),
}

impl Span {
    fn english(&self) -> String {
        let unit = |u: Unit| match u {
            Unit::Minute => ("a minute", "minutes"),
            Unit::Hour => ("an hour", "hours"),
            Unit::Day => ("a day", "days"),
            Unit::Month => ("a month", "months"),
            Unit::Year => ("a year", "years"),
        };
        match *self {
            Span::Seconds => "a few seconds ago".to_string(),
            Span::One(u) => format!("{} ago", unit(u).0),
            Span::Many(u, n) => format!("{n} {} ago", unit(u).1),
        }
    }

    fn portuguese(&self) -> String {
        let unit = |u: Unit| match u {
            Unit::Minute => ("um minuto", "minutos"),
            Unit::Hour => ("uma hora", "horas"),
            Unit::Day => ("um dia", "dias"),
            Unit::Month => ("um mês", "meses"),
            Unit::Year => ("um ano", "anos"),
        };
        match *self {
            Span::Seconds => "há poucos segundos".to_string(),
            Span::One(u) => format!("há {}", unit(u).0),
            Span::Many(u, n) => format!("há {n} {}", unit(u).1),
        }
    }
}
