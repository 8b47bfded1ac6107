use serde::{Deserialize, Serialize};

use crate::store::DataError;

/// Macro to generate enum with wire-string serde + as_str + FromStr.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DataError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DataError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// `rescheduled` is persisted transiently by admin-side reschedules; the
// patient app only ever filters on the first three values.
str_enum!(AppointmentStatus {
    Upcoming => "upcoming",
    Completed => "completed",
    Cancelled => "cancelled",
    Rescheduled => "rescheduled",
});

str_enum!(NotificationType {
    Cancelled => "cancelled",
    Rescheduled => "rescheduled",
});

str_enum!(ArticleCategory {
    Newest => "Newest",
    Health => "Health",
    Lifestyle => "Lifestyle",
    Cancer => "Cancer",
});
