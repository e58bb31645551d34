use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The string form is used both as the SQLite column value and on the wire.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Mood {
    Excellent => "excellent",
    Good => "good",
    Neutral => "neutral",
    Poor => "poor",
    Terrible => "terrible",
});

str_enum!(LabCategory {
    Blood => "blood",
    Urine => "urine",
    Stool => "stool",
    Imaging => "imaging",
    Other => "other",
});

str_enum!(LabTestStatus {
    Normal => "normal",
    Abnormal => "abnormal",
    High => "high",
    Low => "low",
    Critical => "critical",
});

impl LabTestStatus {
    /// Anything other than `normal` needs attention.
    pub fn is_out_of_range(&self) -> bool {
        !matches!(self, Self::Normal)
    }
}

str_enum!(MedicalTestCategory {
    Ecg => "ecg",
    Echo => "echo",
    Xray => "xray",
    Ct => "ct",
    Mri => "mri",
    Ultrasound => "ultrasound",
    Endoscopy => "endoscopy",
    Biopsy => "biopsy",
    Other => "other",
});
