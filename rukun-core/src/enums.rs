//! Enum types for Rukun entities
//!
//! Every lifecycle and category field travels as a snake_case string. The
//! wire spelling is declared once per variant and drives serde, `Display`
//! and `FromStr` alike.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error when parsing an unknown wire value into one of the enums below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}

/// Declares a string-backed enum with its wire spelling.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// All variants in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire spelling of this variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(ParseEnumError {
                        kind: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

// ============================================================================
// PEOPLE AND HOUSES
// ============================================================================

wire_enum! {
    /// Role of a user within the neighborhood.
    Role {
        Resident => "resident",
        Admin => "admin",
        Security => "security",
    }
}

wire_enum! {
    /// Occupancy state of a house.
    HouseStatus {
        Occupied => "occupied",
        Vacant => "vacant",
        UnderConstruction => "under_construction",
    }
}

// ============================================================================
// BILLING
// ============================================================================

wire_enum! {
    /// Kind of charge a bill represents.
    BillType {
        MonthlyFee => "monthly_fee",
        Utilities => "utilities",
        Maintenance => "maintenance",
        Parking => "parking",
        Security => "security",
    }
}

wire_enum! {
    /// Lifecycle of a bill. Transitions are decided by the server.
    BillStatus {
        Pending => "pending",
        Paid => "paid",
        Overdue => "overdue",
    }
}

wire_enum! {
    PaymentMethod {
        BankTransfer => "bank_transfer",
        CreditCard => "credit_card",
        EWallet => "e_wallet",
        Cash => "cash",
    }
}

wire_enum! {
    PaymentStatus {
        Pending => "pending",
        Completed => "completed",
        Failed => "failed",
        Refunded => "refunded",
    }
}

// ============================================================================
// REPORTS AND DOCUMENTS
// ============================================================================

wire_enum! {
    ReportCategory {
        Maintenance => "maintenance",
        Security => "security",
        Noise => "noise",
        Cleanliness => "cleanliness",
        Utilities => "utilities",
        Other => "other",
    }
}

wire_enum! {
    /// Urgency of a resident report.
    ReportPriority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
}

wire_enum! {
    /// Lifecycle of a report: submitted, picked up, then resolved or closed.
    ReportStatus {
        Submitted => "submitted",
        InProgress => "in_progress",
        Resolved => "resolved",
        Closed => "closed",
    }
}

wire_enum! {
    /// Letter or permit a resident can request from the administration.
    DocumentType {
        RecommendationLetter => "recommendation_letter",
        ResidenceCertificate => "residence_certificate",
        ParkingPermit => "parking_permit",
        GuestPass => "guest_pass",
        ComplaintLetter => "complaint_letter",
    }
}

wire_enum! {
    DocumentStatus {
        Draft => "draft",
        Submitted => "submitted",
        Approved => "approved",
        Rejected => "rejected",
    }
}

// ============================================================================
// ANNOUNCEMENTS
// ============================================================================

wire_enum! {
    AnnouncementCategory {
        General => "general",
        Emergency => "emergency",
        Maintenance => "maintenance",
        Event => "event",
        Reminder => "reminder",
    }
}

wire_enum! {
    AnnouncementPriority {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

wire_enum! {
    /// Who an announcement is addressed to. `SpecificBlocks` pairs with a
    /// list of block numbers.
    TargetAudience {
        All => "all",
        Residents => "residents",
        Owners => "owners",
        SpecificBlocks => "specific_blocks",
    }
}

// ============================================================================
// CCTV
// ============================================================================

wire_enum! {
    CameraType {
        Entrance => "entrance",
        Parking => "parking",
        Playground => "playground",
        Corridor => "corridor",
        Exit => "exit",
    }
}

wire_enum! {
    CameraQuality {
        Hd => "720p",
        FullHd => "1080p",
        UltraHd => "4k",
    }
}

// ============================================================================
// POLLS
// ============================================================================

wire_enum! {
    PollType {
        SingleChoice => "single_choice",
        MultipleChoice => "multiple_choice",
        YesNo => "yes_no",
    }
}

wire_enum! {
    PollStatus {
        Draft => "draft",
        Active => "active",
        Closed => "closed",
    }
}
