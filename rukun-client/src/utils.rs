//! Formatting, validation and rate-limiting helpers for the UI layer.
//!
//! Formatting follows Indonesian conventions: `.` groups thousands, month
//! names are Indonesian and times use `HH.MM`.

use chrono::{Datelike, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use rukun_core::Rupiah;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

const MONTHS_LONG: [&str; 12] = [
    "Januari", "Februari", "Maret", "April", "Mei", "Juni", "Juli", "Agustus", "September",
    "Oktober", "November", "Desember",
];

const MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

static EMAIL_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

/// Indonesian mobile numbers: `08`, `628` or `+628` prefix.
static PHONE_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^(\+62|62|0)8[1-9][0-9]{6,11}$").ok());

// ============================================================================
// FORMATTING
// ============================================================================

/// `50000` -> `Rp 50.000`.
pub fn format_currency(amount: Rupiah) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    if amount < 0 {
        format!("-Rp {}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}

/// `19 Oktober 2026`.
pub fn format_date(date: &impl Datelike) -> String {
    format!(
        "{} {} {}",
        date.day(),
        MONTHS_LONG[date.month0() as usize],
        date.year()
    )
}

/// `19 Okt 2026, 14.30`.
pub fn format_date_time<T: Datelike + Timelike>(at: &T) -> String {
    format!(
        "{} {} {}, {:02}.{:02}",
        at.day(),
        MONTHS_SHORT[at.month0() as usize],
        at.year(),
        at.hour(),
        at.minute()
    )
}

// ============================================================================
// VALIDATION
// ============================================================================

pub fn is_valid_email(email: &str) -> bool {
    (*EMAIL_RE).as_ref().is_some_and(|re| re.is_match(email))
}

pub fn is_valid_phone(phone: &str) -> bool {
    (*PHONE_RE).as_ref().is_some_and(|re| re.is_match(phone))
}

// ============================================================================
// BADGE COLORS
// ============================================================================

/// Badge color for any lifecycle status wire value.
pub fn status_color(status: &str) -> &'static str {
    match status {
        "paid" | "completed" | "resolved" | "approved" | "active" => "green",
        "pending" => "yellow",
        "overdue" | "failed" | "rejected" => "red",
        "submitted" => "blue",
        "in_progress" => "orange",
        "closed" | "draft" => "gray",
        _ => "gray",
    }
}

pub fn priority_color(priority: &str) -> &'static str {
    match priority {
        "low" => "green",
        "medium" => "yellow",
        "high" => "orange",
        "urgent" => "red",
        _ => "gray",
    }
}

// ============================================================================
// RATE LIMITING
// ============================================================================

/// Runs only the last action submitted within `delay` of the previous one.
///
/// Each [`Debouncer::call`] cancels the pending action and schedules the new
/// one `delay` later. Requires a Tokio runtime.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn call<F>(&self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        let delay = self.delay;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        }));
    }

    /// Drop the pending action, if any.
    pub fn cancel(&self) {
        if let Some(previous) = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            previous.abort();
        }
    }
}

/// Runs an action at most once per `interval`; calls in between are dropped.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_call: Mutex::new(None),
        }
    }

    /// Returns whether `action` ran.
    pub fn call<F: FnOnce()>(&self, action: F) -> bool {
        let now = Instant::now();
        {
            let mut last_call = self.last_call.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(last) = *last_call {
                if now.saturating_duration_since(last) < self.interval {
                    return false;
                }
            }
            *last_call = Some(now);
        }
        action();
        true
    }
}
