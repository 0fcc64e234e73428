//! Store settings: the single configuration record owned by the store admin.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::events::{DomainEvent, StoreEvent};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashSale {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// Flash-sale form fields as submitted by the admin page.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashSaleForm {
    pub start_date: Option<String>,
    pub start_time: Option<String>,
    pub end_date: Option<String>,
    pub end_time: Option<String>,
    #[serde(default)]
    pub is_active: Option<serde_json::Value>,
}

impl FlashSale {
    /// A bound is only set when both its date and its time are present.
    pub fn from_form(form: &FlashSaleForm) -> Result<Self, ScheduleError> {
        let start_time = combine(form.start_date.as_deref(), form.start_time.as_deref())?;
        let end_time = combine(form.end_date.as_deref(), form.end_time.as_deref())?;
        if let (Some(start), Some(end)) = (start_time, end_time) {
            if end < start { return Err(ScheduleError::EndBeforeStart); }
        }
        let is_active = match &form.is_active {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => matches!(s.as_str(), "on" | "true"),
            _ => false,
        };
        Ok(Self { start_time, end_time, is_active })
    }

    /// Active and inside whichever bounds are set.
    pub fn is_running(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.start_time.map_or(true, |start| now >= start)
            && self.end_time.map_or(true, |end| now <= end)
    }
}

fn combine(date: Option<&str>, time: Option<&str>) -> Result<Option<DateTime<Utc>>, ScheduleError> {
    let (Some(date), Some(time)) = (date.filter(|d| !d.trim().is_empty()), time.filter(|t| !t.trim().is_empty())) else {
        return Ok(None);
    };
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| ScheduleError::InvalidDate(date.to_string()))?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time.trim(), "%H:%M"))
        .map_err(|_| ScheduleError::InvalidTime(time.to_string()))?;
    Ok(Some(NaiveDateTime::new(date, time).and_utc()))
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StoreSettings {
    id: String,
    gallery_images: Vec<String>,
    flash_sale: FlashSale,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl StoreSettings {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), gallery_images: vec![], flash_sale: FlashSale::default(), events: vec![] }
    }

    pub fn restore(id: impl Into<String>, gallery_images: Vec<String>, flash_sale: FlashSale) -> Self {
        Self { id: id.into(), gallery_images, flash_sale, events: vec![] }
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn gallery_images(&self) -> &[String] { &self.gallery_images }
    pub fn flash_sale(&self) -> &FlashSale { &self.flash_sale }

    pub fn add_gallery_image(&mut self, filename: &str) -> Result<(), GalleryError> {
        let filename = filename.trim();
        if filename.is_empty() { return Err(GalleryError::EmptyName); }
        self.gallery_images.push(filename.to_string());
        self.raise_event(DomainEvent::Store(StoreEvent::GalleryImageAdded { filename: filename.to_string() }));
        Ok(())
    }

    /// Removes every occurrence of `filename`; returns how many were removed.
    pub fn remove_gallery_image(&mut self, filename: &str) -> usize {
        let before = self.gallery_images.len();
        self.gallery_images.retain(|img| img != filename);
        let removed = before - self.gallery_images.len();
        if removed > 0 {
            self.raise_event(DomainEvent::Store(StoreEvent::GalleryImageRemoved { filename: filename.to_string() }));
        }
        removed
    }

    pub fn schedule_flash_sale(&mut self, flash_sale: FlashSale) {
        self.raise_event(DomainEvent::Store(StoreEvent::FlashSaleScheduled {
            start_time: flash_sale.start_time,
            end_time: flash_sale.end_time,
            is_active: flash_sale.is_active,
        }));
        self.flash_sale = flash_sale;
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid time {0:?}, expected HH:MM")]
    InvalidTime(String),
    #[error("end is before start")]
    EndBeforeStart,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GalleryError {
    #[error("empty image name")]
    EmptyName,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn form(start: (&str, &str), end: (&str, &str), active: serde_json::Value) -> FlashSaleForm {
        FlashSaleForm {
            start_date: Some(start.0.into()),
            start_time: Some(start.1.into()),
            end_date: Some(end.0.into()),
            end_time: Some(end.1.into()),
            is_active: Some(active),
        }
    }

    #[test]
    fn test_flash_sale_form() {
        let sale = FlashSale::from_form(&form(("2026-11-01", "09:00"), ("2026-11-02", "21:30:00"), "on".into())).unwrap();
        assert_eq!(sale.start_time, Some(Utc.with_ymd_and_hms(2026, 11, 1, 9, 0, 0).unwrap()));
        assert_eq!(sale.end_time, Some(Utc.with_ymd_and_hms(2026, 11, 2, 21, 30, 0).unwrap()));
        assert!(sale.is_active);
        assert!(sale.is_running(Utc.with_ymd_and_hms(2026, 11, 1, 12, 0, 0).unwrap()));
        assert!(!sale.is_running(Utc.with_ymd_and_hms(2026, 11, 3, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_flash_sale_partial_bounds() {
        let f = FlashSaleForm { start_date: Some("2026-11-01".into()), end_time: Some("10:00".into()), ..Default::default() };
        let sale = FlashSale::from_form(&f).unwrap();
        assert_eq!(sale, FlashSale::default());
        assert!(!sale.is_running(Utc::now()));
    }

    #[test]
    fn test_flash_sale_rejects_bad_input() {
        let backwards = form(("2026-11-02", "09:00"), ("2026-11-01", "09:00"), true.into());
        assert_eq!(FlashSale::from_form(&backwards), Err(ScheduleError::EndBeforeStart));
        let garbage = form(("tomorrow", "09:00"), ("2026-11-01", "09:00"), true.into());
        assert!(matches!(FlashSale::from_form(&garbage), Err(ScheduleError::InvalidDate(_))));
    }

    #[test]
    fn test_gallery() {
        let mut settings = StoreSettings::new("default");
        settings.add_gallery_image("a.png").unwrap();
        settings.add_gallery_image("b.png").unwrap();
        settings.add_gallery_image("a.png").unwrap();
        assert_eq!(settings.add_gallery_image("  "), Err(GalleryError::EmptyName));
        assert_eq!(settings.remove_gallery_image("a.png"), 2);
        assert_eq!(settings.gallery_images(), ["b.png".to_string()]);
        assert_eq!(settings.take_events().len(), 4);
    }
}
