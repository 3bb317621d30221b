//! Provider-side settings: weekly working hours and the services a provider
//! offers.

use crate::utils::error::{MarketError, Result};
use crate::utils::validation::{require_non_empty, Validate};
use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub is_working: bool,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl DaySchedule {
    fn new(is_working: bool, start: (u32, u32), end: (u32, u32)) -> Self {
        Self {
            is_working,
            start: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap_or(NaiveTime::MIN),
        }
    }

    /// 起訖時間為半開區間 `[start, end)`
    pub fn is_open_at(&self, time: NaiveTime) -> bool {
        self.is_working && self.start <= time && time < self.end
    }
}

/// 一週的營業時間，索引從星期一開始
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekSchedule {
    days: [DaySchedule; 7],
}

impl Default for WeekSchedule {
    /// 平日 09:00-18:00 營業，週末預設 10:00-14:00 但休息
    fn default() -> Self {
        let weekday = DaySchedule::new(true, (9, 0), (18, 0));
        let weekend = DaySchedule::new(false, (10, 0), (14, 0));
        Self {
            days: [weekday, weekday, weekday, weekday, weekday, weekend, weekend],
        }
    }
}

pub fn day_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Lunes",
        Weekday::Tue => "Martes",
        Weekday::Wed => "Miércoles",
        Weekday::Thu => "Jueves",
        Weekday::Fri => "Viernes",
        Weekday::Sat => "Sábado",
        Weekday::Sun => "Domingo",
    }
}

impl WeekSchedule {
    pub fn day(&self, day: Weekday) -> &DaySchedule {
        &self.days[day.num_days_from_monday() as usize]
    }

    /// 切換營業狀態，回傳新的狀態
    pub fn toggle_day(&mut self, day: Weekday) -> bool {
        let entry = &mut self.days[day.num_days_from_monday() as usize];
        entry.is_working = !entry.is_working;
        tracing::debug!("{} working: {}", day_label(day), entry.is_working);
        entry.is_working
    }

    pub fn set_hours(&mut self, day: Weekday, start: NaiveTime, end: NaiveTime) -> Result<()> {
        if start >= end {
            return Err(MarketError::validation(format!(
                "{}: start {} must be before end {}",
                day_label(day),
                start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }
        let entry = &mut self.days[day.num_days_from_monday() as usize];
        entry.start = start;
        entry.end = end;
        Ok(())
    }

    pub fn working_days(&self) -> impl Iterator<Item = Weekday> + '_ {
        let mut day = Weekday::Mon;
        (0..7).filter_map(move |_| {
            let current = day;
            day = day.succ();
            self.day(current).is_working.then_some(current)
        })
    }

    pub fn is_open_at(&self, day: Weekday, time: NaiveTime) -> bool {
        self.day(day).is_open_at(time)
    }
}

impl Validate for WeekSchedule {
    fn validate(&self) -> Result<()> {
        let mut day = Weekday::Mon;
        for entry in &self.days {
            if entry.start >= entry.end {
                return Err(MarketError::validation(format!(
                    "{}: start must be before end",
                    day_label(day)
                )));
            }
            day = day.succ();
        }
        Ok(())
    }
}

/// 服務提供者在「我的服務」畫面上架的項目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceOffering {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub rating: f64,
    pub total_reviews: u32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct OfferingList {
    offerings: Vec<ServiceOffering>,
}

impl OfferingList {
    pub fn new(offerings: Vec<ServiceOffering>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(offerings.len());
        for offering in &offerings {
            require_non_empty("name", &offering.name)?;
            if !offering.price.is_finite() || offering.price < 0.0 {
                return Err(MarketError::validation(format!(
                    "offering '{}' has an invalid price",
                    offering.id
                )));
            }
            if !seen.insert(offering.id.as_str()) {
                return Err(MarketError::conflict(format!(
                    "duplicate offering id '{}'",
                    offering.id
                )));
            }
        }
        Ok(Self { offerings })
    }

    pub fn all(&self) -> &[ServiceOffering] {
        &self.offerings
    }

    pub fn active(&self) -> impl Iterator<Item = &ServiceOffering> {
        self.offerings.iter().filter(|o| o.is_active)
    }

    pub fn get(&self, id: &str) -> Result<&ServiceOffering> {
        self.offerings
            .iter()
            .find(|o| o.id == id)
            .ok_or_else(|| MarketError::not_found("ServiceOffering", id))
    }

    /// 切換上架狀態，回傳新的狀態
    pub fn toggle_active(&mut self, id: &str) -> Result<bool> {
        let offering = self
            .offerings
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| MarketError::not_found("ServiceOffering", id))?;
        offering.is_active = !offering.is_active;
        tracing::info!(
            "🔁 Offering {} is now {}",
            offering.id,
            if offering.is_active { "active" } else { "inactive" }
        );
        Ok(offering.is_active)
    }

    pub fn remove(&mut self, id: &str) -> Result<ServiceOffering> {
        let index = self
            .offerings
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| MarketError::not_found("ServiceOffering", id))?;
        Ok(self.offerings.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn offering(id: &str, active: bool) -> ServiceOffering {
        ServiceOffering {
            id: id.to_string(),
            name: format!("Servicio {}", id),
            description: "Reparaciones generales".to_string(),
            category: "Hogar".to_string(),
            price: 300.0,
            rating: 4.8,
            total_reviews: 156,
            is_active: active,
        }
    }

    #[test]
    fn test_default_schedule_is_weekdays_only() {
        let schedule = WeekSchedule::default();
        let days: Vec<_> = schedule.working_days().collect();
        assert_eq!(
            days,
            vec![Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri]
        );
        assert_eq!(schedule.day(Weekday::Sat).start, at(10, 0));
        assert!(schedule.validate().is_ok());
    }

    #[test]
    fn test_toggle_day_flips_working_flag() {
        let mut schedule = WeekSchedule::default();
        assert!(schedule.toggle_day(Weekday::Sat));
        assert!(schedule.is_open_at(Weekday::Sat, at(12, 0)));
        assert!(!schedule.toggle_day(Weekday::Sat));
        assert!(!schedule.is_open_at(Weekday::Sat, at(12, 0)));
    }

    #[test]
    fn test_set_hours_requires_start_before_end() {
        let mut schedule = WeekSchedule::default();
        assert!(schedule.set_hours(Weekday::Mon, at(18, 0), at(9, 0)).is_err());
        assert!(schedule.set_hours(Weekday::Mon, at(12, 0), at(12, 0)).is_err());
        assert_eq!(schedule.day(Weekday::Mon).end, at(18, 0));

        schedule.set_hours(Weekday::Mon, at(10, 0), at(13, 0)).unwrap();
        assert!(schedule.is_open_at(Weekday::Mon, at(10, 0)));
        assert!(!schedule.is_open_at(Weekday::Mon, at(13, 0)));
    }

    #[test]
    fn test_toggle_offering_active() {
        let mut list = OfferingList::new(vec![offering("1", true), offering("3", false)]).unwrap();
        assert_eq!(list.active().count(), 1);

        assert!(list.toggle_active("3").unwrap());
        assert_eq!(list.active().count(), 2);
        assert!(!list.toggle_active("1").unwrap());
        assert!(!list.get("1").unwrap().is_active);

        assert!(matches!(
            list.toggle_active("9"),
            Err(MarketError::NotFoundError { .. })
        ));
    }

    #[test]
    fn test_offering_ids_are_unique() {
        let result = OfferingList::new(vec![offering("1", true), offering("1", false)]);
        assert!(matches!(result, Err(MarketError::ConflictError { .. })));
    }

    #[test]
    fn test_remove_offering() {
        let mut list = OfferingList::new(vec![offering("1", true), offering("2", true)]).unwrap();
        assert_eq!(list.remove("1").unwrap().id, "1");
        assert_eq!(list.all().len(), 1);
        assert!(list.remove("1").is_err());
    }
}
