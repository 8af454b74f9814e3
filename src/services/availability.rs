use chrono::{Duration, NaiveDate};

use crate::errors::AppError;
use crate::models::{AvailableSlot, BusinessWindow, TimeInterval};

/// Computes free fixed-duration slots for one day.
///
/// `booked` must be sorted by start time. The cursor walks from the window's
/// opening time: each gap before a booked interval yields at most ONE slot
/// (the earliest fit), then the cursor advances past the interval. Overlapping
/// bookings are tolerated by the `max` advance. Once the booked intervals are
/// exhausted, the remainder of the window is filled greedily.
pub fn compute_available_slots(
    day: NaiveDate,
    window: &BusinessWindow,
    duration_minutes: u32,
    booked: &[TimeInterval],
) -> Result<Vec<AvailableSlot>, AppError> {
    if duration_minutes == 0 {
        return Err(AppError::InvalidInterval(
            "slot duration must be positive".to_string(),
        ));
    }

    let duration = Duration::minutes(i64::from(duration_minutes));
    let close = day.and_time(window.close());
    let mut cursor = day.and_time(window.open());
    let mut slots = Vec::new();

    for interval in booked {
        // One slot per gap, clamped so it never spills past closing time.
        let gap_end = interval.start().min(close);
        if cursor + duration <= gap_end {
            slots.push(AvailableSlot::new(cursor, cursor + duration));
        }
        cursor = cursor.max(interval.end());
    }

    while cursor + duration <= close {
        slots.push(AvailableSlot::new(cursor, cursor + duration));
        cursor += duration;
    }

    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 16).unwrap()
    }

    fn window() -> BusinessWindow {
        BusinessWindow::parse("08:00", "18:00").unwrap()
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("2025-06-16 {s}"), "%Y-%m-%d %H:%M").unwrap()
    }

    fn interval(start: &str, end: &str) -> TimeInterval {
        TimeInterval::new(dt(start), dt(end)).unwrap()
    }

    fn slot_times(slots: &[AvailableSlot]) -> Vec<(String, String)> {
        slots
            .iter()
            .map(|s| {
                (
                    s.start.format("%H:%M").to_string(),
                    s.end.format("%H:%M").to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_day_fills_whole_window() {
        let slots = compute_available_slots(day(), &window(), 30, &[]).unwrap();
        assert_eq!(slots.len(), 20);
        assert_eq!(slots[0].start, dt("08:00"));
        assert_eq!(slots[19].end, dt("18:00"));
        assert!(slots.iter().all(|s| s.available));
    }

    #[test]
    fn test_one_slot_per_gap_then_greedy_tail() {
        // Booked 09:00-09:30 and 09:30-10:30. The morning gap emits a single
        // earliest-fit slot; after the last event, the tail fills greedily.
        let booked = [interval("09:00", "09:30"), interval("09:30", "10:30")];
        let slots = compute_available_slots(day(), &window(), 30, &booked).unwrap();

        let times = slot_times(&slots);
        assert_eq!(times[0], ("08:00".to_string(), "08:30".to_string()));
        assert_eq!(times[1], ("10:30".to_string(), "11:00".to_string()));
        assert_eq!(times.last().unwrap(), &("17:30".to_string(), "18:00".to_string()));
        // 1 gap slot + 15 greedy slots from 10:30 to 18:00
        assert_eq!(slots.len(), 16);
    }

    #[test]
    fn test_no_slot_in_too_short_gap() {
        let booked = [interval("08:20", "09:00")];
        let slots = compute_available_slots(day(), &window(), 30, &booked).unwrap();
        // 08:00-08:20 is too short for 30 minutes
        assert_eq!(slots[0].start, dt("09:00"));
    }

    #[test]
    fn test_no_slot_overlaps_booked_interval() {
        let booked = [
            interval("09:00", "10:00"),
            interval("12:00", "14:30"),
            interval("16:00", "17:45"),
        ];
        let slots = compute_available_slots(day(), &window(), 30, &booked).unwrap();
        for slot in &slots {
            let as_interval = TimeInterval::new(slot.start, slot.end).unwrap();
            assert!(slot.start >= day().and_time(window().open()));
            assert!(slot.end <= day().and_time(window().close()));
            for b in &booked {
                assert!(!as_interval.overlaps(b), "{slot:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_overlapping_bookings_are_tolerated() {
        // Second booking starts inside the first; cursor must not move backwards.
        let booked = [interval("09:00", "11:00"), interval("10:00", "10:30")];
        let slots = compute_available_slots(day(), &window(), 30, &booked).unwrap();
        assert_eq!(slots[0].start, dt("08:00"));
        assert_eq!(slots[1].start, dt("11:00"));
    }

    #[test]
    fn test_duration_longer_than_window_yields_nothing() {
        let slots = compute_available_slots(day(), &window(), 11 * 60, &[]).unwrap();
        assert!(slots.is_empty());
    }

    #[test]
    fn test_zero_duration_rejected() {
        let result = compute_available_slots(day(), &window(), 0, &[]);
        assert!(matches!(result, Err(AppError::InvalidInterval(_))));
    }

    #[test]
    fn test_booking_past_close_does_not_spill_slots() {
        let booked = [interval("17:00", "19:00")];
        let slots = compute_available_slots(day(), &window(), 30, &booked).unwrap();
        assert_eq!(slots.last().unwrap().end, dt("17:00"));
    }

    #[test]
    fn test_booking_covering_whole_window() {
        let booked = [interval("07:00", "19:00")];
        let slots = compute_available_slots(day(), &window(), 30, &booked).unwrap();
        assert!(slots.is_empty());
    }
}
