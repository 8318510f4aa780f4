pub mod csv;
pub mod json;
pub mod table;

use chrono::{Duration, NaiveTime};

/// "3", or "10:00-11:00" when the shift start is known.
pub fn hour_label(hour_index: usize, shift_start: Option<NaiveTime>) -> String {
    match shift_start {
        Some(start) => {
            let from = start + Duration::hours(hour_index as i64);
            let to = from + Duration::hours(1);
            format!("{}-{}", from.format("%H:%M"), to.format("%H:%M"))
        }
        None => (hour_index + 1).to_string(),
    }
}

/// Whole numbers print without decimals, fractional ones at two places.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_hours_with_and_without_clock() {
        assert_eq!(hour_label(0, None), "1");
        assert_eq!(hour_label(8, None), "9");
        let start = NaiveTime::from_hms_opt(9, 0, 0);
        assert_eq!(hour_label(0, start), "09:00-10:00");
        assert_eq!(hour_label(15, start), "00:00-01:00");
    }

    #[test]
    fn formats_whole_and_fractional_numbers() {
        assert_eq!(format_number(150.0), "150");
        assert_eq!(format_number(4.5), "4.50");
        assert_eq!(format_number(4.567), "4.57");
    }
}
