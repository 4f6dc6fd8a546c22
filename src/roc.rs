//! Date/time helpers for the Republic of China (ROC / Minguo) calendar used by
//! the judicial schedule feed.
//!
//! The feed encodes session dates and times as bare digit strings:
//!   - **`dudt`**: `YYYMMDD`, a 3-digit ROC year followed by month and day,
//!     e.g. `1141223` for 2025-12-23.
//!   - **`dutm`**: up to 4 digits of `HHMM`, e.g. `1030`.
//!
//! ROC year 1 is 1912 CE, so the Gregorian year is the ROC year plus
//! [`ROC_EPOCH_OFFSET`].

pub const ROC_EPOCH_OFFSET: i32 = 1911;

/// Format an ROC date and time as `YYYY-MM-DD HH:MM (ROC YYY/MM/DD)`.
///
/// Returns an empty string if `dudt` is missing, is not exactly 7 characters,
/// or its year segment is not numeric. Month and day are displayed verbatim.
///
/// The time is left-padded with `'0'` to 4 characters before being split, so
/// `"930"` becomes `09:30` and `""` becomes `00:00`. Anything past the fourth
/// character is dropped.
pub fn format_roc_datetime(dudt: Option<&str>, dutm: Option<&str>) -> String {
    let Some(dudt) = dudt else {
        return String::new();
    };

    let date: Vec<char> = dudt.chars().collect();
    if date.len() != 7 {
        return String::new();
    }

    let Some(roc_year) = parse_roc_year(&date[0..3]) else {
        return String::new();
    };
    let year = roc_year + ROC_EPOCH_OFFSET;
    let mm: String = date[3..5].iter().collect();
    let dd: String = date[5..7].iter().collect();

    let time = pad_time(dutm.unwrap_or(""));
    let hh: String = time[0..2].iter().collect();
    let min: String = time[2..4].iter().collect();

    format!("{year}-{mm}-{dd} {hh}:{min} (ROC {roc_year}/{mm}/{dd})")
}

fn parse_roc_year(digits: &[char]) -> Option<i32> {
    if !digits.iter().all(char::is_ascii_digit) {
        return None;
    }
    digits.iter().collect::<String>().parse().ok()
}

fn pad_time(dutm: &str) -> Vec<char> {
    let mut time: Vec<char> = dutm.chars().collect();
    if time.len() < 4 {
        let mut padded = vec!['0'; 4 - time.len()];
        padded.append(&mut time);
        time = padded;
    }
    time
}
