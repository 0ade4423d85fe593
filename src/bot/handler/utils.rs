use chrono::Duration;

use crate::bot::api::BASE_UNIT_SCALE;

/* Common utilites for handlers. */

const MINUTES_IN_DAY: i64 = 1440;
const MINUTES_IN_ALMOST_TWO_DAYS: i64 = 2520;
// Months are counted as 30 days
const MINUTES_IN_MONTH: i64 = 43200;

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

// Rounds to the nearest whole number of units, halves rounding up.
fn round_to(millis: i64, unit_millis: i64) -> i64 {
    (millis as f64 / unit_millis as f64).round() as i64
}

/* Describes a duration in words, e.g. "half a minute", "about 3 hours", "2 days".
 * Used for telling users how long their cooldown still lasts.
 */
pub fn format_distance(duration: Duration) -> String {
    let millis = duration.num_milliseconds().max(0);
    let seconds = round_to(millis, 1000);
    let minutes = round_to(millis, 60_000);

    if minutes < 2 {
        return match seconds {
            s if s < 5 => "less than 5 seconds".to_string(),
            s if s < 10 => "less than 10 seconds".to_string(),
            s if s < 20 => "less than 20 seconds".to_string(),
            s if s < 40 => "half a minute".to_string(),
            s if s < 60 => "less than a minute".to_string(),
            _ => "1 minute".to_string(),
        };
    }

    match minutes {
        m if m < 45 => format!("{m} minutes"),
        m if m < 90 => "about 1 hour".to_string(),
        m if m < MINUTES_IN_DAY => format!("about {} hours", round_to(m, 60)),
        m if m < MINUTES_IN_ALMOST_TWO_DAYS => "1 day".to_string(),
        m if m < MINUTES_IN_MONTH => plural(round_to(m, MINUTES_IN_DAY), "day"),
        m if m < 2 * MINUTES_IN_MONTH => {
            format!("about {}", plural(round_to(m, MINUTES_IN_MONTH), "month"))
        }
        m if m / MINUTES_IN_MONTH < 12 => plural(round_to(m, MINUTES_IN_MONTH), "month"),
        m => describe_years(m / MINUTES_IN_MONTH),
    }
}

// A year and a quarter is "about", up to three quarters "over", beyond that "almost" the next.
fn describe_years(months: i64) -> String {
    let years = months / 12;
    match months % 12 {
        rest if rest < 3 => format!("about {}", plural(years, "year")),
        rest if rest < 9 => format!("over {}", plural(years, "year")),
        _ => format!("almost {}", plural(years + 1, "year")),
    }
}

// Displays an amount of base units in whole tokens, e.g. 250000000 -> "2.5".
pub fn display_amount(base_units: u64) -> String {
    let whole = base_units / BASE_UNIT_SCALE;
    let fraction = base_units % BASE_UNIT_SCALE;

    if fraction == 0 {
        whole.to_string()
    } else {
        let digits = format!("{:08}", fraction);
        format!("{}.{}", whole, digits.trim_end_matches('0'))
    }
}
