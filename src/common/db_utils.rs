// src/common/db_utils.rs

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};

/// True quando o erro é uma violação da constraint UNIQUE informada.
pub(crate) fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation() && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}

/// Nome da constraint quando o erro é uma FOREIGN KEY apontando para linha inexistente.
pub(crate) fn foreign_key_violation(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            Some(db_err.constraint().unwrap_or_default())
        }
        _ => None,
    }
}

pub fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN))
}

/// Intervalo [00:00 do dia, 00:00 do dia seguinte) em UTC.
pub fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start_of_day(day);
    let end = day
        .checked_add_days(Days::new(1))
        .map(start_of_day)
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    (start, end)
}

/// Escapa `%` e `_` para uso seguro em ILIKE.
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_bounds_span_one_day() {
        let day = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        let (start, end) = day_bounds(day);
        assert_eq!(end - start, chrono::Duration::days(1));
        assert_eq!(start.format("%Y-%m-%d").to_string(), "2025-12-31");
    }

    #[test]
    fn non_database_errors_are_not_foreign_key_violations() {
        assert_eq!(foreign_key_violation(&sqlx::Error::RowNotFound), None);
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound, "any"));
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ana"), "%ana%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
