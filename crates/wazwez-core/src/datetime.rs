use anyhow::{
  Context,
  anyhow
};
use chrono::{
  Days,
  Local,
  NaiveDate
};

/// Format of the date input and of the
/// persisted `rawDate`.
pub const INPUT_DATE_FORMAT: &str =
  "%Y-%m-%d";
/// "DD Mon YYYY".
pub const DISPLAY_DATE_FORMAT: &str =
  "%d %b %Y";

pub const TODAY_LABEL: &str = "Today";
pub const TOMORROW_LABEL: &str =
  "Tomorrow";

#[must_use]
pub fn today() -> NaiveDate {
  Local::now().date_naive()
}

#[must_use]
pub fn format_date_for_display(
  date: NaiveDate,
  today: NaiveDate
) -> String {
  if date == today {
    return TODAY_LABEL.to_string();
  }

  if today
    .checked_add_days(Days::new(1))
    .is_some_and(|tomorrow| {
      tomorrow == date
    })
  {
    return TOMORROW_LABEL.to_string();
  }

  date
    .format(DISPLAY_DATE_FORMAT)
    .to_string()
}

#[must_use]
pub fn format_input_date(
  date: NaiveDate
) -> String {
  date
    .format(INPUT_DATE_FORMAT)
    .to_string()
}

pub fn parse_input_date(
  raw: &str
) -> anyhow::Result<NaiveDate> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Err(anyhow!(
      "empty date input"
    ));
  }

  NaiveDate::parse_from_str(
    trimmed,
    INPUT_DATE_FORMAT
  )
  .with_context(|| {
    format!(
      "invalid date input: {trimmed}"
    )
  })
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::{
    format_date_for_display,
    format_input_date,
    parse_input_date
  };

  fn day(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  #[test]
  fn labels_today_and_tomorrow() {
    let today = day(2026, 10, 16);
    assert_eq!(
      format_date_for_display(
        today, today
      ),
      "Today"
    );
    assert_eq!(
      format_date_for_display(
        day(2026, 10, 17),
        today
      ),
      "Tomorrow"
    );
  }

  #[test]
  fn other_dates_use_day_month_year()
  {
    let today = day(2026, 10, 16);
    assert_eq!(
      format_date_for_display(
        day(2026, 11, 5),
        today
      ),
      "05 Nov 2026"
    );
    assert_eq!(
      format_date_for_display(
        day(2026, 10, 15),
        today
      ),
      "15 Oct 2026"
    );
  }

  #[test]
  fn tomorrow_crosses_year_end() {
    assert_eq!(
      format_date_for_display(
        day(2027, 1, 1),
        day(2026, 12, 31)
      ),
      "Tomorrow"
    );
  }

  #[test]
  fn parses_input_dates() {
    let parsed =
      parse_input_date(" 2026-02-28 ")
        .expect("parse date");
    assert_eq!(
      format_input_date(parsed),
      "2026-02-28"
    );
    assert!(
      parse_input_date("2026-02-30")
        .is_err()
    );
    assert!(
      parse_input_date("28/02/2026")
        .is_err()
    );
    assert!(
      parse_input_date("").is_err()
    );
  }
}
