use crate::models::{CalendarEvent, CategoryTotal, ExpenseRecord, SortDirection, SortKey};
use crate::palette::ColorTable;
use chrono::{Datelike, Duration, Local, NaiveDate};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

pub fn to_calendar_events(records: &[ExpenseRecord], colors: &ColorTable) -> Vec<CalendarEvent> {
    records
        .iter()
        .map(|record| CalendarEvent {
            title: record.category.clone(),
            start: record.date.clone(),
            color: colors.resolve(&record.category).to_string(),
        })
        .collect()
}

// A record without a parseable date fails any set bound.
pub fn filter_by_date_range_and_category(
    records: &[ExpenseRecord],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    category: Option<&str>,
) -> Vec<ExpenseRecord> {
    let category = category.filter(|value| !value.is_empty());
    records
        .iter()
        .filter(|record| {
            let day = record.day();
            let after_start = start.is_none_or(|start| day.is_some_and(|day| day >= start));
            let before_end = end.is_none_or(|end| day.is_some_and(|day| day <= end));
            let matches_category = category.is_none_or(|category| record.category == category);
            after_start && before_end && matches_category
        })
        .cloned()
        .collect()
}

pub fn current_month_range(today: NaiveDate) -> DateRange {
    let start = today.with_day(1).unwrap_or(today);
    let next_month = if start.month() == 12 {
        NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
    };
    let end = next_month
        .map(|first| first - Duration::days(1))
        .unwrap_or(start);
    DateRange { start, end }
}

pub fn this_month() -> DateRange {
    current_month_range(Local::now().date_naive())
}

pub fn group_by_category_total(records: &[ExpenseRecord]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let slot = *index.entry(record.category.as_str()).or_insert_with(|| {
            totals.push(CategoryTotal {
                category: record.category.clone(),
                total: 0.0,
            });
            totals.len() - 1
        });
        totals[slot].total += record.amount_value();
    }

    totals
}

pub fn sort_by(
    records: &[ExpenseRecord],
    key: SortKey,
    direction: SortDirection,
) -> Vec<ExpenseRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = compare(a, b, key);
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    sorted
}

fn compare(a: &ExpenseRecord, b: &ExpenseRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::Description => a.description.cmp(&b.description),
        SortKey::Category => a.category.cmp(&b.category),
        SortKey::Amount => a.amount_value().total_cmp(&b.amount_value()),
        SortKey::Date => a.day().cmp(&b.day()),
    }
}

pub fn events_on_date(records: &[ExpenseRecord], date: NaiveDate) -> Vec<ExpenseRecord> {
    records
        .iter()
        .filter(|record| record.day() == Some(date))
        .cloned()
        .collect()
}

pub fn distinct_categories(records: &[ExpenseRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|record| seen.insert(record.category.as_str()))
        .map(|record| record.category.clone())
        .collect()
}

// Monday-first; cells outside the month are `None`.
pub fn month_grid(anchor: NaiveDate) -> Vec<[Option<NaiveDate>; 7]> {
    let DateRange { start, end } = current_month_range(anchor);
    let lead = start.weekday().num_days_from_monday() as i64;
    let mut cursor = start - Duration::days(lead);
    let mut weeks = Vec::with_capacity(6);

    while cursor <= end {
        let mut week = [None; 7];
        for cell in week.iter_mut() {
            if cursor >= start && cursor <= end {
                *cell = Some(cursor);
            }
            cursor += Duration::days(1);
        }
        weeks.push(week);
    }

    weeks
}
