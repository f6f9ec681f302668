use crate::client::FetchError;
use crate::errors::AppError;
use crate::models::{
    CalendarQuery, CalendarResponse, ChartQuery, ChartResponse, CreatedResponse, ExpenseForm,
    ExpenseRecord, ListQuery, ListResponse, NewExpense, parse_day,
};
use crate::palette::ColorTable;
use crate::projection::{
    distinct_categories, events_on_date, filter_by_date_range_and_category,
    group_by_category_total, sort_by, this_month, to_calendar_events,
};
use crate::state::AppState;
use crate::ui::{self, FormNotice};
use axum::{
    Form, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::{error, info};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let (records, error) = load_for_page(&state).await;
    let today = today();
    let range = this_month();

    let calendar = calendar_projection(&records, &state.colors, None);
    let chart = chart_projection(&records, Some(range.start), Some(range.end), None);
    let list = ListResponse {
        sort: Default::default(),
        expenses: records,
    };

    Html(ui::render_dashboard(
        today,
        &calendar,
        &chart,
        &list,
        error.as_deref(),
    ))
}

pub async fn calendar_page(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Html<String> {
    let (records, mut error) = load_for_page(&state).await;
    let (selected, month) = calendar_dates(&query, &mut error);

    let calendar = calendar_projection(&records, &state.colors, selected);
    Html(ui::render_calendar_page(month, &calendar, error.as_deref()))
}

pub async fn chart_page(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> Html<String> {
    let (records, mut error) = load_for_page(&state).await;
    let chart = match resolve_range(&query) {
        Ok((start, end)) => chart_projection(&records, start, end, query.category.as_deref()),
        Err(err) => {
            error.get_or_insert(err.message);
            chart_projection(&[], None, None, None)
        }
    };
    Html(ui::render_chart_page(&chart, error.as_deref()))
}

pub async fn list_page(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Html<String> {
    let (records, error) = load_for_page(&state).await;
    let list = list_projection(records, &query);
    Html(ui::render_list_page(&list, error.as_deref()))
}

pub async fn new_expense_page() -> Html<String> {
    Html(ui::render_form_page(&ExpenseForm::default(), None))
}

pub async fn submit_expense(
    State(state): State<AppState>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let expense = match NewExpense::from_form(&form) {
        Ok(expense) => expense,
        Err(message) => {
            return Html(ui::render_form_page(&form, Some(FormNotice::Error(&message))))
                .into_response();
        }
    };

    match save(&state, expense).await {
        Ok(()) if form.after.as_deref() == Some("back") => Redirect::to("/expenses").into_response(),
        Ok(()) => Html(ui::render_form_page(
            &ExpenseForm::default(),
            Some(FormNotice::Saved),
        ))
        .into_response(),
        Err(err) => {
            error!("failed to save expense: {err}");
            Html(ui::render_form_page(
                &form,
                Some(FormNotice::Error(err.user_message())),
            ))
            .into_response()
        }
    }
}

pub async fn get_calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>, AppError> {
    let selected = optional_date("date", query.date.as_deref())?;
    let records = fetch_records(&state).await?;
    Ok(Json(calendar_projection(&records, &state.colors, selected)))
}

pub async fn get_chart(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ChartResponse>, AppError> {
    let (start, end) = resolve_range(&query)?;
    let records = fetch_records(&state).await?;
    Ok(Json(chart_projection(
        &records,
        start,
        end,
        query.category.as_deref(),
    )))
}

pub async fn get_expenses(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, AppError> {
    let records = fetch_records(&state).await?;
    Ok(Json(list_projection(records, &query)))
}

pub async fn create_expense(
    State(state): State<AppState>,
    Json(payload): Json<NewExpense>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let form = ExpenseForm {
        description: payload.description,
        amount: payload.amount.to_string(),
        category: payload.category,
        date: payload.date,
        after: None,
    };
    let expense = NewExpense::from_form(&form).map_err(AppError::bad_request)?;

    save(&state, expense).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { status: "ok" })))
}

async fn fetch_records(state: &AppState) -> Result<Vec<ExpenseRecord>, FetchError> {
    let records = state
        .api
        .spawn_list(Arc::clone(&state.credentials))
        .wait()
        .await?;
    info!("fetched {} expenses", records.len());
    Ok(records)
}

async fn save(state: &AppState, expense: NewExpense) -> Result<(), FetchError> {
    let category = expense.category.clone();
    state
        .api
        .spawn_create(Arc::clone(&state.credentials), expense)
        .wait()
        .await?;
    info!("saved expense in category {category}");
    Ok(())
}

async fn load_for_page(state: &AppState) -> (Vec<ExpenseRecord>, Option<String>) {
    match fetch_records(state).await {
        Ok(records) => (records, None),
        Err(err) => {
            error!("error fetching expenses: {err}");
            (Vec::new(), Some(err.user_message().to_string()))
        }
    }
}

fn calendar_projection(
    records: &[ExpenseRecord],
    colors: &ColorTable,
    selected: Option<NaiveDate>,
) -> CalendarResponse {
    CalendarResponse {
        events: to_calendar_events(records, colors),
        selected_date: selected,
        details: selected
            .map(|date| events_on_date(records, date))
            .unwrap_or_default(),
    }
}

fn chart_projection(
    records: &[ExpenseRecord],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    category: Option<&str>,
) -> ChartResponse {
    let category = category.filter(|value| !value.is_empty());
    let filtered = filter_by_date_range_and_category(records, start, end, category);
    ChartResponse {
        start,
        end,
        category: category.map(str::to_string),
        categories: distinct_categories(records),
        totals: group_by_category_total(&filtered),
    }
}

fn list_projection(records: Vec<ExpenseRecord>, query: &ListQuery) -> ListResponse {
    let sort = query.sort_state();
    let expenses = match sort.key {
        Some(key) => sort_by(&records, key, sort.direction),
        None => records,
    };
    ListResponse { sort, expenses }
}

// Both bounds absent means the current month; a bound sent empty means unbounded.
fn resolve_range(query: &ChartQuery) -> Result<(Option<NaiveDate>, Option<NaiveDate>), AppError> {
    if query.start.is_none() && query.end.is_none() {
        let range = this_month();
        return Ok((Some(range.start), Some(range.end)));
    }
    Ok((
        optional_date("start", query.start.as_deref())?,
        optional_date("end", query.end.as_deref())?,
    ))
}

fn optional_date(name: &str, value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => parse_day(value)
            .map(Some)
            .ok_or_else(|| AppError::bad_request(format!("{name} must be a YYYY-MM-DD date"))),
    }
}

// Bad `date` or `month` values are reported inline; the grid falls back to the selected day, then today.
fn calendar_dates(query: &CalendarQuery, error: &mut Option<String>) -> (Option<NaiveDate>, NaiveDate) {
    let mut parse = |name: &str, value: Option<&str>| match optional_date(name, value) {
        Ok(date) => date,
        Err(err) => {
            error.get_or_insert(err.message);
            None
        }
    };
    let selected = parse("date", query.date.as_deref());
    let month = parse("month", query.month.as_deref())
        .or(selected)
        .unwrap_or_else(today);
    (selected, month)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawAmount, SortDirection, SortKey};

    fn record(id: &str, amount: f64, category: &str, date: &str) -> ExpenseRecord {
        ExpenseRecord {
            expense_id: id.into(),
            description: format!("item {id}"),
            amount: Some(RawAmount::Number(amount)),
            category: category.into(),
            date: date.into(),
        }
    }

    #[test]
    fn malformed_calendar_month_is_reported() {
        let query = CalendarQuery {
            month: Some("May".into()),
            date: Some("2024-05-02".into()),
        };
        let mut error = None;
        let (selected, month) = calendar_dates(&query, &mut error);
        assert_eq!(selected, NaiveDate::from_ymd_opt(2024, 5, 2));
        assert_eq!(Some(month), selected);
        assert_eq!(error.as_deref(), Some("month must be a YYYY-MM-DD date"));

        let mut error = None;
        let (selected, month) = calendar_dates(&CalendarQuery::default(), &mut error);
        assert_eq!(selected, None);
        assert_eq!(month, today());
        assert_eq!(error, None);
    }

    #[test]
    fn missing_bounds_default_to_current_month() {
        let range = this_month();
        assert_eq!(
            resolve_range(&ChartQuery::default()).unwrap(),
            (Some(range.start), Some(range.end))
        );
    }

    #[test]
    fn empty_bounds_mean_unbounded() {
        let query = ChartQuery {
            start: Some(String::new()),
            end: Some(String::new()),
            category: None,
        };
        assert_eq!(resolve_range(&query).unwrap(), (None, None));

        let bad = ChartQuery {
            start: Some("yesterday".into()),
            ..ChartQuery::default()
        };
        assert_eq!(resolve_range(&bad).unwrap_err().status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn chart_projection_lists_all_categories_but_totals_filtered() {
        let records = vec![
            record("1", 10.0, "Food", "2024-05-01"),
            record("2", 5.0, "Travel", "2024-04-01"),
            record("3", 2.5, "Food", "2024-05-20"),
        ];
        let may = NaiveDate::from_ymd_opt(2024, 5, 1);
        let chart = chart_projection(&records, may, NaiveDate::from_ymd_opt(2024, 5, 31), Some(""));
        assert_eq!(chart.categories, vec!["Food", "Travel"]);
        assert_eq!(chart.category, None);
        assert_eq!(chart.totals.len(), 1);
        assert_eq!(chart.totals[0].total, 12.5);
    }

    #[test]
    fn list_projection_keeps_fetch_order_without_sort() {
        let records = vec![
            record("1", 10.0, "Food", "2024-05-01"),
            record("2", 5.0, "Travel", "2024-04-01"),
        ];
        let unsorted = list_projection(records.clone(), &ListQuery::default());
        assert_eq!(unsorted.expenses, records);

        let query = ListQuery {
            sort: Some(SortKey::Amount),
            dir: Some(SortDirection::Ascending),
        };
        let sorted = list_projection(records, &query);
        assert_eq!(sorted.expenses[0].expense_id, "2");
    }

    #[test]
    fn calendar_projection_fills_details_for_selected_day() {
        let records = vec![
            record("1", 10.0, "Food", "2024-05-01"),
            record("2", 5.0, "Travel", "2024-05-02"),
        ];
        let selected = NaiveDate::from_ymd_opt(2024, 5, 2);
        let calendar = calendar_projection(&records, &ColorTable::default(), selected);
        assert_eq!(calendar.events.len(), 2);
        assert_eq!(calendar.details.len(), 1);
        assert_eq!(calendar.details[0].expense_id, "2");

        let none = calendar_projection(&records, &ColorTable::default(), None);
        assert!(none.details.is_empty());
    }
}
