use crate::models::{
    CalendarEvent, CalendarResponse, ChartResponse, ExpenseForm, ExpenseRecord, ListResponse,
    SortDirection, SortKey, parse_day,
};
use crate::projection::month_grid;
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::HashMap;
use std::fmt::Write;

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub enum FormNotice<'a> {
    Saved,
    Error(&'a str),
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '{' => escaped.push_str("&#123;"),
            '}' => escaped.push_str("&#125;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn format_amount(value: f64) -> String {
    format!("${value:.2}")
}

fn error_line(error: Option<&str>) -> String {
    error
        .map(|message| format!(r#"<p class="error">{}</p>"#, escape_html(message)))
        .unwrap_or_default()
}

fn page(title: &str, body: &str, standalone: bool) -> String {
    let back = if standalone {
        r#"<a class="back" href="/">&larr; Back</a>"#
    } else {
        ""
    };
    PAGE_HTML
        .replace("{{TITLE}}", &escape_html(title))
        .replace("{{BACK}}", back)
        .replace("{{BODY}}", body)
}

pub fn render_dashboard(
    today: NaiveDate,
    calendar: &CalendarResponse,
    chart: &ChartResponse,
    list: &ListResponse,
    error: Option<&str>,
) -> String {
    let body = format!(
        r#"{error}
<div class="grid">
  <section class="card"><h2><a href="/chart">Chart</a></h2>{chart}</section>
  <section class="card"><h2><a href="/calendar">Calendar</a></h2>{calendar}</section>
</div>
<section class="card"><h2><a href="/expenses">Expenses</a></h2>{list}</section>"#,
        error = error_line(error),
        chart = chart_bars(chart),
        calendar = calendar_grid(today, calendar),
        list = expense_table(list),
    );
    page("Expense Tracker", &body, false)
}

pub fn render_calendar_page(
    month: NaiveDate,
    calendar: &CalendarResponse,
    error: Option<&str>,
) -> String {
    let mut body = format!(
        r#"<section class="card">{error}{nav}{grid}</section>"#,
        error = error_line(error),
        nav = month_nav(month),
        grid = calendar_grid(month, calendar),
    );

    if let Some(date) = calendar.selected_date {
        body.push_str(&day_details(date, &calendar.details));
    }

    page("Calendar", &body, true)
}

pub fn render_chart_page(chart: &ChartResponse, error: Option<&str>) -> String {
    let body = format!(
        r#"<section class="card">{error}{filters}{bars}</section>"#,
        error = error_line(error),
        filters = chart_filters(chart),
        bars = chart_bars(chart),
    );
    page("Chart", &body, true)
}

pub fn render_list_page(list: &ListResponse, error: Option<&str>) -> String {
    let body = format!(
        r#"<section class="card">{error}<p><a class="button" href="/expense/new">Add expense</a></p>{table}</section>"#,
        error = error_line(error),
        table = expense_table(list),
    );
    page("Expenses", &body, true)
}

pub fn render_form_page(form: &ExpenseForm, notice: Option<FormNotice<'_>>) -> String {
    let notice = match notice {
        Some(FormNotice::Saved) => r#"<p class="success">Expense saved successfully!</p>"#.to_string(),
        Some(FormNotice::Error(message)) => error_line(Some(message)),
        None => String::new(),
    };
    let body = FORM_HTML
        .replace("{{NOTICE}}", &notice)
        .replace("{{DESCRIPTION}}", &escape_html(&form.description))
        .replace("{{AMOUNT}}", &escape_html(&form.amount))
        .replace("{{CATEGORY}}", &escape_html(&form.category))
        .replace("{{DATE}}", &escape_html(&form.date));
    page("Add New Expense", &body, true)
}

fn month_nav(month: NaiveDate) -> String {
    let first = month.with_day(1).unwrap_or(month);
    let previous = first - Duration::days(1);
    let next = first + Duration::days(32);
    format!(
        r#"<div class="month-nav"><a href="/calendar?month={prev}">&lsaquo;</a><h2>{label}</h2><a href="/calendar?month={next}">&rsaquo;</a></div>"#,
        prev = previous.with_day(1).unwrap_or(previous),
        label = first.format("%B %Y"),
        next = next.with_day(1).unwrap_or(next),
    )
}

fn calendar_grid(month: NaiveDate, calendar: &CalendarResponse) -> String {
    let mut by_day: HashMap<NaiveDate, Vec<&CalendarEvent>> = HashMap::new();
    for event in &calendar.events {
        if let Some(day) = parse_day(&event.start) {
            by_day.entry(day).or_default().push(event);
        }
    }

    let mut html = String::from(r#"<table class="calendar"><thead><tr>"#);
    for name in WEEKDAYS {
        let _ = write!(html, "<th>{name}</th>");
    }
    html.push_str("</tr></thead><tbody>");

    for week in month_grid(month) {
        html.push_str("<tr>");
        for cell in week {
            let Some(day) = cell else {
                html.push_str(r#"<td class="empty"></td>"#);
                continue;
            };
            let selected = if calendar.selected_date == Some(day) {
                " selected"
            } else {
                ""
            };
            let _ = write!(
                html,
                r#"<td class="day{selected}"><a href="/calendar?month={month}&amp;date={day}">{num}</a>"#,
                month = month.format("%Y-%m-01"),
                num = day.day(),
            );
            for event in by_day.get(&day).into_iter().flatten() {
                let _ = write!(
                    html,
                    r#"<span class="event" style="background:{color}">{title}</span>"#,
                    color = escape_html(&event.color),
                    title = escape_html(&event.title),
                );
            }
            html.push_str("</td>");
        }
        html.push_str("</tr>");
    }

    html.push_str("</tbody></table>");
    html
}

fn day_details(date: NaiveDate, details: &[ExpenseRecord]) -> String {
    let mut html = format!(
        r#"<section class="card details"><h2>Expenses on {date}</h2><ul>"#
    );
    if details.is_empty() {
        html.push_str("<li>No expenses on this day.</li>");
    }
    for expense in details {
        let _ = write!(
            html,
            "<li>{}: {}</li>",
            escape_html(&expense.category),
            format_amount(expense.amount_value()),
        );
    }
    html.push_str("</ul></section>");
    html
}

fn chart_filters(chart: &ChartResponse) -> String {
    let date_value = |date: Option<NaiveDate>| date.map(|d| d.to_string()).unwrap_or_default();
    let selected_category = chart.category.as_deref().unwrap_or("");

    let mut options = String::from(r#"<option value="">All</option>"#);
    for category in &chart.categories {
        let selected = if category == selected_category {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            options,
            r#"<option value="{value}"{selected}>{value}</option>"#,
            value = escape_html(category),
        );
    }

    format!(
        r#"<form class="filters" method="get" action="/chart">
  <label>Start Date: <input type="date" name="start" value="{start}" /></label>
  <label>End Date: <input type="date" name="end" value="{end}" /></label>
  <label>Category: <select name="category">{options}</select></label>
  <button type="submit">Apply</button>
</form>"#,
        start = date_value(chart.start),
        end = date_value(chart.end),
    )
}

fn chart_bars(chart: &ChartResponse) -> String {
    if chart.totals.is_empty() {
        return r#"<p class="muted">No expenses in this range.</p>"#.to_string();
    }

    let max = chart
        .totals
        .iter()
        .map(|total| total.total)
        .fold(0.0_f64, f64::max);

    let mut html = String::from(r#"<div class="bars" aria-label="Expenses by Category">"#);
    for total in &chart.totals {
        let width = if max > 0.0 { total.total / max * 100.0 } else { 0.0 };
        let _ = write!(
            html,
            r#"<div class="bar-row"><span class="bar-label">{label}</span><span class="bar" style="width:{width:.1}%"></span><span class="bar-value">{value}</span></div>"#,
            label = escape_html(&total.category),
            value = format_amount(total.total),
        );
    }
    html.push_str("</div>");
    html
}

fn expense_table(list: &ListResponse) -> String {
    if list.expenses.is_empty() {
        return "<p>No expenses to display.</p>".to_string();
    }

    let mut html = String::from("<table><thead><tr>");
    for key in SortKey::ALL {
        let next = list.sort.toggle(key);
        let arrow = match (list.sort.key, list.sort.direction) {
            (Some(current), SortDirection::Ascending) if current == key => " &uarr;",
            (Some(current), SortDirection::Descending) if current == key => " &darr;",
            _ => "",
        };
        let _ = write!(
            html,
            r#"<th><a href="/expenses?sort={sort}&amp;dir={dir}">{label}{arrow}</a></th>"#,
            sort = key.as_str(),
            dir = next.direction.as_str(),
            label = key.label(),
        );
    }
    html.push_str("</tr></thead><tbody>");

    for expense in &list.expenses {
        let date = expense
            .day()
            .map(|day| day.format("%m/%d/%Y").to_string())
            .unwrap_or_else(|| expense.date.clone());
        let _ = write!(
            html,
            r#"<tr data-id="{id}"><td>{description}</td><td>{amount}</td><td>{category}</td><td>{date}</td></tr>"#,
            id = escape_html(&expense.expense_id),
            description = escape_html(&expense.description),
            amount = format_amount(expense.amount_value()),
            category = escape_html(&expense.category),
            date = escape_html(&date),
        );
    }

    html.push_str("</tbody></table>");
    html
}

const FORM_HTML: &str = r#"<section class="card expense-form">
  <a class="cancel" href="/" aria-label="Cancel">&times;</a>
  {{NOTICE}}
  <form method="post" action="/expense">
    <label>Description: <input type="text" name="description" value="{{DESCRIPTION}}" placeholder="Expense description" required /></label>
    <label>Amount: <input type="number" step="0.01" min="0" name="amount" value="{{AMOUNT}}" placeholder="Expense amount" required /></label>
    <label>Category: <input type="text" name="category" value="{{CATEGORY}}" placeholder="Expense category" required /></label>
    <label>Date: <input type="date" name="date" value="{{DATE}}" required /></label>
    <div class="button-group">
      <button type="submit" name="after" value="back">Save and Go Back</button>
      <button type="submit" name="after" value="another">Save and Add Another</button>
      <a class="button" href="/">Cancel</a>
    </div>
  </form>
</section>"#;

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    :root {
      --bg: #14161a;
      --card: #1f232a;
      --ink: #f1f1f1;
      --muted: #9aa0a6;
      --accent: rgba(75, 192, 192, 0.8);
      --error: #ff6b6b;
      --ok: #6bd48a;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      padding: 24px 18px 48px;
    }

    header {
      display: flex;
      align-items: center;
      gap: 16px;
      max-width: 1100px;
      margin: 0 auto 24px;
    }

    header h1 {
      margin: 0;
      font-size: 1.8rem;
    }

    main {
      max-width: 1100px;
      margin: 0 auto;
      display: grid;
      gap: 20px;
    }

    a {
      color: var(--accent);
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(420px, 1fr));
      gap: 20px;
    }

    .card {
      background: var(--card);
      border-radius: 16px;
      padding: 20px;
    }

    .error {
      color: var(--error);
    }

    .success {
      color: var(--ok);
    }

    .muted {
      color: var(--muted);
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    th, td {
      padding: 8px;
      text-align: left;
      border-bottom: 1px solid #2c313a;
      vertical-align: top;
    }

    .calendar td {
      height: 72px;
      width: 14%;
    }

    .calendar td.selected {
      outline: 2px solid var(--accent);
    }

    .event {
      display: block;
      margin-top: 4px;
      padding: 1px 6px;
      border-radius: 6px;
      font-size: 0.75rem;
      color: white;
    }

    .month-nav {
      display: flex;
      justify-content: space-between;
      align-items: center;
    }

    .bars {
      display: grid;
      gap: 10px;
    }

    .bar-row {
      display: grid;
      grid-template-columns: 120px 1fr 90px;
      align-items: center;
      gap: 10px;
    }

    .bar {
      display: block;
      height: 18px;
      background: var(--accent);
      border-radius: 4px;
    }

    .filters, .expense-form form {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
      margin-bottom: 16px;
    }

    .expense-form form {
      flex-direction: column;
    }

    .button, button {
      background: var(--accent);
      color: #0d0f12;
      border: none;
      border-radius: 8px;
      padding: 8px 14px;
      text-decoration: none;
      cursor: pointer;
    }
  </style>
</head>
<body>
  <header>
    {{BACK}}
    <h1>{{TITLE}}</h1>
  </header>
  <main>
{{BODY}}
  </main>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryTotal, RawAmount, SortState};

    fn expense(id: &str, description: &str) -> ExpenseRecord {
        ExpenseRecord {
            expense_id: id.into(),
            description: description.into(),
            amount: Some(RawAmount::Text("4".into())),
            category: "Food".into(),
            date: "2024-05-02".into(),
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn form_input_is_not_treated_as_placeholder() {
        let form = ExpenseForm {
            description: "{{AMOUNT}}".into(),
            amount: "oops".into(),
            category: "{{DATE}}".into(),
            date: "2024-05-02".into(),
            after: None,
        };
        let html = render_form_page(&form, Some(FormNotice::Error("amount must be a non-negative number")));
        assert!(html.contains(r#"name="description" value="&#123;&#123;AMOUNT&#125;&#125;""#));
        assert!(html.contains(r#"name="amount" value="oops""#));
        assert!(html.contains(r#"name="category" value="&#123;&#123;DATE&#125;&#125;""#));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn list_headers_link_to_toggled_sort() {
        let list = ListResponse {
            sort: SortState::new(SortKey::Amount, SortDirection::Ascending),
            expenses: vec![expense("1", "<script>")],
        };
        let html = render_list_page(&list, None);
        assert!(html.contains("/expenses?sort=amount&amp;dir=descending"));
        assert!(html.contains("/expenses?sort=date&amp;dir=ascending"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("$4.00"));
    }

    #[test]
    fn empty_list_shows_placeholder_and_error() {
        let list = ListResponse {
            sort: SortState::default(),
            expenses: Vec::new(),
        };
        let html = render_list_page(&list, Some("Failed to fetch expenses"));
        assert!(html.contains("No expenses to display."));
        assert!(html.contains(r#"<p class="error">Failed to fetch expenses</p>"#));
    }

    #[test]
    fn calendar_page_shows_events_and_selected_day() {
        let month = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let calendar = CalendarResponse {
            events: vec![CalendarEvent {
                title: "Food".into(),
                start: "2024-05-02".into(),
                color: "red".into(),
            }],
            selected_date: NaiveDate::from_ymd_opt(2024, 5, 2),
            details: vec![expense("1", "Lunch")],
        };
        let html = render_calendar_page(month, &calendar, None);
        assert!(html.contains("May 2024"));
        assert!(html.contains(r#"style="background:red">Food</span>"#));
        assert!(html.contains("Expenses on 2024-05-02"));
        assert!(html.contains("<li>Food: $4.00</li>"));
        assert!(html.contains("/calendar?month=2024-04-01"));
        assert!(html.contains("/calendar?month=2024-06-01"));
    }

    #[test]
    fn chart_bars_scale_to_largest_total() {
        let chart = ChartResponse {
            start: NaiveDate::from_ymd_opt(2024, 5, 1),
            end: NaiveDate::from_ymd_opt(2024, 5, 31),
            category: Some("Food".into()),
            categories: vec!["Food".into(), "Travel".into()],
            totals: vec![
                CategoryTotal {
                    category: "Food".into(),
                    total: 20.0,
                },
                CategoryTotal {
                    category: "Travel".into(),
                    total: 5.0,
                },
            ],
        };
        let html = render_chart_page(&chart, None);
        assert!(html.contains("width:100.0%"));
        assert!(html.contains("width:25.0%"));
        assert!(html.contains(r#"value="2024-05-01""#));
        assert!(html.contains(r#"<option value="Food" selected>Food</option>"#));
    }

    #[test]
    fn form_keeps_input_and_shows_notice() {
        let form = ExpenseForm {
            description: "Taxi".into(),
            amount: "x".into(),
            ..ExpenseForm::default()
        };
        let html = render_form_page(&form, Some(FormNotice::Error("amount must be a non-negative number")));
        assert!(html.contains(r#"value="Taxi""#));
        assert!(html.contains("amount must be a non-negative number"));

        let html = render_form_page(&ExpenseForm::default(), Some(FormNotice::Saved));
        assert!(html.contains("Expense saved successfully!"));
    }
}
