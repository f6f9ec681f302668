use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
    Other(Value),
}

impl RawAmount {
    fn parse(&self) -> Option<f64> {
        let value = match self {
            RawAmount::Number(value) => *value,
            RawAmount::Text(text) => text.trim().parse::<f64>().ok()?,
            RawAmount::Other(_) => return None,
        };
        (value.is_finite() && value >= 0.0).then_some(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpenseRecord {
    #[serde(deserialize_with = "lenient_text")]
    pub expense_id: String,
    #[serde(deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<RawAmount>,
    #[serde(deserialize_with = "lenient_text")]
    pub category: String,
    #[serde(deserialize_with = "lenient_text")]
    pub date: String,
}

// Null or non-text values become text rather than failing the whole batch.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    })
}

impl ExpenseRecord {
    pub fn amount_value(&self) -> f64 {
        self.amount.as_ref().and_then(RawAmount::parse).unwrap_or(0.0)
    }

    pub fn day(&self) -> Option<NaiveDate> {
        parse_day(&self.date)
    }
}

pub fn parse_day(value: &str) -> Option<NaiveDate> {
    let prefix = value.trim().get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub date: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseForm {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub after: Option<String>,
}

impl NewExpense {
    pub fn from_form(form: &ExpenseForm) -> Result<Self, String> {
        let description = form.description.trim();
        if description.is_empty() {
            return Err("description is required".into());
        }

        let amount = form
            .amount
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value >= 0.0)
            .ok_or_else(|| "amount must be a non-negative number".to_string())?;

        let category = form.category.trim();
        if category.is_empty() {
            return Err("category is required".into());
        }

        let date = form.date.trim();
        if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            return Err("date must be in YYYY-MM-DD format".into());
        }

        Ok(Self {
            description: description.to_string(),
            amount,
            category: category.to_string(),
            date: date.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub title: String,
    pub start: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Description,
    Amount,
    Category,
    Date,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::Description,
        SortKey::Amount,
        SortKey::Category,
        SortKey::Date,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Description => "description",
            SortKey::Amount => "amount",
            SortKey::Category => "category",
            SortKey::Date => "date",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Description => "Description",
            SortKey::Amount => "Amount",
            SortKey::Category => "Category",
            SortKey::Date => "Date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

// `key: None` keeps fetch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct SortState {
    pub key: Option<SortKey>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self {
            key: Some(key),
            direction,
        }
    }

    pub fn toggle(self, key: SortKey) -> Self {
        match self.key {
            Some(current) if current == key => Self::new(key, self.direction.flipped()),
            _ => Self::new(key, SortDirection::Ascending),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarQuery {
    pub month: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub sort: Option<SortKey>,
    pub dir: Option<SortDirection>,
}

impl ListQuery {
    pub fn sort_state(&self) -> SortState {
        SortState {
            key: self.sort,
            direction: self.dir.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub events: Vec<CalendarEvent>,
    pub selected_date: Option<NaiveDate>,
    pub details: Vec<ExpenseRecord>,
}

#[derive(Debug, Serialize)]
pub struct ChartResponse {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub category: Option<String>,
    pub categories: Vec<String>,
    pub totals: Vec<CategoryTotal>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub sort: SortState,
    pub expenses: Vec<ExpenseRecord>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub status: &'static str,
}
