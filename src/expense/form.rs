//! Request bodies and query strings for the expense endpoints, and the rules
//! that turn them into typed values.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{
    Error,
    pagination::PaginationConfig,
    validation::{
        FieldError, collect_errors, number_between, optional_string, parse_date,
        parse_integer_between, parse_one_of, required_string, trimmed_length,
    },
};

use super::{
    core::{Category, ExpenseBuilder, ExpenseType, ExpenseUpdate},
    query::{DateRange, ExpenseFilter},
};

const MIN_AMOUNT: f64 = 0.01;
const MAX_AMOUNT: f64 = 999_999_999.0;
const MAX_TITLE_LENGTH: usize = 100;
const MAX_DESCRIPTION_LENGTH: usize = 500;

const TYPE_MESSAGE: &str = "Type must be either income or expense";

fn category_message() -> String {
    let labels: Vec<&str> = Category::ALL.iter().map(Category::as_str).collect();

    format!("Category must be one of: {}", labels.join(", "))
}

/// Keep JSON `null` distinct from a missing field.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// The JSON body for creating or updating an expense.
///
/// Fields are kept as raw JSON so that a value of the wrong type is reported
/// against its field instead of failing the whole body.
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseForm {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub amount: Option<Value>,
    #[serde(default, rename = "type", deserialize_with = "present")]
    pub kind: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub category: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub date: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Value>,
}

fn title_rule(value: Option<&Value>) -> Result<String, FieldError> {
    required_string("title", value, "Title")
        .and_then(|title| trimmed_length("title", title, 1, MAX_TITLE_LENGTH, "Title"))
}

fn amount_rule(value: Option<&Value>) -> Result<f64, FieldError> {
    number_between("amount", value, MIN_AMOUNT, MAX_AMOUNT, "Amount")
}

fn type_rule(value: Option<&Value>) -> Result<ExpenseType, FieldError> {
    required_string("type", value, "Type").and_then(|kind| parse_one_of("type", kind, TYPE_MESSAGE))
}

fn category_rule(value: Option<&Value>) -> Result<Category, FieldError> {
    required_string("category", value, "Category")
        .and_then(|category| parse_one_of("category", category, &category_message()))
}

fn date_rule(value: Option<&Value>) -> Result<time::Date, FieldError> {
    required_string("date", value, "Date").and_then(|date| parse_date("date", date, "Date"))
}

/// An empty or blank description means no description.
fn description_rule(value: Option<&Value>) -> Result<Option<String>, FieldError> {
    let Some(description) = optional_string("description", value, "Description")? else {
        return Ok(None);
    };

    let description = trimmed_length(
        "description",
        description,
        0,
        MAX_DESCRIPTION_LENGTH,
        "Description",
    )?;

    Ok(Some(description).filter(|description| !description.is_empty()))
}

/// Apply `rule` only if the field was sent.
fn if_present<T>(
    value: Option<&Value>,
    rule: impl FnOnce(Option<&Value>) -> Result<T, FieldError>,
) -> Result<Option<T>, FieldError> {
    match value {
        None => Ok(None),
        present => rule(present).map(Some),
    }
}

impl ExpenseForm {
    /// Validate every field for a new expense.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] listing every field that broke a rule.
    pub fn into_builder(self) -> Result<ExpenseBuilder, Error> {
        let title = title_rule(self.title.as_ref());
        let amount = amount_rule(self.amount.as_ref());
        let kind = type_rule(self.kind.as_ref());
        let category = category_rule(self.category.as_ref());
        let date = date_rule(self.date.as_ref());
        let description = description_rule(self.description.as_ref());

        match (title, amount, kind, category, date, description) {
            (Ok(title), Ok(amount), Ok(kind), Ok(category), Ok(date), Ok(description)) => {
                Ok(ExpenseBuilder {
                    title,
                    amount,
                    kind,
                    category,
                    date,
                    description,
                })
            }
            (title, amount, kind, category, date, description) => {
                Err(Error::Validation(collect_errors([
                    title.err(),
                    amount.err(),
                    kind.err(),
                    category.err(),
                    date.err(),
                    description.err(),
                ])))
            }
        }
    }

    /// Validate the fields that were sent for a partial update.
    ///
    /// Sending `null` or an empty string for the description clears it.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] listing every field that broke a rule, or
    /// if no fields were sent at all.
    pub fn into_update(self) -> Result<ExpenseUpdate, Error> {
        let title = if_present(self.title.as_ref(), title_rule);
        let amount = if_present(self.amount.as_ref(), amount_rule);
        let kind = if_present(self.kind.as_ref(), type_rule);
        let category = if_present(self.category.as_ref(), category_rule);
        let date = if_present(self.date.as_ref(), date_rule);
        let description = if_present(self.description.as_ref(), description_rule);

        let update = match (title, amount, kind, category, date, description) {
            (Ok(title), Ok(amount), Ok(kind), Ok(category), Ok(date), Ok(description)) => {
                ExpenseUpdate {
                    title,
                    amount,
                    kind,
                    category,
                    date,
                    description,
                }
            }
            (title, amount, kind, category, date, description) => {
                return Err(Error::Validation(collect_errors([
                    title.err(),
                    amount.err(),
                    kind.err(),
                    category.err(),
                    date.err(),
                    description.err(),
                ])));
            }
        };

        if update.is_empty() {
            return Err(Error::Validation(vec![FieldError::new(
                "body",
                "At least one field must be provided to update",
            )]));
        }

        Ok(update)
    }
}

/// Treat `?name=` the same as leaving the parameter out.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

fn parse_date_range(start: Option<&str>, end: Option<&str>) -> Result<DateRange, Vec<FieldError>> {
    let start = start
        .map(|start| parse_date("startDate", start, "Start date"))
        .transpose();
    let end = end
        .map(|end| parse_date("endDate", end, "End date"))
        .transpose();

    match (start, end) {
        (Ok(Some(start)), Ok(Some(end))) if start > end => Err(vec![FieldError::new(
            "endDate",
            "End date must be on or after the start date",
        )]),
        (Ok(start), Ok(end)) => Ok(DateRange { start, end }),
        (start, end) => Err(collect_errors([start.err(), end.err()])),
    }
}

/// The query string for listing expenses.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// A validated [ListQuery].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListParams {
    /// The 1-based page to return.
    pub page: u64,
    /// The number of records per page.
    pub limit: u64,
    /// Which records to include.
    pub filter: ExpenseFilter,
}

impl ListQuery {
    /// Validate the query string, filling in the page and limit from `config`.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] listing every parameter that broke a rule.
    pub fn into_params(self, config: &PaginationConfig) -> Result<ListParams, Error> {
        let page = non_empty(&self.page).map_or(Ok(config.default_page), |page| {
            parse_integer_between("page", page, 1, u64::MAX, "Page must be a positive integer")
        });
        let limit_message = format!("Limit must be between 1 and {}", config.max_page_size);
        let limit = non_empty(&self.limit).map_or(Ok(config.default_page_size), |limit| {
            parse_integer_between("limit", limit, 1, config.max_page_size, &limit_message)
        });
        let kind = non_empty(&self.kind)
            .map(|kind| parse_one_of::<ExpenseType>("type", kind, TYPE_MESSAGE))
            .transpose();
        let category = non_empty(&self.category)
            .map(|category| parse_one_of::<Category>("category", category, &category_message()))
            .transpose();
        let date_range = parse_date_range(non_empty(&self.start_date), non_empty(&self.end_date));

        match (page, limit, kind, category, date_range) {
            (Ok(page), Ok(limit), Ok(kind), Ok(category), Ok(date_range)) => Ok(ListParams {
                page,
                limit,
                filter: ExpenseFilter {
                    kind,
                    category,
                    date_range,
                },
            }),
            (page, limit, kind, category, date_range) => {
                let mut errors =
                    collect_errors([page.err(), limit.err(), kind.err(), category.err()]);
                errors.extend(date_range.err().unwrap_or_default());

                Err(Error::Validation(errors))
            }
        }
    }
}

/// The query string for the statistics endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl StatsQuery {
    /// Validate the date range.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] if a date is malformed or the range is backwards.
    pub fn into_date_range(self) -> Result<DateRange, Error> {
        parse_date_range(non_empty(&self.start_date), non_empty(&self.end_date))
            .map_err(Error::Validation)
    }
}
