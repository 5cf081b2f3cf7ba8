use crate::error::AnalyticsError;
use crate::outcome::Outcome;
use crate::queries::{self, NamedQuery, ALL_QUERIES};
use core_types::{
    EventSalesSummary, GroupLabel, GroupSalesSummary, MonthlyPurchases, ProductSalesSummary,
    ProductVariantAverage, VariantAverage,
};
use database::{DbError, QueryCatalog, QueryExecutor, Row};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;

/// Runs catalog queries and turns positional rows into typed summaries.
///
/// Every public method returns `Err` only for structural misconfiguration (a
/// query missing from the catalog). A store failure or an undecodable row is
/// absorbed into `Outcome::Failed`, and zero rows into `Outcome::Empty`.
pub struct AggregationEngine<E> {
    catalog: QueryCatalog,
    executor: E,
}

impl<E: QueryExecutor> AggregationEngine<E> {
    pub fn new(catalog: QueryCatalog, executor: E) -> Self {
        Self { catalog, executor }
    }

    /// Startup check: every declared query exists and the store describes
    /// its projection with the declared number of columns.
    pub async fn verify(&self) -> Result<(), AnalyticsError> {
        for query in ALL_QUERIES {
            let sql = self.sql(query)?;
            let actual = self
                .executor
                .projection_arity(sql)
                .await
                .map_err(|source| AnalyticsError::QueryExecution {
                    query: query.name.to_string(),
                    source,
                })?;
            if actual != query.arity {
                return Err(AnalyticsError::ProjectionMismatch {
                    query: query.name.to_string(),
                    expected: query.arity,
                    actual,
                });
            }
        }
        tracing::debug!(queries = ALL_QUERIES.len(), "Verified query projections.");
        Ok(())
    }

    /// Total sales per product, largest first (ties by name).
    pub async fn product_sales(&self) -> Result<Outcome<Vec<ProductSalesSummary>>, AnalyticsError> {
        let outcome = self
            .run(queries::PRODUCT_SALES, |row| {
                Ok(ProductSalesSummary {
                    product_name: row.text(0)?.to_string(),
                    total_sales: row.cents(1)?,
                })
            })
            .await?;

        Ok(outcome.map(|mut rows| {
            rows.sort_by(|a, b| {
                b.total_sales
                    .cmp(&a.total_sales)
                    .then_with(|| a.product_name.cmp(&b.product_name))
            });
            rows
        }))
    }

    /// Total sales per event, largest first (ties by id).
    pub async fn event_sales(&self) -> Result<Outcome<Vec<EventSalesSummary>>, AnalyticsError> {
        let outcome = self
            .run(queries::EVENT_SALES, |row| {
                Ok(EventSalesSummary {
                    event_id: row.integer(0)?,
                    total_sales: row.cents(1)?,
                })
            })
            .await?;

        Ok(outcome.map(|mut rows| {
            rows.sort_by(|a, b| b.total_sales.cmp(&a.total_sales).then_with(|| a.event_id.cmp(&b.event_id)));
            rows
        }))
    }

    /// Total sales per experiment group in A..D order.
    ///
    /// Sales of users without an assignment come back labelled `Unknown` and
    /// are dropped here so they never enter group comparisons. Any other
    /// unrecognised label fails the section.
    pub async fn group_sales(&self) -> Result<Outcome<Vec<GroupSalesSummary>>, AnalyticsError> {
        let outcome = self
            .run(queries::GROUP_SALES, |row| Ok((group_label(row)?, row.cents(1)?)))
            .await?;

        let rows = match outcome {
            Outcome::Ready(rows) => rows,
            Outcome::Empty => return Ok(Outcome::Empty),
            Outcome::Failed(failure) => return Ok(Outcome::Failed(failure)),
        };

        let mut totals: BTreeMap<GroupLabel, Decimal> = BTreeMap::new();
        let mut unassigned = Decimal::ZERO;
        for (label, total) in rows {
            match label {
                Some(group) => *totals.entry(group).or_default() += total,
                None => unassigned += total,
            }
        }
        if !unassigned.is_zero() {
            tracing::debug!(total = %unassigned, "Excluded sales of unassigned users from group totals.");
        }

        Ok(Outcome::from_rows(
            totals
                .into_iter()
                .map(|(group, total_sales)| GroupSalesSummary { group, total_sales })
                .collect(),
        ))
    }

    /// Every individual sale amount of one group, in store order.
    /// `Empty` means the group has no sales, which is insufficient data and not zero.
    pub async fn raw_amounts_for_group(
        &self,
        group: GroupLabel,
    ) -> Result<Outcome<Vec<Decimal>>, AnalyticsError> {
        self.run(queries::group_amounts(group), |row| row.cents(0)).await
    }

    pub async fn monthly_purchases(&self) -> Result<Outcome<Vec<MonthlyPurchases>>, AnalyticsError> {
        let outcome = self
            .run(queries::MONTHLY_PURCHASES, |row| {
                Ok(MonthlyPurchases {
                    month: row.text(0)?.to_string(),
                    purchases: row.integer(1)?,
                    total_sales: row.cents(2)?,
                })
            })
            .await?;

        Ok(outcome.map(|mut rows| {
            rows.sort_by(|a, b| a.month.cmp(&b.month));
            rows
        }))
    }

    /// Average purchase per UI/description flag combination, A..D.
    pub async fn variant_averages(&self) -> Result<Outcome<Vec<VariantAverage>>, AnalyticsError> {
        let outcome = self
            .run(queries::VARIANT_AVERAGES, |row| {
                let (ui_change, desc_change) = (row.flag(0)?, row.flag(1)?);
                let purchases = row.integer(2)?;
                Ok(VariantAverage {
                    group: GroupLabel::from_flags(ui_change, desc_change),
                    ui_change,
                    desc_change,
                    purchases,
                    average_purchase: average(row.cents(3)?, purchases),
                })
            })
            .await?;

        Ok(outcome.map(|mut rows| {
            rows.sort_by_key(|r| r.group);
            rows
        }))
    }

    /// Average purchase per product and flag combination, by product then group.
    pub async fn product_variant_averages(
        &self,
    ) -> Result<Outcome<Vec<ProductVariantAverage>>, AnalyticsError> {
        let outcome = self
            .run(queries::PRODUCT_VARIANT_AVERAGES, |row| {
                let (ui_change, desc_change) = (row.flag(1)?, row.flag(2)?);
                let purchases = row.integer(3)?;
                Ok(ProductVariantAverage {
                    product_name: row.text(0)?.to_string(),
                    group: GroupLabel::from_flags(ui_change, desc_change),
                    ui_change,
                    desc_change,
                    purchases,
                    average_purchase: average(row.cents(4)?, purchases),
                })
            })
            .await?;

        Ok(outcome.map(|mut rows| {
            rows.sort_by(|a, b| a.product_name.cmp(&b.product_name).then_with(|| a.group.cmp(&b.group)));
            rows
        }))
    }

    fn sql(&self, query: NamedQuery) -> Result<&str, AnalyticsError> {
        self.catalog
            .lookup(query.name)
            .map_err(|_| AnalyticsError::UnknownQuery(query.name.to_string()))
    }

    /// Executes one named query and decodes every row with `decode`.
    async fn run<T>(
        &self,
        query: NamedQuery,
        decode: impl Fn(&Row) -> Result<T, DbError>,
    ) -> Result<Outcome<Vec<T>>, AnalyticsError> {
        let sql = self.sql(query)?;
        tracing::debug!(query = query.name, "Executing query.");

        let rows = match self.executor.fetch_rows(sql).await {
            Ok(rows) => rows,
            Err(source) => {
                let error = AnalyticsError::QueryExecution {
                    query: query.name.to_string(),
                    source,
                };
                tracing::error!(error = %error, "Query failed; recording section as unavailable.");
                return Ok(Outcome::failed(&error));
            }
        };

        let mut decoded = Vec::with_capacity(rows.len());
        for row in &rows {
            if row.len() != query.arity {
                let error = AnalyticsError::ProjectionMismatch {
                    query: query.name.to_string(),
                    expected: query.arity,
                    actual: row.len(),
                };
                tracing::error!(error = %error, "Row shape does not match the declared projection.");
                return Ok(Outcome::failed(&error));
            }
            match decode(row) {
                Ok(value) => decoded.push(value),
                Err(source) => {
                    let error = AnalyticsError::QueryExecution {
                        query: query.name.to_string(),
                        source,
                    };
                    tracing::error!(error = %error, "Failed to decode query row.");
                    return Ok(Outcome::failed(&error));
                }
            }
        }

        if decoded.is_empty() {
            tracing::warn!(query = query.name, "No data available.");
        } else {
            tracing::info!(query = query.name, rows = decoded.len(), "Query executed successfully.");
        }
        Ok(Outcome::from_rows(decoded))
    }
}

/// `None` for the unassigned bucket.
fn group_label(row: &Row) -> Result<Option<GroupLabel>, DbError> {
    let label = row.text(0)?;
    if label == queries::UNASSIGNED_LABEL {
        return Ok(None);
    }
    label.parse::<GroupLabel>().map(Some).map_err(|_| DbError::RowDecode {
        column: 0,
        expected: "group label",
        found: label.to_string(),
    })
}

fn average(total: Decimal, count: i64) -> Decimal {
    if count <= 0 {
        return Decimal::ZERO;
    }
    (total / Decimal::from(count)).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
