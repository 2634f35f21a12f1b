use crate::{config::TableConfig, error::TableError, filter::Filter};
use connectors::{backend::QueryBackend, error::DbError};
use model::{
    core::value::Value,
    pagination::{
        page::{PageRequest, PageResult, PageWindow},
        sort::SortOrder,
    },
    records::row::RowData,
};
use query_builder::{
    ast::{
        common::TableRef,
        expr::Expr,
        select::{FromSource, Select},
    },
    builder::select::SelectBuilder,
    dialect::Dialect,
    format::to_debug_string,
    qualified,
    renderer::{render, render_inline},
    value,
};
use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
    time::Instant,
};
use tracing::{Instrument, Level, Span, debug, enabled, error, info_span, trace, warn};

/// Name of the per-row count column added by page statements.
pub const TOTAL_RESULTS: &str = "total_results";

/// A table configuration bound to a backend.
///
/// Calls share nothing but the immutable configuration, so one view can
/// serve any number of concurrent requests.
pub struct TableView<T> {
    config: Arc<TableConfig<T>>,
    backend: Arc<dyn QueryBackend>,
    span: Span,
}

impl<T> Clone for TableView<T> {
    fn clone(&self) -> Self {
        TableView {
            config: Arc::clone(&self.config),
            backend: Arc::clone(&self.backend),
            span: self.span.clone(),
        }
    }
}

impl<T> TableView<T> {
    pub fn new(config: TableConfig<T>, backend: Arc<dyn QueryBackend>) -> Self {
        let span = info_span!("table_view", table = config.name(), alias = config.alias());
        TableView {
            config: Arc::new(config),
            backend,
            span,
        }
    }

    /// Replaces the span every event of this view is recorded in.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn config(&self) -> &TableConfig<T> {
        &self.config
    }

    /// Selects the aliased columns of the table and of every join, reading
    /// from `source` (the table itself by default) under the table alias.
    ///
    /// `sort` overrides the configured default sort. An unqualified sort
    /// column refers to the table alias.
    pub fn base_query(&self, source: Option<FromSource>, sort: Option<&SortOrder>) -> Select {
        let _guard = self.span.enter();
        let config = &self.config;

        let source =
            source.unwrap_or_else(|| FromSource::Table(TableRef::new(config.name())));

        let mut builder = SelectBuilder::new()
            .select(Vec::new())
            .from_source(source, Some(config.alias()))
            .columns(config.aliased_columns().iter().map(|c| c.to_expr()));

        for join in config.joins() {
            builder = builder
                .columns(join.columns.iter().map(|c| c.to_expr()))
                .left_join(
                    TableRef::new(&join.table),
                    Some(&join.alias),
                    join.on.predicate(config.alias(), &join.alias),
                );
        }

        if let Some(sort) = sort.or(config.default_sort()) {
            let qualifier = sort.column.qualifier().unwrap_or(config.alias());
            builder = builder.order_by(
                qualified(qualifier, &sort.column.column),
                Some(sort.direction.into()),
            );
        }

        let select = builder.build();
        if enabled!(Level::TRACE) {
            trace!(sql = %self.debug_sql(&select), "Built base query");
        }
        select
    }

    /// The statement `paginate` runs for `window`.
    ///
    /// The filtered table becomes a named subquery; the window is cut from
    /// it together with the filtered row count, and only then are the
    /// aliased columns and joins applied, so joins never inflate the count.
    pub fn page_query(&self, filter: &Filter, window: &PageWindow, sort: Option<&SortOrder>) -> Select {
        let config = &self.config;
        let alias = config.alias();

        let mut filtered = SelectBuilder::new()
            .select(Vec::new())
            .from(TableRef::new(config.name()), None);
        if let Some(predicate) = filter.to_expr(None) {
            filtered = filtered.where_clause(predicate);
        }

        let count = SelectBuilder::new()
            .select(vec![Expr::count_all()])
            .from(TableRef::new(alias), None)
            .build();

        let mut windowed = SelectBuilder::new()
            .with(alias, filtered.build())
            .select(vec![
                Expr::Wildcard { qualifier: None },
                Expr::Subquery(Box::new(count)).alias(TOTAL_RESULTS),
            ])
            .from(TableRef::new(alias), None);
        if let Some(sort) = sort {
            windowed = windowed.order_by(
                qualified(alias, &sort.column.column),
                Some(sort.direction.into()),
            );
        }
        let windowed = windowed
            .limit(value(Value::Uint(window.limit)))
            .offset(value(Value::Uint(window.start)))
            .build();

        let mut select = self.base_query(Some(FromSource::Subquery(Box::new(windowed))), sort);
        select
            .columns
            .push(qualified(alias, TOTAL_RESULTS).alias(TOTAL_RESULTS));
        select
    }

    /// Fetches one page of records matching `filter`.
    ///
    /// Arguments are checked before the backend is contacted. Exactly one
    /// statement is executed; its failure is returned unchanged. An empty
    /// first page is a valid result, an empty later page is
    /// `PageNotFound`.
    pub async fn paginate(
        &self,
        filter: &Filter,
        request: PageRequest,
    ) -> Result<PageResult<T>, TableError> {
        async move {
            let (window, select) = self.prepare(filter, &request)?;
            let rows = self.execute(&select, request.debug).await?;

            if rows.is_empty() {
                if window.page > 1 {
                    return Err(TableError::PageNotFound { page: window.page });
                }
                return Ok(PageResult::from_window(&window, 0, Vec::new()));
            }

            let total = rows[0].get_value(TOTAL_RESULTS).as_u64().ok_or_else(|| {
                DbError::Decode(format!("'{TOTAL_RESULTS}' is missing from the page rows"))
            })?;
            let data = self.reshape(&rows)?;

            debug!(
                page = window.page,
                rows = data.len(),
                total,
                "Fetched page"
            );
            Ok(PageResult::from_window(&window, total, data))
        }
        .instrument(self.span.clone())
        .await
    }

    /// The statement `paginate` would run for `request`, without running it.
    pub fn page_statement(&self, filter: &Filter, request: &PageRequest) -> Result<Select, TableError> {
        self.prepare(filter, request).map(|(_, select)| select)
    }

    fn prepare(
        &self,
        filter: &Filter,
        request: &PageRequest,
    ) -> Result<(PageWindow, Select), TableError> {
        filter.validate()?;
        let window = PageWindow::new(request.page, request.size)?;
        let sort = self.effective_sort(request.sort.as_ref())?;

        let select = self.page_query(filter, &window, sort.as_ref());
        Ok((window, select))
    }

    /// Fetches every record matching `filter`, in the default sort order.
    pub async fn fetch(&self, filter: &Filter) -> Result<Vec<T>, TableError> {
        async move {
            filter.validate()?;

            let mut select = self.base_query(None, None);
            if let Some(predicate) = filter.to_expr(Some(self.config.alias())) {
                select.where_clause = Some(predicate);
            }

            let rows = self.execute(&select, false).await?;
            self.reshape(&rows)
        }
        .instrument(self.span.clone())
        .await
    }

    fn effective_sort(&self, requested: Option<&SortOrder>) -> Result<Option<SortOrder>, TableError> {
        match requested {
            None => Ok(self.config.default_sort().cloned()),
            Some(sort) => self.config.resolve_sort(sort).map(Some).ok_or_else(|| {
                TableError::InvalidArgument(format!(
                    "cannot sort by '{}': not a column of table '{}'",
                    sort.column,
                    self.config.name()
                ))
            }),
        }
    }

    async fn execute(&self, select: &Select, debug_sql: bool) -> Result<Vec<RowData>, TableError> {
        if let Some(hook) = &self.config.hooks().before_query {
            hook(select);
        }

        if debug_sql {
            debug!(sql = %self.debug_sql(select), "Executing statement");
        }

        let (sql, params) = render(select, self.backend.dialect());
        let started = Instant::now();

        match self.backend.fetch_rows(&sql, params).await {
            Ok(rows) => {
                debug!(
                    rows = rows.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Statement completed"
                );
                Ok(rows)
            }
            Err(err) => {
                if !debug_sql {
                    error!(error = %err, sql = %self.debug_sql(select), "Statement failed");
                }
                Err(err.into())
            }
        }
    }

    fn reshape(&self, rows: &[RowData]) -> Result<Vec<T>, TableError> {
        let validate = self.config.hooks().validate_row.as_ref();
        rows.iter()
            .map(|row| {
                let record = self.config.restruct(row);
                if let Some(validate) = validate {
                    validate(&record).map_err(TableError::RowValidation)?;
                }
                Ok(record)
            })
            .collect()
    }

    /// The statement with literal values, laid out for reading.
    fn debug_sql(&self, select: &Select) -> String {
        readable_sql(select, self.backend.dialect(), to_debug_string)
    }
}

/// Runs `format`, falling back to the single-line rendering if it panics.
/// The fallback needs `panic = "unwind"`; an aborting build never reaches it.
fn readable_sql(
    select: &Select,
    dialect: &dyn Dialect,
    format: fn(&Select, &dyn Dialect) -> String,
) -> String {
    match catch_unwind(AssertUnwindSafe(|| format(select, dialect))) {
        Ok(sql) => sql,
        Err(_) => {
            warn!("Failed to format statement for logging");
            render_inline(select, dialect)
        }
    }
}
