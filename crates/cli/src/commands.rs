use crate::error::CliError;
use clap::{Args, Subcommand};
use model::pagination::{
    page::{DEFAULT_PAGE_SIZE, PageRequest},
    sort::SortOrder,
};
use table_view::Filter;

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch one page of a table and print it as JSON
    Page {
        #[command(flatten)]
        target: TableArgs,

        #[arg(long, env = "DATABASE_URL", help = "Database connection URL")]
        url: String,

        #[arg(
            long,
            help = "If specified, writes the page to this file instead of stdout"
        )]
        output: Option<String>,
    },
    /// Print the statement a page fetch would run, without connecting
    Query {
        #[command(flatten)]
        target: TableArgs,

        #[arg(
            long,
            env = "DATABASE_URL",
            help = "Database connection URL; only its scheme is used"
        )]
        url: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct TableArgs {
    #[arg(long, help = "Table definition file (TOML)")]
    pub config: String,

    #[arg(long, help = "Name of the table to read")]
    pub table: String,

    #[arg(long, help = r#"Equality filter as a JSON object, e.g. '{"status":"active"}'"#)]
    pub filter: Option<String>,

    #[arg(long, default_value_t = 1)]
    pub page: u64,

    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub size: u64,

    #[arg(long, help = "Sort override as column[:asc|desc]")]
    pub sort: Option<String>,

    #[arg(long, help = "Log the rendered statement before executing it")]
    pub debug: bool,
}

impl TableArgs {
    pub fn filter(&self) -> Result<Filter, CliError> {
        match &self.filter {
            None => Ok(Filter::All),
            Some(raw) => {
                let json = serde_json::from_str(raw).map_err(CliError::FilterParse)?;
                Ok(Filter::from_json(&json)?)
            }
        }
    }

    pub fn request(&self) -> Result<PageRequest, CliError> {
        let mut request = PageRequest::new(self.page, self.size).debug(self.debug);
        if let Some(sort) = &self.sort {
            request = request.sort(sort.parse::<SortOrder>()?);
        }
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{core::value::Value, pagination::sort::SortDirection};

    fn args() -> TableArgs {
        TableArgs {
            config: "tables.toml".into(),
            table: "users".into(),
            filter: None,
            page: 2,
            size: 10,
            sort: None,
            debug: false,
        }
    }

    #[test]
    fn test_request_from_args() {
        let request = TableArgs {
            sort: Some("email:DESC".into()),
            debug: true,
            ..args()
        }
        .request()
        .unwrap();

        assert_eq!(request.page, 2);
        assert_eq!(request.size, 10);
        assert!(request.debug);
        let sort = request.sort.unwrap();
        assert_eq!(sort.column.column, "email");
        assert_eq!(sort.direction, SortDirection::Desc);

        let bad = TableArgs {
            sort: Some("email:sideways".into()),
            ..args()
        };
        assert!(matches!(bad.request(), Err(CliError::Sort(_))));
    }

    #[test]
    fn test_filter_from_args() {
        assert_eq!(args().filter().unwrap(), Filter::All);

        let filter = TableArgs {
            filter: Some(r#"{"status":"active"}"#.into()),
            ..args()
        }
        .filter()
        .unwrap();
        assert_eq!(filter, Filter::equals([("status", Value::from("active"))]));

        let bad = TableArgs {
            filter: Some("{".into()),
            ..args()
        };
        assert!(matches!(bad.filter(), Err(CliError::FilterParse(_))));
    }
}
