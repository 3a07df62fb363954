pub mod csv_adapter;
pub mod file_config_adapter;
#[cfg(feature = "html")]
pub mod html_report;
pub mod json_report;
#[cfg(feature = "postgres")]
pub mod postgres_adapter;
pub(crate) mod report_rows;
#[cfg(feature = "sqlite")]
pub mod sqlite_adapter;
pub mod table_report;
