//! Output writers.
//!
//! The forecast and the optional merged-records export are written as CSV
//! through polars. The data-quality profile is written as XML:
//!
//! ```xml
//! <data_info>
//!   <file name="orders">
//!     <info attribute="shape">(21350, 3)</info>
//!     <info attribute="na">
//!       <column name="order_id">0</column>
//!       ...
//!     </info>
//!     ...
//!   </file>
//! </data_info>
//! ```

use crate::constants::{EXPORT_DATETIME_FORMAT, columns, report_xml};
use crate::error::{ForecastError, Result};
use crate::forecast::ForecastTable;
use crate::models::MergedRecord;
use crate::profiler::{ColumnProfile, ProfileReport};
use polars::prelude::*;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Write the forecast as CSV, one row per week
pub fn write_forecast_csv(forecast: &ForecastTable, path: &Path) -> Result<()> {
    let mut df = forecast.to_dataframe()?;
    write_csv(&mut df, path)?;
    info!("Forecast written to {}", path.display());
    Ok(())
}

/// Write the cleaned records as CSV
pub fn write_merged_records_csv(records: &[MergedRecord], path: &Path) -> Result<()> {
    let mut df = merged_records_frame(records)?;
    write_csv(&mut df, path)?;
    info!("{} merged records written to {}", records.len(), path.display());
    Ok(())
}

/// Frame with one row per merged record, dates rendered as text
pub fn merged_records_frame(records: &[MergedRecord]) -> Result<DataFrame> {
    let order_details_ids: Vec<Option<i64>> = records.iter().map(|r| r.order_details_id).collect();
    let order_ids: Vec<i64> = records.iter().map(|r| r.order_id).collect();
    let pizza_ids: Vec<&str> = records.iter().map(|r| r.pizza_id.as_str()).collect();
    let quantities: Vec<u64> = records.iter().map(|r| r.quantity).collect();
    let dates: Vec<String> = records
        .iter()
        .map(|r| r.date.format(EXPORT_DATETIME_FORMAT).to_string())
        .collect();
    let times: Vec<Option<&str>> = records.iter().map(|r| r.time.as_deref()).collect();
    let weeks: Vec<u32> = records.iter().map(|r| r.week).collect();

    let df = DataFrame::new(vec![
        Column::new(columns::ORDER_DETAILS_ID.into(), order_details_ids),
        Column::new(columns::ORDER_ID.into(), order_ids),
        Column::new(columns::PIZZA_ID.into(), pizza_ids),
        Column::new(columns::QUANTITY.into(), quantities),
        Column::new(columns::DATE.into(), dates),
        Column::new(columns::TIME.into(), times),
        Column::new(columns::WEEK.into(), weeks),
    ])?;
    Ok(df)
}

fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

/// Write the profile report as XML
pub fn write_profile_xml(report: &ProfileReport, path: &Path) -> Result<()> {
    let xml = render_profile_xml(report).map_err(|reason| ForecastError::ReportWriting {
        path: path.to_path_buf(),
        reason,
    })?;
    std::fs::write(path, xml)?;
    info!("Data report written to {}", path.display());
    Ok(())
}

/// Render the profile report as an XML document
pub fn render_profile_xml(report: &ProfileReport) -> std::result::Result<String, String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(describe)?;
    writer
        .write_event(Event::Start(BytesStart::new(report_xml::ROOT)))
        .map_err(describe)?;

    for (kind, table) in &report.tables {
        writer
            .write_event(Event::Start(
                BytesStart::new(report_xml::FILE).with_attributes([("name", kind.name())]),
            ))
            .map_err(describe)?;

        write_scalar(&mut writer, "shape", &table.shape())?;
        write_per_column(&mut writer, "na", &table.column_profiles, |c| c.na.to_string())?;
        write_per_column(&mut writer, "null", &table.column_profiles, |c| c.null.to_string())?;
        write_per_column(&mut writer, "unique", &table.column_profiles, |c| {
            c.unique.to_string()
        })?;
        write_per_column(&mut writer, "type", &table.column_profiles, |c| c.dtype.clone())?;

        writer
            .write_event(Event::End(BytesEnd::new(report_xml::FILE)))
            .map_err(describe)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(report_xml::ROOT)))
        .map_err(describe)?;

    String::from_utf8(writer.into_inner()).map_err(describe)
}

fn write_scalar(
    writer: &mut Writer<Vec<u8>>,
    attribute: &str,
    value: &str,
) -> std::result::Result<(), String> {
    writer
        .write_event(Event::Start(info_start(attribute)))
        .map_err(describe)?;
    writer
        .write_event(Event::Text(BytesText::new(value)))
        .map_err(describe)?;
    writer
        .write_event(Event::End(BytesEnd::new(report_xml::INFO)))
        .map_err(describe)
}

fn write_per_column<F>(
    writer: &mut Writer<Vec<u8>>,
    attribute: &str,
    profiles: &[ColumnProfile],
    value: F,
) -> std::result::Result<(), String>
where
    F: Fn(&ColumnProfile) -> String,
{
    writer
        .write_event(Event::Start(info_start(attribute)))
        .map_err(describe)?;

    for profile in profiles {
        writer
            .write_event(Event::Start(
                BytesStart::new(report_xml::COLUMN).with_attributes([("name", profile.name.as_str())]),
            ))
            .map_err(describe)?;
        writer
            .write_event(Event::Text(BytesText::new(&value(profile))))
            .map_err(describe)?;
        writer
            .write_event(Event::End(BytesEnd::new(report_xml::COLUMN)))
            .map_err(describe)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(report_xml::INFO)))
        .map_err(describe)
}

fn info_start(attribute: &str) -> BytesStart<'_> {
    BytesStart::new(report_xml::INFO).with_attributes([("attribute", attribute)])
}

fn describe<E: std::fmt::Display>(err: E) -> String {
    err.to_string()
}
