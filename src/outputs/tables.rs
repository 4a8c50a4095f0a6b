//! Tabular exports of the dataset.
//!
//! Two formats, same table: a CSV for anything that speaks CSV, and an XML
//! Spreadsheet (the Excel 2003 `.xls` dialect) for people who double-click
//! their way into Excel. Rows are days, newest first; columns are `date`,
//! `link`, the fixed counters, then every region in lexicographic order.
//! Days where a region reported nothing stay empty rather than zero, so the
//! table distinguishes "no bulletin mention" from "explicitly zero".

use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use quick_xml::Writer as XmlWriter;
use quick_xml::events::{BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use tracing::info;

use crate::dataset::Dataset;

/// Write the dataset as CSV.
///
/// # Arguments
///
/// * `dataset` - The loaded dataset
/// * `writer` - Destination, typically a buffered file
pub fn write_csv<W: Write>(dataset: &Dataset, writer: W) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_writer(writer);
    let columns = dataset.column_names();

    let mut header = vec!["date".to_string(), "link".to_string()];
    header.extend(columns.iter().cloned());
    wtr.write_record(&header)?;

    for row in 0..dataset.len() {
        let mut record = vec![dataset.dates()[row].to_string(), dataset.links()[row].clone()];
        for column in &columns {
            let cell = dataset.column(column).and_then(|values| values[row]);
            record.push(cell.map(|v| v.to_string()).unwrap_or_default());
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the dataset to `path` as CSV.
pub fn write_csv_file(dataset: &Dataset, path: impl AsRef<Path>) -> Result<(), Box<dyn Error>> {
    let path = path.as_ref();
    write_csv(dataset, BufWriter::new(File::create(path)?))?;
    info!(path = %path.display(), rows = dataset.len(), "Wrote CSV table");
    Ok(())
}

/// Write the dataset as an XML Spreadsheet workbook.
///
/// This is the `SpreadsheetML` dialect Excel 2003 saved as `.xls`: a single
/// `<Workbook>` with one `<Worksheet>`, typed cells, no styling. Every
/// spreadsheet application still opens it.
pub fn write_excel<W: Write>(dataset: &Dataset, writer: W) -> Result<(), Box<dyn Error>> {
    let mut xml = XmlWriter::new_with_indent(writer, b' ', 1);
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    xml.write_event(Event::PI(BytesPI::new(r#"mso-application progid="Excel.Sheet""#)))?;

    let mut workbook = BytesStart::new("Workbook");
    workbook.push_attribute(("xmlns", "urn:schemas-microsoft-com:office:spreadsheet"));
    workbook.push_attribute(("xmlns:ss", "urn:schemas-microsoft-com:office:spreadsheet"));
    xml.write_event(Event::Start(workbook))?;

    let mut worksheet = BytesStart::new("Worksheet");
    worksheet.push_attribute(("ss:Name", "corona"));
    xml.write_event(Event::Start(worksheet))?;
    xml.write_event(Event::Start(BytesStart::new("Table")))?;

    let columns = dataset.column_names();
    xml.write_event(Event::Start(BytesStart::new("Row")))?;
    write_cell(&mut xml, "String", "date")?;
    write_cell(&mut xml, "String", "link")?;
    for column in &columns {
        write_cell(&mut xml, "String", column)?;
    }
    xml.write_event(Event::End(BytesEnd::new("Row")))?;

    for row in 0..dataset.len() {
        xml.write_event(Event::Start(BytesStart::new("Row")))?;
        write_cell(&mut xml, "String", &dataset.dates()[row].to_string())?;
        write_cell(&mut xml, "String", &dataset.links()[row])?;
        for column in &columns {
            match dataset.column(column).and_then(|values| values[row]) {
                Some(value) => write_cell(&mut xml, "Number", &value.to_string())?,
                None => xml.write_event(Event::Empty(BytesStart::new("Cell")))?,
            }
        }
        xml.write_event(Event::End(BytesEnd::new("Row")))?;
    }

    xml.write_event(Event::End(BytesEnd::new("Table")))?;
    xml.write_event(Event::End(BytesEnd::new("Worksheet")))?;
    xml.write_event(Event::End(BytesEnd::new("Workbook")))?;
    // quick-xml writes through, but the destination may buffer
    xml.into_inner().flush()?;
    Ok(())
}

/// Write the dataset to `path` as an XML Spreadsheet workbook.
pub fn write_excel_file(dataset: &Dataset, path: impl AsRef<Path>) -> Result<(), Box<dyn Error>> {
    let path = path.as_ref();
    write_excel(dataset, BufWriter::new(File::create(path)?))?;
    info!(path = %path.display(), rows = dataset.len(), "Wrote Excel workbook");
    Ok(())
}

/// One `<Cell><Data ss:Type="...">value</Data></Cell>`.
fn write_cell<W: Write>(
    xml: &mut XmlWriter<W>,
    kind: &str,
    value: &str,
) -> Result<(), Box<dyn Error>> {
    xml.write_event(Event::Start(BytesStart::new("Cell")))?;
    let mut data = BytesStart::new("Data");
    data.push_attribute(("ss:Type", kind));
    xml.write_event(Event::Start(data))?;
    xml.write_event(Event::Text(BytesText::new(value)))?;
    xml.write_event(Event::End(BytesEnd::new("Data")))?;
    xml.write_event(Event::End(BytesEnd::new("Cell")))?;
    Ok(())
}
