//! In-memory reservation exports for tests.
//!
//! Workbooks are generated with `rust_xlsxwriter` rather than checked in, so
//! every fixture documents the exact layout it exercises.

use chrono::{NaiveDate, NaiveDateTime};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

/// Header row of a reservation export, in export order
pub const RESERVATION_HEADERS: [&str; 22] = [
    "Reservation No",
    "Arrival City",
    "Hotel Name",
    "Author",
    "Payment",
    "Agency",
    "Begin Date",
    "Package",
    "Price List",
    "End Date",
    "Night",
    "Adult",
    "Child",
    "Infant",
    "Net Price",
    "Sale Price",
    "Agency Payment",
    "Create Date",
    "Passenger Amount to Pay",
    "Agency Amount to Pay",
    "Package Type",
    "Profit",
];

/// One cell of a hand-built sheet
#[derive(Clone, Debug, PartialEq)]
pub enum FixtureCell {
    Blank,
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
}

impl From<&str> for FixtureCell {
    fn from(value: &str) -> Self {
        FixtureCell::Text(value.to_string())
    }
}

impl From<f64> for FixtureCell {
    fn from(value: f64) -> Self {
        FixtureCell::Number(value)
    }
}

fn text(value: &Option<String>) -> FixtureCell {
    value
        .as_ref()
        .map(|s| FixtureCell::Text(s.clone()))
        .unwrap_or(FixtureCell::Blank)
}

fn date(value: Option<NaiveDate>) -> FixtureCell {
    value
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(FixtureCell::Date)
        .unwrap_or(FixtureCell::Blank)
}

/// A reservation line with sensible defaults; override fields as needed
#[derive(Clone, Debug, PartialEq)]
pub struct ReservationRow {
    pub reservation_no: String,
    pub arrival_city: Option<String>,
    pub hotel_name: Option<String>,
    pub author: Option<String>,
    pub agency: Option<String>,
    pub package_type: Option<String>,
    pub begin_date: Option<NaiveDate>,
    pub create_date: Option<NaiveDate>,
    pub night: f64,
    pub adult: f64,
    pub child: f64,
    pub infant: f64,
    pub net_price: f64,
    pub sale_price: f64,
    pub agency_amount_to_pay: f64,
    /// Supplied profit; the loader is expected to ignore it
    pub profit: f64,
    pub extra: Option<String>,
}

impl ReservationRow {
    pub fn new(reservation_no: &str) -> Self {
        Self {
            reservation_no: reservation_no.to_string(),
            arrival_city: Some("Antalya".to_string()),
            hotel_name: Some("Rixos Premium".to_string()),
            author: Some("Amra".to_string()),
            agency: Some("Sunny Travel".to_string()),
            package_type: None,
            begin_date: NaiveDate::from_ymd_opt(2024, 3, 10),
            create_date: NaiveDate::from_ymd_opt(2024, 1, 15),
            night: 7.0,
            adult: 2.0,
            child: 0.0,
            infant: 0.0,
            net_price: 100.0,
            sale_price: 180.0,
            agency_amount_to_pay: 150.0,
            profit: 0.0,
            extra: None,
        }
    }

    pub fn cells(&self) -> Vec<FixtureCell> {
        vec![
            FixtureCell::Text(self.reservation_no.clone()),
            text(&self.arrival_city),
            text(&self.hotel_name),
            text(&self.author),
            "Bank transfer".into(),
            text(&self.agency),
            date(self.begin_date),
            "Summer".into(),
            "PL-2024".into(),
            date(
                self.begin_date
                    .and_then(|d| d.checked_add_days(chrono::Days::new(self.night as u64))),
            ),
            self.night.into(),
            self.adult.into(),
            self.child.into(),
            self.infant.into(),
            self.net_price.into(),
            self.sale_price.into(),
            self.agency_amount_to_pay.into(),
            date(self.create_date),
            self.sale_price.into(),
            self.agency_amount_to_pay.into(),
            text(&self.package_type),
            self.profit.into(),
        ]
    }
}

/// A reservation export: optional banner lines, the header, then rows
#[derive(Clone, Debug, Default)]
pub struct WorkbookFixture {
    pub banner: Vec<String>,
    pub rows: Vec<ReservationRow>,
    /// Header of an additional non-required column, filled from `extra`
    pub extra_header: Option<String>,
}

impl WorkbookFixture {
    pub fn new(rows: Vec<ReservationRow>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn with_banner(mut self, lines: &[&str]) -> Self {
        self.banner = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn with_extra_column(mut self, header: &str) -> Self {
        self.extra_header = Some(header.to_string());
        self
    }

    pub fn grid(&self) -> Vec<Vec<FixtureCell>> {
        let mut grid: Vec<Vec<FixtureCell>> = self
            .banner
            .iter()
            .map(|line| vec![FixtureCell::Text(line.clone())])
            .collect();

        let mut header: Vec<FixtureCell> =
            RESERVATION_HEADERS.iter().map(|&h| h.into()).collect();
        if let Some(extra) = &self.extra_header {
            header.push(extra.as_str().into());
        }
        grid.push(header);

        for row in &self.rows {
            let mut cells = row.cells();
            if self.extra_header.is_some() {
                cells.push(text(&row.extra));
            }
            grid.push(cells);
        }
        grid
    }

    pub fn to_xlsx(&self) -> Result<Vec<u8>, XlsxError> {
        grid_to_xlsx(&self.grid())
    }
}

/// Write an arbitrary grid to the first sheet of a new workbook
pub fn grid_to_xlsx(grid: &[Vec<FixtureCell>]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
    let worksheet = workbook.add_worksheet();

    for (row_idx, row) in grid.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            match cell {
                FixtureCell::Blank => {}
                FixtureCell::Text(s) => {
                    worksheet.write_string(r, c, s)?;
                }
                FixtureCell::Number(n) => {
                    worksheet.write_number(r, c, *n)?;
                }
                FixtureCell::Date(dt) => {
                    worksheet.write_datetime_with_format(r, c, dt, &date_format)?;
                }
            }
        }
    }

    workbook.save_to_buffer()
}
