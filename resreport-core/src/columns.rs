use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Columns of the reservation export plus the two derived columns the
/// canonical table adds.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    ReservationNo,
    ArrivalCity,
    HotelName,
    Author,
    Payment,
    Agency,
    BeginDate,
    Package,
    PriceList,
    EndDate,
    Night,
    Adult,
    Child,
    Infant,
    NetPrice,
    SalePrice,
    AgencyPayment,
    CreateDate,
    PassengerAmountToPay,
    AgencyAmountToPay,
    PackageType,
    Profit,
    TotalPax,
    Include,
}

impl Column {
    /// Header names every export must carry, in export order
    pub const REQUIRED: [Column; 22] = [
        Column::ReservationNo,
        Column::ArrivalCity,
        Column::HotelName,
        Column::Author,
        Column::Payment,
        Column::Agency,
        Column::BeginDate,
        Column::Package,
        Column::PriceList,
        Column::EndDate,
        Column::Night,
        Column::Adult,
        Column::Child,
        Column::Infant,
        Column::NetPrice,
        Column::SalePrice,
        Column::AgencyPayment,
        Column::CreateDate,
        Column::PassengerAmountToPay,
        Column::AgencyAmountToPay,
        Column::PackageType,
        Column::Profit,
    ];

    pub const MONETARY: [Column; 6] = [
        Column::NetPrice,
        Column::SalePrice,
        Column::AgencyPayment,
        Column::PassengerAmountToPay,
        Column::AgencyAmountToPay,
        Column::Profit,
    ];

    pub const COUNTS: [Column; 4] = [Column::Night, Column::Adult, Column::Child, Column::Infant];

    pub const DATES: [Column; 3] = [Column::CreateDate, Column::BeginDate, Column::EndDate];

    /// Header text as it appears in the export
    pub fn header(self) -> &'static str {
        match self {
            Column::ReservationNo => "Reservation No",
            Column::ArrivalCity => "Arrival City",
            Column::HotelName => "Hotel Name",
            Column::Author => "Author",
            Column::Payment => "Payment",
            Column::Agency => "Agency",
            Column::BeginDate => "Begin Date",
            Column::Package => "Package",
            Column::PriceList => "Price List",
            Column::EndDate => "End Date",
            Column::Night => "Night",
            Column::Adult => "Adult",
            Column::Child => "Child",
            Column::Infant => "Infant",
            Column::NetPrice => "Net Price",
            Column::SalePrice => "Sale Price",
            Column::AgencyPayment => "Agency Payment",
            Column::CreateDate => "Create Date",
            Column::PassengerAmountToPay => "Passenger Amount to Pay",
            Column::AgencyAmountToPay => "Agency Amount to Pay",
            Column::PackageType => "Package Type",
            Column::Profit => "Profit",
            Column::TotalPax => "Total Pax",
            Column::Include => "Include in Analysis",
        }
    }

    /// Snake-case key used in edit files and JSON views
    pub fn key(self) -> &'static str {
        match self {
            Column::ReservationNo => "reservation_no",
            Column::ArrivalCity => "arrival_city",
            Column::HotelName => "hotel_name",
            Column::Author => "author",
            Column::Payment => "payment",
            Column::Agency => "agency",
            Column::BeginDate => "begin_date",
            Column::Package => "package",
            Column::PriceList => "price_list",
            Column::EndDate => "end_date",
            Column::Night => "night",
            Column::Adult => "adult",
            Column::Child => "child",
            Column::Infant => "infant",
            Column::NetPrice => "net_price",
            Column::SalePrice => "sale_price",
            Column::AgencyPayment => "agency_payment",
            Column::CreateDate => "create_date",
            Column::PassengerAmountToPay => "passenger_amount_to_pay",
            Column::AgencyAmountToPay => "agency_amount_to_pay",
            Column::PackageType => "package_type",
            Column::Profit => "profit",
            Column::TotalPax => "total_pax",
            Column::Include => "include",
        }
    }

    pub fn from_header(header: &str) -> Option<Column> {
        let header = header.trim();
        Self::all().find(|c| c.header() == header)
    }

    pub fn from_key(key: &str) -> Option<Column> {
        let key = key.trim();
        Self::all().find(|c| c.key() == key)
    }

    fn all() -> impl Iterator<Item = Column> {
        Self::REQUIRED
            .into_iter()
            .chain([Column::TotalPax, Column::Include])
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.header())
    }
}

/// The default required header set, as owned strings for configuration
pub fn required_column_names() -> Vec<String> {
    Column::REQUIRED
        .iter()
        .map(|c| c.header().to_string())
        .collect()
}
