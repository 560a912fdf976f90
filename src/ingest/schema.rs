/// Column types used by the fixed dataset tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Integer,
    Double,
    Boolean,
    Varchar,
}

impl DataType {
    pub fn sql_type(&self) -> &'static str {
        match self {
            DataType::Integer => "INTEGER",
            DataType::Double => "DOUBLE",
            DataType::Boolean => "BOOLEAN",
            DataType::Varchar => "VARCHAR",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSchema {
    pub name: &'static str,
    pub data_type: DataType,
    pub primary_key: bool,
}

#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn create_statement(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|column| {
                let key = if column.primary_key { " PRIMARY KEY" } else { "" };
                format!("    {} {}{}", column.name, column.data_type.sql_type(), key)
            })
            .collect::<Vec<_>>()
            .join(",\n");

        format!("CREATE TABLE {} (\n{}\n);", self.name, columns)
    }
}

fn column(name: &'static str, data_type: DataType) -> ColumnSchema {
    ColumnSchema {
        name,
        data_type,
        primary_key: false,
    }
}

fn key(name: &'static str, data_type: DataType) -> ColumnSchema {
    ColumnSchema {
        name,
        data_type,
        primary_key: true,
    }
}

/// The three tables the assistant answers questions about.
pub fn flights_dataset() -> Vec<TableSchema> {
    use DataType::*;

    vec![
        TableSchema {
            name: "airlines",
            columns: vec![key("iata_code", Varchar), column("airline", Varchar)],
        },
        TableSchema {
            name: "airports",
            columns: vec![
                key("iata_code", Varchar),
                column("airport", Varchar),
                column("city", Varchar),
                column("state", Varchar),
                column("country", Varchar),
                column("latitude", Double),
                column("longitude", Double),
            ],
        },
        TableSchema {
            name: "flights",
            columns: vec![
                key("id", Integer),
                column("year", Integer),
                column("month", Integer),
                column("day", Integer),
                column("day_of_week", Integer),
                column("airline", Varchar),
                column("flight_number", Integer),
                column("tail_number", Varchar),
                column("origin_airport", Varchar),
                column("destination_airport", Varchar),
                column("scheduled_departure", Integer),
                column("departure_time", Integer),
                column("departure_delay", Double),
                column("taxi_out", Double),
                column("wheels_off", Integer),
                column("scheduled_time", Double),
                column("elapsed_time", Double),
                column("air_time", Double),
                column("distance", Integer),
                column("wheels_on", Integer),
                column("taxi_in", Double),
                column("scheduled_arrival", Integer),
                column("arrival_time", Integer),
                column("arrival_delay", Double),
                column("diverted", Boolean),
                column("cancelled", Boolean),
                column("cancellation_reason", Varchar),
                column("air_system_delay", Double),
                column("security_delay", Double),
                column("airline_delay", Double),
                column("late_aircraft_delay", Double),
                column("weather_delay", Double),
            ],
        },
    ]
}
