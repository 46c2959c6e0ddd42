//! Explicit table definitions. The SQL the storage layer runs is derived
//! from these rather than spelled out next to each query.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Text,
}

impl SqlType {
    fn as_sql(self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Text => "TEXT",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub primary_key: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct TableSchema {
    pub name: &'static str,
    /// The first column is the primary key. Column order is also the order
    /// of insert parameters and of selected values.
    pub columns: &'static [Column],
}

/// `data_entries(id, movie, rating, imdb_url)`
pub const DATA_ENTRIES: TableSchema = TableSchema {
    name: "data_entries",
    columns: &[
        Column {
            name: "id",
            sql_type: SqlType::Integer,
            primary_key: true,
        },
        Column {
            name: "movie",
            sql_type: SqlType::Text,
            primary_key: false,
        },
        Column {
            name: "rating",
            sql_type: SqlType::Text,
            primary_key: false,
        },
        Column {
            name: "imdb_url",
            sql_type: SqlType::Text,
            primary_key: false,
        },
    ],
};

impl TableSchema {
    pub fn key_column(&self) -> &'static str {
        self.columns
            .iter()
            .find(|c| c.primary_key)
            .map(|c| c.name)
            .unwrap_or("rowid")
    }

    fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn create_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| {
                let mut def = format!("{} {}", c.name, c.sql_type.as_sql());
                if c.primary_key {
                    def.push_str(" PRIMARY KEY");
                }
                def
            })
            .collect::<Vec<_>>()
            .join(",\n    ");
        format!("CREATE TABLE IF NOT EXISTS {} (\n    {}\n)", self.name, columns)
    }

    pub fn insert_sql(&self) -> String {
        let placeholders = (1..=self.columns.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.name,
            self.column_list(),
            placeholders
        )
    }

    pub fn select_by_key_sql(&self) -> String {
        format!(
            "SELECT {} FROM {} WHERE {} = ?1",
            self.column_list(),
            self.name,
            self.key_column()
        )
    }

    pub fn select_all_sql(&self) -> String {
        format!(
            "SELECT {} FROM {} ORDER BY {}",
            self.column_list(),
            self.name,
            self.key_column()
        )
    }
}
