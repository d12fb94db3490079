//! Table descriptors for the two persisted resources.

use crate::query::{ColumnDef, ForeignKey, Table};

pub static AUTHOR: Table = Table {
    name: "author",
    primary_key: "id",
    columns: &[
        ColumnDef {
            name: "id",
            ddl: "BIGSERIAL NOT NULL",
            cast: "int8",
        },
        ColumnDef {
            name: "name",
            ddl: "VARCHAR(255) NOT NULL",
            cast: "text",
        },
    ],
    unique: &[&["name"]],
    foreign_keys: &[],
};

pub static BOOK: Table = Table {
    name: "book",
    primary_key: "id",
    columns: &[
        ColumnDef {
            name: "id",
            ddl: "BIGSERIAL NOT NULL",
            cast: "int8",
        },
        ColumnDef {
            name: "title",
            ddl: "VARCHAR(255) NOT NULL",
            cast: "text",
        },
        ColumnDef {
            name: "author_id",
            ddl: "BIGINT NOT NULL",
            cast: "int8",
        },
        ColumnDef {
            name: "published_at",
            ddl: "DATE NOT NULL",
            cast: "date",
        },
    ],
    unique: &[&["title", "author_id"]],
    foreign_keys: &[ForeignKey {
        column: "author_id",
        table: "author",
        target: "id",
    }],
};

/// Tables in dependency order (referenced tables first).
pub static TABLES: &[&Table] = &[&AUTHOR, &BOOK];
